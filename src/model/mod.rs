// MODEL: Rig state and data
pub mod actor;
pub mod aim;
pub mod camera;
pub mod item;
pub mod transform;

pub use actor::{ActorMotion, BusyGate, BusyReason, LocomotionState};
pub use aim::AimState;
pub use camera::{CameraRig, CursorMode, ViewMode};
pub use item::{CarryableItem, ItemRegistry};
pub use transform::{Capabilities, Collidable, Handle, LayerMask, Transform};
