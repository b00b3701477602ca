// CONTROLLER: Input, rig components, and the per-tick update loop
pub mod input;
pub mod aim_sensor;
pub mod animation;
pub mod camera_controller;
pub mod locomotion;
pub mod sequence;
pub mod interaction;
pub mod frame_loop;

pub use input::{FrameInput, InputEvent, InputProcessor, InputState, KeyBindings};
pub use aim_sensor::AimSensor;
pub use animation::AnimationDriver;
pub use camera_controller::{AimSource, OrbitCamera};
pub use locomotion::LocomotionController;
pub use sequence::{SequenceStep, Sequencer, Timeline};
pub use interaction::{throw_direction, InteractionController};
pub use frame_loop::{FrameClock, FrameTime, Rig};
