use glam::{Quat, Vec3};

use crate::model::{Handle, LayerMask, Transform};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
    pub target: Handle,
    pub distance: f32,
}

/// Fixed attachment transforms the rig asks the scene about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// Child under the hand where a held item is parented
    HoldPoint,
    /// Where a thrown item starts its flight
    ThrowOrigin,
    /// The scene's main camera, used when no aim source is wired
    MainCamera,
}

impl Anchor {
    pub fn name(&self) -> &'static str {
        match self {
            Anchor::HoldPoint => "hold point",
            Anchor::ThrowOrigin => "throw origin",
            Anchor::MainCamera => "main camera",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionDetection {
    #[default]
    Discrete,
    Continuous,
    ContinuousDynamic,
}

/// Velocity-driven rigid body owned by the physics engine.
pub trait DynamicBody {
    fn set_mass(&mut self, mass: f32);
    fn set_kinematic(&mut self, kinematic: bool);
    fn set_use_gravity(&mut self, use_gravity: bool);
    fn set_collision_detection(&mut self, mode: CollisionDetection);
    fn set_linear_velocity(&mut self, velocity: Vec3);
    fn set_angular_velocity(&mut self, velocity: Vec3);
    fn wake_up(&mut self);
}

/// The scene/physics engine as seen by the rig.
pub trait PhysicsWorld {
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32, mask: LayerMask) -> Option<RayHit>;

    /// World transform of an anchor, `None` if the scene has none.
    fn anchor(&self, anchor: Anchor) -> Option<Transform>;

    /// Drop the object's own rigid body so it stops simulating independently.
    fn remove_body(&mut self, handle: Handle);

    /// Parent the object under `anchor` at the given local transform.
    fn attach(&mut self, handle: Handle, anchor: Anchor, local: Transform);

    /// Un-parent the object and place it at `world` transform.
    fn detach(&mut self, handle: Handle, world: Transform);

    /// The object's rigid body, created if missing. `None` if the object is gone.
    fn ensure_body(&mut self, handle: Handle) -> Option<&mut dyn DynamicBody>;
}

/// Kinematic character body (capsule controller) that the rig drives.
pub trait CharacterMotor {
    /// Whether the last move ended touching ground
    fn is_grounded(&self) -> bool;
    fn move_by(&mut self, motion: Vec3);
    fn transform(&self) -> Transform;
    fn set_rotation(&mut self, rotation: Quat);
}
