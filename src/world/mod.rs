// WORLD: Collaborators the rig drives (physics, character body, animation)
pub mod animation;
pub mod physics;
pub mod sandbox;

pub use animation::Animator;
pub use physics::{Anchor, CharacterMotor, CollisionDetection, DynamicBody, PhysicsWorld, RayHit};
