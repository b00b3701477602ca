//! In-memory stand-ins for the physics, character and animation collaborators.
//!
//! Flat ground at `ground_height`, axis-aligned box colliders for raycasts,
//! ballistic rigid bodies and an animator that records every call. Good enough
//! to drive the rig headless from the demo binary and from tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use glam::{Quat, Vec3};

use crate::config::ClipNames;
use crate::model::{Handle, LayerMask, Transform};
use crate::world::{Anchor, Animator, CharacterMotor, CollisionDetection, DynamicBody, PhysicsWorld, RayHit};

/// Handle reported for ray hits on the ground plane
pub const GROUND: Handle = Handle(0);
pub const GROUND_LAYER: u8 = 0;

const SANDBOX_GRAVITY: f32 = -9.81;

#[derive(Debug, Clone, PartialEq)]
pub struct SandboxBody {
    pub mass: f32,
    pub kinematic: bool,
    pub use_gravity: bool,
    pub collision: CollisionDetection,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub awake: bool,
}

impl Default for SandboxBody {
    fn default() -> Self {
        Self {
            mass: 1.0,
            kinematic: false,
            use_gravity: true,
            collision: CollisionDetection::Discrete,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            awake: false,
        }
    }
}

impl DynamicBody for SandboxBody {
    fn set_mass(&mut self, mass: f32) { self.mass = mass; }
    fn set_kinematic(&mut self, kinematic: bool) { self.kinematic = kinematic; }
    fn set_use_gravity(&mut self, use_gravity: bool) { self.use_gravity = use_gravity; }
    fn set_collision_detection(&mut self, mode: CollisionDetection) { self.collision = mode; }
    fn set_linear_velocity(&mut self, velocity: Vec3) { self.linear_velocity = velocity; }
    fn set_angular_velocity(&mut self, velocity: Vec3) { self.angular_velocity = velocity; }
    fn wake_up(&mut self) { self.awake = true; }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxCollider {
    pub handle: Handle,
    pub center: Vec3,
    pub half_extents: Vec3,
    pub layer: u8,
}

impl BoxCollider {
    /// Slab test; returns the entry distance along the ray.
    fn intersect(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<f32> {
        let min = self.center - self.half_extents;
        let max = self.center + self.half_extents;
        let mut t_near = 0.0f32;
        let mut t_far = max_distance;
        for axis in 0..3 {
            let o = origin[axis];
            let d = direction[axis];
            if d.abs() < 1e-8 {
                if o < min[axis] || o > max[axis] {
                    return None;
                }
                continue;
            }
            let t1 = (min[axis] - o) / d;
            let t2 = (max[axis] - o) / d;
            t_near = t_near.max(t1.min(t2));
            t_far = t_far.min(t1.max(t2));
            if t_near > t_far {
                return None;
            }
        }
        Some(t_near)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SandboxObject {
    pub transform: Transform,
    pub parent: Option<(Anchor, Transform)>,
    pub body: Option<SandboxBody>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum AnchorPose {
    World(Transform),
    OnActor(Transform),
}

#[derive(Debug, Clone)]
pub struct SandboxWorld {
    pub ground_height: f32,
    actor: Transform,
    anchors: HashMap<Anchor, AnchorPose>,
    colliders: Vec<BoxCollider>,
    objects: HashMap<Handle, SandboxObject>,
}

impl SandboxWorld {
    pub fn new() -> Self {
        Self {
            ground_height: 0.0,
            actor: Transform::IDENTITY,
            anchors: HashMap::new(),
            colliders: Vec::new(),
            objects: HashMap::new(),
        }
    }

    /// Hand and throw anchors at their usual spots on a humanoid.
    pub fn with_humanoid_anchors(mut self) -> Self {
        self.set_actor_anchor(Anchor::HoldPoint, Transform::from_position(Vec3::new(0.3, 1.1, 0.3)));
        self.set_actor_anchor(Anchor::ThrowOrigin, Transform::from_position(Vec3::new(0.3, 1.6, 0.6)));
        self
    }

    pub fn set_actor(&mut self, actor: Transform) { self.actor = actor; }

    /// Anchor that moves with the actor (`local` is actor-relative)
    pub fn set_actor_anchor(&mut self, anchor: Anchor, local: Transform) {
        self.anchors.insert(anchor, AnchorPose::OnActor(local));
    }

    pub fn set_world_anchor(&mut self, anchor: Anchor, world: Transform) {
        self.anchors.insert(anchor, AnchorPose::World(world));
    }

    pub fn remove_anchor(&mut self, anchor: Anchor) { self.anchors.remove(&anchor); }

    pub fn add_collider(&mut self, collider: BoxCollider) { self.colliders.push(collider); }

    /// Spawn a free, simulated object (e.g. a carryable item lying on the floor).
    pub fn spawn_object(&mut self, handle: Handle, transform: Transform) {
        self.objects.insert(
            handle,
            SandboxObject { transform, parent: None, body: Some(SandboxBody::default()) },
        );
    }

    pub fn object(&self, handle: Handle) -> Option<&SandboxObject> { self.objects.get(&handle) }

    pub fn body(&self, handle: Handle) -> Option<&SandboxBody> {
        self.objects.get(&handle).and_then(|o| o.body.as_ref())
    }

    /// World transform of an object, following its parent anchor if attached.
    pub fn object_transform(&self, handle: Handle) -> Option<Transform> {
        let object = self.objects.get(&handle)?;
        match object.parent {
            Some((anchor, local)) => Some(self.anchor(anchor)?.mul_transform(&local)),
            None => Some(object.transform),
        }
    }

    /// Integrate free bodies; they come to rest on the ground plane.
    pub fn step(&mut self, dt: f32) {
        let ground = self.ground_height;
        for object in self.objects.values_mut() {
            if object.parent.is_some() {
                continue;
            }
            let Some(body) = object.body.as_mut() else { continue };
            if body.kinematic {
                continue;
            }
            if body.use_gravity {
                body.linear_velocity.y += SANDBOX_GRAVITY * dt;
            }
            object.transform.position += body.linear_velocity * dt;
            let spin = body.angular_velocity * dt;
            if spin.length_squared() > 0.0 {
                object.transform.rotation = (Quat::from_scaled_axis(spin) * object.transform.rotation).normalize();
            }
            if object.transform.position.y <= ground {
                object.transform.position.y = ground;
                body.linear_velocity = Vec3::ZERO;
                body.angular_velocity = Vec3::ZERO;
                body.awake = false;
            }
        }
    }
}

impl Default for SandboxWorld {
    fn default() -> Self { Self::new() }
}

impl PhysicsWorld for SandboxWorld {
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32, mask: LayerMask) -> Option<RayHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }
        let mut best: Option<RayHit> = None;
        let mut consider = |target: Handle, distance: f32| {
            if distance <= max_distance && best.map_or(true, |b| distance < b.distance) {
                best = Some(RayHit { point: origin + direction * distance, target, distance });
            }
        };

        if mask.contains_layer(GROUND_LAYER) && direction.y < 0.0 && origin.y > self.ground_height {
            consider(GROUND, (self.ground_height - origin.y) / direction.y);
        }
        for collider in self.colliders.iter().filter(|c| mask.contains_layer(c.layer)) {
            if let Some(distance) = collider.intersect(origin, direction, max_distance) {
                consider(collider.handle, distance);
            }
        }
        best
    }

    fn anchor(&self, anchor: Anchor) -> Option<Transform> {
        match self.anchors.get(&anchor)? {
            AnchorPose::World(t) => Some(*t),
            AnchorPose::OnActor(local) => Some(self.actor.mul_transform(local)),
        }
    }

    fn remove_body(&mut self, handle: Handle) {
        if let Some(object) = self.objects.get_mut(&handle) {
            object.body = None;
        }
    }

    fn attach(&mut self, handle: Handle, anchor: Anchor, local: Transform) {
        if let Some(object) = self.objects.get_mut(&handle) {
            object.parent = Some((anchor, local));
        }
    }

    fn detach(&mut self, handle: Handle, world: Transform) {
        if let Some(object) = self.objects.get_mut(&handle) {
            object.parent = None;
            object.transform = world;
        }
    }

    fn ensure_body(&mut self, handle: Handle) -> Option<&mut dyn DynamicBody> {
        let object = self.objects.get_mut(&handle)?;
        let body: &mut dyn DynamicBody = object.body.get_or_insert_with(SandboxBody::default);
        Some(body)
    }
}

/// Capsule-ish character that stands on the ground plane.
#[derive(Debug, Clone)]
pub struct SandboxMotor {
    pub transform: Transform,
    pub ground_height: f32,
    pub grounded: bool,
    /// Every motion passed to `move_by`, in order
    pub moves: Vec<Vec3>,
}

impl SandboxMotor {
    pub fn new(position: Vec3) -> Self {
        Self {
            transform: Transform::from_position(position),
            ground_height: 0.0,
            grounded: position.y <= 0.0,
            moves: Vec::new(),
        }
    }
}

impl CharacterMotor for SandboxMotor {
    fn is_grounded(&self) -> bool { self.grounded }

    fn move_by(&mut self, motion: Vec3) {
        self.moves.push(motion);
        self.transform.position += motion;
        if self.transform.position.y <= self.ground_height {
            self.transform.position.y = self.ground_height;
            self.grounded = true;
        } else {
            self.grounded = false;
        }
    }

    fn transform(&self) -> Transform { self.transform }

    fn set_rotation(&mut self, rotation: Quat) { self.transform.rotation = rotation; }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnimationCall {
    CrossFade { clip: String, blend: f32 },
    Stop,
}

pub type AnimationLog = Rc<RefCell<Vec<AnimationCall>>>;

/// Animator with a fixed clip table that records what it was told to do.
#[derive(Debug, Clone, Default)]
pub struct RecordingAnimator {
    clips: HashMap<String, f32>,
    log: AnimationLog,
}

impl RecordingAnimator {
    pub fn new<'a>(clips: impl IntoIterator<Item = (&'a str, f32)>) -> Self {
        Self {
            clips: clips.into_iter().map(|(name, len)| (name.to_string(), len)).collect(),
            log: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn with_clips(names: &ClipNames) -> Self {
        Self::new([
            (names.idle.as_str(), 1.0),
            (names.walk.as_str(), 1.0),
            (names.run.as_str(), 0.8),
            (names.walk_backward.as_str(), 1.0),
            (names.jump.as_str(), 0.9),
            (names.pick.as_str(), 1.2),
            (names.throw.as_str(), 0.8),
        ])
    }

    pub fn without_clip(mut self, clip: &str) -> Self {
        self.clips.remove(clip);
        self
    }

    /// Shared view of the call log; stays valid after the animator is boxed.
    pub fn log(&self) -> AnimationLog { self.log.clone() }
}

impl Animator for RecordingAnimator {
    fn cross_fade(&mut self, clip: &str, blend: f32) {
        self.log.borrow_mut().push(AnimationCall::CrossFade { clip: clip.to_string(), blend });
    }

    fn stop(&mut self) {
        self.log.borrow_mut().push(AnimationCall::Stop);
    }

    fn clip_length(&self, clip: &str) -> Option<f32> { self.clips.get(clip).copied() }
}
