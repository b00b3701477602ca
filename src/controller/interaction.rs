use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, error, info, warn};

use crate::config::{ClipNames, InteractionConfig, ThrowTiming};
use crate::controller::camera_controller::AimSource;
use crate::controller::input::FrameInput;
use crate::controller::locomotion::LocomotionController;
use crate::controller::sequence::{SequenceStep, Sequencer};
use crate::error::{Rejection, RigError};
use crate::model::{BusyGate, BusyReason, CarryableItem, Handle, ItemRegistry, Transform};
use crate::utils::random_in_unit_sphere;
use crate::world::{Anchor, CollisionDetection, PhysicsWorld};

/// Aim vectors shorter than this are treated as "no direction"
const MIN_AIM_LENGTH_SQ: f32 = 1e-4;

/// Pickup and throw of carryable items.
///
/// Holds at most one item, owns the busy gate through its [`Sequencer`] and
/// drives the timed steps of both sequences from [`InteractionController::update`].
pub struct InteractionController {
    pub config: InteractionConfig,
    pub clips: ClipNames,
    registry: ItemRegistry,
    sequencer: Sequencer,
    held: Option<Handle>,
    last_throw_time: Option<f32>,
    rng: StdRng,
}

impl InteractionController {
    pub fn new(config: InteractionConfig, clips: ClipNames, registry: ItemRegistry) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            clips,
            registry,
            sequencer: Sequencer::new(),
            held: None,
            last_throw_time: None,
            rng,
        }
    }

    pub fn register_item(&mut self, item: CarryableItem) {
        self.registry.register(item);
    }

    pub fn registry(&self) -> &ItemRegistry { &self.registry }

    pub fn held(&self) -> Option<Handle> { self.held }

    pub fn last_throw_time(&self) -> Option<f32> { self.last_throw_time }

    pub fn gate(&self) -> BusyGate { self.sequencer.gate() }

    pub fn sequencer_mut(&mut self) -> &mut Sequencer { &mut self.sequencer }

    pub fn is_cooling_down(&self, now: f32) -> bool {
        self.last_throw_time.is_some_and(|t| now - t < self.config.pickup_cooldown)
    }

    /// Take `handle` into the hand: strip its body, parent it to the hold
    /// point and start the pick animation.
    pub fn try_pickup(
        &mut self,
        handle: Handle,
        now: f32,
        world: &mut dyn PhysicsWorld,
        locomotion: &mut LocomotionController,
    ) -> Result<Handle, RigError> {
        if self.held.is_some() {
            return Err(Rejection::AlreadyHolding.into());
        }
        if self.is_cooling_down(now) {
            return Err(Rejection::CoolingDown.into());
        }
        let Some(item) = self.registry.get(handle) else {
            return Err(Rejection::Unregistered.into());
        };
        let name = item.name.clone();
        if world.anchor(Anchor::HoldPoint).is_none() {
            warn!(item = %name, "hold point not set; pickup skipped");
            return Err(RigError::ReferenceMissing(Anchor::HoldPoint.name()));
        }

        world.remove_body(handle);
        world.attach(handle, Anchor::HoldPoint, Transform::IDENTITY);
        self.held = Some(handle);
        info!(item = %name, "picked up");

        if let Err(err) = locomotion.play_pick_animation(&mut self.sequencer, now) {
            debug!(%err, "pick animation not started");
        }
        Ok(handle)
    }

    /// Start the throw sequence for the held item.
    pub fn begin_throw(&mut self, now: f32, locomotion: &mut LocomotionController) -> Result<(), RigError> {
        if self.held.is_none() {
            return Err(Rejection::NothingHeld.into());
        }
        self.sequencer.begin(BusyReason::Throwing)?;

        let throw = self.clips.throw.clone();
        let animation = locomotion.animation_mut();
        animation.play(&throw, self.config.throw_blend);
        let delay = match self.config.throw_timing {
            ThrowTiming::Fixed => self.config.throw_delay,
            ThrowTiming::ClipLength => match animation.clip_length(&throw) {
                Some(length) => length,
                None => {
                    error!(clip = %throw, fallback = self.config.throw_delay, "throw clip not found, using throw_delay");
                    self.config.throw_delay
                }
            },
        };
        debug!(delay, "throw wind-up");
        self.sequencer.schedule(now + delay, SequenceStep::ThrowRelease);
        Ok(())
    }

    /// Run due sequence steps, then react to this tick's input.
    pub fn update(
        &mut self,
        input: &FrameInput,
        now: f32,
        locomotion: &mut LocomotionController,
        world: &mut dyn PhysicsWorld,
        aim: Option<&dyn AimSource>,
    ) {
        while let Some(step) = self.sequencer.pop_due(now) {
            match step {
                SequenceStep::PickupFinished => {
                    self.sequencer.release();
                    locomotion.finish_pick_animation();
                }
                SequenceStep::ThrowRelease => {
                    if let Err(err) = self.release_item(now, world, aim) {
                        debug!(%err, "throw release skipped");
                    }
                    self.sequencer.schedule(now + self.config.release_buffer, SequenceStep::ThrowRecovered);
                }
                SequenceStep::ThrowRecovered => self.sequencer.release(),
            }
        }

        if input.throw && self.held.is_some() {
            if let Err(err) = self.begin_throw(now, locomotion) {
                debug!(%err, "throw rejected");
            }
        } else if input.pick {
            if let Err(err) = locomotion.play_pick_animation(&mut self.sequencer, now) {
                debug!(%err, "pick rejected");
            }
        }
    }

    /// Hand the held item back to physics at the throw origin and launch it.
    fn release_item(&mut self, now: f32, world: &mut dyn PhysicsWorld, aim: Option<&dyn AimSource>) -> Result<(), RigError> {
        let handle = self.held.ok_or(RigError::from(Rejection::NothingHeld))?;
        let Some(origin) = world.anchor(Anchor::ThrowOrigin) else {
            warn!("throw origin not set; item stays in hand");
            return Err(RigError::ReferenceMissing(Anchor::ThrowOrigin.name()));
        };
        let (name, mass, accuracy) = match self.registry.get(handle) {
            Some(item) => (item.name.clone(), item.mass, item.accuracy),
            None => (format!("#{}", handle.0), 1.0, 0.0),
        };

        let camera = world.anchor(Anchor::MainCamera);
        let aimed = throw_direction(&origin, aim, camera);
        let direction = (aimed + random_in_unit_sphere(&mut self.rng) * accuracy)
            .try_normalize()
            .unwrap_or(aimed);
        let tumble = random_in_unit_sphere(&mut self.rng) * self.config.tumble_speed;

        world.detach(handle, origin);
        self.held = None;
        self.last_throw_time = Some(now);

        match world.ensure_body(handle) {
            Some(body) => {
                body.set_mass(mass);
                body.set_kinematic(false);
                body.set_use_gravity(true);
                body.set_collision_detection(CollisionDetection::ContinuousDynamic);
                body.set_linear_velocity(direction * self.config.throw_force);
                body.set_angular_velocity(tumble);
                body.wake_up();
            }
            None => warn!(item = %name, "no body could be attached; item dropped at throw origin"),
        }
        info!(item = %name, ?direction, "threw");
        Ok(())
    }

    /// Drop pending steps and free the gate. The held item stays held.
    pub fn cancel_sequences(&mut self) {
        self.sequencer.cancel();
    }
}

/// Where to throw from `origin`: at the aim point when an aim source is wired,
/// otherwise along the main camera's forward, otherwise along the origin's forward.
pub fn throw_direction(origin: &Transform, aim: Option<&dyn AimSource>, camera: Option<Transform>) -> Vec3 {
    match aim {
        Some(source) => {
            let (_, point) = source.try_get_aim_point();
            let to_point = point - origin.position;
            if to_point.length_squared() > MIN_AIM_LENGTH_SQ {
                to_point.normalize()
            } else {
                origin.forward()
            }
        }
        None => camera.map_or_else(|| origin.forward(), |c| c.forward()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MovementConfig;
    use crate::world::sandbox::{RecordingAnimator, SandboxWorld};
    use approx::assert_relative_eq;
    use glam::Quat;

    const SLIPPER: Handle = Handle(7);

    struct FixedAim(Vec3);

    impl AimSource for FixedAim {
        fn try_get_aim_point(&self) -> (bool, Vec3) { (true, self.0) }
    }

    struct Fixture {
        interaction: InteractionController,
        locomotion: LocomotionController,
        world: SandboxWorld,
    }

    fn fixture_with(config: InteractionConfig, animator: Option<RecordingAnimator>) -> Fixture {
        let clips = ClipNames::default();
        let registry: ItemRegistry = [CarryableItem::new("Slipper", SLIPPER).with_mass(0.4)].into_iter().collect();
        let interaction = InteractionController::new(config, clips.clone(), registry);
        let animator = animator.map(|a| Box::new(a) as Box<dyn crate::world::Animator>);
        let locomotion = LocomotionController::new(MovementConfig::default(), clips, animator);
        let mut world = SandboxWorld::new().with_humanoid_anchors();
        world.spawn_object(SLIPPER, Transform::from_position(Vec3::new(0.0, 0.0, 1.0)));
        Fixture { interaction, locomotion, world }
    }

    fn fixture() -> Fixture {
        let config = InteractionConfig { seed: Some(11), ..Default::default() };
        fixture_with(config, Some(RecordingAnimator::with_clips(&ClipNames::default())))
    }

    impl Fixture {
        fn pickup(&mut self, now: f32) -> Result<Handle, RigError> {
            self.interaction.try_pickup(SLIPPER, now, &mut self.world, &mut self.locomotion)
        }

        fn tick(&mut self, input: &FrameInput, now: f32, aim: Option<&dyn AimSource>) {
            self.interaction.update(input, now, &mut self.locomotion, &mut self.world, aim);
        }
    }

    fn throw_input() -> FrameInput { FrameInput { throw: true, ..Default::default() } }

    #[test]
    fn test_pickup_attaches_to_hold_point() {
        let mut fx = fixture();
        assert_eq!(fx.pickup(0.0), Ok(SLIPPER));

        assert_eq!(fx.interaction.held(), Some(SLIPPER));
        assert!(fx.world.body(SLIPPER).is_none());
        let object = fx.world.object(SLIPPER).unwrap();
        assert_eq!(object.parent, Some((Anchor::HoldPoint, Transform::IDENTITY)));
        assert_eq!(fx.interaction.gate(), BusyGate::Suspended(BusyReason::PickingUp));
    }

    #[test]
    fn test_pickup_while_holding_is_rejected() {
        let mut fx = fixture();
        fx.pickup(0.0).unwrap();
        fx.world.spawn_object(Handle(8), Transform::IDENTITY);
        fx.interaction.register_item(CarryableItem::new("Other", Handle(8)));

        let err = fx.interaction.try_pickup(Handle(8), 5.0, &mut fx.world, &mut fx.locomotion).unwrap_err();
        assert_eq!(err.rejection(), Some(Rejection::AlreadyHolding));
        assert_eq!(fx.interaction.held(), Some(SLIPPER));
        assert!(fx.world.object(Handle(8)).unwrap().parent.is_none());
    }

    #[test]
    fn test_unregistered_collidable_is_rejected() {
        let mut fx = fixture();
        let err = fx.interaction.try_pickup(Handle(99), 0.0, &mut fx.world, &mut fx.locomotion).unwrap_err();
        assert_eq!(err.rejection(), Some(Rejection::Unregistered));
        assert_eq!(fx.interaction.gate(), BusyGate::Free);
    }

    #[test]
    fn test_missing_hold_point_leaves_item_alone() {
        let mut fx = fixture();
        fx.world.remove_anchor(Anchor::HoldPoint);
        assert_eq!(fx.pickup(0.0), Err(RigError::ReferenceMissing("hold point")));
        assert_eq!(fx.interaction.held(), None);
        assert!(fx.world.body(SLIPPER).is_some());
        assert_eq!(fx.interaction.gate(), BusyGate::Free);
    }

    #[test]
    fn test_pickup_sequence_releases_gate_after_clip() {
        let mut fx = fixture();
        fx.pickup(0.0).unwrap();

        fx.tick(&FrameInput::default(), 1.0, None);
        assert!(fx.interaction.gate().is_busy());
        fx.tick(&FrameInput::default(), 1.3, None);
        assert_eq!(fx.interaction.gate(), BusyGate::Free);
        assert_eq!(fx.locomotion.animation().current(), Some("Idle"));
        assert_eq!(fx.interaction.held(), Some(SLIPPER));
    }

    #[test]
    fn test_missing_pick_clip_still_holds_item() {
        let animator = RecordingAnimator::with_clips(&ClipNames::default()).without_clip("Pick Object");
        let mut fx = fixture_with(InteractionConfig::default(), Some(animator));
        fx.pickup(0.0).unwrap();

        assert_eq!(fx.interaction.held(), Some(SLIPPER));
        assert_eq!(fx.interaction.gate(), BusyGate::Free);
    }

    #[test]
    fn test_throw_ignored_when_empty_handed() {
        let mut fx = fixture();
        fx.tick(&throw_input(), 0.0, None);
        assert_eq!(fx.interaction.gate(), BusyGate::Free);
        assert_eq!(fx.interaction.begin_throw(0.0, &mut fx.locomotion), Err(RigError::from(Rejection::NothingHeld)));
    }

    #[test]
    fn test_full_throw_sequence() {
        let mut fx = fixture();
        fx.pickup(0.0).unwrap();
        fx.tick(&FrameInput::default(), 1.3, None);

        let aim = FixedAim(Vec3::new(0.3, 1.6, 10.6));
        fx.tick(&throw_input(), 2.0, Some(&aim));
        assert_eq!(fx.interaction.gate(), BusyGate::Suspended(BusyReason::Throwing));
        assert_eq!(fx.locomotion.animation().current(), Some("Throw Object"));

        fx.tick(&FrameInput::default(), 2.4, Some(&aim));
        assert_eq!(fx.interaction.held(), Some(SLIPPER));

        fx.tick(&FrameInput::default(), 2.6, Some(&aim));
        assert_eq!(fx.interaction.held(), None);
        assert_eq!(fx.interaction.last_throw_time(), Some(2.6));
        assert!(fx.interaction.gate().is_busy());

        let body = fx.world.body(SLIPPER).unwrap();
        assert_relative_eq!(body.linear_velocity.length(), 20.0, epsilon = 1e-3);
        let angle = body.linear_velocity.normalize().angle_between(Vec3::Z);
        assert!(angle <= 0.1f32.asin() + 1e-4, "spread {angle} too wide");
        assert_eq!(body.collision, CollisionDetection::ContinuousDynamic);
        assert_eq!(body.mass, 0.4);
        assert!(!body.kinematic && body.use_gravity && body.awake);
        assert!(body.angular_velocity.length() <= 5.0 + 1e-4);

        let at = fx.world.object_transform(SLIPPER).unwrap();
        assert_relative_eq!(at.position.z, 0.6, epsilon = 1e-5);

        fx.tick(&FrameInput::default(), 2.9, Some(&aim));
        assert_eq!(fx.interaction.gate(), BusyGate::Free);
    }

    #[test]
    fn test_cooldown_after_throw() {
        let mut fx = fixture();
        fx.pickup(0.0).unwrap();
        fx.tick(&FrameInput::default(), 1.3, None);
        fx.tick(&throw_input(), 2.0, None);
        fx.tick(&FrameInput::default(), 2.6, None);
        fx.tick(&FrameInput::default(), 2.9, None);

        assert_eq!(fx.pickup(2.95).unwrap_err().rejection(), Some(Rejection::CoolingDown));
        assert_eq!(fx.interaction.held(), None);
        assert_eq!(fx.pickup(3.2), Ok(SLIPPER));
    }

    #[test]
    fn test_throw_without_animator_still_completes() {
        let mut fx = fixture_with(InteractionConfig::default(), None);
        fx.pickup(0.0).unwrap();
        assert_eq!(fx.interaction.gate(), BusyGate::Free);

        fx.tick(&throw_input(), 1.0, None);
        fx.tick(&FrameInput::default(), 1.6, None);
        assert_eq!(fx.interaction.held(), None);
        fx.tick(&FrameInput::default(), 1.9, None);
        assert_eq!(fx.interaction.gate(), BusyGate::Free);
    }

    #[test]
    fn test_missing_throw_origin_keeps_item_and_frees_gate() {
        let mut fx = fixture();
        fx.pickup(0.0).unwrap();
        fx.tick(&FrameInput::default(), 1.3, None);
        fx.world.remove_anchor(Anchor::ThrowOrigin);

        fx.tick(&throw_input(), 2.0, None);
        fx.tick(&FrameInput::default(), 2.6, None);
        assert_eq!(fx.interaction.held(), Some(SLIPPER));
        assert_eq!(fx.interaction.last_throw_time(), None);
        fx.tick(&FrameInput::default(), 2.9, None);
        assert_eq!(fx.interaction.gate(), BusyGate::Free);
    }

    #[test]
    fn test_clip_length_timing() {
        let config = InteractionConfig { throw_timing: ThrowTiming::ClipLength, ..Default::default() };
        let mut fx = fixture_with(config, Some(RecordingAnimator::with_clips(&ClipNames::default())));
        fx.pickup(0.0).unwrap();
        fx.tick(&FrameInput::default(), 1.3, None);

        fx.tick(&throw_input(), 2.0, None);
        fx.tick(&FrameInput::default(), 2.6, None);
        assert_eq!(fx.interaction.held(), Some(SLIPPER));
        fx.tick(&FrameInput::default(), 2.9, None);
        assert_eq!(fx.interaction.held(), None);
    }

    #[test]
    fn test_clip_length_timing_without_throw_clip() {
        let config = InteractionConfig { throw_timing: ThrowTiming::ClipLength, ..Default::default() };
        let animator = RecordingAnimator::with_clips(&ClipNames::default()).without_clip("Throw Object");
        let mut fx = fixture_with(config, Some(animator));
        fx.pickup(0.0).unwrap();
        fx.tick(&FrameInput::default(), 1.3, None);

        let errors = crate::logging::capture::count_errors(|| fx.tick(&throw_input(), 2.0, None));
        assert_eq!(errors, 1);
        assert_eq!(fx.interaction.gate(), BusyGate::Suspended(BusyReason::Throwing));

        // falls back to the fixed 0.5s wind-up
        fx.tick(&FrameInput::default(), 2.4, None);
        assert_eq!(fx.interaction.held(), Some(SLIPPER));
        fx.tick(&FrameInput::default(), 2.6, None);
        assert_eq!(fx.interaction.held(), None);
    }

    #[test]
    fn test_pick_input_starts_pick_animation() {
        let mut fx = fixture();
        fx.tick(&FrameInput { pick: true, ..Default::default() }, 0.0, None);
        assert_eq!(fx.interaction.gate(), BusyGate::Suspended(BusyReason::PickingUp));
        assert_eq!(fx.interaction.held(), None);
    }

    #[test]
    fn test_cancel_frees_gate() {
        let mut fx = fixture();
        fx.pickup(0.0).unwrap();
        fx.interaction.cancel_sequences();
        assert_eq!(fx.interaction.gate(), BusyGate::Free);
        fx.tick(&FrameInput::default(), 5.0, None);
        assert_eq!(fx.locomotion.animation().current(), Some("Pick Object"));
    }

    #[test]
    fn test_throw_direction_fallbacks() {
        let origin = Transform::new(Vec3::new(1.0, 1.0, 1.0), Quat::from_rotation_y(90f32.to_radians()));

        let dir = throw_direction(&origin, None, None);
        assert_relative_eq!(dir.x, 1.0, epsilon = 1e-5);

        let camera = Transform::new(Vec3::ZERO, Quat::from_rotation_y(180f32.to_radians()));
        let dir = throw_direction(&origin, None, Some(camera));
        assert_relative_eq!(dir.z, -1.0, epsilon = 1e-5);

        let aim = FixedAim(Vec3::new(1.0, 5.0, 1.0));
        let dir = throw_direction(&origin, Some(&aim), Some(camera));
        assert_relative_eq!(dir.y, 1.0, epsilon = 1e-5);

        let degenerate = FixedAim(origin.position);
        let dir = throw_direction(&origin, Some(&degenerate), Some(camera));
        assert_relative_eq!(dir.x, 1.0, epsilon = 1e-5);
    }
}
