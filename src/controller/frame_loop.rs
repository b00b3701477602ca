use glam::Vec3;
use tracing::{debug, error, info, trace};

use crate::config::RigConfig;
use crate::controller::aim_sensor::AimSensor;
use crate::controller::camera_controller::{AimSource, OrbitCamera};
use crate::controller::input::{InputProcessor, InputState};
use crate::controller::interaction::InteractionController;
use crate::controller::locomotion::LocomotionController;
use crate::error::{Rejection, RigError};
use crate::model::{BusyGate, CarryableItem, Collidable, Handle, ItemRegistry};
use crate::world::{Animator, CharacterMotor, PhysicsWorld};

/// Longest step a single tick is allowed to integrate
pub const MAX_FRAME_DELTA: f32 = 0.1;

/// Timing of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    /// Scaled game time at the end of this tick, in seconds
    pub now: f32,
    /// Scaled step
    pub delta: f32,
    /// Step before time scaling (camera follow uses this)
    pub unscaled_delta: f32,
}

/// Turns raw wall-clock steps into [`FrameTime`]s.
#[derive(Debug, Clone)]
pub struct FrameClock {
    pub time_scale: f32,
    now: f32,
}

impl FrameClock {
    pub fn new() -> Self { Self { time_scale: 1.0, now: 0.0 } }

    pub fn now(&self) -> f32 { self.now }

    pub fn tick(&mut self, raw_delta: f32) -> FrameTime {
        let unscaled_delta = raw_delta.clamp(0.0, MAX_FRAME_DELTA);
        let delta = unscaled_delta * self.time_scale.max(0.0);
        self.now += delta;
        FrameTime { now: self.now, delta, unscaled_delta }
    }
}

impl Default for FrameClock {
    fn default() -> Self { Self::new() }
}

/// The whole character rig, updated in a fixed order each tick:
/// aim sensor, locomotion, interaction, then the camera's late pass.
pub struct Rig {
    pub processor: InputProcessor,
    aim_sensor: AimSensor,
    locomotion: LocomotionController,
    interaction: InteractionController,
    camera: OrbitCamera,
}

impl Rig {
    /// Builds the rig from `config`. A config that fails validation is
    /// logged and replaced by the defaults.
    pub fn new(config: RigConfig, animator: Option<Box<dyn Animator>>) -> Self {
        let config = match config.validated() {
            Ok(config) => config,
            Err(err) => {
                error!(%err, "invalid rig config, falling back to defaults");
                RigConfig::default()
            }
        };
        let RigConfig { movement, camera, aim, interaction, clips, items } = config;
        let registry: ItemRegistry = items.into_iter().collect();
        info!(items = registry.len(), "rig ready");

        let locomotion = LocomotionController::new(movement, clips.clone(), animator)
            .with_pick_blends(interaction.pick_blend, interaction.pick_exit_blend);
        Self {
            processor: InputProcessor::default(),
            aim_sensor: AimSensor::new(aim),
            locomotion,
            interaction: InteractionController::new(interaction, clips, registry),
            camera: OrbitCamera::new(camera),
        }
    }

    pub fn locomotion(&self) -> &LocomotionController { &self.locomotion }

    pub fn interaction(&self) -> &InteractionController { &self.interaction }

    pub fn camera(&self) -> &OrbitCamera { &self.camera }

    pub fn aim_sensor(&self) -> &AimSensor { &self.aim_sensor }

    pub fn gate(&self) -> BusyGate { self.interaction.gate() }

    pub fn register_item(&mut self, item: CarryableItem) {
        self.interaction.register_item(item);
    }

    pub fn tick(
        &mut self,
        input: &mut InputState,
        time: FrameTime,
        world: &mut dyn PhysicsWorld,
        motor: &mut dyn CharacterMotor,
    ) {
        let frame = self.processor.sample(input);
        trace!(now = time.now, dt = time.delta, "tick");

        let aim = self.aim_sensor.update(self.camera.position(), self.camera.forward(), world);
        self.camera.observe_aim(aim);

        self.locomotion.update(&frame, time.delta, self.interaction.gate(), motor);

        let aim_source: &dyn AimSource = &self.camera;
        self.interaction.update(&frame, time.now, &mut self.locomotion, world, Some(aim_source));

        self.camera.late_update(&frame, &time, motor);
    }

    /// Trigger-volume callback: something touched the character's pickup zone.
    pub fn on_trigger_enter(&mut self, collidable: &Collidable, now: f32, world: &mut dyn PhysicsWorld) -> Result<Handle, RigError> {
        if !collidable.is_carryable() {
            return Err(Rejection::NotCarryable.into());
        }
        let result = self.interaction.try_pickup(collidable.handle, now, world, &mut self.locomotion);
        if let Err(err) = &result {
            debug!(handle = collidable.handle.0, %err, "pickup rejected");
        }
        result
    }

    /// Start the pick animation on request from a trigger-volume handler.
    pub fn play_pick_animation(&mut self, now: f32) -> Result<(), RigError> {
        self.locomotion.play_pick_animation(self.interaction.sequencer_mut(), now)
    }

    pub fn try_get_aim_point(&self) -> (bool, Vec3) {
        self.camera.try_get_aim_point()
    }

    /// Teardown: abandon any running sequence so the gate is never left set.
    pub fn shutdown(&mut self) {
        self.interaction.cancel_sequences();
        info!(held = ?self.interaction.held(), "rig shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClipNames;
    use crate::controller::input::InputEvent;
    use crate::model::{BusyReason, Capabilities, Transform};
    use crate::world::sandbox::{RecordingAnimator, SandboxMotor, SandboxWorld};
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case(0.016, 1.0, 0.016)]
    #[case(0.5, 1.0, 0.1)]
    #[case(-1.0, 1.0, 0.0)]
    #[case(0.02, 0.5, 0.01)]
    fn test_clock_clamps_and_scales(#[case] raw: f32, #[case] scale: f32, #[case] expected: f32) {
        let mut clock = FrameClock { time_scale: scale, ..FrameClock::new() };
        let time = clock.tick(raw);
        assert_relative_eq!(time.delta, expected, epsilon = 1e-6);
        assert_relative_eq!(clock.now(), expected, epsilon = 1e-6);
        assert!(time.unscaled_delta <= MAX_FRAME_DELTA);
    }

    fn rig() -> Rig {
        let animator = RecordingAnimator::with_clips(&ClipNames::default());
        let mut rig = Rig::new(RigConfig::default(), Some(Box::new(animator)));
        rig.register_item(CarryableItem::new("Slipper", Handle(3)));
        rig
    }

    #[test]
    fn test_locomotion_frozen_while_picking() {
        let mut rig = rig();
        let mut world = SandboxWorld::new().with_humanoid_anchors();
        let mut motor = SandboxMotor::new(Vec3::ZERO);
        let mut input = InputState::new();
        let mut clock = FrameClock::new();

        rig.play_pick_animation(0.0).unwrap();
        assert_eq!(rig.gate(), BusyGate::Suspended(BusyReason::PickingUp));

        input.process_event(&InputEvent::KeyDown("w".into()));
        rig.tick(&mut input, clock.tick(0.05), &mut world, &mut motor);
        assert!(motor.moves.is_empty());

        for _ in 0..30 {
            rig.tick(&mut input, clock.tick(0.05), &mut world, &mut motor);
        }
        assert_eq!(rig.gate(), BusyGate::Free);
        assert!(motor.transform().position.z > 0.0);
    }

    #[test]
    fn test_trigger_needs_carryable_capability() {
        let mut rig = rig();
        let mut world = SandboxWorld::new().with_humanoid_anchors();
        world.spawn_object(Handle(3), Transform::IDENTITY);

        let wall = Collidable::new(Handle(3), Capabilities::AIM_TARGET);
        assert_eq!(
            rig.on_trigger_enter(&wall, 0.0, &mut world).unwrap_err().rejection(),
            Some(Rejection::NotCarryable)
        );

        let slipper = Collidable::new(Handle(3), Capabilities::CARRYABLE);
        assert_eq!(rig.on_trigger_enter(&slipper, 0.0, &mut world), Ok(Handle(3)));
        assert_eq!(rig.interaction().held(), Some(Handle(3)));
    }

    #[test]
    fn test_invalid_config_falls_back_to_defaults() {
        let mut config = RigConfig::default();
        config.camera.min_pitch = 60.0;
        config.camera.max_pitch = -60.0;

        let errors = crate::logging::capture::count_errors(|| {
            let animator = RecordingAnimator::with_clips(&ClipNames::default());
            let rig = Rig::new(config, Some(Box::new(animator)));
            let defaults = RigConfig::default();
            assert_eq!(rig.camera().config, defaults.camera);
            assert_eq!(rig.camera().rig().pitch, defaults.camera.initial_pitch);
        });
        assert_eq!(errors, 1);
    }

    #[test]
    fn test_shutdown_frees_gate() {
        let mut rig = rig();
        rig.play_pick_animation(0.0).unwrap();
        rig.shutdown();
        assert_eq!(rig.gate(), BusyGate::Free);
    }
}
