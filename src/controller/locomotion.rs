use glam::Vec3;
use tracing::{debug, error};

use crate::config::{ClipNames, MovementConfig};
use crate::controller::animation::AnimationDriver;
use crate::controller::input::FrameInput;
use crate::controller::sequence::{SequenceStep, Sequencer};
use crate::error::RigError;
use crate::model::{ActorMotion, BusyGate, BusyReason, LocomotionState};
use crate::world::{Animator, CharacterMotor};

/// Moves the character (walk/run/jump with gravity) and picks its locomotion clip.
///
/// Does nothing at all while the busy gate is suspended.
pub struct LocomotionController {
    pub config: MovementConfig,
    pub clips: ClipNames,
    pick_blend: f32,
    pick_exit_blend: f32,
    motion: ActorMotion,
    state: LocomotionState,
    animation: AnimationDriver,
}

impl LocomotionController {
    pub fn new(config: MovementConfig, clips: ClipNames, animator: Option<Box<dyn Animator>>) -> Self {
        Self {
            config,
            clips,
            pick_blend: 0.1,
            pick_exit_blend: 1.0,
            motion: ActorMotion::default(),
            state: LocomotionState::Idle,
            animation: AnimationDriver::new(animator, "locomotion"),
        }
    }

    /// Blend times used by the pick animation sequence
    pub fn with_pick_blends(mut self, enter: f32, exit: f32) -> Self {
        self.pick_blend = enter;
        self.pick_exit_blend = exit;
        self
    }

    pub fn motion(&self) -> ActorMotion { self.motion }

    pub fn vertical_velocity(&self) -> f32 { self.motion.vertical_velocity }

    pub fn is_grounded(&self) -> bool { self.motion.grounded }

    pub fn state(&self) -> LocomotionState { self.state }

    pub fn animation(&self) -> &AnimationDriver { &self.animation }

    pub fn animation_mut(&mut self) -> &mut AnimationDriver { &mut self.animation }

    /// Launch speed that peaks exactly at `jump_height`
    pub fn jump_velocity(&self) -> f32 {
        (self.config.jump_height * -2.0 * self.config.gravity).max(0.0).sqrt()
    }

    pub fn clip_for(&self, state: LocomotionState) -> &str {
        match state {
            LocomotionState::Idle => &self.clips.idle,
            LocomotionState::WalkForward | LocomotionState::Strafe => &self.clips.walk,
            LocomotionState::Run => &self.clips.run,
            LocomotionState::WalkBackward => &self.clips.walk_backward,
            LocomotionState::Jump => &self.clips.jump,
        }
    }

    /// Update movement, gravity, jump and clip selection for one tick
    pub fn update(&mut self, input: &FrameInput, dt: f32, gate: BusyGate, motor: &mut dyn CharacterMotor) {
        if gate.is_busy() {
            return;
        }

        self.motion.grounded = motor.is_grounded();
        if self.motion.grounded && self.motion.vertical_velocity < 0.0 {
            self.motion.vertical_velocity = self.config.resting_velocity;
        }

        let basis = motor.transform();
        let move_dir = basis.right() * input.movement.x + basis.forward() * input.movement.y;
        let speed = if input.run { self.config.run_speed } else { self.config.walk_speed };
        motor.move_by(move_dir * speed * dt);

        // Gravity
        self.motion.vertical_velocity += self.config.gravity * dt;
        motor.move_by(Vec3::Y * self.motion.vertical_velocity * dt);

        self.select_clip(input, move_dir);

        if self.motion.grounded && input.jump {
            self.motion.vertical_velocity = self.jump_velocity();
            self.enter(LocomotionState::Jump, self.config.jump_blend);
            debug!(velocity = self.motion.vertical_velocity, "jump");
        }
    }

    fn select_clip(&mut self, input: &FrameInput, move_dir: Vec3) {
        // hold the jump clip until we're back on the ground
        let rising = self.motion.vertical_velocity > 0.0;
        if self.state == LocomotionState::Jump && (rising || !self.motion.grounded) {
            return;
        }
        let deadzone = self.config.forward_deadzone;
        let next = if input.movement.y > deadzone {
            if input.run { LocomotionState::Run } else { LocomotionState::WalkForward }
        } else if input.movement.y < -deadzone {
            LocomotionState::WalkBackward
        } else if move_dir.length_squared() > self.config.strafe_deadzone_sq {
            LocomotionState::Strafe
        } else {
            LocomotionState::Idle
        };
        self.enter(next, self.config.locomotion_blend);
    }

    fn enter(&mut self, state: LocomotionState, blend: f32) {
        self.state = state;
        let clip = self.clip_for(state).to_string();
        self.animation.play(&clip, blend);
    }

    /// Start the pick animation: suspend locomotion, play the pick clip from a
    /// stopped state and schedule the resume for when the clip has played out.
    ///
    /// A missing clip resumes right away; the gate is never left suspended.
    pub fn play_pick_animation(&mut self, sequencer: &mut Sequencer, now: f32) -> Result<(), RigError> {
        if !self.animation.is_bound() {
            debug!("no animation target bound, pick animation skipped");
            return Err(RigError::ConfigurationMissing("locomotion"));
        }
        sequencer.begin(BusyReason::PickingUp)?;
        debug!("playing pick animation");

        self.animation.stop();
        let pick = self.clips.pick.clone();
        self.animation.play(&pick, self.pick_blend);

        match self.animation.clip_length(&pick) {
            Some(length) => {
                sequencer.schedule(now + length, SequenceStep::PickupFinished);
                Ok(())
            }
            None => {
                error!(clip = %pick, "animation clip not found");
                sequencer.release();
                Err(RigError::AssetMissing(pick))
            }
        }
    }

    /// Back to idle once the pick clip has played out (the gate is already free).
    pub fn finish_pick_animation(&mut self) {
        self.state = LocomotionState::Idle;
        let idle = self.clips.idle.clone();
        self.animation.play(&idle, self.pick_exit_blend);
    }
}
