use std::fs;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{CarryableItem, LayerMask};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Everything the rig can be tuned with. Every section falls back to its
/// defaults, so an empty JSON object is a valid config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigConfig {
    pub movement: MovementConfig,
    pub camera: CameraConfig,
    pub aim: AimConfig,
    pub interaction: InteractionConfig,
    pub clips: ClipNames,
    pub items: Vec<CarryableItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub walk_speed: f32,
    pub run_speed: f32,
    pub jump_height: f32,
    pub gravity: f32,
    /// Vertical velocity held while grounded so falls don't accumulate
    pub resting_velocity: f32,
    pub forward_deadzone: f32,
    /// Squared length of the world-space move vector that counts as strafing
    pub strafe_deadzone_sq: f32,
    pub locomotion_blend: f32,
    pub jump_blend: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            walk_speed: 2.0,
            run_speed: 5.0,
            jump_height: 2.0,
            gravity: -9.81,
            resting_velocity: -2.0,
            forward_deadzone: 0.1,
            strafe_deadzone_sq: 0.1,
            locomotion_blend: 0.3,
            jump_blend: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub mouse_sensitivity: f32,
    pub smooth_time: f32,
    pub min_pitch: f32,
    pub max_pitch: f32,
    pub camera_height: f32,
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub zoom_speed: f32,
    pub scroll_threshold: f32,
    pub side_offset: f32,
    /// First-person eye position relative to the follow target
    pub head_offset: Vec3,
    /// Follow target (head pivot) relative to the actor's origin
    pub target_offset: Vec3,
    pub first_person_follow_rate: f32,
    pub third_person_follow_rate: f32,
    pub rotation_speed: f32,
    pub initial_yaw: f32,
    pub initial_pitch: f32,
    pub start_first_person: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            mouse_sensitivity: 3.0,
            smooth_time: 0.05,
            min_pitch: -40.0,
            max_pitch: 75.0,
            camera_height: 1.8,
            distance: 4.0,
            min_distance: 2.0,
            max_distance: 6.0,
            zoom_speed: 2.0,
            scroll_threshold: 0.01,
            side_offset: 0.5,
            head_offset: Vec3::new(0.0, 0.2, 0.0),
            target_offset: Vec3::new(0.0, 1.5, 0.0),
            first_person_follow_rate: 20.0,
            third_person_follow_rate: 10.0,
            rotation_speed: 10.0,
            initial_yaw: 0.0,
            initial_pitch: 0.0,
            start_first_person: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AimConfig {
    pub ray_distance: f32,
    pub layers: LayerMask,
}

impl Default for AimConfig {
    fn default() -> Self {
        Self {
            ray_distance: 100.0,
            layers: LayerMask::ALL,
        }
    }
}

/// How long the throw wind-up waits before the item leaves the hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThrowTiming {
    /// Wait `throw_delay` regardless of the clip
    #[default]
    Fixed,
    /// Wait the throw clip's own length, falling back to `throw_delay`
    ClipLength,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub throw_force: f32,
    pub pickup_cooldown: f32,
    pub throw_delay: f32,
    pub release_buffer: f32,
    pub tumble_speed: f32,
    pub pick_blend: f32,
    pub pick_exit_blend: f32,
    pub throw_blend: f32,
    pub throw_timing: ThrowTiming,
    pub seed: Option<u64>,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            throw_force: 20.0,
            pickup_cooldown: 0.5,
            throw_delay: 0.5,
            release_buffer: 0.2,
            tumble_speed: 5.0,
            pick_blend: 0.1,
            pick_exit_blend: 1.0,
            throw_blend: 0.1,
            throw_timing: ThrowTiming::Fixed,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipNames {
    pub idle: String,
    pub walk: String,
    pub run: String,
    pub walk_backward: String,
    pub jump: String,
    pub pick: String,
    pub throw: String,
}

impl Default for ClipNames {
    fn default() -> Self {
        Self {
            idle: "Idle".to_string(),
            walk: "Walking".to_string(),
            run: "RunningAnimation".to_string(),
            walk_backward: "WalkingBackward".to_string(),
            jump: "Jump".to_string(),
            pick: "Pick Object".to_string(),
            throw: "Throw Object".to_string(),
        }
    }
}

impl RigConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: RigConfig = serde_json::from_str(json)?;
        config.validated()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check ranges and clamp the starting zoom into `[min_distance, max_distance]`.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        let cam = &mut self.camera;
        if cam.min_pitch > cam.max_pitch {
            return Err(ConfigError::Invalid(format!(
                "camera.min_pitch ({}) exceeds camera.max_pitch ({})",
                cam.min_pitch, cam.max_pitch
            )));
        }
        if cam.min_distance > cam.max_distance {
            return Err(ConfigError::Invalid(format!(
                "camera.min_distance ({}) exceeds camera.max_distance ({})",
                cam.min_distance, cam.max_distance
            )));
        }
        cam.distance = cam.distance.clamp(cam.min_distance, cam.max_distance);
        cam.initial_pitch = cam.initial_pitch.clamp(cam.min_pitch, cam.max_pitch);

        if self.movement.gravity >= 0.0 {
            return Err(ConfigError::Invalid("movement.gravity must be negative".into()));
        }

        let non_negative = [
            ("movement.walk_speed", self.movement.walk_speed),
            ("movement.run_speed", self.movement.run_speed),
            ("movement.jump_height", self.movement.jump_height),
            ("aim.ray_distance", self.aim.ray_distance),
            ("interaction.throw_force", self.interaction.throw_force),
            ("interaction.pickup_cooldown", self.interaction.pickup_cooldown),
            ("interaction.throw_delay", self.interaction.throw_delay),
            ("interaction.release_buffer", self.interaction.release_buffer),
        ];
        if let Some((name, value)) = non_negative.iter().find(|(_, v)| !(*v >= 0.0)) {
            return Err(ConfigError::Invalid(format!("{name} must be non-negative, got {value}")));
        }

        for item in &self.items {
            if !(item.mass > 0.0) {
                return Err(ConfigError::Invalid(format!("item '{}' needs a positive mass", item.name)));
            }
        }

        Ok(self)
    }
}
