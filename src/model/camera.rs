use glam::{EulerRot, Quat, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    ThirdPerson,
    FirstPerson,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::ThirdPerson => ViewMode::FirstPerson,
            ViewMode::FirstPerson => ViewMode::ThirdPerson,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorMode {
    #[default]
    Locked,
    Free,
}

/// Orbit camera state. Angles are in degrees; positive pitch looks down.
///
/// `yaw`/`pitch` are the raw input-driven targets, the `smoothed_*` pair is
/// what the camera actually renders with.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraRig {
    pub yaw: f32,
    pub pitch: f32,
    pub smoothed_yaw: f32,
    pub smoothed_pitch: f32,
    pub yaw_velocity: f32,
    pub pitch_velocity: f32,
    pub distance: f32,
    pub view_mode: ViewMode,
    pub eye: Vec3,
}

impl CameraRig {
    pub fn new(yaw: f32, pitch: f32, distance: f32, view_mode: ViewMode) -> Self {
        Self {
            yaw,
            pitch,
            smoothed_yaw: yaw,
            smoothed_pitch: pitch,
            yaw_velocity: 0.0,
            pitch_velocity: 0.0,
            distance,
            view_mode,
            eye: Vec3::ZERO,
        }
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::YXZ,
            self.smoothed_yaw.to_radians(),
            self.smoothed_pitch.to_radians(),
            0.0,
        )
    }

    pub fn forward(&self) -> Vec3 { self.rotation() * Vec3::Z }

    /// Yaw-only rotation from the raw (unsmoothed) yaw
    pub fn yaw_rotation(&self) -> Quat { Quat::from_rotation_y(self.yaw.to_radians()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_pitch_looks_down() {
        let rig = CameraRig::new(0.0, 30.0, 4.0, ViewMode::ThirdPerson);
        assert!(rig.forward().y < 0.0);
        assert!(rig.forward().z > 0.0);
    }

    #[test]
    fn test_view_toggle() {
        assert_eq!(ViewMode::ThirdPerson.toggled(), ViewMode::FirstPerson);
        assert_eq!(ViewMode::FirstPerson.toggled().toggled(), ViewMode::FirstPerson);
    }
}
