use glam::Vec3;
use crate::model::Handle;

/// Result of the camera's forward ray for one tick.
///
/// `point` is always usable: on a miss it is the far end of the ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimState {
    pub target: Option<Handle>,
    pub point: Vec3,
}

impl AimState {
    pub fn miss(origin: Vec3, direction: Vec3, max_distance: f32) -> Self {
        Self {
            target: None,
            point: origin + direction * max_distance,
        }
    }

    pub fn hit(target: Handle, point: Vec3) -> Self {
        Self { target: Some(target), point }
    }

    pub fn has_target(&self) -> bool { self.target.is_some() }
}

impl Default for AimState {
    fn default() -> Self {
        Self { target: None, point: Vec3::ZERO }
    }
}
