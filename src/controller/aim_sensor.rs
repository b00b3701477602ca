use glam::Vec3;
use tracing::trace;

use crate::config::AimConfig;
use crate::model::AimState;
use crate::world::PhysicsWorld;

/// Casts the camera's forward ray once per tick and caches the result.
pub struct AimSensor {
    pub config: AimConfig,
    last: AimState,
}

impl AimSensor {
    pub fn new(config: AimConfig) -> Self {
        Self { config, last: AimState::default() }
    }

    /// Recompute the aim from the camera's eye and forward axis.
    pub fn update(&mut self, origin: Vec3, forward: Vec3, world: &dyn PhysicsWorld) -> AimState {
        let direction = forward.normalize_or_zero();
        let max = self.config.ray_distance;
        self.last = match world.raycast(origin, direction, max, self.config.layers) {
            Some(hit) => {
                trace!(?origin, point = ?hit.point, target = hit.target.0, "aim hit");
                AimState::hit(hit.target, hit.point)
            }
            None => {
                let miss = AimState::miss(origin, direction, max);
                trace!(?origin, point = ?miss.point, "aim miss");
                miss
            }
        };
        self.last
    }

    /// Last computed aim; cheap to read any number of times per tick.
    pub fn current(&self) -> &AimState { &self.last }
}
