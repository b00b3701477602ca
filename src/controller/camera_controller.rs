use glam::{Quat, Vec3};
use tracing::debug;

use crate::config::CameraConfig;
use crate::controller::frame_loop::FrameTime;
use crate::controller::input::FrameInput;
use crate::model::{AimState, CameraRig, CursorMode, ViewMode};
use crate::utils::{exp_blend, smooth_damp_angle, yaw_look_rotation};
use crate::world::CharacterMotor;

/// Smoothing times below this would make the spring blow up
const MIN_SMOOTH_TIME: f32 = 0.01;
/// Horizontal distance under which the body won't turn toward the aim point
const MIN_FACING_DISTANCE_SQ: f32 = 0.001;

/// Clamp that never panics: an inverted range settles on `max`
fn bounded(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max)
}

/// Anything that can tell where the player is aiming.
pub trait AimSource {
    /// `(has_target, point)`. The point is valid even without a target.
    fn try_get_aim_point(&self) -> (bool, Vec3);
}

/// Third/first-person orbit camera that also turns the character toward the aim.
pub struct OrbitCamera {
    pub config: CameraConfig,
    rig: CameraRig,
    cursor: CursorMode,
    aim: AimState,
    placed: bool,
}

impl OrbitCamera {
    pub fn new(config: CameraConfig) -> Self {
        let view_mode = if config.start_first_person { ViewMode::FirstPerson } else { ViewMode::ThirdPerson };
        let pitch = bounded(config.initial_pitch, config.min_pitch, config.max_pitch);
        let distance = bounded(config.distance, config.min_distance, config.max_distance);
        let rig = CameraRig::new(config.initial_yaw, pitch, distance, view_mode);
        debug!("cursor locked");
        Self {
            config,
            rig,
            cursor: CursorMode::Locked,
            aim: AimState::default(),
            placed: false,
        }
    }

    pub fn rig(&self) -> &CameraRig { &self.rig }

    pub fn cursor(&self) -> CursorMode { self.cursor }

    pub fn view_mode(&self) -> ViewMode { self.rig.view_mode }

    pub fn position(&self) -> Vec3 { self.rig.eye }

    pub fn rotation(&self) -> Quat { self.rig.rotation() }

    pub fn forward(&self) -> Vec3 { self.rig.forward() }

    /// Take this tick's aim result from the sensor.
    pub fn observe_aim(&mut self, aim: AimState) {
        self.aim = aim;
    }

    pub fn handle_input(&mut self, input: &FrameInput) {
        if input.toggle_view {
            self.rig.view_mode = self.rig.view_mode.toggled();
            debug!(mode = ?self.rig.view_mode, "view toggled");
        }
        if input.toggle_cursor {
            self.cursor = match self.cursor {
                CursorMode::Locked => CursorMode::Free,
                CursorMode::Free => CursorMode::Locked,
            };
            debug!(cursor = ?self.cursor, "cursor toggled");
        }
        self.apply_look(input.look.x, input.look.y);
        self.apply_zoom(input.scroll);
    }

    /// Apply mouse look delta (screen convention, y down) to the raw angles
    pub fn apply_look(&mut self, dx: f32, dy: f32) {
        let sensitivity = self.config.mouse_sensitivity;
        self.rig.yaw += dx * sensitivity;
        self.rig.pitch = bounded(self.rig.pitch + dy * sensitivity, self.config.min_pitch, self.config.max_pitch);
    }

    pub fn apply_zoom(&mut self, scroll: f32) {
        if scroll.abs() <= self.config.scroll_threshold {
            return;
        }
        let distance = self.rig.distance - scroll * self.config.zoom_speed;
        self.rig.distance = bounded(distance, self.config.min_distance, self.config.max_distance);
    }

    /// Smooth the angles and move the eye toward where it should be for `target`.
    /// Uses unscaled time so the follow feels the same at any time scale.
    pub fn update_position(&mut self, target: Vec3, unscaled_dt: f32) {
        let smooth_time = self.config.smooth_time.max(MIN_SMOOTH_TIME);
        let rig = &mut self.rig;
        rig.smoothed_yaw = smooth_damp_angle(rig.smoothed_yaw, rig.yaw, &mut rig.yaw_velocity, smooth_time, unscaled_dt);
        rig.smoothed_pitch = smooth_damp_angle(rig.smoothed_pitch, rig.pitch, &mut rig.pitch_velocity, smooth_time, unscaled_dt);

        let (desired, rate) = match rig.view_mode {
            ViewMode::FirstPerson => (target + self.config.head_offset, self.config.first_person_follow_rate),
            ViewMode::ThirdPerson => {
                let offset = rig.rotation() * Vec3::new(self.config.side_offset, self.config.camera_height, -rig.distance);
                (target + offset, self.config.third_person_follow_rate)
            }
        };

        if !self.placed {
            rig.eye = desired;
            self.placed = true;
        } else {
            rig.eye = rig.eye.lerp(desired, exp_blend(rate, unscaled_dt));
        }
    }

    /// Turn the body while the rotate input is held: toward the aim point when
    /// the sensor has a target, otherwise toward the camera's yaw.
    pub fn rotate_character(&self, motor: &mut dyn CharacterMotor, rotate_held: bool, dt: f32) {
        if !rotate_held {
            return;
        }
        let body = motor.transform();
        let t = (self.config.rotation_speed * dt).clamp(0.0, 1.0);

        if self.aim.has_target() {
            if let Some(look) = yaw_look_rotation(self.aim.point - body.position, MIN_FACING_DISTANCE_SQ) {
                motor.set_rotation(body.rotation.slerp(look, t));
                return;
            }
        }
        motor.set_rotation(body.rotation.slerp(self.rig.yaw_rotation(), t));
    }

    /// Late pass: runs after movement so the camera never lags the body by a frame.
    pub fn late_update(&mut self, input: &FrameInput, time: &FrameTime, motor: &mut dyn CharacterMotor) {
        self.handle_input(input);
        let target = motor.transform().position + self.config.target_offset;
        self.update_position(target, time.unscaled_delta);
        self.rotate_character(motor, input.rotate, time.delta);
    }
}

impl AimSource for OrbitCamera {
    fn try_get_aim_point(&self) -> (bool, Vec3) {
        (self.aim.has_target(), self.aim.point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Handle;
    use crate::world::sandbox::SandboxMotor;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn camera() -> OrbitCamera { OrbitCamera::new(CameraConfig::default()) }

    #[rstest]
    #[case(1000.0)]
    #[case(-1000.0)]
    #[case(3.0)]
    fn test_pitch_stays_in_range(#[case] dy: f32) {
        let mut cam = camera();
        for _ in 0..10 {
            cam.apply_look(0.0, dy);
            assert!(cam.rig().pitch >= cam.config.min_pitch && cam.rig().pitch <= cam.config.max_pitch);
        }
    }

    #[rstest]
    #[case(100.0, 2.0)]
    #[case(-100.0, 6.0)]
    fn test_zoom_clamped(#[case] scroll: f32, #[case] expected: f32) {
        let mut cam = camera();
        cam.apply_zoom(scroll);
        assert_eq!(cam.rig().distance, expected);
    }

    #[test]
    fn test_inverted_ranges_do_not_panic() {
        let config = CameraConfig { min_pitch: 30.0, max_pitch: -30.0, min_distance: 5.0, max_distance: 1.0, ..Default::default() };
        let mut cam = OrbitCamera::new(config);
        assert_eq!(cam.rig().pitch, -30.0);
        assert_eq!(cam.rig().distance, 1.0);

        cam.apply_look(0.0, 50.0);
        cam.apply_zoom(-3.0);
        assert_eq!(cam.rig().pitch, -30.0);
        assert_eq!(cam.rig().distance, 1.0);
    }

    #[test]
    fn test_tiny_scroll_ignored() {
        let mut cam = camera();
        cam.apply_zoom(0.005);
        assert_eq!(cam.rig().distance, 4.0);
        cam.apply_zoom(0.5);
        assert_eq!(cam.rig().distance, 3.0);
    }

    #[test]
    fn test_toggle_view_on_edge() {
        let mut cam = camera();
        let input = FrameInput { toggle_view: true, ..Default::default() };
        cam.handle_input(&input);
        assert_eq!(cam.view_mode(), ViewMode::FirstPerson);
        cam.handle_input(&FrameInput::default());
        assert_eq!(cam.view_mode(), ViewMode::FirstPerson);
    }

    #[test]
    fn test_third_person_offset_behind_target() {
        let mut cam = camera();
        cam.update_position(Vec3::ZERO, 1.0 / 60.0);
        // first placement snaps
        let eye = cam.position();
        assert_relative_eq!(eye.x, 0.5, epsilon = 1e-4);
        assert_relative_eq!(eye.y, 1.8, epsilon = 1e-4);
        assert_relative_eq!(eye.z, -4.0, epsilon = 1e-4);
    }

    #[test]
    fn test_first_person_follow_converges() {
        let mut cam = OrbitCamera::new(CameraConfig { start_first_person: true, ..Default::default() });
        cam.update_position(Vec3::ZERO, 1.0 / 60.0);
        let target = Vec3::new(10.0, 0.0, 0.0);
        for _ in 0..120 {
            cam.update_position(target, 1.0 / 60.0);
        }
        assert_relative_eq!(cam.position().x, 10.0, epsilon = 1e-3);
        assert_relative_eq!(cam.position().y, 0.2, epsilon = 1e-3);
    }

    #[test]
    fn test_zero_smooth_time_stays_finite() {
        let mut cam = OrbitCamera::new(CameraConfig { smooth_time: 0.0, ..Default::default() });
        cam.apply_look(30.0, 5.0);
        for _ in 0..10 {
            cam.update_position(Vec3::ZERO, 1.0 / 60.0);
        }
        assert!(cam.rig().smoothed_yaw.is_finite());
        assert!(cam.position().is_finite());
    }

    #[test]
    fn test_rotation_toward_aim_target_ignores_height() {
        let mut cam = camera();
        cam.observe_aim(AimState::hit(Handle(3), Vec3::new(10.0, 8.0, 0.0)));
        let mut motor = SandboxMotor::new(Vec3::ZERO);
        for _ in 0..200 {
            cam.rotate_character(&mut motor, true, 1.0 / 60.0);
        }
        let fwd = motor.transform().forward();
        assert_relative_eq!(fwd.x, 1.0, epsilon = 1e-3);
        assert_relative_eq!(fwd.y, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_rotation_toward_camera_yaw_without_target() {
        let mut cam = camera();
        cam.apply_look(-30.0, 0.0); // yaw -90
        let mut motor = SandboxMotor::new(Vec3::ZERO);
        for _ in 0..200 {
            cam.rotate_character(&mut motor, true, 1.0 / 60.0);
        }
        assert_relative_eq!(motor.transform().forward().x, -1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_released_rotate_holds_orientation() {
        let mut cam = camera();
        cam.apply_look(30.0, 0.0);
        let mut motor = SandboxMotor::new(Vec3::ZERO);
        let before = motor.transform().rotation;
        cam.rotate_character(&mut motor, false, 1.0 / 60.0);
        assert_eq!(motor.transform().rotation, before);
    }

    #[test]
    fn test_aim_point_reported_on_miss() {
        let mut cam = camera();
        cam.observe_aim(AimState::miss(Vec3::ZERO, Vec3::Z, 100.0));
        let (has_target, point) = cam.try_get_aim_point();
        assert!(!has_target);
        assert_eq!(point, Vec3::new(0.0, 0.0, 100.0));
    }
}
