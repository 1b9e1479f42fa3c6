use crate::camera::{Camera, Projection, TranslationMode};
use crate::uniforms::{names, UniformValue};
use glam::{Mat3, Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use voxelview_common::{fuzzy_is_null, normal_matrix, viewport_matrix, Velocity, ViewportSize};

/// Errors from validating a [`SceneConfig`].
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("up vector is parallel to the look direction")]
    DegenerateOrientation,
    #[error("view center coincides with the camera position")]
    EmptyLookVector,
    #[error("invalid clip planes: near={near}, far={far}")]
    ClipPlanes { near: f32, far: f32 },
    #[error("field of view must be within (0, 180) degrees, got {0}")]
    FieldOfView(f32),
    #[error("meters-to-units factor must be finite and positive, got {0}")]
    MetersToUnits(f32),
    #[error("pitch limit must be within (0, 90] degrees, got {0}")]
    PitchLimit(f32),
}

/// Initial camera placement and simulation constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub position: Vec3,
    pub view_center: Vec3,
    pub up_vector: Vec3,
    /// World units per meter of camera travel.
    pub meters_to_units: f32,
    pub fov_y_degrees: f32,
    pub near_plane: f32,
    pub far_plane: f32,
    /// Clamp on look elevation in degrees; `None` allows pitching over the poles.
    pub pitch_limit_degrees: Option<f32>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        let height = 10.0;
        Self {
            position: Vec3::new(0.0, height, 0.0),
            view_center: Vec3::new(1.0, height, 1.0),
            up_vector: Vec3::Y,
            meters_to_units: 0.5,
            fov_y_degrees: 25.0,
            near_plane: 0.1,
            far_plane: 10240.0,
            pitch_limit_degrees: Some(89.0),
        }
    }
}

impl SceneConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let look = self.view_center - self.position;
        if look.length_squared() <= f32::EPSILON {
            return Err(ConfigError::EmptyLookVector);
        }
        if look.cross(self.up_vector).length_squared() <= f32::EPSILON {
            return Err(ConfigError::DegenerateOrientation);
        }
        if !(self.near_plane > 0.0 && self.far_plane > self.near_plane) {
            return Err(ConfigError::ClipPlanes {
                near: self.near_plane,
                far: self.far_plane,
            });
        }
        if !(self.fov_y_degrees > 0.0 && self.fov_y_degrees < 180.0) {
            return Err(ConfigError::FieldOfView(self.fov_y_degrees));
        }
        if !(self.meters_to_units.is_finite() && self.meters_to_units > 0.0) {
            return Err(ConfigError::MetersToUnits(self.meters_to_units));
        }
        if let Some(limit) = self.pitch_limit_degrees {
            if !(limit > 0.0 && limit <= 90.0) {
                return Err(ConfigError::PitchLimit(limit));
            }
        }
        Ok(())
    }
}

/// Pan and tilt deltas collected between two updates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PendingRotation {
    pub pan_degrees: f32,
    pub tilt_degrees: f32,
}

/// Matrices uploaded for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMatrices {
    pub model: Mat4,
    pub model_view: Mat4,
    pub world_normal: Mat3,
    pub normal: Mat3,
    pub mvp: Mat4,
    pub inverse_mvp: Mat4,
}

impl FrameMatrices {
    pub fn uniforms(&self) -> [(&'static str, UniformValue); 6] {
        [
            (names::MODEL_MATRIX, self.model.into()),
            (names::MODEL_VIEW_MATRIX, self.model_view.into()),
            (names::WORLD_NORMAL_MATRIX, self.world_normal.into()),
            (names::NORMAL_MATRIX, self.normal.into()),
            (names::MVP, self.mvp.into()),
            (names::INVERSE_MVP, self.inverse_mvp.into()),
        ]
    }
}

/// Camera simulation and transform state of the scene, independent of any GPU.
///
/// Control setters only record state; [`SceneState::update`] integrates it.
/// All methods must be called from the thread that owns the scene.
#[derive(Debug, Clone)]
pub struct SceneState {
    camera: Camera,
    velocity: Velocity,
    view_center_fixed: bool,
    pending: PendingRotation,
    model_matrix: Mat4,
    viewport_matrix: Mat4,
    viewport_size: ViewportSize,
    last_time: f32,
    meters_to_units: f32,
    config: SceneConfig,
    frames: u64,
}

impl SceneState {
    pub fn new(config: SceneConfig) -> Self {
        let viewport_size = ViewportSize::default();
        let mut camera = Camera::new(
            config.position,
            config.view_center,
            config.up_vector,
            Projection {
                fov_y_degrees: config.fov_y_degrees,
                aspect: viewport_size.aspect().unwrap_or(1.0),
                near: config.near_plane,
                far: config.far_plane,
            },
        );
        camera.set_pitch_limit(config.pitch_limit_degrees);

        Self {
            camera,
            velocity: Velocity::ZERO,
            view_center_fixed: false,
            pending: PendingRotation::default(),
            model_matrix: Mat4::IDENTITY,
            viewport_matrix: viewport_matrix(
                viewport_size.width as f32,
                viewport_size.height as f32,
            ),
            viewport_size,
            last_time: 0.0,
            meters_to_units: config.meters_to_units,
            config,
            frames: 0,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn velocity(&self) -> Velocity {
        self.velocity
    }

    pub fn pending_rotation(&self) -> PendingRotation {
        self.pending
    }

    pub fn is_view_center_fixed(&self) -> bool {
        self.view_center_fixed
    }

    pub fn model_matrix(&self) -> Mat4 {
        self.model_matrix
    }

    pub fn viewport_matrix(&self) -> Mat4 {
        self.viewport_matrix
    }

    pub fn viewport_size(&self) -> ViewportSize {
        self.viewport_size
    }

    pub fn last_time(&self) -> f32 {
        self.last_time
    }

    pub fn meters_to_units(&self) -> f32 {
        self.meters_to_units
    }

    /// Number of completed updates.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn set_side_speed(&mut self, vx: f32) {
        self.velocity.side = vx;
    }

    pub fn set_vertical_speed(&mut self, vy: f32) {
        self.velocity.vertical = vy;
    }

    pub fn set_forward_speed(&mut self, vz: f32) {
        self.velocity.forward = vz;
    }

    pub fn set_view_center_fixed(&mut self, fixed: bool) {
        self.view_center_fixed = fixed;
    }

    /// Stage a yaw delta in degrees for the next update.
    pub fn pan(&mut self, angle: f32) {
        self.pending.pan_degrees += angle;
    }

    /// Stage a pitch delta in degrees for the next update.
    pub fn tilt(&mut self, angle: f32) {
        self.pending.tilt_degrees += angle;
    }

    /// Advance the simulation to `t` seconds since the clock baseline.
    pub fn update(&mut self, t: f32) {
        self.model_matrix = Mat4::IDENTITY;

        let mut dt = t - self.last_time;
        debug_assert!(dt >= 0.0, "scene time went backwards: dt={dt}");
        if dt < 0.0 {
            tracing::warn!(t, last = self.last_time, "scene time went backwards, holding position");
            dt = 0.0;
        }
        self.last_time = t;

        let mode = if self.view_center_fixed {
            TranslationMode::KeepViewCenterFixed
        } else {
            TranslationMode::MoveViewCenter
        };
        let delta = self.velocity.as_local() * dt * self.meters_to_units;
        self.camera.translate(delta, mode);

        if !fuzzy_is_null(self.pending.pan_degrees) {
            self.camera.pan(self.pending.pan_degrees, Vec3::Y);
        }
        self.pending.pan_degrees = 0.0;

        if !fuzzy_is_null(self.pending.tilt_degrees) {
            self.camera.tilt(self.pending.tilt_degrees);
        }
        self.pending.tilt_degrees = 0.0;

        self.frames += 1;
        tracing::trace!(
            t,
            dt,
            position = ?self.camera.position(),
            view_center = ?self.camera.view_center(),
            "scene updated"
        );
    }

    /// Adopt a new surface size. Returns `false` and changes nothing if either
    /// dimension is zero.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        let size = ViewportSize::new(width, height);
        let Some(aspect) = size.aspect() else {
            tracing::debug!(width, height, "ignoring degenerate resize");
            return false;
        };
        self.viewport_size = size;
        self.camera.set_perspective_projection(
            self.config.fov_y_degrees,
            aspect,
            self.config.near_plane,
            self.config.far_plane,
        );
        self.viewport_matrix = viewport_matrix(width as f32, height as f32);
        tracing::debug!(width, height, aspect, "viewport resized");
        true
    }

    pub fn frame_matrices(&self) -> FrameMatrices {
        let view = self.camera.view_matrix();
        let model_view = view * self.model_matrix;
        let mvp = self.camera.projection_matrix() * model_view;
        FrameMatrices {
            model: self.model_matrix,
            model_view,
            world_normal: normal_matrix(&self.model_matrix),
            normal: normal_matrix(&model_view),
            mvp,
            inverse_mvp: mvp.inverse(),
        }
    }

    pub fn viewport_uniforms(&self) -> [(&'static str, UniformValue); 2] {
        let size = Vec2::new(
            self.viewport_size.width as f32,
            self.viewport_size.height as f32,
        );
        [
            (names::VIEWPORT_SIZE, size.into()),
            (names::VIEWPORT_MATRIX, self.viewport_matrix.into()),
        ]
    }
}

impl Default for SceneState {
    fn default() -> Self {
        Self::new(SceneConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    fn unclamped() -> SceneState {
        SceneState::new(SceneConfig {
            pitch_limit_degrees: None,
            ..SceneConfig::default()
        })
    }

    #[test]
    fn default_config_is_valid() {
        assert_eq!(SceneConfig::default().validate(), Ok(()));
    }

    #[test]
    fn config_rejects_parallel_up_vector() {
        let config = SceneConfig {
            view_center: Vec3::new(0.0, 20.0, 0.0),
            ..SceneConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::DegenerateOrientation));
    }

    #[test]
    fn config_rejects_bad_planes_and_fov() {
        let planes = SceneConfig {
            near_plane: 10.0,
            far_plane: 1.0,
            ..SceneConfig::default()
        };
        assert!(matches!(planes.validate(), Err(ConfigError::ClipPlanes { .. })));
        let fov = SceneConfig {
            fov_y_degrees: 0.0,
            ..SceneConfig::default()
        };
        assert_eq!(fov.validate(), Err(ConfigError::FieldOfView(0.0)));
    }

    #[test]
    fn config_rejects_pitch_limit_outside_quarter_turn() {
        for limit in [f32::NAN, f32::INFINITY, 0.0, -10.0, 90.5] {
            let config = SceneConfig {
                pitch_limit_degrees: Some(limit),
                ..SceneConfig::default()
            };
            assert!(matches!(config.validate(), Err(ConfigError::PitchLimit(_))));
        }
        let vertical = SceneConfig {
            pitch_limit_degrees: Some(90.0),
            ..SceneConfig::default()
        };
        assert_eq!(vertical.validate(), Ok(()));
    }

    #[test]
    fn nan_pitch_limit_does_not_break_tilt() {
        let mut scene = SceneState::new(SceneConfig {
            pitch_limit_degrees: Some(f32::NAN),
            ..SceneConfig::default()
        });
        scene.tilt(5.0);
        scene.update(0.016);
        assert!((scene.camera().pitch_degrees() - 5.0).abs() < EPS);
    }

    #[test]
    fn forward_flight_scenario() {
        let mut scene = SceneState::default();
        scene.set_forward_speed(44.7);
        scene.update(1.0);

        let moved = scene.camera().position() - Vec3::new(0.0, 10.0, 0.0);
        let look = Vec3::new(1.0, 0.0, 1.0).normalize();
        assert!((moved.length() - 22.35).abs() < EPS);
        assert!(moved.abs_diff_eq(look * 22.35, EPS));
        // Not world Z.
        assert!(moved.x > 15.0);
    }

    #[test]
    fn displacement_is_velocity_times_dt_times_scale() {
        let mut scene = SceneState::default();
        scene.set_side_speed(2.0);
        scene.set_vertical_speed(-4.0);
        scene.set_forward_speed(8.0);
        let cam = scene.camera().clone();
        let expected = cam.right_vector() * 2.0 * 0.25 * 0.5
            + cam.up_vector() * -4.0 * 0.25 * 0.5
            + cam.look_direction() * 8.0 * 0.25 * 0.5;

        scene.update(0.25);
        let moved = scene.camera().position() - cam.position();
        assert!(moved.abs_diff_eq(expected, EPS));
        let center_moved = scene.camera().view_center() - cam.view_center();
        assert!(center_moved.abs_diff_eq(expected, EPS));
    }

    #[test]
    fn fixed_view_center_stays_put() {
        let mut scene = SceneState::default();
        scene.set_view_center_fixed(true);
        scene.set_side_speed(44.7);
        scene.update(0.5);
        assert_eq!(scene.camera().view_center(), Vec3::new(1.0, 10.0, 1.0));
        assert_ne!(scene.camera().position(), Vec3::new(0.0, 10.0, 0.0));
    }

    #[test]
    fn zero_dt_does_not_move() {
        let mut scene = SceneState::default();
        scene.set_forward_speed(44.7);
        scene.update(0.0);
        assert_eq!(scene.camera().position(), Vec3::new(0.0, 10.0, 0.0));
    }

    #[test]
    fn dt_is_measured_from_last_update() {
        let mut scene = SceneState::default();
        scene.update(2.0);
        scene.set_forward_speed(10.0);
        let before = scene.camera().position();
        scene.update(3.0);
        let moved = scene.camera().position() - before;
        assert!((moved.length() - 5.0).abs() < EPS);
        assert_eq!(scene.last_time(), 3.0);
    }

    #[test]
    fn speed_setters_overwrite() {
        let mut scene = SceneState::default();
        scene.set_forward_speed(44.7);
        scene.set_forward_speed(-44.7);
        scene.set_forward_speed(0.0);
        assert!(scene.velocity().is_zero());
    }

    #[test]
    fn staged_rotation_accumulates_and_resets() {
        let mut scene = SceneState::default();
        scene.pan(10.0);
        scene.pan(5.0);
        scene.tilt(3.0);
        scene.tilt(-1.0);
        assert_eq!(scene.pending_rotation().pan_degrees, 15.0);
        assert_eq!(scene.pending_rotation().tilt_degrees, 2.0);
        scene.update(0.016);
        assert_eq!(scene.pending_rotation(), PendingRotation::default());
    }

    #[test]
    fn pan_scenario_rotates_once() {
        let mut scene = unclamped();
        let position = scene.camera().position();
        let look = scene.camera().view_vector();
        scene.pan(30.0);
        scene.update(0.016);

        let expected = glam::Quat::from_rotation_y(30.0_f32.to_radians()) * look;
        assert!(scene.camera().view_vector().abs_diff_eq(expected, EPS));
        assert_eq!(scene.camera().position(), position);

        let center = scene.camera().view_center();
        scene.update(0.032);
        assert_eq!(scene.camera().view_center(), center);
    }

    #[test]
    fn near_zero_rotation_is_skipped() {
        let mut scene = SceneState::default();
        let up = scene.camera().up_vector();
        let center = scene.camera().view_center();
        scene.pan(1e-7);
        scene.tilt(-1e-7);
        scene.update(0.0);
        assert_eq!(scene.camera().view_center(), center);
        assert_eq!(scene.camera().up_vector(), up);
        assert_eq!(scene.pending_rotation(), PendingRotation::default());
    }

    #[test]
    fn resize_sets_aspect_and_viewport() {
        let mut scene = SceneState::default();
        assert!(scene.resize(1920, 1080));
        assert!((scene.camera().projection().aspect - 1920.0 / 1080.0).abs() < 1e-6);
        assert_eq!(scene.viewport_size(), ViewportSize::new(1920, 1080));
        assert_eq!(scene.viewport_matrix(), viewport_matrix(1920.0, 1080.0));
    }

    #[test]
    fn degenerate_resize_keeps_previous_state() {
        let mut scene = SceneState::default();
        scene.resize(800, 600);
        let projection = scene.camera().projection_matrix();
        assert!(!scene.resize(800, 0));
        assert!(!scene.resize(0, 600));
        assert_eq!(scene.camera().projection_matrix(), projection);
        assert_eq!(scene.viewport_size(), ViewportSize::new(800, 600));
    }

    #[test]
    fn frame_matrices_compose_in_order() {
        let mut scene = SceneState::default();
        scene.resize(800, 600);
        scene.update(0.0);
        let m = scene.frame_matrices();
        let view = scene.camera().view_matrix();
        let proj = scene.camera().projection_matrix();
        assert_eq!(m.model, Mat4::IDENTITY);
        assert_eq!(m.model_view, view);
        assert_eq!(m.mvp, proj * view);
        assert_eq!(m.world_normal, Mat3::IDENTITY);
        assert!((m.inverse_mvp * m.mvp).abs_diff_eq(Mat4::IDENTITY, 1e-3));
        // The view matrix is a rigid transform so its normal matrix is its rotation.
        assert!(m.normal.abs_diff_eq(Mat3::from_mat4(view), 1e-5));
    }

    #[test]
    fn model_matrix_reset_every_update() {
        let mut scene = SceneState::default();
        scene.update(0.1);
        assert_eq!(scene.model_matrix(), Mat4::IDENTITY);
        assert_eq!(scene.frames(), 1);
    }

    #[test]
    fn viewport_uniforms_report_size() {
        let mut scene = SceneState::default();
        scene.resize(640, 480);
        let [(size_name, size), (matrix_name, _)] = scene.viewport_uniforms();
        assert_eq!(size_name, names::VIEWPORT_SIZE);
        assert_eq!(matrix_name, names::VIEWPORT_MATRIX);
        assert_eq!(size, UniformValue::Vec2(Vec2::new(640.0, 480.0)));
    }
}
