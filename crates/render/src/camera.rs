use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use voxelview_common::{deg_to_rad, fuzzy_is_null};

/// What happens to the view center when the camera is translated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationMode {
    /// Move the view center along with the camera; the look direction is kept.
    MoveViewCenter,
    /// Leave the view center where it is; the camera turns to keep facing it.
    KeepViewCenterFixed,
}

/// Perspective frustum parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Projection {
    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(deg_to_rad(self.fov_y_degrees), self.aspect, self.near, self.far)
    }
}

/// Look-at camera described by a position, a point it looks at and an up vector.
///
/// The up vector must never be parallel to `view_center - position`; setters do
/// not check this. Translation, pan and tilt keep the up vector orthogonal to
/// the look direction.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    view_center: Vec3,
    up_vector: Vec3,
    projection: Projection,
    projection_matrix: Mat4,
    /// Maximum elevation of the look direction above or below the horizon.
    pitch_limit: Option<f32>,
}

impl Camera {
    pub fn new(position: Vec3, view_center: Vec3, up_vector: Vec3, projection: Projection) -> Self {
        Self {
            position,
            view_center,
            up_vector,
            projection,
            projection_matrix: projection.matrix(),
            pitch_limit: None,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn view_center(&self) -> Vec3 {
        self.view_center
    }

    pub fn up_vector(&self) -> Vec3 {
        self.up_vector
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn set_view_center(&mut self, view_center: Vec3) {
        self.view_center = view_center;
    }

    pub fn set_up_vector(&mut self, up_vector: Vec3) {
        self.up_vector = up_vector;
    }

    pub fn pitch_limit(&self) -> Option<f32> {
        self.pitch_limit
    }

    /// Clamp tilting to `limit` degrees above or below the horizon, or `None`
    /// to let the camera pitch through the poles. A non-finite limit is
    /// treated as `None`.
    pub fn set_pitch_limit(&mut self, limit: Option<f32>) {
        self.pitch_limit = limit.filter(|l| l.is_finite()).map(f32::abs);
    }

    /// Unnormalized vector from the position to the view center.
    pub fn view_vector(&self) -> Vec3 {
        self.view_center - self.position
    }

    pub fn look_direction(&self) -> Vec3 {
        self.view_vector().normalize_or_zero()
    }

    /// Local x axis: `look x up`.
    pub fn right_vector(&self) -> Vec3 {
        self.view_vector().cross(self.up_vector).normalize_or_zero()
    }

    /// Elevation of the look direction above the world horizontal plane, in degrees.
    pub fn pitch_degrees(&self) -> f32 {
        let sin = self.look_direction().dot(Vec3::Y).clamp(-1.0, 1.0);
        sin.asin().to_degrees()
    }

    /// Move by `local` (right, up, forward) expressed in the camera's own axes.
    pub fn translate(&mut self, local: Vec3, mode: TranslationMode) {
        let view = self.view_vector();
        let mut world = Vec3::ZERO;
        if !fuzzy_is_null(local.x) {
            world += local.x * view.cross(self.up_vector).normalize_or_zero();
        }
        if !fuzzy_is_null(local.y) {
            world += local.y * self.up_vector;
        }
        if !fuzzy_is_null(local.z) {
            world += local.z * view.normalize_or_zero();
        }
        if world == Vec3::ZERO {
            return;
        }

        self.position += world;
        if mode == TranslationMode::MoveViewCenter {
            self.view_center += world;
        }

        // Re-derive an up vector orthogonal to the (possibly changed) look vector.
        let view = self.view_vector();
        let x = view.cross(self.up_vector).normalize_or_zero();
        if x != Vec3::ZERO {
            self.up_vector = x.cross(view).normalize();
        }
    }

    /// Rotate the look vector by `angle_degrees` around `axis`, about the position.
    pub fn pan(&mut self, angle_degrees: f32, axis: Vec3) {
        let axis = axis.normalize_or_zero();
        if axis == Vec3::ZERO {
            return;
        }
        let q = Quat::from_axis_angle(axis, deg_to_rad(angle_degrees));
        self.rotate(q);
    }

    /// Pitch the look vector by `angle_degrees` around the camera's right axis.
    /// Positive angles look up.
    pub fn tilt(&mut self, angle_degrees: f32) {
        let mut angle = angle_degrees;
        if let Some(limit) = self.pitch_limit {
            let current = self.pitch_degrees();
            angle = (current + angle).clamp(-limit, limit) - current;
        }
        if fuzzy_is_null(angle) {
            return;
        }
        let right = self.right_vector();
        if right == Vec3::ZERO {
            return;
        }
        let q = Quat::from_axis_angle(right, deg_to_rad(angle));
        self.rotate(q);
    }

    fn rotate(&mut self, q: Quat) {
        let view = q * self.view_vector();
        self.up_vector = q * self.up_vector;
        self.view_center = self.position + view;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.view_center, self.up_vector)
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    pub fn set_perspective_projection(
        &mut self,
        fov_y_degrees: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) {
        self.projection = Projection {
            fov_y_degrees,
            aspect,
            near,
            far,
        };
        self.projection_matrix = self.projection.matrix();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn camera() -> Camera {
        Camera::new(
            Vec3::new(0.0, 10.0, 0.0),
            Vec3::new(1.0, 10.0, 1.0),
            Vec3::Y,
            Projection {
                fov_y_degrees: 25.0,
                aspect: 16.0 / 9.0,
                near: 0.1,
                far: 10240.0,
            },
        )
    }

    #[test]
    fn translate_forward_follows_look_direction() {
        let mut cam = camera();
        let look = cam.look_direction();
        cam.translate(Vec3::new(0.0, 0.0, 10.0), TranslationMode::MoveViewCenter);
        let moved = cam.position() - Vec3::new(0.0, 10.0, 0.0);
        assert!(moved.abs_diff_eq(look * 10.0, EPS));
    }

    #[test]
    fn translate_side_uses_right_axis() {
        let mut cam = camera();
        let right = cam.right_vector();
        cam.translate(Vec3::new(3.0, 0.0, 0.0), TranslationMode::MoveViewCenter);
        let moved = cam.position() - Vec3::new(0.0, 10.0, 0.0);
        assert!(moved.abs_diff_eq(right * 3.0, EPS));
        // Right is horizontal and orthogonal to the look direction.
        assert!(right.dot(cam.look_direction()).abs() < EPS);
        assert!(right.y.abs() < EPS);
    }

    #[test]
    fn translate_vertical_uses_up_vector() {
        let mut cam = camera();
        cam.translate(Vec3::new(0.0, 2.0, 0.0), TranslationMode::MoveViewCenter);
        assert!(cam.position().abs_diff_eq(Vec3::new(0.0, 12.0, 0.0), EPS));
        assert!(cam.view_center().abs_diff_eq(Vec3::new(1.0, 12.0, 1.0), EPS));
    }

    #[test]
    fn move_view_center_preserves_look_vector() {
        let mut cam = camera();
        let before = cam.view_vector();
        for delta in [
            Vec3::new(100.0, -3.0, 7.5),
            Vec3::new(-0.25, 0.0, -900.0),
            Vec3::new(0.0, 55.0, 0.0),
        ] {
            cam.translate(delta, TranslationMode::MoveViewCenter);
            assert!(cam.view_vector().abs_diff_eq(before, 1e-2));
        }
    }

    #[test]
    fn keep_view_center_fixed_turns_towards_it() {
        let mut cam = camera();
        let center = cam.view_center();
        cam.translate(Vec3::new(5.0, 0.0, 0.0), TranslationMode::KeepViewCenterFixed);
        assert_eq!(cam.view_center(), center);
        assert_ne!(cam.position(), Vec3::new(0.0, 10.0, 0.0));
        // Up stays orthogonal to the new look vector.
        assert!(cam.up_vector().dot(cam.look_direction()).abs() < EPS);
        assert!((cam.up_vector().length() - 1.0).abs() < EPS);
    }

    #[test]
    fn pan_rotates_about_world_up() {
        let mut cam = Camera::new(Vec3::ZERO, Vec3::Z, Vec3::Y, camera().projection());
        cam.pan(90.0, Vec3::Y);
        assert!(cam.view_center().abs_diff_eq(Vec3::X, EPS));
        assert!(cam.up_vector().abs_diff_eq(Vec3::Y, EPS));
        assert_eq!(cam.position(), Vec3::ZERO);
    }

    #[test]
    fn pan_keeps_distance_to_view_center() {
        let mut cam = camera();
        let dist = cam.view_vector().length();
        cam.pan(37.0, Vec3::Y);
        assert!((cam.view_vector().length() - dist).abs() < EPS);
    }

    #[test]
    fn tilt_positive_looks_up() {
        let mut cam = Camera::new(Vec3::ZERO, Vec3::Z, Vec3::Y, camera().projection());
        cam.tilt(30.0);
        assert!((cam.pitch_degrees() - 30.0).abs() < 1e-3);
        assert!(cam.up_vector().dot(cam.look_direction()).abs() < EPS);
    }

    #[test]
    fn tilt_is_clamped_with_pitch_limit() {
        let mut cam = camera();
        cam.set_pitch_limit(Some(89.0));
        cam.tilt(80.0);
        cam.tilt(30.0);
        assert!((cam.pitch_degrees() - 89.0).abs() < 1e-2);
        assert!(cam.up_vector().y > 0.0);

        cam.tilt(-400.0);
        assert!((cam.pitch_degrees() + 89.0).abs() < 1e-2);
    }

    #[test]
    fn tilt_without_limit_flips_through_the_pole() {
        let mut cam = camera();
        cam.set_pitch_limit(None);
        cam.tilt(80.0);
        cam.tilt(30.0);
        // Past vertical the camera is upside down.
        assert!(cam.up_vector().y < 0.0);
        assert!((cam.pitch_degrees() - 70.0).abs() < 1e-2);
    }

    #[test]
    fn non_finite_pitch_limit_is_dropped() {
        let mut cam = camera();
        cam.set_pitch_limit(Some(f32::NAN));
        assert_eq!(cam.pitch_limit(), None);
        cam.set_pitch_limit(Some(f32::INFINITY));
        assert_eq!(cam.pitch_limit(), None);
        cam.tilt(10.0);
        assert!((cam.pitch_degrees() - 10.0).abs() < 1e-2);
    }

    #[test]
    fn view_matrix_maps_view_center_onto_negative_z() {
        let cam = camera();
        let p = cam.view_matrix().transform_point3(cam.view_center());
        assert!(p.x.abs() < EPS);
        assert!(p.y.abs() < EPS);
        assert!((p.z + cam.view_vector().length()).abs() < EPS);
    }

    #[test]
    fn perspective_projection_is_stored() {
        let mut cam = camera();
        cam.set_perspective_projection(45.0, 2.0, 0.5, 100.0);
        let p = cam.projection();
        assert_eq!(p.aspect, 2.0);
        assert_eq!(p.fov_y_degrees, 45.0);
        assert_eq!(
            cam.projection_matrix(),
            Mat4::perspective_rh(deg_to_rad(45.0), 2.0, 0.5, 100.0)
        );
    }
}
