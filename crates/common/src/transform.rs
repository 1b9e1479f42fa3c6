//! Stateless matrix helpers for the per-frame transform pipeline.

use glam::{Mat3, Mat4, Vec4};

/// Degrees to radians.
pub const DEG_TO_RAD: f32 = std::f32::consts::PI / 180.0;

/// Threshold under which an angle or determinant counts as zero.
pub const FUZZY_EPSILON: f32 = 1e-5;

pub fn deg_to_rad(degrees: f32) -> f32 {
    degrees * DEG_TO_RAD
}

pub fn fuzzy_is_null(value: f32) -> bool {
    value.abs() <= FUZZY_EPSILON
}

/// Map clip space to pixel space for a `width` x `height` surface.
///
/// Diagonal half-extents plus a translation by the same half-extents; depth is
/// passed through untouched.
pub fn viewport_matrix(width: f32, height: f32) -> Mat4 {
    let w2 = width / 2.0;
    let h2 = height / 2.0;
    Mat4::from_cols(
        Vec4::new(w2, 0.0, 0.0, 0.0),
        Vec4::new(0.0, h2, 0.0, 0.0),
        Vec4::new(0.0, 0.0, 1.0, 0.0),
        Vec4::new(w2, h2, 0.0, 1.0),
    )
}

/// Inverse-transpose of the upper 3x3 of `m`.
///
/// Returns identity when the upper 3x3 is singular.
pub fn normal_matrix(m: &Mat4) -> Mat3 {
    let upper = Mat3::from_mat4(*m);
    let det = upper.determinant();
    if fuzzy_is_null(det) {
        return Mat3::IDENTITY;
    }
    upper.inverse().transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};

    #[test]
    fn deg_to_rad_half_turn() {
        assert!((deg_to_rad(180.0) - std::f32::consts::PI).abs() < 1e-6);
        assert_eq!(deg_to_rad(0.0), 0.0);
    }

    #[test]
    fn fuzzy_null_threshold() {
        assert!(fuzzy_is_null(0.0));
        assert!(fuzzy_is_null(-1e-6));
        assert!(!fuzzy_is_null(1e-3));
    }

    #[test]
    fn viewport_maps_clip_corners_to_pixels() {
        let vp = viewport_matrix(800.0, 600.0);
        let lower_left = vp * Vec4::new(-1.0, -1.0, 0.5, 1.0);
        let upper_right = vp * Vec4::new(1.0, 1.0, 0.5, 1.0);
        assert_eq!(lower_left, Vec4::new(0.0, 0.0, 0.5, 1.0));
        assert_eq!(upper_right, Vec4::new(800.0, 600.0, 0.5, 1.0));
    }

    #[test]
    fn normal_matrix_of_rotation_is_rotation() {
        let rot = Mat4::from_quat(Quat::from_rotation_y(0.7));
        let n = normal_matrix(&rot);
        let expected = Mat3::from_mat4(rot);
        assert!(n.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn normal_matrix_undoes_nonuniform_scale() {
        let m = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let n = normal_matrix(&m);
        assert!((n.x_axis.x - 0.5).abs() < 1e-6);
        assert!((n.y_axis.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn normal_matrix_of_singular_is_identity() {
        let m = Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(normal_matrix(&m), Mat3::IDENTITY);
    }
}
