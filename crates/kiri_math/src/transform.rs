// Transform utilities for Mat4
//
// glam::Mat4 already provides transform_point3(), transform_vector3() and inverse().

use glam::{Mat3, Mat4, Vec3};

/// Extension trait for placing object-space normals into world space.
pub trait Mat4Ext {
    /// Transform a surface normal with the inverse transpose of the linear part.
    /// The result is normalized.
    fn transform_normal(&self, normal: Vec3) -> Vec3;
}

impl Mat4Ext for Mat4 {
    fn transform_normal(&self, normal: Vec3) -> Vec3 {
        let normal_matrix = Mat3::from_mat4(*self).inverse().transpose();
        (normal_matrix * normal).normalize_or_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_transform_normal_ignores_translation() {
        let mat = Mat4::from_translation(Vec3::new(10.0, 20.0, 30.0));
        assert!((mat.transform_normal(Vec3::Z) - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_transform_normal_non_uniform_scale() {
        // Plane x + y = 0 squashed along x: the normal must tilt toward x
        let mat = Mat4::from_scale(Vec3::new(0.5, 1.0, 1.0));
        let n = mat.transform_normal(Vec3::new(1.0, 1.0, 0.0).normalize());

        let expected = Vec3::new(2.0, 1.0, 0.0).normalize();
        assert!((n - expected).length() < 1e-5);
    }

    #[test]
    fn test_transform_normal_follows_rotation() {
        let mat = Mat4::from_rotation_z(PI / 2.0);
        assert!((mat.transform_normal(Vec3::X) - Vec3::Y).length() < 1e-5);
    }
}
