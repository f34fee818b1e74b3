// Re-export glam for convenience
pub use glam::*;

// Kiri math types
mod aabb;
mod frame;
mod interval;
mod ray;
mod transform;

pub use aabb::Aabb;
pub use frame::Frame;
pub use interval::Interval;
pub use ray::{Ray, RAY_EPSILON};
pub use transform::Mat4Ext;

/// Conservative bound on the relative error of `n` chained f32 operations.
///
/// `gamma(n) = n * eps / (1 - n * eps)` with `eps` the unit roundoff.
#[inline]
pub fn gamma(n: i32) -> f32 {
    let n_eps = n as f32 * (f32::EPSILON * 0.5);
    n_eps / (1.0 - n_eps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gamma_grows_with_n() {
        assert!(gamma(1) > 0.0);
        assert!(gamma(3) > gamma(2));
        assert!(gamma(3) < 1e-6);
    }

    #[test]
    fn test_vec3_operations() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        assert_eq!(a + b, Vec3::new(5.0, 7.0, 9.0));
    }
}
