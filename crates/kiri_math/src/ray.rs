use crate::{Interval, Vec3};

/// Default lower bound for ray parameters.
///
/// Secondary rays start on a surface; callers bias `mint` by this amount so
/// the ray does not report the surface it leaves.
pub const RAY_EPSILON: f32 = 1e-4;

/// A ray with origin, direction and a parametric range `[mint, maxt]`.
///
/// Intersection routines only accept hits with `t` strictly inside the range
/// and tighten `maxt` as closer hits are found.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Direction vector (not necessarily normalized)
    pub direction: Vec3,
    pub mint: f32,
    pub maxt: f32,
}

impl Ray {
    /// Create a ray covering `[RAY_EPSILON, inf)`.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self::segment(origin, direction, RAY_EPSILON, f32::INFINITY)
    }

    /// Create a ray with an explicit parameter range.
    pub fn segment(origin: Vec3, direction: Vec3, mint: f32, maxt: f32) -> Self {
        Self {
            origin,
            direction,
            mint,
            maxt,
        }
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    #[inline]
    pub fn interval(&self) -> Interval {
        Interval::new(self.mint, self.maxt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_defaults() {
        let ray = Ray::new(Vec3::new(1.0, 2.0, 3.0), Vec3::Y);

        assert_eq!(ray.mint, RAY_EPSILON);
        assert_eq!(ray.maxt, f32::INFINITY);
        assert!(ray.interval().contains(1.0e6));
    }

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        assert_eq!(ray.at(0.0), Vec3::ZERO);
        assert_eq!(ray.at(2.0), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(ray.at(-1.0), Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_ray_segment() {
        let ray = Ray::segment(Vec3::ZERO, Vec3::Z, 0.5, 4.0);
        assert_eq!(ray.interval(), Interval::new(0.5, 4.0));
        assert!(!ray.interval().contains(0.25));
    }
}
