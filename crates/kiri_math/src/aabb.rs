use crate::{gamma, Interval, Ray, Vec3};

/// Axis-Aligned Bounding Box for spatial acceleration structures.
///
/// An AABB is defined by three intervals (one per axis). The empty box has
/// empty intervals and absorbs under expansion. Boxes are never padded:
/// a flat triangle yields a flat box, and the ray test handles it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };

    pub const UNIVERSE: Aabb = Aabb {
        x: Interval::UNIVERSE,
        y: Interval::UNIVERSE,
        z: Interval::UNIVERSE,
    };

    pub fn new(x: Interval, y: Interval, z: Interval) -> Self {
        Self { x, y, z }
    }

    /// Create an empty AABB (contains nothing).
    pub fn empty() -> Self {
        Self::EMPTY
    }

    /// Degenerate box holding a single point.
    pub fn from_point(p: Vec3) -> Self {
        Self {
            x: Interval::point(p.x),
            y: Interval::point(p.y),
            z: Interval::point(p.z),
        }
    }

    /// Create an AABB from two corner points (in any order).
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        let min = a.min(b);
        let max = a.max(b);
        Self {
            x: Interval::new(min.x, max.x),
            y: Interval::new(min.y, max.y),
            z: Interval::new(min.z, max.z),
        }
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    pub fn min(&self) -> Vec3 {
        Vec3::new(self.x.min, self.y.min, self.z.min)
    }

    pub fn max(&self) -> Vec3 {
        Vec3::new(self.x.max, self.y.max, self.z.max)
    }

    /// True if any axis is empty. Flat boxes are not empty.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty() || self.y.is_empty() || self.z.is_empty()
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        Vec3::new(self.x.center(), self.y.center(), self.z.center())
    }

    pub fn extent(&self) -> Vec3 {
        if self.is_empty() {
            return Vec3::ZERO;
        }
        self.max() - self.min()
    }

    /// Grow the box to include `p`.
    pub fn expand_by_point(&mut self, p: Vec3) {
        self.x.include(p.x);
        self.y.include(p.y);
        self.z.include(p.z);
    }

    /// Grow the box to include `other`. Expanding by an empty box is a no-op.
    pub fn expand_by(&mut self, other: &Aabb) {
        if other.is_empty() {
            return;
        }
        *self = Aabb::surrounding(self, other);
    }

    /// Point containment. `strict` excludes the boundary.
    pub fn contains(&self, p: Vec3, strict: bool) -> bool {
        if strict {
            self.x.surrounds(p.x) && self.y.surrounds(p.y) && self.z.surrounds(p.z)
        } else {
            self.x.contains(p.x) && self.y.contains(p.y) && self.z.contains(p.z)
        }
    }

    /// Box overlap test. With `strict == false` boxes that only share a face,
    /// edge or corner overlap, which keeps primitives lying on a split plane
    /// in both halves.
    pub fn overlaps(&self, other: &Aabb, strict: bool) -> bool {
        if strict {
            self.x.overlaps_strict(&other.x)
                && self.y.overlaps_strict(&other.y)
                && self.z.overlaps_strict(&other.z)
        } else {
            self.x.overlaps(&other.x) && self.y.overlaps(&other.y) && self.z.overlaps(&other.z)
        }
    }

    /// One of the eight boxes produced by splitting at the centroid.
    ///
    /// Bit 0 of `index` selects the upper X half, bit 1 the upper Y half and
    /// bit 2 the upper Z half. All eight octants meet at the centroid and tile
    /// the box exactly.
    pub fn octant(&self, index: usize) -> Aabb {
        let center = self.centroid();
        let half = |iv: Interval, mid: f32, upper: bool| {
            if upper {
                Interval::new(mid, iv.max)
            } else {
                Interval::new(iv.min, mid)
            }
        };

        Aabb {
            x: half(self.x, center.x, index & 1 != 0),
            y: half(self.y, center.y, index & 2 != 0),
            z: half(self.z, center.z, index & 4 != 0),
        }
    }

    pub fn octants(&self) -> [Aabb; 8] {
        std::array::from_fn(|i| self.octant(i))
    }

    /// Test if a ray intersects this AABB within `[ray.mint, ray.maxt]`.
    pub fn ray_intersect(&self, ray: &Ray) -> bool {
        self.ray_interval(ray).is_some()
    }

    /// Slab test returning the parametric entry and exit distances, clipped
    /// to the ray's range.
    ///
    /// An axis the ray is parallel to never excludes the box when the origin
    /// lies inside that slab (boundary included) and always excludes it
    /// otherwise. The exit distance is widened by `2 * gamma(3)` so round-off
    /// can not reject a box whose contents the ray really reaches.
    pub fn ray_interval(&self, ray: &Ray) -> Option<(f32, f32)> {
        if self.is_empty() {
            return None;
        }

        let mut t_near = ray.mint;
        let mut t_far = ray.maxt;

        for axis in 0..3 {
            let slab = self.axis_interval(axis);
            let origin = ray.origin[axis];
            let dir = ray.direction[axis];

            if dir == 0.0 {
                if !slab.contains(origin) {
                    return None;
                }
                continue;
            }

            let inv_dir = 1.0 / dir;
            let mut t0 = (slab.min - origin) * inv_dir;
            let mut t1 = (slab.max - origin) * inv_dir;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t1 += t1.abs() * 2.0 * gamma(3);

            t_near = t_near.max(t0);
            t_far = t_far.min(t1);
            if t_near > t_far {
                return None;
            }
        }

        Some((t_near, t_far))
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb {
        Aabb::from_points(Vec3::splat(-1.0), Vec3::splat(1.0))
    }

    #[test]
    fn test_aabb_from_points_any_order() {
        let aabb = Aabb::from_points(Vec3::new(10.0, 0.0, 5.0), Vec3::new(0.0, 10.0, -5.0));

        assert_eq!(aabb.min(), Vec3::new(0.0, 0.0, -5.0));
        assert_eq!(aabb.max(), Vec3::new(10.0, 10.0, 5.0));
    }

    #[test]
    fn test_empty_box_absorbs_expansion() {
        let mut aabb = Aabb::empty();
        assert!(aabb.is_empty());

        aabb.expand_by_point(Vec3::new(1.0, 2.0, 3.0));
        assert!(!aabb.is_empty());
        assert_eq!(aabb, Aabb::from_point(Vec3::new(1.0, 2.0, 3.0)));

        aabb.expand_by(&Aabb::EMPTY);
        assert_eq!(aabb, Aabb::from_point(Vec3::new(1.0, 2.0, 3.0)));

        aabb.expand_by(&unit_box());
        assert_eq!(aabb.min(), Vec3::splat(-1.0));
        assert_eq!(aabb.max(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_expand_never_shrinks() {
        let mut aabb = unit_box();
        aabb.expand_by_point(Vec3::ZERO);
        assert_eq!(aabb, unit_box());
    }

    #[test]
    fn test_contains_strict_and_inclusive() {
        let aabb = unit_box();
        let corner = Vec3::splat(1.0);

        assert!(aabb.contains(Vec3::ZERO, true));
        assert!(aabb.contains(corner, false));
        assert!(!aabb.contains(corner, true));
        assert!(!aabb.contains(Vec3::splat(1.5), false));
    }

    #[test]
    fn test_overlaps_shared_face() {
        let a = Aabb::from_points(Vec3::ZERO, Vec3::ONE);
        let b = Aabb::from_points(Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        let c = Aabb::from_points(Vec3::splat(3.0), Vec3::splat(4.0));

        assert!(a.overlaps(&b, false));
        assert!(!a.overlaps(&b, true));
        assert!(!a.overlaps(&c, false));
        assert!(!a.overlaps(&Aabb::EMPTY, false));
    }

    #[test]
    fn test_octants_tile_parent() {
        let parent = Aabb::from_points(Vec3::new(-2.0, 0.0, 1.0), Vec3::new(4.0, 3.0, 9.0));
        let octants = parent.octants();

        let mut union = Aabb::empty();
        let mut volume = 0.0;
        for octant in &octants {
            union.expand_by(octant);
            let d = octant.extent();
            volume += d.x * d.y * d.z;
            assert!(octant.contains(parent.centroid(), false));
        }
        assert_eq!(union, parent);

        let d = parent.extent();
        assert!((volume - d.x * d.y * d.z).abs() < 1e-3);

        // Interiors are pairwise disjoint
        for i in 0..8 {
            for j in (i + 1)..8 {
                assert!(!octants[i].overlaps(&octants[j], true), "{i} and {j} overlap");
            }
        }
    }

    #[test]
    fn test_octant_bit_layout() {
        let parent = unit_box();
        assert_eq!(parent.octant(0), Aabb::from_points(Vec3::splat(-1.0), Vec3::ZERO));
        assert_eq!(parent.octant(7), Aabb::from_points(Vec3::ZERO, Vec3::splat(1.0)));
        assert_eq!(
            parent.octant(1),
            Aabb::from_points(Vec3::new(0.0, -1.0, -1.0), Vec3::new(1.0, 0.0, 0.0))
        );
    }

    #[test]
    fn test_aabb_ray_interval() {
        let aabb = unit_box();

        let ray = Ray::segment(Vec3::new(0.0, 0.0, -5.0), Vec3::Z, 0.0, f32::INFINITY);
        let (t0, t1) = aabb.ray_interval(&ray).unwrap();
        assert!((t0 - 4.0).abs() < 1e-5);
        assert!((t1 - 6.0).abs() < 1e-4);

        // Ray pointing away
        let ray = Ray::segment(Vec3::new(0.0, 0.0, -5.0), -Vec3::Z, 0.0, f32::INFINITY);
        assert!(!aabb.ray_intersect(&ray));

        // Range ends before the box
        let ray = Ray::segment(Vec3::new(0.0, 0.0, -5.0), Vec3::Z, 0.0, 3.0);
        assert!(!aabb.ray_intersect(&ray));
    }

    #[test]
    fn test_aabb_ray_parallel_to_slab() {
        let aabb = unit_box();

        // Parallel to X and Y, origin inside both slabs
        let inside = Ray::segment(Vec3::new(0.5, -0.5, -5.0), Vec3::Z, 0.0, f32::INFINITY);
        assert!(aabb.ray_intersect(&inside));

        // On the boundary of the X slab still counts
        let boundary = Ray::segment(Vec3::new(1.0, 0.0, -5.0), Vec3::Z, 0.0, f32::INFINITY);
        assert!(aabb.ray_intersect(&boundary));

        // Parallel and outside
        let outside = Ray::segment(Vec3::new(2.0, 0.0, -5.0), Vec3::Z, 0.0, f32::INFINITY);
        assert!(!aabb.ray_intersect(&outside));
    }

    #[test]
    fn test_flat_box_is_hit() {
        let flat = Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0));
        let ray = Ray::segment(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z, 0.0, f32::INFINITY);

        let (t0, t1) = flat.ray_interval(&ray).unwrap();
        assert!(t0 <= 5.0 && t1 >= 5.0);
    }

    #[test]
    fn test_empty_box_never_hit() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert!(!Aabb::EMPTY.ray_intersect(&ray));
        assert!(Aabb::UNIVERSE.ray_intersect(&ray));
    }
}
