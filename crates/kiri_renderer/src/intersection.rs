//! Intersection record handed from the acceleration structure to shading code.

use std::fmt;

use kiri_core::{MediumId, MediumInterface, Mesh};
use kiri_math::{Frame, Vec2, Vec3};

use crate::FaceRef;

/// Local information about a ray/triangle intersection.
///
/// Filled in by [`crate::Accel::ray_intersect`] on a confirmed closest hit;
/// otherwise it keeps whatever it held before (`Default` is the unset
/// record with no mesh).
#[derive(Debug, Clone, Default)]
pub struct Intersection<'a> {
    /// Position of the surface intersection
    pub p: Vec3,
    /// Unoccluded distance along the ray
    pub t: f32,
    /// Interpolated UV coordinates, or the raw barycentrics if the mesh has none
    pub uv: Vec2,
    /// Shading frame (based on the interpolated shading normal)
    pub sh_frame: Frame,
    /// Geometric frame (based on the true face normal)
    pub geo_frame: Frame,
    /// Mesh that was hit
    pub mesh: Option<&'a Mesh>,
    /// Triangle that was hit
    pub face: Option<FaceRef>,
    pub medium_interface: MediumInterface,
    /// Set by volumetric code for scattering events inside a medium
    pub inside_medium: bool,
}

impl Intersection<'_> {
    /// True once a surface hit has been recorded.
    pub fn is_valid(&self) -> bool {
        self.mesh.is_some()
    }

    /// Transform a direction vector into the local shading frame
    pub fn to_local(&self, d: Vec3) -> Vec3 {
        self.sh_frame.to_local(d)
    }

    /// Transform a direction vector from local to world coordinates
    pub fn to_world(&self, d: Vec3) -> Vec3 {
        self.sh_frame.to_world(d)
    }

    /// Medium a ray leaving in direction `w` travels through.
    pub fn medium_towards(&self, w: Vec3) -> Option<MediumId> {
        if w.dot(self.sh_frame.n) > 0.0 {
            self.medium_interface.outside
        } else {
            self.medium_interface.inside
        }
    }

    /// Medium of an interaction known to lie inside participating media.
    pub fn medium(&self) -> Option<MediumId> {
        debug_assert_eq!(
            self.medium_interface.inside, self.medium_interface.outside,
            "medium() called on a surface separating two media"
        );
        self.medium_interface.inside
    }

    pub fn is_medium(&self) -> bool {
        self.inside_medium
    }
}

impl fmt::Display for Intersection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(mesh) = self.mesh else {
            return write!(f, "Intersection[invalid]");
        };

        write!(
            f,
            "Intersection[p = {}, t = {}, uv = {}, shading normal = {}, geometric normal = {}, mesh = '{}'",
            self.p, self.t, self.uv, self.sh_frame.n, self.geo_frame.n, mesh.name
        )?;
        if let Some(face) = self.face {
            write!(f, ", {face}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unset() {
        let its = Intersection::default();
        assert!(!its.is_valid());
        assert!(!its.is_medium());
        assert_eq!(its.to_string(), "Intersection[invalid]");
    }

    #[test]
    fn test_medium_towards() {
        let fog = MediumId(1);
        let its = Intersection {
            sh_frame: Frame::from_normal(Vec3::Z),
            medium_interface: MediumInterface::with_sides(Some(fog), None),
            ..Default::default()
        };

        assert_eq!(its.medium_towards(Vec3::Z), None);
        assert_eq!(its.medium_towards(-Vec3::Z), Some(fog));
    }

    #[test]
    fn test_medium_inside_volume() {
        let its = Intersection {
            medium_interface: MediumInterface::new(Some(MediumId(4))),
            inside_medium: true,
            ..Default::default()
        };

        assert!(its.is_medium());
        assert_eq!(its.medium(), Some(MediumId(4)));
    }

    #[test]
    fn test_local_world_round_trip() {
        let its = Intersection {
            sh_frame: Frame::from_normal(Vec3::new(1.0, 1.0, 0.0).normalize()),
            ..Default::default()
        };
        let d = Vec3::new(0.3, -0.2, 0.9);

        assert!((its.to_world(its.to_local(d)) - d).length() < 1e-5);
    }

    #[test]
    fn test_display_names_mesh() {
        let mesh = Mesh::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1, 2], None)
            .with_name("floor");
        let its = Intersection {
            mesh: Some(&mesh),
            face: Some(FaceRef::new(0, 0)),
            ..Default::default()
        };

        let text = its.to_string();
        assert!(text.contains("mesh = 'floor'"));
        assert!(text.ends_with("mesh 0, face 0]"));
    }
}
