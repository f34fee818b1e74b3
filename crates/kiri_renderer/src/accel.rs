//! Acceleration facade: owns the registered meshes and their octree, and
//! turns raw triangle hits into fully populated [`Intersection`] records.

use std::sync::Arc;
use std::time::Instant;

use kiri_core::Mesh;
use kiri_math::{Aabb, Frame, Ray, Vec2, Vec3};
use thiserror::Error;

use crate::octree::{Octree, OctreeConfig, OctreeHit, OctreeStats};
use crate::{FaceRef, Intersection};

/// Errors raised while registering meshes or building the octree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccelError {
    #[error("acceleration structure is already built")]
    AlreadyBuilt,

    #[error("mesh index {0} does not fit into a face reference")]
    TooManyMeshes(usize),

    #[error("mesh {mesh} has {triangles} triangles, more than a face reference can address")]
    TooManyTriangles { mesh: usize, triangles: usize },

    #[error("invalid octree configuration: {0}")]
    InvalidConfig(String),
}

/// Registered meshes plus the octree built over all of their triangles.
///
/// Meshes are added while the accelerator is unbuilt; [`Accel::build`] then
/// freezes the set. After that the structure is read-only and can be
/// queried from any number of threads at once.
#[derive(Debug)]
pub struct Accel {
    meshes: Vec<Arc<Mesh>>,
    config: OctreeConfig,
    bounds: Aabb,
    octree: Option<Octree>,
}

impl Default for Accel {
    fn default() -> Self {
        Self::new()
    }
}

impl Accel {
    pub fn new() -> Self {
        Self::with_config(OctreeConfig::default())
    }

    pub fn with_config(config: OctreeConfig) -> Self {
        Self {
            meshes: Vec::new(),
            config,
            bounds: Aabb::empty(),
            octree: None,
        }
    }

    /// Register a mesh. Its position in the registration order is the mesh
    /// index used by [`FaceRef`].
    pub fn add_mesh(&mut self, mesh: Arc<Mesh>) -> Result<(), AccelError> {
        if self.is_built() {
            return Err(AccelError::AlreadyBuilt);
        }
        self.meshes.push(mesh);
        Ok(())
    }

    /// Build the octree over every triangle of every registered mesh.
    pub fn build(&mut self) -> Result<(), AccelError> {
        if self.is_built() {
            return Err(AccelError::AlreadyBuilt);
        }
        self.config.validate()?;

        if self.meshes.is_empty() {
            log::warn!("Accel: no meshes registered, every query will miss");
            self.octree = Some(Octree::empty(self.config));
            return Ok(());
        }

        let start = Instant::now();

        let total: usize = self.meshes.iter().map(|m| m.triangle_count()).sum();
        let mut faces = Vec::with_capacity(total);
        // Root box from the triangles themselves, not the cached mesh bounds
        let mut bounds = Aabb::empty();
        for (mesh_index, mesh) in self.meshes.iter().enumerate() {
            let count = mesh.triangle_count();
            // Range check against the largest index; the rest fit too
            let last = FaceRef::try_new(mesh_index, count.saturating_sub(1)).map_err(|err| {
                match err {
                    AccelError::TooManyTriangles { mesh, .. } => {
                        AccelError::TooManyTriangles { mesh, triangles: count }
                    }
                    other => other,
                }
            })?;
            let mesh_id = last.mesh_index() as u32;
            for f in 0..count {
                bounds.expand_by(&mesh.triangle_bounds(f));
                faces.push(FaceRef::new(mesh_id, f as u32));
            }
        }

        let octree = Octree::build(&self.meshes, bounds, faces, self.config);

        log::info!(
            "Accel: built octree over {} meshes / {} triangles in {:.2?}",
            self.meshes.len(),
            total,
            start.elapsed()
        );
        log::info!("Accel: {}", octree.stats());

        self.bounds = bounds;
        self.octree = Some(octree);
        Ok(())
    }

    pub fn is_built(&self) -> bool {
        self.octree.is_some()
    }

    /// Union of all triangle bounds. Empty until built.
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    pub fn meshes(&self) -> &[Arc<Mesh>] {
        &self.meshes
    }

    pub fn config(&self) -> &OctreeConfig {
        &self.config
    }

    /// Tree statistics, available once built.
    pub fn stats(&self) -> Option<&OctreeStats> {
        self.octree.as_ref().map(Octree::stats)
    }

    /// Intersect a ray against all triangles.
    ///
    /// Regular rays find the closest hit in `(ray.mint, ray.maxt)` and fill
    /// `its`. Shadow rays (`shadow_ray = true`) stop at the first hit found
    /// and leave `its` untouched. Returns `false` without touching `its` on
    /// a miss. The caller's ray is never modified.
    pub fn ray_intersect<'a>(
        &'a self,
        ray: &Ray,
        its: &mut Intersection<'a>,
        shadow_ray: bool,
    ) -> bool {
        let Some(octree) = &self.octree else {
            debug_assert!(false, "Accel::ray_intersect called before build()");
            return false;
        };

        let mut ray = *ray;
        let Some(hit) = octree.ray_intersect(&self.meshes, &mut ray, shadow_ray) else {
            return false;
        };

        if !shadow_ray {
            self.fill_intersection(&hit, its);
        }
        true
    }

    /// Turn a raw triangle hit into surface data: position, UVs, frames and
    /// medium information.
    fn fill_intersection<'a>(&'a self, hit: &OctreeHit, its: &mut Intersection<'a>) {
        let mesh: &'a Mesh = &self.meshes[hit.face.mesh_index()];
        let face = hit.face.face_index();
        let [i0, i1, i2] = mesh.triangle(face).map(|i| i as usize);

        let bary = Vec3::new(1.0 - hit.u - hit.v, hit.u, hit.v);
        let [p0, p1, p2] = mesh.triangle_vertices(face);

        its.t = hit.t;
        its.p = bary.x * p0 + bary.y * p1 + bary.z * p2;

        its.uv = match &mesh.uvs {
            Some(uvs) => bary.x * uvs[i0] + bary.y * uvs[i1] + bary.z * uvs[i2],
            None => Vec2::new(hit.u, hit.v),
        };

        its.geo_frame = Frame::from_normal((p1 - p0).cross(p2 - p0).normalize_or_zero());

        // Degenerate interpolated normals fall back to the geometric frame
        its.sh_frame = mesh
            .normals
            .as_ref()
            .and_then(|n| (bary.x * n[i0] + bary.y * n[i1] + bary.z * n[i2]).try_normalize())
            .map_or(its.geo_frame, Frame::from_normal);

        its.mesh = Some(mesh);
        its.face = Some(hit.face);
        its.medium_interface = mesh.medium_interface;
        its.inside_medium = false;
    }
}
