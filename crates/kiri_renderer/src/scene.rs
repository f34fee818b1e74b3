//! Scene container: the meshes of a scene plus the accelerator over them.

use std::sync::Arc;

use kiri_core::{Mesh, MeshError};
use kiri_math::{Aabb, Ray, Vec3, RAY_EPSILON};
use thiserror::Error;

use crate::accel::{Accel, AccelError};
use crate::octree::OctreeConfig;
use crate::Intersection;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("mesh '{name}' is invalid: {source}")]
    InvalidMesh {
        name: String,
        #[source]
        source: MeshError,
    },

    #[error(transparent)]
    Accel(#[from] AccelError),
}

/// A collection of meshes that can be ray traced once activated.
#[derive(Debug, Default)]
pub struct Scene {
    accel: Accel,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: OctreeConfig) -> Self {
        Self {
            accel: Accel::with_config(config),
        }
    }

    /// Validate and register a mesh.
    pub fn add_mesh(&mut self, mesh: impl Into<Arc<Mesh>>) -> Result<(), SceneError> {
        let mesh = mesh.into();
        mesh.validate().map_err(|source| SceneError::InvalidMesh {
            name: mesh.name.clone(),
            source,
        })?;
        log::debug!(
            "Scene: adding mesh '{}' ({} triangles)",
            mesh.name,
            mesh.triangle_count()
        );
        self.accel.add_mesh(mesh)?;
        Ok(())
    }

    /// Build the acceleration structure. Must be called once, after all
    /// meshes have been added and before tracing any rays.
    pub fn activate(&mut self) -> Result<(), SceneError> {
        self.accel.build()?;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.accel.is_built()
    }

    /// Closest hit along `ray`; fills `its` on a hit.
    pub fn ray_intersect<'a>(&'a self, ray: &Ray, its: &mut Intersection<'a>) -> bool {
        self.accel.ray_intersect(ray, its, false)
    }

    /// Whether anything blocks `ray` within its `[mint, maxt]` range.
    pub fn ray_intersect_shadow(&self, ray: &Ray) -> bool {
        let mut its = Intersection::default();
        self.accel.ray_intersect(ray, &mut its, true)
    }

    /// Mutual visibility of two points. Both ends of the segment are pulled
    /// in by [`RAY_EPSILON`] so the surfaces the points lie on do not count.
    pub fn illuminated_each_other(&self, p0: Vec3, p1: Vec3) -> bool {
        let d = p1 - p0;
        let dist = d.length();
        if dist <= 2.0 * RAY_EPSILON {
            return true;
        }
        let ray = Ray::segment(p0, d / dist, RAY_EPSILON, dist - RAY_EPSILON);
        !self.ray_intersect_shadow(&ray)
    }

    pub fn bounds(&self) -> &Aabb {
        self.accel.bounds()
    }

    pub fn meshes(&self) -> &[Arc<Mesh>] {
        self.accel.meshes()
    }

    pub fn accel(&self) -> &Accel {
        &self.accel
    }
}
