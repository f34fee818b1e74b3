//! Triangle mesh storage and the per-triangle queries the acceleration
//! structure consumes.
//!
//! A mesh owns flat vertex buffers (positions, optional normals and UVs) and
//! a flat index buffer where every 3 indices form a triangle. It knows
//! nothing about spatial structure: the octree asks it for per-triangle
//! bounds and for the watertight ray/triangle test.

use kiri_math::{Aabb, Mat4, Mat4Ext, Ray, Vec2, Vec3};
use thiserror::Error;

use crate::medium::MediumInterface;

/// Structural problems detected by [`Mesh::validate`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    #[error("Index buffer length {0} is not a multiple of 3")]
    IndexCount(usize),

    #[error("Triangle {triangle} references vertex {index}, but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        triangle: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("Normal buffer has {normals} entries for {vertices} vertices")]
    NormalCount { normals: usize, vertices: usize },

    #[error("UV buffer has {uvs} entries for {vertices} vertices")]
    UvCount { uvs: usize, vertices: usize },

    #[error("Vertex {0} has a non-finite position")]
    NonFinitePosition(usize),
}

/// Result of a successful ray/triangle test.
///
/// `u` and `v` are the barycentric weights of the triangle's second and third
/// vertex; the first vertex has weight `1 - u - v`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleHit {
    pub u: f32,
    pub v: f32,
    pub t: f32,
}

/// A mesh consisting of vertex positions, optional normals and UVs, and
/// triangle indices.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// Name used in diagnostics
    pub name: String,

    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// Vertex normals (optional, one per vertex)
    pub normals: Option<Vec<Vec3>>,

    /// UV coordinates (optional, one per vertex)
    pub uvs: Option<Vec<Vec2>>,

    /// Triangle indices (every 3 indices form a triangle)
    pub indices: Vec<u32>,

    /// Axis-aligned bounding box of all positions
    pub bounds: Aabb,

    /// Media on either side of the surface
    pub medium_interface: MediumInterface,
}

impl Mesh {
    /// Create a new mesh from positions and indices, optionally with normals.
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>, normals: Option<Vec<Vec3>>) -> Self {
        Self::new_with_uvs(positions, indices, normals, None)
    }

    /// Create a new mesh with UV coordinates.
    pub fn new_with_uvs(
        positions: Vec<Vec3>,
        indices: Vec<u32>,
        normals: Option<Vec<Vec3>>,
        uvs: Option<Vec<Vec2>>,
    ) -> Self {
        let bounds = Self::compute_bounds(&positions);
        Self {
            name: String::new(),
            positions,
            normals,
            uvs,
            indices,
            bounds,
            medium_interface: MediumInterface::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_medium_interface(mut self, medium_interface: MediumInterface) -> Self {
        self.medium_interface = medium_interface;
        self
    }

    fn compute_bounds(positions: &[Vec3]) -> Aabb {
        let mut bounds = Aabb::empty();
        for pos in positions {
            bounds.expand_by_point(*pos);
        }
        bounds
    }

    /// Check the buffers for consistency.
    ///
    /// The per-triangle accessors below assume a valid mesh and panic on
    /// out-of-range indices.
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.indices.len() % 3 != 0 {
            return Err(MeshError::IndexCount(self.indices.len()));
        }

        let vertex_count = self.positions.len();
        if let Some(i) = self.positions.iter().position(|p| !p.is_finite()) {
            return Err(MeshError::NonFinitePosition(i));
        }

        for (i, &index) in self.indices.iter().enumerate() {
            if index as usize >= vertex_count {
                return Err(MeshError::IndexOutOfRange {
                    triangle: i / 3,
                    index,
                    vertex_count,
                });
            }
        }

        if let Some(normals) = &self.normals {
            if normals.len() != vertex_count {
                return Err(MeshError::NormalCount {
                    normals: normals.len(),
                    vertices: vertex_count,
                });
            }
        }

        if let Some(uvs) = &self.uvs {
            if uvs.len() != vertex_count {
                return Err(MeshError::UvCount {
                    uvs: uvs.len(),
                    vertices: vertex_count,
                });
            }
        }

        Ok(())
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }

    pub fn has_uvs(&self) -> bool {
        self.uvs.is_some()
    }

    /// Vertex indices of triangle `index`.
    #[inline]
    pub fn triangle(&self, index: usize) -> [u32; 3] {
        let base = 3 * index;
        [
            self.indices[base],
            self.indices[base + 1],
            self.indices[base + 2],
        ]
    }

    #[inline]
    pub fn triangle_vertices(&self, index: usize) -> [Vec3; 3] {
        let [i0, i1, i2] = self.triangle(index);
        [
            self.positions[i0 as usize],
            self.positions[i1 as usize],
            self.positions[i2 as usize],
        ]
    }

    /// Tight bounding box of a single triangle.
    pub fn triangle_bounds(&self, index: usize) -> Aabb {
        let [p0, p1, p2] = self.triangle_vertices(index);
        let mut bounds = Aabb::from_point(p0);
        bounds.expand_by_point(p1);
        bounds.expand_by_point(p2);
        bounds
    }

    pub fn surface_area(&self, index: usize) -> f32 {
        let [p0, p1, p2] = self.triangle_vertices(index);
        0.5 * (p1 - p0).cross(p2 - p0).length()
    }

    /// Unnormalized face normal, `(p1 - p0) x (p2 - p0)`.
    pub fn face_normal(&self, index: usize) -> Vec3 {
        let [p0, p1, p2] = self.triangle_vertices(index);
        (p1 - p0).cross(p2 - p0)
    }

    /// Compute smooth vertex normals by averaging area-weighted face normals.
    ///
    /// Replaces existing normals. Vertices not referenced by any
    /// non-degenerate triangle get +Z.
    pub fn compute_normals(&mut self) {
        if self.normals.is_some() {
            log::debug!("Mesh '{}': replacing existing vertex normals", self.name);
        }

        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        for face in 0..self.triangle_count() {
            let n = self.face_normal(face);
            for index in self.triangle(face) {
                normals[index as usize] += n;
            }
        }

        for normal in &mut normals {
            *normal = normal.try_normalize().unwrap_or(Vec3::Z);
        }

        self.normals = Some(normals);
    }

    /// Copy of this mesh with positions, normals and bounds mapped through
    /// `transform`.
    pub fn transformed(&self, transform: &Mat4) -> Mesh {
        let positions: Vec<Vec3> = self
            .positions
            .iter()
            .map(|&p| transform.transform_point3(p))
            .collect();
        let normals = self.normals.as_ref().map(|normals| {
            normals
                .iter()
                .map(|&n| transform.transform_normal(n))
                .collect()
        });

        Mesh {
            name: self.name.clone(),
            bounds: Self::compute_bounds(&positions),
            positions,
            normals,
            uvs: self.uvs.clone(),
            indices: self.indices.clone(),
            medium_interface: self.medium_interface,
        }
    }

    /// Watertight ray/triangle intersection.
    ///
    /// The triangle is translated to the ray origin and sheared so the ray
    /// runs along +Z; the hit test then reduces to the signs of three 2D
    /// edge functions. Shared edges evaluate the same products in the same
    /// precision, so a ray through an edge or vertex is reported by at least
    /// one of the adjacent triangles. Zero values count as inside.
    ///
    /// Only hits with `t` strictly inside `(ray.mint, ray.maxt)` are
    /// reported. Zero-area triangles never report a hit.
    pub fn ray_intersect(&self, index: usize, ray: &Ray) -> Option<TriangleHit> {
        let [p0, p1, p2] = self.triangle_vertices(index);

        // Permute so the dominant direction axis becomes z
        let kz = max_dimension(ray.direction.abs());
        let kx = if kz == 2 { 0 } else { kz + 1 };
        let ky = if kx == 2 { 0 } else { kx + 1 };
        let permute = |v: Vec3| Vec3::new(v[kx], v[ky], v[kz]);

        let d = permute(ray.direction);
        let mut p0t = permute(p0 - ray.origin);
        let mut p1t = permute(p1 - ray.origin);
        let mut p2t = permute(p2 - ray.origin);

        // Shear so the ray direction becomes +Z
        let sx = -d.x / d.z;
        let sy = -d.y / d.z;
        let sz = 1.0 / d.z;
        p0t.x += sx * p0t.z;
        p0t.y += sy * p0t.z;
        p1t.x += sx * p1t.z;
        p1t.y += sy * p1t.z;
        p2t.x += sx * p2t.z;
        p2t.y += sy * p2t.z;

        let mut e0 = p1t.x * p2t.y - p1t.y * p2t.x;
        let mut e1 = p2t.x * p0t.y - p2t.y * p0t.x;
        let mut e2 = p0t.x * p1t.y - p0t.y * p1t.x;

        // Exact zeros may be round-off: redo those edges in double precision
        if e0 == 0.0 || e1 == 0.0 || e2 == 0.0 {
            e0 = edge_function_f64(p1t, p2t);
            e1 = edge_function_f64(p2t, p0t);
            e2 = edge_function_f64(p0t, p1t);
        }

        if (e0 < 0.0 || e1 < 0.0 || e2 < 0.0) && (e0 > 0.0 || e1 > 0.0 || e2 > 0.0) {
            return None;
        }

        let det = e0 + e1 + e2;
        if det == 0.0 {
            return None;
        }

        let t_scaled = (e0 * p0t.z + e1 * p1t.z + e2 * p2t.z) * sz;
        let inv_det = 1.0 / det;
        let t = t_scaled * inv_det;

        // Also rejects NaN from a zero direction
        if !(t > ray.mint && t < ray.maxt) {
            return None;
        }

        Some(TriangleHit {
            u: e1 * inv_det,
            v: e2 * inv_det,
            t,
        })
    }
}

#[inline]
fn max_dimension(v: Vec3) -> usize {
    if v.x > v.y {
        if v.x > v.z {
            0
        } else {
            2
        }
    } else if v.y > v.z {
        1
    } else {
        2
    }
}

#[inline]
fn edge_function_f64(a: Vec3, b: Vec3) -> f32 {
    (a.x as f64 * b.y as f64 - a.y as f64 * b.x as f64) as f32
}
