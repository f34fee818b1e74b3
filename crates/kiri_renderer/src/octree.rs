//! Octree acceleration structure over the triangles of all meshes.
//!
//! Every interior node splits its box into the eight octants around its
//! center. A triangle goes to *every* octant its bounding box touches, so a
//! triangle straddling a split plane is stored more than once but is never
//! lost. Leaves store packed [`FaceRef`]s.
//!
//! The tree is built once and is read-only afterwards; traversal keeps all
//! scratch state on the stack and only mutates the caller's ray.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use kiri_core::Mesh;
use kiri_math::{Aabb, Ray};
use serde::{Deserialize, Serialize};

use crate::accel::AccelError;
use crate::FaceRef;

/// Nodes with fewer faces than this become leaves.
pub const DEFAULT_PRIMITIVE_LIMIT: usize = 20;

/// Nodes deeper than this become leaves regardless of their face count.
pub const DEFAULT_MAX_DEPTH: u32 = 20;

/// Build parameters. Fixed once the tree is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OctreeConfig {
    pub primitive_limit: usize,
    pub max_depth: u32,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            primitive_limit: DEFAULT_PRIMITIVE_LIMIT,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl OctreeConfig {
    pub fn validate(&self) -> Result<(), AccelError> {
        if self.primitive_limit == 0 {
            return Err(AccelError::InvalidConfig(
                "primitive_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Octree node - an interior node with eight octant children, a leaf with
/// face references, or an empty node that received no faces.
#[derive(Debug)]
pub enum OctreeNode {
    /// Children are ordered by octant index, see [`Aabb::octant`].
    Interior {
        bbox: Aabb,
        children: Box<[OctreeNode; 8]>,
    },
    /// Holds fewer than `primitive_limit` faces, sits deeper than
    /// `max_depth`, or is a node where splitting would hand every face to
    /// every octant. The last case can leave oversize leaves at any depth.
    Leaf {
        bbox: Aabb,
        faces: Vec<FaceRef>,
    },
    Empty,
}

/// Closest (or, for shadow rays, any) triangle found by a traversal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OctreeHit {
    pub face: FaceRef,
    pub u: f32,
    pub v: f32,
    pub t: f32,
}

impl OctreeNode {
    pub fn bbox(&self) -> Option<&Aabb> {
        match self {
            OctreeNode::Interior { bbox, .. } | OctreeNode::Leaf { bbox, .. } => Some(bbox),
            OctreeNode::Empty => None,
        }
    }

    fn build(
        meshes: &[Arc<Mesh>],
        bbox: Aabb,
        faces: Vec<FaceRef>,
        depth: u32,
        config: &OctreeConfig,
    ) -> Self {
        if faces.is_empty() {
            return OctreeNode::Empty;
        }

        if faces.len() < config.primitive_limit || depth > config.max_depth {
            return OctreeNode::Leaf { bbox, faces };
        }

        let octants = bbox.octants();
        let mut child_faces: [Vec<FaceRef>; 8] = Default::default();
        for &face in &faces {
            let face_bbox = meshes[face.mesh_index()].triangle_bounds(face.face_index());
            for (octant, list) in octants.iter().zip(child_faces.iter_mut()) {
                if octant.overlaps(&face_bbox, false) {
                    list.push(face);
                }
            }
        }

        // Splitting only pays off if some child sees fewer faces
        if child_faces.iter().all(|list| list.len() == faces.len()) {
            return OctreeNode::Leaf { bbox, faces };
        }
        drop(faces);

        let children = std::array::from_fn(|i| {
            Self::build(
                meshes,
                octants[i],
                std::mem::take(&mut child_faces[i]),
                depth + 1,
                config,
            )
        });

        OctreeNode::Interior {
            bbox,
            children: Box::new(children),
        }
    }

    /// Recursive traversal. The caller has already checked this node's box.
    fn ray_intersect(
        &self,
        meshes: &[Arc<Mesh>],
        ray: &mut Ray,
        shadow_ray: bool,
        hit: &mut Option<OctreeHit>,
    ) -> bool {
        match self {
            OctreeNode::Empty => false,

            OctreeNode::Leaf { faces, .. } => {
                let mut hit_anything = false;

                // No early break for regular rays: a later face in this leaf
                // may still be closer
                for &face in faces {
                    let mesh = &meshes[face.mesh_index()];
                    if let Some(tri) = mesh.ray_intersect(face.face_index(), ray) {
                        *hit = Some(OctreeHit {
                            face,
                            u: tri.u,
                            v: tri.v,
                            t: tri.t,
                        });
                        if shadow_ray {
                            return true;
                        }

                        ray.maxt = tri.t;
                        hit_anything = true;
                    }
                }
                hit_anything
            }

            OctreeNode::Interior { children, .. } => {
                // Entry distance of every child box the ray reaches
                let mut order = [(0.0_f32, 0_usize); 8];
                let mut count = 0;
                for (i, child) in children.iter().enumerate() {
                    let Some(bbox) = child.bbox() else {
                        continue;
                    };
                    if let Some((t_near, _)) = bbox.ray_interval(ray) {
                        order[count] = (t_near, i);
                        count += 1;
                    }
                }

                let order = &mut order[..count];
                order.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

                let mut hit_anything = false;
                for &(t_near, i) in order.iter() {
                    // Front to back: once a box starts past the closest hit,
                    // so do all remaining ones
                    if t_near > ray.maxt {
                        break;
                    }
                    if children[i].ray_intersect(meshes, ray, shadow_ray, hit) {
                        if shadow_ray {
                            return true;
                        }
                        hit_anything = true;
                    }
                }
                hit_anything
            }
        }
    }
}

/// Node and reference counts gathered after a build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OctreeStats {
    pub interior_nodes: usize,
    pub leaf_nodes: usize,
    pub empty_nodes: usize,
    /// Face references over all leaves, duplicates included
    pub face_references: usize,
    /// Depth of the deepest node (root = 0)
    pub max_depth: u32,
}

impl OctreeStats {
    fn gather(root: &OctreeNode) -> Self {
        let mut stats = OctreeStats::default();
        let mut queue = VecDeque::from([(root, 0_u32)]);

        while let Some((node, depth)) = queue.pop_front() {
            stats.max_depth = stats.max_depth.max(depth);
            match node {
                OctreeNode::Interior { children, .. } => {
                    stats.interior_nodes += 1;
                    queue.extend(children.iter().map(|child| (child, depth + 1)));
                }
                OctreeNode::Leaf { faces, .. } => {
                    stats.leaf_nodes += 1;
                    stats.face_references += faces.len();
                }
                OctreeNode::Empty => stats.empty_nodes += 1,
            }
        }

        stats
    }

    pub fn average_faces_per_leaf(&self) -> f64 {
        if self.leaf_nodes == 0 {
            return 0.0;
        }
        self.face_references as f64 / self.leaf_nodes as f64
    }
}

impl fmt::Display for OctreeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Octree[interior nodes = {}, leaf nodes = {}, empty nodes = {}, \
             face references = {}, avg faces per leaf = {:.2}, max depth = {}]",
            self.interior_nodes,
            self.leaf_nodes,
            self.empty_nodes,
            self.face_references,
            self.average_faces_per_leaf(),
            self.max_depth
        )
    }
}

/// Octree over a fixed set of meshes.
///
/// Queries must pass the same mesh slice the tree was built from.
#[derive(Debug)]
pub struct Octree {
    root: OctreeNode,
    config: OctreeConfig,
    stats: OctreeStats,
}

impl Octree {
    /// Build the tree over `faces`, splitting starting from `bounds`.
    ///
    /// `bounds` must enclose every referenced triangle.
    pub fn build(
        meshes: &[Arc<Mesh>],
        bounds: Aabb,
        faces: Vec<FaceRef>,
        config: OctreeConfig,
    ) -> Self {
        log::debug!(
            "Octree: building over {} faces, bounds {:?} .. {:?}",
            faces.len(),
            bounds.min(),
            bounds.max()
        );

        let root = OctreeNode::build(meshes, bounds, faces, 0, &config);
        let stats = OctreeStats::gather(&root);

        Self {
            root,
            config,
            stats,
        }
    }

    /// Tree with no faces; every query misses.
    pub fn empty(config: OctreeConfig) -> Self {
        let root = OctreeNode::Empty;
        let stats = OctreeStats::gather(&root);
        Self {
            root,
            config,
            stats,
        }
    }

    pub fn root(&self) -> &OctreeNode {
        &self.root
    }

    pub fn config(&self) -> &OctreeConfig {
        &self.config
    }

    pub fn stats(&self) -> &OctreeStats {
        &self.stats
    }

    /// Find the closest triangle hit along `ray`, or any hit for shadow rays.
    ///
    /// On a regular hit `ray.maxt` is left at the hit distance.
    pub fn ray_intersect(
        &self,
        meshes: &[Arc<Mesh>],
        ray: &mut Ray,
        shadow_ray: bool,
    ) -> Option<OctreeHit> {
        match self.root.bbox() {
            Some(bbox) if bbox.ray_intersect(ray) => {}
            _ => return None,
        }

        let mut hit = None;
        if self.root.ray_intersect(meshes, ray, shadow_ray, &mut hit) {
            hit
        } else {
            None
        }
    }
}
