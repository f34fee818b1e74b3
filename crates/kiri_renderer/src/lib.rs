//! Kiri ray intersection core.
//!
//! Meshes are registered with a [`Scene`] (or directly with an [`Accel`]),
//! an [`Octree`] is built once over every triangle, and rays are then traced
//! against it from any number of threads:
//!
//! ```
//! use kiri_renderer::{Intersection, Mesh, Ray, Scene, Vec3};
//!
//! let mut scene = Scene::new();
//! scene
//!     .add_mesh(Mesh::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1, 2], None))
//!     .unwrap();
//! scene.activate().unwrap();
//!
//! let ray = Ray::new(Vec3::new(0.2, 0.2, 5.0), Vec3::new(0.0, 0.0, -1.0));
//! let mut its = Intersection::default();
//! assert!(scene.ray_intersect(&ray, &mut its));
//! assert!((its.t - 5.0).abs() < 1e-5);
//! ```

mod accel;
mod batch;
mod face;
mod intersection;
mod octree;
mod scene;

pub use accel::{Accel, AccelError};
pub use batch::{intersect_batch, occluded_batch};
pub use face::FaceRef;
pub use intersection::Intersection;
pub use octree::{
    Octree, OctreeConfig, OctreeHit, OctreeNode, OctreeStats, DEFAULT_MAX_DEPTH,
    DEFAULT_PRIMITIVE_LIMIT,
};
pub use scene::{Scene, SceneError};

/// Re-export the math and geometry types callers need to build scenes
pub use kiri_core::{MediumId, MediumInterface, Mesh, MeshError};
pub use kiri_math::{Aabb, Frame, Ray, Vec2, Vec3, RAY_EPSILON};
