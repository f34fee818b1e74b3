//! Kiri Core - scene geometry consumed by the intersection core.
//!
//! This crate provides:
//!
//! - **Meshes**: flat vertex/index buffers with per-triangle bounds and a
//!   watertight ray/triangle test
//! - **Medium interfaces**: which participating medium lies on each side of
//!   a surface
//!
//! # Example
//!
//! ```
//! use kiri_core::Mesh;
//! use kiri_math::{Ray, Vec3};
//!
//! let mesh = Mesh::new(
//!     vec![Vec3::ZERO, Vec3::X, Vec3::Y],
//!     vec![0, 1, 2],
//!     None,
//! );
//! mesh.validate().unwrap();
//!
//! let ray = Ray::new(Vec3::new(0.2, 0.2, 1.0), -Vec3::Z);
//! let hit = mesh.ray_intersect(0, &ray).unwrap();
//! assert!((hit.t - 1.0).abs() < 1e-5);
//! ```

pub mod medium;
pub mod mesh;

// Re-export commonly used types
pub use medium::{MediumId, MediumInterface};
pub use mesh::{Mesh, MeshError, TriangleHit};
