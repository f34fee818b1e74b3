//! Parallel ray queries against an activated [`Scene`].
//!
//! The scene is shared read-only between rayon workers; every ray gets its
//! own intersection record.

use rayon::prelude::*;

use kiri_math::Ray;

use crate::{Intersection, Scene};

/// Closest hit for each ray, in input order.
pub fn intersect_batch<'a>(scene: &'a Scene, rays: &[Ray]) -> Vec<Option<Intersection<'a>>> {
    rays.par_iter()
        .map(|ray| {
            let mut its = Intersection::default();
            scene.ray_intersect(ray, &mut its).then_some(its)
        })
        .collect()
}

/// Whether each ray is blocked within its `[mint, maxt]` range, in input order.
pub fn occluded_batch(scene: &Scene, rays: &[Ray]) -> Vec<bool> {
    rays.par_iter()
        .map(|ray| scene.ray_intersect_shadow(ray))
        .collect()
}
