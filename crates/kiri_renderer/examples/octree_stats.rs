//! Octree statistics example.
//!
//! Builds a random triangle soup, prints the octree statistics and traces
//! a batch of camera-like rays through it in parallel.
//!
//! Usage: `cargo run --release --example octree_stats [config.json]`
//! Set `RUST_LOG=debug` for build details.

use kiri_renderer::{
    intersect_batch, occluded_batch, Mesh, OctreeConfig, Ray, Scene, Vec3,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const MESH_COUNT: usize = 8;
const TRIANGLES_PER_MESH: usize = 20_000;
const SCENE_EXTENT: f32 = 50.0;
const RAY_COUNT: usize = 200_000;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("Kiri Octree - Statistics Example");
    println!("================================");

    let config = match std::env::args().nth(1) {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(&path)?)?,
        None => OctreeConfig::default(),
    };
    println!(
        "primitive_limit = {}, max_depth = {}",
        config.primitive_limit, config.max_depth
    );

    let mut rng = StdRng::seed_from_u64(2024);

    // Build the scene
    let start = std::time::Instant::now();
    let mut scene = Scene::with_config(config);
    for i in 0..MESH_COUNT {
        let mesh = random_mesh(&mut rng, TRIANGLES_PER_MESH).with_name(format!("soup_{i}"));
        scene.add_mesh(mesh)?;
    }
    scene.activate()?;
    println!("Scene built in {:?}", start.elapsed());
    println!("Scene extent: {}", scene.bounds().extent());

    if let Some(stats) = scene.accel().stats() {
        println!("{stats}");
        println!(
            "{:.2} faces per leaf on average",
            stats.average_faces_per_leaf()
        );
    }

    // Rays from a sphere around the scene towards random interior points
    let rays: Vec<Ray> = (0..RAY_COUNT)
        .map(|_| {
            let origin = random_unit_vector(&mut rng) * SCENE_EXTENT * 2.0;
            let target = random_point(&mut rng, SCENE_EXTENT * 0.5);
            Ray::new(origin, (target - origin).normalize())
        })
        .collect();

    let start = std::time::Instant::now();
    let hits = intersect_batch(&scene, &rays);
    let elapsed = start.elapsed();
    let hit_count = hits.iter().filter(|h| h.is_some()).count();
    println!(
        "Traced {} rays in {:?} ({:.2} Mrays/s), {} hits",
        rays.len(),
        elapsed,
        rays.len() as f64 / elapsed.as_secs_f64() / 1e6,
        hit_count
    );

    let start = std::time::Instant::now();
    let occluded = occluded_batch(&scene, &rays);
    println!(
        "Traced {} shadow rays in {:?}, {} occluded",
        rays.len(),
        start.elapsed(),
        occluded.iter().filter(|&&o| o).count()
    );

    Ok(())
}

fn random_point(rng: &mut StdRng, extent: f32) -> Vec3 {
    Vec3::new(
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
    )
}

fn random_unit_vector(rng: &mut StdRng) -> Vec3 {
    loop {
        let p = random_point(rng, 1.0);
        let len_sq = p.length_squared();
        if len_sq > 1e-6 && len_sq <= 1.0 {
            return p / len_sq.sqrt();
        }
    }
}

/// Small random triangles scattered through the scene cube.
fn random_mesh(rng: &mut StdRng, triangles: usize) -> Mesh {
    let mut positions = Vec::with_capacity(triangles * 3);
    let mut indices = Vec::with_capacity(triangles * 3);
    for i in 0..triangles {
        let center = random_point(rng, SCENE_EXTENT);
        for _ in 0..3 {
            positions.push(center + random_point(rng, 0.5));
        }
        let base = 3 * i as u32;
        indices.extend_from_slice(&[base, base + 1, base + 2]);
    }
    Mesh::new(positions, indices, None)
}
