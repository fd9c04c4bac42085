//! Direction and disk sampling.

use std::f32::consts::TAU;

use lume_math::{Vec2, Vec3};
use rand::Rng;

/// `count` cosine-weighted directions in the hemisphere around `normal`.
pub fn hemisphere<R: Rng + ?Sized>(normal: Vec3, count: usize, rng: &mut R) -> Vec<Vec3> {
    let normal = normal.normalize_or_zero();
    if normal == Vec3::ZERO {
        return Vec::new();
    }
    let (tangent, bitangent) = normal.any_orthonormal_pair();

    (0..count)
        .map(|_| {
            let phi = TAU * rng.gen::<f32>();
            let r2: f32 = rng.gen();
            let r = r2.sqrt();
            let local = tangent * (r * phi.cos()) + bitangent * (r * phi.sin()) + normal * (1.0 - r2).sqrt();
            local.normalize_or(normal)
        })
        .collect()
}

/// `count` points on a disk of `radius`, one per cell of a square grid,
/// jittered inside their cell.
pub fn stratified_disk<R: Rng + ?Sized>(radius: f32, count: usize, rng: &mut R) -> Vec<Vec2> {
    if count == 0 {
        return Vec::new();
    }

    let side = (count as f32).sqrt().ceil() as usize;
    let total = side * side;

    (0..count)
        .map(|k| {
            let cell = k * total / count;
            let s = ((cell / side) as f32 + rng.gen::<f32>()) / side as f32;
            let t = ((cell % side) as f32 + rng.gen::<f32>()) / side as f32;
            let r = radius * s.sqrt();
            let theta = TAU * t;
            Vec2::new(r * theta.cos(), r * theta.sin())
        })
        .collect()
}

/// `count` normals perturbed around `normal` by up to `spread`.
///
/// Zero spread returns copies of `normal`. Perturbed normals stay on the
/// same side as `normal`.
pub fn jitter_normals<R: Rng + ?Sized>(normal: Vec3, count: usize, spread: f32, rng: &mut R) -> Vec<Vec3> {
    (0..count)
        .map(|_| {
            let offset = in_unit_sphere(rng) * spread;
            let jittered = (normal + offset).normalize_or(normal);
            if jittered.dot(normal) > 0.0 {
                jittered
            } else {
                normal
            }
        })
        .collect()
}

/// Uniformly distributed direction on the unit sphere.
pub fn uniform_sphere<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let z = 1.0 - 2.0 * rng.gen::<f32>();
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = TAU * rng.gen::<f32>();
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}

fn in_unit_sphere<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    loop {
        let p = Vec3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}
