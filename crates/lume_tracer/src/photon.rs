//! Caustic photon map.
//!
//! Photons leave every active point light in random directions and follow
//! specular bounces. A photon that reaches a diffuse surface after at least
//! one bounce is stored on the triangle it landed on, where the shader
//! gathers it later. Paths are traced in parallel against the read-only
//! scene; the deposits are written afterwards on the calling thread.

use std::f32::consts::PI;

use lume_core::{Light, Photon, Scene};
use lume_math::{reflect, refract, Energy, Vec3};
use rand::Rng;
use rayon::prelude::*;

use crate::intersect::intersect;
use crate::sampling::uniform_sphere;

/// A photon and the triangle (object index, triangle index) it landed on.
type Deposit = (usize, usize, Photon);

/// Populate the photon lists of the scene's triangles. Returns the number
/// of photons stored.
///
/// Does nothing unless `caustics_threshold` is positive. Photon energy is
/// the light's power split over the emitted photons and spread over the
/// gather disk (`photon_spacing`), so gathering is a plain sum.
pub fn build_photon_map(scene: &mut Scene) -> usize {
    let config = &scene.config;
    if config.caustics_threshold <= 0.0 || config.photon_spacing <= 0.0 || config.caustics_photons == 0 {
        return 0;
    }

    let per_light = config.caustics_photons;
    let gather_area = PI * config.photon_spacing * config.photon_spacing;

    let deposits: Vec<Deposit> = {
        let scene: &Scene = scene;
        let lights: Vec<&Light> = scene.lights.iter().filter(|l| l.active && !l.directional).collect();

        (0..lights.len() * per_light)
            .into_par_iter()
            .filter_map(|k| {
                let light = lights[k / per_light];
                let power = light.color.truncate() * light.strength / (per_light as f32 * gather_area);
                trace_photon(scene, light.position, power, &mut rand::thread_rng())
            })
            .collect()
    };

    let stored = deposits.len();
    for (object, triangle, photon) in deposits {
        if let Some(t) = scene.objects.get_mut(object).and_then(|o| o.triangles.get_mut(triangle)) {
            t.photons.push(photon);
        }
    }

    log::info!("Stored {} caustic photons", stored);
    stored
}

fn trace_photon<R: Rng + ?Sized>(scene: &Scene, origin: Vec3, power: Vec3, rng: &mut R) -> Option<Deposit> {
    let config = &scene.config;
    let mut origin = origin;
    let mut direction = uniform_sphere(rng);
    let mut energy = power;
    let mut bounced = false;

    for _ in 0..=config.max_reflection_depth {
        let hit = intersect(scene, origin, direction);
        let triangle = hit.triangle.filter(|_| hit.hit)?;
        let material = scene.material(triangle.material);
        if material.light {
            return None;
        }

        if !material.is_specular() {
            if !bounced || energy.max_element() < config.caustics_threshold {
                return None;
            }
            let photon = Photon::new(hit.point, energy.extend(1.0));
            return Some((hit.object, hit.triangle_index, photon));
        }

        let total = material.glossiness + material.transmission;
        direction = if rng.gen::<f32>() * total < material.transmission {
            refract(hit.ray_dir, hit.normal, material.index_of_refraction)
        } else {
            reflect(hit.ray_dir, hit.normal)
        };
        energy *= material.color.truncate();
        origin = hit.point + direction * config.ray_correction;
        bounced = true;
    }

    None
}
