//! Direct light, soft shadows and caustic lookup at a hit point.
//!
//! Every function returns an `Energy` whose rgb is the light colour scaled
//! by intensity and whose w is the intensity itself. A zero w means the
//! light does not reach the point.

use lume_core::Light;
use lume_math::{same_side, Energy, Vec3};

use crate::intersect::{intersect, Intersection};
use crate::sampling::stratified_disk;
use crate::tracer::Tracer;

/// A shadow ray that stops this close to the expected distance is taken to
/// have reached the shaded point.
pub const SHADOW_HIT_TOLERANCE: f32 = 1e-3;

/// Radius of the disk directional shadow rays are spread over.
pub const SOFT_SHADOW_RADIUS: f32 = 0.2;

impl<'s> Tracer<'s> {
    /// Light arriving at the hit point from every active light, plus stored
    /// caustics.
    ///
    /// Emissive surfaces are not lit; they return their own emission.
    pub fn total_light(&self, hit: &Intersection<'s>) -> Energy {
        let Some(triangle) = hit.triangle.filter(|_| hit.hit) else {
            return Energy::ZERO;
        };

        let material = self.scene.material(triangle.material);
        if material.light {
            let emission = material.color * material.light_strength * self.config.exposure;
            return emission.truncate().extend(1.0);
        }

        let lights: Vec<&Light> = self.scene.lights.iter().filter(|l| l.active).collect();
        let direct = self.scheduler.sum(&lights, |light| {
            let energy = if light.directional {
                self.directional_light(hit, light)
            } else {
                self.point_light(hit, light)
            };
            if energy.w > 0.0 {
                energy
            } else {
                Energy::ZERO
            }
        });

        direct + self.caustics(hit)
    }

    /// Contribution of one point light, with a hard shadow.
    pub fn point_light(&self, hit: &Intersection<'s>, light: &Light) -> Energy {
        let Some(triangle) = hit.triangle.filter(|_| hit.hit) else {
            return Energy::ZERO;
        };

        let to_light = light.position - hit.point;
        let distance = to_light.length();
        if distance < f32::EPSILON {
            return Energy::ZERO;
        }
        let l = to_light / distance;

        let cos_theta = hit.normal.dot(l);
        if cos_theta < 0.0 {
            return Energy::ZERO;
        }

        let shadow = intersect(self.scene, light.position, -l);
        let reached = shadow.triangle.map(|t| t.id) == Some(triangle.id)
            || (distance - shadow.dist).abs() < SHADOW_HIT_TOLERANCE;
        // Light-leak guard: a blocker facing the other way drops the light.
        // Intent unconfirmed, kept as-is.
        if !reached || !same_side(hit.normal, shadow.normal, 0.0) {
            return Energy::ZERO;
        }

        let material = self.scene.material(triangle.material);
        let intensity = if material.light_strength > 0.0 {
            material.light_strength * self.config.exposure
        } else {
            (1.0 / (distance * distance)) * self.config.exposure * cos_theta * light.strength
        };

        (light.color.truncate() * intensity).extend(intensity)
    }

    /// Contribution of one directional light, with a soft shadow.
    ///
    /// Shadow rays start far outside the scene, spread over a small disk
    /// across the light direction. The result is scaled by the fraction of
    /// rays that reach the point.
    pub fn directional_light(&self, hit: &Intersection<'s>, light: &Light) -> Energy {
        let Some(triangle) = hit.triangle.filter(|_| hit.hit) else {
            return Energy::ZERO;
        };

        let to_light = -light.direction.normalize_or_zero();
        let cos_theta = hit.normal.dot(to_light);
        if cos_theta < 0.0 || to_light == Vec3::ZERO {
            return Energy::ZERO;
        }

        let count = self.config.light_sample_count;
        let offsets = stratified_disk(SOFT_SHADOW_RADIUS, count, &mut rand::thread_rng());
        let (tangent, bitangent) = to_light.any_orthonormal_pair();
        let far = self.scene.far_distance();
        let intensity = cos_theta * light.strength * self.config.exposure;

        let mut accepted = 0usize;
        for offset in offsets {
            let start = hit.point + to_light * far + tangent * offset.x + bitangent * offset.y;
            let path = hit.point - start;
            let expected = path.length();

            let shadow = intersect(self.scene, start, path);
            let reached = shadow.triangle.map(|t| t.id) == Some(triangle.id)
                || (expected - shadow.dist).abs() < SHADOW_HIT_TOLERANCE;
            if !reached {
                continue;
            }
            // Light-leak guard, same as for point lights. Intent unconfirmed.
            if !same_side(hit.normal, shadow.normal, 0.0) {
                return Energy::ZERO;
            }
            accepted += 1;
        }

        if accepted == 0 {
            return Energy::ZERO;
        }

        // Mean of the accepted samples, weighted by the unoccluded fraction
        let intensity = intensity * accepted as f32 / count as f32;
        (light.color.truncate() * intensity).extend(intensity)
    }

    /// Stored photons near the hit point. Casts no rays.
    pub fn caustics(&self, hit: &Intersection<'s>) -> Energy {
        let spacing = self.config.photon_spacing;
        if !self.config.render_caustics || spacing <= 0.0 {
            return Energy::ZERO;
        }
        let Some(triangle) = hit.triangle.filter(|_| hit.hit) else {
            return Energy::ZERO;
        };

        triangle
            .photons
            .iter()
            .filter(|p| p.location.distance(hit.point) < spacing)
            .fold(Energy::ZERO, |acc, p| acc + p.color * self.config.exposure)
    }
}
