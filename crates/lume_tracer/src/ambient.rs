//! Ambient occlusion and colour bleeding.
//!
//! Both terms are estimated from one shared set of hemisphere rays cast
//! from the hit point.

use lume_core::Scene;
use lume_math::Energy;

use crate::intersect::{intersect, Intersection};
use crate::sampling::hemisphere;
use crate::tracer::Tracer;

impl<'s> Tracer<'s> {
    /// Cast `sampler_limit` cosine-weighted rays around the surface normal,
    /// on the side the hit ray came from.
    pub fn ambient_samples(&self, hit: &Intersection<'s>) -> Vec<Intersection<'s>> {
        if !hit.hit {
            return Vec::new();
        }

        let normal = if hit.normal.dot(hit.ray_dir) > 0.0 {
            -hit.normal
        } else {
            hit.normal
        };
        let origin = hit.point + normal * self.config.ray_correction;

        hemisphere(normal, self.config.sampler_limit, &mut rand::thread_rng())
            .into_iter()
            .map(|dir| intersect(self.scene, origin, dir))
            .collect()
    }

    /// Fraction of sample rays that escape, or travel farther than the
    /// ambient radius. 1 means fully open.
    pub fn occlusion(&self, samples: &[Intersection<'s>]) -> f32 {
        if samples.is_empty() {
            return 1.0;
        }

        let radius = if self.config.ambient_radius > 0.0 {
            self.config.ambient_radius
        } else {
            self.scene.short_radius
        };

        let open = samples.iter().filter(|s| !s.hit || s.dist > radius).count();
        open as f32 / samples.len() as f32
    }

    /// Mean colour of the surfaces the sample rays struck.
    ///
    /// In an exterior scene escaping rays see a white sky. If nothing was
    /// gathered the result is `fallback`.
    pub fn ambient_color(&self, samples: &[Intersection<'s>], fallback: Energy) -> Energy {
        let (sum, count) = samples.iter().fold((Energy::ZERO, 0usize), |(sum, count), sample| {
            if sample.hit {
                (sum + self.base_color(sample), count + 1)
            } else if self.scene.open_scene {
                (sum + Energy::ONE, count + 1)
            } else {
                (sum, count)
            }
        });

        if count == 0 {
            return fallback;
        }
        (sum / count as f32).truncate().extend(1.0)
    }
}

/// True if a ray from the first observer along its up vector escapes the
/// scene. Scenes without observers count as open.
pub fn probe_open_scene(scene: &Scene) -> bool {
    let Some(observer) = scene.observers.first() else {
        log::warn!("Scene has no observer, assuming an exterior scene");
        return true;
    };

    let open = !intersect(scene, observer.position, observer.up).hit;
    if open {
        log::info!("Exterior Scene");
    } else {
        log::info!("Interior Scene");
    }
    open
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{closed_box, flat_quad, plain_config};
    use lume_core::{Config, Material, Observer};
    use lume_math::Vec3;

    fn ambient_config() -> Config {
        Config {
            sampler_limit: 32,
            ambient_radius: 100.0,
            ..plain_config()
        }
    }

    #[test]
    fn test_open_floor_is_unoccluded() {
        let mut scene = Scene::new(ambient_config());
        let grey = scene.add_material(Material::default());
        scene.add_object("floor", flat_quad(Vec3::ZERO, 1.0, grey)).unwrap();
        scene.finalize();
        scene.open_scene = true;

        let tracer = Tracer::new(&scene);
        let hit = tracer.intersect(Vec3::new(0.1, 1.0, 0.2), Vec3::NEG_Y);
        let samples = tracer.ambient_samples(&hit);

        assert_eq!(samples.len(), 32);
        assert_eq!(tracer.occlusion(&samples), 1.0);
        assert_eq!(tracer.ambient_color(&samples, Energy::ZERO), Energy::ONE);
    }

    #[test]
    fn test_closed_box_is_occluded() {
        let mut scene = Scene::new(ambient_config());
        let red = scene.add_material(Material::diffuse(Energy::new(1.0, 0.0, 0.0, 1.0)));
        scene.add_object("room", closed_box(Vec3::ZERO, 2.0, red)).unwrap();
        scene.finalize();

        let tracer = Tracer::new(&scene);
        let hit = tracer.intersect(Vec3::new(0.1, 0.0, 0.2), Vec3::NEG_Y);
        assert!(hit.hit);
        let samples = tracer.ambient_samples(&hit);

        assert_eq!(tracer.occlusion(&samples), 0.0);
        let color = tracer.ambient_color(&samples, Energy::ZERO);
        assert!((color - Energy::new(1.0, 0.0, 0.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_small_radius_counts_as_open() {
        let mut scene = Scene::new(Config {
            ambient_radius: 0.01,
            ..ambient_config()
        });
        let grey = scene.add_material(Material::default());
        scene.add_object("room", closed_box(Vec3::ZERO, 2.0, grey)).unwrap();
        scene.finalize();

        let tracer = Tracer::new(&scene);
        let hit = tracer.intersect(Vec3::ZERO, Vec3::NEG_Y);
        assert_eq!(tracer.occlusion(&tracer.ambient_samples(&hit)), 1.0);
    }

    #[test]
    fn test_empty_samples() {
        let scene = Scene::new(Config {
            sampler_limit: 0,
            ..plain_config()
        });
        let tracer = Tracer::new(&scene);
        let fallback = Energy::new(0.3, 0.2, 0.1, 1.0);

        assert!(tracer.ambient_samples(&Intersection::default()).is_empty());
        assert_eq!(tracer.occlusion(&[]), 1.0);
        assert_eq!(tracer.ambient_color(&[], fallback), fallback);
    }

    #[test]
    fn test_closed_scene_escapes_use_fallback() {
        let mut scene = Scene::new(ambient_config());
        let grey = scene.add_material(Material::default());
        scene.add_object("floor", flat_quad(Vec3::ZERO, 1.0, grey)).unwrap();
        scene.finalize();
        scene.open_scene = false;

        let tracer = Tracer::new(&scene);
        let hit = tracer.intersect(Vec3::new(0.1, 1.0, 0.2), Vec3::NEG_Y);
        let fallback = Energy::new(0.3, 0.2, 0.1, 1.0);
        assert_eq!(tracer.ambient_color(&tracer.ambient_samples(&hit), fallback), fallback);
    }

    #[test]
    fn test_probe_open_scene() {
        let mut scene = Scene::new(plain_config());
        let grey = scene.add_material(Material::default());
        scene.add_object("room", closed_box(Vec3::ZERO, 2.0, grey)).unwrap();
        assert!(probe_open_scene(&scene));

        scene.add_observer(Observer::new(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y));
        assert!(!probe_open_scene(&scene));

        let mut outside = Scene::new(plain_config());
        let grey = outside.add_material(Material::default());
        outside.add_object("floor", flat_quad(Vec3::ZERO, 1.0, grey)).unwrap();
        outside.add_observer(Observer::new(Vec3::new(0.0, 1.0, 3.0), Vec3::ZERO, Vec3::Y));
        assert!(probe_open_scene(&outside));
    }
}
