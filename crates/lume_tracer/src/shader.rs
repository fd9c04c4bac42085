//! Recursive shading.
//!
//! A hit is coloured by its base colour times the light reaching it, with
//! optional ambient terms. Glossy and transmissive materials then blend in
//! the colour seen along reflected and refracted rays, shaded recursively
//! up to the configured depth.

use lume_core::{Material, TextureLookup};
use lume_math::{clamp_color, reflect, refract, Energy, Vec2, Vec3};

use crate::intersect::Intersection;
use crate::sampling::jitter_normals;
use crate::tracer::Tracer;

impl<'s> Tracer<'s> {
    /// Colour seen along a primary ray.
    pub fn trace(&self, origin: Vec3, direction: Vec3) -> Energy {
        let hit = self.intersect(origin, direction);
        self.shade(&hit, 0)
    }

    /// Colour of a hit, recursing into reflections and refractions.
    ///
    /// Misses and hits at or beyond the maximum depth are black with zero
    /// alpha. The rgb of the result is always within [0, 1].
    pub fn shade(&self, hit: &Intersection<'s>, depth: u32) -> Energy {
        let Some(triangle) = hit.triangle.filter(|_| hit.hit) else {
            return Energy::ZERO;
        };
        if depth >= self.config.max_reflection_depth {
            return Energy::ZERO;
        }

        let config = &self.config;
        let material = self.scene.material(triangle.material);

        let samples = if config.render_occlusion || config.render_ambient_colors {
            self.ambient_samples(hit)
        } else {
            Vec::new()
        };

        let mut light = if config.render_lights {
            self.total_light(hit)
        } else {
            Energy::ONE
        };
        if config.render_occlusion {
            let ambient = self.occlusion(&samples) * config.occlusion_rate;
            light = (light.truncate() + Vec3::splat(ambient)).extend(1.0);
        }

        let mut color = self.base_color(hit);
        if config.render_ambient_colors {
            let ratio = config.ambient_color_sharing_ratio;
            let ambient = self.ambient_color(&samples, color);
            color = clamp_color((color * (1.0 - ratio) + ambient * ratio).truncate().extend(1.0));
        }

        let alpha = if hit.dist < 0.0 { 0.0 } else { 1.0 };
        color = clamp_color((color.truncate() * light.truncate()).extend(alpha));

        if config.render_reflections && material.is_specular() {
            let normals = self.bounce_normals(hit, material);
            if !normals.is_empty() {
                if material.glossiness > 0.0 {
                    let reflected = self.bounce(hit, &normals, depth, |n| reflect(hit.ray_dir, n));
                    color = blend(color, reflected, material.glossiness);
                }
                if material.transmission > 0.0 {
                    let ior = material.index_of_refraction;
                    let refracted = self.bounce(hit, &normals, depth, |n| refract(hit.ray_dir, n, ior));
                    color = blend(color, refracted, material.transmission * (1.0 - material.roughness));
                }
            }
        }

        clamp_color(color)
    }

    /// Normals to bounce off: the surface normal for sharp materials,
    /// otherwise `floor(roughness * 10)` perturbed copies of it.
    fn bounce_normals(&self, hit: &Intersection<'s>, material: &Material) -> Vec<Vec3> {
        if material.roughness == 0.0 {
            return vec![hit.normal];
        }

        let count = (material.roughness * 10.0).floor().max(0.0) as usize;
        jitter_normals(hit.normal, count, material.roughness, &mut rand::thread_rng())
    }

    /// Average colour along the directions produced by `direction_for`.
    fn bounce<F>(&self, hit: &Intersection<'s>, normals: &[Vec3], depth: u32, direction_for: F) -> Energy
    where
        F: Fn(Vec3) -> Vec3 + Sync + Send,
    {
        let total = self.scheduler.sum(normals, |&normal| {
            let direction = direction_for(normal);
            let origin = hit.point + direction * self.config.ray_correction;
            let next = self.intersect(origin, direction);
            self.shade(&next, depth + 1)
        });
        total / normals.len() as f32
    }

    /// Unlit surface colour: the material colour or its texture.
    pub fn base_color(&self, hit: &Intersection<'s>) -> Energy {
        let Some(triangle) = hit.triangle.filter(|_| hit.hit) else {
            return Energy::new(0.0, 0.0, 0.0, 1.0);
        };
        if !self.config.render_colors {
            return Energy::ONE;
        }

        let material = self.scene.material(triangle.material);
        material
            .texture
            .as_deref()
            .and_then(|name| self.scene.textures.sample(name, image_coords(hit.tex_coords())))
            .unwrap_or(material.color)
    }
}

/// Linear blend of rgb by `factor`; the result is opaque.
fn blend(base: Energy, other: Energy, factor: f32) -> Energy {
    (base.truncate() * (1.0 - factor) + other.truncate() * factor).extend(1.0)
}

/// Texture coordinates to image coordinates: repeat outside [0, 1]
/// (negative values mirrored into range) and flip V so row 0 is the top.
fn image_coords(uv: Vec2) -> Vec2 {
    let u = wrap(uv.x);
    let v = 1.0 - wrap(uv.y);
    Vec2::new(u - u.trunc(), v - v.trunc())
}

fn wrap(s: f32) -> f32 {
    if s > 1.0 {
        s - s.floor()
    } else if s < 0.0 {
        let s = s.abs();
        1.0 - (s - s.floor())
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ceiling_quad, flat_quad, floor_triangle, plain_config};
    use lume_core::{Config, Light, Scene, Texture};

    #[test]
    fn test_wrap_tex_coords() {
        assert!((wrap(0.25) - 0.25).abs() < 1e-6);
        assert!((wrap(1.25) - 0.25).abs() < 1e-6);
        assert!((wrap(-0.25) - 0.75).abs() < 1e-6);
        assert!((wrap(-1.75) - 0.25).abs() < 1e-6);

        let uv = image_coords(Vec2::new(1.25, 0.25));
        assert!((uv - Vec2::new(0.25, 0.75)).length() < 1e-6);
        // Flipped V of 0 lands on the top row edge and wraps to 0
        assert_eq!(image_coords(Vec2::ZERO), Vec2::ZERO);
    }

    #[test]
    fn test_single_triangle_under_point_light() {
        // d = 2, strength = 2, exposure = 1: intensity 0.5
        let mut scene = Scene::new(plain_config());
        let base = Energy::new(0.8, 0.6, 0.4, 1.0);
        let material = scene.add_material(Material::diffuse(base));
        scene.add_object("triangle", vec![floor_triangle(material)]).unwrap();
        scene.add_light(Light::point(Vec3::new(0.0, 2.0, 0.0), Energy::ONE, 2.0));
        scene.finalize();

        let tracer = Tracer::new(&scene);
        let color = tracer.trace(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y);

        let expected = Energy::new(0.4, 0.3, 0.2, 1.0);
        assert!((color - expected).length() < 1e-4, "{color:?}");
    }

    #[test]
    fn test_miss_and_depth_limit() {
        let mut scene = Scene::new(plain_config());
        let grey = scene.add_material(Material::default());
        scene.add_object("floor", vec![floor_triangle(grey)]).unwrap();
        scene.finalize();
        let tracer = Tracer::new(&scene);

        assert_eq!(tracer.trace(Vec3::new(0.0, 5.0, 0.0), Vec3::Y), Energy::ZERO);

        let hit = tracer.intersect(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y);
        assert_eq!(tracer.shade(&hit, tracer.config().max_reflection_depth), Energy::ZERO);
    }

    #[test]
    fn test_lights_and_colors_disabled() {
        let mut scene = Scene::new(plain_config());
        let base = Energy::new(0.8, 0.6, 0.4, 1.0);
        let material = scene.add_material(Material::diffuse(base));
        scene.add_object("triangle", vec![floor_triangle(material)]).unwrap();
        scene.finalize();

        let unlit = Tracer::with_config(
            &scene,
            Config {
                render_lights: false,
                ..plain_config()
            },
        );
        let color = unlit.trace(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y);
        assert!((color - base).length() < 1e-6);

        let white = Tracer::with_config(
            &scene,
            Config {
                render_lights: false,
                render_colors: false,
                ..plain_config()
            },
        );
        assert_eq!(white.trace(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y), Energy::ONE);
    }

    #[test]
    fn test_occlusion_adds_flat_light() {
        let mut scene = Scene::new(Config {
            render_lights: false,
            render_occlusion: true,
            occlusion_rate: 0.5,
            sampler_limit: 8,
            ..plain_config()
        });
        let material = scene.add_material(Material::diffuse(Energy::new(0.4, 0.4, 0.4, 1.0)));
        scene.add_object("floor", flat_quad(Vec3::ZERO, 1.0, material)).unwrap();
        scene.finalize();

        // Neutral light plus fully open occlusion at rate 0.5
        let tracer = Tracer::new(&scene);
        let color = tracer.trace(Vec3::new(0.1, 1.0, 0.2), Vec3::NEG_Y);
        assert!((color - Energy::new(0.6, 0.6, 0.6, 1.0)).length() < 1e-5, "{color:?}");
    }

    #[test]
    fn test_output_is_clamped() {
        let mut scene = Scene::new(plain_config());
        let material = scene.add_material(Material::diffuse(Energy::ONE));
        scene.add_object("triangle", vec![floor_triangle(material)]).unwrap();
        scene.add_light(Light::point(Vec3::new(0.0, 0.5, 0.0), Energy::ONE, 1000.0));
        scene.finalize();

        let color = Tracer::new(&scene).trace(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y);
        assert_eq!(color, Energy::ONE);
    }

    #[test]
    fn test_output_in_range_across_materials() {
        let materials = [
            Material::diffuse(Energy::new(0.9, 0.2, 0.1, 1.0)),
            Material::diffuse(Energy::ONE).with_glossiness(1.0),
            Material::diffuse(Energy::splat(0.7)).with_glossiness(0.4).with_roughness(0.5),
            Material::diffuse(Energy::splat(0.3)).with_transmission(0.9, 1.5),
            Material::emitter(Energy::new(1.0, 0.8, 0.6, 1.0), 5.0),
        ];
        let lights = [
            Light::point(Vec3::new(0.0, 0.3, 0.0), Energy::ONE, 500.0),
            Light::point(Vec3::new(0.5, 3.0, 0.5), Energy::new(0.2, 0.4, 1.0, 1.0), 0.5),
            Light::directional(Vec3::new(0.3, -1.0, 0.2), Energy::ONE, 20.0),
        ];

        for material in &materials {
            for light in &lights {
                let mut scene = Scene::new(Config {
                    render_reflections: true,
                    render_occlusion: true,
                    render_ambient_colors: true,
                    occlusion_rate: 0.8,
                    sampler_limit: 4,
                    exposure: 3.0,
                    ..plain_config()
                });
                let m = scene.add_material(material.clone());
                let grey = scene.add_material(Material::default());
                scene.add_object("floor", flat_quad(Vec3::ZERO, 4.0, m)).unwrap();
                scene.add_object("wall", ceiling_quad(Vec3::new(0.0, 2.0, 0.0), 4.0, grey)).unwrap();
                scene.add_light(light.clone());
                scene.finalize();

                let color = Tracer::new(&scene).trace(Vec3::new(0.2, 1.0, 0.1), Vec3::new(0.1, -1.0, 0.3));
                let rgb = color.truncate();
                assert!(rgb.min_element() >= 0.0, "{color:?} for {material:?} under {light:?}");
                assert!(rgb.max_element() <= 1.0, "{color:?} for {material:?} under {light:?}");
            }
        }
    }

    #[test]
    fn test_texture_lookup() {
        let mut scene = Scene::new(Config {
            render_lights: false,
            ..plain_config()
        });
        scene.textures.insert("green", Texture::solid_color(Energy::new(0.0, 1.0, 0.0, 1.0)));
        let textured = scene.add_material(Material::default().with_texture("green"));
        let missing = scene.add_material(Material::diffuse(Energy::new(0.2, 0.2, 0.2, 1.0)).with_texture("missing"));
        scene.add_object("textured", flat_quad(Vec3::ZERO, 1.0, textured)).unwrap();
        scene.add_object("missing", flat_quad(Vec3::new(5.0, 0.0, 0.0), 1.0, missing)).unwrap();
        scene.finalize();
        let tracer = Tracer::new(&scene);

        let color = tracer.trace(Vec3::new(0.1, 1.0, 0.2), Vec3::NEG_Y);
        assert_eq!(color, Energy::new(0.0, 1.0, 0.0, 1.0));

        let color = tracer.trace(Vec3::new(5.1, 1.0, 0.2), Vec3::NEG_Y);
        assert!((color - Energy::new(0.2, 0.2, 0.2, 1.0)).length() < 1e-6);
    }

    #[test]
    fn test_mirror_reflects_emitter() {
        let mut scene = Scene::new(Config {
            render_reflections: true,
            ..plain_config()
        });
        let mirror = scene.add_material(Material::diffuse(Energy::new(0.0, 0.0, 1.0, 1.0)).with_glossiness(1.0));
        let lamp = scene.add_material(Material::emitter(Energy::new(1.0, 0.0, 0.0, 1.0), 1.0));
        scene.add_object("mirror", flat_quad(Vec3::ZERO, 5.0, mirror)).unwrap();
        scene.add_object("lamp", ceiling_quad(Vec3::new(0.0, 3.0, 0.0), 5.0, lamp)).unwrap();
        scene.finalize();

        let color = Tracer::new(&scene).trace(Vec3::new(0.1, 1.0, 0.2), Vec3::new(0.3, -1.0, 0.1));
        assert!((color - Energy::new(1.0, 0.0, 0.0, 1.0)).length() < 1e-5, "{color:?}");
    }

    #[test]
    fn test_facing_mirrors_terminate() {
        for material in [
            Material::diffuse(Energy::splat(0.5)).with_glossiness(0.8),
            Material::diffuse(Energy::splat(0.5)).with_glossiness(0.8).with_roughness(0.3),
            Material::diffuse(Energy::splat(0.5)).with_transmission(0.7, 1.5).with_roughness(0.2),
        ] {
            let mut scene = Scene::new(Config {
                render_reflections: true,
                max_reflection_depth: 4,
                ..plain_config()
            });
            let m = scene.add_material(material);
            scene.add_object("floor", flat_quad(Vec3::ZERO, 10.0, m)).unwrap();
            scene.add_object("ceiling", ceiling_quad(Vec3::new(0.0, 1.0, 0.0), 10.0, m)).unwrap();
            scene.add_light(Light::point(Vec3::new(0.0, 0.5, 0.0), Energy::ONE, 1.0));
            scene.finalize();

            let tracer = Tracer::new(&scene);
            let color = tracer.trace(Vec3::new(0.0, 0.5, 0.0), Vec3::new(0.2, -1.0, 0.1));
            assert!(color.truncate().min_element() >= 0.0);
            assert!(color.truncate().max_element() <= 1.0);
            assert_eq!(tracer.scheduler().live(), 0);
        }
    }

    #[test]
    fn test_serial_fallback_matches_parallel() {
        let mut scene = Scene::new(Config {
            render_reflections: true,
            ..plain_config()
        });
        let mirror = scene.add_material(Material::diffuse(Energy::splat(0.2)).with_glossiness(0.5));
        scene.add_object("floor", flat_quad(Vec3::ZERO, 10.0, mirror)).unwrap();
        scene.add_object("ceiling", ceiling_quad(Vec3::new(0.0, 2.0, 0.0), 10.0, mirror)).unwrap();
        scene.add_light(Light::point(Vec3::new(0.0, 1.0, 0.0), Energy::ONE, 2.0));
        scene.add_light(Light::point(Vec3::new(1.0, 1.0, 0.0), Energy::ONE, 2.0));
        scene.finalize();

        let parallel = Tracer::new(&scene);
        let serial = Tracer::with_config(
            &scene,
            Config {
                max_parallel_tasks: 0,
                ..scene.config.clone()
            },
        );

        let origin = Vec3::new(0.0, 1.5, 0.0);
        let direction = Vec3::new(0.1, -1.0, 0.0);
        let a = parallel.trace(origin, direction);
        let b = serial.trace(origin, direction);
        assert!((a - b).length() < 1e-4, "{a:?} != {b:?}");
        assert_eq!(serial.scheduler().peak(), 0);
        assert!(parallel.scheduler().peak() > 0);
    }
}
