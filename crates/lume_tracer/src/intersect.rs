//! Nearest-hit queries against the whole scene.

use lume_core::{Scene, Triangle};
use lume_math::{Interval, Ray, Vec2, Vec3};

/// Hits closer than this to the ray origin are ignored, so secondary rays
/// do not strike the surface they start on.
pub const MIN_HIT_DISTANCE: f32 = 1e-4;

/// Result of a scene query. The default value is a miss.
#[derive(Clone, Copy, Debug, Default)]
pub struct Intersection<'s> {
    pub hit: bool,
    pub triangle: Option<&'s Triangle>,
    /// Index of the object in the scene
    pub object: usize,
    /// Index of the triangle within its object
    pub triangle_index: usize,
    pub point: Vec3,
    /// Shading normal at `point`
    pub normal: Vec3,
    /// Barycentric weights of the triangle vertices at `point`
    pub weights: Vec3,
    pub ray_start: Vec3,
    /// Normalised ray direction
    pub ray_dir: Vec3,
    pub dist: f32,
    /// Number of objects the ray struck
    pub hits: usize,
}

impl Intersection<'_> {
    /// Interpolated texture coordinates at the hit point.
    pub fn tex_coords(&self) -> Vec2 {
        match self.triangle {
            Some(t) => t.tex_coords[0] * self.weights.x + t.tex_coords[1] * self.weights.y + t.tex_coords[2] * self.weights.z,
            None => Vec2::ZERO,
        }
    }
}

/// Cast a ray through every object and keep the nearest hit.
///
/// Equidistant hits resolve to the object that comes first in the scene.
pub fn intersect(scene: &Scene, origin: Vec3, direction: Vec3) -> Intersection<'_> {
    let ray = Ray::new(origin, direction);
    let ray_t = Interval::new(MIN_HIT_DISTANCE, f32::INFINITY);

    let mut result = Intersection {
        ray_start: origin,
        ray_dir: ray.direction,
        ..Default::default()
    };
    let mut best = None;
    let mut closest = f32::INFINITY;

    for (object_index, object) in scene.objects.iter().enumerate() {
        if let Some((triangle_index, hit)) = object.nearest(&ray, ray_t) {
            result.hits += 1;
            if hit.t < closest {
                closest = hit.t;
                best = Some((object_index, triangle_index, hit));
            }
        }
    }

    let Some((object_index, triangle_index, hit)) = best else {
        return Intersection {
            hits: result.hits,
            ..Default::default()
        };
    };

    let triangle = &scene.objects[object_index].triangles[triangle_index];
    let weights = hit.weights();

    Intersection {
        hit: true,
        triangle: Some(triangle),
        object: object_index,
        triangle_index,
        point: ray.at(hit.t),
        normal: triangle.normal_at(weights),
        weights,
        dist: hit.t,
        ..result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{flat_quad, plain_config};
    use lume_core::Material;

    #[test]
    fn test_intersect_miss_is_default() {
        let mut scene = Scene::new(plain_config());
        let grey = scene.add_material(Material::default());
        scene.add_object("floor", flat_quad(Vec3::ZERO, 1.0, grey)).unwrap();

        let result = intersect(&scene, Vec3::new(0.0, 1.0, 0.0), Vec3::Y);
        assert!(!result.hit);
        assert!(result.triangle.is_none());
        assert_eq!(result.dist, 0.0);
        assert_eq!(result.point, Vec3::ZERO);
        assert_eq!(result.hits, 0);
    }

    #[test]
    fn test_intersect_nearest_object() {
        let mut scene = Scene::new(plain_config());
        let grey = scene.add_material(Material::default());
        scene.add_object("low", flat_quad(Vec3::ZERO, 1.0, grey)).unwrap();
        scene.add_object("high", flat_quad(Vec3::new(0.0, 1.0, 0.0), 1.0, grey)).unwrap();

        let result = intersect(&scene, Vec3::new(0.1, 3.0, 0.2), Vec3::new(0.0, -2.0, 0.0));
        assert!(result.hit);
        assert_eq!(result.object, 1);
        assert_eq!(result.hits, 2);
        assert!((result.dist - 2.0).abs() < 1e-5);
        assert!((result.point - Vec3::new(0.1, 1.0, 0.2)).length() < 1e-5);
        assert_eq!(result.normal, Vec3::Y);
        assert_eq!(result.ray_dir, Vec3::NEG_Y);
        assert_eq!(result.ray_start, Vec3::new(0.1, 3.0, 0.2));

        let w = result.weights;
        assert!((w.x + w.y + w.z - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_intersect_tie_keeps_first_object() {
        let mut scene = Scene::new(plain_config());
        let grey = scene.add_material(Material::default());
        scene.add_object("first", flat_quad(Vec3::ZERO, 1.0, grey)).unwrap();
        scene.add_object("copy", flat_quad(Vec3::ZERO, 1.0, grey)).unwrap();

        let result = intersect(&scene, Vec3::new(0.3, 1.0, 0.1), Vec3::NEG_Y);
        assert_eq!(result.object, 0);
        assert_eq!(result.hits, 2);
    }

    #[test]
    fn test_intersect_ignores_start_surface() {
        let mut scene = Scene::new(plain_config());
        let grey = scene.add_material(Material::default());
        scene.add_object("floor", flat_quad(Vec3::ZERO, 1.0, grey)).unwrap();

        assert!(!intersect(&scene, Vec3::new(0.3, 0.0, 0.1), Vec3::Y).hit);
        assert!(!intersect(&scene, Vec3::new(0.3, 1.0, 0.1), Vec3::ZERO).hit);
    }

    #[test]
    fn test_intersect_tex_coords() {
        let mut scene = Scene::new(plain_config());
        let grey = scene.add_material(Material::default());
        let triangle = Triangle::new(
            [Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)],
            grey,
        )
        .with_tex_coords([Vec2::ZERO, Vec2::X, Vec2::Y]);
        scene.add_object("uv", vec![triangle]).unwrap();

        let result = intersect(&scene, Vec3::new(0.25, 0.5, 1.0), Vec3::NEG_Z);
        assert!((result.tex_coords() - Vec2::new(0.25, 0.5)).length() < 1e-5);
        assert_eq!(Intersection::default().tex_coords(), Vec2::ZERO);
    }
}
