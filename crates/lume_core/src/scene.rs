//! Scene snapshot handed to the tracer.
//!
//! A scene is assembled by a builder (`add_*`), then prepared once by
//! [`Scene::finalize`] on a single thread. After that it is read-only: the
//! tracer shares `&Scene` between all its tasks.

use lume_math::{Aabb, Vec3};
use thiserror::Error;

use crate::config::Config;
use crate::light::Light;
use crate::material::Material;
use crate::object::Object;
use crate::texture::TextureCache;
use crate::triangle::Triangle;

/// Errors raised while assembling a scene.
#[derive(Error, Debug, PartialEq)]
pub enum SceneError {
    #[error("Object {object} references unknown material {material}")]
    UnknownMaterial { object: String, material: usize },

    #[error("Object {0} has no triangles")]
    EmptyObject(String),
}

pub type SceneResult<T> = Result<T, SceneError>;

/// A viewpoint. Only the first observer matters to the core, which uses
/// it to tell interior scenes from exterior ones.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct Observer {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub fov: f32,
}

impl Default for Observer {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            target: Vec3::NEG_Z,
            up: Vec3::Y,
            fov: 60.0,
        }
    }
}

impl Observer {
    pub fn new(position: Vec3, target: Vec3, up: Vec3) -> Self {
        Self {
            position,
            target,
            up,
            ..Default::default()
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SceneStats {
    pub objects: usize,
    pub triangles: usize,
    pub vertices: usize,
    pub materials: usize,
    pub lights: usize,
}

/// Everything the tracer reads while rendering.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    /// Iteration order is the tie-break order for equidistant hits
    pub objects: Vec<Object>,
    pub materials: Vec<Material>,
    pub lights: Vec<Light>,
    pub observers: Vec<Observer>,
    pub textures: TextureCache,
    pub config: Config,

    /// World bounds of all objects, set by `finalize`
    pub bounds: Aabb,
    /// Half the shortest extent of `bounds`; default ambient radius
    pub short_radius: f32,
    /// True when the scene is not enclosed (sky visible from the observer)
    pub open_scene: bool,
    pub stats: SceneStats,

    default_material: Material,
    next_triangle_id: usize,
    finalized: bool,
}

impl Scene {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            bounds: Aabb::EMPTY,
            ..Default::default()
        }
    }

    /// Add a material and return its index.
    pub fn add_material(&mut self, material: Material) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    /// Add an object built from world-space triangles and return its index.
    ///
    /// Every triangle must reference a material already in the scene. The
    /// triangles receive scene-unique ids.
    pub fn add_object(&mut self, name: impl Into<String>, mut triangles: Vec<Triangle>) -> SceneResult<usize> {
        let name = name.into();
        if triangles.is_empty() {
            return Err(SceneError::EmptyObject(name));
        }
        if let Some(bad) = triangles.iter().find(|t| t.material >= self.materials.len()) {
            return Err(SceneError::UnknownMaterial {
                object: name,
                material: bad.material,
            });
        }

        for triangle in &mut triangles {
            triangle.id = self.next_triangle_id;
            self.next_triangle_id += 1;
        }

        self.objects.push(Object::new(name, triangles));
        if self.finalized {
            log::warn!("Object added after finalize, refreshing scene bounds");
            self.update_bounds();
        }
        Ok(self.objects.len() - 1)
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn add_observer(&mut self, observer: Observer) {
        self.observers.push(observer);
    }

    /// Material by index. Unknown indices resolve to the default material.
    pub fn material(&self, index: usize) -> &Material {
        self.materials.get(index).unwrap_or(&self.default_material)
    }

    /// Single-threaded preparation; must run before rendering.
    ///
    /// Fills emitter strengths, turns emissive triangles into point
    /// lights and computes the derived bounds. Calling it again is a no-op.
    pub fn finalize(&mut self) {
        if self.finalized {
            log::warn!("Scene already finalized");
            return;
        }
        self.finalized = true;

        self.fill_light_strengths();
        self.emissive_lights();

        self.update_bounds();
        log::info!("Ambient max radius: {}", self.short_radius);

        self.stats = SceneStats {
            objects: self.objects.len(),
            triangles: self.objects.iter().map(|o| o.triangles.len()).sum(),
            vertices: self.objects.iter().map(|o| o.triangles.len() * 3).sum(),
            materials: self.materials.len(),
            lights: self.lights.len(),
        };
        log::info!(
            "Scene: {} objects, {} triangles, {} materials, {} lights",
            self.stats.objects,
            self.stats.triangles,
            self.stats.materials,
            self.stats.lights
        );
    }

    fn update_bounds(&mut self) {
        self.bounds = self
            .objects
            .iter()
            .fold(Aabb::EMPTY, |acc, obj| Aabb::surrounding(&acc, &obj.bounding_box()));
        self.short_radius = if self.bounds.is_empty() {
            0.0
        } else {
            self.bounds.shortest_extent() / 2.0
        };
    }

    /// Emitters without a strength take the first active point light's.
    fn fill_light_strengths(&mut self) {
        let Some(strength) = self
            .lights
            .iter()
            .find(|l| l.active && !l.directional)
            .map(|l| l.strength)
        else {
            return;
        };

        for material in self.materials.iter_mut().filter(|m| m.light && m.light_strength == 0.0) {
            material.light_strength = strength;
        }
    }

    fn emissive_lights(&mut self) {
        let samples = self.config.sampler_limit;
        let mut added = 0;

        for object in &self.objects {
            for triangle in &object.triangles {
                let material = self.material(triangle.material);
                if !material.light {
                    continue;
                }
                let (color, strength) = (material.color, material.light_strength * 100.0);
                for position in triangle.sample_points(samples) {
                    self.lights.push(Light::point(position, color, strength));
                    added += 1;
                }
            }
        }

        if added > 0 {
            log::debug!("Added {} point lights for emissive triangles", added);
        }
    }

    /// Decode every texture referenced by a material.
    ///
    /// Failures are logged and skipped; the affected materials render with
    /// their plain colour.
    pub fn load_textures(&mut self) {
        for name in self.materials.iter().filter_map(|m| m.texture.as_deref()) {
            if let Err(err) = self.textures.load(name) {
                log::warn!("Material texture {} can't be loaded: {}", name, err);
            }
        }
    }

    /// A distance from which any point of the scene is still reachable,
    /// used as the origin distance of rays coming from infinitely far away.
    ///
    /// Only meaningful once the scene is finalized.
    pub fn far_distance(&self) -> f32 {
        debug_assert!(self.finalized, "far_distance read before Scene::finalize");
        self.bounds.diagonal() + 1.0
    }
}
