//! Surface materials.

use lume_math::Energy;
use serde::Deserialize;

/// Surface description shared by all triangles that reference it.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Material {
    /// Diffuse colour (RGBA, 0-1)
    pub color: Energy,

    /// Texture identifier, resolved through the scene's texture cache
    pub texture: Option<String>,

    /// True if the surface emits light
    pub light: bool,

    /// Emission strength. For emitters left at zero this is filled from the
    /// first point light during scene finalisation.
    pub light_strength: f32,

    /// Blend weight of the reflected colour (0 = matte, 1 = mirror)
    pub glossiness: f32,

    /// Spread of reflected/refracted directions (0 = perfectly sharp)
    pub roughness: f32,

    /// Blend weight of the refracted colour (0 = opaque)
    pub transmission: f32,

    #[serde(rename = "ior")]
    pub index_of_refraction: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Energy::new(0.5, 0.5, 0.5, 1.0), // Grey default
            texture: None,
            light: false,
            light_strength: 0.0,
            glossiness: 0.0,
            roughness: 0.0,
            transmission: 0.0,
            index_of_refraction: 1.0,
        }
    }
}

impl Material {
    /// Plain diffuse material.
    pub fn diffuse(color: Energy) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    /// Light-emitting material.
    pub fn emitter(color: Energy, strength: f32) -> Self {
        Self {
            color,
            light: true,
            light_strength: strength,
            ..Default::default()
        }
    }

    pub fn with_glossiness(mut self, glossiness: f32) -> Self {
        self.glossiness = glossiness;
        self
    }

    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness;
        self
    }

    pub fn with_transmission(mut self, transmission: f32, ior: f32) -> Self {
        self.transmission = transmission;
        self.index_of_refraction = ior;
        self
    }

    pub fn with_texture(mut self, texture: impl Into<String>) -> Self {
        self.texture = Some(texture.into());
        self
    }

    /// True if rays bounce off or through this surface.
    pub fn is_specular(&self) -> bool {
        self.glossiness > 0.0 || self.transmission > 0.0
    }
}
