//! Light sources and photon records.

use lume_math::{Energy, Vec3};
use serde::Deserialize;

/// A point or directional light.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Light {
    /// World position (point lights)
    pub position: Vec3,

    /// Direction the light travels in (directional lights), normalised
    pub direction: Vec3,

    pub color: Energy,

    #[serde(rename = "light_strength")]
    pub strength: f32,

    pub directional: bool,

    /// Inactive lights are skipped entirely
    pub active: bool,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            direction: Vec3::NEG_Y,
            color: Energy::ONE,
            strength: 1.0,
            directional: false,
            active: true,
        }
    }
}

impl Light {
    pub fn point(position: Vec3, color: Energy, strength: f32) -> Self {
        Self {
            position,
            color,
            strength,
            ..Default::default()
        }
    }

    pub fn directional(direction: Vec3, color: Energy, strength: f32) -> Self {
        Self {
            direction: direction.normalize_or_zero(),
            color,
            strength,
            directional: true,
            ..Default::default()
        }
    }
}

/// Energy deposited on a surface by the photon map builder.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Photon {
    pub location: Vec3,
    pub color: Energy,
}

impl Photon {
    pub fn new(location: Vec3, color: Energy) -> Self {
        Self { location, color }
    }
}
