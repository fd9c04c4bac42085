//! Render configuration.
//!
//! The configuration is an explicit value handed to the scene and the
//! tracer. There is no global instance, so independent configurations can
//! be used side by side (tests rely on this).

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur while loading a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Settings consumed by the tracing core.
///
/// Field names follow the JSON keys of the scene configuration files.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rays per ambient sample set, also lights per emissive triangle
    pub sampler_limit: usize,

    /// Distance beyond which lights are not considered (kept for scene files)
    #[serde(rename = "light_distance")]
    pub light_hard_limit: f32,

    /// Recursion limit for reflection and refraction rays
    pub max_reflection_depth: u32,

    /// Offset applied along the normal when casting secondary rays
    pub ray_correction: f32,

    /// Scale of the ambient occlusion term added to direct light
    pub occlusion_rate: f32,

    /// Sample rays travelling farther than this count as unoccluded.
    /// Zero uses half the shortest scene extent.
    #[serde(rename = "ambient_occlusion_radius")]
    pub ambient_radius: f32,

    pub render_occlusion: bool,
    pub render_lights: bool,
    pub render_colors: bool,
    #[serde(rename = "render_ambient_color")]
    pub render_ambient_colors: bool,

    /// Blend factor between surface colour and gathered ambient colour
    #[serde(rename = "ambient_color_ratio")]
    pub ambient_color_sharing_ratio: f32,

    pub render_reflections: bool,

    /// Output size; used by the image assembly outside the core
    pub width: u32,
    pub height: u32,

    /// Consumed by post-processing, not by the tracer
    pub edge_detect_threshold: f32,

    /// Global multiplier turning light intensity into output energy
    pub exposure: f32,

    /// Shadow rays per directional light
    pub light_sample_count: usize,

    /// Radius around a hit point in which stored photons are gathered
    pub photon_spacing: f32,
    pub render_caustics: bool,

    /// Minimum photon energy worth storing. Zero disables the photon map.
    pub caustics_threshold: f32,

    /// Photons emitted per light when building the photon map
    pub caustics_photons: usize,

    /// Upper bound on shading tasks alive at once. Beyond it, fan-outs run
    /// serially on the calling thread.
    pub max_parallel_tasks: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sampler_limit: 16,
            light_hard_limit: 0.0,
            max_reflection_depth: 3,
            ray_correction: 0.001,
            occlusion_rate: 0.2,
            ambient_radius: 0.0,
            render_occlusion: false,
            render_lights: true,
            render_colors: true,
            render_ambient_colors: false,
            ambient_color_sharing_ratio: 0.2,
            render_reflections: true,
            width: 640,
            height: 480,
            edge_detect_threshold: 0.0,
            exposure: 1.0,
            light_sample_count: 8,
            photon_spacing: 0.1,
            render_caustics: false,
            caustics_threshold: 0.0,
            caustics_photons: 10_000,
            max_parallel_tasks: 64,
        }
    }
}

impl Config {
    /// Load a configuration file and validate it.
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        log::info!("Loading configuration from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Parse a configuration from JSON. Missing keys keep their defaults.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the tracer cannot work with.
    pub fn validate(&self) -> ConfigResult<()> {
        if !(0.0..=1.0).contains(&self.ambient_color_sharing_ratio) {
            return Err(ConfigError::Invalid {
                field: "ambient_color_ratio",
                reason: format!("{} is outside [0, 1]", self.ambient_color_sharing_ratio),
            });
        }
        if self.exposure < 0.0 || !self.exposure.is_finite() {
            return Err(ConfigError::Invalid {
                field: "exposure",
                reason: format!("{} is not a finite non-negative number", self.exposure),
            });
        }
        if self.ray_correction < 0.0 {
            return Err(ConfigError::Invalid {
                field: "ray_correction",
                reason: "must not be negative".to_string(),
            });
        }
        if self.photon_spacing < 0.0 {
            return Err(ConfigError::Invalid {
                field: "photon_spacing",
                reason: "must not be negative".to_string(),
            });
        }
        Ok(())
    }
}
