//! Texture loading and caching for materials.
//!
//! Textures are decoded once while the scene is prepared and looked up by
//! name during shading. Lookups never fail: a missing texture is simply
//! reported as `None` so the caller can fall back to the material colour.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lume_math::{Energy, Vec2};
use thiserror::Error;

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

pub type TextureResult<T> = Result<T, TextureError>;

/// A decoded texture.
///
/// Pixels hold the raw 8-bit channel values scaled to 0-1, row-major with
/// the first row at the top of the image.
#[derive(Clone, Debug)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[f32; 4]>,
}

impl Texture {
    pub fn new(width: u32, height: u32, pixels: Vec<[f32; 4]>) -> Self {
        Self { width, height, pixels }
    }

    /// Create a solid color texture (1x1).
    pub fn solid_color(color: Energy) -> Self {
        Self::new(1, 1, vec![color.to_array()])
    }

    /// Nearest pixel for image coordinates `u, v` in [0, 1), origin top-left.
    pub fn pixel_at(&self, u: f32, v: f32) -> Energy {
        if self.width == 0 || self.height == 0 {
            return Energy::new(0.0, 0.0, 0.0, 1.0);
        }

        let x = ((self.width as f32 * u) as u32).min(self.width - 1);
        let y = ((self.height as f32 * v) as u32).min(self.height - 1);
        let idx = (y * self.width + x) as usize;

        self.pixels
            .get(idx)
            .map(|p| Energy::from_array(*p))
            .unwrap_or(Energy::new(0.0, 0.0, 0.0, 1.0))
    }

    fn size_bytes(&self) -> usize {
        self.pixels.len() * std::mem::size_of::<[f32; 4]>()
    }
}

/// Read-only texture access used while shading.
pub trait TextureLookup {
    /// Colour of texture `name` at image coordinates `uv` (see
    /// [`Texture::pixel_at`]), or `None` if it is not available.
    fn sample(&self, name: &str, uv: Vec2) -> Option<Energy>;
}

/// Cache of decoded textures, keyed by the name materials refer to them by.
#[derive(Debug, Default, Clone)]
pub struct TextureCache {
    textures: HashMap<String, Arc<Texture>>,

    /// Base directory for resolving relative paths
    base_dir: Option<PathBuf>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a texture cache with a base directory for relative paths.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            textures: HashMap::new(),
            base_dir: Some(base_dir.into()),
        }
    }

    /// Load a texture from file, using the cache if available.
    pub fn load(&mut self, name: &str) -> TextureResult<Arc<Texture>> {
        if let Some(texture) = self.textures.get(name) {
            return Ok(texture.clone());
        }

        let full_path = self.resolve_path(name);
        let texture = Arc::new(load_texture_file(&full_path)?);
        self.textures.insert(name.to_string(), texture.clone());

        log::debug!(
            "Loaded texture: {} ({}x{}, {:.1} KB)",
            name,
            texture.width,
            texture.height,
            texture.size_bytes() as f32 / 1024.0
        );

        Ok(texture)
    }

    /// Register an already decoded texture under `name`.
    pub fn insert(&mut self, name: impl Into<String>, texture: Texture) {
        self.textures.insert(name.into(), Arc::new(texture));
    }

    pub fn get(&self, name: &str) -> Option<Arc<Texture>> {
        self.textures.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);

        match &self.base_dir {
            Some(base) if !path.is_absolute() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl TextureLookup for TextureCache {
    fn sample(&self, name: &str, uv: Vec2) -> Option<Energy> {
        self.textures.get(name).map(|t| t.pixel_at(uv.x, uv.y))
    }
}

fn load_texture_file(path: &Path) -> TextureResult<Texture> {
    let bytes = std::fs::read(path)?;
    let img = image::load_from_memory(&bytes).map_err(|source| TextureError::Decode {
        path: path.display().to_string(),
        source,
    })?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let pixels = rgba
        .pixels()
        .map(|p| p.0.map(|c| c as f32 / 255.0))
        .collect();

    Ok(Texture::new(width, height, pixels))
}
