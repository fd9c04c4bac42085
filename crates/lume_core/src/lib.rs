//! Lume Core - scene snapshot for the Lume ray tracer.
//!
//! This crate provides:
//!
//! - **Scene types**: `Scene`, `Object`, `Triangle`, `Material`, `Light`
//! - **Spatial index**: `KdTree`, one per object
//! - **Configuration**: `Config`, loaded from JSON
//! - **Textures**: `TextureCache` and the `TextureLookup` trait
//! - **Mesh flattening**: `Mesh::to_triangles` bakes a model matrix into
//!   world-space triangles
//!
//! # Example
//!
//! ```ignore
//! use lume_core::{Config, Material, Mesh, Scene};
//!
//! let mut scene = Scene::new(Config::load("config.json")?);
//! let grey = scene.add_material(Material::default());
//! scene.add_object("floor", floor_mesh.to_triangles(Mat4::IDENTITY, grey, false))?;
//! scene.finalize();
//! ```

pub mod config;
pub mod kdtree;
pub mod light;
pub mod material;
pub mod mesh;
pub mod object;
pub mod scene;
pub mod texture;
pub mod triangle;

// Re-export commonly used types
pub use config::{Config, ConfigError, ConfigResult};
pub use kdtree::KdTree;
pub use light::{Light, Photon};
pub use material::Material;
pub use mesh::Mesh;
pub use object::Object;
pub use scene::{Observer, Scene, SceneError, SceneResult, SceneStats};
pub use texture::{Texture, TextureCache, TextureError, TextureLookup, TextureResult};
pub use triangle::{Triangle, TriangleHit};
