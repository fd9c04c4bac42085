//! Lume math - the geometry kernel shared by the scene and the tracer.
//!
//! Points and directions are `Vec3`, colour and light energy are `Vec4`
//! (see [`Energy`]). Nothing in here carries state.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod interval;
mod ray;
mod vector;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
pub use vector::{barycentric, clamp_color, reflect, refract, same_side};

/// RGBA colour or light energy accumulator.
///
/// `w` is either alpha or a sample weight depending on where the value
/// comes from; the caller knows which.
pub type Energy = Vec4;
