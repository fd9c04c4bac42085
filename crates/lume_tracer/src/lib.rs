//! Lume Tracer - the recursive ray tracing core.
//!
//! Given a prepared [`lume_core::Scene`], a [`Tracer`] answers "what colour
//! is seen along this ray":
//!
//! - **Intersection**: nearest hit across all objects ([`intersect`])
//! - **Light transport**: point lights with hard shadows, directional lights
//!   with soft shadows, caustics from the photon map
//! - **Ambient terms**: hemisphere-sampled occlusion and colour bleeding
//! - **Recursive shading**: glossy reflection and refraction, fanned out
//!   through a bounded [`TaskScheduler`]
//!
//! # Example
//!
//! ```ignore
//! use lume_tracer::{prepare_scene, Tracer};
//!
//! prepare_scene(&mut scene);
//! let tracer = Tracer::new(&scene);
//! let color = tracer.trace(camera_position, ray_direction);
//! ```

mod ambient;
mod intersect;
mod light;
mod photon;
mod prepare;
mod sampling;
mod scheduler;
mod shader;
mod tracer;

#[cfg(test)]
mod testing;

pub use ambient::probe_open_scene;
pub use intersect::{intersect, Intersection, MIN_HIT_DISTANCE};
pub use light::{SHADOW_HIT_TOLERANCE, SOFT_SHADOW_RADIUS};
pub use photon::build_photon_map;
pub use prepare::prepare_scene;
pub use sampling::{hemisphere, jitter_normals, stratified_disk, uniform_sphere};
pub use scheduler::TaskScheduler;
pub use tracer::Tracer;

/// Re-export the scene and math types callers need alongside the tracer
pub use lume_core::{Config, Scene};
pub use lume_math::{Energy, Vec3};
