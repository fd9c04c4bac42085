//! Scene fixtures shared by the unit tests.

use lume_core::{Config, Triangle};
use lume_math::Vec3;

/// Every optional term off except direct light and colours.
pub fn plain_config() -> Config {
    Config {
        render_occlusion: false,
        render_ambient_colors: false,
        render_reflections: false,
        render_caustics: false,
        render_lights: true,
        render_colors: true,
        exposure: 1.0,
        ..Default::default()
    }
}

/// Horizontal square facing +Y.
pub fn flat_quad(center: Vec3, half: f32, material: usize) -> Vec<Triangle> {
    let a = center + Vec3::new(-half, 0.0, -half);
    let b = center + Vec3::new(half, 0.0, -half);
    let c = center + Vec3::new(half, 0.0, half);
    let d = center + Vec3::new(-half, 0.0, half);
    vec![Triangle::new([a, c, b], material), Triangle::new([a, d, c], material)]
}

/// Horizontal square facing -Y.
pub fn ceiling_quad(center: Vec3, half: f32, material: usize) -> Vec<Triangle> {
    flat_quad(center, half, material)
        .into_iter()
        .map(|t| {
            let [a, b, c] = t.vertices;
            Triangle::new([a, c, b], material)
        })
        .collect()
}

/// Single triangle in the y = 0 plane facing +Y; the origin lies inside it.
pub fn floor_triangle(material: usize) -> Triangle {
    Triangle::new(
        [
            Vec3::new(-1.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, -1.0),
        ],
        material,
    )
}

/// Closed cube around `center`, faces pointing inwards.
pub fn closed_box(center: Vec3, half: f32, material: usize) -> Vec<Triangle> {
    let corner = |x: f32, y: f32, z: f32| center + Vec3::new(x, y, z) * half;
    let faces = [
        // floor, ceiling
        [corner(-1.0, -1.0, -1.0), corner(-1.0, -1.0, 1.0), corner(1.0, -1.0, 1.0), corner(1.0, -1.0, -1.0)],
        [corner(-1.0, 1.0, -1.0), corner(1.0, 1.0, -1.0), corner(1.0, 1.0, 1.0), corner(-1.0, 1.0, 1.0)],
        // -x, +x
        [corner(-1.0, -1.0, -1.0), corner(-1.0, 1.0, -1.0), corner(-1.0, 1.0, 1.0), corner(-1.0, -1.0, 1.0)],
        [corner(1.0, -1.0, -1.0), corner(1.0, -1.0, 1.0), corner(1.0, 1.0, 1.0), corner(1.0, 1.0, -1.0)],
        // -z, +z
        [corner(-1.0, -1.0, -1.0), corner(1.0, -1.0, -1.0), corner(1.0, 1.0, -1.0), corner(-1.0, 1.0, -1.0)],
        [corner(-1.0, -1.0, 1.0), corner(-1.0, 1.0, 1.0), corner(1.0, 1.0, 1.0), corner(1.0, -1.0, 1.0)],
    ];

    faces
        .iter()
        .flat_map(|[a, b, c, d]| [Triangle::new([*a, *b, *c], material), Triangle::new([*a, *c, *d], material)])
        .collect()
}
