//! Free vector helpers that glam does not provide in the form the tracer needs.

use crate::{Vec3, Vec4};

/// Barycentric weights of `p` with respect to triangle `(a, b, c)`.
///
/// Returns `(wa, wb, wc)` with `wa + wb + wc == 1`, or `None` when the
/// triangle is degenerate. `p` is projected onto the triangle's plane.
pub fn barycentric(a: Vec3, b: Vec3, c: Vec3, p: Vec3) -> Option<Vec3> {
    let v0 = b - a;
    let v1 = c - a;
    let v2 = p - a;

    let d00 = v0.dot(v0);
    let d01 = v0.dot(v1);
    let d11 = v1.dot(v1);
    let d20 = v2.dot(v0);
    let d21 = v2.dot(v1);

    let denom = d00 * d11 - d01 * d01;
    if denom.abs() < f32::EPSILON {
        return None;
    }

    let v = (d11 * d20 - d01 * d21) / denom;
    let w = (d00 * d21 - d01 * d20) / denom;
    Some(Vec3::new(1.0 - v - w, v, w))
}

/// Reflect a direction about a normal.
#[inline]
pub fn reflect(direction: Vec3, normal: Vec3) -> Vec3 {
    direction - 2.0 * direction.dot(normal) * normal
}

/// Refract a direction through a surface with index of refraction `ior`.
///
/// Whether the ray enters or leaves the surface is decided by the sign of
/// `direction · normal`. Total internal reflection falls back to [`reflect`].
pub fn refract(direction: Vec3, normal: Vec3, ior: f32) -> Vec3 {
    let mut cos_i = direction.dot(normal).clamp(-1.0, 1.0);
    let (eta, n) = if cos_i < 0.0 {
        cos_i = -cos_i;
        (1.0 / ior, normal)
    } else {
        (ior, -normal)
    };

    let k = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
    if k < 0.0 {
        return reflect(direction, n);
    }
    (eta * direction + (eta * cos_i - k.sqrt()) * n).normalize_or_zero()
}

/// True when `a` and `b` point into the same half-space (`a · b >= threshold`).
#[inline]
pub fn same_side(a: Vec3, b: Vec3, threshold: f32) -> bool {
    a.dot(b) >= threshold
}

/// Clamp the colour channels to [0, 1], leaving `w` untouched.
#[inline]
pub fn clamp_color(color: Vec4) -> Vec4 {
    color.truncate().clamp(Vec3::ZERO, Vec3::ONE).extend(color.w)
}
