//! Vector helpers used by surface scattering.

use crate::Vec3;

/// Component magnitude below which a direction counts as degenerate.
pub const NEAR_ZERO_EPSILON: f32 = 1e-8;

/// True when every component of `v` is smaller than [`NEAR_ZERO_EPSILON`].
#[inline]
pub fn near_zero(v: Vec3) -> bool {
    v.abs().max_element() < NEAR_ZERO_EPSILON
}

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a unit vector through a surface with unit normal `n`.
///
/// `etai_over_etat` is the ratio of refractive indices on the incident and
/// transmitted sides. The result is split into the components perpendicular
/// and parallel to the normal (Snell's law).
#[inline]
pub fn refract(uv: Vec3, n: Vec3, etai_over_etat: f32) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}
