//! Surface materials.
//!
//! Materials form a closed set dispatched through a single `match`, stored
//! in a flat table indexed by [`HitRecord::material_id`].

use crate::error::{ConfigError, ConfigResult};
use crate::hittable::HitRecord;
use crate::sampling::{gen_f32, random_unit_vector};
use glint_math::{near_zero, reflect, refract, Ray, Vec3};
use rand::RngCore;

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// Outcome of a successful scatter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterResult {
    /// Fraction of light carried back along the path
    pub attenuation: Color,
    /// Outgoing ray
    pub scattered: Ray,
}

/// How light interacts with a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Material {
    /// Lambertian diffuse reflector.
    Diffuse { albedo: Color },
    /// Specular reflector; `roughness` 0.0 = perfect mirror, 1.0 = very rough.
    Metal { albedo: Color, roughness: f32 },
    /// Clear refractive medium (1.0 = air, 1.5 = glass, 2.4 = diamond).
    Dielectric { ior: f32 },
    /// Light source; never scatters.
    Emissive { albedo: Color, intensity: f32 },
}

impl Material {
    pub fn diffuse(albedo: Color) -> Self {
        Material::Diffuse { albedo }
    }

    /// Roughness above 1.0 is clamped to 1.0. NaN is kept so `validate` rejects it.
    pub fn metal(albedo: Color, roughness: f32) -> Self {
        Material::Metal {
            albedo,
            roughness: if roughness > 1.0 { 1.0 } else { roughness },
        }
    }

    pub fn dielectric(ior: f32) -> Self {
        Material::Dielectric { ior }
    }

    pub fn emissive(albedo: Color, intensity: f32) -> Self {
        Material::Emissive { albedo, intensity }
    }

    /// Reject parameters that would poison the estimator with NaN or negative energy.
    pub fn validate(&self, index: usize) -> ConfigResult<()> {
        let invalid = |reason| Err(ConfigError::InvalidMaterial { index, reason });
        match *self {
            Material::Diffuse { albedo } | Material::Metal { albedo, .. } if !albedo.is_finite() => {
                invalid("albedo must be finite")
            }
            Material::Metal { roughness, .. } if !(0.0..=1.0).contains(&roughness) => {
                invalid("metal roughness must be in [0, 1]")
            }
            Material::Dielectric { ior } if !(ior.is_finite() && ior > 0.0) => {
                invalid("index of refraction must be finite and positive")
            }
            Material::Emissive { albedo, intensity }
                if !albedo.is_finite() || !(intensity.is_finite() && intensity >= 0.0) =>
            {
                invalid("emission must be finite and non-negative")
            }
            _ => Ok(()),
        }
    }

    /// Scatter an incoming ray.
    ///
    /// Returns `None` if the ray is absorbed (or, for lights, terminated).
    pub fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        match *self {
            Material::Diffuse { albedo } => {
                let direction = lambertian_direction(rec.normal, random_unit_vector(rng));
                Some(ScatterResult {
                    attenuation: albedo,
                    scattered: Ray::new(rec.p, direction),
                })
            }
            Material::Metal { albedo, roughness } => {
                let reflected = reflect(ray_in.direction().normalize(), rec.normal);
                let direction = if roughness > 0.0 {
                    reflected + roughness * random_unit_vector(rng)
                } else {
                    reflected
                };

                // Fuzz that pushes the ray below the surface is absorbed
                if direction.dot(rec.normal) > 0.0 {
                    Some(ScatterResult {
                        attenuation: albedo,
                        scattered: Ray::new(rec.p, direction),
                    })
                } else {
                    None
                }
            }
            Material::Dielectric { ior } => {
                let refraction_ratio = if rec.front_face { 1.0 / ior } else { ior };

                let unit_direction = ray_in.direction().normalize();
                let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
                let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

                // Total internal reflection
                let cannot_refract = refraction_ratio * sin_theta > 1.0;

                let direction = if cannot_refract
                    || reflectance(cos_theta, refraction_ratio) > gen_f32(rng)
                {
                    reflect(unit_direction, rec.normal)
                } else {
                    refract(unit_direction, rec.normal, refraction_ratio)
                };

                Some(ScatterResult {
                    attenuation: Color::ONE,
                    scattered: Ray::new(rec.p, direction),
                })
            }
            Material::Emissive { .. } => None,
        }
    }

    /// Radiance emitted by this surface. Black for everything but lights.
    pub fn emitted(&self) -> Color {
        match *self {
            Material::Emissive { albedo, intensity } => albedo * intensity,
            _ => Color::ZERO,
        }
    }
}

/// Schlick's approximation for reflectance.
pub fn reflectance(cosine: f32, refraction_ratio: f32) -> f32 {
    let r0 = ((1.0 - refraction_ratio) / (1.0 + refraction_ratio)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

/// Normal plus a random unit vector, falling back to the normal when the
/// two nearly cancel.
#[inline]
fn lambertian_direction(normal: Vec3, unit: Vec3) -> Vec3 {
    let direction = normal + unit;
    if near_zero(direction) {
        normal
    } else {
        direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn hit_from(ray: &Ray, t: f32, outward_normal: Vec3) -> HitRecord {
        HitRecord::new(ray, t, outward_normal, 0)
    }

    #[test]
    fn test_metal_roughness_is_clamped() {
        assert_eq!(
            Material::metal(Color::ONE, 3.0),
            Material::Metal {
                albedo: Color::ONE,
                roughness: 1.0
            }
        );
    }

    #[test]
    fn test_diffuse_always_scatters_nonzero_direction() {
        let material = Material::diffuse(Color::new(0.8, 0.3, 0.3));
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        let rec = hit_from(&ray, 1.0, Vec3::Y);
        let mut rng = SmallRng::seed_from_u64(11);

        for _ in 0..10_000 {
            let result = material.scatter(&ray, &rec, &mut rng).expect("diffuse always scatters");
            assert!(!near_zero(result.scattered.direction()));
            assert_eq!(result.attenuation, Color::new(0.8, 0.3, 0.3));
            assert_eq!(result.scattered.origin(), rec.p);
        }
    }

    #[test]
    fn test_lambertian_direction_falls_back_to_normal() {
        let normal = Vec3::new(0.0, 0.0, 1.0);
        assert_eq!(lambertian_direction(normal, -normal), normal);
        assert_eq!(
            lambertian_direction(normal, Vec3::X),
            Vec3::new(1.0, 0.0, 1.0)
        );
    }

    #[test]
    fn test_smooth_metal_is_perfect_mirror() {
        let material = Material::metal(Color::ONE, 0.0);
        let incoming = Vec3::new(1.0, -2.0, 0.5);
        let ray = Ray::new(Vec3::new(-1.0, 2.0, -0.5), incoming);
        let rec = hit_from(&ray, 1.0, Vec3::Y);
        let mut rng = SmallRng::seed_from_u64(5);

        let expected = reflect(incoming.normalize(), Vec3::Y);
        for _ in 0..16 {
            let result = material.scatter(&ray, &rec, &mut rng).expect("mirror reflects");
            assert_eq!(result.scattered.direction(), expected);
        }
    }

    #[test]
    fn test_rough_metal_below_surface_is_absorbed() {
        let material = Material::metal(Color::ONE, 1.0);
        // Grazing incidence: the mirror direction sits almost in the tangent plane
        let ray = Ray::new(Vec3::new(-1.0, 1e-3, 0.0), Vec3::new(1.0, -1e-3, 0.0));
        let rec = hit_from(&ray, 1.0, Vec3::Y);
        let mut rng = SmallRng::seed_from_u64(9);

        let absorbed = (0..1000)
            .filter(|_| material.scatter(&ray, &rec, &mut rng).is_none())
            .count();
        assert!(absorbed > 0);
        assert!(absorbed < 1000);
    }

    #[test]
    fn test_schlick_at_normal_incidence_equals_r0() {
        let ratio: f32 = 1.0 / 1.5;
        let r0 = ((1.0 - ratio) / (1.0 + ratio)).powi(2);
        assert!((reflectance(1.0, ratio) - r0).abs() < 1e-7);
        assert!((r0 - 0.04).abs() < 1e-6);
    }

    #[test]
    fn test_schlick_at_grazing_incidence_is_total() {
        assert!((reflectance(0.0, 1.0 / 1.5) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_dielectric_total_internal_reflection() {
        let material = Material::dielectric(1.5);
        // Leaving glass at a shallow angle: eta * sin(theta) > 1
        let dir = Vec3::new(1.0, 0.2, 0.0);
        let ray = Ray::new(Vec3::new(-1.0, -0.2, 0.0), dir);
        let rec = hit_from(&ray, 1.0, Vec3::Y);
        assert!(!rec.front_face);
        assert_eq!(rec.normal, -Vec3::Y);
        let mut rng = SmallRng::seed_from_u64(1);

        let expected = reflect(dir.normalize(), rec.normal);
        for _ in 0..64 {
            let result = material.scatter(&ray, &rec, &mut rng).expect("glass always scatters");
            assert!((result.scattered.direction() - expected).length() < 1e-6);
            assert_eq!(result.attenuation, Color::ONE);
        }
    }

    #[test]
    fn test_dielectric_at_normal_incidence_mostly_refracts() {
        let material = Material::dielectric(1.5);
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        let rec = hit_from(&ray, 1.0, Vec3::Y);
        let mut rng = SmallRng::seed_from_u64(21);

        let trials = 20_000;
        let reflected = (0..trials)
            .filter_map(|_| material.scatter(&ray, &rec, &mut rng))
            .filter(|r| r.scattered.direction().y > 0.0)
            .count();
        let fraction = reflected as f32 / trials as f32;
        assert!((fraction - 0.04).abs() < 0.01, "reflected fraction {fraction}");
    }

    #[test]
    fn test_emissive_terminates_and_emits() {
        let light = Material::emissive(Color::new(0.8, 0.8, 0.8), 10.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::Y);
        let rec = hit_from(&ray, 1.0, -Vec3::Y);
        let mut rng = SmallRng::seed_from_u64(0);

        assert!(light.scatter(&ray, &rec, &mut rng).is_none());
        assert!((light.emitted() - Color::splat(8.0)).length() < 1e-5);
        assert_eq!(Material::diffuse(Color::ONE).emitted(), Color::ZERO);
    }

    #[test]
    fn test_validate() {
        assert!(Material::diffuse(Color::ONE).validate(0).is_ok());
        assert!(Material::metal(Color::ONE, -0.1).validate(0).is_err());
        assert!(Material::metal(Color::ONE, f32::NAN).validate(0).is_err());
        assert_eq!(
            Material::metal(Color::ONE, 3.0),
            Material::Metal { albedo: Color::ONE, roughness: 1.0 }
        );
        assert!(Material::dielectric(0.0).validate(0).is_err());
        assert!(Material::dielectric(f32::NAN).validate(0).is_err());
        assert!(Material::emissive(Color::ONE, -1.0).validate(0).is_err());
        assert!(Material::diffuse(Color::splat(f32::NAN)).validate(0).is_err());
    }
}
