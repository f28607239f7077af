//! Core path tracing integrator.
//!
//! Implements Monte Carlo path tracing with:
//! - An iterative bounce loop bounded by `max_depth`
//! - Anti-aliasing via multi-sampling with an independent random stream per sample
//! - Gamma encoding for display

use crate::camera::Camera;
use crate::error::{ConfigError, ConfigResult};
use crate::hittable::Hittable;
use crate::material::Color;
use crate::sampling::sample_rng;
use crate::world::World;
use glint_math::{Interval, Ray};
use rand::RngCore;

/// Lower bound of the intersection interval for every bounce.
pub const T_MIN: f32 = 0.001;

/// Distance a scattered ray's origin is pushed along its own direction.
pub const RAY_NUDGE: f32 = 1e-4;

/// Display gamma.
const GAMMA: f32 = 2.2;

/// Radiance returned by rays that leave the scene.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Background {
    /// Vertical white-to-sky-blue gradient on the ray's unit Y component.
    #[default]
    Sky,
    /// A single constant color.
    Solid(Color),
}

impl Background {
    /// Radiance seen along `ray` when it escapes.
    pub fn color(&self, ray: &Ray) -> Color {
        match *self {
            Background::Sky => sky_gradient(ray),
            Background::Solid(color) => color,
        }
    }
}

/// Render configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Radiance for rays that miss everything
    pub background: Background,
    /// Base seed for every per-sample random stream
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 10,
            max_depth: 50,
            background: Background::Sky,
            seed: 0,
        }
    }
}

impl RenderConfig {
    /// Reject sample counts and depths that would render nothing.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.samples_per_pixel == 0 {
            return Err(ConfigError::ZeroSamples);
        }
        if self.max_depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        Ok(())
    }
}

/// Compute the color seen by a ray.
///
/// Follows the path for at most `depth` intersections, multiplying the
/// running throughput by each bounce's attenuation. A path that escapes
/// returns `throughput * background`, one that hits a light returns
/// `throughput * emission`, one that is absorbed or runs out of depth
/// returns black.
pub fn ray_color(
    ray: &Ray,
    world: &World,
    depth: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let mut ray = *ray;
    let mut throughput = Color::ONE;

    for _ in 0..depth {
        let Some(rec) = world.hit(&ray, Interval::new(T_MIN, f32::INFINITY)) else {
            return throughput * config.background.color(&ray);
        };

        let material = world.material(rec.material_id);
        match material.scatter(&ray, &rec, rng) {
            Some(result) => {
                throughput *= result.attenuation;
                ray = result.scattered.nudged(RAY_NUDGE);
            }
            None => return throughput * material.emitted(),
        }
    }

    Color::ZERO
}

/// Compute sky gradient background.
fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction().normalize();
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

/// Apply gamma correction (gamma = 2.2).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.powf(1.0 / GAMMA)
    } else {
        0.0
    }
}

/// Gamma-encode each channel of a linear color.
#[inline]
pub fn linear_to_gamma_vec3(color: Color) -> Color {
    Color::new(
        linear_to_gamma(color.x),
        linear_to_gamma(color.y),
        linear_to_gamma(color.z),
    )
}

/// Convert an already gamma-encoded color to 8-bit RGBA, clamping to [0, 1].
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let r = (255.0 * Interval::UNIT.clamp(color.x)) as u8;
    let g = (255.0 * Interval::UNIT.clamp(color.y)) as u8;
    let b = (255.0 * Interval::UNIT.clamp(color.z)) as u8;
    [r, g, b, 255]
}

/// Render a single pixel with multi-sampling.
///
/// Each sample draws from its own random stream keyed on
/// `(config.seed, frame_index, pixel, sample)`.
pub fn render_pixel(
    camera: &Camera,
    world: &World,
    x: u32,
    y: u32,
    config: &RenderConfig,
    frame_index: u64,
) -> Color {
    let pixel_index = y as u64 * camera.image_width() as u64 + x as u64;
    let mut pixel_color = Color::ZERO;

    for sample in 0..config.samples_per_pixel {
        let mut rng = sample_rng(config.seed, frame_index, pixel_index, sample as u64);
        let ray = camera.get_ray(x, y, &mut rng);
        pixel_color += ray_color(&ray, world, config.max_depth, config, &mut rng);
    }

    // Average the samples
    pixel_color / config.samples_per_pixel as f32
}

/// Row-major grid of colors.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Color::ZERO)
    }

    /// Create a new image buffer filled with one color.
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CameraSettings, Material, Sphere, Vec3};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn single_sphere(material: Material) -> World {
        World::new(vec![(Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5), material)]).unwrap()
    }

    #[test]
    fn test_sky_gradient() {
        let up_color = sky_gradient(&Ray::new(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0)));
        let down_color = sky_gradient(&Ray::new(Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0)));
        let level = sky_gradient(&Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -3.0)));

        assert!((up_color - Color::new(0.5, 0.7, 1.0)).length() < 1e-6);
        assert!((down_color - Color::ONE).length() < 1e-6);
        assert!((level - Color::new(0.75, 0.85, 1.0)).length() < 1e-6);
    }

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert_eq!(linear_to_gamma(-0.5), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 1e-6);
        assert!((linear_to_gamma(0.5) - 0.5f32.powf(1.0 / 2.2)).abs() < 1e-6);
        assert!((linear_to_gamma(0.218) - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_color_to_rgba_clamps() {
        assert_eq!(color_to_rgba(Color::new(-1.0, 0.5, 2.0)), [0, 127, 255, 255]);
    }

    #[test]
    fn test_miss_returns_background() {
        let world = single_sphere(Material::diffuse(Color::ONE));
        let config = RenderConfig::default();
        let mut rng = SmallRng::seed_from_u64(1);

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.3, 0.8, 0.2));
        let color = ray_color(&ray, &world, 10, &config, &mut rng);
        assert_eq!(color, sky_gradient(&ray));

        let solid = RenderConfig {
            background: Background::Solid(Color::new(0.2, 0.4, 0.6)),
            ..RenderConfig::default()
        };
        assert_eq!(
            ray_color(&ray, &world, 10, &solid, &mut rng),
            Color::new(0.2, 0.4, 0.6)
        );
    }

    #[test]
    fn test_zero_depth_is_black() {
        let world = World::default();
        let config = RenderConfig::default();
        let mut rng = SmallRng::seed_from_u64(1);

        let ray = Ray::new(Vec3::ZERO, Vec3::Y);
        assert_eq!(ray_color(&ray, &world, 0, &config, &mut rng), Color::ZERO);
    }

    #[test]
    fn test_depth_exhaustion_is_black() {
        let world = single_sphere(Material::diffuse(Color::ONE));
        let config = RenderConfig::default();
        let mut rng = SmallRng::seed_from_u64(1);

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(ray_color(&ray, &world, 1, &config, &mut rng), Color::ZERO);
    }

    #[test]
    fn test_emissive_hit_returns_emission() {
        let world = single_sphere(Material::emissive(Color::new(1.0, 0.5, 0.25), 4.0));
        let config = RenderConfig::default();
        let mut rng = SmallRng::seed_from_u64(1);

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let color = ray_color(&ray, &world, 5, &config, &mut rng);
        assert!((color - Color::new(4.0, 2.0, 1.0)).length() < 1e-6);
    }

    #[test]
    fn test_diffuse_bounce_is_attenuated_background() {
        // One bounce off a half-grey sphere then out to a white background
        let world = single_sphere(Material::diffuse(Color::splat(0.5)));
        let config = RenderConfig {
            background: Background::Solid(Color::ONE),
            ..RenderConfig::default()
        };
        let mut rng = SmallRng::seed_from_u64(8);

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        for _ in 0..64 {
            let color = ray_color(&ray, &world, 2, &config, &mut rng);
            assert!((color - Color::splat(0.5)).length() < 1e-6);
        }
    }

    #[test]
    fn test_render_pixel_hits_sphere() {
        let world = single_sphere(Material::diffuse(Color::new(0.5, 0.5, 0.5)));
        let camera = CameraSettings::new().with_resolution(10, 10).build().unwrap();
        let config = RenderConfig {
            samples_per_pixel: 4,
            max_depth: 5,
            ..RenderConfig::default()
        };

        let center = render_pixel(&camera, &world, 5, 5, &config, 0);
        let corner = render_pixel(&camera, &world, 0, 0, &config, 0);

        assert!(center.length() > 0.0);
        assert!(center.x < corner.x);
    }

    #[test]
    fn test_render_pixel_is_deterministic_per_frame() {
        let world = single_sphere(Material::dielectric(1.5));
        let camera = CameraSettings::new().with_resolution(8, 8).build().unwrap();
        let config = RenderConfig::default();

        let a = render_pixel(&camera, &world, 4, 4, &config, 3);
        let b = render_pixel(&camera, &world, 4, 4, &config, 3);
        assert_eq!(a, b);
    }

    #[test]
    fn test_config_validation() {
        assert!(RenderConfig::default().validate().is_ok());
        let zero_spp = RenderConfig {
            samples_per_pixel: 0,
            ..RenderConfig::default()
        };
        assert_eq!(zero_spp.validate(), Err(ConfigError::ZeroSamples));
        let zero_depth = RenderConfig {
            max_depth: 0,
            ..RenderConfig::default()
        };
        assert_eq!(zero_depth.validate(), Err(ConfigError::ZeroDepth));
    }
}
