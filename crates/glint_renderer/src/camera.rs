//! Camera for ray generation.

use crate::bucket::render_frame;
use crate::error::{ConfigError, ConfigResult};
use crate::renderer::{ImageBuffer, RenderConfig};
use crate::sampling::{random_in_unit_disk, sample_square};
use crate::world::World;
use glint_math::{Ray, Vec3};
use rand::RngCore;

/// User-facing camera parameters. Call [`CameraSettings::build`] to
/// validate them and derive the viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraSettings {
    // Image settings
    pub image_width: u32,
    pub image_height: u32,

    // Camera positioning
    pub look_from: Vec3,
    pub look_at: Vec3,
    pub vup: Vec3,

    // Lens settings
    pub vfov: f32,          // Vertical field of view in degrees
    pub defocus_angle: f32, // Variation angle of rays through each pixel
    pub focus_dist: f32,    // Distance from camera to plane of perfect focus
}

impl CameraSettings {
    /// Create camera settings with default values.
    pub fn new() -> Self {
        Self {
            image_width: 800,
            image_height: 450,
            look_from: Vec3::new(0.0, 0.0, 0.0),
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::new(0.0, 1.0, 0.0),
            vfov: 90.0,
            defocus_angle: 0.0,
            focus_dist: 1.0,
        }
    }

    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width;
        self.image_height = height;
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f32, defocus_angle: f32, focus_dist: f32) -> Self {
        self.vfov = vfov;
        self.defocus_angle = defocus_angle;
        self.focus_dist = focus_dist;
        self
    }

    /// Check that the settings describe a non-degenerate viewport.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.image_width == 0 || self.image_height == 0 {
            return Err(ConfigError::InvalidResolution {
                width: self.image_width,
                height: self.image_height,
            });
        }
        if !(self.vfov.is_finite() && self.vfov > 0.0 && self.vfov < 180.0) {
            return Err(ConfigError::InvalidFieldOfView(self.vfov));
        }
        if !(self.defocus_angle.is_finite()
            && self.defocus_angle >= 0.0
            && self.defocus_angle < 180.0)
        {
            return Err(ConfigError::InvalidDefocusAngle(self.defocus_angle));
        }
        if !(self.focus_dist.is_finite() && self.focus_dist > 0.0) {
            return Err(ConfigError::InvalidFocusDistance(self.focus_dist));
        }

        let view = self.look_from - self.look_at;
        if !view.is_finite() || view.length_squared() <= f32::EPSILON {
            return Err(ConfigError::DegenerateView);
        }
        let up = self.vup.normalize_or_zero();
        if up == Vec3::ZERO || up.cross(view.normalize()).length() < 1e-6 {
            return Err(ConfigError::DegenerateUpVector);
        }
        Ok(())
    }

    /// Validate the settings and derive the camera's viewport geometry.
    pub fn build(&self) -> ConfigResult<Camera> {
        self.validate()?;

        let center = self.look_from;

        // Calculate viewport dimensions
        let theta = self.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h * self.focus_dist;
        let viewport_width =
            viewport_height * (self.image_width as f32 / self.image_height as f32);

        // Calculate camera basis vectors
        let w = (self.look_from - self.look_at).normalize();
        let u = self.vup.cross(w).normalize();
        let v = w.cross(u);

        // Viewport edges; v runs down the image so row 0 is the top
        let viewport_u = viewport_width * u;
        let viewport_v = -viewport_height * v;

        let pixel_delta_u = viewport_u / self.image_width as f32;
        let pixel_delta_v = viewport_v / self.image_height as f32;

        // Calculate upper left pixel location
        let viewport_upper_left = center - self.focus_dist * w - viewport_u / 2.0 - viewport_v / 2.0;
        let pixel00_loc = viewport_upper_left + 0.5 * (pixel_delta_u + pixel_delta_v);

        // Calculate defocus disk basis vectors
        let defocus_radius = self.focus_dist * (self.defocus_angle / 2.0).to_radians().tan();

        log::debug!(
            "Camera {}x{} vfov={} defocus={} focus={}",
            self.image_width,
            self.image_height,
            self.vfov,
            self.defocus_angle,
            self.focus_dist
        );

        Ok(Camera {
            image_width: self.image_width,
            image_height: self.image_height,
            center,
            pixel00_loc,
            pixel_delta_u,
            pixel_delta_v,
            defocus_angle: self.defocus_angle,
            defocus_disk_u: u * defocus_radius,
            defocus_disk_v: v * defocus_radius,
        })
    }
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self::new()
    }
}

/// Camera for generating rays into the scene. Immutable once built.
#[derive(Debug, Clone)]
pub struct Camera {
    image_width: u32,
    image_height: u32,
    center: Vec3,
    pixel00_loc: Vec3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
    defocus_angle: f32,
    defocus_disk_u: Vec3,
    defocus_disk_v: Vec3,
}

impl Camera {
    pub fn image_width(&self) -> u32 {
        self.image_width
    }

    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    /// Camera center (look-from point).
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Point at the center of pixel (i, j) on the plane of focus.
    pub fn pixel_center(&self, i: u32, j: u32) -> Vec3 {
        self.pixel00_loc + (i as f32) * self.pixel_delta_u + (j as f32) * self.pixel_delta_v
    }

    /// Generate a ray for pixel (i, j) with random sampling.
    ///
    /// The target is jittered within the pixel; with a positive defocus
    /// angle the origin is drawn from the lens disk. `ray.at(1.0)` is always
    /// the jittered target on the plane of focus.
    pub fn get_ray(&self, i: u32, j: u32, rng: &mut dyn RngCore) -> Ray {
        let offset = sample_square(rng);

        let pixel_sample = self.pixel00_loc
            + ((i as f32) + offset.x) * self.pixel_delta_u
            + ((j as f32) + offset.y) * self.pixel_delta_v;

        let ray_origin = if self.defocus_angle <= 0.0 {
            self.center
        } else {
            self.defocus_disk_sample(rng)
        };

        Ray::new(ray_origin, pixel_sample - ray_origin)
    }

    /// Render one frame of linear radiance, `samples_per_pixel` paths per pixel.
    pub fn render(&self, world: &World, config: &RenderConfig, frame_index: u64) -> ImageBuffer {
        render_frame(self, world, config, frame_index)
    }

    /// Sample a point on the defocus disk.
    fn defocus_disk_sample(&self, rng: &mut dyn RngCore) -> Vec3 {
        let p = random_in_unit_disk(rng);
        self.center + p.x * self.defocus_disk_u + p.y * self.defocus_disk_v
    }
}
