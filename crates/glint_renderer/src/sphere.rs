//! Sphere primitive for ray tracing.

use crate::error::{ConfigError, ConfigResult};
use crate::hittable::{HitRecord, Hittable};
use glint_math::{Interval, Ray, Vec3};

/// A sphere primitive referencing a material by index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material_id: usize,
}

impl Sphere {
    /// Create a new sphere.
    ///
    /// The material id is assigned when the sphere is ingested by a
    /// [`World`](crate::World); until then it is 0.
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius,
            material_id: 0,
        }
    }

    /// Create a sphere bound to an explicit material slot.
    pub fn with_material(center: Vec3, radius: f32, material_id: usize) -> Self {
        Self {
            center,
            radius,
            material_id,
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn material_id(&self) -> usize {
        self.material_id
    }

    pub(crate) fn set_material_id(&mut self, material_id: usize) {
        self.material_id = material_id;
    }

    /// Reject spheres whose intersection math would divide by zero or produce NaN.
    pub fn validate(&self, index: usize) -> ConfigResult<()> {
        if !self.center.is_finite() {
            return Err(ConfigError::InvalidCenter { index });
        }
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(ConfigError::InvalidRadius {
                index,
                radius: self.radius,
            });
        }
        Ok(())
    }
}

impl Hittable for Sphere {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let oc = self.center - ray.origin();
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return None;
            }
        }

        let outward_normal = (ray.at(root) - self.center) / self.radius;
        Some(HitRecord::new(ray, root, outward_normal, self.material_id))
    }
}
