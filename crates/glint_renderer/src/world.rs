//! The scene aggregate: spheres plus their material table.

use crate::error::ConfigResult;
use crate::hittable::{HitRecord, Hittable};
use crate::material::Material;
use crate::sphere::Sphere;
use glint_math::{Interval, Ray};

/// A fixed collection of spheres and the materials they reference.
///
/// Sphere `i` is bound to material `i`; ids are assigned once on
/// construction and never change.
#[derive(Debug, Clone, Default)]
pub struct World {
    spheres: Vec<Sphere>,
    materials: Vec<Material>,
}

impl World {
    /// Build a world from (sphere, material) pairs, validating each.
    pub fn new<I>(objects: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = (Sphere, Material)>,
    {
        let mut spheres = Vec::new();
        let mut materials = Vec::new();

        for (index, (mut sphere, material)) in objects.into_iter().enumerate() {
            sphere.validate(index)?;
            material.validate(index)?;
            sphere.set_material_id(index);
            spheres.push(sphere);
            materials.push(material);
        }

        log::debug!("World built with {} spheres", spheres.len());
        Ok(Self { spheres, materials })
    }

    /// Look up the material referenced by a hit record.
    #[inline]
    pub fn material(&self, material_id: usize) -> &Material {
        &self.materials[material_id]
    }

    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.spheres.len()
    }

    /// Check if the world is empty.
    pub fn is_empty(&self) -> bool {
        self.spheres.is_empty()
    }
}

impl Hittable for World {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let mut closest: Option<HitRecord> = None;
        let mut closest_so_far = ray_t.max;

        for sphere in &self.spheres {
            if let Some(rec) = sphere.hit(ray, ray_t.with_max(closest_so_far)) {
                closest_so_far = rec.t;
                closest = Some(rec);
            }
        }

        closest
    }
}
