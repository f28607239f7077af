//! Glint Renderer - CPU Progressive Path Tracing
//!
//! A Monte Carlo path tracer over a scene of spheres:
//! camera rays with optional thin-lens defocus, closest-hit scene scans,
//! diffuse / metal / dielectric / emissive scattering, an iterative
//! integrator, and a running-mean frame accumulator.

mod accumulator;
mod bucket;
mod camera;
mod error;
mod hittable;
mod material;
mod progressive;
mod renderer;
mod sampling;
mod sphere;
mod world;

pub use accumulator::Accumulator;
pub use bucket::{
    generate_buckets, render_bucket, render_frame, render_frame_cancellable, Bucket,
    BucketResult, DEFAULT_BUCKET_SIZE,
};
pub use camera::{Camera, CameraSettings};
pub use error::{AccumulateError, AccumulateResult, ConfigError, ConfigResult};
pub use hittable::{HitRecord, Hittable};
pub use material::{reflectance, Color, Material, ScatterResult};
pub use progressive::ProgressiveRenderer;
pub use renderer::{
    color_to_rgba, linear_to_gamma, linear_to_gamma_vec3, ray_color, render_pixel, Background,
    ImageBuffer, RenderConfig, RAY_NUDGE, T_MIN,
};
pub use sampling::{
    gen_f32, random_in_unit_disk, random_unit_vector, sample_rng, sample_square, stream_seed,
};
pub use sphere::Sphere;
pub use world::World;

/// Re-export Vec3 and common math types from glint_math
pub use glint_math::{Interval, Ray, Vec3};
