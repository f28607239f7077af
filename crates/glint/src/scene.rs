//! Scene descriptions: JSON loading and the built-in demo scene.
//!
//! A scene file looks like:
//!
//! ```json
//! {
//!   "camera": { "width": 400, "height": 225, "look_from": [0, 0, 0], "look_at": [0, 0, -1] },
//!   "render": { "samples_per_pixel": 8, "background": { "type": "sky" } },
//!   "objects": [
//!     { "center": [0, 0, -1], "radius": 0.5,
//!       "material": { "type": "diffuse", "albedo": [0.5, 0.5, 0.5] } }
//!   ]
//! }
//! ```
//!
//! Missing `camera` / `render` fields fall back to renderer defaults.

use std::fs;
use std::path::Path;

use glam::Vec3;
use glint_renderer::{
    Background, CameraSettings, Color, ConfigError, Material, RenderConfig, Sphere, World,
};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur while loading a scene.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid scene: {0}")]
    Config(#[from] ConfigError),
}

pub type SceneResult<T> = Result<T, SceneError>;

/// A validated scene, ready to render.
#[derive(Debug, Clone)]
pub struct Scene {
    pub camera: CameraSettings,
    pub render: RenderConfig,
    pub world: World,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SceneFile {
    #[serde(default)]
    camera: CameraDesc,
    #[serde(default)]
    render: RenderDesc,
    objects: Vec<ObjectDesc>,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct CameraDesc {
    width: u32,
    height: u32,
    look_from: Vec3,
    look_at: Vec3,
    up: Vec3,
    vfov: f32,
    defocus_angle: f32,
    focus_dist: f32,
}

impl Default for CameraDesc {
    fn default() -> Self {
        let s = CameraSettings::default();
        Self {
            width: s.image_width,
            height: s.image_height,
            look_from: s.look_from,
            look_at: s.look_at,
            up: s.vup,
            vfov: s.vfov,
            defocus_angle: s.defocus_angle,
            focus_dist: s.focus_dist,
        }
    }
}

impl From<CameraDesc> for CameraSettings {
    fn from(desc: CameraDesc) -> Self {
        CameraSettings::new()
            .with_resolution(desc.width, desc.height)
            .with_position(desc.look_from, desc.look_at, desc.up)
            .with_lens(desc.vfov, desc.defocus_angle, desc.focus_dist)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RenderDesc {
    samples_per_pixel: u32,
    max_depth: u32,
    seed: u64,
    background: BackgroundDesc,
}

impl Default for RenderDesc {
    fn default() -> Self {
        let c = RenderConfig::default();
        Self {
            samples_per_pixel: c.samples_per_pixel,
            max_depth: c.max_depth,
            seed: c.seed,
            background: BackgroundDesc::Sky,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum BackgroundDesc {
    #[default]
    Sky,
    Solid { color: Vec3 },
}

impl From<RenderDesc> for RenderConfig {
    fn from(desc: RenderDesc) -> Self {
        RenderConfig {
            samples_per_pixel: desc.samples_per_pixel,
            max_depth: desc.max_depth,
            seed: desc.seed,
            background: match desc.background {
                BackgroundDesc::Sky => Background::Sky,
                BackgroundDesc::Solid { color } => Background::Solid(color),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ObjectDesc {
    center: Vec3,
    radius: f32,
    material: MaterialDesc,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum MaterialDesc {
    Diffuse {
        albedo: Vec3,
    },
    Metal {
        albedo: Vec3,
        #[serde(default)]
        roughness: f32,
    },
    Dielectric {
        ior: f32,
    },
    Emissive {
        albedo: Vec3,
        #[serde(default = "default_intensity")]
        intensity: f32,
    },
}

fn default_intensity() -> f32 {
    1.0
}

impl From<MaterialDesc> for Material {
    fn from(desc: MaterialDesc) -> Self {
        match desc {
            MaterialDesc::Diffuse { albedo } => Material::diffuse(albedo),
            MaterialDesc::Metal { albedo, roughness } => Material::metal(albedo, roughness),
            MaterialDesc::Dielectric { ior } => Material::dielectric(ior),
            MaterialDesc::Emissive { albedo, intensity } => Material::emissive(albedo, intensity),
        }
    }
}

/// Parse and validate a scene from JSON text.
pub fn parse_scene(json: &str) -> SceneResult<Scene> {
    let file: SceneFile = serde_json::from_str(json)?;

    let camera = CameraSettings::from(file.camera);
    camera.validate()?;
    let render = RenderConfig::from(file.render);
    render.validate()?;

    let world = World::new(
        file.objects
            .into_iter()
            .map(|o| (Sphere::new(o.center, o.radius), Material::from(o.material))),
    )?;

    Ok(Scene {
        camera,
        render,
        world,
    })
}

/// Load a scene from a JSON file.
pub fn load_scene(path: impl AsRef<Path>) -> SceneResult<Scene> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)?;
    let scene = parse_scene(&json)?;
    log::info!(
        "Loaded {} objects from {}",
        scene.world.len(),
        path.display()
    );
    Ok(scene)
}

/// The built-in scene: an open-fronted box lit by a ceiling light, with
/// metal, glass and diffuse spheres plus a seeded scatter of small ones.
pub fn default_scene(seed: u64) -> SceneResult<Scene> {
    let white = Material::diffuse(Color::new(0.8, 0.8, 0.8));
    let mut objects = vec![
        // Walls are huge spheres whose surfaces are nearly flat inside the box
        (Sphere::new(Vec3::new(0.0, -1001.0, 0.0), 1000.0), white),
        (Sphere::new(Vec3::new(0.0, 1002.0, 0.0), 1000.0), white),
        (Sphere::new(Vec3::new(0.0, 0.0, -1004.0), 1000.0), white),
        (
            Sphere::new(Vec3::new(-1002.0, 0.0, 0.0), 1000.0),
            Material::diffuse(Color::new(0.9, 0.01, 0.01)),
        ),
        (
            Sphere::new(Vec3::new(1002.0, 0.0, 0.0), 1000.0),
            Material::diffuse(Color::new(0.01, 0.9, 0.01)),
        ),
        // Light bulging through the ceiling
        (
            Sphere::new(Vec3::new(0.0, 2.9, -2.0), 1.0),
            Material::emissive(Color::new(0.8, 0.8, 0.8), 10.0),
        ),
        (
            Sphere::new(Vec3::new(-0.9, -0.5, -2.2), 0.5),
            Material::metal(Color::new(0.8, 0.6, 0.2), 0.1),
        ),
        (
            Sphere::new(Vec3::new(0.8, -0.4, -1.6), 0.6),
            Material::dielectric(1.5),
        ),
        (
            Sphere::new(Vec3::new(0.2, -0.7, -3.0), 0.3),
            Material::diffuse(Color::new(0.2, 0.6, 0.8)),
        ),
    ];

    let mut rng = SmallRng::seed_from_u64(seed);
    for a in 0..4 {
        for b in 0..4 {
            let radius = 0.1 + 0.1 * rng.gen::<f32>();
            let center = Vec3::new(
                -1.5 + 0.8 * a as f32 + 0.4 * rng.gen::<f32>(),
                -1.0 + radius,
                -3.6 + 0.8 * b as f32 + 0.4 * rng.gen::<f32>(),
            );

            let clear = objects[6..]
                .iter()
                .all(|(s, _)| (s.center() - center).length() > s.radius() + radius + 0.05);
            if !clear {
                continue;
            }

            let choose_mat: f32 = rng.gen();
            let material = if choose_mat < 0.6 {
                let albedo = Color::new(rng.gen(), rng.gen(), rng.gen())
                    * Color::new(rng.gen(), rng.gen(), rng.gen());
                Material::diffuse(albedo)
            } else if choose_mat < 0.85 {
                let albedo = Color::new(
                    0.5 + 0.5 * rng.gen::<f32>(),
                    0.5 + 0.5 * rng.gen::<f32>(),
                    0.5 + 0.5 * rng.gen::<f32>(),
                );
                Material::metal(albedo, 0.5 * rng.gen::<f32>())
            } else {
                Material::dielectric(1.5)
            };
            objects.push((Sphere::new(center, radius), material));
        }
    }

    let look_from = Vec3::new(0.0, 0.4, 3.0);
    let focus_target = Vec3::new(0.8, -0.4, -1.6);
    let camera = CameraSettings::new()
        .with_resolution(800, 450)
        .with_position(look_from, Vec3::new(0.0, 0.0, -2.0), Vec3::Y)
        .with_lens(55.0, 0.6, (focus_target - look_from).length());

    let world = World::new(objects)?;
    log::info!("Built default scene with {} objects", world.len());

    Ok(Scene {
        camera,
        render: RenderConfig {
            seed,
            ..RenderConfig::default()
        },
        world,
    })
}
