use std::sync::atomic::Ordering;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, warn};

use glint_renderer::ProgressiveRenderer;

mod cli;
mod output;
mod scene;

use cli::Args;
use output::save_png;
use scene::{default_scene, load_scene, Scene};

/// Command-line values win over the scene file.
fn apply_overrides(args: &Args, scene: &mut Scene) {
    if let Some(width) = args.width {
        scene.camera.image_width = width;
    }
    if let Some(height) = args.height {
        scene.camera.image_height = height;
    }
    if let Some(samples) = args.samples {
        scene.render.samples_per_pixel = samples;
    }
    if let Some(depth) = args.depth {
        scene.render.max_depth = depth;
    }
    if let Some(seed) = args.seed {
        scene.render.seed = seed;
    }
}

/// Convert `--max-seconds` into a sleep duration.
fn time_limit(seconds: f64) -> Result<Duration> {
    if seconds.is_nan() || seconds <= 0.0 {
        bail!("--max-seconds must be positive, got {seconds}");
    }
    Duration::try_from_secs_f64(seconds)
        .with_context(|| format!("--max-seconds {seconds} is out of range"))
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.into())
        .init();

    info!("Starting Glint {}", env!("CARGO_PKG_VERSION"));

    let mut scene = match &args.scene {
        Some(path) => load_scene(path)
            .with_context(|| format!("failed to load scene {}", path.display()))?,
        None => default_scene(args.seed.unwrap_or(0)).context("failed to build default scene")?,
    };
    apply_overrides(&args, &mut scene);

    let camera = scene.camera.build().context("invalid camera settings")?;
    info!(
        "Rendering {}x{} @ {} spp, depth {}, {} frames, {} objects",
        camera.image_width(),
        camera.image_height(),
        scene.render.samples_per_pixel,
        scene.render.max_depth,
        args.frames,
        scene.world.len()
    );

    let mut renderer = ProgressiveRenderer::new(camera, scene.world, scene.render)
        .context("invalid render settings")?;

    if let Some(seconds) = args.max_seconds {
        let limit = time_limit(seconds)?;
        let cancel = renderer.cancel_handle();
        thread::spawn(move || {
            thread::sleep(limit);
            cancel.store(true, Ordering::Relaxed);
        });
    }

    let start = Instant::now();
    for frame in 1..=args.frames {
        let frame_start = Instant::now();
        if !renderer.step()? {
            warn!("Time limit reached, stopping after {} frames", frame - 1);
            break;
        }
        info!("Frame {}/{} in {:.2?}", frame, args.frames, frame_start.elapsed());
    }
    info!(
        "Rendered {} frames in {:.2?}",
        renderer.accumulator().frame_count(),
        start.elapsed()
    );

    if renderer.accumulator().frame_count() == 0 {
        bail!("no frame completed before the time limit");
    }
    save_png(renderer.accumulator(), &args.output)
}
