//! Progressive rendering driver.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::accumulator::Accumulator;
use crate::bucket::render_frame_cancellable;
use crate::camera::Camera;
use crate::error::{AccumulateResult, ConfigResult};
use crate::renderer::RenderConfig;
use crate::world::World;

/// Renders full frames one after another and folds them into an
/// [`Accumulator`]. A frame interrupted by [`cancel_handle`](Self::cancel_handle)
/// is dropped whole; the accumulator only ever sees complete frames.
pub struct ProgressiveRenderer {
    camera: Camera,
    world: World,
    config: RenderConfig,
    accumulator: Accumulator,
    frames_rendered: u64,
    cancel: Arc<AtomicBool>,
}

impl ProgressiveRenderer {
    /// Create a renderer. Fails if the render config is invalid.
    pub fn new(camera: Camera, world: World, config: RenderConfig) -> ConfigResult<Self> {
        config.validate()?;
        let accumulator = Accumulator::new(camera.image_width(), camera.image_height());
        Ok(Self {
            camera,
            world,
            config,
            accumulator,
            frames_rendered: 0,
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Shared flag; set it to stop after (or abandon) the current frame.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }

    /// Render one frame and blend it in.
    ///
    /// Returns `Ok(false)` without touching the accumulator if cancelled.
    pub fn step(&mut self) -> AccumulateResult<bool> {
        let frame_index = self.frames_rendered;
        let Some(frame) = render_frame_cancellable(
            &self.camera,
            &self.world,
            &self.config,
            frame_index,
            &self.cancel,
        ) else {
            log::warn!("Frame {} cancelled, discarding partial result", frame_index);
            return Ok(false);
        };

        self.accumulator.blend(&frame)?;
        self.frames_rendered += 1;
        log::debug!(
            "Blended frame {} ({} total)",
            frame_index,
            self.accumulator.frame_count()
        );
        Ok(true)
    }

    /// Render up to `frames` frames, stopping early on cancellation.
    ///
    /// Returns the number of frames blended by this call.
    pub fn run(&mut self, frames: u32) -> AccumulateResult<u32> {
        let mut completed = 0;
        for _ in 0..frames {
            if !self.step()? {
                break;
            }
            completed += 1;
        }
        Ok(completed)
    }

    /// Discard accumulated frames, e.g. after the scene or view changed.
    pub fn reset(&mut self) {
        self.accumulator.reset();
        self.frames_rendered = 0;
        self.cancel.store(false, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CameraSettings, Color, ConfigError, Material, Sphere, Vec3};

    fn renderer() -> ProgressiveRenderer {
        let camera = CameraSettings::new().with_resolution(16, 9).build().unwrap();
        let world = World::new(vec![(
            Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5),
            Material::diffuse(Color::splat(0.5)),
        )])
        .unwrap();
        let config = RenderConfig {
            samples_per_pixel: 1,
            max_depth: 3,
            ..RenderConfig::default()
        };
        ProgressiveRenderer::new(camera, world, config).unwrap()
    }

    #[test]
    fn test_run_accumulates_frames() {
        let mut r = renderer();
        assert_eq!(r.run(3).unwrap(), 3);
        assert_eq!(r.accumulator().frame_count(), 3);
    }

    #[test]
    fn test_cancel_leaves_accumulator_untouched() {
        let mut r = renderer();
        r.run(1).unwrap();
        let before = r.accumulator().image().clone();

        r.cancel_handle().store(true, Ordering::Relaxed);
        assert!(!r.step().unwrap());
        assert_eq!(r.run(5).unwrap(), 0);
        assert_eq!(r.accumulator().frame_count(), 1);
        assert_eq!(*r.accumulator().image(), before);

        r.reset();
        assert!(!r.is_cancelled());
        assert_eq!(r.accumulator().frame_count(), 0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let camera = CameraSettings::new().with_resolution(4, 4).build().unwrap();
        let config = RenderConfig {
            samples_per_pixel: 0,
            ..RenderConfig::default()
        };
        let err = ProgressiveRenderer::new(camera, World::default(), config).err();
        assert_eq!(err, Some(ConfigError::ZeroSamples));
    }
}
