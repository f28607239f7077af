//! Progressive frame accumulation.
//!
//! Keeps a running mean of gamma-encoded frames. Each new frame is gamma
//! encoded once per raw linear value before it is blended in, never after.

use rayon::prelude::*;

use crate::error::{AccumulateError, AccumulateResult};
use crate::material::Color;
use crate::renderer::{color_to_rgba, linear_to_gamma_vec3, ImageBuffer};

/// Running average of successive frames, ready for display.
#[derive(Debug, Clone)]
pub struct Accumulator {
    image: ImageBuffer,
    frame_count: u32,
}

impl Accumulator {
    /// Create an empty accumulator.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: ImageBuffer::new(width, height),
            frame_count: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width
    }

    pub fn height(&self) -> u32 {
        self.image.height
    }

    /// Number of frames blended so far.
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// The current gamma-encoded image.
    pub fn image(&self) -> &ImageBuffer {
        &self.image
    }

    /// Blend a frame of linear radiance in with weight `1 / (frame_count + 1)`.
    pub fn blend(&mut self, frame: &ImageBuffer) -> AccumulateResult<()> {
        if frame.width != self.image.width || frame.height != self.image.height {
            return Err(AccumulateError::SizeMismatch {
                width: self.image.width,
                height: self.image.height,
                got_width: frame.width,
                got_height: frame.height,
            });
        }

        let weight = 1.0 / (self.frame_count as f32 + 1.0);
        self.image
            .pixels
            .par_iter_mut()
            .zip(frame.pixels.par_iter())
            .for_each(|(current, &linear)| {
                *current = (1.0 - weight) * *current + weight * linear_to_gamma_vec3(linear);
            });

        self.frame_count += 1;
        Ok(())
    }

    /// Drop all accumulated frames.
    pub fn reset(&mut self) {
        self.image.pixels.fill(Color::ZERO);
        self.frame_count = 0;
    }

    /// Convert to RGBA bytes (for display or saving).
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.image.pixels.len() * 4);
        for color in &self.image.pixels {
            bytes.extend_from_slice(&color_to_rgba(*color));
        }
        bytes
    }

    /// Convert to an 8-bit RGBA image for export.
    pub fn to_image(&self) -> image::RgbaImage {
        image::RgbaImage::from_fn(self.image.width, self.image.height, |x, y| {
            image::Rgba(color_to_rgba(self.image.get(x, y)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::linear_to_gamma;

    #[test]
    fn test_first_frame_replaces_empty_accumulator() {
        let mut acc = Accumulator::new(3, 2);
        let frame = ImageBuffer::filled(3, 2, Color::new(0.25, 0.5, 1.0));
        acc.blend(&frame).unwrap();

        let expected = Color::new(linear_to_gamma(0.25), linear_to_gamma(0.5), 1.0);
        assert_eq!(acc.frame_count(), 1);
        assert!(acc.image().pixels.iter().all(|c| (*c - expected).length() < 1e-6));
    }

    #[test]
    fn test_constant_frames_stay_constant() {
        let mut acc = Accumulator::new(4, 4);
        let frame = ImageBuffer::filled(4, 4, Color::new(0.1, 0.4, 0.9));
        let expected = linear_to_gamma_vec3(Color::new(0.1, 0.4, 0.9));

        for _ in 0..50 {
            acc.blend(&frame).unwrap();
            for c in &acc.image().pixels {
                assert!((*c - expected).length() < 1e-5);
            }
        }
        assert_eq!(acc.frame_count(), 50);
    }

    #[test]
    fn test_running_mean_of_encoded_values() {
        let mut acc = Accumulator::new(1, 1);
        let values = [0.0, 1.0, 0.25, 0.5];
        for v in values {
            acc.blend(&ImageBuffer::filled(1, 1, Color::splat(v))).unwrap();
        }

        // Gamma is applied per frame, then averaged
        let mean: f32 = values.iter().map(|v| linear_to_gamma(*v)).sum::<f32>() / 4.0;
        assert!((acc.image().get(0, 0).x - mean).abs() < 1e-5);
    }

    #[test]
    fn test_size_mismatch_is_rejected() {
        let mut acc = Accumulator::new(2, 2);
        let err = acc.blend(&ImageBuffer::new(3, 2)).unwrap_err();
        assert_eq!(
            err,
            AccumulateError::SizeMismatch {
                width: 2,
                height: 2,
                got_width: 3,
                got_height: 2
            }
        );
        assert_eq!(acc.frame_count(), 0);
    }

    #[test]
    fn test_reset_and_export() {
        let mut acc = Accumulator::new(2, 1);
        acc.blend(&ImageBuffer::filled(2, 1, Color::ONE)).unwrap();
        assert_eq!(acc.to_rgba(), vec![255, 255, 255, 255, 255, 255, 255, 255]);
        assert_eq!(acc.to_image().get_pixel(1, 0).0, [255, 255, 255, 255]);

        acc.reset();
        assert_eq!(acc.frame_count(), 0);
        assert_eq!(acc.to_rgba(), vec![0, 0, 0, 255, 0, 0, 0, 255]);
    }
}
