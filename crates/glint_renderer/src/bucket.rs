//! Bucket-based tile rendering.
//!
//! Divides the image into tiles (buckets) that are rendered independently
//! and in parallel using rayon. Every pixel belongs to exactly one bucket,
//! so each pixel cell of a frame is written by a single task.

use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;

use crate::camera::Camera;
use crate::material::Color;
use crate::renderer::{render_pixel, ImageBuffer, RenderConfig};
use crate::world::World;

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// X coordinate of bucket's top-left corner
    pub x: u32,
    /// Y coordinate of bucket's top-left corner
    pub y: u32,
    /// Width of the bucket in pixels
    pub width: u32,
    /// Height of the bucket in pixels
    pub height: u32,
    /// Index of this bucket in the render order
    pub index: usize,
}

impl Bucket {
    /// Create a new bucket.
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self { x, y, width, height, index }
    }

    /// Get the total number of pixels in this bucket.
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }
}

/// Default bucket size in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 64;

/// Generate buckets for an image, sorted in spiral order from center.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let bucket_size = bucket_size.max(1);
    let mut buckets = Vec::new();
    let mut index = 0;

    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let bw = bucket_size.min(width - x);
            let bh = bucket_size.min(height - y);
            buckets.push(Bucket::new(x, y, bw, bh, index));
            index += 1;
            x += bucket_size;
        }
        y += bucket_size;
    }

    sort_spiral(&mut buckets, width, height);

    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = i;
    }

    buckets
}

/// Sort buckets by distance from image center (spiral order).
fn sort_spiral(buckets: &mut [Bucket], width: u32, height: u32) {
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;

    buckets.sort_by(|a, b| {
        let a_center_x = a.x as f32 + a.width as f32 / 2.0;
        let a_center_y = a.y as f32 + a.height as f32 / 2.0;
        let b_center_x = b.x as f32 + b.width as f32 / 2.0;
        let b_center_y = b.y as f32 + b.height as f32 / 2.0;

        let a_dist = (a_center_x - center_x).powi(2) + (a_center_y - center_y).powi(2);
        let b_dist = (b_center_x - center_x).powi(2) + (b_center_y - center_y).powi(2);

        a_dist.partial_cmp(&b_dist).unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Render a single bucket to a vector of colors.
///
/// Returns pixels in row-major order within the bucket.
pub fn render_bucket(
    bucket: &Bucket,
    camera: &Camera,
    world: &World,
    config: &RenderConfig,
    frame_index: u64,
) -> Vec<Color> {
    let mut pixels = Vec::with_capacity(bucket.pixel_count() as usize);

    for local_y in 0..bucket.height {
        for local_x in 0..bucket.width {
            let global_x = bucket.x + local_x;
            let global_y = bucket.y + local_y;
            pixels.push(render_pixel(camera, world, global_x, global_y, config, frame_index));
        }
    }

    pixels
}

/// Result of rendering a bucket.
#[derive(Debug, Clone)]
pub struct BucketResult {
    /// The bucket that was rendered
    pub bucket: Bucket,
    /// Pixel colors in row-major order
    pub pixels: Vec<Color>,
}

impl BucketResult {
    /// Create a new bucket result.
    pub fn new(bucket: Bucket, pixels: Vec<Color>) -> Self {
        Self { bucket, pixels }
    }

    /// Copy this bucket's pixels into their place in a full frame.
    pub fn write_into(&self, image: &mut ImageBuffer) {
        let width = self.bucket.width as usize;
        for (row, chunk) in self.pixels.chunks(width).enumerate() {
            let start = (self.bucket.y as usize + row) * image.width as usize + self.bucket.x as usize;
            image.pixels[start..start + chunk.len()].copy_from_slice(chunk);
        }
    }
}

fn assemble(camera: &Camera, results: Vec<BucketResult>) -> ImageBuffer {
    let mut image = ImageBuffer::new(camera.image_width(), camera.image_height());
    for result in &results {
        result.write_into(&mut image);
    }
    image
}

/// Render one full frame of linear per-pixel averages in parallel.
pub fn render_frame(
    camera: &Camera,
    world: &World,
    config: &RenderConfig,
    frame_index: u64,
) -> ImageBuffer {
    let buckets = generate_buckets(camera.image_width(), camera.image_height(), DEFAULT_BUCKET_SIZE);

    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map(|bucket| {
            BucketResult::new(*bucket, render_bucket(bucket, camera, world, config, frame_index))
        })
        .collect();

    assemble(camera, results)
}

/// Like [`render_frame`], but gives up once `cancel` is raised.
///
/// Returns `None` if the flag was observed at any point during the frame;
/// buckets not yet started are skipped and the partial frame is dropped.
pub fn render_frame_cancellable(
    camera: &Camera,
    world: &World,
    config: &RenderConfig,
    frame_index: u64,
    cancel: &AtomicBool,
) -> Option<ImageBuffer> {
    let buckets = generate_buckets(camera.image_width(), camera.image_height(), DEFAULT_BUCKET_SIZE);

    let results: Option<Vec<BucketResult>> = buckets
        .par_iter()
        .map(|bucket| {
            if cancel.load(Ordering::Relaxed) {
                return None;
            }
            Some(BucketResult::new(
                *bucket,
                render_bucket(bucket, camera, world, config, frame_index),
            ))
        })
        .collect();

    let results = results?;
    if cancel.load(Ordering::Relaxed) {
        return None;
    }
    Some(assemble(camera, results))
}
