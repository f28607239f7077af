//! Image export.

use std::path::Path;

use anyhow::{bail, Context, Result};
use glint_renderer::Accumulator;
use log::info;

/// Save the accumulated (gamma-encoded) image as an 8-bit PNG.
pub fn save_png(accumulator: &Accumulator, path: &Path) -> Result<()> {
    let is_png = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
    if !is_png {
        bail!(
            "Unsupported output '{}': only .png is supported",
            path.display()
        );
    }

    accumulator
        .to_image()
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;

    info!(
        "Saved {}x{} image ({} frames) to {}",
        accumulator.width(),
        accumulator.height(),
        accumulator.frame_count(),
        path.display()
    );
    Ok(())
}
