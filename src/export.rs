use std::fs;
use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::canvas::Canvas;
use crate::config::ExportFormat;
use crate::error::ExportError;

/// Get a timestamp in seconds since the UNIX epoch
pub fn timestamp_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// First free `iart-<timestamp>[-N].<ext>` path in `dir`
fn unique_path(dir: &Path, timestamp: u64, format: ExportFormat) -> PathBuf {
    let ext = format.extension();
    let mut path = dir.join(format!("iart-{}.{}", timestamp, ext));
    let mut n = 1;
    while path.exists() {
        path = dir.join(format!("iart-{}-{}.{}", timestamp, n, ext));
        n += 1;
    }
    path
}

/// Write the full-resolution canvas to a timestamped file in `dir`,
/// creating the directory if needed. Returns the path written.
pub fn save_canvas(canvas: &Canvas, dir: &Path, format: ExportFormat) -> Result<PathBuf, ExportError> {
    if canvas.width() == 0 || canvas.height() == 0 {
        return Err(ExportError::EmptyCanvas);
    }

    fs::create_dir_all(dir).map_err(|source| ExportError::Directory {
        path: dir.to_path_buf(),
        source,
    })?;

    let image = RgbaImage::from_raw(
        canvas.width() as u32,
        canvas.height() as u32,
        canvas.to_rgba_unmultiplied(),
    )
    .ok_or(ExportError::EmptyCanvas)?;

    let path = unique_path(dir, timestamp_secs(), format);
    match format {
        // BMP has no use for the alpha channel; the canvas is opaque anyway
        ExportFormat::Bmp => image::DynamicImage::ImageRgba8(image)
            .to_rgb8()
            .save_with_format(&path, format.image_format())?,
        ExportFormat::Png => image.save_with_format(&path, format.image_format())?,
    }

    log::info!(
        "Exported {}x{} canvas to {}",
        canvas.width(),
        canvas.height(),
        path.display()
    );
    Ok(path)
}
