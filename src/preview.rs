//! Downsampled copies of the canvas for on-screen display.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use egui::{Color32, ColorImage};
use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgba};
use parking_lot::Mutex;

use crate::canvas::Canvas;
use crate::error::PreviewError;

/// Receives preview images from the render thread.
///
/// Implementations must return quickly; the render thread calls them between
/// primitives.
pub trait PreviewSink: Send + Sync {
    /// Current pixel size of the preview pane
    fn target_size(&self) -> [usize; 2];

    /// While minimized no previews are produced
    fn is_minimized(&self) -> bool;

    fn deliver(&self, image: ColorImage);
}

fn check_target(width: usize, height: usize) -> Result<(), PreviewError> {
    if width == 0 || height == 0 {
        return Err(PreviewError::InvalidDimensions { width, height });
    }
    Ok(())
}

/// Smooth (triangle filter) downsample through the `image` crate
pub fn downsample(canvas: &Canvas, width: usize, height: usize) -> Result<ColorImage, PreviewError> {
    check_target(width, height)?;
    if canvas.width() == 0 || canvas.height() == 0 {
        return Err(PreviewError::InvalidDimensions {
            width: canvas.width(),
            height: canvas.height(),
        });
    }

    // Borrowed view over the live pixels; no full-resolution copy per preview
    let bytes = canvas.as_rgba_bytes();
    let actual = bytes.len();
    let source =
        ImageBuffer::<Rgba<u8>, &[u8]>::from_raw(canvas.width() as u32, canvas.height() as u32, bytes)
            .ok_or(PreviewError::BufferMismatch {
                expected: canvas.width() * canvas.height() * 4,
                actual,
            })?;

    let scaled = imageops::resize(&source, width as u32, height as u32, FilterType::Triangle);
    Ok(ColorImage::from_rgba_premultiplied([width, height], scaled.as_raw()))
}

/// Box-filter downsample that walks the canvas one target pixel at a time.
/// Slower than [`downsample`] but has no failure modes beyond bad dimensions.
pub fn tiled_downsample(canvas: &Canvas, width: usize, height: usize) -> Result<ColorImage, PreviewError> {
    check_target(width, height)?;
    let mut image = ColorImage::new([width, height], Color32::WHITE);
    let (src_w, src_h) = (canvas.width(), canvas.height());
    if src_w == 0 || src_h == 0 {
        return Ok(image);
    }
    let pixels = canvas.pixels();

    for ty in 0..height {
        let y0 = ty * src_h / height;
        let y1 = ((ty + 1) * src_h / height).max(y0 + 1).min(src_h);
        for tx in 0..width {
            let x0 = tx * src_w / width;
            let x1 = ((tx + 1) * src_w / width).max(x0 + 1).min(src_w);

            let mut sum = [0u32; 4];
            for sy in y0..y1 {
                for px in &pixels[sy * src_w + x0..sy * src_w + x1] {
                    for (acc, channel) in sum.iter_mut().zip(px.to_array()) {
                        *acc += channel as u32;
                    }
                }
            }
            let n = ((y1 - y0) * (x1 - x0)) as u32;
            image.pixels[ty * width + tx] = Color32::from_rgba_premultiplied(
                (sum[0] / n) as u8,
                (sum[1] / n) as u8,
                (sum[2] / n) as u8,
                (sum[3] / n) as u8,
            );
        }
    }
    Ok(image)
}

/// Downsample, falling back to the tiled path when the fast one fails
pub fn render_preview(canvas: &Canvas, width: usize, height: usize) -> Result<ColorImage, PreviewError> {
    match downsample(canvas, width, height) {
        Ok(image) => Ok(image),
        Err(err @ PreviewError::InvalidDimensions { .. }) if width == 0 || height == 0 => Err(err),
        Err(err) => {
            log::warn!("Fast preview failed ({}), using tiled snapshot", err);
            tiled_downsample(canvas, width, height)
        }
    }
}

/// Mailbox-style [`PreviewSink`]: the render thread overwrites the latest
/// image, the UI takes it when it repaints.
pub struct PreviewSlot {
    width: AtomicUsize,
    height: AtomicUsize,
    minimized: AtomicBool,
    latest: Mutex<Option<ColorImage>>,
    repaint: Mutex<Option<egui::Context>>,
}

impl std::fmt::Debug for PreviewSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewSlot")
            .field("target_size", &self.target_size())
            .field("minimized", &self.is_minimized())
            .field("pending", &self.latest.lock().is_some())
            .finish()
    }
}

impl PreviewSlot {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width: AtomicUsize::new(width),
            height: AtomicUsize::new(height),
            minimized: AtomicBool::new(false),
            latest: Mutex::new(None),
            repaint: Mutex::new(None),
        }
    }

    /// Request a repaint of `ctx` whenever a new image arrives
    pub fn set_repaint_context(&self, ctx: egui::Context) {
        *self.repaint.lock() = Some(ctx);
    }

    pub fn set_target_size(&self, width: usize, height: usize) {
        self.width.store(width, Ordering::Relaxed);
        self.height.store(height, Ordering::Relaxed);
    }

    pub fn set_minimized(&self, minimized: bool) {
        self.minimized.store(minimized, Ordering::Relaxed);
    }

    /// Take the newest undelivered image, if any
    pub fn take(&self) -> Option<ColorImage> {
        self.latest.lock().take()
    }
}

impl PreviewSink for PreviewSlot {
    fn target_size(&self) -> [usize; 2] {
        [self.width.load(Ordering::Relaxed), self.height.load(Ordering::Relaxed)]
    }

    fn is_minimized(&self) -> bool {
        self.minimized.load(Ordering::Relaxed)
    }

    fn deliver(&self, image: ColorImage) {
        *self.latest.lock() = Some(image);
        if let Some(ctx) = self.repaint.lock().as_ref() {
            ctx.request_repaint();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn half_black_canvas() -> Canvas {
        let mut canvas = Canvas::new(40, 20);
        for y in 0..20 {
            for x in 0..20 {
                canvas.put(x, y, Color32::BLACK);
            }
        }
        canvas
    }

    #[test]
    fn test_downsample_size() {
        let canvas = half_black_canvas();
        let image = downsample(&canvas, 10, 5).unwrap();
        assert_eq!(image.size, [10, 5]);
        assert_eq!(image.pixels.len(), 50);
    }

    #[test]
    fn test_downsample_keeps_regions() {
        let canvas = half_black_canvas();
        let image = downsample(&canvas, 8, 4).unwrap();
        let left = image.pixels[4 * 2];
        let right = image.pixels[4 * 2 + 7];
        assert!(left.r() < 30);
        assert!(right.r() > 225);
    }

    #[test]
    fn test_tiled_matches_regions() {
        let canvas = half_black_canvas();
        let image = tiled_downsample(&canvas, 4, 2).unwrap();
        assert_eq!(image.pixels[0], Color32::BLACK);
        assert_eq!(image.pixels[3], Color32::WHITE);
    }

    #[test]
    fn test_tiled_upsamples_without_panicking() {
        let canvas = Canvas::new(3, 3);
        let image = tiled_downsample(&canvas, 7, 9).unwrap();
        assert_eq!(image.size, [7, 9]);
        assert!(image.pixels.iter().all(|p| *p == Color32::WHITE));
    }

    #[test]
    fn test_zero_target_rejected() {
        let canvas = Canvas::new(4, 4);
        assert_eq!(
            render_preview(&canvas, 0, 3).unwrap_err(),
            PreviewError::InvalidDimensions { width: 0, height: 3 }
        );
    }

    #[test]
    fn test_empty_canvas_falls_back() {
        let canvas = Canvas::new(0, 0);
        let image = render_preview(&canvas, 4, 4).unwrap();
        assert_eq!(image.size, [4, 4]);
    }

    #[test]
    fn test_slot_keeps_latest() {
        let slot = PreviewSlot::new(10, 10);
        slot.deliver(ColorImage::new([1, 1], Color32::RED));
        slot.deliver(ColorImage::new([2, 2], Color32::BLUE));
        let image = slot.take().unwrap();
        assert_eq!(image.size, [2, 2]);
        assert!(slot.take().is_none());
    }
}
