use std::sync::Arc;

use egui::Color32;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Color every canvas starts out with
pub const BACKGROUND: Color32 = Color32::WHITE;

/// Full-resolution pixel grid the art is drawn onto.
///
/// Coordinates are signed so rasterizers can hand in points that fall off the
/// canvas; those writes are clipped and silently skipped.
#[derive(Clone, PartialEq)]
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<Color32>,
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pixels", &format!("<{} pixels>", self.pixels.len()))
            .finish()
    }
}

impl Canvas {
    /// Creates an opaque white canvas
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![BACKGROUND; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn size(&self) -> [usize; 2] {
        [self.width, self.height]
    }

    pub fn pixels(&self) -> &[Color32] {
        &self.pixels
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.contains(x, y).then(|| y as usize * self.width + x as usize)
    }

    /// Returns the pixel at (x, y), or None outside the canvas
    pub fn get(&self, x: i32, y: i32) -> Option<Color32> {
        self.index(x, y).map(|idx| self.pixels[idx])
    }

    /// Writes a pixel if (x, y) lies on the canvas. Returns whether it did.
    #[inline]
    pub fn put(&mut self, x: i32, y: i32, color: Color32) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                self.pixels[idx] = color;
                true
            }
            None => false,
        }
    }

    /// Number of pixels that currently hold `color`
    pub fn count(&self, color: Color32) -> usize {
        self.pixels.iter().filter(|&&p| p == color).count()
    }

    /// Premultiplied RGBA bytes, row-major, borrowed from the pixel storage
    pub fn as_rgba_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Straight-alpha RGBA bytes, row-major, as written to exported files
    pub fn to_rgba_unmultiplied(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|p| p.to_srgba_unmultiplied())
            .collect()
    }
}

/// Handle to the canvas shared between the render thread and its readers.
///
/// The render thread is the only writer. Readers take the read lock, which
/// cannot be granted while a primitive is being rasterized, so every view they
/// get is a whole-primitive-consistent snapshot.
#[derive(Debug, Clone)]
pub struct SharedCanvas {
    inner: Arc<RwLock<Canvas>>,
}

impl SharedCanvas {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            inner: Arc::new(RwLock::new(canvas)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Canvas> {
        self.inner.read()
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Canvas> {
        self.inner.write()
    }

    /// Point-in-time copy of the whole canvas
    pub fn snapshot(&self) -> Canvas {
        self.inner.read().clone()
    }

    pub fn size(&self) -> [usize; 2] {
        self.inner.read().size()
    }

    /// Take the canvas out without copying when this is the last handle
    pub fn into_inner(self) -> Canvas {
        match Arc::try_unwrap(self.inner) {
            Ok(lock) => lock.into_inner(),
            Err(shared) => shared.read().clone(),
        }
    }
}
