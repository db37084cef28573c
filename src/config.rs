//! Recorder settings.
//!
//! The viewer persists these through eframe storage between launches; the
//! engine only reads the timing and color fields.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::color_scheme::ClassicScheme;

pub const MIN_RESOLUTION_MULTIPLIER: f32 = 1.0;
pub const MAX_RESOLUTION_MULTIPLIER: f32 = 16.0;

/// Encoding used for the finished canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExportFormat {
    #[default]
    Png,
    Bmp,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Bmp => "bmp",
        }
    }

    pub fn image_format(&self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Bmp => image::ImageFormat::Bmp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct RecorderConfig {
    /// Minimum gap between two preview refreshes
    pub preview_interval_ms: u64,
    /// How long the render thread sleeps between state checks while not recording
    pub idle_poll_ms: u64,
    /// Canvas size relative to the virtual screen
    pub resolution_multiplier: f32,
    /// Color lines through the active scheme instead of the fixed trail gray
    pub lines_follow_scheme: bool,
    /// Variant name looked up in the scheme registry at session start
    pub color_scheme: String,
    /// Where finished pieces go; `None` means `<pictures>/iArt`
    pub export_dir: Option<PathBuf>,
    pub export_format: ExportFormat,

    /// Radius of the stamp left by a primary click
    pub press_radius: i32,
    /// Pointer rest needed before resuming motion leaves a stamp
    pub idle_threshold_ms: u64,
    /// Stamp growth per second of rest
    pub idle_radius_per_sec: f32,
    pub max_idle_radius: i32,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            preview_interval_ms: 100,
            idle_poll_ms: 500,
            resolution_multiplier: 1.0,
            lines_follow_scheme: false,
            color_scheme: ClassicScheme::NAME.to_string(),
            export_dir: None,
            export_format: ExportFormat::Png,
            press_radius: 40,
            idle_threshold_ms: 750,
            idle_radius_per_sec: 30.0,
            max_idle_radius: 400,
        }
    }
}

impl RecorderConfig {
    pub fn preview_interval(&self) -> Duration {
        Duration::from_millis(self.preview_interval_ms)
    }

    pub fn idle_poll(&self) -> Duration {
        Duration::from_millis(self.idle_poll_ms)
    }

    pub fn idle_threshold(&self) -> Duration {
        Duration::from_millis(self.idle_threshold_ms)
    }

    /// Multiplier clamped to the supported range; NaN falls back to 1
    pub fn resolution_multiplier(&self) -> f32 {
        if self.resolution_multiplier.is_nan() {
            return MIN_RESOLUTION_MULTIPLIER;
        }
        self.resolution_multiplier
            .clamp(MIN_RESOLUTION_MULTIPLIER, MAX_RESOLUTION_MULTIPLIER)
    }

    /// Canvas dimensions for a virtual screen of the given size
    pub fn canvas_size(&self, screen_width: f32, screen_height: f32) -> [usize; 2] {
        let scale = self.resolution_multiplier();
        [
            (screen_width.max(1.0) * scale).round() as usize,
            (screen_height.max(1.0) * scale).round() as usize,
        ]
    }

    /// Directory exports are written to
    pub fn resolve_export_dir(&self) -> Option<PathBuf> {
        if let Some(dir) = &self.export_dir {
            return Some(dir.clone());
        }
        dirs::picture_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join("Pictures")))
            .map(|pictures| pictures.join("iArt"))
    }
}
