use std::time::Instant;

use egui::{Color32, Pos2};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::ColorScheme;
use crate::draw_event::DrawEvent;

/// Red to yellow, green to cyan, magenta to blue: 256 entries per segment
pub const RAINBOW_LEN: usize = 768;

fn build_palette() -> Vec<Color32> {
    let mut colors = Vec::with_capacity(RAINBOW_LEN);
    colors.extend((0..=255u8).map(|g| Color32::from_rgb(255, g, 0)));
    colors.extend((0..=255u8).map(|b| Color32::from_rgb(0, 255, b)));
    colors.extend((0..=255u8).map(|r| Color32::from_rgb(r, 0, 255)));
    colors
}

/// Pointer trails cycle through the rainbow one entry per millisecond;
/// stamps get a random translucent color.
pub struct RainbowScheme {
    palette: Vec<Color32>,
    started: Mutex<Instant>,
    rng: Mutex<StdRng>,
}

impl Default for RainbowScheme {
    fn default() -> Self {
        Self::new()
    }
}

impl RainbowScheme {
    pub const NAME: &'static str = "Rainbow";

    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            palette: build_palette(),
            started: Mutex::new(Instant::now()),
            rng: Mutex::new(rng),
        }
    }

    pub fn palette(&self) -> &[Color32] {
        &self.palette
    }

    /// Palette entry for a given time since `start()`
    pub fn color_at(&self, elapsed_ms: u128) -> Color32 {
        self.palette[(elapsed_ms % self.palette.len() as u128) as usize]
    }

    fn random_translucent(&self) -> Color32 {
        let mut rng = self.rng.lock();
        let r: u8 = rng.gen_range(0..255);
        let g: u8 = rng.gen_range(0..255);
        let b: u8 = rng.gen_range(0..255);
        // Brighter colors are more opaque
        let alpha = ((r as u32 + g as u32 + b as u32) / 3) as u8;
        Color32::from_rgba_unmultiplied(r, g, b, alpha)
    }
}

impl ColorScheme for RainbowScheme {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn start(&self) {
        *self.started.lock() = Instant::now();
    }

    fn color_for(&self, event: DrawEvent, _location: Pos2) -> Color32 {
        match event {
            DrawEvent::MouseMove => self.color_at(self.started.lock().elapsed().as_millis()),
            DrawEvent::Keystroke | DrawEvent::LMousePress => self.random_translucent(),
            DrawEvent::MoveOuterCircle => Color32::WHITE,
            DrawEvent::MoveInnerCircle | DrawEvent::Background => Color32::BLACK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_segments() {
        let scheme = RainbowScheme::new();
        let palette = scheme.palette();
        assert_eq!(palette.len(), RAINBOW_LEN);
        assert_eq!(palette[0], Color32::from_rgb(255, 0, 0));
        assert_eq!(palette[255], Color32::from_rgb(255, 255, 0));
        assert_eq!(palette[256], Color32::from_rgb(0, 255, 0));
        assert_eq!(palette[767], Color32::from_rgb(255, 0, 255));
    }

    #[test]
    fn test_color_at_wraps() {
        let scheme = RainbowScheme::new();
        assert_eq!(scheme.color_at(0), scheme.color_at(RAINBOW_LEN as u128));
        assert_eq!(scheme.color_at(300), scheme.palette()[300]);
    }

    #[test]
    fn test_fixed_event_colors() {
        let scheme = RainbowScheme::with_seed(1);
        assert_eq!(scheme.color_for(DrawEvent::MoveOuterCircle, Pos2::ZERO), Color32::WHITE);
        assert_eq!(scheme.color_for(DrawEvent::MoveInnerCircle, Pos2::ZERO), Color32::BLACK);
        assert_eq!(scheme.color_for(DrawEvent::Background, Pos2::ZERO), Color32::BLACK);
    }

    #[test]
    fn test_stamps_never_match_background() {
        let scheme = RainbowScheme::with_seed(3);
        for _ in 0..200 {
            let color = scheme.color_for(DrawEvent::LMousePress, Pos2::ZERO);
            assert_ne!(color, Color32::WHITE);
        }
    }
}
