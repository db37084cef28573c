use egui::{Color32, Pos2};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::ColorScheme;
use crate::draw_event::DrawEvent;

/// Mid-gray used for pointer trails
pub const TRAIL_GRAY: Color32 = Color32::from_rgb(50, 50, 50);

/// Stamp grays are drawn from `0..STAMP_GRAY_LIMIT`, dark enough to stand out
/// against the white canvas
pub const STAMP_GRAY_LIMIT: u8 = 127;

/// Monochrome palette: gray trails and randomly shaded gray stamps
pub struct ClassicScheme {
    rng: Mutex<StdRng>,
}

impl Default for ClassicScheme {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassicScheme {
    pub const NAME: &'static str = "Classic";

    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic stamp shades, for tests and reproducible runs
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn random_gray(&self) -> Color32 {
        let shade = self.rng.lock().gen_range(0..STAMP_GRAY_LIMIT);
        Color32::from_gray(shade)
    }
}

impl ColorScheme for ClassicScheme {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn color_for(&self, event: DrawEvent, _location: Pos2) -> Color32 {
        match event {
            DrawEvent::MouseMove => TRAIL_GRAY,
            DrawEvent::Keystroke | DrawEvent::LMousePress => self.random_gray(),
            DrawEvent::MoveOuterCircle => Color32::WHITE,
            DrawEvent::MoveInnerCircle | DrawEvent::Background => Color32::BLACK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trail_is_constant() {
        let scheme = ClassicScheme::new();
        for x in 0..10 {
            let color = scheme.color_for(DrawEvent::MouseMove, Pos2::new(x as f32, 0.0));
            assert_eq!(color, TRAIL_GRAY);
        }
    }

    #[test]
    fn test_stamps_are_bounded_grays() {
        let scheme = ClassicScheme::with_seed(7);
        for _ in 0..500 {
            let color = scheme.color_for(DrawEvent::LMousePress, Pos2::ZERO);
            assert_eq!(color.r(), color.g());
            assert_eq!(color.g(), color.b());
            assert!(color.r() < STAMP_GRAY_LIMIT);
            assert_eq!(color.a(), 255);
        }
    }

    #[test]
    fn test_seeded_schemes_agree() {
        let a = ClassicScheme::with_seed(42);
        let b = ClassicScheme::with_seed(42);
        for _ in 0..20 {
            assert_eq!(
                a.color_for(DrawEvent::Keystroke, Pos2::ZERO),
                b.color_for(DrawEvent::Keystroke, Pos2::ZERO)
            );
        }
    }
}
