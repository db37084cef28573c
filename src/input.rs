//! Turns pointer activity over the preview pane into canvas geometry.

use std::time::{Duration, Instant};

use egui::{Context, PointerButton, Pos2, Rect};

use crate::config::RecorderConfig;
use crate::geometry::{Circle, Geometry, Line};

/// Map a screen position inside `pane` proportionally onto a canvas of
/// `canvas_size`. Positions outside the pane map to `None`.
pub fn map_to_canvas(pane: Rect, canvas_size: [usize; 2], pos: Pos2) -> Option<Pos2> {
    if !pane.contains(pos) || pane.width() <= 0.0 || pane.height() <= 0.0 {
        return None;
    }
    let [width, height] = canvas_size;
    Some(Pos2::new(
        (pos.x - pane.min.x) / pane.width() * width as f32,
        (pos.y - pane.min.y) / pane.height() * height as f32,
    ))
}

fn pixel(pos: Pos2) -> (i32, i32) {
    (pos.x.round() as i32, pos.y.round() as i32)
}

/// Classifies pointer input into lines (motion), press stamps and idle stamps.
///
/// Positions handed to the classifier are already in canvas coordinates.
#[derive(Debug, Clone)]
pub struct InputClassifier {
    press_radius: i32,
    idle_threshold: Duration,
    idle_radius_per_sec: f32,
    max_idle_radius: i32,
    last_pos: Option<Pos2>,
    last_move: Option<Instant>,
}

impl Default for InputClassifier {
    fn default() -> Self {
        Self::new(&RecorderConfig::default())
    }
}

impl InputClassifier {
    pub fn new(config: &RecorderConfig) -> Self {
        Self {
            press_radius: config.press_radius,
            idle_threshold: config.idle_threshold(),
            idle_radius_per_sec: config.idle_radius_per_sec,
            max_idle_radius: config.max_idle_radius,
            last_pos: None,
            last_move: None,
        }
    }

    /// Forget the tracked position so the next motion starts a new trail
    pub fn reset(&mut self) {
        self.last_pos = None;
        self.last_move = None;
    }

    pub fn last_position(&self) -> Option<Pos2> {
        self.last_pos
    }

    /// Stamp radius left by resting for `rest`
    pub fn idle_radius(&self, rest: Duration) -> i32 {
        let radius = (rest.as_secs_f32() * self.idle_radius_per_sec) as i32;
        radius.clamp(0, self.max_idle_radius.max(0))
    }

    /// Pointer moved to `pos`. Yields the idle stamp (if the pointer had been
    /// resting long enough) followed by the trail segment.
    pub fn on_pointer_move(&mut self, pos: Pos2, now: Instant) -> Vec<Geometry> {
        let mut out = Vec::new();
        if let Some(prev) = self.last_pos {
            let (x0, y0) = pixel(prev);
            if let Some(moved_at) = self.last_move {
                let rest = now.saturating_duration_since(moved_at);
                if rest >= self.idle_threshold {
                    let radius = self.idle_radius(rest);
                    if radius > 0 {
                        out.push(Circle::new(x0, y0, radius).into());
                    }
                }
            }
            let (x1, y1) = pixel(pos);
            if (x0, y0) != (x1, y1) {
                out.push(Line::new(x0, y0, x1, y1).into());
            }
        }
        self.last_pos = Some(pos);
        self.last_move = Some(now);
        out
    }

    /// Primary button went down at `pos`
    pub fn on_press(&mut self, pos: Pos2) -> Geometry {
        let (x, y) = pixel(pos);
        self.last_pos = Some(pos);
        Circle::new(x, y, self.press_radius).into()
    }

    /// Read this frame's pointer state from egui
    pub fn process_input(&mut self, ctx: &Context, pane: Rect, canvas_size: [usize; 2]) -> Vec<Geometry> {
        let now = Instant::now();
        let mut out = Vec::new();

        ctx.input(|input| {
            let mapped = input
                .pointer
                .hover_pos()
                .and_then(|pos| map_to_canvas(pane, canvas_size, pos));

            match mapped {
                Some(pos) => {
                    if self.last_pos != Some(pos) {
                        out.extend(self.on_pointer_move(pos, now));
                    }
                    if input.pointer.button_pressed(PointerButton::Primary) {
                        out.push(self.on_press(pos));
                    }
                }
                // Pointer left the pane
                None if self.last_pos.is_some() => self.reset(),
                None => {}
            }
        });

        out
    }
}
