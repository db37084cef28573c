//! Scan conversion of queued primitives into canvas pixels.
//!
//! Neither algorithm anti-aliases; every write is a plain pixel store and
//! anything outside the canvas is clipped per pixel.

mod circle;
mod line;

pub use circle::{CIRCLE_ANGLE_STEPS, draw_circle};
pub use line::{LinePoints, draw_line, line_points, line_steps};

use egui::Color32;

use crate::canvas::Canvas;
use crate::geometry::Geometry;

/// Rasterize any primitive with the given stroke color.
/// Returns the number of pixel writes that landed on the canvas.
pub fn draw(canvas: &mut Canvas, geometry: &Geometry, color: Color32) -> usize {
    match geometry {
        Geometry::Line(line) => draw_line(canvas, line, color),
        Geometry::Circle(circle) => draw_circle(canvas, circle, color),
    }
}
