use std::f64::consts::PI;

use egui::Color32;

use crate::canvas::Canvas;
use crate::geometry::{Circle, INNER_RADIUS_DIVISOR};

/// Angular resolution of the perimeter pass: a full turn in steps of PI/1000
pub const CIRCLE_ANGLE_STEPS: u32 = 2000;

/// Stamp a circle: the outer and inner perimeters in one angular pass, then a
/// scanline fill of the inner disc.
///
/// The fill finds its bounds by looking for pixels of exactly `color` (the
/// perimeter just drawn), so it only works when `color` differs from whatever
/// already lies inside the inner circle. When no left bound turns up on a
/// scanline that scanline stays unfilled; when no right bound turns up the
/// fill span is empty. Both cases are left as they are.
///
/// Returns the number of on-canvas writes.
pub fn draw_circle(canvas: &mut Canvas, circle: &Circle, color: Color32) -> usize {
    let mut written = stroke_perimeters(canvas, circle, color);
    written += fill_inner(canvas, circle, color);
    written
}

fn stroke_perimeters(canvas: &mut Canvas, circle: &Circle, color: Color32) -> usize {
    let cx = circle.center_x as f64;
    let cy = circle.center_y as f64;
    let outer = circle.outer_radius() as f64;
    let inner = outer / INNER_RADIUS_DIVISOR as f64;

    let mut written = 0;
    for step in 0..CIRCLE_ANGLE_STEPS {
        let angle = step as f64 * PI / (CIRCLE_ANGLE_STEPS / 2) as f64;
        let (sin, cos) = angle.sin_cos();
        // Both perimeters share the angle so the wide one has no gaps the
        // narrow one would not also have
        for radius in [outer, inner] {
            let x = (cx + cos * radius) as i32;
            let y = (cy + sin * radius) as i32;
            if canvas.put(x, y, color) {
                written += 1;
            }
        }
    }
    written
}

fn fill_inner(canvas: &mut Canvas, circle: &Circle, color: Color32) -> usize {
    let cx = circle.center_x;
    let cy = circle.center_y;
    let r = circle.inner_radius();
    let width = canvas.width() as i32;
    let is_marker = |canvas: &Canvas, x: i32, y: i32| canvas.get(x, y) == Some(color);

    let mut written = 0;
    for y in (cy - r)..(cy + r) {
        if y < 0 || y >= canvas.height() as i32 {
            continue;
        }

        let mut start = 0;
        let mut end = 0;
        for a in (cx - r)..cx {
            if a < 0 || is_marker(canvas, a, y) {
                start = a.max(0);
                for b in cx..(cx + r) {
                    if b >= width - 1 || is_marker(canvas, b, y) {
                        end = b.min(width - 1);
                        break;
                    }
                }
                break;
            }
        }

        for x in start..end {
            if canvas.put(x, y, color) {
                written += 1;
            }
        }
    }
    written
}
