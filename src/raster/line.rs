use egui::Color32;

use crate::canvas::Canvas;
use crate::geometry::Line;

/// Number of increments used to walk a line: the smallest divisor that keeps
/// both per-step deltas within one pixel, never less than 1.
pub fn line_steps(line: &Line) -> u32 {
    let span = line.dx().unsigned_abs().max(line.dy().unsigned_abs());
    span.max(1)
}

/// Fixed-step walk from a line's start toward its end.
///
/// Each step advances `(dx / steps, dy / steps)` and yields the truncated
/// coordinate. The walk ends once the position has passed the end point on
/// every axis that moves, checked per axis in the direction of travel, so it
/// terminates for any slope sign. A zero-length line yields nothing.
#[derive(Debug, Clone)]
pub struct LinePoints {
    line: Line,
    steps: u32,
    step: u32,
}

pub fn line_points(line: &Line) -> LinePoints {
    LinePoints {
        line: *line,
        steps: line_steps(line),
        step: 0,
    }
}

impl LinePoints {
    fn point_at(&self, step: u32) -> (f64, f64) {
        // Multiply before dividing so whole-pixel positions come out exact
        let steps = self.steps as f64;
        let step = step as f64;
        (
            self.line.start_x as f64 + self.line.dx() as f64 * step / steps,
            self.line.start_y as f64 + self.line.dy() as f64 * step / steps,
        )
    }

    fn still_advancing(&self, x: f64, y: f64) -> bool {
        let Line {
            start_x,
            start_y,
            end_x,
            end_y,
        } = self.line;
        let (end_x, end_y) = (end_x as f64, end_y as f64);

        (start_x as f64 > end_x && x >= end_x)
            || ((end_x > start_x as f64) && x <= end_x)
            || (start_y as f64 > end_y && y >= end_y)
            || ((end_y > start_y as f64) && y <= end_y)
    }
}

impl Iterator for LinePoints {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<Self::Item> {
        let (x, y) = self.point_at(self.step);
        if !self.still_advancing(x, y) {
            return None;
        }
        self.step += 1;
        // `as` truncates toward zero
        Some((x as i32, y as i32))
    }
}

/// Plot a line in a single color. Returns the number of on-canvas writes.
pub fn draw_line(canvas: &mut Canvas, line: &Line, color: Color32) -> usize {
    line_points(line)
        .filter(|&(x, y)| canvas.put(x, y, color))
        .count()
}
