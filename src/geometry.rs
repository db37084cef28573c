use egui::Pos2;

use crate::draw_event::DrawEvent;

/// The inner circle of a stamp is this many times smaller than the outer one
pub const INNER_RADIUS_DIVISOR: i32 = 10;

/// A straight segment between two canvas pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    pub start_x: i32,
    pub start_y: i32,
    pub end_x: i32,
    pub end_y: i32,
}

impl Line {
    pub fn new(start_x: i32, start_y: i32, end_x: i32, end_y: i32) -> Self {
        Self {
            start_x,
            start_y,
            end_x,
            end_y,
        }
    }

    pub fn dx(&self) -> i32 {
        self.end_x - self.start_x
    }

    pub fn dy(&self) -> i32 {
        self.end_y - self.start_y
    }

    pub fn is_degenerate(&self) -> bool {
        self.dx() == 0 && self.dy() == 0
    }
}

/// A circle stamp: an outline at `radius` and a filled disc at a tenth of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Circle {
    pub center_x: i32,
    pub center_y: i32,
    pub radius: i32,
}

impl Circle {
    pub fn new(center_x: i32, center_y: i32, radius: i32) -> Self {
        Self {
            center_x,
            center_y,
            radius,
        }
    }

    /// Radius of the outline-only perimeter
    pub fn outer_radius(&self) -> i32 {
        self.radius
    }

    /// Radius of the filled inner disc (integer division, like the fill scan)
    pub fn inner_radius(&self) -> i32 {
        self.radius / INNER_RADIUS_DIVISOR
    }
}

/// A primitive queued for rasterization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Geometry {
    Line(Line),
    Circle(Circle),
}

impl Geometry {
    /// The input classification that produces this kind of primitive, used
    /// when asking a color scheme for its stroke color
    pub fn draw_event(&self) -> DrawEvent {
        match self {
            Self::Line(_) => DrawEvent::MouseMove,
            Self::Circle(_) => DrawEvent::LMousePress,
        }
    }

    /// The point handed to the color scheme as the event location
    pub fn anchor(&self) -> Pos2 {
        match self {
            Self::Line(line) => Pos2::new(line.start_x as f32, line.start_y as f32),
            Self::Circle(circle) => Pos2::new(circle.center_x as f32, circle.center_y as f32),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Line(_) => "line",
            Self::Circle(_) => "circle",
        }
    }
}

impl From<Line> for Geometry {
    fn from(line: Line) -> Self {
        Self::Line(line)
    }
}

impl From<Circle> for Geometry {
    fn from(circle: Circle) -> Self {
        Self::Circle(circle)
    }
}
