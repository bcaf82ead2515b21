use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::Result;
use crate::surface::DrawingSurface;
use crate::types::{Point, Rect};

/// A single, self-contained drawing instruction.
///
/// Commands carry everything a backend needs to draw them and are never
/// modified after they have been issued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShapeCommand {
    /// Paint the whole canvas before any shape.
    Background { color: Color },

    /// Fill a polygon given by its vertices in drawing order.
    Polygon {
        points: Vec<Point>,
        color: Color,
        antialias: bool,
    },

    /// Fill an axis-aligned rectangle.
    Rectangle { rect: Rect, color: Color },

    /// Fill a circle.
    Circle {
        center: Point,
        radius: f64,
        color: Color,
    },
}

impl ShapeCommand {
    pub fn color(&self) -> Color {
        match self {
            ShapeCommand::Background { color }
            | ShapeCommand::Polygon { color, .. }
            | ShapeCommand::Rectangle { color, .. }
            | ShapeCommand::Circle { color, .. } => *color,
        }
    }

    /// Issue this command on `surface`.
    pub fn draw_onto(&self, surface: &mut dyn DrawingSurface) -> Result<()> {
        match self {
            ShapeCommand::Background { color } => surface.set_background(*color),
            ShapeCommand::Polygon {
                points,
                color,
                antialias,
            } => surface.add_polygon(points, *color, *antialias),
            ShapeCommand::Rectangle { rect, color } => surface.add_rectangle(*rect, *color),
            ShapeCommand::Circle {
                center,
                radius,
                color,
            } => surface.add_circle(*center, *radius, *color),
        }
    }
}
