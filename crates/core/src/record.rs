use identikit_protocol::{Color, DrawingSurface, Point, Rect, Result, ShapeCommand};

use crate::geometry;

/// A drawing surface that keeps every validated command instead of drawing.
///
/// Recorded commands can be serialized or replayed into any backend.
#[derive(Debug, Default, Clone)]
pub struct CommandRecorder {
    commands: Vec<ShapeCommand>,
}

impl CommandRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[ShapeCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<ShapeCommand> {
        self.commands
    }
}

impl DrawingSurface for CommandRecorder {
    fn set_background(&mut self, color: Color) -> Result<()> {
        self.commands.push(ShapeCommand::Background { color });
        Ok(())
    }

    fn add_polygon(&mut self, points: &[Point], color: Color, antialias: bool) -> Result<()> {
        geometry::validate_polygon(points)?;
        self.commands.push(ShapeCommand::Polygon {
            points: points.to_vec(),
            color,
            antialias,
        });
        Ok(())
    }

    fn add_rectangle(&mut self, rect: Rect, color: Color) -> Result<()> {
        geometry::validate_rect(&rect)?;
        self.commands.push(ShapeCommand::Rectangle { rect, color });
        Ok(())
    }

    fn add_circle(&mut self, center: Point, radius: f64, color: Color) -> Result<()> {
        geometry::validate_circle(center, radius)?;
        self.commands.push(ShapeCommand::Circle {
            center,
            radius,
            color,
        });
        Ok(())
    }
}

/// Issue `commands` on `surface` in order, stopping at the first error.
pub fn replay(commands: &[ShapeCommand], surface: &mut dyn DrawingSurface) -> Result<()> {
    commands.iter().try_for_each(|cmd| cmd.draw_onto(surface))
}
