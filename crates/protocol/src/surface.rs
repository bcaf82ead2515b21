use crate::color::Color;
use crate::error::Result;
use crate::types::{Point, Rect};

/// The drawing contract every backend implements.
///
/// Coordinates are final icon-space coordinates: nothing here scales or
/// translates them. Malformed shapes are rejected eagerly with
/// [`RenderError::InvalidShape`](crate::RenderError::InvalidShape); output
/// failures surface either here (backends that draw immediately) or when the
/// backend is finalized.
pub trait DrawingSurface {
    /// Paint the full canvas with `color` before any shape is drawn.
    fn set_background(&mut self, color: Color) -> Result<()>;

    /// Fill a polygon. `antialias` asks for smoothed edges where the backend
    /// can honour it.
    fn add_polygon(&mut self, points: &[Point], color: Color, antialias: bool) -> Result<()>;

    fn add_rectangle(&mut self, rect: Rect, color: Color) -> Result<()>;

    fn add_circle(&mut self, center: Point, radius: f64, color: Color) -> Result<()>;
}

/// Decides which shapes make up an icon.
///
/// `draw` issues zero or more commands inside `bounds` and returns. It must
/// not perform I/O.
pub trait IconGenerator {
    fn draw(&self, surface: &mut dyn DrawingSurface, bounds: Rect) -> Result<()>;
}

impl<F> IconGenerator for F
where
    F: Fn(&mut dyn DrawingSurface, Rect) -> Result<()>,
{
    fn draw(&self, surface: &mut dyn DrawingSurface, bounds: Rect) -> Result<()> {
        self(surface, bounds)
    }
}
