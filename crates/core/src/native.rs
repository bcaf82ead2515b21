//! Host-context backend: forwards every shape straight to a drawing context
//! owned by the caller, translating only coordinates and colors.

use std::io::Write;

use identikit_protocol::{Color, DrawingSurface, HostError, Point, Rect, RenderError, Result};

use crate::geometry::{self, Capabilities, Primitive};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostPoint {
    pub x: f32,
    pub y: f32,
}

impl From<Point> for HostPoint {
    fn from(p: Point) -> Self {
        Self {
            x: p.x as f32,
            y: p.y as f32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Color packed as `0xAARRGGBB`, the layout native graphics APIs expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostColor(pub u32);

impl HostColor {
    pub fn a(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn b(self) -> u8 {
        self.0 as u8
    }
}

impl From<Color> for HostColor {
    fn from(c: Color) -> Self {
        Self(c.to_rgba_u32().rotate_right(8))
    }
}

/// A drawing context provided by the host platform.
///
/// Implementations draw immediately; the adapter never buffers, finalizes or
/// disposes the context.
pub trait HostContext {
    fn fill_polygon(
        &mut self,
        points: &[HostPoint],
        color: HostColor,
        antialias: bool,
    ) -> Result<(), HostError>;

    fn fill_background(&mut self, color: HostColor) -> Result<(), HostError>;

    /// Whether [`fill_ellipse`](Self::fill_ellipse) is available. Circles are
    /// drawn as polygons otherwise.
    fn supports_ellipses(&self) -> bool {
        false
    }

    fn fill_ellipse(&mut self, bounds: HostRect, color: HostColor) -> Result<(), HostError> {
        let _ = (bounds, color);
        Err("this host context cannot fill ellipses".into())
    }
}

/// A host context that records what is drawn on it into a self-contained
/// document, such as a metafile, instead of showing it.
pub trait RecordingHost: HostContext + Sized {
    /// A blank recording covering `width` x `height` pixels.
    fn create(width: u32, height: u32) -> Result<Self, HostError>;

    /// Write the finished recording to `writer`.
    fn finish(self, writer: &mut dyn Write) -> Result<(), HostError>;
}

/// Drawing surface over a borrowed [`HostContext`].
pub struct NativeRenderer<'a, H: HostContext + ?Sized> {
    host: &'a mut H,
    caps: Capabilities,
}

impl<'a, H: HostContext + ?Sized> NativeRenderer<'a, H> {
    pub fn new(host: &'a mut H) -> Self {
        let caps = Capabilities {
            circles: host.supports_ellipses(),
            rectangles: false,
        };
        Self { host, caps }
    }

    fn polygon(&mut self, points: &[Point], color: Color, antialias: bool) -> Result<()> {
        let points: Vec<HostPoint> = points.iter().copied().map(HostPoint::from).collect();
        self.host
            .fill_polygon(&points, color.into(), antialias)
            .map_err(RenderError::HostDrawingFailed)
    }

    fn primitive(&mut self, primitive: Primitive, color: Color) -> Result<()> {
        match primitive {
            Primitive::Polygon(points) => self.polygon(&points, color, true),
            Primitive::Rectangle(rect) => self.polygon(&rect.corners(), color, true),
            Primitive::Circle { center, radius } => {
                let bounds = HostRect {
                    x: (center.x - radius) as f32,
                    y: (center.y - radius) as f32,
                    width: (radius * 2.0) as f32,
                    height: (radius * 2.0) as f32,
                };
                self.host
                    .fill_ellipse(bounds, color.into())
                    .map_err(RenderError::HostDrawingFailed)
            }
        }
    }
}

impl<H: HostContext + ?Sized> DrawingSurface for NativeRenderer<'_, H> {
    fn set_background(&mut self, color: Color) -> Result<()> {
        self.host
            .fill_background(color.into())
            .map_err(RenderError::HostDrawingFailed)
    }

    fn add_polygon(&mut self, points: &[Point], color: Color, antialias: bool) -> Result<()> {
        geometry::validate_polygon(points)?;
        self.polygon(points, color, antialias)
    }

    fn add_rectangle(&mut self, rect: Rect, color: Color) -> Result<()> {
        let primitive = geometry::lower_rectangle(rect, self.caps)?;
        self.primitive(primitive, color)
    }

    fn add_circle(&mut self, center: Point, radius: f64, color: Color) -> Result<()> {
        let primitive = geometry::lower_circle(center, radius, self.caps)?;
        self.primitive(primitive, color)
    }
}
