//! Raster backend: draws shapes into an anti-aliased pixel buffer and encodes
//! the result as PNG.

mod canvas;
pub mod png;
mod scanline;

use std::io::Write;

use identikit_protocol::{Color, DrawingSurface, Point, Rect, RenderError, Result};

use crate::RenderState;
use crate::geometry::{self, Capabilities, Primitive};
use canvas::Canvas;
use png::PngOptions;
use scanline::{COORD_LIMIT, Rasterizer};

/// Straight-alpha RGBA8 pixels, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Bitmap {
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [self.rgba[i], self.rgba[i + 1], self.rgba[i + 2], self.rgba[i + 3]]
    }
}

pub struct RasterRenderer {
    width: u32,
    height: u32,
    canvas: Canvas,
    rasterizer: Rasterizer,
    state: RenderState,
}

impl RasterRenderer {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 || !buffers_fit(width, height) {
            return Err(RenderError::InvalidDimensions { width, height });
        }
        log::debug!("raster renderer {width}x{height}");
        Ok(Self {
            width,
            height,
            canvas: Canvas::new(width as usize, height as usize),
            rasterizer: Rasterizer::new(width as usize, height as usize),
            state: RenderState::Empty,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    /// Current pixels, un-premultiplied.
    pub fn pixels(&self) -> Bitmap {
        Bitmap {
            width: self.width,
            height: self.height,
            rgba: self.canvas.to_straight_rgba(),
        }
    }

    /// Finalize and hand back the pixels.
    pub fn into_bitmap(mut self) -> Result<Bitmap> {
        self.begin_finalize()?;
        Ok(self.pixels())
    }

    /// Finalize and write the image to `writer` as PNG.
    pub fn finish_png<W: Write + ?Sized>(&mut self, writer: &mut W, options: &PngOptions) -> Result<()> {
        self.begin_finalize()?;
        let rgba = self.canvas.to_straight_rgba();
        png::encode_rgba(writer, self.width, self.height, &rgba, options).map_err(|e| {
            log::warn!("png encoding failed: {e}");
            RenderError::EncodingFailed(e)
        })?;
        log::debug!("encoded {}x{} png", self.width, self.height);
        Ok(())
    }

    pub fn into_png_bytes(mut self, options: &PngOptions) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.finish_png(&mut out, options)?;
        Ok(out)
    }

    fn begin_finalize(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.state = RenderState::Finalized;
        Ok(())
    }

    fn ensure_open(&self) -> Result<()> {
        match self.state {
            RenderState::Finalized => Err(RenderError::AlreadyFinalized),
            RenderState::Empty | RenderState::Accumulating => Ok(()),
        }
    }

    fn fill(&mut self, points: &[Point], color: Color, antialias: bool) {
        self.state = RenderState::Accumulating;
        if color.is_transparent() {
            return;
        }
        if !antialias {
            self.fill_aliased(points, color);
            return;
        }
        self.rasterizer.add_polygon(points);
        let canvas = &mut self.canvas;
        self.rasterizer
            .drain(|x, y, coverage| canvas.blend(x, y, color, coverage));
    }

    /// Paint every pixel whose centre lies inside the polygon (non-zero
    /// winding), the way vector renderers treat crisp edges.
    fn fill_aliased(&mut self, points: &[Point], color: Color) {
        let points: Vec<Point> = points
            .iter()
            .map(|p| {
                Point::new(
                    p.x.clamp(-COORD_LIMIT, COORD_LIMIT),
                    p.y.clamp(-COORD_LIMIT, COORD_LIMIT),
                )
            })
            .collect();
        let Some(&first) = points.first() else {
            return;
        };
        let (mut min, mut max) = (first, first);
        for p in &points {
            min = Point::new(min.x.min(p.x), min.y.min(p.y));
            max = Point::new(max.x.max(p.x), max.y.max(p.y));
        }
        // First and one-past-last pixel whose centre is within the extent.
        let span = |lo: f64, hi: f64, limit: u32| {
            let first = (lo - 0.5).ceil().clamp(0.0, f64::from(limit)) as usize;
            let end = ((hi - 0.5).floor() + 1.0).clamp(0.0, f64::from(limit)) as usize;
            first..end
        };
        let cols = span(min.x, max.x, self.width);
        for y in span(min.y, max.y, self.height) {
            for x in cols.clone() {
                let (cx, cy) = (x as f64 + 0.5, y as f64 + 0.5);
                if geometry::winding_number(&points, cx, cy) != 0 {
                    self.canvas.blend(x, y, color, 1.0);
                }
            }
        }
    }

    fn fill_primitive(&mut self, primitive: Primitive, color: Color) {
        match primitive {
            Primitive::Polygon(points) => self.fill(&points, color, true),
            Primitive::Rectangle(rect) => self.fill(&rect.corners(), color, true),
            Primitive::Circle { center, radius } => {
                self.fill(&geometry::circle_to_polygon(center, radius), color, true)
            }
        }
    }
}

impl DrawingSurface for RasterRenderer {
    fn set_background(&mut self, color: Color) -> Result<()> {
        self.ensure_open()?;
        self.state = RenderState::Accumulating;
        self.canvas.fill(color);
        Ok(())
    }

    fn add_polygon(&mut self, points: &[Point], color: Color, antialias: bool) -> Result<()> {
        self.ensure_open()?;
        geometry::validate_polygon(points)?;
        self.fill(points, color, antialias);
        Ok(())
    }

    fn add_rectangle(&mut self, rect: Rect, color: Color) -> Result<()> {
        self.ensure_open()?;
        let primitive = geometry::lower_rectangle(rect, Capabilities::POLYGONS_ONLY)?;
        self.fill_primitive(primitive, color);
        Ok(())
    }

    fn add_circle(&mut self, center: Point, radius: f64, color: Color) -> Result<()> {
        self.ensure_open()?;
        let primitive = geometry::lower_circle(center, radius, Capabilities::POLYGONS_ONLY)?;
        self.fill_primitive(primitive, color);
        Ok(())
    }
}

/// Whether the pixel buffer and the coverage buffer for an image this size
/// can be addressed at all.
fn buffers_fit(width: u32, height: u32) -> bool {
    let (w, h) = (width as usize, height as usize);
    let pixels = w.checked_mul(h).and_then(|n| n.checked_mul(4));
    let coverage = (w + 2)
        .checked_mul(h)
        .and_then(|n| n.checked_mul(std::mem::size_of::<f32>()));
    matches!(
        (pixels, coverage),
        (Some(p), Some(c)) if p <= isize::MAX as usize && c <= isize::MAX as usize
    )
}
