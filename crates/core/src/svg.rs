//! SVG backend: serializes each shape as an SVG element as soon as it is
//! drawn.

use std::io::Write;

use identikit_protocol::{Color, DrawingSurface, Point, Rect, RenderError, Result};

use crate::RenderState;
use crate::geometry::{self, Capabilities, Primitive};

pub struct SvgRenderer {
    width: u32,
    height: u32,
    body: String,
    state: RenderState,
}

impl SvgRenderer {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions { width, height });
        }
        log::debug!("svg renderer {width}x{height}");
        Ok(Self {
            width,
            height,
            body: String::with_capacity(1024),
            state: RenderState::Accumulating,
        })
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    /// Finalize and return the document.
    ///
    /// With `fragment` set the root `<svg>` element is left out so the
    /// output can be embedded in another SVG document.
    pub fn finish(&mut self, fragment: bool) -> Result<String> {
        self.ensure_open()?;
        self.state = RenderState::Finalized;

        if fragment {
            return Ok(std::mem::take(&mut self.body));
        }
        let (w, h) = (self.width, self.height);
        let mut svg = String::with_capacity(self.body.len() + 128);
        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        ));
        svg.push_str(&self.body);
        svg.push_str("</svg>");
        self.body.clear();
        Ok(svg)
    }

    /// Finalize and write the document to `writer` as UTF-8.
    pub fn finish_to<W: Write + ?Sized>(&mut self, writer: &mut W, fragment: bool) -> Result<()> {
        let svg = self.finish(fragment)?;
        writer.write_all(svg.as_bytes()).map_err(|e| {
            log::warn!("writing svg failed: {e}");
            RenderError::EncodingFailed(e)
        })
    }

    fn ensure_open(&self) -> Result<()> {
        match self.state {
            RenderState::Finalized => Err(RenderError::AlreadyFinalized),
            RenderState::Empty | RenderState::Accumulating => Ok(()),
        }
    }

    fn push_rect(&mut self, rect: &Rect, color: Color) {
        self.body.push_str(&format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}"{}/>"#,
            fmt_num(rect.x),
            fmt_num(rect.y),
            fmt_num(rect.w),
            fmt_num(rect.h),
            fill_attrs(color),
        ));
    }

    fn push_polygon(&mut self, points: &[Point], color: Color, antialias: bool) {
        let coords: Vec<String> = points
            .iter()
            .map(|p| format!("{},{}", fmt_num(p.x), fmt_num(p.y)))
            .collect();
        let crisp = if antialias {
            ""
        } else {
            r#" shape-rendering="crispEdges""#
        };
        self.body.push_str(&format!(
            r#"<polygon points="{}"{}{crisp}/>"#,
            coords.join(" "),
            fill_attrs(color),
        ));
    }

    fn push_circle(&mut self, center: Point, radius: f64, color: Color) {
        self.body.push_str(&format!(
            r#"<circle cx="{}" cy="{}" r="{}"{}/>"#,
            fmt_num(center.x),
            fmt_num(center.y),
            fmt_num(radius),
            fill_attrs(color),
        ));
    }
}

impl DrawingSurface for SvgRenderer {
    fn set_background(&mut self, color: Color) -> Result<()> {
        self.ensure_open()?;
        let full = Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height));
        self.body.push_str(&format!(
            r#"<rect width="{}" height="{}"{}/>"#,
            fmt_num(full.w),
            fmt_num(full.h),
            fill_attrs(color),
        ));
        Ok(())
    }

    fn add_polygon(&mut self, points: &[Point], color: Color, antialias: bool) -> Result<()> {
        self.ensure_open()?;
        geometry::validate_polygon(points)?;
        self.push_polygon(points, color, antialias);
        Ok(())
    }

    fn add_rectangle(&mut self, rect: Rect, color: Color) -> Result<()> {
        self.ensure_open()?;
        match geometry::lower_rectangle(rect, Capabilities::ALL)? {
            Primitive::Rectangle(rect) => self.push_rect(&rect, color),
            Primitive::Polygon(points) => self.push_polygon(&points, color, true),
            Primitive::Circle { center, radius } => self.push_circle(center, radius, color),
        }
        Ok(())
    }

    fn add_circle(&mut self, center: Point, radius: f64, color: Color) -> Result<()> {
        self.ensure_open()?;
        match geometry::lower_circle(center, radius, Capabilities::ALL)? {
            Primitive::Circle { center, radius } => self.push_circle(center, radius, color),
            Primitive::Polygon(points) => self.push_polygon(&points, color, true),
            Primitive::Rectangle(rect) => self.push_rect(&rect, color),
        }
        Ok(())
    }
}

fn fill_attrs(color: Color) -> String {
    if color.is_opaque() {
        format!(r#" fill="{}""#, color.to_hex_rgb())
    } else {
        let opacity = fmt_decimal(f64::from(color.a()) / 255.0, 3);
        format!(r#" fill="{}" fill-opacity="{opacity}""#, color.to_hex_rgb())
    }
}

fn fmt_num(v: f64) -> String {
    fmt_decimal(v, 2)
}

/// Shortest decimal with at most `places` fraction digits.
fn fmt_decimal(v: f64, places: usize) -> String {
    let s = format!("{v:.places$}");
    let s = if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s.as_str()
    };
    match s {
        "-0" | "" => "0".to_string(),
        s => s.to_string(),
    }
}
