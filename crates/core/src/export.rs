//! Export pipeline: bounds, backend construction, drawing and finalization
//! for one icon at one size.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use identikit_protocol::{
    Color, DrawingSurface, HostError, IconGenerator, Rect, RenderError, Result,
};
use serde::{Deserialize, Serialize};

use crate::geometry::{self, DEFAULT_PADDING};
use crate::native::{HostContext, NativeRenderer, RecordingHost};
use crate::raster::png::PngOptions;
use crate::raster::{Bitmap, RasterRenderer};
use crate::svg::SvgRenderer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Png,
    Svg,
    Native,
}

impl FromStr for ExportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ExportKind::Png),
            "svg" => Ok(ExportKind::Svg),
            "native" => Ok(ExportKind::Native),
            other => Err(format!("unknown export kind: {other}")),
        }
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportKind::Png => "png",
            ExportKind::Svg => "svg",
            ExportKind::Native => "native",
        })
    }
}

/// Export settings. Missing fields take their defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Empty margin on each side, as a fraction of the icon size.
    pub padding: f64,
    /// Painted over the whole icon before any shape. Transparent if unset.
    pub background: Option<Color>,
    /// Leave out the root `<svg>` element in vector output.
    pub fragment: bool,
    pub png: PngOptions,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            padding: DEFAULT_PADDING,
            background: None,
            fragment: false,
            png: PngOptions::default(),
        }
    }
}

/// Renders the icon drawn by a generator into the supported output formats.
pub struct Exporter<G> {
    generator: G,
    options: ExportOptions,
}

impl<G: IconGenerator> Exporter<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            options: ExportOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// The padded rectangle the generator draws into for an icon of `size`.
    pub fn icon_bounds(&self, size: u32) -> Result<Rect> {
        check_size(size)?;
        Ok(geometry::icon_bounds(size, self.options.padding))
    }

    pub fn to_png_bytes(&self, size: u32) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.write_png(size, &mut out)?;
        Ok(out)
    }

    pub fn write_png<W: Write + ?Sized>(&self, size: u32, writer: &mut W) -> Result<()> {
        let mut renderer = self.draw_raster(size)?;
        renderer.finish_png(writer, &self.options.png)
    }

    pub fn save_png(&self, size: u32, path: impl AsRef<Path>) -> Result<()> {
        save_to(path.as_ref(), |w| self.write_png(size, w))
    }

    /// Un-premultiplied pixels of the icon.
    pub fn to_bitmap(&self, size: u32) -> Result<Bitmap> {
        self.draw_raster(size)?.into_bitmap()
    }

    pub fn to_svg_string(&self, size: u32) -> Result<String> {
        self.draw_svg(size)?.finish(self.options.fragment)
    }

    pub fn write_svg<W: Write + ?Sized>(&self, size: u32, writer: &mut W) -> Result<()> {
        self.draw_svg(size)?.finish_to(writer, self.options.fragment)
    }

    pub fn save_svg(&self, size: u32, path: impl AsRef<Path>) -> Result<()> {
        save_to(path.as_ref(), |w| self.write_svg(size, w))
    }

    /// Draw into `host` within `rect` exactly; no padding and no background
    /// are applied.
    pub fn draw_native<H: HostContext + ?Sized>(&self, host: &mut H, rect: Rect) -> Result<()> {
        let mut renderer = NativeRenderer::new(host);
        self.generator.draw(&mut renderer, rect)
    }

    /// Draw into `host` as an icon of `size` pixels, with padding and the
    /// configured background.
    pub fn render_native<H: HostContext + ?Sized>(&self, size: u32, host: &mut H) -> Result<()> {
        let bounds = self.icon_bounds(size)?;
        log::debug!("drawing {size}px icon on host context");
        let mut renderer = NativeRenderer::new(host);
        self.draw_into(&mut renderer, bounds)
    }

    /// Record the icon on a fresh `H` of `size` x `size` pixels and write the
    /// finished recording, e.g. a metafile.
    pub fn write_native<H: RecordingHost, W: Write + ?Sized>(
        &self,
        size: u32,
        writer: &mut W,
    ) -> Result<()> {
        let bounds = self.icon_bounds(size)?;
        log::debug!("recording {size}px native icon");
        let mut host = H::create(size, size).map_err(RenderError::HostDrawingFailed)?;
        self.draw_into(&mut NativeRenderer::new(&mut host), bounds)?;

        let mut writer = writer;
        host.finish(&mut writer).map_err(|e| {
            log::warn!("finishing native recording failed: {e}");
            host_error(e)
        })
    }

    pub fn to_native_bytes<H: RecordingHost>(&self, size: u32) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.write_native::<H, _>(size, &mut out)?;
        Ok(out)
    }

    pub fn save_native<H: RecordingHost>(&self, size: u32, path: impl AsRef<Path>) -> Result<()> {
        save_to(path.as_ref(), |w| self.write_native::<H, _>(size, w))
    }

    /// Write the icon in the requested output format. `H` records the
    /// [`ExportKind::Native`] output and is unused otherwise.
    pub fn write_as<H: RecordingHost, W: Write + ?Sized>(
        &self,
        kind: ExportKind,
        size: u32,
        writer: &mut W,
    ) -> Result<()> {
        match kind {
            ExportKind::Png => self.write_png(size, writer),
            ExportKind::Svg => self.write_svg(size, writer),
            ExportKind::Native => self.write_native::<H, W>(size, writer),
        }
    }

    pub fn save_as<H: RecordingHost>(
        &self,
        kind: ExportKind,
        size: u32,
        path: impl AsRef<Path>,
    ) -> Result<()> {
        save_to(path.as_ref(), |w| self.write_as::<H, _>(kind, size, w))
    }

    fn draw_raster(&self, size: u32) -> Result<RasterRenderer> {
        let bounds = self.icon_bounds(size)?;
        log::debug!("rendering {size}px png");
        let mut renderer = RasterRenderer::new(size, size)?;
        self.draw_into(&mut renderer, bounds)?;
        Ok(renderer)
    }

    fn draw_svg(&self, size: u32) -> Result<SvgRenderer> {
        let bounds = self.icon_bounds(size)?;
        log::debug!("rendering {size}px svg (fragment: {})", self.options.fragment);
        let mut renderer = SvgRenderer::new(size, size)?;
        self.draw_into(&mut renderer, bounds)?;
        Ok(renderer)
    }

    fn draw_into(&self, surface: &mut dyn DrawingSurface, bounds: Rect) -> Result<()> {
        if let Some(background) = self.options.background {
            surface.set_background(background)?;
        }
        self.generator.draw(surface, bounds)
    }
}

fn check_size(size: u32) -> Result<()> {
    if size < 1 {
        return Err(RenderError::InvalidSize(size));
    }
    Ok(())
}

/// I/O failures inside the host keep their kind; anything else is a drawing
/// failure.
fn host_error(e: HostError) -> RenderError {
    match e.downcast::<std::io::Error>() {
        Ok(io) => RenderError::EncodingFailed(*io),
        Err(other) => RenderError::HostDrawingFailed(other),
    }
}

/// Create (or truncate) `path` and run `write` against it. On failure the
/// partial file is removed.
fn save_to(path: &Path, write: impl FnOnce(&mut dyn Write) -> Result<()>) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(RenderError::ArgumentRequired("path"));
    }
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let result = write(&mut writer).and_then(|()| writer.flush().map_err(RenderError::from));
    drop(writer);

    if let Err(e) = &result {
        log::warn!("export to {} failed: {e}", path.display());
        if let Err(remove_err) = fs::remove_file(path) {
            log::warn!("could not remove {}: {remove_err}", path.display());
        }
    } else {
        log::debug!("wrote {}", path.display());
    }
    result
}
