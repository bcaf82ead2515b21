//! Backends and export pipeline for identikit icons.
//!
//! An [`IconGenerator`](identikit_protocol::IconGenerator) draws against the
//! [`DrawingSurface`](identikit_protocol::DrawingSurface) contract; the
//! backends here turn those calls into PNG bytes, SVG text, or calls on a
//! host drawing context, and [`export::Exporter`] wires the two together.

pub mod export;
pub mod geometry;
pub mod native;
pub mod pattern;
pub mod raster;
pub mod record;
pub mod svg;

pub use export::{ExportKind, ExportOptions, Exporter};
pub use native::{HostColor, HostContext, HostPoint, HostRect, NativeRenderer, RecordingHost};
pub use pattern::HashGrid;
pub use raster::png::{FilterStrategy, FilterType, PngOptions};
pub use raster::{Bitmap, RasterRenderer};
pub use record::{CommandRecorder, replay};
pub use svg::SvgRenderer;

/// Lifecycle of a buffering backend. Every draw call checks it, so drawing
/// after finalization is a reportable error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    Empty,
    Accumulating,
    Finalized,
}
