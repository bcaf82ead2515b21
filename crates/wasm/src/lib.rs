use identikit_core::{CommandRecorder, ExportOptions, Exporter, HashGrid};
use identikit_protocol::IconGenerator;
use wasm_bindgen::prelude::*;

/// Parse optional JSON export options; `None` or an empty string means defaults.
fn parse_options(options: Option<String>) -> Result<ExportOptions, JsError> {
    match options.as_deref() {
        None | Some("") => Ok(ExportOptions::default()),
        Some(json) => serde_json::from_str(json).map_err(|e| JsError::new(&e.to_string())),
    }
}

/// Render the icon for `input` as SVG markup.
#[wasm_bindgen]
pub fn render_svg(
    input: &str,
    size: u32,
    fragment: bool,
    options: Option<String>,
) -> Result<String, JsError> {
    let options = ExportOptions {
        fragment,
        ..parse_options(options)?
    };
    Exporter::new(HashGrid::from_text(input))
        .with_options(options)
        .to_svg_string(size)
        .map_err(|e| JsError::new(&e.to_string()))
}

/// Render the icon for `input` as PNG bytes.
#[wasm_bindgen]
pub fn render_png(input: &str, size: u32, options: Option<String>) -> Result<Vec<u8>, JsError> {
    Exporter::new(HashGrid::from_text(input))
        .with_options(parse_options(options)?)
        .to_png_bytes(size)
        .map_err(|e| JsError::new(&e.to_string()))
}

/// The drawing commands for `input` at `size` as JSON, for hosts that draw
/// on their own canvas.
#[wasm_bindgen]
pub fn record_commands(input: &str, size: u32) -> Result<String, JsError> {
    let generator = HashGrid::from_text(input);
    let bounds = Exporter::new(generator)
        .icon_bounds(size)
        .map_err(|e| JsError::new(&e.to_string()))?;
    let mut recorder = CommandRecorder::new();
    generator
        .draw(&mut recorder, bounds)
        .map_err(|e| JsError::new(&e.to_string()))?;
    serde_json::to_string(recorder.commands()).map_err(|e| JsError::new(&e.to_string()))
}
