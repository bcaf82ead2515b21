mod canvas;
mod renderer;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use identikit_core::{ExportKind, ExportOptions, Exporter, HashGrid};

use crate::canvas::TerminalCanvas;

const USAGE: &str = "Usage: identikit <png|svg|native|preview> <text> [size] [-o path] [--fragment] [--config options.json]";
const DEFAULT_SIZE: u32 = 64;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Export(ExportKind),
    /// Interactive terminal view.
    Preview,
}

#[derive(Debug, PartialEq)]
struct Args {
    mode: Mode,
    text: String,
    size: Option<u32>,
    output: Option<PathBuf>,
    fragment: bool,
    config: Option<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args> {
    let Some(command) = args.next() else {
        bail!("missing command\n{USAGE}");
    };
    let mode = match command.as_str() {
        "preview" => Mode::Preview,
        other => Mode::Export(other.parse::<ExportKind>().map_err(anyhow::Error::msg)?),
    };

    let mut text = None;
    let mut size = None;
    let mut output = None;
    let mut fragment = false;
    let mut config = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-o" | "--output" => {
                let path = args.next().context("-o needs a path")?;
                output = Some(PathBuf::from(path));
            }
            "--config" => {
                let path = args.next().context("--config needs a path")?;
                config = Some(PathBuf::from(path));
            }
            "--fragment" => fragment = true,
            _ if text.is_none() => text = Some(arg),
            _ if size.is_none() => {
                let n = arg
                    .parse::<u32>()
                    .with_context(|| format!("invalid size: {arg}"))?;
                size = Some(n);
            }
            _ => bail!("unexpected argument: {arg}\n{USAGE}"),
        }
    }

    let Some(text) = text else {
        bail!("missing input text\n{USAGE}");
    };
    Ok(Args {
        mode,
        text,
        size,
        output,
        fragment,
        config,
    })
}

fn load_options(args: &Args) -> Result<ExportOptions> {
    let mut options = match &args.config {
        Some(path) => {
            let data = std::fs::read(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_slice(&data)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => ExportOptions::default(),
    };
    if args.fragment {
        options.fragment = true;
    }
    Ok(options)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e:#}");
            std::process::exit(1);
        }
    };
    let options = load_options(&args)?;
    let exporter = Exporter::new(HashGrid::from_text(&args.text)).with_options(options);

    let kind = match args.mode {
        Mode::Preview => {
            if let Some(size) = args.size {
                exporter.icon_bounds(size)?;
            }
            return renderer::preview(&exporter, &args.text, args.size);
        }
        Mode::Export(kind) => kind,
    };

    let size = args.size.unwrap_or(DEFAULT_SIZE);
    match &args.output {
        Some(path) => {
            exporter
                .save_as::<TerminalCanvas>(kind, size, path)
                .with_context(|| format!("writing {}", path.display()))?;
            log::info!("wrote {kind} icon to {}", path.display());
        }
        None => {
            let mut out = io::stdout().lock();
            exporter.write_as::<TerminalCanvas, _>(kind, size, &mut out)?;
            out.flush()?;
        }
    }
    Ok(())
}
