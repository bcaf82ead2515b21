//! A tiny pixel grid that acts as the host drawing context for the terminal
//! preview and the `native` export. Each terminal cell shows two pixels
//! stacked with a half block.

use std::io::{self, Write};

use crossterm::queue;
use crossterm::style::{Color as AnsiColor, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use identikit_core::{HostColor, HostContext, HostPoint, HostRect, RecordingHost};
use identikit_protocol::HostError;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::widgets::Widget;

/// Straight-alpha RGBA pixels.
pub struct TerminalCanvas {
    width: u16,
    height: u16,
    pixels: Vec<[u8; 4]>,
}

impl TerminalCanvas {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0; 4]; usize::from(width) * usize::from(height)],
        }
    }

    pub fn pixel(&self, x: u16, y: u16) -> [u8; 4] {
        self.pixels[usize::from(y) * usize::from(self.width) + usize::from(x)]
    }

    /// Top and bottom pixel shown by the cell at (`col`, `row`).
    fn cell(&self, col: u16, row: u16) -> ([u8; 4], [u8; 4]) {
        let top = self.pixel(col, row * 2);
        let bottom = if row * 2 + 1 < self.height {
            self.pixel(col, row * 2 + 1)
        } else {
            [0; 4]
        };
        (top, bottom)
    }

    /// The picture as lines of half blocks with 24-bit ANSI colors.
    pub fn to_ansi(&self) -> io::Result<Vec<u8>> {
        let mut out = Vec::new();
        for row in 0..self.height.div_ceil(2) {
            for col in 0..self.width {
                let (top, bottom) = self.cell(col, row);
                queue!(
                    out,
                    SetForegroundColor(to_ansi_color(top)),
                    SetBackgroundColor(to_ansi_color(bottom)),
                    Print('▀')
                )?;
            }
            queue!(out, ResetColor, Print('\n'))?;
        }
        Ok(out)
    }

    /// Blend `color` into every pixel whose centre satisfies `inside`.
    fn fill_where(&mut self, color: HostColor, inside: impl Fn(f32, f32) -> bool) {
        if color.a() == 0 {
            return;
        }
        for y in 0..self.height {
            for x in 0..self.width {
                if inside(f32::from(x) + 0.5, f32::from(y) + 0.5) {
                    let i = usize::from(y) * usize::from(self.width) + usize::from(x);
                    self.pixels[i] = over(color, self.pixels[i]);
                }
            }
        }
    }
}

impl HostContext for TerminalCanvas {
    fn fill_polygon(
        &mut self,
        points: &[HostPoint],
        color: HostColor,
        _antialias: bool,
    ) -> Result<(), HostError> {
        self.fill_where(color, |x, y| winding(points, x, y) != 0);
        Ok(())
    }

    fn fill_background(&mut self, color: HostColor) -> Result<(), HostError> {
        self.fill_where(color, |_, _| true);
        Ok(())
    }

    fn supports_ellipses(&self) -> bool {
        true
    }

    fn fill_ellipse(&mut self, bounds: HostRect, color: HostColor) -> Result<(), HostError> {
        let (rx, ry) = (bounds.width / 2.0, bounds.height / 2.0);
        if rx <= 0.0 || ry <= 0.0 {
            return Ok(());
        }
        let (cx, cy) = (bounds.x + rx, bounds.y + ry);
        self.fill_where(color, |x, y| {
            let (dx, dy) = ((x - cx) / rx, (y - cy) / ry);
            dx * dx + dy * dy <= 1.0
        });
        Ok(())
    }
}

impl RecordingHost for TerminalCanvas {
    fn create(width: u32, height: u32) -> Result<Self, HostError> {
        Ok(Self::new(u16::try_from(width)?, u16::try_from(height)?))
    }

    fn finish(self, writer: &mut dyn Write) -> Result<(), HostError> {
        writer.write_all(&self.to_ansi()?)?;
        Ok(())
    }
}

impl Widget for &TerminalCanvas {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let cols = self.width.min(area.width);
        let rows = self.height.div_ceil(2).min(area.height);
        for row in 0..rows {
            for col in 0..cols {
                let (top, bottom) = self.cell(col, row);
                buf[(area.x + col, area.y + row)]
                    .set_char('▀')
                    .set_fg(to_terminal(top))
                    .set_bg(to_terminal(bottom));
            }
        }
    }
}

/// Non-zero winding number of the closed polygon around (`x`, `y`).
fn winding(points: &[HostPoint], x: f32, y: f32) -> i32 {
    let mut winding = 0;
    for (i, a) in points.iter().enumerate() {
        let b = &points[(i + 1) % points.len()];
        let cross = (b.x - a.x) * (y - a.y) - (x - a.x) * (b.y - a.y);
        if a.y <= y {
            if b.y > y && cross > 0.0 {
                winding += 1;
            }
        } else if b.y <= y && cross < 0.0 {
            winding -= 1;
        }
    }
    winding
}

fn over(src: HostColor, dst: [u8; 4]) -> [u8; 4] {
    let sa = f32::from(src.a()) / 255.0;
    let da = f32::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    let mix = |s: u8, d: u8| {
        let v = (f32::from(s) * sa + f32::from(d) * da * (1.0 - sa)) / out_a;
        v.round().clamp(0.0, 255.0) as u8
    };
    [
        mix(src.r(), dst[0]),
        mix(src.g(), dst[1]),
        mix(src.b(), dst[2]),
        (out_a * 255.0).round() as u8,
    ]
}

fn to_terminal(px: [u8; 4]) -> Color {
    if px[3] == 0 {
        Color::Reset
    } else {
        Color::Rgb(px[0], px[1], px[2])
    }
}

fn to_ansi_color(px: [u8; 4]) -> AnsiColor {
    if px[3] == 0 {
        AnsiColor::Reset
    } else {
        AnsiColor::Rgb {
            r: px[0],
            g: px[1],
            b: px[2],
        }
    }
}
