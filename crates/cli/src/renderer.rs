use std::io::stdout;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use identikit_core::Exporter;
use identikit_protocol::IconGenerator;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::Rect,
    style::{Color, Style},
    widgets::Block,
};

use crate::canvas::TerminalCanvas;

const MIN_SIZE: u16 = 4;

/// Largest square icon, in pixels, that fits a content area of `width` x
/// `height` cells at two pixels per cell row.
fn fit(width: u16, height: u16) -> u16 {
    width.min(height.saturating_mul(2)).max(MIN_SIZE)
}

/// Requested icon size in pixels, with zero meaning "fit the terminal".
fn initial_request(size: Option<u32>) -> u16 {
    size.map_or(0, |s| u16::try_from(s).unwrap_or(u16::MAX))
}

/// Draw the icon through the host-context backend until `q` or `Esc`.
///
/// `size` is the starting icon size; it is shrunk to fit the terminal.
pub fn preview<G: IconGenerator>(
    exporter: &Exporter<G>,
    label: &str,
    size: Option<u32>,
) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, exporter, label, initial_request(size));

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

fn run<G: IconGenerator>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    exporter: &Exporter<G>,
    label: &str,
    mut requested: u16,
) -> Result<()> {
    let mut cached: Option<TerminalCanvas> = None;
    let mut cached_size = 0;

    loop {
        let term = terminal.size()?;
        let max = fit(term.width, term.height.saturating_sub(1));
        let size = if requested == 0 { max } else { requested.min(max) };

        if cached_size != size {
            let mut canvas = TerminalCanvas::new(size, size);
            exporter.render_native(u32::from(size), &mut canvas)?;
            cached = Some(canvas);
            cached_size = size;
        }

        terminal.draw(|frame| {
            let area = frame.area();

            let header_area = Rect::new(0, 0, area.width, 1);
            let header = Block::default()
                .title(format!(" identikit: {label} | {size}px | +/- resize | q quit "))
                .style(Style::default().fg(Color::White).bg(Color::DarkGray));
            frame.render_widget(header, header_area);

            let content = Rect::new(0, 1, area.width, area.height.saturating_sub(1));
            if let Some(canvas) = &cached {
                frame.render_widget(canvas, content);
            }
        })?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
            {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Char('+') | KeyCode::Char('=') => {
                        requested = size.saturating_add(2).min(max);
                    }
                    KeyCode::Char('-') => {
                        requested = size.saturating_sub(2).max(MIN_SIZE);
                    }
                    KeyCode::Char('0') => requested = 0,
                    _ => {}
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_prefers_the_tighter_side() {
        assert_eq!(fit(80, 24), 48);
        assert_eq!(fit(30, 24), 30);
        assert_eq!(fit(0, 0), MIN_SIZE);
    }

    #[test]
    fn requested_size_seeds_the_preview() {
        assert_eq!(initial_request(None), 0);
        assert_eq!(initial_request(Some(32)), 32);
        assert_eq!(initial_request(Some(1 << 20)), u16::MAX);
    }
}
