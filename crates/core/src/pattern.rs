//! A small deterministic icon generator, used by the CLI and the wasm bridge
//! and as a realistic workload in tests.

use identikit_protocol::{Color, DrawingSurface, IconGenerator, Point, Rect, Result};

const GRID: u32 = 5;
const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Horizontally mirrored 5x5 grid of squares with a dot in the middle,
/// seeded by a 64-bit FNV-1a hash of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashGrid {
    hash: u64,
}

impl HashGrid {
    pub fn new(input: &[u8]) -> Self {
        Self { hash: fnv1a(input) }
    }

    pub fn from_text(text: &str) -> Self {
        Self::new(text.as_bytes())
    }

    pub fn hash(&self) -> u64 {
        self.hash
    }

    pub fn foreground(&self) -> Color {
        hsl(self.hue(), 0.55, 0.5)
    }

    /// Complementary hue, darker, for the center dot.
    pub fn accent(&self) -> Color {
        hsl((self.hue() + 180.0) % 360.0, 0.6, 0.35)
    }

    fn hue(&self) -> f64 {
        ((self.hash >> 48) % 360) as f64
    }

    /// Whether cell (`col`, `row`) is filled. Columns 3 and 4 mirror 1 and 0;
    /// cells outside the grid never are.
    pub fn is_filled(&self, col: u32, row: u32) -> bool {
        if col >= GRID || row >= GRID {
            return false;
        }
        let col = col.min(GRID - 1 - col);
        let bit = col * GRID + row;
        (self.hash >> bit) & 1 == 1
    }
}

impl IconGenerator for HashGrid {
    fn draw(&self, surface: &mut dyn DrawingSurface, bounds: Rect) -> Result<()> {
        let side = bounds.w.min(bounds.h);
        if side <= 0.0 {
            return Ok(());
        }
        // Whole-pixel cells keep edges crisp once there is room for them.
        let cell = if side >= f64::from(GRID) {
            (side / f64::from(GRID)).floor()
        } else {
            side / f64::from(GRID)
        };
        let grid = cell * f64::from(GRID);
        let x0 = bounds.x + ((bounds.w - grid) / 2.0).floor();
        let y0 = bounds.y + ((bounds.h - grid) / 2.0).floor();

        let fg = self.foreground();
        for row in 0..GRID {
            for col in 0..GRID {
                if self.is_filled(col, row) {
                    let rect = Rect::new(
                        x0 + f64::from(col) * cell,
                        y0 + f64::from(row) * cell,
                        cell,
                        cell,
                    );
                    surface.add_rectangle(rect, fg)?;
                }
            }
        }

        let center = Point::new(x0 + grid / 2.0, y0 + grid / 2.0);
        surface.add_circle(center, cell * 0.35, self.accent())
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |hash, &b| {
        (hash ^ u64::from(b)).wrapping_mul(FNV_PRIME)
    })
}

/// `h` in degrees, `s` and `l` in 0..=1.
fn hsl(h: f64, s: f64, l: f64) -> Color {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r, g, b) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    Color::from_unit((r + m) as f32, (g + m) as f32, (b + m) as f32, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CommandRecorder;
    use identikit_protocol::ShapeCommand;

    #[test]
    fn fnv_reference_values() {
        assert_eq!(fnv1a(b""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(fnv1a(b"a"), 0xaf63_dc4c_8601_ec8c);
        assert_eq!(fnv1a(b"foobar"), 0x8594_4171_f739_67e8);
    }

    #[test]
    fn same_input_same_commands() {
        let record = |text: &str| {
            let mut rec = CommandRecorder::new();
            HashGrid::from_text(text)
                .draw(&mut rec, Rect::new(8.0, 8.0, 84.0, 84.0))
                .unwrap();
            rec.into_commands()
        };
        assert_eq!(record("alice"), record("alice"));
        assert_ne!(record("alice"), record("bob"));
    }

    #[test]
    fn grid_is_mirrored() {
        let grid = HashGrid::from_text("mirror");
        for row in 0..GRID {
            assert_eq!(grid.is_filled(0, row), grid.is_filled(4, row));
            assert_eq!(grid.is_filled(1, row), grid.is_filled(3, row));
        }
    }

    #[test]
    fn cells_outside_the_grid_are_empty() {
        let grid = HashGrid { hash: u64::MAX };
        assert!((0..GRID).all(|i| grid.is_filled(i, i)));
        for (col, row) in [(5, 0), (0, 5), (7, 2), (u32::MAX, u32::MAX)] {
            assert!(!grid.is_filled(col, row), "{col},{row}");
        }
    }

    #[test]
    fn tiny_bounds_scale_the_grid_down() {
        for bounds in [Rect::new(0.0, 0.0, 1.0, 1.0), Rect::new(2.0, 3.0, 4.0, 4.5)] {
            let mut rec = CommandRecorder::new();
            HashGrid::from_text("tiny").draw(&mut rec, bounds).unwrap();
            assert!(!rec.commands().is_empty());
            for cmd in rec.commands() {
                match cmd {
                    ShapeCommand::Rectangle { rect, .. } => {
                        assert!(rect.x >= bounds.x - 1e-9 && rect.right() <= bounds.right() + 1e-9);
                        assert!(rect.y >= bounds.y - 1e-9 && rect.bottom() <= bounds.bottom() + 1e-9);
                    }
                    ShapeCommand::Circle { center, radius, .. } => {
                        assert!(center.x - radius >= bounds.x && center.x + radius <= bounds.right());
                        assert!(center.y - radius >= bounds.y && center.y + radius <= bounds.bottom());
                    }
                    other => panic!("unexpected command {other:?}"),
                }
            }
        }

        let mut rec = CommandRecorder::new();
        HashGrid::from_text("tiny")
            .draw(&mut rec, Rect::new(0.0, 0.0, 0.0, 0.0))
            .unwrap();
        assert!(rec.commands().is_empty());
    }

    #[test]
    fn shapes_stay_inside_bounds() {
        let bounds = Rect::new(8.0, 8.0, 84.0, 84.0);
        let mut rec = CommandRecorder::new();
        HashGrid::from_text("bounds").draw(&mut rec, bounds).unwrap();
        for cmd in rec.commands() {
            match cmd {
                ShapeCommand::Rectangle { rect, .. } => {
                    assert!(rect.x >= bounds.x && rect.right() <= bounds.right());
                    assert!(rect.y >= bounds.y && rect.bottom() <= bounds.bottom());
                    assert_eq!(rect.w, 16.0);
                }
                ShapeCommand::Circle { center, .. } => {
                    assert_eq!((center.x, center.y), (50.0, 50.0));
                }
                other => panic!("unexpected command {other:?}"),
            }
        }
    }

    #[test]
    fn hsl_primaries() {
        assert_eq!(hsl(0.0, 1.0, 0.5), Color::from_rgb(255, 0, 0));
        assert_eq!(hsl(120.0, 1.0, 0.5), Color::from_rgb(0, 255, 0));
        assert_eq!(hsl(240.0, 1.0, 0.5), Color::from_rgb(0, 0, 255));
        assert_eq!(hsl(0.0, 0.0, 1.0), Color::WHITE);
    }
}
