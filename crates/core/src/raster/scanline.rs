//! Signed-area coverage rasterizer.
//!
//! Every polygon edge deposits the signed area it sweeps into an
//! accumulation buffer. A running sum along each row then yields the exact
//! fraction of every pixel covered by the shape (non-zero winding, clamped to
//! one), which gives anti-aliased edges for free and crisp pixel-aligned
//! edges when coordinates are integers.

use identikit_protocol::Point;

pub(crate) struct Rasterizer {
    width: usize,
    height: usize,
    /// Two spare columns per row absorb edges on or past the right border.
    stride: usize,
    acc: Vec<f32>,
    dirty: Option<(usize, usize)>,
}

impl Rasterizer {
    pub(crate) fn new(width: usize, height: usize) -> Self {
        let stride = width + 2;
        Self {
            width,
            height,
            stride,
            acc: vec![0.0; stride * height],
            dirty: None,
        }
    }

    /// Add the closed outline through `points`.
    pub(crate) fn add_polygon(&mut self, points: &[Point]) {
        let Some(&last) = points.last() else {
            return;
        };
        let mut prev = to_local(last);
        for &p in points {
            let p = to_local(p);
            self.add_edge(prev, p);
            prev = p;
        }
    }

    /// Clip an edge to the rows of the canvas, split it where it crosses the
    /// left and right borders and push the outside parts onto the border,
    /// where they still contribute the right winding to the pixels inside.
    ///
    /// Clipping happens in `f64`, so only coordinates near the canvas ever
    /// reach the `f32` accumulation.
    fn add_edge(&mut self, p0: (f64, f64), p1: (f64, f64)) {
        let (w, h) = (self.width as f64, self.height as f64);
        if p0.1 == p1.1 {
            return;
        }
        let (top, bottom) = if p0.1 < p1.1 { (p0, p1) } else { (p1, p0) };
        let x_at_y = |y: f64| top.0 + (y - top.1) * (bottom.0 - top.0) / (bottom.1 - top.1);

        let y0 = top.1.max(0.0);
        let y1 = bottom.1.min(h);
        if y0 >= y1 {
            return;
        }
        let a = (if y0 == top.1 { top.0 } else { x_at_y(y0) }, y0);
        let b = (if y1 == bottom.1 { bottom.0 } else { x_at_y(y1) }, y1);

        let mut stops = [a, b, b, b];
        let mut n = 1;
        for border in [0.0, w] {
            if (a.0 < border && border < b.0) || (b.0 < border && border < a.0) {
                let y = a.1 + (border - a.0) * (b.1 - a.1) / (b.0 - a.0);
                stops[n] = (border, y);
                n += 1;
            }
        }
        stops[n] = b;
        stops[..=n].sort_by(|p, q| p.1.total_cmp(&q.1));

        let downward = p0.1 < p1.1;
        for pair in stops[..=n].windows(2) {
            let s = (pair[0].0.clamp(0.0, w) as f32, pair[0].1 as f32);
            let e = (pair[1].0.clamp(0.0, w) as f32, pair[1].1 as f32);
            if downward {
                self.line(s, e);
            } else {
                self.line(e, s);
            }
        }
    }

    fn line(&mut self, p0: (f32, f32), p1: (f32, f32)) {
        if (p0.1 - p1.1).abs() <= f32::EPSILON {
            return;
        }
        let (dir, p0, p1) = if p0.1 < p1.1 {
            (1.0, p0, p1)
        } else {
            (-1.0, p1, p0)
        };
        let dxdy = (p1.0 - p0.0) / (p1.1 - p0.1);
        let mut x = p0.0;
        let y_start = p0.1 as usize;
        let y_end = self.height.min(p1.1.ceil() as usize);
        if y_start >= y_end {
            return;
        }
        self.mark_dirty(y_start, y_end);

        for y in y_start..y_end {
            let row = y * self.stride;
            let dy = ((y + 1) as f32).min(p1.1) - (y as f32).max(p0.1);
            let x_next = (x + dxdy * dy).clamp(0.0, self.width as f32);
            let d = dy * dir;
            let (x0, x1) = if x < x_next { (x, x_next) } else { (x_next, x) };
            let x0_floor = x0.floor();
            let x0i = x0_floor as usize;
            let x1_ceil = x1.ceil();
            let x1i = x1_ceil as usize;

            if x1i <= x0i + 1 {
                // The edge stays within one pixel column on this row.
                let xmf = 0.5 * (x + x_next) - x0_floor;
                self.acc[row + x0i] += d - d * xmf;
                self.acc[row + x0i + 1] += d * xmf;
            } else {
                let s = (x1 - x0).recip();
                let x0f = x0 - x0_floor;
                let a0 = 0.5 * s * (1.0 - x0f) * (1.0 - x0f);
                let x1f = x1 - x1_ceil + 1.0;
                let am = 0.5 * s * x1f * x1f;
                self.acc[row + x0i] += d * a0;
                if x1i == x0i + 2 {
                    self.acc[row + x0i + 1] += d * (1.0 - a0 - am);
                } else {
                    let a1 = s * (1.5 - x0f);
                    self.acc[row + x0i + 1] += d * (a1 - a0);
                    for xi in x0i + 2..x1i - 1 {
                        self.acc[row + xi] += d * s;
                    }
                    let a2 = a1 + (x1i - x0i - 3) as f32 * s;
                    self.acc[row + x1i - 1] += d * (1.0 - a2 - am);
                }
                self.acc[row + x1i] += d * am;
            }
            x = x_next;
        }
    }

    fn mark_dirty(&mut self, y0: usize, y1: usize) {
        self.dirty = Some(match self.dirty {
            Some((a, b)) => (a.min(y0), b.max(y1)),
            None => (y0, y1),
        });
    }

    /// Report every pixel with non-zero coverage as `(x, y, coverage)` and
    /// reset the buffer for the next shape.
    pub(crate) fn drain(&mut self, mut visit: impl FnMut(usize, usize, f32)) {
        let Some((y0, y1)) = self.dirty.take() else {
            return;
        };
        for y in y0..y1 {
            let row = &mut self.acc[y * self.stride..(y + 1) * self.stride];
            let mut sum = 0.0f32;
            for (x, cell) in row.iter_mut().enumerate() {
                sum += *cell;
                *cell = 0.0;
                if x < self.width {
                    let coverage = sum.abs().min(1.0);
                    if coverage > 1.0 / 512.0 {
                        visit(x, y, coverage);
                    }
                }
            }
        }
    }
}

/// Vertices further out than this are pulled in before clipping so the edge
/// math cannot overflow; at that distance the pull moves the visible part of
/// an edge by far less than a pixel.
pub(crate) const COORD_LIMIT: f64 = 1e12;

fn to_local(p: Point) -> (f64, f64) {
    (
        p.x.clamp(-COORD_LIMIT, COORD_LIMIT),
        p.y.clamp(-COORD_LIMIT, COORD_LIMIT),
    )
}
