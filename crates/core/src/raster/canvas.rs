use identikit_protocol::Color;

/// Premultiplied RGBA8 pixel grid.
pub(crate) struct Canvas {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl Canvas {
    pub(crate) fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height * 4],
        }
    }

    /// Composite `color` over the pixel at `(x, y)`, scaled by `coverage`.
    pub(crate) fn blend(&mut self, x: usize, y: usize, color: Color, coverage: f32) {
        let src = color.premultiplied();
        let cov = coverage.clamp(0.0, 1.0);
        let inv = 1.0 - f32::from(src[3]) / 255.0 * cov;
        let i = (y * self.width + x) * 4;
        for (dst, s) in self.data[i..i + 4].iter_mut().zip(src) {
            let v = f32::from(s) * cov + f32::from(*dst) * inv;
            *dst = v.round().clamp(0.0, 255.0) as u8;
        }
    }

    pub(crate) fn fill(&mut self, color: Color) {
        for y in 0..self.height {
            for x in 0..self.width {
                self.blend(x, y, color, 1.0);
            }
        }
    }

    /// Straight (non-premultiplied) RGBA8, row-major.
    pub(crate) fn to_straight_rgba(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len());
        for px in self.data.chunks_exact(4) {
            let a = u32::from(px[3]);
            if a == 0 {
                out.extend_from_slice(&[0, 0, 0, 0]);
                continue;
            }
            for &c in &px[..3] {
                out.push(((u32::from(c) * 255 + a / 2) / a).min(255) as u8);
            }
            out.push(px[3]);
        }
        out
    }
}
