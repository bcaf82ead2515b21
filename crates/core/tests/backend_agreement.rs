//! The raster backend and a reference SVG rasterizer should agree on where
//! the ink goes, and in which color, for the same drawing calls.

use identikit_core::{ExportOptions, Exporter, HashGrid};
use identikit_protocol::{Color, DrawingSurface, IconGenerator, Point, Rect, Result};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree};

/// Largest per-channel difference allowed, and how many pixels may exceed
/// the alpha bound.
#[derive(Clone, Copy)]
struct Tolerance {
    alpha: u8,
    rgb: u8,
    outliers: usize,
}

/// Shapes with pixel-aligned edges: only rounding may differ.
const EXACT: Tolerance = Tolerance {
    alpha: 2,
    rgb: 3,
    outliers: 0,
};

/// Slanted anti-aliased edges. The reference supersamples coverage, which is
/// off by up to an eighth of a pixel on an edge.
const SLANTED: Tolerance = Tolerance {
    alpha: 40,
    rgb: 40,
    outliers: 0,
};

/// Circles are polygons within a quarter pixel on our side, on top of the
/// supersampling error above.
const CIRCLES: Tolerance = Tolerance {
    alpha: 80,
    rgb: 80,
    outliers: 0,
};

/// Both sides sample pixel centres. The reference snaps edges to 1/64 px
/// first, so a centre lying almost on an edge can flip.
const ALIASED: Tolerance = Tolerance {
    alpha: 0,
    rgb: 0,
    outliers: 3,
};

fn rasterize_svg(svg: &str, size: u32) -> Pixmap {
    let tree = Tree::from_str(svg, &Options::default()).unwrap();
    let mut pixmap = Pixmap::new(size, size).unwrap();
    resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());
    pixmap
}

fn assert_agrees<G: IconGenerator>(exporter: &Exporter<G>, size: u32, tol: Tolerance) {
    let bitmap = exporter.to_bitmap(size).unwrap();
    let reference = rasterize_svg(&exporter.to_svg_string(size).unwrap(), size);

    let mut alpha_mismatches = Vec::new();
    let mut worst_rgb = (0, 0, 0);
    for y in 0..size {
        for x in 0..size {
            let ours = bitmap.pixel(x, y);
            let theirs = reference
                .pixel(x, y)
                .map(|p| {
                    let c = p.demultiply();
                    [c.red(), c.green(), c.blue(), c.alpha()]
                })
                .unwrap_or([0; 4]);

            if ours[3].abs_diff(theirs[3]) > tol.alpha {
                alpha_mismatches.push((x, y, ours[3], theirs[3]));
            }
            // Color only means something where both sides are opaque.
            if ours[3] == 255 && theirs[3] == 255 {
                let diff = (0..3).map(|i| ours[i].abs_diff(theirs[i])).max().unwrap_or(0);
                if diff > worst_rgb.2 {
                    worst_rgb = (x, y, diff);
                }
            }
        }
    }
    assert!(
        alpha_mismatches.len() <= tol.outliers,
        "{} alpha mismatches at size {size}: {:?}",
        alpha_mismatches.len(),
        &alpha_mismatches[..alpha_mismatches.len().min(8)]
    );
    assert!(
        worst_rgb.2 <= tol.rgb,
        "color differs by {} at {},{} (size {size})",
        worst_rgb.2,
        worst_rgb.0,
        worst_rgb.1
    );
}

fn on_white<G: IconGenerator>(generator: G) -> Exporter<G> {
    Exporter::new(generator).with_options(ExportOptions {
        background: Some(Color::WHITE),
        ..ExportOptions::default()
    })
}

#[test]
fn rectangles_agree() {
    let exporter = Exporter::new(|s: &mut dyn DrawingSurface, b: Rect| {
        s.add_rectangle(b, Color::BLACK)
    });
    assert_agrees(&exporter, 40, EXACT);
}

#[test]
fn translucent_overlaps_agree() {
    let shapes = |s: &mut dyn DrawingSurface, b: Rect| -> Result<()> {
        let half = (b.w / 2.0).floor();
        s.add_rectangle(
            Rect::new(b.x, b.y, half + 6.0, half + 6.0),
            Color::from_rgba(220, 20, 60, 128),
        )?;
        s.add_rectangle(
            Rect::new(b.x + half - 6.0, b.y + half - 6.0, half + 6.0, half + 6.0),
            Color::from_rgba(30, 144, 255, 160),
        )?;
        s.add_rectangle(
            Rect::new(b.x + 4.0, b.y + half, b.w - 8.0, 4.0),
            Color::from_rgba(0, 0, 0, 64),
        )
    };
    assert_agrees(&on_white(shapes), 48, EXACT);
}

#[test]
fn slanted_polygons_agree() {
    let shapes = |s: &mut dyn DrawingSurface, b: Rect| -> Result<()> {
        s.add_polygon(
            &[
                Point::new(b.x, b.y),
                Point::new(b.right(), b.y),
                Point::new(b.x, b.y + b.h / 2.0),
            ],
            Color::from_rgb(30, 30, 200),
            true,
        )?;
        s.add_polygon(
            &[
                Point::new(b.x + 3.3, b.bottom()),
                Point::new(b.right() - 0.7, b.y + b.h * 0.4),
                Point::new(b.right(), b.bottom() - 0.2),
            ],
            Color::from_rgba(10, 160, 60, 200),
            true,
        )
    };
    assert_agrees(&on_white(shapes), 64, SLANTED);
    assert_agrees(&Exporter::new(shapes), 64, SLANTED);
}

#[test]
fn aliased_polygons_agree() {
    let shapes = |s: &mut dyn DrawingSurface, b: Rect| -> Result<()> {
        s.add_polygon(
            &[
                Point::new(b.x + 0.3, b.y + 0.7),
                Point::new(b.right() - 0.2, b.y + 3.3),
                Point::new(b.x + 5.6, b.bottom() - 0.4),
            ],
            Color::from_rgb(200, 30, 30),
            false,
        )?;
        // A spike narrower than a pixel: only centre sampling keeps it whole.
        let cx = b.x + (b.w / 2.0).floor() + 0.5;
        s.add_polygon(
            &[
                Point::new(cx - 0.3, b.y + 0.1),
                Point::new(cx + 0.3, b.y + 0.1),
                Point::new(cx + 0.02, b.bottom() - 0.1),
            ],
            Color::BLACK,
            false,
        )
    };
    assert_agrees(&Exporter::new(shapes), 40, ALIASED);
    assert_agrees(&on_white(shapes), 40, ALIASED);
}

#[test]
fn circles_agree() {
    let shapes = |s: &mut dyn DrawingSurface, b: Rect| -> Result<()> {
        s.add_circle(
            Point::new(b.x + b.w / 2.0, b.y + b.h / 2.0),
            b.w / 3.0,
            Color::from_rgb(200, 30, 30),
        )?;
        s.add_circle(
            Point::new(b.x + b.w / 3.0, b.y + b.h / 3.0),
            b.w / 5.0,
            Color::from_rgba(30, 30, 200, 140),
        )
    };
    assert_agrees(&Exporter::new(shapes), 64, CIRCLES);
    assert_agrees(&on_white(shapes), 64, CIRCLES);
}

#[test]
fn hash_grids_agree() {
    for text in ["alice", "bob", "carol"] {
        // The grid is pixel-aligned; only the centre dot is a circle.
        assert_agrees(&Exporter::new(HashGrid::from_text(text)), 50, CIRCLES);
        assert_agrees(&on_white(HashGrid::from_text(text)), 50, CIRCLES);
    }
}
