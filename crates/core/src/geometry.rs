//! Shape math shared by every backend.
//!
//! Backends only know how to fill a handful of primitives. The functions here
//! validate incoming shapes and lower rectangles and circles to whatever the
//! backend can draw, so a circle looks the same in every output format.

use std::f64::consts::PI;

use identikit_protocol::{Point, Rect, ShapeDefect};

/// Maximum distance, in output pixels, between a circle and the polygon
/// approximating it.
pub const CIRCLE_TOLERANCE: f64 = 0.25;
pub const MIN_CIRCLE_SEGMENTS: usize = 16;
/// Above roughly 850k px of radius the tolerance is no longer met.
pub const MAX_CIRCLE_SEGMENTS: usize = 4096;

/// Fraction of the icon size left empty on each side.
pub const DEFAULT_PADDING: f64 = 0.08;

/// Primitives a backend can fill natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub circles: bool,
    pub rectangles: bool,
}

impl Capabilities {
    pub const POLYGONS_ONLY: Capabilities = Capabilities {
        circles: false,
        rectangles: false,
    };
    pub const ALL: Capabilities = Capabilities {
        circles: true,
        rectangles: true,
    };
}

/// A shape lowered to something a backend draws directly.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Polygon(Vec<Point>),
    Rectangle(Rect),
    Circle { center: Point, radius: f64 },
}

pub fn validate_polygon(points: &[Point]) -> Result<(), ShapeDefect> {
    if points.len() < 3 {
        return Err(ShapeDefect::TooFewPoints(points.len()));
    }
    if !points.iter().all(Point::is_finite) {
        return Err(ShapeDefect::NonFinite);
    }
    Ok(())
}

pub fn validate_rect(rect: &Rect) -> Result<(), ShapeDefect> {
    if !rect.is_finite() {
        return Err(ShapeDefect::NonFinite);
    }
    if rect.w < 0.0 || rect.h < 0.0 {
        return Err(ShapeDefect::NegativeExtent);
    }
    Ok(())
}

pub fn validate_circle(center: Point, radius: f64) -> Result<(), ShapeDefect> {
    if !center.is_finite() || !radius.is_finite() {
        return Err(ShapeDefect::NonFinite);
    }
    if radius < 0.0 {
        return Err(ShapeDefect::NegativeRadius);
    }
    Ok(())
}

pub fn rect_to_polygon(rect: &Rect) -> Vec<Point> {
    rect.corners().to_vec()
}

/// Number of polygon segments needed to stay within [`CIRCLE_TOLERANCE`] of
/// a circle of `radius` output pixels. Never decreases as the radius grows.
pub fn circle_segments(radius: f64) -> usize {
    if radius.is_nan() || radius <= CIRCLE_TOLERANCE {
        return MIN_CIRCLE_SEGMENTS;
    }
    // Sagitta of one segment: r * (1 - cos(pi / n)) <= tol
    let half_angle = (1.0 - CIRCLE_TOLERANCE / radius).acos();
    let n = (PI / half_angle).ceil();
    if n >= MAX_CIRCLE_SEGMENTS as f64 {
        MAX_CIRCLE_SEGMENTS
    } else {
        (n as usize).max(MIN_CIRCLE_SEGMENTS)
    }
}

/// Largest distance between a circle and its inscribed `segments`-gon.
pub fn max_circle_deviation(radius: f64, segments: usize) -> f64 {
    radius * (1.0 - (PI / segments as f64).cos())
}

pub fn circle_to_polygon(center: Point, radius: f64) -> Vec<Point> {
    let n = circle_segments(radius);
    let step = 2.0 * PI / n as f64;
    (0..n)
        .map(|i| {
            let angle = step * i as f64;
            Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
        })
        .collect()
}

pub fn lower_rectangle(rect: Rect, caps: Capabilities) -> Result<Primitive, ShapeDefect> {
    validate_rect(&rect)?;
    Ok(if caps.rectangles {
        Primitive::Rectangle(rect)
    } else {
        Primitive::Polygon(rect_to_polygon(&rect))
    })
}

pub fn lower_circle(
    center: Point,
    radius: f64,
    caps: Capabilities,
) -> Result<Primitive, ShapeDefect> {
    validate_circle(center, radius)?;
    Ok(if caps.circles {
        Primitive::Circle { center, radius }
    } else {
        Primitive::Polygon(circle_to_polygon(center, radius))
    })
}

/// Non-zero winding number of the closed polygon `points` around (`x`, `y`).
///
/// A point exactly on a left or top edge counts as inside; on a right or
/// bottom edge as outside.
pub fn winding_number(points: &[Point], x: f64, y: f64) -> i32 {
    let mut winding = 0;
    for (i, a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
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

/// The padded square inside an icon of `size` pixels where shapes go.
///
/// Padding is rounded to whole pixels so that shapes aligned to the bounds
/// land on pixel edges. `padding` is clamped to `[0, 0.5)`.
pub fn icon_bounds(size: u32, padding: f64) -> Rect {
    let padding = if padding.is_nan() {
        0.0
    } else {
        padding.clamp(0.0, 0.499)
    };
    let size = f64::from(size);
    let pad = (size * padding + 0.5).floor();
    Rect::square(size).inset(pad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rejects_degenerate_polygons() {
        let two = [Point::new(0.0, 0.0), Point::new(1.0, 1.0)];
        assert_eq!(validate_polygon(&two), Err(ShapeDefect::TooFewPoints(2)));
        assert_eq!(validate_polygon(&[]), Err(ShapeDefect::TooFewPoints(0)));

        let nan = [
            Point::new(0.0, 0.0),
            Point::new(f64::NAN, 1.0),
            Point::new(1.0, 0.0),
        ];
        assert_eq!(validate_polygon(&nan), Err(ShapeDefect::NonFinite));
    }

    #[test]
    fn rejects_negative_radius_and_extent() {
        assert_eq!(
            validate_circle(Point::new(0.0, 0.0), -1.0),
            Err(ShapeDefect::NegativeRadius)
        );
        assert_eq!(
            validate_rect(&Rect::new(0.0, 0.0, -1.0, 2.0)),
            Err(ShapeDefect::NegativeExtent)
        );
        assert!(validate_circle(Point::new(0.0, 0.0), 0.0).is_ok());
        assert!(validate_rect(&Rect::new(0.0, 0.0, 0.0, 0.0)).is_ok());
    }

    #[test]
    fn small_circles_use_minimum_segments() {
        assert_eq!(circle_segments(0.0), MIN_CIRCLE_SEGMENTS);
        assert_eq!(circle_segments(1.0), MIN_CIRCLE_SEGMENTS);
        assert!(circle_segments(500.0) > MIN_CIRCLE_SEGMENTS);
    }

    #[test]
    fn lowering_respects_capabilities() {
        let rect = Rect::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(
            lower_rectangle(rect, Capabilities::ALL),
            Ok(Primitive::Rectangle(rect))
        );
        match lower_rectangle(rect, Capabilities::POLYGONS_ONLY) {
            Ok(Primitive::Polygon(points)) => {
                assert_eq!(points.len(), 4);
                assert_eq!(points[2], Point::new(4.0, 6.0));
            }
            other => panic!("unexpected {other:?}"),
        }
        match lower_circle(Point::new(5.0, 5.0), 2.0, Capabilities::POLYGONS_ONLY) {
            Ok(Primitive::Polygon(points)) => assert_eq!(points.len(), MIN_CIRCLE_SEGMENTS),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn winding_counts_turns() {
        let square = rect_to_polygon(&Rect::new(0.0, 0.0, 4.0, 4.0));
        assert_eq!(winding_number(&square, 2.0, 2.0).abs(), 1);
        assert_eq!(winding_number(&square, 5.0, 2.0), 0);
        assert_eq!(winding_number(&square, 0.0, 0.0).abs(), 1);
        assert_eq!(winding_number(&square, 4.0, 2.0), 0);

        // Going around twice winds twice; nonzero either way.
        let twice: Vec<Point> = square.iter().chain(&square).copied().collect();
        assert_eq!(winding_number(&twice, 2.0, 2.0).abs(), 2);

        let mut reversed = square.clone();
        reversed.reverse();
        assert_eq!(
            winding_number(&reversed, 2.0, 2.0),
            -winding_number(&square, 2.0, 2.0)
        );
    }

    #[test]
    fn bounds_match_padding() {
        assert_eq!(icon_bounds(100, DEFAULT_PADDING), Rect::new(8.0, 8.0, 84.0, 84.0));
        assert_eq!(icon_bounds(16, DEFAULT_PADDING), Rect::new(1.0, 1.0, 14.0, 14.0));
        assert_eq!(icon_bounds(1, DEFAULT_PADDING), Rect::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(icon_bounds(50, 0.0), Rect::square(50.0));
    }

    proptest! {
        #[test]
        fn segment_count_is_monotonic(a in 0.0f64..100_000.0, b in 0.0f64..100_000.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(circle_segments(lo) <= circle_segments(hi));
        }

        #[test]
        fn deviation_stays_below_a_pixel(radius in 0.0f64..100_000.0) {
            let n = circle_segments(radius);
            prop_assert!(max_circle_deviation(radius, n) < 1.0);
            prop_assert!(max_circle_deviation(radius, n) <= CIRCLE_TOLERANCE + 1e-9);
        }

        #[test]
        fn circle_vertices_lie_on_circle(x in -100.0f64..100.0, y in -100.0f64..100.0, r in 0.0f64..500.0) {
            let center = Point::new(x, y);
            for p in circle_to_polygon(center, r) {
                let d = ((p.x - x).powi(2) + (p.y - y).powi(2)).sqrt();
                prop_assert!((d - r).abs() < 1e-6);
            }
        }
    }
}
