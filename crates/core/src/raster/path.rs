//! Path segments and curve flattening.

use crate::utils::{Matrix, Point, apply_matrix_pt};
use smallvec::SmallVec;

/// Maximum distance in device pixels between a curve and its polyline.
pub const FLATTEN_TOLERANCE: f64 = 0.2;

/// Recursion limit for adaptive subdivision (2^16 segments per curve).
const MAX_SUBDIVISION: u32 = 16;

/// Path segment in user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    /// Move to point (x, y)
    MoveTo(f64, f64),
    /// Line to point (x, y)
    LineTo(f64, f64),
    /// Cubic bezier curve (x1, y1, x2, y2, x3, y3)
    CurveTo(f64, f64, f64, f64, f64, f64),
    /// Close path
    ClosePath,
}

impl PathSegment {
    /// The segment with every point mapped through `m`.
    pub fn transform(self, m: Matrix) -> Self {
        match self {
            Self::MoveTo(x, y) => {
                let (x, y) = apply_matrix_pt(m, (x, y));
                Self::MoveTo(x, y)
            }
            Self::LineTo(x, y) => {
                let (x, y) = apply_matrix_pt(m, (x, y));
                Self::LineTo(x, y)
            }
            Self::CurveTo(x1, y1, x2, y2, x3, y3) => {
                let (x1, y1) = apply_matrix_pt(m, (x1, y1));
                let (x2, y2) = apply_matrix_pt(m, (x2, y2));
                let (x3, y3) = apply_matrix_pt(m, (x3, y3));
                Self::CurveTo(x1, y1, x2, y2, x3, y3)
            }
            Self::ClosePath => Self::ClosePath,
        }
    }
}

/// A flattened subpath in device space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polyline {
    pub points: Vec<Point>,
    pub closed: bool,
}

/// Flattens `path` into device-space polylines using `m`.
///
/// Curves are subdivided until their control points lie within
/// [`FLATTEN_TOLERANCE`] of the chord.
pub fn flatten(path: &[PathSegment], m: Matrix) -> Vec<Polyline> {
    let mut out: Vec<Polyline> = Vec::new();
    let mut current = Polyline::default();
    let mut start: Option<Point> = None;
    let mut last: Point = (0.0, 0.0);

    let flush = |current: &mut Polyline, out: &mut Vec<Polyline>| {
        if current.points.len() > 1 {
            out.push(std::mem::take(current));
        } else {
            current.points.clear();
            current.closed = false;
        }
    };

    for seg in path {
        match *seg {
            PathSegment::MoveTo(x, y) => {
                flush(&mut current, &mut out);
                let p = apply_matrix_pt(m, (x, y));
                current.points.push(p);
                start = Some(p);
                last = p;
            }
            PathSegment::LineTo(x, y) => {
                let p = apply_matrix_pt(m, (x, y));
                if current.points.is_empty() {
                    current.points.push(last);
                    start.get_or_insert(last);
                }
                current.points.push(p);
                last = p;
            }
            PathSegment::CurveTo(x1, y1, x2, y2, x3, y3) => {
                let p1 = apply_matrix_pt(m, (x1, y1));
                let p2 = apply_matrix_pt(m, (x2, y2));
                let p3 = apply_matrix_pt(m, (x3, y3));
                if current.points.is_empty() {
                    current.points.push(last);
                    start.get_or_insert(last);
                }
                flatten_cubic(last, p1, p2, p3, &mut current.points, 0);
                last = p3;
            }
            PathSegment::ClosePath => {
                if let Some(s) = start {
                    current.closed = true;
                    flush(&mut current, &mut out);
                    // A new subpath after `h` starts at the closed one's start.
                    last = s;
                    current.points.push(s);
                }
            }
        }
    }
    flush(&mut current, &mut out);
    out
}

fn flatten_cubic(p0: Point, p1: Point, p2: Point, p3: Point, out: &mut Vec<Point>, depth: u32) {
    if depth >= MAX_SUBDIVISION || is_flat(p0, p1, p2, p3) {
        out.push(p3);
        return;
    }
    let mid = |a: Point, b: Point| ((a.0 + b.0) * 0.5, (a.1 + b.1) * 0.5);
    let p01 = mid(p0, p1);
    let p12 = mid(p1, p2);
    let p23 = mid(p2, p3);
    let p012 = mid(p01, p12);
    let p123 = mid(p12, p23);
    let p0123 = mid(p012, p123);
    flatten_cubic(p0, p01, p012, p0123, out, depth + 1);
    flatten_cubic(p0123, p123, p23, p3, out, depth + 1);
}

/// Both control points within tolerance of the chord p0-p3.
fn is_flat(p0: Point, p1: Point, p2: Point, p3: Point) -> bool {
    let (dx, dy) = (p3.0 - p0.0, p3.1 - p0.1);
    let len = dx.hypot(dy);
    let dist = |p: Point| {
        if len < 1e-9 {
            (p.0 - p0.0).hypot(p.1 - p0.1)
        } else {
            ((p.0 - p0.0) * dy - (p.1 - p0.1) * dx).abs() / len
        }
    };
    dist(p1) <= FLATTEN_TOLERANCE && dist(p2) <= FLATTEN_TOLERANCE
}

/// Device-space bounding box of a set of polylines.
pub fn bounds(polys: &[Polyline]) -> Option<(f64, f64, f64, f64)> {
    let mut it = polys.iter().flat_map(|p| p.points.iter());
    let first = *it.next()?;
    Some(it.fold((first.0, first.1, first.0, first.1), |b, p| {
        (b.0.min(p.0), b.1.min(p.1), b.2.max(p.0), b.3.max(p.1))
    }))
}

/// Rectangle as a closed path, the way `re` builds it.
pub fn rect_path(x: f64, y: f64, w: f64, h: f64) -> SmallVec<[PathSegment; 5]> {
    SmallVec::from_buf([
        PathSegment::MoveTo(x, y),
        PathSegment::LineTo(x + w, y),
        PathSegment::LineTo(x + w, y + h),
        PathSegment::LineTo(x, y + h),
        PathSegment::ClosePath,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::MATRIX_IDENTITY;

    #[test]
    fn rectangle_flattens_to_one_closed_polyline() {
        let polys = flatten(&rect_path(0.0, 0.0, 10.0, 5.0), MATRIX_IDENTITY);
        assert_eq!(polys.len(), 1);
        assert!(polys[0].closed);
        assert_eq!(polys[0].points.len(), 4);
    }

    #[test]
    fn curve_stays_within_tolerance() {
        let path = [
            PathSegment::MoveTo(0.0, 0.0),
            PathSegment::CurveTo(0.0, 100.0, 100.0, 100.0, 100.0, 0.0),
        ];
        let polys = flatten(&path, MATRIX_IDENTITY);
        let pts = &polys[0].points;
        assert!(pts.len() > 8);
        // Peak of this cubic is at y = 75.
        let max_y = pts.iter().map(|p| p.1).fold(0.0, f64::max);
        assert!((max_y - 75.0).abs() < 0.5);
        assert_eq!(*pts.last().unwrap(), (100.0, 0.0));
    }

    #[test]
    fn transform_scales_points() {
        let polys = flatten(&[PathSegment::MoveTo(1.0, 1.0), PathSegment::LineTo(2.0, 1.0)], (2.0, 0.0, 0.0, 2.0, 1.0, 0.0));
        assert_eq!(polys[0].points, vec![(3.0, 2.0), (5.0, 2.0)]);
        assert!(!polys[0].closed);
    }

    #[test]
    fn lone_moveto_is_dropped() {
        assert!(flatten(&[PathSegment::MoveTo(1.0, 1.0)], MATRIX_IDENTITY).is_empty());
    }
}
