//! Stroke expansion.
//!
//! A stroked polyline becomes a set of polygons (one per segment, join and
//! cap), all oriented the same way, so filling them with the nonzero rule
//! paints their union.

use super::path::{FLATTEN_TOLERANCE, Polyline};
use crate::utils::Point;

/// Lengths below this are treated as zero.
const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

impl LineCap {
    pub const fn from_pdf(value: i64) -> Self {
        match value {
            1 => Self::Round,
            2 => Self::Square,
            _ => Self::Butt,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

impl LineJoin {
    pub const fn from_pdf(value: i64) -> Self {
        match value {
            1 => Self::Round,
            2 => Self::Bevel,
            _ => Self::Miter,
        }
    }
}

/// Stroke parameters in device pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    pub width: f64,
    pub cap: LineCap,
    pub join: LineJoin,
    pub miter_limit: f64,
    pub dash: Option<(Vec<f64>, f64)>,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            width: 1.0,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            miter_limit: 10.0,
            dash: None,
        }
    }
}

fn sub(a: Point, b: Point) -> Point {
    (a.0 - b.0, a.1 - b.1)
}

fn add(a: Point, b: Point) -> Point {
    (a.0 + b.0, a.1 + b.1)
}

fn scale(a: Point, s: f64) -> Point {
    (a.0 * s, a.1 * s)
}

fn unit(a: Point) -> Option<Point> {
    let len = a.0.hypot(a.1);
    (len > EPSILON).then(|| (a.0 / len, a.1 / len))
}

/// Left-hand normal of a unit direction.
fn normal(d: Point) -> Point {
    (-d.1, d.0)
}

fn signed_area(points: &[Point]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let (a, b) = (points[i], points[(i + 1) % n]);
            a.0 * b.1 - b.0 * a.1
        })
        .sum::<f64>()
        * 0.5
}

fn push_polygon(out: &mut Vec<Polyline>, mut points: Vec<Point>) {
    if points.len() < 3 {
        return;
    }
    let area = signed_area(&points);
    if area.abs() < 1e-12 {
        return;
    }
    if area < 0.0 {
        points.reverse();
    }
    out.push(Polyline { points, closed: true });
}

fn circle(center: Point, radius: f64) -> Vec<Point> {
    let step = if radius > FLATTEN_TOLERANCE {
        2.0 * (1.0 - FLATTEN_TOLERANCE / radius).acos()
    } else {
        std::f64::consts::FRAC_PI_2
    };
    let n = ((std::f64::consts::TAU / step).ceil() as usize).clamp(8, 256);
    (0..n)
        .map(|i| {
            let a = std::f64::consts::TAU * i as f64 / n as f64;
            (center.0 + radius * a.cos(), center.1 + radius * a.sin())
        })
        .collect()
}

/// Splits polylines into dash pieces. Returns the input when the pattern
/// has no positive length.
pub fn apply_dash(polys: &[Polyline], pattern: &[f64], phase: f64) -> Vec<Polyline> {
    let total: f64 = pattern.iter().map(|v| v.max(0.0)).sum();
    if pattern.is_empty() || total <= EPSILON {
        return polys.to_vec();
    }
    let mut out = Vec::new();
    for poly in polys {
        let mut pts = poly.points.clone();
        if poly.closed
            && let Some(first) = pts.first().copied()
        {
            pts.push(first);
        }

        // Position inside the pattern at the start of this subpath.
        let mut idx = 0;
        let mut left = pattern[0].max(0.0);
        let mut skip = phase.rem_euclid(total);
        while skip > 0.0 {
            if skip >= left {
                skip -= left;
                idx = (idx + 1) % pattern.len();
                left = pattern[idx].max(0.0);
            } else {
                left -= skip;
                skip = 0.0;
            }
        }

        let mut current: Vec<Point> = Vec::new();
        let mut on = idx % 2 == 0;
        if on && let Some(p) = pts.first() {
            current.push(*p);
        }
        for w in pts.windows(2) {
            let (mut a, b) = (w[0], w[1]);
            let mut seg_len = (b.0 - a.0).hypot(b.1 - a.1);
            while seg_len > 0.0 {
                if left >= seg_len {
                    left -= seg_len;
                    if on {
                        current.push(b);
                    }
                    seg_len = 0.0;
                } else {
                    let t = left / seg_len;
                    let p = (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t);
                    if on {
                        current.push(p);
                        if current.len() > 1 {
                            out.push(Polyline {
                                points: std::mem::take(&mut current),
                                closed: false,
                            });
                        }
                        current.clear();
                    } else {
                        current.push(p);
                    }
                    seg_len -= left;
                    a = p;
                    idx = (idx + 1) % pattern.len();
                    left = pattern[idx].max(0.0);
                    on = !on;
                }
            }
        }
        if on && current.len() > 1 {
            out.push(Polyline {
                points: current,
                closed: false,
            });
        }
    }
    out
}

/// Expands device-space polylines into fillable polygons.
pub fn stroke_polylines(polys: &[Polyline], style: &StrokeStyle) -> Vec<Polyline> {
    let hw = style.width.max(1.0) / 2.0;
    let dashed;
    let polys = match &style.dash {
        Some((pattern, phase)) => {
            dashed = apply_dash(polys, pattern, *phase);
            &dashed
        }
        None => polys,
    };

    let mut out = Vec::new();
    for poly in polys {
        // Drop repeated points so every segment has a direction.
        let mut pts: Vec<Point> = Vec::with_capacity(poly.points.len());
        for &p in &poly.points {
            if pts.last().is_none_or(|&q| unit(sub(p, q)).is_some()) {
                pts.push(p);
            }
        }
        if poly.closed && pts.len() > 2 && unit(sub(pts[0], pts[pts.len() - 1])).is_none() {
            pts.pop();
        }

        if pts.is_empty() {
            continue;
        }
        if pts.len() == 1 {
            // Zero-length subpath: only round and square caps show.
            let p = pts[0];
            match style.cap {
                LineCap::Round => push_polygon(&mut out, circle(p, hw)),
                LineCap::Square => push_polygon(
                    &mut out,
                    vec![
                        (p.0 - hw, p.1 - hw),
                        (p.0 + hw, p.1 - hw),
                        (p.0 + hw, p.1 + hw),
                        (p.0 - hw, p.1 + hw),
                    ],
                ),
                LineCap::Butt => {}
            }
            continue;
        }

        let closed = poly.closed && pts.len() > 2;
        let n = pts.len();
        let seg_count = if closed { n } else { n - 1 };
        let mut dirs = Vec::with_capacity(seg_count);
        for i in 0..seg_count {
            let (a, b) = (pts[i], pts[(i + 1) % n]);
            if let Some(d) = unit(sub(b, a)) {
                dirs.push(d);
                let off = scale(normal(d), hw);
                push_polygon(&mut out, vec![add(a, off), add(b, off), sub(b, off), sub(a, off)]);
            }
        }
        if dirs.len() != seg_count {
            continue;
        }

        let joins: Vec<usize> = if closed { (0..n).collect() } else { (1..n - 1).collect() };
        for i in joins {
            let d0 = dirs[(i + seg_count - 1) % seg_count];
            let d1 = dirs[i % seg_count];
            add_join(&mut out, pts[i], d0, d1, hw, style);
        }

        if !closed {
            add_cap(&mut out, pts[0], scale(dirs[0], -1.0), hw, style.cap);
            add_cap(&mut out, pts[n - 1], dirs[seg_count - 1], hw, style.cap);
        }
    }
    out
}

fn add_join(out: &mut Vec<Polyline>, p: Point, d0: Point, d1: Point, hw: f64, style: &StrokeStyle) {
    let cross = d0.0 * d1.1 - d0.1 * d1.0;
    if cross.abs() < 1e-9 && d0.0 * d1.0 + d0.1 * d1.1 > 0.0 {
        return;
    }
    // Outer side of the turn.
    let side = if cross > 0.0 { -1.0 } else { 1.0 };
    let a = add(p, scale(normal(d0), hw * side));
    let b = add(p, scale(normal(d1), hw * side));
    match style.join {
        LineJoin::Round => push_polygon(out, circle(p, hw)),
        LineJoin::Bevel => push_polygon(out, vec![p, a, b]),
        LineJoin::Miter => {
            let cos_theta = -(d0.0 * d1.0 + d0.1 * d1.1);
            // Miter length ratio 1/sin(theta/2) with theta the angle between segments.
            let sin_half = ((1.0 - cos_theta) / 2.0).max(0.0).sqrt();
            if sin_half < 1e-9 || 1.0 / sin_half > style.miter_limit {
                push_polygon(out, vec![p, a, b]);
                return;
            }
            let bisector = unit(add(sub(a, p), sub(b, p)));
            match bisector {
                Some(bis) => {
                    let tip = add(p, scale(bis, hw / sin_half));
                    push_polygon(out, vec![p, a, tip, b]);
                }
                None => push_polygon(out, vec![p, a, b]),
            }
        }
    }
}

fn add_cap(out: &mut Vec<Polyline>, p: Point, outward: Point, hw: f64, cap: LineCap) {
    let n = scale(normal(outward), hw);
    match cap {
        LineCap::Butt => {}
        LineCap::Round => push_polygon(out, circle(p, hw)),
        LineCap::Square => {
            let e = scale(outward, hw);
            push_polygon(out, vec![add(p, n), add(add(p, n), e), add(sub(p, n), e), sub(p, n)]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::fill::{FillRule, rasterize};

    fn line(points: Vec<Point>) -> Polyline {
        Polyline { points, closed: false }
    }

    #[test]
    fn horizontal_line_covers_its_width() {
        let style = StrokeStyle {
            width: 4.0,
            ..StrokeStyle::default()
        };
        let polys = stroke_polylines(&[line(vec![(2.0, 10.0), (18.0, 10.0)])], &style);
        let mask = rasterize(&polys, FillRule::NonZero, 20, 20, true).unwrap();
        assert_eq!(mask.get(10, 9), 1.0);
        assert_eq!(mask.get(10, 11), 1.0);
        assert_eq!(mask.get(10, 13), 0.0);
        // Butt caps do not extend past the endpoints.
        assert_eq!(mask.get(1, 10), 0.0);
    }

    #[test]
    fn square_cap_extends_endpoints() {
        let style = StrokeStyle {
            width: 4.0,
            cap: LineCap::Square,
            ..StrokeStyle::default()
        };
        let polys = stroke_polylines(&[line(vec![(4.0, 10.0), (16.0, 10.0)])], &style);
        let mask = rasterize(&polys, FillRule::NonZero, 20, 20, true).unwrap();
        assert_eq!(mask.get(2, 10), 1.0);
        assert_eq!(mask.get(17, 10), 1.0);
    }

    #[test]
    fn hairline_is_one_pixel_wide() {
        let style = StrokeStyle {
            width: 0.0,
            ..StrokeStyle::default()
        };
        let polys = stroke_polylines(&[line(vec![(0.0, 5.5), (10.0, 5.5)])], &style);
        let mask = rasterize(&polys, FillRule::NonZero, 10, 10, true).unwrap();
        assert_eq!(mask.get(5, 5), 1.0);
        assert_eq!(mask.get(5, 4), 0.0);
    }

    #[test]
    fn dash_splits_line() {
        let dashed = apply_dash(&[line(vec![(0.0, 0.0), (10.0, 0.0)])], &[2.0, 3.0], 0.0);
        assert_eq!(dashed.len(), 2);
        assert_eq!(dashed[0].points, vec![(0.0, 0.0), (2.0, 0.0)]);
        assert_eq!(dashed[1].points, vec![(5.0, 0.0), (7.0, 0.0)]);
    }

    #[test]
    fn dash_phase_shifts_pattern() {
        let dashed = apply_dash(&[line(vec![(0.0, 0.0), (10.0, 0.0)])], &[2.0, 3.0], 1.0);
        assert_eq!(dashed[0].points, vec![(0.0, 0.0), (1.0, 0.0)]);
        assert_eq!(dashed[1].points, vec![(4.0, 0.0), (6.0, 0.0)]);
    }

    #[test]
    fn pieces_are_consistently_oriented() {
        let style = StrokeStyle {
            width: 3.0,
            join: LineJoin::Round,
            cap: LineCap::Round,
            ..StrokeStyle::default()
        };
        let polys = stroke_polylines(&[line(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)])], &style);
        assert!(polys.iter().all(|p| signed_area(&p.points) > 0.0));
    }
}
