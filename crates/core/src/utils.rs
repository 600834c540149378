//! Geometry and binary helpers shared across the engine.
//!
//! Matrices follow the PDF convention: `(a, b, c, d, e, f)` maps `(x, y)` to
//! `(a*x + c*y + e, b*x + d*y + f)`.

use byteorder::{BigEndian, ByteOrder};

/// A 2D point (x, y).
pub type Point = (f64, f64);

/// A rectangle defined by (x0, y0, x1, y1) where (x0, y0) is typically bottom-left
/// and (x1, y1) is top-right.
pub type Rect = (f64, f64, f64, f64);

/// A 6-element affine transformation matrix (a, b, c, d, e, f).
pub type Matrix = (f64, f64, f64, f64, f64, f64);

/// Identity transformation matrix.
pub const MATRIX_IDENTITY: Matrix = (1.0, 0.0, 0.0, 1.0, 0.0, 0.0);

/// Multiplies two matrices: result = m1 * m0.
/// This applies m1 first, then m0.
pub fn mult_matrix(m1: Matrix, m0: Matrix) -> Matrix {
    let (a1, b1, c1, d1, e1, f1) = m1;
    let (a0, b0, c0, d0, e0, f0) = m0;
    (
        a0 * a1 + c0 * b1,
        b0 * a1 + d0 * b1,
        a0 * c1 + c0 * d1,
        b0 * c1 + d0 * d1,
        a0 * e1 + c0 * f1 + e0,
        b0 * e1 + d0 * f1 + f0,
    )
}

/// Translates a matrix by (x, y) inside its own coordinate system.
pub fn translate_matrix(m: Matrix, v: Point) -> Matrix {
    let (a, b, c, d, e, f) = m;
    let (x, y) = v;
    (a, b, c, d, x * a + y * c + e, x * b + y * d + f)
}

/// Applies a matrix to a point.
pub fn apply_matrix_pt(m: Matrix, v: Point) -> Point {
    let (a, b, c, d, e, f) = m;
    let (x, y) = v;
    (a * x + c * y + e, b * x + d * y + f)
}

/// Applies a matrix to a vector (ignoring translation).
pub fn apply_matrix_norm(m: Matrix, v: Point) -> Point {
    let (a, b, c, d, _e, _f) = m;
    let (p, q) = v;
    (a * p + c * q, b * p + d * q)
}

/// Applies a matrix to a rectangle and returns the axis-aligned bounds of the result.
pub fn apply_matrix_rect(m: Matrix, rect: Rect) -> Rect {
    let (x0, y0, x1, y1) = rect;
    let corners = [
        apply_matrix_pt(m, (x0, y0)),
        apply_matrix_pt(m, (x1, y0)),
        apply_matrix_pt(m, (x1, y1)),
        apply_matrix_pt(m, (x0, y1)),
    ];
    corners.iter().fold(
        (f64::MAX, f64::MAX, f64::MIN, f64::MIN),
        |(l, b, r, t), &(x, y)| (l.min(x), b.min(y), r.max(x), t.max(y)),
    )
}

/// Inverts an affine matrix. Returns `None` for singular matrices.
pub fn invert_matrix(m: Matrix) -> Option<Matrix> {
    let (a, b, c, d, e, f) = m;
    let det = a * d - b * c;
    if det.abs() < 1e-12 || !det.is_finite() {
        return None;
    }
    let ia = d / det;
    let ib = -b / det;
    let ic = -c / det;
    let id = a / det;
    Some((ia, ib, ic, id, -(e * ia + f * ic), -(e * ib + f * id)))
}

/// Average linear expansion of a matrix, used to map user-space widths to pixels.
pub fn matrix_expansion(m: Matrix) -> f64 {
    let (a, b, c, d, _, _) = m;
    (a * d - b * c).abs().sqrt()
}

/// Normalizes a rectangle so that x0 <= x1 and y0 <= y1.
pub fn normalize_rect(rect: Rect) -> Rect {
    let (x0, y0, x1, y1) = rect;
    (x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1))
}

/// Unpacks a big-endian unsigned integer; only the low 8 bytes count.
pub fn nunpack(s: &[u8], default: u64) -> u64 {
    match s.len() {
        0 => default,
        n @ 1..=8 => BigEndian::read_uint(s, n),
        n => BigEndian::read_u64(&s[n - 8..]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9
    }

    #[test]
    fn mult_matrix_applies_left_operand_first() {
        let scale = (2.0, 0.0, 0.0, 2.0, 0.0, 0.0);
        let shift = (1.0, 0.0, 0.0, 1.0, 10.0, 0.0);
        let m = mult_matrix(scale, shift);
        assert!(close(apply_matrix_pt(m, (1.0, 1.0)), (12.0, 2.0)));
    }

    #[test]
    fn invert_round_trips_points() {
        let m = (0.0, 1.5, -2.0, 0.0, 30.0, -4.0);
        let inv = invert_matrix(m).unwrap();
        let p = apply_matrix_pt(m, (3.0, 7.0));
        assert!(close(apply_matrix_pt(inv, p), (3.0, 7.0)));
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        assert!(invert_matrix((1.0, 2.0, 2.0, 4.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn rect_bounds_after_rotation() {
        let rot = (0.0, 1.0, -1.0, 0.0, 0.0, 0.0);
        let r = apply_matrix_rect(rot, (0.0, 0.0, 10.0, 20.0));
        assert_eq!(r, (-20.0, 0.0, 0.0, 10.0));
    }

    #[test]
    fn nunpack_reads_big_endian() {
        assert_eq!(nunpack(&[], 7), 7);
        assert_eq!(nunpack(&[0x01, 0x02], 0), 0x0102);
        assert_eq!(nunpack(&[0x00, 0x00, 0x10], 0), 16);
        assert_eq!(nunpack(&[0xff, 0, 0, 0, 0, 0, 0, 0, 0x01], 0), 1);
    }

    #[test]
    fn expansion_of_uniform_scale() {
        assert!((matrix_expansion((3.0, 0.0, 0.0, -3.0, 5.0, 5.0)) - 3.0).abs() < 1e-12);
    }
}
