//! Path construction and painting operators.
//!
//! Handles: m, l, c, v, y, h, re, S, s, f, F, f*, B, B*, b, b*, n, W, W*
//!
//! Path construction:
//! - m: Move to
//! - l: Line to
//! - c, v, y: Bezier curves (cubic variants)
//! - h: Close subpath
//! - re: Rectangle shorthand
//!
//! Path painting:
//! - S/s: Stroke (s closes first)
//! - f/F/f*: Fill (F is legacy, f* uses even-odd rule)
//! - B/B*/b/b*: Fill then stroke
//! - n: End path without painting
//!
//! Clipping:
//! - W/W*: Mark the path as the next clip (non-zero/even-odd)

use crate::error::Result;
use crate::interp::device::PDFDevice;
use crate::interp::interpreter::PDFPageInterpreter;
use crate::raster::{FillRule, PathSegment};

#[allow(non_snake_case)]
impl<'a, D: PDFDevice> PDFPageInterpreter<'a, D> {
    // ========================================================================
    // Path Construction Operators
    // ========================================================================

    /// Begins a new subpath at the given point.
    ///
    /// PDF operator: `m`
    pub fn do_m(&mut self, x: f64, y: f64) {
        self.curpath.push(PathSegment::MoveTo(x, y));
        self.current_point = Some((x, y));
        self.subpath_start = Some((x, y));
    }

    /// Appends a straight line segment from the current point.
    ///
    /// PDF operator: `l`
    pub fn do_l(&mut self, x: f64, y: f64) {
        if self.current_point.is_none() {
            self.do_m(x, y);
            return;
        }
        self.curpath.push(PathSegment::LineTo(x, y));
        self.current_point = Some((x, y));
    }

    /// Appends a cubic Bezier curve to (x3, y3) with control points
    /// (x1, y1) and (x2, y2).
    ///
    /// PDF operator: `c`
    pub fn do_c(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) {
        if self.current_point.is_none() {
            self.do_m(x1, y1);
        }
        self.curpath.push(PathSegment::CurveTo(x1, y1, x2, y2, x3, y3));
        self.current_point = Some((x3, y3));
    }

    /// Cubic curve whose first control point is the current point.
    ///
    /// PDF operator: `v`
    pub fn do_v(&mut self, x2: f64, y2: f64, x3: f64, y3: f64) {
        let (x1, y1) = self.current_point.unwrap_or((x2, y2));
        self.do_c(x1, y1, x2, y2, x3, y3);
    }

    /// Cubic curve whose second control point is the endpoint.
    ///
    /// PDF operator: `y`
    pub fn do_y(&mut self, x1: f64, y1: f64, x3: f64, y3: f64) {
        self.do_c(x1, y1, x3, y3, x3, y3);
    }

    /// Closes the current subpath.
    ///
    /// PDF operator: `h`
    pub fn do_h(&mut self) {
        if self.current_point.is_some() {
            self.curpath.push(PathSegment::ClosePath);
            self.current_point = self.subpath_start;
        }
    }

    /// Appends a closed rectangle subpath.
    ///
    /// PDF operator: `re`
    pub fn do_re(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.curpath.extend(crate::raster::path::rect_path(x, y, w, h));
        self.current_point = Some((x, y));
        self.subpath_start = Some((x, y));
    }

    // ========================================================================
    // Path Painting Operators
    // ========================================================================

    /// PDF operator: `S`
    pub fn do_S(&mut self) -> Result<()> {
        self.paint_path(false, true, FillRule::NonZero)
    }

    /// PDF operator: `s`
    pub fn do_s(&mut self) -> Result<()> {
        self.do_h();
        self.do_S()
    }

    /// PDF operator: `f` (and the legacy `F`)
    pub fn do_f(&mut self) -> Result<()> {
        self.paint_path(true, false, FillRule::NonZero)
    }

    /// PDF operator: `f*`
    pub fn do_f_star(&mut self) -> Result<()> {
        self.paint_path(true, false, FillRule::EvenOdd)
    }

    /// PDF operator: `B`
    pub fn do_B(&mut self) -> Result<()> {
        self.paint_path(true, true, FillRule::NonZero)
    }

    /// PDF operator: `B*`
    pub fn do_B_star(&mut self) -> Result<()> {
        self.paint_path(true, true, FillRule::EvenOdd)
    }

    /// PDF operator: `b`
    pub fn do_b(&mut self) -> Result<()> {
        self.do_h();
        self.do_B()
    }

    /// PDF operator: `b*`
    pub fn do_b_star(&mut self) -> Result<()> {
        self.do_h();
        self.do_B_star()
    }

    /// Ends the path without painting; applies a pending clip.
    ///
    /// PDF operator: `n`
    pub fn do_n(&mut self) -> Result<()> {
        self.paint_path(false, false, FillRule::NonZero)
    }

    // ========================================================================
    // Clipping Path Operators
    // ========================================================================

    /// PDF operator: `W`
    pub const fn do_W(&mut self) {
        self.pending_clip = Some(FillRule::NonZero);
    }

    /// PDF operator: `W*`
    pub const fn do_W_star(&mut self) {
        self.pending_clip = Some(FillRule::EvenOdd);
    }

    /// Paints the current path, applies any pending clip and starts a new
    /// path.
    fn paint_path(&mut self, fill: bool, stroke: bool, rule: FillRule) -> Result<()> {
        let path = std::mem::take(&mut self.curpath);
        self.current_point = None;
        self.subpath_start = None;
        if !path.is_empty() {
            if fill {
                self.fill_with_current_color(&path, rule)?;
            }
            if stroke {
                self.stroke_with_current_color(&path);
            }
        }
        if let Some(clip_rule) = self.pending_clip.take() {
            self.gstate.clip = self.device.clip_path(&self.gstate, &path, clip_rule);
        }
        Ok(())
    }
}
