//! Graphics state operators.
//!
//! Handles: q, Q, cm, w, J, j, M, d, ri, i, gs
//!
//! - q/Q: Push/pop graphics state
//! - cm: Concatenate transformation matrix
//! - w, J, j, M, d: Line styling (width, cap, join, miter limit, dash)
//! - ri, i: Rendering intent and flatness
//! - gs: Set parameters from an ExtGState dictionary

use crate::interp::device::PDFDevice;
use crate::interp::interpreter::PDFPageInterpreter;
use crate::model::objects::PDFObject;
use crate::raster::{LineCap, LineJoin};
use crate::utils::{Matrix, mult_matrix};

#[allow(non_snake_case)]
impl<'a, D: PDFDevice> PDFPageInterpreter<'a, D> {
    /// Saves the current graphics state to the stack.
    ///
    /// PDF operator: `q`
    pub fn do_q(&mut self) {
        self.gstack.push(self.get_current_state());
    }

    /// Restores the graphics state from the stack. An unbalanced `Q` is
    /// ignored.
    ///
    /// PDF operator: `Q`
    pub fn do_Q(&mut self) {
        if let Some(state) = self.gstack.pop() {
            self.set_current_state(state);
        }
    }

    /// Concatenates a matrix to the current transformation matrix.
    ///
    /// PDF operator: `cm`
    pub fn do_cm(&mut self, matrix: Matrix) {
        self.gstate.ctm = mult_matrix(matrix, self.gstate.ctm);
    }

    /// PDF operator: `w`
    pub const fn do_w(&mut self, linewidth: f64) {
        self.gstate.linewidth = linewidth.abs();
    }

    /// PDF operator: `J`
    pub const fn do_J(&mut self, linecap: i64) {
        self.gstate.linecap = LineCap::from_pdf(linecap);
    }

    /// PDF operator: `j`
    pub const fn do_j(&mut self, linejoin: i64) {
        self.gstate.linejoin = LineJoin::from_pdf(linejoin);
    }

    /// PDF operator: `M`
    pub const fn do_M(&mut self, miterlimit: f64) {
        self.gstate.miterlimit = miterlimit;
    }

    /// Sets the dash pattern; an empty array means solid lines.
    ///
    /// PDF operator: `d`
    pub fn do_d(&mut self, dash: Vec<f64>, phase: f64) {
        self.gstate.dash = if dash.is_empty() { None } else { Some((dash, phase)) };
    }

    /// PDF operator: `ri`
    pub fn do_ri(&mut self, intent: &str) {
        self.gstate.intent = Some(intent.to_string());
    }

    /// PDF operator: `i`
    pub const fn do_i(&mut self, flatness: f64) {
        self.gstate.flatness = flatness;
    }

    /// Applies an ExtGState resource: line parameters, dash, constant
    /// alpha and font. Missing resources are skipped.
    ///
    /// PDF operator: `gs`
    pub fn do_gs(&mut self, name: &str) {
        let Some((_, obj)) = self.resource("ExtGState", name) else {
            tracing::debug!(name, "ExtGState not found");
            return;
        };
        let Ok(dict) = obj.as_dict() else {
            return;
        };
        let doc = self.doc;
        for (key, value) in dict {
            let Ok(value) = doc.resolve(value) else {
                continue;
            };
            let num = value.as_num().ok();
            match key.as_str() {
                "LW" => {
                    if let Some(w) = num {
                        self.do_w(w);
                    }
                }
                "LC" => {
                    if let Some(c) = num {
                        self.do_J(c as i64);
                    }
                }
                "LJ" => {
                    if let Some(j) = num {
                        self.do_j(j as i64);
                    }
                }
                "ML" => {
                    if let Some(m) = num {
                        self.do_M(m);
                    }
                }
                "D" => {
                    if let Ok([pattern, phase]) = <&[PDFObject; 2]>::try_from(value.as_array().unwrap_or(&[]))
                        && let (Ok(pattern), Ok(phase)) = (pattern.as_numbers(), phase.as_num())
                    {
                        self.do_d(pattern, phase);
                    }
                }
                "CA" => {
                    if let Some(a) = num {
                        self.gstate.stroke_alpha = a.clamp(0.0, 1.0);
                    }
                }
                "ca" => {
                    if let Some(a) = num {
                        self.gstate.fill_alpha = a.clamp(0.0, 1.0);
                    }
                }
                "RI" => {
                    if let Ok(intent) = value.as_name() {
                        self.do_ri(intent);
                    }
                }
                "Font" => {
                    if let Ok([font, size]) = <&[PDFObject; 2]>::try_from(value.as_array().unwrap_or(&[]))
                        && let Ok(size) = size.as_num()
                    {
                        self.textstate.font = self.load_font_object(font);
                        self.textstate.fontsize = size;
                    }
                }
                "SMask" if value.as_name().is_err() => {
                    tracing::debug!("soft mask groups are not supported");
                }
                _ => {}
            }
        }
    }
}
