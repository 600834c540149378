//! Page interpreter.
//!
//! `PDFPageInterpreter` walks a page's content streams, keeps the graphics
//! and text state, and drives a `PDFDevice`. Operator handlers live in
//! `interp::ops`, grouped by category.

use super::content::{ContentItem, PDFContentParser, join_streams};
use super::device::PDFDevice;
use super::operator::Operator;
use crate::document::{PDFDocument, PDFPage};
use crate::error::{PdfError, Result};
use crate::font::PDFFont;
use crate::model::objects::{PDFDict, PDFObject};
use crate::model::state::{PDFGraphicState, PDFTextState};
use crate::parser::PSToken;
use crate::raster::{FillRule, PathSegment};
use crate::utils::{Matrix, Point};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Form XObjects, Type3 glyphs and pattern cells nest at most this deep.
pub const MAX_NESTING_DEPTH: usize = 32;

/// State pushed by `q`.
#[derive(Debug, Clone)]
pub(crate) struct SavedState {
    gstate: PDFGraphicState,
    textstate: PDFTextState,
}

/// Everything a nested content stream (form, glyph, pattern cell) must not
/// leak back into its caller.
struct NestedScope {
    saved: SavedState,
    gstack: Vec<SavedState>,
    curpath: Vec<PathSegment>,
    current_point: Option<Point>,
    subpath_start: Option<Point>,
    pending_clip: Option<FillRule>,
    resources: PDFDict,
    fontmap: FxHashMap<String, Option<Arc<PDFFont>>>,
    base_ctm: Matrix,
    text_clip: Option<Vec<PathSegment>>,
}

/// Interprets content streams against a device.
pub struct PDFPageInterpreter<'a, D: PDFDevice> {
    pub(crate) doc: &'a PDFDocument,
    pub(crate) device: &'a mut D,
    pub(crate) gstate: PDFGraphicState,
    pub(crate) textstate: PDFTextState,
    pub(crate) gstack: Vec<SavedState>,
    pub(crate) curpath: Vec<PathSegment>,
    pub(crate) current_point: Option<Point>,
    pub(crate) subpath_start: Option<Point>,
    /// Set by `W`/`W*`, applied by the next painting operator.
    pub(crate) pending_clip: Option<FillRule>,
    pub(crate) resources: PDFDict,
    /// Fonts by resource name for the current resources; `None` caches a
    /// missing font.
    pub(crate) fontmap: FxHashMap<String, Option<Arc<PDFFont>>>,
    /// Fonts by object id, shared across resource dictionaries.
    pub(crate) font_cache: FxHashMap<u32, Arc<PDFFont>>,
    /// Maps pattern space of the current content stream to the device.
    pub(crate) base_ctm: Matrix,
    /// Object ids of the nested streams being executed.
    pub(crate) nesting: Vec<u32>,
    pub(crate) nesting_depth: usize,
    /// Device-space glyph outlines collected by clipping text render modes.
    pub(crate) text_clip: Option<Vec<PathSegment>>,
}

impl<'a, D: PDFDevice> PDFPageInterpreter<'a, D> {
    pub fn new(doc: &'a PDFDocument, device: &'a mut D) -> Self {
        Self {
            doc,
            device,
            gstate: PDFGraphicState::default(),
            textstate: PDFTextState::new(),
            gstack: Vec::new(),
            curpath: Vec::new(),
            current_point: None,
            subpath_start: None,
            pending_clip: None,
            resources: PDFDict::new(),
            fontmap: FxHashMap::default(),
            font_cache: FxHashMap::default(),
            base_ctm: crate::utils::MATRIX_IDENTITY,
            nesting: Vec::new(),
            nesting_depth: 0,
            text_clip: None,
        }
    }

    /// Resets graphics and text state for a new page.
    pub fn init_state(&mut self, ctm: Matrix) {
        self.gstack.clear();
        self.gstate = PDFGraphicState::new(ctm);
        self.textstate = PDFTextState::new();
        self.curpath.clear();
        self.current_point = None;
        self.subpath_start = None;
        self.pending_clip = None;
        self.base_ctm = ctm;
        self.text_clip = None;
    }

    pub const fn graphicstate(&self) -> &PDFGraphicState {
        &self.gstate
    }

    pub const fn textstate(&self) -> &PDFTextState {
        &self.textstate
    }

    pub(crate) fn get_current_state(&self) -> SavedState {
        SavedState {
            gstate: self.gstate.clone(),
            textstate: self.textstate.clone(),
        }
    }

    pub(crate) fn set_current_state(&mut self, state: SavedState) {
        self.gstate = state.gstate;
        self.textstate = state.textstate;
    }

    /// Interprets every content stream of `page`. `ctm` maps default user
    /// space to device pixels.
    pub fn process_page(&mut self, page: &PDFPage, ctm: Matrix, page_box: crate::utils::Rect) -> Result<()> {
        self.device.begin_page(page_box, ctm);
        self.init_state(ctm);
        self.resources = page.resources.clone();
        self.fontmap.clear();
        let data = join_streams(&page.content_streams(self.doc)?);
        self.execute(&data)?;
        self.device.end_page();
        Ok(())
    }

    /// Runs one content stream in the current state.
    pub fn execute(&mut self, data: &[u8]) -> Result<()> {
        let floor = self.gstack.len();
        let result = self.run_items(PDFContentParser::new(data));
        // States still saved at the end of the stream are dropped.
        self.gstack.truncate(floor);
        result
    }

    fn run_items(&mut self, parser: PDFContentParser<'_>) -> Result<()> {
        for item in parser {
            match item {
                ContentItem::Op { op, args } => self.dispatch(&op, &args)?,
                ContentItem::InlineImage { dict, data } => self.do_inline_image(&dict, data)?,
            }
        }
        Ok(())
    }

    /// Runs `data` with its own resources, a copy of the current graphics
    /// state and `ctm`; restores everything afterwards.
    pub(crate) fn run_nested(
        &mut self,
        objid: Option<u32>,
        resources: Option<PDFDict>,
        ctm: Matrix,
        clip: Option<&[PathSegment]>,
        data: &[u8],
    ) -> Result<()> {
        if self.nesting_depth >= MAX_NESTING_DEPTH {
            tracing::debug!(depth = self.nesting_depth, "nesting too deep, skipping content");
            return Ok(());
        }
        if let Some(id) = objid
            && self.nesting.contains(&id)
        {
            tracing::debug!(objid = id, "content invokes itself, skipping");
            return Ok(());
        }

        let inherits_resources = resources.is_none();
        let scope = NestedScope {
            saved: self.get_current_state(),
            gstack: std::mem::take(&mut self.gstack),
            curpath: std::mem::take(&mut self.curpath),
            current_point: self.current_point.take(),
            subpath_start: self.subpath_start.take(),
            pending_clip: self.pending_clip.take(),
            resources: match resources {
                Some(res) => std::mem::replace(&mut self.resources, res),
                None => self.resources.clone(),
            },
            fontmap: std::mem::take(&mut self.fontmap),
            base_ctm: self.base_ctm,
            text_clip: self.text_clip.take(),
        };
        if inherits_resources {
            self.fontmap.clone_from(&scope.fontmap);
        }
        self.gstate.ctm = ctm;
        self.base_ctm = ctm;
        if let Some(clip) = clip {
            self.gstate.clip = self.device.clip_path(&self.gstate, clip, FillRule::NonZero);
        }
        if let Some(id) = objid {
            self.nesting.push(id);
        }
        self.nesting_depth += 1;

        let result = self.execute(data);

        self.nesting_depth -= 1;
        if objid.is_some() {
            self.nesting.pop();
        }
        self.set_current_state(scope.saved);
        self.gstack = scope.gstack;
        self.curpath = scope.curpath;
        self.current_point = scope.current_point;
        self.subpath_start = scope.subpath_start;
        self.pending_clip = scope.pending_clip;
        self.resources = scope.resources;
        self.fontmap = scope.fontmap;
        self.base_ctm = scope.base_ctm;
        self.text_clip = scope.text_clip;
        result
    }

    /// Looks up `/category /name` in the current resources.
    pub(crate) fn resource(&self, category: &str, name: &str) -> Option<(Option<u32>, Arc<PDFObject>)> {
        let dict = self.doc.get_resolved(&self.resources, category)?;
        let entry = dict.as_dict().ok()?.get(name)?;
        let objid = entry.as_ref().ok().map(|r| r.objid);
        match self.doc.resolve(entry) {
            Ok(obj) if !obj.is_null() => Some((objid, obj)),
            Ok(_) => None,
            Err(err) => {
                tracing::debug!(category, name, %err, "unresolvable resource");
                None
            }
        }
    }

    fn dispatch(&mut self, op: &Operator, args: &[PSToken]) -> Result<()> {
        match op {
            Operator::q => self.do_q(),
            Operator::Q => self.do_Q(),
            Operator::cm => {
                let [a, b, c, d, e, f] = numbers::<6>(op, args)?;
                self.do_cm((a, b, c, d, e, f));
            }
            Operator::w => {
                let [w] = numbers::<1>(op, args)?;
                self.do_w(w);
            }
            Operator::J => {
                let [cap] = numbers::<1>(op, args)?;
                self.do_J(cap as i64);
            }
            Operator::j => {
                let [join] = numbers::<1>(op, args)?;
                self.do_j(join as i64);
            }
            Operator::M => {
                let [limit] = numbers::<1>(op, args)?;
                self.do_M(limit);
            }
            Operator::d => {
                let [array, phase] = operands::<2>(op, args)?;
                let dash = number_array(op, array)?;
                self.do_d(dash, number(op, phase)?);
            }
            Operator::ri => {
                let [intent] = operands::<1>(op, args)?;
                self.do_ri(name(op, intent)?);
            }
            Operator::i => {
                let [flatness] = numbers::<1>(op, args)?;
                self.do_i(flatness);
            }
            Operator::gs => {
                let [gs] = operands::<1>(op, args)?;
                self.do_gs(name(op, gs)?);
            }

            Operator::m => {
                let [x, y] = numbers::<2>(op, args)?;
                self.do_m(x, y);
            }
            Operator::l => {
                let [x, y] = numbers::<2>(op, args)?;
                self.do_l(x, y);
            }
            Operator::c => {
                let [x1, y1, x2, y2, x3, y3] = numbers::<6>(op, args)?;
                self.do_c(x1, y1, x2, y2, x3, y3);
            }
            Operator::v => {
                let [x2, y2, x3, y3] = numbers::<4>(op, args)?;
                self.do_v(x2, y2, x3, y3);
            }
            Operator::y => {
                let [x1, y1, x3, y3] = numbers::<4>(op, args)?;
                self.do_y(x1, y1, x3, y3);
            }
            Operator::h => self.do_h(),
            Operator::re => {
                let [x, y, w, h] = numbers::<4>(op, args)?;
                self.do_re(x, y, w, h);
            }
            Operator::S => self.do_S()?,
            Operator::s => self.do_s()?,
            Operator::f | Operator::F => self.do_f()?,
            Operator::f_star => self.do_f_star()?,
            Operator::B => self.do_B()?,
            Operator::B_star => self.do_B_star()?,
            Operator::b => self.do_b()?,
            Operator::b_star => self.do_b_star()?,
            Operator::n => self.do_n()?,
            Operator::W => self.do_W(),
            Operator::W_star => self.do_W_star(),

            Operator::BT => self.do_BT(),
            Operator::ET => self.do_ET(),
            Operator::Tc => {
                let [v] = numbers::<1>(op, args)?;
                self.do_Tc(v);
            }
            Operator::Tw => {
                let [v] = numbers::<1>(op, args)?;
                self.do_Tw(v);
            }
            Operator::Tz => {
                let [v] = numbers::<1>(op, args)?;
                self.do_Tz(v);
            }
            Operator::TL => {
                let [v] = numbers::<1>(op, args)?;
                self.do_TL(v);
            }
            Operator::Tf => {
                let [font, size] = operands::<2>(op, args)?;
                self.do_Tf(name(op, font)?, number(op, size)?);
            }
            Operator::Tr => {
                let [v] = numbers::<1>(op, args)?;
                self.do_Tr(v as i64);
            }
            Operator::Ts => {
                let [v] = numbers::<1>(op, args)?;
                self.do_Ts(v);
            }
            Operator::Td => {
                let [tx, ty] = numbers::<2>(op, args)?;
                self.do_Td(tx, ty);
            }
            Operator::TD => {
                let [tx, ty] = numbers::<2>(op, args)?;
                self.do_TD(tx, ty);
            }
            Operator::Tm => {
                let [a, b, c, d, e, f] = numbers::<6>(op, args)?;
                self.do_Tm((a, b, c, d, e, f));
            }
            Operator::T_star => self.do_T_star(),
            Operator::Tj => {
                let [s] = operands::<1>(op, args)?;
                self.do_Tj(string(op, s)?)?;
            }
            Operator::TJ => {
                let [seq] = operands::<1>(op, args)?;
                let PSToken::Array(items) = seq else {
                    return Err(type_error(op, "array"));
                };
                self.do_TJ(items)?;
            }
            Operator::Quote => {
                let [s] = operands::<1>(op, args)?;
                self.do_quote(string(op, s)?)?;
            }
            Operator::DoubleQuote => {
                let [aw, ac, s] = operands::<3>(op, args)?;
                self.do_doublequote(number(op, aw)?, number(op, ac)?, string(op, s)?)?;
            }
            Operator::d0 => {
                let [_, _] = numbers::<2>(op, args)?;
            }
            Operator::d1 => {
                let [_, _, _, _, _, _] = numbers::<6>(op, args)?;
            }

            Operator::CS => {
                let [cs] = operands::<1>(op, args)?;
                self.do_CS(name(op, cs)?);
            }
            Operator::cs => {
                let [cs] = operands::<1>(op, args)?;
                self.do_cs(name(op, cs)?);
            }
            Operator::SC | Operator::SCN => self.do_SCN(op, args)?,
            Operator::sc | Operator::scn => self.do_scn(op, args)?,
            Operator::G => {
                let [gray] = numbers::<1>(op, args)?;
                self.do_G(gray);
            }
            Operator::g => {
                let [gray] = numbers::<1>(op, args)?;
                self.do_g(gray);
            }
            Operator::RG => {
                let [r, g, b] = numbers::<3>(op, args)?;
                self.do_RG(r, g, b);
            }
            Operator::rg => {
                let [r, g, b] = numbers::<3>(op, args)?;
                self.do_rg(r, g, b);
            }
            Operator::K => {
                let [c, m, y, k] = numbers::<4>(op, args)?;
                self.do_K(c, m, y, k);
            }
            Operator::k => {
                let [c, m, y, k] = numbers::<4>(op, args)?;
                self.do_k(c, m, y, k);
            }

            Operator::sh => {
                let [sh] = operands::<1>(op, args)?;
                self.do_sh(name(op, sh)?)?;
            }
            Operator::Do => {
                let [xobj] = operands::<1>(op, args)?;
                self.do_Do(name(op, xobj)?)?;
            }
            // Inline images arrive whole from the content parser.
            Operator::BI | Operator::ID | Operator::EI => {}

            Operator::MP | Operator::BMC => {
                let [tag] = operands::<1>(op, args)?;
                name(op, tag)?;
            }
            Operator::DP | Operator::BDC => {
                let [tag, _props] = operands::<2>(op, args)?;
                name(op, tag)?;
            }
            Operator::EMC | Operator::BX | Operator::EX => {}

            Operator::Unknown(name) => {
                tracing::debug!(operator = %name, "skipping unknown operator");
            }
        }
        Ok(())
    }
}

pub(crate) fn type_error(op: &Operator, expected: &'static str) -> PdfError {
    PdfError::OperandType {
        operator: op.name().to_string(),
        expected,
    }
}

/// The last `N` operands; extra leading operands are ignored.
pub(crate) fn operands<'t, const N: usize>(op: &Operator, args: &'t [PSToken]) -> Result<&'t [PSToken; N]> {
    let start = args.len().checked_sub(N).ok_or_else(|| PdfError::OperandUnderflow {
        operator: op.name().to_string(),
        expected: N,
        found: args.len(),
    })?;
    <&[PSToken; N]>::try_from(&args[start..]).map_err(|_| type_error(op, "operands"))
}

pub(crate) fn number(op: &Operator, token: &PSToken) -> Result<f64> {
    token.as_number().ok_or_else(|| type_error(op, "number"))
}

pub(crate) fn numbers<const N: usize>(op: &Operator, args: &[PSToken]) -> Result<[f64; N]> {
    let tokens = operands::<N>(op, args)?;
    let mut out = [0.0; N];
    for (slot, token) in out.iter_mut().zip(tokens) {
        *slot = number(op, token)?;
    }
    Ok(out)
}

pub(crate) fn name<'t>(op: &Operator, token: &'t PSToken) -> Result<&'t str> {
    match token {
        PSToken::Literal(name) => Ok(name),
        _ => Err(type_error(op, "name")),
    }
}

pub(crate) fn string<'t>(op: &Operator, token: &'t PSToken) -> Result<&'t [u8]> {
    match token {
        PSToken::String(s) => Ok(s),
        _ => Err(type_error(op, "string")),
    }
}

pub(crate) fn number_array(op: &Operator, token: &PSToken) -> Result<Vec<f64>> {
    match token {
        PSToken::Array(items) => items.iter().map(|t| number(op, t)).collect(),
        _ => Err(type_error(op, "array")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operands_take_the_top_of_the_stack() {
        let args = [PSToken::Int(9), PSToken::Int(1), PSToken::Real(2.5)];
        assert_eq!(numbers::<2>(&Operator::m, &args).unwrap(), [1.0, 2.5]);
    }

    #[test]
    fn underflow_names_the_operator() {
        let err = numbers::<6>(&Operator::cm, &[PSToken::Int(1)]).unwrap_err();
        assert!(matches!(
            err,
            PdfError::OperandUnderflow { ref operator, expected: 6, found: 1 } if operator == "cm"
        ));
    }

    #[test]
    fn wrong_operand_type() {
        let err = numbers::<1>(&Operator::w, &[PSToken::Literal("x".into())]).unwrap_err();
        assert!(matches!(err, PdfError::OperandType { expected: "number", .. }));
        let err = name(&Operator::gs, &PSToken::Int(1)).unwrap_err();
        assert!(matches!(err, PdfError::OperandType { expected: "name", .. }));
    }
}
