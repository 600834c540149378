//! Text operators.
//!
//! Handles: BT, ET, Tc, Tw, Tz, TL, Tf, Tr, Ts, Td, TD, Tm, T*, Tj, TJ, ', "
//!
//! Text state:
//! - Tc, Tw, Tz, TL, Ts: spacing, scaling, leading and rise
//! - Tf: Select font and size
//! - Tr: Rendering mode (fill, stroke, invisible, clip)
//!
//! Positioning:
//! - Td, TD, Tm, T*: Move the text and line matrices
//!
//! Showing:
//! - Tj, TJ, ', ": Paint glyphs and advance the text matrix

use crate::error::Result;
use crate::font::PDFFont;
use crate::font::pdffont::GlyphShape;
use crate::interp::device::PDFDevice;
use crate::interp::interpreter::PDFPageInterpreter;
use crate::model::objects::PDFObject;
use crate::parser::PSToken;
use crate::raster::path::rect_path;
use crate::raster::{FillRule, PathSegment};
use crate::utils::{MATRIX_IDENTITY, Matrix, mult_matrix, translate_matrix};
use std::sync::Arc;

/// Height of a greeked glyph box in text space.
const GREEK_HEIGHT: f64 = 0.5;

#[allow(non_snake_case)]
impl<'a, D: PDFDevice> PDFPageInterpreter<'a, D> {
    /// PDF operator: `BT`
    pub fn do_BT(&mut self) {
        self.textstate.reset();
        self.text_clip = None;
    }

    /// Ends a text object. Glyphs collected by clipping render modes
    /// become part of the clip.
    ///
    /// PDF operator: `ET`
    pub fn do_ET(&mut self) {
        if let Some(path) = self.text_clip.take() {
            let mut state = self.gstate.clone();
            state.ctm = MATRIX_IDENTITY;
            self.gstate.clip = self.device.clip_path(&state, &path, FillRule::NonZero);
        }
    }

    /// PDF operator: `Tc`
    pub const fn do_Tc(&mut self, space: f64) {
        self.textstate.charspace = space;
    }

    /// PDF operator: `Tw`
    pub const fn do_Tw(&mut self, space: f64) {
        self.textstate.wordspace = space;
    }

    /// PDF operator: `Tz`
    pub const fn do_Tz(&mut self, scale: f64) {
        self.textstate.scaling = scale;
    }

    /// PDF operator: `TL`
    pub const fn do_TL(&mut self, leading: f64) {
        self.textstate.leading = leading;
    }

    /// Selects a font resource. An unknown font leaves text unpainted
    /// until the next `Tf`.
    ///
    /// PDF operator: `Tf`
    pub fn do_Tf(&mut self, fontid: &str, fontsize: f64) {
        let font = match self.fontmap.get(fontid) {
            Some(font) => font.clone(),
            None => {
                let font = match self.resource("Font", fontid) {
                    Some((objid, obj)) => self.load_font(objid, &obj),
                    None => None,
                };
                if font.is_none() {
                    tracing::debug!(font = fontid, "font resource not found");
                }
                self.fontmap.insert(fontid.to_string(), font.clone());
                font
            }
        };
        self.textstate.font = font;
        self.textstate.fontsize = fontsize;
    }

    /// Loads a font from a reference or inline dictionary.
    pub(crate) fn load_font_object(&mut self, obj: &PDFObject) -> Option<Arc<PDFFont>> {
        let objid = obj.as_ref().ok().map(|r| r.objid);
        let resolved = self.doc.resolve(obj).ok()?;
        self.load_font(objid, &resolved)
    }

    fn load_font(&mut self, objid: Option<u32>, obj: &PDFObject) -> Option<Arc<PDFFont>> {
        if let Some(id) = objid
            && let Some(font) = self.font_cache.get(&id)
        {
            return Some(Arc::clone(font));
        }
        let dict = obj.as_dict().ok()?;
        let font = Arc::new(PDFFont::new(self.doc, dict));
        if let Some(id) = objid {
            self.font_cache.insert(id, Arc::clone(&font));
        }
        Some(font)
    }

    /// PDF operator: `Tr`
    pub const fn do_Tr(&mut self, render: i64) {
        self.textstate.render = render;
    }

    /// PDF operator: `Ts`
    pub const fn do_Ts(&mut self, rise: f64) {
        self.textstate.rise = rise;
    }

    /// Moves to the start of the next line, offset by (tx, ty).
    ///
    /// PDF operator: `Td`
    pub fn do_Td(&mut self, tx: f64, ty: f64) {
        self.textstate.line_matrix = translate_matrix(self.textstate.line_matrix, (tx, ty));
        self.textstate.matrix = self.textstate.line_matrix;
    }

    /// Like `Td`, and sets the leading to `-ty`.
    ///
    /// PDF operator: `TD`
    pub fn do_TD(&mut self, tx: f64, ty: f64) {
        self.textstate.leading = -ty;
        self.do_Td(tx, ty);
    }

    /// PDF operator: `Tm`
    pub const fn do_Tm(&mut self, matrix: Matrix) {
        self.textstate.matrix = matrix;
        self.textstate.line_matrix = matrix;
    }

    /// PDF operator: `T*`
    pub fn do_T_star(&mut self) {
        self.do_Td(0.0, -self.textstate.leading);
    }

    /// PDF operator: `Tj`
    pub fn do_Tj(&mut self, s: &[u8]) -> Result<()> {
        self.show_text(s)
    }

    /// Shows strings with individual position adjustments in thousandths
    /// of a text space unit.
    ///
    /// PDF operator: `TJ`
    pub fn do_TJ(&mut self, seq: &[PSToken]) -> Result<()> {
        let th = self.textstate.scaling / 100.0;
        for item in seq {
            match item {
                PSToken::String(s) => self.show_text(s)?,
                other => {
                    if let Some(n) = other.as_number() {
                        let tx = -n / 1000.0 * self.textstate.fontsize * th;
                        self.textstate.matrix = translate_matrix(self.textstate.matrix, (tx, 0.0));
                    }
                }
            }
        }
        Ok(())
    }

    /// PDF operator: `'`
    pub fn do_quote(&mut self, s: &[u8]) -> Result<()> {
        self.do_T_star();
        self.show_text(s)
    }

    /// PDF operator: `"`
    pub fn do_doublequote(&mut self, aw: f64, ac: f64, s: &[u8]) -> Result<()> {
        self.textstate.wordspace = aw;
        self.textstate.charspace = ac;
        self.do_quote(s)
    }

    fn show_text(&mut self, s: &[u8]) -> Result<()> {
        let Some(font) = self.textstate.font.clone() else {
            tracing::debug!("text shown without a font");
            return Ok(());
        };
        let fs = self.textstate.fontsize;
        let th = self.textstate.scaling / 100.0;
        let unit = font.font_matrix().0;
        if self.textstate.render >= 4 && self.text_clip.is_none() {
            self.text_clip = Some(Vec::new());
        }
        for code in font.decode(s) {
            let ts = &self.textstate;
            let trm = mult_matrix((fs * th, 0.0, 0.0, fs, 0.0, ts.rise), ts.matrix);
            self.draw_glyph(&font, code, trm)?;

            let ts = &self.textstate;
            let mut tx = font.width(code) * unit * fs + ts.charspace;
            if font.is_word_space(code) {
                tx += ts.wordspace;
            }
            self.textstate.matrix = translate_matrix(self.textstate.matrix, (tx * th, 0.0));
        }
        Ok(())
    }

    fn draw_glyph(&mut self, font: &PDFFont, code: u32, trm: Matrix) -> Result<()> {
        let path: Vec<PathSegment> = match font.shape(code) {
            GlyphShape::Outline(outline) => outline.iter().map(|s| s.transform(trm)).collect(),
            GlyphShape::Greeked => {
                let w = font.width(code) * font.font_matrix().0;
                rect_path(0.0, 0.0, w, GREEK_HEIGHT).into_iter().map(|s| s.transform(trm)).collect()
            }
            GlyphShape::Procedure(proc) => return self.run_glyph_procedure(font, &proc, trm),
            GlyphShape::Blank => return Ok(()),
        };
        self.paint_glyph(&path)
    }

    /// Paints a glyph path in user space according to the render mode.
    fn paint_glyph(&mut self, path: &[PathSegment]) -> Result<()> {
        let mode = self.textstate.render;
        if matches!(mode, 0 | 2 | 4 | 6) {
            self.fill_with_current_color(path, FillRule::NonZero)?;
        }
        if matches!(mode, 1 | 2 | 5 | 6) {
            self.stroke_with_current_color(path);
        }
        if mode >= 4 {
            let ctm = self.gstate.ctm;
            self.text_clip
                .get_or_insert_with(Vec::new)
                .extend(path.iter().map(|s| s.transform(ctm)));
        }
        Ok(())
    }

    fn run_glyph_procedure(&mut self, font: &PDFFont, proc: &PDFObject, trm: Matrix) -> Result<()> {
        if self.textstate.render == 3 || self.textstate.render == 7 {
            return Ok(());
        }
        let objid = proc.as_ref().ok().map(|r| r.objid);
        let resolved = match self.doc.resolve(proc) {
            Ok(obj) => obj,
            Err(err) => {
                tracing::debug!(%err, "unresolvable glyph procedure");
                return Ok(());
            }
        };
        let Ok(stream) = resolved.as_stream() else {
            return Ok(());
        };
        let data = self.doc.decode_stream(stream)?;
        let ctm = mult_matrix(mult_matrix(font.font_matrix(), trm), self.gstate.ctm);
        let resources = font.type3_resources().cloned();
        self.run_nested(objid, resources, ctm, None, &data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::PDFDocument;
    use crate::interp::device::PDFDevice;
    use crate::model::shading::Shading;
    use crate::model::state::PDFGraphicState;
    use crate::raster::{ClipMask, RasterImage};

    /// Counts painting calls.
    #[derive(Default)]
    struct Recorder {
        fills: usize,
        strokes: usize,
        clips: usize,
    }

    impl PDFDevice for Recorder {
        fn fill_path(&mut self, _state: &PDFGraphicState, _path: &[PathSegment], _rule: FillRule) {
            self.fills += 1;
        }
        fn stroke_path(&mut self, _state: &PDFGraphicState, _path: &[PathSegment]) {
            self.strokes += 1;
        }
        fn clip_path(&mut self, _state: &PDFGraphicState, _path: &[PathSegment], _rule: FillRule) -> Option<Arc<ClipMask>> {
            self.clips += 1;
            None
        }
        fn draw_image(&mut self, _state: &PDFGraphicState, _image: &RasterImage) {}
        fn fill_shading(&mut self, _state: &PDFGraphicState, _sh: &Shading, _m: Matrix, _path: Option<&[PathSegment]>) {}
    }

    fn minimal_doc() -> PDFDocument {
        let pdf = b"%PDF-1.4\n1 0 obj<</Type/Catalog/Pages 2 0 R>>endobj\n\
2 0 obj<</Type/Pages/Kids[]/Count 0>>endobj\n\
trailer<</Root 1 0 R>>\n%%EOF\n";
        PDFDocument::new(pdf.to_vec(), "").unwrap()
    }

    #[test]
    fn positioning_operators_move_the_line_matrix() {
        let doc = minimal_doc();
        let mut dev = Recorder::default();
        let mut interp = PDFPageInterpreter::new(&doc, &mut dev);
        interp.do_BT();
        interp.do_TD(10.0, -12.0);
        assert_eq!(interp.textstate().leading, 12.0);
        interp.do_T_star();
        assert_eq!(interp.textstate().matrix, (1.0, 0.0, 0.0, 1.0, 10.0, -24.0));
        interp.do_Tm((2.0, 0.0, 0.0, 2.0, 5.0, 5.0));
        interp.do_Td(1.0, 1.0);
        assert_eq!(interp.textstate().matrix, (2.0, 0.0, 0.0, 2.0, 7.0, 7.0));
    }

    #[test]
    fn tj_numbers_shift_the_text_matrix() {
        let doc = minimal_doc();
        let mut dev = Recorder::default();
        let mut interp = PDFPageInterpreter::new(&doc, &mut dev);
        interp.do_BT();
        interp.textstate.fontsize = 10.0;
        interp.do_TJ(&[PSToken::Int(-500)]).unwrap();
        assert_eq!(interp.textstate().matrix.4, 5.0);
    }

    #[test]
    fn text_without_font_paints_nothing() {
        let doc = minimal_doc();
        let mut dev = Recorder::default();
        {
            let mut interp = PDFPageInterpreter::new(&doc, &mut dev);
            interp.do_BT();
            interp.do_Tj(b"abc").unwrap();
            interp.do_ET();
        }
        assert_eq!(dev.fills, 0);
    }

    #[test]
    fn clip_mode_without_glyphs_still_clips() {
        let doc = minimal_doc();
        let mut dev = Recorder::default();
        {
            let mut interp = PDFPageInterpreter::new(&doc, &mut dev);
            interp.do_BT();
            interp.do_Tr(7);
            interp.paint_glyph(&rect_path(0.0, 0.0, 1.0, 1.0)).unwrap();
            interp.do_ET();
        }
        assert_eq!(dev.fills, 0);
        assert_eq!(dev.clips, 1);
    }
}
