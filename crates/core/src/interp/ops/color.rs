//! Color operators and pattern painting.
//!
//! Handles: CS, cs, SC, SCN, sc, scn, G, g, RG, rg, K, k
//!
//! Fills whose color is a pattern go through `fill_pattern`: shading
//! patterns paint their gradient inside the path, tiling patterns replicate
//! their cell across it.

use crate::interp::device::PDFDevice;
use crate::interp::interpreter::{PDFPageInterpreter, type_error};
use crate::interp::operator::Operator;
use crate::error::{PdfError, Result};
use crate::model::color::{PDFColorSpace, Rgb};
use crate::model::objects::PDFObject;
use crate::model::shading::{Shading, ShadingKind};
use crate::model::state::Color;
use crate::parser::PSToken;
use crate::raster::path::{bounds, rect_path};
use crate::raster::{FillRule, PathSegment, flatten};
use crate::utils::{MATRIX_IDENTITY, Matrix, apply_matrix_rect, invert_matrix, mult_matrix, translate_matrix};
use std::sync::Arc;

/// Tiling patterns needing more cells than this are skipped.
const MAX_PATTERN_CELLS: i64 = 1024;

#[allow(non_snake_case)]
impl<'a, D: PDFDevice> PDFPageInterpreter<'a, D> {
    fn colorspace_named(&self, name: &str) -> PDFColorSpace {
        PDFColorSpace::parse(self.doc, &PDFObject::Name(name.to_string()), Some(&self.resources)).unwrap_or_else(|err| {
            tracing::debug!(name, %err, "unknown color space, using DeviceGray");
            PDFColorSpace::DeviceGray
        })
    }

    /// PDF operator: `CS`
    pub fn do_CS(&mut self, name: &str) {
        let cs = self.colorspace_named(name);
        self.gstate.scolor = Color::new(&cs.initial_color());
        self.gstate.scs = Arc::new(cs);
    }

    /// PDF operator: `cs`
    pub fn do_cs(&mut self, name: &str) {
        let cs = self.colorspace_named(name);
        self.gstate.ncolor = Color::new(&cs.initial_color());
        self.gstate.ncs = Arc::new(cs);
    }

    /// Stroking color in the current space. Also handles `SC`.
    ///
    /// PDF operator: `SCN`
    pub fn do_SCN(&mut self, op: &Operator, args: &[PSToken]) -> Result<()> {
        let color = color_operands(op, args, &self.gstate.scs)?;
        self.gstate.scolor = color;
        Ok(())
    }

    /// Non-stroking color in the current space. Also handles `sc`.
    ///
    /// PDF operator: `scn`
    pub fn do_scn(&mut self, op: &Operator, args: &[PSToken]) -> Result<()> {
        let color = color_operands(op, args, &self.gstate.ncs)?;
        self.gstate.ncolor = color;
        Ok(())
    }

    /// PDF operator: `G`
    pub fn do_G(&mut self, gray: f64) {
        self.gstate.scs = Arc::new(PDFColorSpace::DeviceGray);
        self.gstate.scolor = Color::new(&[gray]);
    }

    /// PDF operator: `g`
    pub fn do_g(&mut self, gray: f64) {
        self.gstate.ncs = Arc::new(PDFColorSpace::DeviceGray);
        self.gstate.ncolor = Color::new(&[gray]);
    }

    /// PDF operator: `RG`
    pub fn do_RG(&mut self, r: f64, g: f64, b: f64) {
        self.gstate.scs = Arc::new(PDFColorSpace::DeviceRGB);
        self.gstate.scolor = Color::new(&[r, g, b]);
    }

    /// PDF operator: `rg`
    pub fn do_rg(&mut self, r: f64, g: f64, b: f64) {
        self.gstate.ncs = Arc::new(PDFColorSpace::DeviceRGB);
        self.gstate.ncolor = Color::new(&[r, g, b]);
    }

    /// PDF operator: `K`
    pub fn do_K(&mut self, c: f64, m: f64, y: f64, k: f64) {
        self.gstate.scs = Arc::new(PDFColorSpace::DeviceCMYK);
        self.gstate.scolor = Color::new(&[c, m, y, k]);
    }

    /// PDF operator: `k`
    pub fn do_k(&mut self, c: f64, m: f64, y: f64, k: f64) {
        self.gstate.ncs = Arc::new(PDFColorSpace::DeviceCMYK);
        self.gstate.ncolor = Color::new(&[c, m, y, k]);
    }

    // ========================================================================
    // Painting with the current color
    // ========================================================================

    pub(crate) fn fill_with_current_color(&mut self, path: &[PathSegment], rule: FillRule) -> Result<()> {
        match self.gstate.ncolor.pattern.clone() {
            Some(name) => self.fill_pattern(&name, path, rule),
            None => {
                self.device.fill_path(&self.gstate, path, rule);
                Ok(())
            }
        }
    }

    pub(crate) fn stroke_with_current_color(&mut self, path: &[PathSegment]) {
        let Some(name) = self.gstate.scolor.pattern.clone() else {
            self.device.stroke_path(&self.gstate, path);
            return;
        };
        // Pattern strokes are drawn in a representative solid color.
        let rgb = self.pattern_fallback_rgb(&name, &self.gstate.scs, &self.gstate.scolor);
        let mut state = self.gstate.clone();
        state.scs = Arc::new(PDFColorSpace::DeviceRGB);
        state.scolor = Color::new(&rgb);
        self.device.stroke_path(&state, path);
    }

    fn pattern_fallback_rgb(&self, name: &str, cs: &PDFColorSpace, color: &Color) -> Rgb {
        if let PDFColorSpace::Pattern { underlying: Some(base) } = cs
            && !color.components.is_empty()
        {
            return base.to_rgb(&color.components);
        }
        let shading = self
            .resource("Pattern", name)
            .and_then(|(_, obj)| obj.get("Shading").cloned())
            .and_then(|sh| Shading::parse(self.doc, &sh, Some(&self.resources)).ok().flatten());
        match shading {
            Some(sh) => sh.color_at(shading_midpoint(&sh)).unwrap_or([0.0; 3]),
            None => [0.0; 3],
        }
    }

    /// Fills `path` with the pattern resource `name`. A missing pattern or
    /// an unsupported pattern or shading type paints nothing.
    pub(crate) fn fill_pattern(&mut self, name: &str, path: &[PathSegment], rule: FillRule) -> Result<()> {
        let Some((objid, obj)) = self.resource("Pattern", name) else {
            tracing::debug!(name, "pattern not found");
            return Ok(());
        };
        let matrix = obj
            .get("Matrix")
            .and_then(|m| self.doc.resolve(m).ok())
            .and_then(|m| m.as_numbers().ok())
            .and_then(|m| <[f64; 6]>::try_from(m).ok())
            .map_or(MATRIX_IDENTITY, |[a, b, c, d, e, f]| (a, b, c, d, e, f));
        let pattern_ctm = mult_matrix(matrix, self.base_ctm);
        let pattern_type = obj.get("PatternType").and_then(|t| self.doc.resolve(t).ok()).and_then(|t| t.as_int().ok());

        match pattern_type {
            Some(2) => {
                let shading = obj.get("Shading").ok_or_else(|| PdfError::KeyError("Shading".into()))?;
                match Shading::parse(self.doc, shading, Some(&self.resources))? {
                    Some(sh) => self.device.fill_shading(&self.gstate, &sh, pattern_ctm, Some(path)),
                    None => tracing::debug!(name, "unsupported shading type in pattern"),
                }
                Ok(())
            }
            Some(1) => self.fill_tiling(objid, &obj, pattern_ctm, path, rule),
            _ => {
                tracing::debug!(name, "unknown pattern type");
                Ok(())
            }
        }
    }

    fn fill_tiling(
        &mut self,
        objid: Option<u32>,
        obj: &PDFObject,
        pattern_ctm: Matrix,
        path: &[PathSegment],
        rule: FillRule,
    ) -> Result<()> {
        let doc = self.doc;
        let stream = obj.as_stream()?;
        let num = |key: &str| -> Result<f64> {
            stream
                .get(key)
                .map(|v| doc.resolve(v))
                .transpose()?
                .ok_or_else(|| PdfError::KeyError(key.to_string()))?
                .as_num()
        };
        let (xstep, ystep) = (num("XStep")?, num("YStep")?);
        let bbox = stream
            .get("BBox")
            .and_then(|b| doc.resolve(b).ok())
            .and_then(|b| b.as_numbers().ok())
            .and_then(|b| <[f64; 4]>::try_from(b).ok())
            .ok_or_else(|| PdfError::KeyError("BBox".into()))?;
        if xstep == 0.0 || ystep == 0.0 {
            return Ok(());
        }
        let Some(inv) = invert_matrix(pattern_ctm) else {
            return Ok(());
        };
        let Some(device_bounds) = bounds(&flatten(path, self.gstate.ctm)) else {
            return Ok(());
        };
        let (x0, y0, x1, y1) = apply_matrix_rect(inv, device_bounds);
        let (bx0, by0) = (bbox[0].min(bbox[2]), bbox[1].min(bbox[3]));
        let (bx1, by1) = (bbox[0].max(bbox[2]), bbox[1].max(bbox[3]));
        let cells = |lo: f64, hi: f64, blo: f64, bhi: f64, step: f64| {
            let a = ((lo - bhi) / step).floor() as i64;
            let b = ((hi - blo) / step).ceil() as i64;
            (a.min(b), a.max(b))
        };
        let (i0, i1) = cells(x0, x1, bx0, bx1, xstep);
        let (j0, j1) = cells(y0, y1, by0, by1, ystep);
        let count = (i1 - i0 + 1).saturating_mul(j1 - j0 + 1);
        if count > MAX_PATTERN_CELLS {
            tracing::debug!(count, "tiling pattern has too many cells, skipping");
            return Ok(());
        }

        let data = doc.decode_stream(stream)?;
        let resources = stream
            .get("Resources")
            .and_then(|r| doc.resolve(r).ok())
            .and_then(|r| r.as_dict().ok().cloned());
        let uncolored = stream.get("PaintType").and_then(|t| doc.resolve(t).ok()).and_then(|t| t.as_int().ok()) == Some(2);

        let saved = self.gstate.clone();
        self.gstate.clip = self.device.clip_path(&self.gstate, path, rule);
        if uncolored {
            let rgb = match &*saved.ncs {
                PDFColorSpace::Pattern { underlying: Some(base) } => base.to_rgb(&saved.ncolor.components),
                _ => [0.0; 3],
            };
            let solid = Arc::new(PDFColorSpace::DeviceRGB);
            self.gstate.ncs = Arc::clone(&solid);
            self.gstate.ncolor = Color::new(&rgb);
            self.gstate.scs = solid;
            self.gstate.scolor = Color::new(&rgb);
        } else {
            self.gstate.ncolor.pattern = None;
            self.gstate.scolor.pattern = None;
        }
        let cell_clip = rect_path(bx0, by0, bx1 - bx0, by1 - by0);
        let mut result = Ok(());
        'tiles: for j in j0..=j1 {
            for i in i0..=i1 {
                let ctm = translate_matrix(pattern_ctm, (i as f64 * xstep, j as f64 * ystep));
                result = self.run_nested(objid, resources.clone(), ctm, Some(&cell_clip), &data);
                if result.is_err() {
                    break 'tiles;
                }
            }
        }
        self.gstate = saved;
        result
    }
}

/// Color operands for `cs`: numeric components, plus a trailing pattern
/// name in Pattern spaces.
fn color_operands(op: &Operator, args: &[PSToken], cs: &PDFColorSpace) -> Result<Color> {
    if let PDFColorSpace::Pattern { underlying } = cs {
        let Some((last, rest)) = args.split_last() else {
            return Err(PdfError::OperandUnderflow {
                operator: op.name().to_string(),
                expected: 1,
                found: 0,
            });
        };
        let PSToken::Literal(name) = last else {
            return Err(type_error(op, "pattern name"));
        };
        let n = underlying.as_ref().map_or(0, |b| b.ncomponents()).min(rest.len());
        let components = rest[rest.len() - n..]
            .iter()
            .map(|t| t.as_number().ok_or_else(|| type_error(op, "number")))
            .collect::<Result<Vec<f64>>>()?;
        let mut color = Color::new(&components);
        color.pattern = Some(name.clone());
        return Ok(color);
    }
    let n = cs.ncomponents();
    if args.len() < n {
        return Err(PdfError::OperandUnderflow {
            operator: op.name().to_string(),
            expected: n,
            found: args.len(),
        });
    }
    let components = args[args.len() - n..]
        .iter()
        .map(|t| t.as_number().ok_or_else(|| type_error(op, "number")))
        .collect::<Result<Vec<f64>>>()?;
    Ok(Color::new(&components))
}

fn shading_midpoint(sh: &Shading) -> (f64, f64) {
    match sh.kind {
        ShadingKind::Axial { coords: [x0, y0, x1, y1] } => ((x0 + x1) / 2.0, (y0 + y1) / 2.0),
        ShadingKind::Radial { coords: [x0, y0, _, x1, y1, _] } => ((x0 + x1) / 2.0, (y0 + y1) / 2.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn components_come_from_the_top_of_the_stack() {
        let args = [PSToken::Int(7), PSToken::Real(0.5), PSToken::Int(1), PSToken::Int(0)];
        let color = color_operands(&Operator::scn, &args, &PDFColorSpace::DeviceRGB).unwrap();
        assert_eq!(color.components.as_slice(), &[0.5, 1.0, 0.0]);
        assert!(!color.is_pattern());
    }

    #[test]
    fn too_few_components_underflow() {
        let err = color_operands(&Operator::sc, &[PSToken::Int(1)], &PDFColorSpace::DeviceCMYK).unwrap_err();
        assert!(matches!(err, PdfError::OperandUnderflow { expected: 4, found: 1, .. }));
    }

    #[test]
    fn pattern_name_with_underlying_components() {
        let cs = PDFColorSpace::Pattern {
            underlying: Some(Box::new(PDFColorSpace::DeviceGray)),
        };
        let args = [PSToken::Real(0.25), PSToken::Literal("P1".into())];
        let color = color_operands(&Operator::scn, &args, &cs).unwrap();
        assert_eq!(color.pattern.as_deref(), Some("P1"));
        assert_eq!(color.components.as_slice(), &[0.25]);
    }

    #[test]
    fn pattern_space_requires_a_name() {
        let cs = PDFColorSpace::Pattern { underlying: None };
        let err = color_operands(&Operator::scn, &[PSToken::Int(1)], &cs).unwrap_err();
        assert!(matches!(err, PdfError::OperandType { expected: "pattern name", .. }));
    }
}
