//! Axial and radial shadings.

use super::color::{PDFColorSpace, Rgb};
use super::function::PdfFunction;
use crate::document::PDFDocument;
use crate::error::{PdfError, Result};
use crate::model::objects::{PDFDict, PDFObject};
use crate::utils::{Point, Rect};

#[derive(Debug, Clone, PartialEq)]
pub enum ShadingKind {
    /// Type 2: `[x0 y0 x1 y1]`
    Axial { coords: [f64; 4] },
    /// Type 3: `[x0 y0 r0 x1 y1 r1]`
    Radial { coords: [f64; 6] },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shading {
    pub kind: ShadingKind,
    pub colorspace: PDFColorSpace,
    pub function: PdfFunction,
    pub domain: (f64, f64),
    pub extend: (bool, bool),
    pub bbox: Option<Rect>,
}

impl Shading {
    /// Parses a shading dictionary (or stream). Types other than axial and
    /// radial come back as `Ok(None)`.
    pub fn parse(doc: &PDFDocument, obj: &PDFObject, resources: Option<&PDFDict>) -> Result<Option<Self>> {
        let obj = doc.resolve(obj)?;
        let dict = obj.as_dict()?;
        let kind = doc
            .get_resolved(dict, "ShadingType")
            .and_then(|t| t.as_int().ok())
            .ok_or_else(|| PdfError::DecodeError("shading without /ShadingType".into()))?;
        let coords = doc
            .get_resolved(dict, "Coords")
            .and_then(|c| c.as_numbers().ok())
            .unwrap_or_default();
        let kind = match (kind, coords.len()) {
            (2, 4) => ShadingKind::Axial {
                coords: [coords[0], coords[1], coords[2], coords[3]],
            },
            (3, 6) => ShadingKind::Radial {
                coords: [coords[0], coords[1], coords[2], coords[3], coords[4], coords[5]],
            },
            (2 | 3, _) => return Err(PdfError::DecodeError("shading /Coords has the wrong length".into())),
            (other, _) => {
                tracing::debug!(shading_type = other, "shading type not supported, skipped");
                return Ok(None);
            }
        };

        let cs = dict
            .get("ColorSpace")
            .ok_or_else(|| PdfError::DecodeError("shading without /ColorSpace".into()))?;
        let colorspace = PDFColorSpace::parse(doc, cs, resources)?;
        let function = dict
            .get("Function")
            .ok_or_else(|| PdfError::DecodeError("shading without /Function".into()))?;
        let function = PdfFunction::parse(doc, function)?;
        let domain = doc
            .get_resolved(dict, "Domain")
            .and_then(|d| d.as_numbers().ok())
            .filter(|d| d.len() == 2)
            .map_or((0.0, 1.0), |d| (d[0], d[1]));
        let extend = doc
            .get_resolved(dict, "Extend")
            .and_then(|e| {
                let arr = e.as_array().ok()?;
                Some((arr.first()?.as_bool().ok()?, arr.get(1)?.as_bool().ok()?))
            })
            .unwrap_or((false, false));
        let bbox = doc
            .get_resolved(dict, "BBox")
            .and_then(|b| b.as_numbers().ok())
            .filter(|b| b.len() == 4)
            .map(|b| crate::utils::normalize_rect((b[0], b[1], b[2], b[3])));

        Ok(Some(Self {
            kind,
            colorspace,
            function,
            domain,
            extend,
            bbox,
        }))
    }

    /// Parametric position `s` (0 at the start geometry, 1 at the end) for a
    /// point in shading space, honouring `/Extend`.
    fn parameter(&self, p: Point) -> Option<f64> {
        let in_range = |s: f64| (0.0..=1.0).contains(&s) || (s < 0.0 && self.extend.0) || (s > 1.0 && self.extend.1);
        match self.kind {
            ShadingKind::Axial { coords: [x0, y0, x1, y1] } => {
                let (dx, dy) = (x1 - x0, y1 - y0);
                let len2 = dx * dx + dy * dy;
                if len2 <= 0.0 {
                    return None;
                }
                let s = ((p.0 - x0) * dx + (p.1 - y0) * dy) / len2;
                in_range(s).then_some(s)
            }
            ShadingKind::Radial {
                coords: [x0, y0, r0, x1, y1, r1],
            } => {
                let (cdx, cdy, dr) = (x1 - x0, y1 - y0, r1 - r0);
                let (pdx, pdy) = (p.0 - x0, p.1 - y0);
                let a = cdx * cdx + cdy * cdy - dr * dr;
                let b = pdx * cdx + pdy * cdy + r0 * dr;
                let c = pdx * pdx + pdy * pdy - r0 * r0;
                let valid = |s: f64| in_range(s) && r0 + s * dr >= 0.0;
                if a.abs() < 1e-12 {
                    if b.abs() < 1e-12 {
                        return None;
                    }
                    let s = c / (2.0 * b);
                    return valid(s).then_some(s);
                }
                let disc = b * b - a * c;
                if disc < 0.0 {
                    return None;
                }
                let root = disc.sqrt();
                let (s1, s2) = ((b + root) / a, (b - root) / a);
                let (hi, lo) = if s1 >= s2 { (s1, s2) } else { (s2, s1) };
                if valid(hi) {
                    Some(hi)
                } else if valid(lo) {
                    Some(lo)
                } else {
                    None
                }
            }
        }
    }

    /// Color at a point in shading space, `None` outside the painted area.
    pub fn color_at(&self, p: Point) -> Option<Rgb> {
        if let Some((bx0, by0, bx1, by1)) = self.bbox
            && (p.0 < bx0 || p.0 > bx1 || p.1 < by0 || p.1 > by1)
        {
            return None;
        }
        let s = self.parameter(p)?.clamp(0.0, 1.0);
        let t = self.domain.0 + s * (self.domain.1 - self.domain.0);
        Some(self.colorspace.to_rgb(&self.function.eval(&[t])))
    }
}
