//! PDF color space definitions and conversion to RGB.

use crate::document::PDFDocument;
use crate::error::{PdfError, Result};
use crate::model::function::PdfFunction;
use crate::model::objects::{PDFDict, PDFObject};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

/// Color components in `[0, 1]`, RGB order.
pub type Rgb = [f64; 3];

/// Nesting bound for Indexed/Separation/ICCBased alternates.
const MAX_NESTING: usize = 8;

/// Represents a PDF color space.
#[derive(Debug, Clone, PartialEq)]
pub enum PDFColorSpace {
    DeviceGray,
    DeviceRGB,
    DeviceCMYK,
    /// CIE L*a*b* with its `/Range` for a* and b*.
    Lab { range: [f64; 4] },
    Indexed {
        base: Box<PDFColorSpace>,
        hival: usize,
        lookup: Vec<u8>,
    },
    /// Separation and DeviceN: `ncomponents` tints through a transform.
    Separation {
        ncomponents: usize,
        alternate: Box<PDFColorSpace>,
        tint: Option<Arc<PdfFunction>>,
    },
    /// Pattern with an optional underlying space for uncolored patterns.
    Pattern { underlying: Option<Box<PDFColorSpace>> },
}

/// Device families by name. Calibrated spaces map onto their device
/// counterparts.
pub static PREDEFINED_COLORSPACE: LazyLock<HashMap<&'static str, PDFColorSpace>> =
    LazyLock::new(|| {
        HashMap::from([
            ("DeviceGray", PDFColorSpace::DeviceGray),
            ("CalGray", PDFColorSpace::DeviceGray),
            ("DeviceRGB", PDFColorSpace::DeviceRGB),
            ("CalRGB", PDFColorSpace::DeviceRGB),
            ("DeviceCMYK", PDFColorSpace::DeviceCMYK),
            ("Pattern", PDFColorSpace::Pattern { underlying: None }),
        ])
    });

/// Inline image color space abbreviations.
pub static INLINE_COLORSPACE_ABBREV: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| {
        HashMap::from([
            ("G", "DeviceGray"),
            ("RGB", "DeviceRGB"),
            ("CMYK", "DeviceCMYK"),
            ("I", "Indexed"),
        ])
    });

impl PDFColorSpace {
    /// Number of color components an operand list or image sample carries.
    pub fn ncomponents(&self) -> usize {
        match self {
            Self::DeviceGray | Self::Indexed { .. } | Self::Pattern { .. } => 1,
            Self::DeviceRGB | Self::Lab { .. } => 3,
            Self::DeviceCMYK => 4,
            Self::Separation { ncomponents, .. } => *ncomponents,
        }
    }

    /// Initial color after the space is selected with `CS`/`cs`.
    pub fn initial_color(&self) -> Vec<f64> {
        match self {
            Self::DeviceCMYK => vec![0.0, 0.0, 0.0, 1.0],
            Self::Separation { ncomponents, .. } => vec![1.0; *ncomponents],
            Self::Lab { .. } => vec![0.0, 0.0, 0.0],
            other => vec![0.0; other.ncomponents()],
        }
    }

    /// Decode array default for images, per component.
    pub fn default_decode(&self, bits_per_component: u32) -> Vec<(f64, f64)> {
        match self {
            Self::Indexed { .. } => vec![(0.0, ((1u64 << bits_per_component) - 1) as f64)],
            Self::Lab { range } => vec![(0.0, 100.0), (range[0], range[1]), (range[2], range[3])],
            other => vec![(0.0, 1.0); other.ncomponents()],
        }
    }

    pub fn to_rgb(&self, comps: &[f64]) -> Rgb {
        let c = |i: usize| comps.get(i).copied().unwrap_or(0.0).clamp(0.0, 1.0);
        match self {
            Self::DeviceGray => {
                let g = c(0);
                [g, g, g]
            }
            Self::DeviceRGB => [c(0), c(1), c(2)],
            Self::DeviceCMYK => {
                let k = c(3);
                [
                    (1.0 - c(0)) * (1.0 - k),
                    (1.0 - c(1)) * (1.0 - k),
                    (1.0 - c(2)) * (1.0 - k),
                ]
            }
            Self::Lab { .. } => lab_to_rgb(
                comps.first().copied().unwrap_or(0.0),
                comps.get(1).copied().unwrap_or(0.0),
                comps.get(2).copied().unwrap_or(0.0),
            ),
            Self::Indexed { base, hival, lookup } => {
                let index = (comps.first().copied().unwrap_or(0.0).round().max(0.0) as usize).min(*hival);
                let n = base.ncomponents();
                let entry: Vec<f64> = (0..n)
                    .map(|i| f64::from(lookup.get(index * n + i).copied().unwrap_or(0)) / 255.0)
                    .collect();
                base.to_rgb(&entry)
            }
            Self::Separation { alternate, tint, .. } => match tint {
                Some(f) => alternate.to_rgb(&f.eval(comps)),
                None => {
                    // No usable transform: treat the first tint as ink coverage.
                    let g = 1.0 - c(0);
                    [g, g, g]
                }
            },
            Self::Pattern { underlying } => match underlying {
                Some(base) => base.to_rgb(comps),
                None => [0.0, 0.0, 0.0],
            },
        }
    }

    /// Parses a color space operand or resource entry.
    ///
    /// Names other than the device families are looked up in the
    /// `/ColorSpace` resource dictionary when one is given.
    pub fn parse(doc: &PDFDocument, obj: &PDFObject, resources: Option<&PDFDict>) -> Result<Self> {
        Self::parse_nested(doc, obj, resources, 0)
    }

    fn parse_nested(doc: &PDFDocument, obj: &PDFObject, resources: Option<&PDFDict>, depth: usize) -> Result<Self> {
        if depth > MAX_NESTING {
            return Err(PdfError::DecodeError("color space nesting too deep".into()));
        }
        let obj = doc.resolve(obj)?;
        match obj.as_ref() {
            PDFObject::Name(name) => {
                let name = INLINE_COLORSPACE_ABBREV.get(name.as_str()).copied().unwrap_or(name);
                if let Some(cs) = PREDEFINED_COLORSPACE.get(name) {
                    return Ok(cs.clone());
                }
                let named = resources
                    .and_then(|r| doc.get_resolved(r, "ColorSpace"))
                    .and_then(|cs| cs.as_dict().ok().and_then(|d| d.get(name).cloned()))
                    .ok_or_else(|| PdfError::KeyError(format!("color space /{name}")))?;
                Self::parse_nested(doc, &named, None, depth + 1)
            }
            PDFObject::Array(items) => Self::parse_array(doc, items, resources, depth),
            other => Err(PdfError::TypeError {
                expected: "color space",
                got: other.type_name(),
            }),
        }
    }

    fn parse_array(doc: &PDFDocument, items: &[PDFObject], resources: Option<&PDFDict>, depth: usize) -> Result<Self> {
        let family = items
            .first()
            .map(|f| doc.resolve(f))
            .transpose()?
            .ok_or_else(|| PdfError::DecodeError("empty color space array".into()))?;
        let family = family.as_name()?;
        let family = INLINE_COLORSPACE_ABBREV.get(family).copied().unwrap_or(family);
        let arg = |i: usize| items.get(i).ok_or_else(|| PdfError::DecodeError(format!("/{family} is missing operands")));

        match family {
            "DeviceGray" | "CalGray" | "DeviceRGB" | "CalRGB" | "DeviceCMYK" => {
                Ok(PREDEFINED_COLORSPACE.get(family).cloned().unwrap_or(Self::DeviceRGB))
            }
            "Lab" => {
                let range = items
                    .get(1)
                    .and_then(|d| doc.resolve(d).ok())
                    .and_then(|d| d.as_dict().ok().and_then(|d| doc.get_resolved(d, "Range")))
                    .and_then(|r| r.as_numbers().ok())
                    .filter(|r| r.len() == 4)
                    .map_or([-100.0, 100.0, -100.0, 100.0], |r| [r[0], r[1], r[2], r[3]]);
                Ok(Self::Lab { range })
            }
            "ICCBased" => {
                let stream = doc.resolve(arg(1)?)?;
                let dict = stream.as_dict()?;
                if let Some(alt) = dict.get("Alternate")
                    && let Ok(cs) = Self::parse_nested(doc, alt, resources, depth + 1)
                {
                    return Ok(cs);
                }
                let n = doc.get_resolved(dict, "N").and_then(|n| n.as_int().ok()).unwrap_or(3);
                Ok(match n {
                    1 => Self::DeviceGray,
                    4 => Self::DeviceCMYK,
                    _ => Self::DeviceRGB,
                })
            }
            "Indexed" => {
                let base = Self::parse_nested(doc, arg(1)?, resources, depth + 1)?;
                let hival = doc.resolve(arg(2)?)?.as_int()?.clamp(0, 255) as usize;
                let table = doc.resolve(arg(3)?)?;
                let lookup = match table.as_ref() {
                    PDFObject::String(s) => s.clone(),
                    PDFObject::Stream(s) => doc.decode_stream(s)?,
                    other => {
                        return Err(PdfError::TypeError {
                            expected: "lookup table",
                            got: other.type_name(),
                        });
                    }
                };
                Ok(Self::Indexed {
                    base: Box::new(base),
                    hival,
                    lookup,
                })
            }
            "Separation" | "DeviceN" => {
                let ncomponents = if family == "DeviceN" {
                    doc.resolve(arg(1)?)?.as_array()?.len().max(1)
                } else {
                    1
                };
                let alternate = Self::parse_nested(doc, arg(2)?, resources, depth + 1)?;
                let tint = match PdfFunction::parse(doc, arg(3)?) {
                    Ok(f) => Some(Arc::new(f)),
                    Err(err) => {
                        tracing::debug!(%err, "tint transform unusable");
                        None
                    }
                };
                Ok(Self::Separation {
                    ncomponents,
                    alternate: Box::new(alternate),
                    tint,
                })
            }
            "Pattern" => {
                let underlying = match items.get(1) {
                    Some(base) => Some(Box::new(Self::parse_nested(doc, base, resources, depth + 1)?)),
                    None => None,
                };
                Ok(Self::Pattern { underlying })
            }
            other => Err(PdfError::DecodeError(format!("unknown color space /{other}"))),
        }
    }
}

/// Lab (D50 white point) to sRGB.
fn lab_to_rgb(l: f64, a: f64, b: f64) -> Rgb {
    let fy = (l + 16.0) / 116.0;
    let fx = fy + a / 500.0;
    let fz = fy - b / 200.0;
    let finv = |t: f64| {
        if t > 6.0 / 29.0 {
            t * t * t
        } else {
            3.0 * (6.0f64 / 29.0).powi(2) * (t - 4.0 / 29.0)
        }
    };
    let x = 0.9642 * finv(fx);
    let y = finv(fy);
    let z = 0.8249 * finv(fz);
    // Bradford-adapted D50 XYZ to linear sRGB.
    let r = 3.1339 * x - 1.6169 * y - 0.4906 * z;
    let g = -0.9788 * x + 1.9161 * y + 0.0335 * z;
    let bl = 0.0719 * x - 0.2290 * y + 1.4052 * z;
    let gamma = |c: f64| {
        let c = c.clamp(0.0, 1.0);
        if c <= 0.003_130_8 {
            12.92 * c
        } else {
            1.055 * c.powf(1.0 / 2.4) - 0.055
        }
    };
    [gamma(r), gamma(g), gamma(bl)]
}
