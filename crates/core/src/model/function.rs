//! PDF functions (sampled, exponential, stitching).
//!
//! Used by Separation/DeviceN tint transforms and by shadings. PostScript
//! calculator functions (type 4) are not evaluated; callers fall back to
//! their alternate behaviour when parsing fails.

use crate::document::PDFDocument;
use crate::error::{PdfError, Result};
use crate::model::objects::PDFObject;
use smallvec::SmallVec;

/// Output values of one evaluation.
pub type FnOutput = SmallVec<[f64; 4]>;

/// Stitching nests; this bounds how deep we follow it.
const MAX_NESTING: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub enum PdfFunction {
    /// Type 0
    Sampled {
        domain: Vec<(f64, f64)>,
        range: Vec<(f64, f64)>,
        size: Vec<usize>,
        bits_per_sample: u32,
        encode: Vec<(f64, f64)>,
        decode: Vec<(f64, f64)>,
        samples: Vec<u8>,
    },
    /// Type 2
    Exponential {
        domain: (f64, f64),
        c0: Vec<f64>,
        c1: Vec<f64>,
        n: f64,
    },
    /// Type 3
    Stitching {
        domain: (f64, f64),
        functions: Vec<PdfFunction>,
        bounds: Vec<f64>,
        encode: Vec<(f64, f64)>,
    },
    /// An array of single-output functions whose results are concatenated.
    Combined(Vec<PdfFunction>),
}

fn pairs(values: &[f64]) -> Vec<(f64, f64)> {
    values.chunks_exact(2).map(|c| (c[0], c[1])).collect()
}

fn interpolate(x: f64, (x0, x1): (f64, f64), (y0, y1): (f64, f64)) -> f64 {
    if (x1 - x0).abs() < f64::EPSILON {
        y0
    } else {
        y0 + (x - x0) * (y1 - y0) / (x1 - x0)
    }
}

fn clip(x: f64, (lo, hi): (f64, f64)) -> f64 {
    if lo <= hi { x.clamp(lo, hi) } else { x.clamp(hi, lo) }
}

impl PdfFunction {
    /// Parses a function dictionary/stream or an array of them.
    pub fn parse(doc: &PDFDocument, obj: &PDFObject) -> Result<Self> {
        Self::parse_nested(doc, obj, 0)
    }

    fn parse_nested(doc: &PDFDocument, obj: &PDFObject, depth: usize) -> Result<Self> {
        if depth > MAX_NESTING {
            return Err(PdfError::DecodeError("function nesting too deep".into()));
        }
        let obj = doc.resolve(obj)?;
        if let PDFObject::Array(items) = obj.as_ref() {
            let parts = items
                .iter()
                .map(|item| Self::parse_nested(doc, item, depth + 1))
                .collect::<Result<Vec<_>>>()?;
            return Ok(Self::Combined(parts));
        }

        let dict = obj.as_dict()?;
        let numbers = |key: &str| -> Option<Vec<f64>> {
            doc.get_resolved(dict, key).and_then(|v| v.as_numbers().ok())
        };
        let domain = pairs(&numbers("Domain").unwrap_or_else(|| vec![0.0, 1.0]));
        let first_domain = domain.first().copied().unwrap_or((0.0, 1.0));
        let kind = doc
            .get_resolved(dict, "FunctionType")
            .and_then(|v| v.as_int().ok())
            .ok_or_else(|| PdfError::DecodeError("function without /FunctionType".into()))?;

        match kind {
            0 => {
                let stream = obj.as_stream()?;
                let range = pairs(&numbers("Range").unwrap_or_default());
                if range.is_empty() {
                    return Err(PdfError::DecodeError("sampled function without /Range".into()));
                }
                let size: Vec<usize> = numbers("Size")
                    .unwrap_or_default()
                    .into_iter()
                    .map(|s| s.max(1.0) as usize)
                    .collect();
                if size.len() != domain.len() {
                    return Err(PdfError::DecodeError("sampled function /Size mismatch".into()));
                }
                let bits_per_sample = doc
                    .get_resolved(dict, "BitsPerSample")
                    .and_then(|v| v.as_int().ok())
                    .unwrap_or(8) as u32;
                if !matches!(bits_per_sample, 1 | 2 | 4 | 8 | 12 | 16 | 24 | 32) {
                    return Err(PdfError::DecodeError(format!(
                        "unsupported BitsPerSample {bits_per_sample}"
                    )));
                }
                let encode = numbers("Encode")
                    .map(|e| pairs(&e))
                    .unwrap_or_else(|| size.iter().map(|&s| (0.0, (s - 1) as f64)).collect());
                let decode = numbers("Decode").map(|d| pairs(&d)).unwrap_or_else(|| range.clone());
                let samples = doc.decode_stream(stream)?;
                Ok(Self::Sampled {
                    domain,
                    range,
                    size,
                    bits_per_sample,
                    encode,
                    decode,
                    samples,
                })
            }
            2 => {
                let c0 = numbers("C0").unwrap_or_else(|| vec![0.0]);
                let c1 = numbers("C1").unwrap_or_else(|| vec![1.0]);
                let n = doc
                    .get_resolved(dict, "N")
                    .and_then(|v| v.as_num().ok())
                    .unwrap_or(1.0);
                Ok(Self::Exponential {
                    domain: first_domain,
                    c0,
                    c1,
                    n,
                })
            }
            3 => {
                let functions = doc
                    .get_resolved(dict, "Functions")
                    .ok_or_else(|| PdfError::DecodeError("stitching function without /Functions".into()))?;
                let functions = functions
                    .as_array()?
                    .iter()
                    .map(|f| Self::parse_nested(doc, f, depth + 1))
                    .collect::<Result<Vec<_>>>()?;
                let bounds = numbers("Bounds").unwrap_or_default();
                if functions.is_empty() || bounds.len() + 1 != functions.len() {
                    return Err(PdfError::DecodeError("stitching function /Bounds mismatch".into()));
                }
                let encode = numbers("Encode")
                    .map(|e| pairs(&e))
                    .unwrap_or_else(|| vec![(0.0, 1.0); functions.len()]);
                Ok(Self::Stitching {
                    domain: first_domain,
                    functions,
                    bounds,
                    encode,
                })
            }
            other => Err(PdfError::DecodeError(format!("unsupported function type {other}"))),
        }
    }

    /// Evaluates the function; missing inputs count as zero.
    pub fn eval(&self, input: &[f64]) -> FnOutput {
        match self {
            Self::Exponential { domain, c0, c1, n } => {
                let x = clip(input.first().copied().unwrap_or(0.0), *domain);
                let xn = if *n == 1.0 { x } else { x.max(0.0).powf(*n) };
                let len = c0.len().max(c1.len());
                (0..len)
                    .map(|i| {
                        let a = c0.get(i).copied().unwrap_or(0.0);
                        let b = c1.get(i).copied().unwrap_or(1.0);
                        a + xn * (b - a)
                    })
                    .collect()
            }
            Self::Stitching {
                domain,
                functions,
                bounds,
                encode,
            } => {
                let Some(last) = functions.len().checked_sub(1) else {
                    return FnOutput::new();
                };
                let x = clip(input.first().copied().unwrap_or(0.0), *domain);
                let k = bounds.iter().take_while(|&&b| x >= b).count().min(last);
                let lo = if k == 0 { domain.0 } else { bounds[k - 1] };
                let hi = if k == bounds.len() { domain.1 } else { bounds[k] };
                let enc = encode.get(k).copied().unwrap_or((0.0, 1.0));
                functions[k].eval(&[interpolate(x, (lo, hi), enc)])
            }
            Self::Sampled {
                domain,
                range,
                size,
                bits_per_sample,
                encode,
                decode,
                samples,
            } => {
                let n_out = range.len();
                // Fractional sample position per input dimension.
                let pos: SmallVec<[f64; 4]> = domain
                    .iter()
                    .enumerate()
                    .map(|(i, d)| {
                        let x = clip(input.get(i).copied().unwrap_or(0.0), *d);
                        let e = encode.get(i).copied().unwrap_or((0.0, (size[i] - 1) as f64));
                        interpolate(x, *d, e).clamp(0.0, (size[i] - 1) as f64)
                    })
                    .collect();
                let max = ((1u64 << *bits_per_sample) - 1) as f64;
                let sample_at = |index: &[usize], j: usize| -> f64 {
                    let mut offset = 0usize;
                    let mut stride = 1usize;
                    for (dim, &idx) in index.iter().enumerate() {
                        offset += idx * stride;
                        stride *= size[dim];
                    }
                    read_sample(samples, (offset * n_out + j) * *bits_per_sample as usize, *bits_per_sample)
                        as f64
                };

                // Linear along the first dimension, nearest for the rest.
                let mut base: SmallVec<[usize; 4]> = pos.iter().map(|p| p.round() as usize).collect();
                let first = pos.first().copied().unwrap_or(0.0);
                let i0 = first.floor() as usize;
                let i1 = (i0 + 1).min(size.first().copied().unwrap_or(1) - 1);
                let t = first - i0 as f64;

                (0..n_out)
                    .map(|j| {
                        if base.is_empty() {
                            return range[j].0;
                        }
                        base[0] = i0;
                        let s0 = sample_at(&base, j);
                        base[0] = i1;
                        let s1 = sample_at(&base, j);
                        let s = s0 + (s1 - s0) * t;
                        let d = decode.get(j).copied().unwrap_or(range[j]);
                        clip(interpolate(s, (0.0, max), d), range[j])
                    })
                    .collect()
            }
            Self::Combined(parts) => parts.iter().flat_map(|f| f.eval(input)).collect(),
        }
    }
}

fn read_sample(data: &[u8], bit_offset: usize, bits: u32) -> u64 {
    let mut value = 0u64;
    for i in 0..bits as usize {
        let bit = bit_offset + i;
        let byte = data.get(bit / 8).copied().unwrap_or(0);
        value = (value << 1) | u64::from((byte >> (7 - bit % 8)) & 1);
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exponential_interpolates() {
        let f = PdfFunction::Exponential {
            domain: (0.0, 1.0),
            c0: vec![0.0, 1.0],
            c1: vec![1.0, 0.0],
            n: 1.0,
        };
        let out = f.eval(&[0.25]);
        assert!((out[0] - 0.25).abs() < 1e-9);
        assert!((out[1] - 0.75).abs() < 1e-9);
        assert!((f.eval(&[2.0])[0] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn stitching_picks_subfunction() {
        let red = PdfFunction::Exponential {
            domain: (0.0, 1.0),
            c0: vec![1.0],
            c1: vec![1.0],
            n: 1.0,
        };
        let ramp = PdfFunction::Exponential {
            domain: (0.0, 1.0),
            c0: vec![0.0],
            c1: vec![1.0],
            n: 1.0,
        };
        let f = PdfFunction::Stitching {
            domain: (0.0, 1.0),
            functions: vec![red, ramp],
            bounds: vec![0.5],
            encode: vec![(0.0, 1.0), (0.0, 1.0)],
        };
        assert!((f.eval(&[0.2])[0] - 1.0).abs() < 1e-9);
        assert!((f.eval(&[0.75])[0] - 0.5).abs() < 1e-9);
        assert!((f.eval(&[1.0])[0] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn sampled_interpolates_first_dimension() {
        let f = PdfFunction::Sampled {
            domain: vec![(0.0, 1.0)],
            range: vec![(0.0, 1.0)],
            size: vec![2],
            bits_per_sample: 8,
            encode: vec![(0.0, 1.0)],
            decode: vec![(0.0, 1.0)],
            samples: vec![0, 255],
        };
        assert!((f.eval(&[0.5])[0] - 0.5).abs() < 1e-6);
        assert!((f.eval(&[1.0])[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn sample_reader_handles_sub_byte_widths() {
        assert_eq!(read_sample(&[0b1011_0000], 0, 4), 0b1011);
        assert_eq!(read_sample(&[0b1011_0110], 4, 4), 0b0110);
        assert_eq!(read_sample(&[0x12, 0x34], 0, 16), 0x1234);
    }
}
