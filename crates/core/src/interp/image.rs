//! Image XObject and inline image decoding into RGB samples.

use crate::codec::Filter;
use crate::document::PDFDocument;
use crate::error::{PdfError, Result};
use crate::model::color::{PDFColorSpace, Rgb};
use crate::model::objects::{PDFDict, PDFObject, PDFStream};
use crate::parser::PSToken;
use crate::raster::RasterImage;
use std::collections::HashMap;

/// Images above this many samples are rejected.
const MAX_IMAGE_PIXELS: usize = 1 << 26;

/// Full key names for inline image abbreviations.
fn expand_inline_key(key: &str) -> &str {
    match key {
        "BPC" => "BitsPerComponent",
        "CS" => "ColorSpace",
        "D" => "Decode",
        "DP" => "DecodeParms",
        "F" => "Filter",
        "H" => "Height",
        "W" => "Width",
        "IM" => "ImageMask",
        "I" => "Interpolate",
        other => other,
    }
}

fn token_to_object(token: &PSToken) -> PDFObject {
    match token {
        PSToken::Int(n) => PDFObject::Int(*n),
        PSToken::Real(n) => PDFObject::Real(*n),
        PSToken::Bool(b) => PDFObject::Bool(*b),
        PSToken::Literal(name) => PDFObject::Name(name.clone()),
        PSToken::String(s) => PDFObject::String(s.clone()),
        PSToken::Array(items) => PDFObject::Array(items.iter().map(token_to_object).collect()),
        PSToken::Dict(dict) => PDFObject::Dict(
            dict.iter()
                .map(|(k, v)| (k.clone(), token_to_object(v)))
                .collect(),
        ),
        PSToken::Keyword(_) => PDFObject::Null,
    }
}

/// Builds a stream object from an inline image's dictionary and data.
pub fn inline_image_stream(dict: &HashMap<String, PSToken>, data: Vec<u8>) -> PDFStream {
    let attrs: PDFDict = dict
        .iter()
        .map(|(k, v)| (expand_inline_key(k).to_string(), token_to_object(v)))
        .collect();
    PDFStream::new(attrs, data)
}

/// Reads packed samples of `bpc` bits, row by row.
struct SampleReader<'d> {
    data: &'d [u8],
    bpc: usize,
    row_bytes: usize,
}

impl SampleReader<'_> {
    fn get(&self, row: usize, index: usize) -> u32 {
        let bit = index * self.bpc;
        let base = row * self.row_bytes;
        let byte = |i: usize| u32::from(self.data.get(base + i).copied().unwrap_or(0));
        match self.bpc {
            8 => byte(index),
            16 => (byte(index * 2) << 8) | byte(index * 2 + 1),
            1 | 2 | 4 => {
                let b = byte(bit / 8);
                let shift = 8 - self.bpc - bit % 8;
                (b >> shift) & ((1 << self.bpc) - 1)
            }
            _ => 0,
        }
    }
}

fn int_attr(doc: &PDFDocument, attrs: &PDFDict, key: &str) -> Option<i64> {
    doc.get_resolved(attrs, key).and_then(|v| v.as_int().ok())
}

fn bool_attr(doc: &PDFDocument, attrs: &PDFDict, key: &str) -> bool {
    doc.get_resolved(attrs, key)
        .and_then(|v| v.as_bool().ok())
        .unwrap_or(false)
}

fn dimensions(doc: &PDFDocument, attrs: &PDFDict) -> Result<(usize, usize)> {
    let w = int_attr(doc, attrs, "Width").unwrap_or(0);
    let h = int_attr(doc, attrs, "Height").unwrap_or(0);
    if w <= 0 || h <= 0 {
        return Err(PdfError::DecodeError(format!("image has invalid size {w}x{h}")));
    }
    let (w, h) = (w as usize, h as usize);
    if w.saturating_mul(h) > MAX_IMAGE_PIXELS {
        return Err(PdfError::DecodeError(format!("image {w}x{h} is too large")));
    }
    Ok((w, h))
}

/// Decodes an image into RGB plus optional alpha. Image masks are painted
/// with `fill`. Codecs other than DCT fail with `UnsupportedFilter`.
pub fn decode_image(
    doc: &PDFDocument,
    stream: &PDFStream,
    resources: Option<&PDFDict>,
    fill: Rgb,
) -> Result<RasterImage> {
    let attrs = &stream.attrs;
    let (width, height) = dimensions(doc, attrs)?;
    let decoded = doc.decode_stream_full(stream)?;

    if bool_attr(doc, attrs, "ImageMask") {
        if let Some((filter, _)) = &decoded.image_filter {
            return Err(unsupported_codec(filter, "image mask"));
        }
        let mask = stencil_alpha(doc, attrs, &decoded.data, width, height);
        let px = [to_u8(fill[0]), to_u8(fill[1]), to_u8(fill[2])];
        return Ok(RasterImage {
            width,
            height,
            rgb: px.repeat(width * height),
            alpha: Some(mask),
        });
    }

    let colorspace = match doc.get_resolved(attrs, "ColorSpace") {
        Some(cs) => PDFColorSpace::parse(doc, &cs, resources)?,
        None => PDFColorSpace::DeviceGray,
    };

    let mut image = match &decoded.image_filter {
        Some((Filter::Dct, _)) => decode_jpeg(&decoded.data, width, height)?,
        Some((other, _)) => return Err(unsupported_codec(other, "image")),
        None => {
            let bpc = int_attr(doc, attrs, "BitsPerComponent").unwrap_or(8);
            let bpc = match bpc {
                1 | 2 | 4 | 8 | 16 => bpc as usize,
                other => return Err(PdfError::DecodeError(format!("unsupported BitsPerComponent {other}"))),
            };
            let decode = decode_ranges(doc, attrs, &colorspace, bpc);
            let mut image = decode_samples(&decoded.data, width, height, bpc, &colorspace, &decode);
            if let Some(mask) = doc.get_resolved(attrs, "Mask")
                && let PDFObject::Array(ranges) = mask.as_ref()
            {
                image.alpha = color_key_alpha(&decoded.data, width, height, bpc, colorspace.ncomponents(), ranges);
            }
            image
        }
    };

    if let Some(smask) = doc.get_resolved(attrs, "SMask")
        && let Ok(smask) = smask.as_stream()
    {
        image.alpha = Some(soft_mask_alpha(doc, smask, width, height)?);
    } else if let Some(mask) = doc.get_resolved(attrs, "Mask")
        && let Ok(mask) = mask.as_stream()
    {
        let (mw, mh, alpha) = stencil_of(doc, mask)?;
        image.alpha = Some(resample(&alpha, mw, mh, width, height));
    }
    Ok(image)
}

fn unsupported_codec(filter: &Filter, what: &str) -> PdfError {
    PdfError::UnsupportedFilter(format!("{filter:?} in {what}"))
}

fn to_u8(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// `/Decode` pairs, or the color space's defaults.
fn decode_ranges(doc: &PDFDocument, attrs: &PDFDict, cs: &PDFColorSpace, bpc: usize) -> Vec<(f64, f64)> {
    let defaults = cs.default_decode(bpc as u32);
    match doc.get_resolved(attrs, "Decode").and_then(|d| d.as_numbers().ok()) {
        Some(nums) if nums.len() >= defaults.len() * 2 => nums.chunks_exact(2).map(|p| (p[0], p[1])).collect(),
        _ => defaults,
    }
}

/// Converts raw samples to RGB through the color space.
fn decode_samples(
    data: &[u8],
    width: usize,
    height: usize,
    bpc: usize,
    cs: &PDFColorSpace,
    decode: &[(f64, f64)],
) -> RasterImage {
    let n = cs.ncomponents();
    let reader = SampleReader {
        data,
        bpc,
        row_bytes: (width * n * bpc).div_ceil(8),
    };
    let max = ((1u64 << bpc) - 1) as f64;
    let mut rgb = Vec::with_capacity(width * height * 3);
    let mut comps = vec![0.0; n];

    // Plain 8-bit device samples skip the decode math.
    let fast_8bit = bpc == 8
        && matches!(cs, PDFColorSpace::DeviceRGB | PDFColorSpace::DeviceGray)
        && decode.iter().all(|&(lo, hi)| lo == 0.0 && hi == 1.0);
    for row in 0..height {
        for col in 0..width {
            if fast_8bit {
                let g = |i| reader.get(row, col * n + i) as u8;
                if n == 1 {
                    rgb.extend_from_slice(&[g(0); 3]);
                } else {
                    rgb.extend_from_slice(&[g(0), g(1), g(2)]);
                }
                continue;
            }
            for (i, c) in comps.iter_mut().enumerate() {
                let s = f64::from(reader.get(row, col * n + i));
                let (lo, hi) = decode.get(i).copied().unwrap_or((0.0, 1.0));
                *c = lo + s * (hi - lo) / max;
            }
            let c = cs.to_rgb(&comps);
            rgb.extend_from_slice(&[to_u8(c[0]), to_u8(c[1]), to_u8(c[2])]);
        }
    }
    RasterImage {
        width,
        height,
        rgb,
        alpha: None,
    }
}

fn decode_jpeg(data: &[u8], width: usize, height: usize) -> Result<RasterImage> {
    let img = image::load_from_memory_with_format(data, image::ImageFormat::Jpeg)
        .map_err(|e| PdfError::DecodeError(format!("DCTDecode: {e}")))?
        .to_rgb8();
    let (w, h) = (img.width() as usize, img.height() as usize);
    if (w, h) != (width, height) {
        tracing::debug!(w, h, width, height, "JPEG size differs from image dictionary");
    }
    Ok(RasterImage {
        width: w,
        height: h,
        rgb: img.into_raw(),
        alpha: None,
    })
}

/// 1-bit stencil to alpha. With the default `/Decode [0 1]`, sample 0
/// paints and sample 1 is transparent.
fn stencil_alpha(doc: &PDFDocument, attrs: &PDFDict, data: &[u8], width: usize, height: usize) -> Vec<u8> {
    let inverted = doc
        .get_resolved(attrs, "Decode")
        .and_then(|d| d.as_numbers().ok())
        .is_some_and(|d| d.first().copied() == Some(1.0));
    let reader = SampleReader {
        data,
        bpc: 1,
        row_bytes: width.div_ceil(8),
    };
    let mut alpha = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let bit = reader.get(row, col) == 1;
            alpha.push(if bit == inverted { 255 } else { 0 });
        }
    }
    alpha
}

/// Alpha for a `/Mask` stream (an image mask).
fn stencil_of(doc: &PDFDocument, mask: &PDFStream) -> Result<(usize, usize, Vec<u8>)> {
    let (w, h) = dimensions(doc, &mask.attrs)?;
    let decoded = doc.decode_stream_full(mask)?;
    if let Some((filter, _)) = &decoded.image_filter {
        return Err(unsupported_codec(filter, "explicit mask"));
    }
    Ok((w, h, stencil_alpha(doc, &mask.attrs, &decoded.data, w, h)))
}

/// Alpha for color-key masking: pixels whose every component falls in the
/// given ranges are transparent.
fn color_key_alpha(
    data: &[u8],
    width: usize,
    height: usize,
    bpc: usize,
    ncomps: usize,
    ranges: &[PDFObject],
) -> Option<Vec<u8>> {
    let ranges: Vec<(u32, u32)> = ranges
        .chunks_exact(2)
        .filter_map(|p| Some((p[0].as_int().ok()? as u32, p[1].as_int().ok()? as u32)))
        .collect();
    if ranges.len() < ncomps {
        return None;
    }
    let reader = SampleReader {
        data,
        bpc,
        row_bytes: (width * ncomps * bpc).div_ceil(8),
    };
    let mut alpha = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let keyed = (0..ncomps).all(|i| {
                let s = reader.get(row, col * ncomps + i);
                s >= ranges[i].0 && s <= ranges[i].1
            });
            alpha.push(if keyed { 0 } else { 255 });
        }
    }
    Some(alpha)
}

/// `/SMask` as 8-bit alpha at the base image's size.
fn soft_mask_alpha(doc: &PDFDocument, smask: &PDFStream, width: usize, height: usize) -> Result<Vec<u8>> {
    let attrs = &smask.attrs;
    let (mw, mh) = dimensions(doc, attrs)?;
    let decoded = doc.decode_stream_full(smask)?;
    let gray = match &decoded.image_filter {
        Some((Filter::Dct, _)) => {
            let img = decode_jpeg(&decoded.data, mw, mh)?;
            img.rgb.chunks_exact(3).map(|p| p[0]).collect::<Vec<u8>>()
        }
        Some((other, _)) => return Err(unsupported_codec(other, "soft mask")),
        None => {
            let bpc = int_attr(doc, attrs, "BitsPerComponent").unwrap_or(8).clamp(1, 16) as usize;
            let decode = decode_ranges(doc, attrs, &PDFColorSpace::DeviceGray, bpc);
            let img = decode_samples(&decoded.data, mw, mh, bpc, &PDFColorSpace::DeviceGray, &decode);
            img.rgb.chunks_exact(3).map(|p| p[0]).collect()
        }
    };
    let (gw, gh) = if gray.len() == mw * mh { (mw, mh) } else { (width, height) };
    Ok(resample(&gray, gw, gh, width, height))
}

/// Nearest-neighbour resize of a one-channel plane.
fn resample(src: &[u8], sw: usize, sh: usize, dw: usize, dh: usize) -> Vec<u8> {
    if (sw, sh) == (dw, dh) && src.len() == dw * dh {
        return src.to_vec();
    }
    let mut out = Vec::with_capacity(dw * dh);
    for y in 0..dh {
        let sy = (y * sh / dh.max(1)).min(sh.saturating_sub(1));
        for x in 0..dw {
            let sx = (x * sw / dw.max(1)).min(sw.saturating_sub(1));
            out.push(src.get(sy * sw + sx).copied().unwrap_or(255));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_reader_unpacks_bits() {
        let reader = SampleReader {
            data: &[0b1010_0000, 0xAB, 0xCD],
            bpc: 1,
            row_bytes: 1,
        };
        assert_eq!(reader.get(0, 0), 1);
        assert_eq!(reader.get(0, 1), 0);
        assert_eq!(reader.get(0, 2), 1);
        let reader = SampleReader {
            data: &[0xAB, 0xCD],
            bpc: 4,
            row_bytes: 2,
        };
        assert_eq!(reader.get(0, 0), 0xA);
        assert_eq!(reader.get(0, 3), 0xD);
        let reader = SampleReader {
            data: &[0x12, 0x34],
            bpc: 16,
            row_bytes: 2,
        };
        assert_eq!(reader.get(0, 0), 0x1234);
    }

    #[test]
    fn gray_samples_with_inverted_decode() {
        let img = decode_samples(&[0, 255], 2, 1, 8, &PDFColorSpace::DeviceGray, &[(1.0, 0.0)]);
        assert_eq!(img.rgb, vec![255, 255, 255, 0, 0, 0]);
    }

    #[test]
    fn indexed_samples_use_palette() {
        let cs = PDFColorSpace::Indexed {
            base: Box::new(PDFColorSpace::DeviceRGB),
            hival: 1,
            lookup: vec![255, 0, 0, 0, 0, 255],
        };
        let decode = cs.default_decode(1);
        let img = decode_samples(&[0b0100_0000], 2, 1, 1, &cs, &decode);
        assert_eq!(img.rgb, vec![255, 0, 0, 0, 0, 255]);
    }

    #[test]
    fn color_key_makes_matching_pixels_transparent() {
        let ranges = [PDFObject::Int(0), PDFObject::Int(10)];
        let alpha = color_key_alpha(&[5, 200], 2, 1, 8, 1, &ranges);
        assert_eq!(alpha, Some(vec![0, 255]));
    }

    #[test]
    fn inline_keys_are_expanded() {
        let dict = HashMap::from([
            ("W".to_string(), PSToken::Int(1)),
            ("CS".to_string(), PSToken::Literal("RGB".into())),
            ("F".to_string(), PSToken::Literal("AHx".into())),
        ]);
        let stream = inline_image_stream(&dict, b"ff0000>".to_vec());
        assert_eq!(stream.get("Width"), Some(&PDFObject::Int(1)));
        assert_eq!(stream.get("ColorSpace"), Some(&PDFObject::Name("RGB".into())));
        assert_eq!(stream.get("Filter"), Some(&PDFObject::Name("AHx".into())));
    }

    #[test]
    fn resample_nearest() {
        assert_eq!(resample(&[0, 255], 2, 1, 4, 1), vec![0, 0, 255, 255]);
    }
}
