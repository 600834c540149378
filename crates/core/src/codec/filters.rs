//! Stream filter pipeline.
//!
//! Filters are applied in declared order. Image codecs (DCT, JPX, CCITT,
//! JBIG2) end the pipeline: the bytes are handed back untouched together
//! with the codec so the image decoder can take over.

use super::{ascii85, flate, lzw, predictor, runlength};
use crate::error::{PdfError, Result};
use crate::model::objects::{PDFDict, PDFObject};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Flate,
    Lzw,
    Ascii85,
    AsciiHex,
    RunLength,
    Dct,
    Jpx,
    CcittFax,
    Jbig2,
    Crypt,
    Unknown(String),
}

impl Filter {
    /// Full names and the inline-image abbreviations.
    pub fn from_name(name: &str) -> Self {
        match name {
            "FlateDecode" | "Fl" => Self::Flate,
            "LZWDecode" | "LZW" => Self::Lzw,
            "ASCII85Decode" | "A85" => Self::Ascii85,
            "ASCIIHexDecode" | "AHx" => Self::AsciiHex,
            "RunLengthDecode" | "RL" => Self::RunLength,
            "DCTDecode" | "DCT" => Self::Dct,
            "JPXDecode" => Self::Jpx,
            "CCITTFaxDecode" | "CCF" => Self::CcittFax,
            "JBIG2Decode" => Self::Jbig2,
            "Crypt" => Self::Crypt,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub const fn is_image_codec(&self) -> bool {
        matches!(self, Self::Dct | Self::Jpx | Self::CcittFax | Self::Jbig2)
    }
}

/// `/DecodeParms` entries used by the predictors and LZW.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeParms {
    pub predictor: i64,
    pub colors: usize,
    pub bits_per_component: usize,
    pub columns: usize,
    pub early_change: i64,
}

impl Default for DecodeParms {
    fn default() -> Self {
        Self {
            predictor: 1,
            colors: 1,
            bits_per_component: 8,
            columns: 1,
            early_change: 1,
        }
    }
}

impl DecodeParms {
    pub fn from_dict(dict: &PDFDict) -> Self {
        let int = |key: &str, default: i64| {
            dict.get(key)
                .and_then(|v| v.as_int().ok())
                .unwrap_or(default)
        };
        Self {
            predictor: int("Predictor", 1),
            colors: int("Colors", 1).clamp(1, 32) as usize,
            bits_per_component: int("BitsPerComponent", 8).clamp(1, 16) as usize,
            columns: int("Columns", 1).clamp(1, 1 << 20) as usize,
            early_change: int("EarlyChange", 1),
        }
    }

    fn unpredict(&self, data: Vec<u8>) -> Result<Vec<u8>> {
        match self.predictor {
            2 => predictor::tiff_unpredict(&data, self.columns, self.colors, self.bits_per_component),
            p if p >= 10 => {
                predictor::png_unpredict(&data, self.columns, self.colors, self.bits_per_component)
            }
            _ => Ok(data),
        }
    }
}

/// Reads `/Filter` and `/DecodeParms` (already resolved) into pipeline stages.
pub fn filter_chain(filter: Option<&PDFObject>, parms: Option<&PDFObject>) -> Vec<(Filter, DecodeParms)> {
    let names: Vec<&str> = match filter {
        Some(PDFObject::Name(n)) => vec![n.as_str()],
        Some(PDFObject::Array(arr)) => arr.iter().filter_map(|o| o.as_name().ok()).collect(),
        _ => Vec::new(),
    };
    let parms_at = |i: usize| -> DecodeParms {
        let obj = match parms {
            Some(PDFObject::Array(arr)) => arr.get(i),
            Some(other) if i == 0 => Some(other),
            _ => None,
        };
        match obj {
            Some(PDFObject::Dict(d)) => DecodeParms::from_dict(d),
            _ => DecodeParms::default(),
        }
    };
    names
        .into_iter()
        .enumerate()
        .map(|(i, name)| (Filter::from_name(name), parms_at(i)))
        .collect()
}

/// Output of the pipeline.
#[derive(Debug)]
pub struct Decoded {
    pub data: Vec<u8>,
    /// Set when an image codec stopped the pipeline.
    pub image_filter: Option<(Filter, DecodeParms)>,
}

/// Apply one non-image filter.
pub fn apply_filter(filter: &Filter, data: Vec<u8>, parms: &DecodeParms) -> Result<Vec<u8>> {
    match filter {
        Filter::Flate => parms.unpredict(flate::flatedecode(&data)?),
        Filter::Lzw => parms.unpredict(lzw::lzwdecode_with_earlychange(&data, parms.early_change)?),
        Filter::Ascii85 => ascii85::ascii85decode(&data),
        Filter::AsciiHex => ascii85::asciihexdecode(&data),
        Filter::RunLength => runlength::rldecode(&data),
        // Identity crypt filters; real decryption happened on load.
        Filter::Crypt => Ok(data),
        Filter::Unknown(name) => Err(PdfError::UnsupportedFilter(format!("/{name}"))),
        image => Err(PdfError::UnsupportedFilter(format!("{image:?} is an image codec"))),
    }
}

/// Run the whole chain.
pub fn decode_pipeline(data: Vec<u8>, chain: &[(Filter, DecodeParms)]) -> Result<Decoded> {
    let mut data = data;
    for (i, (filter, parms)) in chain.iter().enumerate() {
        if filter.is_image_codec() {
            if i + 1 < chain.len() {
                tracing::debug!(?filter, remaining = chain.len() - i - 1, "filters after image codec ignored");
            }
            return Ok(Decoded {
                data,
                image_filter: Some((filter.clone(), parms.clone())),
            });
        }
        data = apply_filter(filter, data, parms)?;
    }
    Ok(Decoded {
        data,
        image_filter: None,
    })
}
