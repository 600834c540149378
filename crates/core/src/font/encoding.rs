//! Simple-font encodings: base encodings plus `/Differences`, and glyph
//! name to Unicode lookup.

use super::latin_enc::ENCODING;
use crate::document::PDFDocument;
use crate::model::objects::{PDFDict, PDFObject};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Glyph name to character for the Latin set.
static GLYPH_TO_CHAR: LazyLock<HashMap<&'static str, char>> =
    LazyLock::new(|| ENCODING.iter().map(|row| (row.0, row.5)).collect());

/// One of the four standard single-byte encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseEncoding {
    Standard,
    MacRoman,
    WinAnsi,
    PdfDoc,
}

impl BaseEncoding {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "StandardEncoding" => Some(Self::Standard),
            "MacRomanEncoding" => Some(Self::MacRoman),
            "WinAnsiEncoding" => Some(Self::WinAnsi),
            "PDFDocEncoding" => Some(Self::PdfDoc),
            _ => None,
        }
    }

    /// Code to glyph name table.
    fn table(self) -> [Option<&'static str>; 256] {
        let mut names = [None; 256];
        for &(name, std, mac, win, pdf, _) in ENCODING {
            let code = match self {
                Self::Standard => std,
                Self::MacRoman => mac,
                Self::WinAnsi => win,
                Self::PdfDoc => pdf,
            };
            if let Some(code) = code {
                names[usize::from(code)] = Some(name);
            }
        }
        // WinAnsi maps these otherwise unused codes to the same glyphs.
        if self == Self::WinAnsi {
            names[0xA0] = Some("space");
            names[0xAD] = Some("hyphen");
        }
        names
    }
}

static BASE_TABLES: LazyLock<[[Option<&'static str>; 256]; 4]> = LazyLock::new(|| {
    [
        BaseEncoding::Standard.table(),
        BaseEncoding::MacRoman.table(),
        BaseEncoding::WinAnsi.table(),
        BaseEncoding::PdfDoc.table(),
    ]
});

/// Unicode value of a glyph name: the Latin set, `uniXXXX`, `uXXXX[XX]`.
/// Suffixes after `.` are ignored.
pub fn name2unicode(name: &str) -> Option<char> {
    let name = name.split('.').next().unwrap_or(name);
    if let Some(ch) = GLYPH_TO_CHAR.get(name) {
        return Some(*ch);
    }
    let hex = name
        .strip_prefix("uni")
        .filter(|h| h.len() == 4)
        .or_else(|| name.strip_prefix('u').filter(|h| (4..=6).contains(&h.len())))?;
    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
}

/// Code to glyph name mapping of a simple font.
#[derive(Debug, Clone, PartialEq)]
pub struct Encoding {
    /// `None` when the font has neither `/Encoding` nor `/Differences`;
    /// symbolic TrueType fonts then map codes straight through their cmap.
    base: Option<BaseEncoding>,
    names: Vec<Option<String>>,
}

impl Encoding {
    pub fn new(base: Option<BaseEncoding>) -> Self {
        let table = &BASE_TABLES[match base.unwrap_or(BaseEncoding::Standard) {
            BaseEncoding::Standard => 0,
            BaseEncoding::MacRoman => 1,
            BaseEncoding::WinAnsi => 2,
            BaseEncoding::PdfDoc => 3,
        }];
        Self {
            base,
            names: table.iter().map(|n| n.map(str::to_string)).collect(),
        }
    }

    /// Applies a `/Differences` array: a code followed by names for
    /// consecutive codes.
    pub fn apply_differences(&mut self, diffs: &[PDFObject]) {
        let mut code: Option<usize> = None;
        for item in diffs {
            match item {
                PDFObject::Int(n) => code = usize::try_from(*n).ok(),
                PDFObject::Real(n) if *n >= 0.0 => code = Some(*n as usize),
                PDFObject::Name(name) => {
                    if let Some(c) = code.filter(|c| *c < 256) {
                        self.names[c] = Some(name.clone());
                        code = Some(c + 1);
                    }
                }
                _ => {}
            }
        }
    }

    /// Reads `/Encoding` from a font dictionary. `symbolic` fonts without a
    /// base keep `base == None`.
    pub fn from_font(doc: &PDFDocument, font: &PDFDict, symbolic: bool) -> Self {
        let Some(enc) = doc.get_resolved(font, "Encoding") else {
            return Self::new((!symbolic).then_some(BaseEncoding::Standard));
        };
        match enc.as_ref() {
            PDFObject::Name(name) => Self::new(BaseEncoding::from_name(name).or((!symbolic).then_some(BaseEncoding::Standard))),
            PDFObject::Dict(dict) => {
                let base = doc
                    .get_resolved(dict, "BaseEncoding")
                    .and_then(|b| b.as_name().ok().and_then(BaseEncoding::from_name))
                    .or((!symbolic).then_some(BaseEncoding::Standard));
                let mut encoding = Self::new(base);
                if let Some(diffs) = doc.get_resolved(dict, "Differences")
                    && let Ok(items) = diffs.as_array()
                {
                    encoding.apply_differences(items);
                }
                encoding
            }
            _ => Self::new((!symbolic).then_some(BaseEncoding::Standard)),
        }
    }

    pub const fn base(&self) -> Option<BaseEncoding> {
        self.base
    }

    pub fn glyph_name(&self, code: u8) -> Option<&str> {
        self.names.get(usize::from(code)).and_then(|n| n.as_deref())
    }

    pub fn unicode(&self, code: u8) -> Option<char> {
        self.glyph_name(code).and_then(name2unicode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_tables_differ() {
        let std = Encoding::new(Some(BaseEncoding::Standard));
        let win = Encoding::new(Some(BaseEncoding::WinAnsi));
        assert_eq!(std.glyph_name(b'A'), Some("A"));
        assert_eq!(std.glyph_name(0x27), Some("quoteright"));
        assert_eq!(win.glyph_name(0x27), Some("quotesingle"));
        assert_eq!(win.unicode(0xE9), Some('é'));
        assert_eq!(win.unicode(0x80), Some('€'));
    }

    #[test]
    fn differences_override_consecutive_codes() {
        let mut enc = Encoding::new(Some(BaseEncoding::WinAnsi));
        enc.apply_differences(&[
            PDFObject::Int(65),
            PDFObject::Name("Alpha".into()),
            PDFObject::Name("Beta".into()),
            PDFObject::Int(200),
            PDFObject::Name("uni03A9".into()),
        ]);
        assert_eq!(enc.glyph_name(65), Some("Alpha"));
        assert_eq!(enc.glyph_name(66), Some("Beta"));
        assert_eq!(enc.glyph_name(67), Some("C"));
        assert_eq!(enc.unicode(200), Some('Ω'));
    }

    #[test]
    fn glyph_names_resolve() {
        assert_eq!(name2unicode("Aacute"), Some('Á'));
        assert_eq!(name2unicode("a.sc"), Some('a'));
        assert_eq!(name2unicode("u1F600"), Some('😀'));
        assert_eq!(name2unicode("uni20AC"), Some('€'));
        assert_eq!(name2unicode("notaglyph"), None);
    }
}
