//! PDF fonts as the renderer sees them: code decoding, widths, and how each
//! code is drawn.

use super::encoding::Encoding;
use super::glyph::{GlyphProgram, Outline};
use crate::document::PDFDocument;
use crate::model::objects::{PDFDict, PDFObject};
use crate::utils::Matrix;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Width used when neither the font nor its descriptor gives one.
const DEFAULT_WIDTH: f64 = 500.0;

/// How a single code is painted.
#[derive(Debug, Clone)]
pub enum GlyphShape {
    /// Outline in text space (1.0 = font size).
    Outline(Outline),
    /// A Type3 glyph procedure.
    Procedure(PDFObject),
    /// No outline available: a box of the glyph's advance and x-height.
    Greeked,
    /// Nothing to draw (spaces, missing glyphs).
    Blank,
}

#[derive(Debug, Clone)]
pub enum CidToGid {
    Identity,
    Map(Vec<u16>),
}

#[derive(Debug, Clone)]
pub enum FontKind {
    Simple {
        encoding: Encoding,
    },
    Type0 {
        cid_to_gid: CidToGid,
    },
    Type3 {
        encoding: Encoding,
        font_matrix: Matrix,
        char_procs: PDFDict,
        resources: Option<PDFDict>,
    },
}

/// A font resource ready for rendering.
#[derive(Debug, Clone)]
pub struct PDFFont {
    pub basefont: String,
    pub kind: FontKind,
    /// Widths in glyph space (thousandths of an em, or Type3 glyph units).
    widths: FxHashMap<u32, f64>,
    default_width: f64,
    program: Option<Arc<GlyphProgram>>,
}

fn font_name(doc: &PDFDocument, dict: &PDFDict) -> String {
    doc.get_resolved(dict, "BaseFont")
        .and_then(|n| n.as_name().ok().map(str::to_string))
        .unwrap_or_default()
}

/// Embedded TrueType or OpenType program from a descriptor.
fn load_program(doc: &PDFDocument, descriptor: Option<&PDFDict>) -> Option<Arc<GlyphProgram>> {
    let descriptor = descriptor?;
    for key in ["FontFile2", "FontFile3"] {
        let Some(stream_obj) = doc.get_resolved(descriptor, key) else {
            continue;
        };
        let Ok(stream) = stream_obj.as_stream() else {
            continue;
        };
        if key == "FontFile3" && !stream_obj.is_name_at("Subtype", "OpenType") {
            tracing::debug!("bare CFF font program, drawing greeked glyphs");
            continue;
        }
        match doc.decode_stream(stream) {
            Ok(data) => {
                if let Some(program) = GlyphProgram::new(data) {
                    return Some(Arc::new(program));
                }
            }
            Err(err) => tracing::debug!(%err, "font program undecodable"),
        }
    }
    None
}

fn descriptor_of(doc: &PDFDocument, dict: &PDFDict) -> Option<PDFDict> {
    doc.get_resolved(dict, "FontDescriptor")
        .and_then(|d| d.as_dict().ok().cloned())
}

fn missing_width(doc: &PDFDocument, descriptor: Option<&PDFDict>) -> Option<f64> {
    descriptor
        .and_then(|d| doc.get_resolved(d, "MissingWidth"))
        .and_then(|w| w.as_num().ok())
        .filter(|w| *w > 0.0)
}

/// `/FirstChar` + `/Widths` of a simple font.
fn simple_widths(doc: &PDFDocument, dict: &PDFDict) -> FxHashMap<u32, f64> {
    let mut widths = FxHashMap::default();
    let first = doc
        .get_resolved(dict, "FirstChar")
        .and_then(|f| f.as_int().ok())
        .unwrap_or(0)
        .max(0) as u32;
    if let Some(arr) = doc.get_resolved(dict, "Widths")
        && let Ok(items) = arr.as_array()
    {
        for (i, w) in items.iter().enumerate() {
            if let Ok(w) = doc.resolve(w).and_then(|w| w.as_num()) {
                widths.insert(first + i as u32, w);
            }
        }
    }
    widths
}

/// CID font `/W`: `c [w1 w2 ...]` or `c_first c_last w`.
pub fn cid_widths(doc: &PDFDocument, items: &[PDFObject]) -> FxHashMap<u32, f64> {
    let mut widths = FxHashMap::default();
    let mut i = 0;
    while i < items.len() {
        let Ok(first) = items[i].as_int() else {
            i += 1;
            continue;
        };
        let first = first.max(0) as u32;
        let next = items.get(i + 1).and_then(|n| doc.resolve(n).ok());
        match next.as_deref() {
            Some(PDFObject::Array(ws)) => {
                for (k, w) in ws.iter().enumerate() {
                    if let Ok(w) = w.as_num() {
                        widths.insert(first + k as u32, w);
                    }
                }
                i += 2;
            }
            Some(last) if last.as_int().is_ok() => {
                let last = last.as_int().unwrap_or(0).max(0) as u32;
                if let Some(w) = items.get(i + 2).and_then(|w| w.as_num().ok()) {
                    // Cap absurd ranges from broken files.
                    for cid in first..=last.min(first.saturating_add(0xFFFF)) {
                        widths.insert(cid, w);
                    }
                }
                i += 3;
            }
            _ => i += 1,
        }
    }
    widths
}

impl PDFFont {
    /// Builds a font from its resource dictionary.
    pub fn new(doc: &PDFDocument, dict: &PDFDict) -> Self {
        let subtype = doc
            .get_resolved(dict, "Subtype")
            .and_then(|s| s.as_name().ok().map(str::to_string))
            .unwrap_or_default();
        match subtype.as_str() {
            "Type0" => Self::new_type0(doc, dict),
            "Type3" => Self::new_type3(doc, dict),
            _ => Self::new_simple(doc, dict),
        }
    }

    fn new_simple(doc: &PDFDocument, dict: &PDFDict) -> Self {
        let descriptor = descriptor_of(doc, dict);
        let flags = descriptor
            .as_ref()
            .and_then(|d| doc.get_resolved(d, "Flags"))
            .and_then(|f| f.as_int().ok())
            .unwrap_or(0);
        let symbolic = flags & 4 != 0 && flags & 32 == 0;
        let encoding = Encoding::from_font(doc, dict, symbolic);
        let program = load_program(doc, descriptor.as_ref());
        Self {
            basefont: font_name(doc, dict),
            kind: FontKind::Simple { encoding },
            widths: simple_widths(doc, dict),
            default_width: missing_width(doc, descriptor.as_ref()).unwrap_or(DEFAULT_WIDTH),
            program,
        }
    }

    fn new_type0(doc: &PDFDocument, dict: &PDFDict) -> Self {
        if let Some(enc) = doc.get_resolved(dict, "Encoding")
            && let Ok(name) = enc.as_name()
            && !name.starts_with("Identity")
        {
            tracing::debug!(encoding = name, "predefined CMap treated as two-byte identity");
        }
        let descendant = doc
            .get_resolved(dict, "DescendantFonts")
            .and_then(|d| d.as_array().ok().and_then(|a| a.first().cloned()))
            .and_then(|d| doc.resolve(&d).ok())
            .and_then(|d| d.as_dict().ok().cloned())
            .unwrap_or_default();
        let descriptor = descriptor_of(doc, &descendant);
        let widths = doc
            .get_resolved(&descendant, "W")
            .and_then(|w| w.as_array().ok().map(|items| cid_widths(doc, items)))
            .unwrap_or_default();
        let default_width = doc
            .get_resolved(&descendant, "DW")
            .and_then(|w| w.as_num().ok())
            .unwrap_or(1000.0);
        let cid_to_gid = match doc.get_resolved(&descendant, "CIDToGIDMap").as_deref() {
            Some(PDFObject::Stream(s)) => match doc.decode_stream(s) {
                Ok(map) => CidToGid::Map(map.chunks_exact(2).map(|c| u16::from_be_bytes([c[0], c[1]])).collect()),
                Err(err) => {
                    tracing::debug!(%err, "CIDToGIDMap undecodable, using identity");
                    CidToGid::Identity
                }
            },
            _ => CidToGid::Identity,
        };
        Self {
            basefont: font_name(doc, dict),
            kind: FontKind::Type0 { cid_to_gid },
            widths,
            default_width,
            program: load_program(doc, descriptor.as_ref()),
        }
    }

    fn new_type3(doc: &PDFDocument, dict: &PDFDict) -> Self {
        let font_matrix = doc
            .get_resolved(dict, "FontMatrix")
            .and_then(|m| m.as_numbers().ok())
            .filter(|m| m.len() == 6)
            .map_or((0.001, 0.0, 0.0, 0.001, 0.0, 0.0), |m| (m[0], m[1], m[2], m[3], m[4], m[5]));
        let char_procs = doc
            .get_resolved(dict, "CharProcs")
            .and_then(|c| c.as_dict().ok().cloned())
            .unwrap_or_default();
        let resources = doc.get_resolved(dict, "Resources").and_then(|r| r.as_dict().ok().cloned());
        Self {
            basefont: font_name(doc, dict),
            kind: FontKind::Type3 {
                encoding: Encoding::from_font(doc, dict, true),
                font_matrix,
                char_procs,
                resources,
            },
            widths: simple_widths(doc, dict),
            default_width: 0.0,
            program: None,
        }
    }

    /// Two-byte codes (Type0) or one-byte codes.
    pub const fn is_multibyte(&self) -> bool {
        matches!(self.kind, FontKind::Type0 { .. })
    }

    /// Splits a string operand into character codes.
    pub fn decode(&self, data: &[u8]) -> Vec<u32> {
        if self.is_multibyte() {
            let mut codes: Vec<u32> = data
                .chunks_exact(2)
                .map(|c| u32::from(u16::from_be_bytes([c[0], c[1]])))
                .collect();
            if data.len() % 2 == 1 {
                codes.push(u32::from(data[data.len() - 1]));
            }
            codes
        } else {
            data.iter().map(|&b| u32::from(b)).collect()
        }
    }

    /// Advance width of `code` in glyph space units (thousandths of text
    /// space for non-Type3 fonts).
    pub fn width(&self, code: u32) -> f64 {
        if let Some(w) = self.widths.get(&code) {
            return *w;
        }
        if let (FontKind::Simple { encoding }, Some(program)) = (&self.kind, &self.program)
            && let Ok(byte) = u8::try_from(code)
            && let Some(gid) = program.glyph_for_code(byte, encoding.glyph_name(byte), encoding.unicode(byte))
            && let Some(adv) = program.advance(gid)
        {
            return adv * 1000.0;
        }
        self.default_width
    }

    /// Glyph space to text space.
    pub const fn font_matrix(&self) -> Matrix {
        match &self.kind {
            FontKind::Type3 { font_matrix, .. } => *font_matrix,
            _ => (0.001, 0.0, 0.0, 0.001, 0.0, 0.0),
        }
    }

    /// Whether word spacing applies to this code.
    pub const fn is_word_space(&self, code: u32) -> bool {
        code == 32 && !self.is_multibyte()
    }

    /// How `code` is drawn.
    pub fn shape(&self, code: u32) -> GlyphShape {
        match &self.kind {
            FontKind::Type3 {
                encoding, char_procs, ..
            } => u8::try_from(code)
                .ok()
                .and_then(|b| encoding.glyph_name(b))
                .and_then(|name| char_procs.get(name))
                .map_or(GlyphShape::Blank, |p| GlyphShape::Procedure(p.clone())),
            FontKind::Simple { encoding } => {
                let Ok(byte) = u8::try_from(code) else {
                    return GlyphShape::Blank;
                };
                let name = encoding.glyph_name(byte);
                let unicode = encoding.unicode(byte);
                let Some(program) = &self.program else {
                    let blank = unicode.is_none_or(char::is_whitespace) || name == Some("space");
                    return if blank { GlyphShape::Blank } else { GlyphShape::Greeked };
                };
                program
                    .glyph_for_code(byte, name, unicode)
                    .and_then(|gid| program.outline(gid))
                    .map_or(GlyphShape::Blank, GlyphShape::Outline)
            }
            FontKind::Type0 { cid_to_gid } => {
                let Some(program) = &self.program else {
                    return if self.width(code) > 0.0 { GlyphShape::Greeked } else { GlyphShape::Blank };
                };
                let gid = match cid_to_gid {
                    CidToGid::Identity => u16::try_from(code).ok(),
                    CidToGid::Map(map) => map.get(code as usize).copied(),
                };
                gid.filter(|g| *g != 0)
                    .and_then(|g| program.outline(g))
                    .map_or(GlyphShape::Blank, GlyphShape::Outline)
            }
        }
    }

    /// Resources for Type3 glyph procedures.
    pub const fn type3_resources(&self) -> Option<&PDFDict> {
        match &self.kind {
            FontKind::Type3 { resources, .. } => resources.as_ref(),
            _ => None,
        }
    }

    pub const fn has_program(&self) -> bool {
        self.program.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::encoding::BaseEncoding;

    fn simple(widths: &[(u32, f64)]) -> PDFFont {
        PDFFont {
            basefont: "Helvetica".into(),
            kind: FontKind::Simple {
                encoding: Encoding::new(Some(BaseEncoding::WinAnsi)),
            },
            widths: widths.iter().copied().collect(),
            default_width: DEFAULT_WIDTH,
            program: None,
        }
    }

    #[test]
    fn simple_font_decodes_bytes() {
        let font = simple(&[(65, 667.0)]);
        assert_eq!(font.decode(b"AB"), vec![65, 66]);
        assert_eq!(font.width(65), 667.0);
        assert_eq!(font.width(66), DEFAULT_WIDTH);
        assert!(font.is_word_space(32));
    }

    #[test]
    fn type0_decodes_pairs() {
        let font = PDFFont {
            basefont: "CID".into(),
            kind: FontKind::Type0 {
                cid_to_gid: CidToGid::Identity,
            },
            widths: FxHashMap::default(),
            default_width: 1000.0,
            program: None,
        };
        assert_eq!(font.decode(&[0x00, 0x41, 0x01, 0x02, 0x07]), vec![0x41, 0x0102, 0x07]);
        assert!(!font.is_word_space(32));
        assert!(matches!(font.shape(0x41), GlyphShape::Greeked));
    }

    #[test]
    fn unembedded_simple_font_is_greeked_except_spaces() {
        let font = simple(&[]);
        assert!(matches!(font.shape(u32::from(b'A')), GlyphShape::Greeked));
        assert!(matches!(font.shape(32), GlyphShape::Blank));
    }
}
