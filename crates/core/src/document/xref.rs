//! Cross-reference resolution.
//!
//! Sections are read newest first, starting at `startxref` and following
//! `/Prev`. An id already present is never overwritten, so later updates
//! shadow earlier ones. When the chain is unusable the whole file is scanned
//! for `N G obj` headers instead.

use crate::codec::filters::{Decoded, decode_pipeline, filter_chain};
use crate::error::{PdfError, Result};
use crate::model::objects::{PDFDict, PDFObject};
use crate::parser::lexer::{Keyword, PSBaseParser, PSToken};
use crate::parser::pdf_parser::{PDFParser, memchr_rfind, parse_indirect_at};
use crate::utils::nunpack;
use bytes::Bytes;
use itertools::Itertools;
use regex::bytes::Regex;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::LazyLock;

static OBJ_HEADER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(\d+)\s+(\d+)\s+obj\b").ok());

/// Where an object lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XRefEntry {
    /// Byte offset of `N G obj` in the file.
    InFile { offset: usize, genno: u32 },
    /// Position inside an object stream.
    InStream { stream_objid: u32, index: usize },
}

/// One parsed section (a classic table or an xref stream).
#[derive(Debug, Default, Clone)]
pub struct XRefSection {
    pub entries: Vec<(u32, Option<XRefEntry>)>,
    pub trailer: PDFDict,
}

/// Merged view over every section.
#[derive(Debug, Default, Clone)]
pub struct XRefTable {
    entries: FxHashMap<u32, XRefEntry>,
    /// Ids marked free by a newer section; older entries do not revive them.
    free: FxHashSet<u32>,
    /// Trailer keys merged newest first.
    pub trailer: PDFDict,
    /// Built by scanning the file rather than from `startxref`.
    pub rebuilt: bool,
    /// Object streams seen during a rebuild, indexed once decryption is set up.
    pub objstm_candidates: Vec<u32>,
    /// Catalog candidates seen during a rebuild (`/Type /Catalog`).
    pub catalog_candidates: Vec<u32>,
}

impl XRefTable {
    pub fn get(&self, objid: u32) -> Option<XRefEntry> {
        self.entries.get(&objid).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Known object ids in ascending order.
    pub fn objids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.entries.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Adds an older section underneath what is already present.
    pub fn merge_older(&mut self, section: XRefSection) {
        for (objid, entry) in section.entries {
            if self.entries.contains_key(&objid) || self.free.contains(&objid) {
                continue;
            }
            match entry {
                Some(e) => {
                    self.entries.insert(objid, e);
                }
                None => {
                    self.free.insert(objid);
                }
            }
        }
        for (key, value) in section.trailer {
            self.trailer.entry(key).or_insert(value);
        }
    }

    /// Inserts an entry only when the id is unknown.
    pub fn insert_if_absent(&mut self, objid: u32, entry: XRefEntry) {
        self.entries.entry(objid).or_insert(entry);
    }
}

/// Offset recorded after the last `startxref` in the final 1024 bytes.
pub fn find_startxref(data: &[u8]) -> Option<usize> {
    let tail_start = data.len().saturating_sub(1024);
    let tail = &data[tail_start..];
    let at = memchr_rfind(tail, b"startxref")? + tail_start;
    let mut lexer = PSBaseParser::new(data);
    lexer.set_pos(at + b"startxref".len());
    match lexer.next_token() {
        Some(Ok((_, PSToken::Int(n)))) if n >= 0 => Some(n as usize),
        _ => None,
    }
}

/// Follows `startxref` and the `/Prev` chain. Hybrid files get their
/// `/XRefStm` section right after the table that names it.
pub fn load_chain(data: &Bytes, start: usize) -> Result<XRefTable> {
    let mut table = XRefTable::default();
    let mut visited = FxHashSet::default();
    let mut next = Some(start);

    while let Some(pos) = next.take() {
        if !visited.insert(pos) {
            tracing::warn!(pos, "xref /Prev loop");
            break;
        }
        let section = match load_section_at(data, pos) {
            Ok(section) => section,
            // The newest section must parse; a broken older one only ends the chain.
            Err(err) if table.trailer.is_empty() => return Err(err),
            Err(err) => {
                tracing::warn!(pos, %err, "ignoring unreadable older xref section");
                break;
            }
        };
        let int_at = |key: &str| {
            section
                .trailer
                .get(key)
                .and_then(|v| v.as_int().ok())
                .and_then(|n| usize::try_from(n).ok())
        };
        let xref_stm = int_at("XRefStm");
        next = int_at("Prev");
        table.merge_older(section);

        if let Some(stm_pos) = xref_stm
            && visited.insert(stm_pos)
        {
            match load_stream_section(data, stm_pos) {
                Ok(stm) => table.merge_older(XRefSection {
                    entries: stm.entries,
                    trailer: PDFDict::new(),
                }),
                Err(err) => tracing::debug!(stm_pos, %err, "hybrid /XRefStm unreadable"),
            }
        }
    }
    Ok(table)
}

/// Reads one section, deciding between a table and a stream by the bytes at `pos`.
pub fn load_section_at(data: &Bytes, pos: usize) -> Result<XRefSection> {
    let bytes: &[u8] = data.as_ref();
    let mut lexer = PSBaseParser::new(bytes);
    lexer.set_pos(pos);
    lexer.skip_whitespace();
    if lexer.remaining().starts_with(b"xref") {
        load_table_section(bytes, lexer.tell())
    } else {
        load_stream_section(data, lexer.tell())
    }
}

fn syntax(msg: impl Into<String>) -> PdfError {
    PdfError::SyntaxError(msg.into())
}

/// Classic `xref` table followed by `trailer << ... >>`.
fn load_table_section(data: &[u8], pos: usize) -> Result<XRefSection> {
    let mut parser = PDFParser::at(data, pos + b"xref".len());
    let mut section = XRefSection::default();

    loop {
        let first = match parser.next_raw()? {
            Some((_, PSToken::Keyword(Keyword::Trailer))) => break,
            Some((_, PSToken::Int(n))) if n >= 0 => n as u32,
            Some((at, other)) => return Err(syntax(format!("unexpected {other:?} in xref table at {at}"))),
            None => return Err(syntax("xref table has no trailer")),
        };
        let count = match parser.next_raw()? {
            Some((_, PSToken::Int(n))) if n >= 0 => n as u32,
            _ => return Err(syntax("xref subsection without count")),
        };
        let mut base = first;
        for i in 0..count {
            let offset = match parser.next_raw()? {
                Some((_, PSToken::Int(n))) => n,
                _ => return Err(syntax("truncated xref entry")),
            };
            let genno = match parser.next_raw()? {
                Some((_, PSToken::Int(n))) => n,
                _ => return Err(syntax("truncated xref entry")),
            };
            let in_use = match parser.next_raw()? {
                Some((_, PSToken::Keyword(Keyword::Other(k)))) => k.as_slice() == b"n",
                _ => return Err(syntax("xref entry without n/f marker")),
            };
            // Writers that start the first subsection at 1 but still list the
            // object 0 free entry are off by one.
            if i == 0 && base > 0 && !in_use && offset == 0 && genno == 65535 {
                base -= 1;
            }
            let objid = base.saturating_add(i);
            let entry = (in_use && offset > 0).then(|| XRefEntry::InFile {
                offset: offset as usize,
                genno: genno.clamp(0, i64::from(u32::MAX)) as u32,
            });
            if objid != 0 {
                section.entries.push((objid, entry));
            }
        }
    }

    let trailer = parser.parse_object()?;
    section.trailer = trailer.as_dict()?.clone();
    Ok(section)
}

/// Cross-reference stream (`/Type /XRef`).
fn load_stream_section(data: &Bytes, pos: usize) -> Result<XRefSection> {
    let indirect = parse_indirect_at(data, pos, false, |len| {
        len.as_int().ok().and_then(|n| usize::try_from(n).ok())
    })?;
    let stream = indirect.obj.as_stream()?;
    if !indirect.obj.is_name_at("Type", "XRef") {
        return Err(syntax(format!("object at {pos} is not an xref stream")));
    }

    let widths = stream
        .get("W")
        .ok_or_else(|| syntax("xref stream without /W"))?
        .as_array()?
        .iter()
        .map(|w| w.as_int().map(|n| n.clamp(0, 8) as usize))
        .collect::<Result<Vec<_>>>()?;
    let [w0, w1, w2] = widths[..] else {
        return Err(syntax("/W must have three entries"));
    };
    let entry_size = w0 + w1 + w2;
    if entry_size == 0 {
        return Err(syntax("/W describes empty entries"));
    }

    let size = stream.get("Size").and_then(|s| s.as_int().ok()).unwrap_or(0).max(0) as u32;
    let index: Vec<(u32, u32)> = match stream.get("Index").map(PDFObject::as_numbers) {
        Some(Ok(nums)) => nums
            .into_iter()
            .tuples()
            .map(|(first, count)| (first.max(0.0) as u32, count.max(0.0) as u32))
            .collect(),
        _ => vec![(0, size)],
    };

    let chain = filter_chain(stream.get("Filter"), stream.get("DecodeParms"));
    let decoded = match decode_pipeline(stream.get_rawdata().to_vec(), &chain)? {
        Decoded { image_filter: Some((filter, _)), .. } => {
            return Err(PdfError::UnsupportedFilter(format!("{filter:?} in xref stream")));
        }
        Decoded { data, .. } => data,
    };

    let mut section = XRefSection::default();
    let mut rows = decoded.chunks_exact(entry_size);
    'outer: for (first, count) in index {
        for i in 0..count {
            let Some(row) = rows.next() else {
                break 'outer;
            };
            let objid = first.saturating_add(i);
            let kind = if w0 == 0 { 1 } else { nunpack(&row[..w0], 1) };
            let f1 = nunpack(&row[w0..w0 + w1], 0);
            let f2 = nunpack(&row[w0 + w1..], 0);
            let entry = match kind {
                0 => None,
                1 => Some(XRefEntry::InFile {
                    offset: f1 as usize,
                    genno: f2 as u32,
                }),
                2 => Some(XRefEntry::InStream {
                    stream_objid: f1 as u32,
                    index: f2 as usize,
                }),
                // Unknown types are references to the null object.
                _ => continue,
            };
            if objid != 0 {
                section.entries.push((objid, entry));
            }
        }
    }

    for (key, value) in &stream.attrs {
        if !matches!(key.as_str(), "Length" | "Filter" | "DecodeParms" | "W" | "Index" | "Type") {
            section.trailer.insert(key.clone(), value.clone());
        }
    }
    Ok(section)
}

fn parse_u32(bytes: &[u8]) -> Option<u32> {
    std::str::from_utf8(bytes).ok()?.parse().ok()
}

/// Brute-force recovery: every `N G obj` header in the file, later
/// definitions winning, plus the last parseable `trailer` dictionary.
pub fn rebuild(data: &Bytes) -> Result<XRefTable> {
    let bytes: &[u8] = data.as_ref();
    let re = OBJ_HEADER
        .as_ref()
        .ok_or_else(|| syntax("object header pattern failed to compile"))?;

    let mut table = XRefTable {
        rebuilt: true,
        ..XRefTable::default()
    };
    for caps in re.captures_iter(bytes) {
        let (Some(whole), Some(id), Some(gen_)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        // A digit run directly before the match belongs to another token.
        if whole.start() > 0 && bytes[whole.start() - 1].is_ascii_digit() {
            continue;
        }
        let (Some(objid), Some(genno)) = (parse_u32(id.as_bytes()), parse_u32(gen_.as_bytes())) else {
            continue;
        };
        table.entries.insert(
            objid,
            XRefEntry::InFile {
                offset: whole.start(),
                genno,
            },
        );
    }
    if table.entries.is_empty() {
        return Err(PdfError::NoValidXRef);
    }

    // Classify objects for the document to finish recovery.
    for objid in table.objids() {
        let Some(XRefEntry::InFile { offset, .. }) = table.get(objid) else {
            continue;
        };
        let mut parser = PDFParser::at(bytes, offset);
        let header_ok = matches!(parser.next_raw(), Ok(Some((_, PSToken::Int(_)))))
            && matches!(parser.next_raw(), Ok(Some((_, PSToken::Int(_)))))
            && matches!(parser.next_raw(), Ok(Some((_, PSToken::Keyword(Keyword::Obj)))));
        if !header_ok {
            continue;
        }
        let Ok(obj) = parser.parse_object() else {
            continue;
        };
        if obj.is_name_at("Type", "Catalog") {
            table.catalog_candidates.push(objid);
        } else if obj.is_name_at("Type", "ObjStm") {
            table.objstm_candidates.push(objid);
        }
    }

    table.trailer = last_trailer(bytes).unwrap_or_default();
    tracing::debug!(
        objects = table.len(),
        objstms = table.objstm_candidates.len(),
        has_trailer = !table.trailer.is_empty(),
        "rebuilt cross-reference table"
    );
    Ok(table)
}

/// The last `trailer` keyword followed by a parseable dictionary.
fn last_trailer(data: &[u8]) -> Option<PDFDict> {
    let mut end = data.len();
    while let Some(at) = memchr_rfind(&data[..end], b"trailer") {
        let mut parser = PDFParser::at(data, at + b"trailer".len());
        if let Ok(PDFObject::Dict(d)) = parser.parse_object()
            && d.contains_key("Root")
        {
            return Some(d);
        }
        end = at;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startxref_uses_last_occurrence() {
        let data = b"%PDF-1.4\nstartxref\n5\n%%EOF\nstartxref\n42\n%%EOF\n";
        assert_eq!(find_startxref(data), Some(42));
        assert_eq!(find_startxref(b"%PDF-1.4 nothing"), None);
    }

    #[test]
    fn classic_table_with_off_by_one_subsection() {
        let data = Bytes::from_static(
            b"xref\n1 3\n0000000000 65535 f \n0000000017 00000 n \n0000000081 00000 n \ntrailer\n<< /Size 3 /Root 1 0 R >>\n",
        );
        let section = load_section_at(&data, 0).unwrap();
        assert_eq!(
            section.entries,
            vec![
                (1, Some(XRefEntry::InFile { offset: 17, genno: 0 })),
                (2, Some(XRefEntry::InFile { offset: 81, genno: 0 })),
            ]
        );
        assert!(section.trailer.contains_key("Root"));
    }

    #[test]
    fn newer_sections_shadow_older_ones() {
        let mut table = XRefTable::default();
        table.merge_older(XRefSection {
            entries: vec![
                (1, Some(XRefEntry::InFile { offset: 500, genno: 0 })),
                (3, None),
            ],
            trailer: PDFDict::from([("Size".to_string(), PDFObject::Int(4))]),
        });
        table.merge_older(XRefSection {
            entries: vec![
                (1, Some(XRefEntry::InFile { offset: 10, genno: 0 })),
                (2, Some(XRefEntry::InFile { offset: 20, genno: 0 })),
                (3, Some(XRefEntry::InFile { offset: 30, genno: 0 })),
            ],
            trailer: PDFDict::from([("Size".to_string(), PDFObject::Int(3))]),
        });
        assert_eq!(table.get(1), Some(XRefEntry::InFile { offset: 500, genno: 0 }));
        assert_eq!(table.get(2), Some(XRefEntry::InFile { offset: 20, genno: 0 }));
        assert_eq!(table.get(3), None);
        assert_eq!(table.trailer["Size"], PDFObject::Int(4));
    }

    #[test]
    fn rebuild_finds_objects_and_trailer() {
        let data = Bytes::from_static(
            b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n2 0 obj\n<< /Type /Pages /Kids [] /Count 0 >>\nendobj\n1 0 obj\n<< /Type /Catalog /Pages 2 0 R /V 2 >>\nendobj\ntrailer\n<< /Root 1 0 R >>\n",
        );
        let table = rebuild(&data).unwrap();
        assert!(table.rebuilt);
        let Some(XRefEntry::InFile { offset, .. }) = table.get(1) else {
            panic!("object 1 missing");
        };
        // The later definition wins.
        assert!(data[offset..].starts_with(b"1 0 obj\n<< /Type /Catalog /Pages 2 0 R /V 2"));
        assert_eq!(table.catalog_candidates, vec![1]);
        assert!(table.trailer.contains_key("Root"));
    }

    #[test]
    fn rebuild_without_objects_fails() {
        assert!(matches!(
            rebuild(&Bytes::from_static(b"%PDF-1.4 just text")),
            Err(PdfError::NoValidXRef)
        ));
    }
}
