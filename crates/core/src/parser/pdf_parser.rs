//! PDF object parser - builds `PDFObject`s from lexer tokens.
//!
//! Indirect references (`n g R`) become unresolved `PDFObject::Ref` values;
//! resolution is the document's job.

use super::lexer::{Keyword, PSBaseParser, PSToken};
use crate::error::{PdfError, Result};
use crate::model::objects::{PDFObjRef, PDFObject, PDFStream};
use bytes::Bytes;
use std::collections::HashMap;

/// PDF Parser - parses PDF object syntax
pub struct PDFParser<'a> {
    base: PSBaseParser<'a>,
    /// Lookahead buffer for tokens
    lookahead: Vec<(usize, PSToken)>,
}

impl<'a> PDFParser<'a> {
    pub const fn new(data: &'a [u8]) -> Self {
        Self {
            base: PSBaseParser::new(data),
            lookahead: Vec::new(),
        }
    }

    /// Parser positioned at `pos` inside `data`.
    pub fn at(data: &'a [u8], pos: usize) -> Self {
        let mut parser = Self::new(data);
        parser.base.set_pos(pos);
        parser
    }

    /// Offset of the next unread token.
    pub fn tell(&self) -> usize {
        self.lookahead
            .last()
            .map_or_else(|| self.base.tell(), |(pos, _)| *pos)
    }

    pub fn data(&self) -> &'a [u8] {
        self.base.data()
    }

    fn next_token(&mut self) -> Result<Option<(usize, PSToken)>> {
        if let Some(tok) = self.lookahead.pop() {
            return Ok(Some(tok));
        }
        self.base.next_token().transpose()
    }

    fn push_back(&mut self, tok: (usize, PSToken)) {
        self.lookahead.push(tok);
    }

    /// Next raw token, used by callers that read `obj`/`stream` keywords.
    pub fn next_raw(&mut self) -> Result<Option<(usize, PSToken)>> {
        self.next_token()
    }

    /// Parse exactly one object.
    pub fn parse_object(&mut self) -> Result<PDFObject> {
        let (pos, token) = self.next_token()?.ok_or(PdfError::UnexpectedEof)?;
        self.token_to_object(pos, token)
    }

    fn token_to_object(&mut self, pos: usize, token: PSToken) -> Result<PDFObject> {
        match token {
            PSToken::Int(n) => Ok(self.maybe_reference(n)),
            PSToken::Real(n) => Ok(PDFObject::Real(n)),
            PSToken::Bool(b) => Ok(PDFObject::Bool(b)),
            PSToken::Literal(s) => Ok(PDFObject::Name(s)),
            PSToken::String(s) => Ok(PDFObject::String(s)),
            PSToken::Keyword(Keyword::Null) => Ok(PDFObject::Null),
            PSToken::Keyword(Keyword::ArrayStart) => self.parse_array(pos),
            PSToken::Keyword(Keyword::DictStart) => self.parse_dict(pos),
            PSToken::Keyword(kw @ (Keyword::ArrayEnd | Keyword::DictEnd)) => {
                Err(PdfError::MalformedObject {
                    pos,
                    msg: format!(
                        "unbalanced `{}`",
                        String::from_utf8_lossy(kw.as_bytes())
                    ),
                })
            }
            PSToken::Keyword(kw) => Err(PdfError::SyntaxError(format!(
                "unexpected keyword `{}` at {pos}",
                String::from_utf8_lossy(kw.as_bytes())
            ))),
            PSToken::Array(_) | PSToken::Dict(_) => Err(PdfError::TokenError {
                pos,
                msg: "unexpected compound token".into(),
            }),
        }
    }

    /// `n g R` or a plain integer.
    fn maybe_reference(&mut self, n: i64) -> PDFObject {
        let Ok(Some(second)) = self.next_token() else {
            return PDFObject::Int(n);
        };
        let (pos2, PSToken::Int(g)) = second else {
            self.push_back(second);
            return PDFObject::Int(n);
        };
        match self.next_token() {
            Ok(Some((_, PSToken::Keyword(Keyword::R))))
                if (0..=i64::from(u32::MAX)).contains(&n) && g >= 0 =>
            {
                PDFObject::Ref(PDFObjRef::new(n as u32, g as u32))
            }
            Ok(Some(third)) => {
                self.push_back(third);
                self.push_back((pos2, PSToken::Int(g)));
                PDFObject::Int(n)
            }
            _ => {
                self.push_back((pos2, PSToken::Int(g)));
                PDFObject::Int(n)
            }
        }
    }

    /// Next token inside a container; lexer errors are skipped so a single
    /// bad number does not lose the whole container.
    fn container_token(&mut self, open: usize, what: &str) -> Result<(usize, PSToken)> {
        loop {
            match self.next_token() {
                Ok(Some(tok)) => return Ok(tok),
                Ok(None) | Err(PdfError::UnexpectedEof) => {
                    return Err(PdfError::MalformedObject {
                        pos: open,
                        msg: format!("unterminated {what}"),
                    });
                }
                Err(err) => tracing::trace!(%err, "skipping bad token"),
            }
        }
    }

    fn parse_array(&mut self, open: usize) -> Result<PDFObject> {
        let mut arr = Vec::new();
        loop {
            let (pos, token) = self.container_token(open, "array")?;
            match token {
                PSToken::Keyword(Keyword::ArrayEnd) => break,
                PSToken::Keyword(Keyword::DictEnd) => {
                    return Err(PdfError::MalformedObject {
                        pos,
                        msg: "`>>` closes an array".into(),
                    });
                }
                token => arr.push(self.token_to_object(pos, token)?),
            }
        }
        Ok(PDFObject::Array(arr))
    }

    fn parse_dict(&mut self, open: usize) -> Result<PDFObject> {
        let mut dict = HashMap::new();
        loop {
            let (pos, token) = self.container_token(open, "dictionary")?;
            let key = match token {
                PSToken::Keyword(Keyword::DictEnd) => break,
                PSToken::Keyword(Keyword::ArrayEnd) => {
                    return Err(PdfError::MalformedObject {
                        pos,
                        msg: "`]` closes a dictionary".into(),
                    });
                }
                PSToken::Literal(name) => name,
                other => {
                    tracing::debug!(pos, ?other, "non-name dictionary key ignored");
                    continue;
                }
            };
            let (vpos, vtok) = self.container_token(open, "dictionary")?;
            if matches!(vtok, PSToken::Keyword(Keyword::DictEnd)) {
                // `/Key >>`: treat the dangling key as null.
                break;
            }
            let value = self.token_to_object(vpos, vtok)?;
            if !value.is_null() {
                dict.insert(key, value);
            }
        }
        Ok(PDFObject::Dict(dict))
    }
}

/// An `n g obj ... endobj` body read from the file.
#[derive(Debug, Clone, PartialEq)]
pub struct IndirectObject {
    pub objid: u32,
    pub genno: u32,
    pub obj: PDFObject,
}

/// Reads the indirect object starting at `pos`.
///
/// `length_of` turns the stream dictionary's `/Length` value into a byte
/// count (it may be an indirect reference the caller knows how to resolve).
/// When `force_scan` is set the declared length is ignored and the body is
/// found by scanning for `endstream`.
pub fn parse_indirect_at(
    data: &Bytes,
    pos: usize,
    force_scan: bool,
    length_of: impl FnOnce(&PDFObject) -> Option<usize>,
) -> Result<IndirectObject> {
    let bytes: &[u8] = data.as_ref();
    if pos >= bytes.len() {
        return Err(PdfError::MalformedObject {
            pos,
            msg: "offset past end of file".into(),
        });
    }
    let mut parser = PDFParser::at(bytes, pos);
    let header_err = |msg: &str| PdfError::MalformedObject {
        pos,
        msg: msg.to_string(),
    };
    let objid = match parser.next_raw()? {
        Some((_, PSToken::Int(n))) if n >= 0 => n as u32,
        _ => return Err(header_err("expected object number")),
    };
    let genno = match parser.next_raw()? {
        Some((_, PSToken::Int(g))) if g >= 0 => g as u32,
        _ => return Err(header_err("expected generation number")),
    };
    match parser.next_raw()? {
        Some((_, PSToken::Keyword(Keyword::Obj))) => {}
        _ => return Err(header_err("expected `obj`")),
    }

    let obj = parser.parse_object()?;
    let PDFObject::Dict(attrs) = obj else {
        return Ok(IndirectObject { objid, genno, obj });
    };

    let after_dict = parser.tell();
    let mut peek = PSBaseParser::new(bytes);
    peek.set_pos(after_dict);
    peek.skip_whitespace();
    if !peek.remaining().starts_with(b"stream") {
        return Ok(IndirectObject {
            objid,
            genno,
            obj: PDFObject::Dict(attrs),
        });
    }

    let start = stream_data_start(bytes, peek.tell() + b"stream".len());
    let declared = if force_scan {
        None
    } else {
        attrs.get("Length").and_then(length_of)
    };
    let (end, _) = stream_extent(bytes, start, declared)?;
    let mut stream = PDFStream::new(attrs, data.slice(start..end));
    stream.set_objid(objid, genno);
    Ok(IndirectObject {
        objid,
        genno,
        obj: PDFObject::Stream(Box::new(stream)),
    })
}

/// Position just after the EOL that follows a `stream` keyword.
pub fn stream_data_start(data: &[u8], after_keyword: usize) -> usize {
    let mut pos = after_keyword;
    while data.get(pos) == Some(&b' ') {
        pos += 1;
    }
    match (data.get(pos), data.get(pos + 1)) {
        (Some(b'\r'), Some(b'\n')) => pos + 2,
        (Some(b'\r' | b'\n'), _) => pos + 1,
        _ => pos,
    }
}

/// True when `endstream` follows `pos` after optional whitespace.
pub fn endstream_follows(data: &[u8], pos: usize) -> bool {
    let mut p = pos;
    while let Some(&b) = data.get(p) {
        if !super::lexer::is_whitespace(b) {
            break;
        }
        p += 1;
    }
    data.get(p..).is_some_and(|rest| rest.starts_with(b"endstream"))
}

/// Scans for `endstream` and returns `(data_end, after_keyword)`. The EOL
/// right before the keyword is not part of the data.
pub fn find_endstream(data: &[u8], start: usize) -> Option<(usize, usize)> {
    let hay = data.get(start..)?;
    let rel = memchr_find(hay, b"endstream")?;
    let kw = start + rel;
    let mut end = kw;
    if end > start && data[end - 1] == b'\n' {
        end -= 1;
    }
    if end > start && data[end - 1] == b'\r' {
        end -= 1;
    }
    Some((end, kw + b"endstream".len()))
}

/// Locates the stream body that starts at `start`. A declared length is used
/// when it lands on `endstream`; otherwise the data is scanned.
pub fn stream_extent(data: &[u8], start: usize, declared: Option<usize>) -> Result<(usize, usize)> {
    if let Some(len) = declared
        && let Some(end) = start.checked_add(len)
        && end <= data.len()
        && endstream_follows(data, end)
    {
        return Ok((end, end));
    }
    match find_endstream(data, start) {
        Some((end, after)) => {
            if declared.is_some() {
                tracing::debug!(start, ?declared, actual = end - start, "stream /Length mismatch");
            }
            Ok((end, after))
        }
        None => {
            // Truncated file: take whatever is left.
            let end = declared
                .and_then(|len| start.checked_add(len))
                .map_or(data.len(), |e| e.min(data.len()));
            if end < start {
                return Err(PdfError::MalformedObject {
                    pos: start,
                    msg: "stream without data".into(),
                });
            }
            tracing::warn!(start, "stream has no endstream keyword");
            Ok((end, end))
        }
    }
}

pub(crate) fn memchr_find(hay: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || hay.len() < needle.len() {
        return None;
    }
    hay.windows(needle.len()).position(|w| w == needle)
}

pub(crate) fn memchr_rfind(hay: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || hay.len() < needle.len() {
        return None;
    }
    hay.windows(needle.len()).rposition(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &[u8]) -> Result<PDFObject> {
        PDFParser::new(src).parse_object()
    }

    #[test]
    fn reference_becomes_ref() {
        assert_eq!(
            parse(b"12 0 R").unwrap(),
            PDFObject::Ref(PDFObjRef::new(12, 0))
        );
    }

    #[test]
    fn integers_are_not_references_without_r() {
        let mut p = PDFParser::new(b"[1 2 3]");
        let arr = p.parse_object().unwrap();
        assert_eq!(
            arr,
            PDFObject::Array(vec![PDFObject::Int(1), PDFObject::Int(2), PDFObject::Int(3)])
        );
    }

    #[test]
    fn nested_dict() {
        let obj = parse(b"<< /Type /Page /Kids [3 0 R 4 0 R] /Box [0 0 612 792.5] >>").unwrap();
        let d = obj.as_dict().unwrap();
        assert_eq!(d["Type"], PDFObject::Name("Page".into()));
        assert_eq!(d["Kids"].as_array().unwrap().len(), 2);
        assert_eq!(d["Box"].as_array().unwrap()[3], PDFObject::Real(792.5));
    }

    #[test]
    fn unbalanced_brackets_are_malformed() {
        assert!(matches!(parse(b"[1 2"), Err(PdfError::MalformedObject { .. })));
        assert!(matches!(parse(b"<< /A 1"), Err(PdfError::MalformedObject { .. })));
        assert!(matches!(parse(b"]"), Err(PdfError::MalformedObject { .. })));
        assert!(matches!(parse(b"[1 >>"), Err(PdfError::MalformedObject { .. })));
        assert!(matches!(parse(b"<< /A ]"), Err(PdfError::MalformedObject { .. })));
    }

    #[test]
    fn null_values_drop_from_dicts() {
        let obj = parse(b"<< /A null /B 2 >>").unwrap();
        assert!(!obj.as_dict().unwrap().contains_key("A"));
    }

    #[test]
    fn indirect_stream_object() {
        let data = Bytes::from_static(b"7 0 obj\n<< /Length 5 >>\nstream\nHELLO\nendstream\nendobj");
        let ind = parse_indirect_at(&data, 0, false, |l| l.as_int().ok().map(|n| n as usize)).unwrap();
        assert_eq!((ind.objid, ind.genno), (7, 0));
        let stream = ind.obj.as_stream().unwrap();
        assert_eq!(stream.get_rawdata(), b"HELLO");
        assert_eq!(stream.objid, Some(7));
    }

    #[test]
    fn indirect_object_header_is_checked() {
        let data = Bytes::from_static(b"7 0 foo 1 endobj");
        assert!(matches!(
            parse_indirect_at(&data, 0, false, |_| None),
            Err(PdfError::MalformedObject { .. })
        ));
    }

    #[test]
    fn trusted_length_and_fallback_scan() {
        let data = b"stream\r\nHELLO\nendstream";
        let start = stream_data_start(data, 6);
        assert_eq!(start, 8);
        assert_eq!(stream_extent(data, start, Some(5)).unwrap().0, 13);
        // Wrong length falls back to the scan and trims the EOL.
        assert_eq!(stream_extent(data, start, Some(99)).unwrap().0, 13);
        assert_eq!(stream_extent(data, start, None).unwrap().0, 13);
    }
}
