//! Content stream parser.
//!
//! Groups operands with their operator and cuts inline images
//! (`BI ... ID <data> EI`) out of the byte stream.

use super::operator::Operator;
use crate::parser::lexer::{is_delimiter, is_whitespace};
use crate::parser::{Keyword, PSBaseParser, PSToken};
use std::collections::HashMap;

/// One parsed unit of a content stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentItem {
    Op { op: Operator, args: Vec<PSToken> },
    InlineImage { dict: HashMap<String, PSToken>, data: Vec<u8> },
}

/// Frame for array/dict/proc construction.
#[derive(Debug)]
enum Context {
    Array(Vec<PSToken>),
    Dict(Vec<PSToken>),
    Proc(Vec<PSToken>),
}

/// Parser over the concatenation of a page's content streams.
pub struct PDFContentParser<'a> {
    lexer: PSBaseParser<'a>,
    operands: Vec<PSToken>,
    context_stack: Vec<Context>,
    in_inline_dict: bool,
}

/// Joins content streams; a separator keeps tokens from fusing across
/// stream boundaries.
pub fn join_streams(streams: &[Vec<u8>]) -> Vec<u8> {
    let mut data = Vec::with_capacity(streams.iter().map(|s| s.len() + 1).sum());
    for stream in streams {
        data.extend_from_slice(stream);
        data.push(b'\n');
    }
    data
}

impl<'a> PDFContentParser<'a> {
    pub const fn new(data: &'a [u8]) -> Self {
        Self {
            lexer: PSBaseParser::new(data),
            operands: Vec::new(),
            context_stack: Vec::new(),
            in_inline_dict: false,
        }
    }

    fn push_operand(&mut self, token: PSToken) {
        match self.context_stack.last_mut() {
            Some(Context::Array(items) | Context::Dict(items) | Context::Proc(items)) => items.push(token),
            None => self.operands.push(token),
        }
    }

    fn build_dict(items: Vec<PSToken>) -> HashMap<String, PSToken> {
        let mut dict = HashMap::new();
        let mut iter = items.into_iter();
        while let Some(key) = iter.next() {
            if let PSToken::Literal(name) = key
                && let Some(value) = iter.next()
            {
                dict.insert(name, value);
            }
        }
        dict
    }

    /// Byte length of unfiltered inline data when the dictionary gives it.
    fn raw_inline_len(dict: &HashMap<String, PSToken>) -> Option<usize> {
        if dict.contains_key("F") || dict.contains_key("Filter") {
            return None;
        }
        let num = |keys: [&str; 2]| {
            keys.iter()
                .find_map(|k| dict.get(*k))
                .and_then(PSToken::as_number)
                .filter(|n| *n > 0.0)
                .map(|n| n as usize)
        };
        let width = num(["W", "Width"])?;
        let height = num(["H", "Height"])?;
        let mask = matches!(
            dict.get("IM").or_else(|| dict.get("ImageMask")),
            Some(PSToken::Bool(true))
        );
        let bpc = if mask { 1 } else { num(["BPC", "BitsPerComponent"]).unwrap_or(8) };
        let colors = if mask {
            1
        } else {
            match dict.get("CS").or_else(|| dict.get("ColorSpace")) {
                Some(PSToken::Literal(name)) => match name.as_str() {
                    "G" | "DeviceGray" | "CalGray" | "I" | "Indexed" => 1,
                    "RGB" | "DeviceRGB" | "CalRGB" => 3,
                    "CMYK" | "DeviceCMYK" => 4,
                    _ => return None,
                },
                Some(PSToken::Array(items)) if matches!(items.first(), Some(PSToken::Literal(n)) if n == "I" || n == "Indexed") => 1,
                _ => return None,
            }
        };
        Some((width * colors * bpc).div_ceil(8).checked_mul(height)?)
    }

    fn is_ascii85(dict: &HashMap<String, PSToken>) -> bool {
        let is_a85 = |t: &PSToken| matches!(t, PSToken::Literal(n) if n == "A85" || n == "ASCII85Decode");
        match dict.get("F").or_else(|| dict.get("Filter")) {
            Some(PSToken::Array(items)) => items.first().is_some_and(is_a85),
            Some(t) => is_a85(t),
            None => false,
        }
    }

    /// Reads image data after `ID` and consumes the closing `EI`.
    fn read_inline_data(&mut self, dict: &HashMap<String, PSToken>) -> Vec<u8> {
        let data = self.lexer.data();
        let mut start = self.lexer.tell();
        // A single whitespace byte separates ID from the data.
        if data.get(start).copied().is_some_and(is_whitespace) {
            start += 1;
        }

        if let Some(len) = Self::raw_inline_len(dict)
            && let Some(end) = start.checked_add(len).filter(|e| *e <= data.len())
        {
            let mut after = end;
            while data.get(after).copied().is_some_and(is_whitespace) {
                after += 1;
            }
            if data[after..].starts_with(b"EI") {
                self.lexer.set_pos(after + 2);
                return data[start..end].to_vec();
            }
        }

        let mut search = start;
        if Self::is_ascii85(dict)
            && let Some(off) = crate::parser::pdf_parser::memchr_find(&data[start..], b"~>")
        {
            search = start + off + 2;
        }
        let mut pos = search;
        while pos + 1 < data.len() {
            if &data[pos..pos + 2] == b"EI"
                && (pos == start || is_whitespace(data[pos - 1]))
                && data.get(pos + 2).is_none_or(|&b| is_whitespace(b) || is_delimiter(b))
            {
                let mut end = pos;
                if end > start && is_whitespace(data[end - 1]) {
                    end -= 1;
                }
                self.lexer.set_pos(pos + 2);
                return data[start..end.max(start)].to_vec();
            }
            pos += 1;
        }
        tracing::debug!("inline image without EI, taking the rest of the stream");
        self.lexer.set_pos(data.len());
        data[start..].to_vec()
    }

    /// Next operator with its operands, or an inline image.
    pub fn next_item(&mut self) -> Option<ContentItem> {
        loop {
            let token = match self.lexer.next_token()? {
                Ok((_, token)) => token,
                Err(err) => {
                    tracing::trace!(%err, "skipping bad content token");
                    continue;
                }
            };
            let PSToken::Keyword(kw) = token else {
                self.push_operand(token);
                continue;
            };
            match kw {
                Keyword::ArrayStart => self.context_stack.push(Context::Array(Vec::new())),
                Keyword::DictStart => self.context_stack.push(Context::Dict(Vec::new())),
                Keyword::BraceOpen => self.context_stack.push(Context::Proc(Vec::new())),
                Keyword::ArrayEnd | Keyword::DictEnd | Keyword::BraceClose => {
                    let built = match (kw, self.context_stack.pop()) {
                        (Keyword::ArrayEnd, Some(Context::Array(items))) => PSToken::Array(items),
                        (Keyword::DictEnd, Some(Context::Dict(items))) => PSToken::Dict(Self::build_dict(items)),
                        (Keyword::BraceClose, Some(Context::Proc(items))) => PSToken::Array(items),
                        (_, Some(other)) => {
                            // Mismatched closer: keep the open frame.
                            self.context_stack.push(other);
                            continue;
                        }
                        (_, None) => continue,
                    };
                    self.push_operand(built);
                }
                Keyword::Null => self.push_operand(PSToken::Keyword(Keyword::Null)),
                Keyword::BI => {
                    self.in_inline_dict = true;
                    self.context_stack.clear();
                    self.operands.clear();
                }
                Keyword::ID if self.in_inline_dict => {
                    self.in_inline_dict = false;
                    self.context_stack.clear();
                    let dict = Self::build_dict(std::mem::take(&mut self.operands));
                    let data = self.read_inline_data(&dict);
                    return Some(ContentItem::InlineImage { dict, data });
                }
                _ if !self.context_stack.is_empty() => self.push_operand(PSToken::Keyword(kw)),
                _ if self.in_inline_dict => self.operands.push(PSToken::Keyword(kw)),
                kw => {
                    return Some(ContentItem::Op {
                        op: Operator::from_keyword(&kw),
                        args: std::mem::take(&mut self.operands),
                    });
                }
            }
        }
    }
}

impl Iterator for PDFContentParser<'_> {
    type Item = ContentItem;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_item()
    }
}
