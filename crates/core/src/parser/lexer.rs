//! PostScript-style tokenizer shared by the object parser and the
//! content-stream interpreter.
//!
//! The lexer never consumes more than one token per call. Whitespace and
//! `%` comments are skipped transparently.

use crate::error::{PdfError, Result};
use smallvec::SmallVec;
use std::collections::HashMap;

/// Bare words that are not numbers, names, strings or booleans.
///
/// Structural words used by the file syntax get their own variant; every
/// other word (content operators included) is carried as raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Keyword {
    ArrayStart, // [
    ArrayEnd,   // ]
    DictStart,  // <<
    DictEnd,    // >>
    BraceOpen,  // {
    BraceClose, // }
    Null,
    Obj,
    EndObj,
    R,
    Stream,
    EndStream,
    XRef,
    Trailer,
    StartXRef,
    BI,
    ID,
    EI,
    Other(SmallVec<[u8; 8]>),
}

impl Keyword {
    pub fn from_bytes(b: &[u8]) -> Self {
        match b {
            b"[" => Self::ArrayStart,
            b"]" => Self::ArrayEnd,
            b"<<" => Self::DictStart,
            b">>" => Self::DictEnd,
            b"{" => Self::BraceOpen,
            b"}" => Self::BraceClose,
            b"null" => Self::Null,
            b"obj" => Self::Obj,
            b"endobj" => Self::EndObj,
            b"R" => Self::R,
            b"stream" => Self::Stream,
            b"endstream" => Self::EndStream,
            b"xref" => Self::XRef,
            b"trailer" => Self::Trailer,
            b"startxref" => Self::StartXRef,
            b"BI" => Self::BI,
            b"ID" => Self::ID,
            b"EI" => Self::EI,
            other => Self::Other(SmallVec::from_slice(other)),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::ArrayStart => b"[",
            Self::ArrayEnd => b"]",
            Self::DictStart => b"<<",
            Self::DictEnd => b">>",
            Self::BraceOpen => b"{",
            Self::BraceClose => b"}",
            Self::Null => b"null",
            Self::Obj => b"obj",
            Self::EndObj => b"endobj",
            Self::R => b"R",
            Self::Stream => b"stream",
            Self::EndStream => b"endstream",
            Self::XRef => b"xref",
            Self::Trailer => b"trailer",
            Self::StartXRef => b"startxref",
            Self::BI => b"BI",
            Self::ID => b"ID",
            Self::EI => b"EI",
            Self::Other(bytes) => bytes.as_slice(),
        }
    }
}

/// PostScript token types
#[derive(Debug, Clone, PartialEq)]
pub enum PSToken {
    /// Integer value
    Int(i64),
    /// Floating point value
    Real(f64),
    /// Boolean value
    Bool(bool),
    /// Literal name (e.g., /Name)
    Literal(String),
    /// Keyword/operator (e.g., obj, BT, re)
    Keyword(Keyword),
    /// String (literal or hex)
    String(Vec<u8>),
    /// Array, built by the content parser
    Array(Vec<PSToken>),
    /// Dictionary, built by the content parser
    Dict(HashMap<String, PSToken>),
}

impl PSToken {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Real(n) => Some(*n),
            _ => None,
        }
    }
}

/// Byte-level tokenizer.
pub struct PSBaseParser<'a> {
    data: &'a [u8],
    pos: usize,
}

#[inline]
pub(crate) const fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | b'\x00' | b'\x0c')
}

#[inline]
pub(crate) const fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

#[inline]
const fn is_keyword_end(b: u8) -> bool {
    is_whitespace(b) || is_delimiter(b)
}

const fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Names are byte strings; each byte maps to one char so that `#xx` escapes
/// survive a round trip.
pub(crate) fn name_from_bytes(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

impl<'a> PSBaseParser<'a> {
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current position in stream
    pub const fn tell(&self) -> usize {
        self.pos
    }

    /// Set current position in stream.
    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos.min(self.data.len());
    }

    /// Remaining unparsed data
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    pub const fn data(&self) -> &'a [u8] {
        self.data
    }

    fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.data.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    /// Skip whitespace and comments.
    pub fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if b == b'%' {
                while let Some(c) = self.peek() {
                    if c == b'\r' || c == b'\n' {
                        break;
                    }
                    self.pos += 1;
                }
                continue;
            }
            if !is_whitespace(b) {
                return;
            }
            self.pos += 1;
        }
    }

    fn parse_literal(&mut self) -> PSToken {
        self.pos += 1;
        let mut name = Vec::new();
        while let Some(b) = self.peek() {
            if is_keyword_end(b) {
                break;
            }
            if b == b'#'
                && let (Some(h), Some(l)) = (
                    self.peek_at(1).and_then(hex_value),
                    self.peek_at(2).and_then(hex_value),
                )
            {
                name.push((h << 4) | l);
                self.pos += 3;
                continue;
            }
            name.push(b);
            self.pos += 1;
        }
        PSToken::Literal(name_from_bytes(&name))
    }

    fn parse_number(&mut self) -> Result<PSToken> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+') {
                self.pos += 1;
            } else {
                break;
            }
        }
        let text = &self.data[start..self.pos];
        // Some producers emit a doubled sign ("--5"); the first one is noise.
        let trimmed = match text {
            [b'-' | b'+', b'-' | b'+', ..] => &text[1..],
            _ => text,
        };
        let invalid = || PdfError::TokenError {
            pos: start,
            msg: format!("invalid number: {}", String::from_utf8_lossy(text)),
        };
        let s = std::str::from_utf8(trimmed).map_err(|_| invalid())?;
        if s.contains('.') {
            let s = s.strip_suffix('.').unwrap_or(s);
            let s = if matches!(s, "" | "-" | "+") { "0" } else { s };
            s.parse::<f64>().map(PSToken::Real).map_err(|_| invalid())
        } else {
            s.parse::<i64>()
                .map(PSToken::Int)
                .or_else(|_| s.parse::<f64>().map(PSToken::Real))
                .map_err(|_| invalid())
        }
    }

    fn parse_string(&mut self) -> Result<PSToken> {
        self.pos += 1;
        let mut out = Vec::new();
        let mut depth = 1usize;
        loop {
            let Some(b) = self.advance() else {
                return Err(PdfError::UnexpectedEof);
            };
            match b {
                b'(' => {
                    depth += 1;
                    out.push(b);
                }
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                    out.push(b);
                }
                b'\\' => {
                    let Some(esc) = self.advance() else {
                        return Err(PdfError::UnexpectedEof);
                    };
                    match esc {
                        b'n' => out.push(b'\n'),
                        b'r' => out.push(b'\r'),
                        b't' => out.push(b'\t'),
                        b'b' => out.push(0x08),
                        b'f' => out.push(0x0c),
                        b'\r' => {
                            if self.peek() == Some(b'\n') {
                                self.pos += 1;
                            }
                        }
                        b'\n' => {}
                        b'0'..=b'7' => {
                            let mut value = u32::from(esc - b'0');
                            for _ in 0..2 {
                                match self.peek() {
                                    Some(d @ b'0'..=b'7') => {
                                        value = value * 8 + u32::from(d - b'0');
                                        self.pos += 1;
                                    }
                                    _ => break,
                                }
                            }
                            out.push((value & 0xff) as u8);
                        }
                        other => out.push(other),
                    }
                }
                other => out.push(other),
            }
        }
        Ok(PSToken::String(out))
    }

    fn parse_hex_string(&mut self) -> Result<PSToken> {
        self.pos += 1;
        let mut out = Vec::new();
        let mut pending: Option<u8> = None;
        loop {
            let Some(b) = self.advance() else {
                return Err(PdfError::UnexpectedEof);
            };
            if b == b'>' {
                break;
            }
            if let Some(v) = hex_value(b) {
                match pending.take() {
                    Some(high) => out.push((high << 4) | v),
                    None => pending = Some(v),
                }
            }
        }
        if let Some(high) = pending {
            out.push(high << 4);
        }
        Ok(PSToken::String(out))
    }

    fn parse_keyword(&mut self) -> PSToken {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if is_keyword_end(b) {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            // A stray delimiter such as ')' or a lone '>'.
            self.pos += 1;
        }
        let bytes = &self.data[start..self.pos];
        match bytes {
            b"true" => PSToken::Bool(true),
            b"false" => PSToken::Bool(false),
            _ => PSToken::Keyword(Keyword::from_bytes(bytes)),
        }
    }

    /// Returns the next token with its starting offset, or `None` at end of input.
    pub fn next_token(&mut self) -> Option<Result<(usize, PSToken)>> {
        self.skip_whitespace();
        let start = self.pos;
        let b = self.peek()?;
        let token = match b {
            b'/' => Ok(self.parse_literal()),
            b'(' => self.parse_string(),
            b'<' if self.peek_at(1) == Some(b'<') => {
                self.pos += 2;
                Ok(PSToken::Keyword(Keyword::DictStart))
            }
            b'<' => self.parse_hex_string(),
            b'>' if self.peek_at(1) == Some(b'>') => {
                self.pos += 2;
                Ok(PSToken::Keyword(Keyword::DictEnd))
            }
            b'[' => {
                self.pos += 1;
                Ok(PSToken::Keyword(Keyword::ArrayStart))
            }
            b']' => {
                self.pos += 1;
                Ok(PSToken::Keyword(Keyword::ArrayEnd))
            }
            b'{' => {
                self.pos += 1;
                Ok(PSToken::Keyword(Keyword::BraceOpen))
            }
            b'}' => {
                self.pos += 1;
                Ok(PSToken::Keyword(Keyword::BraceClose))
            }
            b'+' | b'-' | b'.' => {
                if matches!(self.peek_at(1), Some(c) if c.is_ascii_digit() || matches!(c, b'.' | b'-'))
                {
                    self.parse_number()
                } else {
                    Ok(self.parse_keyword())
                }
            }
            c if c.is_ascii_digit() => self.parse_number(),
            _ => Ok(self.parse_keyword()),
        };
        if token.is_err() && self.pos == start {
            self.pos += 1;
        }
        Some(token.map(|t| (start, t)))
    }
}
