//! Tokenizer and object parser.
//!
//! - `lexer`: byte-level PostScript tokenizer
//! - `pdf_parser`: PDF object syntax and stream extents

pub mod lexer;
pub mod pdf_parser;

pub use lexer::{Keyword, PSBaseParser, PSToken};
pub use pdf_parser::PDFParser;
