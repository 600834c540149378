//! Fonts for rendering.
//!
//! - `encoding` - simple-font encodings and glyph names
//! - `glyph` - embedded TrueType/OpenType programs via ttf-parser
//! - `pdffont` - font dictionaries: widths, code decoding, glyph shapes
//! - `latin_enc` - the Latin glyph table behind the base encodings

pub mod encoding;
pub mod glyph;
pub mod latin_enc;
pub mod pdffont;

pub use encoding::{BaseEncoding, Encoding, name2unicode};
pub use glyph::{GlyphProgram, Outline};
pub use pdffont::{GlyphShape, PDFFont};
