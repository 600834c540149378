//! PDF content stream interpretation and device output.
//!
//! This module contains:
//! - `content`: content stream tokenizer (operators, operands, inline images)
//! - `operator`: the closed set of content operators
//! - `interpreter`: graphics/text state and operator dispatch
//! - `device`: output device trait and the raster device
//! - `image`: image XObject and inline image decoding
//! - `ops`: operator implementations by category

pub mod content;
pub mod device;
pub mod image;
pub mod interpreter;
pub mod operator;
pub mod ops;

// Re-export main types for convenience
pub use content::{ContentItem, PDFContentParser};
pub use device::{PDFDevice, RasterDevice};
pub use interpreter::PDFPageInterpreter;
pub use operator::Operator;
