//! PDF model types - objects, state, color, functions and shadings.
//!
//! This module contains the core PDF data model types:
//! - `objects` - PDF object types (PDFObject, PDFStream, PDFObjRef)
//! - `state` - Graphics and text state (PDFGraphicState, PDFTextState, Color)
//! - `color` - Color spaces and RGB conversion (PDFColorSpace)
//! - `function` - Sampled, exponential and stitching functions
//! - `shading` - Axial and radial shadings

pub mod color;
pub mod function;
pub mod objects;
pub mod shading;
pub mod state;

// Re-export main types for convenience
pub use color::{PDFColorSpace, Rgb};
pub use function::PdfFunction;
pub use objects::{PDFDict, PDFObjRef, PDFObject, PDFStream};
pub use shading::Shading;
pub use state::{Color, PDFGraphicState, PDFTextState};
