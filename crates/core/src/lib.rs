//! pdfthumb - a self-contained PDF page rasterizer.
//!
//! Parses the document structure directly (cross-reference sections, page
//! tree, content streams, fonts and images), paints a page into an RGB
//! canvas and encodes it as JPEG.

pub mod api;
pub mod codec;
pub mod document;
pub mod encode;
pub mod error;
pub mod font;
pub mod interp;
pub mod model;
pub mod parser;
pub mod raster;
pub mod utils;

pub use api::high_level;
pub use api::high_level::{
    open, open_path, open_path_with_options, open_with_options, page_count, rasterize_page,
    render_all, render_all_parallel, render_page, render_page_with_options,
};
pub use api::options::{OpenOptions, RenderOptions};
pub use api::{Bitmap, RenderAll, RenderedPage};

pub use document::{PDFDocument, PDFPage};
pub use error::{OpenError, PdfError, RenderError, Result};
