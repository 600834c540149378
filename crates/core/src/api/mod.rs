//! High-level API module for rendering PDF pages.
//!
//! This module provides the main public API: opening documents and turning
//! pages into JPEG thumbnails or raw bitmaps.
//!
//! # Example
//!
//! ```ignore
//! use pdfthumb_core::{open, render_page};
//!
//! let doc = open(std::fs::read("document.pdf")?)?;
//! let page = render_page(&doc, 0, 2.0, 80)?;
//! std::fs::write("page-0.jpg", &page.data)?;
//! ```

pub mod high_level;
pub mod options;

use crate::document::PDFDocument;
use crate::error::RenderError;
use options::RenderOptions;

/// A page encoded as JPEG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub data: Vec<u8>,
    /// Pixel width of the encoded image.
    pub width: u32,
    /// Pixel height of the encoded image.
    pub height: u32,
}

/// A page as row-major RGB8 pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Lazy iterator over `(page_index, result)` for every page in order.
#[derive(Debug)]
pub struct RenderAll<'a> {
    doc: &'a PDFDocument,
    options: RenderOptions,
    next: usize,
    count: usize,
}

impl<'a> RenderAll<'a> {
    pub(crate) fn new(doc: &'a PDFDocument, options: RenderOptions) -> Self {
        Self {
            doc,
            options,
            next: 0,
            count: doc.page_count(),
        }
    }
}

impl Iterator for RenderAll<'_> {
    type Item = (usize, Result<RenderedPage, RenderError>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.count {
            return None;
        }
        let index = self.next;
        self.next += 1;
        Some((
            index,
            high_level::render_page_with_options(self.doc, index as i64, &self.options),
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.count - self.next;
        (left, Some(left))
    }
}

impl ExactSizeIterator for RenderAll<'_> {}
