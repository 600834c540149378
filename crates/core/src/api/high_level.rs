//! High-level rendering API.
//!
//! Provides the main public entry points:
//! - `open()` / `open_path()` - Parse a document from bytes or a file
//! - `render_page()` - One page as JPEG bytes plus its pixel size
//! - `render_all()` / `render_all_parallel()` - Every page, lazily or on the rayon pool
//! - `rasterize_page()` - One page as raw RGB pixels

use std::fs::File;
use std::path::Path;

use bytes::Bytes;
use memmap2::Mmap;
use rayon::prelude::*;

use super::options::{OpenOptions, RenderOptions};
use super::{Bitmap, RenderAll, RenderedPage};
use crate::document::{PDFDocument, PDFPage};
use crate::encode::encode_jpeg;
use crate::error::{OpenError, RenderError};
use crate::interp::{PDFPageInterpreter, RasterDevice};
use crate::raster::Canvas;
use crate::utils::{Matrix, Rect};

/// Parse a document held in memory with the empty password.
///
/// # Example
/// ```ignore
/// let doc = pdfthumb_core::open(std::fs::read("document.pdf")?)?;
/// println!("{} pages", pdfthumb_core::page_count(&doc));
/// ```
pub fn open(bytes: impl Into<Bytes>) -> Result<PDFDocument, OpenError> {
    open_with_options(bytes, &OpenOptions::default())
}

/// Parse a document held in memory.
pub fn open_with_options(bytes: impl Into<Bytes>, options: &OpenOptions) -> Result<PDFDocument, OpenError> {
    Ok(PDFDocument::with_cache(bytes, &options.password, options.cache_capacity)?)
}

/// Memory-map and parse the file at `path`. The mapping is released when
/// the document is dropped.
pub fn open_path(path: impl AsRef<Path>) -> Result<PDFDocument, OpenError> {
    open_path_with_options(path, &OpenOptions::default())
}

pub fn open_path_with_options(path: impl AsRef<Path>, options: &OpenOptions) -> Result<PDFDocument, OpenError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Err(OpenError::NotAPdf(format!("{} is empty", path.display())));
    }
    // Safety: the file handle remains open for the duration of the map.
    let mmap = unsafe { Mmap::map(&file) }?;
    Ok(PDFDocument::from_mmap(mmap, &options.password, options.cache_capacity)?)
}

/// Number of pages; zero when the page tree is malformed.
pub fn page_count(doc: &PDFDocument) -> usize {
    doc.page_count()
}

/// Render one page to JPEG.
///
/// # Arguments
/// * `page_index` - Zero-based; negative or past-the-end indexes fail with
///   `RenderError::InvalidPageIndex`
/// * `scale` - Pixels per PDF point
/// * `quality` - JPEG quality, clamped to 1..=100
pub fn render_page(doc: &PDFDocument, page_index: i64, scale: f64, quality: u8) -> Result<RenderedPage, RenderError> {
    let options = RenderOptions::default().scale(scale).quality(quality);
    render_page_with_options(doc, page_index, &options)
}

pub fn render_page_with_options(
    doc: &PDFDocument,
    page_index: i64,
    options: &RenderOptions,
) -> Result<RenderedPage, RenderError> {
    let _span = tracing::debug_span!("render_page", page = page_index).entered();
    let canvas = rasterize_canvas(doc, page_index, options)?;
    let data = encode_jpeg(&canvas, options.quality)?;
    let (width, height) = pixel_size(&canvas)?;
    Ok(RenderedPage { data, width, height })
}

/// Render one page to raw RGB pixels.
pub fn rasterize_page(doc: &PDFDocument, page_index: i64, options: &RenderOptions) -> Result<Bitmap, RenderError> {
    let _span = tracing::debug_span!("rasterize_page", page = page_index).entered();
    let canvas = rasterize_canvas(doc, page_index, options)?;
    let (width, height) = pixel_size(&canvas)?;
    Ok(Bitmap {
        data: canvas.into_raw(),
        width,
        height,
    })
}

/// Lazily render every page in order.
pub fn render_all(doc: &PDFDocument, scale: f64, quality: u8) -> RenderAll<'_> {
    RenderAll::new(doc, RenderOptions::default().scale(scale).quality(quality))
}

/// Render every page on the rayon pool. Results are in page order and a
/// failed page does not affect the others.
pub fn render_all_parallel(
    doc: &PDFDocument,
    scale: f64,
    quality: u8,
) -> Vec<(usize, Result<RenderedPage, RenderError>)> {
    let options = RenderOptions::default().scale(scale).quality(quality);
    (0..doc.page_count())
        .into_par_iter()
        .map(|index| (index, render_page_with_options(doc, index as i64, &options)))
        .collect()
}

fn pixel_size(canvas: &Canvas) -> Result<(u32, u32), RenderError> {
    let width = u32::try_from(canvas.width()).map_err(|_| RenderError::Encoding("image too wide".into()))?;
    let height = u32::try_from(canvas.height()).map_err(|_| RenderError::Encoding("image too tall".into()))?;
    Ok((width, height))
}

fn lookup_page(doc: &PDFDocument, page_index: i64) -> Result<std::sync::Arc<PDFPage>, RenderError> {
    let pages = doc.pages().map_err(|err| RenderError::interpreter(0, err))?;
    usize::try_from(page_index)
        .ok()
        .and_then(|i| pages.get(i).cloned())
        .ok_or(RenderError::InvalidPageIndex {
            index: page_index,
            page_count: pages.len(),
        })
}

/// Output size in pixels for a page box; width and height swap for
/// quarter-turn rotations.
pub(crate) fn output_size(page_box: Rect, rotate: i64, scale: f64) -> (usize, usize) {
    let w = ((page_box.2 - page_box.0) * scale).round().max(0.0) as usize;
    let h = ((page_box.3 - page_box.1) * scale).round().max(0.0) as usize;
    if rotate == 90 || rotate == 270 { (h, w) } else { (w, h) }
}

/// Maps default user space to device pixels: page box origin, scale,
/// y-flip and clockwise page rotation.
pub(crate) fn base_matrix(page_box: Rect, rotate: i64, scale: f64) -> Matrix {
    let (x0, y0, x1, y1) = page_box;
    let s = scale;
    match rotate {
        90 => (0.0, s, s, 0.0, -y0 * s, -x0 * s),
        180 => (-s, 0.0, 0.0, s, x1 * s, -y0 * s),
        270 => (0.0, -s, -s, 0.0, y1 * s, x1 * s),
        _ => (s, 0.0, 0.0, -s, -x0 * s, y1 * s),
    }
}

fn rasterize_canvas(doc: &PDFDocument, page_index: i64, options: &RenderOptions) -> Result<Canvas, RenderError> {
    let page = lookup_page(doc, page_index)?;
    if !options.scale.is_finite() || options.scale <= 0.0 {
        return Err(RenderError::Encoding(format!("invalid scale {}", options.scale)));
    }
    let page_box = page.page_box(options.use_crop_box);
    let (width, height) = output_size(page_box, page.rotate, options.scale);
    if width == 0 || height == 0 {
        return Err(RenderError::Encoding(format!("page renders to {width}x{height} pixels")));
    }
    let pixels = (width as u64).saturating_mul(height as u64);
    if pixels > options.max_pixels {
        return Err(RenderError::Encoding(format!(
            "page renders to {width}x{height} pixels, limit is {}",
            options.max_pixels
        )));
    }

    tracing::debug!(page = page_index, width, height, rotate = page.rotate, "rasterizing");
    let mut device = RasterDevice::new(Canvas::new(width, height, options.background), options.anti_alias);
    let ctm = base_matrix(page_box, page.rotate, options.scale);
    PDFPageInterpreter::new(doc, &mut device)
        .process_page(&page, ctm, page_box)
        .map_err(|err| RenderError::interpreter(page_index.max(0) as usize, err))?;
    Ok(device.into_canvas())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::apply_matrix_pt;

    const LETTER: Rect = (0.0, 0.0, 612.0, 792.0);

    #[test]
    fn letter_at_scale_two() {
        assert_eq!(output_size(LETTER, 0, 2.0), (1224, 1584));
        assert_eq!(output_size(LETTER, 90, 2.0), (1584, 1224));
        assert_eq!(output_size(LETTER, 270, 1.0), (792, 612));
    }

    #[test]
    fn unrotated_page_flips_y() {
        let m = base_matrix(LETTER, 0, 1.0);
        assert_eq!(apply_matrix_pt(m, (0.0, 792.0)), (0.0, 0.0));
        assert_eq!(apply_matrix_pt(m, (612.0, 0.0)), (612.0, 792.0));
    }

    #[test]
    fn rotated_corners_land_inside_the_canvas() {
        for rotate in [0, 90, 180, 270] {
            let m = base_matrix((10.0, 20.0, 110.0, 220.0), rotate, 1.0);
            let (w, h) = output_size((10.0, 20.0, 110.0, 220.0), rotate, 1.0);
            for corner in [(10.0, 20.0), (110.0, 20.0), (10.0, 220.0), (110.0, 220.0)] {
                let (x, y) = apply_matrix_pt(m, corner);
                assert!((0.0..=w as f64).contains(&x), "rotate {rotate}: x {x}");
                assert!((0.0..=h as f64).contains(&y), "rotate {rotate}: y {y}");
            }
        }
    }

    #[test]
    fn quarter_turn_puts_page_top_on_the_right() {
        // Rotate 90 turns the page clockwise: the top-left of the page
        // ends up at the top-right of the image.
        let m = base_matrix(LETTER, 90, 1.0);
        assert_eq!(apply_matrix_pt(m, (0.0, 792.0)), (792.0, 0.0));
    }
}
