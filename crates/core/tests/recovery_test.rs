//! Damaged cross-reference information is recovered by scanning the file.

mod common;

use common::{PdfBuilder, pages_builder, pixel};
use pdfthumb_core::RenderOptions;

const RED_SQUARE: &str = "1 0 0 rg 0 0 100 100 re f";

fn two_pages() -> PdfBuilder {
    pages_builder("[0 0 100 100]", &[(RED_SQUARE, ""), ("", "")])
}

fn assert_recovered(data: Vec<u8>) {
    let doc = pdfthumb_core::open(data).expect("recovered");
    assert!(doc.xref().rebuilt);
    assert_eq!(doc.page_count(), 2);
    let bitmap = pdfthumb_core::rasterize_page(&doc, 0, &RenderOptions::new().scale(1.0)).unwrap();
    assert_eq!(pixel(&bitmap.data, bitmap.width, 50, 50), [255, 0, 0]);
}

#[test]
fn startxref_pointing_into_garbage() {
    assert_recovered(two_pages().build_with_startxref(3));
}

#[test]
fn startxref_past_end_of_file() {
    assert_recovered(two_pages().build_with_startxref(1_000_000));
}

#[test]
fn no_xref_table_at_all() {
    assert_recovered(two_pages().build_without_xref());
}

#[test]
fn truncated_before_the_trailer() {
    // No trailer: the catalog is found by its /Type.
    assert_recovered(two_pages().build_truncated());
}

#[test]
fn stale_offsets_fall_back_to_object_scan() {
    let mut data = two_pages().build();
    // Shift every object by inserting bytes after the header; the table
    // now points a few bytes early.
    let at = data.iter().position(|&b| b == b'\n').unwrap() + 1;
    data.splice(at..at, b"%%%%%%%%%%%%\n".iter().copied());
    let doc = pdfthumb_core::open(data).expect("recovered");
    assert_eq!(doc.page_count(), 2);
    let bitmap = pdfthumb_core::rasterize_page(&doc, 0, &RenderOptions::new().scale(1.0)).unwrap();
    assert_eq!(pixel(&bitmap.data, bitmap.width, 50, 50), [255, 0, 0]);
}

#[test]
fn later_definition_wins_when_rebuilding() {
    let mut data = two_pages().build_without_xref();
    data.extend_from_slice(b"4 0 obj\n<< /Length 25 >>\nstream\n0 0 1 rg 0 0 100 100 re f\nendstream\nendobj\n");
    let doc = pdfthumb_core::open(data).unwrap();
    let bitmap = pdfthumb_core::rasterize_page(&doc, 0, &RenderOptions::new().scale(1.0)).unwrap();
    assert_eq!(pixel(&bitmap.data, bitmap.width, 50, 50), [0, 0, 255]);
}

#[test]
fn garbage_is_not_a_pdf() {
    let err = pdfthumb_core::open(b"%PDF-1.4\nnothing useful here\n".to_vec()).unwrap_err();
    assert!(matches!(err, pdfthumb_core::OpenError::NotAPdf(_)), "{err:?}");
}
