mod common;

use common::{PdfBuilder, assert_near, pages_builder, pixel, single_page, single_page_with, zlib};
use pdfthumb_core::{Bitmap, PDFDocument, RenderError, RenderOptions};

const SQUARE: &str = "[0 0 100 100]";
const WHITE: [u8; 3] = [255, 255, 255];
const BLACK: [u8; 3] = [0, 0, 0];
const RED: [u8; 3] = [255, 0, 0];
const GREEN: [u8; 3] = [0, 255, 0];
const BLUE: [u8; 3] = [0, 0, 255];

fn rasterize(doc: &PDFDocument, page: i64) -> Bitmap {
    pdfthumb_core::rasterize_page(doc, page, &RenderOptions::new().scale(1.0)).expect("rasterize")
}

fn render_one(data: Vec<u8>) -> Bitmap {
    rasterize(&pdfthumb_core::open(data).expect("open"), 0)
}

/// Pixel at a point given in default user space of a 100x100 page.
fn at(bitmap: &Bitmap, x: u32, y: u32) -> [u8; 3] {
    pixel(&bitmap.data, bitmap.width, x, bitmap.height - 1 - y)
}

#[test]
fn letter_page_at_default_scale() {
    let doc = pdfthumb_core::open(single_page("[0 0 612 792]", "")).unwrap();
    let rendered = pdfthumb_core::render_page(&doc, 0, 2.0, 80).unwrap();
    assert_eq!((rendered.width, rendered.height), (1224, 1584));
    assert_eq!(&rendered.data[..3], &[0xFF, 0xD8, 0xFF]);
    let decoded = image::load_from_memory(&rendered.data).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (1224, 1584));
}

#[test]
fn rendering_is_deterministic() {
    let doc = pdfthumb_core::open(single_page(SQUARE, "1 0 0 rg 10 10 50 50 re f 0 g 5 w 0 0 m 100 100 l S")).unwrap();
    let a = pdfthumb_core::render_page(&doc, 0, 1.5, 90).unwrap();
    let b = pdfthumb_core::render_page(&doc, 0, 1.5, 90).unwrap();
    assert_eq!(a.data, b.data);
}

#[test]
fn fill_lands_in_flipped_device_space() {
    let bitmap = render_one(single_page(SQUARE, "1 0 0 rg 0 0 50 50 re f"));
    assert_eq!(at(&bitmap, 10, 10), RED);
    assert_eq!(at(&bitmap, 80, 80), WHITE);
    // Bottom-left in user space is bottom-left of the image.
    assert_eq!(pixel(&bitmap.data, bitmap.width, 5, 95), RED);
}

#[test]
fn quarter_turn_swaps_dimensions() {
    let data = single_page_with("[0 0 200 100]", "1 0 0 rg 0 0 20 20 re f", "/Rotate 90");
    let bitmap = render_one(data);
    assert_eq!((bitmap.width, bitmap.height), (100, 200));
    // Clockwise: the page's bottom-left corner ends up top-left.
    assert_eq!(pixel(&bitmap.data, bitmap.width, 10, 10), RED);
    assert_eq!(pixel(&bitmap.data, bitmap.width, 90, 190), WHITE);
}

#[test]
fn crop_box_on_request() {
    let data = single_page_with(SQUARE, "", "/CropBox [10 10 60 40]");
    let doc = pdfthumb_core::open(data).unwrap();
    let full = rasterize(&doc, 0);
    assert_eq!((full.width, full.height), (100, 100));
    let cropped = pdfthumb_core::rasterize_page(&doc, 0, &RenderOptions::new().scale(2.0).use_crop_box(true)).unwrap();
    assert_eq!((cropped.width, cropped.height), (100, 60));
}

#[test]
fn invalid_scales_and_oversized_pages_fail() {
    let doc = pdfthumb_core::open(single_page(SQUARE, "")).unwrap();
    for scale in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let err = pdfthumb_core::render_page(&doc, 0, scale, 80).unwrap_err();
        assert!(matches!(err, RenderError::Encoding(_)), "scale {scale}: {err:?}");
    }
    // 100 * 0.001 rounds to zero pixels.
    assert!(matches!(pdfthumb_core::render_page(&doc, 0, 0.001, 80), Err(RenderError::Encoding(_))));
    let limited = RenderOptions::new().scale(1.0).max_pixels(9_999);
    assert!(matches!(
        pdfthumb_core::rasterize_page(&doc, 0, &limited),
        Err(RenderError::Encoding(_))
    ));
}

#[test]
fn background_color_is_configurable() {
    let doc = pdfthumb_core::open(single_page(SQUARE, "")).unwrap();
    let options = RenderOptions::new().scale(1.0).background([0, 0, 0]);
    let bitmap = pdfthumb_core::rasterize_page(&doc, 0, &options).unwrap();
    assert!(bitmap.data.iter().all(|&b| b == 0));
}

#[test]
fn unknown_operators_are_ignored() {
    let bitmap = render_one(single_page(SQUARE, "1 2 frobnicate /X zz 0 0 1 rg 0 0 100 100 re f"));
    assert_eq!(at(&bitmap, 50, 50), BLUE);
}

#[test]
fn operand_underflow_fails_only_that_page() {
    let data = pages_builder(SQUARE, &[("1 0 0 rg 0 0 100 100 re f", ""), ("0 rg", ""), ("0 1 0 rg 0 0 100 100 re f", "")])
        .build();
    let doc = pdfthumb_core::open(data).unwrap();
    let results: Vec<_> = pdfthumb_core::render_all(&doc, 1.0, 80).collect();
    assert_eq!(results.len(), 3);
    assert!(results[0].1.is_ok());
    assert!(
        matches!(&results[1].1, Err(RenderError::Interpreter { page: 1, .. })),
        "{:?}",
        results[1].1
    );
    assert!(results[2].1.is_ok());
    assert_eq!(results.iter().map(|(i, _)| *i).collect::<Vec<_>>(), vec![0, 1, 2]);
}

#[test]
fn even_odd_leaves_a_hole() {
    let shapes = "0 g 0 0 100 100 re 25 25 50 50 re";
    let nonzero = render_one(single_page(SQUARE, &format!("{shapes} f")));
    let even_odd = render_one(single_page(SQUARE, &format!("{shapes} f*")));
    assert_eq!(at(&nonzero, 50, 50), BLACK);
    assert_eq!(at(&even_odd, 50, 50), WHITE);
    assert_eq!(at(&even_odd, 10, 10), BLACK);
}

#[test]
fn clip_restricts_later_painting() {
    let bitmap = render_one(single_page(SQUARE, "q 10 10 20 20 re W n 0 g 0 0 100 100 re f Q 1 0 0 rg 70 70 20 20 re f"));
    assert_eq!(at(&bitmap, 20, 20), BLACK);
    assert_eq!(at(&bitmap, 50, 50), WHITE);
    // The clip ended with Q.
    assert_eq!(at(&bitmap, 80, 80), RED);
}

#[test]
fn stroke_follows_line_width() {
    let bitmap = render_one(single_page(SQUARE, "0 g 10 w 0 50 m 100 50 l S"));
    assert_eq!(at(&bitmap, 50, 50), BLACK);
    assert_eq!(at(&bitmap, 50, 40), WHITE);
}

#[test]
fn fill_alpha_blends_with_the_background() {
    let data = single_page_with(
        SQUARE,
        "/Half gs 0 g 0 0 100 100 re f",
        "/Resources << /ExtGState << /Half << /Type /ExtGState /ca 0.5 >> >> >>",
    );
    assert_near(at(&render_one(data), 50, 50), [128, 128, 128], 2);
}

#[test]
fn cmyk_and_gray_fills() {
    let bitmap = render_one(single_page(SQUARE, "0 1 1 0 k 0 0 50 100 re f 0.5 g 50 0 50 100 re f"));
    assert_eq!(at(&bitmap, 25, 50), RED);
    assert_near(at(&bitmap, 75, 50), [128, 128, 128], 1);
}

#[test]
fn content_arrays_are_joined() {
    let data = PdfBuilder::new()
        .obj(1, "<< /Type /Catalog /Pages 2 0 R >>")
        .obj(2, "<< /Type /Pages /Kids [3 0 R] /Count 1 /MediaBox [0 0 100 100] >>")
        .obj(3, "<< /Type /Page /Parent 2 0 R /Contents [4 0 R 5 0 R] >>")
        .stream(4, "", b"0 1 0 rg")
        .stream(5, "/Filter /FlateDecode", &zlib(b"0 0 100 100 re f"))
        .build();
    assert_eq!(at(&render_one(data), 50, 50), GREEN);
}

#[test]
fn form_xobject_is_clipped_to_its_bbox() {
    let data = pages_builder(SQUARE, &[("/Fm Do", "/Resources << /XObject << /Fm 10 0 R >> >>")])
        .stream(
            10,
            "/Type /XObject /Subtype /Form /BBox [0 0 50 50] /Matrix [1 0 0 1 10 10]",
            b"0 1 0 rg 0 0 100 100 re f",
        )
        .build();
    let bitmap = render_one(data);
    assert_eq!(at(&bitmap, 30, 30), GREEN);
    assert_eq!(at(&bitmap, 5, 5), WHITE);
    assert_eq!(at(&bitmap, 70, 70), WHITE);
}

#[test]
fn self_referencing_form_does_not_recurse_forever() {
    let data = pages_builder(SQUARE, &[("/Fm Do", "/Resources << /XObject << /Fm 10 0 R >> >>")])
        .stream(
            10,
            "/Type /XObject /Subtype /Form /BBox [0 0 100 100] /Resources << /XObject << /Fm 10 0 R >> >>",
            b"1 0 0 rg 0 0 100 100 re f /Fm Do",
        )
        .build();
    assert_eq!(at(&render_one(data), 50, 50), RED);
}

#[test]
fn flate_image_xobject() {
    let data = pages_builder(SQUARE, &[("q 100 0 0 100 0 0 cm /Im Do Q", "/Resources << /XObject << /Im 10 0 R >> >>")])
        .stream(
            10,
            "/Type /XObject /Subtype /Image /Width 2 /Height 2 /ColorSpace /DeviceGray /BitsPerComponent 8 /Filter /FlateDecode",
            &zlib(&[0, 255, 255, 0]),
        )
        .build();
    let bitmap = render_one(data);
    // Image rows run top to bottom.
    assert_eq!(pixel(&bitmap.data, 100, 25, 25), BLACK);
    assert_eq!(pixel(&bitmap.data, 100, 75, 25), WHITE);
    assert_eq!(pixel(&bitmap.data, 100, 25, 75), WHITE);
    assert_eq!(pixel(&bitmap.data, 100, 75, 75), BLACK);
}

#[test]
fn inline_image() {
    let mut content = b"q 100 0 0 100 0 0 cm BI /W 2 /H 1 /CS /RGB /BPC 8 ID ".to_vec();
    content.extend_from_slice(&[255, 0, 0, 0, 0, 255]);
    content.extend_from_slice(b"\nEI Q");
    let data = pages_builder(SQUARE, &[("", "")]).stream(4, "", &content).build();
    let bitmap = render_one(data);
    assert_eq!(at(&bitmap, 20, 50), RED);
    assert_eq!(at(&bitmap, 80, 50), BLUE);
}

fn render_err(data: Vec<u8>) -> RenderError {
    let doc = pdfthumb_core::open(data).unwrap();
    pdfthumb_core::rasterize_page(&doc, 0, &RenderOptions::new().scale(1.0)).unwrap_err()
}

fn image_page(filter: &str) -> Vec<u8> {
    pages_builder(SQUARE, &[("0 g 0 0 100 100 re f q 100 0 0 100 0 0 cm /Im Do Q", "/Resources << /XObject << /Im 10 0 R >> >>")])
        .stream(
            10,
            &format!("/Type /XObject /Subtype /Image /Width 2 /Height 2 /ColorSpace /DeviceGray /BitsPerComponent 8 /Filter {filter}"),
            b"\x00\x01\x02",
        )
        .build()
}

#[test]
fn unsupported_image_codecs_fail_the_page() {
    for filter in ["/JBIG2Decode", "/JPXDecode"] {
        let err = render_err(image_page(filter));
        assert!(matches!(err, RenderError::Interpreter { page: 0, .. }), "{filter}: {err:?}");
    }
}

fn filtered_content(filter: &str) -> Vec<u8> {
    PdfBuilder::new()
        .obj(1, "<< /Type /Catalog /Pages 2 0 R >>")
        .obj(2, "<< /Type /Pages /Kids [3 0 R] /Count 1 /MediaBox [0 0 100 100] >>")
        .obj(3, "<< /Type /Page /Parent 2 0 R /Contents 4 0 R >>")
        .stream(4, &format!("/Filter {filter}"), b"1 0 0 rg 0 0 100 100 re f")
        .build()
}

#[test]
fn content_with_an_unknown_filter_fails_the_page() {
    let err = render_err(filtered_content("/NoSuchDecode"));
    assert!(matches!(err, RenderError::Interpreter { page: 0, .. }), "{err:?}");
}

#[test]
fn content_behind_an_image_codec_is_not_run_as_operators() {
    let err = render_err(filtered_content("/JBIG2Decode"));
    assert!(matches!(err, RenderError::Interpreter { page: 0, .. }), "{err:?}");
}

#[test]
fn undecodable_form_fails_the_page() {
    let data = pages_builder(SQUARE, &[("/Fm Do", "/Resources << /XObject << /Fm 10 0 R >> >>")])
        .stream(10, "/Type /XObject /Subtype /Form /BBox [0 0 100 100] /Filter /FlateDecode", b"not zlib at all")
        .build();
    assert!(matches!(render_err(data), RenderError::Interpreter { page: 0, .. }));
}

#[test]
fn axial_shading_interpolates() {
    let data = single_page_with(
        SQUARE,
        "/Sh sh",
        "/Resources << /Shading << /Sh << /ShadingType 2 /ColorSpace /DeviceRGB /Coords [0 0 100 0] \
         /Function << /FunctionType 2 /Domain [0 1] /C0 [1 0 0] /C1 [0 0 1] /N 1 >> >> >> >>",
    );
    let bitmap = render_one(data);
    assert_near(at(&bitmap, 1, 50), RED, 8);
    assert_near(at(&bitmap, 98, 50), BLUE, 8);
    assert_near(at(&bitmap, 50, 50), [128, 0, 128], 8);
}

#[test]
fn tiling_pattern_repeats_its_cell() {
    let data = pages_builder(
        SQUARE,
        &[("/Pattern cs /P scn 0 0 100 100 re f", "/Resources << /Pattern << /P 10 0 R >> >>")],
    )
    .stream(
        10,
        "/Type /Pattern /PatternType 1 /PaintType 1 /TilingType 1 /BBox [0 0 10 10] /XStep 20 /YStep 20 /Resources << >>",
        b"0 0 1 rg 0 0 10 10 re f",
    )
    .build();
    let bitmap = render_one(data);
    assert_eq!(at(&bitmap, 5, 5), BLUE);
    assert_eq!(at(&bitmap, 45, 65), BLUE);
    assert_eq!(at(&bitmap, 15, 15), WHITE);
}

#[test]
fn type3_glyphs_are_painted_with_the_fill_color() {
    let data = pages_builder(
        SQUARE,
        &[("0 0 1 rg BT /T3 50 Tf 10 10 Td (a) Tj ET", "/Resources << /Font << /T3 10 0 R >> >>")],
    )
    .obj(
        10,
        "<< /Type /Font /Subtype /Type3 /FontBBox [0 0 100 100] /FontMatrix [0.01 0 0 0.01 0 0] \
         /CharProcs << /sq 11 0 R >> /Encoding << /Type /Encoding /Differences [97 /sq] >> \
         /FirstChar 97 /LastChar 97 /Widths [100] >>",
    )
    .stream(11, "", b"100 0 d0 0 0 100 100 re f")
    .build();
    let bitmap = render_one(data);
    assert_eq!(at(&bitmap, 35, 35), BLUE);
    assert_eq!(at(&bitmap, 70, 70), WHITE);
    assert_eq!(at(&bitmap, 5, 5), WHITE);
}

#[test]
fn text_without_a_font_is_skipped() {
    let bitmap = render_one(single_page(SQUARE, "BT 10 10 Td (hello) Tj ET 1 0 0 rg 0 0 100 100 re f"));
    assert_eq!(at(&bitmap, 50, 50), RED);
}

#[test]
fn parallel_matches_sequential() {
    let pages: Vec<(String, &str)> = (0..6)
        .map(|i| (format!("{} g 0 0 {} 100 re f", f64::from(i) / 6.0, 10 * (i + 1)), ""))
        .collect();
    let pages: Vec<(&str, &str)> = pages.iter().map(|(c, e)| (c.as_str(), *e)).collect();
    let doc = pdfthumb_core::open(pages_builder(SQUARE, &pages).build()).unwrap();

    let sequential: Vec<_> = pdfthumb_core::render_all(&doc, 1.0, 75).collect();
    let parallel = pdfthumb_core::render_all_parallel(&doc, 1.0, 75);
    assert_eq!(sequential.len(), 6);
    assert_eq!(parallel.len(), 6);
    for ((i, a), (j, b)) in sequential.into_iter().zip(parallel) {
        assert_eq!(i, j);
        assert_eq!(a.unwrap().data, b.unwrap().data);
    }
}

#[test]
fn render_all_reports_its_length() {
    let doc = pdfthumb_core::open(pages_builder(SQUARE, &[("", ""), ("", "")]).build()).unwrap();
    let mut iter = pdfthumb_core::render_all(&doc, 1.0, 80);
    assert_eq!(iter.len(), 2);
    iter.next();
    assert_eq!(iter.len(), 1);
}
