//! In-memory PDF construction for integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;

/// Writes objects, a classic xref table with correct offsets and a trailer.
#[derive(Default, Clone)]
pub struct PdfBuilder {
    objects: BTreeMap<u32, Vec<u8>>,
    trailer_extra: String,
}

impl PdfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `id 0 obj <body> endobj`.
    pub fn obj(mut self, id: u32, body: &str) -> Self {
        self.objects.insert(id, body.as_bytes().to_vec());
        self
    }

    /// Adds a stream object; `/Length` is appended to `dict_entries`.
    pub fn stream(mut self, id: u32, dict_entries: &str, data: &[u8]) -> Self {
        self.objects.insert(id, stream_body(dict_entries, data));
        self
    }

    /// Extra trailer entries besides `/Size` and `/Root 1 0 R`.
    pub fn trailer(mut self, extra: &str) -> Self {
        self.trailer_extra = extra.to_string();
        self
    }

    /// Header and objects only, with their offsets.
    fn body(&self) -> (Vec<u8>, Vec<(u32, usize)>) {
        let mut out = b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n".to_vec();
        let mut offsets = Vec::new();
        for (id, body) in &self.objects {
            offsets.push((*id, out.len()));
            write!(out, "{id} 0 obj\n").unwrap();
            out.extend_from_slice(body);
            out.extend_from_slice(b"\nendobj\n");
        }
        (out, offsets)
    }

    fn size(&self) -> u32 {
        self.objects.keys().next_back().map_or(1, |id| id + 1)
    }

    pub fn build(&self) -> Vec<u8> {
        let (mut out, offsets) = self.body();
        let xref_at = out.len();
        out.extend_from_slice(&xref_table(&offsets, true));
        write!(
            out,
            "trailer\n<< /Size {} /Root 1 0 R {} >>\nstartxref\n{xref_at}\n%%EOF\n",
            self.size(),
            self.trailer_extra
        )
        .unwrap();
        out
    }

    /// A file whose `startxref` points at `bogus_offset` instead of the table.
    pub fn build_with_startxref(&self, bogus_offset: usize) -> Vec<u8> {
        let (mut out, offsets) = self.body();
        out.extend_from_slice(&xref_table(&offsets, true));
        write!(
            out,
            "trailer\n<< /Size {} /Root 1 0 R {} >>\nstartxref\n{bogus_offset}\n%%EOF\n",
            self.size(),
            self.trailer_extra
        )
        .unwrap();
        out
    }

    /// Objects and a trailer, but no xref table or `startxref`.
    pub fn build_without_xref(&self) -> Vec<u8> {
        let (mut out, _) = self.body();
        write!(out, "trailer\n<< /Size {} /Root 1 0 R >>\n%%EOF\n", self.size()).unwrap();
        out
    }

    /// Objects only: no xref and no trailer.
    pub fn build_truncated(&self) -> Vec<u8> {
        self.body().0
    }
}

fn stream_body(dict_entries: &str, data: &[u8]) -> Vec<u8> {
    let mut out = format!("<< {dict_entries} /Length {} >>\nstream\n", data.len()).into_bytes();
    out.extend_from_slice(data);
    out.extend_from_slice(b"\nendstream");
    out
}

/// One subsection per object, plus the free head when `with_head`.
fn xref_table(offsets: &[(u32, usize)], with_head: bool) -> Vec<u8> {
    let mut out = b"xref\n".to_vec();
    if with_head {
        out.extend_from_slice(b"0 1\n0000000000 65535 f \n");
    }
    for (id, offset) in offsets {
        write!(out, "{id} 1\n{offset:010} 00000 n \n").unwrap();
    }
    out
}

/// Appends an incremental update that redefines `objects`.
pub fn append_update(base: &[u8], objects: &[(u32, &str)]) -> Vec<u8> {
    let prev = last_startxref(base);
    let mut out = base.to_vec();
    let mut offsets = Vec::new();
    for (id, body) in objects {
        offsets.push((*id, out.len()));
        write!(out, "{id} 0 obj\n{body}\nendobj\n").unwrap();
    }
    let size = objects.iter().map(|(id, _)| id + 1).max().unwrap_or(1);
    let xref_at = out.len();
    out.extend_from_slice(&xref_table(&offsets, false));
    write!(
        out,
        "trailer\n<< /Size {size} /Root 1 0 R /Prev {prev} >>\nstartxref\n{xref_at}\n%%EOF\n"
    )
    .unwrap();
    out
}

fn last_startxref(data: &[u8]) -> usize {
    let text = String::from_utf8_lossy(data);
    let at = text.rfind("startxref").expect("base has startxref");
    text[at + "startxref".len()..]
        .split_whitespace()
        .next()
        .and_then(|n| n.parse().ok())
        .expect("startxref offset")
}

/// Catalog (1), page tree root (2) with an inherited MediaBox, then each
/// page at `3 + 2i` with its content stream at `4 + 2i`.
pub fn pages_builder(mediabox: &str, pages: &[(&str, &str)]) -> PdfBuilder {
    let kids: Vec<String> = (0..pages.len()).map(|i| format!("{} 0 R", 3 + 2 * i)).collect();
    let mut b = PdfBuilder::new()
        .obj(1, "<< /Type /Catalog /Pages 2 0 R >>")
        .obj(
            2,
            &format!(
                "<< /Type /Pages /Kids [{}] /Count {} /MediaBox {mediabox} >>",
                kids.join(" "),
                pages.len()
            ),
        );
    for (i, (content, page_entries)) in pages.iter().enumerate() {
        let page_id = 3 + 2 * i as u32;
        b = b
            .obj(
                page_id,
                &format!(
                    "<< /Type /Page /Parent 2 0 R /Contents {} 0 R {page_entries} >>",
                    page_id + 1
                ),
            )
            .stream(page_id + 1, "", content.as_bytes());
    }
    b
}

/// A single page with the given MediaBox and content.
pub fn single_page(mediabox: &str, content: &str) -> Vec<u8> {
    pages_builder(mediabox, &[(content, "")]).build()
}

/// Single page with extra page dictionary entries (e.g. `/Resources`).
pub fn single_page_with(mediabox: &str, content: &str, page_entries: &str) -> Vec<u8> {
    pages_builder(mediabox, &[(content, page_entries)]).build()
}

pub fn zlib(data: &[u8]) -> Vec<u8> {
    let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
    enc.write_all(data).unwrap();
    enc.finish().unwrap()
}

/// RGB at `(x, y)` of a tightly packed bitmap.
pub fn pixel(data: &[u8], width: u32, x: u32, y: u32) -> [u8; 3] {
    let i = ((y * width + x) * 3) as usize;
    [data[i], data[i + 1], data[i + 2]]
}

pub fn assert_near(actual: [u8; 3], expected: [u8; 3], tolerance: u8) {
    for (a, e) in actual.iter().zip(expected) {
        assert!(a.abs_diff(e) <= tolerance, "pixel {actual:?}, expected {expected:?}");
    }
}
