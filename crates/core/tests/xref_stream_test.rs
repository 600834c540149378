//! Cross-reference streams, object streams and `/Prev` chains that mix
//! classic tables with streams.

mod common;

use std::collections::BTreeMap;
use std::io::Write;

use common::{append_update, pages_builder, pixel, zlib};
use pdfthumb_core::document::XRefEntry;
use pdfthumb_core::{PDFDocument, RenderOptions};

const RED: [u8; 3] = [255, 0, 0];
const GREEN: [u8; 3] = [0, 255, 0];
const BLUE: [u8; 3] = [0, 0, 255];

const CATALOG: &str = "<< /Type /Catalog /Pages 2 0 R >>";
const PAGES: &str = "<< /Type /Pages /Kids [3 0 R] /Count 1 /MediaBox [0 0 100 100] >>";

fn fill(rgb: &str) -> String {
    format!("{rgb} rg 0 0 100 100 re f")
}

fn stream_object(dict_entries: &str, data: &[u8]) -> Vec<u8> {
    let mut out = format!("<< {dict_entries} /Length {} >>\nstream\n", data.len()).into_bytes();
    out.extend_from_slice(data);
    out.extend_from_slice(b"\nendstream");
    out
}

/// A file section indexed by a `/Type /XRef` stream with `/W [1 4 2]`.
/// Objects in `packed` go into one object stream.
#[derive(Default)]
struct XRefStreamFile {
    objects: Vec<(u32, Vec<u8>)>,
    packed: Vec<(u32, String)>,
    packed_id: u32,
    xref_id: Option<u32>,
    flate: bool,
    predictor: bool,
}

impl XRefStreamFile {
    fn obj(mut self, id: u32, body: &str) -> Self {
        self.objects.push((id, body.as_bytes().to_vec()));
        self
    }

    fn stream(mut self, id: u32, dict_entries: &str, data: &[u8]) -> Self {
        self.objects.push((id, stream_object(dict_entries, data)));
        self
    }

    fn packed(mut self, stream_id: u32, objects: &[(u32, &str)]) -> Self {
        self.packed_id = stream_id;
        self.packed = objects.iter().map(|(id, body)| (*id, body.to_string())).collect();
        self
    }

    fn build(&self) -> Vec<u8> {
        self.build_on(b"%PDF-1.5\n".to_vec(), None)
    }

    /// Appends this section to `base`, chaining to the section at `prev`.
    fn build_on(&self, base: Vec<u8>, prev: Option<usize>) -> Vec<u8> {
        let mut out = base;
        let mut rows: BTreeMap<u32, (u8, u32, u16)> = BTreeMap::new();
        for (id, body) in &self.objects {
            rows.insert(*id, (1, out.len() as u32, 0));
            write!(out, "{id} 0 obj\n").unwrap();
            out.extend_from_slice(body);
            out.extend_from_slice(b"\nendobj\n");
        }
        if !self.packed.is_empty() {
            let mut header = String::new();
            let mut payload = String::new();
            for (i, (id, body)) in self.packed.iter().enumerate() {
                header.push_str(&format!("{id} {} ", payload.len()));
                payload.push_str(body);
                payload.push('\n');
                rows.insert(*id, (2, self.packed_id, i as u16));
            }
            let dict = format!("/Type /ObjStm /N {} /First {} /Filter /FlateDecode", self.packed.len(), header.len());
            rows.insert(self.packed_id, (1, out.len() as u32, 0));
            write!(out, "{} 0 obj\n", self.packed_id).unwrap();
            out.extend_from_slice(&stream_object(&dict, &zlib(format!("{header}{payload}").as_bytes())));
            out.extend_from_slice(b"\nendobj\n");
        }

        let xref_id = self.xref_id.unwrap_or_else(|| rows.keys().next_back().map_or(1, |id| id + 1));
        let xref_at = out.len();
        rows.insert(xref_id, (1, xref_at as u32, 0));

        // One /Index subsection per run of consecutive ids.
        let mut index: Vec<(u32, u32)> = Vec::new();
        let mut table = Vec::new();
        for (id, (kind, f1, f2)) in &rows {
            match index.last_mut() {
                Some((first, count)) if *first + *count == *id => *count += 1,
                _ => index.push((*id, 1)),
            }
            table.push(*kind);
            table.extend_from_slice(&f1.to_be_bytes());
            table.extend_from_slice(&f2.to_be_bytes());
        }
        let index: Vec<String> = index.iter().map(|(first, count)| format!("{first} {count}")).collect();

        let mut dict = format!(
            "/Type /XRef /Size {} /Root 1 0 R /W [1 4 2] /Index [{}]",
            xref_id + 1,
            index.join(" ")
        );
        if let Some(prev) = prev {
            dict.push_str(&format!(" /Prev {prev}"));
        }
        if self.predictor {
            table = png_up(&table, 7);
            dict.push_str(" /DecodeParms << /Predictor 12 /Columns 7 >>");
        }
        if self.flate || self.predictor {
            table = zlib(&table);
            dict.push_str(" /Filter /FlateDecode");
        }
        write!(out, "{xref_id} 0 obj\n").unwrap();
        out.extend_from_slice(&stream_object(&dict, &table));
        write!(out, "\nendobj\nstartxref\n{xref_at}\n%%EOF\n").unwrap();
        out
    }
}

/// PNG "Up" rows, each prefixed with filter type 2.
fn png_up(data: &[u8], columns: usize) -> Vec<u8> {
    let mut out = Vec::new();
    let mut prior = vec![0u8; columns];
    for row in data.chunks(columns) {
        out.push(2);
        out.extend(row.iter().zip(&prior).map(|(b, p)| b.wrapping_sub(*p)));
        prior = row.to_vec();
    }
    out
}

fn startxref_of(data: &[u8]) -> usize {
    let text = String::from_utf8_lossy(data);
    let at = text.rfind("startxref").unwrap();
    text[at + "startxref".len()..].split_whitespace().next().unwrap().parse().unwrap()
}

fn center(doc: &PDFDocument) -> [u8; 3] {
    let bitmap = pdfthumb_core::rasterize_page(doc, 0, &RenderOptions::new().scale(1.0)).unwrap();
    pixel(&bitmap.data, bitmap.width, 50, 50)
}

fn red_page() -> XRefStreamFile {
    XRefStreamFile::default()
        .obj(1, CATALOG)
        .obj(2, PAGES)
        .obj(3, "<< /Type /Page /Parent 2 0 R /Contents 7 0 R >>")
        .stream(7, "", fill("1 0 0").as_bytes())
}

#[test]
fn xref_stream_with_index_subsections() {
    let doc = pdfthumb_core::open(red_page().build()).unwrap();
    assert!(!doc.xref().rebuilt);
    assert!(matches!(doc.xref().get(7), Some(XRefEntry::InFile { .. })));
    assert_eq!(doc.xref().get(5), None);
    assert_eq!(pdfthumb_core::page_count(&doc), 1);
    assert_eq!(center(&doc), RED);
}

#[test]
fn compressed_xref_stream_with_png_predictor() {
    let file = XRefStreamFile { predictor: true, ..red_page() };
    let doc = pdfthumb_core::open(file.build()).unwrap();
    assert!(!doc.xref().rebuilt);
    assert_eq!(center(&doc), RED);
}

#[test]
fn page_objects_inside_an_object_stream() {
    let file = XRefStreamFile { flate: true, ..Default::default() }
        .obj(1, CATALOG)
        .stream(4, "/Filter /FlateDecode", &zlib(fill("0 1 0").as_bytes()))
        .packed(5, &[(2, PAGES), (3, "<< /Type /Page /Parent 2 0 R /Contents 4 0 R >>")]);
    let doc = pdfthumb_core::open(file.build()).unwrap();
    assert!(!doc.xref().rebuilt);
    assert_eq!(doc.xref().get(3), Some(XRefEntry::InStream { stream_objid: 5, index: 1 }));
    assert!(doc.getobj(3).unwrap().is_name_at("Type", "Page"));
    assert_eq!(doc.page(0).unwrap().pageid, 3);
    assert_eq!(center(&doc), GREEN);
}

#[test]
fn stream_update_over_a_classic_table() {
    let base = pages_builder("[0 0 100 100]", &[(fill("1 0 0").as_str(), "")]).build();
    let prev = startxref_of(&base);
    let update = XRefStreamFile { xref_id: Some(20), ..Default::default() }.stream(4, "", fill("0 0 1").as_bytes());
    let doc = pdfthumb_core::open(update.build_on(base, Some(prev))).unwrap();
    assert!(!doc.xref().rebuilt);
    // The catalog still comes from the older table.
    assert!(matches!(doc.xref().get(1), Some(XRefEntry::InFile { .. })));
    assert_eq!(pdfthumb_core::page_count(&doc), 1);
    assert_eq!(center(&doc), BLUE);
}

#[test]
fn table_update_over_an_xref_stream() {
    let base = XRefStreamFile::default()
        .obj(1, CATALOG)
        .stream(4, "", fill("1 0 0").as_bytes())
        .packed(5, &[(2, PAGES), (3, "<< /Type /Page /Parent 2 0 R /Contents 4 0 R >>")])
        .build();
    let content = fill("0 0 1");
    let body = format!("<< /Length {} >>\nstream\n{content}\nendstream", content.len());
    let doc = pdfthumb_core::open(append_update(&base, &[(4, body.as_str())])).unwrap();
    assert!(!doc.xref().rebuilt);
    assert!(matches!(doc.xref().get(3), Some(XRefEntry::InStream { .. })));
    assert_eq!(center(&doc), BLUE);
}
