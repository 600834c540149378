//! Benchmarks for document opening and page rendering.
//!
//! Documents are generated in memory: a page of filled and stroked paths, a
//! page with a gradient, and a multi-page file for `render_all`.

use std::fmt::Write;
use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use pdfthumb_core::{PDFDocument, RenderOptions};

/// Builds a PDF with a correct xref table from `(objid, body)` pairs.
fn build_pdf(objects: &[(u32, Vec<u8>)]) -> Vec<u8> {
    let mut out = b"%PDF-1.7\n".to_vec();
    let mut xref = String::from("xref\n0 1\n0000000000 65535 f \n");
    for (id, body) in objects {
        let _ = write!(xref, "{id} 1\n{:010} 00000 n \n", out.len());
        out.extend_from_slice(format!("{id} 0 obj\n").as_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    }
    let size = objects.iter().map(|(id, _)| id + 1).max().unwrap_or(1);
    let start = out.len();
    out.extend_from_slice(xref.as_bytes());
    out.extend_from_slice(format!("trailer\n<< /Size {size} /Root 1 0 R >>\nstartxref\n{start}\n%%EOF\n").as_bytes());
    out
}

fn stream(content: &str) -> Vec<u8> {
    format!("<< /Length {} >>\nstream\n{content}\nendstream", content.len()).into_bytes()
}

fn paths_content() -> String {
    let mut content = String::new();
    for i in 0..400 {
        let x = f64::from(i % 20) * 30.0;
        let y = f64::from(i / 20) * 39.0;
        let _ = write!(
            content,
            "{} {} {} rg {x} {y} 25 30 re f 0 G 0.5 w {x} {y} m {} {} l S ",
            f64::from(i % 7) / 7.0,
            f64::from(i % 5) / 5.0,
            f64::from(i % 3) / 3.0,
            x + 25.0,
            y + 30.0
        );
    }
    content
}

/// `pages` letter pages sharing one content stream.
fn document(pages: u32, content: &str, resources: &str) -> Vec<u8> {
    let kids: Vec<String> = (0..pages).map(|i| format!("{} 0 R", 4 + i)).collect();
    let mut objects = vec![
        (1, b"<< /Type /Catalog /Pages 2 0 R >>".to_vec()),
        (
            2,
            format!(
                "<< /Type /Pages /Kids [{}] /Count {pages} /MediaBox [0 0 612 792] >>",
                kids.join(" ")
            )
            .into_bytes(),
        ),
        (3, stream(content)),
    ];
    for i in 0..pages {
        objects.push((
            4 + i,
            format!("<< /Type /Page /Parent 2 0 R /Contents 3 0 R /Resources {resources} >>").into_bytes(),
        ));
    }
    build_pdf(&objects)
}

fn bench_open(c: &mut Criterion) {
    let data = document(200, "", "<< >>");
    let mut group = c.benchmark_group("open");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("200_pages", |b| {
        b.iter(|| {
            let doc = PDFDocument::new(black_box(data.clone()), "").expect("parse PDF");
            black_box(doc.page_count())
        })
    });
    group.finish();
}

fn bench_render_page(c: &mut Criterion) {
    let shading = "<< /Shading << /Sh << /ShadingType 2 /ColorSpace /DeviceRGB /Coords [0 0 612 792] \
                   /Function << /FunctionType 2 /Domain [0 1] /C0 [1 1 0] /C1 [0 0.3 1] /N 1 >> >> >> >>";
    let fixtures = [
        ("paths", document(1, &paths_content(), "<< >>")),
        ("gradient", document(1, "/Sh sh", shading)),
    ];

    let mut group = c.benchmark_group("render_page");
    group.sample_size(20);
    for (name, data) in &fixtures {
        let doc = pdfthumb_core::open(data.clone()).expect("open");
        for scale in [1.0, 2.0] {
            group.bench_with_input(BenchmarkId::new(*name, scale), &scale, |b, &scale| {
                b.iter(|| pdfthumb_core::render_page(&doc, 0, black_box(scale), 80).expect("render"))
            });
        }
        let raw = RenderOptions::new().scale(2.0);
        group.bench_with_input(BenchmarkId::new(*name, "rasterize_only"), &raw, |b, options| {
            b.iter(|| pdfthumb_core::rasterize_page(&doc, 0, options).expect("rasterize"))
        });
    }
    group.finish();
}

fn bench_render_all(c: &mut Criterion) {
    let data = document(8, &paths_content(), "<< >>");
    let doc = pdfthumb_core::open(data).expect("open");

    let mut group = c.benchmark_group("render_all");
    group.sample_size(10);
    group.throughput(Throughput::Elements(8));
    group.bench_function("sequential", |b| {
        b.iter(|| pdfthumb_core::render_all(&doc, 1.0, 80).filter(|(_, r)| r.is_ok()).count())
    });
    group.bench_function("parallel", |b| {
        b.iter(|| pdfthumb_core::render_all_parallel(&doc, 1.0, 80).len())
    });
    group.finish();
}

criterion_group!(benches, bench_open, bench_render_page, bench_render_all);
criterion_main!(benches);
