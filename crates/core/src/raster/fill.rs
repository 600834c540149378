//! Scanline polygon filling with vertical supersampling.
//!
//! Each pixel row is sampled on [`SUBSAMPLES`] sub-scanlines. On every
//! sub-scanline the spans inside the polygon are accumulated with exact
//! horizontal coverage, so partially covered edge pixels get fractional
//! values instead of being rounded in or out.

use super::path::{Polyline, bounds};

/// Sub-scanlines per pixel row when anti-aliasing.
pub const SUBSAMPLES: usize = 4;

/// Winding rule for the inside test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillRule {
    NonZero,
    EvenOdd,
}

impl FillRule {
    const fn inside(self, winding: i32) -> bool {
        match self {
            Self::NonZero => winding != 0,
            Self::EvenOdd => winding % 2 != 0,
        }
    }
}

/// Per-pixel coverage in `[0, 1]` over a pixel-aligned bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageMask {
    pub x0: usize,
    pub y0: usize,
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

impl CoverageMask {
    /// Coverage at canvas pixel `(x, y)`; zero outside the box.
    pub fn get(&self, x: usize, y: usize) -> f32 {
        if x < self.x0 || y < self.y0 {
            return 0.0;
        }
        let (dx, dy) = (x - self.x0, y - self.y0);
        if dx >= self.width || dy >= self.height {
            return 0.0;
        }
        self.data[dy * self.width + dx]
    }

    /// A fully covered rectangle, used for clips of plain boxes.
    pub fn full(x0: usize, y0: usize, width: usize, height: usize) -> Self {
        Self {
            x0,
            y0,
            width,
            height,
            data: vec![1.0; width * height],
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[derive(Debug, Clone, Copy)]
struct Edge {
    y_top: f64,
    y_bottom: f64,
    x_top: f64,
    dxdy: f64,
    dir: i32,
}

impl Edge {
    fn new(a: (f64, f64), b: (f64, f64)) -> Option<Self> {
        if a.1 == b.1 || !a.1.is_finite() || !b.1.is_finite() || !a.0.is_finite() || !b.0.is_finite() {
            return None;
        }
        let (top, bottom, dir) = if a.1 < b.1 { (a, b, 1) } else { (b, a, -1) };
        Some(Self {
            y_top: top.1,
            y_bottom: bottom.1,
            x_top: top.0,
            dxdy: (bottom.0 - top.0) / (bottom.1 - top.1),
            dir,
        })
    }

    fn x_at(&self, y: f64) -> f64 {
        self.x_top + (y - self.y_top) * self.dxdy
    }
}

/// Adds `weight` times the covered fraction of `[a, b)` to each pixel.
fn add_span(acc: &mut [f32], a: f64, b: f64, weight: f32) {
    let len = acc.len() as f64;
    let (a, b) = (a.clamp(0.0, len), b.clamp(0.0, len));
    if a >= b {
        return;
    }
    let ia = a.floor() as usize;
    let ib = b.floor() as usize;
    if ia == ib {
        acc[ia] += (b - a) as f32 * weight;
        return;
    }
    acc[ia] += (ia as f64 + 1.0 - a) as f32 * weight;
    for cell in &mut acc[ia + 1..ib] {
        *cell += weight;
    }
    if ib < acc.len() {
        acc[ib] += (b - ib as f64) as f32 * weight;
    }
}

/// Scan-converts closed polygons into a coverage mask clipped to
/// `canvas_w` x `canvas_h`. Returns `None` when nothing is covered.
pub fn rasterize(
    polys: &[Polyline],
    rule: FillRule,
    canvas_w: usize,
    canvas_h: usize,
    anti_alias: bool,
) -> Option<CoverageMask> {
    let (bx0, by0, bx1, by1) = bounds(polys)?;
    let x0 = bx0.floor().max(0.0) as usize;
    let y0 = by0.floor().max(0.0) as usize;
    let x1 = (bx1.ceil().max(0.0) as usize).min(canvas_w);
    let y1 = (by1.ceil().max(0.0) as usize).min(canvas_h);
    if x0 >= x1 || y0 >= y1 {
        return None;
    }

    let mut edges: Vec<Edge> = polys
        .iter()
        .flat_map(|poly| {
            let pts = &poly.points;
            // Filling always closes the subpath.
            let closing = pts.last().zip(pts.first()).map(|(a, b)| (*a, *b));
            pts.windows(2).map(|w| (w[0], w[1])).chain(closing)
        })
        .filter_map(|(a, b)| Edge::new(a, b))
        .filter(|e| e.y_bottom > y0 as f64 && e.y_top < y1 as f64)
        .collect();
    if edges.is_empty() {
        return None;
    }
    edges.sort_by(|a, b| a.y_top.total_cmp(&b.y_top));

    let width = x1 - x0;
    let height = y1 - y0;
    let mut data = vec![0.0f32; width * height];
    let samples = if anti_alias { SUBSAMPLES } else { 1 };
    let weight = 1.0 / samples as f32;

    let mut next_edge = 0;
    let mut active: Vec<Edge> = Vec::new();
    let mut crossings: Vec<(f64, i32)> = Vec::new();
    let mut any = false;

    for row in 0..height {
        let acc = &mut data[row * width..(row + 1) * width];
        for s in 0..samples {
            let sy = (y0 + row) as f64 + (s as f64 + 0.5) / samples as f64;
            while next_edge < edges.len() && edges[next_edge].y_top <= sy {
                active.push(edges[next_edge]);
                next_edge += 1;
            }
            active.retain(|e| e.y_bottom > sy);

            crossings.clear();
            crossings.extend(
                active
                    .iter()
                    .filter(|e| e.y_top <= sy)
                    .map(|e| (e.x_at(sy) - x0 as f64, e.dir)),
            );
            if crossings.len() < 2 {
                continue;
            }
            crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut winding = 0;
            for pair in crossings.windows(2) {
                winding += pair[0].1;
                if rule.inside(winding) {
                    let (a, b) = if anti_alias {
                        (pair[0].0, pair[1].0)
                    } else {
                        (pair[0].0.round(), pair[1].0.round())
                    };
                    add_span(acc, a, b, weight);
                    any = true;
                }
            }
        }
        for v in acc.iter_mut() {
            *v = v.min(1.0);
        }
    }

    any.then_some(CoverageMask {
        x0,
        y0,
        width,
        height,
        data,
    })
}
