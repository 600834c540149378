//! Embedded TrueType/OpenType programs and glyph outlines.

use crate::raster::PathSegment;
use rustc_hash::FxHashMap;
use std::sync::{Arc, RwLock};
use ttf_parser::{Face, GlyphId, OutlineBuilder, PlatformId};

/// Glyph outline in text space units (1.0 = one em).
pub type Outline = Arc<[PathSegment]>;

/// Converts ttf-parser callbacks into path segments scaled to one em.
struct SegmentBuilder {
    scale: f64,
    segments: Vec<PathSegment>,
    current: (f64, f64),
}

impl OutlineBuilder for SegmentBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        let p = (f64::from(x) * self.scale, f64::from(y) * self.scale);
        self.segments.push(PathSegment::MoveTo(p.0, p.1));
        self.current = p;
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = (f64::from(x) * self.scale, f64::from(y) * self.scale);
        self.segments.push(PathSegment::LineTo(p.0, p.1));
        self.current = p;
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let q = (f64::from(x1) * self.scale, f64::from(y1) * self.scale);
        let p = (f64::from(x) * self.scale, f64::from(y) * self.scale);
        let c = self.current;
        // Degree elevation of the quadratic.
        let c1 = (c.0 + 2.0 / 3.0 * (q.0 - c.0), c.1 + 2.0 / 3.0 * (q.1 - c.1));
        let c2 = (p.0 + 2.0 / 3.0 * (q.0 - p.0), p.1 + 2.0 / 3.0 * (q.1 - p.1));
        self.segments.push(PathSegment::CurveTo(c1.0, c1.1, c2.0, c2.1, p.0, p.1));
        self.current = p;
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let s = self.scale;
        let p = (f64::from(x) * s, f64::from(y) * s);
        self.segments.push(PathSegment::CurveTo(
            f64::from(x1) * s,
            f64::from(y1) * s,
            f64::from(x2) * s,
            f64::from(y2) * s,
            p.0,
            p.1,
        ));
        self.current = p;
    }

    fn close(&mut self) {
        self.segments.push(PathSegment::ClosePath);
    }
}

/// A parsed-on-demand font program with an outline cache.
pub struct GlyphProgram {
    data: Vec<u8>,
    units_per_em: f64,
    outlines: RwLock<FxHashMap<u16, Option<Outline>>>,
}

impl std::fmt::Debug for GlyphProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphProgram")
            .field("len", &self.data.len())
            .field("units_per_em", &self.units_per_em)
            .finish_non_exhaustive()
    }
}

impl GlyphProgram {
    /// Validates the program; `None` when ttf-parser cannot read it.
    pub fn new(data: Vec<u8>) -> Option<Self> {
        let face = match Face::parse(&data, 0) {
            Ok(face) => face,
            Err(err) => {
                tracing::debug!(%err, "embedded font program unreadable");
                return None;
            }
        };
        let units_per_em = f64::from(face.units_per_em().max(1));
        Some(Self {
            data,
            units_per_em,
            outlines: RwLock::new(FxHashMap::default()),
        })
    }

    fn face(&self) -> Option<Face<'_>> {
        Face::parse(&self.data, 0).ok()
    }

    /// Glyph for a simple-font code. Lookup order: (3,0) at `0xF000 | code`
    /// and at `code`, (1,0) by code, (3,1) or Unicode cmaps by the glyph
    /// name's Unicode value, then the `post` table name.
    pub fn glyph_for_code(&self, code: u8, name: Option<&str>, unicode: Option<char>) -> Option<u16> {
        let face = self.face()?;
        if let Some(cmap) = face.tables().cmap {
            let code32 = u32::from(code);
            for sub in cmap.subtables {
                if sub.platform_id == PlatformId::Windows && sub.encoding_id == 0 {
                    let hit = sub.glyph_index(0xF000 | code32).or_else(|| sub.glyph_index(code32));
                    if let Some(g) = hit.filter(|g| g.0 != 0) {
                        return Some(g.0);
                    }
                }
            }
            for sub in cmap.subtables {
                if sub.platform_id == PlatformId::Macintosh
                    && sub.encoding_id == 0
                    && let Some(g) = sub.glyph_index(code32).filter(|g| g.0 != 0)
                {
                    return Some(g.0);
                }
            }
            if let Some(ch) = unicode {
                for sub in cmap.subtables {
                    if sub.is_unicode()
                        && let Some(g) = sub.glyph_index(u32::from(ch)).filter(|g| g.0 != 0)
                    {
                        return Some(g.0);
                    }
                }
            }
        }
        if let Some(name) = name
            && let Some(g) = face.glyph_index_by_name(name)
        {
            return Some(g.0);
        }
        // Fonts without a usable cmap are often indexed by code directly.
        (face.tables().cmap.is_none() && u16::from(code) < face.number_of_glyphs()).then_some(u16::from(code))
    }

    /// Outline of glyph `gid` in em units; cached.
    pub fn outline(&self, gid: u16) -> Option<Outline> {
        if let Ok(cache) = self.outlines.read()
            && let Some(hit) = cache.get(&gid)
        {
            return hit.clone();
        }
        let outline = self.face().and_then(|face| {
            let mut builder = SegmentBuilder {
                scale: 1.0 / self.units_per_em,
                segments: Vec::new(),
                current: (0.0, 0.0),
            };
            face.outline_glyph(GlyphId(gid), &mut builder)?;
            Some(Outline::from(builder.segments))
        });
        if let Ok(mut cache) = self.outlines.write() {
            cache.insert(gid, outline.clone());
        }
        outline
    }

    /// Horizontal advance of `gid` in em units.
    pub fn advance(&self, gid: u16) -> Option<f64> {
        let face = self.face()?;
        face.glyph_hor_advance(GlyphId(gid))
            .map(|a| f64::from(a) / self.units_per_em)
    }
}
