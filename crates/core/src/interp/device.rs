//! Output devices for page interpretation.
//!
//! The interpreter hands painting operations to a `PDFDevice` with the
//! graphics state they were issued under. Path coordinates are in user
//! space; `state.ctm` maps them to device pixels.

use crate::model::shading::Shading;
use crate::model::state::PDFGraphicState;
use crate::raster::stroke::StrokeStyle;
use crate::raster::{
    Canvas, ClipMask, FillRule, PathSegment, RasterImage, draw_image, flatten, rasterize, stroke_polylines,
};
use crate::utils::{Matrix, Rect, apply_matrix_pt, invert_matrix, matrix_expansion};
use std::sync::Arc;

/// Interface for rendering page content.
pub trait PDFDevice {
    /// Begin processing a page. `ctm` maps default user space to the device.
    fn begin_page(&mut self, _page_box: Rect, _ctm: Matrix) {}

    /// End processing a page.
    fn end_page(&mut self) {}

    /// Fill `path` with the non-stroking color.
    fn fill_path(&mut self, state: &PDFGraphicState, path: &[PathSegment], rule: FillRule);

    /// Stroke `path` with the stroking color and line parameters.
    fn stroke_path(&mut self, state: &PDFGraphicState, path: &[PathSegment]);

    /// The clip that results from intersecting `state.clip` with `path`.
    /// `None` leaves the clip unchanged.
    fn clip_path(&mut self, state: &PDFGraphicState, path: &[PathSegment], rule: FillRule) -> Option<Arc<ClipMask>>;

    /// Draw an image onto the unit square mapped by `state.ctm`.
    fn draw_image(&mut self, state: &PDFGraphicState, image: &RasterImage);

    /// Paint a shading. `matrix` maps shading space to the device; `path`
    /// limits the painted area (the whole clip when `None`).
    fn fill_shading(&mut self, state: &PDFGraphicState, shading: &Shading, matrix: Matrix, path: Option<&[PathSegment]>);
}

/// Device that rasterizes into an RGB canvas.
#[derive(Debug)]
pub struct RasterDevice {
    canvas: Canvas,
    anti_alias: bool,
}

impl RasterDevice {
    pub const fn new(canvas: Canvas, anti_alias: bool) -> Self {
        Self { canvas, anti_alias }
    }

    pub const fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn into_canvas(self) -> Canvas {
        self.canvas
    }

    fn coverage(&self, path: &[PathSegment], m: Matrix, rule: FillRule) -> Option<crate::raster::CoverageMask> {
        let polys = flatten(path, m);
        rasterize(&polys, rule, self.canvas.width(), self.canvas.height(), self.anti_alias)
    }
}

/// Stroke parameters in device pixels for `state`.
pub fn device_stroke_style(state: &PDFGraphicState) -> StrokeStyle {
    let scale = matrix_expansion(state.ctm);
    let dash = state.dash.as_ref().and_then(|(pattern, phase)| {
        // An all-zero pattern would never advance; treat it as solid.
        (pattern.iter().any(|d| *d > 0.0)).then(|| (pattern.iter().map(|d| d.abs() * scale).collect(), phase * scale))
    });
    StrokeStyle {
        width: state.linewidth * scale,
        cap: state.linecap,
        join: state.linejoin,
        miter_limit: state.miterlimit,
        dash,
    }
}

impl PDFDevice for RasterDevice {
    fn fill_path(&mut self, state: &PDFGraphicState, path: &[PathSegment], rule: FillRule) {
        if let Some(cov) = self.coverage(path, state.ctm, rule) {
            self.canvas
                .fill_coverage(&cov, state.fill_rgb(), state.fill_alpha, state.clip.as_deref());
        }
    }

    fn stroke_path(&mut self, state: &PDFGraphicState, path: &[PathSegment]) {
        let polys = flatten(path, state.ctm);
        let outline = stroke_polylines(&polys, &device_stroke_style(state));
        if let Some(cov) = rasterize(
            &outline,
            FillRule::NonZero,
            self.canvas.width(),
            self.canvas.height(),
            self.anti_alias,
        ) {
            self.canvas
                .fill_coverage(&cov, state.stroke_rgb(), state.stroke_alpha, state.clip.as_deref());
        }
    }

    fn clip_path(&mut self, state: &PDFGraphicState, path: &[PathSegment], rule: FillRule) -> Option<Arc<ClipMask>> {
        let cov = self.coverage(path, state.ctm, rule);
        let clip = match &state.clip {
            Some(current) => current.intersect(cov.as_ref()),
            None => ClipMask::from_coverage(cov.as_ref(), self.canvas.width(), self.canvas.height()),
        };
        Some(Arc::new(clip))
    }

    fn draw_image(&mut self, state: &PDFGraphicState, image: &RasterImage) {
        draw_image(&mut self.canvas, image, state.ctm, state.fill_alpha, state.clip.as_deref());
    }

    fn fill_shading(&mut self, state: &PDFGraphicState, shading: &Shading, matrix: Matrix, path: Option<&[PathSegment]>) {
        let Some(inv) = invert_matrix(matrix) else {
            return;
        };
        let cov = match path {
            Some(path) => match self.coverage(path, state.ctm, FillRule::NonZero) {
                Some(cov) => Some(cov),
                None => return,
            },
            None => None,
        };
        self.canvas
            .fill_shaded(cov.as_ref(), state.clip.as_deref(), state.fill_alpha, |x, y| {
                shading.color_at(apply_matrix_pt(inv, (x, y)))
            });
    }
}
