//! PDF graphics and text state.

use super::color::{PDFColorSpace, Rgb};
use crate::font::PDFFont;
use crate::raster::{ClipMask, LineCap, LineJoin};
use crate::utils::{MATRIX_IDENTITY, Matrix};
use smallvec::SmallVec;
use std::sync::Arc;

/// A color value: components in the active space, or a pattern name with
/// optional components for uncolored patterns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Color {
    pub components: SmallVec<[f64; 4]>,
    pub pattern: Option<String>,
}

impl Color {
    pub fn new(components: &[f64]) -> Self {
        Self {
            components: SmallVec::from_slice(components),
            pattern: None,
        }
    }

    pub const fn is_pattern(&self) -> bool {
        self.pattern.is_some()
    }
}

/// PDF Text State - text positioning and rendering parameters.
#[derive(Debug, Clone)]
pub struct PDFTextState {
    pub font: Option<Arc<PDFFont>>,
    /// Font size in user units
    pub fontsize: f64,
    pub charspace: f64,
    /// Word spacing, applied to single-byte code 32
    pub wordspace: f64,
    /// Horizontal scaling percentage (100 = normal)
    pub scaling: f64,
    pub leading: f64,
    /// Text rendering mode (0-7)
    pub render: i64,
    pub rise: f64,
    /// Text matrix (Tm)
    pub matrix: Matrix,
    /// Text line matrix (Tlm)
    pub line_matrix: Matrix,
}

impl PDFTextState {
    pub const fn new() -> Self {
        Self {
            font: None,
            fontsize: 0.0,
            charspace: 0.0,
            wordspace: 0.0,
            scaling: 100.0,
            leading: 0.0,
            render: 0,
            rise: 0.0,
            matrix: MATRIX_IDENTITY,
            line_matrix: MATRIX_IDENTITY,
        }
    }

    /// Called at the start of each text object (`BT`).
    pub const fn reset(&mut self) {
        self.matrix = MATRIX_IDENTITY;
        self.line_matrix = MATRIX_IDENTITY;
    }
}

impl Default for PDFTextState {
    fn default() -> Self {
        Self::new()
    }
}

/// PDF Graphics State - saved by `q`, restored by `Q`.
#[derive(Debug, Clone)]
pub struct PDFGraphicState {
    /// Current transformation matrix (user space to device pixels)
    pub ctm: Matrix,
    /// Line width in user units
    pub linewidth: f64,
    pub linecap: LineCap,
    pub linejoin: LineJoin,
    pub miterlimit: f64,
    /// Dash pattern in user units: (array, phase)
    pub dash: Option<(Vec<f64>, f64)>,
    pub intent: Option<String>,
    pub flatness: f64,

    /// Stroking color space and color
    pub scs: Arc<PDFColorSpace>,
    pub scolor: Color,
    /// Non-stroking (fill) color space and color
    pub ncs: Arc<PDFColorSpace>,
    pub ncolor: Color,

    /// Constant alpha for strokes (`CA`)
    pub stroke_alpha: f64,
    /// Constant alpha for everything else (`ca`)
    pub fill_alpha: f64,

    /// `None` means unclipped.
    pub clip: Option<Arc<ClipMask>>,
}

impl PDFGraphicState {
    pub fn new(ctm: Matrix) -> Self {
        let gray = Arc::new(PDFColorSpace::DeviceGray);
        Self {
            ctm,
            linewidth: 1.0,
            linecap: LineCap::Butt,
            linejoin: LineJoin::Miter,
            miterlimit: 10.0,
            dash: None,
            intent: None,
            flatness: 1.0,
            scs: Arc::clone(&gray),
            scolor: Color::new(&[0.0]),
            ncs: gray,
            ncolor: Color::new(&[0.0]),
            stroke_alpha: 1.0,
            fill_alpha: 1.0,
            clip: None,
        }
    }

    pub fn fill_rgb(&self) -> Rgb {
        self.ncs.to_rgb(&self.ncolor.components)
    }

    pub fn stroke_rgb(&self) -> Rgb {
        self.scs.to_rgb(&self.scolor.components)
    }
}

impl Default for PDFGraphicState {
    fn default() -> Self {
        Self::new(MATRIX_IDENTITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_black_opaque_unclipped() {
        let gs = PDFGraphicState::default();
        assert_eq!(gs.fill_rgb(), [0.0, 0.0, 0.0]);
        assert_eq!(gs.stroke_rgb(), [0.0, 0.0, 0.0]);
        assert_eq!(gs.fill_alpha, 1.0);
        assert!(gs.clip.is_none());
        assert_eq!(gs.linewidth, 1.0);
    }

    #[test]
    fn text_reset_clears_matrices() {
        let mut ts = PDFTextState::new();
        ts.matrix = (2.0, 0.0, 0.0, 2.0, 5.0, 5.0);
        ts.line_matrix = ts.matrix;
        ts.reset();
        assert_eq!(ts.matrix, MATRIX_IDENTITY);
        assert_eq!(ts.line_matrix, MATRIX_IDENTITY);
    }
}
