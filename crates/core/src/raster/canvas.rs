//! RGB8 render target and source-over compositing.

use super::clip::ClipMask;
use super::fill::CoverageMask;
use crate::model::color::Rgb;

/// Fixed-size RGB buffer owned by one render call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

fn to_u8(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl Canvas {
    pub fn new(width: usize, height: usize, background: [u8; 3]) -> Self {
        let mut data = Vec::with_capacity(width * height * 3);
        for _ in 0..width * height {
            data.extend_from_slice(&background);
        }
        Self { width, height, data }
    }

    pub const fn width(&self) -> usize {
        self.width
    }

    pub const fn height(&self) -> usize {
        self.height
    }

    /// Row-major RGB bytes.
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 3;
        Some([self.data[i], self.data[i + 1], self.data[i + 2]])
    }

    /// `dst = src * a + dst * (1 - a)`.
    pub fn blend(&mut self, x: usize, y: usize, src: [u8; 3], a: f32) {
        if x >= self.width || y >= self.height || a <= 0.0 {
            return;
        }
        let i = (y * self.width + x) * 3;
        if a >= 1.0 {
            self.data[i..i + 3].copy_from_slice(&src);
            return;
        }
        for (d, s) in self.data[i..i + 3].iter_mut().zip(src) {
            *d = (f32::from(s) * a + f32::from(*d) * (1.0 - a)).round() as u8;
        }
    }

    /// Paints `color` through a coverage mask.
    pub fn fill_coverage(&mut self, coverage: &CoverageMask, color: Rgb, alpha: f64, clip: Option<&ClipMask>) {
        let src = [to_u8(color[0]), to_u8(color[1]), to_u8(color[2])];
        let alpha = alpha.clamp(0.0, 1.0) as f32;
        let x_end = (coverage.x0 + coverage.width).min(self.width);
        let y_end = (coverage.y0 + coverage.height).min(self.height);
        for y in coverage.y0..y_end {
            for x in coverage.x0..x_end {
                let mut a = coverage.get(x, y) * alpha;
                if let Some(clip) = clip {
                    a *= clip.get(x, y);
                }
                self.blend(x, y, src, a);
            }
        }
    }

    /// Paints per-pixel colors from `shade`, evaluated at pixel centers.
    /// `None` from the shader leaves the pixel untouched. Without a coverage
    /// mask the whole canvas (or the clip's bounds) is painted.
    pub fn fill_shaded(
        &mut self,
        coverage: Option<&CoverageMask>,
        clip: Option<&ClipMask>,
        alpha: f64,
        shade: impl Fn(f64, f64) -> Option<Rgb>,
    ) {
        let (mut x0, mut y0, mut x1, mut y1) = match coverage {
            Some(c) => (c.x0, c.y0, c.x0 + c.width, c.y0 + c.height),
            None => (0, 0, self.width, self.height),
        };
        if let Some(clip) = clip {
            let b = clip.bounds();
            (x0, y0, x1, y1) = (x0.max(b.0), y0.max(b.1), x1.min(b.2), y1.min(b.3));
        }
        let alpha = alpha.clamp(0.0, 1.0) as f32;
        for y in y0..y1.min(self.height) {
            for x in x0..x1.min(self.width) {
                let mut a = alpha;
                if let Some(c) = coverage {
                    a *= c.get(x, y);
                }
                if let Some(clip) = clip {
                    a *= clip.get(x, y);
                }
                if a <= 0.0 {
                    continue;
                }
                if let Some(color) = shade(x as f64 + 0.5, y as f64 + 0.5) {
                    self.blend(x, y, [to_u8(color[0]), to_u8(color[1]), to_u8(color[2])], a);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_canvas_has_background() {
        let c = Canvas::new(2, 2, [255, 255, 255]);
        assert_eq!(c.as_raw(), &[255; 12]);
        assert_eq!(c.pixel(1, 1), Some([255, 255, 255]));
        assert_eq!(c.pixel(2, 0), None);
    }

    #[test]
    fn half_alpha_blends_toward_source() {
        let mut c = Canvas::new(1, 1, [255, 255, 255]);
        c.blend(0, 0, [0, 0, 0], 0.5);
        assert_eq!(c.pixel(0, 0), Some([128, 128, 128]));
    }

    #[test]
    fn coverage_respects_clip() {
        let mut c = Canvas::new(4, 1, [255, 255, 255]);
        let cov = CoverageMask::full(0, 0, 4, 1);
        let clip = ClipMask::from_coverage(Some(&CoverageMask::full(0, 0, 2, 1)), 4, 1);
        c.fill_coverage(&cov, [1.0, 0.0, 0.0], 1.0, Some(&clip));
        assert_eq!(c.pixel(0, 0), Some([255, 0, 0]));
        assert_eq!(c.pixel(3, 0), Some([255, 255, 255]));
    }
}
