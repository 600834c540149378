//! Drawing decoded images through a transform.

use super::canvas::Canvas;
use super::clip::ClipMask;
use crate::utils::{Matrix, apply_matrix_rect, invert_matrix};

/// Decoded image samples: RGB8 plus optional 8-bit alpha, row 0 at the top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: usize,
    pub height: usize,
    pub rgb: Vec<u8>,
    pub alpha: Option<Vec<u8>>,
}

impl RasterImage {
    fn sample(&self, col: usize, row: usize) -> ([u8; 3], f32) {
        let i = row * self.width + col;
        let rgb = self
            .rgb
            .get(i * 3..i * 3 + 3)
            .map_or([0, 0, 0], |s| [s[0], s[1], s[2]]);
        let a = self
            .alpha
            .as_ref()
            .map_or(1.0, |m| f32::from(m.get(i).copied().unwrap_or(255)) / 255.0);
        (rgb, a)
    }
}

/// Draws `image` mapped onto the unit square transformed by `m` (unit
/// square to device pixels). Each covered device pixel samples the nearest
/// image pixel.
pub fn draw_image(canvas: &mut Canvas, image: &RasterImage, m: Matrix, alpha: f64, clip: Option<&ClipMask>) {
    if image.width == 0 || image.height == 0 {
        return;
    }
    let Some(inv) = invert_matrix(m) else {
        return;
    };
    let (bx0, by0, bx1, by1) = apply_matrix_rect(m, (0.0, 0.0, 1.0, 1.0));
    let mut x0 = bx0.floor().max(0.0) as usize;
    let mut y0 = by0.floor().max(0.0) as usize;
    let mut x1 = (bx1.ceil().max(0.0) as usize).min(canvas.width());
    let mut y1 = (by1.ceil().max(0.0) as usize).min(canvas.height());
    if let Some(clip) = clip {
        let b = clip.bounds();
        (x0, y0, x1, y1) = (x0.max(b.0), y0.max(b.1), x1.min(b.2), y1.min(b.3));
    }
    let alpha = alpha.clamp(0.0, 1.0) as f32;
    let (w, h) = (image.width as f64, image.height as f64);

    for y in y0..y1 {
        let py = y as f64 + 0.5;
        for x in x0..x1 {
            let px = x as f64 + 0.5;
            let u = inv.0 * px + inv.2 * py + inv.4;
            let v = inv.1 * px + inv.3 * py + inv.5;
            if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
                continue;
            }
            let col = ((u * w) as usize).min(image.width - 1);
            let row = (((1.0 - v) * h) as usize).min(image.height - 1);
            let (rgb, mut a) = image.sample(col, row);
            a *= alpha;
            if let Some(clip) = clip {
                a *= clip.get(x, y);
            }
            canvas.blend(x, y, rgb, a);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> RasterImage {
        // Top row red/green, bottom row blue/white.
        RasterImage {
            width: 2,
            height: 2,
            rgb: vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255],
            alpha: None,
        }
    }

    #[test]
    fn image_rows_run_top_down() {
        let mut canvas = Canvas::new(4, 4, [0, 0, 0]);
        // Unit square to a 4x4 box with y pointing down.
        draw_image(&mut canvas, &checker(), (4.0, 0.0, 0.0, -4.0, 0.0, 4.0), 1.0, None);
        assert_eq!(canvas.pixel(0, 0), Some([255, 0, 0]));
        assert_eq!(canvas.pixel(3, 0), Some([0, 255, 0]));
        assert_eq!(canvas.pixel(0, 3), Some([0, 0, 255]));
        assert_eq!(canvas.pixel(3, 3), Some([255, 255, 255]));
    }

    #[test]
    fn transparent_samples_leave_background() {
        let mut img = checker();
        img.alpha = Some(vec![0, 255, 255, 255]);
        let mut canvas = Canvas::new(2, 2, [9, 9, 9]);
        draw_image(&mut canvas, &img, (2.0, 0.0, 0.0, -2.0, 0.0, 2.0), 1.0, None);
        assert_eq!(canvas.pixel(0, 0), Some([9, 9, 9]));
        assert_eq!(canvas.pixel(1, 0), Some([0, 255, 0]));
    }

    #[test]
    fn singular_matrix_draws_nothing() {
        let mut canvas = Canvas::new(2, 2, [9, 9, 9]);
        draw_image(&mut canvas, &checker(), (0.0, 0.0, 0.0, 0.0, 1.0, 1.0), 1.0, None);
        assert_eq!(canvas.as_raw(), &[9; 12]);
    }
}
