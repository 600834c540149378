//! Clip masks.
//!
//! A clip is a full-canvas coverage map. Setting a new clip multiplies it
//! into the current one, so the visible region only ever shrinks.

use super::fill::CoverageMask;

#[derive(Debug, Clone, PartialEq)]
pub struct ClipMask {
    width: usize,
    height: usize,
    data: Vec<f32>,
    /// Pixel box outside which every value is zero: `(x0, y0, x1, y1)`.
    bounds: (usize, usize, usize, usize),
}

impl ClipMask {
    /// A clip covering exactly `coverage`.
    pub fn from_coverage(coverage: Option<&CoverageMask>, width: usize, height: usize) -> Self {
        let mut data = vec![0.0f32; width * height];
        let mut bounds = (0, 0, 0, 0);
        if let Some(cov) = coverage {
            let x1 = (cov.x0 + cov.width).min(width);
            let y1 = (cov.y0 + cov.height).min(height);
            for y in cov.y0..y1 {
                for x in cov.x0..x1 {
                    data[y * width + x] = cov.get(x, y);
                }
            }
            bounds = (cov.x0.min(x1), cov.y0.min(y1), x1, y1);
        }
        Self {
            width,
            height,
            data,
            bounds,
        }
    }

    /// This clip multiplied by `coverage`; pixels outside it drop to zero.
    pub fn intersect(&self, coverage: Option<&CoverageMask>) -> Self {
        let Some(cov) = coverage else {
            return Self::from_coverage(None, self.width, self.height);
        };
        let x0 = self.bounds.0.max(cov.x0);
        let y0 = self.bounds.1.max(cov.y0);
        let x1 = self.bounds.2.min(cov.x0 + cov.width);
        let y1 = self.bounds.3.min(cov.y0 + cov.height);
        let mut data = vec![0.0f32; self.width * self.height];
        if x0 < x1 && y0 < y1 {
            for y in y0..y1 {
                for x in x0..x1 {
                    let i = y * self.width + x;
                    data[i] = self.data[i] * cov.get(x, y);
                }
            }
        }
        Self {
            width: self.width,
            height: self.height,
            data,
            bounds: if x0 < x1 && y0 < y1 { (x0, y0, x1, y1) } else { (0, 0, 0, 0) },
        }
    }

    /// Clip factor at pixel `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> f32 {
        if x >= self.width || y >= self.height {
            return 0.0;
        }
        self.data[y * self.width + x]
    }

    pub const fn bounds(&self) -> (usize, usize, usize, usize) {
        self.bounds
    }

    pub const fn is_empty(&self) -> bool {
        self.bounds.0 >= self.bounds.2 || self.bounds.1 >= self.bounds.3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersection_never_grows() {
        let a = CoverageMask::full(0, 0, 6, 6);
        let b = CoverageMask::full(4, 4, 6, 6);
        let clip = ClipMask::from_coverage(Some(&a), 10, 10).intersect(Some(&b));
        assert_eq!(clip.get(5, 5), 1.0);
        assert_eq!(clip.get(2, 2), 0.0);
        assert_eq!(clip.get(8, 8), 0.0);
        assert_eq!(clip.bounds(), (4, 4, 6, 6));
    }

    #[test]
    fn partial_coverage_multiplies() {
        let mut half = CoverageMask::full(0, 0, 2, 2);
        half.data.iter_mut().for_each(|v| *v = 0.5);
        let clip = ClipMask::from_coverage(Some(&half), 4, 4).intersect(Some(&half));
        assert_eq!(clip.get(1, 1), 0.25);
    }

    #[test]
    fn disjoint_clips_are_empty() {
        let a = CoverageMask::full(0, 0, 2, 2);
        let b = CoverageMask::full(5, 5, 2, 2);
        let clip = ClipMask::from_coverage(Some(&a), 10, 10).intersect(Some(&b));
        assert!(clip.is_empty());
        assert!(ClipMask::from_coverage(None, 4, 4).is_empty());
    }
}
