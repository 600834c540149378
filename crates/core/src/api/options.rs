//! Options for opening documents and rendering pages.
//!
//! # Example
//! ```ignore
//! use pdfthumb_core::RenderOptions;
//!
//! let options = RenderOptions::new()
//!     .scale(1.0)
//!     .quality(90)
//!     .use_crop_box(true);
//! ```

use crate::document::DEFAULT_CACHE_CAPACITY;

/// Options for opening a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenOptions {
    /// User or owner password for encrypted PDFs.
    pub password: String,

    /// Maximum number of parsed objects kept in the document cache.
    pub cache_capacity: usize,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            password: String::new(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the password for encrypted PDFs.
    pub fn password(mut self, pwd: &str) -> Self {
        self.password = pwd.to_string();
        self
    }

    pub const fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }
}

/// Options for rendering one page.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Pixels per PDF point.
    pub scale: f64,

    /// JPEG quality, clamped to 1..=100.
    pub quality: u8,

    /// Canvas color before any content is painted.
    pub background: [u8; 3],

    /// Render the CropBox instead of the MediaBox.
    pub use_crop_box: bool,

    /// Four sub-scanline anti-aliasing; off gives hard edges.
    pub anti_alias: bool,

    /// Largest canvas (width * height) a render may allocate.
    pub max_pixels: u64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            scale: 2.0,
            quality: 80,
            background: [255, 255, 255],
            use_crop_box: false,
            anti_alias: true,
            max_pixels: 100_000_000,
        }
    }
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of pixels per PDF point.
    ///
    /// # Arguments
    /// * `scale` - Must be positive and finite; anything else fails the render.
    pub const fn scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub const fn quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    pub const fn background(mut self, rgb: [u8; 3]) -> Self {
        self.background = rgb;
        self
    }

    pub const fn use_crop_box(mut self, on: bool) -> Self {
        self.use_crop_box = on;
        self
    }

    pub const fn anti_alias(mut self, on: bool) -> Self {
        self.anti_alias = on;
        self
    }

    pub const fn max_pixels(mut self, limit: u64) -> Self {
        self.max_pixels = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_defaults() {
        let opts = RenderOptions::default();
        assert_eq!(opts.scale, 2.0);
        assert_eq!(opts.quality, 80);
        assert_eq!(opts.background, [255, 255, 255]);
        assert!(!opts.use_crop_box);
        assert!(opts.anti_alias);
        assert_eq!(opts.max_pixels, 100_000_000);
    }

    #[test]
    fn builder_chains() {
        let opts = RenderOptions::new().scale(0.5).quality(95).anti_alias(false).max_pixels(10);
        assert_eq!(opts.scale, 0.5);
        assert_eq!(opts.quality, 95);
        assert!(!opts.anti_alias);
        assert_eq!(opts.max_pixels, 10);

        let open = OpenOptions::new().password("pw").cache_capacity(3);
        assert_eq!(open.password, "pw");
        assert_eq!(open.cache_capacity, 3);
    }
}
