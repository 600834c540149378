//! JPEG output.

use crate::error::RenderError;
use crate::raster::Canvas;
use image::ExtendedColorType;
use image::codecs::jpeg::JpegEncoder;

/// Encodes `canvas` as a baseline JPEG. `quality` is clamped to 1..=100.
pub fn encode_jpeg(canvas: &Canvas, quality: u8) -> Result<Vec<u8>, RenderError> {
    if canvas.width() == 0 || canvas.height() == 0 {
        return Err(RenderError::Encoding(format!(
            "cannot encode a {}x{} image",
            canvas.width(),
            canvas.height()
        )));
    }
    let width = u32::try_from(canvas.width()).map_err(|_| RenderError::Encoding("image too wide".into()))?;
    let height = u32::try_from(canvas.height()).map_err(|_| RenderError::Encoding("image too tall".into()))?;
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100))
        .encode(canvas.as_raw(), width, height, ExtendedColorType::Rgb8)
        .map_err(|err| RenderError::Encoding(err.to_string()))?;
    Ok(out)
}
