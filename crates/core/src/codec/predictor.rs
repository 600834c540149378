//! PNG and TIFF predictors applied after Flate/LZW decoding.

use crate::error::Result;

/// Paeth predictor function used in PNG filtering.
const fn paeth(left: u8, above: u8, upper_left: u8) -> u8 {
    let a = left as i16;
    let b = above as i16;
    let c = upper_left as i16;
    let p = a + b - c;
    let pa = (p - a).abs();
    let pb = (p - b).abs();
    let pc = (p - c).abs();
    if pa <= pb && pa <= pc {
        left
    } else if pb <= pc {
        above
    } else {
        upper_left
    }
}

/// Undo PNG row filters (`/Predictor` 10-15). Every row carries its own
/// filter-type byte; a short final row is dropped.
pub fn png_unpredict(data: &[u8], columns: usize, colors: usize, bpc: usize) -> Result<Vec<u8>> {
    let row_bytes = (colors * columns * bpc).div_ceil(8);
    let bpp = (colors * bpc / 8).max(1);
    if row_bytes == 0 {
        return Ok(Vec::new());
    }
    let row_size = row_bytes + 1;

    let mut out = Vec::with_capacity(data.len() / row_size * row_bytes);
    let mut prev = vec![0u8; row_bytes];
    let mut cur = vec![0u8; row_bytes];

    for row in data.chunks_exact(row_size) {
        let (filter, raw) = (row[0], &row[1..]);
        for i in 0..row_bytes {
            let left = if i >= bpp { cur[i - bpp] } else { 0 };
            let up = prev[i];
            let up_left = if i >= bpp { prev[i - bpp] } else { 0 };
            let predicted = match filter {
                1 => left,
                2 => up,
                3 => ((u16::from(left) + u16::from(up)) / 2) as u8,
                4 => paeth(left, up, up_left),
                _ => 0,
            };
            cur[i] = raw[i].wrapping_add(predicted);
        }
        out.extend_from_slice(&cur);
        std::mem::swap(&mut prev, &mut cur);
    }
    Ok(out)
}

/// Undo TIFF predictor 2 (horizontal differencing) for 8-bit components.
/// Other depths pass through unchanged.
pub fn tiff_unpredict(data: &[u8], columns: usize, colors: usize, bpc: usize) -> Result<Vec<u8>> {
    let mut out = data.to_vec();
    if bpc != 8 || columns == 0 || colors == 0 {
        return Ok(out);
    }
    let row_bytes = columns * colors;
    for row in out.chunks_mut(row_bytes) {
        for i in colors..row.len() {
            row[i] = row[i].wrapping_add(row[i - colors]);
        }
    }
    Ok(out)
}
