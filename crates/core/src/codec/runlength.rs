//! RunLength stream decoder.

use crate::error::Result;

/// Decode RunLength-encoded data.
///
/// - length byte 0-127: copy the next `length + 1` bytes
/// - length byte 128: end of data
/// - length byte 129-255: repeat the next byte `257 - length` times
///
/// A run cut short by the end of input keeps the bytes that are present.
pub fn rldecode(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() * 2);
    let mut rest = data;

    while let Some((&length, tail)) = rest.split_first() {
        rest = tail;
        match length {
            128 => break,
            0..=127 => {
                let count = (usize::from(length) + 1).min(rest.len());
                out.extend_from_slice(&rest[..count]);
                rest = &rest[count..];
            }
            129..=255 => {
                let Some((&byte, tail)) = rest.split_first() else {
                    break;
                };
                out.extend(std::iter::repeat_n(byte, 257 - usize::from(length)));
                rest = tail;
            }
        }
    }
    Ok(out)
}
