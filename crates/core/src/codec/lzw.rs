//! LZW stream decoder using the weezl crate.

use crate::error::Result;
use weezl::{BitOrder, decode::Decoder};

/// Decode LZW data with the default `/EarlyChange 1`.
pub fn lzwdecode(data: &[u8]) -> Result<Vec<u8>> {
    lzwdecode_with_earlychange(data, 1)
}

/// Decode LZW data (MSB first, 8-bit symbols).
///
/// `/EarlyChange 1` is the PDF default and corresponds to weezl's TIFF-style
/// early code-size switch; `0` switches at the full table size. Corrupt input
/// yields whatever was decoded before the error.
pub fn lzwdecode_with_earlychange(data: &[u8], early_change: i64) -> Result<Vec<u8>> {
    let mut decoder = if early_change == 0 {
        Decoder::new(BitOrder::Msb, 8)
    } else {
        Decoder::with_tiff_size_switch(BitOrder::Msb, 8)
    };
    let mut output = Vec::new();
    let status = decoder.into_vec(&mut output).decode(data);
    if let Err(err) = status.status {
        tracing::debug!(%err, decoded = output.len(), "LZW stream truncated");
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use weezl::encode::Encoder;

    #[test]
    fn decodes_early_change_stream() {
        let text = b"-----A---B-----A---B-----A---B";
        let encoded = Encoder::with_tiff_size_switch(BitOrder::Msb, 8)
            .encode(text)
            .unwrap();
        assert_eq!(lzwdecode(&encoded).unwrap(), text);
    }

    #[test]
    fn decodes_reference_sample() {
        let data = b"\x80\x0b\x60\x50\x22\x0c\x0c\x85\x01";
        assert_eq!(lzwdecode(data).unwrap(), b"-----A---B");
    }

    #[test]
    fn garbage_yields_partial_output() {
        assert!(lzwdecode(&[0xff, 0xff, 0xff]).is_ok());
    }
}
