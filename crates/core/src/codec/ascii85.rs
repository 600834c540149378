//! ASCII85 and ASCIIHex stream decoders.

use crate::error::Result;

const fn ascii85_digit(byte: u8) -> u32 {
    (byte - b'!') as u32
}

/// Decode ASCII85-encoded data.
///
/// Accepts an optional `<~` prefix, stops at `~>` (or at the end of input when
/// the marker is missing), skips whitespace and expands `z` to four zero bytes.
pub fn ascii85decode(data: &[u8]) -> Result<Vec<u8>> {
    let body = data.strip_prefix(b"<~").unwrap_or(data);
    let body = match body.iter().position(|&b| b == b'~') {
        Some(end) => &body[..end],
        None => body,
    };

    let mut out = Vec::with_capacity(body.len() / 5 * 4 + 4);
    let mut group = [0u8; 5];
    let mut filled = 0;
    for &byte in body {
        match byte {
            b'z' if filled == 0 => out.extend_from_slice(&[0; 4]),
            b'!'..=b'u' => {
                group[filled] = byte;
                filled += 1;
                if filled == 5 {
                    let value = group.iter().fold(0u32, |acc, &b| {
                        acc.wrapping_mul(85).wrapping_add(ascii85_digit(b))
                    });
                    out.extend_from_slice(&value.to_be_bytes());
                    filled = 0;
                }
            }
            _ => {}
        }
    }

    // A partial group of n characters encodes n - 1 bytes, padded with 'u'.
    if filled > 1 {
        group[filled..].fill(b'u');
        let value = group.iter().fold(0u32, |acc, &b| {
            acc.wrapping_mul(85).wrapping_add(ascii85_digit(b))
        });
        out.extend_from_slice(&value.to_be_bytes()[..filled - 1]);
    }
    Ok(out)
}

/// Decode ASCIIHex-encoded data. Stops at `>`; an odd final digit is padded
/// with zero.
pub fn asciihexdecode(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() / 2);
    let mut pending: Option<u8> = None;

    for &byte in data {
        let nibble = match byte {
            b'0'..=b'9' => byte - b'0',
            b'a'..=b'f' => byte - b'a' + 10,
            b'A'..=b'F' => byte - b'A' + 10,
            b'>' => break,
            _ => continue,
        };
        match pending.take() {
            Some(high) => out.push((high << 4) | nibble),
            None => pending = Some(nibble),
        }
    }
    if let Some(high) = pending {
        out.push(high << 4);
    }
    Ok(out)
}
