//! FlateDecode with a lenient fallback for damaged zlib data.

use crate::error::{PdfError, Result};
use flate2::{Decompress, FlushDecompress, Status};
use std::io::Read;

/// Inflate a zlib stream. Streams with a bad checksum or a truncated tail
/// return the bytes decoded before the failure; data that yields nothing at
/// all is an error.
pub fn flatedecode(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = flate2::read::ZlibDecoder::new(data);
    let mut out = Vec::with_capacity(data.len() * 3);
    match decoder.read_to_end(&mut out) {
        Ok(_) => Ok(out),
        Err(err) => {
            let partial = decompress_corrupted(data);
            if partial.is_empty() {
                return Err(PdfError::DecodeError(format!("FlateDecode: {err}")));
            }
            tracing::debug!(%err, recovered = partial.len(), "lenient inflate");
            Ok(partial)
        }
    }
}

/// Inflate until the decoder stops making progress, keeping everything it
/// produced before a corrupt or missing tail.
fn decompress_corrupted(data: &[u8]) -> Vec<u8> {
    // Raw deflate data (missing zlib header) is common enough to try first.
    let zlib_header = match data {
        [cmf, flg, ..] => cmf & 0x0f == 8 && (u16::from(*cmf) << 8 | u16::from(*flg)) % 31 == 0,
        _ => true,
    };
    let mut decoder = Decompress::new(zlib_header);
    let mut out = Vec::with_capacity(data.len() * 2);
    let mut buf = [0u8; 4096];
    loop {
        let consumed = decoder.total_in() as usize;
        let before_out = decoder.total_out();
        let res = decoder.decompress(&data[consumed.min(data.len())..], &mut buf, FlushDecompress::Sync);
        let produced = (decoder.total_out() - before_out) as usize;
        out.extend_from_slice(&buf[..produced]);
        let progressed = produced > 0 || decoder.total_in() as usize > consumed;
        match res {
            Ok(Status::StreamEnd) | Err(_) => break,
            Ok(_) if !progressed => break,
            Ok(_) => {}
        }
    }
    out
}
