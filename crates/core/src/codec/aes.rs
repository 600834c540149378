//! AES-CBC helpers for encrypted documents.

use crate::error::{PdfError, Result};
use aes::cipher::block_padding::NoPadding;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use cbc::{Decryptor, Encryptor};

type Aes128CbcDec = Decryptor<aes::Aes128>;
type Aes256CbcDec = Decryptor<aes::Aes256>;
type Aes256CbcEnc = Encryptor<aes::Aes256>;
type Aes128CbcEnc = Encryptor<aes::Aes128>;

fn cipher_error(what: &str) -> PdfError {
    PdfError::EncryptionError(what.to_string())
}

/// Decrypt AES-CBC without unpadding. The key is 16 or 32 bytes, the IV 16
/// bytes, and a trailing partial block is dropped.
pub fn aes_cbc_decrypt(key: &[u8], iv: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    if iv.len() != 16 {
        return Err(cipher_error("AES IV must be 16 bytes"));
    }
    let mut buf = data[..data.len() - data.len() % 16].to_vec();
    match key.len() {
        16 => Aes128CbcDec::new(key.into(), iv.into())
            .decrypt_padded_mut::<NoPadding>(&mut buf)
            .map_err(|_| cipher_error("AES-128 decryption failed"))?,
        32 => Aes256CbcDec::new(key.into(), iv.into())
            .decrypt_padded_mut::<NoPadding>(&mut buf)
            .map_err(|_| cipher_error("AES-256 decryption failed"))?,
        n => return Err(cipher_error(&format!("AES key must be 16 or 32 bytes, got {n}"))),
    };
    Ok(buf)
}

/// Encrypt whole blocks with AES-CBC and no padding.
pub fn aes_cbc_encrypt(key: &[u8], iv: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    if iv.len() != 16 || data.len() % 16 != 0 {
        return Err(cipher_error("AES input must be whole blocks with a 16 byte IV"));
    }
    let mut buf = data.to_vec();
    let len = buf.len();
    match key.len() {
        16 => Aes128CbcEnc::new(key.into(), iv.into())
            .encrypt_padded_mut::<NoPadding>(&mut buf, len)
            .map_err(|_| cipher_error("AES-128 encryption failed"))?,
        32 => Aes256CbcEnc::new(key.into(), iv.into())
            .encrypt_padded_mut::<NoPadding>(&mut buf, len)
            .map_err(|_| cipher_error("AES-256 encryption failed"))?,
        n => return Err(cipher_error(&format!("AES key must be 16 or 32 bytes, got {n}"))),
    };
    Ok(buf)
}

/// Strip PKCS#7 padding; invalid padding leaves the data untouched.
pub fn unpad_aes(data: &[u8]) -> &[u8] {
    let Some(&last) = data.last() else {
        return data;
    };
    let pad = usize::from(last);
    if pad == 0 || pad > 16 || pad > data.len() {
        return data;
    }
    let start = data.len() - pad;
    if data[start..].iter().all(|&b| b == last) {
        &data[..start]
    } else {
        data
    }
}

/// Decrypt a string or stream body whose first 16 bytes are the IV.
pub fn decrypt_with_iv(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    if data.len() < 16 {
        return Ok(Vec::new());
    }
    let (iv, body) = data.split_at(16);
    let plain = aes_cbc_decrypt(key, iv, body)?;
    Ok(unpad_aes(&plain).to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_with_iv_prefix() {
        let key = [7u8; 16];
        let iv = [1u8; 16];
        let mut padded = b"thumbnail".to_vec();
        padded.extend(std::iter::repeat_n(7u8, 7));
        let mut data = iv.to_vec();
        data.extend(aes_cbc_encrypt(&key, &iv, &padded).unwrap());
        assert_eq!(decrypt_with_iv(&key, &data).unwrap(), b"thumbnail");
    }

    #[test]
    fn bad_padding_is_kept() {
        assert_eq!(unpad_aes(&[1, 2, 3, 0]), &[1, 2, 3, 0]);
        assert_eq!(unpad_aes(&[9, 2, 2]), &[9]);
    }

    #[test]
    fn wrong_key_length_is_an_error() {
        assert!(aes_cbc_decrypt(&[0; 5], &[0; 16], &[0; 16]).is_err());
    }
}
