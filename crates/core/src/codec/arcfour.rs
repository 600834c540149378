//! Arcfour (RC4) stream cipher.

use crate::error::{PdfError, Result};

/// RC4 stream cipher with a 1-256 byte key.
pub struct Arcfour {
    state: [u8; 256],
    i: u8,
    j: u8,
}

impl Arcfour {
    pub fn new(key: &[u8]) -> Result<Self> {
        if key.is_empty() || key.len() > 256 {
            return Err(PdfError::EncryptionError(format!(
                "RC4 key must be 1-256 bytes, got {}",
                key.len()
            )));
        }
        let mut state: [u8; 256] = std::array::from_fn(|i| i as u8);
        let mut j: u8 = 0;
        for i in 0..256 {
            j = j.wrapping_add(state[i]).wrapping_add(key[i % key.len()]);
            state.swap(i, j as usize);
        }
        Ok(Self { state, i: 0, j: 0 })
    }

    /// Encrypt or decrypt; RC4 is symmetric.
    pub fn process(&mut self, data: &[u8]) -> Vec<u8> {
        data.iter().map(|byte| byte ^ self.next_byte()).collect()
    }

    fn next_byte(&mut self) -> u8 {
        self.i = self.i.wrapping_add(1);
        self.j = self.j.wrapping_add(self.state[self.i as usize]);
        self.state.swap(self.i as usize, self.j as usize);
        let idx = self.state[self.i as usize].wrapping_add(self.state[self.j as usize]);
        self.state[idx as usize]
    }
}

/// One-shot RC4 over `data`.
pub fn rc4(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    Ok(Arcfour::new(key)?.process(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vectors() {
        assert_eq!(
            hex::encode(rc4(b"Key", b"Plaintext").unwrap()),
            "bbf316e8d940af0ad3"
        );
        assert_eq!(
            hex::encode(rc4(b"Secret", b"Attack at dawn").unwrap()),
            "45a01f645fc35b383552544b9bf5"
        );
    }

    #[test]
    fn empty_key_is_rejected() {
        assert!(Arcfour::new(b"").is_err());
    }
}
