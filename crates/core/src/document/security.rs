//! Standard security handler: authenticates a password and decrypts
//! strings and streams of encrypted documents.
//!
//! Covers RC4 (V1/V2, R2/R3), crypt filters (V4/R4 with V2 or AESV2) and
//! AES-256 (V5, R5/R6).

use crate::codec::aes::{aes_cbc_decrypt, aes_cbc_encrypt, decrypt_with_iv};
use crate::codec::arcfour::rc4;
use crate::error::{PdfError, Result};
use crate::model::objects::{PDFDict, PDFObject};
use sha2::{Digest, Sha256, Sha384, Sha512};

/// Password padding string used by the RC4-era key derivation.
pub const PASSWORD_PADDING: [u8; 32] = [
    0x28, 0xBF, 0x4E, 0x5E, 0x4E, 0x75, 0x8A, 0x41, 0x64, 0x00, 0x4E, 0x56, 0xFF, 0xFA, 0x01, 0x08,
    0x2E, 0x2E, 0x00, 0xB6, 0xD0, 0x68, 0x3E, 0x80, 0x2F, 0x0C, 0xA9, 0xFE, 0x64, 0x53, 0x69, 0x7A,
];

fn enc_err(msg: impl Into<String>) -> PdfError {
    PdfError::EncryptionError(msg.into())
}

fn get_int(d: &PDFDict, key: &str) -> Option<i64> {
    d.get(key).and_then(|v| v.as_int().ok())
}

fn get_bytes(d: &PDFDict, key: &str) -> Result<Vec<u8>> {
    d.get(key)
        .and_then(|v| v.as_string().ok())
        .map(<[u8]>::to_vec)
        .ok_or_else(|| enc_err(format!("/Encrypt has no /{key} string")))
}

/// Crypt filter method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptMethod {
    Identity,
    Rc4,
    AesV2,
    AesV3,
}

fn crypt_method(encrypt: &PDFDict, key: &str) -> Result<CryptMethod> {
    let name = encrypt
        .get(key)
        .and_then(|v| v.as_name().ok())
        .unwrap_or("Identity");
    if name == "Identity" {
        return Ok(CryptMethod::Identity);
    }
    let filter = encrypt
        .get("CF")
        .and_then(|cf| cf.get(name))
        .ok_or_else(|| enc_err(format!("crypt filter {name} not found in /CF")))?;
    match filter.get("CFM").and_then(|v| v.as_name().ok()).unwrap_or("None") {
        "V2" => Ok(CryptMethod::Rc4),
        "AESV2" => Ok(CryptMethod::AesV2),
        "AESV3" => Ok(CryptMethod::AesV3),
        "None" => Ok(CryptMethod::Identity),
        other => Err(enc_err(format!("unknown crypt filter method {other}"))),
    }
}

fn pad_password(password: &[u8]) -> [u8; 32] {
    let mut padded = PASSWORD_PADDING;
    let len = password.len().min(32);
    padded[..len].copy_from_slice(&password[..len]);
    padded[len..].copy_from_slice(&PASSWORD_PADDING[..32 - len]);
    padded
}

/// Parameters of the MD5/RC4 based revisions 2-4.
struct LegacyParams {
    r: i64,
    key_len: usize,
    o: Vec<u8>,
    u: Vec<u8>,
    p: u32,
    docid: Vec<u8>,
    encrypt_metadata: bool,
}

impl LegacyParams {
    /// Encryption key from a user password.
    fn compute_key(&self, password: &[u8]) -> Vec<u8> {
        let mut ctx = md5::Context::new();
        ctx.consume(pad_password(password));
        ctx.consume(&self.o);
        ctx.consume(self.p.to_le_bytes());
        ctx.consume(&self.docid);
        if self.r >= 4 && !self.encrypt_metadata {
            ctx.consume([0xff; 4]);
        }
        let mut hash = ctx.finalize().0.to_vec();
        if self.r >= 3 {
            for _ in 0..50 {
                hash = md5::compute(&hash[..self.key_len]).0.to_vec();
            }
        }
        hash.truncate(self.key_len);
        hash
    }

    fn compute_u(&self, key: &[u8]) -> Result<Vec<u8>> {
        if self.r == 2 {
            return rc4(key, &PASSWORD_PADDING);
        }
        let mut ctx = md5::Context::new();
        ctx.consume(PASSWORD_PADDING);
        ctx.consume(&self.docid);
        let mut result = rc4(key, &ctx.finalize().0)?;
        for i in 1..20u8 {
            let k: Vec<u8> = key.iter().map(|b| b ^ i).collect();
            result = rc4(&k, &result)?;
        }
        Ok(result)
    }

    fn authenticate_user(&self, password: &[u8]) -> Result<Option<Vec<u8>>> {
        let key = self.compute_key(password);
        let u = self.compute_u(&key)?;
        let matches = if self.r == 2 {
            u == self.u
        } else {
            self.u.len() >= 16 && u[..16] == self.u[..16]
        };
        Ok(matches.then_some(key))
    }

    /// Recover the user password from /O and authenticate with it.
    fn authenticate_owner(&self, password: &[u8]) -> Result<Option<Vec<u8>>> {
        let mut hash = md5::compute(pad_password(password)).0.to_vec();
        if self.r >= 3 {
            for _ in 0..50 {
                hash = md5::compute(&hash).0.to_vec();
            }
        }
        let key = &hash[..self.key_len];
        let user = if self.r == 2 {
            rc4(key, &self.o)?
        } else {
            let mut result = self.o.clone();
            for i in (0..20u8).rev() {
                let k: Vec<u8> = key.iter().map(|b| b ^ i).collect();
                result = rc4(&k, &result)?;
            }
            result
        };
        self.authenticate_user(&user)
    }
}

/// Parameters of the SHA-256 based revisions 5 and 6.
struct AesV3Params {
    r: i64,
    o: Vec<u8>,
    u: Vec<u8>,
    oe: Vec<u8>,
    ue: Vec<u8>,
}

impl AesV3Params {
    fn hash(&self, password: &[u8], salt: &[u8], vector: &[u8]) -> Result<Vec<u8>> {
        let mut k = Sha256::new()
            .chain_update(password)
            .chain_update(salt)
            .chain_update(vector)
            .finalize()
            .to_vec();
        if self.r == 5 {
            return Ok(k);
        }
        let mut round = 0u32;
        loop {
            let block: Vec<u8> = password.iter().chain(&k).chain(vector).copied().collect();
            let k1 = block.repeat(64);
            let e = aes_cbc_encrypt(&k[..16], &k[16..32], &k1)?;
            let selector = e[..16].iter().map(|&b| u32::from(b) % 3).sum::<u32>() % 3;
            k = match selector {
                0 => Sha256::digest(&e).to_vec(),
                1 => Sha384::digest(&e).to_vec(),
                _ => Sha512::digest(&e).to_vec(),
            };
            round += 1;
            let last = e.last().copied().map_or(0, u32::from);
            if round >= 64 && last <= round - 32 {
                break;
            }
        }
        k.truncate(32);
        Ok(k)
    }

    fn authenticate(&self, password: &str) -> Result<Option<Vec<u8>>> {
        let pw = &password.as_bytes()[..password.len().min(127)];
        let (o_hash, o_valid, o_key) = (&self.o[..32], &self.o[32..40], &self.o[40..48]);
        let (u_hash, u_valid, u_key) = (&self.u[..32], &self.u[32..40], &self.u[40..48]);
        let u48 = &self.u[..48];

        if self.hash(pw, o_valid, u48)? == o_hash {
            let kek = self.hash(pw, o_key, u48)?;
            return Ok(Some(aes_cbc_decrypt(&kek, &[0; 16], &self.oe[..32])?));
        }
        if self.hash(pw, u_valid, &[])? == u_hash {
            let kek = self.hash(pw, u_key, &[])?;
            return Ok(Some(aes_cbc_decrypt(&kek, &[0; 16], &self.ue[..32])?));
        }
        Ok(None)
    }
}

/// Authenticated standard security handler.
#[derive(Debug, Clone)]
pub struct StandardSecurityHandler {
    key: Vec<u8>,
    strf: CryptMethod,
    stmf: CryptMethod,
    encrypt_metadata: bool,
}

impl StandardSecurityHandler {
    /// Authenticate `password` (user first, then owner) against `/Encrypt`.
    pub fn new(encrypt: &PDFDict, doc_id: &[Vec<u8>], password: &str) -> Result<Self> {
        match encrypt.get("Filter").and_then(|f| f.as_name().ok()) {
            Some("Standard") | None => {}
            Some(other) => return Err(enc_err(format!("unsupported security handler /{other}"))),
        }
        let v = get_int(encrypt, "V").unwrap_or(0);
        let r = get_int(encrypt, "R").ok_or_else(|| enc_err("/Encrypt has no /R"))?;
        let encrypt_metadata = encrypt
            .get("EncryptMetadata")
            .and_then(|b| b.as_bool().ok())
            .unwrap_or(true);

        let (strf, stmf) = match v {
            1 | 2 => (CryptMethod::Rc4, CryptMethod::Rc4),
            4 | 5 => (crypt_method(encrypt, "StrF")?, crypt_method(encrypt, "StmF")?),
            other => return Err(enc_err(format!("unsupported encryption version V={other}"))),
        };

        let key = match r {
            2..=4 => {
                let key_len = match (v, r) {
                    (_, 2) => 5,
                    (4, _) => 16,
                    _ => (get_int(encrypt, "Length").unwrap_or(40).clamp(40, 128) / 8) as usize,
                };
                let params = LegacyParams {
                    r,
                    key_len,
                    o: get_bytes(encrypt, "O")?,
                    u: get_bytes(encrypt, "U")?,
                    p: get_int(encrypt, "P").ok_or_else(|| enc_err("/Encrypt has no /P"))? as u32,
                    docid: doc_id.first().cloned().unwrap_or_default(),
                    encrypt_metadata,
                };
                match params.authenticate_user(password.as_bytes())? {
                    Some(key) => Some(key),
                    None => params.authenticate_owner(password.as_bytes())?,
                }
            }
            5 | 6 => {
                let params = AesV3Params {
                    r,
                    o: get_bytes(encrypt, "O")?,
                    u: get_bytes(encrypt, "U")?,
                    oe: get_bytes(encrypt, "OE")?,
                    ue: get_bytes(encrypt, "UE")?,
                };
                if params.o.len() < 48 || params.u.len() < 48 || params.oe.len() < 32 || params.ue.len() < 32 {
                    return Err(enc_err("truncated /O, /U, /OE or /UE value"));
                }
                params.authenticate(password)?
            }
            other => return Err(enc_err(format!("unsupported revision R={other}"))),
        };

        let key = key.ok_or_else(|| enc_err("incorrect password"))?;
        tracing::debug!(v, r, ?strf, ?stmf, "document decrypted");
        Ok(Self {
            key,
            strf,
            stmf,
            encrypt_metadata,
        })
    }

    fn object_key(&self, objid: u32, genno: u32, aes: bool) -> Vec<u8> {
        let mut data = self.key.clone();
        data.extend_from_slice(&objid.to_le_bytes()[..3]);
        data.extend_from_slice(&genno.to_le_bytes()[..2]);
        if aes {
            data.extend_from_slice(b"sAlT");
        }
        let hash = md5::compute(&data);
        hash.0[..(self.key.len() + 5).min(16)].to_vec()
    }

    fn decrypt_with(&self, method: CryptMethod, objid: u32, genno: u32, data: &[u8]) -> Result<Vec<u8>> {
        match method {
            CryptMethod::Identity => Ok(data.to_vec()),
            CryptMethod::Rc4 => rc4(&self.object_key(objid, genno, false), data),
            CryptMethod::AesV2 => decrypt_with_iv(&self.object_key(objid, genno, true), data),
            CryptMethod::AesV3 => decrypt_with_iv(&self.key, data),
        }
    }

    pub fn decrypt_string(&self, objid: u32, genno: u32, data: &[u8]) -> Result<Vec<u8>> {
        self.decrypt_with(self.strf, objid, genno, data)
    }

    /// Streams with `/Type /XRef` are never encrypted; metadata streams are
    /// left alone when `/EncryptMetadata false`.
    pub fn decrypt_stream(&self, objid: u32, genno: u32, data: &[u8], attrs: &PDFDict) -> Result<Vec<u8>> {
        let is_type = |name: &str| matches!(attrs.get("Type"), Some(PDFObject::Name(n)) if n == name);
        if is_type("XRef") || (!self.encrypt_metadata && is_type("Metadata")) {
            return Ok(data.to_vec());
        }
        self.decrypt_with(self.stmf, objid, genno, data)
    }
}

/// Returns `None` when the document carries no `/Encrypt` dictionary.
pub fn create_security_handler(
    encrypt: &PDFDict,
    doc_id: &[Vec<u8>],
    password: &str,
) -> Result<Option<StandardSecurityHandler>> {
    if encrypt.is_empty() {
        return Ok(None);
    }
    StandardSecurityHandler::new(encrypt, doc_id, password).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_fills_short_passwords() {
        let p = pad_password(b"ab");
        assert_eq!(&p[..2], b"ab");
        assert_eq!(&p[2..], &PASSWORD_PADDING[..30]);
        assert_eq!(pad_password(b""), PASSWORD_PADDING);
    }

    #[test]
    fn empty_dict_means_no_handler() {
        assert!(create_security_handler(&PDFDict::new(), &[], "").unwrap().is_none());
    }

    #[test]
    fn public_key_handlers_are_rejected() {
        let mut d = PDFDict::new();
        d.insert("Filter".into(), PDFObject::Name("Adobe.PubSec".into()));
        d.insert("R".into(), PDFObject::Int(4));
        assert!(matches!(
            StandardSecurityHandler::new(&d, &[], ""),
            Err(PdfError::EncryptionError(_))
        ));
    }
}
