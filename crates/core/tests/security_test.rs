//! Encrypted documents built with the standard security handler.

mod common;

use common::{PdfBuilder, pixel};
use pdfthumb_core::codec::aes_cbc_encrypt;
use pdfthumb_core::codec::arcfour::rc4;
use pdfthumb_core::document::PASSWORD_PADDING;
use pdfthumb_core::model::objects::PDFObject;
use pdfthumb_core::{OpenError, OpenOptions, RenderOptions};

const DOC_ID: &[u8; 16] = b"0123456789abcdef";
const PERMISSIONS: i32 = -4;
const CONTENT: &[u8] = b"1 0 0 rg 0 0 100 100 re f";

fn pad(password: &str) -> Vec<u8> {
    let bytes = &password.as_bytes()[..password.len().min(32)];
    bytes.iter().chain(&PASSWORD_PADDING[..32 - bytes.len()]).copied().collect()
}

fn rc4_rounds(key: &[u8], data: &[u8], rounds: std::ops::Range<u8>) -> Vec<u8> {
    rounds.fold(data.to_vec(), |acc, i| {
        let k: Vec<u8> = key.iter().map(|b| b ^ i).collect();
        rc4(&k, &acc).unwrap()
    })
}

/// Revision 2-4 /O, /U and file key.
struct Legacy {
    o: Vec<u8>,
    u: Vec<u8>,
    key: Vec<u8>,
}

fn legacy(r: i64, key_len: usize, user: &str, owner: &str) -> Legacy {
    let mut hash = md5::compute(pad(owner)).0.to_vec();
    if r >= 3 {
        for _ in 0..50 {
            hash = md5::compute(&hash).0.to_vec();
        }
    }
    let okey = &hash[..key_len];
    let o = if r == 2 {
        rc4(okey, &pad(user)).unwrap()
    } else {
        rc4_rounds(okey, &pad(user), 0..20)
    };

    let mut ctx = md5::Context::new();
    ctx.consume(pad(user));
    ctx.consume(&o);
    ctx.consume(PERMISSIONS.to_le_bytes());
    ctx.consume(DOC_ID);
    let mut key = ctx.finalize().0.to_vec();
    if r >= 3 {
        for _ in 0..50 {
            key = md5::compute(&key[..key_len]).0.to_vec();
        }
    }
    key.truncate(key_len);

    let u = if r == 2 {
        rc4(&key, &PASSWORD_PADDING).unwrap()
    } else {
        let mut ctx = md5::Context::new();
        ctx.consume(PASSWORD_PADDING);
        ctx.consume(DOC_ID);
        let mut u = rc4_rounds(&key, &ctx.finalize().0, 0..20);
        u.resize(32, 0);
        u
    };
    Legacy { o, u, key }
}

fn object_key(key: &[u8], objid: u32, aes: bool) -> Vec<u8> {
    let mut data = key.to_vec();
    data.extend_from_slice(&objid.to_le_bytes()[..3]);
    data.extend_from_slice(&[0, 0]);
    if aes {
        data.extend_from_slice(b"sAlT");
    }
    md5::compute(&data).0[..(key.len() + 5).min(16)].to_vec()
}

fn aes_encrypt(key: &[u8], data: &[u8]) -> Vec<u8> {
    let iv = [9u8; 16];
    let pad = 16 - data.len() % 16;
    let mut padded = data.to_vec();
    padded.extend(std::iter::repeat_n(pad as u8, pad));
    let mut out = iv.to_vec();
    out.extend(aes_cbc_encrypt(key, &iv, &padded).unwrap());
    out
}

/// One red page, plus object 5 holding the string `secret`.
fn encrypted_doc(encrypt: &str, seal: impl Fn(u32, &[u8]) -> Vec<u8>) -> Vec<u8> {
    PdfBuilder::new()
        .obj(1, "<< /Type /Catalog /Pages 2 0 R /Title 5 0 R >>")
        .obj(2, "<< /Type /Pages /Kids [3 0 R] /Count 1 /MediaBox [0 0 100 100] >>")
        .obj(3, "<< /Type /Page /Parent 2 0 R /Contents 4 0 R >>")
        .stream(4, "", &seal(4, CONTENT))
        .obj(5, &format!("<{}>", hex::encode(seal(5, b"secret"))))
        .obj(6, encrypt)
        .trailer(&format!("/Encrypt 6 0 R /ID [<{0}> <{0}>]", hex::encode(DOC_ID)))
        .build()
}

fn rc4_doc(v: i64, r: i64, key_len: usize, user: &str, owner: &str) -> Vec<u8> {
    let l = legacy(r, key_len, user, owner);
    let encrypt = format!(
        "<< /Filter /Standard /V {v} /R {r} /Length {} /O <{}> /U <{}> /P {PERMISSIONS} >>",
        key_len * 8,
        hex::encode(&l.o),
        hex::encode(&l.u)
    );
    encrypted_doc(&encrypt, |objid, data| rc4(&object_key(&l.key, objid, false), data).unwrap())
}

fn assert_readable(doc: &pdfthumb_core::PDFDocument) {
    assert!(doc.is_encrypted());
    assert_eq!(*doc.getobj(5).unwrap(), PDFObject::String(b"secret".to_vec()));
    let bitmap = pdfthumb_core::rasterize_page(doc, 0, &RenderOptions::new().scale(1.0)).unwrap();
    assert_eq!(pixel(&bitmap.data, bitmap.width, 50, 50), [255, 0, 0]);
}

#[test]
fn rc4_40_with_empty_user_password() {
    let doc = pdfthumb_core::open(rc4_doc(1, 2, 5, "", "owner")).unwrap();
    assert_readable(&doc);
}

#[test]
fn rc4_128_requires_the_user_password() {
    let data = rc4_doc(2, 3, 16, "user", "owner");
    let err = pdfthumb_core::open(data.clone()).unwrap_err();
    assert!(matches!(err, OpenError::Encrypted(_)), "{err:?}");

    let doc = pdfthumb_core::open_with_options(data.clone(), &OpenOptions::new().password("user")).unwrap();
    assert_readable(&doc);
}

#[test]
fn owner_password_also_opens() {
    let data = rc4_doc(2, 3, 16, "user", "owner");
    let doc = pdfthumb_core::open_with_options(data, &OpenOptions::new().password("owner")).unwrap();
    assert_readable(&doc);
}

#[test]
fn wrong_password_is_rejected() {
    let data = rc4_doc(1, 2, 5, "user", "owner");
    let err = pdfthumb_core::open_with_options(data, &OpenOptions::new().password("nope")).unwrap_err();
    assert!(matches!(err, OpenError::Encrypted(_)));
}

#[test]
fn aes_128_crypt_filters() {
    let l = legacy(4, 16, "", "owner");
    let encrypt = format!(
        "<< /Filter /Standard /V 4 /R 4 /Length 128 /O <{}> /U <{}> /P {PERMISSIONS} \
         /CF << /StdCF << /CFM /AESV2 /Length 16 /AuthEvent /DocOpen >> >> /StmF /StdCF /StrF /StdCF >>",
        hex::encode(&l.o),
        hex::encode(&l.u)
    );
    let data = encrypted_doc(&encrypt, |objid, data| aes_encrypt(&object_key(&l.key, objid, true), data));
    let doc = pdfthumb_core::open(data).unwrap();
    assert_readable(&doc);
}

#[test]
fn unsupported_handler_is_reported() {
    let data = PdfBuilder::new()
        .obj(1, "<< /Type /Catalog /Pages 2 0 R >>")
        .obj(2, "<< /Type /Pages /Kids [] /Count 0 >>")
        .obj(3, "<< /Filter /Adobe.PubSec /V 4 /R 4 >>")
        .trailer("/Encrypt 3 0 R")
        .build();
    assert!(matches!(pdfthumb_core::open(data), Err(OpenError::Encrypted(_))));
}
