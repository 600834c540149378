//! Codec modules for PDF stream compression and encryption.
//!
//! - `filters`: the decode pipeline driven by `/Filter` and `/DecodeParms`
//! - `flate`, `lzw`, `ascii85`, `runlength`, `predictor`: individual stages
//! - `arcfour`, `aes`: ciphers used by the standard security handler

pub mod aes;
pub mod arcfour;
pub mod ascii85;
pub mod filters;
pub mod flate;
pub mod lzw;
pub mod predictor;
pub mod runlength;

pub use aes::{aes_cbc_decrypt, aes_cbc_encrypt, decrypt_with_iv, unpad_aes};
pub use arcfour::Arcfour;
pub use ascii85::{ascii85decode, asciihexdecode};
pub use filters::{DecodeParms, Decoded, Filter, apply_filter, decode_pipeline, filter_chain};
pub use flate::flatedecode;
pub use lzw::{lzwdecode, lzwdecode_with_earlychange};
pub use runlength::rldecode;
