//! Digests, signatures and Base64 — the crypto surface a token create/verify needs.

mod b64;
mod digest;
mod sign;

pub use b64::{decode as b64_decode, encode as b64_encode, encode_wrapped as b64_encode_wrapped};
pub use digest::{hex, sha1_hex, sha224_hex, sha256_bytes, sha256_hex};
pub use sign::{Algorithm, KeyPair, PublicKey, Signature};
