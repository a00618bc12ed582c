//! SHA-1/224/256 wrappers used by media hashing, key fingerprints and signing.
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256};

/// SHA-256 of `data`, raw bytes — the media-hash algorithm for every container.
pub fn sha256_bytes(data: &[u8]) -> Vec<u8> {
    Sha256::digest(data).to_vec()
}

/// Lowercase hex SHA-256, the form `Media`'s value is stored in by default.
pub fn sha256_hex(data: &[u8]) -> String {
    hex(&sha256_bytes(data))
}

/// Lowercase hex SHA-224, paired with DSA2048 signatures.
pub fn sha224_hex(data: &[u8]) -> String {
    hex(&Sha224::digest(data))
}

/// Lowercase hex SHA-1, used for public-key fingerprints (`keyID` derivation on request).
pub fn sha1_hex(data: &[u8]) -> String {
    hex(&Sha1::digest(data))
}

/// Lowercase hex encoding of arbitrary bytes (a raw media hash, a signature, ...).
pub fn hex(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        write!(out, "{:02x}", b).unwrap();
    }
    out
}
