//! Media-hash comparison policy: the three accepted encodings for the `Media`
//! element's text against a freshly computed reference hash, checked in the
//! order spec §4.3 fixes (exact, then Base64-of-reference, then
//! case-insensitive) because that order is what decides which diagnostic is
//! emitted.

use crate::crypto;
use crate::err::{UitsError, UitsResult};

/// Which of the three accepted encodings matched, if not a byte-for-byte hit.
///
/// `Exact` never needs to be logged; the other two are warnings the caller
/// (verify orchestrator) surfaces to the user.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HashMatch {
    Exact,
    Base64OfReference,
    CaseInsensitive,
}

fn hex_lower(bytes: &[u8]) -> String {
    crypto::hex(bytes)
}

/// Compares `token_text` (the `Media` element's stored value) against
/// `reference` (freshly computed audio-region hash bytes).
///
/// Check order matters: a reference that happens to equal both its own hex
/// and Base64 form (vanishingly unlikely, but not impossible for short
/// inputs) is reported as an exact match, never a warning.
pub fn compare(token_text: &str, reference: &[u8]) -> UitsResult<HashMatch> {
    let reference_hex = hex_lower(reference);

    if token_text == reference_hex {
        return Ok(HashMatch::Exact);
    }

    // The original tool Base64-encodes the hex *text* of the hash, not the raw
    // digest bytes (uitsPayloadManager.c's uitsBase64Encode call takes the
    // already-hex-stringified calculatedMediaHashValue). The stored
    // signature's own newline pattern decides which Base64 flavor to compare
    // against, matching how the verifier auto-detects wrapping.
    let wrapped = token_text.contains('\n');
    let reference_b64 = if wrapped {
        crypto::b64_encode_wrapped(reference_hex.as_bytes())
    } else {
        crypto::b64_encode(reference_hex.as_bytes())
    };

    if token_text == reference_b64 {
        log::warn!("Media hash matched only after Base64-encoding the reference hash");
        return Ok(HashMatch::Base64OfReference);
    }

    if token_text.eq_ignore_ascii_case(&reference_hex) {
        log::warn!("Media hash matched only case-insensitively");
        return Ok(HashMatch::CaseInsensitive);
    }

    Err(UitsError::Hash(format!(
        "media hash mismatch: token holds '{}', reference hashes to '{}'",
        token_text, reference_hex
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_hex_match() {
        let reference = b"hello world";
        let hex = hex_lower(&crypto::sha256_bytes(reference));
        assert_eq!(compare(&hex, reference).unwrap(), HashMatch::Exact);
    }

    #[test]
    fn uppercase_hex_is_a_warning_match() {
        let reference = b"hello world";
        let hex = hex_lower(&crypto::sha256_bytes(reference)).to_uppercase();
        assert_eq!(compare(&hex, reference).unwrap(), HashMatch::CaseInsensitive);
    }

    #[test]
    fn base64_of_reference_is_a_warning_match() {
        let reference = b"hello world";
        let hex = hex_lower(&crypto::sha256_bytes(reference));
        let b64 = crypto::b64_encode(hex.as_bytes());
        assert_eq!(compare(&b64, reference).unwrap(), HashMatch::Base64OfReference);
    }

    #[test]
    fn mismatched_hash_fails() {
        let reference = b"hello world";
        assert!(compare("deadbeef", reference).is_err());
    }
}
