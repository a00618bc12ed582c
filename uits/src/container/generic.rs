//! Fallback handler for any file that doesn't match a known container:
//! hashes the whole file, refuses to embed.

use crate::crypto::sha256_bytes;
use crate::err::{UitsError, UitsResult};

pub fn media_hash(data: &[u8]) -> Vec<u8> {
    sha256_bytes(data)
}

pub fn embed(_data: &[u8], _token_xml: &str) -> UitsResult<Vec<u8>> {
    Err(UitsError::Embed(
        "this file format has no known embedding slot; write the token as a standalone file instead".into(),
    ))
}

pub fn extract(_data: &[u8]) -> UitsResult<Option<String>> {
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_whole_file() {
        assert_eq!(media_hash(b"anything at all"), sha256_bytes(b"anything at all"));
    }

    #[test]
    fn embed_is_refused() {
        assert!(embed(b"data", "<?xml?>").is_err());
    }
}
