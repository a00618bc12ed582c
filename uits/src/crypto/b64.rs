//! Base64 encode/decode, with the optional 76-column line wrap the signature
//! element's text content is allowed to carry.
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::err::{UitsError, UitsResult};

const WRAP_COLUMN: usize = 76;

/// Plain, unwrapped Base64 encode.
pub fn encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Base64 encode, with a newline inserted every 76 characters.
pub fn encode_wrapped(data: &[u8]) -> String {
    let flat = encode(data);
    let mut out = String::with_capacity(flat.len() + flat.len() / WRAP_COLUMN + 1);

    for (i, chunk) in flat.as_bytes().chunks(WRAP_COLUMN).enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(std::str::from_utf8(chunk).unwrap());
    }

    out
}

/// Decodes Base64 text, ignoring any embedded whitespace (the newline-wrapped form).
pub fn decode(text: &str) -> UitsResult<Vec<u8>> {
    let stripped: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(stripped)
        .map_err(|e| UitsError::Value(format!("invalid base64: {}", e)))
}
