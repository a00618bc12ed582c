//! HTML container handler: the token is a literal text splice just before
//! `</head>`, not a parsed-and-re-serialized DOM edit.
//!
//! Grounded on `examples/original_source/source/uitsHTMLManager.c`.

use crate::crypto::sha256_bytes;
use crate::err::{UitsError, UitsResult};

const TOKEN_START: &str = "<uits:UITS";
const HEAD_CLOSE: &str = "</head>";

fn existing_token_range(text: &str) -> Option<(usize, usize)> {
    let start = text.find(TOKEN_START)?;
    let head_close = text[start..].find(HEAD_CLOSE)? + start;
    Some((start, head_close))
}

pub fn is_valid(data: &[u8]) -> bool {
    let Ok(text) = std::str::from_utf8(data) else {
        return false;
    };
    roxmltree::Document::parse(text).is_ok()
}

pub fn media_hash(data: &[u8]) -> UitsResult<Vec<u8>> {
    let text = std::str::from_utf8(data)
        .map_err(|e| UitsError::Uits(format!("HTML file is not valid UTF-8: {}", e)))?;

    let hashed = match existing_token_range(text) {
        Some((start, end)) => {
            let mut out = String::with_capacity(text.len());
            out.push_str(&text[..start]);
            out.push_str(&text[end..]);
            out
        }
        None => text.to_string(),
    };

    Ok(sha256_bytes(hashed.as_bytes()))
}

/// Strips a leading `<?xml ... ?>` prolog, if present, from `token_xml`.
fn strip_prolog(token_xml: &str) -> &str {
    let trimmed = token_xml.trim_start();
    if let Some(rest) = trimmed.strip_prefix("<?xml") {
        if let Some(end) = rest.find("?>") {
            return rest[end + 2..].trim_start();
        }
    }
    trimmed
}

pub fn embed(data: &[u8], token_xml: &str) -> UitsResult<Vec<u8>> {
    let text = std::str::from_utf8(data)
        .map_err(|e| UitsError::Uits(format!("HTML file is not valid UTF-8: {}", e)))?;

    if existing_token_range(text).is_some() {
        return Err(UitsError::Embed(
            "file already carries a UITS token before </head>".into(),
        ));
    }

    let insert_at = text
        .find(HEAD_CLOSE)
        .ok_or_else(|| UitsError::Embed("no </head> tag to insert before".into()))?;

    let stripped = strip_prolog(token_xml);

    let mut out = String::with_capacity(text.len() + stripped.len());
    out.push_str(&text[..insert_at]);
    out.push_str(stripped);
    out.push_str(&text[insert_at..]);

    Ok(out.into_bytes())
}

pub fn extract(data: &[u8]) -> UitsResult<Option<String>> {
    let text = std::str::from_utf8(data)
        .map_err(|e| UitsError::Uits(format!("HTML file is not valid UTF-8: {}", e)))?;

    Ok(existing_token_range(text).map(|(start, end)| text[start..end].to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "<html><head><title>t</title></head><body></body></html>";

    #[test]
    fn detects_xml_parseable_document() {
        assert!(is_valid(PAGE.as_bytes()));
    }

    #[test]
    fn embed_then_extract_round_trips() {
        let token = "<?xml version=\"1.0\"?><uits:UITS>content</uits:UITS>";
        let embedded = embed(PAGE.as_bytes(), token).unwrap();
        let extracted = extract(&embedded).unwrap().unwrap();
        assert_eq!(extracted, "<uits:UITS>content</uits:UITS>");
    }

    #[test]
    fn media_hash_excises_existing_token() {
        let token = "<?xml version=\"1.0\"?><uits:UITS>content</uits:UITS>";
        let embedded = embed(PAGE.as_bytes(), token).unwrap();
        assert_eq!(media_hash(&embedded).unwrap(), media_hash(PAGE.as_bytes()).unwrap());
    }

    #[test]
    fn embed_rejects_file_with_existing_token() {
        let token = "<?xml version=\"1.0\"?><uits:UITS>content</uits:UITS>";
        let embedded = embed(PAGE.as_bytes(), token).unwrap();
        assert!(embed(&embedded, token).is_err());
    }
}
