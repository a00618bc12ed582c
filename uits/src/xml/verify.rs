//! Three-stage token verification: schema, then (optionally) media hash,
//! then signature — in that order, matching spec.md §4.2.

use roxmltree::Document;

use crate::crypto::{self, PublicKey};
use crate::err::{UitsError, UitsResult};
use crate::hash::{self, HashMatch};
use crate::xml::{builder, schema::Schema};

/// Non-fatal outcomes recorded during an otherwise-successful verify.
#[derive(Debug, Default)]
pub struct VerifyReport {
    pub hash_warning: Option<HashMatch>,
}

/// Verifies `xml` (the exact on-wire document bytes) against `schema`,
/// the optional `reference_hash` and `public_key`.
///
/// `xml` must be the literal serialized bytes as read from disk or
/// extracted from a container — never a re-serialization of a parsed tree,
/// since the signed range is recovered from it by substring search.
pub fn verify_document(
    xml: &str,
    schema: &Schema,
    reference_hash: Option<&[u8]>,
    public_key: &PublicKey,
) -> UitsResult<VerifyReport> {
    let doc = Document::parse(xml)
        .map_err(|e| UitsError::Schema(format!("malformed XML: {}", e)))?;

    schema.validate(&doc)?;

    let mut report = VerifyReport::default();

    if let Some(reference) = reference_hash {
        let media = doc
            .descendants()
            .find(|n| n.is_element() && n.tag_name().name() == "Media")
            .and_then(|n| n.text())
            .ok_or_else(|| UitsError::Hash("no <Media> element to compare against".into()))?;

        match hash::compare(media, reference)? {
            HashMatch::Exact => {}
            other => report.hash_warning = Some(other),
        }
    }

    let metadata_bytes = builder::metadata_subrange(xml)?;

    let signature = doc
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "signature")
        .ok_or_else(|| UitsError::Sig("no <signature> element".into()))?;

    let signature_text = signature
        .text()
        .ok_or_else(|| UitsError::Sig("<signature> element has no text content".into()))?;

    let signature_bytes = crypto::b64_decode(signature_text)?;

    public_key.verify(metadata_bytes.as_bytes(), &signature_bytes)?;

    Ok(report)
}
