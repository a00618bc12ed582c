//! Renders a [`TokenModel`](crate::token::TokenModel) to the on-disk XML form
//! and signs the deterministic `<metadata>` byte range.

use chrono::Utc;

use crate::crypto::{self, Algorithm, KeyPair};
use crate::err::{UitsError, UitsResult};
use crate::token::{self, Profile, TokenModel};

const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Fills `Time` with the current UTC instant in extended ISO-8601
/// (`YYYY-MM-DDThh:mm:ssZ`) if the caller didn't supply one.
pub fn fill_default_time(model: &mut TokenModel) {
    let present = model
        .get("Time")
        .and_then(|s| s.value.as_ref())
        .map(|v| !v.is_empty())
        .unwrap_or(false);

    if !present {
        let now = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
        // Time is always a defined slot on both profiles; unwrap is safe.
        model.set("Time", now).unwrap();
    }
}

fn escape_text(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

/// Renders the literal `<metadata>…</metadata>` substring for `model`.
///
/// Multi-valued slots (e.g. `URLS`) expand into one child element per
/// comma-split value, named with [`token::singular_name`], with the
/// slot's lone attribute split the same way and bound positionally.
/// Mismatched split counts are a fatal value error, matching spec.md §4.2.
pub fn render_metadata(model: &TokenModel) -> UitsResult<String> {
    let mut out = String::new();
    out.push_str("<metadata>");

    for slot in model.elements() {
        if slot.value.is_none() {
            continue;
        }

        if slot.multi {
            let values = slot.split_values();
            let attr = slot.attributes.first();
            let attr_values: Vec<&str> = match attr.and_then(|a| a.value.as_deref()) {
                Some(v) if !v.is_empty() => v.split(',').collect(),
                _ => Vec::new(),
            };

            if !attr_values.is_empty() && attr_values.len() != values.len() {
                return Err(UitsError::Value(format!(
                    "{} has {} value(s) but its attribute has {}",
                    slot.name,
                    values.len(),
                    attr_values.len()
                )));
            }

            let singular = token::singular_name(&slot.name);

            for (i, value) in values.iter().enumerate() {
                out.push('<');
                out.push_str(&singular);

                if let (Some(attr), Some(av)) = (attr, attr_values.get(i)) {
                    out.push(' ');
                    out.push_str(&attr.name);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(av));
                    out.push('"');
                }

                out.push('>');
                out.push_str(&escape_text(value));
                out.push_str("</");
                out.push_str(&singular);
                out.push('>');
            }
        } else {
            out.push('<');
            out.push_str(&slot.name);

            for attr in &slot.attributes {
                if let Some(v) = &attr.value {
                    out.push(' ');
                    out.push_str(&attr.name);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(v));
                    out.push('"');
                }
            }

            out.push('>');
            out.push_str(&escape_text(slot.value.as_deref().unwrap_or("")));
            out.push_str("</");
            out.push_str(&slot.name);
            out.push('>');
        }
    }

    out.push_str("</metadata>");
    Ok(out)
}

/// Finds the literal `<metadata>…</metadata>` substring in an already
/// serialized document.
///
/// This is the function the verifier calls on the on-wire bytes instead of
/// re-serializing the parsed tree — see the module doc for why.
pub fn metadata_subrange(xml: &str) -> UitsResult<&str> {
    const OPEN: &str = "<metadata>";
    const CLOSE: &str = "</metadata>";

    let start = xml
        .find(OPEN)
        .ok_or_else(|| UitsError::Payload("no <metadata> element in document".into()))?;
    let close_at = xml[start..]
        .find(CLOSE)
        .ok_or_else(|| UitsError::Payload("unterminated <metadata> element".into()))?;

    Ok(&xml[start..start + close_at + CLOSE.len()])
}

/// Builds the full signed document for `model`, signing with `keypair` and
/// stamping the `signature` element with `algorithm`/`key_id`.
///
/// `multiline_b64` selects the 76-column-wrapped Base64 form for the
/// signature text, matching the CLI's `--ml` switch.
pub fn build_document(
    model: &mut TokenModel,
    algorithm: Algorithm,
    keypair: &KeyPair,
    key_id: &str,
    multiline_b64: bool,
) -> UitsResult<String> {
    fill_default_time(model);
    model.validate_required()?;

    let metadata_xml = render_metadata(model)?;
    let signature_bytes = keypair.sign(metadata_xml.as_bytes())?;
    let signature_b64 = if multiline_b64 {
        crypto::b64_encode_wrapped(&signature_bytes.0)
    } else {
        crypto::b64_encode(&signature_bytes.0)
    };

    let profile = model.profile();
    let root = profile.root_element();
    let namespace = profile.namespace();

    let signature_xml = format!(
        "<signature algorithm=\"{}\" canonicalization=\"none\" keyID=\"{}\">{}</signature>",
        algorithm.as_str(),
        escape_attr(key_id),
        signature_b64
    );

    let document = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <uits:{root} xmlns:xsi=\"{xsi}\" xmlns:uits=\"{ns}\">\n\
         {metadata}\n{signature}\n\
         </uits:{root}>\n",
        root = root,
        xsi = XSI_NAMESPACE,
        ns = namespace,
        metadata = metadata_xml,
        signature = signature_xml,
    );

    // The design note in spec.md §9 asks that a fresh document's extracted
    // metadata range agree byte-for-byte with what was actually signed;
    // assert it rather than trust it by construction.
    debug_assert_eq!(metadata_subrange(&document).ok(), Some(metadata_xml.as_str()));

    Ok(document)
}
