//! Structural stand-in for XSD 1.0 validation.
//!
//! No published Rust crate validates arbitrary XSD 1.0 schemas (the gap the
//! original tool filled with `libxml2`). This checks the same things
//! `uitsValidatePayloadSchema` actually checked in practice: namespace,
//! required-element presence, and the signature element's required
//! attributes — not the full XSD type system. See DESIGN.md for the Open
//! Question this resolves.

use roxmltree::Document;

use crate::err::{UitsError, UitsResult};
use crate::token::Profile;

/// The fixed element/attribute requirements for one token profile.
pub struct Schema {
    profile: Profile,
    required_elements: &'static [&'static str],
}

impl Schema {
    pub fn for_profile(profile: Profile) -> Self {
        let required_elements: &'static [&'static str] = match profile {
            Profile::PerTrack => &["nonce", "Distributor", "ProductID", "Media"],
            Profile::Package => &["nonce", "Distributor", "ProductID", "TID"],
        };

        Schema {
            profile,
            required_elements,
        }
    }

    /// Validates `doc` against this schema's profile.
    ///
    /// Checks, in order: the root element carries the expected `uits`
    /// namespace, every required element is present somewhere under
    /// `<metadata>`, and the `signature` element carries its three required
    /// attributes with an accepted `algorithm` value.
    pub fn validate(&self, doc: &Document) -> UitsResult<()> {
        let root = doc.root_element();

        let namespace = root.tag_name().namespace();
        if namespace != Some(self.profile.namespace()) {
            return Err(UitsError::Schema(format!(
                "root element namespace '{}' does not match expected '{}'",
                namespace.unwrap_or("<none>"),
                self.profile.namespace()
            )));
        }

        let metadata = doc
            .descendants()
            .find(|n| n.is_element() && n.tag_name().name() == "metadata")
            .ok_or_else(|| UitsError::Schema("no <metadata> element".into()))?;

        for required in self.required_elements {
            let present = metadata
                .descendants()
                .any(|n| n.is_element() && n.tag_name().name() == *required);

            if !present {
                return Err(UitsError::Schema(format!(
                    "required element <{}> is missing",
                    required
                )));
            }
        }

        let signature = doc
            .descendants()
            .find(|n| n.is_element() && n.tag_name().name() == "signature")
            .ok_or_else(|| UitsError::Schema("no <signature> element".into()))?;

        for attr in ["algorithm", "canonicalization", "keyID"] {
            if signature.attribute(attr).is_none() {
                return Err(UitsError::Schema(format!(
                    "<signature> is missing required attribute '{}'",
                    attr
                )));
            }
        }

        match signature.attribute("algorithm") {
            Some("RSA2048") | Some("DSA2048") => {}
            Some(other) => {
                return Err(UitsError::Schema(format!(
                    "<signature algorithm=\"{}\"> is not a recognized algorithm",
                    other
                )))
            }
            None => unreachable!("checked above"),
        }

        if signature.attribute("canonicalization") != Some("none") {
            return Err(UitsError::Schema(
                "<signature canonicalization=\"...\"> must be \"none\"".into(),
            ));
        }

        Ok(())
    }
}
