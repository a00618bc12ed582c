//! The ordered token descriptor: the in-memory shape of a UITS payload before
//! it is rendered to XML, and after it is parsed back out of one.

use indexmap::IndexMap;

use crate::err::{UitsError, UitsResult};

/// Which of the two fixed element layouts a token uses.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Profile {
    /// Per-track tokens: namespace `http://www.udirector.net/schemas/2009/uits/1.1`.
    PerTrack,
    /// Package-level tokens: namespace `http://www.udirector.net/schemas/2011/cmeuits/1.2`.
    Package,
}

impl Profile {
    pub fn namespace(self) -> &'static str {
        match self {
            Profile::PerTrack => "http://www.udirector.net/schemas/2009/uits/1.1",
            Profile::Package => "http://www.udirector.net/schemas/2011/cmeuits/1.2",
        }
    }

    /// Both profiles share the same root element name (`<uits:UITS>`);
    /// only the bound namespace URI tells them apart, per spec.md §6.
    pub fn root_element(self) -> &'static str {
        "UITS"
    }
}

/// A single named attribute on an element slot.
#[derive(Clone, Debug, Default)]
pub struct AttributeSlot {
    pub name: String,
    pub value: Option<String>,
}

impl AttributeSlot {
    pub fn new(name: impl Into<String>) -> Self {
        AttributeSlot {
            name: name.into(),
            value: None,
        }
    }

    pub fn with_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        AttributeSlot {
            name: name.into(),
            value: Some(value.into()),
        }
    }
}

/// One element slot in the token descriptor: a name, an optional value, whether
/// the element is allowed to carry a comma-split list of values, and its
/// attribute slots (in declaration order).
#[derive(Clone, Debug)]
pub struct ElementSlot {
    pub name: String,
    pub value: Option<String>,
    pub multi: bool,
    pub attributes: Vec<AttributeSlot>,
}

impl ElementSlot {
    pub fn new(name: impl Into<String>, multi: bool) -> Self {
        ElementSlot {
            name: name.into(),
            value: None,
            multi,
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, attr: AttributeSlot) -> Self {
        self.attributes.push(attr);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeSlot> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn attribute_mut(&mut self, name: &str) -> Option<&mut AttributeSlot> {
        self.attributes.iter_mut().find(|a| a.name == name)
    }

    /// Splits `value` on commas if `multi` is set; otherwise returns the single value.
    ///
    /// Empty values produce an empty vector, never a vector holding one empty string.
    pub fn split_values(&self) -> Vec<&str> {
        match &self.value {
            None => Vec::new(),
            Some(v) if v.is_empty() => Vec::new(),
            Some(v) if self.multi => v.split(',').collect(),
            Some(v) => vec![v.as_str()],
        }
    }
}

/// The ordered element map making up one token, plus the profile it was built for.
#[derive(Clone)]
pub struct TokenModel {
    profile: Profile,
    elements: IndexMap<String, ElementSlot>,
}

impl TokenModel {
    /// Builds the fixed, empty element layout for `profile`, in declaration order.
    pub fn blank(profile: Profile) -> Self {
        let mut elements = IndexMap::new();

        let mut insert = |slot: ElementSlot| {
            elements.insert(slot.name.clone(), slot);
        };

        insert(ElementSlot::new("nonce", false));
        insert(ElementSlot::new("Distributor", false));
        insert(ElementSlot::new("Time", false));
        insert(
            ElementSlot::new("ProductID", false)
                .with_attribute(AttributeSlot::new("type"))
                .with_attribute(AttributeSlot::new("completed")),
        );

        if profile == Profile::PerTrack {
            insert(ElementSlot::new("AssetID", false).with_attribute(AttributeSlot::new("type")));
        }

        insert(ElementSlot::new("TID", false).with_attribute(AttributeSlot::new("version")));

        if profile == Profile::PerTrack {
            insert(ElementSlot::new("UID", false).with_attribute(AttributeSlot::new("version")));
            insert(
                ElementSlot::new("Media", false).with_attribute(AttributeSlot::new("algorithm")),
            );
        }

        insert(ElementSlot::new("URL", false).with_attribute(AttributeSlot::new("type")));
        insert(ElementSlot::new("URLS", true).with_attribute(AttributeSlot::new("type")));
        insert(ElementSlot::new("PA", false));
        insert(ElementSlot::new("Copyright", false).with_attribute(AttributeSlot::new("value")));
        insert(ElementSlot::new("Extra", false).with_attribute(AttributeSlot::new("type")));
        insert(ElementSlot::new("Extras", true).with_attribute(AttributeSlot::new("type")));

        if profile == Profile::Package {
            // Package-level tokens drop the `completed` attribute entirely.
            if let Some(slot) = elements.get_mut("ProductID") {
                slot.attributes.retain(|a| a.name != "completed");
            }
        }

        TokenModel { profile, elements }
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn elements(&self) -> impl Iterator<Item = &ElementSlot> {
        self.elements.values()
    }

    pub fn get(&self, name: &str) -> Option<&ElementSlot> {
        self.elements.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ElementSlot> {
        self.elements.get_mut(name)
    }

    /// Sets the value of an existing element slot.
    ///
    /// # Errors
    /// Returns `UitsError::Value` if `name` isn't a slot this profile defines.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> UitsResult<()> {
        let slot = self
            .elements
            .get_mut(name)
            .ok_or_else(|| UitsError::Value(format!("unknown element '{}'", name)))?;
        slot.value = Some(value.into());
        Ok(())
    }

    pub fn set_attribute(
        &mut self,
        element: &str,
        attribute: &str,
        value: impl Into<String>,
    ) -> UitsResult<()> {
        let slot = self
            .elements
            .get_mut(element)
            .ok_or_else(|| UitsError::Value(format!("unknown element '{}'", element)))?;
        let attr = slot.attribute_mut(attribute).ok_or_else(|| {
            UitsError::Value(format!("element '{}' has no attribute '{}'", element, attribute))
        })?;
        attr.value = Some(value.into());
        Ok(())
    }

    /// Checks the required-presence invariants for this profile.
    ///
    /// Does not check multi-valued/attribute positional correspondence — that is
    /// checked at render time in `xml::builder`, against the comma-split counts.
    pub fn validate_required(&self) -> UitsResult<()> {
        let has = |name: &str| {
            self.elements
                .get(name)
                .and_then(|s| s.value.as_ref())
                .map(|v| !v.is_empty())
                .unwrap_or(false)
        };

        if !has("nonce") {
            return Err(UitsError::Payload("nonce is required".into()));
        }
        if !has("Distributor") {
            return Err(UitsError::Payload("Distributor is required".into()));
        }
        if !has("ProductID") {
            return Err(UitsError::Payload("ProductID is required".into()));
        }

        match self.profile {
            Profile::PerTrack => {
                if !has("TID") && !has("UID") {
                    return Err(UitsError::Payload(
                        "at least one of TID or UID is required".into(),
                    ));
                }
                if !has("Media") {
                    return Err(UitsError::Payload("Media is required".into()));
                }
            }
            Profile::Package => {
                if !has("TID") {
                    return Err(UitsError::Payload("TID is required".into()));
                }
            }
        }

        Ok(())
    }
}

/// Derives the singular form of a multi-valued element's name (`URLS` -> `URL`).
///
/// The source strips exactly one trailing pluralizing character; this port keeps
/// that rule rather than a general English pluralization, matching spec's element set.
pub fn singular_name(plural: &str) -> String {
    match plural.chars().last() {
        Some('S') | Some('s') => plural[..plural.len() - 1].to_string(),
        _ => plural.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_track_has_media_and_uid() {
        let model = TokenModel::blank(Profile::PerTrack);
        assert!(model.get("Media").is_some());
        assert!(model.get("UID").is_some());
        assert!(model.get("AssetID").is_some());
    }

    #[test]
    fn package_drops_per_track_only_elements() {
        let model = TokenModel::blank(Profile::Package);
        assert!(model.get("Media").is_none());
        assert!(model.get("UID").is_none());
        assert!(model.get("AssetID").is_none());
        assert!(model.get("ProductID").unwrap().attribute("completed").is_none());
    }

    #[test]
    fn validate_required_catches_missing_nonce() {
        let mut model = TokenModel::blank(Profile::PerTrack);
        model.set("Distributor", "D").unwrap();
        model.set("ProductID", "P").unwrap();
        model.set("TID", "T").unwrap();
        model.set("Media", "abc").unwrap();
        assert!(model.validate_required().is_err());
        model.set("nonce", "N").unwrap();
        assert!(model.validate_required().is_ok());
    }

    #[test]
    fn singular_name_strips_trailing_s() {
        assert_eq!(singular_name("URLS"), "URL");
        assert_eq!(singular_name("Extras"), "Extra");
    }

    #[test]
    fn split_values_respects_multi_flag() {
        let mut slot = ElementSlot::new("URLS", true);
        slot.value = Some("a,b,c".into());
        assert_eq!(slot.split_values(), vec!["a", "b", "c"]);

        let mut slot = ElementSlot::new("PA", false);
        slot.value = Some("a,b".into());
        assert_eq!(slot.split_values(), vec!["a,b"]);
    }
}
