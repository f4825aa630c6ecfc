//! Representation preferences a client can express for containers.

use crate::vocab::{ldp, oa};
use serde::{Deserialize, Serialize};

/// Which parts of a container the caller wants to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContainerPreferences {
    /// Only the container's own description, no embedded page.
    pub minimal_container: bool,
    /// Embedded pages list member IRIs only.
    pub contained_iris: bool,
    /// Embedded pages carry full member descriptions.
    pub contained_descriptions: bool,
}

impl ContainerPreferences {
    /// No explicit preference: full descriptions on page 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the minimal-container preference.
    #[must_use]
    pub const fn minimal_container(mut self, value: bool) -> Self {
        self.minimal_container = value;
        self
    }

    /// Sets the contained-IRIs preference.
    #[must_use]
    pub const fn contained_iris(mut self, value: bool) -> Self {
        self.contained_iris = value;
        self
    }

    /// Sets the contained-descriptions preference.
    #[must_use]
    pub const fn contained_descriptions(mut self, value: bool) -> Self {
        self.contained_descriptions = value;
        self
    }

    /// Returns true if pages should list IRIs instead of descriptions.
    #[must_use]
    pub const fn iris_only(&self) -> bool {
        self.contained_iris
    }

    /// Builds preferences from preference IRIs. Returns `None` on an
    /// unknown IRI.
    #[must_use]
    pub fn from_iris<'a>(iris: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        let mut preferences = Self::default();
        for iri in iris {
            match iri {
                ldp::PREFER_MINIMAL_CONTAINER => preferences.minimal_container = true,
                oa::PREFER_CONTAINED_IRIS => preferences.contained_iris = true,
                oa::PREFER_CONTAINED_DESCRIPTIONS => preferences.contained_descriptions = true,
                _ => return None,
            }
        }
        Some(preferences)
    }

    /// Parses a `Prefer` header value of the form
    /// `return=representation;include="IRI IRI ..."`.
    ///
    /// Returns `None` if the value does not have that shape or names an
    /// unknown preference.
    #[must_use]
    pub fn parse_prefer_header(header: &str) -> Option<Self> {
        let rest = header.trim().strip_prefix("return=representation;")?;
        let rest = rest.trim().strip_prefix("include=")?.trim();
        let list = rest.strip_prefix('"')?.strip_suffix('"')?;
        Self::from_iris(list.split_whitespace())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_prefers_descriptions() {
        let preferences = ContainerPreferences::new();
        assert!(!preferences.iris_only());
        assert!(!preferences.minimal_container);
    }

    #[test]
    fn parse_header_with_several_iris() {
        let header = format!(
            "return=representation;include=\"{}  {}\"",
            ldp::PREFER_MINIMAL_CONTAINER,
            oa::PREFER_CONTAINED_IRIS
        );
        let preferences = ContainerPreferences::parse_prefer_header(&header).unwrap();
        assert!(preferences.minimal_container);
        assert!(preferences.iris_only());
        assert!(!preferences.contained_descriptions);
    }

    #[test]
    fn parse_header_rejects_other_shapes() {
        assert!(ContainerPreferences::parse_prefer_header("return=minimal").is_none());
        assert!(ContainerPreferences::parse_prefer_header(
            "return=representation;include=\"http://unknown/\""
        )
        .is_none());
        assert!(ContainerPreferences::parse_prefer_header(
            "return=representation;include=http://www.w3.org/ns/oa#PreferContainedIRIs"
        )
        .is_none());
    }
}
