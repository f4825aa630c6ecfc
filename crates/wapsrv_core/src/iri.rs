//! IRI conventions for containers, annotations and their sequences.
//!
//! Containers end with `/`; annotations live directly below their
//! container. Each container owns two sequence nodes, `<iri>#containers`
//! and `<iri>#annotations`, stored in the container's graph.

/// Fragment naming the sub-container sequence.
pub const CONTAINERS_FRAGMENT: &str = "#containers";
/// Fragment naming the annotation sequence.
pub const ANNOTATIONS_FRAGMENT: &str = "#annotations";

/// Returns the IRI of the container holding `iri`.
///
/// `http://x/wap/c1/` and `http://x/wap/c1` both yield `http://x/wap/`.
#[must_use]
pub fn parent_container_iri(iri: &str) -> Option<&str> {
    let trimmed = iri.strip_suffix('/').unwrap_or(iri);
    trimmed.rfind('/').map(|slash| &iri[..=slash])
}

/// IRI of a container's sub-container sequence.
#[must_use]
pub fn container_seq_iri(container_iri: &str) -> String {
    format!("{container_iri}{CONTAINERS_FRAGMENT}")
}

/// IRI of a container's annotation sequence.
#[must_use]
pub fn annotation_seq_iri(container_iri: &str) -> String {
    format!("{container_iri}{ANNOTATIONS_FRAGMENT}")
}

/// IRI of a child container created under `parent_iri` with `slug`.
#[must_use]
pub fn child_container_iri(parent_iri: &str, slug: &str) -> String {
    format!("{parent_iri}{slug}/")
}

/// Returns true if `iri` names a container rather than an annotation.
#[must_use]
pub fn is_container_iri(iri: &str) -> bool {
    iri.ends_with('/')
}

/// Returns true if `slug` is a legal path segment: `[A-Za-z0-9_-]+`.
#[must_use]
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
