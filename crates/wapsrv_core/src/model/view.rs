//! Serializable views handed to the boundary layer.

use crate::model::object::WapObject;
use crate::page::Page;
use crate::vocab::oa;
use serde::Serialize;

/// A resolved annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotationView {
    /// Annotation IRI.
    pub iri: String,
    /// Current ETag.
    pub etag: Option<String>,
    /// Target IRIs or literals.
    pub targets: Vec<String>,
    /// `dcterms:created`.
    pub created: Option<String>,
    /// `dcterms:modified`.
    pub modified: Option<String>,
    /// Full description as N-Triples lines.
    pub triples: Vec<String>,
}

impl AnnotationView {
    /// Builds the view of a stored annotation.
    #[must_use]
    pub fn from_object(object: &WapObject) -> Self {
        Self {
            iri: object.iri().to_string(),
            etag: object.etag().map(str::to_string),
            targets: object
                .values(oa::HAS_TARGET)
                .into_iter()
                .map(str::to_string)
                .collect(),
            created: object.created().map(str::to_string),
            modified: object.modified().map(str::to_string),
            triples: object.to_ntriples(),
        }
    }
}

/// A container as returned by reads and creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerView {
    /// Container IRI.
    pub iri: String,
    /// `rdfs:label`.
    pub label: Option<String>,
    /// Current ETag.
    pub etag: Option<String>,
    /// `dcterms:created`.
    pub created: Option<String>,
    /// `dcterms:modified`.
    pub modified: Option<String>,
    /// Number of sub-containers.
    pub container_count: usize,
    /// Number of annotations.
    pub total_items: usize,
    /// Whether this is the minimal representation.
    pub minimal: bool,
    /// First page IRI, present when the container holds annotations.
    pub first: Option<String>,
    /// Last page IRI, present when the container holds annotations.
    pub last: Option<String>,
    /// Page 0, absent in the minimal representation.
    pub page: Option<Page>,
}

impl ContainerView {
    /// Builds the minimal view: description and counts only.
    #[must_use]
    pub fn minimal(object: &WapObject, container_count: usize, total_items: usize) -> Self {
        Self {
            iri: object.iri().to_string(),
            label: object.label().map(str::to_string),
            etag: object.etag().map(str::to_string),
            created: object.created().map(str::to_string),
            modified: object.modified().map(str::to_string),
            container_count,
            total_items,
            minimal: true,
            first: None,
            last: None,
            page: None,
        }
    }

    /// Builds the full view around an embedded first page.
    #[must_use]
    pub fn with_page(object: &WapObject, container_count: usize, page: Page) -> Self {
        let mut view = Self::minimal(object, container_count, page.total_items);
        view.minimal = false;
        view.first = page.first.clone();
        view.last = page.last.clone();
        view.page = Some(page);
        view
    }
}
