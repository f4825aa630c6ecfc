//! Pagination over a container's annotation sequence.
//!
//! Pages are never stored. Each one is computed from the live sequence
//! inside a single transaction, addressed as
//! `CONTAINER?iris={0|1}&page=N` with `N` counted from zero.

mod assembler;
mod request;

pub use assembler::{page_bounds, PageAssembler};
pub use request::PageRequest;

use crate::model::AnnotationView;
use serde::Serialize;

/// IRI of page `page_nr` of `container_iri`.
#[must_use]
pub fn page_iri(container_iri: &str, iris_only: bool, page_nr: u64) -> String {
    format!("{container_iri}?iris={}&page={page_nr}", u8::from(iris_only))
}

/// Number of the last page, or `None` for an empty sequence.
#[must_use]
pub fn last_page_number(total: usize, page_size: usize) -> Option<u64> {
    if total == 0 || page_size == 0 {
        return None;
    }
    u64::try_from((total - 1) / page_size).ok()
}

/// One page entry: a bare IRI or a resolved annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PageItem {
    /// Member IRI only.
    Iri(String),
    /// Full annotation description.
    Annotation(AnnotationView),
}

impl PageItem {
    /// IRI of the member.
    #[must_use]
    pub fn iri(&self) -> &str {
        match self {
            Self::Iri(iri) => iri,
            Self::Annotation(view) => &view.iri,
        }
    }
}

/// A slice of a container's annotation sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// IRI of this page.
    pub iri: String,
    /// Container the page belongs to.
    pub part_of: String,
    /// Zero-based page number.
    pub page_number: u64,
    /// Whether items are IRIs only.
    pub iris_only: bool,
    /// Members of the whole sequence.
    pub total_items: usize,
    /// Zero-based position of the first item in the sequence.
    pub start_index: usize,
    /// Next page, absent on the last page.
    pub next: Option<String>,
    /// Previous page, absent on page 0.
    pub prev: Option<String>,
    /// Page 0, absent for an empty sequence.
    pub first: Option<String>,
    /// Last page, absent for an empty sequence.
    pub last: Option<String>,
    /// Container label.
    pub label: Option<String>,
    /// Container `dcterms:modified`.
    pub modified: Option<String>,
    /// Members in sequence order.
    pub items: Vec<PageItem>,
}

impl Page {
    /// Member IRIs in order.
    #[must_use]
    pub fn item_iris(&self) -> Vec<&str> {
        self.items.iter().map(PageItem::iri).collect()
    }

    /// Number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the page has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
