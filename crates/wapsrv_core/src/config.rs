//! Engine configuration.

use crate::error::{WapError, WapResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Storage strategy for container member sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceBackend {
    /// `rdf:Seq` membership triples inside the container's own graph.
    #[default]
    Graph,
    /// Rows in an ordered side table keyed by the sequence IRI.
    Indexed,
}

/// Configuration for opening an engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WapConfig {
    /// IRI of the root container. Must end with `/`.
    pub root_container_iri: String,

    /// Label seeded into the root container.
    pub root_container_label: String,

    /// Number of annotations per page.
    pub page_size: usize,

    /// Whether container posts must carry an `rdfs:label`.
    pub label_mandatory_in_containers: bool,

    /// Whether container posts must carry a slug.
    pub slug_mandatory_in_container_post: bool,

    /// Whether one annotation post may carry several annotations.
    pub multiple_annotation_post: bool,

    /// Storage strategy for member sequences.
    pub sequence_backend: SequenceBackend,

    /// Directory of the file-backed store, `None` for in-memory.
    pub database_path: Option<PathBuf>,
}

impl Default for WapConfig {
    fn default() -> Self {
        Self {
            root_container_iri: "http://localhost:8080/wap/".to_string(),
            root_container_label: "The Root Container".to_string(),
            page_size: 20,
            label_mandatory_in_containers: false,
            slug_mandatory_in_container_post: false,
            multiple_annotation_post: true,
            sequence_backend: SequenceBackend::Graph,
            database_path: None,
        }
    }
}

impl WapConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a configuration from a JSON file. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the file cannot be read, is not valid
    /// JSON, or fails [`WapConfig::validate`].
    pub fn from_json_file(path: &Path) -> WapResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            WapError::invalid_config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|e| {
            WapError::invalid_config(format!("cannot parse {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that have no meaningful interpretation.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for a zero page size or a root IRI that
    /// does not end with `/`.
    pub fn validate(&self) -> WapResult<()> {
        if self.page_size == 0 {
            return Err(WapError::invalid_config("page_size must be at least 1"));
        }
        if !self.root_container_iri.ends_with('/') {
            return Err(WapError::invalid_config(format!(
                "root_container_iri must end with '/': {}",
                self.root_container_iri
            )));
        }
        Ok(())
    }

    /// Sets the root container IRI.
    #[must_use]
    pub fn root_container_iri(mut self, iri: impl Into<String>) -> Self {
        self.root_container_iri = iri.into();
        self
    }

    /// Sets the root container label.
    #[must_use]
    pub fn root_container_label(mut self, label: impl Into<String>) -> Self {
        self.root_container_label = label.into();
        self
    }

    /// Sets the page size.
    #[must_use]
    pub const fn page_size(mut self, size: usize) -> Self {
        self.page_size = size;
        self
    }

    /// Sets whether container labels are mandatory.
    #[must_use]
    pub const fn label_mandatory_in_containers(mut self, value: bool) -> Self {
        self.label_mandatory_in_containers = value;
        self
    }

    /// Sets whether container posts require a slug.
    #[must_use]
    pub const fn slug_mandatory_in_container_post(mut self, value: bool) -> Self {
        self.slug_mandatory_in_container_post = value;
        self
    }

    /// Sets whether several annotations may be posted at once.
    #[must_use]
    pub const fn multiple_annotation_post(mut self, value: bool) -> Self {
        self.multiple_annotation_post = value;
        self
    }

    /// Sets the sequence storage strategy.
    #[must_use]
    pub const fn sequence_backend(mut self, backend: SequenceBackend) -> Self {
        self.sequence_backend = backend;
        self
    }

    /// Sets the store directory.
    #[must_use]
    pub fn database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = Some(path.into());
        self
    }
}
