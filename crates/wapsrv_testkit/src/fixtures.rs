//! Test fixtures and engine helpers.
//!
//! Provides convenience functions for setting up test engines
//! and common test scenarios.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wapsrv_core::vocab::{activity, ldp, oa, rdf, rdfs};
use wapsrv_core::{WapConfig, WapEngine};
use wapsrv_storage::{Graph, Term, Triple};

/// Root container IRI used by all fixtures.
pub const TEST_ROOT: &str = "http://test.local/wap/";

/// Default configuration for tests: the fixture root and a page size of 10.
pub fn test_config() -> WapConfig {
    WapConfig::new().root_container_iri(TEST_ROOT).page_size(10)
}

/// A test engine with automatic cleanup.
pub struct TestEngine {
    /// The engine instance.
    pub engine: WapEngine,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: Option<TempDir>,
}

impl TestEngine {
    /// Creates an engine over an in-memory store.
    pub fn memory() -> Self {
        Self::memory_with(test_config())
    }

    /// Creates an in-memory engine with a custom configuration.
    pub fn memory_with(config: WapConfig) -> Self {
        Self {
            engine: WapEngine::open_in_memory(config).expect("Failed to open in-memory engine"),
            _temp_dir: None,
        }
    }

    /// Creates an engine over a file store in a temporary directory.
    pub fn file() -> Self {
        Self::file_with(test_config())
    }

    /// Creates a file-backed engine with a custom configuration. Any
    /// `database_path` in `config` is replaced by the temporary directory.
    pub fn file_with(config: WapConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = config.database_path(temp_dir.path().join("store"));
        Self {
            engine: WapEngine::open(config).expect("Failed to open file engine"),
            _temp_dir: Some(temp_dir),
        }
    }

    /// Returns the store path if file-based, None if in-memory.
    pub fn path(&self) -> Option<PathBuf> {
        self._temp_dir.as_ref().map(|d| d.path().join("store"))
    }

    /// Closes the engine and opens a new one on the same directory.
    ///
    /// # Panics
    ///
    /// Panics for an in-memory engine.
    pub fn reopen(self) -> Self {
        let Self { engine, _temp_dir } = self;
        let config = engine.config().clone();
        assert!(config.database_path.is_some(), "Only file engines can be reopened");
        drop(engine);
        Self {
            engine: WapEngine::open(config).expect("Failed to reopen file engine"),
            _temp_dir,
        }
    }
}

impl std::ops::Deref for TestEngine {
    type Target = WapEngine;

    fn deref(&self) -> &Self::Target {
        &self.engine
    }
}

/// Runs a test with a temporary in-memory engine.
///
/// # Example
///
/// ```rust
/// use wapsrv_testkit::{with_engine, TEST_ROOT};
///
/// with_engine(|engine| {
///     assert_eq!(engine.root_iri(), TEST_ROOT);
/// });
/// ```
pub fn with_engine<F, R>(f: F) -> R
where
    F: FnOnce(&WapEngine) -> R,
{
    let test_engine = TestEngine::memory();
    f(&test_engine.engine)
}

/// Runs a test with a temporary file-based engine.
pub fn with_file_engine<F, R>(f: F) -> R
where
    F: FnOnce(&WapEngine, &Path) -> R,
{
    let test_engine = TestEngine::file();
    let path = test_engine.path().expect("File engine should have a path");
    f(&test_engine.engine, &path)
}

/// A container body typed `ldp:BasicContainer` and `as:OrderedCollection`.
pub fn container_body(label: Option<&str>) -> Graph {
    let node = Term::blank("container");
    let mut body = Graph::new();
    body.insert(Triple::new(
        node.clone(),
        rdf::TYPE,
        Term::iri(ldp::BASIC_CONTAINER),
    ));
    body.insert(Triple::new(
        node.clone(),
        rdf::TYPE,
        Term::iri(activity::ORDERED_COLLECTION),
    ));
    if let Some(label) = label {
        body.insert(Triple::new(node, rdfs::LABEL, Term::literal(label)));
    }
    body
}

/// An annotation body on a single target.
pub fn annotation_body(target: &str) -> Graph {
    let node = Term::blank("annotation");
    let mut body = Graph::new();
    body.insert(Triple::new(node.clone(), rdf::TYPE, Term::iri(oa::ANNOTATION)));
    body.insert(Triple::new(node, oa::HAS_TARGET, Term::iri(target)));
    body
}

/// Serializes a view to JSON for shape assertions.
pub fn json<T: Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).expect("Failed to serialize view")
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;

    /// Creates `slug` below the root and fills it with `annotations`
    /// annotations. Returns the container IRI and the annotation IRIs in
    /// sequence order.
    pub fn populated_container(
        engine: &WapEngine,
        slug: &str,
        annotations: usize,
    ) -> (String, Vec<String>) {
        let container = engine
            .containers()
            .post_container(engine.root_iri(), Some(slug), container_body(Some(slug)))
            .expect("Failed to create container");
        let mut iris = Vec::with_capacity(annotations);
        for i in 0..annotations {
            let body = annotation_body(&format!("http://example.org/doc/{i}"));
            let view = engine
                .annotations()
                .post_annotation(&container.iri, body)
                .expect("Failed to post annotation");
            iris.push(view.iri);
        }
        (container.iri, iris)
    }

    /// Creates a chain of nested containers `a/b/c/...` and returns their IRIs.
    pub fn nested_containers(engine: &WapEngine, slugs: &[&str]) -> Vec<String> {
        let mut parent = engine.root_iri().to_string();
        let mut iris = Vec::with_capacity(slugs.len());
        for slug in slugs {
            let view = engine
                .containers()
                .post_container(&parent, Some(slug), container_body(None))
                .expect("Failed to create container");
            parent = view.iri.clone();
            iris.push(view.iri);
        }
        iris
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wapsrv_core::ContainerPreferences;

    #[test]
    fn test_memory_engine() {
        let test_engine = TestEngine::memory();
        assert_eq!(test_engine.root_iri(), TEST_ROOT);
        assert_eq!(test_engine.config().page_size, 10);
        assert!(test_engine.path().is_none());
    }

    #[test]
    fn test_file_engine_reopens() {
        let test_engine = TestEngine::file();
        test_engine
            .containers()
            .post_container(TEST_ROOT, Some("kept"), container_body(None))
            .unwrap();
        let test_engine = test_engine.reopen();
        let root = test_engine
            .containers()
            .get_container(TEST_ROOT, ContainerPreferences::new().minimal_container(true))
            .unwrap();
        assert_eq!(root.container_count, 1);
    }

    #[test]
    fn test_populated_scenario() {
        with_engine(|engine| {
            let (iri, annotations) = scenarios::populated_container(engine, "c", 3);
            assert_eq!(annotations.len(), 3);
            assert!(annotations.iter().all(|a| a.starts_with(&iri)));
        });
    }

    #[test]
    fn test_nested_scenario() {
        with_engine(|engine| {
            let iris = scenarios::nested_containers(engine, &["a", "b"]);
            assert_eq!(iris, vec![format!("{TEST_ROOT}a/"), format!("{TEST_ROOT}a/b/")]);
        });
    }
}
