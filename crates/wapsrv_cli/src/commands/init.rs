//! Init command implementation.

use super::print_json;
use serde::Serialize;
use wapsrv_core::{ContainerPreferences, WapEngine};

/// Summary of an initialized store.
#[derive(Debug, Serialize)]
pub struct InitResult {
    /// Root container IRI.
    pub root: String,
    /// Current root ETag.
    pub etag: Option<String>,
    /// Sub-containers of the root.
    pub containers: usize,
    /// Annotations directly in the root.
    pub annotations: usize,
}

/// Runs the init command. Opening the engine already seeded the root.
pub fn run(engine: &WapEngine) -> Result<(), Box<dyn std::error::Error>> {
    let root = engine.containers().get_container(
        engine.root_iri(),
        ContainerPreferences::new().minimal_container(true),
    )?;
    print_json(&InitResult {
        root: root.iri,
        etag: root.etag,
        containers: root.container_count,
        annotations: root.total_items,
    })
}
