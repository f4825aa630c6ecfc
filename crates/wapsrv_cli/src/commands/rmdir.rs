//! Rmdir command implementation.

use super::print_json;
use wapsrv_core::WapEngine;

/// Runs the rmdir command.
pub fn run(engine: &WapEngine, iri: &str, etag: &str) -> Result<(), Box<dyn std::error::Error>> {
    let deleted = engine.containers().delete_container(iri, etag)?;
    print_json(&deleted)
}
