//! Show command implementation.

use super::print_json;
use wapsrv_core::{ContainerPreferences, WapEngine};

/// Runs the show command on `iri`, or on the root when absent.
pub fn run(
    engine: &WapEngine,
    iri: Option<&str>,
    minimal: bool,
    iris_only: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let iri = iri.unwrap_or(engine.root_iri());
    let preferences = ContainerPreferences::new()
        .minimal_container(minimal)
        .contained_iris(iris_only)
        .contained_descriptions(!iris_only);
    let view = engine.containers().get_container(iri, preferences)?;
    print_json(&view)
}
