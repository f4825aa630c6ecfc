//! Annotate command implementation.

use super::print_json;
use wapsrv_core::vocab::{oa, rdf};
use wapsrv_core::WapEngine;
use wapsrv_storage::{Graph, Term, Triple};

/// Body of an annotation on `targets`.
pub fn annotation_body(targets: &[String]) -> Graph {
    let node = Term::blank("annotation");
    let mut body = Graph::new();
    body.insert(Triple::new(node.clone(), rdf::TYPE, Term::iri(oa::ANNOTATION)));
    for target in targets {
        body.insert(Triple::new(
            node.clone(),
            oa::HAS_TARGET,
            Term::iri(target.as_str()),
        ));
    }
    body
}

/// Runs the annotate command.
pub fn run(
    engine: &WapEngine,
    container: &str,
    targets: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let view = engine
        .annotations()
        .post_annotation(container, annotation_body(targets))?;
    print_json(&view)
}
