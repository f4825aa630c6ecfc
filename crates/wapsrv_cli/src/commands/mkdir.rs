//! Mkdir command implementation.

use super::print_json;
use wapsrv_core::vocab::{activity, ldp, rdf, rdfs};
use wapsrv_core::WapEngine;
use wapsrv_storage::{Graph, Term, Triple};

/// Body of a new container, optionally labelled.
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

/// Runs the mkdir command.
pub fn run(
    engine: &WapEngine,
    parent: &str,
    slug: Option<&str>,
    label: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let view = engine
        .containers()
        .post_container(parent, slug, container_body(label))?;
    print_json(&view)
}
