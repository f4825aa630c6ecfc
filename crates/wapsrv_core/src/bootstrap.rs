//! Seeding of the root container.

use crate::config::WapConfig;
use crate::error::WapResult;
use crate::model::{timestamp_now, Container, WapObject};
use crate::object_store::WapObjectStore;
use crate::transaction::TransactionCoordinator;
use crate::vocab::{dcterms, rdfs, wap};
use wapsrv_storage::{Graph, Term, Triple};

/// ETag of a freshly seeded root container.
pub const INITIAL_ROOT_ETAG: &str = "initial-root-etag";

/// Adds whatever the root container is missing: types, sequence nodes,
/// ETag, timestamps and label. Existing statements, including sequence
/// members, are left alone. Returns true if anything was added.
///
/// # Errors
///
/// Returns a storage error.
pub fn ensure_root(coordinator: &TransactionCoordinator, config: &WapConfig) -> WapResult<bool> {
    let root_iri = config.root_container_iri.as_str();
    let objects = WapObjectStore::new();

    coordinator.write(|txn| {
        let existing = if objects.exists(txn, root_iri)? {
            objects.read(txn, root_iri)?
        } else {
            WapObject::new(root_iri, Graph::new())
        };

        let node = Term::iri(root_iri);
        let now = timestamp_now();
        let mut missing: Vec<Triple> = Container::empty(root_iri)
            .into_object()
            .into_graph()
            .iter()
            .filter(|t| !existing.graph().contains(t))
            .collect();
        if existing.etag().is_none() {
            missing.push(Triple::new(node.clone(), wap::ETAG, Term::literal(INITIAL_ROOT_ETAG)));
        }
        if existing.created().is_none() {
            missing.push(Triple::new(node.clone(), dcterms::CREATED, now.clone()));
        }
        if existing.modified().is_none() {
            missing.push(Triple::new(node.clone(), dcterms::MODIFIED, now));
        }
        if existing.label().is_none() {
            missing.push(Triple::new(
                node,
                rdfs::LABEL,
                Term::literal(config.root_container_label.as_str()),
            ));
        }

        if missing.is_empty() {
            tracing::debug!(iri = %root_iri, "root container present");
            return Ok(false);
        }
        tracing::info!(iri = %root_iri, added = missing.len(), "seeding root container");
        for triple in missing {
            txn.store().add(root_iri, triple)?;
        }
        Ok(true)
    })
}
