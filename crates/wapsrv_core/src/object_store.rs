//! Resource-level access to the graph store.
//!
//! Each resource is one named graph. Property updates go through
//! [`WapObjectStore::set_property`] so that statements written by other
//! components into the same graph (sequence membership) survive.

use crate::error::{WapError, WapResult};
use crate::model::{tombstone, WapObject};
use crate::transaction::Txn;
use crate::vocab::{ldp, rdf, wap};
use wapsrv_storage::{Term, Triple, TriplePattern};

/// Reads and writes [`WapObject`]s inside a transaction.
#[derive(Debug, Default, Clone, Copy)]
pub struct WapObjectStore;

impl WapObjectStore {
    /// Creates the store.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Returns true if a non-empty graph named `iri` exists, tombstoned
    /// or not.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn exists(&self, txn: &Txn<'_>, iri: &str) -> WapResult<bool> {
        Ok(txn.store().contains_graph(iri)?)
    }

    /// Loads the resource stored under `iri`.
    ///
    /// # Errors
    ///
    /// Returns `NotExistent` if there is no such graph.
    pub fn read(&self, txn: &Txn<'_>, iri: &str) -> WapResult<WapObject> {
        txn.store()
            .graph(iri)?
            .map(|graph| WapObject::new(iri, graph))
            .ok_or_else(|| WapError::not_existent(format!("{iri} does not exist")))
    }

    /// Stores `object`, replacing any graph of the same name.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn write(&self, txn: &Txn<'_>, object: &WapObject) -> WapResult<()> {
        txn.store()
            .replace_graph(object.iri(), object.graph().clone())?;
        Ok(())
    }

    /// Returns true if `iri` carries the tombstone marker.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn is_deleted(&self, txn: &Txn<'_>, iri: &str) -> WapResult<bool> {
        let pattern = TriplePattern::any()
            .subject(Term::iri(iri))
            .predicate(wap::DELETED);
        Ok(!txn.store().find(iri, &pattern)?.is_empty())
    }

    /// Replaces every value of `predicate` on `iri` with `value`.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn set_property(
        &self,
        txn: &Txn<'_>,
        iri: &str,
        predicate: &str,
        value: Term,
    ) -> WapResult<()> {
        let node = Term::iri(iri);
        let store = txn.store();
        store.remove_matching(
            iri,
            &TriplePattern::any()
                .subject(node.clone())
                .predicate(predicate),
        )?;
        store.add(iri, Triple::new(node, predicate, value))?;
        Ok(())
    }

    /// Adds the tombstone marker to `iri`.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn mark_deleted(&self, txn: &Txn<'_>, iri: &str) -> WapResult<()> {
        self.set_property(txn, iri, wap::DELETED, tombstone())
    }

    /// Removes the graph of `iri` entirely. Returns false if there was none.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn purge(&self, txn: &Txn<'_>, iri: &str) -> WapResult<bool> {
        Ok(txn.store().remove_graph(iri)?)
    }

    /// Fails unless `iri` exists and is not tombstoned.
    ///
    /// # Errors
    ///
    /// Returns `NotExistent` or `ResourceDeleted`.
    pub fn check_exists_and_not_deleted(&self, txn: &Txn<'_>, iri: &str) -> WapResult<()> {
        if !self.exists(txn, iri)? {
            return Err(WapError::not_existent(format!("{iri} does not exist")));
        }
        if self.is_deleted(txn, iri)? {
            return Err(WapError::resource_deleted(format!("{iri} has been deleted")));
        }
        Ok(())
    }

    /// Returns true if `iri` is typed `type_iri` in its own graph.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn has_type(&self, txn: &Txn<'_>, iri: &str, type_iri: &str) -> WapResult<bool> {
        let pattern = TriplePattern::any()
            .subject(Term::iri(iri))
            .predicate(rdf::TYPE)
            .object(Term::iri(type_iri));
        Ok(!txn.store().find(iri, &pattern)?.is_empty())
    }

    /// Fails unless `iri` is a live container, without loading its graph.
    ///
    /// # Errors
    ///
    /// Returns `NotExistent`, `ResourceDeleted` or `NotAContainer`.
    pub fn check_live_container(&self, txn: &Txn<'_>, iri: &str) -> WapResult<()> {
        self.check_exists_and_not_deleted(txn, iri)?;
        if !self.has_type(txn, iri, ldp::BASIC_CONTAINER)? {
            return Err(WapError::not_a_container(format!("{iri} is not a container")));
        }
        Ok(())
    }

    /// Loads a resource that must exist and must not be tombstoned.
    ///
    /// # Errors
    ///
    /// Returns `NotExistent` or `ResourceDeleted`.
    pub fn read_live(&self, txn: &Txn<'_>, iri: &str) -> WapResult<WapObject> {
        let object = self.read(txn, iri)?;
        if object.is_deleted() {
            return Err(WapError::resource_deleted(format!("{iri} has been deleted")));
        }
        Ok(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::TransactionCoordinator;
    use crate::model::Container;
    use crate::vocab::rdfs;
    use std::sync::Arc;
    use wapsrv_storage::{Graph, InMemoryGraphStore};

    const IRI: &str = "http://x/wap/c/a1";

    fn object() -> WapObject {
        let mut object = WapObject::new(IRI, Graph::new());
        object.set_label("first");
        object
    }

    fn coordinator() -> TransactionCoordinator {
        TransactionCoordinator::new(Arc::new(InMemoryGraphStore::new()))
    }

    #[test]
    fn write_then_read() {
        let coordinator = coordinator();
        let store = WapObjectStore::new();
        coordinator.write(|txn| store.write(txn, &object())).unwrap();
        let read = coordinator.read(|txn| store.read(txn, IRI)).unwrap();
        assert_eq!(read, object());
    }

    #[test]
    fn missing_and_deleted_are_distinguished() {
        let coordinator = coordinator();
        let store = WapObjectStore::new();
        let missing = coordinator.read(|txn| store.check_exists_and_not_deleted(txn, IRI));
        assert!(matches!(missing, Err(WapError::NotExistent { .. })));

        coordinator
            .write(|txn| {
                store.write(txn, &object())?;
                store.mark_deleted(txn, IRI)
            })
            .unwrap();
        let deleted = coordinator.read(|txn| store.check_exists_and_not_deleted(txn, IRI));
        assert!(matches!(deleted, Err(WapError::ResourceDeleted { .. })));
        let read = coordinator.read(|txn| store.read_live(txn, IRI));
        assert!(matches!(read, Err(WapError::ResourceDeleted { .. })));
        assert!(coordinator.read(|txn| store.exists(txn, IRI)).unwrap());
    }

    #[test]
    fn set_property_replaces_and_keeps_other_statements() {
        let coordinator = coordinator();
        let store = WapObjectStore::new();
        coordinator
            .write(|txn| {
                store.write(txn, &object())?;
                txn.store().add(
                    IRI,
                    Triple::new(Term::iri("http://other/"), "http://p/", Term::literal("kept")),
                )?;
                store.set_property(txn, IRI, rdfs::LABEL, Term::literal("second"))
            })
            .unwrap();
        let read = coordinator.read(|txn| store.read(txn, IRI)).unwrap();
        assert_eq!(read.label(), Some("second"));
        assert_eq!(read.graph().len(), 2);
    }

    #[test]
    fn purge_removes_graph() {
        let coordinator = coordinator();
        let store = WapObjectStore::new();
        coordinator.write(|txn| store.write(txn, &object())).unwrap();
        assert!(coordinator.write(|txn| store.purge(txn, IRI)).unwrap());
        assert!(!coordinator.write(|txn| store.purge(txn, IRI)).unwrap());
        assert!(!coordinator.read(|txn| store.exists(txn, IRI)).unwrap());
    }

    #[test]
    fn emptied_graph_no_longer_exists() {
        let coordinator = coordinator();
        let store = WapObjectStore::new();
        coordinator.write(|txn| store.write(txn, &object())).unwrap();
        coordinator
            .write(|txn| Ok(txn.store().remove_matching(IRI, &TriplePattern::any())?))
            .unwrap();

        assert!(!coordinator.read(|txn| store.exists(txn, IRI)).unwrap());
        let read = coordinator.read(|txn| store.read(txn, IRI));
        assert!(matches!(read, Err(WapError::NotExistent { .. })));
    }

    #[test]
    fn live_container_check() {
        let coordinator = coordinator();
        let store = WapObjectStore::new();
        let container = Container::empty("http://x/wap/c/");
        coordinator
            .write(|txn| {
                store.write(txn, container.object())?;
                store.write(txn, &object())
            })
            .unwrap();

        coordinator
            .read(|txn| store.check_live_container(txn, "http://x/wap/c/"))
            .unwrap();
        let annotation = coordinator.read(|txn| store.check_live_container(txn, IRI));
        assert!(matches!(annotation, Err(WapError::NotAContainer { .. })));
        let missing = coordinator.read(|txn| store.check_live_container(txn, "http://x/wap/none/"));
        assert!(matches!(missing, Err(WapError::NotExistent { .. })));

        coordinator
            .write(|txn| store.mark_deleted(txn, "http://x/wap/c/"))
            .unwrap();
        let deleted = coordinator.read(|txn| store.check_live_container(txn, "http://x/wap/c/"));
        assert!(matches!(deleted, Err(WapError::ResourceDeleted { .. })));
    }
}
