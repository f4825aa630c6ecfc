//! In-memory graph store.

use crate::backend::{GraphStore, TxnKind};
use crate::error::{StorageError, StorageResult};
use crate::graph::{Dataset, Graph};
use crate::pending::{DatasetView, PendingWrites};
use crate::term::{Triple, TriplePattern};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

enum ActiveTxn {
    Read(Arc<Dataset>),
    Write {
        base: Arc<Dataset>,
        pending: PendingWrites,
    },
}

impl ActiveTxn {
    fn kind(&self) -> TxnKind {
        match self {
            Self::Read(_) => TxnKind::Read,
            Self::Write { .. } => TxnKind::Write,
        }
    }

    fn view(&self) -> DatasetView<'_> {
        match self {
            Self::Read(snapshot) => DatasetView::new(snapshot, None),
            Self::Write { base, pending } => DatasetView::new(base, Some(pending)),
        }
    }
}

/// An in-memory graph store.
///
/// Read transactions pin the committed dataset. Write transactions pin it
/// too and collect their changes as pending writes; commit applies them
/// to the committed dataset in place unless a reader still holds it, in
/// which case only the touched graphs and tables are copied.
///
/// # Example
///
/// ```rust
/// use wapsrv_storage::{GraphStore, InMemoryGraphStore, Term, Triple, TriplePattern, TxnKind};
///
/// let store = InMemoryGraphStore::new();
/// store.begin(TxnKind::Write).unwrap();
/// store.add("g", Triple::new(Term::iri("s"), "p", Term::literal("o"))).unwrap();
/// store.commit().unwrap();
///
/// store.begin(TxnKind::Read).unwrap();
/// assert_eq!(store.find("g", &TriplePattern::any()).unwrap().len(), 1);
/// store.end();
/// ```
#[derive(Default)]
pub struct InMemoryGraphStore {
    committed: RwLock<Arc<Dataset>>,
    active: Mutex<Option<ActiveTxn>>,
}

impl std::fmt::Debug for InMemoryGraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryGraphStore")
            .field("graphs", &self.committed.read().graph_count())
            .field("transaction", &self.transaction_kind())
            .finish()
    }
}

impl InMemoryGraphStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose committed state is `dataset`.
    #[must_use]
    pub fn with_dataset(dataset: Dataset) -> Self {
        Self {
            committed: RwLock::new(Arc::new(dataset)),
            active: Mutex::new(None),
        }
    }

    /// Returns the committed dataset.
    ///
    /// Holding the returned `Arc` across a write commit makes that commit
    /// copy the graphs and tables it changes.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Dataset> {
        Arc::clone(&self.committed.read())
    }

    /// Commits, running `before_publish` on the new dataset first.
    ///
    /// The new dataset is built next to the committed one, so the touched
    /// graphs and tables are copied. If `before_publish` fails the
    /// transaction stays open and the committed state is untouched, so
    /// the caller can still abort.
    pub(crate) fn commit_with(
        &self,
        before_publish: impl FnOnce(&Dataset) -> StorageResult<()>,
    ) -> StorageResult<()> {
        let mut active = self.active.lock();
        match active.take() {
            None => Err(StorageError::NoTransaction),
            Some(ActiveTxn::Read(_)) => Ok(()),
            Some(ActiveTxn::Write { base, pending }) => {
                let mut next = base.as_ref().clone();
                pending.apply(&mut next);
                if let Err(err) = before_publish(&next) {
                    *active = Some(ActiveTxn::Write { base, pending });
                    return Err(err);
                }
                drop(base);
                *self.committed.write() = Arc::new(next);
                tracing::trace!("write transaction committed");
                Ok(())
            }
        }
    }

    fn with_view<R>(&self, f: impl FnOnce(DatasetView<'_>) -> R) -> StorageResult<R> {
        let active = self.active.lock();
        active
            .as_ref()
            .map(|txn| f(txn.view()))
            .ok_or(StorageError::NoTransaction)
    }

    fn with_write<R>(&self, f: impl FnOnce(&Dataset, &mut PendingWrites) -> R) -> StorageResult<R> {
        let mut active = self.active.lock();
        match active.as_mut() {
            Some(ActiveTxn::Write { base, pending }) => Ok(f(&**base, pending)),
            Some(ActiveTxn::Read(_)) => Err(StorageError::ReadOnlyTransaction),
            None => Err(StorageError::NoTransaction),
        }
    }
}

impl GraphStore for InMemoryGraphStore {
    fn begin(&self, kind: TxnKind) -> StorageResult<()> {
        let mut active = self.active.lock();
        if active.is_some() {
            return Err(StorageError::TransactionActive);
        }
        let base = self.snapshot();
        *active = Some(match kind {
            TxnKind::Read => ActiveTxn::Read(base),
            TxnKind::Write => ActiveTxn::Write {
                base,
                pending: PendingWrites::default(),
            },
        });
        tracing::trace!(?kind, "transaction started");
        Ok(())
    }

    fn transaction_kind(&self) -> Option<TxnKind> {
        self.active.lock().as_ref().map(ActiveTxn::kind)
    }

    fn commit(&self) -> StorageResult<()> {
        let mut active = self.active.lock();
        match active.take() {
            None => Err(StorageError::NoTransaction),
            Some(ActiveTxn::Read(_)) => Ok(()),
            Some(ActiveTxn::Write { base, pending }) => {
                // The pinned base is a second handle on the committed
                // dataset; it must go before the in-place update.
                drop(base);
                if !pending.is_empty() {
                    let mut committed = self.committed.write();
                    pending.apply(Arc::make_mut(&mut *committed));
                }
                tracing::trace!("write transaction committed");
                Ok(())
            }
        }
    }

    fn abort(&self) -> StorageResult<()> {
        if let Some(txn) = self.active.lock().take() {
            tracing::trace!(kind = ?txn.kind(), "transaction aborted");
        }
        Ok(())
    }

    fn end(&self) {
        self.active.lock().take();
    }

    fn contains_graph(&self, name: &str) -> StorageResult<bool> {
        self.with_view(|view| view.contains_graph(name))
    }

    fn graph(&self, name: &str) -> StorageResult<Option<Graph>> {
        self.with_view(|view| view.graph(name))
    }

    fn replace_graph(&self, name: &str, graph: Graph) -> StorageResult<()> {
        self.with_write(|_, pending| pending.replace_graph(name, graph))
    }

    fn remove_graph(&self, name: &str) -> StorageResult<bool> {
        self.with_write(|base, pending| pending.remove_graph(base, name))
    }

    fn add(&self, name: &str, triple: Triple) -> StorageResult<bool> {
        self.with_write(|base, pending| pending.add(base, name, triple))
    }

    fn remove_matching(&self, name: &str, pattern: &TriplePattern) -> StorageResult<usize> {
        self.with_write(|base, pending| pending.remove_matching(base, name, pattern))
    }

    fn find(&self, name: &str, pattern: &TriplePattern) -> StorageResult<Vec<Triple>> {
        self.with_view(|view| view.find(name, pattern))
    }

    fn table_append(&self, table: &str, value: &str) -> StorageResult<()> {
        self.with_write(|base, pending| pending.table_append(base, table, value))
    }

    fn table_remove_first(&self, table: &str, value: &str) -> StorageResult<bool> {
        self.with_write(|base, pending| pending.table_remove_first(base, table, value))
    }

    fn table_len(&self, table: &str) -> StorageResult<usize> {
        self.with_view(|view| view.table_len(table))
    }

    fn table_range(&self, table: &str, offset: usize, limit: usize) -> StorageResult<Vec<String>> {
        self.with_view(|view| view.table_range(table, offset, limit))
    }

    fn table_clear(&self, table: &str) -> StorageResult<usize> {
        self.with_write(|base, pending| pending.table_clear(base, table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::SideTable;
    use crate::term::Term;

    fn triple(o: &str) -> Triple {
        Triple::new(Term::iri("s"), "p", Term::literal(o))
    }

    #[test]
    fn access_outside_transaction_fails() {
        let store = InMemoryGraphStore::new();
        assert!(matches!(
            store.contains_graph("g"),
            Err(StorageError::NoTransaction)
        ));
        assert!(matches!(
            store.add("g", triple("o")),
            Err(StorageError::NoTransaction)
        ));
        assert!(matches!(store.commit(), Err(StorageError::NoTransaction)));
    }

    #[test]
    fn begin_twice_fails() {
        let store = InMemoryGraphStore::new();
        store.begin(TxnKind::Read).unwrap();
        assert!(matches!(
            store.begin(TxnKind::Write),
            Err(StorageError::TransactionActive)
        ));
        store.end();
        assert!(!store.is_in_transaction());
    }

    #[test]
    fn read_transaction_rejects_writes() {
        let store = InMemoryGraphStore::new();
        store.begin(TxnKind::Read).unwrap();
        assert_eq!(store.transaction_kind(), Some(TxnKind::Read));
        assert!(matches!(
            store.add("g", triple("o")),
            Err(StorageError::ReadOnlyTransaction)
        ));
        assert!(matches!(
            store.table_append("t", "x"),
            Err(StorageError::ReadOnlyTransaction)
        ));
        store.end();
    }

    #[test]
    fn commit_publishes_writes() {
        let store = InMemoryGraphStore::new();
        store.begin(TxnKind::Write).unwrap();
        store.add("g", triple("o")).unwrap();
        store.table_append("t", "x").unwrap();
        assert!(store.contains_graph("g").unwrap());
        store.commit().unwrap();
        assert!(!store.is_in_transaction());

        store.begin(TxnKind::Read).unwrap();
        assert_eq!(store.graph("g").unwrap().map(|g| g.len()), Some(1));
        assert_eq!(store.table_range("t", 0, 10).unwrap(), vec!["x"]);
        store.end();
    }

    #[test]
    fn abort_discards_writes() {
        let store = InMemoryGraphStore::new();
        store.begin(TxnKind::Write).unwrap();
        store.add("g", triple("o")).unwrap();
        store.abort().unwrap();
        store.abort().unwrap();

        store.begin(TxnKind::Read).unwrap();
        assert!(!store.contains_graph("g").unwrap());
        store.end();
    }

    #[test]
    fn end_without_commit_discards_writes() {
        let store = InMemoryGraphStore::new();
        store.begin(TxnKind::Write).unwrap();
        store.replace_graph("g", Graph::from_triples([triple("o")])).unwrap();
        store.end();
        assert!(store.snapshot().graph("g").is_none());
    }

    #[test]
    fn failing_publish_hook_keeps_transaction_open() {
        let store = InMemoryGraphStore::new();
        store.begin(TxnKind::Write).unwrap();
        store.add("g", triple("o")).unwrap();
        let result = store.commit_with(|_| Err(StorageError::corrupted("disk full")));
        assert!(result.is_err());
        assert_eq!(store.transaction_kind(), Some(TxnKind::Write));
        store.abort().unwrap();
        assert!(store.snapshot().graph("g").is_none());
    }

    #[test]
    fn remove_matching_and_tables() {
        let store = InMemoryGraphStore::new();
        store.begin(TxnKind::Write).unwrap();
        store.add("g", triple("a")).unwrap();
        store.add("g", triple("b")).unwrap();
        assert_eq!(
            store
                .remove_matching("g", &TriplePattern::any().object(Term::literal("a")))
                .unwrap(),
            1
        );
        assert_eq!(store.remove_matching("missing", &TriplePattern::any()).unwrap(), 0);
        store.table_append("t", "x").unwrap();
        store.table_append("t", "y").unwrap();
        assert!(store.table_remove_first("t", "x").unwrap());
        assert!(!store.table_remove_first("t", "x").unwrap());
        assert_eq!(store.table_len("t").unwrap(), 1);
        assert_eq!(store.table_clear("t").unwrap(), 1);
        assert_eq!(store.table_clear("nope").unwrap(), 0);
        assert!(store.remove_graph("g").unwrap());
        assert!(!store.remove_graph("g").unwrap());
        store.commit().unwrap();
    }

    #[test]
    fn writes_are_visible_inside_but_not_outside() {
        let store = InMemoryGraphStore::new();
        store.begin(TxnKind::Write).unwrap();
        store.add("g", triple("o")).unwrap();
        store.table_append("t", "x").unwrap();
        assert_eq!(store.find("g", &TriplePattern::any()).unwrap(), vec![triple("o")]);
        assert_eq!(store.table_len("t").unwrap(), 1);
        assert!(store.snapshot().graph("g").is_none());
        assert!(store.snapshot().table("t").is_none());
        store.commit().unwrap();
        assert!(store.snapshot().graph("g").is_some());
    }

    fn table_address(store: &InMemoryGraphStore, name: &str) -> Option<*const SideTable> {
        store.snapshot().table(name).map(|t| t as *const SideTable)
    }

    fn graph_address(store: &InMemoryGraphStore, name: &str) -> Option<*const Graph> {
        store.snapshot().graph(name).map(|g| g as *const Graph)
    }

    #[test]
    fn commit_updates_large_tables_and_graphs_in_place() {
        let store = InMemoryGraphStore::new();
        store.begin(TxnKind::Write).unwrap();
        for i in 0..10_000 {
            store.table_append("t", &format!("row{i}")).unwrap();
            store.add("g", triple(&i.to_string())).unwrap();
        }
        store.commit().unwrap();
        let table = table_address(&store, "t");
        let graph = graph_address(&store, "g");

        for i in 0..50 {
            store.begin(TxnKind::Write).unwrap();
            store.table_append("t", &format!("more{i}")).unwrap();
            store.add("g", triple(&format!("more{i}"))).unwrap();
            assert!(store.table_remove_first("t", &format!("row{i}")).unwrap());
            store.commit().unwrap();
        }

        assert_eq!(table_address(&store, "t"), table);
        assert_eq!(graph_address(&store, "g"), graph);
        let snapshot = store.snapshot();
        assert_eq!(snapshot.table("t").map(SideTable::len), Some(10_000));
        assert_eq!(snapshot.graph("g").map(Graph::len), Some(10_050));
    }

    #[test]
    fn held_snapshot_is_isolated_from_later_commits() {
        let store = InMemoryGraphStore::new();
        store.begin(TxnKind::Write).unwrap();
        store.table_append("t", "a").unwrap();
        store.commit().unwrap();

        let held = store.snapshot();
        store.begin(TxnKind::Write).unwrap();
        store.table_append("t", "b").unwrap();
        store.commit().unwrap();

        assert_eq!(held.table("t").map(|t| t.range(0, 10)), Some(vec!["a".to_string()]));
        assert_eq!(store.snapshot().table("t").map(SideTable::len), Some(2));
    }
}
