//! Graph store trait definition.

use crate::error::StorageResult;
use crate::graph::Graph;
use crate::term::{Triple, TriplePattern};

/// Kind of a store transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxnKind {
    /// Snapshot reads only.
    Read,
    /// Reads and writes, published atomically on commit.
    Write,
}

/// A transactional store of named RDF graphs plus ordered side tables.
///
/// Every data access happens inside a transaction. A store holds at most
/// one open transaction at a time; callers that need concurrency serialize
/// access above the store.
///
/// # Invariants
///
/// - Reads inside a transaction see the state at `begin` plus the
///   transaction's own writes
/// - Nothing written in a transaction is visible elsewhere before `commit`
/// - `abort` discards every write of the transaction
/// - Writes inside a [`TxnKind::Read`] transaction are rejected
/// - A graph exists while it holds at least one triple
///
/// # Implementors
///
/// - [`super::InMemoryGraphStore`] - For testing and ephemeral servers
/// - [`super::FileGraphStore`] - Persists a snapshot on every write commit
pub trait GraphStore: Send + Sync {
    /// Opens a transaction.
    ///
    /// # Errors
    ///
    /// Returns `TransactionActive` if a transaction is already open.
    fn begin(&self, kind: TxnKind) -> StorageResult<()>;

    /// Kind of the open transaction, if any.
    fn transaction_kind(&self) -> Option<TxnKind>;

    /// Returns true while a transaction is open.
    fn is_in_transaction(&self) -> bool {
        self.transaction_kind().is_some()
    }

    /// Publishes the open transaction's writes and closes it.
    ///
    /// Committing a read transaction just closes it.
    ///
    /// # Errors
    ///
    /// Returns `NoTransaction` if nothing is open, or an I/O error if a
    /// persistent store cannot write its snapshot. On error the store
    /// keeps its previous committed state.
    fn commit(&self) -> StorageResult<()>;

    /// Discards the open transaction. A no-op when nothing is open.
    ///
    /// # Errors
    ///
    /// Implementations may report failures releasing resources.
    fn abort(&self) -> StorageResult<()>;

    /// Closes the open transaction without publishing. A no-op when
    /// nothing is open.
    fn end(&self);

    /// Returns true if the named graph exists and is not empty.
    ///
    /// # Errors
    ///
    /// Returns `NoTransaction` outside a transaction.
    fn contains_graph(&self, name: &str) -> StorageResult<bool>;

    /// Returns a copy of the named graph.
    ///
    /// # Errors
    ///
    /// Returns `NoTransaction` outside a transaction.
    fn graph(&self, name: &str) -> StorageResult<Option<Graph>>;

    /// Replaces the named graph's entire content.
    ///
    /// # Errors
    ///
    /// Returns `NoTransaction` or `ReadOnlyTransaction`.
    fn replace_graph(&self, name: &str, graph: Graph) -> StorageResult<()>;

    /// Drops the named graph. Returns false if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns `NoTransaction` or `ReadOnlyTransaction`.
    fn remove_graph(&self, name: &str) -> StorageResult<bool>;

    /// Adds a triple to the named graph, creating the graph if needed.
    ///
    /// # Errors
    ///
    /// Returns `NoTransaction` or `ReadOnlyTransaction`.
    fn add(&self, name: &str, triple: Triple) -> StorageResult<bool>;

    /// Removes the matching triples of the named graph.
    ///
    /// # Errors
    ///
    /// Returns `NoTransaction` or `ReadOnlyTransaction`.
    fn remove_matching(&self, name: &str, pattern: &TriplePattern) -> StorageResult<usize>;

    /// Finds the matching triples of the named graph.
    ///
    /// # Errors
    ///
    /// Returns `NoTransaction` outside a transaction.
    fn find(&self, name: &str, pattern: &TriplePattern) -> StorageResult<Vec<Triple>>;

    /// Appends a value to the named side table.
    ///
    /// # Errors
    ///
    /// Returns `NoTransaction` or `ReadOnlyTransaction`.
    fn table_append(&self, table: &str, value: &str) -> StorageResult<()>;

    /// Removes the first occurrence of a value from the named side table.
    ///
    /// # Errors
    ///
    /// Returns `NoTransaction` or `ReadOnlyTransaction`.
    fn table_remove_first(&self, table: &str, value: &str) -> StorageResult<bool>;

    /// Number of rows in the named side table.
    ///
    /// # Errors
    ///
    /// Returns `NoTransaction` outside a transaction.
    fn table_len(&self, table: &str) -> StorageResult<usize>;

    /// Up to `limit` rows of the named side table from a zero-based offset.
    ///
    /// # Errors
    ///
    /// Returns `NoTransaction` outside a transaction.
    fn table_range(&self, table: &str, offset: usize, limit: usize) -> StorageResult<Vec<String>>;

    /// Removes all rows of the named side table.
    ///
    /// # Errors
    ///
    /// Returns `NoTransaction` or `ReadOnlyTransaction`.
    fn table_clear(&self, table: &str) -> StorageResult<usize>;
}
