//! Ordered member sequences of containers.
//!
//! Every container owns two sequences: its sub-containers and its
//! annotations. Positions are 1-based and contiguous. Two storage
//! strategies implement the same contract:
//!
//! - [`GraphSequenceRepository`]: `rdf:_n` membership triples inside the
//!   container's graph. Count, append and range reads do indexed lookups
//!   per position; remove shifts every later member down by one.
//! - [`IndexedSequenceRepository`]: rows in an ordered side table keyed by
//!   the sequence IRI, for containers with many members.
//!
//! # Conventions
//!
//! - `remove` deletes the first occurrence; a missing member is a no-op
//! - `range_read(first, last)` needs `1 <= first` and `last <= count`;
//!   `first == last + 1` is an empty range, anything else is rejected

mod graph;
mod indexed;

pub use graph::GraphSequenceRepository;
pub use indexed::IndexedSequenceRepository;

use crate::config::SequenceBackend;
use crate::error::{WapError, WapResult};
use crate::iri;
use crate::transaction::Txn;

/// Which of a container's two sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceKind {
    /// Sub-containers.
    Containers,
    /// Annotations.
    Annotations,
}

/// Address of a sequence: owning container plus kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SequenceId {
    container_iri: String,
    kind: SequenceKind,
}

impl SequenceId {
    /// Sub-container sequence of `container_iri`.
    #[must_use]
    pub fn containers(container_iri: &str) -> Self {
        Self {
            container_iri: container_iri.to_string(),
            kind: SequenceKind::Containers,
        }
    }

    /// Annotation sequence of `container_iri`.
    #[must_use]
    pub fn annotations(container_iri: &str) -> Self {
        Self {
            container_iri: container_iri.to_string(),
            kind: SequenceKind::Annotations,
        }
    }

    /// The owning container, which is also the graph holding the sequence node.
    #[must_use]
    pub fn container_iri(&self) -> &str {
        &self.container_iri
    }

    /// Which sequence this is.
    #[must_use]
    pub fn kind(&self) -> SequenceKind {
        self.kind
    }

    /// IRI of the sequence node.
    #[must_use]
    pub fn iri(&self) -> String {
        match self.kind {
            SequenceKind::Containers => iri::container_seq_iri(&self.container_iri),
            SequenceKind::Annotations => iri::annotation_seq_iri(&self.container_iri),
        }
    }
}

/// Ordered membership storage. All operations run inside a transaction
/// owned by the caller.
pub trait SequenceRepository: Send + Sync {
    /// Strategy implemented by this repository.
    fn backend(&self) -> SequenceBackend;

    /// Appends `object_iri` as the new last member.
    ///
    /// # Errors
    ///
    /// Returns a storage error, e.g. inside a read transaction.
    fn append(&self, txn: &Txn<'_>, seq: &SequenceId, object_iri: &str) -> WapResult<()>;

    /// Removes the first occurrence of `object_iri`. Returns false and
    /// changes nothing if it is not a member.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    fn remove(&self, txn: &Txn<'_>, seq: &SequenceId, object_iri: &str) -> WapResult<bool>;

    /// Number of members.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    fn count(&self, txn: &Txn<'_>, seq: &SequenceId) -> WapResult<usize>;

    /// Members at 1-based positions `first..=last`, in order.
    ///
    /// # Errors
    ///
    /// Returns `InternalServer` for bounds outside `[1, count]`.
    fn range_read(
        &self,
        txn: &Txn<'_>,
        seq: &SequenceId,
        first: usize,
        last: usize,
    ) -> WapResult<Vec<String>>;

    /// Removes every member and returns how many there were.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    fn clear(&self, txn: &Txn<'_>, seq: &SequenceId) -> WapResult<usize>;

    /// All members in order.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    fn members(&self, txn: &Txn<'_>, seq: &SequenceId) -> WapResult<Vec<String>> {
        match self.count(txn, seq)? {
            0 => Ok(Vec::new()),
            count => self.range_read(txn, seq, 1, count),
        }
    }
}

/// Creates the repository for a configured strategy.
#[must_use]
pub fn sequence_repository(backend: SequenceBackend) -> Box<dyn SequenceRepository> {
    match backend {
        SequenceBackend::Graph => Box::new(GraphSequenceRepository::new()),
        SequenceBackend::Indexed => Box::new(IndexedSequenceRepository::new()),
    }
}

/// Validates a range read against the current member count.
///
/// Returns false for the empty range `first == last + 1`.
pub(crate) fn check_range(
    seq: &SequenceId,
    first: usize,
    last: usize,
    count: usize,
) -> WapResult<bool> {
    if first == 0 || last > count || first > last.saturating_add(1) {
        return Err(WapError::internal(format!(
            "range {first}..={last} outside sequence {} of length {count}",
            seq.iri()
        )));
    }
    Ok(first <= last)
}
