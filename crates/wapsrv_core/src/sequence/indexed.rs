use super::{check_range, SequenceId, SequenceRepository};
use crate::config::SequenceBackend;
use crate::error::WapResult;
use crate::transaction::Txn;

/// Sequence stored in an ordered side table named by the sequence IRI.
///
/// Append, count and remove avoid touching the container graph, so large
/// annotation containers do not pay for renumbering.
#[derive(Debug, Default, Clone, Copy)]
pub struct IndexedSequenceRepository;

impl IndexedSequenceRepository {
    /// Creates the repository.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SequenceRepository for IndexedSequenceRepository {
    fn backend(&self) -> SequenceBackend {
        SequenceBackend::Indexed
    }

    fn append(&self, txn: &Txn<'_>, seq: &SequenceId, object_iri: &str) -> WapResult<()> {
        txn.store().table_append(&seq.iri(), object_iri)?;
        Ok(())
    }

    fn remove(&self, txn: &Txn<'_>, seq: &SequenceId, object_iri: &str) -> WapResult<bool> {
        Ok(txn.store().table_remove_first(&seq.iri(), object_iri)?)
    }

    fn count(&self, txn: &Txn<'_>, seq: &SequenceId) -> WapResult<usize> {
        Ok(txn.store().table_len(&seq.iri())?)
    }

    fn range_read(
        &self,
        txn: &Txn<'_>,
        seq: &SequenceId,
        first: usize,
        last: usize,
    ) -> WapResult<Vec<String>> {
        let count = self.count(txn, seq)?;
        if !check_range(seq, first, last, count)? {
            return Ok(Vec::new());
        }
        Ok(txn
            .store()
            .table_range(&seq.iri(), first - 1, last - first + 1)?)
    }

    fn clear(&self, txn: &Txn<'_>, seq: &SequenceId) -> WapResult<usize> {
        Ok(txn.store().table_clear(&seq.iri())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::TransactionCoordinator;
    use std::sync::Arc;
    use wapsrv_storage::InMemoryGraphStore;

    #[test]
    fn container_graph_stays_untouched() {
        let coordinator = TransactionCoordinator::new(Arc::new(InMemoryGraphStore::new()));
        let repo = IndexedSequenceRepository::new();
        let seq = SequenceId::annotations("http://x/wap/c/");
        coordinator
            .write(|txn| {
                repo.append(txn, &seq, "http://x/wap/c/a1")?;
                assert!(!txn.store().contains_graph("http://x/wap/c/")?);
                assert_eq!(txn.store().table_len("http://x/wap/c/#annotations")?, 1);
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn reads_work_in_read_transactions() {
        let coordinator = TransactionCoordinator::new(Arc::new(InMemoryGraphStore::new()));
        let repo = IndexedSequenceRepository::new();
        let seq = SequenceId::annotations("http://x/wap/c/");
        coordinator
            .write(|txn| repo.append(txn, &seq, "http://x/wap/c/a1"))
            .unwrap();
        let members = coordinator.read(|txn| repo.members(txn, &seq)).unwrap();
        assert_eq!(members, vec!["http://x/wap/c/a1"]);
        let appended = coordinator.read(|txn| repo.append(txn, &seq, "http://x/wap/c/a2"));
        assert!(appended.is_err());
    }
}
