use super::{check_range, SequenceId, SequenceRepository};
use crate::config::SequenceBackend;
use crate::error::{WapError, WapResult};
use crate::transaction::Txn;
use crate::vocab::rdf;
use wapsrv_storage::{Term, Triple, TriplePattern};

/// Sequence stored as `rdf:_n` membership triples on the sequence node.
#[derive(Debug, Default, Clone, Copy)]
pub struct GraphSequenceRepository;

impl GraphSequenceRepository {
    /// Creates the repository.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Membership triples as `(position, member)`, sorted by position.
    fn entries(txn: &Txn<'_>, seq: &SequenceId) -> WapResult<Vec<(usize, Term)>> {
        let pattern = TriplePattern::any().subject(Term::iri(seq.iri()));
        let mut entries: Vec<(usize, Term)> = txn
            .store()
            .find(seq.container_iri(), &pattern)?
            .into_iter()
            .filter_map(|t| rdf::member_position(&t.predicate).map(|n| (n, t.object)))
            .collect();
        entries.sort_by_key(|(n, _)| *n);
        Ok(entries)
    }

    fn has_member_at(txn: &Txn<'_>, seq: &SequenceId, position: usize) -> WapResult<bool> {
        let pattern = TriplePattern::any()
            .subject(Term::iri(seq.iri()))
            .predicate(rdf::member(position));
        Ok(!txn.store().find(seq.container_iri(), &pattern)?.is_empty())
    }

    fn member_at(txn: &Txn<'_>, seq: &SequenceId, position: usize) -> WapResult<String> {
        let pattern = TriplePattern::any()
            .subject(Term::iri(seq.iri()))
            .predicate(rdf::member(position));
        let found = txn.store().find(seq.container_iri(), &pattern)?;
        found
            .first()
            .and_then(|t| t.object.as_iri())
            .map(str::to_string)
            .ok_or_else(|| {
                WapError::internal(format!("sequence {} has no member at {position}", seq.iri()))
            })
    }
}

impl SequenceRepository for GraphSequenceRepository {
    fn backend(&self) -> SequenceBackend {
        SequenceBackend::Graph
    }

    fn append(&self, txn: &Txn<'_>, seq: &SequenceId, object_iri: &str) -> WapResult<()> {
        let node = Term::iri(seq.iri());
        let next = self.count(txn, seq)? + 1;
        let store = txn.store();
        store.add(
            seq.container_iri(),
            Triple::new(node.clone(), rdf::TYPE, Term::iri(rdf::SEQ)),
        )?;
        store.add(
            seq.container_iri(),
            Triple::new(node, rdf::member(next), Term::iri(object_iri)),
        )?;
        Ok(())
    }

    fn remove(&self, txn: &Txn<'_>, seq: &SequenceId, object_iri: &str) -> WapResult<bool> {
        let target = Term::iri(object_iri);
        let entries = Self::entries(txn, seq)?;
        let Some(index) = entries.iter().position(|(_, member)| *member == target) else {
            return Ok(false);
        };

        let node = Term::iri(seq.iri());
        let store = txn.store();
        for (position, member) in &entries[index..] {
            store.remove_matching(
                seq.container_iri(),
                &TriplePattern::any()
                    .subject(node.clone())
                    .predicate(rdf::member(*position))
                    .object(member.clone()),
            )?;
        }
        for (position, member) in entries.into_iter().skip(index + 1) {
            store.add(
                seq.container_iri(),
                Triple::new(node.clone(), rdf::member(position - 1), member),
            )?;
        }
        Ok(true)
    }

    /// Positions are contiguous from 1, so the count is the last occupied
    /// position, found by galloping and then bisecting.
    fn count(&self, txn: &Txn<'_>, seq: &SequenceId) -> WapResult<usize> {
        let mut high = 1;
        while Self::has_member_at(txn, seq, high)? {
            high *= 2;
        }
        // `low` is occupied (or zero) and `high` is free.
        let mut low = high / 2;
        while high - low > 1 {
            let mid = low + (high - low) / 2;
            if Self::has_member_at(txn, seq, mid)? {
                low = mid;
            } else {
                high = mid;
            }
        }
        Ok(low)
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
        (first..=last)
            .map(|position| Self::member_at(txn, seq, position))
            .collect()
    }

    fn clear(&self, txn: &Txn<'_>, seq: &SequenceId) -> WapResult<usize> {
        let entries = Self::entries(txn, seq)?;
        let node = Term::iri(seq.iri());
        for (position, _) in &entries {
            txn.store().remove_matching(
                seq.container_iri(),
                &TriplePattern::any()
                    .subject(node.clone())
                    .predicate(rdf::member(*position)),
            )?;
        }
        Ok(entries.len())
    }
}
