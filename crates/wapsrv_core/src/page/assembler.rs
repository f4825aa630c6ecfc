use super::{last_page_number, page_iri, Page, PageItem};
use crate::error::{WapError, WapResult};
use crate::model::{AnnotationView, WapObject};
use crate::object_store::WapObjectStore;
use crate::sequence::{SequenceId, SequenceRepository};
use crate::transaction::Txn;

/// 1-based inclusive positions covered by page `page_nr`, or `None` when
/// the page lies beyond the sequence.
#[must_use]
pub fn page_bounds(total: usize, page_size: usize, page_nr: u64) -> Option<(usize, usize)> {
    let first = first_index(page_size, page_nr);
    if total == 0 || first > total {
        return None;
    }
    let last = first.saturating_add(page_size - 1).min(total);
    Some((first, last))
}

fn first_index(page_size: usize, page_nr: u64) -> usize {
    usize::try_from(page_nr)
        .unwrap_or(usize::MAX)
        .saturating_mul(page_size)
        .saturating_add(1)
}

/// Builds pages from a container's annotation sequence.
pub struct PageAssembler<'a> {
    sequences: &'a dyn SequenceRepository,
    objects: WapObjectStore,
    page_size: usize,
}

impl<'a> PageAssembler<'a> {
    /// Creates an assembler producing pages of `page_size` items.
    #[must_use]
    pub fn new(sequences: &'a dyn SequenceRepository, page_size: usize) -> Self {
        Self {
            sequences,
            objects: WapObjectStore::new(),
            page_size: page_size.max(1),
        }
    }

    /// Assembles page `page_nr` of `container`.
    ///
    /// A page past the end of the sequence is empty, not an error.
    ///
    /// # Errors
    ///
    /// Returns `IllegalPageIri` for a negative page number, or any error
    /// from reading the sequence or its members.
    pub fn assemble(
        &self,
        txn: &Txn<'_>,
        container: &WapObject,
        iris_only: bool,
        page_nr: i64,
    ) -> WapResult<Page> {
        let container_iri = container.iri();
        let page_nr = u64::try_from(page_nr).map_err(|_| {
            WapError::illegal_page_iri(format!("{container_iri}?page={page_nr}"))
        })?;

        let seq = SequenceId::annotations(container_iri);
        let total = self.sequences.count(txn, &seq)?;
        let bounds = page_bounds(total, self.page_size, page_nr);

        let members = match bounds {
            Some((first, last)) => self.sequences.range_read(txn, &seq, first, last)?,
            None => Vec::new(),
        };
        let items: Vec<PageItem> = if iris_only {
            members.into_iter().map(PageItem::Iri).collect()
        } else {
            members
                .iter()
                .map(|iri| {
                    let object = self.objects.read(txn, iri)?;
                    Ok(PageItem::Annotation(AnnotationView::from_object(&object)))
                })
                .collect::<WapResult<Vec<_>>>()?
        };

        let has_next = bounds.is_some_and(|(_, last)| last < total);
        let last_page = last_page_number(total, self.page_size);
        tracing::debug!(
            container = %container_iri,
            page = page_nr,
            total,
            items = items.len(),
            "page assembled"
        );

        Ok(Page {
            iri: page_iri(container_iri, iris_only, page_nr),
            part_of: container_iri.to_string(),
            page_number: page_nr,
            iris_only,
            total_items: total,
            start_index: first_index(self.page_size, page_nr) - 1,
            next: has_next.then(|| page_iri(container_iri, iris_only, page_nr + 1)),
            prev: (page_nr > 0).then(|| page_iri(container_iri, iris_only, page_nr - 1)),
            first: last_page.map(|_| page_iri(container_iri, iris_only, 0)),
            last: last_page.map(|n| page_iri(container_iri, iris_only, n)),
            label: container.label().map(str::to_string),
            modified: container.modified().map(str::to_string),
            items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Container;
    use crate::sequence::GraphSequenceRepository;
    use crate::transaction::TransactionCoordinator;
    use crate::vocab::{oa, rdf};
    use proptest::prelude::*;
    use std::sync::Arc;
    use wapsrv_storage::{Graph, InMemoryGraphStore, Term, Triple};

    const CONTAINER: &str = "http://x/wap/c/";

    fn setup(members: usize) -> (TransactionCoordinator, WapObject) {
        let coordinator = TransactionCoordinator::new(Arc::new(InMemoryGraphStore::new()));
        let container = Container::empty(CONTAINER).into_object();
        let repo = GraphSequenceRepository::new();
        let objects = WapObjectStore::new();
        coordinator
            .write(|txn| {
                objects.write(txn, &container)?;
                for i in 0..members {
                    let iri = format!("{CONTAINER}a{i}");
                    let mut graph = Graph::new();
                    graph.insert(Triple::new(
                        Term::iri(&iri),
                        rdf::TYPE,
                        Term::iri(oa::ANNOTATION),
                    ));
                    graph.insert(Triple::new(
                        Term::iri(&iri),
                        oa::HAS_TARGET,
                        Term::iri("http://example.org/target"),
                    ));
                    objects.write(txn, &WapObject::new(&iri, graph))?;
                    repo.append(txn, &SequenceId::annotations(CONTAINER), &iri)?;
                }
                Ok(())
            })
            .unwrap();
        (coordinator, container)
    }

    fn page(
        coordinator: &TransactionCoordinator,
        container: &WapObject,
        iris_only: bool,
        nr: i64,
    ) -> WapResult<Page> {
        let repo = GraphSequenceRepository::new();
        let assembler = PageAssembler::new(&repo, 10);
        coordinator.read(|txn| assembler.assemble(txn, container, iris_only, nr))
    }

    #[test]
    fn bounds_follow_page_size() {
        assert_eq!(page_bounds(25, 10, 0), Some((1, 10)));
        assert_eq!(page_bounds(25, 10, 2), Some((21, 25)));
        assert_eq!(page_bounds(25, 10, 3), None);
        assert_eq!(page_bounds(0, 10, 0), None);
        assert_eq!(page_bounds(5, 10, u64::MAX), None);
    }

    #[test]
    fn empty_sequence_page_zero() {
        let (coordinator, container) = setup(0);
        let page = page(&coordinator, &container, true, 0).unwrap();
        assert!(page.is_empty());
        assert_eq!(page.next, None);
        assert_eq!(page.prev, None);
        assert_eq!(page.first, None);
        assert_eq!(page.last, None);
    }

    #[test]
    fn pages_chain_through_the_sequence() {
        let (coordinator, container) = setup(25);
        let sizes: Vec<usize> = (0..3)
            .map(|nr| page(&coordinator, &container, true, nr).unwrap().len())
            .collect();
        assert_eq!(sizes, vec![10, 10, 5]);

        let middle = page(&coordinator, &container, true, 1).unwrap();
        assert_eq!(middle.next.as_deref(), Some("http://x/wap/c/?iris=1&page=2"));
        assert_eq!(middle.prev.as_deref(), Some("http://x/wap/c/?iris=1&page=0"));
        assert_eq!(middle.start_index, 10);
        assert_eq!(middle.item_iris()[0], "http://x/wap/c/a10");
        assert_eq!(middle.last.as_deref(), Some("http://x/wap/c/?iris=1&page=2"));

        let last = page(&coordinator, &container, true, 2).unwrap();
        assert_eq!(last.next, None);
    }

    #[test]
    fn descriptions_are_resolved() {
        let (coordinator, container) = setup(3);
        let page = page(&coordinator, &container, false, 0).unwrap();
        match &page.items[0] {
            PageItem::Annotation(view) => {
                assert_eq!(view.iri, "http://x/wap/c/a0");
                assert_eq!(view.targets, vec!["http://example.org/target"]);
            }
            PageItem::Iri(_) => panic!("expected a description"),
        }
    }

    #[test]
    fn out_of_range_page_is_empty() {
        let (coordinator, container) = setup(5);
        let page = page(&coordinator, &container, true, 4).unwrap();
        assert!(page.is_empty());
        assert_eq!(page.next, None);
        assert!(page.prev.is_some());
    }

    #[test]
    fn negative_page_is_rejected() {
        let (coordinator, container) = setup(5);
        assert!(matches!(
            page(&coordinator, &container, true, -1),
            Err(WapError::IllegalPageIri { .. })
        ));
    }

    proptest! {
        #[test]
        fn pages_cover_sequence_exactly(total in 0usize..200, page_size in 1usize..25) {
            let mut covered = Vec::new();
            let mut nr = 0u64;
            while let Some((first, last)) = page_bounds(total, page_size, nr) {
                prop_assert!(last - first < page_size);
                covered.extend(first..=last);
                if last == total {
                    break;
                }
                nr += 1;
            }
            prop_assert_eq!(covered, (1..=total).collect::<Vec<_>>());
        }
    }
}
