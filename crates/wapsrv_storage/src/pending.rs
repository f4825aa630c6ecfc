//! Pending writes of an open write transaction.
//!
//! A write transaction does not copy the committed dataset. It records
//! its changes per graph and per side table, and reads inside the
//! transaction merge those changes over the committed state. Commit
//! applies them to the dataset, so its cost follows the size of the
//! change rather than the size of the store.

use crate::graph::{Dataset, Graph};
use crate::table::SideTable;
use crate::term::{Triple, TriplePattern};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Changes to one named graph.
///
/// While attached, `removed` holds only committed triples and `added`
/// only triples the committed graph lacks.
#[derive(Debug, Default)]
struct PendingGraph {
    /// The committed graph no longer applies (replaced or dropped).
    detached: bool,
    added: Graph,
    removed: Graph,
}

impl PendingGraph {
    fn base<'a>(&self, committed: Option<&'a Graph>) -> Option<&'a Graph> {
        if self.detached {
            None
        } else {
            committed
        }
    }

    fn len(&self, base: Option<&Graph>) -> usize {
        base.map_or(0, |graph| graph.len() - self.removed.len()) + self.added.len()
    }

    fn contains(&self, base: Option<&Graph>, triple: &Triple) -> bool {
        self.added.contains(triple)
            || base.is_some_and(|graph| graph.contains(triple) && !self.removed.contains(triple))
    }

    fn insert(&mut self, base: Option<&Graph>, triple: Triple) -> bool {
        if self.contains(base, &triple) {
            return false;
        }
        if base.is_some_and(|graph| graph.contains(&triple)) {
            self.removed.remove(&triple);
        } else {
            self.added.insert(triple);
        }
        true
    }

    fn remove(&mut self, base: Option<&Graph>, triple: &Triple) -> bool {
        if self.added.remove(triple) {
            return true;
        }
        if base.is_some_and(|graph| graph.contains(triple)) {
            return self.removed.insert(triple.clone());
        }
        false
    }

    fn find(&self, base: Option<&Graph>, pattern: &TriplePattern) -> Vec<Triple> {
        let mut found = base.map(|graph| graph.find(pattern)).unwrap_or_default();
        if !self.removed.is_empty() {
            found.retain(|triple| !self.removed.contains(triple));
        }
        if !self.added.is_empty() {
            found.extend(self.added.find(pattern));
            found.sort();
        }
        found
    }

    fn materialize(&self, base: Option<&Graph>) -> Graph {
        let mut graph = base.cloned().unwrap_or_default();
        for triple in self.removed.iter() {
            graph.remove(&triple);
        }
        graph.extend(&self.added);
        graph
    }

    fn detach(&mut self, content: Graph) {
        self.detached = true;
        self.added = content;
        self.removed = Graph::new();
    }

    fn apply(&self, dataset: &mut Dataset, name: &str) {
        if self.detached {
            dataset.replace_graph(name, self.added.clone());
            return;
        }
        if self.added.is_empty() && self.removed.is_empty() {
            return;
        }
        let emptied = {
            let graph = dataset.graph_mut(name);
            for triple in self.removed.iter() {
                graph.remove(&triple);
            }
            graph.extend(&self.added);
            graph.is_empty()
        };
        if emptied {
            dataset.remove_graph(name);
        }
    }
}

/// A side-table mutation, replayed in order on commit.
#[derive(Debug)]
enum TableOp {
    Append(String),
    RemoveFirst(String),
    Clear,
}

/// Changes to one side table.
#[derive(Debug)]
struct PendingTable {
    /// Committed rows no longer apply.
    cleared: bool,
    /// Order keys of committed rows removed in this transaction.
    removed: BTreeSet<u64>,
    /// Rows appended in this transaction. Their keys follow the committed ones.
    appended: BTreeMap<u64, String>,
    appended_orders: HashMap<String, BTreeSet<u64>>,
    next_order: u64,
    log: Vec<TableOp>,
}

impl PendingTable {
    fn new(committed: Option<&SideTable>) -> Self {
        Self {
            cleared: false,
            removed: BTreeSet::new(),
            appended: BTreeMap::new(),
            appended_orders: HashMap::new(),
            next_order: committed.map_or(0, SideTable::next_order),
            log: Vec::new(),
        }
    }

    fn base<'a>(&self, committed: Option<&'a SideTable>) -> Option<&'a SideTable> {
        if self.cleared {
            None
        } else {
            committed
        }
    }

    fn first_committed(&self, base: Option<&SideTable>, value: &str) -> Option<u64> {
        base?
            .orders_of(value)
            .find(|order| !self.removed.contains(order))
    }

    fn len(&self, base: Option<&SideTable>) -> usize {
        base.map_or(0, |table| table.len() - self.removed.len()) + self.appended.len()
    }

    fn contains(&self, base: Option<&SideTable>, value: &str) -> bool {
        self.first_committed(base, value).is_some() || self.appended_orders.contains_key(value)
    }

    fn append(&mut self, value: &str) {
        let order = self.next_order;
        self.next_order += 1;
        self.appended.insert(order, value.to_string());
        self.appended_orders
            .entry(value.to_string())
            .or_default()
            .insert(order);
        self.log.push(TableOp::Append(value.to_string()));
    }

    fn remove_first(&mut self, base: Option<&SideTable>, value: &str) -> bool {
        if let Some(order) = self.first_committed(base, value) {
            self.removed.insert(order);
        } else {
            let Some(orders) = self.appended_orders.get_mut(value) else {
                return false;
            };
            let Some(order) = orders.pop_first() else {
                return false;
            };
            if orders.is_empty() {
                self.appended_orders.remove(value);
            }
            self.appended.remove(&order);
        }
        self.log.push(TableOp::RemoveFirst(value.to_string()));
        true
    }

    fn range(&self, base: Option<&SideTable>, offset: usize, limit: usize) -> Vec<String> {
        base.into_iter()
            .flat_map(|table| table.rows())
            .filter(|(order, _)| !self.removed.contains(order))
            .map(|(_, value)| value)
            .chain(self.appended.values().map(String::as_str))
            .skip(offset)
            .take(limit)
            .map(str::to_string)
            .collect()
    }

    fn clear(&mut self, base: Option<&SideTable>) -> usize {
        let removed = self.len(base);
        self.cleared = true;
        self.removed.clear();
        self.appended.clear();
        self.appended_orders.clear();
        self.log.push(TableOp::Clear);
        removed
    }

    fn apply(&self, dataset: &mut Dataset, name: &str) {
        if self.log.is_empty() {
            return;
        }
        let emptied = {
            let table = dataset.table_mut(name);
            for op in &self.log {
                match op {
                    TableOp::Append(value) => table.append(value),
                    TableOp::RemoveFirst(value) => {
                        table.remove_first(value);
                    }
                    TableOp::Clear => {
                        table.clear();
                    }
                }
            }
            table.is_empty()
        };
        if emptied {
            dataset.remove_table(name);
        }
    }
}

/// Everything a write transaction has changed so far.
#[derive(Debug, Default)]
pub(crate) struct PendingWrites {
    graphs: BTreeMap<String, PendingGraph>,
    tables: BTreeMap<String, PendingTable>,
}

impl PendingWrites {
    /// Returns true if nothing has been written.
    pub(crate) fn is_empty(&self) -> bool {
        self.graphs.is_empty() && self.tables.is_empty()
    }

    pub(crate) fn replace_graph(&mut self, name: &str, graph: Graph) {
        self.graphs
            .entry(name.to_string())
            .or_default()
            .detach(graph);
    }

    pub(crate) fn remove_graph(&mut self, base: &Dataset, name: &str) -> bool {
        let existed = DatasetView::new(base, Some(&*self)).contains_graph(name);
        if existed {
            self.replace_graph(name, Graph::new());
        }
        existed
    }

    pub(crate) fn add(&mut self, base: &Dataset, name: &str, triple: Triple) -> bool {
        let pending = self.graphs.entry(name.to_string()).or_default();
        let committed = pending.base(base.graph(name));
        pending.insert(committed, triple)
    }

    pub(crate) fn remove_matching(
        &mut self,
        base: &Dataset,
        name: &str,
        pattern: &TriplePattern,
    ) -> usize {
        if !self.graphs.contains_key(name) && !base.contains_graph(name) {
            return 0;
        }
        let pending = self.graphs.entry(name.to_string()).or_default();
        let committed = pending.base(base.graph(name));
        let matches = pending.find(committed, pattern);
        for triple in &matches {
            pending.remove(committed, triple);
        }
        matches.len()
    }

    fn table_entry(&mut self, base: &Dataset, name: &str) -> &mut PendingTable {
        self.tables
            .entry(name.to_string())
            .or_insert_with(|| PendingTable::new(base.table(name)))
    }

    pub(crate) fn table_append(&mut self, base: &Dataset, name: &str, value: &str) {
        self.table_entry(base, name).append(value);
    }

    pub(crate) fn table_remove_first(&mut self, base: &Dataset, name: &str, value: &str) -> bool {
        if !DatasetView::new(base, Some(&*self)).table_contains(name, value) {
            return false;
        }
        let pending = self.table_entry(base, name);
        let committed = pending.base(base.table(name));
        pending.remove_first(committed, value)
    }

    pub(crate) fn table_clear(&mut self, base: &Dataset, name: &str) -> usize {
        if DatasetView::new(base, Some(&*self)).table_len(name) == 0 {
            return 0;
        }
        let pending = self.table_entry(base, name);
        let committed = pending.base(base.table(name));
        pending.clear(committed)
    }

    /// Writes every pending change into `dataset`.
    ///
    /// `dataset` must be the state the transaction started from.
    pub(crate) fn apply(&self, dataset: &mut Dataset) {
        for (name, pending) in &self.graphs {
            pending.apply(dataset, name);
        }
        for (name, pending) in &self.tables {
            pending.apply(dataset, name);
        }
    }
}

/// Read access to a committed dataset, with a write transaction's
/// pending changes merged over it when there are any.
#[derive(Clone, Copy)]
pub(crate) struct DatasetView<'a> {
    base: &'a Dataset,
    pending: Option<&'a PendingWrites>,
}

impl<'a> DatasetView<'a> {
    pub(crate) fn new(base: &'a Dataset, pending: Option<&'a PendingWrites>) -> Self {
        Self { base, pending }
    }

    fn pending_graph(&self, name: &str) -> Option<&'a PendingGraph> {
        self.pending.and_then(|p| p.graphs.get(name))
    }

    fn pending_table(&self, name: &str) -> Option<&'a PendingTable> {
        self.pending.and_then(|p| p.tables.get(name))
    }

    pub(crate) fn contains_graph(&self, name: &str) -> bool {
        match self.pending_graph(name) {
            Some(pending) => pending.len(pending.base(self.base.graph(name))) > 0,
            None => self.base.contains_graph(name),
        }
    }

    pub(crate) fn graph(&self, name: &str) -> Option<Graph> {
        match self.pending_graph(name) {
            Some(pending) => {
                let committed = pending.base(self.base.graph(name));
                (pending.len(committed) > 0).then(|| pending.materialize(committed))
            }
            None => self.base.graph(name).cloned(),
        }
    }

    pub(crate) fn find(&self, name: &str, pattern: &TriplePattern) -> Vec<Triple> {
        match self.pending_graph(name) {
            Some(pending) => pending.find(pending.base(self.base.graph(name)), pattern),
            None => self
                .base
                .graph(name)
                .map(|graph| graph.find(pattern))
                .unwrap_or_default(),
        }
    }

    pub(crate) fn table_len(&self, name: &str) -> usize {
        match self.pending_table(name) {
            Some(pending) => pending.len(pending.base(self.base.table(name))),
            None => self.base.table(name).map_or(0, SideTable::len),
        }
    }

    pub(crate) fn table_contains(&self, name: &str, value: &str) -> bool {
        match self.pending_table(name) {
            Some(pending) => pending.contains(pending.base(self.base.table(name)), value),
            None => self.base.table(name).is_some_and(|t| t.contains(value)),
        }
    }

    pub(crate) fn table_range(&self, name: &str, offset: usize, limit: usize) -> Vec<String> {
        match self.pending_table(name) {
            Some(pending) => pending.range(pending.base(self.base.table(name)), offset, limit),
            None => self
                .base
                .table(name)
                .map(|t| t.range(offset, limit))
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Term;
    use proptest::prelude::*;

    fn t(s: &str, o: &str) -> Triple {
        Triple::new(Term::iri(s), "p", Term::literal(o))
    }

    fn committed() -> Dataset {
        let mut ds = Dataset::new();
        ds.graph_mut("g").insert(t("a", "1"));
        ds.graph_mut("g").insert(t("b", "2"));
        for value in ["x", "y", "x"] {
            ds.table_mut("tbl").append(value);
        }
        ds
    }

    #[test]
    fn reads_merge_pending_graph_changes() {
        let base = committed();
        let mut pending = PendingWrites::default();
        assert!(!pending.add(&base, "g", t("a", "1")));
        assert!(pending.add(&base, "g", t("c", "3")));
        let b = TriplePattern::any().subject(Term::iri("b"));
        assert_eq!(pending.remove_matching(&base, "g", &b), 1);

        let view = DatasetView::new(&base, Some(&pending));
        assert_eq!(view.find("g", &TriplePattern::any()), vec![t("a", "1"), t("c", "3")]);
        assert_eq!(view.graph("g").map(|g| g.len()), Some(2));
        assert_eq!(base.graph("g").map(Graph::len), Some(2));
        assert!(base.graph("g").is_some_and(|g| g.contains(&t("b", "2"))));
    }

    #[test]
    fn removing_then_re_adding_a_committed_triple_is_a_no_op() {
        let base = committed();
        let mut pending = PendingWrites::default();
        pending.remove_matching(&base, "g", &TriplePattern::any().subject(Term::iri("a")));
        assert!(pending.add(&base, "g", t("a", "1")));

        let mut applied = base.clone();
        pending.apply(&mut applied);
        assert_eq!(applied.graph("g"), base.graph("g"));
    }

    #[test]
    fn dropped_graph_can_be_recreated() {
        let base = committed();
        let mut pending = PendingWrites::default();
        assert!(pending.remove_graph(&base, "g"));
        assert!(!pending.remove_graph(&base, "g"));
        assert!(!DatasetView::new(&base, Some(&pending)).contains_graph("g"));

        pending.add(&base, "g", t("z", "9"));
        let view = DatasetView::new(&base, Some(&pending));
        assert_eq!(view.find("g", &TriplePattern::any()), vec![t("z", "9")]);

        let mut applied = base.clone();
        pending.apply(&mut applied);
        assert_eq!(applied.graph("g").map(Graph::len), Some(1));
    }

    #[test]
    fn emptying_a_graph_drops_it_on_apply() {
        let base = committed();
        let mut pending = PendingWrites::default();
        assert_eq!(pending.remove_matching(&base, "g", &TriplePattern::any()), 2);
        assert!(!DatasetView::new(&base, Some(&pending)).contains_graph("g"));

        let mut applied = base.clone();
        pending.apply(&mut applied);
        assert!(!applied.contains_graph("g"));
    }

    #[test]
    fn table_changes_merge_and_replay() {
        let base = committed();
        let mut pending = PendingWrites::default();
        pending.table_append(&base, "tbl", "z");
        assert!(pending.table_remove_first(&base, "tbl", "x"));
        pending.table_append(&base, "tbl", "x");
        assert!(!pending.table_remove_first(&base, "tbl", "missing"));

        let view = DatasetView::new(&base, Some(&pending));
        assert_eq!(view.table_len("tbl"), 4);
        assert_eq!(view.table_range("tbl", 0, 10), vec!["y", "x", "z", "x"]);
        assert_eq!(view.table_range("tbl", 2, 1), vec!["z"]);

        let mut applied = base.clone();
        pending.apply(&mut applied);
        assert_eq!(
            applied.table("tbl").map(|t| t.range(0, 10)),
            Some(vec!["y".into(), "x".into(), "z".into(), "x".into()])
        );
        assert_eq!(base.table("tbl").map(SideTable::len), Some(3));
    }

    #[test]
    fn cleared_table_ignores_committed_rows() {
        let base = committed();
        let mut pending = PendingWrites::default();
        assert_eq!(pending.table_clear(&base, "tbl"), 3);
        assert_eq!(pending.table_clear(&base, "tbl"), 0);
        assert!(!pending.table_remove_first(&base, "tbl", "y"));
        pending.table_append(&base, "tbl", "fresh");

        let view = DatasetView::new(&base, Some(&pending));
        assert_eq!(view.table_range("tbl", 0, 10), vec!["fresh"]);

        let mut applied = base.clone();
        pending.apply(&mut applied);
        assert_eq!(applied.table("tbl").map(|t| t.range(0, 10)), Some(vec!["fresh".into()]));
    }

    proptest! {
        #[test]
        fn pending_table_matches_direct_mutation(
            seed in prop::collection::vec(0u8..4, 0..16),
            ops in prop::collection::vec((0u8..3, 0u8..4), 0..48),
        ) {
            let mut base = Dataset::new();
            for value in &seed {
                base.table_mut("t").append(&value.to_string());
            }
            let mut direct = base.table("t").cloned().unwrap_or_default();
            let mut pending = PendingWrites::default();

            for (op, value) in ops {
                let value = value.to_string();
                match op {
                    0 => {
                        direct.append(&value);
                        pending.table_append(&base, "t", &value);
                    }
                    1 => {
                        let expected = direct.remove_first(&value);
                        prop_assert_eq!(pending.table_remove_first(&base, "t", &value), expected);
                    }
                    _ => {
                        let expected = direct.clear();
                        prop_assert_eq!(pending.table_clear(&base, "t"), expected);
                    }
                }
                let view = DatasetView::new(&base, Some(&pending));
                prop_assert_eq!(view.table_len("t"), direct.len());
            }

            let view = DatasetView::new(&base, Some(&pending));
            prop_assert_eq!(view.table_range("t", 0, usize::MAX), direct.range(0, usize::MAX));

            let mut applied = base.clone();
            pending.apply(&mut applied);
            prop_assert_eq!(
                applied.table("t").map(|t| t.range(0, usize::MAX)).unwrap_or_default(),
                direct.range(0, usize::MAX)
            );
        }
    }
}
