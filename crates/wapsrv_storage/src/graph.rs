//! In-memory RDF graphs and the named-graph dataset.

use crate::table::SideTable;
use crate::term::{Term, Triple, TriplePattern};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

type PredicateIndex = BTreeMap<String, BTreeSet<Term>>;

/// A set of triples indexed by subject, then predicate.
///
/// Lookups with a bound subject touch only that subject's statements,
/// which keeps per-object reads independent of dataset size.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    index: BTreeMap<Term, PredicateIndex>,
    len: usize,
}

impl Graph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from a sequence of triples.
    #[must_use]
    pub fn from_triples(triples: impl IntoIterator<Item = Triple>) -> Self {
        let mut graph = Self::new();
        for triple in triples {
            graph.insert(triple);
        }
        graph
    }

    /// Number of triples in the graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the graph holds no triples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts a triple. Returns false if it was already present.
    pub fn insert(&mut self, triple: Triple) -> bool {
        let inserted = self
            .index
            .entry(triple.subject)
            .or_default()
            .entry(triple.predicate)
            .or_default()
            .insert(triple.object);
        if inserted {
            self.len += 1;
        }
        inserted
    }

    /// Removes a triple. Returns false if it was not present.
    pub fn remove(&mut self, triple: &Triple) -> bool {
        let Some(predicates) = self.index.get_mut(&triple.subject) else {
            return false;
        };
        let Some(objects) = predicates.get_mut(&triple.predicate) else {
            return false;
        };
        if !objects.remove(&triple.object) {
            return false;
        }
        if objects.is_empty() {
            predicates.remove(&triple.predicate);
        }
        if predicates.is_empty() {
            self.index.remove(&triple.subject);
        }
        self.len -= 1;
        true
    }

    /// Returns true if the triple is present.
    #[must_use]
    pub fn contains(&self, triple: &Triple) -> bool {
        self.index
            .get(&triple.subject)
            .and_then(|predicates| predicates.get(&triple.predicate))
            .is_some_and(|objects| objects.contains(&triple.object))
    }

    /// Returns true if any triple has `subject` as its subject.
    #[must_use]
    pub fn has_subject(&self, subject: &Term) -> bool {
        self.index.contains_key(subject)
    }

    /// Iterates the objects of `(subject, predicate, ?)` in term order.
    pub fn objects<'a>(
        &'a self,
        subject: &Term,
        predicate: &str,
    ) -> impl Iterator<Item = &'a Term> + 'a {
        self.index
            .get(subject)
            .and_then(|predicates| predicates.get(predicate))
            .into_iter()
            .flat_map(|objects| objects.iter())
    }

    /// Returns the first object of `(subject, predicate, ?)`, if any.
    #[must_use]
    pub fn first_object(&self, subject: &Term, predicate: &str) -> Option<&Term> {
        self.objects(subject, predicate).next()
    }

    /// Returns every triple matching the pattern.
    #[must_use]
    pub fn find(&self, pattern: &TriplePattern) -> Vec<Triple> {
        match &pattern.subject {
            Some(subject) => self
                .index
                .get(subject)
                .map(|predicates| collect_matches(subject, predicates, pattern))
                .unwrap_or_default(),
            None => self
                .index
                .iter()
                .flat_map(|(subject, predicates)| collect_matches(subject, predicates, pattern))
                .collect(),
        }
    }

    /// Removes every triple matching the pattern and returns how many went.
    pub fn remove_matching(&mut self, pattern: &TriplePattern) -> usize {
        let matches = self.find(pattern);
        for triple in &matches {
            self.remove(triple);
        }
        matches.len()
    }

    /// Replaces every occurrence of `from` in subject or object position with `to`.
    pub fn rename_node(&mut self, from: &Term, to: &Term) {
        if from == to {
            return;
        }
        let affected: Vec<Triple> = self
            .iter()
            .filter(|t| t.subject == *from || t.object == *from)
            .collect();
        for triple in affected {
            self.remove(&triple);
            let subject = if triple.subject == *from {
                to.clone()
            } else {
                triple.subject
            };
            let object = if triple.object == *from {
                to.clone()
            } else {
                triple.object
            };
            self.insert(Triple::new(subject, triple.predicate, object));
        }
    }

    /// Adds every triple of `other` to this graph.
    pub fn extend(&mut self, other: &Graph) {
        for triple in other.iter() {
            self.insert(triple);
        }
    }

    /// Iterates all triples in (subject, predicate, object) order.
    pub fn iter(&self) -> impl Iterator<Item = Triple> + '_ {
        self.index.iter().flat_map(|(subject, predicates)| {
            predicates.iter().flat_map(move |(predicate, objects)| {
                objects.iter().map(move |object| {
                    Triple::new(subject.clone(), predicate.clone(), object.clone())
                })
            })
        })
    }
}

fn collect_matches(
    subject: &Term,
    predicates: &PredicateIndex,
    pattern: &TriplePattern,
) -> Vec<Triple> {
    let mut out = Vec::new();
    let mut push = |predicate: &String, objects: &BTreeSet<Term>| match &pattern.object {
        Some(object) => {
            if objects.contains(object) {
                out.push(Triple::new(subject.clone(), predicate.clone(), object.clone()));
            }
        }
        None => out.extend(
            objects
                .iter()
                .map(|object| Triple::new(subject.clone(), predicate.clone(), object.clone())),
        ),
    };
    match &pattern.predicate {
        Some(predicate) => {
            if let Some(objects) = predicates.get(predicate) {
                push(predicate, objects);
            }
        }
        None => {
            for (predicate, objects) in predicates {
                push(predicate, objects);
            }
        }
    }
    out
}

/// All named graphs and side tables of a store.
///
/// Graphs and tables sit behind `Arc`, so a clone shares them and copies
/// one only when it is first mutated. A graph exists while it holds at
/// least one triple.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    graphs: BTreeMap<String, Arc<Graph>>,
    tables: BTreeMap<String, Arc<SideTable>>,
}

impl Dataset {
    /// Creates an empty dataset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if a graph with this name exists.
    #[must_use]
    pub fn contains_graph(&self, name: &str) -> bool {
        self.graph(name).is_some()
    }

    /// Returns the named graph, or `None` if it is absent or empty.
    #[must_use]
    pub fn graph(&self, name: &str) -> Option<&Graph> {
        self.graphs
            .get(name)
            .map(Arc::as_ref)
            .filter(|graph| !graph.is_empty())
    }

    /// Returns the named graph for mutation, creating it if absent.
    pub fn graph_mut(&mut self, name: &str) -> &mut Graph {
        let entry = self.graphs.entry(name.to_string()).or_default();
        Arc::make_mut(entry)
    }

    /// Stores `graph` under `name`, replacing any previous content.
    pub fn replace_graph(&mut self, name: &str, graph: Graph) {
        if graph.is_empty() {
            self.graphs.remove(name);
        } else {
            self.graphs.insert(name.to_string(), Arc::new(graph));
        }
    }

    /// Drops the named graph. Returns false if it did not exist.
    pub fn remove_graph(&mut self, name: &str) -> bool {
        self.graphs
            .remove(name)
            .is_some_and(|graph| !graph.is_empty())
    }

    /// Names of all graphs in order.
    pub fn graph_names(&self) -> impl Iterator<Item = &str> {
        self.graphs
            .iter()
            .filter(|(_, graph)| !graph.is_empty())
            .map(|(name, _)| name.as_str())
    }

    /// Number of named graphs.
    #[must_use]
    pub fn graph_count(&self) -> usize {
        self.graph_names().count()
    }

    /// Total number of triples across all graphs.
    #[must_use]
    pub fn triple_count(&self) -> usize {
        self.graphs.values().map(|g| g.len()).sum()
    }

    /// Returns the named side table.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&SideTable> {
        self.tables.get(name).map(Arc::as_ref)
    }

    /// Returns the named side table for mutation, creating it if absent.
    pub fn table_mut(&mut self, name: &str) -> &mut SideTable {
        let entry = self.tables.entry(name.to_string()).or_default();
        Arc::make_mut(entry)
    }

    /// Drops the named side table. Returns false if it did not exist.
    pub fn remove_table(&mut self, name: &str) -> bool {
        self.tables.remove(name).is_some()
    }
}
