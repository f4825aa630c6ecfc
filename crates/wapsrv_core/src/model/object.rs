//! The addressable resource shared by containers and annotations.

use crate::iri;
use crate::vocab::{dcterms, oa, rdf, rdfs, wap, xsd};
use chrono::{SecondsFormat, Utc};
use wapsrv_storage::{Graph, Term, Triple, TriplePattern};

/// Current time as an `xsd:dateTime` literal.
#[must_use]
pub fn timestamp_now() -> Term {
    Term::typed_literal(
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        xsd::DATE_TIME,
    )
}

/// A resource stored as its own named graph, keyed by its IRI.
///
/// The graph holds every statement about the resource, including
/// server-managed properties (ETag, tombstone, timestamps).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WapObject {
    iri: String,
    graph: Graph,
}

impl WapObject {
    /// Wraps a graph describing `iri`.
    #[must_use]
    pub fn new(iri: impl Into<String>, graph: Graph) -> Self {
        Self {
            iri: iri.into(),
            graph,
        }
    }

    /// IRI of the resource and name of its graph.
    #[must_use]
    pub fn iri(&self) -> &str {
        &self.iri
    }

    /// The resource as a subject term.
    #[must_use]
    pub fn node(&self) -> Term {
        Term::iri(self.iri.as_str())
    }

    /// The resource's statements.
    #[must_use]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Consumes the object and returns its statements.
    #[must_use]
    pub fn into_graph(self) -> Graph {
        self.graph
    }

    /// Container IRI derived from the resource IRI.
    #[must_use]
    pub fn parent_iri(&self) -> Option<&str> {
        iri::parent_container_iri(&self.iri)
    }

    /// First value of `predicate` as a string (IRI or lexical form).
    #[must_use]
    pub fn value(&self, predicate: &str) -> Option<&str> {
        self.graph
            .first_object(&self.node(), predicate)
            .and_then(term_str)
    }

    /// All values of `predicate` as strings.
    #[must_use]
    pub fn values(&self, predicate: &str) -> Vec<&str> {
        self.graph
            .objects(&self.node(), predicate)
            .filter_map(term_str)
            .collect()
    }

    /// Returns true if the resource declares `rdf:type <type_iri>`.
    #[must_use]
    pub fn has_type(&self, type_iri: &str) -> bool {
        self.graph
            .contains(&Triple::new(self.node(), rdf::TYPE, Term::iri(type_iri)))
    }

    /// Adds a statement to the resource's graph.
    pub fn insert(&mut self, triple: Triple) -> bool {
        self.graph.insert(triple)
    }

    /// Removes a statement from the resource's graph.
    pub fn remove(&mut self, triple: &Triple) -> bool {
        self.graph.remove(triple)
    }

    /// Replaces every value of `predicate` with `value`.
    pub fn set_value(&mut self, predicate: &str, value: Term) {
        let node = self.node();
        self.graph.remove_matching(
            &TriplePattern::any()
                .subject(node.clone())
                .predicate(predicate),
        );
        self.graph.insert(Triple::new(node, predicate, value));
    }

    /// Stored ETag.
    #[must_use]
    pub fn etag(&self) -> Option<&str> {
        self.value(wap::ETAG)
    }

    /// Replaces the stored ETag.
    pub fn set_etag(&mut self, etag: &str) {
        self.set_value(wap::ETAG, Term::literal(etag));
    }

    /// Returns true if the resource carries the tombstone marker.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.graph.first_object(&self.node(), wap::DELETED).is_some()
    }

    /// Adds the tombstone marker.
    pub fn mark_deleted(&mut self) {
        self.set_value(wap::DELETED, tombstone());
    }

    /// `rdfs:label`.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.value(rdfs::LABEL)
    }

    /// Replaces the label.
    pub fn set_label(&mut self, label: &str) {
        self.set_value(rdfs::LABEL, Term::literal(label));
    }

    /// `dcterms:created`.
    #[must_use]
    pub fn created(&self) -> Option<&str> {
        self.value(dcterms::CREATED)
    }

    /// Sets `dcterms:created` unless the resource already has one.
    pub fn set_created_if_absent(&mut self, timestamp: Term) {
        if self.created().is_none() {
            self.set_value(dcterms::CREATED, timestamp);
        }
    }

    /// `dcterms:modified`.
    #[must_use]
    pub fn modified(&self) -> Option<&str> {
        self.value(dcterms::MODIFIED)
    }

    /// Replaces `dcterms:modified`.
    pub fn set_modified(&mut self, timestamp: Term) {
        self.set_value(dcterms::MODIFIED, timestamp);
    }

    /// Moves every statement about the current node onto `new_iri`.
    pub fn rename(&mut self, new_iri: &str) {
        let old = self.node();
        self.rename_from(&old, new_iri, false);
    }

    /// Moves every statement about `old` onto `new_iri`.
    ///
    /// With `copy_via` a previous IRI is kept as `oa:via`; blank node
    /// labels are never kept.
    pub(crate) fn rename_from(&mut self, old: &Term, new_iri: &str, copy_via: bool) {
        let new = Term::iri(new_iri);
        self.iri = new_iri.to_string();
        if *old == new {
            return;
        }
        self.graph.rename_node(old, &new);
        if copy_via {
            if let Term::Iri(_) = old {
                self.graph.insert(Triple::new(new, oa::VIA, old.clone()));
            }
        }
    }

    /// Renames a node inside the graph without changing the resource IRI.
    pub(crate) fn rename_node(&mut self, old: &Term, new: &Term) {
        self.graph.rename_node(old, new);
    }

    /// Removes server-managed properties a client may have sent.
    pub(crate) fn strip_server_properties(&mut self) {
        let node = self.node();
        for predicate in [wap::ETAG, wap::DELETED] {
            self.graph.remove_matching(
                &TriplePattern::any()
                    .subject(node.clone())
                    .predicate(predicate),
            );
        }
    }

    /// Statements rendered as N-Triples lines.
    #[must_use]
    pub fn to_ntriples(&self) -> Vec<String> {
        self.graph.iter().map(|t| t.to_string()).collect()
    }
}

/// Object of the tombstone triple.
#[must_use]
pub fn tombstone() -> Term {
    Term::typed_literal("true", xsd::BOOLEAN)
}

/// Subject carrying `rdf:type <type_iri>`, if exactly one node does.
pub(crate) fn typed_node(graph: &Graph, type_iri: &str) -> Option<Term> {
    let mut nodes = graph
        .find(
            &TriplePattern::any()
                .predicate(rdf::TYPE)
                .object(Term::iri(type_iri)),
        )
        .into_iter()
        .map(|t| t.subject);
    let first = nodes.next()?;
    nodes.next().is_none().then_some(first)
}

fn term_str(term: &Term) -> Option<&str> {
    match term {
        Term::Iri(iri) => Some(iri),
        Term::Literal(literal) => Some(&literal.lexical),
        Term::Blank(_) => None,
    }
}
