//! Containers: LDP basic containers that are also ordered collections.

use crate::error::{WapError, WapResult};
use crate::iri;
use crate::model::object::{typed_node, WapObject};
use crate::vocab::{activity, ldp, rdf};
use wapsrv_storage::{Graph, Term, Triple};

/// A container resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    object: WapObject,
}

impl Container {
    /// Builds a container at `new_iri` from a client-supplied body.
    ///
    /// The body must contain exactly one node typed both
    /// `ldp:BasicContainer` and `as:OrderedCollection`. That node and its
    /// sequence nodes are renamed to `new_iri`; client-supplied ETag and
    /// tombstone statements are dropped.
    ///
    /// # Errors
    ///
    /// Returns `NotAContainer` if the shape is wrong.
    pub fn from_body(body: Graph, new_iri: &str) -> WapResult<Self> {
        let node = typed_node(&body, ldp::BASIC_CONTAINER).ok_or_else(|| {
            WapError::not_a_container("body must describe exactly one ldp:BasicContainer")
        })?;
        if !body.contains(&Triple::new(
            node.clone(),
            rdf::TYPE,
            Term::iri(activity::ORDERED_COLLECTION),
        )) {
            return Err(WapError::not_a_container(
                "a container has to be an ldp:BasicContainer and an as:OrderedCollection",
            ));
        }

        let mut object = WapObject::new(new_iri, body);
        if let Term::Iri(old_iri) = &node {
            object.rename_node(
                &Term::iri(iri::container_seq_iri(old_iri)),
                &Term::iri(iri::container_seq_iri(new_iri)),
            );
            object.rename_node(
                &Term::iri(iri::annotation_seq_iri(old_iri)),
                &Term::iri(iri::annotation_seq_iri(new_iri)),
            );
        }
        object.rename_from(&node, new_iri, false);
        object.strip_server_properties();

        let mut container = Self { object };
        container.drop_client_members();
        container.declare_sequences();
        Ok(container)
    }

    /// Builds an empty container with both types and sequence nodes.
    #[must_use]
    pub fn empty(iri: &str) -> Self {
        let mut graph = Graph::new();
        let node = Term::iri(iri);
        graph.insert(Triple::new(
            node.clone(),
            rdf::TYPE,
            Term::iri(ldp::BASIC_CONTAINER),
        ));
        graph.insert(Triple::new(
            node,
            rdf::TYPE,
            Term::iri(activity::ORDERED_COLLECTION),
        ));
        let mut container = Self {
            object: WapObject::new(iri, graph),
        };
        container.declare_sequences();
        container
    }

    /// Wraps a stored object.
    ///
    /// # Errors
    ///
    /// Returns `NotAContainer` if the object is not typed `ldp:BasicContainer`.
    pub fn from_object(object: WapObject) -> WapResult<Self> {
        if !object.has_type(ldp::BASIC_CONTAINER) {
            return Err(WapError::not_a_container(format!(
                "{} is not a container",
                object.iri()
            )));
        }
        Ok(Self { object })
    }

    /// Membership is server-managed; a body cannot seed its sequences.
    fn drop_client_members(&mut self) {
        let seqs = [
            Term::iri(iri::container_seq_iri(self.object.iri())),
            Term::iri(iri::annotation_seq_iri(self.object.iri())),
        ];
        let members: Vec<Triple> = self
            .object
            .graph()
            .iter()
            .filter(|t| seqs.contains(&t.subject) && rdf::member_position(&t.predicate).is_some())
            .collect();
        for triple in &members {
            self.object.remove(triple);
        }
    }

    fn declare_sequences(&mut self) {
        for seq in [
            iri::container_seq_iri(self.object.iri()),
            iri::annotation_seq_iri(self.object.iri()),
        ] {
            self.object
                .insert(Triple::new(Term::iri(seq), rdf::TYPE, Term::iri(rdf::SEQ)));
        }
    }

    /// Returns true if both sequence nodes are declared.
    #[must_use]
    pub fn has_sequences(&self) -> bool {
        [
            iri::container_seq_iri(self.object.iri()),
            iri::annotation_seq_iri(self.object.iri()),
        ]
        .into_iter()
        .all(|seq| {
            self.object
                .graph()
                .contains(&Triple::new(Term::iri(seq), rdf::TYPE, Term::iri(rdf::SEQ)))
        })
    }

    /// Container IRI.
    #[must_use]
    pub fn iri(&self) -> &str {
        self.object.iri()
    }

    /// Label, if one is set.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.object.label()
    }

    /// The underlying resource.
    #[must_use]
    pub fn object(&self) -> &WapObject {
        &self.object
    }

    /// The underlying resource, mutably.
    pub fn object_mut(&mut self) -> &mut WapObject {
        &mut self.object
    }

    /// Consumes the container and returns its resource.
    #[must_use]
    pub fn into_object(self) -> WapObject {
        self.object
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::rdfs;

    fn body(node: Term, label: Option<&str>) -> Graph {
        let mut graph = Graph::new();
        graph.insert(Triple::new(
            node.clone(),
            rdf::TYPE,
            Term::iri(ldp::BASIC_CONTAINER),
        ));
        graph.insert(Triple::new(
            node.clone(),
            rdf::TYPE,
            Term::iri(activity::ORDERED_COLLECTION),
        ));
        if let Some(label) = label {
            graph.insert(Triple::new(node, rdfs::LABEL, Term::literal(label)));
        }
        graph
    }

    #[test]
    fn blank_node_body_is_renamed() {
        let container =
            Container::from_body(body(Term::blank("c"), Some("Mine")), "http://x/wap/c1/").unwrap();
        assert_eq!(container.iri(), "http://x/wap/c1/");
        assert_eq!(container.label(), Some("Mine"));
        assert!(container.object().has_type(ldp::BASIC_CONTAINER));
        assert!(container.has_sequences());
    }

    #[test]
    fn iri_body_moves_sequence_nodes() {
        let mut graph = body(Term::iri("http://client/c/"), None);
        graph.insert(Triple::new(
            Term::iri("http://client/c/#annotations"),
            rdf::TYPE,
            Term::iri(rdf::SEQ),
        ));
        let container = Container::from_body(graph, "http://x/wap/c1/").unwrap();
        assert!(container.has_sequences());
        assert!(!container
            .object()
            .graph()
            .has_subject(&Term::iri("http://client/c/#annotations")));
        assert!(!container.object().graph().has_subject(&Term::iri("http://client/c/")));
    }

    #[test]
    fn missing_types_are_rejected() {
        let mut graph = Graph::new();
        graph.insert(Triple::new(
            Term::blank("c"),
            rdf::TYPE,
            Term::iri(ldp::BASIC_CONTAINER),
        ));
        assert!(matches!(
            Container::from_body(graph, "http://x/wap/c1/"),
            Err(WapError::NotAContainer { .. })
        ));
        assert!(matches!(
            Container::from_body(Graph::new(), "http://x/wap/c1/"),
            Err(WapError::NotAContainer { .. })
        ));
    }

    #[test]
    fn client_etag_is_dropped() {
        let mut graph = body(Term::blank("c"), None);
        graph.insert(Triple::new(
            Term::blank("c"),
            crate::vocab::wap::ETAG,
            Term::literal("forged"),
        ));
        let container = Container::from_body(graph, "http://x/wap/c1/").unwrap();
        assert_eq!(container.object().etag(), None);
    }

    #[test]
    fn client_members_are_dropped() {
        let mut graph = body(Term::iri("http://client/c/"), None);
        graph.insert(Triple::new(
            Term::iri("http://client/c/#annotations"),
            rdf::member(1),
            Term::iri("http://elsewhere/a"),
        ));
        let container = Container::from_body(graph, "http://x/wap/c1/").unwrap();
        assert!(container.has_sequences());
        assert!(!container
            .object()
            .graph()
            .iter()
            .any(|t| rdf::member_position(&t.predicate).is_some()));
    }

    #[test]
    fn empty_container_shape() {
        let container = Container::empty("http://x/wap/");
        assert!(container.has_sequences());
        assert!(Container::from_object(container.object().clone()).is_ok());
        assert!(Container::from_object(WapObject::new("http://x/a", Graph::new())).is_err());
    }
}
