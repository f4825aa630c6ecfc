//! Annotations.

use crate::error::{WapError, WapResult};
use crate::model::object::{typed_node, WapObject};
use crate::vocab::oa;
use wapsrv_storage::Graph;

/// An annotation resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    object: WapObject,
}

impl Annotation {
    /// Builds an annotation at `new_iri` from a client-supplied body.
    ///
    /// The body must contain exactly one `oa:Annotation` node with at
    /// least one `oa:hasTarget`. A client IRI is kept as `oa:via`.
    ///
    /// # Errors
    ///
    /// Returns `NotAnAnnotation` if the type or the target is missing.
    pub fn from_body(body: Graph, new_iri: &str) -> WapResult<Self> {
        let node = typed_node(&body, oa::ANNOTATION).ok_or_else(|| {
            WapError::not_an_annotation("body must describe exactly one oa:Annotation")
        })?;
        if body.first_object(&node, oa::HAS_TARGET).is_none() {
            return Err(WapError::not_an_annotation(
                "an annotation needs at least one oa:hasTarget",
            ));
        }

        let mut object = WapObject::new(new_iri, body);
        object.rename_from(&node, new_iri, true);
        object.strip_server_properties();
        Ok(Self { object })
    }

    /// Wraps a stored object.
    ///
    /// # Errors
    ///
    /// Returns `NotAnAnnotation` if the object is not typed `oa:Annotation`.
    pub fn from_object(object: WapObject) -> WapResult<Self> {
        if !object.has_type(oa::ANNOTATION) {
            return Err(WapError::not_an_annotation(format!(
                "{} is not an annotation",
                object.iri()
            )));
        }
        Ok(Self { object })
    }

    /// Annotation IRI.
    #[must_use]
    pub fn iri(&self) -> &str {
        self.object.iri()
    }

    /// Container the annotation belongs to.
    #[must_use]
    pub fn container_iri(&self) -> Option<&str> {
        self.object.parent_iri()
    }

    /// Targets of the annotation.
    #[must_use]
    pub fn targets(&self) -> Vec<&str> {
        self.object.values(oa::HAS_TARGET)
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::rdf;
    use wapsrv_storage::{Term, Triple};

    fn body(node: Term, target: bool) -> Graph {
        let mut graph = Graph::new();
        graph.insert(Triple::new(node.clone(), rdf::TYPE, Term::iri(oa::ANNOTATION)));
        if target {
            graph.insert(Triple::new(
                node,
                oa::HAS_TARGET,
                Term::iri("http://example.org/page1"),
            ));
        }
        graph
    }

    #[test]
    fn annotation_is_renamed_into_container() {
        let annotation =
            Annotation::from_body(body(Term::blank("a"), true), "http://x/wap/c/123").unwrap();
        assert_eq!(annotation.iri(), "http://x/wap/c/123");
        assert_eq!(annotation.container_iri(), Some("http://x/wap/c/"));
        assert_eq!(annotation.targets(), vec!["http://example.org/page1"]);
        assert!(annotation.object().value(oa::VIA).is_none());
    }

    #[test]
    fn client_iri_is_kept_as_via() {
        let client_body = body(Term::iri("http://client/a1"), true);
        let annotation = Annotation::from_body(client_body, "http://x/wap/a").unwrap();
        assert_eq!(annotation.object().value(oa::VIA), Some("http://client/a1"));
    }

    #[test]
    fn missing_target_is_rejected() {
        assert!(matches!(
            Annotation::from_body(body(Term::blank("a"), false), "http://x/wap/a"),
            Err(WapError::NotAnAnnotation { .. })
        ));
        assert!(matches!(
            Annotation::from_body(Graph::new(), "http://x/wap/a"),
            Err(WapError::NotAnAnnotation { .. })
        ));
    }
}
