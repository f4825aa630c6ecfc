use super::{check_etag, parent_of, touch};
use crate::config::WapConfig;
use crate::error::{WapError, WapResult};
use crate::etag::EtagFactory;
use crate::model::{timestamp_now, Annotation, AnnotationView};
use crate::object_store::WapObjectStore;
use crate::sequence::{SequenceId, SequenceRepository};
use crate::transaction::TransactionCoordinator;
use tracing::{info, warn};
use uuid::Uuid;
use wapsrv_storage::Graph;

/// Annotation operations.
pub struct AnnotationService<'a> {
    config: &'a WapConfig,
    coordinator: &'a TransactionCoordinator,
    sequences: &'a dyn SequenceRepository,
    etags: &'a EtagFactory,
    objects: WapObjectStore,
}

impl<'a> AnnotationService<'a> {
    /// Creates the service over the engine's shared parts.
    #[must_use]
    pub fn new(
        config: &'a WapConfig,
        coordinator: &'a TransactionCoordinator,
        sequences: &'a dyn SequenceRepository,
        etags: &'a EtagFactory,
    ) -> Self {
        Self {
            config,
            coordinator,
            sequences,
            etags,
            objects: WapObjectStore::new(),
        }
    }

    /// Adds annotations to a container, in the given order.
    ///
    /// Each annotation gets the IRI `container + uuid`, creation and
    /// modification times and an ETag. Either all are stored or none.
    ///
    /// # Errors
    ///
    /// Returns `MethodNotAllowed` for the root container or for several
    /// bodies when that is disabled, `InvalidRequest` for no bodies,
    /// `NotAnAnnotation` for a malformed body, and
    /// `NotExistent`/`ResourceDeleted` for the container.
    pub fn post_annotations(
        &self,
        container_iri: &str,
        bodies: Vec<Graph>,
    ) -> WapResult<Vec<AnnotationView>> {
        info!(container = %container_iri, count = bodies.len(), "posting annotations");
        if container_iri == self.config.root_container_iri {
            return Err(WapError::method_not_allowed(
                "annotations cannot be posted to the root container",
            ));
        }
        if bodies.is_empty() {
            return Err(WapError::invalid_request("no annotation to post"));
        }
        if bodies.len() > 1 && !self.config.multiple_annotation_post {
            warn!(container = %container_iri, "multiple annotation post disabled");
            return Err(WapError::method_not_allowed("multiple annotation posting is disabled"));
        }

        let now = timestamp_now();
        let annotations = bodies
            .into_iter()
            .map(|body| {
                let iri = format!("{container_iri}{}", Uuid::new_v4());
                let mut annotation = Annotation::from_body(body, &iri)?;
                let object = annotation.object_mut();
                object.set_created_if_absent(now.clone());
                object.set_modified(now.clone());
                object.set_etag(&self.etags.generate());
                Ok(annotation)
            })
            .collect::<WapResult<Vec<_>>>()?;

        self.coordinator.write(|txn| {
            self.objects.check_live_container(txn, container_iri)?;
            let seq = SequenceId::annotations(container_iri);
            for annotation in &annotations {
                if self.objects.exists(txn, annotation.iri())? {
                    return Err(WapError::resource_exists(format!(
                        "annotation {} already exists",
                        annotation.iri()
                    )));
                }
                self.objects.write(txn, annotation.object())?;
                self.sequences.append(txn, &seq, annotation.iri())?;
            }
            touch(txn, &self.objects, self.etags, container_iri)
        })?;

        info!(container = %container_iri, count = annotations.len(), "annotations created");
        Ok(annotations
            .iter()
            .map(|a| AnnotationView::from_object(a.object()))
            .collect())
    }

    /// Adds a single annotation.
    ///
    /// # Errors
    ///
    /// See [`AnnotationService::post_annotations`].
    pub fn post_annotation(&self, container_iri: &str, body: Graph) -> WapResult<AnnotationView> {
        self.post_annotations(container_iri, vec![body])?
            .pop()
            .ok_or_else(|| WapError::internal("annotation post returned nothing"))
    }

    /// Reads an annotation.
    ///
    /// # Errors
    ///
    /// Returns `NotExistent`, `ResourceDeleted`, or `NotAnAnnotation` when
    /// the IRI names something else.
    pub fn get_annotation(&self, iri: &str) -> WapResult<AnnotationView> {
        info!(iri = %iri, "reading annotation");
        self.coordinator.read(|txn| {
            let annotation = Annotation::from_object(self.objects.read_live(txn, iri)?)?;
            Ok(AnnotationView::from_object(annotation.object()))
        })
    }

    /// Tombstones an annotation and removes it from its container.
    ///
    /// # Errors
    ///
    /// Returns `NotExistent`, `ResourceDeleted`, `NotAnAnnotation` or
    /// `EtagDoesntMatch`.
    pub fn delete_annotation(&self, iri: &str, if_match: &str) -> WapResult<()> {
        info!(iri = %iri, "deleting annotation");
        self.coordinator.write(|txn| {
            let annotation = Annotation::from_object(self.objects.read_live(txn, iri)?)?;
            if let Err(err) = check_etag(annotation.object().etag(), if_match) {
                warn!(iri = %iri, "etag mismatch");
                return Err(err);
            }
            self.objects.mark_deleted(txn, iri)?;
            let container = parent_of(iri)?;
            self.sequences
                .remove(txn, &SequenceId::annotations(container), iri)?;
            touch(txn, &self.objects, self.etags, container)
        })?;
        info!(iri = %iri, "annotation deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::WapEngine;
    use crate::model::ContainerPreferences;
    use crate::page::PageItem;
    use crate::vocab::{activity, ldp, oa, rdf};
    use wapsrv_storage::{Term, Triple};

    const ROOT: &str = "http://x/wap/";

    fn container_body() -> Graph {
        let node = Term::blank("c");
        let mut graph = Graph::new();
        graph.insert(Triple::new(node.clone(), rdf::TYPE, Term::iri(ldp::BASIC_CONTAINER)));
        graph.insert(Triple::new(node, rdf::TYPE, Term::iri(activity::ORDERED_COLLECTION)));
        graph
    }

    fn annotation_body(node: Term, target: &str) -> Graph {
        let mut graph = Graph::new();
        graph.insert(Triple::new(node.clone(), rdf::TYPE, Term::iri(oa::ANNOTATION)));
        graph.insert(Triple::new(node, oa::HAS_TARGET, Term::iri(target)));
        graph
    }

    fn setup(config: WapConfig) -> (WapEngine, String) {
        let engine = WapEngine::open_in_memory(config.root_container_iri(ROOT)).unwrap();
        let container = engine
            .containers()
            .post_container(ROOT, Some("c"), container_body())
            .unwrap();
        (engine, container.iri)
    }

    #[test]
    fn post_assigns_iri_and_server_properties() {
        let (engine, container) = setup(WapConfig::new());
        let view = engine
            .annotations()
            .post_annotation(&container, annotation_body(Term::blank("a"), "http://example.org/t"))
            .unwrap();
        assert!(view.iri.starts_with(&container));
        assert_eq!(view.iri.len(), container.len() + 36);
        assert_eq!(view.targets, vec!["http://example.org/t"]);
        assert!(view.created.is_some());
        assert!(view.etag.is_some());

        let read = engine.annotations().get_annotation(&view.iri).unwrap();
        assert_eq!(read, view);
    }

    #[test]
    fn client_iri_is_kept_as_via() {
        let (engine, container) = setup(WapConfig::new());
        let view = engine
            .annotations()
            .post_annotation(
                &container,
                annotation_body(Term::iri("http://client/anno1"), "http://example.org/t"),
            )
            .unwrap();
        assert!(view
            .triples
            .iter()
            .any(|t| t.contains(oa::VIA) && t.contains("<http://client/anno1>")));
    }

    #[test]
    fn post_rejections() {
        let (engine, container) = setup(WapConfig::new().multiple_annotation_post(false));
        let service = engine.annotations();
        let body = || annotation_body(Term::blank("a"), "http://example.org/t");
        assert!(matches!(
            service.post_annotation(ROOT, body()),
            Err(WapError::MethodNotAllowed { .. })
        ));
        assert!(matches!(
            service.post_annotations(&container, vec![body(), body()]),
            Err(WapError::MethodNotAllowed { .. })
        ));
        assert!(matches!(
            service.post_annotations(&container, Vec::new()),
            Err(WapError::InvalidRequest { .. })
        ));
        assert!(matches!(
            service.post_annotation(&container, container_body()),
            Err(WapError::NotAnAnnotation { .. })
        ));
        assert!(matches!(
            service.post_annotation("http://x/wap/none/", body()),
            Err(WapError::NotExistent { .. })
        ));
    }

    #[test]
    fn batch_post_is_all_or_nothing() {
        let (engine, container) = setup(WapConfig::new());
        let result = engine.annotations().post_annotations(
            &container,
            vec![
                annotation_body(Term::blank("a"), "http://example.org/t"),
                Graph::new(),
            ],
        );
        assert!(result.is_err());
        let count = engine
            .containers()
            .count(&SequenceId::annotations(&container))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn delete_requires_matching_etag() {
        let (engine, container) = setup(WapConfig::new());
        let service = engine.annotations();
        let view = service
            .post_annotation(&container, annotation_body(Term::blank("a"), "http://example.org/t"))
            .unwrap();
        assert!(matches!(
            service.delete_annotation(&view.iri, "wrong"),
            Err(WapError::EtagDoesntMatch { .. })
        ));
        service
            .delete_annotation(&view.iri, view.etag.as_deref().unwrap())
            .unwrap();
        assert!(matches!(
            service.get_annotation(&view.iri),
            Err(WapError::ResourceDeleted { .. })
        ));
        let page = engine.containers().get_page(&container, true, 0).unwrap();
        assert!(page.is_empty());
    }

    #[test]
    fn container_delete_cascades_to_annotations() {
        let (engine, container) = setup(WapConfig::new());
        let posted = engine
            .annotations()
            .post_annotations(
                &container,
                (0..3)
                    .map(|i| annotation_body(Term::blank("a"), &format!("http://example.org/t{i}")))
                    .collect(),
            )
            .unwrap();

        let view = engine
            .containers()
            .get_container(&container, ContainerPreferences::new())
            .unwrap();
        assert_eq!(view.total_items, 3);
        let page = view.page.unwrap();
        assert!(matches!(page.items[0], PageItem::Annotation(_)));
        assert_eq!(page.item_iris()[2], posted[2].iri);

        let deleted = engine
            .containers()
            .delete_container(&container, view.etag.as_deref().unwrap())
            .unwrap();
        assert_eq!(deleted.annotations_removed, 3);
        for annotation in &posted {
            assert!(matches!(
                engine.annotations().get_annotation(&annotation.iri),
                Err(WapError::ResourceDeleted { .. })
            ));
        }
    }
}
