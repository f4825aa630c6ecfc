use super::{check_etag, parent_of, touch};
use crate::config::WapConfig;
use crate::error::{WapError, WapResult};
use crate::etag::EtagFactory;
use crate::iri;
use crate::model::{timestamp_now, Container, ContainerPreferences, ContainerView};
use crate::object_store::WapObjectStore;
use crate::page::{Page, PageAssembler, PageRequest};
use crate::sequence::{SequenceId, SequenceRepository};
use crate::transaction::{TransactionCoordinator, Txn};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;
use wapsrv_storage::Graph;

/// Outcome of a container deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletedContainer {
    /// The tombstoned container.
    pub iri: String,
    /// Member annotations tombstoned along with it.
    pub annotations_removed: usize,
}

/// Container operations.
pub struct ContainerService<'a> {
    config: &'a WapConfig,
    coordinator: &'a TransactionCoordinator,
    sequences: &'a dyn SequenceRepository,
    etags: &'a EtagFactory,
    objects: WapObjectStore,
}

impl<'a> ContainerService<'a> {
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

    fn assembler(&self) -> PageAssembler<'a> {
        PageAssembler::new(self.sequences, self.config.page_size)
    }

    /// Reads a container, with page 0 embedded unless the minimal
    /// representation is preferred.
    ///
    /// # Errors
    ///
    /// Returns `NotExistent`, `ResourceDeleted`, or `NotAContainer` when
    /// the IRI names an annotation.
    pub fn get_container(
        &self,
        iri: &str,
        preferences: ContainerPreferences,
    ) -> WapResult<ContainerView> {
        info!(iri = %iri, minimal = preferences.minimal_container, "reading container");
        self.coordinator.read(|txn| {
            let container = Container::from_object(self.objects.read_live(txn, iri)?)?;
            let container_count = self.sequences.count(txn, &SequenceId::containers(iri))?;
            if preferences.minimal_container {
                let total = self.sequences.count(txn, &SequenceId::annotations(iri))?;
                return Ok(ContainerView::minimal(container.object(), container_count, total));
            }
            let page = self
                .assembler()
                .assemble(txn, container.object(), preferences.iris_only(), 0)?;
            Ok(ContainerView::with_page(container.object(), container_count, page))
        })
    }

    /// Creates a container below `parent_iri`.
    ///
    /// Without a slug the new container is named by a UUID. With a slug
    /// that names a deleted container, the old data is wiped and the
    /// container created afresh.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` for a missing mandatory or malformed slug,
    /// `NotAContainer` for a malformed body, `InvalidContainer` for a
    /// missing mandatory label, `NotExistent`/`ResourceDeleted` for the
    /// parent, and `ResourceExists`/`ResourceDeleted` for the target IRI.
    pub fn post_container(
        &self,
        parent_iri: &str,
        slug: Option<&str>,
        body: Graph,
    ) -> WapResult<ContainerView> {
        info!(parent = %parent_iri, slug = ?slug, "posting container");
        let name = match slug {
            Some(slug) => slug.to_string(),
            None if self.config.slug_mandatory_in_container_post => {
                warn!(parent = %parent_iri, "container post without slug");
                return Err(WapError::invalid_request("a slug is required to post a container"));
            }
            None => Uuid::new_v4().to_string(),
        };
        if !iri::is_valid_slug(&name) {
            warn!(slug = %name, "invalid slug");
            return Err(WapError::invalid_request(format!(
                "invalid characters in container name: {name}"
            )));
        }

        let container_iri = iri::child_container_iri(parent_iri, &name);
        let mut container = Container::from_body(body, &container_iri)?;
        if container.label().is_none() {
            if self.config.label_mandatory_in_containers {
                warn!(iri = %container_iri, "container without label");
                return Err(WapError::invalid_container(
                    "label property is mandatory for containers",
                ));
            }
            container.object_mut().set_label(&name);
        }
        let now = timestamp_now();
        let object = container.object_mut();
        object.set_created_if_absent(now.clone());
        object.set_modified(now);
        object.set_etag(&self.etags.generate());

        self.coordinator.write(|txn| {
            self.objects.check_live_container(txn, parent_iri)?;
            if self.objects.exists(txn, &container_iri)? {
                self.wipe_deleted(txn, &container_iri, slug.is_some())?;
            }
            self.objects.write(txn, container.object())?;
            self.sequences
                .append(txn, &SequenceId::containers(parent_iri), &container_iri)?;
            touch(txn, &self.objects, self.etags, parent_iri)
        })?;

        info!(iri = %container_iri, "container created");
        Ok(ContainerView::minimal(container.object(), 0, 0))
    }

    /// Clears a tombstoned container so its IRI can be reused.
    fn wipe_deleted(
        &self,
        txn: &Txn<'_>,
        container_iri: &str,
        explicit_slug: bool,
    ) -> WapResult<()> {
        if !self.objects.is_deleted(txn, container_iri)? {
            warn!(iri = %container_iri, "container exists");
            return Err(WapError::resource_exists(format!(
                "a container with IRI {container_iri} already exists"
            )));
        }
        if !explicit_slug {
            return Err(WapError::resource_deleted(format!(
                "{container_iri} once existed and is now deleted"
            )));
        }
        info!(iri = %container_iri, "recreating deleted container");
        self.sequences
            .clear(txn, &SequenceId::containers(container_iri))?;
        self.sequences
            .clear(txn, &SequenceId::annotations(container_iri))?;
        self.objects.purge(txn, container_iri)?;
        Ok(())
    }

    /// Tombstones a container and its member annotations.
    ///
    /// Checks run in order: existence, tombstone, ETag, sub-containers.
    /// The container, its annotations and the parent's bookkeeping change
    /// in one write transaction.
    ///
    /// # Errors
    ///
    /// Returns `MethodNotAllowed` for the root, then `NotExistent`,
    /// `ResourceDeleted`, `EtagDoesntMatch` or `ContainerNotEmpty`.
    pub fn delete_container(&self, iri: &str, if_match: &str) -> WapResult<DeletedContainer> {
        info!(iri = %iri, "deleting container");
        if iri == self.config.root_container_iri {
            return Err(WapError::method_not_allowed("the root container cannot be deleted"));
        }

        let deleted = self.coordinator.write(|txn| {
            let object = self.objects.read(txn, iri)?;
            if object.is_deleted() {
                return Err(WapError::resource_deleted(format!("{iri} has been deleted")));
            }
            let container = Container::from_object(object)?;
            if let Err(err) = check_etag(container.object().etag(), if_match) {
                warn!(iri = %iri, "etag mismatch");
                return Err(err);
            }
            let children = self.sequences.count(txn, &SequenceId::containers(iri))?;
            if children > 0 {
                warn!(iri = %iri, children, "container has sub-containers");
                return Err(WapError::container_not_empty(iri, children));
            }

            let annotations = SequenceId::annotations(iri);
            let members = self.sequences.members(txn, &annotations)?;
            for member in &members {
                self.objects.mark_deleted(txn, member)?;
            }
            self.sequences.clear(txn, &annotations)?;
            self.objects.mark_deleted(txn, iri)?;

            let parent = parent_of(iri)?;
            self.sequences
                .remove(txn, &SequenceId::containers(parent), iri)?;
            touch(txn, &self.objects, self.etags, parent)?;
            Ok(DeletedContainer {
                iri: iri.to_string(),
                annotations_removed: members.len(),
            })
        })?;

        info!(iri = %iri, annotations = deleted.annotations_removed, "container deleted");
        Ok(deleted)
    }

    /// Reads page `page_nr` of a container.
    ///
    /// # Errors
    ///
    /// Returns `IllegalPageIri` for a negative page, or the container
    /// lookup errors of [`ContainerService::get_container`].
    pub fn get_page(&self, container_iri: &str, iris_only: bool, page_nr: i64) -> WapResult<Page> {
        info!(iri = %container_iri, page = page_nr, iris_only, "reading page");
        self.coordinator.read(|txn| {
            let container = Container::from_object(self.objects.read_live(txn, container_iri)?)?;
            self.assembler()
                .assemble(txn, container.object(), iris_only, page_nr)
        })
    }

    /// Reads the page addressed by a page IRI. `iris_only` applies when the
    /// IRI does not say.
    ///
    /// # Errors
    ///
    /// Returns `IllegalPageIri` for a malformed IRI, otherwise as
    /// [`ContainerService::get_page`].
    pub fn get_page_by_iri(&self, page_iri: &str, iris_only: bool) -> WapResult<Page> {
        let request = PageRequest::parse(page_iri)?;
        let page_nr = i64::try_from(request.page)
            .map_err(|_| WapError::illegal_page_iri(page_iri))?;
        self.get_page(&request.container_iri, request.iris_only_or(iris_only), page_nr)
    }

    /// Members of a sequence, in order.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn members(&self, seq: &SequenceId) -> WapResult<Vec<String>> {
        self.coordinator.read(|txn| self.sequences.members(txn, seq))
    }

    /// Number of members of a sequence.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn count(&self, seq: &SequenceId) -> WapResult<usize> {
        self.coordinator.read(|txn| self.sequences.count(txn, seq))
    }
}
