//! The engine: one store, one coordinator, one sequence strategy.

use crate::bootstrap::ensure_root;
use crate::config::WapConfig;
use crate::error::{WapError, WapResult};
use crate::etag::EtagFactory;
use crate::sequence::{sequence_repository, SequenceRepository};
use crate::service::{AnnotationService, ContainerService};
use crate::transaction::TransactionCoordinator;
use std::sync::Arc;
use wapsrv_storage::{FileGraphStore, GraphStore, InMemoryGraphStore};

/// Owns the shared state and hands out services.
///
/// The engine is `Send + Sync`; share it behind an `Arc` across threads.
/// Concurrent operations are serialized by the coordinator.
pub struct WapEngine {
    config: WapConfig,
    coordinator: TransactionCoordinator,
    sequences: Box<dyn SequenceRepository>,
    etags: EtagFactory,
}

impl std::fmt::Debug for WapEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WapEngine")
            .field("root", &self.config.root_container_iri)
            .field("sequences", &self.sequences.backend())
            .finish_non_exhaustive()
    }
}

impl WapEngine {
    /// Opens an engine as configured: file-backed when `database_path` is
    /// set, in memory otherwise.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for a bad configuration, or a storage error
    /// if the store cannot be opened or seeded.
    pub fn open(config: WapConfig) -> WapResult<Self> {
        let store: Arc<dyn GraphStore> = match &config.database_path {
            Some(path) => Arc::new(FileGraphStore::open(path)?),
            None => Arc::new(InMemoryGraphStore::new()),
        };
        Self::with_store(store, config)
    }

    /// Opens an engine over a fresh in-memory store.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for a bad configuration.
    pub fn open_in_memory(config: WapConfig) -> WapResult<Self> {
        Self::with_store(Arc::new(InMemoryGraphStore::new()), config)
    }

    /// Opens an engine over an existing store and seeds the root container.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for a bad configuration, or a storage error.
    pub fn with_store(store: Arc<dyn GraphStore>, config: WapConfig) -> WapResult<Self> {
        config.validate()?;
        if store.is_in_transaction() {
            return Err(WapError::internal("store handed over with an open transaction"));
        }
        let coordinator = TransactionCoordinator::new(store);
        ensure_root(&coordinator, &config)?;
        tracing::info!(
            root = %config.root_container_iri,
            backend = ?config.sequence_backend,
            page_size = config.page_size,
            "engine opened"
        );
        Ok(Self {
            sequences: sequence_repository(config.sequence_backend),
            etags: EtagFactory::new(),
            coordinator,
            config,
        })
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &WapConfig {
        &self.config
    }

    /// IRI of the root container.
    #[must_use]
    pub fn root_iri(&self) -> &str {
        &self.config.root_container_iri
    }

    /// Container operations.
    #[must_use]
    pub fn containers(&self) -> ContainerService<'_> {
        ContainerService::new(
            &self.config,
            &self.coordinator,
            self.sequences.as_ref(),
            &self.etags,
        )
    }

    /// Annotation operations.
    #[must_use]
    pub fn annotations(&self) -> AnnotationService<'_> {
        AnnotationService::new(
            &self.config,
            &self.coordinator,
            self.sequences.as_ref(),
            &self.etags,
        )
    }

    /// The transaction coordinator, for work spanning several operations.
    #[must_use]
    pub fn coordinator(&self) -> &TransactionCoordinator {
        &self.coordinator
    }

    /// The sequence repository in use.
    #[must_use]
    pub fn sequences(&self) -> &dyn SequenceRepository {
        self.sequences.as_ref()
    }
}
