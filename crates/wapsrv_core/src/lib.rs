//! # wapsrv Core
//!
//! Container, sequence and transaction engine of the wapsrv Web
//! Annotation Protocol server.
//!
//! This crate provides:
//! - Containers and annotations stored as one named graph per resource
//! - Ordered member sequences with two interchangeable storage strategies
//! - Live pagination of a container's annotations
//! - ETag preconditions and tombstone deletion
//! - A transaction coordinator serializing units of work over the store
//!
//! The HTTP boundary, content negotiation and JSON-LD processing live
//! outside this crate. Callers hand in parsed graphs and receive views.
//!
//! ## Example
//!
//! ```rust
//! use wapsrv_core::{ContainerPreferences, WapConfig, WapEngine};
//!
//! let engine = WapEngine::open_in_memory(WapConfig::new()).unwrap();
//! let root = engine
//!     .containers()
//!     .get_container(engine.root_iri(), ContainerPreferences::new())
//!     .unwrap();
//! assert_eq!(root.etag.as_deref(), Some("initial-root-etag"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod bootstrap;
mod config;
mod engine;
mod error;
mod etag;
pub mod iri;
mod model;
mod object_store;
mod page;
mod sequence;
mod service;
mod transaction;
pub mod vocab;

pub use bootstrap::{ensure_root, INITIAL_ROOT_ETAG};
pub use config::{SequenceBackend, WapConfig};
pub use engine::WapEngine;
pub use error::{ErrorKind, WapError, WapResult};
pub use etag::{EtagFactory, ETAG_LENGTH};
pub use model::{
    timestamp_now, tombstone, Annotation, AnnotationView, Container, ContainerPreferences,
    ContainerView, WapObject,
};
pub use object_store::WapObjectStore;
pub use page::{last_page_number, page_bounds, page_iri, Page, PageAssembler, PageItem, PageRequest};
pub use sequence::{
    sequence_repository, GraphSequenceRepository, IndexedSequenceRepository, SequenceId,
    SequenceKind, SequenceRepository,
};
pub use service::{AnnotationService, ContainerService, DeletedContainer};
pub use transaction::{TransactionCoordinator, Txn};
