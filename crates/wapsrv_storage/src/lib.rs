//! # wapsrv Storage
//!
//! Transactional named-graph store for the wapsrv annotation server.
//!
//! This crate is the lowest layer of wapsrv. It stores RDF graphs keyed
//! by name plus small ordered side tables, and knows nothing about
//! containers, annotations or the Web Annotation Protocol.
//!
//! ## Design Principles
//!
//! - One open transaction per store; concurrency control lives above
//! - Read transactions see a stable snapshot
//! - Write transactions publish atomically on commit and vanish on abort
//! - Must be `Send + Sync` for sharing across request threads
//!
//! ## Available Stores
//!
//! - [`InMemoryGraphStore`] - For testing and ephemeral servers
//! - [`FileGraphStore`] - Persists a CBOR snapshot per write commit
//!
//! ## Example
//!
//! ```rust
//! use wapsrv_storage::{GraphStore, InMemoryGraphStore, Term, Triple, TxnKind};
//!
//! let store = InMemoryGraphStore::new();
//! store.begin(TxnKind::Write).unwrap();
//! store.add("g", Triple::new(Term::iri("http://s/"), "http://p/", Term::literal("o"))).unwrap();
//! store.abort().unwrap();
//!
//! store.begin(TxnKind::Read).unwrap();
//! assert!(!store.contains_graph("g").unwrap());
//! store.end();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod graph;
mod memory;
mod pending;
mod table;
mod term;

pub use backend::{GraphStore, TxnKind};
pub use error::{StorageError, StorageResult};
pub use file::FileGraphStore;
pub use graph::{Dataset, Graph};
pub use memory::InMemoryGraphStore;
pub use table::SideTable;
pub use term::{Literal, Term, Triple, TriplePattern};
