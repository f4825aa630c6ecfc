//! # wapsrv Testkit
//!
//! Test utilities for wapsrv.
//!
//! This crate provides:
//! - Engine fixtures over in-memory and temporary file stores
//! - Canned container and annotation bodies
//! - Property-based test generators using proptest
//! - Stress testing utilities for concurrent access
//!
//! ## Usage
//!
//! ```rust
//! use wapsrv_testkit::prelude::*;
//!
//! with_engine(|engine| {
//!     let view = engine
//!         .containers()
//!         .post_container(TEST_ROOT, Some("notes"), container_body(Some("Notes")))
//!         .unwrap();
//!     assert_eq!(view.iri, format!("{TEST_ROOT}notes/"));
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
}

pub use fixtures::*;
pub use generators::*;
pub use stress::*;
