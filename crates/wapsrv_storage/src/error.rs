//! Error types for graph store operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during graph store operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A data access was attempted outside of a transaction.
    #[error("no transaction is active")]
    NoTransaction,

    /// A transaction was begun while another one is still open.
    #[error("a transaction is already active")]
    TransactionActive,

    /// A write was attempted inside a read transaction.
    #[error("write attempted in a read transaction")]
    ReadOnlyTransaction,

    /// The persisted snapshot could not be decoded or encoded.
    #[error("snapshot corrupted: {0}")]
    Corrupted(String),

    /// Another process holds the store directory.
    #[error("store locked: another process has exclusive access")]
    Locked,
}

impl StorageError {
    /// Creates a corruption error.
    pub fn corrupted(message: impl Into<String>) -> Self {
        Self::Corrupted(message.into())
    }
}
