//! Error types for the annotation engine.

use thiserror::Error;
use wapsrv_storage::StorageError;

/// Result type for engine operations.
pub type WapResult<T> = Result<T, WapError>;

/// Protocol-level classification of a [`WapError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The addressed resource does not exist.
    NotExistent,
    /// The addressed resource existed and has been deleted.
    ResourceDeleted,
    /// A resource with the requested IRI already exists.
    ResourceExists,
    /// The supplied ETag does not match the stored one.
    EtagDoesntMatch,
    /// The container still has sub-containers.
    ContainerNotEmpty,
    /// The container body violates a content rule.
    InvalidContainer,
    /// The body does not describe a container.
    NotAContainer,
    /// The body does not describe an annotation.
    NotAnAnnotation,
    /// The page IRI could not be parsed.
    IllegalPageIri,
    /// The request is malformed.
    InvalidRequest,
    /// The operation is not allowed on this resource.
    MethodNotAllowed,
    /// Unexpected failure inside the server.
    InternalServer,
}

impl ErrorKind {
    /// HTTP status code the boundary layer answers with.
    #[must_use]
    pub const fn status_code(self) -> u16 {
        match self {
            Self::NotExistent => 404,
            Self::MethodNotAllowed | Self::ContainerNotEmpty => 405,
            Self::ResourceExists => 409,
            Self::ResourceDeleted => 410,
            Self::EtagDoesntMatch => 412,
            Self::NotAContainer | Self::NotAnAnnotation => 415,
            Self::InvalidRequest | Self::InvalidContainer | Self::IllegalPageIri => 400,
            Self::InternalServer => 500,
        }
    }
}

/// Errors raised by the annotation engine.
#[derive(Debug, Error)]
pub enum WapError {
    /// The addressed resource does not exist.
    #[error("not existent: {message}")]
    NotExistent {
        /// Description of what was missing.
        message: String,
    },

    /// The addressed resource carries a tombstone.
    #[error("resource deleted: {message}")]
    ResourceDeleted {
        /// Description of the deleted resource.
        message: String,
    },

    /// A live resource already occupies the IRI.
    #[error("resource exists: {message}")]
    ResourceExists {
        /// Description of the conflict.
        message: String,
    },

    /// Conditional request failed.
    #[error("etag does not match: expected {expected}, got {actual}")]
    EtagDoesntMatch {
        /// The ETag currently stored.
        expected: String,
        /// The ETag the caller supplied.
        actual: String,
    },

    /// Deletion blocked by live sub-containers.
    #[error("container not empty: {iri} has {children} sub-container(s)")]
    ContainerNotEmpty {
        /// IRI of the container.
        iri: String,
        /// Number of sub-containers still present.
        children: usize,
    },

    /// The container body violates a content rule.
    #[error("invalid container: {message}")]
    InvalidContainer {
        /// Description of the violation.
        message: String,
    },

    /// The body is not a container.
    #[error("not a container: {message}")]
    NotAContainer {
        /// Description of the shape problem.
        message: String,
    },

    /// The body is not an annotation.
    #[error("not an annotation: {message}")]
    NotAnAnnotation {
        /// Description of the shape problem.
        message: String,
    },

    /// The page IRI is malformed.
    #[error("illegal page IRI: {iri}")]
    IllegalPageIri {
        /// The rejected IRI.
        iri: String,
    },

    /// The request is malformed.
    #[error("invalid request: {message}")]
    InvalidRequest {
        /// Description of the problem.
        message: String,
    },

    /// The operation is not allowed on this resource.
    #[error("method not allowed: {message}")]
    MethodNotAllowed {
        /// Description of the refusal.
        message: String,
    },

    /// Unexpected failure inside the server.
    #[error("internal server error: {message}")]
    InternalServer {
        /// Description of the failure.
        message: String,
    },

    /// Configuration could not be loaded or is inconsistent.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the problem.
        message: String,
    },

    /// Graph store failure.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl WapError {
    /// Creates a not-existent error.
    pub fn not_existent(message: impl Into<String>) -> Self {
        Self::NotExistent {
            message: message.into(),
        }
    }

    /// Creates a resource-deleted error.
    pub fn resource_deleted(message: impl Into<String>) -> Self {
        Self::ResourceDeleted {
            message: message.into(),
        }
    }

    /// Creates a resource-exists error.
    pub fn resource_exists(message: impl Into<String>) -> Self {
        Self::ResourceExists {
            message: message.into(),
        }
    }

    /// Creates an ETag mismatch error.
    pub fn etag_doesnt_match(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::EtagDoesntMatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Creates a container-not-empty error.
    pub fn container_not_empty(iri: impl Into<String>, children: usize) -> Self {
        Self::ContainerNotEmpty {
            iri: iri.into(),
            children,
        }
    }

    /// Creates an invalid-container error.
    pub fn invalid_container(message: impl Into<String>) -> Self {
        Self::InvalidContainer {
            message: message.into(),
        }
    }

    /// Creates a not-a-container error.
    pub fn not_a_container(message: impl Into<String>) -> Self {
        Self::NotAContainer {
            message: message.into(),
        }
    }

    /// Creates a not-an-annotation error.
    pub fn not_an_annotation(message: impl Into<String>) -> Self {
        Self::NotAnAnnotation {
            message: message.into(),
        }
    }

    /// Creates an illegal page IRI error.
    pub fn illegal_page_iri(iri: impl Into<String>) -> Self {
        Self::IllegalPageIri { iri: iri.into() }
    }

    /// Creates an invalid-request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a method-not-allowed error.
    pub fn method_not_allowed(message: impl Into<String>) -> Self {
        Self::MethodNotAllowed {
            message: message.into(),
        }
    }

    /// Creates an internal server error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalServer {
            message: message.into(),
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Protocol classification of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotExistent { .. } => ErrorKind::NotExistent,
            Self::ResourceDeleted { .. } => ErrorKind::ResourceDeleted,
            Self::ResourceExists { .. } => ErrorKind::ResourceExists,
            Self::EtagDoesntMatch { .. } => ErrorKind::EtagDoesntMatch,
            Self::ContainerNotEmpty { .. } => ErrorKind::ContainerNotEmpty,
            Self::InvalidContainer { .. } => ErrorKind::InvalidContainer,
            Self::NotAContainer { .. } => ErrorKind::NotAContainer,
            Self::NotAnAnnotation { .. } => ErrorKind::NotAnAnnotation,
            Self::IllegalPageIri { .. } => ErrorKind::IllegalPageIri,
            Self::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            Self::MethodNotAllowed { .. } => ErrorKind::MethodNotAllowed,
            Self::InternalServer { .. } | Self::InvalidConfig { .. } | Self::Storage(_) => {
                ErrorKind::InternalServer
            }
        }
    }

    /// HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }
}
