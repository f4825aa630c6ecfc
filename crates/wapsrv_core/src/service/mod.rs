//! Request-level operations on containers and annotations.
//!
//! Services borrow the engine's shared parts for the duration of a call.
//! Every operation runs as one unit of work on the coordinator, so its
//! checks and writes are atomic.

mod annotation;
mod container;

pub use annotation::AnnotationService;
pub use container::{ContainerService, DeletedContainer};

use crate::error::{WapError, WapResult};
use crate::etag::EtagFactory;
use crate::iri;
use crate::model::timestamp_now;
use crate::object_store::WapObjectStore;
use crate::transaction::Txn;
use crate::vocab::{dcterms, wap};
use wapsrv_storage::Term;

/// Gives `iri` a fresh ETag and modification time.
pub(crate) fn touch(
    txn: &Txn<'_>,
    objects: &WapObjectStore,
    etags: &EtagFactory,
    iri: &str,
) -> WapResult<()> {
    objects.set_property(txn, iri, wap::ETAG, Term::literal(etags.generate()))?;
    objects.set_property(txn, iri, dcterms::MODIFIED, timestamp_now())
}

/// Container holding `iri`.
pub(crate) fn parent_of(iri: &str) -> WapResult<&str> {
    iri::parent_container_iri(iri)
        .ok_or_else(|| WapError::internal(format!("{iri} has no parent container")))
}

/// Fails unless the caller's ETag equals the stored one.
pub(crate) fn check_etag(stored: Option<&str>, supplied: &str) -> WapResult<()> {
    match stored {
        Some(stored) if stored == supplied => Ok(()),
        stored => Err(WapError::etag_doesnt_match(stored.unwrap_or_default(), supplied)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn etag_check() {
        assert!(check_etag(Some("abc"), "abc").is_ok());
        assert!(matches!(
            check_etag(Some("abc"), "abd"),
            Err(WapError::EtagDoesntMatch { ref expected, ref actual })
                if expected == "abc" && actual == "abd"
        ));
        assert!(check_etag(None, "abc").is_err());
    }

    #[test]
    fn parents() {
        assert_eq!(parent_of("http://x/wap/c/").unwrap(), "http://x/wap/");
        assert!(parent_of("nothing").is_err());
    }
}
