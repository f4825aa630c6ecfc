use crate::error::{WapError, WapResult};
use crate::iri;

/// A parsed page IRI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Container being paged.
    pub container_iri: String,
    /// `iris=0|1`, if given.
    pub iris_only: Option<bool>,
    /// Zero-based page number; 0 when absent.
    pub page: u64,
}

impl PageRequest {
    /// Parses `CONTAINER?iris=0|1&page=N`. Both parameters are optional
    /// and may come in either order.
    ///
    /// # Errors
    ///
    /// Returns `IllegalPageIri` for unknown or repeated parameters, a page
    /// that is not a non-negative integer, `iris` other than 0 or 1, or a
    /// base IRI that is not a container.
    pub fn parse(page_iri: &str) -> WapResult<Self> {
        let illegal = || WapError::illegal_page_iri(page_iri);
        let (container_iri, query) = match page_iri.split_once('?') {
            Some((base, query)) => (base, Some(query)),
            None => (page_iri, None),
        };
        if !iri::is_container_iri(container_iri) {
            return Err(illegal());
        }

        let mut iris_only = None;
        let mut page = None;
        if let Some(query) = query {
            for pair in query.split('&') {
                let (key, value) = pair.split_once('=').ok_or_else(illegal)?;
                match key {
                    "iris" if iris_only.is_none() => {
                        iris_only = Some(match value {
                            "0" => false,
                            "1" => true,
                            _ => return Err(illegal()),
                        });
                    }
                    "page" if page.is_none() => {
                        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
                            return Err(illegal());
                        }
                        page = Some(value.parse::<u64>().map_err(|_| illegal())?);
                    }
                    _ => return Err(illegal()),
                }
            }
        }

        Ok(Self {
            container_iri: container_iri.to_string(),
            iris_only,
            page: page.unwrap_or(0),
        })
    }

    /// `iris` as given, or `default` when the IRI did not say.
    #[must_use]
    pub fn iris_only_or(&self, default: bool) -> bool {
        self.iris_only.unwrap_or(default)
    }
}
