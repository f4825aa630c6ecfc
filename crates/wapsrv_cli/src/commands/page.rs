//! Page command implementation.

use super::print_json;
use wapsrv_core::WapEngine;

/// Runs the page command.
///
/// `iri` may be a container IRI, combined with `page_nr`, or a full page
/// IRI such as `http://host/wap/c/?iris=1&page=2`.
pub fn run(
    engine: &WapEngine,
    iri: &str,
    page_nr: i64,
    iris_only: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let containers = engine.containers();
    let page = if iri.contains('?') {
        containers.get_page_by_iri(iri, iris_only)?
    } else {
        containers.get_page(iri, iris_only, page_nr)?
    };
    print_json(&page)
}
