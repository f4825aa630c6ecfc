//! Vocabulary IRIs used by the engine.

/// RDF namespace.
pub mod rdf {
    /// Namespace prefix.
    pub const NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    /// `rdf:type`.
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    /// `rdf:Seq`.
    pub const SEQ: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#Seq";

    /// Membership property `rdf:_n` for a 1-based position.
    #[must_use]
    pub fn member(position: usize) -> String {
        format!("{NS}_{position}")
    }

    /// Position encoded by a membership property, if it is one.
    #[must_use]
    pub fn member_position(predicate: &str) -> Option<usize> {
        predicate
            .strip_prefix(NS)?
            .strip_prefix('_')?
            .parse()
            .ok()
            .filter(|position| *position >= 1)
    }
}

/// RDF Schema.
pub mod rdfs {
    /// `rdfs:label`.
    pub const LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
}

/// XML Schema datatypes.
pub mod xsd {
    /// `xsd:boolean`.
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
    /// `xsd:dateTime`.
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
}

/// Linked Data Platform.
pub mod ldp {
    /// `ldp:BasicContainer`.
    pub const BASIC_CONTAINER: &str = "http://www.w3.org/ns/ldp#BasicContainer";
    /// `ldp:PreferMinimalContainer`.
    pub const PREFER_MINIMAL_CONTAINER: &str = "http://www.w3.org/ns/ldp#PreferMinimalContainer";
}

/// Activity Streams.
pub mod activity {
    /// `as:OrderedCollection`.
    pub const ORDERED_COLLECTION: &str = "http://www.w3.org/ns/activitystreams#OrderedCollection";
}

/// Web Annotation vocabulary.
pub mod oa {
    /// `oa:Annotation`.
    pub const ANNOTATION: &str = "http://www.w3.org/ns/oa#Annotation";
    /// `oa:hasTarget`.
    pub const HAS_TARGET: &str = "http://www.w3.org/ns/oa#hasTarget";
    /// `oa:via`, the IRI a resource carried before the server renamed it.
    pub const VIA: &str = "http://www.w3.org/ns/oa#via";
    /// `oa:PreferContainedDescriptions`.
    pub const PREFER_CONTAINED_DESCRIPTIONS: &str =
        "http://www.w3.org/ns/oa#PreferContainedDescriptions";
    /// `oa:PreferContainedIRIs`.
    pub const PREFER_CONTAINED_IRIS: &str = "http://www.w3.org/ns/oa#PreferContainedIRIs";
}

/// Dublin Core terms.
pub mod dcterms {
    /// `dcterms:created`.
    pub const CREATED: &str = "http://purl.org/dc/terms/created";
    /// `dcterms:modified`.
    pub const MODIFIED: &str = "http://purl.org/dc/terms/modified";
}

/// Server-internal properties.
pub mod wap {
    /// Namespace prefix.
    pub const NS: &str = "http://dem.scc.kit.edu/wapserv/ns#";
    /// Stored ETag of a resource.
    pub const ETAG: &str = "http://dem.scc.kit.edu/wapserv/ns#etag";
    /// Tombstone marker.
    pub const DELETED: &str = "http://dem.scc.kit.edu/wapserv/ns#deleted";
}
