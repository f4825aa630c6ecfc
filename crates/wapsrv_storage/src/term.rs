//! RDF terms, triples and triple patterns.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A literal value with an optional datatype IRI.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Literal {
    /// Lexical form of the literal.
    pub lexical: String,
    /// Datatype IRI, `None` for plain string literals.
    pub datatype: Option<String>,
}

/// An RDF term: IRI, blank node or literal.
///
/// Terms are totally ordered so graphs iterate deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Term {
    /// A named node.
    Iri(String),
    /// A blank node with a store-local label.
    Blank(String),
    /// A literal.
    Literal(Literal),
}

impl Term {
    /// Creates an IRI term.
    #[must_use]
    pub fn iri(iri: impl Into<String>) -> Self {
        Self::Iri(iri.into())
    }

    /// Creates a blank node term.
    #[must_use]
    pub fn blank(label: impl Into<String>) -> Self {
        Self::Blank(label.into())
    }

    /// Creates a plain string literal.
    #[must_use]
    pub fn literal(lexical: impl Into<String>) -> Self {
        Self::Literal(Literal {
            lexical: lexical.into(),
            datatype: None,
        })
    }

    /// Creates a typed literal.
    #[must_use]
    pub fn typed_literal(lexical: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self::Literal(Literal {
            lexical: lexical.into(),
            datatype: Some(datatype.into()),
        })
    }

    /// Returns the IRI if this term is a named node.
    #[must_use]
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Self::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    /// Returns the lexical form if this term is a literal.
    #[must_use]
    pub fn as_lexical(&self) -> Option<&str> {
        match self {
            Self::Literal(literal) => Some(&literal.lexical),
            _ => None,
        }
    }

    /// Returns true for IRIs and blank nodes, the terms allowed in subject position.
    #[must_use]
    pub fn is_resource(&self) -> bool {
        !matches!(self, Self::Literal(_))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iri(iri) => write!(f, "<{iri}>"),
            Self::Blank(label) => write!(f, "_:{label}"),
            Self::Literal(Literal {
                lexical,
                datatype: None,
            }) => write!(f, "{lexical:?}"),
            Self::Literal(Literal {
                lexical,
                datatype: Some(datatype),
            }) => write!(f, "{lexical:?}^^<{datatype}>"),
        }
    }
}

/// A single statement.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Triple {
    /// Subject (IRI or blank node).
    pub subject: Term,
    /// Predicate IRI.
    pub predicate: String,
    /// Object term.
    pub object: Term,
}

impl Triple {
    /// Creates a new triple.
    #[must_use]
    pub fn new(subject: Term, predicate: impl Into<String>, object: Term) -> Self {
        Self {
            subject,
            predicate: predicate.into(),
            object,
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}> {} .", self.subject, self.predicate, self.object)
    }
}

/// A triple pattern; `None` positions match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriplePattern {
    /// Subject to match.
    pub subject: Option<Term>,
    /// Predicate to match.
    pub predicate: Option<String>,
    /// Object to match.
    pub object: Option<Term>,
}

impl TriplePattern {
    /// A pattern matching every triple.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Restricts the subject.
    #[must_use]
    pub fn subject(mut self, subject: Term) -> Self {
        self.subject = Some(subject);
        self
    }

    /// Restricts the predicate.
    #[must_use]
    pub fn predicate(mut self, predicate: impl Into<String>) -> Self {
        self.predicate = Some(predicate.into());
        self
    }

    /// Restricts the object.
    #[must_use]
    pub fn object(mut self, object: Term) -> Self {
        self.object = Some(object);
        self
    }

    /// Returns true if the triple matches this pattern.
    #[must_use]
    pub fn matches(&self, triple: &Triple) -> bool {
        self.subject.as_ref().map_or(true, |s| *s == triple.subject)
            && self
                .predicate
                .as_deref()
                .map_or(true, |p| p == triple.predicate)
            && self.object.as_ref().map_or(true, |o| *o == triple.object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn term_display_follows_ntriples() {
        assert_eq!(Term::iri("http://a/").to_string(), "<http://a/>");
        assert_eq!(Term::blank("b0").to_string(), "_:b0");
        assert_eq!(Term::literal("x").to_string(), "\"x\"");
        assert_eq!(
            Term::typed_literal("true", "http://www.w3.org/2001/XMLSchema#boolean").to_string(),
            "\"true\"^^<http://www.w3.org/2001/XMLSchema#boolean>"
        );
    }

    #[test]
    fn accessors() {
        assert_eq!(Term::iri("http://a/").as_iri(), Some("http://a/"));
        assert_eq!(Term::literal("x").as_iri(), None);
        assert_eq!(Term::literal("x").as_lexical(), Some("x"));
        assert!(Term::blank("b").is_resource());
        assert!(!Term::literal("x").is_resource());
    }

    #[test]
    fn pattern_matching() {
        let t = Triple::new(Term::iri("s"), "p", Term::literal("o"));
        assert!(TriplePattern::any().matches(&t));
        assert!(TriplePattern::any().subject(Term::iri("s")).matches(&t));
        assert!(TriplePattern::any().predicate("p").object(Term::literal("o")).matches(&t));
        assert!(!TriplePattern::any().predicate("q").matches(&t));
        assert!(!TriplePattern::any().object(Term::iri("o")).matches(&t));
    }
}
