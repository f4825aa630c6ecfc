//! Domain model: resources, containers, annotations and their views.
//!
//! Every resource is a [`WapObject`]: an IRI plus the graph of statements
//! about it. [`Container`] and [`Annotation`] add shape checks on top.

mod annotation;
mod container;
mod object;
mod preference;
mod view;

pub use annotation::Annotation;
pub use container::Container;
pub use object::{timestamp_now, tombstone, WapObject};
pub use preference::ContainerPreferences;
pub use view::{AnnotationView, ContainerView};
