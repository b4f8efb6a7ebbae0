//! Errors raised by the reflection layer.
//!
//! All of these are permanent programming or configuration errors, never
//! transient. They surface synchronously at the call that detects them and
//! are not recovered internally.

use thiserror::Error;

/// Errors produced by descriptors, property paths, and the value-graph walker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReflectError {
    /// A property-path segment could not be resolved against a type's or
    /// value's shape.
    #[error("no such property '{property}' on {container}")]
    NoSuchProperty {
        /// The segment name that failed to resolve.
        property: String,
        /// The type name or value kind it was resolved against.
        container: String,
    },

    /// A bean type was asked to default-construct but declares no default
    /// constructor.
    #[error("type '{type_name}' is not default-constructible")]
    NotConstructible {
        /// The bean type name.
        type_name: String,
    },

    /// An index expression could not be applied to the located slot.
    #[error("invalid index '{index}' for {container}")]
    InvalidIndex {
        /// The raw index expression.
        index: String,
        /// The value kind the index was applied to.
        container: String,
    },

    /// An operation that is explicitly meaningless in this domain.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),
}

impl ReflectError {
    pub(crate) fn no_such_property(property: &str, container: impl Into<String>) -> Self {
        ReflectError::NoSuchProperty {
            property: property.to_string(),
            container: container.into(),
        }
    }
}
