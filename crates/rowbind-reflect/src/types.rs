//! The static shape language shared by descriptors, signatures, and
//! operation definitions.

use serde::{Deserialize, Serialize};

/// A declared (static) type. Signatures declare parameter and return types
/// with it, descriptors declare property types, and operations declare their
/// result row types. Runtime values carry no `DeclaredType`; coercion
/// decisions compare a declared shape against a runtime [`crate::ValueKind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclaredType {
    /// No value.
    Void,
    /// Primitive boolean.
    Bool,
    /// Primitive 32-bit integer.
    Int,
    /// Primitive 64-bit integer.
    Long,
    /// Primitive float.
    Float,
    /// A string.
    Str,
    /// An optional wrapper; `Null` is a legal inhabitant.
    Optional(Box<DeclaredType>),
    /// A list-shaped collection with one element type argument.
    List(Box<DeclaredType>),
    /// An array with one element type argument.
    Array(Box<DeclaredType>),
    /// A keyed mapping with the given value type.
    Map {
        /// The value type of the mapping.
        value: Box<DeclaredType>,
    },
    /// A lazy row stream with one element type argument.
    Cursor(Box<DeclaredType>),
    /// A registered bean type, by name.
    Bean(String),
    /// Unconstrained.
    Any,
}

impl DeclaredType {
    /// Shorthand for a list of `element`.
    pub fn list(element: DeclaredType) -> Self {
        DeclaredType::List(Box::new(element))
    }

    /// Shorthand for an array of `element`.
    pub fn array(element: DeclaredType) -> Self {
        DeclaredType::Array(Box::new(element))
    }

    /// Shorthand for a map with `value`-typed entries.
    pub fn map_of(value: DeclaredType) -> Self {
        DeclaredType::Map {
            value: Box::new(value),
        }
    }

    /// Shorthand for a cursor over `element`.
    pub fn cursor(element: DeclaredType) -> Self {
        DeclaredType::Cursor(Box::new(element))
    }

    /// Shorthand for an optional `inner`.
    pub fn optional(inner: DeclaredType) -> Self {
        DeclaredType::Optional(Box::new(inner))
    }

    /// Shorthand for a bean type reference.
    pub fn bean(name: impl Into<String>) -> Self {
        DeclaredType::Bean(name.into())
    }

    /// Whether this is `Void`.
    pub fn is_void(&self) -> bool {
        matches!(self, DeclaredType::Void)
    }

    /// Primitive types can never legally hold `null`.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            DeclaredType::Bool | DeclaredType::Int | DeclaredType::Long | DeclaredType::Float
        )
    }

    /// Whether this is a list or array shape.
    pub fn is_collection_like(&self) -> bool {
        matches!(self, DeclaredType::List(_) | DeclaredType::Array(_))
    }

    /// The registered bean name, if this is a bean reference.
    pub fn bean_name(&self) -> Option<&str> {
        match self {
            DeclaredType::Bean(name) => Some(name),
            _ => None,
        }
    }

    /// Unwrap exactly one level of parameterization to find the element
    /// type of a collection-like shape. Shapes without a single type
    /// argument yield the type itself; deeper nesting is the caller's
    /// problem, not an error.
    pub fn element(&self) -> &DeclaredType {
        match self {
            DeclaredType::List(e) | DeclaredType::Array(e) | DeclaredType::Cursor(e) => e,
            other => other,
        }
    }

    /// A display name for diagnostics.
    pub fn display_name(&self) -> String {
        match self {
            DeclaredType::Void => "void".to_string(),
            DeclaredType::Bool => "bool".to_string(),
            DeclaredType::Int => "int".to_string(),
            DeclaredType::Long => "long".to_string(),
            DeclaredType::Float => "float".to_string(),
            DeclaredType::Str => "string".to_string(),
            DeclaredType::Optional(t) => format!("optional<{}>", t.display_name()),
            DeclaredType::List(t) => format!("list<{}>", t.display_name()),
            DeclaredType::Array(t) => format!("array<{}>", t.display_name()),
            DeclaredType::Map { value } => format!("map<{}>", value.display_name()),
            DeclaredType::Cursor(t) => format!("cursor<{}>", t.display_name()),
            DeclaredType::Bean(name) => name.clone(),
            DeclaredType::Any => "any".to_string(),
        }
    }
}

impl std::fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_unwraps_one_level() {
        let nested = DeclaredType::list(DeclaredType::list(DeclaredType::Int));
        // One level only: the element of list<list<int>> is list<int>.
        assert_eq!(nested.element(), &DeclaredType::list(DeclaredType::Int));
        // No single type argument: the type itself.
        assert_eq!(DeclaredType::Str.element(), &DeclaredType::Str);
        let map = DeclaredType::map_of(DeclaredType::Int);
        assert_eq!(map.element(), &map);
    }

    #[test]
    fn primitive_classification() {
        assert!(DeclaredType::Int.is_primitive());
        assert!(DeclaredType::Bool.is_primitive());
        assert!(!DeclaredType::Str.is_primitive());
        assert!(!DeclaredType::optional(DeclaredType::Int).is_primitive());
    }
}
