//! Type-erased runtime values.
//!
//! Every component in rowbind operates on `Value`: mapper arguments,
//! named-parameter objects, result rows, and the object graphs walked by the
//! property-path resolver. Three container shapes exist — typed beans,
//! free-form keyed mappings, and indexed sequences — and the walker
//! classifies a value into one of them exactly once per path segment via
//! [`ObjectView`] / [`ObjectViewMut`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A free-form keyed mapping. BTreeMap keeps key order deterministic, which
/// matters for named-parameter objects and error messages that enumerate keys.
pub type MapValue = BTreeMap<String, Value>;

/// The type-erased runtime value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// The absent value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A 64-bit integer. Declared `Int` and `Long` both inhabit this variant.
    Int(i64),
    /// A 64-bit float.
    Float(f64),
    /// A string.
    Str(String),
    /// An indexed sequence.
    Seq(Vec<Value>),
    /// A free-form keyed mapping.
    Map(MapValue),
    /// A typed plain object whose legal property set is governed by the
    /// `TypeDescriptor` registered for its type name.
    Bean(Bean),
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

/// A typed plain object. Fields not present are read as `Null`; the set of
/// legal field names is checked against the registered descriptor, not the
/// map itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bean {
    /// The registered type name.
    pub type_name: String,
    /// Field values keyed by canonical property name.
    pub fields: MapValue,
}

impl Bean {
    /// Create an empty bean of the given type.
    pub fn new(type_name: impl Into<String>) -> Self {
        Bean {
            type_name: type_name.into(),
            fields: MapValue::new(),
        }
    }

    /// Set a field and return self, for fixture-style construction.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }
}

/// Coarse classification of a value, used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Float,
    Str,
    Seq,
    Map,
    Bean,
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Str => "string",
            ValueKind::Seq => "sequence",
            ValueKind::Map => "map",
            ValueKind::Bean => "bean",
        };
        f.write_str(name)
    }
}

impl Value {
    /// Whether this is `Value::Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The coarse kind tag of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Str(_) => ValueKind::Str,
            Value::Seq(_) => ValueKind::Seq,
            Value::Map(_) => ValueKind::Map,
            Value::Bean(_) => ValueKind::Bean,
        }
    }

    /// Classify this value as a traversable container, or `None` for scalars
    /// and `Null`.
    pub fn view(&self) -> Option<ObjectView<'_>> {
        match self {
            Value::Bean(bean) => Some(ObjectView::Bean(bean)),
            Value::Map(map) => Some(ObjectView::Mapping(map)),
            Value::Seq(items) => Some(ObjectView::Sequence(items)),
            _ => None,
        }
    }

    /// Mutable twin of [`Value::view`].
    pub fn view_mut(&mut self) -> Option<ObjectViewMut<'_>> {
        match self {
            Value::Bean(bean) => Some(ObjectViewMut::Bean(bean)),
            Value::Map(map) => Some(ObjectViewMut::Mapping(map)),
            Value::Seq(items) => Some(ObjectViewMut::Sequence(items)),
            _ => None,
        }
    }

    /// Borrow the sequence items if this is a `Seq`.
    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow the mapping if this is a `Map`.
    pub fn as_map(&self) -> Option<&MapValue> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Render a scalar as a map key. Used when folding rows into a
    /// mapping-by-key result.
    pub fn as_key_string(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Str(s) => s.clone(),
            other => format!("<{}>", other.kind()),
        }
    }
}

/// Borrowed classification of a container value, selected once per path
/// segment. Scalars are not viewable; a segment that needs to traverse one
/// fails with `NoSuchProperty`.
#[derive(Debug, Clone, Copy)]
pub enum ObjectView<'a> {
    /// A typed plain object, resolved through its descriptor.
    Bean(&'a Bean),
    /// A keyed mapping; property names are used directly as keys.
    Mapping(&'a MapValue),
    /// An indexed sequence, reachable only through an index expression.
    Sequence(&'a [Value]),
}

/// Mutable twin of [`ObjectView`].
#[derive(Debug)]
pub enum ObjectViewMut<'a> {
    Bean(&'a mut Bean),
    Mapping(&'a mut MapValue),
    Sequence(&'a mut Vec<Value>),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Bean> for Value {
    fn from(v: Bean) -> Self {
        Value::Bean(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Seq(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_classifies_containers_only() {
        assert!(matches!(
            Value::Bean(Bean::new("User")).view(),
            Some(ObjectView::Bean(_))
        ));
        assert!(matches!(
            Value::Map(MapValue::new()).view(),
            Some(ObjectView::Mapping(_))
        ));
        assert!(matches!(
            Value::Seq(vec![]).view(),
            Some(ObjectView::Sequence(_))
        ));
        assert!(Value::Int(1).view().is_none());
        assert!(Value::Null.view().is_none());
    }

    #[test]
    fn key_string_renders_scalars() {
        assert_eq!(Value::Int(7).as_key_string(), "7");
        assert_eq!(Value::Str("id".into()).as_key_string(), "id");
        assert_eq!(Value::Bool(true).as_key_string(), "true");
        assert_eq!(Value::Null.as_key_string(), "null");
    }

    #[test]
    fn bean_fixture_builder() {
        let bean = Bean::new("Order").with("id", 3).with("name", "books");
        assert_eq!(bean.fields.get("id"), Some(&Value::Int(3)));
        assert_eq!(bean.fields.get("name"), Some(&Value::Str("books".into())));
    }
}
