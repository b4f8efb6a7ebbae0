//! The live value-graph walker.
//!
//! [`MetaValue`] resolves dotted/indexed path expressions against runtime
//! values whose shapes are unknown until the walk reaches them. Each segment
//! classifies the current value once ([`crate::ObjectView`]): beans resolve
//! names through their descriptor (alias-aware), mappings use names directly
//! as keys, and sequences are reached only through an index expression.
//!
//! Reads are lenient about absent data (a missing field or key reads as
//! `Null`); unknown names are `NoSuchProperty`. Writes auto-create missing
//! intermediate values through the object factory, but never grow a sequence
//! to reach an out-of-range index.

use crate::error::ReflectError;
use crate::factory::ObjectFactory;
use crate::path::{parse_index, PropertyPath};
use crate::registry::TypeRegistry;
use crate::types::DeclaredType;
use crate::value::{ObjectView, ObjectViewMut, Value};

/// Path resolver over live values. Cheap to construct per call; the shared
/// state lives in the registry and factory it borrows.
pub struct MetaValue<'a> {
    registry: &'a TypeRegistry,
    factory: &'a dyn ObjectFactory,
}

impl<'a> MetaValue<'a> {
    /// Build a walker over the given registry and factory.
    pub fn new(registry: &'a TypeRegistry, factory: &'a dyn ObjectFactory) -> Self {
        MetaValue { registry, factory }
    }

    /// Read the value at a path expression. Absent-but-legal slots read as
    /// `Null`; a name that cannot be resolved against the current shape is
    /// `NoSuchProperty`.
    pub fn get(&self, root: &Value, expression: &str) -> Result<Value, ReflectError> {
        let mut current = root;
        let mut prop = PropertyPath::parse(expression);
        loop {
            match self.slot_ref(current, &prop)? {
                None => return Ok(Value::Null),
                Some(slot) => match prop.children() {
                    None => return Ok(slot.clone()),
                    Some(children) => {
                        if slot.is_null() {
                            return Ok(Value::Null);
                        }
                        current = slot;
                        prop = PropertyPath::parse(children);
                    }
                },
            }
        }
    }

    /// Write the value at a path expression, creating missing intermediates
    /// along the way.
    pub fn set(&self, root: &mut Value, expression: &str, value: Value) -> Result<(), ReflectError> {
        self.set_path(root, expression, value)
    }

    /// Append rows into a sequence-valued collection. Used when coercing a
    /// row list into a declared collection type.
    pub fn add_all(&self, collection: &mut Value, rows: Vec<Value>) -> Result<(), ReflectError> {
        match collection {
            Value::Seq(items) => {
                items.extend(rows);
                Ok(())
            }
            other => Err(ReflectError::UnsupportedOperation(format!(
                "cannot append rows to {}",
                other.kind()
            ))),
        }
    }

    fn set_path(
        &self,
        current: &mut Value,
        expression: &str,
        value: Value,
    ) -> Result<(), ReflectError> {
        let prop = PropertyPath::parse(expression);
        let Some(children) = prop.children() else {
            return self.write_slot(current, &prop, value);
        };

        // Declared shapes must be computed before the mutable traversal.
        let (named_ty, slot_ty) = self.slot_types(current, &prop)?;
        let named = self.named_slot_mut(current, &prop)?;
        if named.is_null() {
            *named = self.factory.create(&named_ty)?;
        }
        let slot = match prop.index() {
            None => named,
            Some(index) => self.index_slot_mut(named, index)?,
        };
        if slot.is_null() {
            *slot = self.factory.create(&slot_ty)?;
        }
        self.set_path(slot, children, value)
    }

    /// Locate the value of one segment, name first, then index. `Ok(None)`
    /// means the segment resolved but holds nothing.
    fn slot_ref<'v>(
        &self,
        current: &'v Value,
        prop: &PropertyPath<'_>,
    ) -> Result<Option<&'v Value>, ReflectError> {
        let named: Option<&'v Value> = if prop.name().is_empty() {
            Some(current)
        } else {
            match current.view() {
                Some(ObjectView::Bean(bean)) => {
                    let descriptor = self.registry.describe(&bean.type_name)?;
                    let canonical = descriptor.find_property(prop.name())?.to_string();
                    descriptor.getter_type(&canonical)?;
                    bean.fields.get(&canonical)
                }
                Some(ObjectView::Mapping(map)) => map.get(prop.name()),
                // Sequences are reached through an index, never a name.
                Some(ObjectView::Sequence(_)) | None => {
                    return Err(ReflectError::no_such_property(
                        prop.name(),
                        current.kind().to_string(),
                    ))
                }
            }
        };
        let Some(index) = prop.index() else {
            return Ok(named);
        };
        match named {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Seq(items)) => {
                let position = parse_index(index, "sequence")?;
                Ok(items.get(position))
            }
            Some(Value::Map(map)) => Ok(map.get(index)),
            Some(other) => Err(ReflectError::InvalidIndex {
                index: index.to_string(),
                container: other.kind().to_string(),
            }),
        }
    }

    /// Declared types for a segment's named slot and its post-index slot,
    /// used to auto-create missing intermediates. Bean properties carry real
    /// declared types; mapping and sequence children default to shapes the
    /// factory can build blind.
    fn slot_types(
        &self,
        current: &Value,
        prop: &PropertyPath<'_>,
    ) -> Result<(DeclaredType, DeclaredType), ReflectError> {
        match current.view() {
            Some(ObjectView::Bean(bean)) => {
                let descriptor = self.registry.describe(&bean.type_name)?;
                let named = descriptor.getter_type(prop.name())?.clone();
                let slot = descriptor.element_type(prop.name(), prop.index().is_some())?;
                Ok((named, slot))
            }
            Some(ObjectView::Mapping(_) | ObjectView::Sequence(_)) => {
                let named = match prop.index() {
                    Some(index) if index.parse::<usize>().is_ok() => {
                        DeclaredType::list(DeclaredType::Any)
                    }
                    _ => DeclaredType::map_of(DeclaredType::Any),
                };
                Ok((named, DeclaredType::Any))
            }
            None => Err(ReflectError::UnsupportedOperation(format!(
                "cannot set property '{}' through {}",
                prop.name(),
                current.kind()
            ))),
        }
    }

    fn named_slot_mut<'v>(
        &self,
        current: &'v mut Value,
        prop: &PropertyPath<'_>,
    ) -> Result<&'v mut Value, ReflectError> {
        if prop.name().is_empty() {
            return Ok(current);
        }
        let kind = current.kind();
        match current.view_mut() {
            Some(ObjectViewMut::Bean(bean)) => {
                let descriptor = self.registry.describe(&bean.type_name)?;
                let canonical = descriptor.find_property(prop.name())?.to_string();
                descriptor.getter_type(&canonical)?;
                Ok(bean.fields.entry(canonical).or_insert(Value::Null))
            }
            Some(ObjectViewMut::Mapping(map)) => {
                Ok(map.entry(prop.name().to_string()).or_insert(Value::Null))
            }
            Some(ObjectViewMut::Sequence(_)) | None => Err(ReflectError::UnsupportedOperation(
                format!("cannot set property '{}' through {kind}", prop.name()),
            )),
        }
    }

    fn index_slot_mut<'v>(
        &self,
        named: &'v mut Value,
        index: &str,
    ) -> Result<&'v mut Value, ReflectError> {
        match named {
            Value::Seq(items) => {
                let position = parse_index(index, "sequence")?;
                let len = items.len();
                items.get_mut(position).ok_or(ReflectError::InvalidIndex {
                    index: index.to_string(),
                    container: format!("sequence of length {len}"),
                })
            }
            Value::Map(map) => Ok(map.entry(index.to_string()).or_insert(Value::Null)),
            other => Err(ReflectError::InvalidIndex {
                index: index.to_string(),
                container: other.kind().to_string(),
            }),
        }
    }

    /// Write the final segment.
    fn write_slot(
        &self,
        current: &mut Value,
        prop: &PropertyPath<'_>,
        value: Value,
    ) -> Result<(), ReflectError> {
        if prop.name().is_empty() {
            return match prop.index() {
                Some(index) => self.write_indexed(current, index, value),
                None => Err(ReflectError::UnsupportedOperation(
                    "empty property path segment".to_string(),
                )),
            };
        }
        let kind = current.kind();
        match current.view_mut() {
            Some(ObjectViewMut::Bean(bean)) => {
                let descriptor = self.registry.describe(&bean.type_name)?;
                let canonical = descriptor.find_property(prop.name())?.to_string();
                if let Some(index) = prop.index() {
                    descriptor.getter_type(&canonical)?;
                    let named = bean.fields.entry(canonical).or_insert(Value::Null);
                    return self.write_indexed(named, index, value);
                }
                descriptor.setter_type(&canonical)?;
                bean.fields.insert(canonical, value);
                Ok(())
            }
            Some(ObjectViewMut::Mapping(map)) => {
                if let Some(index) = prop.index() {
                    let named = map.entry(prop.name().to_string()).or_insert(Value::Null);
                    return self.write_indexed(named, index, value);
                }
                map.insert(prop.name().to_string(), value);
                Ok(())
            }
            Some(ObjectViewMut::Sequence(_)) | None => Err(ReflectError::UnsupportedOperation(
                format!("cannot set property '{}' on {kind}", prop.name()),
            )),
        }
    }

    /// Write into a located slot through its index. Out-of-range sequence
    /// positions are an error, never silent growth.
    fn write_indexed(
        &self,
        named: &mut Value,
        index: &str,
        value: Value,
    ) -> Result<(), ReflectError> {
        match named {
            Value::Seq(items) => {
                let position = parse_index(index, "sequence")?;
                let len = items.len();
                match items.get_mut(position) {
                    Some(slot) => {
                        *slot = value;
                        Ok(())
                    }
                    None => Err(ReflectError::InvalidIndex {
                        index: index.to_string(),
                        container: format!("sequence of length {len}"),
                    }),
                }
            }
            Value::Map(map) => {
                map.insert(index.to_string(), value);
                Ok(())
            }
            other => Err(ReflectError::InvalidIndex {
                index: index.to_string(),
                container: other.kind().to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TypeSchema;
    use crate::factory::DefaultObjectFactory;
    use crate::value::{Bean, MapValue};

    fn registry() -> std::sync::Arc<TypeRegistry> {
        std::sync::Arc::new(TypeRegistry::from_schemas([
            TypeSchema::new("User")
                .property("userName", DeclaredType::Str)
                .property("address", DeclaredType::bean("Address"))
                .property("orders", DeclaredType::list(DeclaredType::bean("Order"))),
            TypeSchema::new("Address").property("zip", DeclaredType::Str),
            TypeSchema::new("Order").property("name", DeclaredType::Str),
        ]))
    }

    fn sample_user() -> Value {
        Value::Bean(
            Bean::new("User").with("userName", "ada").with(
                "orders",
                vec![
                    Value::Bean(Bean::new("Order").with("name", "books")),
                    Value::Bean(Bean::new("Order").with("name", "tea")),
                ],
            ),
        )
    }

    #[test]
    fn get_walks_beans_sequences_and_maps() {
        let registry = registry();
        let factory = DefaultObjectFactory::new(std::sync::Arc::clone(&registry));
        let meta = MetaValue::new(&registry, &factory);
        let user = sample_user();

        assert_eq!(meta.get(&user, "userName").unwrap(), Value::Str("ada".into()));
        assert_eq!(
            meta.get(&user, "orders[1].name").unwrap(),
            Value::Str("tea".into())
        );
        // Alias-resolved bean lookup.
        assert_eq!(
            meta.get(&user, "user_name").unwrap(),
            Value::Str("ada".into())
        );
        // Absent intermediate reads as null.
        assert_eq!(meta.get(&user, "address.zip").unwrap(), Value::Null);
        // Unknown bean property is an error.
        assert!(matches!(
            meta.get(&user, "nickname"),
            Err(ReflectError::NoSuchProperty { .. })
        ));
    }

    #[test]
    fn map_segments_use_names_as_keys_directly() {
        let registry = registry();
        let factory = DefaultObjectFactory::new(std::sync::Arc::clone(&registry));
        let meta = MetaValue::new(&registry, &factory);

        let mut scores = MapValue::new();
        scores.insert("q1".to_string(), Value::Int(10));
        let mut root = MapValue::new();
        root.insert("scores".to_string(), Value::Map(scores));
        let root = Value::Map(root);

        assert_eq!(meta.get(&root, "scores.q1").unwrap(), Value::Int(10));
        assert_eq!(meta.get(&root, "scores[q1]").unwrap(), Value::Int(10));
        // Any key resolves against a mapping; absence is null, not an error.
        assert_eq!(meta.get(&root, "scores.q9").unwrap(), Value::Null);
    }

    #[test]
    fn set_auto_creates_missing_intermediates() {
        let registry = registry();
        let factory = DefaultObjectFactory::new(std::sync::Arc::clone(&registry));
        let meta = MetaValue::new(&registry, &factory);
        let mut user = Value::Bean(Bean::new("User"));

        meta.set(&mut user, "address.zip", Value::Str("75001".into()))
            .unwrap();
        assert_eq!(
            meta.get(&user, "address.zip").unwrap(),
            Value::Str("75001".into())
        );
    }

    #[test]
    fn set_writes_through_indexes_without_growing_sequences() {
        let registry = registry();
        let factory = DefaultObjectFactory::new(std::sync::Arc::clone(&registry));
        let meta = MetaValue::new(&registry, &factory);
        let mut user = sample_user();

        meta.set(&mut user, "orders[0].name", Value::Str("maps".into()))
            .unwrap();
        assert_eq!(
            meta.get(&user, "orders[0].name").unwrap(),
            Value::Str("maps".into())
        );
        assert!(matches!(
            meta.set(&mut user, "orders[9].name", Value::Null),
            Err(ReflectError::InvalidIndex { .. })
        ));
    }

    #[test]
    fn set_through_scalar_is_unsupported() {
        let registry = registry();
        let factory = DefaultObjectFactory::new(std::sync::Arc::clone(&registry));
        let meta = MetaValue::new(&registry, &factory);
        let mut user = sample_user();

        assert!(matches!(
            meta.set(&mut user, "userName.length", Value::Int(1)),
            Err(ReflectError::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn add_all_appends_into_sequences_only() {
        let registry = registry();
        let factory = DefaultObjectFactory::new(std::sync::Arc::clone(&registry));
        let meta = MetaValue::new(&registry, &factory);

        let mut seq = Value::Seq(vec![Value::Int(1)]);
        meta.add_all(&mut seq, vec![Value::Int(2), Value::Int(3)])
            .unwrap();
        assert_eq!(
            seq,
            Value::Seq(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
        assert!(meta.add_all(&mut Value::Int(0), vec![]).is_err());
    }
}
