//! Object construction for result coercion and intermediate auto-creation.

use std::sync::Arc;

use crate::error::ReflectError;
use crate::registry::TypeRegistry;
use crate::types::DeclaredType;
use crate::value::{Bean, MapValue, Value};

/// Produces fresh empty instances for declared shapes: collection results
/// that need a declared-type container, and missing intermediates created
/// while setting through a path.
pub trait ObjectFactory: Send + Sync {
    /// Create a fresh empty value of the declared shape.
    fn create(&self, declared: &DeclaredType) -> Result<Value, ReflectError>;

    /// Whether the declared shape is a collection this factory would build
    /// as a sequence.
    fn is_collection(&self, declared: &DeclaredType) -> bool {
        declared.is_collection_like()
    }
}

/// The default factory: sequences for list/array shapes, empty maps for map
/// shapes, descriptor-checked empty beans for registered bean types.
pub struct DefaultObjectFactory {
    registry: Arc<TypeRegistry>,
}

impl DefaultObjectFactory {
    /// Build a factory over the given registry.
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        DefaultObjectFactory { registry }
    }
}

impl ObjectFactory for DefaultObjectFactory {
    fn create(&self, declared: &DeclaredType) -> Result<Value, ReflectError> {
        match declared {
            DeclaredType::List(_) | DeclaredType::Array(_) => Ok(Value::Seq(Vec::new())),
            DeclaredType::Map { .. } | DeclaredType::Any => Ok(Value::Map(MapValue::new())),
            DeclaredType::Optional(inner) => self.create(inner),
            DeclaredType::Bean(name) => {
                let descriptor = self.registry.describe(name)?;
                if !descriptor.has_default_constructor() {
                    return Err(ReflectError::NotConstructible {
                        type_name: name.clone(),
                    });
                }
                Ok(Value::Bean(Bean::new(name.clone())))
            }
            other => Err(ReflectError::UnsupportedOperation(format!(
                "cannot construct a value of declared type {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TypeSchema;

    #[test]
    fn creates_containers_and_beans() {
        let registry = Arc::new(TypeRegistry::from_schemas([
            TypeSchema::new("Order").property("id", DeclaredType::Long),
            TypeSchema::new("Frozen")
                .property("id", DeclaredType::Long)
                .no_default_constructor(),
        ]));
        let factory = DefaultObjectFactory::new(registry);

        assert_eq!(
            factory.create(&DeclaredType::list(DeclaredType::Int)).unwrap(),
            Value::Seq(vec![])
        );
        assert_eq!(
            factory.create(&DeclaredType::map_of(DeclaredType::Any)).unwrap(),
            Value::Map(MapValue::new())
        );
        assert_eq!(
            factory.create(&DeclaredType::bean("Order")).unwrap(),
            Value::Bean(Bean::new("Order"))
        );
        assert!(matches!(
            factory.create(&DeclaredType::bean("Frozen")),
            Err(ReflectError::NotConstructible { .. })
        ));
        assert!(factory.create(&DeclaredType::Int).is_err());
    }
}
