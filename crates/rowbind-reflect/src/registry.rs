//! The process-wide type metadata cache.
//!
//! Hosts register a [`TypeSchema`] per bean type; the first `describe` call
//! for a type builds its [`TypeDescriptor`] and memoizes it. Concurrent first
//! builds may duplicate work, but every caller observes the same published
//! `Arc` — the cache publishes at most one descriptor per type name.
//!
//! The registry also answers descriptor-only questions about dotted path
//! expressions (declared getter/setter types, canonical path spelling)
//! without touching any live value.

use std::sync::Arc;

use dashmap::DashMap;

use crate::descriptor::{TypeDescriptor, TypeSchema};
use crate::error::ReflectError;
use crate::path::PropertyPath;
use crate::types::DeclaredType;

/// Registry of bean type schemas and their memoized descriptors.
///
/// Read-mostly and shared: `register` is expected during host setup, while
/// `describe` runs on every concurrent caller thread. Published descriptors
/// are immutable and need no further synchronization to read.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    schemas: DashMap<String, TypeSchema>,
    cache: DashMap<String, Arc<TypeDescriptor>>,
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        TypeRegistry::default()
    }

    /// Record a schema. Replacing a schema after its descriptor has been
    /// published has no effect on the published descriptor.
    pub fn register(&self, schema: TypeSchema) {
        self.schemas.insert(schema.name().to_string(), schema);
    }

    /// Whether a schema is registered under this name.
    pub fn has_type(&self, type_name: &str) -> bool {
        self.schemas.contains_key(type_name)
    }

    /// Return the memoized descriptor for a type, building it on first
    /// access. Duplicate concurrent builds are tolerated; the entry API
    /// guarantees a single published instance per name.
    pub fn describe(&self, type_name: &str) -> Result<Arc<TypeDescriptor>, ReflectError> {
        if let Some(cached) = self.cache.get(type_name) {
            return Ok(Arc::clone(&cached));
        }
        let schema = self
            .schemas
            .get(type_name)
            .ok_or_else(|| ReflectError::no_such_property(type_name, "type registry"))?;
        let built = Arc::new(schema.build());
        drop(schema);
        let published = self
            .cache
            .entry(type_name.to_string())
            .or_insert(built)
            .clone();
        Ok(published)
    }

    /// The declared type read by walking a dotted path against descriptors
    /// only. Indexed segments unwrap one level of collection
    /// parameterization.
    pub fn getter_type_at(
        &self,
        type_name: &str,
        expression: &str,
    ) -> Result<DeclaredType, ReflectError> {
        let descriptor = self.describe(type_name)?;
        let prop = PropertyPath::parse(expression);
        let declared = descriptor.element_type(prop.name(), prop.index().is_some())?;
        match prop.children() {
            None => Ok(declared),
            Some(children) => match declared.bean_name() {
                Some(bean) => self.getter_type_at(bean, children),
                None => Err(ReflectError::no_such_property(
                    PropertyPath::parse(children).name(),
                    declared.display_name(),
                )),
            },
        }
    }

    /// The declared type written by the final segment of a dotted path.
    /// Intermediate segments are resolved through their getter types.
    pub fn setter_type_at(
        &self,
        type_name: &str,
        expression: &str,
    ) -> Result<DeclaredType, ReflectError> {
        let descriptor = self.describe(type_name)?;
        let prop = PropertyPath::parse(expression);
        match prop.children() {
            None => descriptor.setter_type(prop.name()).cloned(),
            Some(children) => {
                let declared = descriptor.element_type(prop.name(), prop.index().is_some())?;
                match declared.bean_name() {
                    Some(bean) => self.setter_type_at(bean, children),
                    None => Err(ReflectError::no_such_property(
                        PropertyPath::parse(children).name(),
                        declared.display_name(),
                    )),
                }
            }
        }
    }

    /// Whether every segment of the path resolves through a readable
    /// property.
    pub fn has_getter_at(&self, type_name: &str, expression: &str) -> bool {
        self.getter_type_at(type_name, expression).is_ok()
    }

    /// Whether the path resolves and its final segment is writable.
    pub fn has_setter_at(&self, type_name: &str, expression: &str) -> bool {
        self.setter_type_at(type_name, expression).is_ok()
    }

    /// Rebuild the canonical dotted spelling of a possibly case- or
    /// underscore-mangled path (`user_name.ZIP` -> `userName.zip`).
    /// Returns `None` when any link fails to resolve.
    pub fn find_property_path(
        &self,
        type_name: &str,
        expression: &str,
        ignore_underscores: bool,
    ) -> Option<String> {
        let cleaned;
        let expression = if ignore_underscores {
            cleaned = expression.replace('_', "");
            cleaned.as_str()
        } else {
            expression
        };
        let mut spelled = String::new();
        self.build_property_path(type_name, expression, &mut spelled)
            .ok()?;
        if spelled.is_empty() {
            None
        } else {
            Some(spelled)
        }
    }

    fn build_property_path(
        &self,
        type_name: &str,
        expression: &str,
        out: &mut String,
    ) -> Result<(), ReflectError> {
        let descriptor = self.describe(type_name)?;
        let prop = PropertyPath::parse(expression);
        let canonical = descriptor.find_property(prop.name())?.to_string();
        out.push_str(&canonical);
        if let Some(children) = prop.children() {
            out.push('.');
            let declared = descriptor.element_type(&canonical, prop.index().is_some())?;
            let bean = declared.bean_name().ok_or_else(|| {
                ReflectError::no_such_property(
                    PropertyPath::parse(children).name(),
                    declared.display_name(),
                )
            })?;
            self.build_property_path(bean, children, out)?;
        }
        Ok(())
    }

    /// Snapshot of registered type names, mainly for diagnostics.
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.schemas.iter().map(|e| e.key().clone()).collect();
        names.sort_unstable();
        names
    }

    /// Bulk-register schemas from an iterator.
    pub fn register_all(&self, schemas: impl IntoIterator<Item = TypeSchema>) {
        for schema in schemas {
            self.register(schema);
        }
    }

    /// Build a registry from an iterator of schemas.
    pub fn from_schemas(schemas: impl IntoIterator<Item = TypeSchema>) -> Self {
        let registry = TypeRegistry::new();
        registry.register_all(schemas);
        registry
    }
}
