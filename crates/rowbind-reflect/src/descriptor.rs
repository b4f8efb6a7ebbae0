//! Per-type reflection summaries.
//!
//! A [`TypeDescriptor`] records, for one registered bean type, the readable
//! and writable properties, their declared types, and whether the type can be
//! default-constructed. Descriptors are immutable once built; the
//! [`crate::TypeRegistry`] memoizes exactly one per type name.

use rustc_hash::FxHashMap;

use crate::error::ReflectError;
use crate::types::DeclaredType;

/// One property of a bean type.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
    /// Canonical, case-sensitive property name.
    pub name: String,
    /// The declared property type.
    pub declared: DeclaredType,
    /// Whether a get accessor exists.
    pub readable: bool,
    /// Whether a set accessor exists.
    pub writable: bool,
}

/// The registration-time description of a bean type a host supplies.
/// This is the one deliberately language-specific seam: whatever static
/// type knowledge the host has is funneled through a schema so the rest of
/// the resolver stays shape-driven.
#[derive(Debug, Clone)]
pub struct TypeSchema {
    name: String,
    properties: Vec<PropertyDescriptor>,
    default_constructible: bool,
}

impl TypeSchema {
    /// Start a schema for the given type name.
    pub fn new(name: impl Into<String>) -> Self {
        TypeSchema {
            name: name.into(),
            properties: Vec::new(),
            default_constructible: true,
        }
    }

    /// Add a read/write property.
    pub fn property(mut self, name: impl Into<String>, declared: DeclaredType) -> Self {
        self.properties.push(PropertyDescriptor {
            name: name.into(),
            declared,
            readable: true,
            writable: true,
        });
        self
    }

    /// Add a read-only property.
    pub fn read_only(mut self, name: impl Into<String>, declared: DeclaredType) -> Self {
        self.properties.push(PropertyDescriptor {
            name: name.into(),
            declared,
            readable: true,
            writable: false,
        });
        self
    }

    /// Mark the type as not default-constructible.
    pub fn no_default_constructor(mut self) -> Self {
        self.default_constructible = false;
        self
    }

    /// The type name this schema describes.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn build(&self) -> TypeDescriptor {
        let mut properties = FxHashMap::default();
        let mut aliases = FxHashMap::default();
        for prop in &self.properties {
            aliases.insert(normalize(&prop.name), prop.name.clone());
            properties.insert(prop.name.clone(), prop.clone());
        }
        TypeDescriptor {
            type_name: self.name.clone(),
            properties,
            aliases,
            default_constructible: self.default_constructible,
        }
    }
}

/// The immutable reflection summary for one bean type.
#[derive(Debug)]
pub struct TypeDescriptor {
    type_name: String,
    properties: FxHashMap<String, PropertyDescriptor>,
    /// Normalized (lower-cased, underscore-stripped) name -> canonical name.
    aliases: FxHashMap<String, String>,
    default_constructible: bool,
}

/// Normalized lookup form: lower-cased with underscores stripped.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_')
        .flat_map(|c| c.to_lowercase())
        .collect()
}

impl TypeDescriptor {
    /// The type name this descriptor summarizes.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Whether the type can be default-constructed.
    pub fn has_default_constructor(&self) -> bool {
        self.default_constructible
    }

    /// Resolve a (possibly alias-form) name to the canonical property name.
    pub fn find_property(&self, name: &str) -> Result<&str, ReflectError> {
        if let Some(prop) = self.properties.get(name) {
            return Ok(&prop.name);
        }
        self.aliases
            .get(&normalize(name))
            .map(String::as_str)
            .ok_or_else(|| ReflectError::no_such_property(name, self.type_name.clone()))
    }

    /// Look up a property descriptor, resolving aliases.
    pub fn property(&self, name: &str) -> Result<&PropertyDescriptor, ReflectError> {
        let canonical = self.find_property(name)?;
        Ok(&self.properties[canonical])
    }

    /// Whether a readable property of this name exists.
    pub fn has_getter(&self, name: &str) -> bool {
        self.property(name).map(|p| p.readable).unwrap_or(false)
    }

    /// Whether a writable property of this name exists.
    pub fn has_setter(&self, name: &str) -> bool {
        self.property(name).map(|p| p.writable).unwrap_or(false)
    }

    /// The declared type read through the get accessor.
    pub fn getter_type(&self, name: &str) -> Result<&DeclaredType, ReflectError> {
        let prop = self.property(name)?;
        if !prop.readable {
            return Err(ReflectError::no_such_property(name, self.type_name.clone()));
        }
        Ok(&prop.declared)
    }

    /// The declared type written through the set accessor.
    pub fn setter_type(&self, name: &str) -> Result<&DeclaredType, ReflectError> {
        let prop = self.property(name)?;
        if !prop.writable {
            return Err(ReflectError::no_such_property(name, self.type_name.clone()));
        }
        Ok(&prop.declared)
    }

    /// The declared type of a named slot, unwrapping one level of
    /// parameterization when an index expression is being applied to a
    /// collection-like property (`orders[0]` of `list<Order>` is `Order`).
    /// Properties without a single type argument keep their raw type.
    pub fn element_type(&self, name: &str, indexed: bool) -> Result<DeclaredType, ReflectError> {
        let declared = self.getter_type(name)?;
        if indexed && declared.is_collection_like() {
            Ok(declared.element().clone())
        } else {
            Ok(declared.clone())
        }
    }

    /// Names of all readable properties, sorted for determinism.
    pub fn getter_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .properties
            .values()
            .filter(|p| p.readable)
            .map(|p| p.name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// Names of all writable properties, sorted for determinism.
    pub fn setter_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .properties
            .values()
            .filter(|p| p.writable)
            .map(|p| p.name.as_str())
            .collect();
        names.sort_unstable();
        names
    }
}
