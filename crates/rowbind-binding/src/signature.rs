//! Mapper interfaces as data.
//!
//! There is no runtime method reflection to lean on, so a mapper interface
//! is declared explicitly: each method carries its formal parameter list
//! (types, optional explicit names, optional source names), its declared
//! return type, and optional markers (map key, flush designation, default
//! implementation). This is the one deliberately host-facing seam; everything
//! downstream of it is shape-driven.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use rowbind_reflect::DeclaredType;

use crate::error::BindingError;
use crate::mapper::MapperProxy;
use crate::param::Arg;

/// The declared type of one formal parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    /// A data parameter that participates in named-parameter binding.
    Data(DeclaredType),
    /// Pagination control; excluded from binding, extracted by position.
    RowBounds,
    /// Streaming row callback; excluded from binding, passed out-of-band.
    ResultHandler,
}

/// One formal parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    /// The declared parameter type.
    pub ty: ParamType,
    /// An explicit name annotation, when the host supplied one.
    pub explicit_name: Option<String>,
    /// The parameter's declared source name, recoverable when configuration
    /// enables actual-name recovery.
    pub source_name: Option<String>,
}

impl ParamSpec {
    /// A data parameter with no name information.
    pub fn data(declared: DeclaredType) -> Self {
        ParamSpec {
            ty: ParamType::Data(declared),
            explicit_name: None,
            source_name: None,
        }
    }

    /// Attach an explicit name annotation.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.explicit_name = Some(name.into());
        self
    }

    /// Attach the declared source name.
    pub fn source(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }

    /// A pagination-control parameter.
    pub fn row_bounds() -> Self {
        ParamSpec {
            ty: ParamType::RowBounds,
            explicit_name: None,
            source_name: None,
        }
    }

    /// A streaming-callback parameter.
    pub fn result_handler() -> Self {
        ParamSpec {
            ty: ParamType::ResultHandler,
            explicit_name: None,
            source_name: None,
        }
    }

    /// Whether this parameter participates in named-parameter binding.
    pub fn is_data(&self) -> bool {
        matches!(self.ty, ParamType::Data(_))
    }
}

/// Body of a default (concrete) interface method, dispatched to its own
/// implementation instead of through the operation registry.
pub type DefaultMethodFn =
    dyn Fn(&MapperProxy, &[Arg]) -> Result<rowbind_reflect::Value, BindingError> + Send + Sync;

/// One declared mapper method.
#[derive(Clone)]
pub struct MethodSignature {
    /// The method name.
    pub name: String,
    /// The formal parameter list, in declaration order.
    pub params: Vec<ParamSpec>,
    /// The declared return type.
    pub return_type: DeclaredType,
    /// For mapping-by-key returns, the row property used as the key.
    pub map_key: Option<String>,
    /// Flush designation: when no operation resolves, the method is a valid
    /// flush call instead of a binding error.
    pub flush: bool,
    /// A concrete implementation, dispatched directly when present.
    pub default_impl: Option<Arc<DefaultMethodFn>>,
}

impl MethodSignature {
    /// Start a signature with a void return and no parameters.
    pub fn new(name: impl Into<String>) -> Self {
        MethodSignature {
            name: name.into(),
            params: Vec::new(),
            return_type: DeclaredType::Void,
            map_key: None,
            flush: false,
            default_impl: None,
        }
    }

    /// Append a formal parameter.
    pub fn param(mut self, spec: ParamSpec) -> Self {
        self.params.push(spec);
        self
    }

    /// Declare the return type.
    pub fn returns(mut self, declared: DeclaredType) -> Self {
        self.return_type = declared;
        self
    }

    /// Declare a mapping-by-key return keyed by the given row property.
    pub fn keyed_by(mut self, property: impl Into<String>) -> Self {
        self.map_key = Some(property.into());
        self
    }

    /// Mark the method as flush-designated.
    pub fn flush_marked(mut self) -> Self {
        self.flush = true;
        self
    }

    /// Attach a concrete implementation.
    pub fn with_default_impl(
        mut self,
        body: impl Fn(&MapperProxy, &[Arg]) -> Result<rowbind_reflect::Value, BindingError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.default_impl = Some(Arc::new(body));
        self
    }
}

impl std::fmt::Debug for MethodSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodSignature")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("return_type", &self.return_type)
            .field("map_key", &self.map_key)
            .field("flush", &self.flush)
            .field("has_default_impl", &self.default_impl.is_some())
            .finish()
    }
}

/// A declared mapper interface: named methods plus super-interfaces.
#[derive(Debug, Clone)]
pub struct MapperInterface {
    /// The interface name; operation ids are `name + "." + methodName`.
    pub name: String,
    methods: FxHashMap<String, Arc<MethodSignature>>,
    parents: Vec<Arc<MapperInterface>>,
}

impl MapperInterface {
    /// Start an interface declaration.
    pub fn new(name: impl Into<String>) -> Self {
        MapperInterface {
            name: name.into(),
            methods: FxHashMap::default(),
            parents: Vec::new(),
        }
    }

    /// Declare a method.
    pub fn method(mut self, signature: MethodSignature) -> Self {
        self.methods
            .insert(signature.name.clone(), Arc::new(signature));
        self
    }

    /// Declare a super-interface.
    pub fn extends(mut self, parent: Arc<MapperInterface>) -> Self {
        self.parents.push(parent);
        self
    }

    /// Super-interfaces, in declaration order.
    pub fn parents(&self) -> &[Arc<MapperInterface>] {
        &self.parents
    }

    /// Find a method on this interface or, depth-first, on its parents.
    pub fn find_method(&self, name: &str) -> Option<Arc<MethodSignature>> {
        if let Some(found) = self.methods.get(name) {
            return Some(Arc::clone(found));
        }
        self.parents
            .iter()
            .find_map(|parent| parent.find_method(name))
    }

    /// Declared method names on this interface only, sorted.
    pub fn method_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_method_walks_parents_depth_first() {
        let base = Arc::new(
            MapperInterface::new("BaseMapper")
                .method(MethodSignature::new("count").returns(DeclaredType::Long)),
        );
        let child = MapperInterface::new("UserMapper")
            .extends(base)
            .method(MethodSignature::new("findById").returns(DeclaredType::bean("User")));

        assert!(child.find_method("findById").is_some());
        assert!(child.find_method("count").is_some());
        assert!(child.find_method("missing").is_none());
    }

    #[test]
    fn param_spec_builders() {
        let spec = ParamSpec::data(DeclaredType::Int).named("id").source("userId");
        assert_eq!(spec.explicit_name.as_deref(), Some("id"));
        assert_eq!(spec.source_name.as_deref(), Some("userId"));
        assert!(spec.is_data());
        assert!(!ParamSpec::row_bounds().is_data());
        assert!(!ParamSpec::result_handler().is_data());
    }
}
