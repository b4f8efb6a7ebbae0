//! The execution context a mapper proxy binds to.
//!
//! The execution entry point itself is an external collaborator: it opens
//! connections, runs operations, and may block the calling thread. This core
//! only defines the trait seam ([`Executor`]) and the bundle of shared
//! services a call needs ([`Session`]).

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use rowbind_reflect::{DefaultObjectFactory, ObjectFactory, TypeRegistry, Value};

use crate::cursor::Cursor;
use crate::error::BindingError;
use crate::registry::OperationRegistry;

/// Pagination control. A designated non-data parameter type: it is excluded
/// from named-parameter binding and extracted by position instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowBounds {
    /// Rows to skip.
    pub offset: usize,
    /// Maximum rows to return.
    pub limit: usize,
}

impl RowBounds {
    /// No offset, no limit.
    pub const DEFAULT: RowBounds = RowBounds {
        offset: 0,
        limit: usize::MAX,
    };

    /// Build explicit bounds.
    pub fn new(offset: usize, limit: usize) -> Self {
        RowBounds { offset, limit }
    }
}

impl Default for RowBounds {
    fn default() -> Self {
        RowBounds::DEFAULT
    }
}

/// Streaming row callback. The other designated non-data parameter type.
pub trait ResultHandler {
    /// Receive one result row.
    fn handle(&mut self, row: Value);
}

impl<F: FnMut(Value)> ResultHandler for F {
    fn handle(&mut self, row: Value) {
        self(row)
    }
}

/// The external execution entry point. Implementations own connections,
/// transactions, and result caching; this core submits operation ids and
/// named parameters and coerces what comes back.
pub trait Executor: Send + Sync {
    /// Run a write-kind operation, returning the affected row count.
    fn update(&self, id: &str, params: &Value) -> Result<i64, BindingError>;

    /// Run a read-kind operation, returning the full row list.
    fn query(&self, id: &str, params: &Value, bounds: RowBounds)
        -> Result<Vec<Value>, BindingError>;

    /// Run a read-kind operation expected to produce at most one row.
    fn query_one(&self, id: &str, params: &Value) -> Result<Value, BindingError>;

    /// Run a read-kind operation, pushing each row through the handler.
    fn query_with_handler(
        &self,
        id: &str,
        params: &Value,
        bounds: RowBounds,
        handler: &mut dyn ResultHandler,
    ) -> Result<(), BindingError>;

    /// Run a read-kind operation as a lazy row stream.
    fn query_cursor(
        &self,
        id: &str,
        params: &Value,
        bounds: RowBounds,
    ) -> Result<Cursor, BindingError>;

    /// Flush buffered writes, returning the total affected row count.
    fn flush(&self) -> Result<i64, BindingError>;
}

/// Behavior switches for parameter naming.
///
/// Property-path spelling is not configured here: descriptor alias lookup is
/// case- and underscore-insensitive by construction, and
/// [`rowbind_reflect::TypeRegistry::find_property_path`] takes its
/// underscore-stripping flag per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingConfig {
    /// When a parameter has no explicit name, fall back to its declared
    /// source name before resorting to ordinals.
    pub use_actual_param_name: bool,
}

impl Default for BindingConfig {
    fn default() -> Self {
        BindingConfig {
            use_actual_param_name: true,
        }
    }
}

/// Everything one mapper call needs: the executor, the operation registry,
/// the type metadata cache, the object factory, and configuration. Cheap to
/// clone; all heavy state is shared behind `Arc`s.
#[derive(Clone)]
pub struct Session {
    executor: Arc<dyn Executor>,
    operations: Arc<dyn OperationRegistry>,
    types: Arc<TypeRegistry>,
    factory: Arc<dyn ObjectFactory>,
    config: BindingConfig,
}

impl Session {
    /// Build a session with the default object factory and configuration.
    pub fn new(
        executor: Arc<dyn Executor>,
        operations: Arc<dyn OperationRegistry>,
        types: Arc<TypeRegistry>,
    ) -> Self {
        let factory = Arc::new(DefaultObjectFactory::new(Arc::clone(&types)));
        Session {
            executor,
            operations,
            types,
            factory,
            config: BindingConfig::default(),
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: BindingConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the object factory.
    pub fn with_factory(mut self, factory: Arc<dyn ObjectFactory>) -> Self {
        self.factory = factory;
        self
    }

    /// The execution entry point.
    pub fn executor(&self) -> &dyn Executor {
        &*self.executor
    }

    /// The named-operation registry.
    pub fn operations(&self) -> &dyn OperationRegistry {
        &*self.operations
    }

    /// The type metadata cache.
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// The object construction capability.
    pub fn factory(&self) -> &dyn ObjectFactory {
        &*self.factory
    }

    /// The binding configuration.
    pub fn config(&self) -> &BindingConfig {
        &self.config
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
