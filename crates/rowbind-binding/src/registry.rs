//! The named-operation registry consumed by the dispatch layer.
//!
//! Operations are registered by id (`InterfaceName.methodName` by
//! convention) with a command kind and a declared result type; the dispatch
//! layer resolves ids through this interface and never sees how operations
//! were loaded.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use rowbind_reflect::DeclaredType;

/// Classification of an operation, driving result coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandKind {
    /// Row-creating write.
    Create,
    /// Row-updating write.
    Update,
    /// Row-deleting write.
    Delete,
    /// Row-producing read.
    Read,
    /// Flush pending writes; no statement of its own.
    Flush,
}

impl CommandKind {
    /// Whether this kind submits through the write entry point and yields a
    /// row count.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            CommandKind::Create | CommandKind::Update | CommandKind::Delete
        )
    }
}

/// The descriptor of one registered data-access operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationSpec {
    /// Stable string id, unique per registry.
    pub id: String,
    /// The command kind.
    pub kind: CommandKind,
    /// The declared result row type. `Void` for writes and for reads whose
    /// rows are consumed untyped.
    pub result_type: DeclaredType,
}

impl OperationSpec {
    /// Build an operation descriptor.
    pub fn new(id: impl Into<String>, kind: CommandKind, result_type: DeclaredType) -> Self {
        OperationSpec {
            id: id.into(),
            kind,
            result_type,
        }
    }
}

/// Lookup surface for registered operations.
pub trait OperationRegistry: Send + Sync {
    /// Whether an operation is registered under the id.
    fn has_operation(&self, id: &str) -> bool;

    /// The operation descriptor for the id, if registered.
    fn operation(&self, id: &str) -> Option<Arc<OperationSpec>>;
}

/// In-memory operation registry.
#[derive(Debug, Default)]
pub struct MapOperationRegistry {
    operations: RwLock<FxHashMap<String, Arc<OperationSpec>>>,
}

impl MapOperationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        MapOperationRegistry::default()
    }

    /// Register an operation, replacing any previous registration of the
    /// same id.
    pub fn register(&self, spec: OperationSpec) {
        self.operations
            .write()
            .insert(spec.id.clone(), Arc::new(spec));
    }

    /// Build a registry from an iterator of operations.
    pub fn from_operations(specs: impl IntoIterator<Item = OperationSpec>) -> Self {
        let registry = MapOperationRegistry::new();
        for spec in specs {
            registry.register(spec);
        }
        registry
    }

    /// Registered ids, sorted, for diagnostics.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.operations.read().keys().cloned().collect();
        ids.sort_unstable();
        ids
    }
}

impl OperationRegistry for MapOperationRegistry {
    fn has_operation(&self, id: &str) -> bool {
        self.operations.read().contains_key(id)
    }

    fn operation(&self, id: &str) -> Option<Arc<OperationSpec>> {
        self.operations.read().get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_resolve() {
        let registry = MapOperationRegistry::new();
        registry.register(OperationSpec::new(
            "UserMapper.findById",
            CommandKind::Read,
            DeclaredType::bean("User"),
        ));

        assert!(registry.has_operation("UserMapper.findById"));
        assert!(!registry.has_operation("UserMapper.missing"));
        let spec = registry.operation("UserMapper.findById").unwrap();
        assert_eq!(spec.kind, CommandKind::Read);
        assert_eq!(spec.result_type, DeclaredType::bean("User"));
    }

    #[test]
    fn write_kind_classification() {
        assert!(CommandKind::Create.is_write());
        assert!(CommandKind::Update.is_write());
        assert!(CommandKind::Delete.is_write());
        assert!(!CommandKind::Read.is_write());
        assert!(!CommandKind::Flush.is_write());
    }
}
