//! rowbind-reflect — type metadata cache, property-path resolver, and
//! value-graph walker.
//!
//! This crate is the reflection half of rowbind. It knows nothing about
//! operations or executors; it answers two questions:
//!
//! - **What shape does a type have?** Hosts register a [`TypeSchema`] per
//!   bean type; [`TypeRegistry::describe`] memoizes one immutable
//!   [`TypeDescriptor`] per type name, process-wide, safe under concurrent
//!   first access.
//! - **What lives at this path?** [`PropertyPath`] tokenizes dotted/indexed
//!   expressions (`orders[0].items[1].name`) and [`MetaValue`] walks them
//!   against live [`Value`] graphs — typed beans, free-form mappings, and
//!   indexed sequences — reading, writing, and auto-creating missing
//!   intermediates via an [`ObjectFactory`].
//!
//! All errors are permanent programming or configuration errors, raised
//! synchronously at the call that detects them.

mod descriptor;
mod error;
mod factory;
mod meta;
mod path;
mod registry;
mod types;
mod value;

pub use descriptor::{PropertyDescriptor, TypeDescriptor, TypeSchema};
pub use error::ReflectError;
pub use factory::{DefaultObjectFactory, ObjectFactory};
pub use meta::MetaValue;
pub use path::{parse_index, PropertyPath, Segments};
pub use registry::TypeRegistry;
pub use types::DeclaredType;
pub use value::{Bean, MapValue, ObjectView, ObjectViewMut, Value, ValueKind};
