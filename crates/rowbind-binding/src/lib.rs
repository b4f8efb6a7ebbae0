//! Dynamic mapper binding.
//!
//! Callers declare mapper interfaces as data, register named operations, and
//! invoke methods through cheap proxies; each call is routed to its
//! operation by naming convention, its arguments are normalized into a
//! single named-parameter value, and its result is coerced to the method's
//! declared return shape. Interceptors can be layered over any capability
//! surface without runtime code generation.
//!
//! The crate splits along the call path:
//!
//! - [`signature`]: mapper interfaces, methods, and formal parameters.
//! - [`registry`]: the named-operation registry.
//! - [`param`]: position→name tables and named-parameter binding.
//! - [`plan`]: cached per-method invocation plans and result coercion.
//! - [`mapper`]: proxy factories, proxies, and the mapper registry.
//! - [`session`]: the executor seam and the per-call service bundle.
//! - [`plugin`]: signature-set interception.

pub mod cursor;
pub mod error;
pub mod mapper;
pub mod param;
pub mod plan;
pub mod plugin;
pub mod registry;
pub mod session;
pub mod signature;

pub use cursor::Cursor;
pub use error::BindingError;
pub use mapper::{MapperProxy, MapperProxyFactory, MapperRegistry};
pub use param::{param_value, Arg, ParamNameResolver};
pub use plan::{InvocationPlan, MapperResult, ReturnShape};
pub use plugin::{wrap, Interceptor, InterceptorChain, Invocable, Invocation, Signature};
pub use registry::{CommandKind, MapOperationRegistry, OperationRegistry, OperationSpec};
pub use session::{BindingConfig, Executor, ResultHandler, RowBounds, Session};
pub use signature::{MapperInterface, MethodSignature, ParamSpec, ParamType};
