//! Errors raised by the binding layer.
//!
//! Everything here is a permanent programming or configuration error. The
//! `Reflect` arm converts via `#[from]`, so reflection failures cross the
//! dispatch boundary as their original kind instead of gaining a wrapping
//! layer.

use thiserror::Error;

use rowbind_reflect::ReflectError;

/// Errors produced by signatures, parameter binding, plan resolution, and
/// dispatch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindingError {
    /// No registered operation matched the method, on the declaring
    /// interface or any super-interface, and the method is not flush-marked.
    #[error("invalid bound operation (not found): {interface}.{method}")]
    UnboundOperation {
        /// The mapper interface name.
        interface: String,
        /// The method name.
        method: String,
    },

    /// A mapper interface was requested from a registry that does not know
    /// it.
    #[error("mapper interface '{interface}' is not registered")]
    UnknownMapper {
        /// The mapper interface name.
        interface: String,
    },

    /// The invoked method is not declared on the interface or its parents.
    #[error("no such method '{method}' on mapper interface '{interface}'")]
    NoSuchMethod {
        /// The mapper interface name.
        interface: String,
        /// The method name.
        method: String,
    },

    /// A designated non-data parameter type appears more than once in one
    /// signature. Detected when the plan is built, not at call time.
    #[error("method '{method}' cannot have multiple {kind} parameters")]
    DuplicateSpecialParam {
        /// The method name.
        method: String,
        /// "row bounds" or "result handler".
        kind: &'static str,
    },

    /// A write-kind method declares a return type that a row count cannot
    /// be coerced into.
    #[error("method '{method}' has an unsupported return type for a row count: {declared}")]
    UnsupportedRowCountType {
        /// The method name.
        method: String,
        /// Display form of the declared return type.
        declared: String,
    },

    /// A null result for a primitive (non-nullable) declared return type.
    #[error(
        "method '{method}' attempted to return null from a method with a primitive return type ({declared})"
    )]
    NullForPrimitive {
        /// The method name.
        method: String,
        /// Display form of the declared return type.
        declared: String,
    },

    /// A result-handler method is bound to an operation whose declared
    /// result type is void.
    #[error(
        "method '{method}' needs a declared result type so a result handler can be used as a parameter"
    )]
    HandlerNeedsRowType {
        /// The method name.
        method: String,
    },

    /// A method that declares a result-handler parameter also declares a
    /// return type. Rows go to the handler, so the method must be void.
    #[error(
        "method '{method}' declares a result handler parameter and must return void, not {declared}"
    )]
    HandlerWithReturnType {
        /// The method name.
        method: String,
        /// Display form of the declared return type.
        declared: String,
    },

    /// A result-handler method was invoked without supplying a handler.
    #[error("method '{method}' requires a result handler argument")]
    MissingHandler {
        /// The method name.
        method: String,
    },

    /// A named-parameter object was asked for a key it does not contain.
    #[error("parameter '{name}' not found. Available parameters are [{}]", available.join(", "))]
    UnknownParam {
        /// The requested key.
        name: String,
        /// Every key the object does contain, sorted.
        available: Vec<String>,
    },

    /// An argument list does not line up with the method's formal
    /// parameters.
    #[error("no argument supplied for parameter position {position}")]
    ArgumentMismatch {
        /// The original formal-parameter position.
        position: usize,
    },

    /// The caller unwrapped the wrong arm of a mapper result.
    #[error("unexpected mapper result: expected {expected}")]
    UnexpectedResult {
        /// "value" or "cursor".
        expected: &'static str,
    },

    /// A failure reported by the external execution entry point.
    #[error("execution failed: {0}")]
    Execution(String),

    /// A reflection failure, surfaced with its original kind.
    #[error(transparent)]
    Reflect(#[from] ReflectError),
}
