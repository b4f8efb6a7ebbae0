//! Invocation plans.
//!
//! A plan is everything knowable about a mapper method before any call is
//! made: the operation it is bound to, the command kind, the parameter name
//! table, the positions of designated non-data parameters, and the declared
//! return shape. Plans are built once per method, published in a shared
//! cache, and treated as immutable afterwards.

use std::sync::Arc;

use rowbind_reflect::{DeclaredType, MapValue, MetaValue, Value};

use crate::cursor::Cursor;
use crate::error::BindingError;
use crate::param::{Arg, ParamNameResolver};
use crate::registry::{CommandKind, OperationRegistry};
use crate::session::{ResultHandler, RowBounds, Session};
use crate::signature::{MapperInterface, MethodSignature, ParamType};

/// How a read result is shaped into the declared return type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnShape {
    /// The result is discarded.
    Void,
    /// A single value, null allowed only for nullable declared types.
    Scalar,
    /// A single value where null is an expected outcome.
    Optional,
    /// A full row list, collected into a declared-type container.
    Many,
    /// Rows folded into a mapping keyed by a declared row property.
    MapByKey(String),
    /// A lazy row stream.
    Cursor,
    /// Rows pushed through a caller-supplied handler; nothing is returned.
    Handler,
}

/// What a dispatched call produces: a plain value for everything except
/// lazy-stream methods, which hand back the live cursor.
#[derive(Debug)]
pub enum MapperResult {
    /// The coerced return value.
    Value(Value),
    /// A live row stream.
    Cursor(Cursor),
}

impl MapperResult {
    /// Unwrap the value arm.
    pub fn into_value(self) -> Result<Value, BindingError> {
        match self {
            MapperResult::Value(value) => Ok(value),
            MapperResult::Cursor(_) => Err(BindingError::UnexpectedResult { expected: "value" }),
        }
    }

    /// Unwrap the cursor arm.
    pub fn into_cursor(self) -> Result<Cursor, BindingError> {
        match self {
            MapperResult::Cursor(cursor) => Ok(cursor),
            MapperResult::Value(_) => Err(BindingError::UnexpectedResult { expected: "cursor" }),
        }
    }
}

/// The cached per-method execution plan.
#[derive(Debug, Clone)]
pub struct InvocationPlan {
    operation_id: String,
    kind: CommandKind,
    signature: Arc<MethodSignature>,
    resolver: ParamNameResolver,
    shape: ReturnShape,
    row_bounds_position: Option<usize>,
    handler_position: Option<usize>,
}

impl InvocationPlan {
    /// Build the plan for one method. Operation resolution tries the
    /// declaring interface first, then its super-interfaces depth-first; a
    /// flush-marked method with no matching operation becomes a flush plan,
    /// anything else unresolved is permanent failure. Signature defects
    /// (duplicate designated parameters, a handler on a void-row operation)
    /// are caught here, before any call is made.
    pub fn build(
        interface: &MapperInterface,
        method_name: &str,
        session: &Session,
    ) -> Result<Self, BindingError> {
        let signature =
            interface
                .find_method(method_name)
                .ok_or_else(|| BindingError::NoSuchMethod {
                    interface: interface.name.clone(),
                    method: method_name.to_string(),
                })?;

        let (row_bounds_position, handler_position) = special_positions(&signature)?;

        let resolved = resolve_operation(interface, method_name, session.operations());
        let (operation_id, kind, result_type) = match resolved {
            Some(op) => (op.id.clone(), op.kind, Some(op.result_type.clone())),
            None if signature.flush => (
                format!("{}.{method_name}", interface.name),
                CommandKind::Flush,
                None,
            ),
            None => {
                return Err(BindingError::UnboundOperation {
                    interface: interface.name.clone(),
                    method: method_name.to_string(),
                })
            }
        };

        let shape = if handler_position.is_some() {
            if !signature.return_type.is_void() {
                return Err(BindingError::HandlerWithReturnType {
                    method: method_name.to_string(),
                    declared: signature.return_type.display_name(),
                });
            }
            let row_type = result_type.unwrap_or(DeclaredType::Void);
            if row_type.is_void() {
                return Err(BindingError::HandlerNeedsRowType {
                    method: method_name.to_string(),
                });
            }
            ReturnShape::Handler
        } else {
            classify_return(&signature)
        };

        let resolver = ParamNameResolver::new(&signature, session.config());

        Ok(InvocationPlan {
            operation_id,
            kind,
            signature,
            resolver,
            shape,
            row_bounds_position,
            handler_position,
        })
    }

    /// The resolved operation id, `Interface.method`.
    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    /// The resolved command kind.
    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    /// The declared return shape.
    pub fn shape(&self) -> &ReturnShape {
        &self.shape
    }

    /// The method signature this plan was built from.
    pub fn signature(&self) -> &MethodSignature {
        &self.signature
    }

    /// The cached parameter name table.
    pub fn resolver(&self) -> &ParamNameResolver {
        &self.resolver
    }

    /// Run the plan against a session. The handler argument is only consulted
    /// for handler-shaped methods; it is passed out-of-band because it needs
    /// a mutable borrow for the duration of the call.
    pub fn execute(
        &self,
        session: &Session,
        args: &[Arg],
        handler: Option<&mut dyn ResultHandler>,
    ) -> Result<MapperResult, BindingError> {
        match self.kind {
            CommandKind::Flush => {
                let count = session.executor().flush()?;
                self.row_count_result(count).map(MapperResult::Value)
            }
            CommandKind::Create | CommandKind::Update | CommandKind::Delete => {
                let params = self.resolver.named_params(args)?;
                let count = session.executor().update(&self.operation_id, &params)?;
                self.row_count_result(count).map(MapperResult::Value)
            }
            CommandKind::Read => self.execute_read(session, args, handler),
        }
    }

    fn execute_read(
        &self,
        session: &Session,
        args: &[Arg],
        handler: Option<&mut dyn ResultHandler>,
    ) -> Result<MapperResult, BindingError> {
        let params = self.resolver.named_params(args)?;
        let bounds = self.row_bounds(args);
        let executor = session.executor();

        match &self.shape {
            ReturnShape::Handler => {
                // The argument list must carry the handler marker at the
                // recorded position, like any other formal parameter.
                if let Some(position) = self.handler_position {
                    if !matches!(args.get(position), Some(Arg::Handler)) {
                        return Err(BindingError::ArgumentMismatch { position });
                    }
                }
                let handler = handler.ok_or_else(|| BindingError::MissingHandler {
                    method: self.signature.name.clone(),
                })?;
                executor.query_with_handler(&self.operation_id, &params, bounds, handler)?;
                Ok(MapperResult::Value(Value::Null))
            }
            ReturnShape::Cursor => {
                let cursor = executor.query_cursor(&self.operation_id, &params, bounds)?;
                Ok(MapperResult::Cursor(cursor))
            }
            ReturnShape::Many => {
                let rows = executor.query(&self.operation_id, &params, bounds)?;
                let mut container = session.factory().create(&self.signature.return_type)?;
                match &mut container {
                    Value::Seq(items) => items.extend(rows),
                    _ => {
                        return Err(BindingError::UnexpectedResult { expected: "value" });
                    }
                }
                Ok(MapperResult::Value(container))
            }
            ReturnShape::MapByKey(key) => {
                let rows = executor.query(&self.operation_id, &params, bounds)?;
                let meta = MetaValue::new(session.types(), session.factory());
                let mut keyed = MapValue::new();
                for row in rows {
                    let key_value = meta.get(&row, key)?;
                    keyed.insert(key_value.as_key_string(), row);
                }
                Ok(MapperResult::Value(Value::Map(keyed)))
            }
            ReturnShape::Void => {
                executor.query_one(&self.operation_id, &params)?;
                Ok(MapperResult::Value(Value::Null))
            }
            ReturnShape::Optional => {
                let value = executor.query_one(&self.operation_id, &params)?;
                Ok(MapperResult::Value(value))
            }
            ReturnShape::Scalar => {
                let value = executor.query_one(&self.operation_id, &params)?;
                if value == Value::Null && self.signature.return_type.is_primitive() {
                    return Err(BindingError::NullForPrimitive {
                        method: self.signature.name.clone(),
                        declared: self.signature.return_type.display_name(),
                    });
                }
                Ok(MapperResult::Value(value))
            }
        }
    }

    /// Coerce a write-kind row count into the declared return type: count
    /// passthrough, boolean "any rows affected", or void discard.
    fn row_count_result(&self, count: i64) -> Result<Value, BindingError> {
        match self.signature.return_type {
            DeclaredType::Void => Ok(Value::Null),
            DeclaredType::Int | DeclaredType::Long => Ok(Value::Int(count)),
            DeclaredType::Bool => Ok(Value::Bool(count > 0)),
            ref other => Err(BindingError::UnsupportedRowCountType {
                method: self.signature.name.clone(),
                declared: other.display_name(),
            }),
        }
    }

    fn row_bounds(&self, args: &[Arg]) -> RowBounds {
        let position = match self.row_bounds_position {
            Some(position) => position,
            None => return RowBounds::DEFAULT,
        };
        match args.get(position) {
            Some(Arg::Bounds(bounds)) => *bounds,
            _ => RowBounds::DEFAULT,
        }
    }
}

/// Walk the interface and its super-interfaces, depth-first, for a
/// registered operation named `Interface.method`.
fn resolve_operation(
    interface: &MapperInterface,
    method_name: &str,
    operations: &dyn OperationRegistry,
) -> Option<Arc<crate::registry::OperationSpec>> {
    let id = format!("{}.{method_name}", interface.name);
    if let Some(op) = operations.operation(&id) {
        return Some(op);
    }
    interface
        .parents()
        .iter()
        .find_map(|parent| resolve_operation(parent, method_name, operations))
}

/// Locate the designated non-data parameters, rejecting duplicates.
fn special_positions(
    signature: &MethodSignature,
) -> Result<(Option<usize>, Option<usize>), BindingError> {
    let mut row_bounds = None;
    let mut handler = None;
    for (position, spec) in signature.params.iter().enumerate() {
        match spec.ty {
            ParamType::RowBounds => {
                if row_bounds.replace(position).is_some() {
                    return Err(BindingError::DuplicateSpecialParam {
                        method: signature.name.clone(),
                        kind: "row bounds",
                    });
                }
            }
            ParamType::ResultHandler => {
                if handler.replace(position).is_some() {
                    return Err(BindingError::DuplicateSpecialParam {
                        method: signature.name.clone(),
                        kind: "result handler",
                    });
                }
            }
            ParamType::Data(_) => {}
        }
    }
    Ok((row_bounds, handler))
}

fn classify_return(signature: &MethodSignature) -> ReturnShape {
    if let Some(key) = &signature.map_key {
        return ReturnShape::MapByKey(key.clone());
    }
    match signature.return_type {
        DeclaredType::Void => ReturnShape::Void,
        DeclaredType::Cursor(_) => ReturnShape::Cursor,
        DeclaredType::List(_) | DeclaredType::Array(_) => ReturnShape::Many,
        DeclaredType::Optional(_) => ReturnShape::Optional,
        _ => ReturnShape::Scalar,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::ParamSpec;

    fn sig(name: &str) -> MethodSignature {
        MethodSignature::new(name)
    }

    #[test]
    fn return_shapes_follow_declared_types() {
        assert_eq!(classify_return(&sig("a")), ReturnShape::Void);
        assert_eq!(
            classify_return(&sig("a").returns(DeclaredType::list(DeclaredType::Any))),
            ReturnShape::Many
        );
        assert_eq!(
            classify_return(&sig("a").returns(DeclaredType::array(DeclaredType::Int))),
            ReturnShape::Many
        );
        assert_eq!(
            classify_return(&sig("a").returns(DeclaredType::cursor(DeclaredType::Any))),
            ReturnShape::Cursor
        );
        assert_eq!(
            classify_return(&sig("a").returns(DeclaredType::optional(DeclaredType::Int))),
            ReturnShape::Optional
        );
        assert_eq!(
            classify_return(&sig("a").returns(DeclaredType::Long)),
            ReturnShape::Scalar
        );
        assert_eq!(
            classify_return(
                &sig("a")
                    .returns(DeclaredType::map_of(DeclaredType::Any))
                    .keyed_by("id")
            ),
            ReturnShape::MapByKey("id".to_string())
        );
    }

    #[test]
    fn duplicate_designated_parameters_are_rejected() {
        let double_bounds = sig("page")
            .param(ParamSpec::row_bounds())
            .param(ParamSpec::row_bounds());
        assert!(matches!(
            special_positions(&double_bounds),
            Err(BindingError::DuplicateSpecialParam {
                kind: "row bounds",
                ..
            })
        ));

        let double_handler = sig("stream")
            .param(ParamSpec::result_handler())
            .param(ParamSpec::result_handler());
        assert!(matches!(
            special_positions(&double_handler),
            Err(BindingError::DuplicateSpecialParam {
                kind: "result handler",
                ..
            })
        ));
    }
}
