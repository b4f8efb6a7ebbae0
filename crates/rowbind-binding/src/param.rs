//! Named-parameter resolution.
//!
//! Every method gets a position→name table built once from its signature and
//! cached with the invocation plan. Designated non-data parameters (row
//! bounds, result handlers) are skipped entirely, so the table's position
//! sequence may have gaps; surviving entries are still numbered by their
//! ordinal among named parameters, not by original position.

use std::collections::BTreeMap;

use rowbind_reflect::{DeclaredType, MapValue, Value};

use crate::error::BindingError;
use crate::session::{BindingConfig, RowBounds};
use crate::signature::{MethodSignature, ParamType};

const GENERIC_NAME_PREFIX: &str = "param";

/// One actual argument. Data arguments carry a [`Value`]; the two designated
/// non-data kinds are extracted by position and never enter the table.
#[derive(Debug, Clone)]
pub enum Arg {
    /// A data argument.
    Value(Value),
    /// A pagination-control argument.
    Bounds(RowBounds),
    /// A result-handler marker; the handler itself is passed out-of-band
    /// since it needs a mutable borrow for the duration of the call.
    Handler,
}

impl Arg {
    /// A data argument.
    pub fn value(value: impl Into<Value>) -> Self {
        Arg::Value(value.into())
    }

    /// A pagination-control argument.
    pub fn bounds(bounds: RowBounds) -> Self {
        Arg::Bounds(bounds)
    }

    /// A result-handler marker argument.
    pub fn handler() -> Self {
        Arg::Handler
    }
}

/// The per-method position→name table, plus the per-position declared types
/// needed to decide how a bare collection argument is auto-wrapped.
#[derive(Debug, Clone)]
pub struct ParamNameResolver {
    names: BTreeMap<usize, String>,
    declared: BTreeMap<usize, DeclaredType>,
    has_explicit_name: bool,
    use_actual_param_name: bool,
}

impl ParamNameResolver {
    /// Build the table from a signature. Non-data parameters are skipped;
    /// each remaining parameter takes its explicit name, else (when
    /// configured) its declared source name, else its stringified ordinal
    /// among named parameters.
    pub fn new(signature: &MethodSignature, config: &BindingConfig) -> Self {
        let mut names = BTreeMap::new();
        let mut declared = BTreeMap::new();
        let mut has_explicit_name = false;

        for (position, spec) in signature.params.iter().enumerate() {
            let ParamType::Data(ty) = &spec.ty else {
                continue;
            };
            let name = match &spec.explicit_name {
                Some(explicit) => {
                    has_explicit_name = true;
                    explicit.clone()
                }
                None => {
                    let source = if config.use_actual_param_name {
                        spec.source_name.clone()
                    } else {
                        None
                    };
                    source.unwrap_or_else(|| names.len().to_string())
                }
            };
            declared.insert(position, ty.clone());
            names.insert(position, name);
        }

        ParamNameResolver {
            names,
            declared,
            has_explicit_name,
            use_actual_param_name: config.use_actual_param_name,
        }
    }

    /// The position→name table, keyed by original argument position.
    pub fn names(&self) -> &BTreeMap<usize, String> {
        &self.names
    }

    /// Whether any parameter carried an explicit name annotation.
    pub fn has_explicit_name(&self) -> bool {
        self.has_explicit_name
    }

    /// Convert an actual argument list into the single value submitted to
    /// the executor. Three mutually exclusive rules: no named parameters
    /// yields null; a single entry with no explicit name yields the bare
    /// value (auto-wrapped when it is a collection); anything else yields a
    /// named-parameter map with a generic `paramN` alias per entry.
    pub fn named_params(&self, args: &[Arg]) -> Result<Value, BindingError> {
        if self.names.is_empty() {
            return Ok(Value::Null);
        }

        if !self.has_explicit_name && self.names.len() == 1 {
            let (&position, name) = self
                .names
                .iter()
                .next()
                .ok_or(BindingError::ArgumentMismatch { position: 0 })?;
            let value = data_arg(args, position)?;
            let wrap_name = self.use_actual_param_name.then(|| name.as_str());
            return Ok(self.wrap_collection(value, position, wrap_name));
        }

        let mut params = MapValue::new();
        for (ordinal, (&position, name)) in self.names.iter().enumerate() {
            let value = data_arg(args, position)?;
            params.insert(name.clone(), value.clone());
            // Generic alias, unless it collides with an explicit name.
            let generic = format!("{GENERIC_NAME_PREFIX}{}", ordinal + 1);
            if !self.names.values().any(|n| *n == generic) {
                params.insert(generic, value);
            }
        }
        Ok(Value::Map(params))
    }

    /// Wrap a bare sequence argument so conventional keys can address it.
    /// The declared parameter type decides the spelling: array-declared
    /// parameters get `"array"`, everything sequence-shaped gets
    /// `"collection"` and `"list"`. The resolved name, when present, is added
    /// alongside.
    fn wrap_collection(&self, value: Value, position: usize, name: Option<&str>) -> Value {
        if !matches!(value, Value::Seq(_)) {
            return value;
        }
        let mut wrapped = MapValue::new();
        if matches!(self.declared.get(&position), Some(DeclaredType::Array(_))) {
            wrapped.insert("array".to_string(), value.clone());
        } else {
            wrapped.insert("collection".to_string(), value.clone());
            wrapped.insert("list".to_string(), value.clone());
        }
        if let Some(name) = name {
            wrapped.insert(name.to_string(), value);
        }
        Value::Map(wrapped)
    }
}

/// Strict lookup into a named-parameter object. A missing key is an error
/// that enumerates every key the object does contain.
pub fn param_value(params: &Value, name: &str) -> Result<Value, BindingError> {
    let available = match params {
        Value::Map(map) => {
            if let Some(found) = map.get(name) {
                return Ok(found.clone());
            }
            map.keys().cloned().collect()
        }
        _ => Vec::new(),
    };
    Err(BindingError::UnknownParam {
        name: name.to_string(),
        available,
    })
}

fn data_arg(args: &[Arg], position: usize) -> Result<Value, BindingError> {
    match args.get(position) {
        Some(Arg::Value(value)) => Ok(value.clone()),
        _ => Err(BindingError::ArgumentMismatch { position }),
    }
}
