//! Interception.
//!
//! Interceptors observe calls on a target through an explicit capability
//! model: a target names the capability types it exposes, an interceptor
//! declares the (capability, method) signatures it wants, and [`wrap`]
//! produces a forwarding decorator covering exactly the intersection. No
//! runtime code generation is involved; dispatch is a signature-set lookup
//! per call. When the intersection is empty, the original target is returned
//! untouched, so uninterested interceptors cost nothing.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use rowbind_reflect::Value;

use crate::error::BindingError;

/// One (capability-type, method) pair an interceptor wants to observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature {
    /// The declaring capability type name.
    pub capability: &'static str,
    /// The method name within that capability.
    pub method: &'static str,
}

impl Signature {
    /// Build a signature.
    pub fn new(capability: &'static str, method: &'static str) -> Self {
        Signature { capability, method }
    }
}

/// A value whose methods can be diverted. Targets name their full capability
/// hierarchy, not just the most specific type, and dispatch calls by
/// capability and method name.
pub trait Invocable: Send + Sync {
    /// Every capability type this value exposes.
    fn capabilities(&self) -> Vec<&'static str>;

    /// Dispatch one method call.
    fn call(&self, capability: &str, method: &str, args: &[Value]) -> Result<Value, BindingError>;
}

/// The opaque token handed to an interceptor: the real target plus the call
/// being made. The call reaches the target only if the interceptor
/// explicitly proceeds.
pub struct Invocation<'a> {
    target: &'a dyn Invocable,
    capability: &'a str,
    method: &'a str,
    args: Vec<Value>,
}

impl<'a> Invocation<'a> {
    /// Build an invocation token.
    pub fn new(
        target: &'a dyn Invocable,
        capability: &'a str,
        method: &'a str,
        args: Vec<Value>,
    ) -> Self {
        Invocation {
            target,
            capability,
            method,
            args,
        }
    }

    /// The real target.
    pub fn target(&self) -> &dyn Invocable {
        self.target
    }

    /// The capability type the call was made through.
    pub fn capability(&self) -> &str {
        self.capability
    }

    /// The method being called.
    pub fn method(&self) -> &str {
        self.method
    }

    /// The call arguments.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Mutable access to the call arguments, for interceptors that rewrite
    /// them before proceeding.
    pub fn args_mut(&mut self) -> &mut Vec<Value> {
        &mut self.args
    }

    /// Continue the call into the target (or the next decorator inward).
    pub fn proceed(&self) -> Result<Value, BindingError> {
        self.target.call(self.capability, self.method, &self.args)
    }
}

/// User-supplied interception logic.
pub trait Interceptor: Send + Sync {
    /// The signatures this interceptor wants to observe. Read once, at wrap
    /// time.
    fn signatures(&self) -> Vec<Signature>;

    /// Observe (and optionally alter or short-circuit) one matching call.
    fn intercept(&self, invocation: Invocation<'_>) -> Result<Value, BindingError>;
}

struct Plugin {
    target: Arc<dyn Invocable>,
    interceptor: Arc<dyn Interceptor>,
    signatures: FxHashMap<&'static str, FxHashSet<&'static str>>,
    exposed: Vec<&'static str>,
}

impl Invocable for Plugin {
    fn capabilities(&self) -> Vec<&'static str> {
        self.exposed.clone()
    }

    fn call(&self, capability: &str, method: &str, args: &[Value]) -> Result<Value, BindingError> {
        let diverted = self
            .signatures
            .get(capability)
            .is_some_and(|methods| methods.contains(method));
        if diverted {
            return self.interceptor.intercept(Invocation::new(
                &*self.target,
                capability,
                method,
                args.to_vec(),
            ));
        }
        self.target.call(capability, method, args)
    }
}

/// Wrap a target with one interceptor. The decorator exposes exactly the
/// capability types shared by the target and the interceptor's declared
/// signatures; if there are none, the original target is returned unchanged.
pub fn wrap(target: Arc<dyn Invocable>, interceptor: Arc<dyn Interceptor>) -> Arc<dyn Invocable> {
    let mut signatures: FxHashMap<&'static str, FxHashSet<&'static str>> = FxHashMap::default();
    for signature in interceptor.signatures() {
        signatures
            .entry(signature.capability)
            .or_default()
            .insert(signature.method);
    }

    let exposed: Vec<&'static str> = target
        .capabilities()
        .into_iter()
        .filter(|capability| signatures.contains_key(capability))
        .collect();
    if exposed.is_empty() {
        return target;
    }

    Arc::new(Plugin {
        target,
        interceptor,
        signatures,
        exposed,
    })
}

/// An ordered collection of interceptors, applied by repeated wrapping. The
/// last interceptor added ends up outermost, so it observes every matching
/// call first.
#[derive(Default)]
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl InterceptorChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        InterceptorChain::default()
    }

    /// Append an interceptor.
    pub fn add(&mut self, interceptor: Arc<dyn Interceptor>) {
        self.interceptors.push(interceptor);
    }

    /// Wrap a target with every interceptor, in order.
    pub fn plugin_all(&self, target: Arc<dyn Invocable>) -> Arc<dyn Invocable> {
        self.interceptors
            .iter()
            .fold(target, |wrapped, interceptor| {
                wrap(wrapped, Arc::clone(interceptor))
            })
    }

    /// The number of interceptors in the chain.
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    /// Whether the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    struct Echo;

    impl Invocable for Echo {
        fn capabilities(&self) -> Vec<&'static str> {
            vec!["Executor", "Closeable"]
        }

        fn call(&self, _: &str, method: &str, args: &[Value]) -> Result<Value, BindingError> {
            Ok(Value::Str(format!("{method}/{}", args.len())))
        }
    }

    struct Tagger {
        tag: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Interceptor for Tagger {
        fn signatures(&self) -> Vec<Signature> {
            vec![Signature::new("Executor", "update")]
        }

        fn intercept(&self, invocation: Invocation<'_>) -> Result<Value, BindingError> {
            self.log.lock().push(self.tag);
            invocation.proceed()
        }
    }

    struct Uninterested;

    impl Interceptor for Uninterested {
        fn signatures(&self) -> Vec<Signature> {
            vec![Signature::new("SomethingElse", "run")]
        }

        fn intercept(&self, invocation: Invocation<'_>) -> Result<Value, BindingError> {
            invocation.proceed()
        }
    }

    #[test]
    fn empty_intersection_returns_the_original_target() {
        let target: Arc<dyn Invocable> = Arc::new(Echo);
        let wrapped = wrap(Arc::clone(&target), Arc::new(Uninterested));
        assert!(Arc::ptr_eq(&target, &wrapped));
    }

    #[test]
    fn matching_calls_are_diverted_and_others_pass_through() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let wrapped = wrap(
            Arc::new(Echo),
            Arc::new(Tagger {
                tag: "A",
                log: Arc::clone(&log),
            }),
        );

        assert_eq!(wrapped.capabilities(), vec!["Executor"]);
        assert_eq!(
            wrapped.call("Executor", "update", &[Value::Int(1)]).unwrap(),
            Value::Str("update/1".into())
        );
        assert_eq!(
            wrapped.call("Executor", "query", &[]).unwrap(),
            Value::Str("query/0".into())
        );
        assert_eq!(*log.lock(), vec!["A"]);
    }

    #[test]
    fn outermost_applied_observes_first() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut chain = InterceptorChain::new();
        for tag in ["A", "B", "C"] {
            chain.add(Arc::new(Tagger {
                tag,
                log: Arc::clone(&log),
            }));
        }

        let wrapped = chain.plugin_all(Arc::new(Echo));
        wrapped.call("Executor", "update", &[]).unwrap();
        assert_eq!(*log.lock(), vec!["C", "B", "A"]);
    }
}
