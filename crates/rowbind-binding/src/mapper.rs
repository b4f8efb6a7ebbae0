//! Mapper proxies.
//!
//! A [`MapperProxyFactory`] exists per interface and owns the shared
//! method→plan cache. Proxies produced by [`MapperProxyFactory::bind`] are
//! cheap and short-lived: they hold the factory and a session, nothing else.
//! Plan publication follows the compute-if-absent discipline: concurrent
//! first calls may build the same plan twice, but exactly one `Arc` wins the
//! cache and every caller ends up sharing it.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use rowbind_reflect::Value;

use crate::cursor::Cursor;
use crate::error::BindingError;
use crate::param::Arg;
use crate::plan::InvocationPlan;
use crate::session::{ResultHandler, Session};
use crate::signature::MapperInterface;

/// Per-interface factory owning the shared invocation-plan cache.
#[derive(Debug)]
pub struct MapperProxyFactory {
    interface: Arc<MapperInterface>,
    plans: DashMap<String, Arc<InvocationPlan>>,
}

impl MapperProxyFactory {
    /// Create a factory for one interface.
    pub fn new(interface: Arc<MapperInterface>) -> Self {
        MapperProxyFactory {
            interface,
            plans: DashMap::new(),
        }
    }

    /// The interface this factory serves.
    pub fn interface(&self) -> &Arc<MapperInterface> {
        &self.interface
    }

    /// Produce a proxy bound to the given session.
    pub fn bind(self: &Arc<Self>, session: Session) -> MapperProxy {
        MapperProxy {
            factory: Arc::clone(self),
            session,
        }
    }

    /// Resolve the cached plan for a method, building it on first use.
    pub fn plan(
        &self,
        method: &str,
        session: &Session,
    ) -> Result<Arc<InvocationPlan>, BindingError> {
        if let Some(found) = self.plans.get(method) {
            return Ok(Arc::clone(found.value()));
        }
        let built = Arc::new(InvocationPlan::build(&self.interface, method, session)?);
        // Another thread may have published meanwhile; its entry wins.
        let published = self
            .plans
            .entry(method.to_string())
            .or_insert(built)
            .value()
            .clone();
        Ok(published)
    }

    /// Method names with a cached plan, sorted.
    pub fn cached_methods(&self) -> Vec<String> {
        let mut names: Vec<String> = self.plans.iter().map(|e| e.key().clone()).collect();
        names.sort_unstable();
        names
    }
}

/// A callable view of one mapper interface, bound to one session.
#[derive(Clone)]
pub struct MapperProxy {
    factory: Arc<MapperProxyFactory>,
    session: Session,
}

impl MapperProxy {
    /// The session this proxy submits through.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The interface this proxy exposes.
    pub fn interface(&self) -> &MapperInterface {
        &self.factory.interface
    }

    /// Invoke a method expected to produce a plain value. Default (concrete)
    /// methods dispatch to their own implementation and never touch the
    /// operation registry.
    pub fn invoke(&self, method: &str, args: &[Arg]) -> Result<Value, BindingError> {
        if let Some(signature) = self.factory.interface.find_method(method) {
            if let Some(body) = &signature.default_impl {
                return body(self, args);
            }
        }
        let plan = self.factory.plan(method, &self.session)?;
        plan.execute(&self.session, args, None)?.into_value()
    }

    /// Invoke a lazy-stream method, handing back the live cursor.
    pub fn invoke_cursor(&self, method: &str, args: &[Arg]) -> Result<Cursor, BindingError> {
        let plan = self.factory.plan(method, &self.session)?;
        plan.execute(&self.session, args, None)?.into_cursor()
    }

    /// Invoke a handler-shaped method, pushing every row through the
    /// caller's handler.
    pub fn invoke_with_handler(
        &self,
        method: &str,
        args: &[Arg],
        handler: &mut dyn ResultHandler,
    ) -> Result<(), BindingError> {
        let plan = self.factory.plan(method, &self.session)?;
        plan.execute(&self.session, args, Some(handler))?;
        Ok(())
    }
}

impl std::fmt::Debug for MapperProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapperProxy")
            .field("interface", &self.factory.interface.name)
            .finish_non_exhaustive()
    }
}

/// All known mapper interfaces, each behind its factory.
#[derive(Debug, Default)]
pub struct MapperRegistry {
    factories: RwLock<FxHashMap<String, Arc<MapperProxyFactory>>>,
}

impl MapperRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        MapperRegistry::default()
    }

    /// Register an interface, replacing any previous registration of the
    /// same name.
    pub fn add_mapper(&self, interface: Arc<MapperInterface>) {
        let factory = Arc::new(MapperProxyFactory::new(Arc::clone(&interface)));
        self.factories.write().insert(interface.name.clone(), factory);
    }

    /// Whether an interface is registered under the name.
    pub fn has_mapper(&self, name: &str) -> bool {
        self.factories.read().contains_key(name)
    }

    /// Bind a proxy for a registered interface.
    pub fn mapper(&self, name: &str, session: Session) -> Result<MapperProxy, BindingError> {
        let factory = self
            .factories
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| BindingError::UnknownMapper {
                interface: name.to_string(),
            })?;
        Ok(factory.bind(session))
    }

    /// Registered interface names, sorted.
    pub fn mapper_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }
}
