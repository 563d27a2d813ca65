//! Resolver traits for service resolution.

use std::any::TypeId;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::key::Key;
use crate::registration::AnyArc;
use crate::traits::Dispose;

/// Core resolver trait for key-based service resolution.
///
/// This is the untyped layer: it honours lifetimes, detects cycles and routes
/// disposal hooks. Most callers use the generic methods on [`Resolver`]
/// instead, which are built on top of this trait.
pub trait ResolverCore {
    /// Resolves the instance registered under `key`.
    ///
    /// # Returns
    ///
    /// * `Ok(AnyArc)` - The resolved service wrapped in `Arc<dyn Any>`
    /// * `Err(DiError)` - Resolution error (not found, no active scope, circular, provider failure, etc.)
    fn get_instance(&self, key: &Key) -> DiResult<AnyArc>;

    /// Registers a disposal hook with the scope or injector that owns the
    /// instance currently being constructed.
    fn push_disposer(&self, f: Box<dyn FnOnce() + Send>);
}

/// High-level resolver interface with generic methods for type-safe service resolution.
///
/// Implemented by [`Injector`](crate::Injector), which resolves with a fresh
/// scopeless context per call, and by [`InjectionContext`](crate::InjectionContext),
/// which resolves against its own scope stack. A [`ScopeGuard`](crate::ScopeGuard)
/// derefs to its context, so it resolves the same way.
///
/// # Examples
///
/// ```
/// use lifestyle_di::{ServiceCollection, Resolver};
/// use std::sync::Arc;
///
/// trait Logger: Send + Sync {
///     fn log(&self, msg: &str) -> String;
/// }
///
/// struct ConsoleLogger;
/// impl Logger for ConsoleLogger {
///     fn log(&self, msg: &str) -> String {
///         format!("LOG: {}", msg)
///     }
/// }
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton(42usize);
/// services.add_singleton_trait(Arc::new(ConsoleLogger) as Arc<dyn Logger>);
///
/// let injector = services.build();
///
/// let number = injector.get_required::<usize>();
/// assert_eq!(*number, 42);
///
/// let logger = injector.get_required_trait::<dyn Logger>();
/// assert_eq!(logger.log("ready"), "LOG: ready");
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves a concrete service type.
    ///
    /// ```
    /// use lifestyle_di::{ServiceCollection, Resolver};
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_singleton("configuration".to_string());
    ///
    /// let injector = services.build();
    /// let config = injector.get::<String>().unwrap();
    /// assert_eq!(&*config, "configuration");
    /// ```
    fn get<T: 'static + Send + Sync>(&self) -> DiResult<Arc<T>> {
        let key = Key::Type(TypeId::of::<T>(), std::any::type_name::<T>());
        downcast_value(self.get_instance(&key)?)
    }

    /// Resolves a trait object.
    ///
    /// ```
    /// use lifestyle_di::{ServiceCollection, Resolver};
    /// use std::sync::Arc;
    ///
    /// trait Fetcher: Send + Sync {
    ///     fn fetch(&self) -> &str;
    /// }
    ///
    /// struct MemoryFetcher;
    /// impl Fetcher for MemoryFetcher {
    ///     fn fetch(&self) -> &str { "memory" }
    /// }
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_scoped_trait_factory::<dyn Fetcher, _>(|_| Ok(Arc::new(MemoryFetcher)));
    ///
    /// let injector = services.build();
    /// let ctx = injector.create_context();
    /// let scope = ctx.create_scope();
    /// assert_eq!(scope.get_trait::<dyn Fetcher>().unwrap().fetch(), "memory");
    /// ```
    fn get_trait<T: ?Sized + 'static + Send + Sync>(&self) -> DiResult<Arc<T>> {
        let key = Key::Trait(std::any::type_name::<T>());
        downcast_trait(self.get_instance(&key)?)
    }

    /// Resolves a concrete value registered under a symbol key.
    fn get_named<T: 'static + Send + Sync>(&self, name: &'static str) -> DiResult<Arc<T>> {
        downcast_value(self.get_instance(&Key::Symbol(name))?)
    }

    /// Resolves a trait object registered under a symbol key.
    fn get_named_trait<T: ?Sized + 'static + Send + Sync>(&self, name: &'static str) -> DiResult<Arc<T>> {
        downcast_trait(self.get_instance(&Key::Symbol(name))?)
    }

    /// Resolves a concrete service type, panicking on failure.
    ///
    /// # Panics
    ///
    /// Panics if the service cannot be resolved (not found, no active scope,
    /// circular dependency, provider failure, etc.).
    fn get_required<T: 'static + Send + Sync>(&self) -> Arc<T> {
        self.get::<T>()
            .unwrap_or_else(|e| panic!("Failed to resolve {}: {}", std::any::type_name::<T>(), e))
    }

    /// Resolves a trait object, panicking on failure.
    fn get_required_trait<T: ?Sized + 'static + Send + Sync>(&self) -> Arc<T> {
        self.get_trait::<T>()
            .unwrap_or_else(|e| panic!("Failed to resolve trait {}: {}", std::any::type_name::<T>(), e))
    }

    /// Resolves a named concrete service, panicking on failure.
    fn get_named_required<T: 'static + Send + Sync>(&self, name: &'static str) -> Arc<T> {
        self.get_named::<T>(name)
            .unwrap_or_else(|e| panic!("Failed to resolve named {} ({}): {}", std::any::type_name::<T>(), name, e))
    }

    /// Resolves a named trait object, panicking on failure.
    fn get_named_trait_required<T: ?Sized + 'static + Send + Sync>(&self, name: &'static str) -> Arc<T> {
        self.get_named_trait::<T>(name).unwrap_or_else(|e| {
            panic!("Failed to resolve named trait {} ({}): {}", std::any::type_name::<T>(), name, e)
        })
    }

    /// Registers a service for disposal.
    ///
    /// Call this from providers. The hook belongs to the scope that is open
    /// while the service is constructed, or to the injector for singletons
    /// and for anything built outside a scope. Hooks run in LIFO order.
    fn register_disposer<T: Dispose>(&self, service: Arc<T>) {
        self.push_disposer(Box::new(move || service.dispose()));
    }
}

// Concrete values are stored as Arc<T>
fn downcast_value<T: 'static + Send + Sync>(any: AnyArc) -> DiResult<Arc<T>> {
    any.downcast::<T>()
        .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
}

// Trait objects are stored as Arc<Arc<dyn Trait>>
fn downcast_trait<T: ?Sized + 'static + Send + Sync>(any: AnyArc) -> DiResult<Arc<T>> {
    any.downcast::<Arc<T>>()
        .map(|boxed| (*boxed).clone())
        .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
}
