//! The frozen injector and its resolution contexts.
//!
//! An [`Injector`] is what `ServiceCollection::build()` produces: the
//! registry, the singleton cache and the root disposal hooks, shared behind an
//! `Arc`. Scoped state lives in [`InjectionContext`]s created from it.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::InjectorOptions;
use crate::descriptors::ServiceDescriptor;
use crate::internal::DisposeBag;
use crate::observer::Observers;
use crate::registration::{AnyArc, Registry};
use crate::singletons::SingletonCache;
use crate::traits::{Resolver, ResolverCore};
use crate::{DiResult, Key};

pub mod context;
pub mod scope;

pub use context::InjectionContext;
pub use scope::ScopeGuard;

/// Root of a built container.
///
/// The injector is cheap to clone and can be shared across threads. It owns
/// the singletons; it does not own any scope. Resolving directly through the
/// injector uses a throwaway context with no open scope, so `Scoped` services
/// fail with [`DiError::NoActiveScope`](crate::DiError::NoActiveScope) there.
/// Code that needs scopes creates a context first.
///
/// # Examples
///
/// ```
/// use lifestyle_di::{ServiceCollection, Resolver};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct UserService { db: Arc<Database> }
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton(Database { url: "postgres://localhost".to_string() });
/// services.add_per_request_factory::<UserService, _>(|ctx| {
///     Ok(UserService { db: ctx.get::<Database>()? })
/// });
///
/// let injector = services.build();
/// let user_service = injector.get_required::<UserService>();
/// assert_eq!(user_service.db.url, "postgres://localhost");
///
/// let worker = injector.clone();
/// std::thread::spawn(move || {
///     let ctx = worker.create_context();
///     assert!(Arc::ptr_eq(&ctx.get_required::<Database>(), &user_service.db));
/// })
/// .join()
/// .unwrap();
/// ```
#[derive(Clone)]
pub struct Injector {
    inner: Arc<InjectorInner>,
}

pub(crate) struct InjectorInner {
    pub(crate) registry: Registry,
    pub(crate) singletons: SingletonCache,
    pub(crate) root_disposers: Mutex<DisposeBag>,
    pub(crate) observers: Observers,
    pub(crate) options: InjectorOptions,
}

impl Injector {
    pub(crate) fn new(registry: Registry, observers: Observers, options: InjectorOptions) -> Self {
        let singletons = SingletonCache::for_registry(&registry);
        tracing::debug!(
            services = registry.len(),
            max_depth = options.max_depth,
            "injector built"
        );
        Self {
            inner: Arc::new(InjectorInner {
                registry,
                singletons,
                root_disposers: Mutex::new(DisposeBag::default()),
                observers,
                options,
            }),
        }
    }

    #[inline]
    pub(crate) fn inner(&self) -> &InjectorInner {
        &self.inner
    }

    /// Creates a resolution context with an empty scope stack.
    pub fn create_context(&self) -> InjectionContext {
        InjectionContext::new(self.clone())
    }

    /// Whether `key` is registered.
    pub fn contains(&self, key: &Key) -> bool {
        self.inner.registry.contains_key(key)
    }

    /// Whether the singleton under `key` has been constructed.
    pub fn is_singleton_created(&self, key: &Key) -> bool {
        self.inner.singletons.is_created(key)
    }

    /// Registrations in registration order.
    pub fn descriptors(&self) -> Vec<ServiceDescriptor> {
        self.inner
            .registry
            .iter()
            .map(|(key, reg)| ServiceDescriptor::new(key, reg))
            .collect()
    }

    pub fn options(&self) -> &InjectorOptions {
        &self.inner.options
    }

    /// Runs the root disposal hooks in LIFO order.
    ///
    /// Root hooks are those registered while constructing singletons, or
    /// while no scope was open. Cached singletons stay cached; only the
    /// hooks are consumed, so calling this twice runs each hook once.
    ///
    /// ```
    /// use lifestyle_di::{Dispose, ServiceCollection, Resolver};
    /// use std::sync::Arc;
    /// use std::sync::atomic::{AtomicBool, Ordering};
    ///
    /// struct Pool(Arc<AtomicBool>);
    /// impl Dispose for Pool {
    ///     fn dispose(&self) { self.0.store(true, Ordering::SeqCst); }
    /// }
    ///
    /// let closed = Arc::new(AtomicBool::new(false));
    /// let flag = closed.clone();
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_singleton_factory::<Pool, _>(move |ctx| {
    ///     ctx.register_disposer(Arc::new(Pool(flag.clone())));
    ///     Ok(Pool(flag.clone()))
    /// });
    ///
    /// let injector = services.build();
    /// let _pool = injector.get_required::<Pool>();
    /// injector.dispose_all();
    /// assert!(closed.load(Ordering::SeqCst));
    /// ```
    pub fn dispose_all(&self) {
        let mut bag = std::mem::take(&mut *self.inner.root_disposers.lock());
        tracing::debug!(hooks = bag.len(), "disposing root services");
        bag.run_all_reverse();
    }

    pub(crate) fn push_root_disposer(&self, f: Box<dyn FnOnce() + Send>) {
        self.inner.root_disposers.lock().push(f);
    }

    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        let mut s = String::new();
        s.push_str("=== Injector Debug ===\n");
        for (k, r) in self.inner.registry.iter() {
            let created = if self.inner.singletons.is_created(k) { " (created)" } else { "" };
            s.push_str(&format!("  {}: {} via {:?}{}\n", k, r.lifetime, r.provider_kind(), created));
        }
        s.push_str(&format!(
            "Singletons created: {}\n",
            self.inner.singletons.created_count()
        ));
        s
    }
}

impl ResolverCore for Injector {
    fn get_instance(&self, key: &Key) -> DiResult<AnyArc> {
        self.create_context().get_instance(key)
    }

    fn push_disposer(&self, f: Box<dyn FnOnce() + Send>) {
        self.push_root_disposer(f);
    }
}

impl Resolver for Injector {}

impl Drop for InjectorInner {
    fn drop(&mut self) {
        let pending = self.root_disposers.get_mut().len();
        if pending > 0 {
            tracing::warn!(
                pending,
                "injector dropped with undisposed services; call dispose_all() before dropping"
            );
        }
    }
}

impl fmt::Debug for Injector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injector")
            .field("services", &self.inner.registry.len())
            .field("singletons_created", &self.inner.singletons.created_count())
            .field("options", &self.inner.options)
            .finish()
    }
}
