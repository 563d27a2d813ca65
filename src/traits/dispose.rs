//! Disposal trait for resource cleanup.

/// Trait for synchronous resource disposal.
///
/// Implement this trait for services that need structured teardown (e.g., flushing caches,
/// closing files). Hooks registered while a scope is open run in LIFO order when the
/// scope closes; singleton hooks run on [`Injector::dispose_all`](crate::Injector::dispose_all).
///
/// # Examples
///
/// ```
/// use lifestyle_di::{Dispose, ServiceCollection, Resolver};
/// use std::sync::Arc;
///
/// struct Cache {
///     name: String,
/// }
///
/// impl Dispose for Cache {
///     fn dispose(&self) {
///         println!("Flushing cache: {}", self.name);
///     }
/// }
///
/// let mut services = ServiceCollection::new();
/// services.add_scoped_factory::<Cache, _>(|ctx| {
///     let cache = Arc::new(Cache { name: "user_cache".to_string() });
///     ctx.register_disposer(cache.clone());
///     Ok(Cache { name: "user_cache".to_string() })
/// });
///
/// let injector = services.build();
/// let ctx = injector.create_context();
/// ctx.with_scope(|scope| {
///     let _cache = scope.get_required::<Cache>();
/// }); // "Flushing cache: user_cache"
/// ```
pub trait Dispose: Send + Sync + 'static {
    /// Perform synchronous cleanup of resources.
    fn dispose(&self);
}
