//! Service collection module for dependency injection.
//!
//! This module contains the ServiceCollection type: the mutable registry used
//! during configuration, which `build()` freezes into an [`Injector`].

use std::sync::Arc;

use crate::config::{InjectorOptions, Profile};
use crate::key::{key_of_trait, key_of_type};
use crate::observer::Observers;
use crate::provider::InjectionContext;
use crate::registration::{Provider, ProviderKind, Registration, Registry};
use crate::{DiError, DiObserver, DiResult, Injector, Key, Lifetime, Params, ServiceDescriptor};

pub mod module_system;
pub use module_system::*;

/// Registry of services under configuration.
///
/// Registering a key that is already present replaces the earlier
/// registration (last one wins). The `try_*` methods register only when the
/// key is absent.
///
/// # Examples
///
/// ```rust
/// use lifestyle_di::{ServiceCollection, Resolver, Lifetime, Params};
/// use std::sync::Arc;
///
/// trait Logger: Send + Sync {
///     fn target(&self) -> String;
/// }
///
/// struct ConsoleLogger;
/// impl Logger for ConsoleLogger {
///     fn target(&self) -> String { "console".into() }
/// }
///
/// struct FileLogger { path: String }
/// impl Logger for FileLogger {
///     fn target(&self) -> String { self.path.clone() }
/// }
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton_trait_factory::<dyn Logger, _>(|_| Ok(Arc::new(ConsoleLogger)));
///
/// // A later registration for the same key wins.
/// services.add_trait_constructor::<dyn Logger, _>(
///     Lifetime::Singleton,
///     Params::new().with("path", "app.log"),
///     |p| Ok(Arc::new(FileLogger { path: p.require("path")? })),
/// );
///
/// let injector = services.build();
/// assert_eq!(injector.get_required_trait::<dyn Logger>().target(), "app.log");
/// ```
#[derive(Default)]
pub struct ServiceCollection {
    registry: Registry,
    observers: Observers,
}

impl ServiceCollection {
    /// Creates a new empty service collection.
    pub fn new() -> Self {
        Self::default()
    }

    // ----- Core registration -----

    /// Registers `provider` under `key`, replacing any earlier registration.
    ///
    /// # Errors
    ///
    /// [`DiError::InvalidKey`] for an empty symbol key, [`DiError::Config`]
    /// for a pre-built instance registered with a lifetime other than `Singleton`.
    ///
    /// ```rust
    /// # use lifestyle_di::{ServiceCollection, Provider, Lifetime, Key, DiError};
    /// let mut services = ServiceCollection::new();
    /// let err = services
    ///     .register(Key::symbol("port"), Provider::instance(8080u16), Lifetime::PerRequest, None)
    ///     .err();
    /// assert!(matches!(err, Some(DiError::Config(_))));
    /// ```
    pub fn register(
        &mut self,
        key: Key,
        provider: Provider,
        lifetime: Lifetime,
        params: Option<Params>,
    ) -> DiResult<&mut Self> {
        key.validate()?;
        provider.check_lifetime(&key, lifetime)?;
        let registration = Registration::new(&key, provider, lifetime, params);
        self.insert(key, registration);
        Ok(self)
    }

    /// Registers `provider` under `key` unless the key is already registered.
    ///
    /// Returns `Ok(true)` when the registration was added.
    pub fn try_register(
        &mut self,
        key: Key,
        provider: Provider,
        lifetime: Lifetime,
        params: Option<Params>,
    ) -> DiResult<bool> {
        key.validate()?;
        provider.check_lifetime(&key, lifetime)?;
        if self.registry.contains_key(&key) {
            return Ok(false);
        }
        let registration = Registration::new(&key, provider, lifetime, params);
        self.insert(key, registration);
        Ok(true)
    }

    fn insert(&mut self, key: Key, registration: Registration) {
        let lifetime = registration.lifetime;
        if let Some(previous) = self.registry.insert(key.clone(), registration) {
            tracing::debug!(
                service = %key,
                previous = %previous.lifetime,
                current = %lifetime,
                "registration replaced"
            );
        }
    }

    fn put(&mut self, key: Key, provider: Provider, lifetime: Lifetime, params: Option<Params>) -> &mut Self {
        let registration = Registration::new(&key, provider, lifetime, params);
        self.insert(key, registration);
        self
    }

    fn put_absent(&mut self, key: Key, provider: Provider, lifetime: Lifetime) -> bool {
        if self.registry.contains_key(&key) {
            return false;
        }
        self.put(key, provider, lifetime, None);
        true
    }

    // ----- Concrete types -----

    /// Registers a pre-built singleton.
    ///
    /// ```rust
    /// # use lifestyle_di::ServiceCollection;
    /// struct Config {
    ///     database_url: String
    /// }
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_singleton(Config {
    ///     database_url: "postgres://localhost".to_string()
    /// });
    /// ```
    pub fn add_singleton<T: 'static + Send + Sync>(&mut self, value: T) -> &mut Self {
        self.put(key_of_type::<T>(), Provider::instance(value), Lifetime::Singleton, None)
    }

    /// Registers a singleton factory, run once on first resolution.
    pub fn add_singleton_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: Fn(&InjectionContext) -> DiResult<T> + Send + Sync + 'static,
    {
        self.add_factory(Lifetime::Singleton, factory)
    }

    /// Registers a scoped factory, run once per open scope.
    ///
    /// ```rust
    /// # use lifestyle_di::{ServiceCollection, Resolver};
    /// # use std::sync::Arc;
    /// struct Database { url: String }
    /// struct RequestContext { request_id: String }
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_singleton(Database { url: "postgres://localhost".to_string() });
    /// services.add_scoped_factory::<RequestContext, _>(|_| {
    ///     Ok(RequestContext { request_id: "req-123".to_string() })
    /// });
    /// ```
    pub fn add_scoped_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: Fn(&InjectionContext) -> DiResult<T> + Send + Sync + 'static,
    {
        self.add_factory(Lifetime::Scoped, factory)
    }

    /// Registers a factory run on every resolution.
    pub fn add_per_request_factory<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: Fn(&InjectionContext) -> DiResult<T> + Send + Sync + 'static,
    {
        self.add_factory(Lifetime::PerRequest, factory)
    }

    pub fn add_factory<T, F>(&mut self, lifetime: Lifetime, factory: F) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: Fn(&InjectionContext) -> DiResult<T> + Send + Sync + 'static,
    {
        self.put(key_of_type::<T>(), Provider::factory(factory), lifetime, None)
    }

    /// Registers a constructor fed with fixed parameters.
    ///
    /// The parameters can later be overridden by a [`Profile`].
    ///
    /// ```rust
    /// # use lifestyle_di::{ServiceCollection, Resolver, Lifetime, Params};
    /// struct Greeter { prefix: String, count: u32 }
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_constructor::<Greeter, _>(
    ///     Lifetime::PerRequest,
    ///     Params::new().with("prefix", "DEV-"),
    ///     |p| Ok(Greeter { prefix: p.require("prefix")?, count: p.get_or("count", 1)? }),
    /// );
    ///
    /// let greeter = services.build().get_required::<Greeter>();
    /// assert_eq!(greeter.prefix, "DEV-");
    /// assert_eq!(greeter.count, 1);
    /// ```
    pub fn add_constructor<T, F>(&mut self, lifetime: Lifetime, params: Params, constructor: F) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: Fn(&Params) -> DiResult<T> + Send + Sync + 'static,
    {
        self.put(key_of_type::<T>(), Provider::constructor(constructor), lifetime, Some(params))
    }

    // ----- Trait objects -----

    /// Registers a pre-built trait object as a singleton.
    pub fn add_singleton_trait<Trait>(&mut self, value: Arc<Trait>) -> &mut Self
    where
        Trait: ?Sized + 'static + Send + Sync,
    {
        self.put(key_of_trait::<Trait>(), Provider::trait_instance(value), Lifetime::Singleton, None)
    }

    pub fn add_singleton_trait_factory<Trait, F>(&mut self, factory: F) -> &mut Self
    where
        Trait: ?Sized + 'static + Send + Sync,
        F: Fn(&InjectionContext) -> DiResult<Arc<Trait>> + Send + Sync + 'static,
    {
        self.add_trait_factory(Lifetime::Singleton, factory)
    }

    pub fn add_scoped_trait_factory<Trait, F>(&mut self, factory: F) -> &mut Self
    where
        Trait: ?Sized + 'static + Send + Sync,
        F: Fn(&InjectionContext) -> DiResult<Arc<Trait>> + Send + Sync + 'static,
    {
        self.add_trait_factory(Lifetime::Scoped, factory)
    }

    pub fn add_per_request_trait_factory<Trait, F>(&mut self, factory: F) -> &mut Self
    where
        Trait: ?Sized + 'static + Send + Sync,
        F: Fn(&InjectionContext) -> DiResult<Arc<Trait>> + Send + Sync + 'static,
    {
        self.add_trait_factory(Lifetime::PerRequest, factory)
    }

    /// Registers a trait-object factory with an explicit lifetime.
    pub fn add_trait_factory<Trait, F>(&mut self, lifetime: Lifetime, factory: F) -> &mut Self
    where
        Trait: ?Sized + 'static + Send + Sync,
        F: Fn(&InjectionContext) -> DiResult<Arc<Trait>> + Send + Sync + 'static,
    {
        self.put(key_of_trait::<Trait>(), Provider::trait_factory(factory), lifetime, None)
    }

    pub fn add_trait_constructor<Trait, F>(&mut self, lifetime: Lifetime, params: Params, constructor: F) -> &mut Self
    where
        Trait: ?Sized + 'static + Send + Sync,
        F: Fn(&Params) -> DiResult<Arc<Trait>> + Send + Sync + 'static,
    {
        self.put(
            key_of_trait::<Trait>(),
            Provider::trait_constructor(constructor),
            lifetime,
            Some(params),
        )
    }

    // ----- Symbol keys -----

    /// Registers a pre-built singleton under a symbol.
    ///
    /// # Errors
    ///
    /// [`DiError::InvalidKey`] when `name` is empty.
    pub fn add_named_singleton<T: 'static + Send + Sync>(&mut self, name: &'static str, value: T) -> DiResult<&mut Self> {
        self.register(Key::symbol(name), Provider::instance(value), Lifetime::Singleton, None)
    }

    pub fn add_named_factory<T, F>(&mut self, name: &'static str, lifetime: Lifetime, factory: F) -> DiResult<&mut Self>
    where
        T: 'static + Send + Sync,
        F: Fn(&InjectionContext) -> DiResult<T> + Send + Sync + 'static,
    {
        self.register(Key::symbol(name), Provider::factory(factory), lifetime, None)
    }

    pub fn add_named_trait_factory<Trait, F>(
        &mut self,
        name: &'static str,
        lifetime: Lifetime,
        factory: F,
    ) -> DiResult<&mut Self>
    where
        Trait: ?Sized + 'static + Send + Sync,
        F: Fn(&InjectionContext) -> DiResult<Arc<Trait>> + Send + Sync + 'static,
    {
        self.register(Key::symbol(name), Provider::trait_factory(factory), lifetime, None)
    }

    pub fn add_named_constructor<T, F>(
        &mut self,
        name: &'static str,
        lifetime: Lifetime,
        params: Params,
        constructor: F,
    ) -> DiResult<&mut Self>
    where
        T: 'static + Send + Sync,
        F: Fn(&Params) -> DiResult<T> + Send + Sync + 'static,
    {
        self.register(Key::symbol(name), Provider::constructor(constructor), lifetime, Some(params))
    }

    // ----- First registration wins -----

    /// Adds the singleton only if `T` is not registered yet.
    ///
    /// ```rust
    /// # use lifestyle_di::{ServiceCollection, Resolver};
    /// let mut services = ServiceCollection::new();
    /// assert!(services.try_add_singleton(1u32));
    /// assert!(!services.try_add_singleton(2u32));
    /// assert_eq!(*services.build().get_required::<u32>(), 1);
    /// ```
    pub fn try_add_singleton<T: 'static + Send + Sync>(&mut self, value: T) -> bool {
        self.put_absent(key_of_type::<T>(), Provider::instance(value), Lifetime::Singleton)
    }

    pub fn try_add_singleton_factory<T, F>(&mut self, factory: F) -> bool
    where
        T: 'static + Send + Sync,
        F: Fn(&InjectionContext) -> DiResult<T> + Send + Sync + 'static,
    {
        self.put_absent(key_of_type::<T>(), Provider::factory(factory), Lifetime::Singleton)
    }

    pub fn try_add_scoped_factory<T, F>(&mut self, factory: F) -> bool
    where
        T: 'static + Send + Sync,
        F: Fn(&InjectionContext) -> DiResult<T> + Send + Sync + 'static,
    {
        self.put_absent(key_of_type::<T>(), Provider::factory(factory), Lifetime::Scoped)
    }

    pub fn try_add_per_request_factory<T, F>(&mut self, factory: F) -> bool
    where
        T: 'static + Send + Sync,
        F: Fn(&InjectionContext) -> DiResult<T> + Send + Sync + 'static,
    {
        self.put_absent(key_of_type::<T>(), Provider::factory(factory), Lifetime::PerRequest)
    }

    pub fn try_add_singleton_trait<Trait>(&mut self, value: Arc<Trait>) -> bool
    where
        Trait: ?Sized + 'static + Send + Sync,
    {
        self.put_absent(key_of_trait::<Trait>(), Provider::trait_instance(value), Lifetime::Singleton)
    }

    pub fn try_add_trait_factory<Trait, F>(&mut self, lifetime: Lifetime, factory: F) -> bool
    where
        Trait: ?Sized + 'static + Send + Sync,
        F: Fn(&InjectionContext) -> DiResult<Arc<Trait>> + Send + Sync + 'static,
    {
        self.put_absent(key_of_trait::<Trait>(), Provider::trait_factory(factory), lifetime)
    }

    // ----- Queries -----

    /// The registration currently bound to `key`.
    pub fn lookup(&self, key: &Key) -> Option<&Registration> {
        self.registry.get(key)
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.registry.contains_key(key)
    }

    pub fn contains_type<T: 'static>(&self) -> bool {
        self.contains(&key_of_type::<T>())
    }

    pub fn contains_trait<T: ?Sized + 'static>(&self) -> bool {
        self.contains(&key_of_trait::<T>())
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.len() == 0
    }

    /// Registrations in registration order.
    pub fn get_service_descriptors(&self) -> Vec<ServiceDescriptor> {
        self.registry
            .iter()
            .map(|(key, reg)| ServiceDescriptor::new(key, reg))
            .collect()
    }

    // ----- Configuration -----

    /// Attaches an observer to every resolution of the built injector.
    pub fn add_observer(&mut self, observer: Arc<dyn DiObserver>) -> &mut Self {
        self.observers.add(observer);
        self
    }

    /// Applies a [`ServiceModule`]'s registrations.
    pub fn add_module<M: ServiceModule>(&mut self, module: M) -> DiResult<&mut Self> {
        module.register_services(self)?;
        Ok(self)
    }

    /// Applies a profile's lifetime and parameter overrides.
    ///
    /// The whole profile is checked before anything changes: an override for
    /// a service that is not registered, a service name that matches several
    /// registrations, parameters given to a service without a constructor, or
    /// a non-singleton lifetime for a pre-built instance fail with
    /// [`DiError::Config`] and leave the collection untouched.
    ///
    /// ```rust
    /// # use lifestyle_di::{ServiceCollection, Resolver, Lifetime, Params, Profile};
    /// struct ReleaseService { prefix: String }
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_constructor::<ReleaseService, _>(
    ///     Lifetime::PerRequest,
    ///     Params::new().with("prefix", "DEV-"),
    ///     |p| Ok(ReleaseService { prefix: p.require("prefix")? }),
    /// );
    ///
    /// let release = Profile::new("release")
    ///     .with_params("ReleaseService", Params::new().with("prefix", "PROD-"))
    ///     .with_lifetime("ReleaseService", Lifetime::Singleton);
    /// services.apply_profile(&release).unwrap();
    ///
    /// let injector = services.build();
    /// assert_eq!(injector.get_required::<ReleaseService>().prefix, "PROD-");
    /// ```
    pub fn apply_profile(&mut self, profile: &Profile) -> DiResult<&mut Self> {
        let mut resolved = Vec::with_capacity(profile.services.len());

        for (name, service_override) in &profile.services {
            let key = self.find_key(&profile.name, name)?;
            let registration = self
                .registry
                .get(&key)
                .ok_or_else(|| DiError::Config(format!("unknown service '{}'", name)))?;

            let has_params = service_override
                .params
                .as_ref()
                .map_or(false, |params| !params.is_empty());
            if has_params && registration.provider_kind() != ProviderKind::Constructor {
                return Err(DiError::Config(format!(
                    "profile '{}' sets params for '{}', which is not built by a constructor and takes none",
                    profile.name, name
                )));
            }
            if let Some(lifetime) = service_override.lifetime {
                registration.provider.check_lifetime(&key, lifetime)?;
            }

            resolved.push((key, service_override));
        }

        for (key, service_override) in resolved {
            if let Some(registration) = self.registry.get_mut(&key) {
                if let Some(params) = &service_override.params {
                    registration.params.merge(params);
                }
                if let Some(lifetime) = service_override.lifetime {
                    registration.lifetime = lifetime;
                }
                tracing::debug!(
                    profile = %profile.name,
                    service = %key,
                    lifetime = %registration.lifetime,
                    "profile override applied"
                );
            }
        }

        Ok(self)
    }

    fn find_key(&self, profile: &str, name: &str) -> DiResult<Key> {
        if let Some(exact) = self.registry.keys().find(|key| key.display_name() == name) {
            return Ok(exact.clone());
        }

        let mut candidates = self.registry.keys().filter(|key| key.matches_name(name));
        match (candidates.next(), candidates.next()) {
            (Some(key), None) => Ok(key.clone()),
            (Some(_), Some(_)) => Err(DiError::Config(format!(
                "profile '{}': service name '{}' is ambiguous; use the full type name",
                profile, name
            ))),
            (None, _) => Err(DiError::Config(format!(
                "profile '{}' overrides unknown service '{}'",
                profile, name
            ))),
        }
    }

    // ----- Build -----

    /// Freezes the registry into an [`Injector`] with default options.
    pub fn build(self) -> Injector {
        self.build_with_options(InjectorOptions::default())
    }

    pub fn build_with_options(self, options: InjectorOptions) -> Injector {
        Injector::new(self.registry, self.observers, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Resolver;

    struct Marker;

    #[test]
    fn empty_symbols_are_rejected() {
        let mut services = ServiceCollection::new();
        let err = services.add_named_singleton("", 1u8).err();
        assert!(matches!(err, Some(DiError::InvalidKey(_))));
        assert!(services.is_empty());
    }

    #[test]
    fn try_register_keeps_first() {
        let mut services = ServiceCollection::new();
        let key = Key::symbol("answer");
        assert!(services
            .try_register(key.clone(), Provider::instance(41u32), Lifetime::Singleton, None)
            .unwrap());
        assert!(!services
            .try_register(key.clone(), Provider::instance(42u32), Lifetime::Singleton, None)
            .unwrap());
        assert_eq!(*services.build().get_named_required::<u32>("answer"), 41);
    }

    #[test]
    fn profile_rejects_params_for_factories() {
        let mut services = ServiceCollection::new();
        services.add_per_request_factory::<Marker, _>(|_| Ok(Marker));
        let profile = Profile::new("release").with_params("Marker", Params::new().with("x", 1));
        assert!(matches!(services.apply_profile(&profile), Err(DiError::Config(_))));
    }

    #[test]
    fn instances_cannot_take_other_lifetimes() {
        let mut services = ServiceCollection::new();
        let err = services
            .register(Key::symbol("m"), Provider::instance(5u8), Lifetime::PerRequest, None)
            .err();
        assert!(matches!(err, Some(DiError::Config(_))));
        assert!(matches!(
            services.try_register(Key::symbol("m"), Provider::instance(5u8), Lifetime::Scoped, None),
            Err(DiError::Config(_))
        ));
        assert!(services.is_empty());

        services.add_singleton(Marker);
        let profile = Profile::new("p").with_lifetime("Marker", Lifetime::PerRequest);
        assert!(matches!(services.apply_profile(&profile), Err(DiError::Config(_))));
        let reg = services.lookup(&key_of_type::<Marker>()).unwrap();
        assert_eq!(reg.lifetime(), Lifetime::Singleton);
    }

    #[test]
    fn profile_is_all_or_nothing() {
        let mut services = ServiceCollection::new();
        services.add_per_request_factory::<Marker, _>(|_| Ok(Marker));
        let profile = Profile::new("release")
            .with_lifetime("Marker", Lifetime::Singleton)
            .with_lifetime("Missing", Lifetime::Singleton);

        assert!(services.apply_profile(&profile).is_err());
        let reg = services.lookup(&key_of_type::<Marker>()).unwrap();
        assert_eq!(reg.lifetime(), Lifetime::PerRequest);
    }

    #[test]
    fn profile_lifetime_override_changes_caching() {
        let mut services = ServiceCollection::new();
        services.add_per_request_factory::<Marker, _>(|_| Ok(Marker));
        services
            .apply_profile(&Profile::new("p").with_lifetime("Marker", Lifetime::Singleton))
            .unwrap();
        let injector = services.build();
        assert!(Arc::ptr_eq(
            &injector.get_required::<Marker>(),
            &injector.get_required::<Marker>()
        ));
    }
}
