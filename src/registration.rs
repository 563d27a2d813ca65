//! Service registration types.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::params::Params;
use crate::provider::InjectionContext;

// Type-erased Arc for storage
pub type AnyArc = Arc<dyn Any + Send + Sync>;

type FactoryFn = Arc<dyn Fn(&InjectionContext) -> DiResult<AnyArc> + Send + Sync>;
type ConstructorFn = Arc<dyn Fn(&Params) -> DiResult<AnyArc> + Send + Sync>;

/// Which capability a [`Provider`] wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// No-argument factory that resolves its own dependencies from the context
    Factory,
    /// Constructor fed with the registration's fixed [`Params`]
    Constructor,
    /// Pre-built value; only valid for `Singleton` registrations
    Instance,
}

#[derive(Clone)]
enum ProviderFn {
    Factory(FactoryFn),
    Constructor(ConstructorFn),
    Instance(AnyArc),
}

/// Construction strategy for one service.
///
/// Concrete values are stored as `Arc<T>` inside the type-erased `AnyArc`;
/// trait objects are stored as `Arc<Arc<dyn Trait>>` so they can be recovered
/// with a sized downcast.
///
/// # Examples
///
/// ```rust
/// use lifestyle_di::{ServiceCollection, Provider, Lifetime, Key, Params, Resolver};
///
/// struct Greeter { greeting: String }
///
/// let mut services = ServiceCollection::new();
/// services.register(
///     Key::symbol("greeter"),
///     Provider::constructor(|p: &Params| Ok(Greeter { greeting: p.require("greeting")? })),
///     Lifetime::Singleton,
///     Some(Params::new().with("greeting", "hello")),
/// ).unwrap();
///
/// let injector = services.build();
/// let greeter = injector.get_named_required::<Greeter>("greeter");
/// assert_eq!(greeter.greeting, "hello");
/// ```
#[derive(Clone)]
pub struct Provider {
    inner: ProviderFn,
}

impl Provider {
    /// Factory producing a concrete `T`.
    pub fn factory<T, F>(factory: F) -> Self
    where
        T: 'static + Send + Sync,
        F: Fn(&InjectionContext) -> DiResult<T> + Send + Sync + 'static,
    {
        Self {
            inner: ProviderFn::Factory(Arc::new(move |ctx: &InjectionContext| {
                factory(ctx).map(|value| Arc::new(value) as AnyArc)
            })),
        }
    }

    /// Factory producing a trait object.
    pub fn trait_factory<Trait, F>(factory: F) -> Self
    where
        Trait: ?Sized + 'static + Send + Sync,
        F: Fn(&InjectionContext) -> DiResult<Arc<Trait>> + Send + Sync + 'static,
    {
        Self {
            inner: ProviderFn::Factory(Arc::new(move |ctx: &InjectionContext| {
                factory(ctx).map(|value| Arc::new(value) as AnyArc)
            })),
        }
    }

    /// Constructor producing a concrete `T` from fixed parameters.
    pub fn constructor<T, F>(constructor: F) -> Self
    where
        T: 'static + Send + Sync,
        F: Fn(&Params) -> DiResult<T> + Send + Sync + 'static,
    {
        Self {
            inner: ProviderFn::Constructor(Arc::new(move |params: &Params| {
                constructor(params).map(|value| Arc::new(value) as AnyArc)
            })),
        }
    }

    /// Constructor producing a trait object from fixed parameters.
    pub fn trait_constructor<Trait, F>(constructor: F) -> Self
    where
        Trait: ?Sized + 'static + Send + Sync,
        F: Fn(&Params) -> DiResult<Arc<Trait>> + Send + Sync + 'static,
    {
        Self {
            inner: ProviderFn::Constructor(Arc::new(move |params: &Params| {
                constructor(params).map(|value| Arc::new(value) as AnyArc)
            })),
        }
    }

    /// Pre-built value. It can only back a `Singleton` registration.
    pub fn instance<T: 'static + Send + Sync>(value: T) -> Self {
        Self {
            inner: ProviderFn::Instance(Arc::new(value)),
        }
    }

    /// Pre-built trait object. It can only back a `Singleton` registration.
    pub fn trait_instance<Trait: ?Sized + 'static + Send + Sync>(value: Arc<Trait>) -> Self {
        Self {
            inner: ProviderFn::Instance(Arc::new(value)),
        }
    }

    pub fn kind(&self) -> ProviderKind {
        match self.inner {
            ProviderFn::Factory(_) => ProviderKind::Factory,
            ProviderFn::Constructor(_) => ProviderKind::Constructor,
            ProviderFn::Instance(_) => ProviderKind::Instance,
        }
    }

    /// Rejects lifetimes this provider cannot honour: a pre-built instance is `Singleton` only.
    pub(crate) fn check_lifetime(&self, key: &Key, lifetime: Lifetime) -> DiResult<()> {
        if self.kind() == ProviderKind::Instance && lifetime != Lifetime::Singleton {
            return Err(DiError::Config(format!(
                "{} is a pre-built instance and must stay a singleton, not {}",
                key, lifetime
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider").field("kind", &self.kind()).finish()
    }
}

/// Service registration with lifetime, provider and fixed parameters
#[derive(Clone)]
pub struct Registration {
    pub(crate) lifetime: Lifetime,
    pub(crate) provider: Provider,
    pub(crate) params: Params,
}

impl Registration {
    pub(crate) fn new(key: &Key, provider: Provider, lifetime: Lifetime, params: Option<Params>) -> Self {
        Self {
            lifetime,
            provider,
            params: params.unwrap_or_default().for_service(key.display_name()),
        }
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn provider_kind(&self) -> ProviderKind {
        self.provider.kind()
    }

    /// The sole construction path shared by every lifetime.
    pub(crate) fn create(&self, ctx: &InjectionContext) -> DiResult<AnyArc> {
        match &self.provider.inner {
            ProviderFn::Factory(factory) => factory(ctx),
            ProviderFn::Constructor(constructor) => constructor(&self.params),
            ProviderFn::Instance(value) => Ok(value.clone()),
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("lifetime", &self.lifetime)
            .field("provider", &self.provider.kind())
            .field("params", &self.params)
            .finish()
    }
}

/// Service registry holding all registrations, in first-registration order
#[derive(Default)]
pub(crate) struct Registry {
    entries: HashMap<Key, Registration>,
    order: Vec<Key>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Inserts a registration, returning the one it replaced.
    pub(crate) fn insert(&mut self, key: Key, registration: Registration) -> Option<Registration> {
        let previous = self.entries.insert(key.clone(), registration);
        if previous.is_none() {
            self.order.push(key);
        }
        previous
    }

    #[inline(always)]
    pub(crate) fn get(&self, key: &Key) -> Option<&Registration> {
        self.entries.get(key)
    }

    pub(crate) fn get_mut(&mut self, key: &Key) -> Option<&mut Registration> {
        self.entries.get_mut(key)
    }

    #[inline(always)]
    pub(crate) fn contains_key(&self, key: &Key) -> bool {
        self.entries.contains_key(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    /// Iterator over all key-registration pairs in registration order
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&Key, &Registration)> {
        self.order
            .iter()
            .filter_map(move |key| self.entries.get(key).map(|reg| (key, reg)))
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = &Key> {
        self.order.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::key_of_type;

    #[test]
    fn insert_replaces_but_keeps_first_position() {
        let mut registry = Registry::new();
        let a = key_of_type::<u8>();
        let b = key_of_type::<u16>();
        registry.insert(a.clone(), Registration::new(&a, Provider::instance(1u8), Lifetime::Singleton, None));
        registry.insert(b.clone(), Registration::new(&b, Provider::instance(2u16), Lifetime::Singleton, None));
        let replaced = registry.insert(
            a.clone(),
            Registration::new(&a, Provider::factory(|_| Ok(3u8)), Lifetime::PerRequest, None),
        );

        assert!(replaced.is_some());
        assert_eq!(registry.len(), 2);
        let order: Vec<_> = registry.keys().cloned().collect();
        assert_eq!(order, vec![a.clone(), b]);
        assert_eq!(registry.get(&a).map(|r| r.lifetime()), Some(Lifetime::PerRequest));
    }

    #[test]
    fn instances_only_back_singletons() {
        let key = Key::symbol("answer");
        let provider = Provider::instance(42u32);
        assert_eq!(provider.kind(), ProviderKind::Instance);
        assert!(provider.check_lifetime(&key, Lifetime::Singleton).is_ok());
        assert!(matches!(
            provider.check_lifetime(&key, Lifetime::PerRequest),
            Err(DiError::Config(_))
        ));
        assert!(Provider::factory(|_| Ok(1u8))
            .check_lifetime(&key, Lifetime::Scoped)
            .is_ok());
    }

    #[test]
    fn params_are_tagged_with_service_name() {
        let key = Key::symbol("file_logger");
        let reg = Registration::new(
            &key,
            Provider::constructor(|p: &Params| p.require::<String>("path")),
            Lifetime::Singleton,
            None,
        );
        assert_eq!(reg.provider_kind(), ProviderKind::Constructor);
        match reg.params().require::<String>("path") {
            Err(DiError::MissingParam { service, .. }) => assert_eq!(service, "file_logger"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
