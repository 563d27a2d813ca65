//! Service descriptors for introspection and diagnostics.

use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::registration::{ProviderKind, Registration};

/// Service descriptor for introspection and diagnostics
///
/// A read-only snapshot of one registration, returned in registration order
/// by [`ServiceCollection::get_service_descriptors`](crate::ServiceCollection::get_service_descriptors)
/// and [`Injector::descriptors`](crate::Injector::descriptors).
///
/// # Examples
///
/// ```rust
/// use lifestyle_di::{Lifetime, Params, ProviderKind, ServiceCollection};
///
/// struct Database { url: String }
/// struct Repository;
///
/// let mut services = ServiceCollection::new();
/// services.add_constructor::<Database, _>(
///     Lifetime::Singleton,
///     Params::new().with("url", "postgres://localhost"),
///     |p| Ok(Database { url: p.require("url")? }),
/// );
/// services.add_scoped_factory::<Repository, _>(|_| Ok(Repository));
/// services.add_named_singleton("config_value", 42u32).unwrap();
///
/// let descriptors = services.get_service_descriptors();
/// assert_eq!(descriptors.len(), 3);
///
/// let db = &descriptors[0];
/// assert!(db.type_name().ends_with("Database"));
/// assert_eq!(db.lifetime, Lifetime::Singleton);
/// assert_eq!(db.provider_kind, ProviderKind::Constructor);
/// assert!(db.has_params);
///
/// assert_eq!(descriptors[1].lifetime, Lifetime::Scoped);
/// assert_eq!(descriptors[2].service_name(), Some("config_value"));
/// ```
#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    /// The service key
    pub key: Key,
    /// Service lifetime
    pub lifetime: Lifetime,
    /// Whether the service is built by a factory or a constructor
    pub provider_kind: ProviderKind,
    /// Whether the registration carries fixed parameters
    pub has_params: bool,
}

impl ServiceDescriptor {
    pub(crate) fn new(key: &Key, registration: &Registration) -> Self {
        Self {
            key: key.clone(),
            lifetime: registration.lifetime(),
            provider_kind: registration.provider_kind(),
            has_params: !registration.params().is_empty(),
        }
    }

    /// The symbol for services registered under a symbol key.
    pub fn service_name(&self) -> Option<&'static str> {
        match self.key {
            Key::Symbol(name) => Some(name),
            _ => None,
        }
    }

    /// Type, trait or symbol name.
    pub fn type_name(&self) -> &'static str {
        self.key.display_name()
    }

    pub fn is_named(&self) -> bool {
        self.service_name().is_some()
    }
}
