//! Service key types for the dependency injection container.

use std::any::TypeId;
use std::fmt;

/// Key for service storage and lookup.
///
/// Keys uniquely identify services in the container. At most one registration
/// exists per key at a time.
///
/// # Key Types
///
/// - **Type**: concrete types (structs, enums, primitives)
/// - **Trait**: trait objects such as `dyn Logger`
/// - **Symbol**: an arbitrary string symbol, for services that have no
///   dedicated type (for example two `String` services)
///
/// # Examples
///
/// ```rust
/// use lifestyle_di::{ServiceCollection, Resolver, Key};
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton(42u32);
/// services.add_named_singleton("config_port", 8080u32).unwrap();
///
/// let injector = services.build();
/// assert_eq!(*injector.get_required::<u32>(), 42);
/// assert_eq!(*injector.get_named_required::<u32>("config_port"), 8080);
///
/// assert_eq!(Key::symbol("config_port").display_name(), "config_port");
/// ```
#[derive(Debug, Clone)]
pub enum Key {
    /// Concrete type key with TypeId and name for diagnostics
    Type(TypeId, &'static str),
    /// Trait object key. Traits have no usable TypeId, so the name is the identity.
    Trait(&'static str),
    /// Free-form symbol key
    Symbol(&'static str),
}

impl Key {
    /// Key for a symbol. Validity is checked at registration time.
    pub fn symbol(name: &'static str) -> Self {
        Key::Symbol(name)
    }

    /// Get the type, trait or symbol name for display
    ///
    /// ```rust
    /// use lifestyle_di::Key;
    /// use std::any::TypeId;
    ///
    /// let type_key = Key::Type(TypeId::of::<String>(), "alloc::string::String");
    /// assert_eq!(type_key.display_name(), "alloc::string::String");
    ///
    /// let trait_key = Key::Trait("dyn core::fmt::Debug");
    /// assert_eq!(trait_key.display_name(), "dyn core::fmt::Debug");
    /// ```
    pub fn display_name(&self) -> &'static str {
        match self {
            Key::Type(_, name) => name,
            Key::Trait(name) => name,
            Key::Symbol(name) => name,
        }
    }

    /// Short name: the last path segment of a type or trait name, or the symbol itself.
    ///
    /// ```rust
    /// use lifestyle_di::key_of_type;
    ///
    /// assert_eq!(key_of_type::<String>().short_name(), "String");
    /// ```
    pub fn short_name(&self) -> &'static str {
        match self {
            Key::Symbol(name) => name,
            Key::Type(_, name) | Key::Trait(name) => {
                let base = name.split('<').next().unwrap_or(name);
                base.rsplit("::").next().unwrap_or(base)
            }
        }
    }

    /// Whether this key can name a service.
    pub(crate) fn validate(&self) -> crate::DiResult<()> {
        match self {
            Key::Symbol(name) if name.trim().is_empty() => {
                Err(crate::DiError::InvalidKey("symbol keys must be non-empty"))
            }
            _ => Ok(()),
        }
    }

    /// Whether a profile entry named `name` addresses this key.
    pub(crate) fn matches_name(&self, name: &str) -> bool {
        self.display_name() == name || self.short_name() == name
    }
}

// TypeId-only comparison for concrete types
impl PartialEq for Key {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::Type(a, _), Key::Type(b, _)) => a == b,
            (Key::Trait(a), Key::Trait(b)) => a == b,
            (Key::Symbol(a), Key::Symbol(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Key {}

impl std::hash::Hash for Key {
    #[inline(always)]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Key::Type(id, _) => {
                0u8.hash(state);
                id.hash(state);
            }
            Key::Trait(name) => {
                1u8.hash(state);
                name.hash(state);
            }
            Key::Symbol(name) => {
                2u8.hash(state);
                name.hash(state);
            }
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Symbol(name) => write!(f, "'{}'", name),
            _ => f.write_str(self.display_name()),
        }
    }
}

#[inline(always)]
pub fn key_of_type<T: 'static>() -> Key {
    Key::Type(TypeId::of::<T>(), std::any::type_name::<T>())
}

#[inline(always)]
pub fn key_of_trait<T: ?Sized + 'static>() -> Key {
    Key::Trait(std::any::type_name::<T>())
}
