//! Error types for the dependency injection container.

use std::error::Error as StdError;
use std::sync::Arc;

use thiserror::Error;

/// Boxed provider failure kept behind an `Arc` so `DiError` stays `Clone`.
pub type SharedError = Arc<dyn StdError + Send + Sync + 'static>;

/// Dependency injection errors
///
/// Every failure surfaced by registration, configuration or resolution.
/// Provider failures are never swallowed or retried: a provider that returns a
/// `DiError` has it passed through verbatim, anything else is wrapped once in
/// [`DiError::Construction`].
///
/// # Examples
///
/// ```rust
/// use lifestyle_di::{DiError, ServiceCollection, Resolver};
///
/// let injector = ServiceCollection::new().build();
/// match injector.get::<String>() {
///     Err(DiError::NotFound(type_name)) => {
///         assert_eq!(type_name, "alloc::string::String");
///     }
///     _ => unreachable!(),
/// }
/// ```
///
/// ```rust
/// use lifestyle_di::DiError;
///
/// let circular = DiError::Circular(vec!["ServiceA", "ServiceB", "ServiceA"]);
/// assert_eq!(circular.to_string(), "Circular dependency: ServiceA -> ServiceB -> ServiceA");
/// ```
#[derive(Debug, Clone, Error)]
pub enum DiError {
    /// Service not registered
    #[error("Service not found: {0}")]
    NotFound(&'static str),
    /// Scoped service requested while no scope is open
    #[error("No active scope for scoped service: {0}")]
    NoActiveScope(&'static str),
    /// A provider failed while constructing the service
    #[error("Failed to construct {service}: {source}")]
    Construction {
        service: &'static str,
        #[source]
        source: SharedError,
    },
    /// A singleton tried to capture a scoped dependency
    #[error("Singleton {singleton} cannot depend on scoped service {scoped}")]
    CaptiveScoped {
        singleton: &'static str,
        scoped: &'static str,
    },
    /// Circular dependency detected (includes path)
    #[error("Circular dependency: {}", .0.join(" -> "))]
    Circular(Vec<&'static str>),
    /// Maximum recursion depth exceeded
    #[error("Max depth {0} exceeded")]
    DepthExceeded(usize),
    /// Type downcast failed
    #[error("Type mismatch for: {0}")]
    TypeMismatch(&'static str),
    /// Key cannot identify a service
    #[error("Invalid service key: {0}")]
    InvalidKey(&'static str),
    /// Constructor asked for a parameter the registration does not carry
    #[error("Missing parameter '{param}' for {service}")]
    MissingParam { service: &'static str, param: String },
    /// Parameter present but not convertible to the requested type
    #[error("Invalid parameter '{param}' for {service}: {reason}")]
    InvalidParam {
        service: &'static str,
        param: String,
        reason: String,
    },
    /// Profile or options could not be loaded or applied
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DiError {
    /// Wraps a foreign provider failure for `service`.
    ///
    /// ```rust
    /// use lifestyle_di::DiError;
    ///
    /// let io = std::io::Error::new(std::io::ErrorKind::NotFound, "app.log");
    /// let err = DiError::construction("FileLogger", io);
    /// assert!(err.to_string().starts_with("Failed to construct FileLogger"));
    /// ```
    pub fn construction<E>(service: &'static str, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        DiError::Construction {
            service,
            source: Arc::new(source),
        }
    }

    /// Returns `true` for errors caused by the registry shape rather than a provider.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DiError::NotFound(_) | DiError::InvalidKey(_) | DiError::Config(_) | DiError::TypeMismatch(_)
        )
    }
}

/// Result type for DI operations
pub type DiResult<T> = Result<T, DiError>;
