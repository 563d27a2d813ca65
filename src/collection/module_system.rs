//! Service module system for grouped registration.
//!
//! A module bundles the registrations of one configuration (a "debug" wiring,
//! a "release" wiring, a feature area) so they can be applied as a unit.

use crate::{DiResult, ServiceCollection};

/// A group of registrations applied to a [`ServiceCollection`] in one step.
///
/// # Example
///
/// ```rust
/// use lifestyle_di::{DiResult, Resolver, ServiceCollection, ServiceModule};
/// use std::sync::Arc;
///
/// trait Logger: Send + Sync {
///     fn name(&self) -> &'static str;
/// }
///
/// struct ConsoleLogger;
/// impl Logger for ConsoleLogger {
///     fn name(&self) -> &'static str { "console" }
/// }
///
/// struct DebugModule;
///
/// impl ServiceModule for DebugModule {
///     fn register_services(self, services: &mut ServiceCollection) -> DiResult<()> {
///         services.add_singleton_trait(Arc::new(ConsoleLogger) as Arc<dyn Logger>);
///         Ok(())
///     }
/// }
///
/// # fn main() -> DiResult<()> {
/// let mut services = ServiceCollection::new();
/// services.add_module(DebugModule)?;
/// let injector = services.build();
/// assert_eq!(injector.get_required_trait::<dyn Logger>().name(), "console");
/// # Ok(())
/// # }
/// ```
pub trait ServiceModule {
    /// Register this module's services with the ServiceCollection.
    fn register_services(self, services: &mut ServiceCollection) -> DiResult<()>;
}

/// Closures taking the collection are modules too.
impl<F> ServiceModule for F
where
    F: FnOnce(&mut ServiceCollection) -> DiResult<()>,
{
    fn register_services(self, services: &mut ServiceCollection) -> DiResult<()> {
        self(services)
    }
}

/// Consuming, chainable module registration.
///
/// ```rust
/// use lifestyle_di::{DiResult, ServiceCollection, ServiceCollectionExt};
///
/// # fn main() -> DiResult<()> {
/// let injector = ServiceCollection::new()
///     .with_module(|s: &mut ServiceCollection| -> DiResult<()> {
///         s.add_singleton(1u8);
///         Ok(())
///     })?
///     .with_module(|s: &mut ServiceCollection| -> DiResult<()> {
///         s.add_singleton(2u16);
///         Ok(())
///     })?
///     .build();
/// # Ok(())
/// # }
/// ```
pub trait ServiceCollectionExt {
    fn with_module<M: ServiceModule>(self, module: M) -> DiResult<Self>
    where
        Self: Sized;
}

impl ServiceCollectionExt for ServiceCollection {
    fn with_module<M: ServiceModule>(mut self, module: M) -> DiResult<Self> {
        module.register_services(&mut self)?;
        Ok(self)
    }
}
