//! # lifestyle-di
//!
//! A dependency injection container with three lifestyles and explicit,
//! per-execution-unit scopes.
//!
//! ## Features
//!
//! - **Lifetimes**: `Singleton`, `Scoped` and `PerRequest` services
//! - **Typed and symbolic keys**: concrete types, trait objects and string symbols
//! - **Explicit scopes**: each [`InjectionContext`] owns its own stack of nested scopes
//! - **Circular dependency detection**: reported with the full path, never a deadlock
//! - **Parameters and profiles**: constructor parameters that debug/release profiles can override
//! - **Disposal**: LIFO cleanup hooks per scope and for the injector
//!
//! ## Quick Start
//!
//! ```rust
//! use lifestyle_di::{ServiceCollection, Resolver};
//! use std::sync::Arc;
//!
//! struct Database {
//!     connection_string: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! let mut services = ServiceCollection::new();
//! services.add_singleton(Database {
//!     connection_string: "postgres://localhost".to_string(),
//! });
//! services.add_per_request_factory::<UserService, _>(|ctx| {
//!     Ok(UserService {
//!         db: ctx.get::<Database>()?,
//!     })
//! });
//!
//! let injector = services.build();
//! let user_service = injector.get_required::<UserService>();
//! assert_eq!(user_service.db.connection_string, "postgres://localhost");
//! ```
//!
//! ## Service Lifetimes
//!
//! - **Singleton**: created once per injector and shared by every context and scope
//! - **Scoped**: created once per open scope; resolving it with no scope open is an error
//! - **PerRequest**: created fresh on every resolution
//!
//! ## Scopes
//!
//! Scopes belong to an [`InjectionContext`], created per thread or task with
//! [`Injector::create_context`]. Opening a scope returns a [`ScopeGuard`]; the
//! scope closes when the guard drops.
//!
//! ```rust
//! use lifestyle_di::{ServiceCollection, Resolver, DiError};
//! use std::sync::Arc;
//!
//! struct RequestState;
//!
//! let mut services = ServiceCollection::new();
//! services.add_scoped_factory::<RequestState, _>(|_| Ok(RequestState));
//!
//! let injector = services.build();
//! let ctx = injector.create_context();
//!
//! assert!(matches!(ctx.get::<RequestState>(), Err(DiError::NoActiveScope(_))));
//!
//! let first = ctx.with_scope(|scope| scope.get_required::<RequestState>());
//! let second = ctx.with_scope(|scope| scope.get_required::<RequestState>());
//! assert!(!Arc::ptr_eq(&first, &second));
//! ```

pub mod collection;
pub mod config;
pub mod descriptors;
pub mod error;
pub mod key;
pub mod lifetime;
pub mod observer;
pub mod params;
pub mod provider;
pub mod traits;

mod internal;
mod registration;
mod singletons;

pub use collection::{ServiceCollection, ServiceCollectionExt, ServiceModule};
pub use config::{InjectorOptions, Profile, ServiceOverride};
pub use descriptors::ServiceDescriptor;
pub use error::{DiError, DiResult, SharedError};
pub use key::{key_of_trait, key_of_type, Key};
pub use lifetime::Lifetime;
pub use observer::{DiObserver, MetricsObserver, TracingObserver};
pub use params::Params;
pub use provider::{InjectionContext, Injector, ScopeGuard};
pub use registration::{AnyArc, Provider, ProviderKind, Registration};
pub use traits::{Dispose, Resolver, ResolverCore};
