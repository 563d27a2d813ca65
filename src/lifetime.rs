//! Service lifetime definitions.

use serde::{Deserialize, Serialize};

/// Service lifetimes controlling instance caching behavior
///
/// - **Singleton**: one instance per injector, created on first resolution
/// - **Scoped**: one instance per open scope, discarded with the scope
/// - **PerRequest**: a fresh instance on every resolution, never cached
///
/// # Examples
///
/// ```rust
/// use lifestyle_di::{ServiceCollection, Resolver};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct Repository { db_url: String }
/// struct RequestModel { id: u32 }
///
/// let mut services = ServiceCollection::new();
/// services.add_singleton(Database { url: "postgres://localhost".to_string() });
/// services.add_scoped_factory::<Repository, _>(|ctx| {
///     let db = ctx.get::<Database>()?;
///     Ok(Repository { db_url: db.url.clone() })
/// });
/// services.add_per_request_factory::<RequestModel, _>(|_| Ok(RequestModel { id: 7 }));
///
/// let injector = services.build();
/// let ctx = injector.create_context();
///
/// let db1 = ctx.get_required::<Database>();
/// let scope = ctx.create_scope();
/// let db2 = scope.get_required::<Database>();
/// assert!(Arc::ptr_eq(&db1, &db2));
///
/// let repo1 = scope.get_required::<Repository>();
/// let repo2 = scope.get_required::<Repository>();
/// assert!(Arc::ptr_eq(&repo1, &repo2));
///
/// let model1 = scope.get_required::<RequestModel>();
/// let model2 = scope.get_required::<RequestModel>();
/// assert!(!Arc::ptr_eq(&model1, &model2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifetime {
    /// New instance per resolution, never cached
    #[serde(alias = "transient", alias = "per-request")]
    PerRequest,
    /// Single instance per scope, cached for the scope's lifetime
    Scoped,
    /// Single instance per injector, cached forever
    Singleton,
}

impl Lifetime {
    /// Returns `true` if instances of this lifetime are cached.
    #[inline]
    pub fn is_cached(&self) -> bool {
        !matches!(self, Lifetime::PerRequest)
    }
}

impl std::fmt::Display for Lifetime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Lifetime::PerRequest => "per_request",
            Lifetime::Scoped => "scoped",
            Lifetime::Singleton => "singleton",
        })
    }
}
