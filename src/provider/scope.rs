//! Scope frames and the RAII guard that brackets them.

use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;

use crate::internal::DisposeBag;
use crate::registration::AnyArc;
use crate::Key;

use super::InjectionContext;

/// One open scope: its cached instances and the disposal hooks registered
/// while it was the innermost scope.
pub(crate) struct ScopeFrame {
    pub(crate) id: u64,
    pub(crate) instances: HashMap<Key, AnyArc>,
    pub(crate) disposers: DisposeBag,
}

impl ScopeFrame {
    pub(crate) fn new(id: u64) -> Self {
        Self {
            id,
            instances: HashMap::new(),
            disposers: DisposeBag::default(),
        }
    }

    /// Runs disposal hooks LIFO, then drops the cached instances.
    pub(crate) fn close(mut self) {
        self.disposers.run_all_reverse();
    }
}

/// Handle on an open scope.
///
/// Created by [`InjectionContext::create_scope`]. While the guard is alive,
/// `Scoped` services resolved through the context (or through the guard, which
/// derefs to it) are cached in this scope. Dropping the guard closes the scope
/// on every exit path, early returns and unwinding included, runs its disposal
/// hooks in LIFO order and makes the enclosing scope current again.
///
/// # Examples
///
/// ```
/// use lifestyle_di::{ServiceCollection, Resolver};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU32, Ordering};
///
/// struct RequestId(u32);
///
/// let counter = Arc::new(AtomicU32::new(0));
/// let c = counter.clone();
///
/// let mut services = ServiceCollection::new();
/// services.add_scoped_factory::<RequestId, _>(move |_| {
///     Ok(RequestId(c.fetch_add(1, Ordering::SeqCst)))
/// });
///
/// let injector = services.build();
/// let ctx = injector.create_context();
///
/// let outer = ctx.create_scope();
/// let i1 = outer.get_required::<RequestId>();
/// {
///     let inner = outer.create_scope();
///     let i2 = inner.get_required::<RequestId>();
///     assert!(!Arc::ptr_eq(&i1, &i2));
/// }
/// let again = outer.get_required::<RequestId>();
/// assert!(Arc::ptr_eq(&i1, &again));
/// ```
#[must_use = "the scope closes as soon as the guard is dropped"]
pub struct ScopeGuard<'a> {
    pub(super) ctx: &'a InjectionContext,
    pub(super) id: u64,
}

impl ScopeGuard<'_> {
    /// Identifier of this scope, unique within its context.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Closes the scope now. Same as dropping the guard.
    pub fn close(self) {}
}

impl Deref for ScopeGuard<'_> {
    type Target = InjectionContext;

    fn deref(&self) -> &InjectionContext {
        self.ctx
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.ctx.close_scope(self.id);
    }
}

impl fmt::Debug for ScopeGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeGuard").field("id", &self.id).finish()
    }
}
