//! Per-execution-unit resolution context.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::time::Instant;

use crate::internal::ResolutionPath;
use crate::registration::{AnyArc, Registration};
use crate::traits::{Resolver, ResolverCore};
use crate::{DiError, DiResult, Key, Lifetime};

use super::scope::{ScopeFrame, ScopeGuard};
use super::Injector;

/// One execution unit's handle on an [`Injector`].
///
/// The context owns a stack of open scopes and the chain of services it is
/// currently constructing. `Scoped` services always resolve against the
/// innermost open scope of *this* context; other contexts never see it.
///
/// A context can move to another thread but cannot be shared between threads.
/// Give each thread or task its own context via [`Injector::create_context`];
/// all of them share the injector's singletons.
///
/// Factories receive the context they are being resolved through, so nested
/// dependencies see the same scope stack:
///
/// ```
/// use lifestyle_di::{ServiceCollection, Resolver, DiError};
/// use std::sync::Arc;
///
/// struct Connection;
/// struct Repository { conn: Arc<Connection> }
///
/// let mut services = ServiceCollection::new();
/// services.add_scoped_factory::<Connection, _>(|_| Ok(Connection));
/// services.add_per_request_factory::<Repository, _>(|ctx| {
///     Ok(Repository { conn: ctx.get::<Connection>()? })
/// });
///
/// let injector = services.build();
/// let ctx = injector.create_context();
///
/// // No scope open: the scoped dependency cannot be resolved.
/// assert!(matches!(ctx.get::<Repository>(), Err(DiError::NoActiveScope(_))));
///
/// ctx.with_scope(|scope| {
///     let a = scope.get_required::<Repository>();
///     let b = scope.get_required::<Repository>();
///     assert!(!Arc::ptr_eq(&a, &b));
///     assert!(Arc::ptr_eq(&a.conn, &b.conn));
/// });
/// ```
pub struct InjectionContext {
    injector: Injector,
    scopes: RefCell<Vec<ScopeFrame>>,
    path: ResolutionPath,
    next_scope_id: Cell<u64>,
}

impl InjectionContext {
    pub(crate) fn new(injector: Injector) -> Self {
        Self {
            injector,
            scopes: RefCell::new(Vec::new()),
            path: ResolutionPath::default(),
            next_scope_id: Cell::new(0),
        }
    }

    /// The injector this context resolves from.
    pub fn injector(&self) -> &Injector {
        &self.injector
    }

    /// Opens a nested scope and makes it current until the guard is dropped.
    pub fn create_scope(&self) -> ScopeGuard<'_> {
        let id = self.next_scope_id.get();
        self.next_scope_id.set(id + 1);

        let depth = {
            let mut scopes = self.scopes.borrow_mut();
            scopes.push(ScopeFrame::new(id));
            scopes.len()
        };
        tracing::debug!(scope = id, depth, "scope opened");

        ScopeGuard { ctx: self, id }
    }

    /// Runs `f` inside a fresh scope, closing it when `f` returns or unwinds.
    ///
    /// ```
    /// use lifestyle_di::{ServiceCollection, Resolver};
    ///
    /// struct Unit;
    ///
    /// let mut services = ServiceCollection::new();
    /// services.add_scoped_factory::<Unit, _>(|_| Ok(Unit));
    /// let injector = services.build();
    /// let ctx = injector.create_context();
    ///
    /// let resolved = ctx.with_scope(|scope| {
    ///     assert_eq!(scope.scope_depth(), 1);
    ///     scope.get::<Unit>().is_ok()
    /// });
    /// assert!(resolved);
    /// assert_eq!(ctx.scope_depth(), 0);
    /// ```
    pub fn with_scope<R>(&self, f: impl FnOnce(&InjectionContext) -> R) -> R {
        let scope = self.create_scope();
        f(&scope)
    }

    /// Number of currently open scopes.
    pub fn scope_depth(&self) -> usize {
        self.scopes.borrow().len()
    }

    /// Whether at least one scope is open.
    pub fn in_scope(&self) -> bool {
        !self.scopes.borrow().is_empty()
    }

    /// Pops the frame `id` and every frame above it, closing them innermost first.
    pub(super) fn close_scope(&self, id: u64) {
        let (base, closed) = {
            let mut scopes = self.scopes.borrow_mut();
            let Some(pos) = scopes.iter().position(|frame| frame.id == id) else {
                return;
            };
            if pos + 1 != scopes.len() {
                tracing::warn!(
                    scope = id,
                    discarded = scopes.len() - pos - 1,
                    "scope closed before its nested scopes; discarding them"
                );
            }
            (pos, scopes.split_off(pos))
        };

        // Hooks may resolve services, so run them with the stack released.
        for (offset, frame) in closed.into_iter().enumerate().rev() {
            tracing::debug!(scope = frame.id, depth = base + offset + 1, "scope closed");
            frame.close();
        }
    }

    fn resolve_registered(&self, key: &Key, reg: &Registration) -> DiResult<AnyArc> {
        let inner = self.injector.inner();

        if reg.lifetime == Lifetime::Scoped {
            if let Some(singleton) = self.path.enclosing_singleton() {
                return Err(DiError::CaptiveScoped {
                    singleton,
                    scoped: key.display_name(),
                });
            }
        }

        let _guard = self.path.enter(key, reg.lifetime, inner.options.max_depth)?;

        match reg.lifetime {
            Lifetime::Singleton => inner.singletons.get_or_create(key, || reg.create(self)),
            Lifetime::Scoped => self.resolve_scoped(key, reg),
            Lifetime::PerRequest => reg.create(self),
        }
    }

    fn resolve_scoped(&self, key: &Key, reg: &Registration) -> DiResult<AnyArc> {
        let frame_id = {
            let scopes = self.scopes.borrow();
            let frame = scopes
                .last()
                .ok_or(DiError::NoActiveScope(key.display_name()))?;
            if let Some(cached) = frame.instances.get(key) {
                return Ok(cached.clone());
            }
            frame.id
        };

        // The provider may open and close scopes of its own, so the stack is
        // not borrowed while it runs.
        let value = reg.create(self)?;

        let mut scopes = self.scopes.borrow_mut();
        match scopes.iter_mut().rev().find(|frame| frame.id == frame_id) {
            Some(frame) => Ok(frame.instances.entry(key.clone()).or_insert(value).clone()),
            None => Ok(value),
        }
    }
}

impl ResolverCore for InjectionContext {
    fn get_instance(&self, key: &Key) -> DiResult<AnyArc> {
        let inner = self.injector.inner();
        let reg = inner
            .registry
            .get(key)
            .ok_or(DiError::NotFound(key.display_name()))?;

        tracing::trace!(service = %key, lifetime = %reg.lifetime, "resolving");

        if !inner.observers.has_observers() {
            let result = self.resolve_registered(key, reg);
            tracing::trace!(service = %key, ok = result.is_ok(), "resolution finished");
            return result;
        }

        let start = Instant::now();
        inner.observers.resolving(key, reg.lifetime);
        let result = self.resolve_registered(key, reg);
        match &result {
            Ok(_) => inner.observers.resolved(key, start.elapsed()),
            Err(err) => inner.observers.construction_failed(key, err),
        }
        tracing::trace!(service = %key, ok = result.is_ok(), "resolution finished");
        result
    }

    fn push_disposer(&self, f: Box<dyn FnOnce() + Send>) {
        if self.path.enclosing_singleton().is_none() {
            if let Some(frame) = self.scopes.borrow_mut().last_mut() {
                frame.disposers.push(f);
                return;
            }
        }
        self.injector.push_root_disposer(f);
    }
}

impl Resolver for InjectionContext {}

impl fmt::Debug for InjectionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InjectionContext")
            .field("scope_depth", &self.scope_depth())
            .field("resolving", &self.path.depth())
            .finish()
    }
}
