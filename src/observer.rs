//! Diagnostic observers for resolution events.
//!
//! Observers are attached to a [`ServiceCollection`](crate::ServiceCollection)
//! before `build()` and are called synchronously around every resolution,
//! including nested ones. With no observers attached the hooks cost a single
//! emptiness check.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::{DiError, Key, Lifetime};

/// Observer trait for dependency injection resolution events.
///
/// Keep implementations lightweight: they run on the resolving thread, inside
/// any singleton initialisation that is in progress.
///
/// # Examples
///
/// ```
/// use lifestyle_di::{DiError, DiObserver, Key, Lifetime, ServiceCollection};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// struct PrintObserver;
///
/// impl DiObserver for PrintObserver {
///     fn resolving(&self, key: &Key, lifetime: Lifetime) {
///         println!("resolving {} ({})", key, lifetime);
///     }
///
///     fn resolved(&self, key: &Key, duration: Duration) {
///         println!("resolved {} in {:?}", key, duration);
///     }
///
///     fn construction_failed(&self, key: &Key, error: &DiError) {
///         println!("failed {}: {}", key, error);
///     }
/// }
///
/// let mut services = ServiceCollection::new();
/// services.add_observer(Arc::new(PrintObserver));
/// let injector = services.build();
/// ```
pub trait DiObserver: Send + Sync {
    /// Called before a registered key is resolved.
    fn resolving(&self, key: &Key, lifetime: Lifetime);

    /// Called after a successful resolution, cached or constructed.
    fn resolved(&self, key: &Key, duration: Duration);

    /// Called when resolving `key` fails, including failures of its dependencies.
    fn construction_failed(&self, key: &Key, error: &DiError);
}

#[derive(Default)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn DiObserver>>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, observer: Arc<dyn DiObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    #[inline]
    pub(crate) fn resolving(&self, key: &Key, lifetime: Lifetime) {
        for observer in &self.observers {
            observer.resolving(key, lifetime);
        }
    }

    #[inline]
    pub(crate) fn resolved(&self, key: &Key, duration: Duration) {
        for observer in &self.observers {
            observer.resolved(key, duration);
        }
    }

    #[inline]
    pub(crate) fn construction_failed(&self, key: &Key, error: &DiError) {
        for observer in &self.observers {
            observer.construction_failed(key, error);
        }
    }
}

/// Observer that forwards events to `tracing`.
///
/// Events are emitted at `debug` (resolved) and `warn` (failures) under the
/// `lifestyle_di::observer` target, tagged with the observer's label so several
/// injectors can be told apart in one log stream.
///
/// ```
/// use lifestyle_di::{ServiceCollection, TracingObserver};
/// use std::sync::Arc;
///
/// let mut services = ServiceCollection::new();
/// services.add_observer(Arc::new(TracingObserver::with_label("release")));
/// let injector = services.build();
/// ```
pub struct TracingObserver {
    label: String,
}

impl TracingObserver {
    pub fn new() -> Self {
        Self::with_label("lifestyle-di")
    }

    pub fn with_label(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl DiObserver for TracingObserver {
    fn resolving(&self, key: &Key, lifetime: Lifetime) {
        tracing::trace!(
            target: "lifestyle_di::observer",
            injector = %self.label,
            service = %key,
            %lifetime,
            "resolving"
        );
    }

    fn resolved(&self, key: &Key, duration: Duration) {
        tracing::debug!(
            target: "lifestyle_di::observer",
            injector = %self.label,
            service = %key,
            elapsed_us = duration.as_micros() as u64,
            "resolved"
        );
    }

    fn construction_failed(&self, key: &Key, error: &DiError) {
        tracing::warn!(
            target: "lifestyle_di::observer",
            injector = %self.label,
            service = %key,
            %error,
            "resolution failed"
        );
    }
}

/// Observer that counts resolutions and failures.
///
/// Useful in tests and for a quick look at how hot the container is.
#[derive(Default)]
pub struct MetricsObserver {
    resolution_count: AtomicU64,
    failure_count: AtomicU64,
    total_resolution_time: AtomicU64,
}

impl MetricsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful resolutions observed.
    pub fn resolution_count(&self) -> u64 {
        self.resolution_count.load(Ordering::Relaxed)
    }

    /// Number of failed resolutions observed.
    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    pub fn total_resolution_time(&self) -> Duration {
        Duration::from_nanos(self.total_resolution_time.load(Ordering::Relaxed))
    }

    pub fn average_resolution_time(&self) -> Option<Duration> {
        let count = self.resolution_count();
        if count == 0 {
            return None;
        }
        let total_nanos = self.total_resolution_time.load(Ordering::Relaxed);
        Some(Duration::from_nanos(total_nanos / count))
    }

    pub fn reset(&self) {
        self.resolution_count.store(0, Ordering::Relaxed);
        self.failure_count.store(0, Ordering::Relaxed);
        self.total_resolution_time.store(0, Ordering::Relaxed);
    }
}

impl DiObserver for MetricsObserver {
    fn resolving(&self, _key: &Key, _lifetime: Lifetime) {}

    fn resolved(&self, _key: &Key, duration: Duration) {
        self.resolution_count.fetch_add(1, Ordering::Relaxed);
        self.total_resolution_time
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    fn construction_failed(&self, _key: &Key, _error: &DiError) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }
}
