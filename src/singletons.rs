//! Singleton instance cache.
//!
//! One `OnceCell` per singleton key, allocated when the injector is built. The
//! map itself is never mutated afterwards, so lookups of created singletons
//! take no lock. First initialisation also records which thread is building
//! each key and which key each blocked thread is waiting for. A request that
//! would close a wait cycle (a thread re-entering a key it is already building
//! through another context, or two threads building `A -> B` and `B -> A`)
//! fails with [`DiError::Circular`] instead of blocking on the cell.

use std::collections::HashMap;
use std::thread::{self, ThreadId};

use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use crate::registration::{AnyArc, Registry};
use crate::{DiError, DiResult, Key, Lifetime};

#[derive(Default)]
struct InFlight {
    /// Thread running the provider of each singleton under construction
    builders: HashMap<Key, ThreadId>,
    /// Singleton each blocked thread is waiting on
    waiting: HashMap<ThreadId, Key>,
}

impl InFlight {
    /// Follows builder and waiter links from `key`. Returns the key chain when
    /// it leads back to `me`.
    fn cycle_from(&self, me: ThreadId, key: &Key) -> Option<Vec<&'static str>> {
        let mut path = vec![key.display_name()];
        let mut builder = *self.builders.get(key)?;
        while path.len() <= self.waiting.len() + 1 {
            if builder == me {
                path.push(key.display_name());
                return Some(path);
            }
            let next = self.waiting.get(&builder)?;
            path.push(next.display_name());
            builder = *self.builders.get(next)?;
        }
        None
    }
}

enum Record {
    Waiting(ThreadId),
    Building(Key),
}

/// Removes one in-flight record when dropped, unwinding included.
struct RecordGuard<'a> {
    in_flight: &'a Mutex<InFlight>,
    record: Record,
}

impl Drop for RecordGuard<'_> {
    fn drop(&mut self) {
        let mut in_flight = self.in_flight.lock();
        match &self.record {
            Record::Waiting(thread) => {
                in_flight.waiting.remove(thread);
            }
            Record::Building(key) => {
                in_flight.builders.remove(key);
            }
        }
    }
}

pub(crate) struct SingletonCache {
    cells: HashMap<Key, OnceCell<AnyArc>>,
    in_flight: Mutex<InFlight>,
}

impl SingletonCache {
    pub(crate) fn for_registry(registry: &Registry) -> Self {
        let cells = registry
            .iter()
            .filter(|(_, reg)| reg.lifetime == Lifetime::Singleton)
            .map(|(key, _)| (key.clone(), OnceCell::new()))
            .collect();
        Self {
            cells,
            in_flight: Mutex::new(InFlight::default()),
        }
    }

    /// Returns the cached instance, running `create` at most once per key.
    ///
    /// A failed `create` leaves the cell empty so the next caller retries.
    pub(crate) fn get_or_create<F>(&self, key: &Key, create: F) -> DiResult<AnyArc>
    where
        F: FnOnce() -> DiResult<AnyArc>,
    {
        let cell = self
            .cells
            .get(key)
            .ok_or(DiError::NotFound(key.display_name()))?;

        if let Some(value) = cell.get() {
            return Ok(value.clone());
        }

        let me = thread::current().id();
        let _waiting = {
            let mut in_flight = self.in_flight.lock();
            if let Some(path) = in_flight.cycle_from(me, key) {
                tracing::debug!(service = key.display_name(), "singleton wait cycle detected");
                return Err(DiError::Circular(path));
            }
            in_flight.waiting.insert(me, key.clone());
            RecordGuard {
                in_flight: &self.in_flight,
                record: Record::Waiting(me),
            }
        };

        cell.get_or_try_init(|| {
            let _building = {
                let mut in_flight = self.in_flight.lock();
                in_flight.waiting.remove(&me);
                in_flight.builders.insert(key.clone(), me);
                RecordGuard {
                    in_flight: &self.in_flight,
                    record: Record::Building(key.clone()),
                }
            };
            let value = create()?;
            tracing::debug!(service = key.display_name(), "singleton created");
            Ok(value)
        })
        .cloned()
    }

    pub(crate) fn is_created(&self, key: &Key) -> bool {
        self.cells.get(key).map_or(false, |cell| cell.get().is_some())
    }

    pub(crate) fn created_count(&self) -> usize {
        self.cells.values().filter(|cell| cell.get().is_some()).count()
    }
}
