//! Circular dependency detection infrastructure.
//!
//! Each [`InjectionContext`](crate::InjectionContext) owns one path: the keys
//! currently being constructed on its call stack. A key that shows up twice is
//! a cycle. The path is checked before any singleton cell is entered, so a
//! self-referential singleton fails instead of blocking on its own cell.

use std::cell::RefCell;

use smallvec::SmallVec;

use crate::{DiError, DiResult, Key, Lifetime};

struct PathEntry {
    key: Key,
    lifetime: Lifetime,
}

#[derive(Default)]
pub(crate) struct ResolutionPath {
    entries: RefCell<SmallVec<[PathEntry; 8]>>,
}

impl ResolutionPath {
    /// Pushes `key`, failing on a cycle or when `max_depth` keys are already in flight.
    pub(crate) fn enter(&self, key: &Key, lifetime: Lifetime, max_depth: usize) -> DiResult<PathGuard<'_>> {
        let mut entries = self.entries.borrow_mut();

        if entries.iter().any(|e| &e.key == key) {
            let mut path: Vec<&'static str> = entries.iter().map(|e| e.key.display_name()).collect();
            path.push(key.display_name());
            return Err(DiError::Circular(path));
        }

        if entries.len() >= max_depth {
            return Err(DiError::DepthExceeded(entries.len()));
        }

        entries.push(PathEntry {
            key: key.clone(),
            lifetime,
        });
        Ok(PathGuard { path: self })
    }

    /// Innermost singleton currently under construction, if any.
    pub(crate) fn enclosing_singleton(&self) -> Option<&'static str> {
        self.entries
            .borrow()
            .iter()
            .rev()
            .find(|e| e.lifetime == Lifetime::Singleton)
            .map(|e| e.key.display_name())
    }

    pub(crate) fn depth(&self) -> usize {
        self.entries.borrow().len()
    }
}

/// Pops its entry on drop, including during unwinding.
pub(crate) struct PathGuard<'a> {
    path: &'a ResolutionPath,
}

impl Drop for PathGuard<'_> {
    fn drop(&mut self) {
        self.path.entries.borrow_mut().pop();
    }
}
