//! Local list projection with optimistic patches and wholesale reconcile.
//!
//! A board patches its local copy immediately, sends the mutation, and on
//! failure re-fetches and calls [`ReconciledList::replace_all`]. Patches
//! are never rolled back one by one.

use crate::types::DbId;

/// Entities addressable by backend id.
pub trait Identified {
    fn id(&self) -> DbId;
}

#[derive(Debug, Clone)]
pub struct ReconciledList<T> {
    items: Vec<T>,
    /// Bumped on every wholesale replacement.
    generation: u64,
}

impl<T> Default for ReconciledList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            generation: 0,
        }
    }
}

impl<T: Identified> ReconciledList<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            generation: 1,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get(&self, id: DbId) -> Option<&T> {
        self.items.iter().find(|i| i.id() == id)
    }

    /// Replace the whole projection with fresh data from the source of truth.
    pub fn replace_all(&mut self, items: Vec<T>) {
        self.items = items;
        self.generation += 1;
    }

    /// Apply `f` to the item with `id`. Returns `false` if it is not present.
    pub fn patch<F>(&mut self, id: DbId, f: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        match self.items.iter_mut().find(|i| i.id() == id) {
            Some(item) => {
                f(item);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: DbId) -> Option<T> {
        let pos = self.items.iter().position(|i| i.id() == id)?;
        Some(self.items.remove(pos))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
