//! Object store: ledger objects keyed by identity
//!
//! Each object lives in its own `DashMap` entry. `with_mut` holds that entry's
//! write lock for the whole closure, so two operations on the same object are
//! serialized while operations on different objects proceed in parallel.
//!
//! Closures passed to `with`/`with_mut` must not call back into the same
//! store: the entry lock is not reentrant.

use std::hash::Hash;

use dashmap::DashMap;

#[derive(Debug)]
pub struct ObjectStore<K, T>
where
    K: Eq + Hash,
{
    objects: DashMap<K, T>,
}

impl<K, T> ObjectStore<K, T>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            objects: DashMap::new(),
        }
    }

    /// Insert a new object. Returns the object previously stored under `id`.
    pub fn insert(&self, id: K, object: T) -> Option<T> {
        self.objects.insert(id, object)
    }

    /// Run `f` with exclusive access to one object.
    ///
    /// Returns `None` if no object is stored under `id`.
    pub fn with_mut<R>(&self, id: &K, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.objects.get_mut(id).map(|mut entry| f(&mut *entry))
    }

    /// Run `f` with shared access to one object.
    pub fn with<R>(&self, id: &K, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.objects.get(id).map(|entry| f(&*entry))
    }

    /// Remove an object only if `predicate` holds for it, atomically.
    pub fn remove_if(&self, id: &K, predicate: impl FnOnce(&T) -> bool) -> Option<T> {
        self.objects
            .remove_if(id, |_, object| predicate(object))
            .map(|(_, object)| object)
    }

    pub fn contains(&self, id: &K) -> bool {
        self.objects.contains_key(id)
    }

    /// Identities of all stored objects, in no particular order.
    pub fn ids(&self) -> Vec<K> {
        self.objects.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl<K, T> Default for ObjectStore<K, T>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
