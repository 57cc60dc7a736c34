//! Memoizing cache with independent namespaces
//!
//! [`NamespacedCache`] is the "build once, reuse many" primitive behind the
//! registry: a gateway shared by many datasets is constructed through the cache
//! exactly once, and every later request for the same key returns the identical
//! value (the same `Arc`, not an equal copy).
//!
//! # Architecture
//!
//! - **Lock-free map access**: entries live in a [`DashMap`], so lookups on
//!   different keys never contend on a global lock.
//! - **Per-key slots**: each key owns a `Mutex<Option<V>>` slot. The map guard
//!   is released before the slot is locked, so a compute block may itself use
//!   the cache for *other* keys or namespaces without deadlocking.
//! - **Namespaces**: [`NamespacedCache::namespaced`] returns a child cache with
//!   its own key space. Asking for the same namespace twice returns the same
//!   child.
//!
//! # Concurrency Guarantees
//!
//! Under concurrent [`fetch_or_store`](NamespacedCache::fetch_or_store) calls
//! for one key, exactly one caller runs its compute block; the others block on
//! the slot and then observe the stored value. A failed
//! [`try_fetch_or_store`](NamespacedCache::try_fetch_or_store) leaves the slot
//! empty so a later call may retry.
//!
//! A compute block must not request its own key again: the slot lock is not
//! reentrant.
//!
//! # Example
//!
//! ```rust
//! use ormkit_registry::cache::NamespacedCache;
//! use std::sync::Arc;
//!
//! let cache: NamespacedCache<String, Arc<String>> = NamespacedCache::new();
//! let first = cache.fetch_or_store("key".to_string(), || Arc::new("value".to_string()));
//! let second = cache.fetch_or_store("key".to_string(), || Arc::new("other".to_string()));
//! assert!(Arc::ptr_eq(&first, &second));
//!
//! let stuff = cache.namespaced("stuff");
//! assert!(stuff.fetch(&"key".to_string()).is_none());
//! ```

use dashmap::DashMap;
use std::convert::Infallible;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::trace;

type Slot<V> = Arc<Mutex<Option<V>>>;

/// Cache of built component instances, keyed by string.
pub type InstanceCache = NamespacedCache<String, crate::core::Instance>;

/// A memoizing key/value store partitioned into independent namespaces.
///
/// Values are cloned out of the cache, so `V` is normally an `Arc` (or
/// another cheap handle) and clones share identity with the stored value.
pub struct NamespacedCache<K, V> {
    /// Dotted namespace path, `None` for a root cache
    name: Option<String>,
    /// Memoized entries of this namespace only
    entries: DashMap<K, Slot<V>>,
    /// Child caches by namespace name
    namespaces: DashMap<String, Arc<NamespacedCache<K, V>>>,
}

impl<K, V> NamespacedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create an empty root cache.
    pub fn new() -> Self {
        Self {
            name: None,
            entries: DashMap::new(),
            namespaces: DashMap::new(),
        }
    }

    fn child(name: String) -> Self {
        Self {
            name: Some(name),
            entries: DashMap::new(),
            namespaces: DashMap::new(),
        }
    }

    /// Full dotted name of this namespace, `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Return the child cache for `namespace`, creating it on first use.
    ///
    /// Children never see or shadow the entries of their parent, and two
    /// calls with the same name return the same child.
    pub fn namespaced(&self, namespace: &str) -> Arc<Self> {
        self.namespaces
            .entry(namespace.to_string())
            .or_insert_with(|| {
                let full = match &self.name {
                    Some(parent) => format!("{parent}.{namespace}"),
                    None => namespace.to_string(),
                };
                Arc::new(Self::child(full))
            })
            .clone()
    }

    /// Return the value stored under `key`, computing and storing it first if
    /// the key has no entry.
    ///
    /// `compute` runs at most once per key for the lifetime of the cache.
    pub fn fetch_or_store<F>(&self, key: K, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        match self.try_fetch_or_store(key, || Ok::<V, Infallible>(compute())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Fallible variant of [`fetch_or_store`](Self::fetch_or_store).
    ///
    /// When `compute` fails, nothing is stored and the error is returned.
    pub fn try_fetch_or_store<E, F>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.fetch(&key) {
            trace!(namespace = self.name.as_deref().unwrap_or("<root>"), "cache hit");
            return Ok(value);
        }

        // The map guard must be dropped before locking the slot.
        let slot = Arc::clone(
            self.entries.entry(key).or_insert_with(|| Arc::new(Mutex::new(None))).value(),
        );

        let mut stored = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(value) = stored.as_ref() {
            trace!(namespace = self.name.as_deref().unwrap_or("<root>"), "cache hit after wait");
            return Ok(value.clone());
        }

        trace!(namespace = self.name.as_deref().unwrap_or("<root>"), "cache miss");
        let value = compute()?;
        *stored = Some(value.clone());
        Ok(value)
    }

    /// Return the value stored under `key` without computing anything.
    pub fn fetch(&self, key: &K) -> Option<V> {
        let slot = self.entries.get(key).map(|entry| Arc::clone(entry.value()))?;
        let stored = slot.lock().unwrap_or_else(PoisonError::into_inner);
        stored.clone()
    }

    /// Whether a value is stored under `key`.
    pub fn contains_key(&self, key: &K) -> bool {
        self.fetch(key).is_some()
    }

    /// Number of stored values in this namespace, children excluded.
    pub fn len(&self) -> usize {
        let slots: Vec<Slot<V>> =
            self.entries.iter().map(|entry| Arc::clone(entry.value())).collect();
        slots
            .iter()
            .filter(|slot| slot.lock().unwrap_or_else(PoisonError::into_inner).is_some())
            .count()
    }

    /// Whether this namespace holds no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> Default for NamespacedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for NamespacedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamespacedCache")
            .field("name", &self.name)
            .field("entries", &self.len())
            .field("namespaces", &self.namespaces.len())
            .finish()
    }
}
