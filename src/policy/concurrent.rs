//! Thread-safe wrapper putting any engine behind one mutex.
//!
//! Engines are single-threaded cores; `SharedCache` gives one of them the
//! one-lock-per-engine concurrency model: every operation holds the mutex
//! for its whole duration, so operations on a given engine are linearizable.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::traits::{Cache, RemovableCache};

/// Cloneable handle to a mutex-guarded engine.
///
/// # Example
///
/// ```
/// use evictkit::policy::concurrent::SharedCache;
/// use evictkit::policy::lru::LruCache;
///
/// let cache = SharedCache::new(LruCache::new(64));
/// let writer = cache.clone();
///
/// let handle = std::thread::spawn(move || {
///     writer.put(1u64, "from another thread");
/// });
/// handle.join().unwrap();
///
/// assert_eq!(cache.get(&1), Some("from another thread"));
/// ```
#[derive(Debug)]
pub struct SharedCache<C> {
    inner: Arc<Mutex<C>>,
}

impl<C> Clone for SharedCache<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C> SharedCache<C> {
    /// Wraps an engine behind a mutex.
    pub fn new(cache: C) -> Self {
        Self {
            inner: Arc::new(Mutex::new(cache)),
        }
    }

    /// Inserts or updates an entry.
    pub fn put<K, V>(&self, key: K, value: V)
    where
        C: Cache<K, V>,
    {
        self.inner.lock().put(key, value)
    }

    /// Copies the value out on a hit and registers the access.
    pub fn get<K, V>(&self, key: &K) -> Option<V>
    where
        C: Cache<K, V>,
    {
        self.inner.lock().get(key)
    }

    /// Convenience form of [`get`](Self::get) returning `V::default()` on a
    /// miss.
    pub fn get_or_default<K, V>(&self, key: &K) -> V
    where
        C: Cache<K, V>,
        V: Default,
    {
        self.inner.lock().get(key).unwrap_or_default()
    }

    /// Deletes the live entry for `key` if present.
    pub fn remove<K, V>(&self, key: &K)
    where
        C: RemovableCache<K, V>,
    {
        self.inner.lock().remove(key)
    }

    /// Runs `f` on the locked engine, for accessors the trait does not
    /// cover (`len`, `check_invariants`, ...).
    pub fn with<R>(&self, f: impl FnOnce(&mut C) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }
}
