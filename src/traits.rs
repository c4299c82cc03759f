//! # Cache Trait Hierarchy
//!
//! The interface shared by every eviction engine in the crate, so callers can
//! switch policies without code changes.
//!
//! ```text
//!            ┌──────────────────────────────────────┐
//!            │            Cache<K, V>               │
//!            │                                      │
//!            │  put(&mut, K, V)                     │
//!            │  get(&mut, &K) → Option<V>           │
//!            │  get_or_default(&mut, &K) → V        │
//!            └──────────────────┬───────────────────┘
//!                               │
//!                               ▼
//!            ┌──────────────────────────────────────┐
//!            │       RemovableCache<K, V>           │
//!            │                                      │
//!            │  remove(&mut, &K)                    │
//!            └──────────────────────────────────────┘
//! ```
//!
//! | Trait            | Implementors                                          |
//! |------------------|-------------------------------------------------------|
//! | `Cache`          | `LruCache`, `LfuCache`, `AdaptiveCache`, `LruKCache`, `ShardedCache`, `PolicyCache` |
//! | `RemovableCache` | `LruCache` only                                       |
//!
//! `remove` lives on a separate trait because most policies do not support
//! arbitrary deletion: plucking an entry out of an LFU bucket or an ARC side
//! list would leave its history counters meaningless. The recency engine has
//! no such state, and the LRU-K wrapper needs removal on its inner history
//! cache to forget promoted keys.
//!
//! Values move across this boundary by value: `get` clones the stored `V`
//! out, and no reference to cache-owned data escapes an operation. Keys need
//! `Eq + Hash + Clone`; no ordering is required.

/// Operations common to every eviction engine.
///
/// # Example
///
/// ```
/// use evictkit::traits::Cache;
/// use evictkit::policy::lru::LruCache;
/// use evictkit::policy::lfu::LfuCache;
///
/// fn warm<C: Cache<u64, String>>(cache: &mut C, data: &[(u64, String)]) {
///     for (key, value) in data {
///         cache.put(*key, value.clone());
///     }
/// }
///
/// let mut lru = LruCache::new(16);
/// let mut lfu = LfuCache::new(16);
/// let data = [(1, "one".to_string()), (2, "two".to_string())];
/// warm(&mut lru, &data);
/// warm(&mut lfu, &data);
/// assert_eq!(lru.get(&1), Some("one".to_string()));
/// assert_eq!(lfu.get(&2), Some("two".to_string()));
/// ```
pub trait Cache<K, V> {
    /// Inserts or updates an entry.
    ///
    /// If `key` is already live its value is replaced and the entry is marked
    /// recently used according to the policy. Otherwise a new entry is
    /// admitted, evicting at most one live entry if the cache is full. With
    /// capacity 0 this is a no-op.
    fn put(&mut self, key: K, value: V);

    /// Copies the value out on a hit and registers the access.
    ///
    /// A hit updates the entry's position or counter according to the policy
    /// (MRU move, frequency bump, promotion). Returns `None` on a miss.
    fn get(&mut self, key: &K) -> Option<V>;

    /// Convenience form of [`get`](Cache::get) returning `V::default()` on a
    /// miss.
    ///
    /// Callers that need to distinguish a miss from a stored default value
    /// should use `get`.
    ///
    /// # Example
    ///
    /// ```
    /// use evictkit::traits::Cache;
    /// use evictkit::policy::lru::LruCache;
    ///
    /// let mut cache: LruCache<u32, u32> = LruCache::new(4);
    /// cache.put(1, 10);
    /// assert_eq!(cache.get_or_default(&1), 10);
    /// assert_eq!(cache.get_or_default(&9), 0);
    /// ```
    fn get_or_default(&mut self, key: &K) -> V
    where
        V: Default,
        Self: Sized,
    {
        self.get(key).unwrap_or_default()
    }
}

/// Caches that additionally support arbitrary key-based removal.
///
/// # Example
///
/// ```
/// use evictkit::traits::{Cache, RemovableCache};
/// use evictkit::policy::lru::LruCache;
///
/// let mut cache = LruCache::new(4);
/// cache.put(1, "one");
/// cache.remove(&1);
/// assert_eq!(cache.get(&1), None);
///
/// // Removing an absent key is a no-op.
/// cache.remove(&42);
/// ```
pub trait RemovableCache<K, V>: Cache<K, V> {
    /// Deletes the live entry for `key` if present.
    fn remove(&mut self, key: &K);
}
