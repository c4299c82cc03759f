//! Hash-partitioned composition of N independent engines.
//!
//! Each shard is an ordinary engine behind its own mutex; a key's hash picks
//! the shard, so concurrent operations on different shards never contend.
//! There are no cross-shard operations and no cross-shard ordering
//! guarantees.
//!
//! Per-shard capacity is `ceil(total / n)`, so the combined live capacity
//! may exceed the requested total by up to `n - 1`.

use std::hash::Hash;

use parking_lot::Mutex;

use crate::ds::shard::{ShardSelector, default_shard_count};
use crate::policy::lfu::LfuCache;
use crate::policy::lru::LruCache;
use crate::traits::Cache;

/// Cache wrapper routing every key to one of N sub-engines by hash.
///
/// # Example
///
/// ```
/// use evictkit::policy::sharded::ShardedCache;
///
/// let cache = ShardedCache::lru(32, 4);
/// for key in 0u64..8 {
///     cache.put(key, key * 10);
/// }
/// assert_eq!(cache.get(&3), Some(30));
/// assert_eq!(cache.shard_count(), 4);
/// ```
#[derive(Debug)]
pub struct ShardedCache<C> {
    shards: Vec<Mutex<C>>,
    selector: ShardSelector,
}

impl<C> ShardedCache<C> {
    /// Builds `shard_count` engines of capacity `ceil(total_capacity /
    /// shard_count)` each, constructed by `build`.
    ///
    /// A `shard_count` of 0 selects the available hardware parallelism.
    pub fn with_shards(
        total_capacity: usize,
        shard_count: usize,
        build: impl FnMut(usize) -> C,
    ) -> Self {
        let mut build = build;
        let count = if shard_count == 0 {
            default_shard_count()
        } else {
            shard_count
        };
        let per_shard = total_capacity.div_ceil(count);
        Self {
            shards: (0..count).map(|_| Mutex::new(build(per_shard))).collect(),
            selector: ShardSelector::new(count, 0),
        }
    }

    /// Returns the number of shards.
    #[inline]
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Returns the shard index `key` routes to.
    pub fn shard_for_key<K: Hash>(&self, key: &K) -> usize {
        self.selector.shard_for_key(key)
    }

    /// Runs `f` on the locked engine of shard `index`, for per-shard
    /// accessors the trait does not cover.
    ///
    /// # Panics
    ///
    /// Panics if `index >= shard_count()`.
    pub fn with_shard<R>(&self, index: usize, f: impl FnOnce(&mut C) -> R) -> R {
        let mut guard = self.shards[index].lock();
        f(&mut guard)
    }

    /// Inserts or updates an entry in the owning shard.
    pub fn put<K, V>(&self, key: K, value: V)
    where
        K: Hash,
        C: Cache<K, V>,
    {
        let shard = self.selector.shard_for_key(&key);
        self.shards[shard].lock().put(key, value)
    }

    /// Copies the value out of the owning shard on a hit.
    pub fn get<K, V>(&self, key: &K) -> Option<V>
    where
        K: Hash,
        C: Cache<K, V>,
    {
        let shard = self.selector.shard_for_key(key);
        self.shards[shard].lock().get(key)
    }

    /// Convenience form of [`get`](Self::get) returning `V::default()` on a
    /// miss.
    pub fn get_or_default<K, V>(&self, key: &K) -> V
    where
        K: Hash,
        C: Cache<K, V>,
        V: Default,
    {
        self.get(key).unwrap_or_default()
    }
}

impl<K, V> ShardedCache<LruCache<K, V>>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Sharded LRU: `total_capacity` split over `shard_count` LRU engines.
    pub fn lru(total_capacity: usize, shard_count: usize) -> Self {
        Self::with_shards(total_capacity, shard_count, LruCache::new)
    }
}

impl<K, V> ShardedCache<LfuCache<K, V>>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Sharded LFU with the given aging threshold per shard.
    pub fn lfu(total_capacity: usize, shard_count: usize, max_avg: u64) -> Self {
        Self::with_shards(total_capacity, shard_count, |capacity| {
            LfuCache::with_max_avg(capacity, max_avg)
        })
    }
}

impl<K, V, C> Cache<K, V> for ShardedCache<C>
where
    K: Hash,
    C: Cache<K, V>,
{
    fn put(&mut self, key: K, value: V) {
        ShardedCache::put(self, key, value)
    }

    fn get(&mut self, key: &K) -> Option<V> {
        ShardedCache::get(self, key)
    }
}
