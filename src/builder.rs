//! Unified construction of the eviction engines behind one handle.
//!
//! ## Example
//!
//! ```
//! use evictkit::builder::{CacheBuilder, Policy};
//! use evictkit::traits::Cache;
//!
//! let mut cache = CacheBuilder::new(100).build::<u64, String>(Policy::Lru);
//! cache.put(1, "hello".to_string());
//! assert_eq!(cache.get(&1), Some("hello".to_string()));
//! ```

use std::hash::Hash;

use crate::policy::adaptive::AdaptiveCache;
use crate::policy::lfu::LfuCache;
use crate::policy::lru::LruCache;
use crate::policy::lru_k::LruKCache;
use crate::traits::Cache;

/// Available eviction policies and their per-policy parameters.
#[derive(Debug, Clone)]
pub enum Policy {
    /// Least Recently Used eviction.
    Lru,
    /// LRU with K-observation admission filtering.
    LruK { history_capacity: usize, k: u64 },
    /// Least Frequently Used eviction with mean-triggered aging.
    Lfu { max_avg: u64 },
    /// Adaptive Replacement Cache balancing recency and frequency.
    Adaptive { transform_threshold: usize },
}

/// Builder for [`PolicyCache`] handles.
pub struct CacheBuilder {
    capacity: usize,
}

impl CacheBuilder {
    /// Creates a builder for caches of the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Builds a cache with the chosen policy.
    pub fn build<K, V>(self, policy: Policy) -> PolicyCache<K, V>
    where
        K: Eq + Hash + Clone,
        V: Clone,
    {
        let inner = match policy {
            Policy::Lru => Inner::Lru(LruCache::new(self.capacity)),
            Policy::LruK {
                history_capacity,
                k,
            } => Inner::LruK(LruKCache::new(self.capacity, history_capacity, k)),
            Policy::Lfu { max_avg } => Inner::Lfu(LfuCache::with_max_avg(self.capacity, max_avg)),
            Policy::Adaptive {
                transform_threshold,
            } => Inner::Adaptive(AdaptiveCache::with_transform_threshold(
                self.capacity,
                transform_threshold,
            )),
        };
        PolicyCache { inner }
    }
}

enum Inner<K, V> {
    Lru(LruCache<K, V>),
    LruK(LruKCache<K, V>),
    Lfu(LfuCache<K, V>),
    Adaptive(AdaptiveCache<K, V>),
}

/// Policy-agnostic cache handle; dispatches to the engine chosen at build
/// time.
pub struct PolicyCache<K, V> {
    inner: Inner<K, V>,
}

impl<K, V> Cache<K, V> for PolicyCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn put(&mut self, key: K, value: V) {
        match &mut self.inner {
            Inner::Lru(cache) => cache.put(key, value),
            Inner::LruK(cache) => cache.put(key, value),
            Inner::Lfu(cache) => cache.put(key, value),
            Inner::Adaptive(cache) => cache.put(key, value),
        }
    }

    fn get(&mut self, key: &K) -> Option<V> {
        match &mut self.inner {
            Inner::Lru(cache) => cache.get(key),
            Inner::LruK(cache) => cache.get(key),
            Inner::Lfu(cache) => cache.get(key),
            Inner::Adaptive(cache) => cache.get(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_policies_serve_basic_ops() {
        let policies = [
            Policy::Lru,
            Policy::LruK {
                history_capacity: 8,
                k: 1,
            },
            Policy::Lfu { max_avg: 10 },
            Policy::Adaptive {
                transform_threshold: 2,
            },
        ];

        for policy in policies {
            let mut cache = CacheBuilder::new(8).build::<u64, String>(policy.clone());
            cache.put(1, "one".to_string());
            cache.put(2, "two".to_string());
            assert_eq!(cache.get(&1), Some("one".to_string()), "{policy:?}");
            assert_eq!(cache.get(&3), None, "{policy:?}");
            assert_eq!(cache.get_or_default(&3), String::new(), "{policy:?}");

            cache.put(1, "ONE".to_string());
            assert_eq!(cache.get(&1), Some("ONE".to_string()), "{policy:?}");
        }
    }

    #[test]
    fn policies_disagree_on_victims() {
        // Same access trace, different evictions: the handle really does
        // dispatch to different engines.
        let trace = |cache: &mut PolicyCache<u64, u64>| {
            cache.put(1, 1);
            cache.put(2, 2);
            cache.get(&1);
            cache.get(&1);
            cache.get(&2);
            cache.put(3, 3);
        };

        let mut lru = CacheBuilder::new(2).build::<u64, u64>(Policy::Lru);
        trace(&mut lru);
        // LRU evicts 1 (2 was touched last).
        assert_eq!(lru.get(&1), None);
        assert_eq!(lru.get(&2), Some(2));

        let mut lfu = CacheBuilder::new(2).build::<u64, u64>(Policy::Lfu { max_avg: 10 });
        trace(&mut lfu);
        // LFU evicts 2 (fewer accesses than 1).
        assert_eq!(lfu.get(&2), None);
        assert_eq!(lfu.get(&1), Some(1));
    }
}
