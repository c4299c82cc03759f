//! Least Frequently Used (LFU) eviction engine with global aging.
//!
//! Entries are bucketed by access frequency ([`FrequencyBuckets`]); the
//! victim is the oldest entry of the smallest frequency class (LFU with FIFO
//! tie-break). Values live in a side map keyed identically to the buckets.
//!
//! ## Aging
//!
//! Pure LFU has a failure mode: an entry that was hot long ago accumulates a
//! counter no newcomer can match, and stays unevictable after the workload
//! shifts. This engine tracks the running total of accesses; whenever the
//! mean (`total_hits / len`) exceeds `max_avg`, every counter is reduced by
//! `max_avg / 2` (clamped to 1) and the buckets are rebuilt. Aging is lossy:
//! exact counts are deliberately given up in exchange for adaptivity.
//!
//! | Parameter | Default | Meaning                                   |
//! |-----------|---------|-------------------------------------------|
//! | `max_avg` | 10      | Mean access count that triggers an aging pass |

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::frequency_buckets::FrequencyBuckets;
use crate::error::{ConfigError, InvariantError};
use crate::traits::Cache;

/// Mean access count above which an aging pass runs, unless overridden.
pub const DEFAULT_MAX_AVG: u64 = 10;

/// Frequency-ordered cache with mean-triggered counter aging.
///
/// # Example
///
/// ```
/// use evictkit::policy::lfu::LfuCache;
/// use evictkit::traits::Cache;
///
/// let mut cache = LfuCache::new(2);
/// cache.put(1, "a");
/// cache.put(2, "b");
/// cache.get(&1);          // freq(1) = 2
/// cache.put(3, "c");      // 2 and 3 tie at freq 1; 2 is older, so 2 goes
///
/// assert_eq!(cache.get(&2), None);
/// assert_eq!(cache.get(&3), Some("c"));
/// assert_eq!(cache.get(&1), Some("a"));
/// ```
#[derive(Debug)]
pub struct LfuCache<K, V> {
    buckets: FrequencyBuckets<K>,
    values: FxHashMap<K, V>,
    capacity: usize,
    max_avg: u64,
    total_hits: u64,
    aging_passes: u64,
}

impl<K, V> LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an LFU cache with the default aging threshold
    /// ([`DEFAULT_MAX_AVG`]).
    pub fn new(capacity: usize) -> Self {
        Self::with_max_avg(capacity, DEFAULT_MAX_AVG)
    }

    /// Creates an LFU cache that ages counters once the mean access count
    /// exceeds `max_avg`.
    ///
    /// # Panics
    ///
    /// Panics if `max_avg` is 0; use
    /// [`try_with_max_avg`](Self::try_with_max_avg) to handle the error.
    pub fn with_max_avg(capacity: usize, max_avg: u64) -> Self {
        assert!(max_avg > 0, "max_avg must be > 0");
        Self {
            buckets: FrequencyBuckets::new(),
            values: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            capacity,
            max_avg,
            total_hits: 0,
            aging_passes: 0,
        }
    }

    /// Fallible form of [`with_max_avg`](Self::with_max_avg).
    pub fn try_with_max_avg(capacity: usize, max_avg: u64) -> Result<Self, ConfigError> {
        if max_avg == 0 {
            return Err(ConfigError::new("max_avg must be > 0"));
        }
        Ok(Self::with_max_avg(capacity, max_avg))
    }

    /// Returns the current number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the cache holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the maximum number of entries.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the configured aging threshold.
    #[inline]
    pub fn max_avg(&self) -> u64 {
        self.max_avg
    }

    /// Returns `true` if `key` is live, without counting an access.
    pub fn contains(&self, key: &K) -> bool {
        self.values.contains_key(key)
    }

    /// Returns the access frequency recorded for `key`.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.buckets.frequency(key)
    }

    /// Returns how many aging passes have run over the cache's lifetime.
    pub fn aging_passes(&self) -> u64 {
        self.aging_passes
    }

    /// Removes all entries and resets the access accounting.
    pub fn clear(&mut self) {
        self.buckets.clear();
        self.values.clear();
        self.total_hits = 0;
    }

    /// Verifies the bucket/value-store structural invariants.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.values.len() != self.buckets.len() {
            return Err(InvariantError::new(format!(
                "value store has {} entries but buckets track {}",
                self.values.len(),
                self.buckets.len()
            )));
        }
        if self.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "size {} exceeds capacity {}",
                self.len(),
                self.capacity
            )));
        }
        for (key, freq) in self.buckets.snapshot() {
            if freq == 0 {
                return Err(InvariantError::new("tracked frequency of 0"));
            }
            if !self.values.contains_key(&key) {
                return Err(InvariantError::new("bucketed key missing from value store"));
            }
        }
        Ok(())
    }

    /// Registers a hit on a live key and runs the aging check.
    fn record_hit(&mut self, key: &K) {
        self.buckets.touch(key);
        self.record_access();
    }

    fn record_access(&mut self) {
        self.total_hits += 1;
        self.maybe_age();
    }

    fn maybe_age(&mut self) {
        let len = self.len() as u64;
        if len == 0 {
            return;
        }
        if self.total_hits / len > self.max_avg {
            self.age();
        }
    }

    /// Dampens every counter by `max_avg / 2` (clamped to 1) and rebuilds
    /// bucket membership.
    ///
    /// `total_hits` is recomputed as the sum of the aged frequencies so the
    /// mean keeps tracking the counters actually stored.
    fn age(&mut self) {
        let decay = self.max_avg / 2;
        let mut aged_total = 0u64;
        for (key, freq) in self.buckets.snapshot() {
            let aged = freq.saturating_sub(decay).max(1);
            if aged != freq {
                self.buckets.set_frequency(&key, aged);
            }
            aged_total += aged;
        }
        self.total_hits = aged_total;
        self.aging_passes += 1;
    }

    fn evict(&mut self) {
        if let Some((key, freq)) = self.buckets.pop_min() {
            self.values.remove(&key);
            self.total_hits = self.total_hits.saturating_sub(freq);
        }
    }
}

impl<K, V> Cache<K, V> for LfuCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn put(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }
        if self.values.contains_key(&key) {
            // Live update counts as a hit.
            self.values.insert(key.clone(), value);
            self.record_hit(&key);
            return;
        }
        if self.len() == self.capacity {
            self.evict();
        }
        self.buckets.insert(key.clone());
        self.values.insert(key, value);
        self.record_access();
    }

    fn get(&mut self, key: &K) -> Option<V> {
        let value = self.values.get(key).cloned()?;
        self.record_hit(key);
        Some(value)
    }
}
