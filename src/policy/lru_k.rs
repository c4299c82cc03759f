//! LRU-K admission wrapper.
//!
//! A key only enters the main cache after it has been observed `k` times
//! within a bounded history window. One-off scans and cold keys therefore
//! never displace the working set.
//!
//! Three structures cooperate:
//!
//! - the **main** LRU cache holding promoted entries,
//! - a **history** LRU cache mapping key → observation count (bounded, so
//!   rarely-seen keys are eventually forgotten),
//! - a **pending** map holding the latest value seen for keys that are not
//!   yet promoted.
//!
//! When the history forgets a key its pending value is dropped with it, so
//! the pending map never outgrows the history capacity.

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::error::InvariantError;
use crate::policy::lru::LruCache;
use crate::traits::{Cache, RemovableCache};

/// Admission-filtered LRU cache: promote after `k` observed accesses.
///
/// # Example
///
/// ```
/// use evictkit::policy::lru_k::LruKCache;
/// use evictkit::traits::Cache;
///
/// let mut cache = LruKCache::new(2, 8, 3);
/// cache.put(1, "a");               // observation 1: filtered
/// assert_eq!(cache.get(&1), None); // observation 2: still filtered
/// assert_eq!(cache.get(&1), Some("a")); // observation 3: promoted
/// ```
#[derive(Debug)]
pub struct LruKCache<K, V> {
    main: LruCache<K, V>,
    history: LruCache<K, u64>,
    pending: FxHashMap<K, V>,
    k: u64,
}

impl<K, V> LruKCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates an LRU-K cache.
    ///
    /// `capacity` bounds the main cache, `history_capacity` bounds the
    /// observation window, and `k` is the number of observations required
    /// for admission. With `k <= 1` every `put` admits immediately.
    pub fn new(capacity: usize, history_capacity: usize, k: u64) -> Self {
        Self {
            main: LruCache::new(capacity),
            history: LruCache::new(history_capacity),
            pending: FxHashMap::default(),
            k,
        }
    }

    /// Returns the number of promoted (live) entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.main.len()
    }

    /// Returns `true` if no entries have been promoted.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.main.is_empty()
    }

    /// Returns the main cache capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.main.capacity()
    }

    /// Returns the admission threshold.
    #[inline]
    pub fn k(&self) -> u64 {
        self.k
    }

    /// Returns `true` if `key` has been promoted into the main cache.
    pub fn contains(&self, key: &K) -> bool {
        self.main.contains(key)
    }

    /// Records one observation of `key` and returns the updated count.
    ///
    /// The history is itself an LRU cache; if bumping `key` evicts some
    /// other key's count, that key's pending value is dropped along with it.
    fn observe(&mut self, key: &K) -> u64 {
        let count = self.history.get(key).unwrap_or(0) + 1;
        if let Some((forgotten, _)) = self.history.insert(key.clone(), count) {
            self.pending.remove(&forgotten);
        }
        count
    }

    /// Clears observation state for `key` once it is promoted.
    fn forget(&mut self, key: &K) {
        self.history.remove(key);
        self.pending.remove(key);
    }

    /// Verifies wrapper invariants: pending keys are bounded by and
    /// consistent with the history window.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.main.check_invariants()?;
        self.history.check_invariants()?;
        for key in self.pending.keys() {
            if !self.history.contains(key) {
                return Err(InvariantError::new(
                    "pending value for a key the history has forgotten",
                ));
            }
            if self.main.contains(key) {
                return Err(InvariantError::new("promoted key still has a pending value"));
            }
        }
        Ok(())
    }
}

impl<K, V> Cache<K, V> for LruKCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn put(&mut self, key: K, value: V) {
        if self.main.contains(&key) {
            self.main.put(key, value);
            return;
        }
        let count = self.observe(&key);
        if count >= self.k {
            self.forget(&key);
            self.main.put(key, value);
        } else if self.history.contains(&key) {
            // Only stash a value the history can vouch for; with a zero
            // history window nothing is ever promotable.
            self.pending.insert(key, value);
        }
    }

    fn get(&mut self, key: &K) -> Option<V> {
        let hit = self.main.get(key);
        // Observations advance on every lookup, hit or miss.
        let count = self.observe(key);
        if hit.is_some() {
            return hit;
        }
        if count >= self.k
            && let Some(value) = self.pending.remove(key)
        {
            self.history.remove(key);
            self.main.put(key.clone(), value.clone());
            return Some(value);
        }
        None
    }
}
