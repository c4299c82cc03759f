//! Adaptive Replacement Cache (ARC) engine.
//!
//! Two sub-caches split the workload, each shadowed by a ghost list of
//! recently evicted keys:
//!
//! ```text
//!   ┌────────────────────────────┐   ┌────────────────────────────┐
//!   │  recency side              │   │  frequency side            │
//!   │  LRU list of live entries  │   │  frequency buckets         │
//!   │  ghost: evicted keys       │   │  ghost: evicted keys       │
//!   └─────────────┬──────────────┘   └─────────────┬──────────────┘
//!                 │      capacity shifts on        │
//!                 └────────── ghost hits ──────────┘
//! ```
//!
//! A hit in one side's ghost list means "this key would still be cached had
//! that side been one entry larger": the coordinator shrinks the *other*
//! side by one and grows the hit side by one. Entries on the recency side
//! carry a hit counter; once it reaches `transform_threshold` the entry's
//! value is copied into the frequency side, which is how a key earns
//! frequency-based retention.
//!
//! A first-seen key is inserted into both sides, so it is tracked under both
//! disciplines until the workload decides which one keeps it. Each side's
//! ghost capacity stays fixed at the construction-time capacity even as live
//! capacity shifts, so a burst of shrinks does not erase the history that
//! justified them.

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::frequency_buckets::FrequencyBuckets;
use crate::ds::ghost_list::GhostList;
use crate::ds::recency_list::RecencyList;
use crate::ds::slot_arena::SlotId;
use crate::error::InvariantError;
use crate::traits::Cache;

/// Hits on the recency side after which an entry is copied to the frequency
/// side, unless overridden.
pub const DEFAULT_TRANSFORM_THRESHOLD: usize = 2;

// ---------------------------------------------------------------------------
// Recency side
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct RecencyEntry<K, V> {
    key: K,
    value: V,
    hits: usize,
}

/// LRU-ordered live list plus ghost history; the T1 side.
#[derive(Debug)]
struct RecencySide<K, V> {
    index: FxHashMap<K, SlotId>,
    list: RecencyList<RecencyEntry<K, V>>,
    ghost: GhostList<K>,
    capacity: usize,
    transform_threshold: usize,
}

impl<K, V> RecencySide<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn new(capacity: usize, transform_threshold: usize) -> Self {
        Self {
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            list: RecencyList::with_capacity(capacity),
            ghost: GhostList::new(capacity),
            capacity,
            transform_threshold,
        }
    }

    /// Inserts or updates; returns whether the key is now live on this side.
    fn put(&mut self, key: K, value: V) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if let Some(&id) = self.index.get(&key) {
            if let Some(entry) = self.list.get_mut(id) {
                entry.value = value;
            }
            self.list.move_to_front(id);
            return true;
        }
        if self.index.len() >= self.capacity {
            self.evict();
        }
        // A key can land back in its own ghost via a capacity-donation
        // eviction between the coordinator's ghost probe and this insert;
        // live and ghost must stay disjoint.
        self.ghost.take(&key);
        let id = self.list.push_front(RecencyEntry {
            key: key.clone(),
            value,
            hits: 1,
        });
        self.index.insert(key, id);
        true
    }

    /// On a hit returns the value and whether the entry crossed the
    /// promotion threshold.
    fn get(&mut self, key: &K) -> Option<(V, bool)> {
        let id = *self.index.get(key)?;
        self.list.move_to_front(id);
        let threshold = self.transform_threshold;
        let entry = self.list.get_mut(id)?;
        entry.hits += 1;
        let promote = entry.hits >= threshold;
        Some((entry.value.clone(), promote))
    }

    fn take_ghost(&mut self, key: &K) -> bool {
        self.ghost.take(key)
    }

    fn increase_capacity(&mut self) {
        self.capacity += 1;
    }

    /// Shrinks by one, evicting first if full; fails when already at 0.
    fn decrease_capacity(&mut self) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if self.index.len() == self.capacity {
            self.evict();
        }
        self.capacity -= 1;
        true
    }

    /// Demotes the LRU entry to the ghost list, dropping its value.
    fn evict(&mut self) {
        if let Some(entry) = self.list.pop_back() {
            self.index.remove(&entry.key);
            self.ghost.record(entry.key);
        }
    }

    fn len(&self) -> usize {
        self.index.len()
    }

    fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.index.len() != self.list.len() {
            return Err(InvariantError::new(
                "recency side: index and list disagree on length",
            ));
        }
        if self.len() > self.capacity {
            return Err(InvariantError::new(
                "recency side: live size exceeds capacity",
            ));
        }
        if self.ghost.len() > self.ghost.capacity() {
            return Err(InvariantError::new(
                "recency side: ghost size exceeds ghost capacity",
            ));
        }
        for entry in self.list.iter() {
            if self.ghost.contains(&entry.key) {
                return Err(InvariantError::new(
                    "recency side: key is both live and ghost",
                ));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Frequency side
// ---------------------------------------------------------------------------

/// Frequency-bucketed live set plus ghost history; the T2 side.
#[derive(Debug)]
struct FrequencySide<K, V> {
    buckets: FrequencyBuckets<K>,
    values: FxHashMap<K, V>,
    ghost: GhostList<K>,
    capacity: usize,
}

impl<K, V> FrequencySide<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn new(capacity: usize) -> Self {
        Self {
            buckets: FrequencyBuckets::new(),
            values: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            ghost: GhostList::new(capacity),
            capacity,
        }
    }

    /// Inserts or updates; an update counts as an access.
    fn put(&mut self, key: K, value: V) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if self.values.contains_key(&key) {
            self.values.insert(key.clone(), value);
            self.buckets.touch(&key);
            return true;
        }
        if self.values.len() >= self.capacity {
            self.evict();
        }
        self.ghost.take(&key);
        self.buckets.insert(key.clone());
        self.values.insert(key, value);
        true
    }

    fn get(&mut self, key: &K) -> Option<V> {
        let value = self.values.get(key).cloned()?;
        self.buckets.touch(key);
        Some(value)
    }

    fn take_ghost(&mut self, key: &K) -> bool {
        self.ghost.take(key)
    }

    fn increase_capacity(&mut self) {
        self.capacity += 1;
    }

    fn decrease_capacity(&mut self) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if self.values.len() == self.capacity {
            self.evict();
        }
        self.capacity -= 1;
        true
    }

    /// Demotes the least frequent (oldest on tie) entry to the ghost list.
    fn evict(&mut self) {
        if let Some((key, _)) = self.buckets.pop_min() {
            self.values.remove(&key);
            self.ghost.record(key);
        }
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.values.len() != self.buckets.len() {
            return Err(InvariantError::new(
                "frequency side: value store and buckets disagree on length",
            ));
        }
        if self.len() > self.capacity {
            return Err(InvariantError::new(
                "frequency side: live size exceeds capacity",
            ));
        }
        if self.ghost.len() > self.ghost.capacity() {
            return Err(InvariantError::new(
                "frequency side: ghost size exceeds ghost capacity",
            ));
        }
        for key in self.values.keys() {
            if self.ghost.contains(key) {
                return Err(InvariantError::new(
                    "frequency side: key is both live and ghost",
                ));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

/// ARC cache balancing recency and frequency pressure via ghost hits.
///
/// # Example
///
/// ```
/// use evictkit::policy::adaptive::AdaptiveCache;
/// use evictkit::traits::Cache;
///
/// let mut cache = AdaptiveCache::new(4);
/// cache.put(1, "a");
/// cache.get(&1);           // second touch: promoted to the frequency side
/// for key in 2..6 {
///     cache.put(key, "x"); // churn floods the recency side
/// }
/// assert_eq!(cache.get(&1), Some("a")); // survives on the frequency side
/// ```
#[derive(Debug)]
pub struct AdaptiveCache<K, V> {
    recency: RecencySide<K, V>,
    frequency: FrequencySide<K, V>,
}

impl<K, V> AdaptiveCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates an ARC cache with the default promotion threshold
    /// ([`DEFAULT_TRANSFORM_THRESHOLD`]).
    ///
    /// Each side starts with `capacity` live slots and a ghost list of the
    /// same size; ghost hits shift live capacity between the sides.
    pub fn new(capacity: usize) -> Self {
        Self::with_transform_threshold(capacity, DEFAULT_TRANSFORM_THRESHOLD)
    }

    /// Creates an ARC cache that promotes recency-side entries after
    /// `transform_threshold` hits.
    pub fn with_transform_threshold(capacity: usize, transform_threshold: usize) -> Self {
        Self {
            recency: RecencySide::new(capacity, transform_threshold),
            frequency: FrequencySide::new(capacity),
        }
    }

    /// Current live capacity of the recency side.
    pub fn recency_capacity(&self) -> usize {
        self.recency.capacity
    }

    /// Current live capacity of the frequency side.
    pub fn frequency_capacity(&self) -> usize {
        self.frequency.capacity
    }

    /// Live entry count on the recency side.
    pub fn recency_len(&self) -> usize {
        self.recency.len()
    }

    /// Live entry count on the frequency side.
    pub fn frequency_len(&self) -> usize {
        self.frequency.len()
    }

    /// Returns `true` if `key` is live on either side.
    pub fn contains(&self, key: &K) -> bool {
        self.recency.index.contains_key(key) || self.frequency.values.contains_key(key)
    }

    /// Verifies both sides' structural invariants.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.recency.check_invariants()?;
        self.frequency.check_invariants()
    }

    /// Probes both ghost lists and shifts one unit of capacity toward the
    /// side that recorded the hit.
    ///
    /// Capacity only moves if the donor side can actually shrink, so the
    /// combined live budget is conserved.
    fn check_ghosts(&mut self, key: &K) -> bool {
        if self.recency.take_ghost(key) {
            if self.frequency.decrease_capacity() {
                self.recency.increase_capacity();
            }
            true
        } else if self.frequency.take_ghost(key) {
            if self.recency.decrease_capacity() {
                self.frequency.increase_capacity();
            }
            true
        } else {
            false
        }
    }
}

impl<K, V> Cache<K, V> for AdaptiveCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn put(&mut self, key: K, value: V) {
        let in_ghost = self.check_ghosts(&key);
        if in_ghost {
            // The ghost signal already shifted capacity; the frequency side
            // learns about the key again through promotion.
            self.recency.put(key, value);
        } else if self.recency.put(key.clone(), value.clone()) {
            // First-seen keys are tracked on both sides until one wins.
            self.frequency.put(key, value);
        }
    }

    fn get(&mut self, key: &K) -> Option<V> {
        self.check_ghosts(key);
        if let Some((value, promote)) = self.recency.get(key) {
            if promote {
                self.frequency.put(key.clone(), value.clone());
            }
            return Some(value);
        }
        self.frequency.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adaptive_basic_put_get() {
        let mut cache = AdaptiveCache::new(4);
        cache.put(1, "a");
        cache.put(2, "b");
        assert_eq!(cache.get(&1), Some("a"));
        assert_eq!(cache.get(&3), None);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn adaptive_promotes_after_threshold_hits() {
        let mut cache = AdaptiveCache::with_transform_threshold(4, 2);
        cache.put(1, "a");
        // First re-access reaches 2 hits and copies the entry across.
        assert_eq!(cache.get(&1), Some("a"));
        assert!(cache.frequency_len() >= 1);

        // Flood the recency side; 1 must survive via the frequency side.
        for key in 10..20 {
            cache.put(key, "x");
        }
        assert_eq!(cache.get(&1), Some("a"));
        cache.check_invariants().unwrap();
    }

    #[test]
    fn adaptive_ghost_hit_shifts_capacity_toward_recency() {
        let mut cache: AdaptiveCache<u32, &str> = AdaptiveCache::with_transform_threshold(4, 2);
        // Working set larger than one side: A..F as 1..=6.
        for key in 1..=6 {
            cache.put(key, "v");
        }
        assert_eq!(cache.recency_capacity(), 4);
        assert_eq!(cache.frequency_capacity(), 4);

        // 1 and 2 were evicted from the recency side into its ghost list.
        cache.put(1, "v");
        assert_eq!(cache.recency_capacity(), 5);
        assert_eq!(cache.frequency_capacity(), 3);
        assert!(cache.frequency_len() <= cache.frequency_capacity());
        cache.check_invariants().unwrap();
    }

    #[test]
    fn adaptive_ghost_hits_shift_capacity_both_ways() {
        let mut cache: AdaptiveCache<u32, &str> = AdaptiveCache::with_transform_threshold(2, 2);
        cache.put(1, "a");
        cache.put(2, "b");
        cache.put(3, "c"); // both sides full: 1 falls into both ghost lists

        // Reclaiming 1 hits the recency ghost and grows that side.
        cache.put(1, "a");
        assert_eq!(cache.recency_capacity(), 3);
        assert_eq!(cache.frequency_capacity(), 1);

        // That donation evicted 2 into the frequency ghost; touching 2
        // shifts the unit back.
        cache.put(2, "b");
        assert_eq!(cache.recency_capacity(), 2);
        assert_eq!(cache.frequency_capacity(), 2);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn adaptive_first_seen_key_lands_on_both_sides() {
        let mut cache = AdaptiveCache::new(4);
        cache.put(1, "a");
        assert_eq!(cache.recency_len(), 1);
        assert_eq!(cache.frequency_len(), 1);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn adaptive_update_of_live_key_replaces_value() {
        let mut cache = AdaptiveCache::new(4);
        cache.put(1, "a");
        cache.put(1, "a2");
        assert_eq!(cache.recency_len(), 1);
        assert_eq!(cache.get(&1), Some("a2"));
    }

    #[test]
    fn adaptive_zero_capacity_quiesces() {
        let mut cache = AdaptiveCache::new(0);
        cache.put(1, "a");
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.recency_len(), 0);
        assert_eq!(cache.frequency_len(), 0);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn adaptive_capacity_shift_stops_at_zero() {
        let mut cache: AdaptiveCache<u32, &str> = AdaptiveCache::with_transform_threshold(1, 2);
        cache.put(1, "a");
        cache.put(2, "b"); // 1 evicted to recency ghost
        cache.put(1, "a"); // ghost hit: frequency 1 -> 0, recency 1 -> 2
        assert_eq!(cache.frequency_capacity(), 0);
        assert_eq!(cache.recency_capacity(), 2);

        // Another recency-ghost hit finds no donor: the frequency side is
        // already at 0, so no capacity moves.
        cache.put(3, "c");
        cache.put(4, "d"); // evicts 1 into the recency ghost
        let before = cache.recency_capacity();
        cache.put(1, "a");
        assert_eq!(cache.frequency_capacity(), 0);
        assert_eq!(cache.recency_capacity(), before);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn adaptive_ghost_probe_consumes_entry() {
        let mut cache: AdaptiveCache<u32, &str> = AdaptiveCache::with_transform_threshold(2, 2);
        for key in 1..=4 {
            cache.put(key, "v");
        }
        // 1 was ghosted; a get probes and consumes the ghost entry even on a
        // miss, shifting capacity once only.
        assert_eq!(cache.get(&1), None);
        let shifted = cache.recency_capacity();
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.recency_capacity(), shifted);
        cache.check_invariants().unwrap();
    }
}
