use std::collections::BTreeMap;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::slot_arena::{SlotArena, SlotId};

#[derive(Debug)]
struct Entry<K> {
    key: K,
    freq: u64,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

#[derive(Debug, Default)]
struct Bucket {
    head: Option<SlotId>,
    tail: Option<SlotId>,
}

/// Keys ordered by access frequency, FIFO within each frequency.
///
/// Each bucket is a linked chain through the entry arena; buckets hang off a
/// `BTreeMap` so the smallest non-empty frequency is always at the front.
/// `min_freq` caches that smallest key (0 when empty). New and re-bucketed
/// entries append at the bucket tail, so the head is always the oldest entry
/// of its frequency class and `pop_min` realizes the LFU-with-FIFO-tiebreak
/// eviction rule.
#[derive(Debug)]
pub struct FrequencyBuckets<K> {
    entries: SlotArena<Entry<K>>,
    index: FxHashMap<K, SlotId>,
    buckets: BTreeMap<u64, Bucket>,
    min_freq: u64,
}

impl<K> FrequencyBuckets<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            entries: SlotArena::new(),
            index: FxHashMap::default(),
            buckets: BTreeMap::new(),
            min_freq: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Returns the frequency recorded for `key`, if tracked.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        let id = *self.index.get(key)?;
        self.entries.get(id).map(|entry| entry.freq)
    }

    /// Returns the smallest frequency with a non-empty bucket.
    pub fn min_freq(&self) -> Option<u64> {
        if self.min_freq == 0 { None } else { Some(self.min_freq) }
    }

    /// Tracks a new key at frequency 1; returns `false` if already tracked.
    pub fn insert(&mut self, key: K) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }
        let id = self.entries.insert(Entry {
            key: key.clone(),
            freq: 1,
            prev: None,
            next: None,
        });
        self.index.insert(key, id);
        self.link_back(1, id);
        self.min_freq = 1;
        true
    }

    /// Bumps `key` one frequency class up; returns the new frequency.
    pub fn touch(&mut self, key: &K) -> Option<u64> {
        let id = *self.index.get(key)?;
        let next_freq = self.entries.get(id)?.freq.saturating_add(1);
        self.unlink(id);
        if let Some(entry) = self.entries.get_mut(id) {
            entry.freq = next_freq;
        }
        self.link_back(next_freq, id);
        self.refresh_min();
        Some(next_freq)
    }

    /// Rebuckets `key` at an arbitrary frequency (clamped to ≥ 1).
    ///
    /// Used by aging passes that dampen every counter at once. The entry is
    /// appended to its target bucket; returns `false` if `key` is untracked.
    pub fn set_frequency(&mut self, key: &K, freq: u64) -> bool {
        let freq = freq.max(1);
        let Some(&id) = self.index.get(key) else {
            return false;
        };
        let Some(current) = self.entries.get(id).map(|entry| entry.freq) else {
            return false;
        };
        if current == freq {
            return true;
        }
        self.unlink(id);
        if let Some(entry) = self.entries.get_mut(id) {
            entry.freq = freq;
        }
        self.link_back(freq, id);
        self.refresh_min();
        true
    }

    /// Stops tracking `key`; returns its last frequency.
    pub fn remove(&mut self, key: &K) -> Option<u64> {
        let id = self.index.remove(key)?;
        self.unlink(id);
        self.refresh_min();
        self.entries.remove(id).map(|entry| entry.freq)
    }

    /// Removes and returns the oldest entry of the smallest frequency class.
    pub fn pop_min(&mut self) -> Option<(K, u64)> {
        if self.min_freq == 0 {
            return None;
        }
        let id = self.buckets.get(&self.min_freq)?.head?;
        self.unlink(id);
        self.refresh_min();
        let entry = self.entries.remove(id)?;
        self.index.remove(&entry.key);
        Some((entry.key, entry.freq))
    }

    /// Returns the would-be victim of [`pop_min`](Self::pop_min) without
    /// removing it.
    pub fn peek_min(&self) -> Option<(&K, u64)> {
        if self.min_freq == 0 {
            return None;
        }
        let id = self.buckets.get(&self.min_freq)?.head?;
        self.entries.get(id).map(|entry| (&entry.key, entry.freq))
    }

    /// Returns every `(key, frequency)` pair, ascending by frequency and FIFO
    /// within a frequency class.
    pub fn snapshot(&self) -> Vec<(K, u64)> {
        let mut out = Vec::with_capacity(self.len());
        for (&freq, bucket) in &self.buckets {
            let mut cursor = bucket.head;
            while let Some(id) = cursor {
                match self.entries.get(id) {
                    Some(entry) => {
                        out.push((entry.key.clone(), freq));
                        cursor = entry.next;
                    }
                    None => break,
                }
            }
        }
        out
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
        self.buckets.clear();
        self.min_freq = 0;
    }

    fn refresh_min(&mut self) {
        self.min_freq = self
            .buckets
            .first_key_value()
            .map(|(&freq, _)| freq)
            .unwrap_or(0);
    }

    fn link_back(&mut self, freq: u64, id: SlotId) {
        let old_tail = {
            let bucket = self.buckets.entry(freq).or_default();
            let old_tail = bucket.tail;
            bucket.tail = Some(id);
            if bucket.head.is_none() {
                bucket.head = Some(id);
            }
            old_tail
        };
        if let Some(entry) = self.entries.get_mut(id) {
            entry.prev = old_tail;
            entry.next = None;
        }
        if let Some(tail_id) = old_tail
            && let Some(entry) = self.entries.get_mut(tail_id)
        {
            entry.next = Some(id);
        }
    }

    fn unlink(&mut self, id: SlotId) {
        let (freq, prev, next) = match self.entries.get(id) {
            Some(entry) => (entry.freq, entry.prev, entry.next),
            None => return,
        };

        if let Some(prev_id) = prev
            && let Some(entry) = self.entries.get_mut(prev_id)
        {
            entry.next = next;
        }
        if let Some(next_id) = next
            && let Some(entry) = self.entries.get_mut(next_id)
        {
            entry.prev = prev;
        }

        let mut bucket_empty = false;
        if let Some(bucket) = self.buckets.get_mut(&freq) {
            if bucket.head == Some(id) {
                bucket.head = next;
            }
            if bucket.tail == Some(id) {
                bucket.tail = prev;
            }
            bucket_empty = bucket.head.is_none();
        }
        if bucket_empty {
            self.buckets.remove(&freq);
        }

        if let Some(entry) = self.entries.get_mut(id) {
            entry.prev = None;
            entry.next = None;
        }
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert_eq!(self.len(), self.index.len());

        if self.is_empty() {
            assert!(self.buckets.is_empty());
            assert_eq!(self.min_freq, 0);
            return;
        }

        let first = self
            .buckets
            .first_key_value()
            .map(|(&freq, _)| freq)
            .expect("non-empty set has no buckets");
        assert_eq!(self.min_freq, first);

        let mut seen = 0usize;
        for (&freq, bucket) in &self.buckets {
            assert!(freq >= 1);
            let mut cursor = bucket.head;
            let mut last = None;
            while let Some(id) = cursor {
                let entry = self.entries.get(id).expect("bucketed entry missing");
                assert_eq!(entry.freq, freq);
                assert_eq!(entry.prev, last);
                assert_eq!(self.index.get(&entry.key), Some(&id));
                last = Some(id);
                cursor = entry.next;
                seen += 1;
                assert!(seen <= self.len());
            }
            assert_eq!(bucket.tail, last);
            assert!(last.is_some());
        }
        assert_eq!(seen, self.len());
    }
}

impl<K> Default for FrequencyBuckets<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequency_buckets_basic_flow() {
        let mut buckets = FrequencyBuckets::new();
        assert!(buckets.insert("a"));
        assert!(buckets.insert("b"));

        assert_eq!(buckets.frequency(&"a"), Some(1));
        assert_eq!(buckets.min_freq(), Some(1));

        assert_eq!(buckets.touch(&"a"), Some(2));
        assert_eq!(buckets.frequency(&"a"), Some(2));
        assert_eq!(buckets.min_freq(), Some(1));

        assert_eq!(buckets.pop_min(), Some(("b", 1)));
        assert_eq!(buckets.min_freq(), Some(2));
        buckets.debug_validate_invariants();
    }

    #[test]
    fn frequency_buckets_fifo_within_class() {
        let mut buckets = FrequencyBuckets::new();
        buckets.insert("a");
        buckets.insert("b");
        buckets.insert("c");

        assert_eq!(buckets.pop_min(), Some(("a", 1)));
        assert_eq!(buckets.pop_min(), Some(("b", 1)));
        assert_eq!(buckets.pop_min(), Some(("c", 1)));
        assert_eq!(buckets.pop_min(), None);
    }

    #[test]
    fn frequency_buckets_touch_moves_to_new_class_tail() {
        let mut buckets = FrequencyBuckets::new();
        buckets.insert("a");
        buckets.insert("b");
        buckets.touch(&"a");
        buckets.touch(&"b");

        // Both at freq 2 now; "a" was bumped first so it evicts first.
        assert_eq!(buckets.pop_min(), Some(("a", 2)));
        assert_eq!(buckets.pop_min(), Some(("b", 2)));
    }

    #[test]
    fn frequency_buckets_duplicate_insert_is_noop() {
        let mut buckets = FrequencyBuckets::new();
        assert!(buckets.insert(7));
        assert!(!buckets.insert(7));
        assert_eq!(buckets.len(), 1);
    }

    #[test]
    fn frequency_buckets_touch_missing_returns_none() {
        let mut buckets: FrequencyBuckets<u32> = FrequencyBuckets::new();
        assert_eq!(buckets.touch(&9), None);
        assert_eq!(buckets.min_freq(), None);
    }

    #[test]
    fn frequency_buckets_remove_updates_min_freq() {
        let mut buckets = FrequencyBuckets::new();
        buckets.insert("a");
        buckets.insert("b");
        buckets.touch(&"b");

        assert_eq!(buckets.remove(&"a"), Some(1));
        assert_eq!(buckets.min_freq(), Some(2));
        assert_eq!(buckets.remove(&"a"), None);
        buckets.debug_validate_invariants();
    }

    #[test]
    fn frequency_buckets_set_frequency_rebuckets() {
        let mut buckets = FrequencyBuckets::new();
        buckets.insert("hot");
        buckets.insert("cold");
        for _ in 0..9 {
            buckets.touch(&"hot");
        }
        assert_eq!(buckets.frequency(&"hot"), Some(10));

        // Age "hot" down below "cold" has a chance to compete.
        assert!(buckets.set_frequency(&"hot", 2));
        assert_eq!(buckets.frequency(&"hot"), Some(2));
        assert_eq!(buckets.min_freq(), Some(1));
        assert_eq!(buckets.peek_min(), Some((&"cold", 1)));

        // Clamped to 1, and unknown keys are rejected.
        assert!(buckets.set_frequency(&"hot", 0));
        assert_eq!(buckets.frequency(&"hot"), Some(1));
        assert!(!buckets.set_frequency(&"missing", 3));
        buckets.debug_validate_invariants();
    }

    #[test]
    fn frequency_buckets_snapshot_orders_by_frequency_then_age() {
        let mut buckets = FrequencyBuckets::new();
        buckets.insert("a");
        buckets.insert("b");
        buckets.insert("c");
        buckets.touch(&"b");
        buckets.touch(&"b");
        buckets.touch(&"c");

        let snapshot = buckets.snapshot();
        assert_eq!(snapshot, vec![("a", 1), ("c", 2), ("b", 3)]);
    }

    #[test]
    fn frequency_buckets_clear_resets_state() {
        let mut buckets = FrequencyBuckets::new();
        buckets.insert(1);
        buckets.touch(&1);
        buckets.clear();
        assert!(buckets.is_empty());
        assert_eq!(buckets.min_freq(), None);
        assert_eq!(buckets.pop_min(), None);
        assert_eq!(buckets.peek_min(), None);
        buckets.debug_validate_invariants();
    }
}
