//! Bounded recency list of keys without values, for ARC-style ghost tracking.

use rustc_hash::FxHashMap;
use std::hash::Hash;

use crate::ds::recency_list::RecencyList;
use crate::ds::slot_arena::SlotId;

/// Bounded history of recently evicted keys.
///
/// A ghost hit ("this key would still be cached if we were larger") is the
/// signal adaptive policies use to shift capacity. Ghost entries carry no
/// values and never satisfy a lookup.
///
/// # Example
///
/// ```
/// use evictkit::ds::GhostList;
///
/// let mut ghost = GhostList::new(2);
/// ghost.record("a");
/// ghost.record("b");
/// ghost.record("c");          // at capacity: "a" falls off
///
/// assert!(!ghost.contains(&"a"));
/// assert!(ghost.take(&"b"));  // ghost hit consumes the entry
/// assert!(!ghost.contains(&"b"));
/// assert!(!ghost.take(&"b"));
/// ```
#[derive(Debug)]
pub struct GhostList<K> {
    list: RecencyList<K>,
    index: FxHashMap<K, SlotId>,
    capacity: usize,
}

impl<K> GhostList<K>
where
    K: Eq + Hash + Clone,
{
    /// Creates a ghost list holding at most `capacity` keys.
    ///
    /// A capacity of 0 creates a list that ignores all records.
    pub fn new(capacity: usize) -> Self {
        Self {
            list: RecencyList::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            capacity,
        }
    }

    /// Returns the configured capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of keys currently tracked.
    #[inline]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns `true` if no keys are tracked.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Returns `true` if `key` is present.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Records `key` as most recently evicted, dropping the oldest ghost if
    /// the list is full.
    ///
    /// Re-recording a tracked key promotes it to the MRU end instead.
    pub fn record(&mut self, key: K) {
        if self.capacity == 0 {
            return;
        }
        if let Some(&id) = self.index.get(&key) {
            self.list.move_to_front(id);
            return;
        }
        if self.list.len() >= self.capacity {
            if let Some(old_key) = self.list.pop_back() {
                self.index.remove(&old_key);
            }
        }
        let id = self.list.push_front(key.clone());
        self.index.insert(key, id);
    }

    /// Removes `key` if tracked and reports whether it was present.
    ///
    /// This is the ghost-hit probe: a `true` result both signals the hit and
    /// consumes the entry so it cannot be counted twice.
    pub fn take(&mut self, key: &K) -> bool {
        match self.index.remove(key) {
            Some(id) => {
                self.list.remove(id);
                true
            }
            None => false,
        }
    }

    /// Clears all tracked keys.
    pub fn clear(&mut self) {
        self.list.clear();
        self.index.clear();
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert_eq!(self.list.len(), self.index.len());
        assert!(self.list.len() <= self.capacity);
        for &id in self.index.values() {
            assert!(self.list.contains(id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ghost_list_records_and_bounds() {
        let mut ghost = GhostList::new(3);
        ghost.record(1);
        ghost.record(2);
        ghost.record(3);
        assert_eq!(ghost.len(), 3);

        ghost.record(4);
        assert_eq!(ghost.len(), 3);
        assert!(!ghost.contains(&1));
        assert!(ghost.contains(&4));
        ghost.debug_validate_invariants();
    }

    #[test]
    fn ghost_list_take_consumes_entry() {
        let mut ghost = GhostList::new(4);
        ghost.record("x");
        assert!(ghost.take(&"x"));
        assert!(!ghost.contains(&"x"));
        assert!(!ghost.take(&"x"));
        assert!(ghost.is_empty());
    }

    #[test]
    fn ghost_list_rerecord_promotes() {
        let mut ghost = GhostList::new(2);
        ghost.record("a");
        ghost.record("b");
        ghost.record("a"); // promote, not duplicate
        assert_eq!(ghost.len(), 2);

        ghost.record("c"); // "b" is now the oldest
        assert!(ghost.contains(&"a"));
        assert!(!ghost.contains(&"b"));
        ghost.debug_validate_invariants();
    }

    #[test]
    fn ghost_list_zero_capacity_ignores_records() {
        let mut ghost = GhostList::new(0);
        ghost.record(1);
        assert!(ghost.is_empty());
        assert!(!ghost.take(&1));
        ghost.debug_validate_invariants();
    }

    #[test]
    fn ghost_list_clear_resets_state() {
        let mut ghost = GhostList::new(4);
        ghost.record(1);
        ghost.record(2);
        ghost.clear();
        assert!(ghost.is_empty());
        assert!(!ghost.contains(&1));
    }
}
