//! # MemoStore: keyed result cache with a caller-supplied comparer.
//!
//! Entries live in buckets keyed by [`KeyComparer::hash_key`]; keys inside a bucket are
//! told apart with [`KeyComparer::eq_keys`]. The store never looks at `K: Hash` or
//! `K: Eq` directly, so the comparer alone defines key identity.
//!
//! ## Rules
//! - `put` on an existing key replaces the value (last write wins).
//! - No internal synchronization: mutation takes `&mut self`. Share across threads by
//!   wrapping the store in a lock.
//! - The store grows monotonically on its own: it never evicts. [`remove`](MemoStore::remove)
//!   and [`clear`](MemoStore::clear) only run when the caller asks for them.

use std::collections::HashMap;
use std::fmt;

use super::comparer::{DefaultComparer, KeyComparer};

/// Keyed cache of computed values.
///
/// # Example
/// ```
/// use patternkit::{FnComparer, MemoStore};
///
/// let mut store = MemoStore::with_comparer(FnComparer::new(
///     |k: &String| k.len() as u64,
///     |a: &String, b: &String| a.eq_ignore_ascii_case(b),
/// ));
/// store.put("Key".to_string(), 1);
/// store.put("KEY".to_string(), 2);
///
/// assert_eq!(store.try_get(&"key".to_string()), Some(&2));
/// assert_eq!(store.len(), 1);
/// ```
pub struct MemoStore<K, V, C = DefaultComparer> {
    buckets: HashMap<u64, Vec<(K, V)>>,
    comparer: C,
    len: usize,
}

impl<K, V> MemoStore<K, V, DefaultComparer>
where
    K: std::hash::Hash + Eq,
{
    /// Creates an empty store keyed by `K`'s own `Hash` + `Eq`.
    pub fn new() -> Self {
        Self::with_comparer(DefaultComparer::default())
    }
}

impl<K, V, C> MemoStore<K, V, C>
where
    C: KeyComparer<K>,
{
    /// Creates an empty store using `comparer` for key identity.
    pub fn with_comparer(comparer: C) -> Self {
        Self {
            buckets: HashMap::new(),
            comparer,
            len: 0,
        }
    }

    /// Returns the stored value for `key`, if any.
    pub fn try_get(&self, key: &K) -> Option<&V> {
        let hash = self.comparer.hash_key(key);
        self.buckets
            .get(&hash)?
            .iter()
            .find(|(k, _)| self.comparer.eq_keys(k, key))
            .map(|(_, v)| v)
    }

    /// True if a value is stored for `key`.
    pub fn contains(&self, key: &K) -> bool {
        self.try_get(key).is_some()
    }

    /// Stores `value` under `key`, returning the value it replaced.
    ///
    /// The first key inserted stays as the stored key; only the value is replaced.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let hash = self.comparer.hash_key(&key);
        let bucket = self.buckets.entry(hash).or_default();
        match bucket.iter_mut().find(|(k, _)| self.comparer.eq_keys(k, &key)) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                bucket.push((key, value));
                self.len += 1;
                None
            }
        }
    }

    /// Returns the value for `key`, computing and storing it with `make` on a miss.
    ///
    /// The flag is `true` when `make` ran.
    pub fn get_or_insert_with<F>(&mut self, key: K, make: F) -> (&V, bool)
    where
        F: FnOnce(&K) -> V,
    {
        let hash = self.comparer.hash_key(&key);
        let bucket = self.buckets.entry(hash).or_default();
        let (idx, computed) = match bucket.iter().position(|(k, _)| self.comparer.eq_keys(k, &key)) {
            Some(idx) => (idx, false),
            None => {
                let value = make(&key);
                bucket.push((key, value));
                self.len += 1;
                (bucket.len() - 1, true)
            }
        };
        (&bucket[idx].1, computed)
    }

    /// Removes and returns the value for `key`.
    ///
    /// Caller-driven only; the store itself never evicts.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let hash = self.comparer.hash_key(key);
        let bucket = self.buckets.get_mut(&hash)?;
        let pos = bucket.iter().position(|(k, _)| self.comparer.eq_keys(k, key))?;
        let (_, value) = bucket.swap_remove(pos);
        if bucket.is_empty() {
            self.buckets.remove(&hash);
        }
        self.len -= 1;
        Some(value)
    }
}

impl<K, V, C> MemoStore<K, V, C> {
    /// Number of stored entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if nothing is stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops every entry (caller-driven; never called by the store itself).
    pub fn clear(&mut self) {
        self.buckets.clear();
        self.len = 0;
    }

    /// Iterates over stored entries in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.buckets.values().flatten().map(|(k, v)| (k, v))
    }

    /// The comparer defining key identity.
    pub fn comparer(&self) -> &C {
        &self.comparer
    }
}

impl<K, V> Default for MemoStore<K, V, DefaultComparer>
where
    K: std::hash::Hash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for MemoStore<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memo::comparer::FnComparer;

    use proptest::prelude::*;

    #[test]
    fn test_last_write_wins() {
        let mut store = MemoStore::new();
        assert_eq!(store.put("a", 1), None);
        assert_eq!(store.put("a", 2), Some(1));
        assert_eq!(store.try_get(&"a"), Some(&2));
        assert_eq!(store.len(), 1);
        assert_eq!(store.try_get(&"b"), None);
    }

    #[test]
    fn test_comparer_defines_identity() {
        let mut store = MemoStore::with_comparer(FnComparer::new(
            |k: &String| k.to_ascii_lowercase().bytes().map(u64::from).sum(),
            |a: &String, b: &String| a.eq_ignore_ascii_case(b),
        ));
        store.put("Alpha".to_string(), 1);
        store.put("ALPHA".to_string(), 2);
        store.put("beta".to_string(), 3);

        assert_eq!(store.len(), 2);
        assert_eq!(store.try_get(&"alpha".to_string()), Some(&2));
        assert!(store.contains(&"BETA".to_string()));
        let keys: Vec<&String> = store.iter().map(|(k, _)| k).filter(|k| k.starts_with('A')).collect();
        assert_eq!(keys, vec!["Alpha"]);
    }

    #[test]
    fn test_hash_collisions_are_resolved_by_equality() {
        let mut store = MemoStore::with_comparer(FnComparer::new(|_: &u32| 0u64, |a: &u32, b: &u32| a == b));
        for k in 0..10u32 {
            store.put(k, k * 10);
        }
        assert_eq!(store.len(), 10);
        assert_eq!(store.try_get(&7), Some(&70));
        assert_eq!(store.remove(&7), Some(70));
        assert_eq!(store.try_get(&7), None);
        assert_eq!(store.try_get(&9), Some(&90));
        assert_eq!(store.len(), 9);
    }

    #[test]
    fn test_get_or_insert_with_computes_once() {
        let mut store = MemoStore::new();
        let (v, computed) = store.get_or_insert_with(3u32, |k| k * k);
        assert_eq!((*v, computed), (9, true));
        let (v, computed) = store.get_or_insert_with(3u32, |_| unreachable!());
        assert_eq!((*v, computed), (9, false));
    }

    #[test]
    fn test_store_never_evicts_on_its_own() {
        let mut store = MemoStore::new();
        for k in 0..10_000u32 {
            store.put(k, k);
        }
        assert_eq!(store.len(), 10_000);
        assert_eq!(store.try_get(&0), Some(&0));
        assert_eq!(store.try_get(&9_999), Some(&9_999));
    }

    proptest! {
        #[test]
        fn test_store_matches_hashmap_model(ops in proptest::collection::vec((0u8..3, 0u8..16, any::<i32>()), 0..128)) {
            let mut store = MemoStore::new();
            let mut model = std::collections::HashMap::new();

            for (op, key, value) in ops {
                match op {
                    0 => prop_assert_eq!(store.put(key, value), model.insert(key, value)),
                    1 => prop_assert_eq!(store.remove(&key), model.remove(&key)),
                    _ => prop_assert_eq!(store.try_get(&key), model.get(&key)),
                }
                prop_assert_eq!(store.len(), model.len());
            }
        }
    }
}
