//! Memoized function wrapper.

use std::fmt;
use std::hash::Hash;

use super::comparer::{DefaultComparer, KeyComparer};
use super::store::MemoStore;

/// Caches the results of `f` per key in a [`MemoStore`].
///
/// Mutation takes `&mut self`; for shared use put the whole wrapper behind a lock. Two
/// threads racing on the same key without a lock would each compute and the later
/// write would win.
///
/// # Example
/// ```
/// use patternkit::Memoized;
///
/// let mut square = Memoized::new(|n: &u64| n * n);
/// assert_eq!(*square.call(12), 144);
/// assert_eq!(*square.call(12), 144);
/// assert_eq!((square.hits(), square.misses()), (1, 1));
/// ```
pub struct Memoized<K, V, F, C = DefaultComparer> {
    f: F,
    store: MemoStore<K, V, C>,
    hits: u64,
    misses: u64,
}

impl<K, V, F> Memoized<K, V, F, DefaultComparer>
where
    K: Hash + Eq,
    F: FnMut(&K) -> V,
{
    /// Wraps `f`, keying the cache by `K`'s own `Hash` + `Eq`.
    pub fn new(f: F) -> Self {
        Self::with_comparer(f, DefaultComparer::default())
    }
}

impl<K, V, F, C> Memoized<K, V, F, C>
where
    F: FnMut(&K) -> V,
    C: KeyComparer<K>,
{
    /// Wraps `f`, keying the cache with `comparer`.
    pub fn with_comparer(f: F, comparer: C) -> Self {
        Self {
            f,
            store: MemoStore::with_comparer(comparer),
            hits: 0,
            misses: 0,
        }
    }

    /// Returns the cached result for `key`, computing it on a miss.
    pub fn call(&mut self, key: K) -> &V {
        let f = &mut self.f;
        let (value, computed) = self.store.get_or_insert_with(key, |k| f(k));
        if computed {
            self.misses += 1;
        } else {
            self.hits += 1;
        }
        value
    }

    /// Returns the cached result for `key` without computing.
    pub fn cached(&self, key: &K) -> Option<&V> {
        self.store.try_get(key)
    }

    /// Drops the cached result for `key`, so the next `call` recomputes it.
    ///
    /// The wrapper never invalidates on its own; entries stay cached until this is called.
    pub fn invalidate(&mut self, key: &K) -> Option<V> {
        self.store.remove(key)
    }
}

impl<K, V, F, C> Memoized<K, V, F, C> {
    /// Underlying store.
    pub fn store(&self) -> &MemoStore<K, V, C> {
        &self.store
    }

    /// Consumes the wrapper, keeping the cache.
    pub fn into_store(self) -> MemoStore<K, V, C> {
        self.store
    }

    /// Number of cached results.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// True if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Calls answered from the cache.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Calls that ran the function.
    pub fn misses(&self) -> u64 {
        self.misses
    }
}

impl<K, V, F, C> fmt::Debug for Memoized<K, V, F, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memoized")
            .field("len", &self.store.len())
            .field("hits", &self.hits)
            .field("misses", &self.misses)
            .finish_non_exhaustive()
    }
}
