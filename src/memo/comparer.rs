//! Key comparers for [`MemoStore`](crate::MemoStore).

use std::collections::hash_map::RandomState;
use std::fmt;
use std::hash::{BuildHasher, Hash};

/// Caller-supplied key equality.
///
/// Implementations must be consistent: `eq_keys(a, b)` implies
/// `hash_key(a) == hash_key(b)`.
pub trait KeyComparer<K: ?Sized> {
    /// Hashes a key.
    fn hash_key(&self, key: &K) -> u64;

    /// Compares two keys for equality.
    fn eq_keys(&self, a: &K, b: &K) -> bool;
}

/// Comparer using the key's own `Hash` + `Eq`.
#[derive(Clone, Default)]
pub struct DefaultComparer {
    state: RandomState,
}

impl<K: Hash + Eq + ?Sized> KeyComparer<K> for DefaultComparer {
    #[inline]
    fn hash_key(&self, key: &K) -> u64 {
        self.state.hash_one(key)
    }

    #[inline]
    fn eq_keys(&self, a: &K, b: &K) -> bool {
        a == b
    }
}

impl fmt::Debug for DefaultComparer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DefaultComparer")
    }
}

/// Comparer built from a hash closure and an equality closure.
///
/// # Example
/// ```
/// use patternkit::{FnComparer, KeyComparer};
///
/// let ci = FnComparer::new(
///     |k: &String| k.to_ascii_lowercase().len() as u64,
///     |a: &String, b: &String| a.eq_ignore_ascii_case(b),
/// );
/// assert!(ci.eq_keys(&"Key".to_string(), &"KEY".to_string()));
/// ```
#[derive(Clone)]
pub struct FnComparer<H, Q> {
    hash: H,
    eq: Q,
}

impl<H, Q> FnComparer<H, Q> {
    /// Wraps the two closures.
    pub fn new(hash: H, eq: Q) -> Self {
        Self { hash, eq }
    }
}

impl<K, H, Q> KeyComparer<K> for FnComparer<H, Q>
where
    K: ?Sized,
    H: Fn(&K) -> u64,
    Q: Fn(&K, &K) -> bool,
{
    #[inline]
    fn hash_key(&self, key: &K) -> u64 {
        (self.hash)(key)
    }

    #[inline]
    fn eq_keys(&self, a: &K, b: &K) -> bool {
        (self.eq)(a, b)
    }
}

impl<H, Q> fmt::Debug for FnComparer<H, Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnComparer")
    }
}
