//! Memoization: a keyed cache with pluggable key identity.
//!
//! - [`MemoStore`] stores values under keys compared by a [`KeyComparer`].
//! - [`Memoized`] wraps a function and answers repeat calls from a store.
//! - [`DefaultComparer`] uses the key's `Hash` + `Eq`; [`FnComparer`] takes closures.
//!
//! Neither type synchronizes internally.

mod comparer;
mod memoized;
mod store;

pub use comparer::{DefaultComparer, FnComparer, KeyComparer};
pub use memoized::Memoized;
pub use store::MemoStore;
