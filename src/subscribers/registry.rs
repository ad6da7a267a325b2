//! # Copy-on-write subscriber registry.
//!
//! [`SubscriberRegistry`] keeps subscribers in an immutable, ordered vector behind an
//! [`ArcSwap`]. Readers take one atomic load and iterate that version; writers build a
//! new vector and install it with compare-and-swap, retrying on a lost race.
//!
//! ## Architecture
//! ```text
//! subscribe / unsubscribe (many writers):
//!   loop {
//!     cur  = entries.load_full()            ── one atomic read
//!     next = edit(cur)                      ── fresh Vec, cur untouched
//!     prev = entries.compare_and_swap(cur, next)
//!     if prev == cur { break }              ── installed
//!   }                                       ── else: someone raced ahead, rebuild
//!
//! publish (many readers):
//!   snapshot = entries.load_full()          ── never blocks, never partial
//!   for entry in snapshot { .. }
//! ```
//!
//! ## Rules
//! - A vector reachable from a snapshot is never mutated in place.
//! - Ids come from one counter per registry and are never reused.
//! - Subscribe appends, unsubscribe excises; relative order of the rest is preserved.
//! - No registry-wide lock exists on either path.

use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use arc_swap::ArcSwap;
use tracing::{debug, trace};

use super::entry::{Predicate, SubscriberEntry, SubscriberId};
use super::subscription::{Subscription, Unsubscribe};

/// Point-in-time view of the registry.
pub type Snapshot<E, H> = Arc<Vec<Arc<SubscriberEntry<E, H>>>>;

struct Shared<E, H> {
    name: Cow<'static, str>,
    entries: ArcSwap<Vec<Arc<SubscriberEntry<E, H>>>>,
    next_id: AtomicU64,
}

impl<E, H> Shared<E, H> {
    /// Runs the compare-and-install loop.
    ///
    /// `edit` receives the currently installed vector and returns the candidate to
    /// install, or `None` to leave the registry untouched.
    fn install<F>(&self, mut edit: F) -> bool
    where
        F: FnMut(&[Arc<SubscriberEntry<E, H>>]) -> Option<Vec<Arc<SubscriberEntry<E, H>>>>,
    {
        let mut retries = 0u32;
        loop {
            let cur = self.entries.load_full();
            let Some(next) = edit(&cur) else {
                return false;
            };

            let prev = self.entries.compare_and_swap(&cur, Arc::new(next));
            if Arc::ptr_eq(&*prev, &cur) {
                if retries > 0 {
                    trace!(registry = %self.name, retries, "install succeeded after contention");
                }
                return true;
            }
            retries = retries.saturating_add(1);
        }
    }

    fn remove(&self, id: SubscriberId) -> bool {
        let removed = self.install(|cur| {
            let pos = cur.iter().position(|e| e.id() == id)?;
            let mut next = Vec::with_capacity(cur.len() - 1);
            next.extend_from_slice(&cur[..pos]);
            next.extend_from_slice(&cur[pos + 1..]);
            Some(next)
        });
        if removed {
            debug!(registry = %self.name, %id, "subscriber removed");
        }
        removed
    }
}

impl<E, H> Unsubscribe for Shared<E, H>
where
    E: 'static,
    H: Send + Sync + 'static,
{
    fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.remove(id)
    }
}

/// Ordered, lock-free registry of subscribers.
///
/// Cheap to clone: clones share the same underlying list.
///
/// `E` is the event type the predicates see, `H` the handler stored per entry.
pub struct SubscriberRegistry<E, H> {
    inner: Arc<Shared<E, H>>,
}

impl<E, H> Clone for SubscriberRegistry<E, H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E, H> SubscriberRegistry<E, H>
where
    E: 'static,
    H: Send + Sync + 'static,
{
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::named("registry")
    }

    /// Creates an empty registry whose name appears in log fields.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            inner: Arc::new(Shared {
                name: name.into(),
                entries: ArcSwap::from_pointee(Vec::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Name used in log fields.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Appends a subscriber and returns the handle that removes it.
    ///
    /// The id is allocated before the install loop, so a retried install reuses it.
    pub fn subscribe(&self, predicate: Option<Predicate<E>>, handler: H) -> Subscription {
        let raw = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let id = SubscriberId::from_raw(raw);
        let entry = Arc::new(SubscriberEntry::new(id, predicate, handler));

        self.inner.install(|cur| {
            let mut next = Vec::with_capacity(cur.len() + 1);
            next.extend_from_slice(cur);
            next.push(Arc::clone(&entry));
            Some(next)
        });
        debug!(registry = %self.inner.name, %id, "subscriber added");

        let weak: Weak<dyn Unsubscribe> = Arc::downgrade(&self.inner) as Weak<dyn Unsubscribe>;
        Subscription::new(id, weak)
    }

    /// Removes the subscriber with `id`.
    ///
    /// Returns `false` (and installs nothing) if the id is not registered.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.inner.remove(id)
    }

    /// Removes every subscriber.
    pub fn clear(&self) {
        self.inner
            .install(|cur| if cur.is_empty() { None } else { Some(Vec::new()) });
    }

    /// One atomic read of the installed list.
    ///
    /// The returned vector never changes, whatever happens to the registry afterwards.
    #[inline]
    pub fn snapshot(&self) -> Snapshot<E, H> {
        self.inner.entries.load_full()
    }

    /// Number of subscribers in the currently installed list (best effort).
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.entries.load().len()
    }

    /// True if no subscriber is installed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.entries.load().is_empty()
    }

    /// True if `id` is in the currently installed list.
    pub fn contains(&self, id: SubscriberId) -> bool {
        self.inner.entries.load().iter().any(|e| e.id() == id)
    }

    /// Ids of the currently installed list, in subscription order.
    pub fn ids(&self) -> Vec<SubscriberId> {
        self.inner.entries.load().iter().map(|e| e.id()).collect()
    }
}

impl<E, H> Default for SubscriberRegistry<E, H>
where
    E: 'static,
    H: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E, H> fmt::Debug for SubscriberRegistry<E, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriberRegistry")
            .field("name", &self.inner.name)
            .field("len", &self.inner.entries.load().len())
            .finish()
    }
}
