//! # Releasable subscription handle.
//!
//! [`Subscription`] is returned by every `subscribe` call. Releasing it removes the
//! subscriber from its registry exactly once:
//!
//! ```text
//! subscribe() ──► Subscription ──┬─► release()  ─► unsubscribe(id)   (first call)
//!                                ├─► release()  ─► no-op             (later calls)
//!                                ├─► drop       ─► release()
//!                                └─► detach()   ─► subscriber stays registered
//! ```
//!
//! The handle holds a [`Weak`] link: it never keeps a registry alive, and releasing
//! after the registry is gone does nothing.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Weak;

use super::entry::SubscriberId;

/// Type-erased removal hook implemented by the registry's shared state.
pub(crate) trait Unsubscribe: Send + Sync {
    fn unsubscribe(&self, id: SubscriberId) -> bool;
}

/// Handle to one registration; removes it when released or dropped.
#[must_use = "dropping a Subscription unsubscribes immediately; call `detach` to keep it"]
pub struct Subscription {
    id: SubscriberId,
    registry: Weak<dyn Unsubscribe>,
    released: AtomicBool,
}

impl Subscription {
    pub(crate) fn new(id: SubscriberId, registry: Weak<dyn Unsubscribe>) -> Self {
        Self {
            id,
            registry,
            released: AtomicBool::new(false),
        }
    }

    /// Id of the registration this handle controls.
    #[inline]
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// True once [`release`](Self::release) or [`detach`](Self::detach) ran.
    #[inline]
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    /// Removes the subscriber from its registry.
    ///
    /// Idempotent: only the first call (from any thread) reaches the registry.
    pub fn release(&self) {
        if self.released.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            registry.unsubscribe(self.id);
        }
    }

    /// Consumes the handle without unsubscribing.
    ///
    /// The subscriber then lives as long as the registry (or until removed by id).
    pub fn detach(self) -> SubscriberId {
        self.released.store(true, Ordering::Release);
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("released", &self.is_released())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    #[derive(Default)]
    struct Counting {
        calls: AtomicUsize,
    }

    impl Unsubscribe for Counting {
        fn unsubscribe(&self, _id: SubscriberId) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            true
        }
    }

    fn handle(target: &Arc<Counting>) -> Subscription {
        let weak: Weak<dyn Unsubscribe> = Arc::downgrade(target) as Weak<dyn Unsubscribe>;
        Subscription::new(SubscriberId::from_raw(1), weak)
    }

    #[test]
    fn test_release_is_idempotent() {
        let target = Arc::new(Counting::default());
        let sub = handle(&target);

        sub.release();
        sub.release();
        assert!(sub.is_released());
        drop(sub);

        assert_eq!(target.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_releases() {
        let target = Arc::new(Counting::default());
        drop(handle(&target));
        assert_eq!(target.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_detach_never_releases() {
        let target = Arc::new(Counting::default());
        let id = handle(&target).detach();
        assert_eq!(id.as_u64(), 1);
        assert_eq!(target.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_release_after_registry_dropped() {
        let target = Arc::new(Counting::default());
        let sub = handle(&target);
        drop(target);
        sub.release();
        assert!(sub.is_released());
    }

    #[test]
    fn test_concurrent_release_reaches_registry_once() {
        let target = Arc::new(Counting::default());
        let sub = handle(&target);

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| sub.release());
            }
        });

        assert_eq!(target.calls.load(Ordering::SeqCst), 1);
    }
}
