//! Subscriber ids and immutable subscriber entries.

use std::fmt;

/// Filter evaluated before a subscriber's handler; `false` skips the subscriber.
pub type Predicate<E> = Box<dyn Fn(&E) -> bool + Send + Sync>;

/// Identifier of one registration.
///
/// Allocated from a per-registry monotonically increasing counter; never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriberId(u64);

impl SubscriberId {
    #[inline]
    pub(crate) const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw counter value.
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One registered subscriber: id, optional predicate and handler.
///
/// Entries are immutable once created; the registry shares them between
/// snapshots behind an `Arc`.
pub struct SubscriberEntry<E, H> {
    id: SubscriberId,
    predicate: Option<Predicate<E>>,
    handler: H,
}

impl<E, H> SubscriberEntry<E, H> {
    pub(crate) fn new(id: SubscriberId, predicate: Option<Predicate<E>>, handler: H) -> Self {
        Self {
            id,
            predicate,
            handler,
        }
    }

    /// Id assigned at registration.
    #[inline]
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// The subscriber's handler.
    #[inline]
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// True if the subscriber has a filter.
    #[inline]
    pub fn has_predicate(&self) -> bool {
        self.predicate.is_some()
    }

    /// Evaluates the predicate; entries without one match every event.
    #[inline]
    pub fn matches(&self, event: &E) -> bool {
        match &self.predicate {
            Some(p) => p(event),
            None => true,
        }
    }
}

impl<E, H> fmt::Debug for SubscriberEntry<E, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriberEntry")
            .field("id", &self.id)
            .field("has_predicate", &self.predicate.is_some())
            .finish_non_exhaustive()
    }
}
