//! # Subscriber storage shared by the broadcasters.
//!
//! This module provides the lock-free [`SubscriberRegistry`] and the
//! [`Subscription`] handle returned by every `subscribe` call.
//!
//! ## Architecture
//! ```text
//! Broadcaster ─────┐                         ┌─► Subscription (release / drop / detach)
//!                  ├──► SubscriberRegistry ──┤
//! AsyncBroadcaster ┘    ArcSwap<Vec<Entry>>  └─► snapshot() ─► publish scan
//! ```
//!
//! ## Contents
//! - [`SubscriberId`] monotonically increasing registration id
//! - [`SubscriberEntry`] immutable `{ id, predicate?, handler }`
//! - [`SubscriberRegistry`] copy-on-write list with compare-and-swap installs
//! - [`Subscription`] idempotent release handle

mod entry;
mod registry;
mod subscription;

pub use entry::{Predicate, SubscriberEntry, SubscriberId};
pub use registry::{Snapshot, SubscriberRegistry};
pub use subscription::Subscription;
