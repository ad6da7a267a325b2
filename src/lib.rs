//! # patternkit
//!
//! **patternkit** is a small library of concurrency-safe building blocks for
//! in-process eventing and deferred construction.
//!
//! It provides a lock-free publish/subscribe hub with configurable fault isolation,
//! exactly-once lazy resources (thread-blocking and async), and a memoization store
//! with caller-defined key identity.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   subscribe(pred?, handler)        publish(&event)                 Subscription
//!            │                            │                               │
//!            ▼                            ▼                          release / drop
//! ┌───────────────────────────────────────────────────────────────────────┴──┐
//! │  SubscriberRegistry<E, H>                                                │
//! │  - ArcSwap<Vec<Arc<SubscriberEntry>>> (copy-on-write, CAS installs)      │
//! │  - AtomicU64 id counter (ids never reused)                               │
//! └───────────────────────────────┬──────────────────────────────────────────┘
//!                                 │ snapshot() (one atomic load)
//!                                 ▼
//!            ┌────────────────────────────────────────────┐
//!            │ Broadcaster / AsyncBroadcaster             │
//!            │  for entry in snapshot:                    │
//!            │    predicate? ─► handler ─► Err / panic    │
//!            │                               │            │
//!            │                     FaultSink (optional)   │
//!            │                               │            │
//!            │        FaultPolicy: Swallow | ThrowFirst   │
//!            │                     | ThrowAggregate       │
//!            └────────────────────────────────────────────┘
//!
//!   LazyResource / AsyncLazyResource          MemoStore / Memoized
//!   Unresolved ─► Resolving ─► Resolved       comparer.hash_key ─► bucket
//!        ▲            │                       comparer.eq_keys  ─► entry
//!        └──Err/panic─┘
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                              |
//! |-------------------|--------------------------------------------------------------|-------------------------------------------------|
//! | **Registry**      | Lock-free ordered subscriber list with idempotent handles.   | [`SubscriberRegistry`], [`Subscription`]        |
//! | **Broadcasting**  | Snapshot fan-out, sync or strictly sequential async.         | [`Broadcaster`], [`AsyncBroadcaster`], [`Subscribe`] |
//! | **Policies**      | How subscriber faults escape `publish`.                      | [`FaultPolicy`], [`FaultSink`]                  |
//! | **Errors**        | Typed faults carrying the subscriber id.                     | [`PublishError`], [`SubscriberFault`]           |
//! | **Lazy values**   | Exactly-once construction, retryable on failure.             | [`LazyResource`], [`AsyncLazyResource`]         |
//! | **Memoization**   | Keyed result cache with pluggable key identity.              | [`MemoStore`], [`Memoized`], [`KeyComparer`]    |
//! | **Configuration** | Construction-time broadcaster settings.                      | [`BroadcasterConfig`]                           |
//!
//! ## Optional features
//! - `logging` (default): exports [`TracingSink`], a fault sink that logs through `tracing`.
//!
//! ## Example
//! ```rust
//! use patternkit::{Broadcaster, FaultPolicy, PublishError};
//!
//! let bus = Broadcaster::<u32>::builder()
//!     .with_name("orders")
//!     .with_policy(FaultPolicy::ThrowAggregate)
//!     .build();
//!
//! let _ok = bus.subscribe(|_: &u32| Ok(()));
//! let _bad = bus.subscribe_when(|n: &u32| *n > 100, |n: &u32| Err(format!("too large: {n}").into()));
//!
//! assert!(bus.publish(&7).is_ok());
//! match bus.publish(&500) {
//!     Err(PublishError::Aggregate(faults)) => assert_eq!(faults.len(), 1),
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```
mod broadcast;
mod error;
mod lazy;
mod memo;
mod policies;
mod subscribers;

// ---- Public re-exports ----

pub use broadcast::{
    AsyncBroadcaster, AsyncBroadcasterBuilder, Broadcaster, BroadcasterBuilder, BroadcasterConfig,
    Callback, FaultSink, Subscribe, SubscribeFn, SubscriberRef,
};
pub use error::{BoxError, FaultKind, PublishError, SubscriberFault};
pub use lazy::{AsyncLazyResource, LazyResource, LazyState};
pub use memo::{DefaultComparer, FnComparer, KeyComparer, MemoStore, Memoized};
pub use policies::FaultPolicy;
pub use subscribers::{Predicate, Snapshot, SubscriberEntry, SubscriberId, SubscriberRegistry, Subscription};

// Optional: a fault sink that logs through `tracing`.
// Enabled by default with the `logging` feature.
#[cfg(feature = "logging")]
pub use broadcast::TracingSink;
