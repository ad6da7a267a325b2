//! Broadcasters: snapshot-based fan-out over a [`SubscriberRegistry`](crate::SubscriberRegistry).
//!
//! This module groups the two delivery flavors and the pieces they share.
//!
//! ## Contents
//! - [`Broadcaster`] synchronous delivery on the publishing thread
//! - [`AsyncBroadcaster`] cooperative delivery, one handler future at a time
//! - [`Subscribe`], [`SubscribeFn`] async handler trait and closure adapter
//! - [`BroadcasterConfig`] name / policy / panic isolation
//! - [`BroadcasterBuilder`], [`AsyncBroadcasterBuilder`] construction with an optional sink
//! - [`FaultSink`] per-fault notification hook (and `TracingSink` with the `logging` feature)
//!
//! ## Quick reference
//! ```text
//! builder ─► Dispatch { cfg, sink } ◄── shared by ──► Broadcaster / AsyncBroadcaster
//!                                                         │
//!                                                         └─► SubscriberRegistry<E, H>
//! ```

mod async_broadcaster;
mod broadcaster;
mod builder;
mod config;
mod dispatch;
mod sink;
mod subscribe;

pub use async_broadcaster::AsyncBroadcaster;
pub use broadcaster::{Broadcaster, Callback};
pub use builder::{AsyncBroadcasterBuilder, BroadcasterBuilder};
pub use config::BroadcasterConfig;
pub use sink::FaultSink;
#[cfg(feature = "logging")]
pub use sink::TracingSink;
pub use subscribe::{Subscribe, SubscribeFn, SubscriberRef};
