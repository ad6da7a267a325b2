//! # Broadcaster: synchronous, order-preserving fan-out.
//!
//! [`Broadcaster`] delivers each event to its subscribers one after another on the
//! publishing thread, in subscription order.
//!
//! ## What it guarantees
//! - `publish` reads the subscriber list **once**; concurrent subscribe/unsubscribe
//!   calls never change which subscribers one publish call visits.
//! - Subscribers added during a publish miss that event; subscribers removed during a
//!   publish still receive it if they were in the snapshot.
//! - Neither `publish` nor `subscribe` ever takes a lock.
//! - A failing callback never corrupts the subscriber list; its fault is routed through
//!   the configured [`FaultPolicy`].
//!
//! ## Diagram
//! ```text
//!    publish(&event)
//!        │  snapshot = registry.snapshot()         (one atomic load)
//!        ├──► entry #1: predicate? ─► callback ─► Ok
//!        ├──► entry #2: predicate? ─► callback ─► Err ─► sink ─► policy
//!        └──► entry #N: predicate? ─► callback ─► Ok       │
//!                                                          ├─ Swallow        → continue
//!                                                          ├─ ThrowFirst     → return Err(fault)
//!                                                          └─ ThrowAggregate → collect, continue
//! ```
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use patternkit::Broadcaster;
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let bus = Broadcaster::<i32>::new();
//!
//! let s = Arc::clone(&seen);
//! let _positive = bus.subscribe_when(|v: &i32| *v > 0, move |v: &i32| {
//!     s.lock().unwrap().push(("positive", *v));
//!     Ok(())
//! });
//! let s = Arc::clone(&seen);
//! let _all = bus.subscribe(move |v: &i32| {
//!     s.lock().unwrap().push(("all", *v));
//!     Ok(())
//! });
//!
//! bus.publish(&-1).unwrap();
//! bus.publish(&5).unwrap();
//! assert_eq!(*seen.lock().unwrap(), vec![("all", -1), ("positive", 5), ("all", 5)]);
//! ```

use std::fmt;
use std::ops::ControlFlow;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::{BoxError, FaultKind, PublishError, SubscriberFault};
use crate::policies::FaultPolicy;
use crate::subscribers::{SubscriberEntry, SubscriberRegistry, Subscription};

use super::builder::BroadcasterBuilder;
use super::config::BroadcasterConfig;
use super::dispatch::Dispatch;
use super::sink::FaultSink;

/// Callback stored per subscriber.
pub type Callback<E> = Box<dyn Fn(&E) -> Result<(), BoxError> + Send + Sync>;

/// Lock-free publish/subscribe hub with synchronous delivery.
///
/// Cheap to clone: clones share subscribers, configuration and sink.
pub struct Broadcaster<E: 'static> {
    registry: SubscriberRegistry<E, Callback<E>>,
    dispatch: Arc<Dispatch>,
}

impl<E: 'static> Clone for Broadcaster<E> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            dispatch: Arc::clone(&self.dispatch),
        }
    }
}

impl<E: 'static> Broadcaster<E> {
    /// Creates a broadcaster with [`BroadcasterConfig::default`] and no sink.
    pub fn new() -> Self {
        Self::with_config(BroadcasterConfig::default())
    }

    /// Creates a broadcaster with the given configuration and no sink.
    pub fn with_config(cfg: BroadcasterConfig) -> Self {
        Self::from_parts(cfg, None)
    }

    /// Starts a builder from the default configuration.
    pub fn builder() -> BroadcasterBuilder<E> {
        BroadcasterBuilder::new(BroadcasterConfig::default())
    }

    pub(crate) fn from_parts(cfg: BroadcasterConfig, sink: Option<Arc<dyn FaultSink>>) -> Self {
        Self {
            registry: SubscriberRegistry::named(cfg.name.clone()),
            dispatch: Arc::new(Dispatch::new(cfg, sink)),
        }
    }

    /// Subscribes a callback that receives every event.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&E) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.registry.subscribe(None, Box::new(callback))
    }

    /// Subscribes a callback that only receives events accepted by `predicate`.
    pub fn subscribe_when<P, F>(&self, predicate: P, callback: F) -> Subscription
    where
        P: Fn(&E) -> bool + Send + Sync + 'static,
        F: Fn(&E) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.registry
            .subscribe(Some(Box::new(predicate)), Box::new(callback))
    }

    /// Delivers `event` to every matching subscriber of one snapshot, in order.
    ///
    /// ### Errors
    /// - [`PublishError::Subscriber`] under [`FaultPolicy::ThrowFirst`]: the first fault;
    ///   later subscribers were not called.
    /// - [`PublishError::Aggregate`] under [`FaultPolicy::ThrowAggregate`]: every fault,
    ///   after all subscribers ran.
    /// - Never under [`FaultPolicy::Swallow`].
    pub fn publish(&self, event: &E) -> Result<(), PublishError> {
        let snapshot = self.registry.snapshot();
        let mut faults = Vec::new();

        for entry in snapshot.iter() {
            if let Err(fault) = self.deliver(entry, event) {
                if let ControlFlow::Break(err) = self.dispatch.record(fault, &mut faults) {
                    return Err(err);
                }
            }
        }

        self.dispatch.finish(faults)
    }

    /// Number of installed subscribers at the moment of the call.
    #[inline]
    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }

    /// The fault policy fixed at construction.
    #[inline]
    pub fn policy(&self) -> FaultPolicy {
        self.dispatch.policy()
    }

    /// Configured name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.dispatch.cfg.name
    }

    /// Underlying registry (for removal by id, snapshots, inspection).
    #[inline]
    pub fn registry(&self) -> &SubscriberRegistry<E, Callback<E>> {
        &self.registry
    }

    fn deliver(&self, entry: &SubscriberEntry<E, Callback<E>>, event: &E) -> Result<(), SubscriberFault> {
        let call = || -> Result<(), BoxError> {
            if !entry.matches(event) {
                return Ok(());
            }
            (entry.handler())(event)
        };

        let outcome = if self.dispatch.cfg.catch_panics {
            match catch_unwind(AssertUnwindSafe(call)) {
                Ok(res) => res.map_err(FaultKind::Error),
                Err(panic) => Err(FaultKind::from_panic(panic)),
            }
        } else {
            call().map_err(FaultKind::Error)
        };

        outcome.map_err(|kind| SubscriberFault::new(entry.id(), kind))
    }
}

impl<E: 'static> Default for Broadcaster<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static> fmt::Debug for Broadcaster<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Broadcaster")
            .field("name", &self.dispatch.cfg.name)
            .field("policy", &self.dispatch.policy())
            .field("subscribers", &self.registry.len())
            .field("has_sink", &self.dispatch.has_sink())
            .finish()
    }
}
