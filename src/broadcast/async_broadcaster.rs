//! # AsyncBroadcaster: cooperative, strictly sequential fan-out.
//!
//! [`AsyncBroadcaster`] is the suspending counterpart of [`Broadcaster`](crate::Broadcaster).
//! It shares the same lock-free [`SubscriberRegistry`], the same fault policies and the
//! same sink semantics; only delivery differs:
//!
//! ```text
//! publish(&event).await
//!     │  snapshot = registry.snapshot()           (one atomic load, no await)
//!     ├──► #1 on_event(&event, ctx).await  ── completes fully ──┐
//!     │                                                         ▼
//!     ├──► #2 on_event(&event, ctx).await  ── completes fully ──┐
//!     │                                                         ▼
//!     └──► #N ...
//! ```
//!
//! ## Rules
//! - One subscriber's future (including every suspension inside it) completes before
//!   the next subscriber is polled.
//! - Subscribing and unsubscribing never suspend.
//! - The cancellation token given to `publish_with` is forwarded to handlers; the
//!   broadcaster itself never abandons an in-flight handler.
//! - Panics inside `on_event` are caught with `catch_unwind` (when enabled).

use std::fmt;
use std::future::Future;
use std::ops::ControlFlow;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::error::{BoxError, FaultKind, PublishError, SubscriberFault};
use crate::policies::FaultPolicy;
use crate::subscribers::{SubscriberEntry, SubscriberRegistry, Subscription};

use super::builder::AsyncBroadcasterBuilder;
use super::config::BroadcasterConfig;
use super::dispatch::Dispatch;
use super::sink::FaultSink;
use super::subscribe::{SubscribeFn, SubscriberRef};

/// Lock-free publish/subscribe hub whose handlers are async.
///
/// Cheap to clone: clones share subscribers, configuration and sink.
pub struct AsyncBroadcaster<E: Sync + 'static> {
    registry: SubscriberRegistry<E, SubscriberRef<E>>,
    dispatch: Arc<Dispatch>,
}

impl<E: Sync + 'static> Clone for AsyncBroadcaster<E> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            dispatch: Arc::clone(&self.dispatch),
        }
    }
}

impl<E: Sync + 'static> AsyncBroadcaster<E> {
    /// Creates a broadcaster with [`BroadcasterConfig::default`] and no sink.
    pub fn new() -> Self {
        Self::with_config(BroadcasterConfig::default())
    }

    /// Creates a broadcaster with the given configuration and no sink.
    pub fn with_config(cfg: BroadcasterConfig) -> Self {
        Self::from_parts(cfg, None)
    }

    /// Starts a builder from the default configuration.
    pub fn builder() -> AsyncBroadcasterBuilder<E> {
        AsyncBroadcasterBuilder::new(BroadcasterConfig::default())
    }

    pub(crate) fn from_parts(cfg: BroadcasterConfig, sink: Option<Arc<dyn FaultSink>>) -> Self {
        Self {
            registry: SubscriberRegistry::named(cfg.name.clone()),
            dispatch: Arc::new(Dispatch::new(cfg, sink)),
        }
    }

    /// Subscribes a handler that receives every event.
    pub fn subscribe(&self, handler: SubscriberRef<E>) -> Subscription {
        self.registry.subscribe(None, handler)
    }

    /// Subscribes a handler that only receives events accepted by `predicate`.
    pub fn subscribe_when<P>(&self, predicate: P, handler: SubscriberRef<E>) -> Subscription
    where
        P: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.registry.subscribe(Some(Box::new(predicate)), handler)
    }

    /// Subscribes an async closure; the event is cloned into each call.
    pub fn subscribe_fn<F, Fut>(&self, name: &'static str, f: F) -> Subscription
    where
        E: Clone + Send,
        F: Fn(E, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        let handler: SubscriberRef<E> = SubscribeFn::<E, F>::arc(name, f);
        self.subscribe(handler)
    }

    /// Delivers `event` with a fresh, never-cancelled token.
    ///
    /// See [`publish_with`](Self::publish_with).
    pub async fn publish(&self, event: &E) -> Result<(), PublishError> {
        self.publish_with(event, CancellationToken::new()).await
    }

    /// Delivers `event` to every matching subscriber of one snapshot, one at a time.
    ///
    /// `ctx` is cloned into each handler call.
    ///
    /// ### Errors
    /// Same as [`Broadcaster::publish`](crate::Broadcaster::publish).
    pub async fn publish_with(&self, event: &E, ctx: CancellationToken) -> Result<(), PublishError> {
        let snapshot = self.registry.snapshot();
        let mut faults = Vec::new();

        for entry in snapshot.iter() {
            if let Err(fault) = self.deliver(entry, event, &ctx).await {
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
    pub fn registry(&self) -> &SubscriberRegistry<E, SubscriberRef<E>> {
        &self.registry
    }

    async fn deliver(
        &self,
        entry: &SubscriberEntry<E, SubscriberRef<E>>,
        event: &E,
        ctx: &CancellationToken,
    ) -> Result<(), SubscriberFault> {
        let catch_panics = self.dispatch.cfg.catch_panics;
        let fault = |kind| SubscriberFault::new(entry.id(), kind);

        let matched = if catch_panics {
            catch_unwind(AssertUnwindSafe(|| entry.matches(event)))
                .map_err(|panic| fault(FaultKind::from_panic(panic)))?
        } else {
            entry.matches(event)
        };
        if !matched {
            return Ok(());
        }

        let handler = entry.handler();
        trace!(broadcaster = %self.dispatch.cfg.name, subscriber = handler.name(), "delivering");
        let fut = handler.on_event(event, ctx.clone());

        let outcome = if catch_panics {
            match AssertUnwindSafe(fut).catch_unwind().await {
                Ok(res) => res.map_err(FaultKind::Error),
                Err(panic) => Err(FaultKind::from_panic(panic)),
            }
        } else {
            fut.await.map_err(FaultKind::Error)
        };

        outcome.map_err(fault)
    }
}

impl<E: Sync + 'static> Default for AsyncBroadcaster<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Sync + 'static> fmt::Debug for AsyncBroadcaster<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncBroadcaster")
            .field("name", &self.dispatch.cfg.name)
            .field("policy", &self.dispatch.policy())
            .field("subscribers", &self.registry.len())
            .field("has_sink", &self.dispatch.has_sink())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::broadcast::subscribe::Subscribe;

    struct Step {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
        pause: Duration,
    }

    #[async_trait]
    impl Subscribe<u32> for Step {
        async fn on_event(&self, ev: &u32, _ctx: CancellationToken) -> Result<(), BoxError> {
            self.log.lock().unwrap().push(format!("{}:start:{ev}", self.name));
            tokio::time::sleep(self.pause).await;
            self.log.lock().unwrap().push(format!("{}:end:{ev}", self.name));
            Ok(())
        }

        fn name(&self) -> &str {
            self.name
        }
    }

    #[tokio::test]
    async fn test_handlers_run_strictly_in_sequence() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let b = AsyncBroadcaster::<u32>::new();
        let _slow = b.subscribe(Arc::new(Step {
            name: "slow",
            log: Arc::clone(&log),
            pause: Duration::from_millis(30),
        }));
        let _fast = b.subscribe(Arc::new(Step {
            name: "fast",
            log: Arc::clone(&log),
            pause: Duration::ZERO,
        }));

        b.publish(&7).await.unwrap();
        assert_eq!(
            *log.lock().unwrap(),
            vec!["slow:start:7", "slow:end:7", "fast:start:7", "fast:end:7"]
        );
    }

    #[tokio::test]
    async fn test_predicate_filters_async_subscribers() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let b = AsyncBroadcaster::<u32>::new();
        let _even = b.subscribe_when(
            |v: &u32| v % 2 == 0,
            Arc::new(Step {
                name: "even",
                log: Arc::clone(&log),
                pause: Duration::ZERO,
            }),
        );

        b.publish(&1).await.unwrap();
        b.publish(&2).await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["even:start:2", "even:end:2"]);
    }

    #[tokio::test]
    async fn test_async_panic_becomes_fault() {
        let b = AsyncBroadcaster::<u32>::builder()
            .with_policy(FaultPolicy::ThrowFirst)
            .build();
        let _p = b.subscribe_fn("panics", |_ev: u32, _ctx| async move {
            if true {
                panic!("async boom");
            }
            Ok::<_, BoxError>(())
        });

        match b.publish(&1).await {
            Err(PublishError::Subscriber(f)) => {
                assert!(f.is_panic());
                assert_eq!(f.as_message(), format!("subscriber={} panic: async boom", f.id));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_token_is_forwarded_not_enforced() {
        let b = AsyncBroadcaster::<u32>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        let _h = b.subscribe_fn("observer", move |_ev: u32, ctx: CancellationToken| {
            let s = Arc::clone(&s);
            async move {
                s.lock().unwrap().push(ctx.is_cancelled());
                Ok::<_, BoxError>(())
            }
        });

        let ctx = CancellationToken::new();
        ctx.cancel();
        b.publish_with(&1, ctx).await.unwrap();
        b.publish(&2).await.unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![true, false]);
    }
}
