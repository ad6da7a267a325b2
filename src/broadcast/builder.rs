use std::borrow::Cow;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::policies::FaultPolicy;

use super::async_broadcaster::AsyncBroadcaster;
use super::broadcaster::Broadcaster;
use super::config::BroadcasterConfig;
use super::sink::FaultSink;

/// Builder for constructing a [`Broadcaster`] with optional features.
pub struct BroadcasterBuilder<E> {
    cfg: BroadcasterConfig,
    sink: Option<Arc<dyn FaultSink>>,
    _event: PhantomData<fn(E)>,
}

impl<E: 'static> BroadcasterBuilder<E> {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: BroadcasterConfig) -> Self {
        Self {
            cfg,
            sink: None,
            _event: PhantomData,
        }
    }

    /// Sets the fault-isolation policy.
    pub fn with_policy(mut self, policy: FaultPolicy) -> Self {
        self.cfg.policy = policy;
        self
    }

    /// Sets the name used in logs and sink notifications.
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.cfg.name = name.into();
        self
    }

    /// Enables or disables panic isolation for callbacks.
    pub fn with_catch_panics(mut self, catch: bool) -> Self {
        self.cfg.catch_panics = catch;
        self
    }

    /// Sets the sink notified once per subscriber fault.
    pub fn with_sink(mut self, sink: impl FaultSink) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Builds and returns the broadcaster.
    pub fn build(self) -> Broadcaster<E> {
        Broadcaster::from_parts(self.cfg, self.sink)
    }
}

/// Builder for constructing an [`AsyncBroadcaster`] with optional features.
pub struct AsyncBroadcasterBuilder<E> {
    cfg: BroadcasterConfig,
    sink: Option<Arc<dyn FaultSink>>,
    _event: PhantomData<fn(E)>,
}

impl<E: Sync + 'static> AsyncBroadcasterBuilder<E> {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: BroadcasterConfig) -> Self {
        Self {
            cfg,
            sink: None,
            _event: PhantomData,
        }
    }

    /// Sets the fault-isolation policy.
    pub fn with_policy(mut self, policy: FaultPolicy) -> Self {
        self.cfg.policy = policy;
        self
    }

    /// Sets the name used in logs and sink notifications.
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.cfg.name = name.into();
        self
    }

    /// Enables or disables panic isolation for handlers.
    pub fn with_catch_panics(mut self, catch: bool) -> Self {
        self.cfg.catch_panics = catch;
        self
    }

    /// Sets the sink notified once per subscriber fault.
    pub fn with_sink(mut self, sink: impl FaultSink) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Builds and returns the broadcaster.
    pub fn build(self) -> AsyncBroadcaster<E> {
        AsyncBroadcaster::from_parts(self.cfg, self.sink)
    }
}
