//! Error types used by the broadcasters.
//!
//! This module defines:
//!
//! - [`SubscriberFault`] a single failure raised by one subscriber callback.
//! - [`FaultKind`] whether the callback returned an error or panicked.
//! - [`PublishError`] what `publish` surfaces under the escalating policies.
//!
//! All types provide helper methods (`as_label`, `as_message`) for logging/metrics.
//!
//! Lazy cells do not wrap their factory errors: a factory fault is returned to the
//! caller exactly as the factory produced it.

use std::any::Any;

use thiserror::Error;

use crate::subscribers::SubscriberId;

/// Boxed error payload returned by callbacks, handlers and sinks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// # How a subscriber callback failed.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum FaultKind {
    /// The callback returned `Err`.
    #[error("{0}")]
    Error(BoxError),

    /// The callback (or its predicate) panicked; the payload is rendered to a string.
    #[error("panicked: {0}")]
    Panicked(String),
}

impl FaultKind {
    /// Builds a [`FaultKind::Panicked`] from a `catch_unwind` payload.
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        FaultKind::Panicked(panic_message(payload.as_ref()))
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            FaultKind::Error(_) => "subscriber_error",
            FaultKind::Panicked(_) => "subscriber_panicked",
        }
    }
}

/// # A failure raised by one subscriber while handling one event.
///
/// Carries the id of the failing subscriber so sinks and callers can correlate
/// the fault with the `Subscription` that produced it.
#[derive(Error, Debug)]
#[error("subscriber {id} failed: {kind}")]
pub struct SubscriberFault {
    /// Id of the subscriber whose callback failed.
    pub id: SubscriberId,
    /// The failure itself.
    #[source]
    pub kind: FaultKind,
}

impl SubscriberFault {
    pub(crate) fn new(id: SubscriberId, kind: FaultKind) -> Self {
        Self { id, kind }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use patternkit::{Broadcaster, FaultPolicy, PublishError};
    ///
    /// let b = Broadcaster::<u32>::builder()
    ///     .with_policy(FaultPolicy::ThrowFirst)
    ///     .build();
    /// let _s = b.subscribe(|_: &u32| Err("nope".into()));
    ///
    /// match b.publish(&1) {
    ///     Err(PublishError::Subscriber(fault)) => assert_eq!(fault.as_label(), "subscriber_error"),
    ///     other => panic!("unexpected: {other:?}"),
    /// }
    /// ```
    pub fn as_label(&self) -> &'static str {
        self.kind.as_label()
    }

    /// Returns a human-readable message with details about the fault.
    pub fn as_message(&self) -> String {
        match &self.kind {
            FaultKind::Error(e) => format!("subscriber={} error: {e}", self.id),
            FaultKind::Panicked(msg) => format!("subscriber={} panic: {msg}", self.id),
        }
    }

    /// Returns the error returned by the callback, if it did not panic.
    pub fn error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match &self.kind {
            FaultKind::Error(e) => Some(e.as_ref()),
            FaultKind::Panicked(_) => None,
        }
    }

    /// True if the callback panicked instead of returning an error.
    pub fn is_panic(&self) -> bool {
        matches!(self.kind, FaultKind::Panicked(_))
    }
}

/// # Errors surfaced by `publish`.
///
/// Only the escalating policies produce these; under
/// [`FaultPolicy::Swallow`](crate::FaultPolicy::Swallow) publish always succeeds.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum PublishError {
    /// The first fault encountered; later subscribers were not visited.
    #[error(transparent)]
    Subscriber(SubscriberFault),

    /// Every fault of a full scan, in encounter order (never empty).
    #[error("{} subscriber(s) failed", .0.len())]
    Aggregate(Vec<SubscriberFault>),
}

impl PublishError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use patternkit::Broadcaster;
    ///
    /// let b = Broadcaster::<u32>::new();
    /// let _s = b.subscribe(|_: &u32| Err("boom".into()));
    ///
    /// let err = b.publish(&7).unwrap_err();
    /// assert_eq!(err.as_label(), "publish_aggregate");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            PublishError::Subscriber(_) => "publish_subscriber_fault",
            PublishError::Aggregate(_) => "publish_aggregate",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            PublishError::Subscriber(f) => f.as_message(),
            PublishError::Aggregate(faults) => {
                let parts: Vec<String> = faults.iter().map(SubscriberFault::as_message).collect();
                format!("{} fault(s): [{}]", faults.len(), parts.join("; "))
            }
        }
    }

    /// All faults carried by this error, in encounter order.
    pub fn faults(&self) -> &[SubscriberFault] {
        match self {
            PublishError::Subscriber(f) => std::slice::from_ref(f),
            PublishError::Aggregate(faults) => faults,
        }
    }

    /// Consumes the error and returns its faults.
    pub fn into_faults(self) -> Vec<SubscriberFault> {
        match self {
            PublishError::Subscriber(f) => vec![f],
            PublishError::Aggregate(faults) => faults,
        }
    }
}

/// Renders a panic payload the way `std` does for `&str`/`String` payloads.
pub(crate) fn panic_message(any: &(dyn Any + Send)) -> String {
    if let Some(msg) = any.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = any.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
