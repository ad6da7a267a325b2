//! # Async subscriber trait.
//!
//! Provides [`Subscribe`], the handler type of [`AsyncBroadcaster`](crate::AsyncBroadcaster),
//! and [`SubscribeFn`], a closure-backed implementation.
//!
//! ## Rules
//! - `on_event` may suspend; the broadcaster awaits it fully before calling the next
//!   subscriber.
//! - The [`CancellationToken`] is advisory: the broadcaster never aborts a running
//!   handler, the handler decides whether and when to stop early.
//! - Returning `Err` (or panicking) produces a subscriber fault.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use tokio_util::sync::CancellationToken;
//! use patternkit::{BoxError, Subscribe};
//!
//! struct Audit;
//!
//! #[async_trait]
//! impl Subscribe<String> for Audit {
//!     async fn on_event(&self, ev: &String, ctx: CancellationToken) -> Result<(), BoxError> {
//!         if ctx.is_cancelled() {
//!             return Ok(());
//!         }
//!         let _ = ev; // write to an audit log, etc.
//!         Ok(())
//!     }
//!
//!     fn name(&self) -> &str { "audit" }
//! }
//! ```

use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::BoxError;

/// Event handler for [`AsyncBroadcaster`](crate::AsyncBroadcaster).
#[async_trait]
pub trait Subscribe<E: Sync>: Send + Sync + 'static {
    /// Handles one event.
    ///
    /// Called from inside `publish`; the next subscriber starts only after this
    /// future completes.
    async fn on_event(&self, event: &E, ctx: CancellationToken) -> Result<(), BoxError>;

    /// Returns the subscriber name used in logs.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose; override it when possible.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Shared handle to an async subscriber.
pub type SubscriberRef<E> = Arc<dyn Subscribe<E>>;

/// Function-backed subscriber.
///
/// Wraps a closure `F: Fn(E, CancellationToken) -> Fut`; the event is cloned into each
/// call so the returned future owns its input.
pub struct SubscribeFn<E, F> {
    name: Cow<'static, str>,
    f: F,
    _event: PhantomData<fn(E)>,
}

impl<E, F> SubscribeFn<E, F> {
    /// Creates a new function-backed subscriber.
    ///
    /// Prefer [`SubscribeFn::arc`] when you immediately need a [`SubscriberRef`].
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
            _event: PhantomData,
        }
    }

    /// Creates the subscriber and returns it as a shared handle.
    ///
    /// ## Example
    /// ```rust
    /// use tokio_util::sync::CancellationToken;
    /// use patternkit::{BoxError, Subscribe, SubscribeFn, SubscriberRef};
    ///
    /// let s: SubscriberRef<u32> = SubscribeFn::<u32, _>::arc("printer", |ev: u32, _ctx: CancellationToken| async move {
    ///     let _ = ev;
    ///     Ok::<_, BoxError>(())
    /// });
    /// assert_eq!(s.name(), "printer");
    /// ```
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<E, F, Fut> Subscribe<E> for SubscribeFn<E, F>
where
    E: Clone + Send + Sync + 'static,
    F: Fn(E, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    async fn on_event(&self, event: &E, ctx: CancellationToken) -> Result<(), BoxError> {
        (self.f)(event.clone(), ctx).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<E, F> fmt::Debug for SubscribeFn<E, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscribeFn")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
