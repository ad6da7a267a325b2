//! # AsyncLazyResource: cooperatively-suspending exactly-once resolution.
//!
//! [`AsyncLazyResource`] is the async counterpart of [`LazyResource`](crate::LazyResource).
//! Waiting callers suspend instead of parking a thread, both while another caller holds
//! the guard and while the async factory runs.
//!
//! The guard and the double-check live inside [`tokio::sync::OnceCell::get_or_try_init`]:
//! a single-permit semaphore serializes initializers and the slot is re-checked after the
//! permit is acquired.
//!
//! ## Rules
//! - Fast path: a resolved cell answers without touching the semaphore.
//! - At most one factory future is in flight per cell.
//! - A failed (or dropped, or panicking) factory future leaves the cell `Unresolved`;
//!   the next caller runs the factory again.
//! - The [`CancellationToken`] is handed to the factory. Honoring it is the factory's
//!   job: the cell never aborts a factory on its own.

use std::fmt;
use std::future::Future;

use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::state::{LazyState, ResolvingFlag};

/// Async lazy cell around a fallible factory `Fn(CancellationToken) -> Future`.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use patternkit::AsyncLazyResource;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let pool = AsyncLazyResource::new(|_ctx: CancellationToken| async {
///     // connect, handshake, ...
///     Ok::<_, std::io::Error>(vec!["conn-1", "conn-2"])
/// });
///
/// assert_eq!(pool.get().await.unwrap().len(), 2);
/// assert!(pool.is_resolved());
/// # }
/// ```
pub struct AsyncLazyResource<T, F> {
    value: OnceCell<T>,
    resolving: ResolvingFlag,
    factory: F,
}

impl<T, F> AsyncLazyResource<T, F> {
    /// Creates an unresolved cell; the factory does not run until the first `get`.
    pub fn new<E, Fut>(factory: F) -> Self
    where
        F: Fn(CancellationToken) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        Self {
            value: OnceCell::new(),
            resolving: ResolvingFlag::default(),
            factory,
        }
    }

    /// Returns the value if resolved, without waiting or running the factory.
    #[inline]
    pub fn get_if_resolved(&self) -> Option<&T> {
        self.value.get()
    }

    /// True once a factory call succeeded.
    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.value.initialized()
    }

    /// Current lifecycle state (a racy observation unless `Resolved`).
    #[inline]
    pub fn state(&self) -> LazyState {
        self.resolving.state(self.value.initialized())
    }

    /// Consumes the cell, returning the value if it was resolved.
    pub fn into_inner(self) -> Option<T> {
        self.value.into_inner()
    }

    /// Resolves the value with a fresh, never-cancelled token.
    ///
    /// See [`get_with`](Self::get_with).
    pub async fn get<E, Fut>(&self) -> Result<&T, E>
    where
        F: Fn(CancellationToken) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.get_with(CancellationToken::new()).await
    }

    /// Resolves the value, running the factory with `ctx` if nobody has succeeded yet.
    ///
    /// ### Errors
    /// Returns the factory's error when this call ran the factory and it failed. The
    /// cell stays unresolved, so a later call retries.
    pub async fn get_with<E, Fut>(&self, ctx: CancellationToken) -> Result<&T, E>
    where
        F: Fn(CancellationToken) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(v) = self.value.get() {
            return Ok(v);
        }

        self.value
            .get_or_try_init(|| async move {
                let _resolving = self.resolving.enter();
                debug!(resource = std::any::type_name::<T>(), "resolving async lazy resource");
                let res = (self.factory)(ctx).await;
                match &res {
                    Ok(_) => debug!(resource = std::any::type_name::<T>(), "async lazy resource resolved"),
                    Err(_) => debug!(
                        resource = std::any::type_name::<T>(),
                        "async lazy resource factory failed; retryable"
                    ),
                }
                res
            })
            .await
    }
}

impl<T: fmt::Debug, F> fmt::Debug for AsyncLazyResource<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncLazyResource")
            .field("state", &self.state())
            .field("value", &self.value.get())
            .finish_non_exhaustive()
    }
}
