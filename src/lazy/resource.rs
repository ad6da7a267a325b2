//! # LazyResource: thread-blocking exactly-once resolution.
//!
//! [`LazyResource`] wraps a zero-argument fallible factory and runs it at most once per
//! successful resolution, however many threads race on the first [`get`](LazyResource::get).
//!
//! ## Architecture
//! ```text
//! get()
//!   ├─ value.get() == Some(v) ───────────────────────────► Ok(v)      (fast path, no lock)
//!   └─ lock guard (parks the thread while another resolves)
//!        ├─ value.get() == Some(v) ──────────────────────► Ok(v)      (someone else won)
//!        └─ factory()
//!             ├─ Ok(v)  ─► value.get_or_init(v) ─────────► Ok(&v)    (Resolved, forever)
//!             └─ Err(e) ─► slot stays empty ─────────────► Err(e)    (Unresolved, retryable)
//! ```
//!
//! ## Rules
//! - The value slot is a [`OnceLock`]: once filled it is never cleared or replaced.
//! - The guard is private to the cell; cells never contend with each other.
//! - A factory error is returned to the caller that ran the factory; the next caller
//!   tries again. A panicking factory also leaves the cell `Unresolved`.
//! - The guard is a `parking_lot` mutex, so a panic never poisons the cell.

use std::convert::Infallible;
use std::fmt;
use std::sync::OnceLock;

use parking_lot::Mutex;
use tracing::debug;

use super::state::{LazyState, ResolvingFlag};

/// Thread-blocking lazy cell around a fallible factory.
///
/// # Example
/// ```
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use patternkit::LazyResource;
///
/// static CALLS: AtomicUsize = AtomicUsize::new(0);
///
/// let config = LazyResource::new(|| {
///     CALLS.fetch_add(1, Ordering::SeqCst);
///     Ok::<_, std::io::Error>(String::from("loaded"))
/// });
///
/// assert_eq!(config.get().unwrap(), "loaded");
/// assert_eq!(config.get().unwrap(), "loaded");
/// assert_eq!(CALLS.load(Ordering::SeqCst), 1);
/// ```
pub struct LazyResource<T, F> {
    value: OnceLock<T>,
    guard: Mutex<()>,
    resolving: ResolvingFlag,
    factory: F,
}

impl<T, F> LazyResource<T, F> {
    /// Creates an unresolved cell; the factory does not run until the first `get`.
    pub fn new<E>(factory: F) -> Self
    where
        F: Fn() -> Result<T, E>,
    {
        Self {
            value: OnceLock::new(),
            guard: Mutex::new(()),
            resolving: ResolvingFlag::default(),
            factory,
        }
    }

    /// Returns the value if resolved, without blocking or running the factory.
    #[inline]
    pub fn get_if_resolved(&self) -> Option<&T> {
        self.value.get()
    }

    /// True once a factory call succeeded.
    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.value.get().is_some()
    }

    /// Current lifecycle state (a racy observation unless `Resolved`).
    #[inline]
    pub fn state(&self) -> LazyState {
        self.resolving.state(self.value.get().is_some())
    }

    /// Consumes the cell, returning the value if it was resolved.
    pub fn into_inner(self) -> Option<T> {
        self.value.into_inner()
    }

    /// Resolves the value, running the factory if nobody has succeeded yet.
    ///
    /// ### Errors
    /// Returns the factory's error when this call ran the factory and it failed. The
    /// cell stays unresolved, so a later call retries.
    pub fn get<E>(&self) -> Result<&T, E>
    where
        F: Fn() -> Result<T, E>,
    {
        if let Some(v) = self.value.get() {
            return Ok(v);
        }
        self.resolve()
    }

    /// Infallible shorthand for factories returning `Result<T, Infallible>`.
    pub fn force(&self) -> &T
    where
        F: Fn() -> Result<T, Infallible>,
    {
        match self.get() {
            Ok(v) => v,
            Err(never) => match never {},
        }
    }

    #[cold]
    fn resolve<E>(&self) -> Result<&T, E>
    where
        F: Fn() -> Result<T, E>,
    {
        let _locked = self.guard.lock();

        // Another caller may have resolved while this one was parked.
        if let Some(v) = self.value.get() {
            return Ok(v);
        }

        let _resolving = self.resolving.enter();
        debug!(resource = std::any::type_name::<T>(), "resolving lazy resource");
        match (self.factory)() {
            Ok(value) => {
                debug!(resource = std::any::type_name::<T>(), "lazy resource resolved");
                Ok(self.value.get_or_init(|| value))
            }
            Err(e) => {
                debug!(resource = std::any::type_name::<T>(), "lazy resource factory failed; retryable");
                Err(e)
            }
        }
    }
}

impl<T: fmt::Debug, F> fmt::Debug for LazyResource<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyResource")
            .field("state", &self.state())
            .field("value", &self.value.get())
            .finish_non_exhaustive()
    }
}
