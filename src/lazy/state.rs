//! Observable resolution state shared by both lazy flavors.

use std::sync::atomic::{AtomicBool, Ordering};

/// Where a lazy resource is in its lifecycle.
///
/// ```text
/// Unresolved ──► Resolving ──► Resolved (terminal)
///     ▲              │
///     └── factory ───┘
///        failed / panicked / dropped
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LazyState {
    /// No value yet and nobody is running the factory.
    Unresolved,
    /// A caller holds the guard and is running the factory.
    Resolving,
    /// The value is cached; the factory will never run again.
    Resolved,
}

impl LazyState {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(self) -> &'static str {
        match self {
            LazyState::Unresolved => "unresolved",
            LazyState::Resolving => "resolving",
            LazyState::Resolved => "resolved",
        }
    }
}

/// Flag raised while a factory runs.
///
/// `Resolved` is derived from the value slot itself, so only the in-flight bit
/// needs tracking here.
#[derive(Debug, Default)]
pub(crate) struct ResolvingFlag(AtomicBool);

impl ResolvingFlag {
    /// Combines the flag with whether the value slot is filled.
    #[inline]
    pub(crate) fn state(&self, has_value: bool) -> LazyState {
        if has_value {
            LazyState::Resolved
        } else if self.0.load(Ordering::Acquire) {
            LazyState::Resolving
        } else {
            LazyState::Unresolved
        }
    }

    /// Raises the flag until the returned guard drops.
    ///
    /// The guard lowers it on every exit path: success, error, panic, or the
    /// resolving future being dropped.
    #[inline]
    pub(crate) fn enter(&self) -> ResolvingGuard<'_> {
        self.0.store(true, Ordering::Release);
        ResolvingGuard(self)
    }
}

pub(crate) struct ResolvingGuard<'a>(&'a ResolvingFlag);

impl Drop for ResolvingGuard<'_> {
    fn drop(&mut self) {
        (self.0).0.store(false, Ordering::Release);
    }
}
