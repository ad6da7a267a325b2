//! # Broadcaster configuration.
//!
//! Provides [`BroadcasterConfig`], the settings fixed at construction time for both
//! [`Broadcaster`](crate::Broadcaster) and [`AsyncBroadcaster`](crate::AsyncBroadcaster).
//!
//! Config is used in two ways:
//! 1. **Direct**: `Broadcaster::with_config(cfg)`
//! 2. **Builder**: `BroadcasterBuilder::new(cfg)` then `.with_sink(..)`, `.build()`

use std::borrow::Cow;

use crate::policies::FaultPolicy;

/// Construction-time settings of a broadcaster.
///
/// ## Field semantics
/// - `name`: label attached to every log line and passed to the fault sink
/// - `policy`: how subscriber faults escape `publish`
/// - `catch_panics`: convert callback panics into faults (`false` lets them unwind
///   through `publish`)
#[derive(Clone, Debug)]
pub struct BroadcasterConfig {
    /// Name used in log fields and sink notifications.
    pub name: Cow<'static, str>,

    /// Fault-isolation policy applied by every `publish` call.
    pub policy: FaultPolicy,

    /// Whether panics inside predicates and callbacks are caught and treated as faults.
    ///
    /// Uses `AssertUnwindSafe`: a subscriber that panics while holding a lock may
    /// leave its own state inconsistent.
    pub catch_panics: bool,
}

impl Default for BroadcasterConfig {
    /// Default configuration:
    ///
    /// - `name = "broadcaster"`
    /// - `policy = FaultPolicy::ThrowAggregate`
    /// - `catch_panics = true`
    fn default() -> Self {
        Self {
            name: Cow::Borrowed("broadcaster"),
            policy: FaultPolicy::default(),
            catch_panics: true,
        }
    }
}
