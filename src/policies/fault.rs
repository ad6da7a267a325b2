//! # Fault-isolation policies for broadcasters.
//!
//! [`FaultPolicy`] decides what `publish` does when a subscriber callback fails.
//!
//! - [`FaultPolicy::Swallow`] faults are discarded; `publish` always returns `Ok`.
//! - [`FaultPolicy::ThrowFirst`] the scan stops at the first fault, which is returned.
//! - [`FaultPolicy::ThrowAggregate`] the scan visits everyone, then returns all faults (default).
//!
//! ## Choosing the right policy
//!
//! **Fire-and-forget notifications** (observers must never affect the publisher):
//! ```text
//! FaultPolicy::Swallow         → every subscriber runs, faults only reach the sink
//! ```
//!
//! **Validation chains** (a failing step makes later steps meaningless):
//! ```text
//! FaultPolicy::ThrowFirst      → subscriber fails → remaining subscribers skipped
//! ```
//!
//! **Independent side effects** (everyone runs, caller still learns about failures):
//! ```text
//! FaultPolicy::ThrowAggregate  → every subscriber runs → one aggregate error (default)
//! ```
//!
//! In every mode the configured sink (if any) sees each fault before the policy acts.

/// Policy controlling how subscriber faults escape `publish`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FaultPolicy {
    /// Discard faults; `publish` completes normally.
    Swallow,
    /// Stop at the first fault and return it as `PublishError::Subscriber`.
    ThrowFirst,
    /// Visit every subscriber; return all faults as `PublishError::Aggregate` (default).
    #[default]
    ThrowAggregate,
}

impl FaultPolicy {
    /// True if the scan must stop as soon as one fault is seen.
    #[inline]
    pub fn stops_on_fault(self) -> bool {
        matches!(self, FaultPolicy::ThrowFirst)
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(self) -> &'static str {
        match self {
            FaultPolicy::Swallow => "swallow",
            FaultPolicy::ThrowFirst => "throw_first",
            FaultPolicy::ThrowAggregate => "throw_aggregate",
        }
    }
}
