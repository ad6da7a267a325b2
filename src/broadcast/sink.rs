//! # Fault sinks.
//!
//! A [`FaultSink`] is notified once per subscriber fault, before the broadcaster's
//! [`FaultPolicy`](crate::FaultPolicy) acts on it.
//!
//! ## Rules
//! - The sink runs on the publishing thread/task, inside `publish`.
//! - Whatever the sink returns (or panics with) is discarded; it never reaches the
//!   caller of `publish`.
//! - Any `Fn(&SubscriberFault) -> Result<(), BoxError>` closure is a sink.

use crate::error::{BoxError, SubscriberFault};

/// Hook receiving every subscriber fault of a broadcaster.
pub trait FaultSink: Send + Sync + 'static {
    /// Called once per fault. `broadcaster` is the configured broadcaster name.
    fn on_fault(&self, broadcaster: &str, fault: &SubscriberFault) -> Result<(), BoxError>;
}

impl<F> FaultSink for F
where
    F: Fn(&SubscriberFault) -> Result<(), BoxError> + Send + Sync + 'static,
{
    fn on_fault(&self, _broadcaster: &str, fault: &SubscriberFault) -> Result<(), BoxError> {
        self(fault)
    }
}

/// Built-in sink that logs every fault at `warn` level through `tracing`.
#[cfg(feature = "logging")]
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

#[cfg(feature = "logging")]
impl FaultSink for TracingSink {
    fn on_fault(&self, broadcaster: &str, fault: &SubscriberFault) -> Result<(), BoxError> {
        tracing::warn!(
            broadcaster,
            subscriber = %fault.id,
            label = fault.as_label(),
            "{}",
            fault.as_message()
        );
        Ok(())
    }
}
