//! Policy and sink handling shared by both broadcaster flavors.

use std::ops::ControlFlow;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::{panic_message, PublishError, SubscriberFault};
use crate::policies::FaultPolicy;

use super::config::BroadcasterConfig;
use super::sink::FaultSink;

/// Immutable per-broadcaster state consulted while scanning a snapshot.
pub(crate) struct Dispatch {
    pub(crate) cfg: BroadcasterConfig,
    sink: Option<Arc<dyn FaultSink>>,
}

impl Dispatch {
    pub(crate) fn new(cfg: BroadcasterConfig, sink: Option<Arc<dyn FaultSink>>) -> Self {
        Self { cfg, sink }
    }

    #[inline]
    pub(crate) fn policy(&self) -> FaultPolicy {
        self.cfg.policy
    }

    #[inline]
    pub(crate) fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    /// Notifies the sink, then applies the policy to one fault.
    ///
    /// `Break` carries the error that must end the scan right away.
    pub(crate) fn record(
        &self,
        fault: SubscriberFault,
        faults: &mut Vec<SubscriberFault>,
    ) -> ControlFlow<PublishError> {
        self.notify(&fault);
        match self.cfg.policy {
            FaultPolicy::Swallow => {
                trace!(broadcaster = %self.cfg.name, subscriber = %fault.id, "fault swallowed");
                ControlFlow::Continue(())
            }
            FaultPolicy::ThrowFirst => {
                debug!(broadcaster = %self.cfg.name, subscriber = %fault.id, "publish stopped at first fault");
                ControlFlow::Break(PublishError::Subscriber(fault))
            }
            FaultPolicy::ThrowAggregate => {
                faults.push(fault);
                ControlFlow::Continue(())
            }
        }
    }

    /// Turns the faults gathered by a full scan into the publish result.
    pub(crate) fn finish(&self, faults: Vec<SubscriberFault>) -> Result<(), PublishError> {
        if faults.is_empty() {
            return Ok(());
        }
        debug!(
            broadcaster = %self.cfg.name,
            policy = self.cfg.policy.as_label(),
            faults = faults.len(),
            "publish completed with faults"
        );
        Err(PublishError::Aggregate(faults))
    }

    fn notify(&self, fault: &SubscriberFault) {
        let Some(sink) = &self.sink else {
            return;
        };
        match catch_unwind(AssertUnwindSafe(|| sink.on_fault(&self.cfg.name, fault))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                trace!(broadcaster = %self.cfg.name, error = %e, "sink error discarded");
            }
            Err(panic) => {
                trace!(
                    broadcaster = %self.cfg.name,
                    panic = %panic_message(panic.as_ref()),
                    "sink panic discarded"
                );
            }
        }
    }
}
