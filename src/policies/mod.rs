//! Fault-isolation policies.
//!
//! ## Contents
//! - [`FaultPolicy`] how subscriber faults escape `publish` (swallow / first / aggregate)
//!
//! ## Quick wiring
//! ```text
//! BroadcasterConfig { policy: FaultPolicy, .. }
//!      └─► Dispatch::record, once per fault:
//!           - Swallow        → continue
//!           - ThrowFirst     → stop, Err(Subscriber(fault))
//!           - ThrowAggregate → collect, Err(Aggregate(faults)) after the scan
//! ```
//!
//! ## Defaults
//! - `FaultPolicy::ThrowAggregate`: every subscriber runs, failures are still reported.

mod fault;

pub use fault::FaultPolicy;
