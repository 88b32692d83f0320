//! Outbound application events.
//!
//! The [`ActuationService`](super::service::ActuationService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.

use core::time::Duration;

use crate::error::RequestError;

use super::service::PumpState;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The service is up with the relay released.
    Started,

    /// The pump lifecycle moved between idle and actuating.
    StateChanged { from: PumpState, to: PumpState },

    /// The relay was energised for a hold of `seconds`.
    PumpOn { seconds: u8 },

    /// The relay was released after a completed hold.
    PumpOff(PumpCycle),

    /// A request was refused before touching the relay.
    Rejected(RequestError),
}

/// Outcome of one completed pump cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PumpCycle {
    /// Hold the caller asked for (seconds).
    pub requested_secs: u8,
    /// Hold measured on the clock between energise and release.
    pub measured: Duration,
    /// 1-based cycle number since boot.
    pub cycle: u64,
}
