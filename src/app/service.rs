//! Application service — the hexagonal core.
//!
//! [`ActuationService`] is the explicit context object handed to the
//! `/water` handler.  It owns the relay and the clock through port traits,
//! so the whole actuation sequence runs against fakes in tests.
//!
//! ```text
//!  raw `seconds` ──▶ ┌──────────────────────┐ ──▶ EventSink
//!                    │   ActuationService    │
//!    RelayPort ◀──── │  Idle ⇄ Actuating     │ ────▶ ClockPort
//!                    └──────────────────────┘
//! ```
//!
//! The hold is a genuine blocking sleep.  Callers get exclusive access via
//! `&mut self`, so a second request cannot start until the first returns.
//! Because of that, [`ActuationService::state`] only ever reads `Idle`
//! between calls; the `Idle → Actuating → Idle` transitions are published
//! to the sink as [`AppEvent::StateChanged`].
//!
//! The service itself does not log.  Every log line comes from the sink.

use crate::error::RequestError;

use super::events::{AppEvent, PumpCycle};
use super::ports::{ClockPort, EventSink, RelayPort};
use super::request::ActuationRequest;

/// Two-state pump lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpState {
    Idle,
    Actuating { seconds: u8 },
}

/// The application service orchestrates one pump relay.
pub struct ActuationService<R, C> {
    relay: R,
    clock: C,
    state: PumpState,
    cycles: u64,
}

impl<R: RelayPort, C: ClockPort> ActuationService<R, C> {
    /// Take ownership of the ports and force the relay into its released
    /// state.
    pub fn new(mut relay: R, clock: C) -> Self {
        relay.set_active(false);
        Self {
            relay,
            clock,
            state: PumpState::Idle,
            cycles: 0,
        }
    }

    /// Announce readiness.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started);
    }

    // ── Request handling ──────────────────────────────────────

    /// Validate the raw `seconds` value and, if it is acceptable, run one
    /// full pump cycle before returning.
    pub fn handle_water(
        &mut self,
        raw_seconds: Option<&str>,
        sink: &mut impl EventSink,
    ) -> Result<PumpCycle, RequestError> {
        match ActuationRequest::parse(raw_seconds) {
            Ok(request) => Ok(self.actuate(request, sink)),
            Err(e) => {
                sink.emit(&AppEvent::Rejected(e));
                Err(e)
            }
        }
    }

    /// Energise, hold, release.  Blocks for the whole hold; there is no
    /// early-exit path.
    pub fn actuate(&mut self, request: ActuationRequest, sink: &mut impl EventSink) -> PumpCycle {
        let seconds = request.seconds();

        self.transition(PumpState::Actuating { seconds }, sink);
        let started = self.clock.now();
        self.relay.set_active(true);
        sink.emit(&AppEvent::PumpOn { seconds });

        self.clock.sleep(request.hold());

        self.relay.set_active(false);
        let measured = self.clock.now().saturating_sub(started);
        self.transition(PumpState::Idle, sink);
        self.cycles += 1;

        let cycle = PumpCycle {
            requested_secs: seconds,
            measured,
            cycle: self.cycles,
        };
        sink.emit(&AppEvent::PumpOff(cycle));
        cycle
    }

    fn transition(&mut self, to: PumpState, sink: &mut impl EventSink) {
        let from = core::mem::replace(&mut self.state, to);
        sink.emit(&AppEvent::StateChanged { from, to });
    }

    // ── Queries ───────────────────────────────────────────────

    /// Lifecycle state between calls.
    pub fn state(&self) -> PumpState {
        self.state
    }

    /// Completed pump cycles since startup.
    pub fn cycle_count(&self) -> u64 {
        self.cycles
    }

    pub fn relay(&self) -> &R {
        &self.relay
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}
