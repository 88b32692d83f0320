//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ActuationService (domain)
//! ```
//!
//! Driven adapters (relay, clock, event sinks) implement these traits.  The
//! [`ActuationService`](super::service::ActuationService) owns them via
//! generics, so the domain core never touches hardware or the system timer
//! directly.

use core::time::Duration;

// ───────────────────────────────────────────────────────────────
// Relay port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the pump relay.
///
/// Implementations own the electrical polarity; the domain only speaks in
/// terms of "pump energised" and "pump released".
pub trait RelayPort {
    /// Energise (`true`) or release (`false`) the relay.
    fn set_active(&mut self, active: bool);

    /// Whether the relay is currently energised.
    fn is_active(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: domain → system timer)
// ───────────────────────────────────────────────────────────────

/// Monotonic time source plus a blocking sleep.
pub trait ClockPort {
    /// Time elapsed since boot.
    fn now(&self) -> Duration;

    /// Block the calling context for `duration`.
    fn sleep(&mut self, duration: Duration);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
