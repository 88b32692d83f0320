//! Hardware adapter — bridges the relay driver to the domain port.
//!
//! The only module that commands a physical output.  On non-espidf targets
//! it wraps a [`SimPin`](crate::drivers::relay::SimPin).

use embedded_hal::digital::OutputPin;

use crate::app::ports::RelayPort;
use crate::drivers::relay::RelayDriver;

/// Concrete adapter exposing the pump relay through [`RelayPort`].
pub struct HardwareAdapter<P> {
    relay: RelayDriver<P>,
}

impl<P: OutputPin> HardwareAdapter<P> {
    pub fn new(relay: RelayDriver<P>) -> Self {
        Self { relay }
    }

    pub fn relay(&self) -> &RelayDriver<P> {
        &self.relay
    }
}

// ── RelayPort implementation ──────────────────────────────────

impl<P: OutputPin> RelayPort for HardwareAdapter<P> {
    fn set_active(&mut self, active: bool) {
        if active {
            self.relay.energise();
        } else {
            self.relay.release();
        }
    }

    fn is_active(&self) -> bool {
        self.relay.is_energised()
    }
}
