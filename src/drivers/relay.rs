//! Pump relay driver (opto-isolated relay module, active-low input).
//!
//! LOW on the input energises the coil and runs the pump; HIGH releases it.
//! Polarity is fixed for this board.
//!
//! ## Dual-target design
//!
//! Generic over any `embedded-hal` [`OutputPin`]: an `esp-idf-hal`
//! `PinDriver` on the device, [`SimPin`] on host builds.

use embedded_hal::digital::{ErrorType, OutputPin};
use log::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Released,
    Energised,
}

pub struct RelayDriver<P> {
    pin: P,
    state: RelayState,
}

impl<P: OutputPin> RelayDriver<P> {
    /// Wrap `pin` and drive it HIGH (relay released) immediately.
    pub fn new(pin: P) -> Self {
        let mut driver = Self {
            pin,
            state: RelayState::Released,
        };
        driver.release();
        driver
    }

    pub fn energise(&mut self) {
        if let Err(e) = self.pin.set_low() {
            warn!("Relay: set_low failed: {:?}", e);
        }
        self.state = RelayState::Energised;
    }

    pub fn release(&mut self) {
        if let Err(e) = self.pin.set_high() {
            warn!("Relay: set_high failed: {:?}", e);
        }
        self.state = RelayState::Released;
    }

    pub fn state(&self) -> RelayState {
        self.state
    }

    pub fn is_energised(&self) -> bool {
        self.state == RelayState::Energised
    }

    pub fn pin(&self) -> &P {
        &self.pin
    }
}

// ───────────────────────────────────────────────────────────────
// Simulated pin (host builds)
// ───────────────────────────────────────────────────────────────

/// In-memory output pin that logs level changes.
#[derive(Debug)]
pub struct SimPin {
    gpio: i32,
    high: bool,
}

impl SimPin {
    pub fn new(gpio: i32) -> Self {
        Self { gpio, high: false }
    }

    pub fn is_high(&self) -> bool {
        self.high
    }
}

impl ErrorType for SimPin {
    type Error = core::convert::Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high = false;
        log::debug!("GPIO{}(sim): LOW", self.gpio);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high = true;
        log::debug!("GPIO{}(sim): HIGH", self.gpio);
        Ok(())
    }
}
