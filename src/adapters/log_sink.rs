//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (UART / USB-CDC on the device, stderr in simulation).

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started => {
                info!("START | relay released, waiting for requests");
            }
            AppEvent::StateChanged { from, to } => {
                debug!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::PumpOn { seconds } => {
                info!("PUMP  | triggered for {} s", seconds);
            }
            AppEvent::PumpOff(c) => {
                info!(
                    "PUMP  | released, requested={}s measured={}ms cycle={}",
                    c.requested_secs,
                    c.measured.as_millis(),
                    c.cycle
                );
            }
            AppEvent::Rejected(e) => {
                warn!("REQ   | rejected: {}", e);
            }
        }
    }
}
