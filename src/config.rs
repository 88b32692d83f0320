//! System configuration parameters
//!
//! Tunable parameters for the water-relay firmware.  The hold range and
//! relay polarity are fixed and live in [`crate::app::request`] and
//! [`crate::drivers::relay`]; only runtime plumbing is configurable here.

use crate::error::ConfigError;

/// Smallest stack the HTTP task may run with.  The `/water` handler keeps its
/// frame alive for the whole hold.
pub const MIN_HTTP_STACK_SIZE: usize = 4 * 1024;

/// WiFi station credentials, baked in at build time.
pub const WIFI_SSID: &str = match option_env!("WIFI_SSID") {
    Some(s) => s,
    None => "",
};
pub const WIFI_PASS: &str = match option_env!("WIFI_PASS") {
    Some(s) => s,
    None => "",
};

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemConfig {
    // --- Network ---
    /// TCP port the HTTP listener binds
    pub http_port: u16,
    /// Stack size of the HTTP server task (bytes)
    pub http_stack_size: usize,
    /// Delay between WiFi association polls (milliseconds)
    pub wifi_poll_interval_ms: u32,

    // --- Timing ---
    /// Main loop interval (milliseconds)
    pub loop_interval_ms: u32,
    /// Task watchdog timeout for the main loop (milliseconds)
    pub watchdog_timeout_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            http_port: 5001,
            http_stack_size: 12 * 1024,
            wifi_poll_interval_ms: 500,
            loop_interval_ms: 10,
            watchdog_timeout_ms: 10_000,
        }
    }
}

impl SystemConfig {
    /// Range-check every field.  Invalid values are rejected, never clamped.
    ///
    /// `http_port` may be zero only on host builds, where it asks the OS for
    /// a free port.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if cfg!(target_os = "espidf") && self.http_port == 0 {
            return Err(ConfigError::ValidationFailed("http_port must be non-zero"));
        }
        if self.http_stack_size < MIN_HTTP_STACK_SIZE {
            return Err(ConfigError::ValidationFailed(
                "http_stack_size below 4 KiB",
            ));
        }
        if self.wifi_poll_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "wifi_poll_interval_ms must be non-zero",
            ));
        }
        if self.loop_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "loop_interval_ms must be non-zero",
            ));
        }
        if self.watchdog_timeout_ms <= self.loop_interval_ms {
            return Err(ConfigError::ValidationFailed(
                "watchdog_timeout_ms must exceed loop_interval_ms",
            ));
        }
        Ok(())
    }

    /// Main-loop iterations between WiFi link checks (at least one).
    pub fn wifi_poll_ticks(&self) -> u32 {
        (self.wifi_poll_interval_ms / self.loop_interval_ms.max(1)).max(1)
    }
}
