//! WiFi station-mode adapter.
//!
//! Implements [`ConnectivityPort`] — the hexagonal boundary for network
//! association.  The listener must not start until [`connect_blocking`]
//! returns.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver calls via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation stubs for host-side tests.
//!
//! ## Association policy
//!
//! Start the station, then poll the link every `poll_interval` until it is
//! up.  The driver does not retry on its own, so while the station is not
//! associated the association request is re-issued every
//! [`RECONNECT_AFTER_POLLS`] polls.  No attempt limit and no backoff.
//!
//! After boot the main loop calls [`ConnectivityPort::poll`], which notices a
//! dropped link and re-requests it under the same policy.
//!
//! [`connect_blocking`]: ConnectivityPort::connect_blocking

use core::net::Ipv4Addr;
use core::time::Duration;

use log::{info, warn};

use crate::app::ports::ClockPort;
use crate::error::ConnectivityError;

#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi};

/// Unsuccessful polls before the association request is re-issued.
pub const RECONNECT_AFTER_POLLS: u32 = 10;

// ───────────────────────────────────────────────────────────────
// Port trait
// ───────────────────────────────────────────────────────────────

pub trait ConnectivityPort {
    /// Validate and store station credentials.
    fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError>;

    /// Start association and block until the link is up.
    /// Returns the number of unsuccessful polls before the link came up.
    fn connect_blocking(
        &mut self,
        clock: &mut impl ClockPort,
        poll_interval: Duration,
    ) -> Result<u32, ConnectivityError>;

    /// One link check from the main loop.  Detects a dropped link and
    /// re-requests association.  Returns whether the link is up.
    fn poll(&mut self) -> bool;

    fn is_connected(&self) -> bool;

    /// Station IPv4 address once connected.
    fn ip_addr(&self) -> Option<Ipv4Addr>;
}

// ───────────────────────────────────────────────────────────────
// Connection state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    Connecting,
    Connected,
    /// Link lost after boot; `polls` since the last association request.
    Reconnecting { polls: u32 },
}

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    state: WifiState,
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    ip: Option<Ipv4Addr>,
    #[cfg(target_os = "espidf")]
    driver: EspWifi<'static>,
    /// Simulation: polls that report "not yet associated" before the link comes up.
    #[cfg(not(target_os = "espidf"))]
    sim_polls_before_up: u32,
    #[cfg(not(target_os = "espidf"))]
    sim_polls: u32,
    /// Simulation: leading association requests that never succeed.
    #[cfg(not(target_os = "espidf"))]
    sim_failing_attempts: u32,
    #[cfg(not(target_os = "espidf"))]
    sim_attempts: u32,
    #[cfg(not(target_os = "espidf"))]
    sim_link_dropped: bool,
}

impl WifiAdapter {
    #[cfg(target_os = "espidf")]
    pub fn new(driver: EspWifi<'static>) -> Self {
        Self {
            state: WifiState::Disconnected,
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            ip: None,
            driver,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        Self::with_sim_delay(0)
    }

    /// Simulated adapter whose link comes up after `polls` unsuccessful polls.
    #[cfg(not(target_os = "espidf"))]
    pub fn with_sim_delay(polls: u32) -> Self {
        Self {
            state: WifiState::Disconnected,
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            ip: None,
            sim_polls_before_up: polls,
            sim_polls: 0,
            sim_failing_attempts: 0,
            sim_attempts: 0,
            sim_link_dropped: false,
        }
    }

    /// Make the first `attempts` association requests fail.
    #[cfg(not(target_os = "espidf"))]
    pub fn with_failed_attempts(mut self, attempts: u32) -> Self {
        self.sim_failing_attempts = attempts;
        self
    }

    /// Simulate the access point going away.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_drop_link(&mut self) {
        self.sim_link_dropped = true;
    }

    /// Association requests issued so far (simulation only).
    #[cfg(not(target_os = "espidf"))]
    pub fn attempts(&self) -> u32 {
        self.sim_attempts
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_begin(&mut self) -> Result<(), ConnectivityError> {
        let auth_method = if self.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let client = ClientConfiguration {
            ssid: self
                .ssid
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidSsid)?,
            password: self
                .password
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidPassword)?,
            auth_method,
            ..Default::default()
        };
        self.driver
            .set_configuration(&Configuration::Client(client))
            .map_err(|e| {
                log::error!("WiFi: set_configuration failed: {}", e);
                ConnectivityError::DriverFailed
            })?;
        self.driver.start().map_err(|e| {
            log::error!("WiFi: start failed: {}", e);
            ConnectivityError::DriverFailed
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_begin(&mut self) -> Result<(), ConnectivityError> {
        self.sim_attempts = 0;
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_request_link(&mut self) -> Result<(), ConnectivityError> {
        self.driver.connect().map_err(|e| {
            warn!("WiFi: connect request failed: {}", e);
            ConnectivityError::DriverFailed
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_request_link(&mut self) -> Result<(), ConnectivityError> {
        self.sim_attempts += 1;
        self.sim_polls = 0;
        self.sim_link_dropped = false;
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_associated(&self) -> bool {
        self.driver.is_connected().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_associated(&self) -> bool {
        !self.sim_link_dropped && self.sim_attempts > self.sim_failing_attempts
    }

    #[cfg(target_os = "espidf")]
    fn platform_link_up(&mut self) -> bool {
        self.driver.is_up().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_link_up(&mut self) -> bool {
        if !self.platform_associated() {
            return false;
        }
        if self.sim_polls >= self.sim_polls_before_up {
            return true;
        }
        self.sim_polls += 1;
        false
    }

    #[cfg(target_os = "espidf")]
    fn platform_ip(&self) -> Option<Ipv4Addr> {
        self.driver.sta_netif().get_ip_info().ok().map(|info| info.ip)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_ip(&self) -> Option<Ipv4Addr> {
        Some(Ipv4Addr::LOCALHOST)
    }

    /// Re-issue the association request if `polls` unsuccessful polls have
    /// passed and the station is still not associated.  Returns the new
    /// poll count.
    fn retry_if_stalled(&mut self, polls: u32) -> u32 {
        if polls < RECONNECT_AFTER_POLLS || self.platform_associated() {
            return polls;
        }
        warn!("WiFi: not associated after {} polls, retrying", polls);
        // A refused request is retried on the next round.
        let _ = self.platform_request_link();
        0
    }

    fn link_established(&mut self) {
        self.state = WifiState::Connected;
        self.ip = self.platform_ip();
        match self.ip {
            Some(ip) => info!("WiFi: connected, IP address {}", ip),
            None => info!("WiFi: connected, IP address unknown"),
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for WifiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

// ───────────────────────────────────────────────────────────────
// ConnectivityPort
// ───────────────────────────────────────────────────────────────

impl ConnectivityPort for WifiAdapter {
    fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.ssid.clear();
        self.ssid.push_str(ssid).map_err(|()| ConnectivityError::InvalidSsid)?;
        self.password.clear();
        self.password
            .push_str(password)
            .map_err(|()| ConnectivityError::InvalidPassword)?;
        info!("WiFi: credentials set (SSID='{}')", self.ssid);
        Ok(())
    }

    fn connect_blocking(
        &mut self,
        clock: &mut impl ClockPort,
        poll_interval: Duration,
    ) -> Result<u32, ConnectivityError> {
        if self.ssid.is_empty() {
            return Err(ConnectivityError::NoCredentials);
        }
        if self.state == WifiState::Connected {
            return Err(ConnectivityError::AlreadyConnected);
        }

        info!("WiFi: connecting to '{}'", self.ssid);
        self.state = WifiState::Connecting;
        if let Err(e) = self.platform_begin().and_then(|()| self.platform_request_link()) {
            self.state = WifiState::Disconnected;
            return Err(e);
        }

        let mut waited = 0;
        let mut since_request = 0;
        while !self.platform_link_up() {
            waited += 1;
            since_request = self.retry_if_stalled(since_request + 1);
            info!("WiFi: waiting for association ({})", waited);
            clock.sleep(poll_interval);
        }

        self.link_established();
        Ok(waited)
    }

    fn poll(&mut self) -> bool {
        match self.state {
            WifiState::Connected => {
                if !self.platform_link_up() {
                    warn!("WiFi: connection lost, reconnecting");
                    self.ip = None;
                    let _ = self.platform_request_link();
                    self.state = WifiState::Reconnecting { polls: 0 };
                }
            }
            WifiState::Reconnecting { polls } => {
                if self.platform_link_up() {
                    self.link_established();
                } else {
                    let polls = self.retry_if_stalled(polls + 1);
                    self.state = WifiState::Reconnecting { polls };
                }
            }
            WifiState::Disconnected | WifiState::Connecting => {}
        }
        self.is_connected()
    }

    fn is_connected(&self) -> bool {
        self.state == WifiState::Connected
    }

    fn ip_addr(&self) -> Option<Ipv4Addr> {
        self.ip
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
