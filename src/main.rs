//! Water-relay firmware — main entry point.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                   Adapters (outer ring)                   │
//! │                                                           │
//! │  HardwareAdapter   Esp32TimeAdapter   LogEventSink        │
//! │  (RelayPort)       (ClockPort)        (EventSink)         │
//! │  WifiAdapter       HttpListener                           │
//! │  (Connectivity)    (GET /water)                           │
//! │                                                           │
//! │  ─────────────── Port Trait Boundary ──────────────       │
//! │                                                           │
//! │  ┌─────────────────────────────────────────────────┐      │
//! │  │     ActuationService (validate · hold · release) │      │
//! │  └─────────────────────────────────────────────────┘      │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! Boot order: relay released → WiFi associated → listener started →
//! main loop feeding the watchdog and re-checking the WiFi link.
#![deny(unused_must_use)]

use core::time::Duration;

use anyhow::Result;
use log::info;

use water_relay::adapters::hardware::HardwareAdapter;
use water_relay::adapters::http_listener::HttpListener;
use water_relay::adapters::log_sink::LogEventSink;
use water_relay::adapters::time::Esp32TimeAdapter;
use water_relay::adapters::wifi::{ConnectivityPort, WifiAdapter};
use water_relay::app::ports::ClockPort;
use water_relay::app::service::ActuationService;
use water_relay::config::{self, SystemConfig};
use water_relay::drivers::relay::RelayDriver;
use water_relay::drivers::watchdog::Watchdog;
use water_relay::error::Error;
use water_relay::pins;

fn banner(config: &SystemConfig) {
    info!("╔══════════════════════════════════════╗");
    info!("║  water-relay v{:<23}║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");
    info!(
        "Relay on GPIO{} (active-low), HTTP port {}",
        pins::RELAY_GPIO,
        config.http_port
    );
}

// ── Device ────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
fn main() -> Result<()> {
    use esp_idf_hal::delay::FreeRtos;
    use esp_idf_hal::gpio::PinDriver;
    use esp_idf_hal::peripherals::Peripherals;
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;
    use esp_idf_svc::wifi::EspWifi;

    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    let config = SystemConfig::default();
    config.validate().map_err(Error::from)?;
    banner(&config);

    // ── 2. Relay released before anything else ────────────────
    let peripherals =
        Peripherals::take().map_err(|_| Error::Init("peripherals already taken"))?;
    // Must match pins::RELAY_GPIO.
    let relay_pin = PinDriver::output(peripherals.pins.gpio5)
        .map_err(|_| Error::Init("relay GPIO"))?;
    let hw = HardwareAdapter::new(RelayDriver::new(relay_pin));
    let mut service = ActuationService::new(hw, Esp32TimeAdapter::new());

    // ── 3. WiFi association (poll until connected) ────────────
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let driver = EspWifi::new(peripherals.modem, sysloop, Some(nvs))?;
    let mut wifi = WifiAdapter::new(driver);
    wifi.set_credentials(config::WIFI_SSID, config::WIFI_PASS)
        .map_err(Error::from)?;

    let mut clock = Esp32TimeAdapter::new();
    let poll = Duration::from_millis(u64::from(config.wifi_poll_interval_ms));
    wifi.connect_blocking(&mut clock, poll).map_err(Error::from)?;
    info!("mDNS disabled (using direct IP only)");

    // ── 4. HTTP listener ──────────────────────────────────────
    let mut sink = LogEventSink::new();
    service.start(&mut sink);
    let listener = HttpListener::start(&config, service).map_err(Error::from)?;
    info!("System ready on port {}.", listener.port());

    // ── 5. Main loop ──────────────────────────────────────────
    let watchdog = Watchdog::new(config.watchdog_timeout_ms);
    let wifi_every = config.wifi_poll_ticks();
    let mut tick: u32 = 0;
    loop {
        watchdog.feed();
        tick = tick.wrapping_add(1);
        if tick % wifi_every == 0 {
            wifi.poll();
        }
        FreeRtos::delay_ms(config.loop_interval_ms);
    }
}

// ── Host simulation ───────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
fn main() -> Result<()> {
    use water_relay::drivers::relay::SimPin;

    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let config = SystemConfig::default();
    config.validate().map_err(Error::from)?;
    banner(&config);

    let hw = HardwareAdapter::new(RelayDriver::new(SimPin::new(pins::RELAY_GPIO)));
    let mut service = ActuationService::new(hw, Esp32TimeAdapter::new());

    let ssid = if config::WIFI_SSID.is_empty() {
        "sim-network"
    } else {
        config::WIFI_SSID
    };
    let mut wifi = WifiAdapter::new();
    wifi.set_credentials(ssid, config::WIFI_PASS)
        .map_err(Error::from)?;
    let mut clock = Esp32TimeAdapter::new();
    let poll = Duration::from_millis(u64::from(config.wifi_poll_interval_ms));
    wifi.connect_blocking(&mut clock, poll).map_err(Error::from)?;

    let mut sink = LogEventSink::new();
    service.start(&mut sink);
    let mut listener = HttpListener::start(&config, service).map_err(Error::from)?;
    info!("Simulation ready. Try: curl 'http://127.0.0.1:{}/water?seconds=3'", config.http_port);

    let watchdog = Watchdog::new(config.watchdog_timeout_ms);
    let idle = Duration::from_millis(u64::from(config.loop_interval_ms));
    let wifi_every = config.wifi_poll_ticks();
    let mut tick: u32 = 0;
    loop {
        watchdog.feed();
        tick = tick.wrapping_add(1);
        if tick % wifi_every == 0 {
            wifi.poll();
        }
        if !listener.poll(&mut sink) {
            clock.sleep(idle);
        }
    }
}
