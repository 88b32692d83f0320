//! Fuzz target: `/water` request handling
//!
//! Feeds arbitrary request targets through routing, query lookup and
//! validation, verifying:
//! - No panics under arbitrary byte inputs
//! - Every reply is 200, 400 or 404
//! - The relay is energised only for an accepted request, and always
//!   released afterwards
//!
//! cargo fuzz run fuzz_water_request

#![no_main]

use core::time::Duration;

use libfuzzer_sys::fuzz_target;
use water_relay::app::events::AppEvent;
use water_relay::app::ports::{ClockPort, EventSink, RelayPort};
use water_relay::app::service::ActuationService;
use water_relay::http;

#[derive(Default)]
struct Relay {
    writes: Vec<bool>,
}

impl RelayPort for Relay {
    fn set_active(&mut self, active: bool) {
        self.writes.push(active);
    }
    fn is_active(&self) -> bool {
        self.writes.last().copied().unwrap_or(false)
    }
}

#[derive(Default)]
struct Clock {
    now: Duration,
}

impl ClockPort for Clock {
    fn now(&self) -> Duration {
        self.now
    }
    fn sleep(&mut self, duration: Duration) {
        self.now += duration;
    }
}

struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _event: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    let target = format!("/water?{text}");

    let mut svc = ActuationService::new(Relay::default(), Clock::default());
    let resp = http::route("GET", &target, &mut svc, &mut Discard);

    match resp.status {
        200 => {
            assert_eq!(svc.relay().writes, [false, true, false]);
            let held = svc.clock().now;
            assert!(held >= Duration::from_secs(1) && held <= Duration::from_secs(20));
        }
        400 | 404 => {
            assert_eq!(svc.relay().writes, [false]);
            assert_eq!(svc.clock().now, Duration::ZERO);
        }
        other => panic!("unexpected status {other}"),
    }
    assert!(!svc.relay().is_active());
});
