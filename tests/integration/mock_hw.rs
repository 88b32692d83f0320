//! Mock hardware adapters for integration tests.
//!
//! The relay and the clock share one simulated timeline, so every relay
//! transition is stamped with the instant it happened.  Holds advance the
//! timeline instantly; no test actually sleeps.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use water_relay::app::events::AppEvent;
use water_relay::app::ports::{ClockPort, EventSink, RelayPort};
use water_relay::app::service::ActuationService;

// ── Shared timeline ───────────────────────────────────────────

pub type Timeline = Rc<Cell<Duration>>;

// ── SimClock ──────────────────────────────────────────────────

pub struct SimClock {
    now: Timeline,
    pub sleeps: Vec<Duration>,
}

impl SimClock {
    pub fn new(now: Timeline) -> Self {
        Self {
            now,
            sleeps: Vec::new(),
        }
    }
}

impl ClockPort for SimClock {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn sleep(&mut self, duration: Duration) {
        self.sleeps.push(duration);
        self.now.set(self.now.get() + duration);
    }
}

// ── RecordingRelay ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayWrite {
    pub active: bool,
    pub at: Duration,
}

pub struct RecordingRelay {
    now: Timeline,
    active: bool,
    pub writes: Vec<RelayWrite>,
}

#[allow(dead_code)]
impl RecordingRelay {
    pub fn new(now: Timeline) -> Self {
        Self {
            now,
            active: false,
            writes: Vec::new(),
        }
    }

    /// Sequence of written levels, without timestamps.
    pub fn levels(&self) -> Vec<bool> {
        self.writes.iter().map(|w| w.active).collect()
    }

    /// Time between each energise and the release that follows it.
    pub fn active_spans(&self) -> Vec<Duration> {
        let mut spans = Vec::new();
        let mut on_at = None;
        for w in &self.writes {
            match (w.active, on_at) {
                (true, None) => on_at = Some(w.at),
                (false, Some(start)) => {
                    spans.push(w.at - start);
                    on_at = None;
                }
                _ => {}
            }
        }
        spans
    }
}

impl RelayPort for RecordingRelay {
    fn set_active(&mut self, active: bool) {
        self.active = active;
        self.writes.push(RelayWrite {
            active,
            at: self.now.get(),
        });
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Fixture ───────────────────────────────────────────────────

pub type SimService = ActuationService<RecordingRelay, SimClock>;

/// A started service on a fresh timeline.
pub fn make_service() -> (SimService, RecordingSink) {
    let timeline = Timeline::default();
    let relay = RecordingRelay::new(timeline.clone());
    let clock = SimClock::new(timeline);
    let mut service = ActuationService::new(relay, clock);
    let mut sink = RecordingSink::new();
    service.start(&mut sink);
    (service, sink)
}
