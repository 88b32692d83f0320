//! Log output of a served request, captured through a test logger.
//!
//! Only one test lives here: the logger is process-global.

use std::sync::Mutex;

use log::{Level, LevelFilter, Log, Metadata, Record};
use water_relay::adapters::log_sink::LogEventSink;
use water_relay::http;

use crate::mock_hw::make_service;

struct Capture {
    lines: Mutex<Vec<(Level, String, String)>>,
}

impl Log for Capture {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push((
                record.level(),
                record.target().to_string(),
                record.args().to_string(),
            ));
        }
    }

    fn flush(&self) {}
}

static CAPTURE: Capture = Capture {
    lines: Mutex::new(Vec::new()),
};

const SINK_TARGET: &str = "water_relay::adapters::log_sink";

#[test]
fn each_outcome_logs_a_single_line() {
    let _ = log::set_logger(&CAPTURE);
    log::set_max_level(LevelFilter::Debug);

    let (mut svc, _) = make_service();
    let mut sink = LogEventSink::new();
    assert_eq!(http::route("GET", "/water?seconds=abc", &mut svc, &mut sink).status, 400);
    assert_eq!(http::route("GET", "/water?seconds=2", &mut svc, &mut sink).status, 200);

    let lines = CAPTURE.lines.lock().unwrap().clone();
    assert!(
        lines.iter().all(|(_, target, _)| !target.starts_with("water_relay::app")),
        "service logged directly: {lines:?}"
    );

    let visible: Vec<_> = lines
        .iter()
        .filter(|(level, target, _)| target == SINK_TARGET && *level <= Level::Info)
        .collect();
    assert_eq!(visible.len(), 3, "{visible:?}");

    assert_eq!(visible[0].0, Level::Warn);
    assert!(visible[0].2.contains("invalid seconds"));
    assert!(visible[1].2.contains("triggered for 2 s"));
    assert!(visible[2].2.contains("released"));
}
