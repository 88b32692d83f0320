//! Integration tests for the `/water` pipeline: request target → query
//! parsing → validation → relay hold → JSON reply.

use std::time::Duration;

use water_relay::app::events::AppEvent;
use water_relay::app::service::PumpState;
use water_relay::error::RequestError;
use water_relay::http::{self, HttpResponse};

use crate::mock_hw::{RecordingSink, SimService, make_service};

fn get(service: &mut SimService, sink: &mut RecordingSink, target: &str) -> HttpResponse {
    http::route("GET", target, service, sink)
}

// ── Accepted durations ────────────────────────────────────────

#[test]
fn every_duration_in_range_pumps_for_exactly_that_long() {
    for n in 1u8..=20 {
        let (mut svc, mut sink) = make_service();
        let resp = get(&mut svc, &mut sink, &format!("/water?seconds={n}"));

        assert_eq!(resp.status, 200, "seconds={n}");
        assert_eq!(resp.content_type, "application/json");
        assert_eq!(resp.body, format!(r#"{{"status":"ok","pump_seconds":{n}}}"#));
        assert_eq!(svc.relay().levels(), vec![false, true, false], "seconds={n}");
        assert_eq!(
            svc.relay().active_spans(),
            vec![Duration::from_secs(u64::from(n))]
        );
    }
}

#[test]
fn five_second_request_end_to_end() {
    let (mut svc, mut sink) = make_service();
    let resp = get(&mut svc, &mut sink, "/water?seconds=5");

    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, r#"{"status":"ok","pump_seconds":5}"#);
    assert_eq!(svc.relay().active_spans(), vec![Duration::from_secs(5)]);
    assert!(!svc.relay().writes.last().unwrap().active, "relay must end released");
    assert_eq!(svc.state(), PumpState::Idle);
    assert_eq!(svc.cycle_count(), 1);
}

#[test]
fn events_follow_the_cycle() {
    let (mut svc, mut sink) = make_service();
    get(&mut svc, &mut sink, "/water?seconds=3");

    let actuating = PumpState::Actuating { seconds: 3 };
    assert_eq!(sink.events.len(), 5);
    assert_eq!(sink.events[0], AppEvent::Started);
    assert_eq!(
        sink.events[1],
        AppEvent::StateChanged {
            from: PumpState::Idle,
            to: actuating
        }
    );
    assert_eq!(sink.events[2], AppEvent::PumpOn { seconds: 3 });
    assert_eq!(
        sink.events[3],
        AppEvent::StateChanged {
            from: actuating,
            to: PumpState::Idle
        }
    );
    match &sink.events[4] {
        AppEvent::PumpOff(c) => {
            assert_eq!(c.requested_secs, 3);
            assert_eq!(c.measured, Duration::from_secs(3));
            assert_eq!(c.cycle, 1);
        }
        other => panic!("expected PumpOff, got {:?}", other),
    }
}

#[test]
fn repeated_requests_behave_identically() {
    let (mut svc, mut sink) = make_service();
    let first = get(&mut svc, &mut sink, "/water?seconds=2");
    let second = get(&mut svc, &mut sink, "/water?seconds=2");

    assert_eq!(first, second);
    assert_eq!(svc.relay().levels(), vec![false, true, false, true, false]);
    assert_eq!(
        svc.relay().active_spans(),
        vec![Duration::from_secs(2), Duration::from_secs(2)]
    );
    assert_eq!(svc.cycle_count(), 2);
}

#[test]
fn other_parameters_are_ignored() {
    let (mut svc, mut sink) = make_service();
    let resp = get(&mut svc, &mut sink, "/water?zone=a&seconds=4&x");
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, r#"{"status":"ok","pump_seconds":4}"#);
}

#[test]
fn first_seconds_occurrence_wins() {
    let (mut svc, mut sink) = make_service();
    let resp = get(&mut svc, &mut sink, "/water?seconds=6&seconds=99");
    assert_eq!(resp.status, 200);
    assert_eq!(svc.relay().active_spans(), vec![Duration::from_secs(6)]);
}

#[test]
fn percent_encoded_value_is_decoded() {
    let (mut svc, mut sink) = make_service();
    let resp = get(&mut svc, &mut sink, "/water?seconds=%31%30");
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, r#"{"status":"ok","pump_seconds":10}"#);
}

// ── Rejected requests ─────────────────────────────────────────

fn assert_rejected(target: &str, expected: RequestError) {
    let (mut svc, mut sink) = make_service();
    let resp = get(&mut svc, &mut sink, target);

    assert_eq!(resp.status, 400, "{target}");
    assert_eq!(resp.content_type, "application/json");
    assert_eq!(resp.body, format!(r#"{{"error":"{}"}}"#, expected.message()));
    // Only the power-on release; the relay was never energised.
    assert_eq!(svc.relay().levels(), vec![false], "{target}");
    assert!(svc.clock().sleeps.is_empty(), "{target}");
    assert_eq!(svc.cycle_count(), 0);
    assert_eq!(sink.events.last(), Some(&AppEvent::Rejected(expected)));
}

#[test]
fn missing_seconds_is_rejected() {
    assert_rejected("/water", RequestError::MissingParameter);
    assert_rejected("/water?", RequestError::MissingParameter);
    assert_rejected("/water?other=5", RequestError::MissingParameter);
}

#[test]
fn out_of_range_seconds_are_rejected() {
    assert_rejected("/water?seconds=0", RequestError::InvalidParameter);
    assert_rejected("/water?seconds=21", RequestError::InvalidParameter);
    assert_rejected("/water?seconds=-1", RequestError::InvalidParameter);
    assert_rejected("/water?seconds=100000000000000000000", RequestError::InvalidParameter);
}

#[test]
fn non_numeric_seconds_are_rejected() {
    for target in [
        "/water?seconds=abc",
        "/water?seconds=",
        "/water?seconds",
        "/water?seconds=5s",
        "/water?seconds=2.5",
        "/water?seconds=%20%35",
    ] {
        assert_rejected(target, RequestError::InvalidParameter);
    }
}

#[test]
fn rejection_does_not_disturb_later_requests() {
    let (mut svc, mut sink) = make_service();
    assert_eq!(get(&mut svc, &mut sink, "/water?seconds=50").status, 400);
    assert_eq!(get(&mut svc, &mut sink, "/water?seconds=1").status, 200);
    assert_eq!(svc.relay().levels(), vec![false, true, false]);
}

// ── Routing ───────────────────────────────────────────────────

#[test]
fn unknown_path_is_not_found() {
    let (mut svc, mut sink) = make_service();
    let resp = get(&mut svc, &mut sink, "/pump?seconds=5");
    assert_eq!(resp.status, 404);
    assert_eq!(resp.body, "Not found");
    assert_eq!(svc.relay().levels(), vec![false]);
}

#[test]
fn non_get_method_is_not_allowed() {
    let (mut svc, mut sink) = make_service();
    let resp = http::route("POST", "/water?seconds=5", &mut svc, &mut sink);
    assert_eq!(resp.status, 405);
    assert_eq!(svc.relay().levels(), vec![false]);
}
