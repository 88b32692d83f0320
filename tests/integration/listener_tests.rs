//! End-to-end tests for the host HTTP listener over loopback TCP.
//!
//! The client runs on its own thread; the test thread polls the listener
//! the way the simulation main loop does.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::thread;
use std::time::Duration;

use water_relay::adapters::http_listener::HttpListener;
use water_relay::app::service::ActuationService;
use water_relay::config::SystemConfig;

use crate::mock_hw::{RecordingRelay, RecordingSink, SimClock, Timeline};

type SimListener = HttpListener<RecordingRelay, SimClock>;

fn start_listener() -> (SimListener, SocketAddr) {
    let config = SystemConfig {
        http_port: 0,
        ..SystemConfig::default()
    };
    let timeline = Timeline::default();
    let service = ActuationService::new(
        RecordingRelay::new(timeline.clone()),
        SimClock::new(timeline),
    );
    let listener = HttpListener::start(&config, service).expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    (listener, SocketAddr::from(([127, 0, 0, 1], port)))
}

/// Send `raw` from a client thread and return everything the server wrote.
fn exchange(listener: &mut SimListener, addr: SocketAddr, raw: &'static str) -> String {
    let client = thread::spawn(move || {
        let mut stream = TcpStream::connect(addr).expect("connect");
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .expect("read timeout");
        stream.write_all(raw.as_bytes()).expect("send request");
        let mut reply = String::new();
        stream.read_to_string(&mut reply).expect("read reply");
        reply
    });

    let mut sink = RecordingSink::new();
    let before = listener.served();
    for _ in 0..500 {
        if listener.poll(&mut sink) {
            break;
        }
        thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(listener.served(), before + 1, "listener never accepted");
    client.join().expect("client thread")
}

#[test]
fn water_request_round_trip() {
    let (mut listener, addr) = start_listener();
    let reply = exchange(
        &mut listener,
        addr,
        "GET /water?seconds=5 HTTP/1.1\r\nHost: pump\r\n\r\n",
    );

    assert!(reply.starts_with("HTTP/1.1 200 OK\r\n"), "{reply}");
    assert!(reply.contains("Content-Type: application/json\r\n"));
    assert!(reply.ends_with(r#"{"status":"ok","pump_seconds":5}"#));

    let relay = listener.service().relay();
    assert_eq!(relay.levels(), vec![false, true, false]);
    assert_eq!(relay.active_spans(), vec![Duration::from_secs(5)]);
}

#[test]
fn invalid_seconds_over_the_wire() {
    let (mut listener, addr) = start_listener();
    let reply = exchange(
        &mut listener,
        addr,
        "GET /water?seconds=abc HTTP/1.1\r\n\r\n",
    );

    assert!(reply.starts_with("HTTP/1.1 400 Bad Request\r\n"), "{reply}");
    assert!(reply.ends_with(r#"{"error":"invalid seconds"}"#));
    assert_eq!(listener.service().relay().levels(), vec![false]);
}

#[test]
fn unknown_path_and_method_over_the_wire() {
    let (mut listener, addr) = start_listener();

    let reply = exchange(&mut listener, addr, "GET /status HTTP/1.1\r\n\r\n");
    assert!(reply.starts_with("HTTP/1.1 404 Not Found\r\n"), "{reply}");

    let reply = exchange(&mut listener, addr, "DELETE /water HTTP/1.1\r\n\r\n");
    assert!(reply.starts_with("HTTP/1.1 405 Method Not Allowed\r\n"), "{reply}");

    assert_eq!(listener.service().cycle_count(), 0);
}

#[test]
fn garbage_request_line_is_bad_request() {
    let (mut listener, addr) = start_listener();
    let reply = exchange(&mut listener, addr, "hello there\r\n\r\n");

    assert!(reply.starts_with("HTTP/1.1 400 Bad Request\r\n"), "{reply}");
    assert!(reply.ends_with("Bad request"));
    assert_eq!(listener.service().relay().levels(), vec![false]);
}

#[test]
fn sequential_clients_are_each_served() {
    let (mut listener, addr) = start_listener();
    for _ in 0..3 {
        let reply = exchange(
            &mut listener,
            addr,
            "GET /water?seconds=1 HTTP/1.1\r\n\r\n",
        );
        assert!(reply.starts_with("HTTP/1.1 200 OK\r\n"), "{reply}");
    }
    assert_eq!(listener.served(), 3);
    assert_eq!(listener.service().cycle_count(), 3);
}
