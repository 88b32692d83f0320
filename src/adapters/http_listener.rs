//! HTTP listener adapter — the network boundary of the firmware.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `EspHttpServer` with a single `GET /water`
//!   handler.  The ESP-IDF httpd task serves one request at a time, so a
//!   hold in progress blocks every other client until it completes.
//! - **all other targets**: a non-blocking `std::net::TcpListener` polled
//!   from the main loop.  Each poll accepts at most one connection, serves
//!   it to completion (including the hold), and closes it.
//!
//! Both paths hand the request target to [`crate::http`] and write back
//! whatever [`HttpResponse`](crate::http::HttpResponse) it produces.

use log::info;

use crate::app::ports::{ClockPort, RelayPort};
use crate::app::service::ActuationService;
use crate::config::SystemConfig;
use crate::error::ListenerError;

#[cfg(target_os = "espidf")]
pub use esp_impl::HttpListener;
#[cfg(not(target_os = "espidf"))]
pub use sim_impl::HttpListener;

// ───────────────────────────────────────────────────────────────
// ESP-IDF implementation
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod esp_impl {
    use std::sync::Mutex;

    use esp_idf_svc::http::Method;
    use esp_idf_svc::http::server::{Configuration, EspHttpServer};
    use esp_idf_svc::io::Write;
    use log::error;

    use super::*;
    use crate::adapters::log_sink::LogEventSink;
    use crate::http::{self, WATER_PATH};

    /// Owns the running server; dropping it stops the httpd task.
    pub struct HttpListener {
        _server: EspHttpServer<'static>,
        port: u16,
    }

    impl HttpListener {
        /// Start the server and register `GET /water`.
        ///
        /// The service moves into the handler.  httpd serves requests one at
        /// a time, so the mutex is never contended; it only satisfies the
        /// `Send + Sync` bound on the handler closure.
        pub fn start<R, C>(
            config: &SystemConfig,
            service: ActuationService<R, C>,
        ) -> Result<Self, ListenerError>
        where
            R: RelayPort + Send + 'static,
            C: ClockPort + Send + 'static,
        {
            let cfg = Configuration {
                http_port: config.http_port,
                stack_size: config.http_stack_size,
                ..Default::default()
            };
            let mut server = EspHttpServer::new(&cfg).map_err(|e| {
                error!("HTTP: server start failed: {}", e);
                ListenerError::Bind
            })?;

            let service = Mutex::new(service);
            server
                .fn_handler(WATER_PATH, Method::Get, move |req| -> anyhow::Result<()> {
                    let reply = {
                        let mut svc = service
                            .lock()
                            .map_err(|_| anyhow::anyhow!("actuation service lock poisoned"))?;
                        http::handle_water(req.uri(), &mut svc, &mut LogEventSink)
                    };
                    let headers = [("Content-Type", reply.content_type)];
                    let mut resp =
                        req.into_response(reply.status, Some(reply.reason()), &headers)?;
                    resp.write_all(reply.body.as_bytes())?;
                    Ok(())
                })
                .map_err(|e| {
                    error!("HTTP: route registration failed: {}", e);
                    ListenerError::Register
                })?;

            info!("HTTP: listening on port {}", config.http_port);
            Ok(Self {
                _server: server,
                port: config.http_port,
            })
        }

        pub fn port(&self) -> u16 {
            self.port
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Host simulation
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod sim_impl {
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::{SocketAddr, TcpListener, TcpStream};
    use std::time::Duration;

    use log::warn;

    use super::*;
    use crate::app::ports::EventSink;
    use crate::http::{self, HttpResponse};

    /// Longest request head (request line plus headers) the simulator reads.
    pub(super) const MAX_HEAD_BYTES: usize = 8 * 1024;
    /// Read timeout for a connected client's request head.
    const READ_TIMEOUT: Duration = Duration::from_secs(2);

    /// Single-client HTTP/1.x listener polled from the main loop.
    pub struct HttpListener<R, C> {
        listener: TcpListener,
        service: ActuationService<R, C>,
        served: u64,
    }

    impl<R: RelayPort, C: ClockPort> HttpListener<R, C> {
        /// Bind `0.0.0.0:<http_port>` (non-blocking).  Port `0` lets the OS
        /// pick; use [`local_addr`](Self::local_addr) to discover it.
        pub fn start(
            config: &SystemConfig,
            service: ActuationService<R, C>,
        ) -> Result<Self, ListenerError> {
            let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
            let listener = TcpListener::bind(addr).map_err(|e| {
                warn!("HTTP(sim): bind {} failed: {}", addr, e);
                ListenerError::Bind
            })?;
            listener
                .set_nonblocking(true)
                .map_err(|_| ListenerError::Bind)?;

            let port = listener.local_addr().map_or(config.http_port, |a| a.port());
            info!("HTTP(sim): listening on port {}", port);
            Ok(Self {
                listener,
                service,
                served: 0,
            })
        }

        pub fn local_addr(&self) -> Result<SocketAddr, ListenerError> {
            self.listener.local_addr().map_err(|_| ListenerError::Bind)
        }

        /// Accept and fully serve at most one pending connection.
        /// Returns `true` if a connection was handled.
        pub fn poll(&mut self, sink: &mut impl EventSink) -> bool {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    if let Err(e) = self.serve(stream, sink) {
                        warn!("HTTP(sim): connection from {} failed: {}", peer, e);
                    }
                    self.served += 1;
                    true
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => false,
                Err(e) => {
                    warn!("HTTP(sim): accept error: {}", e);
                    false
                }
            }
        }

        /// Connections handled so far.
        pub fn served(&self) -> u64 {
            self.served
        }

        pub fn service(&self) -> &ActuationService<R, C> {
            &self.service
        }

        fn serve(&mut self, stream: TcpStream, sink: &mut impl EventSink) -> std::io::Result<()> {
            stream.set_nonblocking(false)?;
            stream.set_read_timeout(Some(READ_TIMEOUT))?;

            let head = read_head(BufReader::new(&stream))?;
            let reply = match head.as_deref().and_then(parse_request_line) {
                Some((method, target)) => {
                    info!("HTTP(sim): {} {}", method, target);
                    http::route(method, target, &mut self.service, sink)
                }
                None => HttpResponse::bad_request(),
            };

            let mut stream = &stream;
            write_response(&mut stream, &reply)?;
            stream.flush()
        }
    }

    /// Split `METHOD SP TARGET SP HTTP/x.y` into method and target.
    pub(super) fn parse_request_line(line: &str) -> Option<(&str, &str)> {
        let mut parts = line.trim_end_matches(['\r', '\n']).split(' ');
        let method = parts.next().filter(|m| !m.is_empty())?;
        let target = parts.next().filter(|t| t.starts_with('/'))?;
        let version = parts.next()?;
        if !version.starts_with("HTTP/1.") || parts.next().is_some() {
            return None;
        }
        Some((method, target))
    }

    /// Read the request line and skip the headers, never consuming more
    /// than [`MAX_HEAD_BYTES`].  `None` if the request line is unterminated.
    pub(super) fn read_head(mut reader: impl BufRead) -> std::io::Result<Option<String>> {
        let mut head = (&mut reader).take(MAX_HEAD_BYTES as u64);
        let mut request_line = String::new();
        head.read_line(&mut request_line)?;
        if !request_line.ends_with('\n') {
            return Ok(None);
        }
        drain_headers(&mut head)?;
        Ok(Some(request_line))
    }

    fn drain_headers(reader: &mut impl BufRead) -> std::io::Result<()> {
        let mut line = String::new();
        loop {
            line.clear();
            let n = reader.read_line(&mut line)?;
            if n == 0 || line == "\r\n" || line == "\n" {
                return Ok(());
            }
        }
    }

    pub(super) fn write_response(out: &mut impl Write, reply: &HttpResponse) -> std::io::Result<()> {
        write!(
            out,
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            reply.status,
            reply.reason(),
            reply.content_type,
            reply.body.len()
        )?;
        out.write_all(reply.body.as_bytes())
    }
}
