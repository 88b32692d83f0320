//! HTTP surface of the firmware: one route, one query parameter.
//!
//! Everything here is transport-agnostic.  The listener adapters hand in a
//! method and request target and write back the [`HttpResponse`] they get.
//!
//! | Request                      | Status | Body                                       |
//! |------------------------------|--------|--------------------------------------------|
//! | `GET /water?seconds=N` (ok)  | 200    | `{"status":"ok","pump_seconds":N}`          |
//! | `GET /water` (no `seconds`)  | 400    | `{"error":"missing seconds parameter"}`     |
//! | `GET /water?seconds=bad`     | 400    | `{"error":"invalid seconds"}`               |
//! | other method on `/water`     | 405    | `Method not allowed`                        |
//! | any other path               | 404    | `Not found`                                 |

pub mod query;

use log::error;
use serde::Serialize;

use crate::app::events::PumpCycle;
use crate::app::ports::{ClockPort, EventSink, RelayPort};
use crate::app::service::ActuationService;
use crate::error::RequestError;

pub use query::{query_param, split_uri};

pub const WATER_PATH: &str = "/water";
pub const SECONDS_PARAM: &str = "seconds";

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_TEXT: &str = "text/plain";

// ───────────────────────────────────────────────────────────────
// Response
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpResponse {
    fn json(status: u16, body: &impl Serialize) -> Self {
        let body = serde_json::to_string(body).unwrap_or_else(|e| {
            error!("HTTP: reply encoding failed: {}", e);
            String::from("{}")
        });
        Self {
            status,
            content_type: CONTENT_TYPE_JSON,
            body,
        }
    }

    fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: CONTENT_TYPE_TEXT,
            body: body.into(),
        }
    }

    /// Reply for a request the listener could not parse at all.
    pub fn bad_request() -> Self {
        Self::text(400, "Bad request")
    }

    pub fn not_found() -> Self {
        Self::text(404, "Not found")
    }

    pub fn method_not_allowed() -> Self {
        Self::text(405, "Method not allowed")
    }

    /// Standard reason phrase for the status line.
    pub fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            400 => "Bad Request",
            404 => "Not Found",
            405 => "Method Not Allowed",
            _ => "",
        }
    }
}

#[derive(Serialize)]
struct PumpedBody {
    status: &'static str,
    pump_seconds: u8,
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

impl From<&PumpCycle> for HttpResponse {
    fn from(cycle: &PumpCycle) -> Self {
        Self::json(
            200,
            &PumpedBody {
                status: "ok",
                pump_seconds: cycle.requested_secs,
            },
        )
    }
}

impl From<RequestError> for HttpResponse {
    fn from(e: RequestError) -> Self {
        Self::json(400, &ErrorBody { error: e.message() })
    }
}

// ───────────────────────────────────────────────────────────────
// Handlers
// ───────────────────────────────────────────────────────────────

/// `/water` handler body.  The caller has already matched path and method.
pub fn handle_water<R, C>(
    uri: &str,
    service: &mut ActuationService<R, C>,
    sink: &mut impl EventSink,
) -> HttpResponse
where
    R: RelayPort,
    C: ClockPort,
{
    let (_, query) = split_uri(uri);
    let seconds = query_param(query, SECONDS_PARAM);
    match service.handle_water(seconds.as_deref(), sink) {
        Ok(cycle) => HttpResponse::from(&cycle),
        Err(e) => HttpResponse::from(e),
    }
}

/// Full dispatch for listeners that do not route on their own.
pub fn route<R, C>(
    method: &str,
    uri: &str,
    service: &mut ActuationService<R, C>,
    sink: &mut impl EventSink,
) -> HttpResponse
where
    R: RelayPort,
    C: ClockPort,
{
    let (path, _) = split_uri(uri);
    if path != WATER_PATH {
        return HttpResponse::not_found();
    }
    if !method.eq_ignore_ascii_case("GET") {
        return HttpResponse::method_not_allowed();
    }
    handle_water(uri, service, sink)
}
