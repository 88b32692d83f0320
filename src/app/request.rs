//! Actuation request parsing and validation.
//!
//! The raw `seconds` value is parsed strictly: a plain base-10 integer with
//! an optional leading `+`, nothing else.  Malformed text and out-of-range
//! numbers both end up as [`RequestError::InvalidParameter`].

use core::time::Duration;

use crate::error::RequestError;

/// Shortest hold a caller may request (seconds, inclusive).
pub const MIN_HOLD_SECS: u8 = 1;
/// Longest hold a caller may request (seconds, inclusive).
pub const MAX_HOLD_SECS: u8 = 20;

/// A validated request to run the pump.  Request-scoped, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuationRequest {
    seconds: u8,
}

impl ActuationRequest {
    /// Build a request from an already-numeric hold.
    pub fn new(seconds: i64) -> Result<Self, RequestError> {
        if !(i64::from(MIN_HOLD_SECS)..=i64::from(MAX_HOLD_SECS)).contains(&seconds) {
            return Err(RequestError::InvalidParameter);
        }
        Ok(Self {
            seconds: seconds as u8,
        })
    }

    /// Parse the raw query value.  `None` means the parameter was absent.
    pub fn parse(raw: Option<&str>) -> Result<Self, RequestError> {
        let raw = raw.ok_or(RequestError::MissingParameter)?;
        let seconds: i64 = raw
            .parse()
            .map_err(|_| RequestError::InvalidParameter)?;
        Self::new(seconds)
    }

    pub fn seconds(&self) -> u8 {
        self.seconds
    }

    pub fn hold(&self) -> Duration {
        Duration::from_secs(u64::from(self.seconds))
    }
}
