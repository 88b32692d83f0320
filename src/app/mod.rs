//! Application core — pure domain logic, zero I/O.
//!
//! Request validation and the blocking pump cycle.  All interaction with
//! hardware and time happens through **port traits** defined in [`ports`],
//! keeping this layer fully testable without real peripherals.

pub mod events;
pub mod ports;
pub mod request;
pub mod service;
