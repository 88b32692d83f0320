//! GPIO assignments for the water-relay board.
//!
//! Single source of truth; drivers reference this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Pump relay module
// ---------------------------------------------------------------------------

/// Digital output driving the relay input.
/// Active-low: LOW = relay energised (pump running), HIGH = released.
pub const RELAY_GPIO: i32 = 5;
