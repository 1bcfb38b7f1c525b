//! Default GPIO assignments for the two-channel plug board.
//!
//! [`BridgeConfig::default`](crate::config::BridgeConfig) references these;
//! a stored config may remap any of them.

// ---------------------------------------------------------------------------
// Channel 1
// ---------------------------------------------------------------------------

/// Relay coil driver (active HIGH through an NPN low-side switch).
pub const RELAY_1_GPIO: i32 = 4;
/// Green identify LED next to socket 1.
pub const INDICATOR_1_GPIO: i32 = 5;
/// Momentary push button on socket 1, active LOW with internal pull-up.
pub const BUTTON_1_GPIO: i32 = 6;

// ---------------------------------------------------------------------------
// Channel 2
// ---------------------------------------------------------------------------

pub const RELAY_2_GPIO: i32 = 7;
pub const INDICATOR_2_GPIO: i32 = 15;
pub const BUTTON_2_GPIO: i32 = 16;
