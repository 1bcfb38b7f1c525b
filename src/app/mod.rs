//! Bridge core: device adapters and the registry that routes stack
//! callbacks to them.
//!
//! All interaction with the Matter stack and the physical accessories
//! happens through **port traits** defined in [`ports`], keeping this layer
//! testable without the SDK or real relays.

pub mod commands;
pub mod device;
pub mod events;
pub mod ports;
pub mod registry;
