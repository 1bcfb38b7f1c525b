//! Inbound commands to the device registry.
//!
//! These are the stack callbacks a Matter SDK delivers to the application
//! (attribute post-update, identification) plus bridge housekeeping. They
//! reach the [`DeviceRegistry`](super::registry::DeviceRegistry) through the
//! [`CommandQueue`](crate::events::CommandQueue).

use crate::matter::{AttributePath, EndpointId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeCommand {
    /// A controller wrote an attribute; the new value is already stored.
    AttributeUpdated(AttributePath),

    /// A controller invoked Identify on an endpoint.
    Identify(EndpointId),

    /// Push every accessory's state into its endpoint (e.g. after the
    /// stack restarted and lost its attribute cache).
    ReportAll,
}
