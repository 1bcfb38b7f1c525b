//! Outbound bridge events.
//!
//! The [`DeviceRegistry`](super::registry::DeviceRegistry) emits these
//! through the [`EventSink`](super::ports::EventSink) port.

use crate::matter::{AttributePath, EndpointId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent {
    /// A device was registered with the bridge.
    DeviceAdded {
        endpoint: EndpointId,
        name: heapless::String<{ crate::matter::MAX_NAME_LEN }>,
    },

    /// Endpoint state was copied into the accessory.
    AccessoryUpdated { endpoint: EndpointId },

    /// Accessory state was copied into the endpoint.
    EndpointReported { endpoint: EndpointId },

    /// The accessory was asked to identify itself.
    Identified { endpoint: EndpointId },

    /// A command arrived for an attribute the bridge does not handle.
    Ignored(AttributePath),

    /// A command could not be completed.
    CommandFailed {
        endpoint: EndpointId,
        error: crate::error::Error,
    },
}
