//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing bridge events to the logger
//! (UART / USB-CDC on the device, stderr on host).

use log::{debug, info, warn};

use crate::app::events::BridgeEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`BridgeEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &BridgeEvent) {
        match event {
            BridgeEvent::DeviceAdded { endpoint, name } => {
                info!("DEVICE | ep{} added '{}'", endpoint, name);
            }
            BridgeEvent::AccessoryUpdated { endpoint } => {
                info!("UPDATE | ep{} endpoint -> accessory", endpoint);
            }
            BridgeEvent::EndpointReported { endpoint } => {
                info!("REPORT | ep{} accessory -> endpoint", endpoint);
            }
            BridgeEvent::Identified { endpoint } => {
                info!("IDENT  | ep{}", endpoint);
            }
            BridgeEvent::Ignored(path) => {
                debug!("IGNORE | {}", path);
            }
            BridgeEvent::CommandFailed { endpoint, error } => {
                warn!("FAIL   | ep{}: {}", endpoint, error);
            }
        }
    }
}
