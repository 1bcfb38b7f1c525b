//! Device registry: routes stack callbacks to the device behind an endpoint.
//!
//! ```text
//!  CommandQueue ──▶ ┌──────────────────┐ ──▶ EventSink
//!                   │  DeviceRegistry  │
//!                   └──────────────────┘
//!                     │ ep2   │ ep3   │ ...
//!                     ▼       ▼       ▼
//!                  BridgedDevice (PlugInDevice)
//! ```

use std::rc::Rc;

use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::matter::{DeviceName, EndpointId};

use super::commands::BridgeCommand;
use super::device::BridgedDevice;
use super::events::BridgeEvent;
use super::ports::EventSink;

/// Most devices one bridge exposes.
pub const MAX_BRIDGED_DEVICES: usize = 16;

/// Keeps every device the bridge created, addressable by endpoint id.
pub struct DeviceRegistry {
    devices: heapless::Vec<Rc<dyn BridgedDevice>, MAX_BRIDGED_DEVICES>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self {
            devices: heapless::Vec::new(),
        }
    }

    /// Add a device. Rejects a second device on the same endpoint.
    pub fn register(
        &mut self,
        device: Rc<dyn BridgedDevice>,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        let endpoint = device.endpoint_id();
        if self.get(endpoint).is_some() {
            return Err(Error::DuplicateEndpoint(endpoint));
        }

        let name = DeviceName::try_from(device.name()).map_err(|()| {
            warn!("Device on endpoint {} has an over-long name", endpoint);
            Error::NameTooLong
        })?;

        self.devices.push(device).map_err(|_| Error::RegistryFull)?;
        info!("Registered device '{}' on endpoint {}", name, endpoint);
        sink.emit(&BridgeEvent::DeviceAdded { endpoint, name });
        Ok(())
    }

    pub fn get(&self, endpoint: EndpointId) -> Option<&Rc<dyn BridgedDevice>> {
        self.devices.iter().find(|d| d.endpoint_id() == endpoint)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn endpoints(&self) -> impl Iterator<Item = EndpointId> + '_ {
        self.devices.iter().map(|d| d.endpoint_id())
    }

    // ── Command handling ──────────────────────────────────────

    /// Dispatch one stack callback.
    ///
    /// Failures are returned and also emitted as
    /// [`BridgeEvent::CommandFailed`], so a loop that only drains the queue
    /// still sees them in the event stream.
    pub fn handle_command(&self, cmd: BridgeCommand, sink: &mut impl EventSink) -> Result<()> {
        match cmd {
            BridgeCommand::AttributeUpdated(path) => {
                if !path.is_on_off() {
                    debug!("Ignoring update of {}", path);
                    sink.emit(&BridgeEvent::Ignored(path));
                    return Ok(());
                }
                let endpoint = path.endpoint;
                self.with_device(endpoint, sink, |d| d.update_accessory())?;
                sink.emit(&BridgeEvent::AccessoryUpdated { endpoint });
            }
            BridgeCommand::Identify(endpoint) => {
                self.with_device(endpoint, sink, |d| d.identify())?;
                sink.emit(&BridgeEvent::Identified { endpoint });
            }
            BridgeCommand::ReportAll => {
                let mut first_err = None;
                for device in &self.devices {
                    let endpoint = device.endpoint_id();
                    match device.report_endpoint() {
                        Ok(()) => sink.emit(&BridgeEvent::EndpointReported { endpoint }),
                        Err(error) => {
                            warn!("Report on endpoint {} failed: {}", endpoint, error);
                            sink.emit(&BridgeEvent::CommandFailed { endpoint, error });
                            first_err.get_or_insert(error);
                        }
                    }
                }
                if let Some(e) = first_err {
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    fn with_device(
        &self,
        endpoint: EndpointId,
        sink: &mut impl EventSink,
        op: impl FnOnce(&dyn BridgedDevice) -> Result<()>,
    ) -> Result<()> {
        let result = match self.get(endpoint) {
            Some(device) => op(device.as_ref()),
            None => Err(Error::UnknownEndpoint(endpoint)),
        };
        if let Err(error) = result {
            warn!("Command on endpoint {} failed: {}", endpoint, error);
            sink.emit(&BridgeEvent::CommandFailed { endpoint, error });
        }
        result
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
