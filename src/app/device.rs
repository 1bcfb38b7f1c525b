//! Device adapter binding a plug-in accessory to a Matter endpoint.
//!
//! [`PlugInDevice`] owns no state of its own beyond the endpoint id and the
//! name: the power state lives in the accessory on one side and in the
//! On/Off cluster's `OnOff` attribute on the other. The adapter copies it
//! one way or the other on request.
//!
//! ```text
//!   accessory ──report_endpoint()──▶ OnOff attribute
//!   accessory ◀──update_accessory()── OnOff attribute
//! ```
//!
//! The two directions are one-shot copies; concurrent writes are not
//! reconciled and the last writer wins.

use std::rc::{Rc, Weak};

use log::{info, warn};

use crate::error::{NodeError, Result};
use crate::matter::{
    self, AttrValue, AttributePath, DeviceName, EndpointFlags, EndpointId, OnOffPluginUnitConfig,
    DEFAULT_DEVICE_NAME,
};

use super::ports::{MatterNodePort, PlugInAccessory, PowerReportListener};

// ───────────────────────────────────────────────────────────────
// BridgedDevice
// ───────────────────────────────────────────────────────────────

/// Operations the bridge invokes on every device it manages.
pub trait BridgedDevice {
    /// Endpoint this device is exposed on.
    fn endpoint_id(&self) -> EndpointId;

    /// Human-readable name, or the default when none was supplied.
    fn name(&self) -> &str;

    /// Copy the endpoint state into the accessory.
    fn update_accessory(&self) -> Result<()>;

    /// Copy the accessory state into the endpoint.
    fn report_endpoint(&self) -> Result<()>;

    /// Ask the accessory to identify itself.
    fn identify(&self) -> Result<()>;
}

// ───────────────────────────────────────────────────────────────
// PlugInDevice
// ───────────────────────────────────────────────────────────────

/// An On/Off Plug-in Unit endpoint backed by a [`PlugInAccessory`].
pub struct PlugInDevice<A, N> {
    name: Option<DeviceName>,
    endpoint: EndpointId,
    parent: Option<EndpointId>,
    accessory: Rc<A>,
    node: Rc<N>,
}

impl<A, N> PlugInDevice<A, N>
where
    A: PlugInAccessory + 'static,
    N: MatterNodePort + 'static,
{
    /// Create the endpoint and bind it to `accessory`.
    ///
    /// With an `aggregator` the endpoint is a bridged node parented to it
    /// and labelled with `name`; an empty or over-long name logs a warning
    /// and leaves the label to the stack default. Without one the endpoint
    /// is standalone and unlabelled.
    ///
    /// The accessory is finally driven to the endpoint's current `OnOff`
    /// value and the device registers itself as the accessory's listener.
    /// If any step fails the endpoint is destroyed again and the accessory
    /// is left untouched.
    pub fn new(
        name: &str,
        accessory: Rc<A>,
        node: Rc<N>,
        aggregator: Option<EndpointId>,
    ) -> Result<Rc<Self>> {
        let name = matter::device_name(name);

        let endpoint = match aggregator {
            Some(_) => {
                node.create_bridged_node(EndpointFlags::BRIDGE | EndpointFlags::DESTROYABLE)?
            }
            None => {
                info!("Creating PlugInDevice standalone endpoint");
                node.create_endpoint(EndpointFlags::NONE)?
            }
        };

        let initial = match Self::populate(node.as_ref(), endpoint, name.as_ref(), aggregator) {
            Ok(on) => on,
            Err(e) => {
                if let Err(cleanup) = node.destroy_endpoint(endpoint) {
                    warn!("PlugInDevice: failed to destroy endpoint {}: {}", endpoint, cleanup);
                }
                return Err(e);
            }
        };

        let device = Rc::new_cyclic(|me: &Weak<Self>| {
            let listener: Weak<dyn PowerReportListener> = me.clone();
            accessory.set_report_listener(listener);
            Self {
                name,
                endpoint,
                parent: aggregator,
                accessory,
                node,
            }
        });

        device.set_accessory_power(initial);
        Ok(device)
    }

    /// Label, parent and clusters for a fresh endpoint. Returns its
    /// initial `OnOff` value.
    fn populate(
        node: &N,
        endpoint: EndpointId,
        name: Option<&DeviceName>,
        aggregator: Option<EndpointId>,
    ) -> Result<bool> {
        if let Some(parent) = aggregator {
            if let Some(name) = name {
                info!("Creating Bridged Node PlugInDevice with name: {}", name);
                node.create_node_label(endpoint, name)?;
            } else {
                warn!("device_name is not set");
                info!("Creating Bridged Node PlugInDevice with default name");
            }
            node.set_parent_endpoint(endpoint, parent)?;
        }

        node.add_on_off_plugin_unit(endpoint, &OnOffPluginUnitConfig::default())?;
        read_power(node, endpoint)
    }

    /// Aggregator this device is bridged under, if any.
    pub fn parent(&self) -> Option<EndpointId> {
        self.parent
    }

    pub fn is_bridged(&self) -> bool {
        self.parent.is_some()
    }

    // ── Internal ──────────────────────────────────────────────

    fn accessory_power(&self) -> bool {
        self.accessory.power()
    }

    fn set_accessory_power(&self, on: bool) {
        self.accessory.set_power(on);
    }

    fn endpoint_power(&self) -> Result<bool> {
        read_power(self.node.as_ref(), self.endpoint)
    }

    fn set_endpoint_power(&self, on: bool) -> Result<()> {
        self.node
            .report_attribute(AttributePath::on_off(self.endpoint), AttrValue::Bool(on))?;
        Ok(())
    }
}

fn read_power<N: MatterNodePort>(node: &N, endpoint: EndpointId) -> Result<bool> {
    let path = AttributePath::on_off(endpoint);
    let value = node.attribute(path)?;
    Ok(value.as_bool().ok_or(NodeError::TypeMismatch(path))?)
}

fn on_off_str(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}

impl<A, N> BridgedDevice for PlugInDevice<A, N>
where
    A: PlugInAccessory + 'static,
    N: MatterNodePort + 'static,
{
    fn endpoint_id(&self) -> EndpointId {
        self.endpoint
    }

    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_DEVICE_NAME)
    }

    fn update_accessory(&self) -> Result<()> {
        let on = self.endpoint_power()?;
        info!("Updating PlugInDevice accessory state to {}", on_off_str(on));
        self.set_accessory_power(on);
        Ok(())
    }

    fn report_endpoint(&self) -> Result<()> {
        let on = self.accessory_power();
        info!("Reporting PlugInDevice endpoint state to {}", on_off_str(on));
        self.set_endpoint_power(on)
    }

    fn identify(&self) -> Result<()> {
        info!("Identifying PlugInDevice");
        self.accessory.identify_yourself();
        Ok(())
    }
}

impl<A, N> PowerReportListener for PlugInDevice<A, N>
where
    A: PlugInAccessory + 'static,
    N: MatterNodePort + 'static,
{
    fn notify_power_changed(&self) {
        // Nothing to hand the error back to; the accessory already switched.
        if let Err(e) = self.report_endpoint() {
            warn!("PlugInDevice ep{}: report failed: {}", self.endpoint, e);
        }
    }
}
