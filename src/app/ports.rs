//! Port traits: the hexagonal boundary between the bridge core and the outside world.
//!
//! ```text
//!   Accessory ──▶ PlugInAccessory ──▶ PlugInDevice ──▶ MatterNodePort ──▶ Matter stack
//! ```
//!
//! The Matter stack and the physical accessories are both driven adapters.
//! [`PlugInDevice`](super::device::PlugInDevice) consumes them through these
//! traits, so the bridge core never touches the SDK or GPIO directly.
//!
//! ## Threading
//!
//! Every method takes `&self`. Implementations keep their state in `Cell` /
//! `RefCell` and are used from a single task; there is no locking and the
//! last writer wins.

use std::rc::Weak;

use crate::config::BridgeConfig;
use crate::error::NodeError;
use crate::matter::{AttrValue, AttributePath, EndpointFlags, EndpointId, OnOffPluginUnitConfig};

// ───────────────────────────────────────────────────────────────
// Matter node port (driven adapter: bridge ↔ protocol stack)
// ───────────────────────────────────────────────────────────────

/// The slice of the Matter stack a device adapter needs.
///
/// Endpoints are addressed by id; the stack owns the endpoint tree and the
/// attribute storage.
pub trait MatterNodePort {
    /// Create a plain endpoint with no bridging role.
    fn create_endpoint(&self, flags: EndpointFlags) -> Result<EndpointId, NodeError>;

    /// Create a Bridged Node endpoint. It carries the Bridged Device Basic
    /// Information cluster but no `NodeLabel` until one is created.
    fn create_bridged_node(&self, flags: EndpointFlags) -> Result<EndpointId, NodeError>;

    /// Create the Aggregator endpoint that bridged nodes hang off.
    fn create_aggregator(&self) -> Result<EndpointId, NodeError>;

    /// Remove an endpoint and everything on it.
    fn destroy_endpoint(&self, endpoint: EndpointId) -> Result<(), NodeError>;

    /// Attach `endpoint` to `parent` in the endpoint tree.
    fn set_parent_endpoint(&self, endpoint: EndpointId, parent: EndpointId)
    -> Result<(), NodeError>;

    /// Declare the On/Off Plug-in Unit device type on `endpoint` and add its
    /// Identify and On/Off clusters.
    fn add_on_off_plugin_unit(
        &self,
        endpoint: EndpointId,
        config: &OnOffPluginUnitConfig,
    ) -> Result<(), NodeError>;

    /// Create the `NodeLabel` attribute on a bridged node.
    fn create_node_label(&self, endpoint: EndpointId, label: &str) -> Result<(), NodeError>;

    /// Read an attribute's current value.
    fn attribute(&self, path: AttributePath) -> Result<AttrValue, NodeError>;

    /// Update an attribute from the application side and notify subscribers.
    fn report_attribute(&self, path: AttributePath, value: AttrValue) -> Result<(), NodeError>;
}

// ───────────────────────────────────────────────────────────────
// Accessory port (driven adapter: bridge ↔ physical load)
// ───────────────────────────────────────────────────────────────

/// Receives power-state changes the accessory made on its own
/// (button press, schedule, overload trip).
pub trait PowerReportListener {
    fn notify_power_changed(&self);
}

/// An on/off load the bridge exposes as a plug-in unit.
pub trait PlugInAccessory {
    /// Current power state.
    fn power(&self) -> bool;

    /// Actuate the load. Called when the endpoint commands a change, so
    /// implementations must not notify the listener from here.
    fn set_power(&self, on: bool);

    /// Make the accessory visibly identify itself.
    fn identify_yourself(&self);

    /// Register the listener for locally originated changes. The accessory
    /// holds it weakly; the device that registered it owns itself.
    fn set_report_listener(&self, listener: Weak<dyn PowerReportListener>);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: bridge → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The bridge emits structured [`BridgeEvent`](super::events::BridgeEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::BridgeEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: bridge ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists the bridge configuration.
///
/// Implementations MUST validate before persisting and reject invalid
/// values with [`ConfigError::ValidationFailed`].
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`BridgeConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<BridgeConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &BridgeConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::error::Error for ConfigError {}

impl From<ConfigError> for crate::error::Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::Corrupted => Self::Config("stored config corrupted"),
            ConfigError::ValidationFailed(msg) => Self::Config(msg),
            ConfigError::IoError => Self::Config("config storage I/O error"),
        }
    }
}
