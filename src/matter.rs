//! Matter identifiers and value types shared by the ports and adapters.
//!
//! Only the slice of the Matter data model that a plug-in unit bridge
//! touches lives here: endpoint/cluster/attribute ids, the handful of
//! clusters the bridge reads or writes, and the device types it declares.
//! Everything else is owned by the protocol stack behind
//! [`MatterNodePort`](crate::app::ports::MatterNodePort).

use core::fmt;

/// Endpoint number within the node (0 is the root endpoint).
pub type EndpointId = u16;
/// Cluster identifier.
pub type ClusterId = u32;
/// Attribute identifier, scoped to a cluster.
pub type AttributeId = u32;

/// The root endpoint every node carries.
pub const ROOT_ENDPOINT_ID: EndpointId = 0;

/// Longest device name, in bytes, accepted as a node label.
pub const MAX_NAME_LEN: usize = 63;

/// Longest character-string attribute value the bridge handles.
pub const MAX_CHAR_STRING_LEN: usize = 64;

/// Name reported for a device constructed without a usable name.
pub const DEFAULT_DEVICE_NAME: &str = "Plug-in Unit";

/// Fixed-capacity device name.
pub type DeviceName = heapless::String<MAX_NAME_LEN>;

// ---------------------------------------------------------------------------
// Clusters
// ---------------------------------------------------------------------------

pub mod clusters {
    //! Cluster and attribute ids used by the bridge.

    use super::{AttributeId, ClusterId};

    pub mod identify {
        use super::{AttributeId, ClusterId};

        pub const ID: ClusterId = 0x0003;
        pub const IDENTIFY_TIME: AttributeId = 0x0000;
        pub const IDENTIFY_TYPE: AttributeId = 0x0001;

        /// `IdentifyType` value for a visible light output (LED).
        pub const IDENTIFY_TYPE_LIGHT_OUTPUT: u8 = 0x01;
    }

    pub mod on_off {
        use super::{AttributeId, ClusterId};

        pub const ID: ClusterId = 0x0006;
        pub const ON_OFF: AttributeId = 0x0000;
    }

    pub mod bridged_device_basic_information {
        use super::{AttributeId, ClusterId};

        pub const ID: ClusterId = 0x0039;
        pub const NODE_LABEL: AttributeId = 0x0005;
        pub const REACHABLE: AttributeId = 0x0011;
    }
}

// ---------------------------------------------------------------------------
// Device types
// ---------------------------------------------------------------------------

/// A device type declared on an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceType {
    pub dtype: u16,
    pub drev: u16,
}

/// On/Off Plug-in Unit.
pub const DEV_TYPE_ON_OFF_PLUGIN_UNIT: DeviceType = DeviceType {
    dtype: 0x010A,
    drev: 3,
};

/// A bridged device endpoint.
pub const DEV_TYPE_BRIDGED_NODE: DeviceType = DeviceType {
    dtype: 0x0013,
    drev: 1,
};

/// The endpoint enumerating all bridged endpoints.
pub const DEV_TYPE_AGGREGATOR: DeviceType = DeviceType {
    dtype: 0x000E,
    drev: 1,
};

// ---------------------------------------------------------------------------
// Endpoint flags
// ---------------------------------------------------------------------------

/// Creation flags handed to the stack alongside a new endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EndpointFlags(u8);

impl EndpointFlags {
    pub const NONE: Self = Self(0x00);
    /// The endpoint may be destroyed at runtime (dynamic bridging).
    pub const DESTROYABLE: Self = Self(0x01);
    /// The endpoint represents a bridged device.
    pub const BRIDGE: Self = Self(0x02);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl core::ops::BitOr for EndpointFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

// ---------------------------------------------------------------------------
// Attribute addressing and values
// ---------------------------------------------------------------------------

/// Concrete path to one attribute on one endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributePath {
    pub endpoint: EndpointId,
    pub cluster: ClusterId,
    pub attribute: AttributeId,
}

impl AttributePath {
    pub const fn new(endpoint: EndpointId, cluster: ClusterId, attribute: AttributeId) -> Self {
        Self {
            endpoint,
            cluster,
            attribute,
        }
    }

    /// The `OnOff` attribute of the On/Off cluster on `endpoint`.
    pub const fn on_off(endpoint: EndpointId) -> Self {
        Self::new(endpoint, clusters::on_off::ID, clusters::on_off::ON_OFF)
    }

    /// The `NodeLabel` attribute of the Bridged Device Basic Information cluster.
    pub const fn node_label(endpoint: EndpointId) -> Self {
        Self::new(
            endpoint,
            clusters::bridged_device_basic_information::ID,
            clusters::bridged_device_basic_information::NODE_LABEL,
        )
    }

    pub const fn is_on_off(&self) -> bool {
        self.cluster == clusters::on_off::ID && self.attribute == clusters::on_off::ON_OFF
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ep{}/0x{:04X}/0x{:04X}",
            self.endpoint, self.cluster, self.attribute
        )
    }
}

/// Attribute value as exchanged with the stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Bool(bool),
    U8(u8),
    U16(u16),
    CharString(heapless::String<MAX_CHAR_STRING_LEN>),
}

impl AttrValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::CharString(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Build a character-string value. `None` if `s` is too long.
    pub fn char_string(s: &str) -> Option<Self> {
        let mut out = heapless::String::new();
        out.push_str(s).ok()?;
        Some(Self::CharString(out))
    }

    /// Whether `other` carries the same variant (used for type checks on write).
    pub fn same_type(&self, other: &Self) -> bool {
        core::mem::discriminant(self) == core::mem::discriminant(other)
    }
}

// ---------------------------------------------------------------------------
// Device composition
// ---------------------------------------------------------------------------

/// Initial values for the clusters of an On/Off Plug-in Unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnOffPluginUnitConfig {
    /// Initial `OnOff` attribute value.
    pub on_off: bool,
    /// Initial `IdentifyTime` (seconds).
    pub identify_time: u16,
    /// `IdentifyType` advertised to controllers.
    pub identify_type: u8,
}

impl Default for OnOffPluginUnitConfig {
    fn default() -> Self {
        Self {
            on_off: false,
            identify_time: 0,
            identify_type: clusters::identify::IDENTIFY_TYPE_LIGHT_OUTPUT,
        }
    }
}

/// Validate and copy a device name.
///
/// Returns `None` for an empty name or one longer than [`MAX_NAME_LEN`]
/// bytes; the caller falls back to [`DEFAULT_DEVICE_NAME`].
pub fn device_name(name: &str) -> Option<DeviceName> {
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return None;
    }
    let mut out = DeviceName::new();
    out.push_str(name).ok()?;
    Some(out)
}
