//! Unified error types for the bridge firmware.
//!
//! A single `Error` enum that every subsystem converts into, so the event
//! loop handles failures uniformly. All variants are `Copy`.

use core::fmt;

use crate::matter::{AttributePath, ClusterId, EndpointId};

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The Matter node rejected an operation.
    Node(NodeError),
    /// A relay or indicator output failed.
    Actuator(ActuatorError),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
    /// No device is registered on this endpoint.
    UnknownEndpoint(EndpointId),
    /// A device is already registered on this endpoint.
    DuplicateEndpoint(EndpointId),
    /// The device registry has no free slot.
    RegistryFull,
    /// A device name does not fit a node label.
    NameTooLong,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(e) => write!(f, "node: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::UnknownEndpoint(ep) => write!(f, "no device on endpoint {ep}"),
            Self::DuplicateEndpoint(ep) => write!(f, "endpoint {ep} already registered"),
            Self::RegistryFull => write!(f, "device registry full"),
            Self::NameTooLong => write!(f, "device name too long"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Node errors
// ---------------------------------------------------------------------------

/// Failures reported by a [`MatterNodePort`](crate::app::ports::MatterNodePort).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeError {
    EndpointNotFound(EndpointId),
    ClusterNotFound {
        endpoint: EndpointId,
        cluster: ClusterId,
    },
    AttributeNotFound(AttributePath),
    /// The value does not match the attribute's type.
    TypeMismatch(AttributePath),
    /// The stack cannot allocate another endpoint.
    EndpointLimit,
    /// A string value exceeds the attribute's capacity.
    ValueTooLong,
    /// The endpoint is the root or still has children.
    NotDestroyable(EndpointId),
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndpointNotFound(ep) => write!(f, "endpoint {ep} not found"),
            Self::ClusterNotFound { endpoint, cluster } => {
                write!(f, "cluster 0x{cluster:04X} not found on endpoint {endpoint}")
            }
            Self::AttributeNotFound(path) => write!(f, "attribute {path} not found"),
            Self::TypeMismatch(path) => write!(f, "type mismatch on {path}"),
            Self::EndpointLimit => write!(f, "endpoint limit reached"),
            Self::ValueTooLong => write!(f, "value too long"),
            Self::NotDestroyable(ep) => write!(f, "endpoint {ep} cannot be destroyed"),
        }
    }
}

impl From<NodeError> for Error {
    fn from(e: NodeError) -> Self {
        Self::Node(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// GPIO set failed.
    GpioWriteFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
