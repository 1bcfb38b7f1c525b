//! PlugBridge firmware library.
//!
//! Exposes a Matter bridge's device adapters for integration testing and
//! for the firmware binary. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod events;
pub mod matter;
pub mod pins;
