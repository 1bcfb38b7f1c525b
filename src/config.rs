//! Bridge configuration parameters.
//!
//! Describes which plug-in units the bridge exposes and how they are wired.
//! Values come from NVS, a JSON file on the host, or [`BridgeConfig::default`].

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::pins;

/// Upper bound on plug-in units one bridge drives.
pub const MAX_PLUGS: usize = 8;

/// Highest GPIO number on the ESP32-S3.
const MAX_GPIO: i32 = 48;

/// Core bridge configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Expose plugs as bridged nodes under an aggregator endpoint.
    /// When `false` every plug gets a standalone endpoint.
    pub bridged: bool,
    /// The plug-in units, in endpoint creation order.
    pub plugs: heapless::Vec<PlugConfig, MAX_PLUGS>,

    // --- Identify ---
    /// Indicator toggles per identify request.
    pub identify_blinks: u8,
    /// Half-period of the identify blink (milliseconds).
    pub identify_period_ms: u32,

    // --- Timing ---
    /// Main loop interval (milliseconds).
    pub loop_interval_ms: u32,
}

/// Wiring and naming of one plug-in unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlugConfig {
    /// Label published as the bridged node's `NodeLabel`. Empty or
    /// over-long names fall back to the default device name.
    pub name: heapless::String<64>,
    /// Relay coil output.
    pub relay_gpio: i32,
    /// Drive the relay with a LOW level to energise it.
    pub relay_active_low: bool,
    /// Identify indicator LED output.
    pub indicator_gpio: i32,
    /// Optional local toggle button (active-low input).
    pub button_gpio: Option<i32>,
}

impl PlugConfig {
    fn new(name: &str, relay_gpio: i32, indicator_gpio: i32, button_gpio: Option<i32>) -> Self {
        let mut n = heapless::String::new();
        let _ = n.push_str(name);
        Self {
            name: n,
            relay_gpio,
            relay_active_low: false,
            indicator_gpio,
            button_gpio,
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        let mut plugs = heapless::Vec::new();
        let _ = plugs.push(PlugConfig::new(
            "Plug 1",
            pins::RELAY_1_GPIO,
            pins::INDICATOR_1_GPIO,
            Some(pins::BUTTON_1_GPIO),
        ));
        let _ = plugs.push(PlugConfig::new(
            "Plug 2",
            pins::RELAY_2_GPIO,
            pins::INDICATOR_2_GPIO,
            Some(pins::BUTTON_2_GPIO),
        ));

        Self {
            bridged: true,
            plugs,

            identify_blinks: 6,
            identify_period_ms: 250,

            loop_interval_ms: 50, // 20 Hz
        }
    }
}

impl BridgeConfig {
    /// Range-check every field. Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.plugs.is_empty() {
            return Err(ConfigError::ValidationFailed("at least one plug is required"));
        }
        if !(1..=30).contains(&self.identify_blinks) {
            return Err(ConfigError::ValidationFailed("identify_blinks must be 1–30"));
        }
        if !(50..=2000).contains(&self.identify_period_ms) {
            return Err(ConfigError::ValidationFailed(
                "identify_period_ms must be 50–2000",
            ));
        }
        if !(10..=1000).contains(&self.loop_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "loop_interval_ms must be 10–1000",
            ));
        }

        let mut used: heapless::Vec<i32, { MAX_PLUGS * 3 }> = heapless::Vec::new();
        for plug in &self.plugs {
            let gpios = [Some(plug.relay_gpio), Some(plug.indicator_gpio), plug.button_gpio];
            for gpio in gpios.into_iter().flatten() {
                if !(0..=MAX_GPIO).contains(&gpio) {
                    return Err(ConfigError::ValidationFailed("GPIO must be 0–48"));
                }
                if used.contains(&gpio) {
                    return Err(ConfigError::ValidationFailed("GPIO assigned twice"));
                }
                let _ = used.push(gpio);
            }
        }
        Ok(())
    }

    /// Decode and validate a JSON config document.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_slice(bytes).map_err(|_| ConfigError::Corrupted)?;
        cfg.validate()?;
        Ok(cfg)
    }
}
