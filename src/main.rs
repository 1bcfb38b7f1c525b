//! PlugBridge firmware entry point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  InMemoryNode      RelayPlug           NvsAdapter  LogEventSink│
//! │  (MatterNodePort)  (PlugInAccessory)   (Config)    (EventSink) │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │  DeviceRegistry ─▶ PlugInDevice (one per plug)         │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  CommandQueue (stack callbacks) · ToggleButton polling         │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::Result;
use log::{debug, info, warn};

use plugbridge::adapters::log_sink::LogEventSink;
use plugbridge::adapters::memory_node::InMemoryNode;
use plugbridge::adapters::nvs::NvsAdapter;
use plugbridge::adapters::relay_plug::RelayPlug;
use plugbridge::app::commands::BridgeCommand;
use plugbridge::app::device::PlugInDevice;
use plugbridge::app::ports::{ConfigPort, MatterNodePort};
use plugbridge::app::registry::DeviceRegistry;
use plugbridge::config::{BridgeConfig, PlugConfig};
use plugbridge::drivers::hw_init::{self, GpioPin};
use plugbridge::drivers::identify::IdentifyBlinker;
use plugbridge::drivers::relay::RelayDriver;
use plugbridge::drivers::toggle_button::ToggleButton;
use plugbridge::events::CommandQueue;

/// Host only: path to a JSON config that overrides NVS.
#[cfg(not(target_os = "espidf"))]
const CONFIG_ENV: &str = "PLUGBRIDGE_CONFIG";

/// Stack callbacks land here; the main loop drains it.
static COMMANDS: CommandQueue = CommandQueue::new();

type Plug = RelayPlug<GpioPin, GpioPin>;

/// One physical plug: the accessory and its optional local button.
struct PlugSlot {
    accessory: Rc<Plug>,
    button: Option<ToggleButton<GpioPin>>,
}

// ── Config ────────────────────────────────────────────────────

fn load_config(nvs: Option<&NvsAdapter>) -> BridgeConfig {
    #[cfg(not(target_os = "espidf"))]
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        let loaded = std::fs::read(&path)
            .map_err(|_| plugbridge::app::ports::ConfigError::IoError)
            .and_then(|bytes| BridgeConfig::from_json(&bytes));
        match loaded {
            Ok(cfg) => {
                info!("Config loaded from {}", path);
                return cfg;
            }
            Err(e) => warn!("{} ({}): {}, ignoring", CONFIG_ENV, path, e),
        }
    }

    match nvs.map(|n| n.load()) {
        Some(Ok(cfg)) => cfg,
        Some(Err(e)) => {
            warn!("NVS config load failed ({}), using defaults", e);
            BridgeConfig::default()
        }
        None => BridgeConfig::default(),
    }
}

// ── Bridge construction ───────────────────────────────────────

fn build_plug(plug: &PlugConfig, config: &BridgeConfig) -> plugbridge::error::Result<PlugSlot> {
    let relay = RelayDriver::new(GpioPin::new(plug.relay_gpio), plug.relay_active_low)?;
    let blinker = IdentifyBlinker::new(
        GpioPin::new(plug.indicator_gpio),
        config.identify_blinks,
        config.identify_period_ms,
    );
    Ok(PlugSlot {
        accessory: Rc::new(RelayPlug::new(relay, blinker)),
        button: plug.button_gpio.map(|gpio| ToggleButton::new(GpioPin::new(gpio))),
    })
}

fn build_bridge(
    config: &BridgeConfig,
    node: &Rc<InMemoryNode>,
    registry: &mut DeviceRegistry,
    sink: &mut LogEventSink,
) -> plugbridge::error::Result<Vec<PlugSlot>> {
    let aggregator = if config.bridged {
        let ep = node.create_aggregator()?;
        info!("Aggregator on endpoint {}", ep);
        Some(ep)
    } else {
        None
    };

    let mut slots = Vec::with_capacity(config.plugs.len());
    for plug in &config.plugs {
        let slot = build_plug(plug, config)?;
        let device =
            PlugInDevice::new(&plug.name, slot.accessory.clone(), node.clone(), aggregator)?;
        registry.register(device, sink)?;
        slots.push(slot);
    }
    Ok(slots)
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. Bootstrap ──────────────────────────────────────────
    #[cfg(target_os = "espidf")]
    {
        esp_idf_svc::sys::link_patches();
        esp_idf_logger::init()?;
    }
    #[cfg(not(target_os = "espidf"))]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("╔══════════════════════════════════════╗");
    info!("║  PlugBridge v{}                     ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Config ─────────────────────────────────────────────
    let nvs = match NvsAdapter::new() {
        Ok(n) => Some(n),
        Err(e) => {
            warn!("NVS init failed ({}), running with defaults and no persistence", e);
            None
        }
    };
    let config = load_config(nvs.as_ref());
    info!(
        "{} plug(s), {} mode",
        config.plugs.len(),
        if config.bridged { "bridged" } else { "standalone" }
    );

    // ── 3. Hardware ───────────────────────────────────────────
    hw_init::init_peripherals(&config)?;

    // ── 4. Node + devices ─────────────────────────────────────
    let node = Rc::new(InMemoryNode::new());
    let mut sink = LogEventSink::new();
    let mut registry = DeviceRegistry::new();
    let mut plugs = build_bridge(&config, &node, &mut registry, &mut sink)?;

    // Subscribers start from the accessories' real state.
    COMMANDS.push(BridgeCommand::ReportAll);

    info!("Bridge ready with {} device(s). Entering event loop.", registry.len());

    // ── 5. Event loop ─────────────────────────────────────────
    let boot = Instant::now();
    let mut last_ms: u32 = 0;

    loop {
        // Failures are already reported through the sink.
        COMMANDS.drain(|cmd| {
            let _ = registry.handle_command(cmd, &mut sink);
        });

        let now_ms = boot.elapsed().as_millis() as u32;
        let delta_ms = now_ms.wrapping_sub(last_ms);
        last_ms = now_ms;

        for slot in &mut plugs {
            if let Some(button) = slot.button.as_mut() {
                if button.poll(now_ms) {
                    info!("Button: local toggle");
                    slot.accessory.toggle();
                }
            }
            slot.accessory.tick(delta_ms);
        }

        for report in node.take_reports() {
            debug!("Report {} = {:?} (dataver {})", report.path, report.value, report.dataver);
        }

        std::thread::sleep(Duration::from_millis(u64::from(config.loop_interval_ms)));
    }
}
