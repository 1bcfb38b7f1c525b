//! One-shot GPIO initialization and raw pin access.
//!
//! Configures relay and indicator outputs and button inputs using raw
//! ESP-IDF sys calls. Called once from `main()` before the event loop.
//! [`GpioPin`] wraps a configured pin in the `embedded-hal` digital traits
//! so the drivers stay hardware-agnostic.
//!
//! On host the pins are simulated by a 64-bit level register.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;
#[cfg(target_os = "espidf")]
use log::info;

use crate::config::BridgeConfig;

// ── Error type ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
        }
    }
}

impl core::error::Error for HwInitError {}

// ── Peripheral init ───────────────────────────────────────────

/// Configure every pin named in `config`. Relays start released.
#[cfg(target_os = "espidf")]
pub fn init_peripherals(config: &BridgeConfig) -> Result<(), HwInitError> {
    for plug in &config.plugs {
        // SAFETY: Called once from main() before the event loop; pins were
        // range-checked by BridgeConfig::validate().
        unsafe {
            configure_output(plug.relay_gpio)?;
            configure_output(plug.indicator_gpio)?;
            if let Some(button) = plug.button_gpio {
                configure_input(button)?;
            }
        }
        gpio_write(plug.relay_gpio, plug.relay_active_low);
        gpio_write(plug.indicator_gpio, false);
    }
    info!("hw_init: {} plug(s) configured", config.plugs.len());
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals(config: &BridgeConfig) -> Result<(), HwInitError> {
    for plug in &config.plugs {
        gpio_write(plug.relay_gpio, plug.relay_active_low);
        gpio_write(plug.indicator_gpio, false);
    }
    log::info!("hw_init(sim): {} plug(s) simulated", config.plugs.len());
    Ok(())
}

#[cfg(target_os = "espidf")]
unsafe fn configure_output(pin: i32) -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pin,
        mode: gpio_mode_t_GPIO_MODE_OUTPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }
    Ok(())
}

/// Buttons are active-low momentary switches; enable the internal pull-up.
#[cfg(target_os = "espidf")]
unsafe fn configure_input(pin: i32) -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pin,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }
    Ok(())
}

// ── Raw pin access ────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: register read on a pin configured in init_peripherals().
    (unsafe { gpio_get_level(pin) }) != 0
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: pin was configured as an output in init_peripherals();
    // main-loop only.
    unsafe { gpio_set_level(pin, if high { 1 } else { 0 }); }
}

#[cfg(not(target_os = "espidf"))]
static SIM_LEVELS: core::sync::atomic::AtomicU64 = core::sync::atomic::AtomicU64::new(u64::MAX);

/// Register bit for `pin`, or `None` outside the simulated 0..64 range.
#[cfg(not(target_os = "espidf"))]
fn sim_bit(pin: i32) -> Option<u64> {
    u32::try_from(pin).ok().and_then(|p| 1u64.checked_shl(p))
}

/// Simulated pins idle high, as with pull-ups fitted. Unknown pins read
/// high as well.
#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(pin: i32) -> bool {
    use core::sync::atomic::Ordering;
    sim_bit(pin).is_none_or(|bit| SIM_LEVELS.load(Ordering::Relaxed) & bit != 0)
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(pin: i32, high: bool) {
    use core::sync::atomic::Ordering;
    let Some(bit) = sim_bit(pin) else {
        log::warn!("sim gpio: write to unknown pin {} ignored", pin);
        return;
    };
    if high {
        SIM_LEVELS.fetch_or(bit, Ordering::Relaxed);
    } else {
        SIM_LEVELS.fetch_and(!bit, Ordering::Relaxed);
    }
}

// ── embedded-hal pin ──────────────────────────────────────────

/// A configured GPIO, addressed by number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioPin {
    pin: i32,
}

impl GpioPin {
    pub const fn new(pin: i32) -> Self {
        Self { pin }
    }

    pub const fn number(&self) -> i32 {
        self.pin
    }
}

impl ErrorType for GpioPin {
    type Error = Infallible;
}

impl OutputPin for GpioPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        gpio_write(self.pin, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        gpio_write(self.pin, true);
        Ok(())
    }
}

impl InputPin for GpioPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(gpio_read(self.pin))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!gpio_read(self.pin))
    }
}
