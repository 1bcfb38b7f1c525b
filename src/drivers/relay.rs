//! Relay output driver.
//!
//! Switches a mains relay (or SSR) through any `embedded-hal` output pin.
//! Boards differ in coil polarity, so the logical on/off state is mapped
//! to a pin level through `active_low`.
//!
//! This driver is a dumb actuator: it does not know about endpoints or
//! listeners.

use embedded_hal::digital::OutputPin;

use crate::error::ActuatorError;

pub struct RelayDriver<P> {
    pin: P,
    active_low: bool,
    on: bool,
}

impl<P: OutputPin> RelayDriver<P> {
    /// Take ownership of `pin` and drive the relay off.
    pub fn new(pin: P, active_low: bool) -> Result<Self, ActuatorError> {
        let mut relay = Self {
            pin,
            active_low,
            on: false,
        };
        relay.drive(false)?;
        Ok(relay)
    }

    /// Switch the load. The cached state only changes if the pin write
    /// succeeded.
    pub fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
        self.drive(on)?;
        self.on = on;
        Ok(())
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn is_active_low(&self) -> bool {
        self.active_low
    }

    /// Give the pin back, e.g. to inspect a mock in tests.
    pub fn release(self) -> P {
        self.pin
    }

    fn drive(&mut self, on: bool) -> Result<(), ActuatorError> {
        let high = on != self.active_low;
        let res = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        res.map_err(|_| ActuatorError::GpioWriteFailed)
    }
}
