//! Identify indicator: blinks an LED a fixed number of times.
//!
//! `start()` lights the LED and arms a sequence of `blinks` on/off
//! cycles; the main loop calls `tick(delta_ms)` each cycle to advance it.
//! Each half of a cycle lasts `period_ms`. Restarting while a sequence
//! runs begins a fresh one.

use embedded_hal::digital::OutputPin;

use crate::error::ActuatorError;

pub struct IdentifyBlinker<L> {
    led: L,
    blinks: u8,
    period_ms: u32,
    phase_ms: u32,
    /// Half-periods left in the running sequence; zero when idle.
    steps_left: u16,
    lit: bool,
}

impl<L: OutputPin> IdentifyBlinker<L> {
    pub fn new(led: L, blinks: u8, period_ms: u32) -> Self {
        Self {
            led,
            blinks,
            period_ms: period_ms.max(1),
            phase_ms: 0,
            steps_left: 0,
            lit: false,
        }
    }

    pub fn start(&mut self) -> Result<(), ActuatorError> {
        self.phase_ms = 0;
        self.steps_left = u16::from(self.blinks) * 2;
        self.write(self.steps_left > 0)
    }

    /// Abort the sequence and switch the LED off.
    pub fn stop(&mut self) -> Result<(), ActuatorError> {
        self.steps_left = 0;
        self.write(false)
    }

    /// Advance by `delta_ms`. Idle blinkers do nothing.
    pub fn tick(&mut self, delta_ms: u32) -> Result<(), ActuatorError> {
        if self.steps_left == 0 {
            return Ok(());
        }
        self.phase_ms = self.phase_ms.saturating_add(delta_ms);

        let mut lit = self.lit;
        while self.steps_left > 0 && self.phase_ms >= self.period_ms {
            self.phase_ms -= self.period_ms;
            self.steps_left -= 1;
            lit = self.steps_left > 0 && !lit;
        }
        if lit != self.lit {
            self.write(lit)?;
        }
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.steps_left > 0
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }

    fn write(&mut self, on: bool) -> Result<(), ActuatorError> {
        let res = if on {
            self.led.set_high()
        } else {
            self.led.set_low()
        };
        res.map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.lit = on;
        Ok(())
    }
}
