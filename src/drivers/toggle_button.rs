//! Polled, debounced local toggle button.
//!
//! Active-low momentary switch with pull-up. `poll()` is called from the
//! main loop each cycle; a press is reported once, on the debounced
//! falling edge. Holding the button does not repeat.

use embedded_hal::digital::InputPin;

const DEBOUNCE_MS: u32 = 30;

pub struct ToggleButton<P> {
    pin: P,
    /// Raw level seen on the last poll, and when it was first seen.
    candidate: bool,
    since_ms: u32,
    /// Debounced pressed state.
    pressed: bool,
}

impl<P: InputPin> ToggleButton<P> {
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            candidate: false,
            since_ms: 0,
            pressed: false,
        }
    }

    /// Sample the pin. Returns `true` on a new, debounced press.
    ///
    /// A pin read error counts as released.
    pub fn poll(&mut self, now_ms: u32) -> bool {
        let raw = self.pin.is_low().unwrap_or(false);

        if raw != self.candidate {
            self.candidate = raw;
            self.since_ms = now_ms;
            return false;
        }
        if raw == self.pressed || now_ms.wrapping_sub(self.since_ms) < DEBOUNCE_MS {
            return false;
        }
        self.pressed = raw;
        raw
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }
}
