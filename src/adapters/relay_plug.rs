//! Relay plug accessory: a [`PlugInAccessory`] over real outputs.
//!
//! Wraps a [`RelayDriver`] for the load and an [`IdentifyBlinker`] for
//! the indicator LED. Changes commanded by the endpoint go through
//! `set_power` and stay silent; changes made locally (`toggle`,
//! `apply_local_power`) are pushed to the registered listener so the
//! endpoint follows.

use core::cell::RefCell;
use std::rc::Weak;

use embedded_hal::digital::OutputPin;
use log::{debug, info, warn};

use crate::app::ports::{PlugInAccessory, PowerReportListener};
use crate::drivers::identify::IdentifyBlinker;
use crate::drivers::relay::RelayDriver;

pub struct RelayPlug<R, L> {
    relay: RefCell<RelayDriver<R>>,
    blinker: RefCell<IdentifyBlinker<L>>,
    listener: RefCell<Option<Weak<dyn PowerReportListener>>>,
}

impl<R: OutputPin, L: OutputPin> RelayPlug<R, L> {
    pub fn new(relay: RelayDriver<R>, blinker: IdentifyBlinker<L>) -> Self {
        Self {
            relay: RefCell::new(relay),
            blinker: RefCell::new(blinker),
            listener: RefCell::new(None),
        }
    }

    /// Flip the load from a local input and tell the endpoint.
    pub fn toggle(&self) {
        let on = !self.power();
        self.apply_local_power(on);
    }

    /// Switch the load from a local source and tell the endpoint.
    /// Nothing is reported if the relay write fails.
    pub fn apply_local_power(&self, on: bool) {
        if !self.actuate(on) {
            return;
        }
        let listener = self.listener.borrow().as_ref().and_then(Weak::upgrade);
        match listener {
            Some(l) => l.notify_power_changed(),
            None => debug!("relay plug: no listener for local change"),
        }
    }

    /// Advance the identify blink sequence.
    pub fn tick(&self, delta_ms: u32) {
        if let Err(e) = self.blinker.borrow_mut().tick(delta_ms) {
            warn!("relay plug: indicator write failed: {}", e);
        }
    }

    pub fn is_identifying(&self) -> bool {
        self.blinker.borrow().is_active()
    }

    fn actuate(&self, on: bool) -> bool {
        match self.relay.borrow_mut().set(on) {
            Ok(()) => true,
            Err(e) => {
                warn!("relay plug: relay write failed: {}", e);
                false
            }
        }
    }
}

impl<R: OutputPin, L: OutputPin> PlugInAccessory for RelayPlug<R, L> {
    fn power(&self) -> bool {
        self.relay.borrow().is_on()
    }

    fn set_power(&self, on: bool) {
        self.actuate(on);
    }

    fn identify_yourself(&self) {
        info!("relay plug: identify");
        if let Err(e) = self.blinker.borrow_mut().start() {
            warn!("relay plug: indicator write failed: {}", e);
        }
    }

    fn set_report_listener(&self, listener: Weak<dyn PowerReportListener>) {
        *self.listener.borrow_mut() = Some(listener);
    }
}
