//! Actuator and input drivers, and GPIO initialisation.

pub mod hw_init;
pub mod identify;
pub mod relay;
pub mod toggle_button;
