//! Application core. Pure domain logic, zero I/O.
//!
//! Wires the calendar classifier, indicator, alert scheduler, gesture
//! recogniser and power controller into one tick loop. All interaction
//! with hardware happens through **port traits** defined in [`ports`],
//! keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod intents;
pub mod ports;
pub mod service;
