//! Agendalight controller library.
//!
//! Turns a calendar snapshot plus a clock into an ambient LED pattern,
//! a backlight / sleep state and audio alerts, and turns raw touch
//! samples into navigation gestures. All hardware sits behind the port
//! traits in [`app::ports`]; the host simulator lives in `main.rs`
//! behind the `sim` feature.

#![deny(unused_must_use)]

pub mod alerts;
pub mod app;
pub mod calendar;
pub mod config;
pub mod error;
pub mod fsm;
pub mod gesture;
pub mod indicator;
pub mod navigation;
pub mod power;
pub mod refresh;
pub mod render;
pub mod resume;

pub mod adapters;

pub use error::{Error, Result};
