//! Shared mutable context threaded through every power-state handler.
//!
//! The controller writes the tick's inputs (clock, activity, tier, sleep
//! window) before ticking the FSM; handlers write the outputs (backlight
//! level, burn-in shift) back for the controller to collect.

use crate::calendar::classifier::Tier;
use crate::config::SystemConfig;
use crate::power::{BacklightLevel, BurnInOffset};

pub struct PowerContext {
    // -- Inputs --
    /// Monotonic milliseconds since boot for this tick.
    pub now_ms: u64,
    /// Last time a gesture was observed.
    pub last_activity_ms: u64,
    /// Tier classified this tick.
    pub tier: Tier,
    /// Local time lies inside the configured sleep window.
    pub in_sleep_hours: bool,

    // -- Configuration --
    pub dim_after_ms: u64,
    pub sleep_inactivity_ms: u64,
    pub burn_in_interval_ms: u64,
    pub urgent_blocks_sleep: bool,

    // -- Sleep bookkeeping --
    pub asleep_since_ms: Option<u64>,
    /// Burn-in intervals already emitted in this sleep session.
    pub shifts_emitted: u64,

    // -- Outputs --
    pub backlight: BacklightLevel,
    /// Set by handlers when a new burn-in offset is due this tick.
    pub pending_shift: Option<BurnInOffset>,
}

impl PowerContext {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            now_ms: 0,
            last_activity_ms: 0,
            tier: Tier::Idle,
            in_sleep_hours: false,
            dim_after_ms: u64::from(config.dim_after_secs) * 1000,
            sleep_inactivity_ms: u64::from(config.sleep_inactivity_secs) * 1000,
            burn_in_interval_ms: u64::from(config.burn_in_interval_secs) * 1000,
            urgent_blocks_sleep: config.urgent_blocks_sleep,
            asleep_since_ms: None,
            shifts_emitted: 0,
            backlight: BacklightLevel::Full,
            pending_shift: None,
        }
    }

    /// Milliseconds since the last gesture.
    pub fn idle_ms(&self) -> u64 {
        self.now_ms.saturating_sub(self.last_activity_ms)
    }

    /// Sleep-entry condition shared by `Active` and `Dimmed`.
    pub fn should_sleep(&self) -> bool {
        if !self.in_sleep_hours || self.idle_ms() < self.sleep_inactivity_ms {
            return false;
        }
        !(self.urgent_blocks_sleep && self.tier.is_urgent())
    }
}
