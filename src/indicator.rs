//! Ambient LED indicator with hysteresis.
//!
//! The orchestrator calls [`AmbientIndicatorController::update`] once per
//! tick with the freshly classified [`EventState`], and feeds the returned
//! [`LedIntent`] to the LED port.
//!
//! ## Tier → pattern
//!
//! | Tier          | Pattern | Colour      |
//! |---------------|---------|-------------|
//! | InMeeting     | Solid   | green       |
//! | Imminent      | Pulsing | red         |
//! | UpcomingHour  | Solid   | orange      |
//! | AllDayActive  | Solid   | blue-purple |
//! | Idle          | Off     | -           |
//!
//! A non-urgent target must be observed for `hysteresis_ticks`
//! consecutive ticks before it is committed. Moves into `InMeeting` or
//! `Imminent` commit on first observation.

use log::info;

use crate::calendar::classifier::{EventState, Tier};
use crate::config::SystemConfig;

/// Colour as (R, G, B) tuple, each 0–255.
pub type Rgb = (u8, u8, u8);

pub const COLOUR_OFF: Rgb = (0, 0, 0);
pub const COLOUR_IN_MEETING: Rgb = (0, 204, 0); // Green
pub const COLOUR_IMMINENT: Rgb = (255, 0, 0); // Red
pub const COLOUR_UPCOMING: Rgb = (255, 120, 0); // Orange
pub const COLOUR_ALL_DAY: Rgb = (110, 60, 220); // Blue-purple

/// Pattern identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedPattern {
    Off,
    Solid(Rgb),
    /// On/off square wave driven by tick count.
    Pulsing(Rgb),
}

impl LedPattern {
    pub fn for_tier(tier: Tier) -> Self {
        match tier {
            Tier::InMeeting => Self::Solid(COLOUR_IN_MEETING),
            Tier::Imminent => Self::Pulsing(COLOUR_IMMINENT),
            Tier::UpcomingHour => Self::Solid(COLOUR_UPCOMING),
            Tier::AllDayActive => Self::Solid(COLOUR_ALL_DAY),
            Tier::Idle => Self::Off,
        }
    }
}

/// What the LED driver should show this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedIntent {
    pub pattern: LedPattern,
    /// Instantaneous colour for this tick (pulsing already applied).
    pub rgb: Rgb,
}

impl LedIntent {
    pub const OFF: Self = Self {
        pattern: LedPattern::Off,
        rgb: COLOUR_OFF,
    };
}

/// Indicator state machine. Stack-allocated, no heap.
pub struct AmbientIndicatorController {
    committed: Tier,
    /// Candidate tier and how many consecutive ticks it has been seen.
    pending: Option<(Tier, u8)>,
    confirm_ticks: u8,
    pulse_period_ticks: u32,
    /// Ticks since the committed pattern started; phase for pulsing.
    phase_ticks: u32,
}

impl AmbientIndicatorController {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            committed: Tier::Idle,
            pending: None,
            confirm_ticks: config.hysteresis_ticks.max(1),
            pulse_period_ticks: config.pulse_period_ticks(),
            phase_ticks: 0,
        }
    }

    /// Tier currently shown on the LED.
    pub fn committed_tier(&self) -> Tier {
        self.committed
    }

    /// Advance one tick and return the LED output.
    pub fn update(&mut self, state: &EventState) -> LedIntent {
        let target = state.tier();

        if target == self.committed {
            self.pending = None;
        } else if target.is_urgent() {
            self.commit(target);
        } else {
            let seen = match self.pending {
                Some((tier, count)) if tier == target => count.saturating_add(1),
                _ => 1,
            };
            if seen >= self.confirm_ticks {
                self.commit(target);
            } else {
                self.pending = Some((target, seen));
            }
        }

        let intent = self.render();
        self.phase_ticks = self.phase_ticks.wrapping_add(1);
        intent
    }

    fn commit(&mut self, tier: Tier) {
        info!("Indicator: {:?} -> {:?}", self.committed, tier);
        self.committed = tier;
        self.pending = None;
        self.phase_ticks = 0;
    }

    fn render(&self) -> LedIntent {
        let pattern = LedPattern::for_tier(self.committed);
        let rgb = match pattern {
            LedPattern::Off => COLOUR_OFF,
            LedPattern::Solid(colour) => colour,
            LedPattern::Pulsing(colour) => {
                let on = (self.phase_ticks % self.pulse_period_ticks) < self.pulse_period_ticks / 2;
                if on { colour } else { COLOUR_OFF }
            }
        };
        LedIntent { pattern, rgb }
    }
}
