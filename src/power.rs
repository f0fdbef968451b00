//! Display power controller.
//!
//! Wraps the function-pointer [`Fsm`] with the per-tick input plumbing.
//! The orchestrator calls it twice per tick:
//!
//! 1. [`PowerController::observe_gestures`] right after gesture
//!    recognition, so a wake touch lands before anything else runs.
//! 2. [`PowerController::finalize`] after classification, which runs the
//!    state's update handler and collects the backlight / burn-in output.

use log::debug;

use crate::calendar::classifier::Tier;
use crate::config::SystemConfig;
use crate::fsm::context::PowerContext;
use crate::fsm::{Fsm, PowerState, states};
use crate::gesture::GestureEvent;

/// Backlight level requested from the display driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BacklightLevel {
    Full,
    Dim,
    Off,
}

impl BacklightLevel {
    /// Duty cycle in percent for PWM-driven backlights.
    pub fn duty_percent(self) -> u8 {
        match self {
            Self::Full => 100,
            Self::Dim => 20,
            Self::Off => 0,
        }
    }
}

/// Pixel displacement for the sleep-mode display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurnInOffset {
    pub dx: i16,
    pub dy: i16,
}

/// Fixed cycle of burn-in displacements (the four corners of a 50×30 box).
pub const BURN_IN_SEQUENCE: [BurnInOffset; 4] = [
    BurnInOffset { dx: -25, dy: -15 },
    BurnInOffset { dx: 25, dy: -15 },
    BurnInOffset { dx: -25, dy: 15 },
    BurnInOffset { dx: 25, dy: 15 },
];

/// Offset for the `n`th interval of a sleep session.
pub fn burn_in_offset(n: u64) -> BurnInOffset {
    BURN_IN_SEQUENCE[(n % BURN_IN_SEQUENCE.len() as u64) as usize]
}

/// What the power controller wants from the hardware this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerOutput {
    pub state: PowerState,
    pub backlight: BacklightLevel,
    /// A new burn-in offset became due this tick.
    pub shift: Option<BurnInOffset>,
    /// Offset currently applied to the sleep display (`None` unless asleep).
    pub offset: Option<BurnInOffset>,
}

pub struct PowerController {
    fsm: Fsm,
    ctx: PowerContext,
    offset: Option<BurnInOffset>,
}

impl PowerController {
    /// Create the controller in `Active`. Uptime is assumed to start at
    /// zero, so the idle timer starts at boot.
    pub fn new(config: &SystemConfig) -> Self {
        let mut ctx = PowerContext::new(config);
        let mut fsm = Fsm::new(states::build_state_table(), PowerState::Active);
        fsm.start(&mut ctx);
        Self {
            fsm,
            ctx,
            offset: None,
        }
    }

    pub fn state(&self) -> PowerState {
        self.fsm.current_state()
    }

    /// Milliseconds since the last observed gesture.
    pub fn idle_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.ctx.last_activity_ms)
    }

    /// Step 2 of the tick: any gesture resets the idle timer and forces
    /// `Active`. Returns the state the device woke from, if it was not
    /// already active.
    pub fn observe_gestures(&mut self, gestures: &[GestureEvent], now_ms: u64) -> Option<PowerState> {
        if gestures.is_empty() {
            return None;
        }
        self.ctx.now_ms = now_ms;
        self.ctx.last_activity_ms = now_ms;

        let before = self.fsm.current_state();
        if before == PowerState::Active {
            return None;
        }
        debug!("Power: {} gesture(s) while {before:?}, waking", gestures.len());
        self.fsm.force_transition(PowerState::Active, &mut self.ctx);
        self.offset = None;
        Some(before)
    }

    /// Step 6 of the tick: evaluate transitions for this tick's tier and
    /// sleep window, then report the hardware output.
    pub fn finalize(&mut self, tier: Tier, in_sleep_hours: bool, now_ms: u64) -> PowerOutput {
        self.ctx.now_ms = now_ms;
        self.ctx.tier = tier;
        self.ctx.in_sleep_hours = in_sleep_hours;

        self.fsm.tick(&mut self.ctx);

        let state = self.fsm.current_state();
        let shift = self.ctx.pending_shift.take();
        if state == PowerState::Asleep {
            if let Some(s) = shift {
                debug!("Power: burn-in shift to ({}, {})", s.dx, s.dy);
                self.offset = Some(s);
            }
        } else {
            self.offset = None;
        }

        PowerOutput {
            state,
            backlight: self.ctx.backlight,
            shift: if state == PowerState::Asleep { shift } else { None },
            offset: self.offset,
        }
    }
}
