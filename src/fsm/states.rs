//! Concrete power-state handlers and table builder.
//!
//! ```text
//!  ACTIVE ──[idle ≥ dim_after, tier non-urgent]──▶ DIMMED
//!    ▲  ▲                                            │
//!    │  └───────────[urgent tier]────────────────────┘
//!    │
//!    │          [sleep hours, idle ≥ sleep_inactivity]
//!    │      ACTIVE / DIMMED ───────────────────────▶ ASLEEP
//!    │                                                 │
//!    └────────────[sleep window ends]──────────────────┘
//!
//!  Any state ──[gesture]──▶ ACTIVE   (forced by the controller)
//! ```

use super::context::PowerContext;
use super::{PowerState, StateDescriptor};
use crate::power::{BacklightLevel, burn_in_offset};
use log::info;

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; PowerState::COUNT] {
    [
        // Index 0: Active
        StateDescriptor {
            id: PowerState::Active,
            name: "Active",
            on_enter: Some(active_enter),
            on_exit: None,
            on_update: active_update,
        },
        // Index 1: Dimmed
        StateDescriptor {
            id: PowerState::Dimmed,
            name: "Dimmed",
            on_enter: Some(dimmed_enter),
            on_exit: None,
            on_update: dimmed_update,
        },
        // Index 2: Asleep
        StateDescriptor {
            id: PowerState::Asleep,
            name: "Asleep",
            on_enter: Some(asleep_enter),
            on_exit: Some(asleep_exit),
            on_update: asleep_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  ACTIVE
// ═══════════════════════════════════════════════════════════════════════════

fn active_enter(ctx: &mut PowerContext) {
    ctx.backlight = BacklightLevel::Full;
}

fn active_update(ctx: &mut PowerContext) -> Option<PowerState> {
    if ctx.should_sleep() {
        return Some(PowerState::Asleep);
    }
    if ctx.idle_ms() >= ctx.dim_after_ms && ctx.tier.allows_dimming() && !ctx.in_sleep_hours {
        return Some(PowerState::Dimmed);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  DIMMED
// ═══════════════════════════════════════════════════════════════════════════

fn dimmed_enter(ctx: &mut PowerContext) {
    ctx.backlight = BacklightLevel::Dim;
    info!("DIMMED: idle {}s", ctx.idle_ms() / 1000);
}

fn dimmed_update(ctx: &mut PowerContext) -> Option<PowerState> {
    if ctx.should_sleep() {
        return Some(PowerState::Asleep);
    }
    if ctx.tier.is_urgent() {
        info!("DIMMED: {:?} event, waking", ctx.tier);
        return Some(PowerState::Active);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  ASLEEP: minimal display, periodic burn-in shift
// ═══════════════════════════════════════════════════════════════════════════

fn asleep_enter(ctx: &mut PowerContext) {
    ctx.backlight = BacklightLevel::Off;
    ctx.asleep_since_ms = Some(ctx.now_ms);
    ctx.shifts_emitted = 1;
    ctx.pending_shift = Some(burn_in_offset(0));
}

fn asleep_exit(ctx: &mut PowerContext) {
    ctx.asleep_since_ms = None;
    ctx.shifts_emitted = 0;
    ctx.pending_shift = None;
}

fn asleep_update(ctx: &mut PowerContext) -> Option<PowerState> {
    if !ctx.in_sleep_hours {
        info!("ASLEEP: sleep window ended");
        return Some(PowerState::Active);
    }

    let since = ctx.asleep_since_ms.unwrap_or(ctx.now_ms);
    let intervals = ctx.now_ms.saturating_sub(since) / ctx.burn_in_interval_ms.max(1);
    // After a stall, jump straight to the current interval.
    if intervals >= ctx.shifts_emitted {
        ctx.pending_shift = Some(burn_in_offset(intervals));
        ctx.shifts_emitted = intervals + 1;
    }
    None
}
