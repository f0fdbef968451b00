//! Function-pointer finite state machine engine for display power.
//!
//! Classic embedded FSM pattern:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  StateTable                                              │
//! │  ┌─────────┬───────────┬──────────┬───────────────────┐  │
//! │  │ State   │ on_enter  │ on_exit  │ on_update         │  │
//! │  ├─────────┼───────────┼──────────┼───────────────────┤  │
//! │  │ Active  │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │  │
//! │  │ Dimmed  │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │  │
//! │  │ Asleep  │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │  │
//! │  └─────────┴───────────┴──────────┴───────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the **current** state.
//! If it returns `Some(next)`, the engine runs `on_exit` for the
//! current state, then `on_enter` for the next. All functions receive
//! `&mut PowerContext`, which holds the tick's inputs and outputs.

pub mod context;
pub mod states;

use context::PowerContext;
use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Display power state. Initial state is `Active`.
/// Must stay in sync with the table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PowerState {
    Active = 0,
    Dimmed = 1,
    Asleep = 2,
}

impl PowerState {
    /// Total number of states; sizes the table array.
    pub const COUNT: usize = 3;

    /// Convert a table index back to `PowerState`. Out-of-range indices
    /// are a defect; release builds fall back to `Active`.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Active,
            1 => Self::Dimmed,
            2 => Self::Asleep,
            _ => {
                debug_assert!(false, "invalid power state index: {idx}");
                Self::Active
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
pub type StateActionFn = fn(&mut PowerContext);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut PowerContext) -> Option<PowerState>;

/// Static descriptor for a single state.
pub struct StateDescriptor {
    pub id: PowerState,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

pub struct Fsm {
    /// Fixed-size table indexed by `PowerState as usize`.
    table: [StateDescriptor; PowerState::COUNT],
    current: usize,
}

impl Fsm {
    pub fn new(table: [StateDescriptor; PowerState::COUNT], initial: PowerState) -> Self {
        Self {
            table,
            current: initial as usize,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    pub fn start(&mut self, ctx: &mut PowerContext) {
        info!("Power FSM starting in {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance by one tick: run `on_update`, transition if requested.
    pub fn tick(&mut self, ctx: &mut PowerContext) {
        let next = (self.table[self.current].on_update)(ctx);
        if let Some(next_id) = next {
            self.force_transition(next_id, ctx);
        }
    }

    /// Transition immediately, skipping `on_update` (used for wake).
    pub fn force_transition(&mut self, next: PowerState, ctx: &mut PowerContext) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    pub fn current_state(&self) -> PowerState {
        PowerState::from_index(self.current)
    }

    fn transition(&mut self, next_id: PowerState, ctx: &mut PowerContext) {
        let next_idx = next_id as usize;

        info!(
            "Power: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
