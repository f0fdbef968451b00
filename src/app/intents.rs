//! The per-tick output of the orchestrator.

use crate::alerts::{AlertIntent, MAX_ALERTS_PER_TICK};
use crate::calendar::Freshness;
use crate::calendar::classifier::EventState;
use crate::fsm::PowerState;
use crate::indicator::LedIntent;
use crate::navigation::Theme;
use crate::power::PowerOutput;
use crate::refresh::NetworkStatus;
use crate::render::DirtyRegions;

/// What the renderer needs besides the snapshot itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    pub page: u16,
    pub page_count: u16,
    pub theme: Theme,
    pub freshness: Freshness,
    pub network: NetworkStatus,
    pub refreshing: bool,
}

/// Every hardware intent produced by one tick.
#[derive(Debug, Clone)]
pub struct IntentBatch {
    pub event_state: EventState,
    pub led: LedIntent,
    pub power: PowerOutput,
    pub alerts: heapless::Vec<AlertIntent, MAX_ALERTS_PER_TICK>,
    pub dirty: DirtyRegions,
    pub view: ViewState,
}

impl IntentBatch {
    pub fn power_state(&self) -> PowerState {
        self.power.state
    }

    pub fn is_stale(&self) -> bool {
        self.view.freshness == Freshness::Stale
    }
}
