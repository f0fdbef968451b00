//! Outbound application events.
//!
//! The [`TickOrchestrator`](super::service::TickOrchestrator) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them (serial log, test recorder).

use crate::calendar::classifier::Tier;
use crate::calendar::{EventId, Freshness};
use crate::error::FetchError;
use crate::fsm::PowerState;
use crate::refresh::Generation;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The orchestrator has started (carries initial power state).
    Started(PowerState),

    /// The power FSM transitioned between states.
    PowerChanged { from: PowerState, to: PowerState },

    /// The indicator committed a new tier.
    TierChanged { from: Tier, to: Tier },

    /// An audio alert was sounded.
    AlertFired {
        id: EventId,
        title: String,
        minutes_to_start: u32,
    },

    /// An alert was recorded but muted by quiet hours.
    AlertSuppressed(EventId),

    /// A refresh was requested from the calendar source.
    RefreshRequested { generation: Generation, manual: bool },

    /// A new snapshot was swapped in.
    SnapshotApplied { events: usize },

    /// The latest fetch failed; the previous snapshot is kept.
    FetchFailed {
        error: FetchError,
        consecutive: u32,
    },

    /// A fetch result arrived for a superseded request.
    StaleResultDiscarded { generation: Generation },

    /// The snapshot crossed the staleness threshold (either way).
    FreshnessChanged(Freshness),
}
