//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade (serial console on the device, stderr in the
//! simulator).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] as one line.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | power={:?}", state);
            }
            AppEvent::PowerChanged { from, to } => {
                info!("POWER | {:?} -> {:?}", from, to);
            }
            AppEvent::TierChanged { from, to } => {
                info!("TIER | {:?} -> {:?}", from, to);
            }
            AppEvent::AlertFired {
                id,
                title,
                minutes_to_start,
            } => {
                info!("ALERT | fired id={} '{}' in {}min", id, title, minutes_to_start);
            }
            AppEvent::AlertSuppressed(id) => {
                info!("ALERT | suppressed id={} (quiet hours)", id);
            }
            AppEvent::RefreshRequested { generation, manual } => {
                info!(
                    "FETCH | request={} {}",
                    generation,
                    if *manual { "manual" } else { "auto" }
                );
            }
            AppEvent::SnapshotApplied { events } => {
                info!("FETCH | applied {} events", events);
            }
            AppEvent::FetchFailed { error, consecutive } => {
                warn!("FETCH | failed: {} ({} in a row)", error, consecutive);
            }
            AppEvent::StaleResultDiscarded { generation } => {
                info!("FETCH | discarded superseded request={}", generation);
            }
            AppEvent::FreshnessChanged(freshness) => {
                info!("FETCH | snapshot {:?}", freshness);
            }
        }
    }
}
