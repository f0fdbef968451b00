//! At-most-once audio alerts for upcoming timed events.
//!
//! ```text
//!   snapshot + now ──▶ AlertScheduler ──▶ AlertIntent (buzzer)
//!                         │
//!                         └── AlertRecord per event id
//!                              (fired | suppressed by quiet hours)
//! ```
//!
//! An event becomes eligible once its start is at most `alert_lead_secs`
//! away and still in the future. The first eligible tick sets the record;
//! the alert fires only if that tick is outside quiet hours. Suppressed
//! alerts are never retried. Records are purged when the event ends or
//! its id disappears from a fresh snapshot.

use chrono::{DateTime, Duration, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::calendar::classifier::minutes_until;
use crate::calendar::{CalendarSnapshot, EventId};
use crate::config::{HourWindow, MAX_BUZZ_STEPS, SystemConfig};

/// Maximum number of alert records kept (stack-allocated).
pub const MAX_ALERT_RECORDS: usize = 64;

/// Maximum alerts emitted in a single tick.
pub const MAX_ALERTS_PER_TICK: usize = 4;

/// Whether the alert for an occurrence was sounded or muted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertOutcome {
    Fired,
    Suppressed,
}

/// "Alert already handled for this occurrence."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: EventId,
    /// Record is dropped once this instant passes.
    pub expires_at: DateTime<Utc>,
    pub outcome: AlertOutcome,
}

/// Request for the buzzer driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertIntent {
    pub id: EventId,
    pub title: String,
    pub minutes_to_start: u32,
    /// Alternating on/off durations in milliseconds.
    pub pattern_ms: heapless::Vec<u16, MAX_BUZZ_STEPS>,
}

/// Result of one evaluation pass.
#[derive(Debug, Default)]
pub struct AlertPass {
    pub fired: heapless::Vec<AlertIntent, MAX_ALERTS_PER_TICK>,
    pub suppressed: heapless::Vec<EventId, MAX_ALERTS_PER_TICK>,
}

/// The alert scheduler.
pub struct AlertScheduler {
    records: heapless::Vec<AlertRecord, MAX_ALERT_RECORDS>,
    lead_time: Duration,
    quiet_hours: HourWindow,
    pattern_ms: heapless::Vec<u16, MAX_BUZZ_STEPS>,
}

impl AlertScheduler {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            records: heapless::Vec::new(),
            lead_time: Duration::seconds(i64::from(config.alert_lead_secs)),
            quiet_hours: config.quiet_hours,
            pattern_ms: config.buzz_pattern_ms.clone(),
        }
    }

    /// Evaluate every event in `snapshot` at `now`.
    ///
    /// `local_hour` is the hour-of-day in the display time zone, used for
    /// the quiet-hours check.
    pub fn evaluate(
        &mut self,
        snapshot: &CalendarSnapshot,
        now: DateTime<Utc>,
        local_hour: u8,
    ) -> AlertPass {
        self.purge_expired(now);

        let quiet = self.quiet_hours.contains(local_hour);
        let mut pass = AlertPass::default();

        for event in snapshot.events() {
            if !event.is_timed() || event.is_cancelled() {
                continue;
            }
            // Only future starts alert; resuming mid-event must not
            // sound a stale reminder.
            if event.start() <= now || event.start() - now > self.lead_time {
                continue;
            }
            if self.has_record(event.id()) {
                continue;
            }

            let outcome = if quiet {
                AlertOutcome::Suppressed
            } else {
                AlertOutcome::Fired
            };
            let record = AlertRecord {
                id: event.id().clone(),
                expires_at: event.effective_end().max(event.start()),
                outcome,
            };
            if !self.insert(record) {
                continue;
            }

            match outcome {
                AlertOutcome::Fired => {
                    let intent = AlertIntent {
                        id: event.id().clone(),
                        title: event.title().to_owned(),
                        minutes_to_start: minutes_until(event.start(), now),
                        pattern_ms: self.pattern_ms.clone(),
                    };
                    info!(
                        "Alerts: '{}' fires ({} min to start)",
                        intent.title, intent.minutes_to_start
                    );
                    if pass.fired.push(intent).is_err() {
                        warn!("Alerts: per-tick limit reached, '{}' muted", event.id());
                    }
                }
                AlertOutcome::Suppressed => {
                    info!("Alerts: '{}' suppressed (quiet hours)", event.id());
                    let _ = pass.suppressed.push(event.id().clone());
                }
            }
        }

        pass
    }

    /// Drop records whose id is absent from a freshly applied snapshot.
    pub fn retain_present(&mut self, snapshot: &CalendarSnapshot) {
        self.records.retain(|r| snapshot.contains(&r.id));
    }

    /// Whether an occurrence has already been handled.
    pub fn has_record(&self, id: &EventId) -> bool {
        self.records.iter().any(|r| &r.id == id)
    }

    pub fn record(&self, id: &EventId) -> Option<&AlertRecord> {
        self.records.iter().find(|r| &r.id == id)
    }

    pub fn records(&self) -> &[AlertRecord] {
        &self.records
    }

    /// Re-seed records after a wake (see [`crate::resume`]).
    pub fn restore(&mut self, records: impl IntoIterator<Item = AlertRecord>) {
        for record in records {
            if !self.has_record(&record.id) {
                self.insert(record);
            }
        }
    }

    fn purge_expired(&mut self, now: DateTime<Utc>) {
        self.records.retain(|r| r.expires_at > now);
    }

    /// Insert, evicting the record that expires first when full.
    fn insert(&mut self, record: AlertRecord) -> bool {
        if self.records.is_full() {
            let oldest = self
                .records
                .iter()
                .enumerate()
                .min_by_key(|(_, r)| r.expires_at)
                .map(|(i, _)| i);
            if let Some(i) = oldest {
                let evicted = self.records.swap_remove(i);
                warn!("Alerts: record table full, evicted '{}'", evicted.id);
            }
        }
        self.records.push(record).is_ok()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
