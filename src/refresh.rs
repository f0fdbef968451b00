//! Background calendar refresh bookkeeping.
//!
//! Fetching happens outside the tick loop (see
//! [`CalendarSource`](crate::app::ports::CalendarSource)). The tracker
//! only decides *when* to ask and *whether* to accept what comes back.
//!
//! ```text
//!  Idle ──request──▶ Fetching{gen} ──report(gen)──▶ Done / Failed
//!                       │
//!                       └──request──▶ Fetching{gen+1}   (gen superseded,
//!                                                       late report dropped)
//! ```
//!
//! A request left unanswered for a full interval is given up and the
//! next automatic request supersedes it.
//!
//! Every request carries a generation number. A report whose generation
//! is not the latest issued is discarded, so a slow fetch can never
//! overwrite the result of a newer one.

use chrono::{DateTime, Duration, Utc};
use log::{info, warn};

use crate::calendar::CalendarSnapshot;
use crate::error::FetchError;

/// Monotonic request number.
pub type Generation = u32;

/// Daytime window (inclusive hours) that uses the base cadence.
const DAYTIME_HOURS: core::ops::RangeInclusive<u8> = 8..=18;

/// A timed event starting this soon halves the cadence.
const SOON_WINDOW_SECS: i64 = 30 * 60;

/// Completion message from the calendar source.
#[derive(Debug, Clone)]
pub struct FetchReport {
    pub generation: Generation,
    pub outcome: Result<CalendarSnapshot, FetchError>,
}

/// Poll state of the refresh pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Idle,
    Fetching { generation: Generation },
    Done,
    Failed(FetchError),
}

/// What the orchestrator should do with an incoming report.
#[derive(Debug)]
pub enum Accepted {
    /// Swap this snapshot in.
    Apply(CalendarSnapshot),
    /// Latest fetch failed; keep the current snapshot.
    Failed(FetchError),
    /// Report belongs to a superseded request.
    Stale { generation: Generation },
}

/// Connectivity summary for the status region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NetworkStatus {
    pub consecutive_failures: u32,
    pub last_success: Option<DateTime<Utc>>,
    pub last_failure: Option<DateTime<Utc>>,
}

impl NetworkStatus {
    pub fn is_online(&self) -> bool {
        self.consecutive_failures == 0
    }
}

pub struct RefreshTracker {
    state: RefreshState,
    latest: Generation,
    last_request_ms: Option<u64>,
    base_interval_secs: u32,
    status: NetworkStatus,
}

impl RefreshTracker {
    pub fn new(base_interval_secs: u32) -> Self {
        Self {
            state: RefreshState::Idle,
            latest: 0,
            last_request_ms: None,
            base_interval_secs,
            status: NetworkStatus::default(),
        }
    }

    pub fn state(&self) -> RefreshState {
        self.state
    }

    pub fn status(&self) -> NetworkStatus {
        self.status
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.state, RefreshState::Fetching { .. })
    }

    /// Issue a new request, superseding any fetch still in flight.
    pub fn request(&mut self, now_ms: u64) -> Generation {
        if let RefreshState::Fetching { generation } = self.state {
            info!("Refresh: request {generation} superseded");
        }
        self.latest = self.latest.wrapping_add(1);
        self.state = RefreshState::Fetching {
            generation: self.latest,
        };
        self.last_request_ms = Some(now_ms);
        self.latest
    }

    /// Whether an automatic refresh is due: always before the first
    /// request, otherwise once `interval_secs` have passed since the last
    /// one. A request still unanswered after a full interval counts as
    /// lost.
    pub fn is_due(&self, now_ms: u64, interval_secs: u32) -> bool {
        let Some(at) = self.last_request_ms else {
            return true;
        };
        let elapsed_ms = now_ms.saturating_sub(at);
        if elapsed_ms < u64::from(interval_secs) * 1000 {
            return false;
        }
        if let RefreshState::Fetching { generation } = self.state {
            warn!(
                "Refresh: request {generation} unanswered after {}s, giving up on it",
                elapsed_ms / 1000
            );
        }
        true
    }

    /// Classify a report against the latest request.
    pub fn accept(&mut self, report: FetchReport, now: DateTime<Utc>) -> Accepted {
        let current = match self.state {
            RefreshState::Fetching { generation } => Some(generation),
            _ => None,
        };
        if current != Some(report.generation) {
            info!(
                "Refresh: dropping result of request {} (latest {})",
                report.generation, self.latest
            );
            return Accepted::Stale {
                generation: report.generation,
            };
        }

        match report.outcome {
            Ok(snapshot) => {
                self.state = RefreshState::Done;
                self.status.consecutive_failures = 0;
                self.status.last_success = Some(now);
                info!("Refresh: {} events received", snapshot.len());
                Accepted::Apply(snapshot)
            }
            Err(e) => {
                self.state = RefreshState::Failed(e);
                self.status.consecutive_failures = self.status.consecutive_failures.saturating_add(1);
                self.status.last_failure = Some(now);
                warn!(
                    "Refresh: failed ({e}), {} consecutive",
                    self.status.consecutive_failures
                );
                Accepted::Failed(e)
            }
        }
    }

    /// Seconds until the next automatic refresh should be issued.
    ///
    /// Base cadence during the day, doubled overnight, halved when the
    /// next timed event starts within half an hour.
    pub fn interval_for(&self, snapshot: &CalendarSnapshot, now: DateTime<Utc>, local_hour: u8) -> u32 {
        let base = if DAYTIME_HOURS.contains(&local_hour) {
            self.base_interval_secs
        } else {
            self.base_interval_secs.saturating_mul(2)
        };

        let next_timed = snapshot
            .events()
            .iter()
            .find(|e| e.is_timed() && !e.is_cancelled() && e.start() > now);
        match next_timed {
            Some(e) if e.start() - now <= Duration::seconds(SOON_WINDOW_SECS) => base / 2,
            _ => base,
        }
    }
}
