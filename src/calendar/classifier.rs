//! Event classification: snapshot + clock → one [`EventState`].
//!
//! ```text
//!  urgency   InMeeting > Imminent (≤15 min) > UpcomingHour (≤60 min)
//!                      > AllDayActive > Idle
//! ```
//!
//! Pure and idempotent: the same snapshot and instant always produce the
//! same state. All-day and multi-day events only ever yield
//! `AllDayActive`, even while "now" lies inside their span.

use chrono::{DateTime, Duration, Utc};

use super::{CalendarSnapshot, Event, EventId};

/// Start within this window classifies as `Imminent`.
pub const IMMINENT_WINDOW_MINS: i64 = 15;
/// Start within this window classifies as `UpcomingHour`.
pub const LOOKAHEAD_WINDOW_MINS: i64 = 60;

/// Urgency tier, ordered from least to most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    Idle,
    AllDayActive,
    UpcomingHour,
    Imminent,
    InMeeting,
}

impl Tier {
    /// Tiers that must never be delayed or dimmed away.
    pub fn is_urgent(self) -> bool {
        matches!(self, Self::InMeeting | Self::Imminent)
    }

    /// Tiers that allow the backlight to dim.
    pub fn allows_dimming(self) -> bool {
        matches!(self, Self::Idle | Self::AllDayActive)
    }
}

/// Derived per-tick state of the calendar relative to now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventState {
    InMeeting(EventId),
    Imminent { id: EventId, minutes_to_start: u32 },
    UpcomingHour { id: EventId, minutes_to_start: u32 },
    AllDayActive(EventId),
    Idle,
}

impl EventState {
    pub fn tier(&self) -> Tier {
        match self {
            Self::InMeeting(_) => Tier::InMeeting,
            Self::Imminent { .. } => Tier::Imminent,
            Self::UpcomingHour { .. } => Tier::UpcomingHour,
            Self::AllDayActive(_) => Tier::AllDayActive,
            Self::Idle => Tier::Idle,
        }
    }

    /// The event driving this state, if any.
    pub fn event_id(&self) -> Option<&EventId> {
        match self {
            Self::InMeeting(id)
            | Self::Imminent { id, .. }
            | Self::UpcomingHour { id, .. }
            | Self::AllDayActive(id) => Some(id),
            Self::Idle => None,
        }
    }
}

/// Whole minutes until `start`, rounded up so a start 30 s away reads 1.
pub fn minutes_until(start: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let secs = (start - now).num_seconds().max(0);
    ((secs + 59) / 60) as u32
}

/// Classify `snapshot` at `now`.
pub fn classify(snapshot: &CalendarSnapshot, now: DateTime<Utc>) -> EventState {
    let imminent = Duration::minutes(IMMINENT_WINDOW_MINS);
    let lookahead = Duration::minutes(LOOKAHEAD_WINDOW_MINS);

    let mut in_meeting: Option<&Event> = None;
    let mut next_imminent: Option<&Event> = None;
    let mut next_upcoming: Option<&Event> = None;
    let mut all_day: Option<&Event> = None;

    for event in snapshot.events() {
        debug_assert!(
            event.end().is_none_or(|end| event.start() <= end),
            "event {} violates start <= end",
            event.id()
        );
        if event.is_cancelled() {
            continue;
        }

        if event.is_all_day() {
            if event.spans(now) {
                keep_earliest(&mut all_day, event);
            }
            continue;
        }

        if event.spans(now) {
            keep_earliest(&mut in_meeting, event);
        } else if event.start() > now {
            let until = event.start() - now;
            if until <= imminent {
                keep_earliest(&mut next_imminent, event);
            } else if until <= lookahead {
                keep_earliest(&mut next_upcoming, event);
            }
        }
    }

    if let Some(e) = in_meeting {
        EventState::InMeeting(e.id().clone())
    } else if let Some(e) = next_imminent {
        EventState::Imminent {
            id: e.id().clone(),
            minutes_to_start: minutes_until(e.start(), now),
        }
    } else if let Some(e) = next_upcoming {
        EventState::UpcomingHour {
            id: e.id().clone(),
            minutes_to_start: minutes_until(e.start(), now),
        }
    } else if let Some(e) = all_day {
        EventState::AllDayActive(e.id().clone())
    } else {
        EventState::Idle
    }
}

fn keep_earliest<'a>(slot: &mut Option<&'a Event>, candidate: &'a Event) {
    match slot {
        Some(current) if current.start() <= candidate.start() => {}
        _ => *slot = Some(candidate),
    }
}
