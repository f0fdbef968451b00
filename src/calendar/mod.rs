//! Calendar data model.
//!
//! Events arrive from the upstream feed parser already well-formed; the
//! core only re-checks the `start <= end` invariant when a snapshot is
//! built. A [`CalendarSnapshot`] is immutable once built and is replaced
//! wholesale on every successful refresh.

pub mod classifier;

use core::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EventError;
use crate::indicator::Rgb;

/// Title prefix the calendar server uses for cancelled occurrences.
const CANCELLED_PREFIX: &str = "canceled:";

/// Stable identifier of an event occurrence, carried across fetches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(String);

impl EventId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single calendar entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    id: EventId,
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    title: String,
    category: String,
    colour: Rgb,
    all_day: bool,
}

impl Event {
    /// Build an event, rejecting `end < start`.
    pub fn new(
        id: EventId,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
        title: impl Into<String>,
        all_day: bool,
    ) -> Result<Self, EventError> {
        if end.is_some_and(|end| end < start) {
            return Err(EventError::EndBeforeStart(id));
        }
        Ok(Self {
            id,
            start,
            end,
            title: title.into(),
            category: String::new(),
            colour: (255, 255, 255),
            all_day,
        })
    }

    /// Convenience for a timed event with both bounds.
    pub fn timed(
        id: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        title: impl Into<String>,
    ) -> Result<Self, EventError> {
        Self::new(EventId::new(id), start, Some(end), title, false)
    }

    /// Convenience for an all-day event starting at `start`.
    pub fn all_day(
        id: impl Into<String>,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
        title: impl Into<String>,
    ) -> Result<Self, EventError> {
        Self::new(EventId::new(id), start, end, title, true)
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_colour(mut self, colour: Rgb) -> Self {
        self.colour = colour;
        self
    }

    pub fn id(&self) -> &EventId {
        &self.id
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.end
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn colour(&self) -> Rgb {
        self.colour
    }

    pub fn is_all_day(&self) -> bool {
        self.all_day
    }

    /// True for timed (non-all-day) events.
    pub fn is_timed(&self) -> bool {
        !self.all_day
    }

    /// All-day entry spanning more than one day.
    pub fn is_multi_day(&self) -> bool {
        self.all_day && self.effective_end() - self.start > Duration::days(1)
    }

    /// Cancelled occurrences stay in the list but never drive state.
    pub fn is_cancelled(&self) -> bool {
        self.title
            .get(..CANCELLED_PREFIX.len())
            .is_some_and(|p| p.eq_ignore_ascii_case(CANCELLED_PREFIX))
    }

    /// End used for span checks. All-day events without an end last one
    /// day; timed events without an end are instantaneous.
    pub fn effective_end(&self) -> DateTime<Utc> {
        match self.end {
            Some(end) => end,
            None if self.all_day => self
                .start
                .checked_add_signed(Duration::days(1))
                .unwrap_or(self.start),
            None => self.start,
        }
    }

    /// Whether `now` lies in `[start, effective_end)`.
    pub fn spans(&self, now: DateTime<Utc>) -> bool {
        self.start <= now && now < self.effective_end()
    }

    /// Whether the event has finished by `now`.
    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        self.effective_end() <= now
    }
}

/// Whether a snapshot is still within its freshness threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale,
}

/// Ordered set of events plus the time they were fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarSnapshot {
    events: Vec<Event>,
    fetched_at: DateTime<Utc>,
}

impl CalendarSnapshot {
    /// Build a snapshot, sorting events by start ascending.
    ///
    /// Rejects duplicate ids: alert records are keyed by id, so two
    /// occurrences sharing one would share a single alert.
    pub fn new(mut events: Vec<Event>, fetched_at: DateTime<Utc>) -> Result<Self, EventError> {
        // Deserialised events skip `Event::new`, so check the bound again.
        if let Some(bad) = events.iter().find(|e| e.end.is_some_and(|end| end < e.start)) {
            return Err(EventError::EndBeforeStart(bad.id.clone()));
        }
        events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));

        let mut seen: Vec<&EventId> = events.iter().map(|e| &e.id).collect();
        seen.sort();
        if let Some(pair) = seen.windows(2).find(|w| w[0] == w[1]) {
            return Err(EventError::DuplicateId(pair[0].clone()));
        }

        Ok(Self { events, fetched_at })
    }

    /// Snapshot with no events (initial state before the first fetch).
    pub fn empty(fetched_at: DateTime<Utc>) -> Self {
        Self {
            events: Vec::new(),
            fetched_at,
        }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn get(&self, id: &EventId) -> Option<&Event> {
        self.events.iter().find(|e| &e.id == id)
    }

    pub fn contains(&self, id: &EventId) -> bool {
        self.get(id).is_some()
    }

    /// Fresh until its age exceeds `stale_after`.
    pub fn freshness(&self, now: DateTime<Utc>, stale_after: Duration) -> Freshness {
        if now - self.fetched_at > stale_after {
            Freshness::Stale
        } else {
            Freshness::Fresh
        }
    }
}
