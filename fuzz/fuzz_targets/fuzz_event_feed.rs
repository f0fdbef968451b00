//! Fuzz target: event feed to classification
//!
//! Parses the input as a JSON event list, builds a snapshot and runs the
//! classifier and alert scheduler over it. Checks that:
//! - No panics on malformed feeds
//! - Accepted snapshots are sorted by start
//! - Classification is stable for a fixed instant
//!
//! cargo fuzz run fuzz_event_feed

#![no_main]

use agendalight::alerts::AlertScheduler;
use agendalight::calendar::classifier::classify;
use agendalight::calendar::{CalendarSnapshot, Event};
use agendalight::config::SystemConfig;
use chrono::{TimeZone, Utc};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(events) = serde_json::from_slice::<Vec<Event>>(data) else {
        return;
    };
    let now = Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap();
    let Ok(snapshot) = CalendarSnapshot::new(events, now) else {
        return;
    };

    assert!(
        snapshot.events().windows(2).all(|w| w[0].start() <= w[1].start()),
        "snapshot not sorted by start"
    );

    let state = classify(&snapshot, now);
    assert_eq!(state, classify(&snapshot, now));

    let mut alerts = AlertScheduler::new(&SystemConfig::default());
    alerts.evaluate(&snapshot, now, 12);
    let second = alerts.evaluate(&snapshot, now, 12);
    assert!(second.fired.is_empty(), "alert fired twice");
});
