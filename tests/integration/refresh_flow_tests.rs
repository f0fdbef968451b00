//! Background refresh: supersession, failures, staleness and cadence.

use std::thread;
use std::time::Duration as StdDuration;

use agendalight::adapters::fetch_worker::{FetchWorker, Fetcher};
use agendalight::adapters::memory::InMemoryCalendar;
use agendalight::app::commands::AppCommand;
use agendalight::app::events::AppEvent;
use agendalight::app::ports::ClockPort;
use agendalight::app::service::TickOrchestrator;
use agendalight::calendar::{CalendarSnapshot, Event, EventId, Freshness};
use agendalight::error::FetchError;
use agendalight::render::Region;
use chrono::{Duration, Utc};

use crate::mock_hw::{
    MockClock, MockPanel, MockTouch, RecordingSink, Rig, at, tomorrow_meetings, utc_config,
};

const SEC: u64 = 1000;
const MIN: u64 = 60 * SEC;

fn snapshot(rig: &Rig, events: Vec<Event>) -> CalendarSnapshot {
    CalendarSnapshot::new(events, rig.clock.now()).unwrap()
}

fn request_refresh(rig: &mut Rig) {
    let t = rig.uptime();
    rig.app
        .handle_command(AppCommand::RequestRefresh, t, &mut rig.cal, &mut rig.sink);
}

fn pull_down(rig: &mut Rig) {
    rig.clock.advance_ms(SEC);
    let t = rig.uptime();
    rig.touch.stroke((200, 40), (205, 160), t - 300);
}

#[test]
fn pull_down_supersedes_in_flight_fetch() {
    let mut rig = Rig::new(utc_config(), at(12, 0));
    rig.tick();
    assert_eq!(rig.cal.requests, vec![1]);

    pull_down(&mut rig);
    let batch = rig.tick();
    assert_eq!(rig.cal.requests, vec![1, 2]);
    assert!(batch.view.refreshing);
    assert!(batch.dirty.contains(Region::Refresh));
    assert_eq!(
        rig.sink.count(|e| *e == AppEvent::RefreshRequested {
            generation: 2,
            manual: true
        }),
        1
    );

    // The slow first fetch lands before the second.
    let old = snapshot(&rig, tomorrow_meetings(1));
    let new = snapshot(&rig, tomorrow_meetings(4));
    rig.cal.complete(1, Ok(old));
    rig.cal.complete(2, Ok(new));
    rig.clock.advance_ms(SEC);
    let batch = rig.tick();

    assert_eq!(rig.app.snapshot().len(), 4);
    assert!(!batch.view.refreshing);
    assert_eq!(
        rig.sink.count(|e| *e == AppEvent::StaleResultDiscarded { generation: 1 }),
        1
    );
    assert_eq!(
        rig.sink.count(|e| *e == AppEvent::SnapshotApplied { events: 4 }),
        1
    );
}

#[test]
fn late_superseded_result_cannot_overwrite_newer() {
    let mut rig = Rig::new(utc_config(), at(12, 0));
    rig.tick();
    request_refresh(&mut rig);

    let newer = snapshot(&rig, tomorrow_meetings(4));
    rig.cal.complete(2, Ok(newer));
    rig.clock.advance_ms(SEC);
    rig.tick();
    assert_eq!(rig.app.snapshot().len(), 4);

    let older = snapshot(&rig, tomorrow_meetings(1));
    rig.cal.complete(1, Ok(older));
    rig.clock.advance_ms(SEC);
    rig.tick();
    assert_eq!(rig.app.snapshot().len(), 4);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::StaleResultDiscarded { generation: 1 })),
        1
    );
}

#[test]
fn failed_fetch_keeps_snapshot_and_counts_failures() {
    let mut rig = Rig::new(utc_config(), at(12, 0));
    rig.load(tomorrow_meetings(3));

    for attempt in 1..=2u32 {
        request_refresh(&mut rig);
        rig.cal.fail(FetchError::Offline);
        rig.clock.advance_ms(SEC);
        let batch = rig.tick();

        assert_eq!(rig.app.snapshot().len(), 3);
        assert!(batch.dirty.contains(Region::Status));
        assert!(batch.dirty.contains(Region::Refresh));
        assert_eq!(batch.view.network.consecutive_failures, attempt);
        assert!(!batch.view.network.is_online());
        assert_eq!(
            rig.sink.events.iter().rev().find(|e| matches!(e, AppEvent::FetchFailed { .. })),
            Some(&AppEvent::FetchFailed {
                error: FetchError::Offline,
                consecutive: attempt,
            })
        );
    }

    request_refresh(&mut rig);
    let recovered = snapshot(&rig, tomorrow_meetings(5));
    rig.cal.deliver(recovered);
    rig.clock.advance_ms(SEC);
    let batch = rig.tick();
    assert!(batch.view.network.is_online());
    assert!(batch.dirty.contains(Region::Status));
    assert_eq!(batch.view.network.last_success, Some(rig.clock.now()));
    assert_eq!(rig.app.snapshot().len(), 5);
}

#[test]
fn snapshot_goes_stale_then_fresh_again() {
    let mut rig = Rig::new(utc_config(), at(12, 0));
    rig.load(tomorrow_meetings(2));

    // Automatic refreshes go out every 15 min but none completes. Each
    // unanswered request is given up after a full interval and re-issued.
    rig.run(15, MIN);
    assert_eq!(rig.cal.requests, vec![1, 2]);
    rig.run(14, MIN);
    assert_eq!(rig.cal.requests, vec![1, 2]);
    rig.run(1, MIN);
    assert_eq!(rig.cal.requests, vec![1, 2, 3]);
    assert_eq!(
        rig.sink.count(|e| *e == AppEvent::RefreshRequested {
            generation: 3,
            manual: false
        }),
        1
    );

    assert!(!rig.run(30, MIN).is_stale());
    let batch = rig.run(1, MIN);
    assert!(batch.is_stale());
    assert!(batch.dirty.contains(Region::Status));
    assert_eq!(
        rig.sink.count(|e| *e == AppEvent::FreshnessChanged(Freshness::Stale)),
        1
    );
    assert_eq!(rig.cal.requests, vec![1, 2, 3, 4, 5]);

    // A late answer to a given-up request is discarded; the retry lands.
    let late = snapshot(&rig, tomorrow_meetings(1));
    rig.cal.complete(2, Ok(late));
    let fresh = snapshot(&rig, tomorrow_meetings(2));
    rig.cal.deliver(fresh);
    rig.clock.advance_ms(SEC);
    let batch = rig.tick();
    assert!(!batch.is_stale());
    assert_eq!(rig.app.snapshot().len(), 2);
    assert_eq!(
        rig.sink.count(|e| *e == AppEvent::StaleResultDiscarded { generation: 2 }),
        1
    );
    assert_eq!(
        rig.sink.events.iter().rev().find(|e| matches!(e, AppEvent::FreshnessChanged(_))),
        Some(&AppEvent::FreshnessChanged(Freshness::Fresh))
    );
}

#[test]
fn imminent_meeting_halves_refresh_cadence() {
    let mut rig = Rig::new(utc_config(), at(12, 0));
    rig.load(vec![Event::timed("sync", at(12, 20), at(12, 50), "Sync").unwrap()]);

    rig.run(44, 10 * SEC);
    assert_eq!(rig.cal.requests, vec![1]);
    rig.run(1, 10 * SEC);
    assert_eq!(rig.cal.requests, vec![1, 2]);
    assert_eq!(
        rig.sink.count(|e| *e == AppEvent::RefreshRequested {
            generation: 2,
            manual: false
        }),
        1
    );
}

#[test]
fn quiet_daytime_uses_base_cadence() {
    let mut rig = Rig::new(utc_config(), at(12, 0));
    rig.load(tomorrow_meetings(2));

    rig.run(89, 10 * SEC);
    assert_eq!(rig.cal.requests, vec![1]);
    rig.run(1, 10 * SEC);
    assert_eq!(rig.cal.requests, vec![1, 2]);
}

#[test]
fn fetch_worker_delivers_into_tick_loop() {
    let start = at(12, 0);
    let events = vec![
        Event::timed("a", start + Duration::hours(2), start + Duration::hours(3), "A").unwrap(),
        Event::timed("b", start + Duration::hours(4), start + Duration::hours(5), "B").unwrap(),
    ];
    let mut source = FetchWorker::spawn(InMemoryCalendar::new(events)).unwrap();
    let clock = MockClock::new(start);
    let mut touch = MockTouch::new();
    let mut panel = MockPanel::new();
    let mut sink = RecordingSink::new();
    let mut app = TickOrchestrator::new(utc_config(), start).unwrap();

    for _ in 0..200 {
        clock.advance_ms(10);
        let batch = app.tick(&clock, &mut touch, &mut source, &mut sink);
        app.apply(&batch, &mut panel);
        if !app.snapshot().is_empty() {
            break;
        }
        thread::sleep(StdDuration::from_millis(10));
    }

    assert_eq!(app.snapshot().len(), 2);
    assert!(app.snapshot().contains(&EventId::new("b")));
    assert_eq!(sink.count(|e| matches!(e, AppEvent::SnapshotApplied { events: 2 })), 1);
}

/// Blocks for a while on every fetch, like a slow network.
struct SlowCalendar(Vec<Event>);

impl Fetcher for SlowCalendar {
    fn fetch(&mut self) -> Result<CalendarSnapshot, FetchError> {
        thread::sleep(StdDuration::from_millis(100));
        CalendarSnapshot::new(self.0.clone(), Utc::now()).map_err(|_| FetchError::Parse)
    }
}

#[test]
fn manual_refresh_burst_through_worker_settles_on_newest() {
    let start = at(12, 0);
    let mut source = FetchWorker::spawn(SlowCalendar(tomorrow_meetings(2))).unwrap();
    let clock = MockClock::new(start);
    let mut touch = MockTouch::new();
    let mut panel = MockPanel::new();
    let mut sink = RecordingSink::new();
    let mut app = TickOrchestrator::new(utc_config(), start).unwrap();

    clock.advance_ms(10);
    let batch = app.tick(&clock, &mut touch, &mut source, &mut sink);
    app.apply(&batch, &mut panel);
    // Far more superseding requests than any queue between the two sides.
    for _ in 0..6 {
        clock.advance_ms(10);
        app.handle_command(AppCommand::RequestRefresh, clock.uptime_ms(), &mut source, &mut sink);
    }

    let mut refreshing = true;
    for _ in 0..300 {
        clock.advance_ms(10);
        let batch = app.tick(&clock, &mut touch, &mut source, &mut sink);
        app.apply(&batch, &mut panel);
        refreshing = batch.view.refreshing;
        if !refreshing {
            break;
        }
        thread::sleep(StdDuration::from_millis(10));
    }

    assert!(!refreshing);
    assert_eq!(app.snapshot().len(), 2);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::SnapshotApplied { .. })), 1);
    assert_eq!(
        sink.count(|e| *e == AppEvent::RefreshRequested {
            generation: 7,
            manual: true
        }),
        1
    );
}
