//! Wake-resume through storage: no duplicate alerts, navigation kept.

use agendalight::adapters::memory::MemoryStorage;
use agendalight::alerts::{AlertOutcome, AlertRecord};
use agendalight::app::commands::AppCommand;
use agendalight::app::events::AppEvent;
use agendalight::app::ports::{ClockPort, StoragePort};
use agendalight::calendar::{Event, EventId};
use agendalight::error::ResumeError;
use agendalight::navigation::Theme;
use agendalight::resume::{ResumeState, ResumeStore};

use crate::mock_hw::{Rig, at, tomorrow_meetings, utc_config};

const MIN: u64 = 60 * 1000;

fn review() -> Event {
    Event::timed("review", at(12, 30), at(13, 0), "Design review").unwrap()
}

#[test]
fn fired_alert_is_not_repeated_after_restart() {
    let mut storage = MemoryStorage::new();

    let mut before = Rig::new(utc_config(), at(12, 10));
    before.load(vec![review()]);
    before.run(6, MIN);
    assert_eq!(before.panel.buzzes(), 1);
    before.app.save(&mut storage).unwrap();

    // Restart two minutes later with the same agenda.
    let mut after = Rig::new(utc_config(), at(12, 18));
    assert!(after.app.restore(&storage, after.clock.now()).unwrap());
    after.load(vec![review()]);
    after.run(10, MIN);

    assert_eq!(after.panel.buzzes(), 0);
    assert_eq!(after.sink.count(|e| matches!(e, AppEvent::AlertFired { .. })), 0);
}

#[test]
fn restart_without_saved_state_alerts_normally() {
    let storage = MemoryStorage::new();
    let mut rig = Rig::new(utc_config(), at(12, 18));
    assert!(!rig.app.restore(&storage, rig.clock.now()).unwrap());
    rig.load(vec![review()]);
    assert_eq!(rig.panel.buzzes(), 1);
}

#[test]
fn page_and_theme_survive_restart() {
    let mut storage = MemoryStorage::new();

    let mut before = Rig::new(utc_config(), at(12, 0));
    before.load(tomorrow_meetings(20));
    let t = before.uptime();
    for cmd in [AppCommand::NextPage, AppCommand::NextPage, AppCommand::ToggleTheme] {
        before.app.handle_command(cmd, t, &mut before.cal, &mut before.sink);
    }
    before.app.save(&mut storage).unwrap();

    let mut after = Rig::new(utc_config(), at(12, 5));
    after.app.restore(&storage, after.clock.now()).unwrap();
    let batch = after.load(tomorrow_meetings(20));

    assert_eq!(batch.view.page, 2);
    assert_eq!(batch.view.theme, Theme::Light);
}

#[test]
fn restored_page_is_clamped_to_shorter_agenda() {
    let mut storage = MemoryStorage::new();
    ResumeStore::save(&mut storage, &ResumeState::new(Vec::new(), 2, Theme::Dark)).unwrap();

    let mut rig = Rig::new(utc_config(), at(12, 0));
    rig.app.restore(&storage, rig.clock.now()).unwrap();

    // Nothing fetched yet: the view stays inside the single empty page.
    let view = rig.app.view_state();
    assert_eq!((view.page, view.page_count), (0, 1));
    assert_eq!(rig.tick().view.page, 0);

    let batch = rig.load(tomorrow_meetings(3));
    assert_eq!(batch.view.page, 0);
}

#[test]
fn records_expired_while_off_are_dropped() {
    let mut storage = MemoryStorage::new();
    let records = vec![
        AlertRecord {
            id: EventId::new("morning"),
            expires_at: at(9, 0),
            outcome: AlertOutcome::Fired,
        },
        AlertRecord {
            id: EventId::new("review"),
            expires_at: at(13, 0),
            outcome: AlertOutcome::Suppressed,
        },
    ];
    ResumeStore::save(&mut storage, &ResumeState::new(records, 0, Theme::Dark)).unwrap();

    let mut rig = Rig::new(utc_config(), at(12, 0));
    rig.app.restore(&storage, rig.clock.now()).unwrap();

    let ids: Vec<EventId> = rig.app.resume_state().records.into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![EventId::new("review")]);
}

#[test]
fn corrupted_blob_is_reported() {
    let mut storage = MemoryStorage::new();
    storage.write("resume", "state", &[0xff, 0xff, 0xff]).unwrap();

    let mut rig = Rig::new(utc_config(), at(12, 0));
    assert_eq!(
        rig.app.restore(&storage, rig.clock.now()),
        Err(ResumeError::Corrupted)
    );
}
