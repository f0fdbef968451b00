//! End-to-end tick scenarios: classification, indicator, alerts, power
//! and navigation running together against mock hardware.

use agendalight::app::events::AppEvent;
use agendalight::calendar::classifier::{EventState, Tier};
use agendalight::calendar::{Event, EventId};
use agendalight::fsm::PowerState;
use agendalight::indicator::{
    COLOUR_ALL_DAY, COLOUR_IMMINENT, COLOUR_IN_MEETING, COLOUR_OFF, LedPattern,
};
use agendalight::power::{BURN_IN_SEQUENCE, BacklightLevel};
use agendalight::render::{DirtyRegions, Region};

use crate::mock_hw::{HwCall, Rig, at, tomorrow_meetings, utc_config};

const SEC: u64 = 1000;
const MIN: u64 = 60 * SEC;

#[test]
fn all_day_event_shows_solid_and_dims() {
    let mut rig = Rig::new(utc_config(), at(12, 0));
    rig.load(vec![Event::all_day("offsite", at(0, 0), None, "Team offsite").unwrap()]);

    let batch = rig.run(40, SEC);

    assert_eq!(batch.event_state, EventState::AllDayActive(EventId::new("offsite")));
    assert_eq!(batch.led.pattern, LedPattern::Solid(COLOUR_ALL_DAY));
    assert_eq!(batch.led.rgb, COLOUR_ALL_DAY);
    assert_eq!(batch.power_state(), PowerState::Dimmed);
    assert_eq!(rig.panel.last_backlight(), Some(BacklightLevel::Dim));
    assert_eq!(rig.panel.buzzes(), 0);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::AlertFired { .. })), 0);
}

#[test]
fn tap_wakes_dimmed_display_in_same_tick() {
    let mut rig = Rig::new(utc_config(), at(12, 0));
    rig.load(Vec::new());
    assert_eq!(rig.run(31, SEC).power_state(), PowerState::Dimmed);

    rig.clock.advance_ms(SEC);
    let t = rig.uptime();
    rig.touch.tap(120, 200, t - 200);
    let batch = rig.tick();

    assert_eq!(batch.power_state(), PowerState::Active);
    assert_eq!(batch.power.backlight, BacklightLevel::Full);
    assert_eq!(
        rig.sink.events.last(),
        Some(&AppEvent::PowerChanged {
            from: PowerState::Dimmed,
            to: PowerState::Active,
        })
    );
}

#[test]
fn mid_screen_downward_swipe_wakes_dimmed_display() {
    let mut rig = Rig::new(utc_config(), at(12, 0));
    rig.load(Vec::new());
    assert_eq!(rig.run(31, SEC).power_state(), PowerState::Dimmed);
    let requests = rig.cal.requests.len();

    rig.clock.advance_ms(SEC);
    let t = rig.uptime();
    rig.touch.stroke((200, 300), (205, 450), t - 300);
    let batch = rig.tick();

    assert_eq!(batch.power_state(), PowerState::Active);
    assert_eq!(rig.panel.last_backlight(), Some(BacklightLevel::Full));
    // Not a pull-down: no refresh goes out.
    assert_eq!(rig.cal.requests.len(), requests);
    assert!(!batch.view.refreshing);

    // The idle timer restarted with the swipe.
    assert_eq!(rig.run(29, SEC).power_state(), PowerState::Active);
}

#[test]
fn in_meeting_outranks_imminent() {
    let mut rig = Rig::new(utc_config(), at(12, 0));
    let batch = rig.load(vec![
        Event::timed("now", at(11, 30), at(12, 30), "Planning").unwrap(),
        Event::timed("next", at(12, 10), at(12, 40), "Interview").unwrap(),
    ]);

    assert_eq!(batch.event_state, EventState::InMeeting(EventId::new("now")));
    // Urgent tiers skip hysteresis.
    assert_eq!(batch.led.rgb, COLOUR_IN_MEETING);
    // The meeting does not mute the upcoming event's reminder.
    assert_eq!(batch.alerts.len(), 1);
    assert_eq!(batch.alerts[0].id, EventId::new("next"));
    assert_eq!(batch.alerts[0].minutes_to_start, 10);
}

#[test]
fn alert_fires_exactly_once_across_lead_window() {
    let mut rig = Rig::new(utc_config(), at(12, 0));
    rig.load(vec![Event::timed("review", at(12, 30), at(13, 0), "Design review").unwrap()]);

    rig.run(40, MIN);

    assert_eq!(rig.panel.buzzes(), 1);
    assert!(rig.panel.calls.contains(&HwCall::Buzz(vec![200, 100, 200])));
    let fired: Vec<_> = rig
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::AlertFired {
                id,
                minutes_to_start,
                ..
            } => Some((id.clone(), *minutes_to_start)),
            _ => None,
        })
        .collect();
    assert_eq!(fired, vec![(EventId::new("review"), 15)]);
}

#[test]
fn quiet_hours_suppress_buzz_but_not_led() {
    let mut rig = Rig::new(utc_config(), at(22, 30));
    let batch = rig.load(vec![Event::timed("late", at(22, 40), at(23, 10), "Late call").unwrap()]);

    assert_eq!(batch.event_state.tier(), Tier::Imminent);
    assert_eq!(batch.led.pattern, LedPattern::Pulsing(COLOUR_IMMINENT));
    assert!(batch.alerts.is_empty());
    assert_eq!(rig.panel.buzzes(), 0);
    assert_eq!(
        rig.sink.count(|e| *e == AppEvent::AlertSuppressed(EventId::new("late"))),
        1
    );

    // Never retried while the event stays upcoming.
    rig.run(5, MIN);
    assert_eq!(rig.panel.buzzes(), 0);
}

#[test]
fn sleeps_overnight_shifts_and_wakes_without_navigating() {
    let mut rig = Rig::new(utc_config(), at(23, 30));
    rig.load(tomorrow_meetings(20));

    // Inside the sleep window the display stays lit until the inactivity
    // period has passed.
    assert_eq!(rig.run(59, MIN).power_state(), PowerState::Active);
    let batch = rig.run(1, MIN);
    assert_eq!(batch.power_state(), PowerState::Asleep);
    assert_eq!(batch.led.rgb, COLOUR_OFF);
    assert_eq!(rig.panel.last_backlight(), Some(BacklightLevel::Off));

    rig.run(10, MIN);
    assert_eq!(rig.panel.sleep_offsets(), BURN_IN_SEQUENCE.to_vec());
    assert_eq!(rig.app.power_state(), PowerState::Asleep);

    // A swipe only wakes the display.
    rig.clock.advance_ms(SEC);
    let t = rig.uptime();
    rig.touch.stroke((300, 200), (200, 205), t - 300);
    let batch = rig.tick();

    assert_eq!(batch.power_state(), PowerState::Active);
    assert_eq!(batch.view.page, 0);
    assert_eq!(batch.dirty, DirtyRegions::ALL);
    assert_eq!(rig.panel.calls.last(), Some(&HwCall::Render(DirtyRegions::ALL)));
    assert_eq!(rig.panel.last_backlight(), Some(BacklightLevel::Full));
}

#[test]
fn swipes_page_through_agenda() {
    let mut rig = Rig::new(utc_config(), at(12, 0));
    let batch = rig.load(tomorrow_meetings(20));
    assert_eq!(batch.view.page_count, 3);

    rig.clock.advance_ms(SEC);
    let t = rig.uptime();
    rig.touch.stroke((300, 200), (200, 205), t - 300);
    let batch = rig.tick();
    assert_eq!(batch.view.page, 1);
    assert!(batch.dirty.contains(Region::Events));
    assert!(batch.dirty.contains(Region::Pagination));
    assert!(!batch.dirty.contains(Region::Header));

    rig.clock.advance_ms(SEC);
    let t = rig.uptime();
    rig.touch.stroke((200, 200), (300, 205), t - 300);
    assert_eq!(rig.tick().view.page, 0);

    // Back past the first page wraps to the last.
    rig.clock.advance_ms(SEC);
    let t = rig.uptime();
    rig.touch.stroke((200, 200), (300, 205), t - 300);
    assert_eq!(rig.tick().view.page, 2);
}

#[test]
fn idle_ticks_render_nothing() {
    let mut rig = Rig::new(utc_config(), at(12, 0));
    rig.load(tomorrow_meetings(3));
    let renders_before = rig
        .panel
        .calls
        .iter()
        .filter(|c| matches!(c, HwCall::Render(_)))
        .count();

    rig.run(5, SEC);

    let renders_after = rig
        .panel
        .calls
        .iter()
        .filter(|c| matches!(c, HwCall::Render(_)))
        .count();
    assert_eq!(renders_before, renders_after);
}
