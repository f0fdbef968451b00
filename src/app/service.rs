//! Tick orchestrator, the hexagonal core.
//!
//! [`TickOrchestrator`] owns the snapshot and every controller. It
//! exposes a hardware-agnostic API; all I/O flows through port traits
//! injected at call sites, so the whole loop runs against mock adapters.
//!
//! ```text
//!  TouchPort ──────▶ ┌──────────────────────────────┐ ──▶ EventSink
//!  ClockPort ──────▶ │       TickOrchestrator       │
//!  CalendarSource ◀─▶│ gestures · power · indicator │ ──▶ IntentBatch
//!                    │ alerts · refresh · nav       │       │
//!                    └──────────────────────────────┘       ▼
//!                                LED · backlight · buzzer · renderer
//! ```
//!
//! ## Tick order
//!
//! 1. Drain touch samples into the gesture recogniser.
//! 2. Feed gestures to the power controller (wake, idle reset), then to
//!    navigation unless the touch only woke the display.
//! 3. Swap in a completed refresh; issue an automatic one when due.
//! 4. Classify the snapshot.
//! 5. Indicator and alerts consume the event state.
//! 6. Power controller finalises the tick.
//! 7. Return the combined [`IntentBatch`].

use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};

use crate::alerts::AlertScheduler;
use crate::calendar::classifier::{self, EventState};
use crate::calendar::{CalendarSnapshot, Freshness};
use crate::config::SystemConfig;
use crate::error::{Error, ResumeError};
use crate::fsm::PowerState;
use crate::gesture::{GestureEvent, GestureRecognizer};
use crate::indicator::{AmbientIndicatorController, LedIntent};
use crate::navigation::{NavAction, Navigator};
use crate::power::PowerController;
use crate::refresh::{Accepted, RefreshTracker};
use crate::render::{self, DirtyRegions};
use crate::resume::{ResumeState, ResumeStore};

use super::commands::AppCommand;
use super::events::AppEvent;
use super::intents::{IntentBatch, ViewState};
use super::ports::{
    BacklightPort, BuzzerPort, CalendarSource, ClockPort, EventSink, LedPort, RenderPort,
    StoragePort, TouchPort,
};

// ───────────────────────────────────────────────────────────────
// TickOrchestrator
// ───────────────────────────────────────────────────────────────

pub struct TickOrchestrator {
    config: SystemConfig,
    snapshot: CalendarSnapshot,
    freshness: Freshness,
    gestures: GestureRecognizer,
    indicator: AmbientIndicatorController,
    alerts: AlertScheduler,
    power: PowerController,
    refresh: RefreshTracker,
    nav: Navigator,
    /// Regions dirtied by commands between ticks.
    pending_dirty: DirtyRegions,
    tick_count: u64,
}

impl TickOrchestrator {
    /// Validate the configuration and build every component.
    ///
    /// The initial snapshot is empty and counts as fetched at `now`.
    pub fn new(config: SystemConfig, now: DateTime<Utc>) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            snapshot: CalendarSnapshot::empty(now),
            freshness: Freshness::Fresh,
            gestures: GestureRecognizer::new(config.gesture),
            indicator: AmbientIndicatorController::new(&config),
            alerts: AlertScheduler::new(&config),
            power: PowerController::new(&config),
            refresh: RefreshTracker::new(config.refresh_interval_secs),
            nav: Navigator::new(config.events_per_page),
            pending_dirty: DirtyRegions::ALL,
            tick_count: 0,
            config,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started(self.power.state()));
        info!("TickOrchestrator started in {:?}", self.power.state());
    }

    /// Restore alert records and navigation after a restart.
    /// Returns `Ok(false)` when no state was saved.
    pub fn restore(&mut self, storage: &dyn StoragePort, now: DateTime<Utc>) -> Result<bool, ResumeError> {
        let Some(mut state) = ResumeStore::load(storage)? else {
            return Ok(false);
        };
        state.prune(now);
        info!(
            "Resume: {} alert records, page {}",
            state.records.len(),
            state.page
        );
        self.alerts.restore(state.records);
        self.nav.restore(state.page, state.theme);
        Ok(true)
    }

    /// Persist alert records and navigation (call before deep sleep).
    pub fn save(&self, storage: &mut dyn StoragePort) -> Result<(), ResumeError> {
        ResumeStore::save(storage, &self.resume_state())
    }

    pub fn resume_state(&self) -> ResumeState {
        ResumeState::new(self.alerts.records().to_vec(), self.nav.page(), self.nav.theme())
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full tick and return the combined intents.
    pub fn tick(
        &mut self,
        clock: &impl ClockPort,
        touch: &mut impl TouchPort,
        source: &mut impl CalendarSource,
        sink: &mut impl EventSink,
    ) -> IntentBatch {
        self.tick_count += 1;
        let now = clock.now();
        let now_ms = clock.uptime_ms();
        let local_hour = self.config.local_hour(now);
        let prev_power = self.power.state();
        let prev_tier = self.indicator.committed_tier();
        let mut dirty = core::mem::take(&mut self.pending_dirty);

        // 1. Touch → gestures
        let samples = touch.poll_samples();
        let gestures = self.gestures.feed_all(&samples);

        // 2. Gestures → power (wake first), then navigation
        let woke_from = self.power.observe_gestures(&gestures, now_ms);
        if woke_from == Some(PowerState::Asleep) {
            debug!("Tick: touch only woke the display");
        } else {
            for gesture in &gestures {
                dirty.merge(self.navigate(*gesture, now_ms, source, sink));
            }
        }

        // 3. Refresh completion → atomic snapshot swap
        dirty.merge(self.poll_refresh(now, source, sink));
        let interval = self.refresh.interval_for(&self.snapshot, now, local_hour);
        if self.refresh.is_due(now_ms, interval) {
            let generation = self.refresh.request(now_ms);
            source.request_fetch(generation);
            sink.emit(&AppEvent::RefreshRequested {
                generation,
                manual: false,
            });
        }
        let freshness = self
            .snapshot
            .freshness(now, Duration::seconds(i64::from(self.config.stale_after_secs)));
        if freshness != self.freshness {
            info!("Tick: snapshot now {freshness:?}");
            self.freshness = freshness;
            dirty.merge(render::ON_STATUS);
            sink.emit(&AppEvent::FreshnessChanged(freshness));
        }

        // 4. Classify
        let event_state = classifier::classify(&self.snapshot, now);

        // 5. Indicator + alerts
        let mut led = self.indicator.update(&event_state);
        let tier = self.indicator.committed_tier();
        if tier != prev_tier {
            dirty.merge(render::ON_TIER_CHANGE);
            sink.emit(&AppEvent::TierChanged {
                from: prev_tier,
                to: tier,
            });
        }

        let pass = self.alerts.evaluate(&self.snapshot, now, local_hour);
        for alert in &pass.fired {
            sink.emit(&AppEvent::AlertFired {
                id: alert.id.clone(),
                title: alert.title.clone(),
                minutes_to_start: alert.minutes_to_start,
            });
        }
        for id in &pass.suppressed {
            sink.emit(&AppEvent::AlertSuppressed(id.clone()));
        }

        // 6. Power finalisation
        let in_sleep_hours = self.config.sleep_hours.contains(local_hour);
        let power = self.power.finalize(event_state.tier(), in_sleep_hours, now_ms);
        if power.state != prev_power {
            sink.emit(&AppEvent::PowerChanged {
                from: prev_power,
                to: power.state,
            });
            if prev_power == PowerState::Asleep {
                dirty.merge(render::ON_FULL_REDRAW);
            }
        }
        if power.state == PowerState::Asleep {
            led = LedIntent::OFF;
        }

        // 7. Combined batch
        IntentBatch {
            event_state,
            led,
            power,
            alerts: pass.fired,
            dirty,
            view: self.view_state(),
        }
    }

    /// Push a batch out through the output ports.
    pub fn apply(
        &self,
        batch: &IntentBatch,
        hw: &mut (impl LedPort + BacklightPort + BuzzerPort + RenderPort),
    ) {
        hw.set_led(batch.led.rgb);
        hw.set_backlight(batch.power.backlight);
        for alert in &batch.alerts {
            hw.play(&alert.pattern_ms);
        }

        if batch.power.state == PowerState::Asleep {
            if let Some(offset) = batch.power.shift {
                hw.draw_sleep(offset);
            }
        } else if !batch.dirty.is_empty() {
            hw.render(batch.dirty, &batch.view);
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command. Redraws are folded into the next tick.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        now_ms: u64,
        source: &mut impl CalendarSource,
        sink: &mut impl EventSink,
    ) {
        let gesture = match cmd {
            AppCommand::RequestRefresh => GestureEvent::PullDown,
            AppCommand::NextPage => GestureEvent::SwipeLeft,
            AppCommand::PreviousPage => GestureEvent::SwipeRight,
            AppCommand::ToggleTheme => GestureEvent::SwipeUp,
        };
        let dirty = self.navigate(gesture, now_ms, source, sink);
        self.pending_dirty.merge(dirty);
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn snapshot(&self) -> &CalendarSnapshot {
        &self.snapshot
    }

    pub fn power_state(&self) -> PowerState {
        self.power.state()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    pub fn view_state(&self) -> ViewState {
        ViewState {
            page: self.nav.visible_page(self.snapshot.len()),
            page_count: self.nav.page_count(self.snapshot.len()),
            theme: self.nav.theme(),
            freshness: self.freshness,
            network: self.refresh.status(),
            refreshing: self.refresh.is_in_flight(),
        }
    }

    /// Current classification without advancing any state.
    pub fn classify_now(&self, now: DateTime<Utc>) -> EventState {
        classifier::classify(&self.snapshot, now)
    }

    // ── Internal ──────────────────────────────────────────────

    fn navigate(
        &mut self,
        gesture: GestureEvent,
        now_ms: u64,
        source: &mut impl CalendarSource,
        sink: &mut impl EventSink,
    ) -> DirtyRegions {
        match self.nav.apply(gesture, self.snapshot.len()) {
            NavAction::PageChanged { page } => {
                debug!("Tick: page {page}");
                render::ON_PAGE_CHANGE
            }
            NavAction::ThemeChanged(_) => render::ON_FULL_REDRAW,
            NavAction::RefreshRequested => {
                let generation = self.refresh.request(now_ms);
                source.request_fetch(generation);
                sink.emit(&AppEvent::RefreshRequested {
                    generation,
                    manual: true,
                });
                render::ON_REFRESH_START
            }
            NavAction::None => DirtyRegions::NONE,
        }
    }

    fn poll_refresh(
        &mut self,
        now: DateTime<Utc>,
        source: &mut impl CalendarSource,
        sink: &mut impl EventSink,
    ) -> DirtyRegions {
        let mut dirty = DirtyRegions::NONE;
        while let Some(report) = source.poll_fetch() {
            let was_online = self.refresh.status().is_online();
            match self.refresh.accept(report, now) {
                Accepted::Apply(snapshot) => {
                    self.snapshot = snapshot;
                    self.alerts.retain_present(&self.snapshot);
                    self.nav.clamp(self.snapshot.len());
                    dirty.merge(render::ON_SNAPSHOT);
                    if !was_online {
                        dirty.merge(render::ON_STATUS);
                    }
                    sink.emit(&AppEvent::SnapshotApplied {
                        events: self.snapshot.len(),
                    });
                }
                Accepted::Failed(error) => {
                    dirty.merge(render::ON_STATUS);
                    sink.emit(&AppEvent::FetchFailed {
                        error,
                        consecutive: self.refresh.status().consecutive_failures,
                    });
                }
                Accepted::Stale { generation } => {
                    warn!("Tick: discarded result of superseded request {generation}");
                    sink.emit(&AppEvent::StaleResultDiscarded { generation });
                }
            }
        }
        dirty
    }
}
