//! Mock adapters for integration tests.
//!
//! Records every output call and lets tests script the clock, the touch
//! panel and fetch completions without threads or real hardware.

use std::cell::Cell;
use std::collections::VecDeque;

use agendalight::app::events::AppEvent;
use agendalight::app::intents::ViewState;
use agendalight::app::ports::{
    BacklightPort, BuzzerPort, CalendarSource, ClockPort, EventSink, LedPort,
    MAX_SAMPLES_PER_TICK, RenderPort, TouchPort,
};
use agendalight::calendar::CalendarSnapshot;
use agendalight::error::FetchError;
use agendalight::gesture::TouchSample;
use agendalight::indicator::Rgb;
use agendalight::power::{BacklightLevel, BurnInOffset};
use agendalight::refresh::{FetchReport, Generation};
use agendalight::render::DirtyRegions;
use chrono::{DateTime, Duration, Utc};

// ── Clock ─────────────────────────────────────────────────────

/// Wall clock and uptime that only move when told to.
pub struct MockClock {
    now: Cell<DateTime<Utc>>,
    uptime_ms: Cell<u64>,
}

#[allow(dead_code)]
impl MockClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(now),
            uptime_ms: Cell::new(0),
        }
    }

    /// Move both clocks forward together.
    pub fn advance_ms(&self, ms: u64) {
        self.uptime_ms.set(self.uptime_ms.get() + ms);
        self.now.set(self.now.get() + Duration::milliseconds(ms as i64));
    }
}

impl ClockPort for MockClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }

    fn uptime_ms(&self) -> u64 {
        self.uptime_ms.get()
    }
}

// ── Touch ─────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockTouch {
    queue: VecDeque<TouchSample>,
}

#[allow(dead_code)]
impl MockTouch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a complete tap at uptime `t` (held 100 ms).
    pub fn tap(&mut self, x: u16, y: u16, t: u64) {
        self.queue.push_back(TouchSample::press(x, y, t));
        self.queue.push_back(TouchSample::release(x, y, t + 100));
    }

    /// Queue a straight stroke from `from` to `to` starting at `t`.
    pub fn stroke(&mut self, from: (u16, u16), to: (u16, u16), t: u64) {
        self.queue.push_back(TouchSample::press(from.0, from.1, t));
        self.queue.push_back(TouchSample::press(to.0, to.1, t + 100));
        self.queue.push_back(TouchSample::release(to.0, to.1, t + 200));
    }
}

impl TouchPort for MockTouch {
    fn poll_samples(&mut self) -> heapless::Vec<TouchSample, MAX_SAMPLES_PER_TICK> {
        let mut out = heapless::Vec::new();
        while !out.is_full() {
            match self.queue.pop_front() {
                Some(s) => {
                    let _ = out.push(s);
                }
                None => break,
            }
        }
        out
    }
}

// ── Calendar source ───────────────────────────────────────────

/// Records requests; reports are completed explicitly by the test.
#[derive(Default)]
pub struct MockCalendar {
    pub requests: Vec<Generation>,
    ready: VecDeque<FetchReport>,
}

#[allow(dead_code)]
impl MockCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest_request(&self) -> Option<Generation> {
        self.requests.last().copied()
    }

    pub fn complete(&mut self, generation: Generation, outcome: Result<CalendarSnapshot, FetchError>) {
        self.ready.push_back(FetchReport { generation, outcome });
    }

    /// Complete the newest request successfully.
    pub fn deliver(&mut self, snapshot: CalendarSnapshot) {
        let generation = self.latest_request().expect("no fetch was requested");
        self.complete(generation, Ok(snapshot));
    }

    /// Fail the newest request.
    pub fn fail(&mut self, error: FetchError) {
        let generation = self.latest_request().expect("no fetch was requested");
        self.complete(generation, Err(error));
    }
}

impl CalendarSource for MockCalendar {
    fn request_fetch(&mut self, generation: Generation) {
        self.requests.push(generation);
    }

    fn poll_fetch(&mut self) -> Option<FetchReport> {
        self.ready.pop_front()
    }
}

// ── Output panel ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum HwCall {
    Led(Rgb),
    Backlight(BacklightLevel),
    Buzz(Vec<u16>),
    Render(DirtyRegions),
    Sleep(BurnInOffset),
}

#[derive(Default)]
pub struct MockPanel {
    pub calls: Vec<HwCall>,
}

#[allow(dead_code)]
impl MockPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buzzes(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, HwCall::Buzz(_))).count()
    }

    pub fn sleep_offsets(&self) -> Vec<BurnInOffset> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HwCall::Sleep(o) => Some(*o),
                _ => None,
            })
            .collect()
    }

    pub fn last_backlight(&self) -> Option<BacklightLevel> {
        self.calls.iter().rev().find_map(|c| match c {
            HwCall::Backlight(l) => Some(*l),
            _ => None,
        })
    }
}

impl LedPort for MockPanel {
    fn set_led(&mut self, rgb: Rgb) {
        self.calls.push(HwCall::Led(rgb));
    }
}

impl BacklightPort for MockPanel {
    fn set_backlight(&mut self, level: BacklightLevel) {
        self.calls.push(HwCall::Backlight(level));
    }
}

impl BuzzerPort for MockPanel {
    fn play(&mut self, pattern_ms: &[u16]) {
        self.calls.push(HwCall::Buzz(pattern_ms.to_vec()));
    }
}

impl RenderPort for MockPanel {
    fn render(&mut self, dirty: DirtyRegions, _view: &ViewState) {
        self.calls.push(HwCall::Render(dirty));
    }

    fn draw_sleep(&mut self, offset: BurnInOffset) {
        self.calls.push(HwCall::Sleep(offset));
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Rig ───────────────────────────────────────────────────────

use agendalight::app::intents::IntentBatch;
use agendalight::app::service::TickOrchestrator;
use agendalight::calendar::Event;
use agendalight::config::SystemConfig;
use chrono::TimeZone;

/// Config with the display in UTC so wall-clock hours read directly.
pub fn utc_config() -> SystemConfig {
    SystemConfig {
        timezone: chrono_tz::UTC,
        ..SystemConfig::default()
    }
}

/// 2 June 2025 at `h:m` UTC.
pub fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, h, m, 0).unwrap()
}

/// `n` one-hour meetings tomorrow morning, far outside every window.
#[allow(dead_code)]
pub fn tomorrow_meetings(n: usize) -> Vec<Event> {
    (0..n)
        .map(|i| {
            let start = at(9, 0) + Duration::days(1) + Duration::minutes(i as i64 * 15);
            Event::timed(format!("t{i}"), start, start + Duration::hours(1), format!("Meeting {i}"))
                .unwrap()
        })
        .collect()
}

/// Orchestrator wired to every mock.
pub struct Rig {
    pub app: TickOrchestrator,
    pub clock: MockClock,
    pub touch: MockTouch,
    pub cal: MockCalendar,
    pub panel: MockPanel,
    pub sink: RecordingSink,
}

#[allow(dead_code)]
impl Rig {
    pub fn new(config: SystemConfig, now: DateTime<Utc>) -> Self {
        let mut sink = RecordingSink::new();
        let mut app = TickOrchestrator::new(config, now).unwrap();
        app.start(&mut sink);
        Self {
            app,
            clock: MockClock::new(now),
            touch: MockTouch::new(),
            cal: MockCalendar::new(),
            panel: MockPanel::new(),
            sink,
        }
    }

    /// Run one tick and push its intents to the panel.
    pub fn tick(&mut self) -> IntentBatch {
        let batch = self
            .app
            .tick(&self.clock, &mut self.touch, &mut self.cal, &mut self.sink);
        self.app.apply(&batch, &mut self.panel);
        batch
    }

    /// Advance `step_ms` and tick, `n` times; returns the last batch.
    pub fn run(&mut self, n: usize, step_ms: u64) -> IntentBatch {
        let mut last = None;
        for _ in 0..n {
            self.clock.advance_ms(step_ms);
            last = Some(self.tick());
        }
        last.expect("run needs at least one tick")
    }

    /// Complete the pending (or first) fetch with `events` and tick.
    pub fn load(&mut self, events: Vec<Event>) -> IntentBatch {
        if self.cal.latest_request().is_none() {
            self.tick();
        }
        let snapshot = agendalight::calendar::CalendarSnapshot::new(events, self.clock.now()).unwrap();
        self.cal.deliver(snapshot);
        self.tick()
    }

    pub fn uptime(&self) -> u64 {
        self.clock.uptime_ms()
    }
}
