//! Console panel for the host simulator.
//!
//! [`ConsolePanel`] stands in for the LED, backlight, buzzer and display
//! and logs every change. [`ScriptedTouch`] replays touch samples once
//! their timestamp has passed.

use std::collections::VecDeque;

use log::{debug, info};

use crate::app::intents::ViewState;
use crate::app::ports::{
    BacklightPort, BuzzerPort, LedPort, MAX_SAMPLES_PER_TICK, RenderPort, TouchPort,
};
use crate::gesture::TouchSample;
use crate::indicator::Rgb;
use crate::power::{BacklightLevel, BurnInOffset};
use crate::render::DirtyRegions;

#[derive(Default)]
pub struct ConsolePanel {
    led: Option<Rgb>,
    backlight: Option<BacklightLevel>,
    pub frames: u64,
    pub alerts: u32,
}

impl ConsolePanel {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedPort for ConsolePanel {
    fn set_led(&mut self, rgb: Rgb) {
        if self.led != Some(rgb) {
            debug!("PANEL | led={rgb:?}");
            self.led = Some(rgb);
        }
    }
}

impl BacklightPort for ConsolePanel {
    fn set_backlight(&mut self, level: BacklightLevel) {
        if self.backlight != Some(level) {
            info!("PANEL | backlight={level:?} ({}%)", level.duty_percent());
            self.backlight = Some(level);
        }
    }
}

impl BuzzerPort for ConsolePanel {
    fn play(&mut self, pattern_ms: &[u16]) {
        self.alerts += 1;
        info!("PANEL | buzz {pattern_ms:?}");
    }
}

impl RenderPort for ConsolePanel {
    fn render(&mut self, dirty: DirtyRegions, view: &ViewState) {
        self.frames += 1;
        info!(
            "PANEL | redraw {} | page {}/{} {:?} {:?}",
            dirty,
            view.page + 1,
            view.page_count,
            view.theme,
            view.freshness
        );
    }

    fn draw_sleep(&mut self, offset: BurnInOffset) {
        self.frames += 1;
        info!("PANEL | sleep display at ({}, {})", offset.dx, offset.dy);
    }
}

/// Touch source replaying a fixed script against uptime.
pub struct ScriptedTouch {
    script: VecDeque<TouchSample>,
    uptime_ms: u64,
}

impl ScriptedTouch {
    pub fn new(script: impl IntoIterator<Item = TouchSample>) -> Self {
        let mut script: Vec<_> = script.into_iter().collect();
        script.sort_by_key(|s| s.timestamp_ms);
        Self {
            script: script.into(),
            uptime_ms: 0,
        }
    }

    /// Advance the replay clock; samples up to `uptime_ms` become due.
    pub fn advance_to(&mut self, uptime_ms: u64) {
        self.uptime_ms = uptime_ms;
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl TouchPort for ScriptedTouch {
    fn poll_samples(&mut self) -> heapless::Vec<TouchSample, MAX_SAMPLES_PER_TICK> {
        let mut out = heapless::Vec::new();
        while let Some(next) = self.script.front() {
            if next.timestamp_ms > self.uptime_ms || out.is_full() {
                break;
            }
            if let Some(sample) = self.script.pop_front() {
                let _ = out.push(sample);
            }
        }
        out
    }
}
