//! embedded-hal drivers for the output ports.
//!
//! Generic over `embedded-hal` 1.0 traits so any HAL (ESP-IDF, rp2040,
//! a host mock) can supply the pins.
//!
//! | Adapter        | Implements     | Pins                      |
//! |----------------|----------------|---------------------------|
//! | `PwmBacklight` | BacklightPort  | one PWM channel           |
//! | `PwmRgbLed`    | LedPort        | three PWM channels        |
//! | `GpioBuzzer`   | BuzzerPort     | one push-pull output      |
//!
//! Pin errors are logged and otherwise ignored: a stuck LED must never
//! stop the tick loop.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;
use log::warn;

use crate::app::ports::{BacklightPort, BuzzerPort, LedPort};
use crate::config::MAX_BUZZ_STEPS;
use crate::indicator::Rgb;
use crate::power::BacklightLevel;

// ── Backlight ─────────────────────────────────────────────────

pub struct PwmBacklight<P> {
    pwm: P,
    level: Option<BacklightLevel>,
}

impl<P: SetDutyCycle> PwmBacklight<P> {
    pub fn new(pwm: P) -> Self {
        Self { pwm, level: None }
    }

    pub fn level(&self) -> Option<BacklightLevel> {
        self.level
    }
}

impl<P: SetDutyCycle> BacklightPort for PwmBacklight<P> {
    fn set_backlight(&mut self, level: BacklightLevel) {
        if self.level == Some(level) {
            return;
        }
        match self.pwm.set_duty_cycle_percent(level.duty_percent()) {
            Ok(()) => self.level = Some(level),
            Err(e) => warn!("Backlight: PWM write failed: {e:?}"),
        }
    }
}

// ── RGB LED ───────────────────────────────────────────────────

pub struct PwmRgbLed<R, G, B> {
    red: R,
    green: G,
    blue: B,
    current: Option<Rgb>,
}

impl<R: SetDutyCycle, G: SetDutyCycle, B: SetDutyCycle> PwmRgbLed<R, G, B> {
    pub fn new(red: R, green: G, blue: B) -> Self {
        Self {
            red,
            green,
            blue,
            current: None,
        }
    }

    pub fn current_colour(&self) -> Option<Rgb> {
        self.current
    }
}

impl<R: SetDutyCycle, G: SetDutyCycle, B: SetDutyCycle> LedPort for PwmRgbLed<R, G, B> {
    fn set_led(&mut self, rgb: Rgb) {
        if self.current == Some(rgb) {
            return;
        }
        let (r, g, b) = rgb;
        let ok = self.red.set_duty_cycle_fraction(u16::from(r), 255).is_ok()
            & self.green.set_duty_cycle_fraction(u16::from(g), 255).is_ok()
            & self.blue.set_duty_cycle_fraction(u16::from(b), 255).is_ok();
        if ok {
            self.current = Some(rgb);
        } else {
            warn!("LED: PWM write failed for {rgb:?}");
        }
    }
}

// ── Buzzer ────────────────────────────────────────────────────

/// Non-blocking buzzer: `play` queues a pattern, `poll` steps through it.
pub struct GpioBuzzer<P> {
    pin: P,
    pattern: heapless::Vec<u16, MAX_BUZZ_STEPS>,
    step: usize,
    step_started_ms: Option<u64>,
}

impl<P: OutputPin> GpioBuzzer<P> {
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            pattern: heapless::Vec::new(),
            step: 0,
            step_started_ms: None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.step < self.pattern.len()
    }

    /// Advance the pattern. Call once per tick.
    pub fn poll(&mut self, now_ms: u64) {
        if !self.is_playing() {
            return;
        }
        let started = *self.step_started_ms.get_or_insert(now_ms);
        if now_ms.saturating_sub(started) < u64::from(self.pattern[self.step]) {
            return;
        }
        self.step += 1;
        self.step_started_ms = Some(now_ms);
        // Even steps sound, odd steps are gaps.
        let on = self.is_playing() && self.step % 2 == 0;
        self.drive(on);
    }

    fn drive(&mut self, on: bool) {
        let result = if on { self.pin.set_high() } else { self.pin.set_low() };
        if let Err(e) = result {
            warn!("Buzzer: GPIO write failed: {e:?}");
        }
    }
}

impl<P: OutputPin> BuzzerPort for GpioBuzzer<P> {
    fn play(&mut self, pattern_ms: &[u16]) {
        self.pattern.clear();
        for &ms in pattern_ms.iter().take(MAX_BUZZ_STEPS) {
            let _ = self.pattern.push(ms);
        }
        self.step = 0;
        self.step_started_ms = None;
        let on = self.is_playing();
        self.drive(on);
    }
}
