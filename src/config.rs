//! System configuration parameters
//!
//! All tunable parameters for the controller core, supplied once at
//! startup as a static object. The core never parses raw config sources;
//! the simulator loads this struct from JSON and calls [`SystemConfig::validate`].

use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Maximum number of on/off steps in a buzz pattern.
pub const MAX_BUZZ_STEPS: usize = 8;

/// Time-of-day window in local hours.
///
/// `start_hour <= hour < end_hour` for daytime windows; wraps around
/// midnight when `start_hour > end_hour`. Equal bounds mean empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourWindow {
    /// Start hour (0-23 inclusive).  E.g. 23 = 11 PM.
    pub start_hour: u8,
    /// End hour (0-23, exclusive).  E.g. 7 = 7 AM.
    pub end_hour: u8,
}

impl HourWindow {
    pub const fn new(start_hour: u8, end_hour: u8) -> Self {
        Self {
            start_hour,
            end_hour,
        }
    }

    /// Check if the given hour falls inside the window.
    pub fn contains(&self, hour: u8) -> bool {
        if self.start_hour <= self.end_hour {
            // e.g., 9..17 (daytime window)
            hour >= self.start_hour && hour < self.end_hour
        } else {
            // e.g., 23..7 (overnight, wraps around midnight)
            hour >= self.start_hour || hour < self.end_hour
        }
    }

    fn is_valid(&self) -> bool {
        self.start_hour < 24 && self.end_hour < 24
    }
}

/// Touch gesture thresholds, in panel pixels and milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GestureConfig {
    /// Minimum horizontal travel for a swipe.
    pub swipe_threshold_px: u16,
    /// Minimum vertical travel for a pull-down or swipe-up.
    pub vertical_threshold_px: u16,
    /// A pull-down must start within this many pixels of the top edge.
    pub top_region_px: u16,
    /// Touches held longer than this are cancelled.
    pub max_gesture_ms: u32,
    /// Press/release shorter than this with no travel is contact noise.
    pub debounce_ms: u32,
    /// Refractory period before a second gesture of the same kind resolves.
    pub cooldown_ms: u32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            swipe_threshold_px: 25,
            vertical_threshold_px: 25,
            top_region_px: 120,
            max_gesture_ms: 2000,
            debounce_ms: 50,
            cooldown_ms: 400,
        }
    }
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Clock ---
    /// Time zone used for hour windows and day boundaries.
    pub timezone: Tz,
    /// Control loop period (milliseconds).
    pub tick_interval_ms: u32,

    // --- Alerts ---
    /// Audio alerts are suppressed inside this window.
    pub quiet_hours: HourWindow,
    /// Alert fires once the event start is at most this far away (seconds).
    pub alert_lead_secs: u32,
    /// Buzzer pattern, alternating on/off durations (milliseconds).
    pub buzz_pattern_ms: heapless::Vec<u16, MAX_BUZZ_STEPS>,

    // --- Indicator ---
    /// Full on/off period of the pulsing pattern (milliseconds).
    pub pulse_period_ms: u32,
    /// Consecutive observations needed to commit a non-urgent tier.
    pub hysteresis_ticks: u8,

    // --- Power ---
    /// Idle time before the backlight dims (seconds).
    pub dim_after_secs: u32,
    /// Display sleeps inside this window.
    pub sleep_hours: HourWindow,
    /// Idle time required before entering sleep (seconds).
    pub sleep_inactivity_secs: u32,
    /// Interval between burn-in shifts while asleep (seconds).
    pub burn_in_interval_secs: u32,
    /// Keep the display awake during sleep hours while an event is urgent.
    pub urgent_blocks_sleep: bool,

    // --- Calendar ---
    /// Base refresh interval (seconds).
    pub refresh_interval_secs: u32,
    /// Snapshot age after which it is reported stale (seconds).
    pub stale_after_secs: u32,
    /// Events shown per page.
    pub events_per_page: u8,

    // --- Touch ---
    pub gesture: GestureConfig,
}

impl Default for SystemConfig {
    fn default() -> Self {
        let mut buzz_pattern_ms = heapless::Vec::new();
        for step in [200u16, 100, 200] {
            let _ = buzz_pattern_ms.push(step);
        }

        Self {
            // Clock
            timezone: chrono_tz::America::Los_Angeles,
            tick_interval_ms: 50, // 20 Hz

            // Alerts
            quiet_hours: HourWindow::new(22, 7),
            alert_lead_secs: 15 * 60,
            buzz_pattern_ms,

            // Indicator
            pulse_period_ms: 1000,
            hysteresis_ticks: 2,

            // Power
            dim_after_secs: 30,
            sleep_hours: HourWindow::new(23, 6),
            sleep_inactivity_secs: 60 * 60,
            burn_in_interval_secs: 180,
            urgent_blocks_sleep: false,

            // Calendar
            refresh_interval_secs: 900, // 15 min
            stale_after_secs: 3600,
            events_per_page: 8,

            gesture: GestureConfig::default(),
        }
    }
}

impl SystemConfig {
    /// Reject invalid values. Called once at startup, never per tick.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("tick_interval_ms must be > 0"));
        }
        if !self.quiet_hours.is_valid() {
            return Err(ConfigError::ValidationFailed("quiet_hours must be 0-23"));
        }
        if !self.sleep_hours.is_valid() {
            return Err(ConfigError::ValidationFailed("sleep_hours must be 0-23"));
        }
        if self.buzz_pattern_ms.is_empty() {
            return Err(ConfigError::ValidationFailed("buzz_pattern_ms must not be empty"));
        }
        if self.alert_lead_secs == 0 {
            return Err(ConfigError::ValidationFailed("alert_lead_secs must be > 0"));
        }
        if self.pulse_period_ms < self.tick_interval_ms.saturating_mul(2) {
            return Err(ConfigError::ValidationFailed(
                "pulse_period_ms must span at least two ticks",
            ));
        }
        if self.hysteresis_ticks == 0 {
            return Err(ConfigError::ValidationFailed("hysteresis_ticks must be > 0"));
        }
        if self.dim_after_secs == 0 {
            return Err(ConfigError::ValidationFailed("dim_after_secs must be > 0"));
        }
        if self.burn_in_interval_secs == 0 {
            return Err(ConfigError::ValidationFailed("burn_in_interval_secs must be > 0"));
        }
        if self.refresh_interval_secs == 0 {
            return Err(ConfigError::ValidationFailed("refresh_interval_secs must be > 0"));
        }
        if self.stale_after_secs < self.refresh_interval_secs {
            return Err(ConfigError::ValidationFailed(
                "stale_after_secs must be >= refresh_interval_secs",
            ));
        }
        if self.events_per_page == 0 {
            return Err(ConfigError::ValidationFailed("events_per_page must be > 0"));
        }
        let g = &self.gesture;
        if g.swipe_threshold_px == 0 || g.vertical_threshold_px == 0 {
            return Err(ConfigError::ValidationFailed("gesture thresholds must be > 0"));
        }
        if g.max_gesture_ms == 0 || g.debounce_ms >= g.max_gesture_ms {
            return Err(ConfigError::ValidationFailed(
                "gesture debounce_ms must be below max_gesture_ms",
            ));
        }
        Ok(())
    }

    /// Local hour-of-day (0-23) in the configured time zone.
    pub fn local_hour(&self, now: DateTime<Utc>) -> u8 {
        now.with_timezone(&self.timezone).hour() as u8
    }

    /// Number of ticks in one pulse period.
    pub fn pulse_period_ticks(&self) -> u32 {
        (self.pulse_period_ms / self.tick_interval_ms.max(1)).max(2)
    }
}
