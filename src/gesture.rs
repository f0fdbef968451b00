//! Touch gesture recogniser.
//!
//! The touch driver delivers raw [`TouchSample`]s each tick; the
//! recogniser runs a small state machine per contact and emits at most
//! one [`GestureEvent`] per completed touch sequence.
//!
//! ```text
//!  Idle ──press──▶ Tracking ──release──▶ Resolved(gesture) ─▶ Idle
//!                     │
//!                     └──held > max_gesture_ms──▶ Cancelled ──release──▶ Idle
//! ```
//!
//! ## Classification on release
//!
//! | Gesture     | Condition                                              |
//! |-------------|--------------------------------------------------------|
//! | SwipeLeft/Right | `|dx| >= swipe_threshold` and `|dy| < |dx|`        |
//! | PullDown    | `dy >= vertical_threshold`, press began in top region  |
//! | SwipeUp     | `-dy >= vertical_threshold`                            |
//! | Tap         | anything else, unless it is a short contact that       |
//! |             | moved less than every threshold (`debounce_ms`)        |
//!
//! After a gesture resolves, a second gesture of the same kind is
//! swallowed until `cooldown_ms` has passed.

use log::{debug, warn};

use crate::app::ports::MAX_SAMPLES_PER_TICK;
use crate::config::GestureConfig;

/// Maximum gestures resolved from one tick's worth of samples. Every
/// gesture but the first needs its own press and release.
pub const MAX_GESTURES_PER_TICK: usize = MAX_SAMPLES_PER_TICK / 2;

/// One raw reading from the touch controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchSample {
    pub x: u16,
    pub y: u16,
    pub pressed: bool,
    /// Monotonic milliseconds since boot.
    pub timestamp_ms: u64,
}

impl TouchSample {
    pub fn press(x: u16, y: u16, timestamp_ms: u64) -> Self {
        Self {
            x,
            y,
            pressed: true,
            timestamp_ms,
        }
    }

    pub fn release(x: u16, y: u16, timestamp_ms: u64) -> Self {
        Self {
            x,
            y,
            pressed: false,
            timestamp_ms,
        }
    }
}

/// Discrete gestures emitted after classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEvent {
    SwipeLeft,
    SwipeRight,
    PullDown,
    SwipeUp,
    /// Ignored by navigation, still counts as user activity.
    Tap { x: u16, y: u16 },
}

/// Gesture kind without payload, for cooldown bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    SwipeLeft,
    SwipeRight,
    PullDown,
    SwipeUp,
    Tap,
}

impl GestureEvent {
    pub fn kind(&self) -> GestureKind {
        match self {
            Self::SwipeLeft => GestureKind::SwipeLeft,
            Self::SwipeRight => GestureKind::SwipeRight,
            Self::PullDown => GestureKind::PullDown,
            Self::SwipeUp => GestureKind::SwipeUp,
            Self::Tap { .. } => GestureKind::Tap,
        }
    }
}

/// Internal state machine for one contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContactState {
    Idle,
    Tracking {
        start: (u16, u16),
        since_ms: u64,
        last: (u16, u16),
    },
    Cancelled,
}

pub struct GestureRecognizer {
    config: GestureConfig,
    state: ContactState,
    last_gesture: Option<(GestureKind, u64)>,
}

impl GestureRecognizer {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            state: ContactState::Idle,
            last_gesture: None,
        }
    }

    /// True while a contact is being tracked.
    pub fn is_tracking(&self) -> bool {
        matches!(self.state, ContactState::Tracking { .. })
    }

    /// Feed every sample delivered this tick, in order.
    pub fn feed_all(
        &mut self,
        samples: &[TouchSample],
    ) -> heapless::Vec<GestureEvent, MAX_GESTURES_PER_TICK> {
        let mut out = heapless::Vec::new();
        for sample in samples {
            if let Some(gesture) = self.feed(*sample) {
                if out.push(gesture).is_err() {
                    warn!("Gesture: more than {MAX_GESTURES_PER_TICK} in one tick, dropping {gesture:?}");
                }
            }
        }
        out
    }

    /// Feed a single sample; returns a gesture when a contact resolves.
    pub fn feed(&mut self, sample: TouchSample) -> Option<GestureEvent> {
        let now_ms = sample.timestamp_ms;

        match self.state {
            ContactState::Idle => {
                if sample.pressed {
                    self.state = ContactState::Tracking {
                        start: (sample.x, sample.y),
                        since_ms: now_ms,
                        last: (sample.x, sample.y),
                    };
                }
                None
            }

            ContactState::Tracking {
                start,
                since_ms,
                last,
            } => {
                let held_ms = now_ms.saturating_sub(since_ms);
                if held_ms > u64::from(self.config.max_gesture_ms) {
                    debug!("Gesture: contact held {held_ms}ms, cancelled");
                    self.state = if sample.pressed {
                        ContactState::Cancelled
                    } else {
                        ContactState::Idle
                    };
                    return None;
                }

                if sample.pressed {
                    self.state = ContactState::Tracking {
                        start,
                        since_ms,
                        last: (sample.x, sample.y),
                    };
                    return None;
                }

                // Release coordinates are unreliable on some panels; the
                // last pressed position ends the stroke.
                self.state = ContactState::Idle;
                let gesture = self.classify(start, last, held_ms)?;
                self.admit(gesture, now_ms)
            }

            ContactState::Cancelled => {
                if !sample.pressed {
                    self.state = ContactState::Idle;
                }
                None
            }
        }
    }

    fn classify(&self, start: (u16, u16), end: (u16, u16), held_ms: u64) -> Option<GestureEvent> {
        let dx = i32::from(end.0) - i32::from(start.0);
        let dy = i32::from(end.1) - i32::from(start.1);
        let h = i32::from(self.config.swipe_threshold_px);
        let v = i32::from(self.config.vertical_threshold_px);

        if dx.abs() >= h && dy.abs() < dx.abs() {
            return Some(if dx < 0 {
                GestureEvent::SwipeLeft
            } else {
                GestureEvent::SwipeRight
            });
        }
        let tap = GestureEvent::Tap {
            x: start.0,
            y: start.1,
        };
        if dy >= v {
            if start.1 <= self.config.top_region_px {
                return Some(GestureEvent::PullDown);
            }
            debug!("Gesture: downward swipe outside top region, counted as tap");
            return Some(tap);
        }
        if -dy >= v {
            return Some(GestureEvent::SwipeUp);
        }
        if dx.abs() < h && dy.abs() < v && held_ms < u64::from(self.config.debounce_ms) {
            return None;
        }
        Some(tap)
    }

    fn admit(&mut self, gesture: GestureEvent, now_ms: u64) -> Option<GestureEvent> {
        let kind = gesture.kind();
        if let Some((last_kind, at_ms)) = self.last_gesture {
            if last_kind == kind && now_ms.saturating_sub(at_ms) < u64::from(self.config.cooldown_ms)
            {
                debug!("Gesture: {kind:?} swallowed by cooldown");
                return None;
            }
        }
        self.last_gesture = Some((kind, now_ms));
        debug!("Gesture: {gesture:?}");
        Some(gesture)
    }
}
