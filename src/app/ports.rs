//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ TickOrchestrator (domain)
//! ```
//!
//! Driven adapters (touch panel, LED, backlight, buzzer, renderer,
//! calendar fetcher, storage) implement these traits.  The
//! [`TickOrchestrator`](super::service::TickOrchestrator) consumes them
//! via generics, so the domain core never touches hardware directly.

use chrono::{DateTime, Utc};

use crate::gesture::TouchSample;
use crate::indicator::Rgb;
use crate::power::{BacklightLevel, BurnInOffset};
use crate::refresh::{FetchReport, Generation};
use crate::render::DirtyRegions;

use super::intents::ViewState;

/// Most touch samples consumed in one tick; extra samples are dropped
/// by the driver.
pub const MAX_SAMPLES_PER_TICK: usize = 16;

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Wall clock plus monotonic uptime.
pub trait ClockPort {
    /// Current wall-clock time.
    fn now(&self) -> DateTime<Utc>;

    /// Monotonic milliseconds since boot.
    fn uptime_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Touch port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

pub trait TouchPort {
    /// Drain the samples buffered since the last call, oldest first.
    fn poll_samples(&mut self) -> heapless::Vec<TouchSample, MAX_SAMPLES_PER_TICK>;
}

// ───────────────────────────────────────────────────────────────
// Calendar source (non-blocking fetch)
// ───────────────────────────────────────────────────────────────

/// Background calendar fetcher.
///
/// `request_fetch` must return immediately; the result arrives later
/// through `poll_fetch` tagged with the same generation.
pub trait CalendarSource {
    fn request_fetch(&mut self, generation: Generation);

    /// Next completed fetch, if any.
    fn poll_fetch(&mut self) -> Option<FetchReport>;
}

// ───────────────────────────────────────────────────────────────
// Output ports (driven adapters: domain → hardware)
// ───────────────────────────────────────────────────────────────

pub trait LedPort {
    fn set_led(&mut self, rgb: Rgb);
}

pub trait BacklightPort {
    fn set_backlight(&mut self, level: BacklightLevel);
}

pub trait BuzzerPort {
    /// Play alternating on/off durations in milliseconds, starting with on.
    fn play(&mut self, pattern_ms: &[u16]);
}

pub trait RenderPort {
    /// Redraw the given regions of the agenda screen.
    fn render(&mut self, dirty: DirtyRegions, view: &ViewState);

    /// Draw the minimal sleep display shifted by `offset`.
    fn draw_sleep(&mut self, offset: BurnInOffset);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ flash)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value storage.
///
/// Write operations MUST be atomic; no partial writes on power loss.
pub trait StoragePort {
    /// Read a value.  Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value atomically.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a key.  Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;

    /// Check whether a key exists without reading it.
    fn exists(&self, namespace: &str, key: &str) -> bool;
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Storage partition is full.
    Full,
    /// Read buffer too small for the stored value.
    BufferTooSmall,
    /// Generic I/O error.
    IoError,
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::BufferTooSmall => write!(f, "buffer too small"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
