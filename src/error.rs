//! Unified error types for the controller core.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! simulator's and the orchestrator's error handling uniform. Per-tick
//! component calls are total over their inputs and never return these;
//! they surface at startup (config), at snapshot construction (events),
//! from the calendar source (fetch) and from wake-resume storage.

use core::fmt;

use crate::calendar::EventId;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Configuration failed validation at startup.
    Config(ConfigError),
    /// An event violated a snapshot invariant.
    Event(EventError),
    /// The calendar source reported a failed fetch.
    Fetch(FetchError),
    /// Wake-resume state could not be stored or restored.
    Resume(ResumeError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Event(e) => write!(f, "event: {e}"),
            Self::Fetch(e) => write!(f, "fetch: {e}"),
            Self::Resume(e) => write!(f, "resume: {e}"),
        }
    }
}

impl std::error::Error for Error {}
impl std::error::Error for ConfigError {}
impl std::error::Error for EventError {}
impl std::error::Error for FetchError {}
impl std::error::Error for ResumeError {}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Event errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    /// The event ends before it starts.
    EndBeforeStart(EventId),
    /// Two events in one snapshot share an id.
    DuplicateId(EventId),
}

impl fmt::Display for EventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndBeforeStart(id) => write!(f, "event {id} ends before it starts"),
            Self::DuplicateId(id) => write!(f, "duplicate event id {id}"),
        }
    }
}

impl From<EventError> for Error {
    fn from(e: EventError) -> Self {
        Self::Event(e)
    }
}

// ---------------------------------------------------------------------------
// Fetch errors
// ---------------------------------------------------------------------------

/// Outcome of a failed calendar fetch. Retry policy belongs to the
/// source; the core only records the failure and keeps the last snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchError {
    /// No network connectivity.
    Offline,
    /// The server answered with a non-success status code.
    Http(u16),
    /// The feed could not be parsed into events.
    Parse,
    /// The request did not complete in time.
    Timeout,
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Offline => write!(f, "offline"),
            Self::Http(code) => write!(f, "HTTP status {code}"),
            Self::Parse => write!(f, "feed parse failed"),
            Self::Timeout => write!(f, "timed out"),
        }
    }
}

impl From<FetchError> for Error {
    fn from(e: FetchError) -> Self {
        Self::Fetch(e)
    }
}

// ---------------------------------------------------------------------------
// Resume errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeError {
    /// Serialisation into the storage blob failed.
    Encode,
    /// Stored blob failed deserialisation.
    Corrupted,
    /// The storage backend rejected the operation.
    Storage,
}

impl fmt::Display for ResumeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode => write!(f, "encode failed"),
            Self::Corrupted => write!(f, "stored state corrupted"),
            Self::Storage => write!(f, "storage I/O error"),
        }
    }
}

impl From<ResumeError> for Error {
    fn from(e: ResumeError) -> Self {
        Self::Resume(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
