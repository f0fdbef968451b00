//! Inbound commands to the orchestrator.
//!
//! These represent actions requested by the outside world (host CLI,
//! hardware buttons) rather than the touch panel. Navigation commands
//! behave exactly like the matching gesture.

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Start a refresh now, superseding any fetch in flight.
    RequestRefresh,

    /// Same as a left swipe.
    NextPage,

    /// Same as a right swipe.
    PreviousPage,

    /// Same as an upward swipe.
    ToggleTheme,
}
