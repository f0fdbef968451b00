//! Gesture consumer for the agenda screen.
//!
//! | Gesture     | Action                                   |
//! |-------------|------------------------------------------|
//! | SwipeLeft   | Next page (wraps; needs more than 1 page) |
//! | SwipeRight  | Previous page (wraps)                    |
//! | SwipeUp     | Toggle dark / light theme                |
//! | PullDown    | Manual refresh                           |
//! | Tap         | Nothing                                  |

use log::info;
use serde::{Deserialize, Serialize};

use crate::gesture::GestureEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

/// Result of applying one gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    PageChanged { page: u16 },
    ThemeChanged(Theme),
    RefreshRequested,
    None,
}

pub struct Navigator {
    per_page: u16,
    page: u16,
    theme: Theme,
}

impl Navigator {
    pub fn new(events_per_page: u8) -> Self {
        Self {
            per_page: u16::from(events_per_page.max(1)),
            page: 0,
            theme: Theme::default(),
        }
    }

    pub fn page(&self) -> u16 {
        self.page
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Number of pages needed for `event_count` events (at least one).
    pub fn page_count(&self, event_count: usize) -> u16 {
        let n = event_count.div_ceil(usize::from(self.per_page)).max(1);
        u16::try_from(n).unwrap_or(u16::MAX)
    }

    /// Page to draw for `event_count` events. A restored page waits for
    /// the next snapshot before it is clamped, so it may be past the end.
    pub fn visible_page(&self, event_count: usize) -> u16 {
        self.page.min(self.page_count(event_count) - 1)
    }

    pub fn apply(&mut self, gesture: GestureEvent, event_count: usize) -> NavAction {
        let pages = self.page_count(event_count);
        match gesture {
            GestureEvent::SwipeLeft if pages > 1 => {
                self.page = (self.page + 1) % pages;
                NavAction::PageChanged { page: self.page }
            }
            GestureEvent::SwipeRight if pages > 1 => {
                self.page = self.page.checked_sub(1).unwrap_or(pages - 1);
                NavAction::PageChanged { page: self.page }
            }
            GestureEvent::SwipeUp => {
                self.theme = self.theme.toggled();
                info!("Nav: theme {:?}", self.theme);
                NavAction::ThemeChanged(self.theme)
            }
            GestureEvent::PullDown => NavAction::RefreshRequested,
            _ => NavAction::None,
        }
    }

    /// Keep the page in range after the event list changed.
    /// Returns `true` when the page moved.
    pub fn clamp(&mut self, event_count: usize) -> bool {
        let last = self.page_count(event_count) - 1;
        if self.page > last {
            self.page = last;
            return true;
        }
        false
    }

    /// Restore a persisted page; clamped on the next snapshot and
    /// reported through [`Navigator::visible_page`] until then.
    pub fn restore(&mut self, page: u16, theme: Theme) {
        self.page = page;
        self.theme = theme;
    }
}
