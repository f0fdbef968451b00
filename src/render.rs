//! Dirty-region intents for the renderer.
//!
//! The renderer owns all drawing. The core only reports which screen
//! regions changed this tick as a bitmask; the renderer redraws those
//! and nothing else.

use core::fmt;

/// A screen region the renderer can redraw independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Region {
    /// Date, clock and theme-dependent chrome.
    Header = 0b0000_0001,
    /// Page indicator and arrows.
    Pagination = 0b0000_0010,
    /// The event list for the current page.
    Events = 0b0000_0100,
    /// "Last refreshed" stamp and refresh spinner.
    Refresh = 0b0000_1000,
    /// Network / staleness status.
    Status = 0b0001_0000,
}

impl Region {
    pub const ALL: [Region; 5] = [
        Region::Header,
        Region::Pagination,
        Region::Events,
        Region::Refresh,
        Region::Status,
    ];

    /// Return the bitmask for this region.
    pub const fn mask(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header => write!(f, "header"),
            Self::Pagination => write!(f, "pagination"),
            Self::Events => write!(f, "events"),
            Self::Refresh => write!(f, "refresh"),
            Self::Status => write!(f, "status"),
        }
    }
}

/// Set of regions to redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DirtyRegions(u8);

impl DirtyRegions {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(0b0001_1111);

    pub const fn of(regions: &[Region]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < regions.len() {
            bits |= regions[i].mask();
            i += 1;
        }
        Self(bits)
    }

    pub fn mark(&mut self, region: Region) {
        self.0 |= region.mask();
    }

    pub fn merge(&mut self, other: DirtyRegions) {
        self.0 |= other.0;
    }

    pub fn contains(self, region: Region) -> bool {
        self.0 & region.mask() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn iter(self) -> impl Iterator<Item = Region> {
        Region::ALL.into_iter().filter(move |r| self.contains(*r))
    }
}

impl fmt::Display for DirtyRegions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        let mut first = true;
        for region in self.iter() {
            if !first {
                write!(f, "|")?;
            }
            write!(f, "{region}")?;
            first = false;
        }
        Ok(())
    }
}

// ── Change rules ──────────────────────────────────────────────

/// A fresh snapshot was swapped in.
pub const ON_SNAPSHOT: DirtyRegions =
    DirtyRegions::of(&[Region::Events, Region::Pagination, Region::Refresh]);

/// The visible page changed.
pub const ON_PAGE_CHANGE: DirtyRegions = DirtyRegions::of(&[Region::Events, Region::Pagination]);

/// Theme toggled or display woke from sleep.
pub const ON_FULL_REDRAW: DirtyRegions = DirtyRegions::ALL;

/// Fetch failure or staleness flip.
pub const ON_STATUS: DirtyRegions = DirtyRegions::of(&[Region::Status]);

/// Manual refresh started.
pub const ON_REFRESH_START: DirtyRegions = DirtyRegions::of(&[Region::Refresh]);

/// Committed indicator tier changed (event highlight moves).
pub const ON_TIER_CHANGE: DirtyRegions = DirtyRegions::of(&[Region::Events]);
