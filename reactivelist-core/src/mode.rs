//! Pagination strategy selection.

use crate::config::{ListConfig, PaginationSetting};
use std::fmt;

/// The active pagination strategy. Derived from the config, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaginationMode {
    /// Numbered pages, each fetch replaces the window.
    Classic,
    /// Scrolling appends the next page.
    Infinite,
    /// Bidirectional loading around a sliding window of pages.
    Continuous,
}

impl PaginationMode {
    /// Picks the strategy for `config`.
    ///
    /// Classic pagination with an aggregation field degrades to infinite
    /// loading; continuous pagination is kept as requested.
    pub fn select(config: &ListConfig) -> Self {
        match config.pagination {
            PaginationSetting::Continuous => Self::Continuous,
            PaginationSetting::Classic if config.aggregation_field.is_none() => Self::Classic,
            PaginationSetting::Classic | PaginationSetting::Disabled => Self::Infinite,
        }
    }

    pub fn is_classic(self) -> bool {
        self == Self::Classic
    }

    pub fn is_continuous(self) -> bool {
        self == Self::Continuous
    }

    /// Only infinite mode loads on scroll.
    pub fn uses_scroll_listener(self) -> bool {
        self == Self::Infinite
    }
}

impl fmt::Display for PaginationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Classic => f.write_str("classic"),
            Self::Infinite => f.write_str("infinite"),
            Self::Continuous => f.write_str("continuous"),
        }
    }
}

/// Number of pages needed to show `total` records, `0` when there are none.
pub fn total_pages(total: Option<u64>, size: u64) -> u64 {
    match total {
        Some(total) if total > 0 && size > 0 => total.div_ceil(size),
        _ => 0,
    }
}
