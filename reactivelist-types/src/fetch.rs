//! Fetch tags.
//!
//! Every request the list issues carries a tag. A store that echoes the tag
//! back with the resulting hit list lets the list match the response to its
//! request instead of guessing from the shape of the new hits.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a continuous-pagination fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Next,
    Prev,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Next => f.write_str("next"),
            Self::Prev => f.write_str("prev"),
        }
    }
}

/// How a fetch merges into the current hit window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchLane {
    /// Classic page change: the window is replaced.
    Replace,
    /// Infinite scroll: the page is appended.
    Append,
    /// Continuous pagination, appended after the window.
    Next,
    /// Continuous pagination, prepended before the window.
    Prev,
}

impl FetchLane {
    pub const ALL: [FetchLane; 4] = [Self::Replace, Self::Append, Self::Next, Self::Prev];

    /// Whether the store should append the fetched page.
    pub fn appends(self) -> bool {
        matches!(self, Self::Append | Self::Next)
    }

    /// Whether the store should prepend the fetched page.
    pub fn prepends(self) -> bool {
        matches!(self, Self::Prev)
    }

    /// The continuous direction of this lane, if any.
    pub fn direction(self) -> Option<Direction> {
        match self {
            Self::Next => Some(Direction::Next),
            Self::Prev => Some(Direction::Prev),
            Self::Replace | Self::Append => None,
        }
    }

    /// Index into per-lane tables.
    pub fn slot(self) -> usize {
        match self {
            Self::Replace => 0,
            Self::Append => 1,
            Self::Next => 2,
            Self::Prev => 3,
        }
    }
}

impl From<Direction> for FetchLane {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Next => Self::Next,
            Direction::Prev => Self::Prev,
        }
    }
}

/// Identifies one issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FetchTag {
    /// Monotonic per-list generation number.
    pub generation: u64,
    pub lane: FetchLane,
    /// The `from` offset that was requested.
    pub offset: u64,
}

impl FetchTag {
    pub fn new(generation: u64, lane: FetchLane, offset: u64) -> Self {
        Self {
            generation,
            lane,
            offset,
        }
    }
}
