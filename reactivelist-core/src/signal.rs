//! Signals produced for the renderer.

use crate::view::ListData;
use reactivelist_types::Direction;
use serde_json::Value;

/// Something the renderer should know about.
#[derive(Debug, Clone, PartialEq)]
pub enum ListSignal {
    /// The derived result bundle changed.
    Data(Box<ListData>),
    /// A dispatch or query failed.
    Error(String),
    /// Classic pagination landed on a page (1-based).
    PageChange { page: u64, total_pages: u64 },
    /// A page button was clicked (1-based).
    PageClick { page: u64 },
    /// Continuous pagination added a page (1-based) at one end.
    PageAdd {
        direction: Direction,
        page: u64,
        total_pages: u64,
    },
    ResetToFirstPage,
    /// The query the store built for this list changed.
    QueryChange {
        old: Option<Value>,
        new: Option<Value>,
    },
    /// Scroll the viewport back to the top.
    ScrollToTop,
    /// Attach or detach the viewport scroll listener that drives
    /// infinite loading.
    ScrollListener { attached: bool },
}

impl ListSignal {
    /// Short name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Data(_) => "data",
            Self::Error(_) => "error",
            Self::PageChange { .. } => "pageChange",
            Self::PageClick { .. } => "pageClick",
            Self::PageAdd { .. } => "pageAdd",
            Self::ResetToFirstPage => "resetToFirstPage",
            Self::QueryChange { .. } => "queryChange",
            Self::ScrollToTop => "scrollToTop",
            Self::ScrollListener { .. } => "scrollListener",
        }
    }
}

/// Receives the list's signals.
pub trait ListObserver {
    fn on_signal(&mut self, signal: ListSignal);

    /// Whether the host handles page changes itself. Without a listener the
    /// list asks for a scroll to top instead of emitting `PageChange` after
    /// a page was fetched.
    fn listens_for_page_change(&self) -> bool {
        false
    }
}

/// Discards every signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ListObserver for NoopObserver {
    fn on_signal(&mut self, _signal: ListSignal) {}
}
