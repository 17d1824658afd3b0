//! Per-instance pagination state.

use serde::{Deserialize, Serialize};

/// Mutable pagination state of one list.
///
/// `from` is the offset of the first loaded page (and of the only page in
/// classic mode); `from_next` is the offset of the last loaded page, used
/// only by continuous pagination. Both stay multiples of the page size.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PaginationState {
    pub from: u64,
    pub from_next: u64,
    /// Zero-based.
    pub current_page: u64,
    pub is_loading: bool,
    pub is_loading_prev: bool,
    pub is_loading_next: bool,
    /// Page restored from an external source (e.g. the URL), zero-based.
    pub default_page: Option<u64>,
}

impl PaginationState {
    /// Seeds the state for a newly mounted list.
    ///
    /// `requested_page` is the 1-based `currentPage` option (`0` when unset);
    /// a pending `default_page` overrides it. A page whose offset does not
    /// fit in `u64` starts the list on the first page instead.
    pub fn seeded(size: u64, requested_page: u64, default_page: Option<u64>) -> Self {
        let requested = default_page.unwrap_or(requested_page.saturating_sub(1));
        let (current_page, from) = match page_offset(requested, size) {
            Some(from) => (requested, from),
            None => (0, 0),
        };
        Self {
            from,
            from_next: from,
            current_page,
            is_loading: true,
            is_loading_prev: false,
            is_loading_next: false,
            default_page,
        }
    }

    /// Moves to `page`, keeping both offsets aligned with it. Returns
    /// `false`, leaving the state alone, when the page's offset overflows.
    pub fn jump_to(&mut self, page: u64, size: u64) -> bool {
        let Some(from) = page_offset(page, size) else {
            return false;
        };
        self.current_page = page;
        self.from = from;
        self.from_next = from;
        true
    }

    /// Re-expresses both offsets in pages of `new_size`, each keeping the
    /// page index it pointed at.
    pub fn resize(&mut self, old_size: u64, new_size: u64) {
        let rescale = |offset: u64| page_offset(offset / old_size.max(1), new_size);
        match (rescale(self.from), rescale(self.from_next)) {
            (Some(from), Some(from_next)) => {
                self.from = from;
                self.from_next = from_next;
            }
            _ => {
                self.jump_to(0, new_size);
            }
        }
    }

    /// Whether any fetch is in flight.
    pub fn any_loading(&self) -> bool {
        self.is_loading || self.is_loading_prev || self.is_loading_next
    }

    /// Clears every loading flag.
    pub fn stop_loading(&mut self) {
        self.is_loading = false;
        self.is_loading_prev = false;
        self.is_loading_next = false;
    }
}

/// Offset of the first record of a zero-based `page`, if it fits.
pub fn page_offset(page: u64, size: u64) -> Option<u64> {
    page.checked_mul(size)
}
