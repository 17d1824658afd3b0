//! Fetch controller: decides what to request and when.
//!
//! Requests are dispatched to the store and forgotten; the response is
//! observed later by the reconciler. Each request is tagged by the
//! [`FetchLedger`] so that a response which was superseded before it arrived
//! can be recognised and dropped.

use crate::config::ListConfig;
use crate::error::ListResult;
use crate::mode::PaginationMode;
use crate::query::{DefaultQueryFragment, QueryOptionsBuilder};
use crate::signal::ListSignal;
use crate::state::{PaginationState, page_offset};
use crate::store::{FetchRequest, SearchStore};
use reactivelist_types::{Direction, FetchLane, FetchTag, QueryOptions, ResultSet};
use tracing::{debug, warn};

/// Hands out fetch generations and remembers which ones are still current.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchLedger {
    /// Last generation handed out.
    generation: u64,
    /// Last generation issued per lane.
    latest: [u64; 4],
    /// Responses to generations below this are stale.
    floor: u64,
}

impl FetchLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tags a new fetch on `lane`, superseding earlier fetches on that lane.
    pub fn issue(&mut self, lane: FetchLane, offset: u64) -> FetchTag {
        self.generation += 1;
        self.latest[lane.slot()] = self.generation;
        FetchTag::new(self.generation, lane, offset)
    }

    /// Whether the response to `tag` should be ignored: a newer fetch was
    /// issued on the same lane, or the ledger was invalidated after `tag`
    /// was issued.
    pub fn is_stale(&self, tag: &FetchTag) -> bool {
        tag.generation < self.floor || tag.generation < self.latest[tag.lane.slot()]
    }

    /// Marks every fetch issued so far as stale.
    pub fn invalidate(&mut self) {
        self.floor = self.generation + 1;
    }

    /// Last generation handed out, `0` before the first fetch.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Reports a failed dispatch: logs it, stops loading and queues an error
/// signal. Returns whether the dispatch succeeded.
pub(crate) fn dispatched(
    result: ListResult<()>,
    action: &str,
    state: &mut PaginationState,
    signals: &mut Vec<ListSignal>,
) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            warn!("{action} failed: {e}");
            state.stop_loading();
            signals.push(ListSignal::Error(e.to_string()));
            false
        }
    }
}

/// An earlier page exists before the continuous window.
pub fn shows_load_prev(state: &PaginationState, results: &ResultSet) -> bool {
    results.hits.is_some() && state.from > 0
}

/// A later page exists after the continuous window.
pub fn shows_load_next(state: &PaginationState, results: &ResultSet, size: u64) -> bool {
    results.hits.is_some() && state.from_next.saturating_add(size) < results.total_or_zero()
}

/// Borrows everything one fetch operation touches.
pub struct FetchController<'a> {
    pub config: &'a ListConfig,
    pub state: &'a mut PaginationState,
    pub store: &'a mut dyn SearchStore,
    pub ledger: &'a mut FetchLedger,
    /// Snapshot of the store's data for this list.
    pub results: &'a ResultSet,
    pub default_query: Option<&'a DefaultQueryFragment>,
}

impl FetchController<'_> {
    fn mode(&self) -> PaginationMode {
        PaginationMode::select(self.config)
    }

    fn options_at(&self, offset: u64) -> QueryOptions {
        QueryOptionsBuilder::new(self.config)
            .after_key(self.results.after_key.as_ref())
            .default_query(self.default_query)
            .build(offset)
    }

    fn is_aggregation(&self) -> bool {
        self.config.aggregation_field.is_some()
    }

    /// Aggregation paging needs a cursor from a previous response.
    fn awaiting_cursor(&self) -> bool {
        self.is_aggregation() && self.results.after_key.is_none()
    }

    fn fetch(
        &mut self,
        lane: FetchLane,
        options: QueryOptions,
        signals: &mut Vec<ListSignal>,
    ) -> bool {
        let tag = self.ledger.issue(lane, options.from);
        debug!(
            "{}: fetching {:?} at {} (generation {})",
            self.config.component_id, lane, options.from, tag.generation
        );
        let request = FetchRequest {
            component_id: self.config.component_id.clone(),
            options,
            append: lane.appends(),
            prepend: lane.prepends(),
            is_aggregation: self.is_aggregation(),
            tag,
        };
        let result = self.store.fetch_more(request);
        dispatched(result, "fetch_more", self.state, signals)
    }

    /// Publishes a 1-based page number (or clears it) without resetting the
    /// page, and mirrors it as the pending default page.
    fn publish_page(&mut self, page: Option<u64>, signals: &mut Vec<ListSignal>) {
        let param = self.config.url_page_param().to_string();
        let result = self.store.set_url_param(&param, page, &param, false, true);
        if dispatched(result, "set_url_param", self.state, signals) {
            self.state.default_page = page.map(|p| p.saturating_sub(1));
        }
    }

    pub fn shows_load_prev(&self) -> bool {
        shows_load_prev(self.state, self.results)
    }

    pub fn shows_load_next(&self) -> bool {
        shows_load_next(self.state, self.results, self.config.size)
    }

    /// Jumps to a zero-based page, replacing the current window.
    pub fn set_page(&mut self, page: u64) -> Vec<ListSignal> {
        let mut signals = Vec::new();
        if page == self.state.current_page {
            return signals;
        }
        let Some(offset) = page_offset(page, self.config.size) else {
            warn!(
                "{}: page {page} is out of range, ignoring",
                self.config.component_id
            );
            return signals;
        };
        signals.push(ListSignal::PageClick {
            page: page.saturating_add(1),
        });

        let options = self.options_at(self.state.from).at(offset);
        self.state.from = offset;
        self.state.from_next = offset;
        self.state.is_loading = true;
        self.state.current_page = page;

        if self.fetch(FetchLane::Replace, options, &mut signals) && self.config.url_params {
            self.publish_page(Some(page.saturating_add(1)), &mut signals);
        }
        signals
    }

    /// Appends the next page (infinite loading).
    pub fn load_more(&mut self) -> Vec<ListSignal> {
        let mut signals = Vec::new();
        if self.awaiting_cursor() {
            debug!("{}: no aggregation cursor yet", self.config.component_id);
            return signals;
        }

        let showing_all = self
            .results
            .hits
            .as_ref()
            .is_some_and(|hits| self.results.total == Some(hits.len() as u64));
        if self.mode() == PaginationMode::Infinite && self.results.hits.is_some() && !showing_all {
            let offset = self.state.from.saturating_add(self.config.size);
            let options = self.options_at(offset);
            self.state.from = offset;
            self.state.is_loading = true;
            self.fetch(FetchLane::Append, options, &mut signals);
        } else if self.state.is_loading {
            self.state.is_loading = false;
        }
        signals
    }

    /// Loads one page before or after the window (continuous pagination).
    pub fn continuous_load_more(&mut self, direction: Direction) -> Vec<ListSignal> {
        let mut signals = Vec::new();
        if !self.mode().is_continuous() || self.awaiting_cursor() {
            return signals;
        }

        let available = match direction {
            Direction::Next => self.shows_load_next(),
            Direction::Prev => self.shows_load_prev(),
        };
        if !available {
            let loading = match direction {
                Direction::Next => &mut self.state.is_loading_next,
                Direction::Prev => &mut self.state.is_loading_prev,
            };
            *loading = false;
            return signals;
        }

        let size = self.config.size;
        let offset = match direction {
            Direction::Next => {
                self.state.from_next += size;
                self.state.is_loading_next = true;
                self.state.from_next
            }
            Direction::Prev => {
                self.state.from = self.state.from.saturating_sub(size);
                self.state.is_loading_prev = true;
                self.state.from
            }
        };

        let options = self.options_at(offset);
        if self.fetch(direction.into(), options, &mut signals)
            && self.config.url_params
            && direction == Direction::Next
        {
            self.publish_page(Some(offset.div_ceil(size).saturating_add(1)), &mut signals);
        }
        signals
    }

    /// Back to the first page; in-flight fetches become stale.
    pub fn reset_to_first_page(&mut self) -> Vec<ListSignal> {
        let mut signals = Vec::new();
        self.state.jump_to(0, self.config.size);
        self.ledger.invalidate();
        self.publish_page(None, &mut signals);
        signals.push(ListSignal::ResetToFirstPage);
        signals
    }

    /// Re-stages the options after a sort, field or size change, keeping
    /// the current offset, and executes the query.
    pub fn update_query_options(&mut self) -> Vec<ListSignal> {
        let mut signals = Vec::new();
        let options = self.options_at(self.state.from);
        self.ledger.invalidate();
        let result = self
            .store
            .set_query_options(&self.config.component_id, &options, true);
        dispatched(result, "set_query_options", self.state, &mut signals);
        signals
    }

    /// Applies the `index`-th sort option and goes back to the first page.
    pub fn handle_sort_change(&mut self, index: usize) -> Vec<ListSignal> {
        let mut signals = Vec::new();
        let Some(option) = self
            .config
            .sort_options
            .as_ref()
            .and_then(|options| options.get(index))
        else {
            warn!(
                "{}: sort option {index} does not exist",
                self.config.component_id
            );
            return signals;
        };

        let mut options = self.options_at(0);
        options.sort = Some(QueryOptions::single_sort(&option.data_field, option.sort_by));
        self.state.jump_to(0, self.config.size);
        self.ledger.invalidate();
        let result = self
            .store
            .set_query_options(&self.config.component_id, &options, true);
        dispatched(result, "set_query_options", self.state, &mut signals);
        signals
    }

    /// Switches to a new default-query fragment: its options are staged, its
    /// filter goes to the internal companion (which executes the query), and
    /// the list returns to the first page.
    pub fn apply_default_query(&mut self) -> Vec<ListSignal> {
        let mut signals = Vec::new();
        let options = self.options_at(0);
        let filter = self.default_query.and_then(|f| f.query.as_ref());
        let id = &self.config.component_id;

        let staged = self.store.set_query_options(id, &options, filter.is_none());
        if !dispatched(staged, "set_query_options", self.state, &mut signals) {
            return signals;
        }
        let internal = self.config.internal_component_id();
        let pushed = self.store.update_filter_query(&internal, filter, true);
        dispatched(pushed, "update_filter_query", self.state, &mut signals);

        self.state.jump_to(0, self.config.size);
        self.ledger.invalidate();
        signals
    }
}
