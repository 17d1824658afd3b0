//! The results list: lifecycle, host hooks and user actions.
//!
//! `ResultList` owns the configuration, the pagination state, the store
//! handle and the observer. The host framework drives it through the `on_*`
//! hooks (store updates, prop changes, query notifications, scrolling) and
//! the user actions (`set_page`, `load_more`, ...). Every hook runs to
//! completion before returning; signals are delivered to the observer in
//! the order they were produced.

use crate::config::{ListConfig, ReactClause};
use crate::error::ListResult;
use crate::fetch::{FetchController, FetchLedger, dispatched, shows_load_next, shows_load_prev};
use crate::mode::{PaginationMode, total_pages};
use crate::query::{DefaultQueryFragment, QueryOptionsBuilder};
use crate::reconcile::ResultReconciler;
use crate::signal::{ListObserver, ListSignal};
use crate::state::PaginationState;
use crate::store::SearchStore;
use crate::view::{DerivedView, ListData};
use reactivelist_types::{Direction, ResultSet};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Distance from the bottom of the page, in pixels, at which infinite
/// loading fetches the next page.
pub const SCROLL_THRESHOLD: f64 = 300.0;

/// Viewport geometry reported by the host's scroll listener.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportMetrics {
    pub inner_height: f64,
    pub page_y_offset: f64,
    pub body_height: f64,
}

impl ViewportMetrics {
    pub fn new(inner_height: f64, page_y_offset: f64, body_height: f64) -> Self {
        Self {
            inner_height,
            page_y_offset,
            body_height,
        }
    }

    /// Whether the bottom of the viewport is within [`SCROLL_THRESHOLD`] of
    /// the end of the page.
    pub fn near_bottom(&self) -> bool {
        self.inner_height + self.page_y_offset + SCROLL_THRESHOLD >= self.body_height
    }
}

/// A mounted (or mountable) results list.
pub struct ResultList<S, O> {
    config: ListConfig,
    state: PaginationState,
    store: S,
    observer: O,
    /// Last accepted result set.
    results: ResultSet,
    ledger: FetchLedger,
    /// Last evaluated default-query fragment, raw and split.
    default_query: Option<Value>,
    fragment: Option<DefaultQueryFragment>,
    mounted: bool,
    scroll_listener: bool,
}

impl<S: SearchStore, O: ListObserver> ResultList<S, O> {
    /// Validates `config` and prepares the state. Nothing is dispatched
    /// until [`ResultList::mount`].
    pub fn new(config: ListConfig, store: S, observer: O) -> ListResult<Self> {
        config.validate()?;
        warn_on_conflict(&config);
        let state = PaginationState::seeded(config.size, config.current_page, None);
        Ok(Self {
            config,
            state,
            store,
            observer,
            results: ResultSet::default(),
            ledger: FetchLedger::new(),
            default_query: None,
            fragment: None,
            mounted: false,
            scroll_listener: false,
        })
    }

    /// Seeds a page restored from outside (e.g. the URL), zero-based. Only
    /// meaningful before mounting.
    pub fn with_default_page(mut self, page: Option<u64>) -> Self {
        self.state = PaginationState::seeded(self.config.size, self.config.current_page, page);
        self
    }

    // ── Accessors ────────────────────────────────────────────────

    pub fn config(&self) -> &ListConfig {
        &self.config
    }

    pub fn state(&self) -> &PaginationState {
        &self.state
    }

    pub fn mode(&self) -> PaginationMode {
        PaginationMode::select(&self.config)
    }

    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Whether the viewport scroll listener is currently requested.
    pub fn has_scroll_listener(&self) -> bool {
        self.scroll_listener
    }

    pub fn total_pages(&self) -> u64 {
        total_pages(self.results.total, self.config.size)
    }

    /// The fetch generation ledger.
    pub fn ledger(&self) -> &FetchLedger {
        &self.ledger
    }

    pub fn view(&self) -> DerivedView {
        DerivedView::compute(&self.results, self.state.current_page, self.config.size)
    }

    /// The bundle a custom renderer receives.
    pub fn data(&self) -> ListData {
        self.view()
            .into_data(self.state.any_loading(), self.results.error.clone())
    }

    /// Whether the continuous "load previous" control is available.
    pub fn shows_load_prev(&self) -> bool {
        shows_load_prev(&self.state, &self.results)
    }

    /// Whether the continuous "load next" control is available.
    pub fn shows_load_next(&self) -> bool {
        shows_load_next(&self.state, &self.results, self.config.size)
    }

    // ── Internals ────────────────────────────────────────────────

    fn fetcher(&mut self) -> FetchController<'_> {
        FetchController {
            config: &self.config,
            state: &mut self.state,
            store: &mut self.store,
            ledger: &mut self.ledger,
            results: &self.results,
            default_query: self.fragment.as_ref(),
        }
    }

    fn emit(&mut self, signals: Vec<ListSignal>) {
        for signal in signals {
            debug!("{}: emitting {}", self.config.component_id, signal.name());
            self.observer.on_signal(signal);
        }
    }

    fn evaluate_default_query(&self) -> Option<Value> {
        self.config.default_query.as_ref().map(|dq| dq.evaluate())
    }

    fn react_clause(&self) -> ReactClause {
        let internal = self.config.internal_component_id();
        match &self.config.react {
            Some(react) => react.pushed_to_and(&internal),
            None => ReactClause::and_component(internal),
        }
    }

    fn set_react(&mut self, signals: &mut Vec<ListSignal>) {
        let react = self.react_clause();
        let result = self
            .store
            .set_aggregation_watch(&self.config.component_id, &react);
        dispatched(result, "set_aggregation_watch", &mut self.state, signals);
    }

    fn sync_scroll_listener(&mut self, signals: &mut Vec<ListSignal>) {
        let wanted = self.mounted && self.mode().uses_scroll_listener();
        if wanted != self.scroll_listener {
            self.scroll_listener = wanted;
            signals.push(ListSignal::ScrollListener { attached: wanted });
        }
    }

    fn publish_props(&mut self, signals: &mut Vec<ListSignal>) {
        let props = self.config.to_props();
        let result = self
            .store
            .update_component_props(&self.config.component_id, &props);
        dispatched(result, "update_component_props", &mut self.state, signals);
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Registers the list with the store and executes its first query.
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        info!(
            "{}: mounting in {} mode",
            self.config.component_id,
            self.mode()
        );
        let mut signals = Vec::new();
        let id = self.config.component_id.clone();
        let internal = self.config.internal_component_id();
        self.state.is_loading = true;

        let steps = [
            ("subscribe_to_query_change", self.store.subscribe_to_query_change(&id)),
            ("register_component", self.store.register_component(&internal)),
            ("register_component", self.store.register_component(&id)),
        ];
        for (action, result) in steps {
            dispatched(result, action, &mut self.state, &mut signals);
        }
        if self.config.stream {
            let result = self.store.set_streaming(&id, true);
            dispatched(result, "set_streaming", &mut self.state, &mut signals);
        }

        self.default_query = self.evaluate_default_query();
        self.fragment = self
            .default_query
            .as_ref()
            .map(DefaultQueryFragment::parse)
            .filter(|fragment| !fragment.is_empty());

        // Stage everything without executing, so no partial query fires;
        // the aggregation watch executes the assembled query.
        let options = QueryOptionsBuilder::new(&self.config)
            .after_key(self.results.after_key.as_ref())
            .default_query(self.fragment.as_ref())
            .build(self.state.from);
        let staged = self.store.set_query_options(&id, &options, false);
        dispatched(staged, "set_query_options", &mut self.state, &mut signals);

        let filter = self.fragment.as_ref().and_then(|f| f.query.as_ref());
        let pushed = self.store.update_filter_query(&internal, filter, false);
        dispatched(pushed, "update_filter_query", &mut self.state, &mut signals);

        self.set_react(&mut signals);

        // Leave `from = 0` staged so an upstream query change starts over.
        let reset = self.store.set_query_options(&id, &options.at(0), false);
        dispatched(reset, "set_query_options", &mut self.state, &mut signals);

        self.mounted = true;
        self.sync_scroll_listener(&mut signals);
        self.publish_props(&mut signals);
        self.emit(signals);
    }

    /// Unregisters both component ids and drops the scroll listener.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        info!("{}: unmounting", self.config.component_id);
        let mut signals = Vec::new();
        let id = self.config.component_id.clone();
        let internal = self.config.internal_component_id();

        let public = self.store.unregister_component(&id);
        dispatched(public, "unregister_component", &mut self.state, &mut signals);
        let companion = self.store.unregister_component(&internal);
        dispatched(companion, "unregister_component", &mut self.state, &mut signals);

        self.mounted = false;
        self.sync_scroll_listener(&mut signals);
        self.emit(signals);
    }

    // ── Host hooks ───────────────────────────────────────────────

    /// The store published a new result set for this list.
    pub fn on_result_set_changed(&mut self, update: ResultSet) {
        let mut reconciler = ResultReconciler {
            config: &self.config,
            state: &mut self.state,
            ledger: &mut self.ledger,
            listens_for_page_change: self.observer.listens_for_page_change(),
        };
        let Some(signals) = reconciler.apply(&self.results, &update) else {
            return;
        };
        self.results = update;
        self.emit(signals);
    }

    /// The host replaced the configuration. An invalid configuration is
    /// rejected and the previous one stays in effect.
    pub fn on_config_changed(&mut self, config: ListConfig) -> ListResult<()> {
        config.validate()?;
        let changes = self.config.diff(&config);
        if !self.config.has_pagination_conflict() {
            warn_on_conflict(&config);
        }
        let old_size = self.config.size;
        self.config = config;
        if old_size != self.config.size {
            self.state.resize(old_size, self.config.size);
        }
        if !self.mounted {
            return Ok(());
        }

        let mut signals = Vec::new();
        if changes.is_empty() {
            // Only the default-query factory can still have changed.
            self.refresh_default_query(&mut signals);
            self.emit(signals);
            return Ok(());
        }
        if changes.query_options {
            signals.extend(self.fetcher().update_query_options());
        }
        if changes.stream {
            let result = self
                .store
                .set_streaming(&self.config.component_id, self.config.stream);
            dispatched(result, "set_streaming", &mut self.state, &mut signals);
        }
        if changes.react {
            self.set_react(&mut signals);
        }
        if changes.pagination {
            self.sync_scroll_listener(&mut signals);
        }
        if changes.current_page {
            let page = self.config.current_page;
            if page > 0 && page <= self.total_pages() {
                signals.extend(self.fetcher().set_page(page - 1));
            }
        }
        self.refresh_default_query(&mut signals);
        if changes.props {
            self.publish_props(&mut signals);
        }
        self.emit(signals);
        Ok(())
    }

    fn refresh_default_query(&mut self, signals: &mut Vec<ListSignal>) {
        let Some(fragment) = self.evaluate_default_query() else {
            return;
        };
        if self.default_query.as_ref() == Some(&fragment) {
            return;
        }
        debug!("{}: default query changed", self.config.component_id);
        self.fragment = Some(DefaultQueryFragment::parse(&fragment)).filter(|f| !f.is_empty());
        self.default_query = Some(fragment);
        signals.extend(self.fetcher().apply_default_query());
    }

    /// The query the store built for this list changed.
    ///
    /// In continuous mode a changed filter clause restarts from the first
    /// page, unless `resetPageOnQueryChange` is off.
    pub fn on_query_change(&mut self, old: Option<Value>, new: Option<Value>) {
        let mut signals = Vec::new();
        if let (Some(old_query), Some(new_query)) = (&old, &new) {
            if self.mode().is_continuous()
                && self.config.reset_page_on_query_change
                && old_query.get("query") != new_query.get("query")
            {
                signals.extend(self.fetcher().reset_to_first_page());
            }
        }
        signals.push(ListSignal::QueryChange { old, new });
        self.emit(signals);
    }

    /// The store reported a query error for this list.
    pub fn on_error(&mut self, error: impl Into<String>) {
        let error = error.into();
        warn!("{}: query failed: {error}", self.config.component_id);
        self.state.stop_loading();
        self.emit(vec![ListSignal::Error(error)]);
    }

    /// The viewport scrolled. Loads the next page near the bottom.
    pub fn on_scroll(&mut self, viewport: ViewportMetrics) {
        if self.scroll_listener && !self.state.is_loading && viewport.near_bottom() {
            self.load_more();
        }
    }

    /// A default page was restored from outside (zero-based, `None` when
    /// cleared). In classic mode the list follows it.
    pub fn on_default_page_changed(&mut self, page: Option<u64>) {
        if page == self.state.default_page {
            return;
        }
        if let Some(page) = page {
            let total_pages = self.total_pages();
            if self.results.total.is_some() && page >= total_pages {
                warn!(
                    "{}: restored page {} is past the last page ({total_pages}), ignoring",
                    self.config.component_id,
                    page.saturating_add(1)
                );
                return;
            }
        }
        self.state.default_page = page;
        let target = page.unwrap_or(0);
        if self.mounted && self.mode().is_classic() && target != self.state.current_page {
            let signals = self.fetcher().set_page(target);
            self.emit(signals);
        }
    }

    // ── User actions ─────────────────────────────────────────────

    /// Jumps to a zero-based page.
    pub fn set_page(&mut self, page: u64) {
        let signals = self.fetcher().set_page(page);
        self.emit(signals);
    }

    /// Appends the next page (infinite loading).
    pub fn load_more(&mut self) {
        let signals = self.fetcher().load_more();
        self.emit(signals);
    }

    /// Loads a page at one end of the continuous window.
    pub fn continuous_load_more(&mut self, direction: Direction) {
        let signals = self.fetcher().continuous_load_more(direction);
        self.emit(signals);
    }

    pub fn load_prev(&mut self) {
        self.continuous_load_more(Direction::Prev);
    }

    pub fn load_next(&mut self) {
        self.continuous_load_more(Direction::Next);
    }

    pub fn reset_to_first_page(&mut self) {
        let signals = self.fetcher().reset_to_first_page();
        self.emit(signals);
    }

    /// Applies the `index`-th entry of `sortOptions`.
    pub fn handle_sort_change(&mut self, index: usize) {
        let signals = self.fetcher().handle_sort_change(index);
        self.emit(signals);
    }
}

fn warn_on_conflict(config: &ListConfig) {
    if config.has_pagination_conflict() {
        warn!(
            "{}: pagination is not supported together with aggregationField, \
             the list will use infinite loading",
            config.component_id
        );
    }
}
