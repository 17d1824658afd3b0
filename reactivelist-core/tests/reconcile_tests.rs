mod common;

use common::{RecordingObserver, hits, loaded, loaded_with, mounted, result_set};
use pretty_assertions::assert_eq;
use reactivelist_core::{
    Direction, FetchLane, FetchLedger, ListConfig, ListSignal, PaginationSetting,
    PaginationState, Record, ResultReconciler, ResultSet,
};

fn names(signals: &[ListSignal]) -> Vec<&'static str> {
    signals.iter().map(ListSignal::name).collect()
}

/// Reconciles `new` against `old` with a hand-made state.
fn reconcile(
    config: &ListConfig,
    state: &mut PaginationState,
    ledger: &mut FetchLedger,
    old: &ResultSet,
    new: &ResultSet,
) -> Option<Vec<ListSignal>> {
    ResultReconciler {
        config,
        state,
        ledger,
        listens_for_page_change: false,
    }
    .apply(old, new)
}

fn infinite() -> ListConfig {
    ListConfig::new("books", "title").with_size(10)
}

fn continuous() -> ListConfig {
    infinite().with_pagination(PaginationSetting::Continuous)
}

fn classic() -> ListConfig {
    infinite().with_pagination(PaginationSetting::Classic)
}

// ── Infinite ─────────────────────────────────────────────────────

#[test]
fn full_window_of_same_length_settles_without_scroll_reset() {
    let config = infinite();
    let mut state = PaginationState::seeded(10, 0, None);
    let mut ledger = FetchLedger::new();

    let old = result_set(0, 10, 10);
    let new = ResultSet::with_hits(hits(100, 110), 10);
    let signals = reconcile(&config, &mut state, &mut ledger, &old, &new).unwrap();

    assert_eq!(names(&signals), vec!["data"]);
    assert!(!state.is_loading);
    assert_eq!(state.from, 0);
}

#[test]
fn shrinking_list_means_query_changed() {
    let config = infinite();
    let mut state = PaginationState::seeded(10, 0, None);
    state.from = 10;
    let mut ledger = FetchLedger::new();
    let in_flight = ledger.issue(FetchLane::Append, 20);

    let old = result_set(0, 20, 30);
    let new = result_set(50, 60, 30);
    let signals = reconcile(&config, &mut state, &mut ledger, &old, &new).unwrap();

    assert_eq!(names(&signals), vec!["data", "scrollToTop"]);
    assert_eq!(state.from, 0);
    assert!(!state.is_loading);
    assert!(ledger.is_stale(&in_flight));
}

#[test]
fn appended_page_settles_loading() {
    let mut list = loaded(infinite(), 30);
    list.load_more();
    let tag = list.store().last_fetch().unwrap().tag;
    list.observer_mut().clear();

    list.on_result_set_changed(result_set(0, 20, 30).tagged(tag));

    assert!(!list.state().is_loading);
    assert_eq!(list.state().from, 10);
    assert_eq!(list.observer().names(), vec!["data"]);
    assert_eq!(list.results().hit_count(), 20);
}

#[test]
fn first_response_settles_loading() {
    let config = infinite();
    let mut state = PaginationState::seeded(10, 0, None);
    let mut ledger = FetchLedger::new();

    let signals = reconcile(
        &config,
        &mut state,
        &mut ledger,
        &ResultSet::default(),
        &result_set(0, 10, 30),
    )
    .unwrap();

    assert_eq!(names(&signals), vec!["data"]);
    assert!(!state.is_loading);
}

// ── Continuous ───────────────────────────────────────────────────

#[test]
fn tagged_next_page_emits_page_add() {
    let config = continuous();
    let mut state = PaginationState::seeded(10, 2, None);
    state.from_next = 20;
    state.is_loading_next = true;
    let mut ledger = FetchLedger::new();
    let tag = ledger.issue(FetchLane::Next, 20);

    let old = result_set(10, 20, 50);
    let new = result_set(10, 30, 50).tagged(tag);
    let signals = reconcile(&config, &mut state, &mut ledger, &old, &new).unwrap();

    assert_eq!(
        signals.last(),
        Some(&ListSignal::PageAdd {
            direction: Direction::Next,
            page: 3,
            total_pages: 5,
        })
    );
    assert!(!state.is_loading_next);
    assert_eq!(state.from, 10);
}

#[test]
fn untagged_prepend_is_inferred_from_first_record() {
    let config = continuous();
    let mut state = PaginationState::seeded(10, 2, None);
    state.is_loading_prev = true;
    let mut ledger = FetchLedger::new();

    let old = result_set(20, 30, 50);
    let new = result_set(10, 30, 50);
    let signals = reconcile(&config, &mut state, &mut ledger, &old, &new).unwrap();

    assert_eq!(
        signals.last(),
        Some(&ListSignal::PageAdd {
            direction: Direction::Prev,
            page: 2,
            total_pages: 5,
        })
    );
    assert!(!state.is_loading_prev);
}

#[test]
fn untagged_append_is_inferred_from_first_record() {
    let config = continuous();
    let mut state = PaginationState::seeded(10, 0, None);
    state.from_next = 10;
    state.is_loading_next = true;
    let mut ledger = FetchLedger::new();

    let old = result_set(0, 10, 50);
    let new = result_set(0, 20, 50);
    let signals = reconcile(&config, &mut state, &mut ledger, &old, &new).unwrap();

    assert!(signals.contains(&ListSignal::PageAdd {
        direction: Direction::Next,
        page: 2,
        total_pages: 5,
    }));
}

#[test]
fn continuous_shrink_does_not_reset() {
    let config = continuous();
    let mut state = PaginationState::seeded(10, 0, None);
    state.from = 20;
    let mut ledger = FetchLedger::new();

    let signals = reconcile(
        &config,
        &mut state,
        &mut ledger,
        &result_set(0, 30, 50),
        &result_set(0, 10, 50),
    )
    .unwrap();

    assert_eq!(names(&signals), vec!["data"]);
    assert_eq!(state.from, 20);
}

#[test]
fn tag_disambiguates_when_window_start_is_unchanged() {
    // A prepend whose first record equals the old one would look like an
    // append without the tag.
    let config = continuous();
    let mut state = PaginationState::seeded(10, 2, None);
    state.is_loading_prev = true;
    let mut ledger = FetchLedger::new();
    let tag = ledger.issue(FetchLane::Prev, 10);

    let old = result_set(10, 20, 50);
    let new = result_set(10, 30, 50).tagged(tag);
    let signals = reconcile(&config, &mut state, &mut ledger, &old, &new).unwrap();

    assert!(matches!(
        signals.last(),
        Some(ListSignal::PageAdd {
            direction: Direction::Prev,
            ..
        })
    ));
}

// ── Staleness ────────────────────────────────────────────────────

#[test]
fn superseded_page_is_dropped() {
    let mut list = loaded(classic(), 50);
    list.set_page(1);
    let first = list.store().last_fetch().unwrap().tag;
    list.set_page(2);
    let second = list.store().last_fetch().unwrap().tag;
    list.observer_mut().clear();

    list.on_result_set_changed(result_set(10, 20, 50).tagged(first));
    assert!(list.observer().signals.is_empty());
    assert_eq!(list.results().hits, Some(hits(0, 10)));
    assert!(list.state().is_loading);

    list.on_result_set_changed(result_set(20, 30, 50).tagged(second));
    assert_eq!(list.observer().names(), vec!["data", "scrollToTop"]);
    assert_eq!(list.results().hits, Some(hits(20, 30)));
    assert!(!list.state().is_loading);
}

#[test]
fn response_from_before_reset_is_dropped() {
    let mut list = loaded(infinite(), 50);
    list.load_more();
    let tag = list.store().last_fetch().unwrap().tag;
    list.reset_to_first_page();
    list.observer_mut().clear();

    list.on_result_set_changed(result_set(0, 20, 50).tagged(tag));

    assert!(list.observer().signals.is_empty());
    assert_eq!(list.results().hit_count(), 10);
}

#[test]
fn stale_check_uses_the_tag_not_the_hits() {
    let config = infinite();
    let mut state = PaginationState::seeded(10, 0, None);
    let mut ledger = FetchLedger::new();
    let tag = ledger.issue(FetchLane::Append, 10);
    ledger.invalidate();

    let update = result_set(0, 20, 50).tagged(tag);
    assert_eq!(
        reconcile(&config, &mut state, &mut ledger, &result_set(0, 10, 50), &update),
        None
    );
    assert!(state.is_loading);
}

// ── Classic ──────────────────────────────────────────────────────

#[test]
fn classic_page_scrolls_to_top_without_listener() {
    let mut list = loaded(classic(), 50);
    list.set_page(2);
    let tag = list.store().last_fetch().unwrap().tag;
    list.observer_mut().clear();

    list.on_result_set_changed(result_set(20, 30, 50).tagged(tag));

    assert_eq!(list.observer().names(), vec!["data", "scrollToTop"]);
}

#[test]
fn classic_page_change_goes_to_listener() {
    let mut list = loaded_with(classic(), 50, RecordingObserver::with_page_change_listener());
    list.set_page(2);
    let tag = list.store().last_fetch().unwrap().tag;
    list.observer_mut().clear();

    list.on_result_set_changed(result_set(20, 30, 50).tagged(tag));

    assert_eq!(
        list.observer().signals[1..].to_vec(),
        vec![ListSignal::PageChange {
            page: 3,
            total_pages: 5,
        }]
    );
}

#[test]
fn total_change_returns_to_first_page() {
    let mut list = loaded(classic(), 50);
    list.set_page(2);
    let tag = list.store().last_fetch().unwrap().tag;
    list.on_result_set_changed(result_set(20, 30, 50).tagged(tag));
    list.observer_mut().clear();

    list.on_result_set_changed(result_set(0, 10, 30));

    assert_eq!(list.state().current_page, 0);
    assert_eq!(list.state().from, 0);
    assert_eq!(
        list.observer().signals.last(),
        Some(&ListSignal::PageChange {
            page: 1,
            total_pages: 3,
        })
    );
}

#[test]
fn total_change_prefers_pending_default_page() {
    let mut list = loaded(classic().with_url_params(None), 50);
    list.set_page(2);
    let tag = list.store().last_fetch().unwrap().tag;
    list.on_result_set_changed(result_set(20, 30, 50).tagged(tag));
    assert_eq!(list.state().default_page, Some(2));

    list.on_result_set_changed(result_set(20, 30, 45));

    assert_eq!(list.state().current_page, 2);
    assert_eq!(list.state().from, 20);
}

#[test]
fn total_dropping_to_zero_keeps_current_page() {
    let mut list = loaded(classic(), 50);
    list.set_page(1);
    let tag = list.store().last_fetch().unwrap().tag;
    list.on_result_set_changed(result_set(10, 20, 50).tagged(tag));
    list.observer_mut().clear();

    list.on_result_set_changed(ResultSet::with_hits(Vec::new(), 0));

    assert_eq!(list.state().current_page, 1);
    assert_eq!(
        list.observer().signals.last(),
        Some(&ListSignal::PageChange {
            page: 2,
            total_pages: 0,
        })
    );
}

#[test]
fn first_total_keeps_requested_page() {
    let mut list = mounted(classic().with_current_page(3));
    list.on_result_set_changed(result_set(20, 30, 50));

    assert_eq!(list.state().current_page, 2);
    assert_eq!(list.state().from, 20);
}

#[test]
fn total_change_ignored_outside_classic_mode() {
    let mut list = loaded(infinite(), 50);
    list.on_result_set_changed(result_set(0, 10, 40));
    assert!(!list.observer().names().contains(&"pageChange"));
}

// ── Other updates ────────────────────────────────────────────────

#[test]
fn promoted_change_only_emits_data() {
    let mut list = loaded(infinite(), 50);
    let mut update = list.results().clone();
    update.promoted_results = vec![Record::new("featured")];

    list.on_result_set_changed(update);

    assert_eq!(list.observer().names(), vec!["data"]);
    assert_eq!(list.data().data[0].id.as_ref().map(|id| id.as_str()), Some("featured"));
}

#[test]
fn unchanged_snapshot_emits_nothing() {
    let mut list = loaded(infinite(), 50);
    let same = list.results().clone();
    list.on_result_set_changed(same);
    assert!(list.observer().signals.is_empty());
}

#[test]
fn new_error_is_reported_once() {
    let mut list = loaded(infinite(), 50);
    list.load_more();
    list.observer_mut().clear();

    let mut failed = list.results().clone();
    failed.error = Some("index not found".into());
    list.on_result_set_changed(failed.clone());
    list.on_result_set_changed(failed);

    assert!(!list.state().is_loading);
    assert_eq!(
        list.observer().signals,
        vec![ListSignal::Error("index not found".into())]
    );
}

#[test]
fn new_buckets_settle_aggregation_paging() {
    let config = infinite().with_aggregation_field("author.keyword");
    let mut state = PaginationState::seeded(10, 0, None);
    let mut ledger = FetchLedger::new();
    let tag = ledger.issue(FetchLane::Append, 10);

    let mut old = ResultSet::with_hits(Vec::new(), 36);
    old.aggregation_data = vec![serde_json::json!({ "key": { "author.keyword": "Austen" } })];
    let mut new = old.clone().tagged(tag);
    new.aggregation_data
        .push(serde_json::json!({ "key": { "author.keyword": "Butler" } }));

    let signals = reconcile(&config, &mut state, &mut ledger, &old, &new).unwrap();

    assert!(!state.is_loading);
    assert_eq!(names(&signals), vec!["data"]);
}

#[test]
fn exhausted_cursor_settles_aggregation_paging() {
    let config = infinite().with_aggregation_field("author.keyword");
    let mut state = PaginationState::seeded(10, 0, None);
    let mut ledger = FetchLedger::new();
    let tag = ledger.issue(FetchLane::Append, 10);

    let mut old = ResultSet::with_hits(Vec::new(), 36);
    old.after_key = Some(serde_json::json!({ "author.keyword": "Butler" }));
    let mut new = old.clone().tagged(tag);
    new.after_key = None;

    reconcile(&config, &mut state, &mut ledger, &old, &new).unwrap();

    assert!(!state.is_loading);
}
