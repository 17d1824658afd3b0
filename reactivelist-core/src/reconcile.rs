//! Result reconciler.
//!
//! Runs whenever the store publishes a new result set for the list. It
//! decides which loading flags a response settles, whether the upstream
//! query changed under the list, and which signals the renderer gets.

use crate::config::ListConfig;
use crate::fetch::FetchLedger;
use crate::mode::{PaginationMode, total_pages};
use crate::signal::ListSignal;
use crate::state::PaginationState;
use crate::view::DerivedView;
use reactivelist_types::{Direction, Hit, ResultSet};
use tracing::debug;

/// Borrows what reconciling one update touches.
pub struct ResultReconciler<'a> {
    pub config: &'a ListConfig,
    pub state: &'a mut PaginationState,
    pub ledger: &'a mut FetchLedger,
    /// The host handles `PageChange` itself.
    pub listens_for_page_change: bool,
}

impl ResultReconciler<'_> {
    fn mode(&self) -> PaginationMode {
        PaginationMode::select(self.config)
    }

    fn data(&self, results: &ResultSet) -> ListSignal {
        let view = DerivedView::compute(results, self.state.current_page, self.config.size);
        ListSignal::Data(Box::new(
            view.into_data(self.state.any_loading(), results.error.clone()),
        ))
    }

    /// Reconciles `new` against the previous snapshot `old`.
    ///
    /// Returns `None` when `new` answers a superseded fetch; the caller keeps
    /// `old` in that case.
    pub fn apply(&mut self, old: &ResultSet, new: &ResultSet) -> Option<Vec<ListSignal>> {
        if let Some(tag) = &new.tag {
            if self.ledger.is_stale(tag) {
                debug!(
                    "{}: dropping stale response (generation {}, {:?} at {})",
                    self.config.component_id, tag.generation, tag.lane, tag.offset
                );
                return None;
            }
        }

        // Composite paging leaves the hits alone; new buckets or a moved
        // cursor answer it.
        if self.config.aggregation_field.is_some()
            && (old.aggregation_data != new.aggregation_data || old.after_key != new.after_key)
        {
            self.state.is_loading = false;
        }

        let mut signals = Vec::new();
        if old.hits != new.hits || new.tag.is_some() {
            self.on_hits_changed(old, new, &mut signals);
        } else if old.stream_hits != new.stream_hits
            || old.promoted_results != new.promoted_results
            || old.aggregation_data != new.aggregation_data
            || old.hidden != new.hidden
            || old.time != new.time
        {
            signals.push(self.data(new));
        }

        // The first total only reports the mount query; the requested page
        // stands.
        if old.total.is_some() && old.total != new.total {
            self.on_total_changed(new.total, &mut signals);
        }

        if let Some(error) = &new.error {
            if old.error.as_ref() != Some(error) {
                self.state.stop_loading();
                signals.push(ListSignal::Error(error.clone()));
            }
        }
        Some(signals)
    }

    /// The hit list changed: settle loading flags and emit page signals.
    pub fn on_hits_changed(
        &mut self,
        old: &ResultSet,
        new: &ResultSet,
        signals: &mut Vec<ListSignal>,
    ) {
        signals.push(self.data(new));
        let mode = self.mode();
        let total_pages = total_pages(new.total, self.config.size);
        let old_hits = old.hits.as_deref();
        let new_hits = new.hits.as_deref();

        if mode.is_classic() {
            if self.state.is_loading && (old_hits.is_some() || new_hits.is_some()) {
                if self.listens_for_page_change {
                    signals.push(ListSignal::PageChange {
                        page: self.state.current_page.saturating_add(1),
                        total_pages,
                    });
                } else {
                    signals.push(ListSignal::ScrollToTop);
                }
                self.state.is_loading = false;
            }
        } else if let (Some(old_hits), Some(new_hits)) = (old_hits, new_hits) {
            if old_hits.len() != new_hits.len() || new.total == Some(new_hits.len() as u64) {
                self.state.is_loading = false;

                // A shorter list outside continuous mode means the upstream
                // query changed and the store started over.
                if !mode.is_continuous() && new_hits.len() < old_hits.len() {
                    debug!(
                        "{}: hit list shrank from {} to {}, back to first page",
                        self.config.component_id,
                        old_hits.len(),
                        new_hits.len()
                    );
                    signals.push(ListSignal::ScrollToTop);
                    self.state.from = 0;
                    self.ledger.invalidate();
                }
            }
        } else if old_hits.is_none_or(<[Hit]>::is_empty) && new_hits.is_some() {
            self.state.is_loading = false;
        }

        if mode.is_continuous()
            && old_hits.is_some_and(|h| !h.is_empty())
            && new_hits.is_some_and(|h| !h.is_empty())
            && (self.state.is_loading_prev || self.state.is_loading_next)
        {
            let direction = new
                .tag
                .and_then(|tag| tag.lane.direction())
                .unwrap_or_else(|| infer_direction(old_hits, new_hits));

            let used_offset = match direction {
                Direction::Next => {
                    self.state.is_loading_next = false;
                    self.state.from_next
                }
                Direction::Prev => {
                    self.state.is_loading_prev = false;
                    self.state.from
                }
            };
            signals.push(ListSignal::PageAdd {
                direction,
                page: used_offset.div_ceil(self.config.size).saturating_add(1),
                total_pages,
            });
        }
    }

    /// The total changed: classic pagination goes back to the first page,
    /// or to the pending default page.
    pub fn on_total_changed(&mut self, total: Option<u64>, signals: &mut Vec<ListSignal>) {
        if !self.mode().is_classic() {
            return;
        }
        let mut page = if total.unwrap_or(0) > 0 {
            0
        } else {
            self.state.current_page
        };
        if let Some(default_page) = self.state.default_page {
            page = default_page;
        }
        if !self.state.jump_to(page, self.config.size) {
            debug!(
                "{}: page {page} is out of range, staying on {}",
                self.config.component_id, self.state.current_page
            );
            page = self.state.current_page;
        }
        signals.push(ListSignal::PageChange {
            page: page.saturating_add(1),
            total_pages: total_pages(total, self.config.size),
        });
    }
}

/// Guesses the direction of an untagged continuous response: an unchanged
/// first record means the page was appended.
fn infer_direction(old: Option<&[Hit]>, new: Option<&[Hit]>) -> Direction {
    let first_id = |hits: Option<&[Hit]>| hits.and_then(|h| h.first()).map(|hit| hit.id.clone());
    if first_id(old) == first_id(new) {
        Direction::Next
    } else {
        Direction::Prev
    }
}
