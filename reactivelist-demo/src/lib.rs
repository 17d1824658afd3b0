//! In-memory host for the reactive results list.
//!
//! Provides a [`MemoryStore`] that answers the list's queries from a JSON
//! dataset, a [`PrintObserver`] that renders to stdout, and the small event
//! loop that forwards store updates to the list.

pub mod engine;
mod observer;
mod store;

pub use engine::{Dataset, QueryError, SearchPage};
pub use observer::PrintObserver;
pub use store::{MemoryStore, StoreEvent};

use reactivelist_core::{ListObserver, ResultList};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::debug;

/// Sample dataset bundled with the binary.
pub const SAMPLE_BOOKS: &str = include_str!("../data/books.json");

/// A list hosted by a [`MemoryStore`].
pub type MemoryList<O> = ResultList<MemoryStore, O>;

/// Forwards one store update to the list it belongs to.
pub fn apply_event<O: ListObserver>(list: &mut MemoryList<O>, event: StoreEvent) {
    if event.component_id() != list.config().component_id {
        debug!("skipping update for {}", event.component_id());
        return;
    }
    match event {
        StoreEvent::Results { results, .. } => list.on_result_set_changed(results),
        StoreEvent::QueryChange { old, new, .. } => list.on_query_change(old, new),
        StoreEvent::Error { message, .. } => list.on_error(message),
    }
}

/// Applies updates until none arrives for `idle`. Returns how many were
/// applied.
pub async fn settle<O: ListObserver>(
    list: &mut MemoryList<O>,
    events: &mut UnboundedReceiver<StoreEvent>,
    idle: Duration,
) -> usize {
    let mut applied = 0;
    while let Ok(Some(event)) = tokio::time::timeout(idle, events.recv()).await {
        apply_event(list, event);
        applied += 1;
    }
    applied
}
