//! Pagination and query-state reconciliation core of a reactive search
//! results list.
//!
//! The list binds a search store (which owns hits, aggregations and errors
//! per component and executes queries) to a renderer (which draws whatever
//! the list hands it). This crate holds only the logic in between: what to
//! fetch, when, and how to interpret what comes back.
//!
//! # Architecture
//!
//! - **Query options** ([`query`]): config → engine options (sort, `_source`,
//!   composite aggregation, default-query fragment).
//! - **Mode** ([`mode`]): classic pages, infinite loading, or continuous
//!   (bidirectional) loading.
//! - **Fetch** ([`fetch`]): `set_page`, `load_more`, `continuous_load_more`,
//!   each request tagged with a generation so superseded responses can be
//!   dropped.
//! - **Reconcile** ([`reconcile`]): settles loading flags and emits page
//!   signals when the store publishes new hits.
//! - **Lifecycle** ([`ResultList`]): registration with the store, prop-change
//!   handling, host hooks.
//!
//! The store is reached through the [`SearchStore`] trait and the renderer
//! through [`ListObserver`]. Neither side calls back into the list directly;
//! the host forwards store updates to [`ResultList::on_result_set_changed`].
//!
//! # Example
//!
//! ```no_run
//! use reactivelist_core::{ListConfig, NoopObserver, PaginationSetting, ResultList, SearchStore};
//!
//! fn mount_list<S: SearchStore>(store: S) -> reactivelist_core::ListResult<()> {
//!     let config = ListConfig::new("results", "title")
//!         .with_size(20)
//!         .with_pagination(PaginationSetting::Classic);
//!     let mut list = ResultList::new(config, store, NoopObserver)?;
//!     list.mount();
//!     list.set_page(2);
//!     Ok(())
//! }
//! ```

pub mod config;
mod error;
pub mod fetch;
mod lifecycle;
pub mod mode;
pub mod query;
pub mod reconcile;
pub mod signal;
pub mod state;
pub mod store;
pub mod view;

pub use config::{
    ConfigChanges, DefaultQuery, ListConfig, PaginationAt, PaginationSetting, ReactClause,
    ReactTerm, SortOption,
};
pub use error::{ListError, ListResult};
pub use fetch::{FetchController, FetchLedger};
pub use lifecycle::{ResultList, SCROLL_THRESHOLD, ViewportMetrics};
pub use mode::{PaginationMode, total_pages};
pub use query::{DefaultQueryFragment, QueryOptionsBuilder, build_query_options};
pub use reconcile::ResultReconciler;
pub use signal::{ListObserver, ListSignal, NoopObserver};
pub use state::PaginationState;
pub use store::{FetchRequest, SearchStore};
pub use view::{DerivedView, ListData, ResultStats, dedup};

pub use reactivelist_types::{
    Direction, FetchLane, FetchTag, Hit, HitId, QueryOptions, Record, ResultSet, SortOrder,
};
