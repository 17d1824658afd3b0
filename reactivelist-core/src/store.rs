//! The search store the list talks to.
//!
//! The store owns hits, aggregations and errors for every registered
//! component and executes the queries. The list only dispatches actions;
//! results come back through [`crate::ResultList::on_result_set_changed`],
//! never as a return value, so a store is free to coalesce or drop requests.

use crate::config::ReactClause;
use crate::error::ListResult;
use reactivelist_types::{FetchTag, QueryOptions};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A "load more" / "set page" request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchRequest {
    pub component_id: String,
    pub options: QueryOptions,
    /// Append the page after the current window.
    pub append: bool,
    /// Prepend the page before the current window.
    pub prepend: bool,
    /// Page through composite aggregation buckets instead of hits.
    pub is_aggregation: bool,
    /// Stores should echo this on the resulting [`reactivelist_types::ResultSet`].
    pub tag: FetchTag,
}

/// Actions the list dispatches to the store.
///
/// Every action is fire-and-forget. An `Err` means the action could not be
/// dispatched at all; query failures are reported later through the
/// component's result set.
pub trait SearchStore {
    /// Registers a component id.
    fn register_component(&mut self, component_id: &str) -> ListResult<()>;

    /// Removes a component id and everything the store holds for it.
    fn unregister_component(&mut self, component_id: &str) -> ListResult<()>;

    /// Stages query options. With `execute = false` nothing is queried yet.
    fn set_query_options(
        &mut self,
        component_id: &str,
        options: &QueryOptions,
        execute: bool,
    ) -> ListResult<()>;

    /// Sets the filter query a component contributes to its dependents.
    fn update_filter_query(
        &mut self,
        component_id: &str,
        query: Option<&Value>,
        execute: bool,
    ) -> ListResult<()>;

    /// Declares which components' filters this component reacts to. Executes
    /// the component's query.
    fn set_aggregation_watch(&mut self, component_id: &str, react: &ReactClause)
    -> ListResult<()>;

    /// Fetches a page and merges it into the component's hits.
    fn fetch_more(&mut self, request: FetchRequest) -> ListResult<()>;

    /// Asks the store to report query changes and query errors for the
    /// component to the host.
    fn subscribe_to_query_change(&mut self, component_id: &str) -> ListResult<()>;

    /// Publishes a page number under a URL parameter. `None` clears it.
    fn set_url_param(
        &mut self,
        param: &str,
        page: Option<u64>,
        component_id: &str,
        replace: bool,
        silent: bool,
    ) -> ListResult<()>;

    /// Turns live updates on or off.
    fn set_streaming(&mut self, component_id: &str, enabled: bool) -> ListResult<()> {
        let _ = (component_id, enabled);
        Ok(())
    }

    /// Publishes the component's props for other components to inspect.
    fn update_component_props(&mut self, component_id: &str, props: &Value) -> ListResult<()> {
        let _ = (component_id, props);
        Ok(())
    }
}
