//! Shared fixtures: a store that records every action and an observer that
//! records every signal.

#![allow(dead_code)]

use reactivelist_core::{
    FetchRequest, ListConfig, ListError, ListObserver, ListResult, ListSignal, ReactClause,
    ResultList, SearchStore,
};
use reactivelist_types::{Hit, QueryOptions, ResultSet};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum StoreAction {
    Register(String),
    Unregister(String),
    SetQueryOptions {
        id: String,
        options: QueryOptions,
        execute: bool,
    },
    UpdateFilterQuery {
        id: String,
        query: Option<Value>,
        execute: bool,
    },
    Watch {
        id: String,
        react: ReactClause,
    },
    Fetch(FetchRequest),
    Subscribe(String),
    UrlParam {
        param: String,
        page: Option<u64>,
        component_id: String,
        replace: bool,
        silent: bool,
    },
    Streaming {
        id: String,
        enabled: bool,
    },
    Props {
        id: String,
    },
}

#[derive(Debug, Default)]
pub struct RecordingStore {
    pub actions: Vec<StoreAction>,
    pub fail_fetches: bool,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_fetches() -> Self {
        Self {
            actions: Vec::new(),
            fail_fetches: true,
        }
    }

    pub fn fetches(&self) -> Vec<&FetchRequest> {
        self.actions
            .iter()
            .filter_map(|a| match a {
                StoreAction::Fetch(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    pub fn last_fetch(&self) -> Option<&FetchRequest> {
        self.fetches().last().copied()
    }

    pub fn staged_options(&self) -> Vec<(&QueryOptions, bool)> {
        self.actions
            .iter()
            .filter_map(|a| match a {
                StoreAction::SetQueryOptions {
                    options, execute, ..
                } => Some((options, *execute)),
                _ => None,
            })
            .collect()
    }

    pub fn url_params(&self) -> Vec<Option<u64>> {
        self.actions
            .iter()
            .filter_map(|a| match a {
                StoreAction::UrlParam { page, .. } => Some(*page),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }
}

impl SearchStore for RecordingStore {
    fn register_component(&mut self, component_id: &str) -> ListResult<()> {
        self.actions
            .push(StoreAction::Register(component_id.to_string()));
        Ok(())
    }

    fn unregister_component(&mut self, component_id: &str) -> ListResult<()> {
        self.actions
            .push(StoreAction::Unregister(component_id.to_string()));
        Ok(())
    }

    fn set_query_options(
        &mut self,
        component_id: &str,
        options: &QueryOptions,
        execute: bool,
    ) -> ListResult<()> {
        self.actions.push(StoreAction::SetQueryOptions {
            id: component_id.to_string(),
            options: options.clone(),
            execute,
        });
        Ok(())
    }

    fn update_filter_query(
        &mut self,
        component_id: &str,
        query: Option<&Value>,
        execute: bool,
    ) -> ListResult<()> {
        self.actions.push(StoreAction::UpdateFilterQuery {
            id: component_id.to_string(),
            query: query.cloned(),
            execute,
        });
        Ok(())
    }

    fn set_aggregation_watch(&mut self, component_id: &str, react: &ReactClause) -> ListResult<()> {
        self.actions.push(StoreAction::Watch {
            id: component_id.to_string(),
            react: react.clone(),
        });
        Ok(())
    }

    fn fetch_more(&mut self, request: FetchRequest) -> ListResult<()> {
        if self.fail_fetches {
            return Err(ListError::Store("store is offline".into()));
        }
        self.actions.push(StoreAction::Fetch(request));
        Ok(())
    }

    fn subscribe_to_query_change(&mut self, component_id: &str) -> ListResult<()> {
        self.actions
            .push(StoreAction::Subscribe(component_id.to_string()));
        Ok(())
    }

    fn set_url_param(
        &mut self,
        param: &str,
        page: Option<u64>,
        component_id: &str,
        replace: bool,
        silent: bool,
    ) -> ListResult<()> {
        self.actions.push(StoreAction::UrlParam {
            param: param.to_string(),
            page,
            component_id: component_id.to_string(),
            replace,
            silent,
        });
        Ok(())
    }

    fn set_streaming(&mut self, component_id: &str, enabled: bool) -> ListResult<()> {
        self.actions.push(StoreAction::Streaming {
            id: component_id.to_string(),
            enabled,
        });
        Ok(())
    }

    fn update_component_props(&mut self, component_id: &str, _props: &Value) -> ListResult<()> {
        self.actions.push(StoreAction::Props {
            id: component_id.to_string(),
        });
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingObserver {
    pub signals: Vec<ListSignal>,
    pub page_change_listener: bool,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_change_listener() -> Self {
        Self {
            signals: Vec::new(),
            page_change_listener: true,
        }
    }

    /// Signal names, without payloads.
    pub fn names(&self) -> Vec<&'static str> {
        self.signals.iter().map(ListSignal::name).collect()
    }

    pub fn contains(&self, signal: &ListSignal) -> bool {
        self.signals.contains(signal)
    }

    pub fn clear(&mut self) {
        self.signals.clear();
    }
}

impl ListObserver for RecordingObserver {
    fn on_signal(&mut self, signal: ListSignal) {
        self.signals.push(signal);
    }

    fn listens_for_page_change(&self) -> bool {
        self.page_change_listener
    }
}

pub type TestList = ResultList<RecordingStore, RecordingObserver>;

/// Hits `h{start}` .. `h{end - 1}`.
pub fn hits(start: u64, end: u64) -> Vec<Hit> {
    (start..end)
        .map(|i| Hit::new(format!("h{i}")).with_field("rank", i))
        .collect()
}

pub fn result_set(start: u64, end: u64, total: u64) -> ResultSet {
    ResultSet::with_hits(hits(start, end), total)
}

/// Creates and mounts a list, then clears what mounting recorded.
pub fn mounted(config: ListConfig) -> TestList {
    mounted_with(config, RecordingObserver::new())
}

pub fn mounted_with(config: ListConfig, observer: RecordingObserver) -> TestList {
    let mut list = ResultList::new(config, RecordingStore::new(), observer).unwrap();
    list.mount();
    list.store_mut().clear();
    list.observer_mut().clear();
    list
}

/// Mounts a list and delivers its first page out of `total`.
pub fn loaded(config: ListConfig, total: u64) -> TestList {
    loaded_with(config, total, RecordingObserver::new())
}

pub fn loaded_with(config: ListConfig, total: u64, observer: RecordingObserver) -> TestList {
    let size = config.size;
    let from = config.current_page.saturating_sub(1) * size;
    let mut list = mounted_with(config, observer);
    list.on_result_set_changed(result_set(from, (from + size).min(total), total));
    list.store_mut().clear();
    list.observer_mut().clear();
    list
}
