//! In-memory `SearchStore`.
//!
//! Queries run synchronously against a [`Dataset`]; the resulting updates
//! are delivered through an unbounded tokio channel, optionally after a
//! delay, the way a networked store would answer.

use crate::engine::Dataset;
use reactivelist_core::{FetchRequest, ListError, ListResult, ReactClause, ReactTerm, SearchStore};
use reactivelist_types::{FetchTag, Hit, QueryOptions, ResultSet};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

/// An update the host forwards to the list.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    Results {
        component_id: String,
        results: ResultSet,
    },
    QueryChange {
        component_id: String,
        old: Option<Value>,
        new: Option<Value>,
    },
    Error {
        component_id: String,
        message: String,
    },
}

impl StoreEvent {
    pub fn component_id(&self) -> &str {
        match self {
            Self::Results { component_id, .. }
            | Self::QueryChange { component_id, .. }
            | Self::Error { component_id, .. } => component_id,
        }
    }
}

/// How a fetched page merges into the component's hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Merge {
    Replace,
    Append,
    Prepend,
}

#[derive(Debug, Default)]
struct Component {
    options: QueryOptions,
    filter: Option<Value>,
    react: Option<ReactClause>,
    hits: Vec<Hit>,
    buckets: Vec<Value>,
    query: Option<Value>,
    subscribed: bool,
    streaming: bool,
    props: Value,
}

/// Search store backed by a [`Dataset`].
pub struct MemoryStore {
    dataset: Dataset,
    components: HashMap<String, Component>,
    url_params: HashMap<String, u64>,
    events: UnboundedSender<StoreEvent>,
    latency: Option<Duration>,
}

impl MemoryStore {
    pub fn new(dataset: Dataset, events: UnboundedSender<StoreEvent>) -> Self {
        Self {
            dataset,
            components: HashMap::new(),
            url_params: HashMap::new(),
            events,
            latency: None,
        }
    }

    /// Delays every update by `latency`. Needs a tokio runtime.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn is_registered(&self, component_id: &str) -> bool {
        self.components.contains_key(component_id)
    }

    /// Page number last published under `param`.
    pub fn url_param(&self, param: &str) -> Option<u64> {
        self.url_params.get(param).copied()
    }

    pub fn is_streaming(&self, component_id: &str) -> bool {
        self.components
            .get(component_id)
            .is_some_and(|c| c.streaming)
    }

    /// Props last published by a component.
    pub fn props(&self, component_id: &str) -> Option<&Value> {
        self.components.get(component_id).map(|c| &c.props)
    }

    /// Options last staged by a component. Fetched pages never replace them,
    /// so a re-run triggered by another component starts from the staged
    /// offset.
    pub fn options(&self, component_id: &str) -> Option<&QueryOptions> {
        self.components.get(component_id).map(|c| &c.options)
    }

    fn component_mut(&mut self, component_id: &str) -> ListResult<&mut Component> {
        self.components
            .get_mut(component_id)
            .ok_or_else(|| ListError::Store(format!("{component_id} is not registered")))
    }

    fn publish(&self, event: StoreEvent) -> ListResult<()> {
        match self.latency {
            Some(latency) if tokio::runtime::Handle::try_current().is_ok() => {
                let events = self.events.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(latency).await;
                    if events.send(event).is_err() {
                        debug!("update dropped, nobody is listening");
                    }
                });
                Ok(())
            }
            _ => self
                .events
                .send(event)
                .map_err(|_| ListError::Store("update channel closed".into())),
        }
    }

    /// Filters contributed by the components `component_id` reacts to.
    fn filters_for(&self, component_id: &str) -> Vec<Value> {
        let mut watched = Vec::new();
        if let Some(react) = self.components.get(component_id).and_then(|c| c.react.as_ref()) {
            collect_components(react, &mut watched);
        }
        watched
            .iter()
            .filter_map(|id| self.components.get(id.as_str()))
            .filter_map(|c| c.filter.clone())
            .collect()
    }

    fn reacts_to(&self, component_id: &str, dependency: &str) -> bool {
        let mut watched = Vec::new();
        if let Some(react) = self.components.get(component_id).and_then(|c| c.react.as_ref()) {
            collect_components(react, &mut watched);
        }
        watched.iter().any(|id| id == dependency)
    }

    /// Runs `options` for a component and publishes the merged result.
    fn execute(
        &mut self,
        component_id: &str,
        options: &QueryOptions,
        merge: Merge,
        tag: Option<FetchTag>,
    ) -> ListResult<()> {
        let started = Instant::now();
        let filters = self.filters_for(component_id);
        let page = match self.dataset.search(&filters, options) {
            Ok(page) => page,
            Err(e) => {
                return self.publish(StoreEvent::Error {
                    component_id: component_id.to_string(),
                    message: e.to_string(),
                });
            }
        };
        debug!(
            "{component_id}: {} of {} hits at {} ({merge:?})",
            page.hits.len(),
            page.total,
            options.from
        );

        let filter = match filters.as_slice() {
            [] => json!({ "match_all": {} }),
            [single] => single.clone(),
            many => json!({ "bool": { "must": many } }),
        };
        let mut query = options.to_value();
        query["query"] = filter;

        let component = self.component_mut(component_id)?;
        match merge {
            Merge::Replace => {
                component.hits = page.hits;
                component.buckets = page.buckets;
            }
            Merge::Append => {
                component.hits.extend(page.hits);
                component.buckets.extend(page.buckets);
            }
            Merge::Prepend => {
                let hits = std::mem::replace(&mut component.hits, page.hits);
                component.hits.extend(hits);
                let buckets = std::mem::replace(&mut component.buckets, page.buckets);
                component.buckets.extend(buckets);
            }
        }

        let query_change = if component.subscribed && component.query.as_ref() != Some(&query) {
            let old = component.query.replace(query.clone());
            Some(StoreEvent::QueryChange {
                component_id: component_id.to_string(),
                old,
                new: Some(query),
            })
        } else {
            None
        };

        let results = ResultSet {
            hits: Some(component.hits.clone()),
            aggregation_data: component.buckets.clone(),
            total: Some(page.total),
            time: started.elapsed().as_millis() as u64,
            after_key: page.after_key,
            tag,
            ..Default::default()
        };

        if let Some(event) = query_change {
            self.publish(event)?;
        }
        self.publish(StoreEvent::Results {
            component_id: component_id.to_string(),
            results,
        })
    }

    fn staged_options(&self, component_id: &str) -> QueryOptions {
        self.components
            .get(component_id)
            .map(|c| c.options.clone())
            .unwrap_or_default()
    }
}

fn collect_components(react: &ReactClause, out: &mut Vec<String>) {
    for term in [&react.and, &react.or, &react.not].into_iter().flatten() {
        collect_term(term, out);
    }
}

fn collect_term(term: &ReactTerm, out: &mut Vec<String>) {
    match term {
        ReactTerm::Component(id) => out.push(id.clone()),
        ReactTerm::List(terms) => terms.iter().for_each(|t| collect_term(t, out)),
        ReactTerm::Clause(clause) => collect_components(clause, out),
    }
}

impl SearchStore for MemoryStore {
    fn register_component(&mut self, component_id: &str) -> ListResult<()> {
        debug!("registering {component_id}");
        self.components.entry(component_id.to_string()).or_default();
        Ok(())
    }

    fn unregister_component(&mut self, component_id: &str) -> ListResult<()> {
        debug!("unregistering {component_id}");
        self.components.remove(component_id);
        Ok(())
    }

    fn set_query_options(
        &mut self,
        component_id: &str,
        options: &QueryOptions,
        execute: bool,
    ) -> ListResult<()> {
        self.component_mut(component_id)?.options = options.clone();
        if execute {
            self.execute(component_id, options, Merge::Replace, None)?;
        }
        Ok(())
    }

    fn update_filter_query(
        &mut self,
        component_id: &str,
        query: Option<&Value>,
        execute: bool,
    ) -> ListResult<()> {
        self.component_mut(component_id)?.filter = query.cloned();
        if !execute {
            return Ok(());
        }
        let dependents: Vec<String> = self
            .components
            .keys()
            .filter(|id| self.reacts_to(id, component_id))
            .cloned()
            .collect();
        for dependent in dependents {
            let options = self.staged_options(&dependent);
            self.execute(&dependent, &options, Merge::Replace, None)?;
        }
        Ok(())
    }

    fn set_aggregation_watch(&mut self, component_id: &str, react: &ReactClause) -> ListResult<()> {
        self.component_mut(component_id)?.react = Some(react.clone());
        let options = self.staged_options(component_id);
        self.execute(component_id, &options, Merge::Replace, None)
    }

    fn fetch_more(&mut self, request: FetchRequest) -> ListResult<()> {
        let merge = if request.prepend {
            Merge::Prepend
        } else if request.append {
            Merge::Append
        } else {
            Merge::Replace
        };
        self.execute(
            &request.component_id,
            &request.options,
            merge,
            Some(request.tag),
        )
    }

    fn subscribe_to_query_change(&mut self, component_id: &str) -> ListResult<()> {
        self.components
            .entry(component_id.to_string())
            .or_default()
            .subscribed = true;
        Ok(())
    }

    fn set_url_param(
        &mut self,
        param: &str,
        page: Option<u64>,
        _component_id: &str,
        _replace: bool,
        _silent: bool,
    ) -> ListResult<()> {
        match page {
            Some(page) => {
                info!("{param}={page}");
                self.url_params.insert(param.to_string(), page);
            }
            None => {
                info!("{param} cleared");
                self.url_params.remove(param);
            }
        }
        Ok(())
    }

    fn set_streaming(&mut self, component_id: &str, enabled: bool) -> ListResult<()> {
        self.component_mut(component_id)?.streaming = enabled;
        Ok(())
    }

    fn update_component_props(&mut self, component_id: &str, props: &Value) -> ListResult<()> {
        self.component_mut(component_id)?.props = props.clone();
        Ok(())
    }
}
