//! Query options builder.
//!
//! Turns a [`ListConfig`] into the options object staged with the store.
//! Everything in here is pure: the same config, offset, cursor and default
//! query fragment always produce the same options.

use crate::config::ListConfig;
use crate::state::page_offset;
use reactivelist_types::{QueryOptions, SourceFilter};
use serde_json::{Map, Value, json};

/// A default-query fragment split into its parts.
///
/// `sort` overrides the list's own sort, `query` is the filter pushed to the
/// internal companion component, and every other top-level key is merged
/// into the options. Malformed parts are treated as absent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DefaultQueryFragment {
    pub sort: Option<Vec<Value>>,
    pub query: Option<Value>,
    pub options: Map<String, Value>,
}

impl DefaultQueryFragment {
    /// Splits a fragment. Anything other than a JSON object yields an empty
    /// fragment.
    pub fn parse(fragment: &Value) -> Self {
        let Some(object) = fragment.as_object() else {
            return Self::default();
        };

        let mut parsed = Self::default();
        for (key, value) in object {
            match key.as_str() {
                "sort" => parsed.sort = normalize_sort(value),
                "query" => {
                    if !value.is_null() {
                        parsed.query = Some(value.clone());
                    }
                }
                _ => {
                    parsed.options.insert(key.clone(), value.clone());
                }
            }
        }
        parsed
    }

    /// Whether the fragment carries anything at all.
    pub fn is_empty(&self) -> bool {
        self.sort.is_none() && self.query.is_none() && self.options.is_empty()
    }
}

fn normalize_sort(value: &Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(clauses) if !clauses.is_empty() => Some(clauses.clone()),
        Value::Object(_) | Value::String(_) => Some(vec![value.clone()]),
        _ => None,
    }
}

/// Size and `_source` filtering, without sort or offset.
pub fn base_options(config: &ListConfig) -> QueryOptions {
    let mut options = QueryOptions::new(config.size, 0);
    options.source = Some(SourceFilter {
        includes: config.include_fields.clone(),
        excludes: config.exclude_fields.clone(),
    });
    options
}

/// The sort clause implied by the config.
///
/// The first `sortOptions` entry wins over the scalar `sortBy`; with neither
/// the engine's relevance order applies.
pub fn sort_clause(config: &ListConfig) -> Option<Vec<Value>> {
    if let Some(first) = config.sort_options.as_ref().and_then(|o| o.first()) {
        return Some(QueryOptions::single_sort(&first.data_field, first.sort_by));
    }
    config
        .sort_by
        .map(|order| QueryOptions::single_sort(&config.data_field, order))
}

/// Composite aggregation over `aggregationField`, continuing after
/// `after_key` when one is known.
pub fn aggs_query(config: &ListConfig, after_key: Option<&Value>) -> Option<Value> {
    let field = config.aggregation_field.as_deref()?;

    let mut terms = json!({ "field": field });
    if let Some(order) = config.sort_by {
        terms["order"] = json!(order.as_str());
    }

    let mut composite = json!({
        "sources": [{ field: { "terms": terms } }],
        "size": config.size,
    });
    if let Some(after) = after_key {
        composite["after"] = after.clone();
    }

    Some(json!({
        field: {
            "composite": composite,
            "aggs": { field: { "top_hits": { "size": 1 } } },
        }
    }))
}

/// Builds query options for one list.
#[derive(Debug, Clone, Copy)]
pub struct QueryOptionsBuilder<'a> {
    config: &'a ListConfig,
    after_key: Option<&'a Value>,
    fragment: Option<&'a DefaultQueryFragment>,
}

impl<'a> QueryOptionsBuilder<'a> {
    pub fn new(config: &'a ListConfig) -> Self {
        Self {
            config,
            after_key: None,
            fragment: None,
        }
    }

    /// Continue the aggregation after this cursor.
    pub fn after_key(mut self, after_key: Option<&'a Value>) -> Self {
        self.after_key = after_key;
        self
    }

    /// Merge a default-query fragment.
    pub fn default_query(mut self, fragment: Option<&'a DefaultQueryFragment>) -> Self {
        self.fragment = fragment;
        self
    }

    /// Builds the options for a window starting at `offset`.
    pub fn build(&self, offset: u64) -> QueryOptions {
        let mut options = base_options(self.config);
        options.from = offset;
        options.sort = sort_clause(self.config);

        if let Some(fragment) = self.fragment {
            merge_fragment(&mut options, fragment);
        }

        // Page size and aggregation always come from the list itself.
        options.size = self.config.size;
        if let Some(aggs) = aggs_query(self.config, self.after_key) {
            options.aggs = Some(aggs);
        }
        options
    }
}

fn merge_fragment(options: &mut QueryOptions, fragment: &DefaultQueryFragment) {
    for (key, value) in &fragment.options {
        match key.as_str() {
            "from" => {
                if let Some(from) = value.as_u64() {
                    options.from = from;
                }
            }
            "size" => {}
            "_source" => {
                if let Ok(source) = serde_json::from_value::<SourceFilter>(value.clone()) {
                    options.source = Some(source);
                }
            }
            "aggs" => options.aggs = Some(value.clone()),
            _ => {
                options.extra.insert(key.clone(), value.clone());
            }
        }
    }
    if let Some(sort) = &fragment.sort {
        options.sort = Some(sort.clone());
    }
}

/// Shorthand for `QueryOptionsBuilder::new(config).build(offset)`.
pub fn build_query_options(config: &ListConfig, offset: u64) -> QueryOptions {
    QueryOptionsBuilder::new(config).build(offset)
}

/// Options for a server-side prefetch, before any state exists: the offset
/// comes from the 1-based `currentPage` option.
pub fn initial_query_options(config: &ListConfig) -> QueryOptions {
    let offset = page_offset(config.current_page.saturating_sub(1), config.size).unwrap_or(0);
    build_query_options(config, offset)
}
