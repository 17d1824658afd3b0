//! A tiny query engine over an in-memory dataset.
//!
//! Understands just enough of the engine's request body for the demo:
//! `term`, `match`, `match_all` and `bool` filters, a single-field sort,
//! `_source` projection and one composite terms aggregation.

use reactivelist_types::{Hit, QueryOptions, SortOrder, SourceFilter};
use serde_json::{Map, Value, json};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// A query the engine cannot run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("unsupported aggregation `{0}`, only composite terms aggregations are supported")]
    UnsupportedAggregation(String),
}

/// One page of a search.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchPage {
    pub hits: Vec<Hit>,
    /// Number of documents matching the filters.
    pub total: u64,
    /// Composite aggregation buckets of this page.
    pub buckets: Vec<Value>,
    pub after_key: Option<Value>,
}

/// The searchable documents.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    hits: Vec<Hit>,
}

impl Dataset {
    pub fn new(hits: Vec<Hit>) -> Self {
        Self { hits }
    }

    /// Parses a JSON array of hits in the engine's shape.
    pub fn from_json(json: &str) -> reactivelist_types::Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Runs `options` against every document matching all `filters`.
    pub fn search(
        &self,
        filters: &[Value],
        options: &QueryOptions,
    ) -> Result<SearchPage, QueryError> {
        let mut matched: Vec<&Hit> = self
            .hits
            .iter()
            .filter(|hit| filters.iter().all(|filter| matches(hit, filter)))
            .collect();

        if let Some((field, order)) = options.primary_sort() {
            let field = source_field(field);
            matched.sort_by(|a, b| match (a.source.get(field), b.source.get(field)) {
                (Some(a), Some(b)) => match order {
                    SortOrder::Asc => compare(a, b),
                    SortOrder::Desc => compare(a, b).reverse(),
                },
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            });
        }

        let total = matched.len() as u64;
        if let Some(aggs) = &options.aggs {
            let page = aggregate(&matched, aggs)
                .ok_or_else(|| QueryError::UnsupportedAggregation(aggs.to_string()))?;
            return Ok(SearchPage { total, ..page });
        }

        let source = options.source.clone().unwrap_or_default();
        let hits = matched
            .into_iter()
            .skip(options.from as usize)
            .take(options.size as usize)
            .map(|hit| project(hit, &source))
            .collect();
        Ok(SearchPage {
            hits,
            total,
            ..Default::default()
        })
    }
}

/// Keyword sub-fields are stored on the plain field.
fn source_field(field: &str) -> &str {
    field.strip_suffix(".keyword").unwrap_or(field)
}

/// Whether `hit` satisfies one filter clause. Unknown clauses match.
pub fn matches(hit: &Hit, filter: &Value) -> bool {
    let Some((kind, body)) = filter.as_object().and_then(|o| o.iter().next()) else {
        return true;
    };
    match kind.as_str() {
        "match_all" => true,
        "term" => field_clause(body).is_none_or(|(field, expected)| {
            match hit.source.get(source_field(field)) {
                Some(Value::Array(values)) => values.contains(expected),
                Some(value) => value == expected,
                None => false,
            }
        }),
        "match" => field_clause(body).is_none_or(|(field, expected)| {
            let needle = expected.as_str().unwrap_or_default().to_lowercase();
            hit.source
                .get(source_field(field))
                .and_then(Value::as_str)
                .is_some_and(|text| text.to_lowercase().contains(&needle))
        }),
        "bool" => {
            let clauses = |key: &str| -> Vec<Value> {
                match body.get(key) {
                    Some(Value::Array(items)) => items.clone(),
                    Some(item) => vec![item.clone()],
                    None => Vec::new(),
                }
            };
            let should = clauses("should");
            clauses("must").iter().all(|c| matches(hit, c))
                && clauses("filter").iter().all(|c| matches(hit, c))
                && !clauses("must_not").iter().any(|c| matches(hit, c))
                && (should.is_empty() || should.iter().any(|c| matches(hit, c)))
        }
        other => {
            debug!("unsupported filter `{other}`, matching everything");
            true
        }
    }
}

fn field_clause(body: &Value) -> Option<(&String, &Value)> {
    body.as_object()?.iter().next()
}

/// Orders JSON scalars: numbers numerically, strings lexically. Documents
/// missing the sort field go last in either direction.
fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (a, b) => a.to_string().cmp(&b.to_string()),
    }
}

/// Applies `_source` includes and excludes.
pub fn project(hit: &Hit, source: &SourceFilter) -> Hit {
    let keep_all = source.includes.is_empty() || source.includes.iter().any(|f| f == "*");
    let fields: Map<String, Value> = hit
        .source
        .iter()
        .filter(|(key, _)| keep_all || source.includes.contains(*key))
        .filter(|(key, _)| !source.excludes.contains(*key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    Hit {
        source: fields,
        ..hit.clone()
    }
}

/// Pages through composite terms buckets. Returns `None` when `aggs` is
/// not a composite aggregation.
fn aggregate(matched: &[&Hit], aggs: &Value) -> Option<SearchPage> {
    let (name, body) = aggs.as_object()?.iter().next()?;
    let composite = body.get("composite")?;
    let terms = composite["sources"][0][name.as_str()].get("terms")?;
    let field = source_field(terms.get("field")?.as_str()?);
    let size = composite.get("size").and_then(Value::as_u64).unwrap_or(10) as usize;
    let descending = terms.get("order").and_then(Value::as_str) == Some("desc");
    let after = composite
        .get("after")
        .and_then(|after| after.get(name.as_str()))
        .map(bucket_key);

    let mut groups: BTreeMap<String, (Value, u64, &Hit)> = BTreeMap::new();
    for hit in matched {
        let Some(value) = hit.source.get(field) else {
            continue;
        };
        groups
            .entry(bucket_key(value))
            .and_modify(|(_, count, _)| *count += 1)
            .or_insert((value.clone(), 1, *hit));
    }

    let ordered: Vec<_> = if descending {
        groups.into_iter().rev().collect()
    } else {
        groups.into_iter().collect()
    };
    let buckets: Vec<Value> = ordered
        .into_iter()
        .filter(|(key, _)| match &after {
            Some(after) if descending => key < after,
            Some(after) => key > after,
            None => true,
        })
        .take(size)
        .map(|(_, (value, count, top))| {
            json!({
                "key": { name.as_str(): value },
                "doc_count": count,
                name.as_str(): { "hits": { "hits": [top] } },
            })
        })
        .collect();
    let after_key = buckets.last().map(|bucket| bucket["key"].clone());

    Some(SearchPage {
        hits: Vec::new(),
        total: 0,
        buckets,
        after_key,
    })
}

fn bucket_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
