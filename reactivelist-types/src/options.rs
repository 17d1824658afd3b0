//! Query-engine options produced by the list.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::fmt;

/// Sort direction of a sort clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `_source` filtering: which document fields the engine returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFilter {
    pub includes: Vec<String>,
    pub excludes: Vec<String>,
}

impl Default for SourceFilter {
    fn default() -> Self {
        Self {
            includes: vec!["*".to_string()],
            excludes: Vec::new(),
        }
    }
}

/// The options object staged with the store for one component.
///
/// Serializes to the engine's request-body shape: `size`, `from`, `sort`,
/// `_source`, `aggs`, plus any extra top-level keys contributed by a
/// default-query fragment (e.g. `highlight`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryOptions {
    pub size: u64,
    pub from: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<Vec<Value>>,
    #[serde(rename = "_source", default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggs: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl QueryOptions {
    /// Creates options for a window of `size` records starting at `from`.
    pub fn new(size: u64, from: u64) -> Self {
        Self {
            size,
            from,
            ..Default::default()
        }
    }

    /// Returns a copy with a different offset.
    #[must_use]
    pub fn at(&self, from: u64) -> Self {
        Self {
            from,
            ..self.clone()
        }
    }

    /// Builds the single-field sort clause `[{field: {order}}]`.
    pub fn single_sort(field: &str, order: SortOrder) -> Vec<Value> {
        vec![json!({ field: { "order": order.as_str() } })]
    }

    /// Returns the first sort clause as `(field, order)`, if it has that shape.
    pub fn primary_sort(&self) -> Option<(&str, SortOrder)> {
        let clause = self.sort.as_ref()?.first()?.as_object()?;
        let (field, body) = clause.iter().next()?;
        let order = match body.get("order").and_then(Value::as_str) {
            Some("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        };
        Some((field.as_str(), order))
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
