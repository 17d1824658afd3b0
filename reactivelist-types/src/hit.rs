//! Raw search hits and the flattened records rendered by the list.

use crate::HitId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A hit as returned by the query engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    #[serde(rename = "_id")]
    pub id: HitId,
    #[serde(rename = "_index", default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    #[serde(rename = "_score", default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(rename = "_source", default)]
    pub source: Map<String, Value>,
    /// Highlighted fragments per field, when highlighting was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<Map<String, Value>>,
}

impl Hit {
    /// Creates a hit with an empty source document.
    pub fn new(id: impl Into<HitId>) -> Self {
        Self {
            id: id.into(),
            index: None,
            score: None,
            source: Map::new(),
            highlight: None,
        }
    }

    /// Adds a source field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.source.insert(key.into(), value.into());
        self
    }
}

/// A hit flattened for display: source fields at the top level, engine
/// metadata under underscore-prefixed keys.
///
/// Promoted results are published by the store already flattened and may
/// lack an `_id`; such records never take part in deduplication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<HitId>,
    #[serde(rename = "_index", default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    #[serde(rename = "_score", default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Absolute position of the record in the result window, for click
    /// analytics. Only set on records handed to the renderer.
    #[serde(rename = "_click_id", default, skip_serializing_if = "Option::is_none")]
    pub click_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub highlight: Map<String, Value>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record {
    /// Creates an empty record with the given id.
    pub fn new(id: impl Into<HitId>) -> Self {
        Self {
            id: Some(id.into()),
            index: None,
            score: None,
            click_id: None,
            highlight: Map::new(),
            fields: Map::new(),
        }
    }

    /// Flattens a raw hit.
    pub fn from_hit(hit: &Hit) -> Self {
        Self {
            id: Some(hit.id.clone()),
            index: hit.index.clone(),
            score: hit.score,
            click_id: None,
            highlight: hit.highlight.clone().unwrap_or_default(),
            fields: hit.source.clone(),
        }
    }

    /// Adds a field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Looks up a field by name.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Returns the id if it is present and non-empty.
    pub fn dedup_key(&self) -> Option<&HitId> {
        self.id.as_ref().filter(|id| !id.is_empty())
    }
}

impl From<&Hit> for Record {
    fn from(hit: &Hit) -> Self {
        Self::from_hit(hit)
    }
}

/// Flattens a list of raw hits, preserving order.
pub fn parse_hits(hits: &[Hit]) -> Vec<Record> {
    hits.iter().map(Record::from_hit).collect()
}
