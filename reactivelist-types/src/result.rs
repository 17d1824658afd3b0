//! Per-component result sets as published by the store.

use crate::{FetchTag, Hit, Record, parse_hits};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Everything the store holds for one component at a point in time.
///
/// The store owns this data; the list only reads a snapshot per update.
/// `hits` is `None` until the first response arrives, which is different
/// from an empty response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSet {
    #[serde(default)]
    pub hits: Option<Vec<Hit>>,
    /// Hits pushed through live updates.
    #[serde(default)]
    pub stream_hits: Vec<Hit>,
    /// Pinned records, already flattened.
    #[serde(default)]
    pub promoted_results: Vec<Record>,
    /// Composite aggregation buckets.
    #[serde(default)]
    pub aggregation_data: Vec<Value>,
    #[serde(default)]
    pub total: Option<u64>,
    /// Query time in milliseconds.
    #[serde(default)]
    pub time: u64,
    /// Number of hits hidden by the engine.
    #[serde(default)]
    pub hidden: u64,
    #[serde(default)]
    pub error: Option<String>,
    /// Cursor of the next composite aggregation page.
    #[serde(default)]
    pub after_key: Option<Value>,
    /// Tag of the fetch this update answers, when the store echoes it.
    #[serde(default)]
    pub tag: Option<FetchTag>,
}

impl ResultSet {
    /// Creates a result set holding `hits` out of `total`.
    pub fn with_hits(hits: Vec<Hit>, total: u64) -> Self {
        Self {
            hits: Some(hits),
            total: Some(total),
            ..Default::default()
        }
    }

    /// Marks this update as the answer to `tag`.
    #[must_use]
    pub fn tagged(mut self, tag: FetchTag) -> Self {
        self.tag = Some(tag);
        self
    }

    /// Flattened base hits, `None` before the first response.
    pub fn records(&self) -> Option<Vec<Record>> {
        self.hits.as_deref().map(parse_hits)
    }

    pub fn stream_records(&self) -> Vec<Record> {
        parse_hits(&self.stream_hits)
    }

    /// Number of base hits currently held, `0` before the first response.
    pub fn hit_count(&self) -> usize {
        self.hits.as_ref().map_or(0, Vec::len)
    }

    pub fn total_or_zero(&self) -> u64 {
        self.total.unwrap_or(0)
    }
}
