//! The view model derived from a result set.
//!
//! Three sources feed the displayed list: streamed hits, promoted results and
//! the base hits of the current window. A record appears at most once, in
//! that order of precedence: promoted records win over streamed and base
//! records with the same `_id`, streamed records win over base records.

use crate::mode::total_pages;
use reactivelist_types::{HitId, Record, ResultSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// The three sources after deduplication.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Deduped {
    pub stream: Vec<Record>,
    pub promoted: Vec<Record>,
    /// Base hits not shadowed by a streamed or promoted record.
    pub base: Vec<Record>,
}

impl Deduped {
    /// Displayed order: stream, then promoted, then base.
    pub fn displayed(&self) -> Vec<Record> {
        self.stream
            .iter()
            .chain(&self.promoted)
            .chain(&self.base)
            .cloned()
            .collect()
    }
}

/// Removes duplicate `_id`s across the three sources.
///
/// Records without an id are never considered duplicates.
pub fn dedup(hits: &[Record], stream: &[Record], promoted: &[Record]) -> Deduped {
    let promoted_ids: HashSet<&HitId> = promoted.iter().filter_map(Record::dedup_key).collect();
    let mut seen: HashSet<&HitId> = HashSet::new();
    let mut deduped = Deduped::default();

    for record in stream {
        if let Some(id) = record.dedup_key() {
            if promoted_ids.contains(id) || !seen.insert(id) {
                continue;
            }
        }
        deduped.stream.push(record.clone());
    }
    for record in promoted {
        if record.dedup_key().is_some_and(|id| !seen.insert(id)) {
            continue;
        }
        deduped.promoted.push(record.clone());
    }
    for record in hits {
        if record.dedup_key().is_some_and(|id| !seen.insert(id)) {
            continue;
        }
        deduped.base.push(record.clone());
    }
    deduped
}

/// Copies `records`, numbering them from `base` for click analytics.
pub fn with_click_ids(records: &[Record], base: u64) -> Vec<Record> {
    records
        .iter()
        .zip(base..)
        .map(|(record, click_id)| Record {
            click_id: Some(click_id),
            ..record.clone()
        })
        .collect()
}

fn values_with_click_ids(values: &[Value], base: u64) -> Vec<Value> {
    values
        .iter()
        .zip(base..)
        .map(|(value, click_id)| {
            let mut value = value.clone();
            if let Some(object) = value.as_object_mut() {
                object.insert("_click_id".into(), click_id.into());
            }
            value
        })
        .collect()
}

/// Summary numbers shown next to the list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultStats {
    pub number_of_results: u64,
    pub number_of_pages: u64,
    /// Query time in milliseconds.
    pub time: u64,
    pub hidden: u64,
    pub promoted: usize,
    /// Zero-based.
    pub current_page: u64,
    pub displayed_results: usize,
}

/// Result set plus pagination state, reduced to what the renderer shows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DerivedView {
    /// All base hits, flattened, before deduplication.
    pub results: Vec<Record>,
    pub stream_results: Vec<Record>,
    pub promoted_results: Vec<Record>,
    /// Base hits minus streamed and promoted duplicates.
    pub filtered_results: Vec<Record>,
    /// stream ++ promoted ++ filtered.
    pub displayed: Vec<Record>,
    pub aggregation_data: Vec<Value>,
    /// Absolute offset of the first displayed record.
    pub base: u64,
    pub stats: ResultStats,
}

impl DerivedView {
    pub fn compute(results: &ResultSet, current_page: u64, size: u64) -> Self {
        let raw = results.records().unwrap_or_default();
        let deduped = dedup(&raw, &results.stream_records(), &results.promoted_results);
        let displayed = deduped.displayed();

        let stats = ResultStats {
            number_of_results: results.total_or_zero(),
            number_of_pages: total_pages(results.total, size),
            time: results.time,
            hidden: results.hidden,
            promoted: results.promoted_results.len(),
            current_page,
            displayed_results: displayed.len(),
        };

        Self {
            results: raw,
            stream_results: deduped.stream,
            promoted_results: deduped.promoted,
            filtered_results: deduped.base,
            displayed,
            aggregation_data: results.aggregation_data.clone(),
            base: current_page.saturating_mul(size),
            stats,
        }
    }

    /// 1-based absolute position of the displayed record at `index`, as sent
    /// with click analytics.
    pub fn click_position(&self, index: usize) -> u64 {
        self.base.saturating_add(index as u64).saturating_add(1)
    }

    /// Builds the bundle handed to the renderer.
    pub fn into_data(self, loading: bool, error: Option<String>) -> ListData {
        ListData {
            data: with_click_ids(&self.displayed, self.base),
            aggregation_data: values_with_click_ids(&self.aggregation_data, self.base),
            stream_data: with_click_ids(&self.stream_results, self.base),
            promoted_data: with_click_ids(&self.promoted_results, self.base),
            raw_data: with_click_ids(&self.results, self.base),
            result_stats: self.stats,
            loading,
            error,
        }
    }
}

/// The `data` bundle: every view of the results, numbered for click
/// analytics.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListData {
    pub data: Vec<Record>,
    pub aggregation_data: Vec<Value>,
    pub stream_data: Vec<Record>,
    pub promoted_data: Vec<Record>,
    pub raw_data: Vec<Record>,
    pub result_stats: ResultStats,
    pub loading: bool,
    pub error: Option<String>,
}
