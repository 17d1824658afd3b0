//! Observer that logs signals and prints the displayed records.

use reactivelist_core::{ListData, ListObserver, ListSignal, ResultStats};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Prints every data update as a numbered list of `field` values.
#[derive(Debug, Default)]
pub struct PrintObserver {
    field: String,
    quiet: bool,
    /// Stats of the last data update.
    pub last_stats: Option<ResultStats>,
    pub data_updates: usize,
    pub errors: Vec<String>,
}

impl PrintObserver {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ..Default::default()
        }
    }

    /// Logs signals without printing records.
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    fn print(&self, data: &ListData) {
        let stats = &data.result_stats;
        println!(
            "-- {} results, page {} of {}{}",
            stats.number_of_results,
            stats.current_page + 1,
            stats.number_of_pages,
            if data.loading { " (loading)" } else { "" }
        );
        for record in &data.data {
            let label = match record.field(&self.field) {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => record
                    .id
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
            };
            println!("{:>5}  {label}", record.click_id.unwrap_or_default() + 1);
        }
        for bucket in &data.aggregation_data {
            println!("       {} ({})", bucket["key"], bucket["doc_count"]);
        }
    }
}

impl ListObserver for PrintObserver {
    fn on_signal(&mut self, signal: ListSignal) {
        match signal {
            ListSignal::Data(data) => {
                self.data_updates += 1;
                if !self.quiet {
                    self.print(&data);
                }
                self.last_stats = Some(data.result_stats);
            }
            ListSignal::Error(message) => {
                warn!("list error: {message}");
                self.errors.push(message);
            }
            ListSignal::PageChange { page, total_pages } => {
                info!("page {page} of {total_pages}");
            }
            ListSignal::PageAdd {
                direction,
                page,
                total_pages,
            } => info!("added page {page} of {total_pages} ({direction})"),
            ListSignal::QueryChange { new, .. } => {
                debug!("query changed: {}", new.unwrap_or_default());
            }
            other => debug!("{}", other.name()),
        }
    }

    fn listens_for_page_change(&self) -> bool {
        true
    }
}
