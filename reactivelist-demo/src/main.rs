//! Reactive results list demo
//!
//! Mounts a results list over an in-memory dataset and walks through a few
//! pages in the chosen pagination mode, printing what a renderer would draw.
//!
//! Usage:
//!   reactivelist-demo --mode continuous --size 5 --steps 3

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use reactivelist_core::{ListConfig, PaginationMode, PaginationSetting, ResultList, ViewportMetrics};
use reactivelist_demo::{Dataset, MemoryStore, PrintObserver, SAMPLE_BOOKS, settle};
use serde_json::json;
use std::{fs, path::PathBuf, time::Duration};
use tokio::sync::mpsc;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Classic,
    Infinite,
    Continuous,
}

impl From<Mode> for PaginationSetting {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Classic => PaginationSetting::Classic,
            Mode::Infinite => PaginationSetting::Disabled,
            Mode::Continuous => PaginationSetting::Continuous,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "reactivelist-demo")]
#[command(about = "Pages through a JSON dataset with a reactive results list")]
struct Args {
    /// Dataset: a JSON array of hits (defaults to the bundled books)
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// List configuration as JSON (overrides --size and --mode)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Page size
    #[arg(short, long, default_value = "5")]
    size: u64,

    /// Pagination mode
    #[arg(short, long, value_enum, default_value = "classic")]
    mode: Mode,

    /// Number of pages to walk after mounting
    #[arg(long, default_value = "3")]
    steps: u64,

    /// Restrict results to one genre through the default query
    #[arg(long)]
    genre: Option<String>,

    /// Simulated store latency in milliseconds
    #[arg(long, default_value = "0")]
    latency_ms: u64,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(args: &Args) -> Result<ListConfig> {
    let config = match &args.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            ListConfig::from_json(&json).context("parsing config")?
        }
        None => ListConfig::new("results", "title")
            .with_size(args.size)
            .with_pagination(args.mode.into())
            .with_url_params(Some("page")),
    };
    Ok(match args.genre.clone() {
        Some(genre) => {
            config.with_default_query(move || json!({ "query": { "term": { "genre": genre } } }))
        }
        None => config,
    })
}

fn load_dataset(args: &Args) -> Result<Dataset> {
    let json = match &args.data {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("reading dataset {}", path.display()))?,
        None => SAMPLE_BOOKS.to_string(),
    };
    let dataset = Dataset::from_json(&json).context("parsing dataset")?;
    if dataset.is_empty() {
        bail!("dataset is empty");
    }
    Ok(dataset)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    let config = load_config(&args)?;
    let dataset = load_dataset(&args)?;
    info!("{} documents loaded", dataset.len());

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut store = MemoryStore::new(dataset, tx);
    if args.latency_ms > 0 {
        store = store.with_latency(Duration::from_millis(args.latency_ms));
    }
    let idle = Duration::from_millis(args.latency_ms + 50);
    let field = config.data_field.clone();

    let mut list = ResultList::new(config, store, PrintObserver::new(field))?;
    list.mount();
    settle(&mut list, &mut rx, idle).await;

    let mode = list.mode();
    info!("walking {} pages in {mode} mode", args.steps);
    for step in 1..=args.steps {
        match mode {
            PaginationMode::Classic => list.set_page(step),
            PaginationMode::Infinite => {
                // Pretend the reader scrolled to the end of the list.
                list.on_scroll(ViewportMetrics::new(800.0, 1200.0, 2000.0));
            }
            PaginationMode::Continuous => list.load_next(),
        }
        settle(&mut list, &mut rx, idle).await;
    }

    if let Some(stats) = &list.observer().last_stats {
        println!(
            "\n{} of {} results displayed, {} updates",
            stats.displayed_results,
            stats.number_of_results,
            list.observer().data_updates
        );
    }
    if let Some(page) = list.store().url_param(list.config().url_page_param()) {
        println!("URL page: {page}");
    }
    list.unmount();
    Ok(())
}
