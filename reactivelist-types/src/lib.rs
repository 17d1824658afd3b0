//! Core type definitions for the reactive results list.
//!
//! This crate defines the plain data exchanged between the list core and its
//! host (the search store and the renderer):
//! - Record identifiers (`_id`) and raw/parsed search hits
//! - Per-component result sets as published by the store
//! - Query-engine options produced by the list
//! - Fetch tags used to match responses to the requests that caused them
//!
//! Nothing in here knows about pagination strategies; that logic lives in
//! `reactivelist-core`.

mod fetch;
mod hit;
mod ids;
mod options;
mod result;

pub use fetch::{Direction, FetchLane, FetchTag};
pub use hit::{Hit, Record, parse_hits};
pub use ids::HitId;
pub use options::{QueryOptions, SortOrder, SourceFilter};
pub use result::ResultSet;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
