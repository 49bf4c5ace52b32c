#![warn(clippy::all, missing_docs)]

//! Core domain logic for the game log browser.
//!
//! This crate hosts the record model, the immutable record store,
//! the query engine (search normalization, filtering, ordering and
//! aggregates), dataset loading and configuration handling used by
//! the terminal UI and any future frontends.

pub mod config;
pub mod dataset;
pub mod error;
pub mod models;
pub mod query;
pub mod store;

pub use config::AppConfig;
pub use dataset::DatasetLoader;
pub use error::{QueryError, StoreError};
pub use models::GameRecord;
pub use query::{
    list_hardware, normalize_search_text, query_records, CompletionFilter, HardwareFilter,
    HardwarePriority, QueryEngine, QueryState, QueryView, SearchScope, SortKey, Summary,
};
pub use store::RecordStore;
