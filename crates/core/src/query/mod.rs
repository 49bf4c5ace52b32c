//! Record query engine: search normalization, filters, ordering and aggregates.

mod engine;
mod hardware;
mod normalize;
mod state;

pub use engine::{query_records, QueryEngine, QueryView, SearchScope, Summary};
pub use hardware::{list_hardware, HardwarePriority, DEFAULT_HARDWARE_PRIORITY};
pub use normalize::normalize_search_text;
pub use state::{CompletionFilter, HardwareFilter, QueryState, SortKey, ALL_KEY};
