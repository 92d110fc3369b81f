
pub mod expander;
pub mod local;
pub mod models;
pub mod scoring;
pub mod smart;

pub use expander::{QueryExpander, RawExpansion, DEFAULT_MIN_QUERY_CHARS};
pub use local::local_search;
pub use models::{QueryExpansion, ScoredEntry, SearchIntent, SearchOutcome, SearchPath, TimeRange};
pub use scoring::{rank_entries, recency_bonus, score_entry};
pub use smart::SmartSearch;
