
pub mod bulk;
pub mod models;
pub mod prompt;
pub mod rules;
pub mod single;

pub use bulk::{
    BulkClassifier, BulkFailure, BULK_OUTPUT_TOKEN_FACTOR, DEFAULT_SEGMENTATION_MIN_CHARS,
};
pub use models::{RawBulkItem, RawBulkResponse, RawClassification, RawSlangTerm};
pub use rules::{
    derive_fallback_tags, detect_category, has_completion_marker, line_split_fallback,
    rule_based_classification,
};
pub use single::{repair_classification, EntryClassifier};
