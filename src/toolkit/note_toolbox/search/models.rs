
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumString, IntoStaticStr};

use crate::toolkit::note_toolbox::entry::{Category, Entry};


#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default,
    Serialize, Deserialize, JsonSchema,
    EnumString, IntoStaticStr, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SearchIntent {
    #[default]
    Find,
    Filter,
    Summarize,
}

impl SearchIntent {
    pub fn coerce(raw: &str) -> Self {
        Self::from_str(raw.trim()).unwrap_or_default()
    }
}


#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryExpansion {
    pub expanded_query: String,
    pub categories: Vec<Category>,
    pub keywords: Vec<String>,
    pub intent: SearchIntent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRange>,
}


#[derive(Debug, Clone, PartialEq)]
pub struct ScoredEntry {
    pub entry: Entry,
    pub score: u32,
}


/// Which branch of the search resolved the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchPath {
    All,
    ShortQuery,
    Ranked,
    Substring,
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub results: Vec<Entry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expanded_query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<SearchIntent>,
    pub path: SearchPath,
}

impl SearchOutcome {
    pub fn plain(results: Vec<Entry>, path: SearchPath) -> Self {
        Self {
            results,
            expanded_query: None,
            intent: None,
            path,
        }
    }
}
