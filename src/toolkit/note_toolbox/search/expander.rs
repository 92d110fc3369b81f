
use chrono::NaiveDate;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;
use tracing::{debug, info, warn};

use super::models::{QueryExpansion, SearchIntent, TimeRange};
use crate::llm::client::OracleClient;
use crate::llm::providers::base::StructuredRequest;
use crate::toolkit::note_toolbox::entry::Category;
use crate::utils::preview;

/// Queries must be strictly longer than this many characters to be expanded.
pub const DEFAULT_MIN_QUERY_CHARS: usize = 2;

const EXPANSION_TEMPERATURE: f64 = 0.2;
const EXPANSION_MAX_OUTPUT_TOKENS: u32 = 512;

const EXPANSION_SYSTEM_PROMPT: &str = r#"You expand a short search query over personal notes into search terms.
Respond only with JSON matching the provided schema.
keywords: the query words plus synonyms, related technical terms and English translations of
Hindi/Marathi/Hinglish words, all lowercase.
categories: which of code_snippet, learning_note, idea, bug_fix, general, task the user is
probably looking for (may be empty).
intent: find, filter or summarize.
time_range: only when the query names a period, as YYYY-MM-DD bounds."#;


#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RawTimeRange {
    pub start: Option<String>,
    pub end: Option<String>,
}


#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RawExpansion {
    pub expanded_query: Option<String>,
    pub categories: Vec<String>,
    pub keywords: Vec<String>,
    #[schemars(description = "find | filter | summarize")]
    pub intent: Option<String>,
    pub time_range: Option<RawTimeRange>,
}

impl RawExpansion {
    /// `None` when the oracle produced nothing to search with.
    pub fn into_expansion(self, query: &str) -> Option<QueryExpansion> {
        let mut seen = HashSet::new();
        let keywords: Vec<String> = self
            .keywords
            .into_iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .filter(|k| seen.insert(k.clone()))
            .collect();

        let mut categories: Vec<Category> = Vec::new();
        for raw in &self.categories {
            let normalized = raw.trim().replace([' ', '-'], "_");
            if let Ok(category) = Category::from_str(&normalized) {
                if !categories.contains(&category) {
                    categories.push(category);
                }
            }
        }

        if keywords.is_empty() && categories.is_empty() {
            return None;
        }

        let time_range = self.time_range.and_then(|range| {
            let parse = |d: Option<String>| {
                d.and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
            };
            let range = TimeRange {
                start: parse(range.start),
                end: parse(range.end),
            };
            (range.start.is_some() || range.end.is_some()).then_some(range)
        });

        Some(QueryExpansion {
            expanded_query: self
                .expanded_query
                .filter(|q| !q.trim().is_empty())
                .unwrap_or_else(|| query.to_string()),
            categories,
            keywords,
            intent: self
                .intent
                .as_deref()
                .map(SearchIntent::coerce)
                .unwrap_or_default(),
            time_range,
        })
    }
}


pub struct QueryExpander {
    oracle: OracleClient,
    min_query_chars: usize,
}

impl QueryExpander {
    
    pub fn new(oracle: OracleClient) -> Self {
        Self {
            oracle,
            min_query_chars: DEFAULT_MIN_QUERY_CHARS,
        }
    }

    
    pub fn with_min_query_chars(mut self, min_query_chars: usize) -> Self {
        self.min_query_chars = min_query_chars;
        self
    }

    pub fn min_query_chars(&self) -> usize {
        self.min_query_chars
    }

    /// Failure is not an error here: any oracle problem means "no expansion".
    pub async fn expand(&self, query: &str) -> Option<QueryExpansion> {
        if query.trim().is_empty() || query.chars().count() <= self.min_query_chars {
            debug!("Query too short to expand: '{}'", query);
            return None;
        }

        let request = StructuredRequest {
            system_prompt: EXPANSION_SYSTEM_PROMPT.to_string(),
            payload: format!("Query: \"{}\"", query),
            schema_name: "query_expansion",
            schema: serde_json::to_value(schema_for!(RawExpansion)).unwrap_or_default(),
            temperature: EXPANSION_TEMPERATURE,
            max_output_tokens: EXPANSION_MAX_OUTPUT_TOKENS,
        };

        match self.oracle.generate::<RawExpansion>(&request).await {
            Ok(raw) => {
                let expansion = raw.into_expansion(query);
                match &expansion {
                    Some(e) => info!(
                        "Query '{}' expanded: {} keywords, {} categories, intent={}",
                        preview(query, 40),
                        e.keywords.len(),
                        e.categories.len(),
                        e.intent
                    ),
                    None => debug!("Expansion for '{}' was empty", preview(query, 40)),
                }
                expansion
            }
            Err(e) => {
                warn!("Query expansion failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::RetryPolicy;
    use crate::llm::providers::scripted::ScriptedProvider;
    use serde_json::json;
    use std::sync::Arc;

    fn expander(provider: Arc<ScriptedProvider>) -> QueryExpander {
        QueryExpander::new(OracleClient::new(provider, RetryPolicy::single_attempt()))
    }

    #[tokio::test]
    async fn test_expansion_is_normalized() {
        let provider = ScriptedProvider::replying(json!({
            "expanded_query": "react hooks usage",
            "keywords": ["React", "hooks", "react", " "],
            "categories": ["learning_note", "recipes", "Code Snippet"],
            "intent": "SUMMARIZE",
            "time_range": {"start": "2026-10-01", "end": "soon"}
        }));
        let expansion = expander(provider).expand("react hooks").await.unwrap();

        assert_eq!(expansion.expanded_query, "react hooks usage");
        assert_eq!(expansion.keywords, vec!["react", "hooks"]);
        assert_eq!(
            expansion.categories,
            vec![Category::LearningNote, Category::CodeSnippet]
        );
        assert_eq!(expansion.intent, SearchIntent::Summarize);
        let range = expansion.time_range.unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2026, 10, 1));
        assert_eq!(range.end, None);
    }

    #[tokio::test]
    async fn test_short_query_skips_oracle() {
        let provider = ScriptedProvider::replying(json!({"keywords": ["js"]}));
        let expander = expander(provider.clone());

        assert!(expander.expand("js").await.is_none());
        assert!(expander.expand("   ").await.is_none());
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_failure_means_no_expansion() {
        let provider = ScriptedProvider::always_failing(503);
        assert!(expander(provider.clone()).expand("payment bugs").await.is_none());
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_useless_expansion_is_none() {
        let provider = ScriptedProvider::replying(json!({
            "expanded_query": "nothing",
            "keywords": [],
            "categories": ["unknown"]
        }));
        assert!(expander(provider).expand("zzz qqq").await.is_none());
    }

    #[test]
    fn test_missing_expanded_query_defaults_to_query() {
        let raw = RawExpansion {
            keywords: vec!["milk".to_string()],
            ..Default::default()
        };
        let expansion = raw.into_expansion("buy milk").unwrap();
        assert_eq!(expansion.expanded_query, "buy milk");
        assert_eq!(expansion.intent, SearchIntent::Find);
        assert!(expansion.time_range.is_none());
    }
}
