
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::expander::{QueryExpander, DEFAULT_MIN_QUERY_CHARS};
use super::local::substring_match;
use super::models::{SearchOutcome, SearchPath};
use super::scoring::rank_entries;
use crate::toolkit::note_toolbox::entry::Entry;
use crate::utils::preview;


/// Resolves a query in one pass: everything, short literal match, ranked expansion,
/// or substring fallback when no expansion is available.
pub struct SmartSearch {
    expander: Option<QueryExpander>,
    short_query_max_chars: usize,
}

impl SmartSearch {
    
    pub fn new(expander: QueryExpander) -> Self {
        let short_query_max_chars = expander.min_query_chars();
        Self {
            expander: Some(expander),
            short_query_max_chars,
        }
    }

    
    pub fn without_expansion() -> Self {
        Self {
            expander: None,
            short_query_max_chars: DEFAULT_MIN_QUERY_CHARS,
        }
    }

    pub async fn search(&self, query: &str, entries: &[Entry]) -> SearchOutcome {
        self.search_at(query, entries, Utc::now()).await
    }

    pub async fn search_at(
        &self,
        query: &str,
        entries: &[Entry],
        now: DateTime<Utc>,
    ) -> SearchOutcome {
        if query.trim().is_empty() {
            return SearchOutcome::plain(entries.to_vec(), SearchPath::All);
        }

        if query.chars().count() <= self.short_query_max_chars {
            let results = substring_match(query, entries, false);
            debug!("Short query '{}' matched {} entries", query, results.len());
            return SearchOutcome::plain(results, SearchPath::ShortQuery);
        }

        let expansion = match &self.expander {
            Some(expander) => expander.expand(query).await,
            None => None,
        };

        let Some(expansion) = expansion else {
            let results = substring_match(query, entries, true);
            info!(
                "No expansion for '{}', substring match found {} entries",
                preview(query, 40),
                results.len()
            );
            return SearchOutcome::plain(results, SearchPath::Substring);
        };

        let ranked = rank_entries(entries, &expansion.keywords, &expansion.categories, now);
        for scored in &ranked {
            debug!("  {} scored {}", scored.entry.id, scored.score);
        }
        info!(
            "Ranked search for '{}': {}/{} entries matched",
            preview(query, 40),
            ranked.len(),
            entries.len()
        );

        SearchOutcome {
            results: ranked.into_iter().map(|scored| scored.entry).collect(),
            expanded_query: Some(expansion.expanded_query),
            intent: Some(expansion.intent),
            path: SearchPath::Ranked,
        }
    }
}
