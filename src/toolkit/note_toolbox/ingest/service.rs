use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::models::BulkImportReport;
use crate::core::config::NotesConfig;
use crate::core::error::{NotesError, Result};
use crate::llm::client::OracleClient;
use crate::llm::factory::LlmProviderFactory;
use crate::llm::providers::base::LlmProvider;
use crate::toolkit::note_toolbox::classifier::{
    BulkClassifier, EntryClassifier, BULK_OUTPUT_TOKEN_FACTOR,
};
use crate::toolkit::note_toolbox::entry::{
    Entry, EntryFilter, EntryPatch, ListQuery, NewEntry, NoteStore, StoreError,
};
use crate::toolkit::note_toolbox::search::{local_search, QueryExpander, SearchOutcome, SmartSearch};
use crate::utils::preview;


/// Ties the classifiers and the search to a document store.
pub struct NoteService {
    classifier: EntryClassifier,
    bulk: BulkClassifier,
    search: SmartSearch,
    store: Arc<dyn NoteStore>,
}

impl NoteService {
    pub fn new(
        classifier: EntryClassifier,
        bulk: BulkClassifier,
        search: SmartSearch,
        store: Arc<dyn NoteStore>,
    ) -> Self {
        Self {
            classifier,
            bulk,
            search,
            store,
        }
    }


    pub fn from_config(config: &NotesConfig, store: Arc<dyn NoteStore>) -> Result<Self> {
        config.validate()?;
        let provider = LlmProviderFactory::create(config)?;
        Ok(Self::with_provider(provider, config, store))
    }


    pub fn with_provider(
        provider: Arc<dyn LlmProvider>,
        config: &NotesConfig,
        store: Arc<dyn NoteStore>,
    ) -> Self {
        let oracle = OracleClient::new(Arc::clone(&provider), config.retry_policy());

        let classifier = EntryClassifier::new(oracle.clone())
            .with_generation(config.llm_temperature, config.llm_max_output_tokens);
        let bulk = BulkClassifier::new(oracle)
            .with_segmentation_threshold(config.segmentation_min_chars)
            .with_generation(
                config.llm_temperature,
                config.llm_max_output_tokens.saturating_mul(BULK_OUTPUT_TOKEN_FACTOR),
            );

        let search = if config.expansion_enabled {
            let expansion_oracle = OracleClient::new(provider, config.expansion_retry_policy());
            SmartSearch::new(
                QueryExpander::new(expansion_oracle)
                    .with_min_query_chars(config.min_expansion_query_chars),
            )
        } else {
            SmartSearch::without_expansion()
        };

        Self::new(classifier, bulk, search, store)
    }

    pub fn store(&self) -> &Arc<dyn NoteStore> {
        &self.store
    }

    /// Classifies and saves one note. Classification never fails; only empty input or the store can.
    pub async fn add_entry(&self, text: &str) -> Result<Entry> {
        let text = text.trim();
        let outcome = self.classifier.classify_with_outcome(text).await?;
        let fallback_reason = outcome.fallback_reason().map(str::to_string);

        let draft = NewEntry::new(text, outcome.into_value());
        match self.store.create(draft).await {
            Ok(entry) => {
                info!(
                    "Saved entry {} as {} ({})",
                    entry.id,
                    entry.category,
                    preview(&entry.content, 40)
                );
                Ok(entry)
            }
            Err(store_err) => match fallback_reason {
                Some(reason) => {
                    error!("Classification and persistence both failed: {}; {}", reason, store_err);
                    Err(NotesError::CriticalFailure(format!(
                        "{}; store: {}",
                        reason, store_err
                    )))
                }
                None => {
                    warn!("Failed to save classified entry: {}", store_err);
                    Err(NotesError::Store(store_err))
                }
            },
        }
    }

    /// Segments, classifies and persists a raw blob. Items are saved concurrently and settled
    /// individually; saved items are kept when others fail.
    pub async fn import_bulk(&self, raw_text: &str) -> Result<BulkImportReport> {
        let outcome = self.bulk.classify_bulk_with_outcome(raw_text).await?;
        let used_fallback = outcome.is_fallback();
        let items = outcome.into_value();
        let total = items.len();

        debug!("Persisting {} bulk items (fallback={})", total, used_fallback);

        let store = &self.store;
        let persists = items
            .into_iter()
            .map(|item| async move { store.create(NewEntry::from(item)).await });
        let results = join_all(persists).await;

        let mut report = BulkImportReport {
            total,
            used_fallback,
            ..Default::default()
        };
        for result in results {
            match result {
                Ok(entry) => {
                    report.persisted += 1;
                    report.entries.push(entry);
                }
                Err(e) => {
                    warn!("Failed to persist bulk item: {}", e);
                    report.failed += 1;
                    report.errors.push(e.to_string());
                }
            }
        }

        info!(
            "Bulk import: {}/{} persisted, {} failed",
            report.persisted, report.total, report.failed
        );
        Ok(report)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Entry>> {
        Ok(self.store.get(id).await?)
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Vec<Entry>> {
        Ok(self.store.list(query).await?)
    }

    /// Flips completion and returns the updated entry.
    pub async fn toggle_complete(&self, id: &str) -> Result<Entry> {
        let current = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| NotesError::NotFound(id.to_string()))?;

        self.store
            .update(id, EntryPatch::completion(!current.is_completed))
            .await
            .map_err(not_found_or_store)?;

        let updated = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| NotesError::NotFound(id.to_string()))?;
        debug!("Entry {} completed={}", id, updated.is_completed);
        Ok(updated)
    }

    pub async fn delete_entry(&self, id: &str) -> Result<()> {
        self.store.delete(id).await.map_err(not_found_or_store)?;
        info!("Deleted entry {}", id);
        Ok(())
    }

    pub async fn clear(&self, filter: &EntryFilter) -> Result<usize> {
        Ok(self.store.delete_all(filter).await?)
    }

    pub async fn search(&self, query: &str) -> Result<SearchOutcome> {
        let entries = self.store.list(&ListQuery::all()).await?;
        Ok(self.search.search(query, &entries).await)
    }

    pub async fn local_search(&self, query: &str) -> Result<Vec<Entry>> {
        let entries = self.store.list(&ListQuery::all()).await?;
        Ok(local_search(query, &entries))
    }
}

fn not_found_or_store(err: StoreError) -> NotesError {
    match err {
        StoreError::NotFound(id) => NotesError::NotFound(id),
        other => NotesError::Store(other),
    }
}
