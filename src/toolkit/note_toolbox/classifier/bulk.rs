
use chrono::{NaiveDate, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::models::{bulk_schema, RawBulkResponse};
use super::prompt::{build_bulk_prompt, BULK_SYSTEM_PROMPT};
use super::rules::{has_completion_marker, line_split_fallback};
use super::single::{repair_classification, DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_TEMPERATURE};
use crate::core::error::{NotesError, Result};
use crate::llm::client::OracleClient;
use crate::llm::providers::base::{LlmProviderError, StructuredRequest};
use crate::toolkit::note_toolbox::entry::{ClassificationOutcome, ClassifiedItem};

/// Inputs longer than this that come back as a single item are treated as unsplit.
pub const DEFAULT_SEGMENTATION_MIN_CHARS: usize = 200;

/// Bulk replies carry one classification per item, so they get a multiple of the single budget.
pub const BULK_OUTPUT_TOKEN_FACTOR: u32 = 4;


#[derive(Error, Debug)]
pub enum BulkFailure {
    #[error("oracle unavailable: {0}")]
    Oracle(#[from] LlmProviderError),

    #[error("segmentation failed: one item returned for {chars} characters of input")]
    Segmentation { chars: usize },

    #[error("oracle returned no items")]
    Empty,
}


pub struct BulkClassifier {
    oracle: OracleClient,
    segmentation_min_chars: usize,
    temperature: f64,
    max_output_tokens: u32,
}

impl BulkClassifier {
    
    pub fn new(oracle: OracleClient) -> Self {
        Self {
            oracle,
            segmentation_min_chars: DEFAULT_SEGMENTATION_MIN_CHARS,
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS * BULK_OUTPUT_TOKEN_FACTOR,
        }
    }

    
    pub fn with_segmentation_threshold(mut self, min_chars: usize) -> Self {
        self.segmentation_min_chars = min_chars;
        self
    }

    
    pub fn with_generation(mut self, temperature: f64, max_output_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_output_tokens = max_output_tokens;
        self
    }

    
    pub async fn classify_bulk(&self, raw_text: &str) -> Result<Vec<ClassifiedItem>> {
        Ok(self.classify_bulk_with_outcome(raw_text).await?.into_value())
    }

    
    pub async fn classify_bulk_with_outcome(
        &self,
        raw_text: &str,
    ) -> Result<ClassificationOutcome<Vec<ClassifiedItem>>> {
        if raw_text.trim().is_empty() {
            return Err(NotesError::Validation("bulk import text is empty".to_string()));
        }
        Ok(self.classify_bulk_on(raw_text, Utc::now().date_naive()).await)
    }

    pub(crate) async fn classify_bulk_on(
        &self,
        raw_text: &str,
        today: NaiveDate,
    ) -> ClassificationOutcome<Vec<ClassifiedItem>> {
        match self.segment_and_classify(raw_text, today).await {
            Ok(items) => {
                info!("Bulk classification produced {} items", items.len());
                ClassificationOutcome::Oracle(items)
            }
            Err(failure) => {
                let items = line_split_fallback(raw_text);
                warn!(
                    "Bulk classification failed ({}), line-split fallback produced {} items",
                    failure,
                    items.len()
                );
                ClassificationOutcome::Fallback {
                    value: items,
                    reason: failure.to_string(),
                }
            }
        }
    }

    
    pub async fn segment_and_classify(
        &self,
        raw_text: &str,
        today: NaiveDate,
    ) -> std::result::Result<Vec<ClassifiedItem>, BulkFailure> {
        let request = StructuredRequest {
            system_prompt: BULK_SYSTEM_PROMPT.to_string(),
            payload: build_bulk_prompt(raw_text, today),
            schema_name: "bulk_classification",
            schema: bulk_schema(),
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
        };

        let response: RawBulkResponse = self.oracle.generate(&request).await?;

        let items: Vec<ClassifiedItem> = response
            .items
            .into_iter()
            .filter(|item| !item.content.trim().is_empty())
            .map(|item| {
                let content = item.content.trim().to_string();
                let is_completed =
                    item.is_completed.unwrap_or(false) || has_completion_marker(&content);
                let classification = repair_classification(item.classification, &content);
                debug!(
                    "Bulk item '{}' -> {} (completed={})",
                    crate::utils::preview(&content, 40),
                    classification.category,
                    is_completed
                );
                ClassifiedItem {
                    content,
                    classification,
                    is_completed,
                }
            })
            .collect();

        if items.is_empty() {
            return Err(BulkFailure::Empty);
        }

        let chars = raw_text.chars().count();
        if items.len() == 1 && chars > self.segmentation_min_chars {
            return Err(BulkFailure::Segmentation { chars });
        }
        Ok(items)
    }
}
