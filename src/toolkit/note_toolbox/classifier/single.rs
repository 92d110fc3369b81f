
use chrono::{NaiveDate, Utc};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use super::models::{classification_schema, RawClassification};
use super::prompt::{build_classification_prompt, CLASSIFY_SYSTEM_PROMPT};
use super::rules::{derive_fallback_tags, rule_based_classification};
use crate::core::error::{NotesError, Result};
use crate::llm::client::OracleClient;
use crate::llm::providers::base::StructuredRequest;
use crate::toolkit::note_toolbox::entry::{
    Category, Classification, ClassificationOutcome, CodeKind, Language, Priority, SlangTerm,
};
use crate::utils::preview;

pub const DEFAULT_CONFIDENCE: f64 = 0.7;
pub const DEFAULT_TEMPERATURE: f64 = 0.3;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 2048;


pub struct EntryClassifier {
    oracle: OracleClient,
    temperature: f64,
    max_output_tokens: u32,
}

impl EntryClassifier {
    
    pub fn new(oracle: OracleClient) -> Self {
        Self {
            oracle,
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }

    
    pub fn with_generation(mut self, temperature: f64, max_output_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_output_tokens = max_output_tokens;
        self
    }

    /// Classifies one note. Only empty input is an error; oracle trouble degrades to rules.
    pub async fn classify(&self, text: &str) -> Result<Classification> {
        Ok(self.classify_with_outcome(text).await?.into_value())
    }

    
    pub async fn classify_with_outcome(
        &self,
        text: &str,
    ) -> Result<ClassificationOutcome<Classification>> {
        if text.trim().is_empty() {
            return Err(NotesError::Validation("entry text is empty".to_string()));
        }
        Ok(self.classify_on(text, Utc::now().date_naive()).await)
    }

    pub(crate) async fn classify_on(
        &self,
        text: &str,
        today: NaiveDate,
    ) -> ClassificationOutcome<Classification> {
        debug!("Classifying entry: '{}'", preview(text, 50));

        let request = StructuredRequest {
            system_prompt: CLASSIFY_SYSTEM_PROMPT.to_string(),
            payload: build_classification_prompt(text, today),
            schema_name: "entry_classification",
            schema: classification_schema(),
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
        };

        let reason = match self.oracle.generate::<RawClassification>(&request).await {
            Ok(raw) if raw.is_usable() => {
                let classification = repair_classification(raw, text);
                info!(
                    "Entry classified as {} (confidence={:.2}, tags={})",
                    classification.category,
                    classification.confidence,
                    classification.tags.len()
                );
                return ClassificationOutcome::Oracle(classification);
            }
            Ok(_) => "oracle returned no usable classification".to_string(),
            Err(e) => format!("oracle unavailable: {}", e),
        };

        warn!("Falling back to rule-based classification: {}", reason);
        ClassificationOutcome::Fallback {
            value: rule_based_classification(text),
            reason,
        }
    }
}


/// Coerces the oracle's free strings into closed enums and fills every gap.
pub fn repair_classification(raw: RawClassification, source_text: &str) -> Classification {
    let category = raw
        .category
        .as_deref()
        .map(Category::coerce)
        .unwrap_or_default();

    let confidence = raw
        .confidence
        .filter(|c| c.is_finite() && (0.0..=1.0).contains(c))
        .unwrap_or(DEFAULT_CONFIDENCE);

    let tags = clean_strings(raw.tags.unwrap_or_default());
    let tags = if tags.is_empty() {
        derive_fallback_tags(source_text)
    } else {
        tags
    };

    let translated_content = raw
        .translated_content
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| source_text.to_string());

    let reasoning = raw
        .reasoning
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| format!("Classified as {} based on its content.", category.label()));

    let due_date = raw
        .due_date
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok());

    let slang_terms: Vec<SlangTerm> = raw
        .slang_terms
        .unwrap_or_default()
        .into_iter()
        .filter(|t| !t.original.trim().is_empty())
        .map(|t| SlangTerm {
            original: t.original.trim().to_string(),
            meaning: t.meaning.trim().to_string(),
            confidence: t
                .confidence
                .filter(|c| c.is_finite())
                .map(|c| c.clamp(0.0, 1.0))
                .unwrap_or(DEFAULT_CONFIDENCE),
        })
        .collect();

    Classification {
        language: raw
            .detected_language
            .as_deref()
            .map(Language::coerce)
            .unwrap_or_default(),
        translated_content,
        category,
        tags,
        confidence,
        due_date,
        priority: raw.priority.as_deref().and_then(Priority::coerce),
        action_items: clean_strings(raw.action_items.unwrap_or_default()),
        code_language: raw
            .code_language
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty()),
        code_kind: raw.code_type.as_deref().and_then(CodeKind::coerce),
        contains_slang: !slang_terms.is_empty(),
        slang_terms,
        reasoning,
    }
}

fn clean_strings(values: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .filter(|v| seen.insert(v.to_lowercase()))
        .collect()
}
