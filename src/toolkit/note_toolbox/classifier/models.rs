
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;


#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RawSlangTerm {
    #[serde(default)]
    pub original: String,
    #[serde(default)]
    pub meaning: String,
    #[serde(default)]
    pub confidence: Option<f64>,
}


/// Classification exactly as the oracle returns it, before coercion and repair.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RawClassification {
    #[schemars(description = "english | hindi | marathi | hinglish | mixed")]
    pub detected_language: Option<String>,
    #[schemars(description = "English translation of the text, or the text itself if already English")]
    pub translated_content: Option<String>,
    #[schemars(description = "code_snippet | learning_note | idea | bug_fix | general | task")]
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    #[schemars(description = "Absolute due date as YYYY-MM-DD, tasks only")]
    pub due_date: Option<String>,
    #[schemars(description = "low | medium | high | urgent, tasks only")]
    pub priority: Option<String>,
    pub action_items: Option<Vec<String>>,
    pub code_language: Option<String>,
    #[schemars(description = "function | class | snippet | config | other")]
    pub code_type: Option<String>,
    pub contains_slang: Option<bool>,
    pub slang_terms: Option<Vec<RawSlangTerm>>,
    #[schemars(description = "Confidence between 0 and 1")]
    pub confidence: Option<f64>,
    pub reasoning: Option<String>,
}

impl RawClassification {
    pub fn is_usable(&self) -> bool {
        self.category
            .as_deref()
            .is_some_and(|c| !c.trim().is_empty())
    }
}


#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RawBulkItem {
    #[serde(default)]
    pub content: String,
    #[serde(flatten)]
    pub classification: RawClassification,
    #[serde(default)]
    #[schemars(description = "True when the text marks the item as done")]
    pub is_completed: Option<bool>,
}


#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RawBulkResponse {
    #[serde(default)]
    pub items: Vec<RawBulkItem>,
}


pub fn classification_schema() -> Value {
    serde_json::to_value(schema_for!(RawClassification)).unwrap_or_default()
}

pub fn bulk_schema() -> Value {
    serde_json::to_value(schema_for!(RawBulkResponse)).unwrap_or_default()
}
