
use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};


#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default,
    Serialize, Deserialize, JsonSchema,
    EnumString, IntoStaticStr, AsRefStr, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Category {
    CodeSnippet,
    LearningNote,
    Idea,
    BugFix,
    #[default]
    General,
    Task,
}

impl Category {
    /// Unknown oracle output collapses to `General`.
    pub fn coerce(raw: &str) -> Self {
        let normalized = raw.trim().replace([' ', '-'], "_");
        Self::from_str(&normalized).unwrap_or(Self::General)
    }

    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// Category name with underscores rendered as spaces, e.g. `bug fix`.
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }
}


#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default,
    Serialize, Deserialize, JsonSchema,
    EnumString, IntoStaticStr, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Language {
    #[default]
    English,
    Hindi,
    Marathi,
    Hinglish,
    Mixed,
}

impl Language {
    pub fn coerce(raw: &str) -> Self {
        Self::from_str(raw.trim()).unwrap_or_default()
    }
}


#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    Serialize, Deserialize, JsonSchema,
    EnumString, IntoStaticStr, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn coerce(raw: &str) -> Option<Self> {
        Self::from_str(raw.trim()).ok()
    }
}


#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash,
    Serialize, Deserialize, JsonSchema,
    EnumString, IntoStaticStr, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CodeKind {
    Function,
    Class,
    Snippet,
    Config,
    Other,
}

impl CodeKind {
    pub fn coerce(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self::from_str(trimmed).unwrap_or(Self::Other))
    }
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SlangTerm {
    pub original: String,
    pub meaning: String,
    pub confidence: f64,
}


/// Classification metadata shared by single and bulk ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub language: Language,
    pub translated_content: String,
    pub category: Category,
    pub tags: Vec<String>,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub action_items: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_kind: Option<CodeKind>,
    pub contains_slang: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub slang_terms: Vec<SlangTerm>,
    pub reasoning: String,
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedItem {
    pub content: String,
    pub classification: Classification,
    pub is_completed: bool,
}


/// Which path produced a classification. Callers outside the crate only see the value.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassificationOutcome<T> {
    Oracle(T),
    Fallback { value: T, reason: String },
}

impl<T> ClassificationOutcome<T> {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    pub fn value(&self) -> &T {
        match self {
            Self::Oracle(value) | Self::Fallback { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Oracle(value) | Self::Fallback { value, .. } => value,
        }
    }

    pub fn fallback_reason(&self) -> Option<&str> {
        match self {
            Self::Oracle(_) => None,
            Self::Fallback { reason, .. } => Some(reason),
        }
    }
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEntry {
    pub content: String,
    pub classification: Classification,
    pub is_completed: bool,
}

impl NewEntry {
    pub fn new(content: impl Into<String>, classification: Classification) -> Self {
        Self {
            content: content.into(),
            classification,
            is_completed: false,
        }
    }
}

impl From<ClassifiedItem> for NewEntry {
    fn from(item: ClassifiedItem) -> Self {
        Self {
            content: item.content,
            classification: item.classification,
            is_completed: item.is_completed,
        }
    }
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translated_content: Option<String>,
    pub language: Language,
    pub category: Category,
    #[serde(default)]
    pub tags: Vec<String>,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub action_items: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_kind: Option<CodeKind>,
    #[serde(default)]
    pub contains_slang: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub slang_terms: Vec<SlangTerm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
}

impl Entry {
    pub fn from_new(id: impl Into<String>, draft: NewEntry, now: DateTime<Utc>) -> Self {
        let NewEntry {
            content,
            classification,
            is_completed,
        } = draft;
        let translated = if classification.translated_content.trim().is_empty() {
            None
        } else {
            Some(classification.translated_content)
        };
        let reasoning = if classification.reasoning.trim().is_empty() {
            None
        } else {
            Some(classification.reasoning)
        };

        Self {
            id: id.into(),
            created_at: now,
            updated_at: now,
            content,
            translated_content: translated,
            language: classification.language,
            category: classification.category,
            tags: classification.tags,
            confidence: classification.confidence,
            due_date: classification.due_date,
            priority: classification.priority,
            action_items: classification.action_items,
            code_language: classification.code_language,
            code_kind: classification.code_kind,
            contains_slang: classification.contains_slang,
            slang_terms: classification.slang_terms,
            reasoning,
            is_completed,
        }
    }

    /// English text used for display; falls back to the original content.
    pub fn translated_or_content(&self) -> &str {
        self.translated_content.as_deref().unwrap_or(&self.content)
    }

    pub fn age_days(&self, now: DateTime<Utc>) -> f64 {
        now.signed_duration_since(self.created_at).num_seconds() as f64 / 86_400.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_category_coerce_unknown_to_general() {
        assert_eq!(Category::coerce("bug_fix"), Category::BugFix);
        assert_eq!(Category::coerce("Learning Note"), Category::LearningNote);
        assert_eq!(Category::coerce("code-snippet"), Category::CodeSnippet);
        assert_eq!(Category::coerce("recipe"), Category::General);
        assert_eq!(Category::coerce(""), Category::General);
    }

    #[test]
    fn test_category_labels() {
        assert_eq!(Category::BugFix.label(), "bug fix");
        assert_eq!(Category::Task.label(), "task");
        assert_eq!(Category::iter().count(), 6);
    }

    #[test]
    fn test_category_serde_snake_case() {
        let json = serde_json::to_string(&Category::LearningNote).unwrap();
        assert_eq!(json, "\"learning_note\"");
    }

    #[test]
    fn test_enum_coercions() {
        assert_eq!(Language::coerce("Hinglish"), Language::Hinglish);
        assert_eq!(Language::coerce("klingon"), Language::English);
        assert_eq!(Priority::coerce("URGENT"), Some(Priority::Urgent));
        assert_eq!(Priority::coerce("whenever"), None);
        assert_eq!(CodeKind::coerce("class"), Some(CodeKind::Class));
        assert_eq!(CodeKind::coerce("module"), Some(CodeKind::Other));
        assert_eq!(CodeKind::coerce(" "), None);
    }

    #[test]
    fn test_outcome_accessors() {
        let oracle: ClassificationOutcome<u8> = ClassificationOutcome::Oracle(1);
        assert!(!oracle.is_fallback());
        assert_eq!(oracle.fallback_reason(), None);

        let fallback = ClassificationOutcome::Fallback {
            value: 2u8,
            reason: "offline".to_string(),
        };
        assert!(fallback.is_fallback());
        assert_eq!(*fallback.value(), 2);
        assert_eq!(fallback.fallback_reason(), Some("offline"));
        assert_eq!(fallback.into_value(), 2);
    }
}
