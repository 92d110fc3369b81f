use chrono::{Duration, Utc};

use super::entry::{Category, Classification, Entry, Language};

pub(crate) fn classification(category: Category, tags: &[&str]) -> Classification {
    Classification {
        language: Language::English,
        translated_content: String::new(),
        category,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        confidence: 0.9,
        due_date: None,
        priority: None,
        action_items: Vec::new(),
        code_language: None,
        code_kind: None,
        contains_slang: false,
        slang_terms: Vec::new(),
        reasoning: String::new(),
    }
}

/// Entry with no translation or reasoning, created `age_days` ago.
pub(crate) fn entry(id: &str, content: &str, category: Category, age_days: i64) -> Entry {
    let created = Utc::now() - Duration::days(age_days);
    Entry {
        id: id.to_string(),
        created_at: created,
        updated_at: created,
        content: content.to_string(),
        translated_content: None,
        language: Language::English,
        category,
        tags: Vec::new(),
        confidence: 0.9,
        due_date: None,
        priority: None,
        action_items: Vec::new(),
        code_language: None,
        code_kind: None,
        contains_slang: false,
        slang_terms: Vec::new(),
        reasoning: None,
        is_completed: false,
    }
}

pub(crate) fn tagged(mut entry: Entry, tags: &[&str]) -> Entry {
    entry.tags = tags.iter().map(|t| t.to_string()).collect();
    entry
}
