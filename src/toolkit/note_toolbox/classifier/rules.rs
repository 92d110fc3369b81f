
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

use crate::toolkit::note_toolbox::entry::{Category, Classification, ClassifiedItem, Language};

pub const MAX_FALLBACK_TAGS: usize = 5;
pub const FALLBACK_TAG: &str = "general";
pub const BULK_FALLBACK_TAG: &str = "bulk-import-fallback";

const MATCHED_CONFIDENCE: f64 = 0.6;
const UNMATCHED_CONFIDENCE: f64 = 0.4;

lazy_static! {
    /// Checked in order; the first family with a hit decides the category.
    static ref KEYWORD_FAMILIES: Vec<(Category, Vec<&'static str>)> = vec![
        (Category::CodeSnippet, vec![
            "function", "const", "import", "=>", "console.log", "println!", "#include",
        ]),
        (Category::Idea, vec![
            "app", "build", "develop", "create", "idea", "startup", "website", "feature",
        ]),
        (Category::LearningNote, vec![
            "learn", "learned", "learnt", "learning", "til", "discovered", "realized",
        ]),
        (Category::BugFix, vec![
            "bug", "fix", "fixed", "error", "crash", "exception", "issue",
        ]),
        (Category::Task, vec![
            "task", "todo", "reminder", "remind", "buy", "call", "pay", "meeting", "deadline",
        ]),
    ];

    static ref COMPLETION_MARKER: Regex = Regex::new(
        r"(?i)(?:-\s*done\b|\[x\]|\bfixed\b|\bcompleted\b|\bho\s*gaya\b|\b(?:zala|jhala|zhala)\b|✅)"
    ).expect("completion marker pattern is valid");

    /// Everyday words like "class" or "return" only count as code in code-shaped context.
    static ref CODE_SHAPE: Regex = Regex::new(
        r"(?m)\bclass\s+[A-Z]\w*\s*(?:[{:(<]|\bextends\b|\bimplements\b)|\bdef\s+[A-Za-z_]\w*\s*\(|\breturn\b[^\n;]*;|\bexport\s+(?:default|const|let|function|class)\b"
    ).expect("code shape pattern is valid");

    static ref WORD_SPLIT: Regex = Regex::new(r"[^\p{L}\p{N}_]+").expect("word split pattern is valid");
}


fn matches_family(lower: &str, words: &HashSet<&str>, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| {
        if keyword.chars().all(|c| c.is_alphanumeric()) {
            words.contains(keyword)
        } else {
            lower.contains(keyword)
        }
    })
}


/// First keyword family present in `text`, in fixed precedence order.
pub fn detect_category(text: &str) -> Option<Category> {
    let lower = text.to_lowercase();
    let words: HashSet<&str> = WORD_SPLIT.split(&lower).filter(|w| !w.is_empty()).collect();

    KEYWORD_FAMILIES
        .iter()
        .find(|(category, keywords)| {
            matches_family(&lower, &words, keywords)
                || (*category == Category::CodeSnippet && CODE_SHAPE.is_match(text))
        })
        .map(|(category, _)| *category)
}


/// Up to five distinct lowercase tokens longer than three characters, or `["general"]`.
pub fn derive_fallback_tags(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let tags: Vec<String> = text
        .split_whitespace()
        .map(str::to_lowercase)
        .filter(|token| token.chars().count() > 3)
        .filter(|token| seen.insert(token.clone()))
        .take(MAX_FALLBACK_TAGS)
        .collect();

    if tags.is_empty() {
        vec![FALLBACK_TAG.to_string()]
    } else {
        tags
    }
}


pub fn has_completion_marker(text: &str) -> bool {
    COMPLETION_MARKER.is_match(text)
}


/// Oracle-free classification used when the oracle is unavailable.
pub fn rule_based_classification(text: &str) -> Classification {
    let detected = detect_category(text);
    let category = detected.unwrap_or(Category::General);
    let confidence = if detected.is_some() {
        MATCHED_CONFIDENCE
    } else {
        UNMATCHED_CONFIDENCE
    };

    Classification {
        language: Language::English,
        translated_content: text.to_string(),
        category,
        tags: derive_fallback_tags(text),
        confidence,
        due_date: None,
        priority: None,
        action_items: Vec::new(),
        code_language: None,
        code_kind: None,
        contains_slang: false,
        slang_terms: Vec::new(),
        reasoning: format!(
            "Rule-based classification as {} because the AI classifier was unavailable.",
            category.label()
        ),
    }
}


/// One minimal item per non-empty trimmed line. Pure; cannot fail.
pub fn line_split_fallback(raw: &str) -> Vec<ClassifiedItem> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| ClassifiedItem {
            content: line.to_string(),
            classification: Classification {
                language: Language::English,
                translated_content: line.to_string(),
                category: Category::General,
                tags: vec![BULK_FALLBACK_TAG.to_string()],
                confidence: 0.0,
                due_date: None,
                priority: None,
                action_items: Vec::new(),
                code_language: None,
                code_kind: None,
                contains_slang: false,
                slang_terms: Vec::new(),
                reasoning: "Imported without AI classification.".to_string(),
            },
            is_completed: false,
        })
        .collect()
}
