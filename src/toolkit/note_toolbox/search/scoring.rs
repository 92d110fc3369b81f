
use chrono::{DateTime, Utc};

use super::models::ScoredEntry;
use crate::toolkit::note_toolbox::entry::{Category, Entry};

pub const CONTENT_MATCH: u32 = 10;
pub const TRANSLATION_MATCH: u32 = 8;
pub const TAG_MATCH: u32 = 6;
pub const CATEGORY_NAME_MATCH: u32 = 4;
pub const CATEGORY_CANDIDATE: u32 = 5;


/// Tiered bonus: under a day 3, under a week 2, under a month 1, older 0.
pub fn recency_bonus(entry: &Entry, now: DateTime<Utc>) -> u32 {
    let age_days = entry.age_days(now);
    if age_days < 1.0 {
        3
    } else if age_days < 7.0 {
        2
    } else if age_days < 30.0 {
        1
    } else {
        0
    }
}


/// Relevance of `entry` for the given keywords and candidate categories. Zero means excluded.
/// Recency only adds to an entry that matched on some keyword or category signal.
pub fn score_entry(
    entry: &Entry,
    keywords: &[String],
    categories: &[Category],
    now: DateTime<Utc>,
) -> u32 {
    let content = entry.content.to_lowercase();
    let translated = entry.translated_content.as_deref().map(str::to_lowercase);
    let tags: Vec<String> = entry.tags.iter().map(|t| t.to_lowercase()).collect();
    let category_name = entry.category.as_str();

    let mut score = 0;
    for keyword in keywords {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() {
            continue;
        }
        if content.contains(&keyword) {
            score += CONTENT_MATCH;
        }
        if translated.as_deref().is_some_and(|t| t.contains(&keyword)) {
            score += TRANSLATION_MATCH;
        }
        if tags.iter().any(|t| t.contains(&keyword)) {
            score += TAG_MATCH;
        }
        if category_name.contains(&keyword) {
            score += CATEGORY_NAME_MATCH;
        }
    }

    if categories.contains(&entry.category) {
        score += CATEGORY_CANDIDATE;
    }

    if score > 0 {
        score += recency_bonus(entry, now);
    }
    score
}


/// Scores every entry, drops zero scores and sorts descending. Ties keep input order.
pub fn rank_entries(
    entries: &[Entry],
    keywords: &[String],
    categories: &[Category],
    now: DateTime<Utc>,
) -> Vec<ScoredEntry> {
    let mut scored: Vec<ScoredEntry> = entries
        .iter()
        .filter_map(|entry| {
            let score = score_entry(entry, keywords, categories, now);
            (score > 0).then(|| ScoredEntry {
                entry: entry.clone(),
                score,
            })
        })
        .collect();

    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolkit::note_toolbox::testing::{entry, tagged};

    fn words(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_react_hooks_scenario() {
        let now = Utc::now();
        let a = entry("a", "learning react hooks today", Category::LearningNote, 0);
        let b = entry("b", "fix bug in payment", Category::BugFix, 10);
        let c = entry("c", "weekend hiking plans", Category::General, 40);
        let keywords = words(&["react", "hooks", "useState"]);
        let categories = [Category::LearningNote];

        assert_eq!(score_entry(&a, &keywords, &categories, now), 28);
        assert_eq!(score_entry(&b, &keywords, &categories, now), 0);
        assert_eq!(score_entry(&c, &keywords, &categories, now), 0);

        let ranked = rank_entries(&[c, b, a], &keywords, &categories, now);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].entry.id, "a");
        assert_eq!(ranked[0].score, 28);
    }

    #[test]
    fn test_every_signal_counts() {
        let now = Utc::now();
        let mut e = tagged(entry("x", "Tokio runtime notes", Category::CodeSnippet, 40), &["TOKIO"]);
        e.translated_content = Some("tokio runtime notes".to_string());
        let keywords = words(&["tokio", "code"]);

        // tokio: content 10 + translation 8 + tag 6; code: category name 4
        assert_eq!(score_entry(&e, &keywords, &[], now), 28);
        assert_eq!(score_entry(&e, &keywords, &[Category::CodeSnippet], now), 33);
    }

    #[test]
    fn test_recency_tiers() {
        let keywords = words(&["note"]);
        let cases = [(0, 13), (3, 12), (7, 11), (29, 11), (30, 10), (365, 10)];
        for (age, expected) in cases {
            let e = entry("r", "note", Category::General, age);
            let now = Utc::now();
            assert_eq!(score_entry(&e, &keywords, &[], now), expected, "age {age}");
        }
    }

    #[test]
    fn test_no_signal_scores_zero_even_when_fresh() {
        let now = Utc::now();
        let e = entry("z", "brand new", Category::Idea, 0);
        assert_eq!(score_entry(&e, &words(&["react"]), &[Category::Task], now), 0);
        assert_eq!(score_entry(&e, &[], &[], now), 0);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let now = Utc::now();
        let entries = vec![
            entry("1", "rust tip", Category::General, 40),
            entry("2", "rust and go", Category::General, 40),
            entry("3", "rust rust", Category::General, 40),
        ];
        let ranked = rank_entries(&entries, &words(&["rust"]), &[], now);
        let ids: Vec<&str> = ranked.iter().map(|s| s.entry.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }
}
