
use crate::toolkit::note_toolbox::entry::Entry;


fn search_terms(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .filter(|term| term.chars().count() > 1)
        .map(str::to_lowercase)
        .collect()
}


fn haystack(entry: &Entry) -> String {
    let mut text = String::with_capacity(entry.content.len() * 2 + 64);
    text.push_str(&entry.content);
    text.push(' ');
    text.push_str(entry.translated_content.as_deref().unwrap_or_default());
    text.push(' ');
    text.push_str(&entry.category.label());
    for tag in &entry.tags {
        text.push(' ');
        text.push_str(tag);
    }
    text.push(' ');
    text.push_str(entry.reasoning.as_deref().unwrap_or_default());
    text.to_lowercase()
}


/// Offline AND-filter: every term longer than one character must occur somewhere in the entry.
/// Never calls the oracle and never fails. An empty query returns every entry.
pub fn local_search(query: &str, entries: &[Entry]) -> Vec<Entry> {
    if query.trim().is_empty() {
        return entries.to_vec();
    }

    let terms = search_terms(query);
    entries
        .iter()
        .filter(|entry| {
            let text = haystack(entry);
            terms.iter().all(|term| text.contains(term.as_str()))
        })
        .cloned()
        .collect()
}


/// Case-insensitive substring match on content, translation and tags; optionally the category.
pub(crate) fn substring_match(query: &str, entries: &[Entry], include_category: bool) -> Vec<Entry> {
    let needle = query.to_lowercase();
    entries
        .iter()
        .filter(|entry| {
            entry.content.to_lowercase().contains(&needle)
                || entry
                    .translated_content
                    .as_deref()
                    .is_some_and(|t| t.to_lowercase().contains(&needle))
                || entry.tags.iter().any(|t| t.to_lowercase().contains(&needle))
                || (include_category && entry.category.label().contains(&needle))
        })
        .cloned()
        .collect()
}
