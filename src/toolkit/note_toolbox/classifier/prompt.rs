
use chrono::NaiveDate;


pub const CLASSIFY_SYSTEM_PROMPT: &str = r#"You classify short personal notes written in English, Hindi, Marathi, Hinglish or a mix.
Respond only with JSON matching the provided schema.

Pick exactly one category, applying this precedence:
1. idea: the user wants to create, build or develop something (apps, tools, features).
2. code_snippet: the note contains or describes source code.
3. learning_note: something learned, discovered or worth remembering (TIL).
4. bug_fix: a bug, error or fix.
5. task: an errand or to-do that is not software development work.
6. general: anything else.

Translate the note to English in translated_content (copy it if already English).
Resolve relative dates ("tomorrow", "kal", "next monday") against the given current date and
return due_date as YYYY-MM-DD. Only tasks get due_date, priority and action_items.
Only code snippets get code_language and code_type.
Flag slang or colloquial terms in slang_terms with their meaning and a confidence in [0, 1].
Give 1-5 short lowercase tags and an overall confidence in [0, 1]."#;


pub const BULK_SYSTEM_PROMPT: &str = r#"You split a pasted block of notes into separate items and classify each one.
Respond only with JSON matching the provided schema: {"items": [...]}.

Split on numbered lists, bullet markers or newline-separated thoughts. Skip noise: log lines,
stack traces and bare headers. Keep each item's content as written, minus list markers.

Classify every item with the same rules as a single note:
idea > code_snippet > learning_note > bug_fix > task (non-development errands) > general.
Set is_completed to true when the item is marked done ("- done", "[x]", "fixed", "completed",
"ho gaya", "zala")."#;


pub fn build_classification_prompt(text: &str, today: NaiveDate) -> String {
    format!(
        "Current date: {}\n\nClassify this note:\n\n{}",
        today.format("%Y-%m-%d"),
        text
    )
}


pub fn build_bulk_prompt(text: &str, today: NaiveDate) -> String {
    format!(
        "Current date: {}\n\nSplit and classify these notes:\n\n{}",
        today.format("%Y-%m-%d"),
        text
    )
}
