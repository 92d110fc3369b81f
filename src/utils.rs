

/// Char-boundary-safe truncation for log previews; appends `...` when text was cut.
#[inline]
pub fn preview(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        format!("{}...", s.chars().take(max_chars).collect::<String>())
    } else {
        s.to_string()
    }
}
