//! Text helpers for bounded diagnostics.

/// Truncates text to at most `max_chars` characters, appending an
/// ellipsis marker when anything was cut.
///
/// Operates on character boundaries, so multi-byte text is never split
/// mid-character.
#[must_use]
pub fn truncate_snippet(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{truncated}…(truncated)")
}
