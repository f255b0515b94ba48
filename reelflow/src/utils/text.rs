//! Text helpers shared by the stage adapters.

use base64::{engine::general_purpose::STANDARD, Engine};

/// Counts whitespace-separated words.
#[must_use]
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Estimates narration length in whole seconds, rounding up.
///
/// `words_per_minute` must be non-zero.
#[must_use]
pub fn narration_seconds(words: usize, words_per_minute: u32) -> u32 {
    let wpm = u64::from(words_per_minute.max(1));
    let words = words as u64;
    let seconds = (words * 60).div_ceil(wpm);
    u32::try_from(seconds).unwrap_or(u32::MAX)
}

/// Returns at most `max_chars` characters of `text`, on a char boundary.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Escapes the characters that are significant in XML text and attributes.
#[must_use]
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Builds a base64 `data:` URL for the given payload.
#[must_use]
pub fn data_url(mime: &str, payload: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(payload))
}
