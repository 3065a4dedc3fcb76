//! Utility functions for text normalization and logging.

use once_cell::sync::Lazy;
use regex::Regex;

static MONEY_K: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$(\d+)K").unwrap());

/// Normalize `$NNNK` money notation to `$NNNk`.
///
/// The downstream text-to-speech step reads `$50K` inconsistently, so model
/// output is rewritten to the lowercase form before it is stored. Text
/// without a `$<digits>K` pattern passes through unchanged.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_money("$50K"), "$50k");
/// assert_eq!(normalize_money("a $3K prize"), "a $3k prize");
/// ```
pub fn normalize_money(text: &str) -> String {
    MONEY_K.replace_all(text, "$$${1}k").to_string()
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to at most `max` bytes with an ellipsis and
/// byte count indicator appended. The cut is moved back to the nearest char
/// boundary, so multi-byte input (remote error bodies are arbitrary UTF-8)
/// never panics the caller.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}
