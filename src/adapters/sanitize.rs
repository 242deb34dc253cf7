//! Payload sanitization for outgoing requests.
//!
//! Every request body is scrubbed before it leaves the process:
//! - `<` and `>` characters
//! - `javascript:` and `data:` schemes (case-insensitive)
//! - inline event-handler attributes such as `onerror=` (case-insensitive)
//!
//! Strings are then trimmed and capped at [`MAX_STRING_CHARS`] characters.
//! Arrays and objects are walked recursively (object keys included); other
//! JSON values pass through unchanged.
//!
//! # Security
//!
//! This is a defense-in-depth measure. The backend validates its own input.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// Maximum length of any sanitized string, in characters.
pub const MAX_STRING_CHARS: usize = 1000;

/// Characters of raw input the scrubber looks at. Removal passes over a
/// longer string cost quadratic time on nested splices.
const MAX_INPUT_CHARS: usize = 4 * MAX_STRING_CHARS;

static UNSAFE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn unsafe_pattern() -> &'static Regex {
    UNSAFE_PATTERN.get_or_init(|| {
        Regex::new(r"(?i)[<>]|javascript:|on\w+=|data:").expect("Valid regex")
    })
}

/// Sanitize a single string.
///
/// Removal is repeated until nothing matches: stripping `<` out of
/// `java<script:` would otherwise leave `javascript:` behind.
#[must_use]
pub fn sanitize_str(input: &str) -> String {
    let pattern = unsafe_pattern();

    let mut current = truncate_to_char_boundary(input.trim_start(), MAX_INPUT_CHARS).to_string();
    while pattern.is_match(&current) {
        current = pattern.replace_all(&current, "").into_owned();
    }

    // Cutting may expose whitespace at the new end.
    truncate_to_char_boundary(current.trim(), MAX_STRING_CHARS)
        .trim_end()
        .to_string()
}

fn truncate_to_char_boundary(input: &str, max_chars: usize) -> &str {
    match input.char_indices().nth(max_chars) {
        Some((end, _)) => &input[..end],
        None => input,
    }
}

/// Recursively sanitize a JSON tree.
#[must_use]
pub fn sanitize_value(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(sanitize_str(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize_value).collect()),
        Value::Object(entries) => {
            let mut sanitized = Map::with_capacity(entries.len());
            for (key, value) in entries {
                sanitized.insert(sanitize_str(&key), sanitize_value(value));
            }
            Value::Object(sanitized)
        }
        other => other,
    }
}
