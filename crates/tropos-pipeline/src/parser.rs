//! Resilient JSON recovery from free-form model output
//!
//! Model responses are untrusted text that may wrap the JSON payload in
//! commentary or code fences. Recovery is an ordered list of strategies;
//! the first success wins and no errors escape.

use serde_json::Value;
use tracing::warn;
use tropos_domain::MetaphorCandidate;

/// How much raw text to log when no strategy succeeds
const PREVIEW_CHARS: usize = 200;

/// Recover one JSON object (or array) from free-form model output.
///
/// Strategies, tried in strict order:
/// 1. Parse the whole trimmed text directly.
/// 2. Parse the content of a ```` ```json ```` fenced block. A malformed
///    fence body falls through to the next strategy rather than aborting.
/// 3. Scan from the first `{` with naive brace-depth counting and parse the
///    balanced region. Braces inside string literals are not handled; this
///    can misfire on literal `{`/`}` embedded in string content, a known
///    limitation preserved deliberately (callers depend on the observable
///    behavior for malformed inputs).
///
/// Returns `None` when nothing parses.
pub fn extract_json(text: &str) -> Option<Value> {
    let trimmed = text.trim();

    if let Ok(value) = serde_json::from_str(trimmed) {
        return Some(value);
    }

    if let Some(value) = fenced_block(trimmed) {
        return Some(value);
    }

    balanced_braces(trimmed)
}

/// Strategy 2: content strictly between ```json and the next closing fence
fn fenced_block(text: &str) -> Option<Value> {
    let tag = "```json";
    let start = text.find(tag)? + tag.len();
    let end = text[start..].find("```")? + start;
    serde_json::from_str(text[start..end].trim()).ok()
}

/// Strategy 3: first `{` to the brace that returns depth to zero
fn balanced_braces(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let mut depth = 0usize;

    for (offset, ch) in text[start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    let end = start + offset + ch.len_utf8();
                    return serde_json::from_str(&text[start..end]).ok();
                }
            }
            _ => {}
        }
    }
    None
}

/// Decode a candidate array under `key` from a recovered JSON object.
///
/// A missing key or non-array value yields an empty list (the pipeline
/// treats "nothing found" as a valid outcome, not a failure). Entries
/// missing `text` or `context` are skipped with a warning.
pub fn parse_candidate_array(value: &Value, key: &str) -> Vec<MetaphorCandidate> {
    let Some(items) = value.get(key).and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut candidates = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        match serde_json::from_value::<MetaphorCandidate>(item.clone()) {
            Ok(candidate) => candidates.push(candidate),
            Err(e) => {
                warn!(index = idx, error = %e, "skipping malformed candidate entry");
            }
        }
    }
    candidates
}

/// Bounded preview of raw model output for diagnostics
pub fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_CHARS {
        text.to_string()
    } else {
        let cut: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", cut)
    }
}
