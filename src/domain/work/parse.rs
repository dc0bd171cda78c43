//! Cleanup for model replies: code-fence stripping, JSON extraction and
//! sentence normalization.

use super::error::CollaboratorError;
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Longest sentence kept, in characters
pub const MAX_SENTENCE_CHARS: usize = 200;

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*?)```").unwrap());

static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d{1,2}[.)]|[-*•·])(?:\s+|$)").unwrap());

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Return the body of the first Markdown code fence, or the trimmed input
/// when there is none.
pub fn strip_code_fence(raw: &str) -> &str {
    match CODE_FENCE.captures(raw).and_then(|c| c.get(1)) {
        Some(body) => body.as_str().trim(),
        None => raw.trim(),
    }
}

/// Parse the JSON document embedded in a model reply.
pub fn extract_json(raw: &str) -> Result<Value, CollaboratorError> {
    let body = strip_code_fence(raw);

    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return Ok(value);
    }

    // Models sometimes wrap the JSON in prose; try the outermost object or array.
    for (open, close) in [('{', '}'), ('[', ']')] {
        if let (Some(start), Some(end)) = (body.find(open), body.rfind(close)) {
            if start < end {
                if let Ok(value) = serde_json::from_str::<Value>(&body[start..=end]) {
                    return Ok(value);
                }
            }
        }
    }

    Err(CollaboratorError::Format(format!(
        "reply is not valid JSON: {}",
        snippet(body, 120)
    )))
}

/// Normalize one generated sentence. Returns `None` when nothing is left.
pub fn clean_sentence(raw: &str) -> Option<String> {
    let collapsed = WHITESPACE.replace_all(raw.trim(), " ");
    let without_marker = LIST_MARKER.replace(&collapsed, "");
    let unquoted = without_marker
        .trim()
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '“' | '”' | '‘' | '’'))
        .trim();

    if unquoted.is_empty() {
        return None;
    }

    Some(unquoted.chars().take(MAX_SENTENCE_CHARS).collect())
}

/// Clean, drop blanks and duplicates, and keep at most `limit` sentences in order.
pub fn clean_sentences<I, S>(items: I, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter_map(|item| clean_sentence(item.as_ref()))
        .filter(|sentence| seen.insert(sentence.clone()))
        .take(limit)
        .collect()
}

/// Char-boundary-safe prefix for log lines.
pub fn snippet(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        out.push('…');
    }
    out
}
