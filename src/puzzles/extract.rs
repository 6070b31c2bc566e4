//! Pulling puzzle JSON out of a raw model reply.
//!
//! Extraction runs in two stages:
//! - `extract_text` finds the reply text inside the provider's response body
//! - `isolate_json` finds the JSON payload inside that text, tolerating code
//!   fences and surrounding prose

use serde_json::Value;
use thiserror::Error;

/// Errors raised while isolating a JSON payload.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    #[error("response text is empty")]
    EmptyText,
    #[error("no JSON payload located in response text")]
    NoPayload,
    #[error("malformed JSON payload: {0}")]
    Malformed(String),
}

type TextExtractor = fn(&Value) -> Option<&str>;

/// Known response shapes, in priority order.
const TEXT_EXTRACTORS: [TextExtractor; 2] = [direct_text, first_candidate_text];

/// Return the reply text of a provider response, or an empty string when no
/// known shape yields any.
pub fn extract_text(response: &Value) -> String {
    TEXT_EXTRACTORS
        .iter()
        .find_map(|extract| extract(response).filter(|text| !text.trim().is_empty()))
        .map(str::to_string)
        .unwrap_or_default()
}

/// `{"text": "..."}`
fn direct_text(response: &Value) -> Option<&str> {
    response.get("text")?.as_str()
}

/// `{"candidates": [{"content": {"parts": [{"text": "..."}]}}]}`
fn first_candidate_text(response: &Value) -> Option<&str> {
    response
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .get(0)?
        .get("text")?
        .as_str()
}

/// Parse the JSON payload embedded in `raw`.
///
/// Code fences are stripped first and a direct parse attempted. Failing that,
/// the payload is taken to run from the first `{` or `[` to the last `}` or
/// `]` after it.
pub fn isolate_json(raw: &str) -> Result<Value, ExtractError> {
    let text = strip_code_fences(raw);
    if text.is_empty() {
        return Err(ExtractError::EmptyText);
    }
    if let Ok(value) = serde_json::from_str(text) {
        return Ok(value);
    }

    let start = text
        .find(|c: char| c == '{' || c == '[')
        .ok_or(ExtractError::NoPayload)?;
    let end = text[start..]
        .rfind(|c: char| c == '}' || c == ']')
        .map(|offset| start + offset)
        .ok_or(ExtractError::NoPayload)?;

    serde_json::from_str(&text[start..=end]).map_err(|e| ExtractError::Malformed(e.to_string()))
}

fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        let (first_line, remainder) = rest.split_once('\n').unwrap_or((rest, ""));
        let is_language_tag = first_line
            .trim()
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        text = if is_language_tag { remainder } else { rest };
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }

    text.trim()
}
