//! Strict decoding of structured generator responses.
//!
//! Routing and grading calls run the generator in JSON mode and read one
//! string field from the object it returns. Values are compared after
//! trimming and ignoring ASCII case. Anything else (no JSON object, a
//! missing key, a non-string value, an unknown literal) is an error; a
//! malformed response is never read as either verdict.

use crate::types::RoutingDecision;
use arag_core::{AppError, AppResult};
use serde_json::{Map, Value};

const DATASOURCE_KEY: &str = "datasource";
const BINARY_SCORE_KEY: &str = "binary_score";

/// Slice from the first `{` to the last `}`.
///
/// Models in JSON mode sometimes wrap the object in code fences or prose.
pub fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Decode a router response into a [`RoutingDecision`].
pub fn decode_route(text: &str) -> AppResult<RoutingDecision> {
    let value = read_tag(text, DATASOURCE_KEY).map_err(AppError::Routing)?;

    match value.as_str() {
        "vectorstore" => Ok(RoutingDecision::UseRetriever),
        "websearch" => Ok(RoutingDecision::UseWebSearch),
        other => Err(AppError::Routing(format!(
            "unrecognized datasource '{}' (expected 'vectorstore' or 'websearch')",
            other
        ))),
    }
}

/// Decode a grader response's `binary_score` into `true` (yes) or `false` (no).
///
/// `grader` names the grading site in the error.
pub fn decode_binary_score(grader: &str, text: &str) -> AppResult<bool> {
    let value =
        read_tag(text, BINARY_SCORE_KEY).map_err(|message| AppError::grading(grader, message))?;

    match value.as_str() {
        "yes" => Ok(true),
        "no" => Ok(false),
        other => Err(AppError::grading(
            grader,
            format!("unrecognized binary_score '{}' (expected 'yes' or 'no')", other),
        )),
    }
}

/// Read `key` as a normalized string, or describe why it can't be read.
fn read_tag(text: &str, key: &str) -> Result<String, String> {
    let json = extract_json(text)
        .ok_or_else(|| format!("response is not a JSON object: {}", preview(text)))?;

    let object: Map<String, Value> = serde_json::from_str(json)
        .map_err(|e| format!("invalid JSON ({}): {}", e, preview(text)))?;

    let value = object
        .get(key)
        .ok_or_else(|| format!("missing '{}' in {}", key, preview(json)))?;

    let tag = value
        .as_str()
        .ok_or_else(|| format!("'{}' must be a string, got {}", key, value))?;

    let extra: Vec<&str> = object
        .keys()
        .map(String::as_str)
        .filter(|k| *k != key)
        .collect();
    if !extra.is_empty() {
        tracing::debug!("Ignoring extra keys in structured response: {:?}", extra);
    }

    Ok(tag.trim().to_ascii_lowercase())
}

fn preview(text: &str) -> String {
    const MAX: usize = 120;
    let trimmed = text.trim();
    match trimmed.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}
