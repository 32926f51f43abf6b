//! Response extraction: model text → [`RecipeRecord`].
//!
//! Models are told to return bare JSON, yet they regularly wrap the object in
//! a ` ```json … ``` ` fence. The rule here is narrow: the text
//! is only touched when it *starts* with a fence, and then only the part
//! between the first ` ```json ` marker and the next closing fence is kept.
//! Anything else, including prose around a bare object, is handed to the JSON
//! parser untouched and fails as a content error.

use crate::error::RecipeError;
use crate::recipe::RecipeRecord;
use serde_json::Value;

const FENCE: &str = "```";
const JSON_FENCE: &str = "```json";

/// Strip a leading markdown code fence.
///
/// * Text not starting with "```" is returned unchanged.
/// * Text starting with "```" yields the trimmed slice between the first
///   "```json" marker and the next "```" (or the end of the text).
/// * Text starting with "```" but containing no "```json" marker yields
///   `None`.
///
/// Stripping is idempotent: a stripped result never starts with a fence
/// unless the model nested fences inside the payload.
pub fn strip_markdown_fence(text: &str) -> Option<&str> {
    if !text.starts_with(FENCE) {
        return Some(text);
    }

    let start = text.find(JSON_FENCE)? + JSON_FENCE.len();
    let rest = &text[start..];
    let end = rest.find(FENCE).unwrap_or(rest.len());
    Some(rest[..end].trim())
}

/// Fence-strip and parse `text` as a JSON object.
///
/// `provider` only labels the error. Every failure is a
/// [`RecipeError::Content`] carrying the raw text.
pub fn parse_recipe_text(provider: &str, text: &str) -> Result<RecipeRecord, RecipeError> {
    let content_error = |detail: String| RecipeError::Content {
        provider: provider.to_string(),
        detail,
        raw: text.to_string(),
    };

    let payload = strip_markdown_fence(text)
        .ok_or_else(|| content_error("response starts with a code fence but has no ```json block".into()))?;

    match serde_json::from_str::<Value>(payload) {
        Ok(Value::Object(fields)) => Ok(RecipeRecord::new(fields)),
        Ok(other) => Err(content_error(format!(
            "expected a JSON object, got {}",
            json_type_name(&other)
        ))),
        Err(e) => Err(content_error(e.to_string())),
    }
}

fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
