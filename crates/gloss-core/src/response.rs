//! Response cleanup and validation
//!
//! Models sometimes wrap their JSON in a markdown code fence. The cleanup here
//! removes at most one leading and one trailing fence, then parses what is left.

use crate::error::ResponseError;
use crate::types::AnnotationDictionary;
use serde_json::Value;

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Unwrap an optional markdown code fence around a payload
///
/// A leading "```json" is preferred over a bare "```"; only one of them is
/// removed. A trailing "```" is removed independently.
#[must_use]
pub fn strip_code_fence(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix(JSON_FENCE) {
        text = rest;
    } else if let Some(rest) = text.strip_prefix(FENCE) {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix(FENCE) {
        text = rest;
    }
    text.trim()
}

/// Clean a raw service response and parse it into a dictionary
pub fn parse_dictionary(raw: &str) -> Result<AnnotationDictionary, ResponseError> {
    let cleaned = strip_code_fence(raw);
    let value: Value = serde_json::from_str(cleaned).map_err(|source| ResponseError::Json {
        cleaned: cleaned.to_string(),
        source,
    })?;
    AnnotationDictionary::from_value(value)
}
