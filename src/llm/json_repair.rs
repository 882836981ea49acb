//! Defensive parsing for model output.
//!
//! Responses are routinely wrapped in prose or code fences, and long
//! extractions get truncated mid-object. A truncated array is repaired by
//! cutting at the last balanced `{...}` element and closing the array;
//! only when no complete element exists is the response treated as empty.

use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JsonRepairError {
    #[error("No JSON payload found in response")]
    NoJsonFound,

    #[error("JSON unrecoverable: {0}")]
    Unrecoverable(String),
}

/// Strip a leading Markdown code fence, returning the fenced content when
/// present and the input otherwise.
pub fn strip_code_fences(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(fence_start) = trimmed.find("```") else {
        return trimmed;
    };
    let after_fence = &trimmed[fence_start + 3..];
    // Skip an optional language tag up to the first newline.
    let content_start = after_fence.find('\n').map(|i| i + 1).unwrap_or(0);
    let content = &after_fence[content_start..];
    match content.find("```") {
        Some(end) => content[..end].trim(),
        None => content.trim(),
    }
}

/// Parse the response as a JSON array of objects, repairing truncation.
///
/// A bare object response is tolerated and wrapped into a single-element
/// array. Returns `NoJsonFound` when the response holds no bracket at all.
pub fn parse_json_array(response: &str) -> Result<Vec<Value>, JsonRepairError> {
    let text = strip_code_fences(response);

    if let Some(start) = text.find('[') {
        let tail = &text[start..];
        // Fast path: the payload is intact.
        if let Some(end) = tail.rfind(']') {
            if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(&tail[..=end]) {
                return Ok(items);
            }
        }
        return repair_truncated_array(tail);
    }

    // No array — accept a single bare object.
    if let Some(start) = text.find('{') {
        if let Some(end) = text.rfind('}') {
            if start < end {
                if let Ok(value) = serde_json::from_str::<Value>(&text[start..=end]) {
                    return Ok(vec![value]);
                }
            }
        }
        return Err(JsonRepairError::Unrecoverable(
            "object payload does not parse".to_string(),
        ));
    }

    Err(JsonRepairError::NoJsonFound)
}

/// Repair an array truncated mid-element: keep every balanced top-level
/// `{...}` object, drop the trailing fragment, close the array.
///
/// `text` must begin at the `[`. Fails when not even one element survived.
pub fn repair_truncated_array(text: &str) -> Result<Vec<Value>, JsonRepairError> {
    debug_assert!(text.starts_with('['));
    let inner = &text[1..];

    let mut nest: i32 = 0;
    let mut in_string = false;
    let mut escaped = false;
    let mut last_complete: Option<usize> = None;

    for (i, c) in inner.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' | '[' => nest += 1,
            '}' => {
                nest -= 1;
                if nest == 0 {
                    last_complete = Some(i + 1);
                }
            }
            ']' => {
                if nest == 0 {
                    // Array closed cleanly after all; stop here.
                    break;
                }
                nest -= 1;
            }
            _ => {}
        }
    }

    let end = last_complete.ok_or_else(|| {
        JsonRepairError::Unrecoverable("no complete element before truncation".to_string())
    })?;

    let rebuilt = format!("[{}]", &inner[..end]);
    match serde_json::from_str::<Value>(&rebuilt) {
        Ok(Value::Array(items)) => Ok(items),
        Ok(_) => Err(JsonRepairError::Unrecoverable(
            "repaired payload is not an array".to_string(),
        )),
        Err(e) => Err(JsonRepairError::Unrecoverable(e.to_string())),
    }
}

/// Parse the response as a single JSON object. Objects are small enough in
/// practice that truncation is not repaired — a cut object is an error the
/// caller degrades to "no data".
pub fn parse_json_object(
    response: &str,
) -> Result<serde_json::Map<String, Value>, JsonRepairError> {
    let text = strip_code_fences(response);
    let start = text.find('{').ok_or(JsonRepairError::NoJsonFound)?;
    let end = text.rfind('}').ok_or(JsonRepairError::NoJsonFound)?;
    if end <= start {
        return Err(JsonRepairError::NoJsonFound);
    }
    match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(JsonRepairError::Unrecoverable(
            "payload is not an object".to_string(),
        )),
        Err(e) => Err(JsonRepairError::Unrecoverable(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_clean_array() {
        let items = parse_json_array(r#"[{"a": 1}, {"a": 2}]"#).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn parses_fenced_array_with_prose() {
        let response = "Here are the results:\n```json\n[{\"endpoint\": \"SRI-4\"}]\n```\nDone.";
        let items = parse_json_array(response).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["endpoint"], "SRI-4");
    }

    #[test]
    fn repairs_truncation_after_complete_element() {
        // One complete element, a comma, then a partial second object.
        let response = r#"[{"endpoint": "ACR20", "result": 52.4}, {"endpoint": "ACR"#;
        let items = parse_json_array(response).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["endpoint"], "ACR20");
    }

    #[test]
    fn repairs_truncation_inside_nested_structure() {
        let response = r#"[{"arms": [{"n": 100}]}, {"arms": [{"n":"#;
        let items = parse_json_array(response).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn repair_ignores_braces_inside_strings() {
        let response = r#"[{"note": "a } tricky { string"}, {"note": "cut"#;
        let items = parse_json_array(response).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["note"], "a } tricky { string");
    }

    #[test]
    fn truncation_with_no_complete_element_is_error() {
        let result = parse_json_array(r#"[{"endpoint": "ACR2"#);
        assert!(matches!(result, Err(JsonRepairError::Unrecoverable(_))));
    }

    #[test]
    fn bare_object_wrapped_into_array() {
        let items = parse_json_array(r#"{"endpoint": "SRI-4"}"#).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn no_json_at_all_is_error() {
        assert!(matches!(
            parse_json_array("I could not find any efficacy data."),
            Err(JsonRepairError::NoJsonFound)
        ));
    }

    #[test]
    fn parses_object_with_fence() {
        let map = parse_json_object("```json\n{\"NCT1\": \"BLISS-52\"}\n```").unwrap();
        assert_eq!(map["NCT1"], "BLISS-52");
    }

    #[test]
    fn truncated_object_is_error() {
        assert!(parse_json_object(r#"{"NCT1": "BLI"#).is_err());
    }

    #[test]
    fn strip_fences_without_language_tag() {
        assert_eq!(strip_code_fences("```\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fences("[1]"), "[1]");
    }
}
