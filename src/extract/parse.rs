//! Lenient parsing of model extraction responses.
//!
//! Field access never panics and never aborts a paper: unknown shapes
//! collapse to `None`, numeric fields arriving as strings ("<0.001",
//! "52.4%", "1,200") are sanitized before conversion.

use serde_json::Value;

use crate::llm::json_repair::{parse_json_array, JsonRepairError};
use crate::models::EndpointType;

/// One endpoint as the model reported it, before attribution and scoring.
#[derive(Debug, Clone, Default)]
pub struct RawExtractedEndpoint {
    pub endpoint_name: Option<String>,
    pub endpoint_type: Option<EndpointType>,
    pub trial_name: Option<String>,
    pub phase: Option<String>,
    pub drug_arm_name: Option<String>,
    pub drug_arm_n: Option<u32>,
    pub drug_arm_result: Option<f64>,
    pub drug_arm_unit: Option<String>,
    pub comparator_arm_name: Option<String>,
    pub comparator_arm_n: Option<u32>,
    pub comparator_arm_result: Option<f64>,
    pub p_value: Option<f64>,
    pub confidence_interval: Option<String>,
    pub timepoint: Option<String>,
    pub source_text: Option<String>,
}

/// Parse a model response into raw endpoints. Non-object array elements
/// are skipped; truncated arrays are repaired upstream.
pub fn parse_extraction_response(
    response: &str,
) -> Result<Vec<RawExtractedEndpoint>, JsonRepairError> {
    let items = parse_json_array(response)?;
    Ok(items
        .iter()
        .filter_map(Value::as_object)
        .map(endpoint_from_object)
        .collect())
}

fn endpoint_from_object(obj: &serde_json::Map<String, Value>) -> RawExtractedEndpoint {
    RawExtractedEndpoint {
        endpoint_name: get_string(obj, &["endpoint_name", "endpoint"]),
        endpoint_type: get_string(obj, &["endpoint_type", "type"])
            .as_deref()
            .and_then(parse_endpoint_type),
        trial_name: get_string(obj, &["trial_name", "trial"]),
        phase: get_string(obj, &["phase"]),
        drug_arm_name: get_string(obj, &["drug_arm_name", "drug_arm"]),
        drug_arm_n: get(obj, &["drug_arm_n", "drug_n"]).and_then(parse_loose_u32),
        drug_arm_result: get(obj, &["drug_arm_result", "drug_result"]).and_then(parse_loose_f64),
        drug_arm_unit: get_string(obj, &["drug_arm_unit", "unit"]),
        comparator_arm_name: get_string(obj, &["comparator_arm_name", "comparator_arm"]),
        comparator_arm_n: get(obj, &["comparator_arm_n", "comparator_n"]).and_then(parse_loose_u32),
        comparator_arm_result: get(obj, &["comparator_arm_result", "comparator_result"])
            .and_then(parse_loose_f64),
        p_value: get(obj, &["p_value", "pvalue", "p"]).and_then(parse_loose_f64),
        confidence_interval: get_string(obj, &["confidence_interval", "ci"]),
        timepoint: get_string(obj, &["timepoint", "time_point"]),
        source_text: get_string(obj, &["source_text", "quote"]),
    }
}

fn get<'a>(obj: &'a serde_json::Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|k| obj.get(*k))
        .filter(|v| !v.is_null())
}

fn get_string(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    get(obj, keys)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn parse_endpoint_type(s: &str) -> Option<EndpointType> {
    let lower = s.trim().to_lowercase();
    if lower.starts_with("primary") {
        Some(EndpointType::Primary)
    } else if lower.starts_with("secondary") {
        Some(EndpointType::Secondary)
    } else if lower.starts_with("exploratory") {
        Some(EndpointType::Exploratory)
    } else {
        None
    }
}

/// Numeric parsing that survives comparison operators, thousands
/// separators, and percent signs. Failure is `None`, never a panic.
pub fn parse_loose_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => sanitize_numeric(s).parse().ok(),
        _ => None,
    }
}

pub fn parse_loose_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => {
            let sanitized = sanitize_numeric(s);
            sanitized
                .parse::<u32>()
                .ok()
                .or_else(|| sanitized.parse::<f64>().ok().map(|f| f.round() as u32))
        }
        _ => None,
    }
}

fn sanitize_numeric(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '<' | '>' | '=' | '≤' | '≥' | '~' | '%' | ',') && !c.is_whitespace())
        .collect()
}
