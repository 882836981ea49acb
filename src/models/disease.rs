use serde::{Deserialize, Serialize};

use super::enums::MatchType;

/// Result of standardizing a free-text disease name.
///
/// Created once per standardization call and cached for the process
/// lifetime; treat as immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseMatch {
    /// The raw input string, unmodified.
    pub raw_name: String,
    /// Canonical standard name; equals the input when unmatched.
    pub standard_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thesaurus_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub therapeutic_area: Option<String>,
    pub match_type: MatchType,
    /// 0.0 (unmatched) to 1.0 (exact curated hit).
    pub confidence: f64,
    pub synonyms: Vec<String>,
}

impl DiseaseMatch {
    /// The "no match" record: confidence 0, standard name = input.
    /// Never returned as an error for non-empty input.
    pub fn unmatched(raw_name: &str) -> Self {
        Self {
            raw_name: raw_name.to_string(),
            standard_name: raw_name.to_string(),
            thesaurus_id: None,
            therapeutic_area: None,
            match_type: MatchType::Unmatched,
            confidence: 0.0,
            synonyms: Vec::new(),
        }
    }

    pub fn is_matched(&self) -> bool {
        self.match_type != MatchType::Unmatched && self.confidence > 0.0
    }
}
