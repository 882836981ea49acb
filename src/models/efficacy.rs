use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{EndpointType, ReviewStatus, SourceKind};

/// Placeholder confidence assigned at creation, before the scorer runs.
pub const UNSCORED_CONFIDENCE: f64 = 0.85;

/// The atomic unit of extracted evidence: one endpoint result from one
/// source, with two arms and the statistics the source stated explicitly.
///
/// Lifecycle: created by an extractor with placeholder confidence; mutated
/// exactly once by the scorer (confidence + review status); a human
/// reviewer may then move pending points to confirmed or rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficacyDataPoint {
    pub id: Uuid,
    pub source_kind: SourceKind,
    pub source_url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub paper_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub trial_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_type: Option<EndpointType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub drug_arm_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drug_arm_n: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drug_arm_result: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drug_arm_unit: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparator_arm_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparator_arm_n: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparator_arm_result: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub p_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_interval: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timepoint: Option<String>,

    /// Verbatim excerpt from the source supporting this point.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_text: Option<String>,

    pub confidence_score: f64,
    pub review_status: ReviewStatus,
    pub created_at: DateTime<Utc>,
}

impl EfficacyDataPoint {
    pub fn new(source_kind: SourceKind, source_url: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_kind,
            source_url: source_url.to_string(),
            paper_id: None,
            registry_id: None,
            trial_name: None,
            phase: None,
            endpoint_name: None,
            endpoint_type: None,
            drug_arm_name: None,
            drug_arm_n: None,
            drug_arm_result: None,
            drug_arm_unit: None,
            comparator_arm_name: None,
            comparator_arm_n: None,
            comparator_arm_result: None,
            p_value: None,
            confidence_interval: None,
            timepoint: None,
            source_text: None,
            confidence_score: UNSCORED_CONFIDENCE,
            review_status: ReviewStatus::PendingReview,
            created_at: Utc::now(),
        }
    }

    pub fn is_primary(&self) -> bool {
        self.endpoint_type == Some(EndpointType::Primary)
    }

    /// Paper ID when present, else registry ID.
    pub fn source_identifier(&self) -> Option<&str> {
        self.paper_id.as_deref().or(self.registry_id.as_deref())
    }

    /// The drug-arm result interpreted as a response percentage, when the
    /// unit says it is one.
    pub fn response_rate(&self) -> Option<f64> {
        let unit = self.drug_arm_unit.as_deref()?;
        if unit.contains('%') || unit.eq_ignore_ascii_case("percent") {
            self.drug_arm_result
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_point_carries_placeholder_confidence() {
        let p = EfficacyDataPoint::new(SourceKind::Publication, "https://example.org/1");
        assert_eq!(p.confidence_score, UNSCORED_CONFIDENCE);
        assert_eq!(p.review_status, ReviewStatus::PendingReview);
        assert!(p.endpoint_name.is_none());
    }

    #[test]
    fn source_identifier_prefers_paper_id() {
        let mut p = EfficacyDataPoint::new(SourceKind::Publication, "u");
        p.registry_id = Some("NCT00424476".to_string());
        assert_eq!(p.source_identifier(), Some("NCT00424476"));
        p.paper_id = Some("19945765".to_string());
        assert_eq!(p.source_identifier(), Some("19945765"));
    }

    #[test]
    fn response_rate_requires_percent_unit() {
        let mut p = EfficacyDataPoint::new(SourceKind::Publication, "u");
        p.drug_arm_result = Some(52.4);
        assert_eq!(p.response_rate(), None);
        p.drug_arm_unit = Some("%".to_string());
        assert_eq!(p.response_rate(), Some(52.4));
        p.drug_arm_unit = Some("mmol/L".to_string());
        assert_eq!(p.response_rate(), None);
    }
}
