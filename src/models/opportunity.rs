use serde::{Deserialize, Serialize};

use super::enums::{Consistency, EfficacySignal, EvidenceLevel};

/// Disease×drug evidence rollup, recomputed wholesale on each aggregation
/// pass and persisted by full replace-on-conflict — never patched
/// field-by-field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub drug_key: String,
    pub disease: String,
    /// Sum of drug-arm N across contributing papers (missing N counts 0).
    pub total_patients: u64,
    pub study_count: usize,
    /// N-weighted mean of per-paper scores, 0–10 scale.
    pub aggregate_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_paper_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_paper_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_response_rate: Option<f64>,
    pub consistency: Consistency,
    /// Coefficient of variation of response rates, percent; None when
    /// fewer than 2 valid rates contributed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cv: Option<f64>,
    /// Best (highest-hierarchy) level across contributing papers.
    pub evidence_level: EvidenceLevel,
    pub efficacy_signal: EfficacySignal,
    pub contributing_papers: Vec<String>,
    /// Dense row-number over aggregate score descending, per drug.
    /// Recomputed in full after every aggregation pass.
    pub rank: u32,
}
