use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::disease::DiseaseMatch;
use super::drug::ApprovedDrug;
use super::efficacy::EfficacyDataPoint;
use super::enums::{ExtractionStatus, ReviewStatus, SessionStatus};

/// One drug's full extraction outcome within a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrugBenchmarkResult {
    pub drug: ApprovedDrug,
    pub data_points: Vec<EfficacyDataPoint>,
    pub status: ExtractionStatus,
    pub errors: Vec<String>,
}

impl DrugBenchmarkResult {
    pub fn pending(drug: ApprovedDrug) -> Self {
        Self {
            drug,
            data_points: Vec::new(),
            status: ExtractionStatus::Pending,
            errors: Vec::new(),
        }
    }
}

/// Unit-of-work for one user-triggered benchmark run.
///
/// Status machine: initializing → extracting → (review_needed | complete),
/// or failed when disease standardization fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkSession {
    pub id: Uuid,
    pub disease: DiseaseMatch,
    pub results: Vec<DrugBenchmarkResult>,
    pub status: SessionStatus,
    pub errors: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl BenchmarkSession {
    pub fn new(disease: DiseaseMatch) -> Self {
        Self {
            id: Uuid::new_v4(),
            disease,
            results: Vec::new(),
            status: SessionStatus::Initializing,
            errors: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn pending_review_count(&self) -> usize {
        self.results
            .iter()
            .flat_map(|r| r.data_points.iter())
            .filter(|p| p.review_status == ReviewStatus::PendingReview)
            .count()
    }
}

/// Pure computation: per-drug extraction status from its data points.
///
/// "success" requires at least one primary-endpoint point; secondary-only
/// yields "partial"; zero points yields "failed".
pub fn resolve_extraction_status(points: &[EfficacyDataPoint]) -> ExtractionStatus {
    if points.is_empty() {
        return ExtractionStatus::Failed;
    }
    if points.iter().any(|p| p.is_primary()) {
        ExtractionStatus::Success
    } else {
        ExtractionStatus::Partial
    }
}

/// Pure computation: session terminal status from point dispositions.
/// Kept separate from scoring so each side stays independently testable.
pub fn resolve_session_status(results: &[DrugBenchmarkResult]) -> SessionStatus {
    let any_pending = results
        .iter()
        .flat_map(|r| r.data_points.iter())
        .any(|p| p.review_status == ReviewStatus::PendingReview);
    if any_pending {
        SessionStatus::ReviewNeeded
    } else {
        SessionStatus::Complete
    }
}
