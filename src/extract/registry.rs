//! Registry-metadata fallback extraction.
//!
//! When publications are thin, completed Phase 2/3 trials supply outcome
//! definitions instead. Registry metadata rarely carries numeric results,
//! so every point is forced to pending review and pre-seeded with low
//! confidence until the scorer runs.

use std::sync::Arc;

use crate::config::BenchmarkConfig;
use crate::models::{
    ApprovedDrug, DiseaseMatch, EfficacyDataPoint, EndpointType, ReviewStatus, SourceKind,
};
use crate::providers::{OutcomeMeasure, TrialDetails, TrialQuery, TrialRegistry};

pub struct RegistryExtractor {
    registry: Arc<dyn TrialRegistry>,
    config: BenchmarkConfig,
}

impl RegistryExtractor {
    pub fn new(registry: Arc<dyn TrialRegistry>, config: BenchmarkConfig) -> Self {
        Self { registry, config }
    }

    pub fn extract(
        &self,
        drug: &ApprovedDrug,
        disease: &DiseaseMatch,
    ) -> Vec<EfficacyDataPoint> {
        let query = TrialQuery {
            intervention: drug.generic_name.clone(),
            condition: Some(disease.standard_name.clone()),
            phases: vec!["2".to_string(), "3".to_string()],
            industry_sponsored_only: true,
            statuses: vec!["COMPLETED".to_string()],
            max_results: self.config.max_registry_trials,
        };

        let summaries = match self.registry.search(&query) {
            Ok(summaries) => summaries,
            Err(e) => {
                tracing::warn!(drug = %drug.generic_name, error = %e, "Registry fallback search failed");
                return Vec::new();
            }
        };

        let mut points = Vec::new();
        for summary in summaries.iter().take(self.config.max_registry_trials as usize) {
            let details = match self.registry.get_details(&summary.nct_id) {
                Ok(details) => details,
                Err(e) => {
                    tracing::warn!(nct_id = %summary.nct_id, error = %e, "Trial detail fetch failed, skipping trial");
                    continue;
                }
            };
            points.extend(self.trial_points(&details));
        }
        points
    }

    fn trial_points(&self, details: &TrialDetails) -> Vec<EfficacyDataPoint> {
        let mut points = Vec::new();
        for outcome in &details.primary_outcomes {
            points.push(self.outcome_point(
                details,
                outcome,
                EndpointType::Primary,
                self.config.registry_seed_confidence_primary,
            ));
        }
        for outcome in details
            .secondary_outcomes
            .iter()
            .take(self.config.max_secondary_outcomes)
        {
            points.push(self.outcome_point(
                details,
                outcome,
                EndpointType::Secondary,
                self.config.registry_seed_confidence_secondary,
            ));
        }
        points
    }

    fn outcome_point(
        &self,
        details: &TrialDetails,
        outcome: &OutcomeMeasure,
        endpoint_type: EndpointType,
        seed_confidence: f64,
    ) -> EfficacyDataPoint {
        let summary = &details.summary;
        let url = format!("https://clinicaltrials.gov/study/{}", summary.nct_id);
        let mut point = EfficacyDataPoint::new(SourceKind::Registry, &url);
        point.registry_id = Some(summary.nct_id.clone());
        point.trial_name = summary
            .acronym
            .clone()
            .or_else(|| Some(summary.title.clone()).filter(|t| !t.is_empty()));
        point.phase = summary.phase.clone();
        point.endpoint_name = Some(outcome.title.clone()).filter(|t| !t.is_empty());
        point.endpoint_type = Some(endpoint_type);
        point.drug_arm_n = summary.enrollment;
        point.timepoint = outcome.time_frame.clone();
        point.source_text = outcome.description.clone();
        point.confidence_score = seed_confidence;
        // Metadata-only evidence always needs a human pass.
        point.review_status = ReviewStatus::PendingReview;
        point
    }
}
