//! Multi-factor confidence scoring and review disposition.
//!
//! Per-point confidence = 0.4·completeness + 0.3·source-reliability +
//! 0.2·statistical-significance + 0.1·quality-indicators, clamped to
//! [0, 1]. Disposition is a separate pure step: at or above the threshold
//! a point is auto-accepted, below it queues for human review — the same
//! rule for every source kind.

use crate::models::{EfficacyDataPoint, ReviewStatus, SourceKind};

pub struct ConfidenceScorer {
    threshold: f64,
}

impl ConfidenceScorer {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Score every point and set its disposition, in place. The scorer is
    /// the single writer of `confidence_score` after extraction.
    pub fn score_and_flag(&self, points: &mut [EfficacyDataPoint]) {
        for point in points {
            let score = self.score(point);
            point.confidence_score = score;
            point.review_status = if score >= self.threshold {
                ReviewStatus::AutoAccepted
            } else {
                ReviewStatus::PendingReview
            };
        }
    }

    pub fn score(&self, point: &EfficacyDataPoint) -> f64 {
        let confidence = 0.4 * completeness_component(point)
            + 0.3 * reliability_component(point)
            + 0.2 * significance_component(point)
            + 0.1 * quality_component(point);
        confidence.clamp(0.0, 1.0)
    }
}

/// 0.7 × fraction of required fields + 0.3 × fraction of six optionals.
pub fn completeness_component(point: &EfficacyDataPoint) -> f64 {
    let required = [
        point.endpoint_name.is_some(),
        point.drug_arm_result.is_some(),
        !point.source_url.is_empty(),
    ];
    let required_frac =
        required.iter().filter(|&&b| b).count() as f64 / required.len() as f64;

    let optional = [
        point.comparator_arm_result.is_some(),
        point.p_value.is_some(),
        point.timepoint.is_some(),
        point.trial_name.is_some(),
        point.drug_arm_name.is_some(),
        point.drug_arm_n.is_some(),
    ];
    let optional_frac =
        optional.iter().filter(|&&b| b).count() as f64 / optional.len() as f64;

    0.7 * required_frac + 0.3 * optional_frac
}

/// Fixed weights by source kind.
pub fn reliability_component(point: &EfficacyDataPoint) -> f64 {
    match point.source_kind {
        SourceKind::Publication => 1.0,
        SourceKind::Label => 0.9,
        SourceKind::Registry => 0.75,
        SourceKind::WebSearch => 0.6,
    }
}

/// An unknown p-value scores 0.5: unknown, not "not significant".
pub fn significance_component(point: &EfficacyDataPoint) -> f64 {
    match point.p_value {
        Some(p) if p <= 0.001 => 1.0,
        Some(p) if p <= 0.01 => 0.9,
        Some(p) if p <= 0.05 => 0.8,
        Some(p) if p <= 0.10 => 0.6,
        Some(_) => 0.4,
        None => 0.5,
    }
}

/// Base 0.5 plus 0.1 per corroborating detail, capped at 1.0. Comparator
/// N only counts when the drug-arm N is also present.
pub fn quality_component(point: &EfficacyDataPoint) -> f64 {
    let mut score: f64 = 0.5;
    if point.drug_arm_n.is_some() {
        score += 0.1;
        if point.comparator_arm_n.is_some() {
            score += 0.1;
        }
    }
    if point.confidence_interval.is_some() {
        score += 0.1;
    }
    if point.source_identifier().is_some() {
        score += 0.1;
    }
    if point.source_text.is_some() {
        score += 0.1;
    }
    score.min(1.0)
}
