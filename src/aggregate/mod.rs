//! Disease-level evidence aggregation.
//!
//! Rolls per-paper evidence up into one Opportunity per drug×disease
//! group: N-weighted score, consistency via coefficient of variation,
//! evidence-level hierarchy resolution, and a full rank recompute.
//! Idempotent by construction — the same input set reproduces the same
//! output, rank included.
//!
//! The CV cut-offs, signal buckets, and hierarchy ranks encode product
//! policy, not clinical law; they live in [`AggregationPolicy`].

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{
    Consistency, EfficacyDataPoint, EfficacySignal, EvidenceLevel, Opportunity,
};

/// One paper's contribution to a drug×disease group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperEvidence {
    pub drug_key: String,
    pub disease: String,
    pub paper_id: String,
    /// Paper-level evidence score, 0–10.
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patients: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_rate: Option<f64>,
    pub evidence_level: EvidenceLevel,
    pub efficacy_signal: EfficacySignal,
}

/// Study-design rigor ranking; the highest-ranked level among a group's
/// papers wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceHierarchy {
    ranks: Vec<(EvidenceLevel, u8)>,
}

impl Default for EvidenceHierarchy {
    fn default() -> Self {
        Self {
            ranks: vec![
                (EvidenceLevel::Rct, 10),
                (EvidenceLevel::MetaAnalysis, 9),
                (EvidenceLevel::SystematicReview, 8),
                (EvidenceLevel::Cohort, 7),
                (EvidenceLevel::CaseControl, 6),
                (EvidenceLevel::CaseSeries, 4),
                (EvidenceLevel::CaseReport, 3),
                (EvidenceLevel::Preclinical, 2),
                (EvidenceLevel::Unknown, 1),
            ],
        }
    }
}

impl EvidenceHierarchy {
    pub fn rank(&self, level: &EvidenceLevel) -> u8 {
        self.ranks
            .iter()
            .find(|(l, _)| l == level)
            .map(|(_, r)| *r)
            .unwrap_or(1)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationPolicy {
    /// CV below this is "high" consistency, below the next "moderate".
    pub cv_high: f64,
    pub cv_moderate: f64,
    /// Signal-average bucket floors.
    pub signal_strong: f64,
    pub signal_moderate: f64,
    pub signal_weak: f64,
    /// Used when every contributing weight is zero.
    pub default_score: f64,
    pub hierarchy: EvidenceHierarchy,
}

impl Default for AggregationPolicy {
    fn default() -> Self {
        Self {
            cv_high: 25.0,
            cv_moderate: 50.0,
            signal_strong: 2.5,
            signal_moderate: 1.5,
            signal_weak: 0.5,
            default_score: 5.0,
            hierarchy: EvidenceHierarchy::default(),
        }
    }
}

/// Aggregate paper evidence into one Opportunity per drug×disease group,
/// ranks recomputed in full. Output order is deterministic (drug, disease).
pub fn aggregate_opportunities(
    records: &[PaperEvidence],
    policy: &AggregationPolicy,
) -> Vec<Opportunity> {
    let mut groups: BTreeMap<(String, String), Vec<&PaperEvidence>> = BTreeMap::new();
    for record in records {
        groups
            .entry((record.drug_key.clone(), record.disease.clone()))
            .or_default()
            .push(record);
    }

    let mut opportunities: Vec<Opportunity> = groups
        .into_iter()
        .map(|((drug_key, disease), papers)| aggregate_group(drug_key, disease, &papers, policy))
        .collect();

    rank_opportunities(&mut opportunities);
    opportunities
}

fn aggregate_group(
    drug_key: String,
    disease: String,
    papers: &[&PaperEvidence],
    policy: &AggregationPolicy,
) -> Opportunity {
    let total_patients: u64 = papers
        .iter()
        .map(|p| u64::from(p.patients.unwrap_or(0)))
        .sum();

    // Missing N weighs 1, never 0 — a paper without enrollment still counts.
    let weight_sum: f64 = papers
        .iter()
        .map(|p| p.patients.map(f64::from).unwrap_or(1.0))
        .sum();
    let aggregate_score = if weight_sum > 0.0 {
        papers
            .iter()
            .map(|p| p.score * p.patients.map(f64::from).unwrap_or(1.0))
            .sum::<f64>()
            / weight_sum
    } else {
        policy.default_score
    };

    // Argmax with ties broken by encounter order.
    let mut best: Option<&PaperEvidence> = None;
    for &paper in papers {
        if best.map_or(true, |b| paper.score > b.score) {
            best = Some(paper);
        }
    }

    let response_rates: Vec<f64> = papers.iter().filter_map(|p| p.response_rate).collect();
    let avg_response_rate = if response_rates.is_empty() {
        None
    } else {
        Some(response_rates.iter().sum::<f64>() / response_rates.len() as f64)
    };

    let cv = coefficient_of_variation(&response_rates);
    let consistency = consistency_label(cv, policy);

    let evidence_level = papers
        .iter()
        .fold(None::<&EvidenceLevel>, |acc, p| match acc {
            Some(current)
                if policy.hierarchy.rank(current) >= policy.hierarchy.rank(&p.evidence_level) =>
            {
                Some(current)
            }
            _ => Some(&p.evidence_level),
        })
        .cloned()
        .unwrap_or(EvidenceLevel::Unknown);

    let signal_avg = papers
        .iter()
        .map(|p| p.efficacy_signal.score())
        .sum::<f64>()
        / papers.len() as f64;
    let efficacy_signal = bucket_signal(signal_avg, policy);

    Opportunity {
        drug_key,
        disease,
        total_patients,
        study_count: papers.len(),
        aggregate_score,
        best_paper_id: best.map(|p| p.paper_id.clone()),
        best_paper_score: best.map(|p| p.score),
        avg_response_rate,
        consistency,
        cv,
        evidence_level,
        efficacy_signal,
        contributing_papers: papers.iter().map(|p| p.paper_id.clone()).collect(),
        rank: 0,
    }
}

/// Sample CV (%) of the non-zero rates; needs at least two valid values.
pub fn coefficient_of_variation(rates: &[f64]) -> Option<f64> {
    let valid: Vec<f64> = rates.iter().copied().filter(|r| *r != 0.0).collect();
    if valid.len() < 2 {
        return None;
    }
    let mean = valid.iter().sum::<f64>() / valid.len() as f64;
    if mean == 0.0 {
        return None;
    }
    let variance = valid.iter().map(|r| (r - mean).powi(2)).sum::<f64>()
        / (valid.len() - 1) as f64;
    Some(variance.sqrt() / mean * 100.0)
}

pub fn consistency_label(cv: Option<f64>, policy: &AggregationPolicy) -> Consistency {
    match cv {
        None => Consistency::NotAvailable,
        Some(cv) if cv < policy.cv_high => Consistency::High,
        Some(cv) if cv < policy.cv_moderate => Consistency::Moderate,
        Some(_) => Consistency::Low,
    }
}

pub fn bucket_signal(average: f64, policy: &AggregationPolicy) -> EfficacySignal {
    if average >= policy.signal_strong {
        EfficacySignal::Strong
    } else if average >= policy.signal_moderate {
        EfficacySignal::Moderate
    } else if average >= policy.signal_weak {
        EfficacySignal::Weak
    } else {
        EfficacySignal::None
    }
}

/// Dense row-number over aggregate score descending, per drug, ties broken
/// by disease for determinism. Never patched incrementally.
pub fn rank_opportunities(opportunities: &mut [Opportunity]) {
    let mut by_drug: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (i, opp) in opportunities.iter().enumerate() {
        by_drug.entry(opp.drug_key.clone()).or_default().push(i);
    }
    for indices in by_drug.into_values() {
        let mut sorted = indices;
        sorted.sort_by(|&a, &b| {
            opportunities[b]
                .aggregate_score
                .partial_cmp(&opportunities[a].aggregate_score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| opportunities[a].disease.cmp(&opportunities[b].disease))
        });
        for (row, idx) in sorted.into_iter().enumerate() {
            opportunities[idx].rank = row as u32 + 1;
        }
    }
}

/// Summarize one paper's accepted data points into its evidence record.
/// Rejected points never contribute; a paper with nothing left yields None.
pub fn summarize_paper(
    drug_key: &str,
    disease: &str,
    paper_id: &str,
    evidence_level: EvidenceLevel,
    points: &[EfficacyDataPoint],
) -> Option<PaperEvidence> {
    let accepted: Vec<&EfficacyDataPoint> = points
        .iter()
        .filter(|p| p.review_status.counts_toward_aggregation())
        .collect();
    if accepted.is_empty() {
        return None;
    }

    let score = accepted
        .iter()
        .map(|p| p.confidence_score)
        .sum::<f64>()
        / accepted.len() as f64
        * 10.0;

    // Per-paper N: the largest drug-arm N, not the sum — the same cohort
    // shows up once per endpoint.
    let patients = accepted.iter().filter_map(|p| p.drug_arm_n).max();

    let rates: Vec<f64> = accepted.iter().filter_map(|p| p.response_rate()).collect();
    let response_rate = if rates.is_empty() {
        None
    } else {
        Some(rates.iter().sum::<f64>() / rates.len() as f64)
    };

    Some(PaperEvidence {
        drug_key: drug_key.to_string(),
        disease: disease.to_string(),
        paper_id: paper_id.to_string(),
        score,
        patients,
        response_rate,
        evidence_level,
        efficacy_signal: derive_signal(&accepted),
    })
}

/// Paper-level signal from its points' statistics: significant and
/// non-significant endpoints together read as mixed.
fn derive_signal(points: &[&EfficacyDataPoint]) -> EfficacySignal {
    let significant = points.iter().any(|p| p.p_value.is_some_and(|p| p <= 0.05));
    let non_significant = points.iter().any(|p| p.p_value.is_some_and(|p| p > 0.05));
    let has_comparator = points.iter().any(|p| p.comparator_arm_result.is_some());
    let has_result = points.iter().any(|p| p.drug_arm_result.is_some());

    if significant && non_significant {
        EfficacySignal::Mixed
    } else if significant {
        EfficacySignal::Strong
    } else if non_significant {
        EfficacySignal::Weak
    } else if has_result && has_comparator {
        EfficacySignal::Moderate
    } else if has_result {
        EfficacySignal::Weak
    } else {
        EfficacySignal::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ReviewStatus, SourceKind};

    fn record(
        drug: &str,
        disease: &str,
        paper: &str,
        score: f64,
        patients: Option<u32>,
        response_rate: Option<f64>,
    ) -> PaperEvidence {
        PaperEvidence {
            drug_key: drug.to_string(),
            disease: disease.to_string(),
            paper_id: paper.to_string(),
            score,
            patients,
            response_rate,
            evidence_level: EvidenceLevel::Rct,
            efficacy_signal: EfficacySignal::Strong,
        }
    }

    #[test]
    fn n_weighted_aggregate_score() {
        let records = vec![
            record("belimumab", "SLE", "p1", 8.0, Some(100), None),
            record("belimumab", "SLE", "p2", 4.0, Some(10), None),
        ];
        let opps = aggregate_opportunities(&records, &AggregationPolicy::default());
        assert_eq!(opps.len(), 1);
        let expected = (8.0 * 100.0 + 4.0 * 10.0) / 110.0;
        assert!((opps[0].aggregate_score - expected).abs() < 1e-9);
        assert!((opps[0].aggregate_score - 7.636).abs() < 0.001);
        assert_eq!(opps[0].total_patients, 110);
        assert_eq!(opps[0].study_count, 2);
    }

    #[test]
    fn missing_n_weighs_one_and_counts_zero_patients() {
        let records = vec![
            record("d", "x", "p1", 9.0, None, None),
            record("d", "x", "p2", 3.0, None, None),
        ];
        let opps = aggregate_opportunities(&records, &AggregationPolicy::default());
        assert_eq!(opps[0].total_patients, 0);
        assert!((opps[0].aggregate_score - 6.0).abs() < 1e-9);
    }

    #[test]
    fn all_zero_weights_fall_back_to_default_score() {
        let records = vec![record("d", "x", "p1", 9.0, Some(0), None)];
        let opps = aggregate_opportunities(&records, &AggregationPolicy::default());
        assert_eq!(opps[0].aggregate_score, 5.0);
    }

    #[test]
    fn identical_rates_have_zero_cv_and_high_consistency() {
        let records = vec![
            record("d", "x", "p1", 8.0, Some(50), Some(50.0)),
            record("d", "x", "p2", 7.0, Some(60), Some(50.0)),
        ];
        let opps = aggregate_opportunities(&records, &AggregationPolicy::default());
        assert_eq!(opps[0].cv, Some(0.0));
        assert_eq!(opps[0].consistency, Consistency::High);
    }

    #[test]
    fn spread_rates_read_as_low_consistency() {
        let records = vec![
            record("d", "x", "p1", 8.0, Some(50), Some(10.0)),
            record("d", "x", "p2", 7.0, Some(60), Some(90.0)),
        ];
        let opps = aggregate_opportunities(&records, &AggregationPolicy::default());
        let cv = opps[0].cv.unwrap();
        assert!(cv > 50.0, "got {cv}");
        assert_eq!(opps[0].consistency, Consistency::Low);
    }

    #[test]
    fn single_rate_is_not_available() {
        let records = vec![
            record("d", "x", "p1", 8.0, Some(50), Some(42.0)),
            record("d", "x", "p2", 7.0, Some(60), None),
        ];
        let opps = aggregate_opportunities(&records, &AggregationPolicy::default());
        assert_eq!(opps[0].cv, None);
        assert_eq!(opps[0].consistency, Consistency::NotAvailable);
        assert_eq!(opps[0].avg_response_rate, Some(42.0));
    }

    #[test]
    fn best_paper_ties_keep_first_encountered() {
        let records = vec![
            record("d", "x", "first", 8.0, None, None),
            record("d", "x", "second", 8.0, None, None),
        ];
        let opps = aggregate_opportunities(&records, &AggregationPolicy::default());
        assert_eq!(opps[0].best_paper_id.as_deref(), Some("first"));
        assert_eq!(opps[0].best_paper_score, Some(8.0));
    }

    #[test]
    fn highest_evidence_level_wins() {
        let mut a = record("d", "x", "p1", 8.0, None, None);
        a.evidence_level = EvidenceLevel::CaseReport;
        let mut b = record("d", "x", "p2", 4.0, None, None);
        b.evidence_level = EvidenceLevel::Rct;
        let opps = aggregate_opportunities(&[a, b], &AggregationPolicy::default());
        assert_eq!(opps[0].evidence_level, EvidenceLevel::Rct);
    }

    #[test]
    fn signal_average_buckets() {
        let policy = AggregationPolicy::default();
        assert_eq!(bucket_signal(3.0, &policy), EfficacySignal::Strong);
        assert_eq!(bucket_signal(2.5, &policy), EfficacySignal::Strong);
        assert_eq!(bucket_signal(2.0, &policy), EfficacySignal::Moderate);
        assert_eq!(bucket_signal(1.0, &policy), EfficacySignal::Weak);
        assert_eq!(bucket_signal(0.2, &policy), EfficacySignal::None);
    }

    #[test]
    fn rerunning_aggregation_is_byte_identical() {
        let records = vec![
            record("belimumab", "SLE", "p1", 8.0, Some(100), Some(52.4)),
            record("belimumab", "SLE", "p2", 4.0, Some(10), Some(48.0)),
            record("belimumab", "Sjogren Syndrome", "p3", 6.0, Some(40), None),
            record("rituximab", "SLE", "p4", 5.5, None, Some(33.0)),
        ];
        let policy = AggregationPolicy::default();
        let first = aggregate_opportunities(&records, &policy);
        let second = aggregate_opportunities(&records, &policy);
        let a = serde_json::to_string(&first).unwrap();
        let b = serde_json::to_string(&second).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn ranks_are_dense_per_drug_by_score() {
        let records = vec![
            record("belimumab", "SLE", "p1", 9.0, Some(100), None),
            record("belimumab", "Sjogren Syndrome", "p2", 4.0, Some(100), None),
            record("belimumab", "Lupus Nephritis", "p3", 7.0, Some(100), None),
            record("rituximab", "SLE", "p4", 2.0, Some(100), None),
        ];
        let opps = aggregate_opportunities(&records, &AggregationPolicy::default());
        let rank_of = |disease: &str| {
            opps.iter()
                .find(|o| o.drug_key == "belimumab" && o.disease == disease)
                .unwrap()
                .rank
        };
        assert_eq!(rank_of("SLE"), 1);
        assert_eq!(rank_of("Lupus Nephritis"), 2);
        assert_eq!(rank_of("Sjogren Syndrome"), 3);
        // Other drug ranks independently.
        assert_eq!(
            opps.iter().find(|o| o.drug_key == "rituximab").unwrap().rank,
            1
        );
    }

    #[test]
    fn summarize_paper_excludes_rejected_points() {
        let mut accepted = EfficacyDataPoint::new(SourceKind::Publication, "u");
        accepted.paper_id = Some("p1".to_string());
        accepted.confidence_score = 0.9;
        accepted.drug_arm_result = Some(52.4);
        accepted.drug_arm_unit = Some("%".to_string());
        accepted.drug_arm_n = Some(290);
        accepted.p_value = Some(0.001);
        accepted.comparator_arm_result = Some(30.9);
        accepted.review_status = ReviewStatus::AutoAccepted;

        let mut rejected = accepted.clone();
        rejected.review_status = ReviewStatus::UserRejected;
        rejected.confidence_score = 0.1;

        let evidence = summarize_paper(
            "belimumab",
            "SLE",
            "p1",
            EvidenceLevel::Rct,
            &[accepted, rejected],
        )
        .unwrap();
        // Only the accepted point contributes.
        assert!((evidence.score - 9.0).abs() < 1e-9);
        assert_eq!(evidence.patients, Some(290));
        assert_eq!(evidence.response_rate, Some(52.4));
        assert_eq!(evidence.efficacy_signal, EfficacySignal::Strong);
    }

    #[test]
    fn summarize_paper_with_only_rejected_is_none() {
        let mut point = EfficacyDataPoint::new(SourceKind::Publication, "u");
        point.review_status = ReviewStatus::UserRejected;
        assert!(summarize_paper("d", "x", "p", EvidenceLevel::Unknown, &[point]).is_none());
    }

    #[test]
    fn mixed_significance_reads_as_mixed_signal() {
        let mut sig = EfficacyDataPoint::new(SourceKind::Publication, "u");
        sig.p_value = Some(0.01);
        sig.review_status = ReviewStatus::AutoAccepted;
        let mut nonsig = sig.clone();
        nonsig.p_value = Some(0.4);
        let evidence =
            summarize_paper("d", "x", "p", EvidenceLevel::Rct, &[sig, nonsig]).unwrap();
        assert_eq!(evidence.efficacy_signal, EfficacySignal::Mixed);
    }
}
