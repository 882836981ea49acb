//! Efficacy extraction: publication-based primary path and the
//! registry-metadata fallback, sharing the prompt/parse/strategy layers.

pub mod parse;
pub mod prompt;
pub mod publication;
pub mod registry;
pub mod strategy;

use crate::models::EvidenceLevel;
use crate::providers::Paper;

pub use parse::{parse_extraction_response, parse_loose_f64, parse_loose_u32};
pub use publication::PublicationExtractor;
pub use registry::RegistryExtractor;

/// Classify a paper's study-design rigor from its index type tags.
pub fn classify_evidence_level(paper: &Paper) -> EvidenceLevel {
    let tags: Vec<String> = paper
        .publication_types
        .iter()
        .map(|t| t.to_lowercase())
        .collect();
    let has = |needle: &str| tags.iter().any(|t| t.contains(needle));

    if has("meta-analysis") {
        EvidenceLevel::MetaAnalysis
    } else if has("systematic review") {
        EvidenceLevel::SystematicReview
    } else if has("randomized controlled trial") {
        EvidenceLevel::Rct
    } else if has("observational") || has("cohort") {
        EvidenceLevel::Cohort
    } else if has("case-control") {
        EvidenceLevel::CaseControl
    } else if has("case reports") || has("case report") {
        EvidenceLevel::CaseReport
    } else {
        EvidenceLevel::Unknown
    }
}
