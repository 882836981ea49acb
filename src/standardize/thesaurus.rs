//! Thesaurus-service seam for the standardizer's third resolution step.

use crate::providers::ProviderError;

use super::similarity::similarity_ratio;

/// A concept returned by the external disease thesaurus.
#[derive(Debug, Clone)]
pub struct ThesaurusConcept {
    pub id: String,
    pub preferred_name: String,
    pub synonyms: Vec<String>,
}

pub trait Thesaurus: Send + Sync {
    fn lookup(&self, term: &str) -> Result<Option<ThesaurusConcept>, ProviderError>;
}

/// Confidence of a thesaurus hit: 1.0 for an exact string match, 0.9 for
/// substring containment in either direction, otherwise the best
/// sequence-similarity ratio against the preferred name and synonyms.
pub fn concept_confidence(term: &str, concept: &ThesaurusConcept) -> f64 {
    let term_lower = term.to_lowercase();
    let names = std::iter::once(concept.preferred_name.as_str())
        .chain(concept.synonyms.iter().map(String::as_str));

    let mut best: f64 = 0.0;
    for name in names {
        let name_lower = name.to_lowercase();
        let score = if name_lower == term_lower {
            1.0
        } else if name_lower.contains(&term_lower) || term_lower.contains(&name_lower) {
            0.9
        } else {
            similarity_ratio(&term_lower, &name_lower)
        };
        best = best.max(score);
        if best >= 1.0 {
            break;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn concept() -> ThesaurusConcept {
        ThesaurusConcept {
            id: "C3201".to_string(),
            preferred_name: "Systemic Lupus Erythematosus".to_string(),
            synonyms: vec!["Lupus Erythematosus, Systemic".to_string()],
        }
    }

    #[test]
    fn exact_match_is_full_confidence() {
        assert_eq!(concept_confidence("systemic lupus erythematosus", &concept()), 1.0);
    }

    #[test]
    fn substring_containment_scores_point_nine() {
        assert_eq!(concept_confidence("lupus erythematosus", &concept()), 0.9);
    }

    #[test]
    fn distant_term_falls_back_to_similarity() {
        let score = concept_confidence("heart failure", &concept());
        assert!(score < 0.8, "got {score}");
    }
}
