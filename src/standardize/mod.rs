//! Condition standardization: free-text disease names to a canonical
//! vocabulary.
//!
//! Resolution order, first hit wins: curated synonym table → persisted
//! mapping store → thesaurus service (accepted at ≥ threshold) → fuzzy
//! match against the curated table. A non-empty input always yields a
//! record; the unmatched case carries confidence 0 and echoes the input.
//!
//! The cache is owned by the instance and lives for the process — a given
//! string is assumed to standardize identically for the whole run.

pub mod similarity;
pub mod synonyms;
pub mod thesaurus;

use std::collections::HashMap;
use std::sync::Mutex;

use crate::models::{DiseaseMatch, MatchType};

pub use similarity::similarity_ratio;
pub use thesaurus::{concept_confidence, Thesaurus, ThesaurusConcept};

/// A persisted input→standard mapping from an earlier run or manual
/// curation. Lookup failures inside implementations are logged and
/// surfaced as `None`.
#[derive(Debug, Clone)]
pub struct StoredMapping {
    pub standard_name: String,
    pub thesaurus_id: Option<String>,
    pub confidence: f64,
}

pub trait ConditionMappingStore: Send + Sync {
    fn get(&self, normalized: &str) -> Option<StoredMapping>;
}

pub struct ConditionStandardizer {
    cache: Mutex<HashMap<String, DiseaseMatch>>,
    mapping_store: Option<Box<dyn ConditionMappingStore>>,
    thesaurus: Option<Box<dyn Thesaurus>>,
    /// Thesaurus and fuzzy hits below this are rejected.
    accept_threshold: f64,
}

impl Default for ConditionStandardizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ConditionStandardizer {
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
            mapping_store: None,
            thesaurus: None,
            accept_threshold: 0.8,
        }
    }

    pub fn with_mapping_store(mut self, store: Box<dyn ConditionMappingStore>) -> Self {
        self.mapping_store = Some(store);
        self
    }

    pub fn with_thesaurus(mut self, thesaurus: Box<dyn Thesaurus>) -> Self {
        self.thesaurus = Some(thesaurus);
        self
    }

    pub fn standardize(&self, raw_name: &str) -> DiseaseMatch {
        let normalized = synonyms::normalize(raw_name);
        if normalized.is_empty() {
            return DiseaseMatch::unmatched(raw_name);
        }

        if let Some(hit) = self.cache.lock().unwrap().get(&normalized) {
            return hit.clone();
        }

        let resolved = self.resolve(raw_name, &normalized);
        self.cache
            .lock()
            .unwrap()
            .insert(normalized, resolved.clone());
        resolved
    }

    fn resolve(&self, raw_name: &str, normalized: &str) -> DiseaseMatch {
        // 1. Curated synonym table — terminal at confidence 1.0.
        if let Some(entry) = synonyms::find_exact(normalized) {
            return DiseaseMatch {
                raw_name: raw_name.to_string(),
                standard_name: entry.standard_name.to_string(),
                thesaurus_id: None,
                therapeutic_area: Some(entry.therapeutic_area.to_string()),
                match_type: MatchType::Predefined,
                confidence: 1.0,
                synonyms: entry.synonyms.iter().map(|s| s.to_string()).collect(),
            };
        }

        // 2. Persisted mapping store.
        if let Some(store) = &self.mapping_store {
            if let Some(mapping) = store.get(normalized) {
                let area = synonyms::therapeutic_area_for(&mapping.standard_name)
                    .map(String::from);
                return DiseaseMatch {
                    raw_name: raw_name.to_string(),
                    standard_name: mapping.standard_name,
                    thesaurus_id: mapping.thesaurus_id,
                    therapeutic_area: area,
                    match_type: MatchType::Database,
                    confidence: mapping.confidence,
                    synonyms: Vec::new(),
                };
            }
        }

        // 3. Thesaurus service, accepted only above the threshold.
        if let Some(thesaurus) = &self.thesaurus {
            match thesaurus.lookup(normalized) {
                Ok(Some(concept)) => {
                    let confidence = concept_confidence(normalized, &concept);
                    if confidence >= self.accept_threshold {
                        let area = synonyms::therapeutic_area_for(&concept.preferred_name)
                            .map(String::from);
                        return DiseaseMatch {
                            raw_name: raw_name.to_string(),
                            standard_name: concept.preferred_name.clone(),
                            thesaurus_id: Some(concept.id.clone()),
                            therapeutic_area: area,
                            match_type: MatchType::Thesaurus,
                            confidence,
                            synonyms: concept.synonyms,
                        };
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(term = normalized, error = %e, "Thesaurus lookup failed, continuing");
                }
            }
        }

        // 4. Fuzzy match against the curated table.
        let mut best: Option<(&'static synonyms::CuratedEntry, f64)> = None;
        for entry in synonyms::CURATED_CONDITIONS {
            let mut score = similarity_ratio(normalized, entry.standard_name);
            for synonym in entry.synonyms {
                score = score.max(similarity_ratio(normalized, synonym));
            }
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((entry, score));
            }
        }
        if let Some((entry, score)) = best {
            if score >= self.accept_threshold {
                return DiseaseMatch {
                    raw_name: raw_name.to_string(),
                    standard_name: entry.standard_name.to_string(),
                    thesaurus_id: None,
                    therapeutic_area: Some(entry.therapeutic_area.to_string()),
                    match_type: MatchType::Fuzzy,
                    confidence: score,
                    synonyms: entry.synonyms.iter().map(|s| s.to_string()).collect(),
                };
            }
        }

        DiseaseMatch::unmatched(raw_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn sle_and_lupus_resolve_identically() {
        let standardizer = ConditionStandardizer::new();
        let a = standardizer.standardize("SLE");
        let b = standardizer.standardize("lupus");
        assert_eq!(a.standard_name, "Systemic Lupus Erythematosus");
        assert_eq!(a.standard_name, b.standard_name);
        assert_eq!(a.match_type, MatchType::Predefined);
        assert_eq!(a.confidence, 1.0);
        assert_eq!(a.therapeutic_area.as_deref(), Some("Rheumatology"));
    }

    #[test]
    fn repeated_calls_are_deterministic() {
        let standardizer = ConditionStandardizer::new();
        let first = standardizer.standardize("COPD");
        let second = standardizer.standardize("COPD");
        assert_eq!(first, second);
    }

    #[test]
    fn unmatched_input_echoes_with_zero_confidence() {
        let standardizer = ConditionStandardizer::new();
        let m = standardizer.standardize("florbiditis maximalis");
        assert_eq!(m.standard_name, "florbiditis maximalis");
        assert_eq!(m.match_type, MatchType::Unmatched);
        assert_eq!(m.confidence, 0.0);
    }

    #[test]
    fn fuzzy_match_catches_misspellings() {
        let standardizer = ConditionStandardizer::new();
        let m = standardizer.standardize("systemic lupus erythematosis");
        assert_eq!(m.standard_name, "Systemic Lupus Erythematosus");
        assert_eq!(m.match_type, MatchType::Fuzzy);
        assert!(m.confidence >= 0.8);
    }

    struct CountingStore {
        calls: Arc<AtomicU32>,
    }

    impl ConditionMappingStore for CountingStore {
        fn get(&self, normalized: &str) -> Option<StoredMapping> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (normalized == "devic disease").then(|| StoredMapping {
                standard_name: "Neuromyelitis Optica".to_string(),
                thesaurus_id: Some("C0270612".to_string()),
                confidence: 0.95,
            })
        }
    }

    #[test]
    fn mapping_store_consulted_once_per_input() {
        let calls = Arc::new(AtomicU32::new(0));
        let standardizer = ConditionStandardizer::new()
            .with_mapping_store(Box::new(CountingStore { calls: calls.clone() }));

        let first = standardizer.standardize("Devic disease");
        let second = standardizer.standardize("devic   DISEASE");
        assert_eq!(first.standard_name, "Neuromyelitis Optica");
        assert_eq!(first.match_type, MatchType::Database);
        assert_eq!(second.standard_name, first.standard_name);
        // Second call normalizes to the same key and must hit the cache.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    struct FixedThesaurus {
        concept: ThesaurusConcept,
    }

    impl Thesaurus for FixedThesaurus {
        fn lookup(&self, _term: &str) -> Result<Option<ThesaurusConcept>, crate::providers::ProviderError> {
            Ok(Some(self.concept.clone()))
        }
    }

    #[test]
    fn thesaurus_hit_below_threshold_is_rejected() {
        let standardizer = ConditionStandardizer::new().with_thesaurus(Box::new(FixedThesaurus {
            concept: ThesaurusConcept {
                id: "C000".to_string(),
                preferred_name: "Completely Different Disorder".to_string(),
                synonyms: vec![],
            },
        }));
        let m = standardizer.standardize("zygomatic flutter");
        assert_ne!(m.match_type, MatchType::Thesaurus);
    }

    #[test]
    fn thesaurus_substring_hit_accepted() {
        let standardizer = ConditionStandardizer::new().with_thesaurus(Box::new(FixedThesaurus {
            concept: ThesaurusConcept {
                id: "C0027962".to_string(),
                preferred_name: "Neuromyelitis Optica Spectrum Disorder".to_string(),
                synonyms: vec![],
            },
        }));
        let m = standardizer.standardize("neuromyelitis optica");
        assert_eq!(m.match_type, MatchType::Thesaurus);
        assert_eq!(m.confidence, 0.9);
        assert_eq!(m.thesaurus_id.as_deref(), Some("C0027962"));
    }
}
