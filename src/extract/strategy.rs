//! Ordered paper-search strategies.
//!
//! Ordering is load-bearing: primary results papers frequently omit the
//! trial nickname from their title and abstract and are only findable by
//! registry ID, so the ID query always runs first. Each strategy either
//! yields papers or passes to the next — no nesting.

use crate::models::DiscoveredTrial;

#[derive(Debug, Clone, PartialEq)]
pub enum PaperSearchStrategy {
    /// The registry ID itself; indexes tag papers with their NCT number.
    RegistryId { nct_id: String },
    NameAndDrug { name: String, drug: String },
    NameAndEfficacy { name: String },
    /// Direct fallback when no named trials exist.
    DrugDiseasePhase { drug: String, disease: String },
    DrugDiseaseTrialType { drug: String, disease: String },
}

impl PaperSearchStrategy {
    pub fn query(&self) -> String {
        match self {
            Self::RegistryId { nct_id } => nct_id.clone(),
            Self::NameAndDrug { name, drug } => format!("\"{name}\" AND {drug}"),
            Self::NameAndEfficacy { name } => {
                format!("\"{name}\" AND (efficacy OR outcomes)")
            }
            Self::DrugDiseasePhase { drug, disease } => {
                format!("{drug} AND \"{disease}\" AND (phase 2 OR phase 3) AND efficacy")
            }
            Self::DrugDiseaseTrialType { drug, disease } => {
                format!("{drug} AND \"{disease}\" AND randomized controlled trial")
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::RegistryId { .. } => "registry_id",
            Self::NameAndDrug { .. } => "name_and_drug",
            Self::NameAndEfficacy { .. } => "name_and_efficacy",
            Self::DrugDiseasePhase { .. } => "drug_disease_phase",
            Self::DrugDiseaseTrialType { .. } => "drug_disease_trial_type",
        }
    }
}

/// The chain for one named trial, in mandatory order.
pub fn trial_strategies(trial: &DiscoveredTrial, drug: &str) -> Vec<PaperSearchStrategy> {
    let mut strategies = Vec::new();
    if let Some(nct_id) = &trial.nct_id {
        strategies.push(PaperSearchStrategy::RegistryId {
            nct_id: nct_id.clone(),
        });
    }
    if let Some(name) = &trial.name {
        strategies.push(PaperSearchStrategy::NameAndDrug {
            name: name.clone(),
            drug: drug.to_string(),
        });
        strategies.push(PaperSearchStrategy::NameAndEfficacy { name: name.clone() });
    }
    strategies
}

/// The chain when discovery produced no named trials.
pub fn fallback_strategies(drug: &str, disease: &str) -> Vec<PaperSearchStrategy> {
    vec![
        PaperSearchStrategy::DrugDiseasePhase {
            drug: drug.to_string(),
            disease: disease.to_string(),
        },
        PaperSearchStrategy::DrugDiseaseTrialType {
            drug: drug.to_string(),
            disease: disease.to_string(),
        },
    ]
}
