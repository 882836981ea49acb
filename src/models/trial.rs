use serde::{Deserialize, Serialize};

use super::enums::TrialProvenance;

/// A trial resolved for a drug + indication by the discovery service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredTrial {
    /// Trial acronym when known; display falls back to the registry ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nct_id: Option<String>,
    /// Registry brief title, when the trial came from the registry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    pub indication: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub provenance: TrialProvenance,
    /// Discovery confidence — registry entries 1.0, LLM web search lower.
    pub confidence: f64,
}

impl DiscoveredTrial {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.nct_id.as_deref())
            .unwrap_or("(unnamed)")
    }

    pub fn is_named(&self) -> bool {
        self.name.as_deref().is_some_and(|n| !n.is_empty())
    }

    /// Numeric phase for comparison ("Phase 3" → 3, "PHASE2|PHASE3" → 3).
    pub fn phase_rank(&self) -> u8 {
        let Some(phase) = self.phase.as_deref() else {
            return 0;
        };
        phase
            .chars()
            .filter_map(|c| c.to_digit(10))
            .map(|d| d as u8)
            .max()
            .unwrap_or(0)
    }
}

/// Full discovery outcome for one drug + indication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrugTrialInfo {
    pub drug_name: String,
    pub generic_name: String,
    pub indication: String,
    pub trials: Vec<DiscoveredTrial>,
}

impl DrugTrialInfo {
    pub fn named_trials(&self) -> impl Iterator<Item = &DiscoveredTrial> {
        self.trials.iter().filter(|t| t.is_named())
    }

    pub fn named_trial_count(&self) -> usize {
        self.named_trials().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trial(name: Option<&str>, nct: Option<&str>, phase: Option<&str>) -> DiscoveredTrial {
        DiscoveredTrial {
            name: name.map(String::from),
            nct_id: nct.map(String::from),
            title: None,
            phase: phase.map(String::from),
            indication: "SLE".to_string(),
            status: None,
            provenance: TrialProvenance::Registry,
            confidence: 1.0,
        }
    }

    #[test]
    fn display_name_falls_back_to_nct() {
        let t = trial(None, Some("NCT00410384"), None);
        assert_eq!(t.display_name(), "NCT00410384");
        assert!(!t.is_named());
    }

    #[test]
    fn phase_rank_parses_mixed_formats() {
        assert_eq!(trial(None, None, Some("Phase 3")).phase_rank(), 3);
        assert_eq!(trial(None, None, Some("PHASE2|PHASE3")).phase_rank(), 3);
        assert_eq!(trial(None, None, Some("N/A")).phase_rank(), 0);
        assert_eq!(trial(None, None, None).phase_rank(), 0);
    }

    #[test]
    fn named_trial_count_skips_unnamed() {
        let info = DrugTrialInfo {
            drug_name: "belimumab".to_string(),
            generic_name: "belimumab".to_string(),
            indication: "SLE".to_string(),
            trials: vec![
                trial(Some("BLISS-52"), Some("NCT00424476"), Some("Phase 3")),
                trial(None, Some("NCT00410384"), Some("Phase 3")),
            ],
        };
        assert_eq!(info.named_trial_count(), 1);
    }
}
