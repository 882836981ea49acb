//! Trial-name ownership: which drug program a name prefix belongs to.
//!
//! Guards the LLM lookup path against cross-drug name collisions — a name
//! known to belong to drug A is silently rejected for drug B. The table is
//! data, not logic: it can be extended at runtime or loaded from JSON, and
//! it is a known source of false negatives for trials launched after the
//! table was last curated.

use serde::{Deserialize, Serialize};

use crate::models::ApprovedDrug;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnershipEntry {
    /// Upper-cased trial-name prefix ("BLISS").
    pub prefix: String,
    /// Lower-cased generic name of the owning drug.
    pub drug: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrialOwnershipTable {
    entries: Vec<OwnershipEntry>,
}

impl TrialOwnershipTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The curated table shipped with the crate.
    pub fn with_defaults() -> Self {
        let defaults = [
            ("BLISS", "belimumab"),
            ("TULIP", "anifrolumab"),
            ("AURORA", "voclosporin"),
            ("EMBRACE", "belimumab"),
            ("ORAL", "tofacitinib"),
            ("SELECT", "upadacitinib"),
            ("SOLO", "dupilumab"),
            ("CHRONOS", "dupilumab"),
            ("CHECKMATE", "nivolumab"),
            ("KEYNOTE", "pembrolizumab"),
            ("IMPOWER", "atezolizumab"),
            ("MURANO", "venetoclax"),
            ("RESONATE", "ibrutinib"),
            ("EMPEROR", "empagliflozin"),
            ("DAPA", "dapagliflozin"),
            ("DELIVER", "dapagliflozin"),
            ("SUSTAIN", "semaglutide"),
            ("STEP", "semaglutide"),
            ("SURPASS", "tirzepatide"),
            ("OPTIMUM", "ozanimod"),
        ];
        Self {
            entries: defaults
                .into_iter()
                .map(|(prefix, drug)| OwnershipEntry {
                    prefix: prefix.to_string(),
                    drug: drug.to_string(),
                })
                .collect(),
        }
    }

    pub fn add(&mut self, prefix: &str, drug: &str) {
        self.entries.push(OwnershipEntry {
            prefix: prefix.to_uppercase(),
            drug: drug.to_lowercase(),
        });
    }

    pub fn load_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The owning drug for a trial name, by longest matching prefix.
    pub fn owner_of(&self, trial_name: &str) -> Option<&str> {
        let upper = trial_name.trim().to_uppercase();
        self.entries
            .iter()
            .filter(|entry| upper.starts_with(&entry.prefix))
            .max_by_key(|entry| entry.prefix.len())
            .map(|entry| entry.drug.as_str())
    }

    /// A name is valid for a drug unless it is known to belong to a
    /// different one. Unknown names pass — the table only rejects.
    pub fn validate(&self, trial_name: &str, drug: &ApprovedDrug) -> bool {
        match self.owner_of(trial_name) {
            Some(owner) => drug.matches_name(owner),
            None => true,
        }
    }
}
