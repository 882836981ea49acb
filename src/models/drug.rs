use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An approved drug from the external registry. Read-only within the
/// pipeline — indication data is never mutated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovedDrug {
    pub id: String,
    /// Stable lookup key, lowercase generic name by convention.
    pub drug_key: String,
    pub generic_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indication_detail: Option<String>,
}

impl ApprovedDrug {
    /// Minimal constructor for the common case of a generic-only record.
    pub fn from_generic(generic_name: &str) -> Self {
        Self {
            id: generic_name.to_lowercase(),
            drug_key: generic_name.to_lowercase(),
            generic_name: generic_name.to_string(),
            brand_name: None,
            manufacturer: None,
            approval_date: None,
            indication_detail: None,
        }
    }

    /// Brand name when known, otherwise the generic.
    pub fn display_name(&self) -> &str {
        self.brand_name.as_deref().unwrap_or(&self.generic_name)
    }

    /// True when `name` refers to this drug by brand or generic name.
    pub fn matches_name(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        if self.generic_name.to_lowercase() == lower || self.drug_key == lower {
            return true;
        }
        self.brand_name
            .as_deref()
            .is_some_and(|b| b.to_lowercase() == lower)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_prefers_brand() {
        let mut drug = ApprovedDrug::from_generic("belimumab");
        assert_eq!(drug.display_name(), "belimumab");
        drug.brand_name = Some("Benlysta".to_string());
        assert_eq!(drug.display_name(), "Benlysta");
    }

    #[test]
    fn matches_name_is_case_insensitive() {
        let mut drug = ApprovedDrug::from_generic("Belimumab");
        drug.brand_name = Some("Benlysta".to_string());
        assert!(drug.matches_name("BELIMUMAB"));
        assert!(drug.matches_name("benlysta"));
        assert!(!drug.matches_name("rituximab"));
    }
}
