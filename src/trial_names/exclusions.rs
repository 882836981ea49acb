//! Curated exclusion sets for trial-name mining.
//!
//! Acronym-shaped tokens that are never trial names. Grouped by origin so
//! each list stays reviewable; membership is checked for the whole
//! candidate and for each of its hyphen/space-separated tokens.

/// Generic trial-report vocabulary.
pub const GENERIC_TRIAL_VOCABULARY: &[&str] = &[
    "PHASE", "TRIAL", "STUDY", "COHORT", "GROUP", "ARM", "ARMS", "PLACEBO", "BASELINE",
    "FOLLOW", "FOLLOWUP", "WEEK", "WEEKS", "MONTH", "MONTHS", "YEAR", "YEARS", "OPEN",
    "LABEL", "EXTENSION", "RANDOMIZED", "RANDOMISED", "DOUBLE", "BLIND", "BLINDED",
    "CONTROL", "CONTROLLED", "SCREENING", "ENDPOINT", "ENDPOINTS", "PRIMARY",
    "SECONDARY", "EXPLORATORY", "INTERIM", "PROTOCOL", "SUBGROUP", "ENROLLMENT",
    "DOSE", "DOSING", "TITRATION", "WASHOUT", "CROSSOVER", "PARALLEL",
];

/// Common clinical/medical abbreviations, including endpoint acronyms.
pub const MEDICAL_ABBREVIATIONS: &[&str] = &[
    "HIV", "AIDS", "DNA", "RNA", "MRNA", "SLE", "COPD", "CKD", "IBD", "CNS", "ECG",
    "EKG", "MRI", "PET", "BMI", "CRP", "ESR", "TNF", "IGG", "IGE", "ANA", "HDL",
    "LDL", "EGFR", "ALT", "AST", "ULN", "HBA1C", "ACR20", "ACR50", "ACR70", "SRI-4",
    "PASI75", "PASI90", "PASI100", "EASI-75", "DAS28", "NYHA", "ECOG", "GFR",
    "DMARD", "NSAID", "SSRI", "PPI",
];

/// Regulatory and agency acronyms.
pub const REGULATORY_ACRONYMS: &[&str] = &[
    "FDA", "EMA", "NIH", "WHO", "CDC", "NICE", "CHMP", "IRB", "ICH", "GCP", "GMP",
    "IND", "NDA", "BLA", "ANDA", "MHRA", "PMDA", "EUA", "REMS",
];

/// Journal names that surface as all-caps citations.
pub const JOURNAL_NAMES: &[&str] = &[
    "LANCET", "JAMA", "NEJM", "BMJ", "PLOS", "NATURE", "SCIENCE", "CELL", "CHEST",
    "BLOOD", "GUT", "BRAIN", "HEART", "THORAX", "RHEUMATOLOGY", "CIRCULATION",
];

/// Statistical shorthand.
pub const STATISTICAL_ABBREVIATIONS: &[&str] = &[
    "ANOVA", "ANCOVA", "SEM", "ITT", "LOCF", "MMRM", "AUC", "CMAX", "TMAX", "NNT",
    "NNH", "IQR", "ROC", "GEE", "LSM",
];

/// Adverse-event reporting shorthand.
pub const ADVERSE_EVENT_ABBREVIATIONS: &[&str] = &[
    "SAE", "TEAE", "ADR", "MEDDRA", "CTCAE", "SUSAR", "AESI", "DAIDS",
];

const ALL_SETS: &[&[&str]] = &[
    GENERIC_TRIAL_VOCABULARY,
    MEDICAL_ABBREVIATIONS,
    REGULATORY_ACRONYMS,
    JOURNAL_NAMES,
    STATISTICAL_ABBREVIATIONS,
    ADVERSE_EVENT_ABBREVIATIONS,
];

fn in_any_set(token: &str) -> bool {
    ALL_SETS.iter().any(|set| set.contains(&token))
}

/// True when the candidate (or any of its tokens) is a known non-name,
/// is shorter than 3 characters, or is purely numeric.
pub fn is_excluded(candidate: &str) -> bool {
    let upper = candidate.trim().to_uppercase();
    if upper.len() < 3 {
        return true;
    }
    if upper.chars().all(|c| c.is_ascii_digit()) {
        return true;
    }
    if in_any_set(upper.as_str()) {
        return true;
    }
    upper
        .split(|c: char| c == '-' || c.is_whitespace())
        .any(in_any_set)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_and_numeric_candidates_excluded() {
        assert!(is_excluded("AE"));
        assert!(is_excluded("52"));
        assert!(is_excluded("2024"));
    }

    #[test]
    fn vocabulary_hits_excluded_whole_and_by_token() {
        assert!(is_excluded("PLACEBO"));
        assert!(is_excluded("PHASE III"));
        assert!(is_excluded("LANCET"));
        assert!(is_excluded("SRI-4"));
    }

    #[test]
    fn real_trial_names_pass() {
        assert!(!is_excluded("BLISS-52"));
        assert!(!is_excluded("TULIP-2"));
        assert!(!is_excluded("AURORA"));
    }
}
