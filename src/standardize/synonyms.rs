//! Curated condition vocabulary: canonical names, common synonyms and
//! abbreviations, and the therapeutic area each condition belongs to.
//!
//! First and last resort of the standardizer — exact hits terminate
//! resolution at confidence 1.0, and the same table backs the fuzzy pass.

pub struct CuratedEntry {
    pub standard_name: &'static str,
    pub synonyms: &'static [&'static str],
    pub therapeutic_area: &'static str,
}

pub const CURATED_CONDITIONS: &[CuratedEntry] = &[
    CuratedEntry {
        standard_name: "Systemic Lupus Erythematosus",
        synonyms: &["sle", "lupus", "systemic lupus"],
        therapeutic_area: "Rheumatology",
    },
    CuratedEntry {
        standard_name: "Lupus Nephritis",
        synonyms: &["ln", "lupus kidney disease"],
        therapeutic_area: "Rheumatology",
    },
    CuratedEntry {
        standard_name: "Rheumatoid Arthritis",
        synonyms: &["ra", "rheumatoid disease"],
        therapeutic_area: "Rheumatology",
    },
    CuratedEntry {
        standard_name: "Psoriatic Arthritis",
        synonyms: &["psa"],
        therapeutic_area: "Rheumatology",
    },
    CuratedEntry {
        standard_name: "Ankylosing Spondylitis",
        synonyms: &["as", "axial spondyloarthritis"],
        therapeutic_area: "Rheumatology",
    },
    CuratedEntry {
        standard_name: "Sjogren Syndrome",
        synonyms: &["sjogren's syndrome", "sjogrens", "sicca syndrome"],
        therapeutic_area: "Rheumatology",
    },
    CuratedEntry {
        standard_name: "Psoriasis",
        synonyms: &["plaque psoriasis", "chronic plaque psoriasis"],
        therapeutic_area: "Dermatology",
    },
    CuratedEntry {
        standard_name: "Atopic Dermatitis",
        synonyms: &["ad", "eczema", "atopic eczema"],
        therapeutic_area: "Dermatology",
    },
    CuratedEntry {
        standard_name: "Multiple Sclerosis",
        synonyms: &["ms", "relapsing remitting multiple sclerosis", "rrms"],
        therapeutic_area: "Neurology",
    },
    CuratedEntry {
        standard_name: "Amyotrophic Lateral Sclerosis",
        synonyms: &["als", "lou gehrig's disease", "motor neuron disease"],
        therapeutic_area: "Neurology",
    },
    CuratedEntry {
        standard_name: "Parkinson Disease",
        synonyms: &["pd", "parkinson's disease", "parkinsons"],
        therapeutic_area: "Neurology",
    },
    CuratedEntry {
        standard_name: "Alzheimer Disease",
        synonyms: &["alzheimer's disease", "alzheimers", "early alzheimer's"],
        therapeutic_area: "Neurology",
    },
    CuratedEntry {
        standard_name: "Epilepsy",
        synonyms: &["seizure disorder", "focal epilepsy"],
        therapeutic_area: "Neurology",
    },
    CuratedEntry {
        standard_name: "Migraine",
        synonyms: &["chronic migraine", "episodic migraine"],
        therapeutic_area: "Neurology",
    },
    CuratedEntry {
        standard_name: "Type 2 Diabetes Mellitus",
        synonyms: &["t2d", "t2dm", "type 2 diabetes", "adult onset diabetes"],
        therapeutic_area: "Endocrinology",
    },
    CuratedEntry {
        standard_name: "Type 1 Diabetes Mellitus",
        synonyms: &["t1d", "t1dm", "type 1 diabetes", "juvenile diabetes"],
        therapeutic_area: "Endocrinology",
    },
    CuratedEntry {
        standard_name: "Obesity",
        synonyms: &["morbid obesity", "weight management"],
        therapeutic_area: "Endocrinology",
    },
    CuratedEntry {
        standard_name: "Osteoporosis",
        synonyms: &["postmenopausal osteoporosis"],
        therapeutic_area: "Endocrinology",
    },
    CuratedEntry {
        standard_name: "Heart Failure",
        synonyms: &["chf", "congestive heart failure", "hfref", "hfpef"],
        therapeutic_area: "Cardiology",
    },
    CuratedEntry {
        standard_name: "Atrial Fibrillation",
        synonyms: &["afib", "af"],
        therapeutic_area: "Cardiology",
    },
    CuratedEntry {
        standard_name: "Hypertension",
        synonyms: &["htn", "high blood pressure", "essential hypertension"],
        therapeutic_area: "Cardiology",
    },
    CuratedEntry {
        standard_name: "Chronic Obstructive Pulmonary Disease",
        synonyms: &["copd", "emphysema", "chronic bronchitis"],
        therapeutic_area: "Respiratory",
    },
    CuratedEntry {
        standard_name: "Asthma",
        synonyms: &["severe asthma", "eosinophilic asthma"],
        therapeutic_area: "Respiratory",
    },
    CuratedEntry {
        standard_name: "Idiopathic Pulmonary Fibrosis",
        synonyms: &["ipf"],
        therapeutic_area: "Respiratory",
    },
    CuratedEntry {
        standard_name: "Crohn Disease",
        synonyms: &["crohn's disease", "crohns", "regional enteritis"],
        therapeutic_area: "Gastroenterology",
    },
    CuratedEntry {
        standard_name: "Ulcerative Colitis",
        synonyms: &["uc"],
        therapeutic_area: "Gastroenterology",
    },
    CuratedEntry {
        standard_name: "Irritable Bowel Syndrome",
        synonyms: &["ibs"],
        therapeutic_area: "Gastroenterology",
    },
    CuratedEntry {
        standard_name: "Chronic Kidney Disease",
        synonyms: &["ckd", "chronic renal failure", "chronic renal insufficiency"],
        therapeutic_area: "Nephrology",
    },
    CuratedEntry {
        standard_name: "Non-Small Cell Lung Cancer",
        synonyms: &["nsclc", "non small cell lung cancer", "lung adenocarcinoma"],
        therapeutic_area: "Oncology",
    },
    CuratedEntry {
        standard_name: "Breast Cancer",
        synonyms: &["her2 positive breast cancer", "triple negative breast cancer", "tnbc"],
        therapeutic_area: "Oncology",
    },
    CuratedEntry {
        standard_name: "Prostate Cancer",
        synonyms: &["metastatic castration resistant prostate cancer", "mcrpc"],
        therapeutic_area: "Oncology",
    },
    CuratedEntry {
        standard_name: "Melanoma",
        synonyms: &["malignant melanoma", "metastatic melanoma"],
        therapeutic_area: "Oncology",
    },
    CuratedEntry {
        standard_name: "Multiple Myeloma",
        synonyms: &["mm", "relapsed refractory multiple myeloma", "rrmm"],
        therapeutic_area: "Hematology",
    },
    CuratedEntry {
        standard_name: "Chronic Lymphocytic Leukemia",
        synonyms: &["cll"],
        therapeutic_area: "Hematology",
    },
    CuratedEntry {
        standard_name: "Acute Myeloid Leukemia",
        synonyms: &["aml"],
        therapeutic_area: "Hematology",
    },
    CuratedEntry {
        standard_name: "Sickle Cell Disease",
        synonyms: &["scd", "sickle cell anemia"],
        therapeutic_area: "Hematology",
    },
    CuratedEntry {
        standard_name: "Hepatitis B",
        synonyms: &["hbv", "chronic hepatitis b"],
        therapeutic_area: "Infectious Disease",
    },
    CuratedEntry {
        standard_name: "Hepatitis C",
        synonyms: &["hcv", "chronic hepatitis c"],
        therapeutic_area: "Infectious Disease",
    },
    CuratedEntry {
        standard_name: "Human Immunodeficiency Virus Infection",
        synonyms: &["hiv", "hiv infection", "hiv-1 infection"],
        therapeutic_area: "Infectious Disease",
    },
    CuratedEntry {
        standard_name: "Major Depressive Disorder",
        synonyms: &["mdd", "depression", "clinical depression"],
        therapeutic_area: "Psychiatry",
    },
    CuratedEntry {
        standard_name: "Schizophrenia",
        synonyms: &["schizoaffective disorder"],
        therapeutic_area: "Psychiatry",
    },
];

/// Collapse case and whitespace so lookups are layout-insensitive.
pub fn normalize(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Case-insensitive exact lookup against canonical names and synonyms.
pub fn find_exact(normalized: &str) -> Option<&'static CuratedEntry> {
    CURATED_CONDITIONS.iter().find(|entry| {
        entry.standard_name.to_lowercase() == normalized
            || entry.synonyms.iter().any(|s| *s == normalized)
    })
}

pub fn therapeutic_area_for(standard_name: &str) -> Option<&'static str> {
    let lower = standard_name.to_lowercase();
    CURATED_CONDITIONS
        .iter()
        .find(|entry| entry.standard_name.to_lowercase() == lower)
        .map(|entry| entry.therapeutic_area)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sle_and_lupus_share_a_canonical_name() {
        let a = find_exact("sle").unwrap();
        let b = find_exact("lupus").unwrap();
        assert_eq!(a.standard_name, b.standard_name);
        assert_eq!(a.standard_name, "Systemic Lupus Erythematosus");
    }

    #[test]
    fn canonical_names_resolve_to_themselves() {
        let entry = find_exact("systemic lupus erythematosus").unwrap();
        assert_eq!(entry.standard_name, "Systemic Lupus Erythematosus");
    }

    #[test]
    fn normalize_collapses_whitespace_and_case() {
        assert_eq!(normalize("  Systemic   LUPUS  erythematosus "), "systemic lupus erythematosus");
    }

    #[test]
    fn therapeutic_area_lookup() {
        assert_eq!(therapeutic_area_for("Systemic Lupus Erythematosus"), Some("Rheumatology"));
        assert_eq!(therapeutic_area_for("Melanoma"), Some("Oncology"));
        assert_eq!(therapeutic_area_for("Unknown Thing"), None);
    }

    #[test]
    fn synonyms_are_stored_normalized() {
        for entry in CURATED_CONDITIONS {
            for synonym in entry.synonyms {
                assert_eq!(*synonym, normalize(synonym), "synonym not normalized: {synonym}");
            }
        }
    }
}
