//! Prompt construction for efficacy extraction.

use crate::models::{ApprovedDrug, DiseaseMatch};

pub const EXTRACTION_SYSTEM_PROMPT: &str =
    "You are a clinical evidence extraction engine. Output a strict JSON array and \
     nothing else. Extract only values stated explicitly in the text; use null for \
     anything not explicit. Never estimate or infer numbers.";

/// Content beyond this is cut before prompting; full-text papers can
/// exceed the model context otherwise.
const MAX_CONTENT_CHARS: usize = 12_000;

pub fn build_extraction_prompt(
    drug: &ApprovedDrug,
    disease: &DiseaseMatch,
    paper_title: &str,
    content: &str,
    expected_endpoints: &[String],
) -> String {
    let endpoints_hint = if expected_endpoints.is_empty() {
        String::new()
    } else {
        format!(
            "Endpoints of particular interest: {}.\n",
            expected_endpoints.join(", ")
        )
    };

    format!(
        "Extract efficacy results for {drug} in {disease} from the paper below.\n\
         {endpoints_hint}\
         Respond with a JSON array; one object per reported endpoint, with exactly \
         these keys (null when not explicitly stated):\n\
         endpoint_name, endpoint_type (primary|secondary|exploratory), trial_name, \
         phase, drug_arm_name, drug_arm_n, drug_arm_result, drug_arm_unit, \
         comparator_arm_name, comparator_arm_n, comparator_arm_result, p_value, \
         confidence_interval, timepoint, source_text (verbatim supporting sentence).\n\
         Return [] if the paper reports no explicit efficacy values.\n\n\
         Title: {title}\n\n{content}",
        drug = drug.generic_name,
        disease = disease.standard_name,
        endpoints_hint = endpoints_hint,
        title = paper_title,
        content = truncate_chars(content, MAX_CONTENT_CHARS),
    )
}

fn truncate_chars(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_names_drug_and_disease() {
        let drug = ApprovedDrug::from_generic("belimumab");
        let disease = DiseaseMatch {
            raw_name: "SLE".to_string(),
            standard_name: "Systemic Lupus Erythematosus".to_string(),
            thesaurus_id: None,
            therapeutic_area: None,
            match_type: crate::models::MatchType::Predefined,
            confidence: 1.0,
            synonyms: vec![],
        };
        let prompt = build_extraction_prompt(&drug, &disease, "A trial", "body", &[]);
        assert!(prompt.contains("belimumab"));
        assert!(prompt.contains("Systemic Lupus Erythematosus"));
        assert!(prompt.contains("endpoint_name"));
        assert!(!prompt.contains("particular interest"));
    }

    #[test]
    fn expected_endpoints_listed_when_given() {
        let drug = ApprovedDrug::from_generic("belimumab");
        let disease = DiseaseMatch::unmatched("SLE");
        let prompt = build_extraction_prompt(
            &drug,
            &disease,
            "t",
            "c",
            &["SRI-4".to_string(), "BICLA".to_string()],
        );
        assert!(prompt.contains("SRI-4, BICLA"));
    }

    #[test]
    fn long_content_truncated_at_char_boundary() {
        let content = "é".repeat(20_000);
        let truncated = truncate_chars(&content, MAX_CONTENT_CHARS);
        assert!(truncated.len() <= MAX_CONTENT_CHARS);
        assert!(content.starts_with(truncated));
    }
}
