//! Publication-based efficacy extraction.
//!
//! Discovery-first: named trials drive the paper search through the
//! ordered strategy chain; without named trials the direct fallback chain
//! runs. Full text is preferred over the abstract when fetchable. One LLM
//! call per paper; anything unparseable costs that paper only.

use std::collections::HashSet;
use std::sync::Arc;

use crate::config::BenchmarkConfig;
use crate::llm::TextGenerator;
use crate::models::{
    ApprovedDrug, DiscoveredTrial, DiseaseMatch, DrugTrialInfo, EfficacyDataPoint, SourceKind,
};
use crate::providers::{Paper, PaperIndex};
use crate::trial_names::TrialNameExtractor;

use super::parse::{parse_extraction_response, RawExtractedEndpoint};
use super::prompt::{build_extraction_prompt, EXTRACTION_SYSTEM_PROMPT};
use super::strategy::{fallback_strategies, trial_strategies, PaperSearchStrategy};

pub struct PublicationExtractor {
    papers: Arc<dyn PaperIndex>,
    llm: Arc<dyn TextGenerator>,
    name_extractor: TrialNameExtractor,
    config: BenchmarkConfig,
}

impl PublicationExtractor {
    pub fn new(
        papers: Arc<dyn PaperIndex>,
        llm: Arc<dyn TextGenerator>,
        config: BenchmarkConfig,
    ) -> Self {
        Self {
            papers,
            llm,
            name_extractor: TrialNameExtractor::new(),
            config,
        }
    }

    pub fn extract(
        &self,
        drug: &ApprovedDrug,
        disease: &DiseaseMatch,
        trial_info: &DrugTrialInfo,
        expected_endpoints: &[String],
    ) -> Vec<EfficacyDataPoint> {
        let candidates = self.gather_papers(drug, disease, trial_info);
        let mut points = Vec::new();
        for (paper, trial) in &candidates {
            points.extend(self.extract_from_paper(
                drug,
                disease,
                paper,
                trial.as_ref(),
                expected_endpoints,
            ));
        }
        points
    }

    /// Collect candidate papers, deduped by PMID and bounded by config.
    fn gather_papers(
        &self,
        drug: &ApprovedDrug,
        disease: &DiseaseMatch,
        trial_info: &DrugTrialInfo,
    ) -> Vec<(Paper, Option<DiscoveredTrial>)> {
        let max_total = self.config.max_papers_per_drug as usize;
        let mut seen: HashSet<String> = HashSet::new();
        let mut out: Vec<(Paper, Option<DiscoveredTrial>)> = Vec::new();

        if trial_info.named_trial_count() > 0 {
            for trial in trial_info.named_trials() {
                if out.len() >= max_total {
                    break;
                }
                let found = self.run_chain(&trial_strategies(trial, &trial_info.generic_name));
                for paper in found
                    .into_iter()
                    .take(self.config.max_papers_per_trial as usize)
                {
                    if out.len() >= max_total {
                        break;
                    }
                    if seen.insert(paper.pmid.clone()) {
                        out.push((paper, Some(trial.clone())));
                    }
                }
            }
        } else {
            let found = self.run_chain(&fallback_strategies(
                &drug.generic_name,
                &disease.standard_name,
            ));
            for paper in found.into_iter().take(max_total) {
                if seen.insert(paper.pmid.clone()) {
                    out.push((paper, None));
                }
            }
        }
        out
    }

    /// Try strategies in order; the first yielding papers wins.
    fn run_chain(&self, strategies: &[PaperSearchStrategy]) -> Vec<Paper> {
        for strategy in strategies {
            match self
                .papers
                .search(&strategy.query(), self.config.max_search_results)
            {
                Ok(papers) if !papers.is_empty() => {
                    tracing::debug!(
                        strategy = strategy.label(),
                        count = papers.len(),
                        "Paper search strategy yielded results"
                    );
                    return papers;
                }
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!(strategy = strategy.label(), error = %e, "Paper search failed, trying next strategy");
                    continue;
                }
            }
        }
        Vec::new()
    }

    fn extract_from_paper(
        &self,
        drug: &ApprovedDrug,
        disease: &DiseaseMatch,
        paper: &Paper,
        trial: Option<&DiscoveredTrial>,
        expected_endpoints: &[String],
    ) -> Vec<EfficacyDataPoint> {
        let content = match self.papers.fetch_full_text(&paper.pmid) {
            Ok(Some(full_text)) => full_text.combined_text(),
            Ok(None) => paper.abstract_text.clone().unwrap_or_default(),
            Err(e) => {
                tracing::warn!(pmid = %paper.pmid, error = %e, "Full-text fetch failed, using abstract");
                paper.abstract_text.clone().unwrap_or_default()
            }
        };
        if content.trim().is_empty() {
            tracing::debug!(pmid = %paper.pmid, "No readable content, skipping paper");
            return Vec::new();
        }

        let prompt =
            build_extraction_prompt(drug, disease, &paper.title, &content, expected_endpoints);
        let response = match self.llm.generate(&prompt, Some(EXTRACTION_SYSTEM_PROMPT)) {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(pmid = %paper.pmid, error = %e, "Extraction call failed, skipping paper");
                return Vec::new();
            }
        };

        let raw_endpoints = match parse_extraction_response(&response) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(pmid = %paper.pmid, error = %e, "Unrecoverable extraction response, zero points for paper");
                return Vec::new();
            }
        };

        raw_endpoints
            .into_iter()
            .map(|raw| self.to_point(paper, trial, raw))
            .collect()
    }

    fn to_point(
        &self,
        paper: &Paper,
        trial: Option<&DiscoveredTrial>,
        raw: RawExtractedEndpoint,
    ) -> EfficacyDataPoint {
        let mut point = EfficacyDataPoint::new(SourceKind::Publication, &paper.url());
        point.paper_id = Some(paper.pmid.clone());
        point.registry_id = trial.and_then(|t| t.nct_id.clone());
        point.trial_name = attribute_trial_name(
            trial,
            raw.trial_name.as_deref(),
            &self.name_extractor,
            &paper.title,
        );
        point.phase = raw.phase.or_else(|| trial.and_then(|t| t.phase.clone()));
        point.endpoint_name = raw.endpoint_name;
        point.endpoint_type = raw.endpoint_type;
        point.drug_arm_name = raw.drug_arm_name;
        point.drug_arm_n = raw.drug_arm_n;
        point.drug_arm_result = raw.drug_arm_result;
        point.drug_arm_unit = raw.drug_arm_unit;
        point.comparator_arm_name = raw.comparator_arm_name;
        point.comparator_arm_n = raw.comparator_arm_n;
        point.comparator_arm_result = raw.comparator_arm_result;
        point.p_value = raw.p_value;
        point.confidence_interval = raw.confidence_interval;
        point.timepoint = raw.timepoint;
        point.source_text = raw.source_text;
        point.confidence_score = self.config.default_point_confidence;
        point
    }
}

/// Trial-name attribution, strict priority order: discovery-provided name,
/// validated name from the model's own output, registry brief title,
/// registry ID, paper title.
fn attribute_trial_name(
    trial: Option<&DiscoveredTrial>,
    llm_name: Option<&str>,
    name_extractor: &TrialNameExtractor,
    paper_title: &str,
) -> Option<String> {
    if let Some(name) = trial.and_then(|t| t.name.clone()) {
        return Some(name);
    }
    if let Some(name) = llm_name {
        if name_extractor.is_plausible_name(name) {
            return Some(name.trim().to_uppercase());
        }
    }
    if let Some(title) = trial.and_then(|t| t.title.clone()) {
        return Some(title);
    }
    if let Some(nct_id) = trial.and_then(|t| t.nct_id.clone()) {
        return Some(nct_id);
    }
    let title = paper_title.trim();
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}
