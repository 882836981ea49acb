//! Trial discovery: resolve a drug + indication into a set of named
//! trials.
//!
//! Strictly ordered pipeline: clean the generic name → registry search
//! (official acronym preferred, title mining as fallback) → one batched
//! LLM lookup for nameless registry IDs, cross-validated against the
//! ownership table → LLM web-search fallback when too few named trials
//! remain → dedupe. Every provider failure degrades to "this step yielded
//! zero trials" instead of aborting discovery.

pub mod ownership;

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::BenchmarkConfig;
use crate::llm::{json_repair, TextGenerator};
use crate::models::{ApprovedDrug, DiscoveredTrial, DrugTrialInfo, TrialProvenance};
use crate::providers::{TrialQuery, TrialRegistry, TrialSummary};
use crate::trial_names::TrialNameExtractor;

pub use ownership::TrialOwnershipTable;

/// Registry titles are trusted context, so acronym mining from them runs
/// at a lower bar than free-text mining.
const TITLE_NAME_MIN_CONFIDENCE: f64 = 0.3;

pub struct TrialDiscoveryService {
    registry: Arc<dyn TrialRegistry>,
    llm: Arc<dyn TextGenerator>,
    name_extractor: TrialNameExtractor,
    ownership: TrialOwnershipTable,
    config: BenchmarkConfig,
}

impl TrialDiscoveryService {
    pub fn new(
        registry: Arc<dyn TrialRegistry>,
        llm: Arc<dyn TextGenerator>,
        ownership: TrialOwnershipTable,
        config: BenchmarkConfig,
    ) -> Self {
        Self {
            registry,
            llm,
            name_extractor: TrialNameExtractor::new(),
            ownership,
            config,
        }
    }

    pub fn discover_trials(
        &self,
        drug: &ApprovedDrug,
        indication: &str,
        use_web_search: bool,
    ) -> DrugTrialInfo {
        let cleaned_generic = clean_generic_name(&drug.generic_name);

        let mut trials = self.registry_trials(&cleaned_generic, indication);
        self.resolve_unnamed_via_llm(&mut trials, drug);

        let named = trials.iter().filter(|t| t.is_named()).count();
        if named < self.config.min_named_trials && use_web_search {
            trials.extend(self.web_search_trials(drug, indication));
        }

        DrugTrialInfo {
            drug_name: drug.display_name().to_string(),
            generic_name: cleaned_generic,
            indication: indication.to_string(),
            trials: dedupe_trials(trials),
        }
    }

    /// Phase 2/3 industry-sponsored registry search. The registry's own
    /// acronym field wins over anything inferred from the title.
    fn registry_trials(&self, generic_name: &str, indication: &str) -> Vec<DiscoveredTrial> {
        let query = TrialQuery {
            intervention: generic_name.to_string(),
            condition: Some(indication.to_string()),
            phases: vec!["2".to_string(), "3".to_string()],
            industry_sponsored_only: true,
            statuses: Vec::new(),
            max_results: self.config.max_search_results,
        };

        let summaries = match self.registry.search(&query) {
            Ok(summaries) => summaries,
            Err(e) => {
                tracing::warn!(drug = generic_name, error = %e, "Registry search failed, continuing with zero trials");
                return Vec::new();
            }
        };

        summaries
            .iter()
            .map(|s| self.summary_to_trial(s, indication))
            .collect()
    }

    fn summary_to_trial(&self, summary: &TrialSummary, indication: &str) -> DiscoveredTrial {
        let name = summary.acronym.clone().or_else(|| {
            self.name_extractor
                .extract(&summary.title, TITLE_NAME_MIN_CONFIDENCE)
                .into_iter()
                .next()
        });
        DiscoveredTrial {
            name,
            nct_id: Some(summary.nct_id.clone()),
            title: Some(summary.title.clone()),
            phase: summary.phase.clone(),
            indication: indication.to_string(),
            status: summary.status.clone(),
            provenance: TrialProvenance::Registry,
            confidence: 1.0,
        }
    }

    /// One batched lookup for all trials that resolved only to an ID.
    /// Every proposed name must pass the ownership cross-check before
    /// acceptance; the model is told to omit rather than guess.
    fn resolve_unnamed_via_llm(&self, trials: &mut [DiscoveredTrial], drug: &ApprovedDrug) {
        let unnamed_ids: Vec<String> = trials
            .iter()
            .filter(|t| !t.is_named())
            .filter_map(|t| t.nct_id.clone())
            .collect();
        if unnamed_ids.is_empty() {
            return;
        }

        let prompt = trial_lookup_prompt(&unnamed_ids, drug);
        let response = match self.llm.generate(&prompt, Some(LOOKUP_SYSTEM_PROMPT)) {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(drug = %drug.generic_name, error = %e, "Trial-name lookup failed, leaving trials unnamed");
                return;
            }
        };

        let map = match json_repair::parse_json_object(&response) {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!(drug = %drug.generic_name, error = %e, "Unparseable trial-name lookup response");
                return;
            }
        };

        for (nct_id, value) in map {
            let Some(name) = value.as_str().map(str::trim).filter(|n| !n.is_empty()) else {
                continue;
            };
            if !self.ownership.validate(name, drug) {
                tracing::warn!(
                    trial = name,
                    drug = %drug.generic_name,
                    "Rejected trial name belonging to a different drug"
                );
                continue;
            }
            if let Some(trial) = trials
                .iter_mut()
                .find(|t| t.nct_id.as_deref() == Some(nct_id.as_str()) && !t.is_named())
            {
                trial.name = Some(name.to_uppercase());
                trial.provenance = TrialProvenance::LlmLookup;
                trial.confidence = 0.9;
            }
        }
    }

    /// Last resort: ask the model directly for acronyms by drug and
    /// indication. No cross-validation; trusted at lower confidence.
    fn web_search_trials(&self, drug: &ApprovedDrug, indication: &str) -> Vec<DiscoveredTrial> {
        let prompt = web_search_prompt(drug, indication);
        let response = match self.llm.generate(&prompt, Some(LOOKUP_SYSTEM_PROMPT)) {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(drug = %drug.generic_name, error = %e, "Web-search trial lookup failed");
                return Vec::new();
            }
        };

        let items = match json_repair::parse_json_array(&response) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(drug = %drug.generic_name, error = %e, "Unparseable web-search trial response");
                return Vec::new();
            }
        };

        items
            .iter()
            .filter_map(|item| {
                let name = item.get("name").and_then(|v| v.as_str())?.trim();
                if name.is_empty() {
                    return None;
                }
                Some(DiscoveredTrial {
                    name: Some(name.to_uppercase()),
                    nct_id: item
                        .get("nct_id")
                        .and_then(|v| v.as_str())
                        .map(String::from),
                    title: None,
                    phase: item.get("phase").and_then(|v| v.as_str()).map(String::from),
                    indication: indication.to_string(),
                    status: None,
                    provenance: TrialProvenance::LlmWebSearch,
                    confidence: 0.6,
                })
            })
            .collect()
    }
}

/// Strip a trailing 3–4 letter biosimilar/antibody designation suffix
/// ("infliximab-dyyb" → "infliximab").
pub fn clean_generic_name(name: &str) -> String {
    let trimmed = name.trim();
    if let Some((base, suffix)) = trimmed.rsplit_once('-') {
        let is_designation = (3..=4).contains(&suffix.len())
            && suffix.chars().all(|c| c.is_ascii_lowercase())
            && (base.ends_with("mab") || base.ends_with("cept"));
        if is_designation {
            return base.to_string();
        }
    }
    trimmed.to_string()
}

/// Dedupe by upper-cased name (registry ID for unnamed entries),
/// preferring registry-sourced over LLM-sourced and higher phase on tie.
fn dedupe_trials(trials: Vec<DiscoveredTrial>) -> Vec<DiscoveredTrial> {
    let mut kept: Vec<DiscoveredTrial> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for trial in trials {
        let key = trial
            .name
            .as_deref()
            .map(str::to_uppercase)
            .or_else(|| trial.nct_id.clone())
            .unwrap_or_default();
        if key.is_empty() {
            continue;
        }
        match index.get(&key) {
            None => {
                index.insert(key, kept.len());
                kept.push(trial);
            }
            Some(&i) => {
                if prefer_over(&trial, &kept[i]) {
                    kept[i] = trial;
                }
            }
        }
    }
    kept
}

fn prefer_over(candidate: &DiscoveredTrial, incumbent: &DiscoveredTrial) -> bool {
    let candidate_registry = candidate.provenance == TrialProvenance::Registry;
    let incumbent_registry = incumbent.provenance == TrialProvenance::Registry;
    if candidate_registry != incumbent_registry {
        return candidate_registry;
    }
    candidate.phase_rank() > incumbent.phase_rank()
}

const LOOKUP_SYSTEM_PROMPT: &str =
    "You are a clinical trial registry analyst. Answer only with the requested JSON. \
     Never invent trial names; omit anything you are not certain of.";

fn trial_lookup_prompt(nct_ids: &[String], drug: &ApprovedDrug) -> String {
    format!(
        "For each ClinicalTrials.gov identifier below, give the registered trial \
         acronym for the {drug} program, if it has one.\n\
         Respond with a single JSON object mapping each identifier to the confirmed \
         acronym string, or null when unknown. Do not guess — null is always \
         acceptable.\n\nIdentifiers:\n{ids}",
        drug = drug.generic_name,
        ids = nct_ids.join("\n"),
    )
}

fn web_search_prompt(drug: &ApprovedDrug, indication: &str) -> String {
    format!(
        "List named Phase 2 or Phase 3 clinical trials of {drug} in {indication}.\n\
         Respond with a JSON array of objects like \
         [{{\"name\": \"ACRONYM\", \"phase\": \"Phase 3\", \"nct_id\": \"NCT...\"}}]. \
         Only include trials you are confident exist; return [] when unsure.",
        drug = drug.generic_name,
        indication = indication,
    )
}
