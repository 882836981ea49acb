//! Benchmark session orchestration.
//!
//! Single-threaded and sequential per drug, with a fixed inter-drug pause
//! that third-party rate limits depend on. Disease standardization failure
//! is fatal to the session; everything after that degrades per drug, and
//! no raw exception text escapes — outcomes surface as statuses and
//! error-list entries.

pub mod cancel;
pub mod progress;

use std::sync::Arc;

use crate::config::BenchmarkConfig;
use crate::discovery::{TrialDiscoveryService, TrialOwnershipTable};
use crate::extract::{PublicationExtractor, RegistryExtractor};
use crate::llm::TextGenerator;
use crate::models::{
    resolve_extraction_status, resolve_session_status, ApprovedDrug, BenchmarkSession,
    DiseaseMatch, DrugBenchmarkResult, SessionStatus,
};
use crate::providers::{PaperIndex, TrialRegistry};
use crate::scoring::ConfidenceScorer;
use crate::standardize::ConditionStandardizer;

pub use cancel::CancelToken;
pub use progress::{MonotonicProgress, NullProgress, ProgressSink};

/// Options for one benchmark run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Endpoints the caller expects to see (hint for extraction prompts).
    pub expected_endpoints: Vec<String>,
    /// Allow the LLM web-search fallback during trial discovery.
    pub use_web_search: bool,
}

pub struct BenchmarkRunner {
    standardizer: ConditionStandardizer,
    discovery: TrialDiscoveryService,
    publications: PublicationExtractor,
    registry_fallback: RegistryExtractor,
    scorer: ConfidenceScorer,
    config: BenchmarkConfig,
}

impl BenchmarkRunner {
    pub fn new(
        registry: Arc<dyn TrialRegistry>,
        papers: Arc<dyn PaperIndex>,
        llm: Arc<dyn TextGenerator>,
        standardizer: ConditionStandardizer,
        ownership: TrialOwnershipTable,
        config: BenchmarkConfig,
    ) -> Self {
        Self {
            standardizer,
            discovery: TrialDiscoveryService::new(
                registry.clone(),
                llm.clone(),
                ownership,
                config.clone(),
            ),
            publications: PublicationExtractor::new(papers, llm, config.clone()),
            registry_fallback: RegistryExtractor::new(registry, config.clone()),
            scorer: ConfidenceScorer::new(config.confidence_threshold),
            config,
        }
    }

    /// Run a full benchmark session: standardize once, then one drug at a
    /// time with the configured pause between drugs.
    pub fn run(
        &self,
        disease_input: &str,
        drugs: &[ApprovedDrug],
        options: &RunOptions,
        progress: &dyn ProgressSink,
        cancel: &CancelToken,
    ) -> BenchmarkSession {
        let progress = MonotonicProgress::new(progress);
        progress.report("Standardizing disease name", 0.0);

        let disease = self.standardizer.standardize(disease_input);
        let mut session = BenchmarkSession::new(disease.clone());

        if !disease.is_matched() {
            tracing::error!(input = disease_input, "Disease standardization failed, session aborted");
            session.status = SessionStatus::Failed;
            session
                .errors
                .push(format!("Could not standardize disease '{disease_input}'"));
            return session;
        }

        session.status = SessionStatus::Extracting;
        let total = drugs.len().max(1) as f64;

        for (i, drug) in drugs.iter().enumerate() {
            if cancel.is_cancelled() {
                tracing::info!(processed = i, total = drugs.len(), "Benchmark cancelled between drugs");
                session
                    .errors
                    .push(format!("Cancelled after {i} of {} drugs", drugs.len()));
                for remaining in &drugs[i..] {
                    session
                        .results
                        .push(DrugBenchmarkResult::pending(remaining.clone()));
                }
                break;
            }

            // Rate-limit pause between drugs. Removing this violates the
            // external services' usage terms.
            if i > 0 {
                std::thread::sleep(self.config.inter_drug_delay());
            }

            progress.report(
                &format!("Extracting evidence for {}", drug.display_name()),
                i as f64 / total,
            );

            session
                .results
                .push(self.run_drug(drug, &disease, options));
        }

        session.status = resolve_session_status(&session.results);
        progress.report("Benchmark complete", 1.0);
        session
    }

    fn run_drug(
        &self,
        drug: &ApprovedDrug,
        disease: &DiseaseMatch,
        options: &RunOptions,
    ) -> DrugBenchmarkResult {
        let mut result = DrugBenchmarkResult::pending(drug.clone());

        let trial_info = self.discovery.discover_trials(
            drug,
            &disease.standard_name,
            options.use_web_search,
        );
        tracing::info!(
            drug = %drug.generic_name,
            trials = trial_info.trials.len(),
            named = trial_info.named_trial_count(),
            "Trial discovery finished"
        );

        let mut points = self.publications.extract(
            drug,
            disease,
            &trial_info,
            &options.expected_endpoints,
        );

        // Thin publication yield: registry metadata fills the gap.
        if points.len() < self.config.registry_fallback_threshold {
            let registry_points = self.registry_fallback.extract(drug, disease);
            if !registry_points.is_empty() {
                tracing::info!(
                    drug = %drug.generic_name,
                    publication_points = points.len(),
                    registry_points = registry_points.len(),
                    "Registry fallback engaged"
                );
            }
            points.extend(registry_points);
        }

        self.scorer.score_and_flag(&mut points);

        if points.is_empty() {
            result
                .errors
                .push("No efficacy data found from any source".to_string());
        }
        result.status = resolve_extraction_status(&points);
        result.data_points = points;
        result
    }
}
