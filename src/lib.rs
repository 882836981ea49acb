//! clinbench — clinical-evidence extraction and confidence scoring for
//! drug-repurposing intelligence.
//!
//! The pipeline: discover candidate trials for a drug–disease pair,
//! extract structured efficacy data points from publications (and
//! registry metadata when publications run thin) via an LLM with
//! truncation repair, assign multi-factor confidence scores and review
//! dispositions, and aggregate per-paper evidence into disease-level
//! ranked opportunities.

pub mod aggregate;
pub mod config;
pub mod discovery;
pub mod extract;
pub mod llm;
pub mod models;
pub mod providers;
pub mod scoring;
pub mod session;
pub mod standardize;
pub mod store;
pub mod trial_names;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for binaries and integration harnesses embedding
/// the pipeline. Library code only emits events.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("clinbench v{}", config::APP_VERSION);
}
