use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Application-level constants
pub const APP_NAME: &str = "Clinbench";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the application data directory
/// ~/Clinbench/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Clinbench")
}

/// Default location of the evidence database.
pub fn default_db_path() -> PathBuf {
    app_data_dir().join("evidence.db")
}

pub fn default_log_filter() -> String {
    "clinbench=info".to_string()
}

/// Tunables for a benchmark run.
///
/// Every threshold here encodes product policy, not domain law — callers
/// are expected to tune them rather than treat them as fixed truths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Points scoring at or above this are auto-accepted; below it they
    /// queue for human review. The single knob governing review load.
    pub confidence_threshold: f64,
    /// Placeholder confidence assigned at extraction time, before scoring.
    pub default_point_confidence: f64,
    /// Minimum score for a mined trial-name candidate to be kept.
    pub min_trial_name_confidence: f64,
    /// Seconds to wait between drugs. Third-party rate limits assume this
    /// pause exists.
    pub inter_drug_delay_secs: u64,
    /// Global minimum interval between trial-registry calls.
    pub registry_min_interval_ms: u64,
    /// Bounded retries on rate-limit responses, linear backoff.
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    /// Paper-index search cap per query.
    pub max_search_results: u32,
    /// Papers actually sent to the LLM, per trial and per drug.
    pub max_papers_per_trial: u32,
    pub max_papers_per_drug: u32,
    /// Registry fallback engages below this many publication points.
    pub registry_fallback_threshold: usize,
    /// Trials pulled in the registry-fallback path.
    pub max_registry_trials: u32,
    /// Secondary outcome definitions emitted per registry trial.
    pub max_secondary_outcomes: usize,
    /// Seed confidence for registry-metadata points, pending full scoring.
    pub registry_seed_confidence_primary: f64,
    pub registry_seed_confidence_secondary: f64,
    /// Named trials below this count trigger the LLM web-search fallback.
    pub min_named_trials: usize,
    /// LLM request timeout.
    pub llm_timeout_secs: u64,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.7,
            default_point_confidence: 0.85,
            min_trial_name_confidence: 0.5,
            inter_drug_delay_secs: 4,
            registry_min_interval_ms: 1_000,
            max_retries: 3,
            retry_base_delay_ms: 2_000,
            max_search_results: 20,
            max_papers_per_trial: 3,
            max_papers_per_drug: 6,
            registry_fallback_threshold: 3,
            max_registry_trials: 5,
            max_secondary_outcomes: 3,
            registry_seed_confidence_primary: 0.6,
            registry_seed_confidence_secondary: 0.5,
            min_named_trials: 2,
            llm_timeout_secs: 300,
        }
    }
}

impl BenchmarkConfig {
    pub fn inter_drug_delay(&self) -> Duration {
        Duration::from_secs(self.inter_drug_delay_secs)
    }

    pub fn registry_min_interval(&self) -> Duration {
        Duration::from_millis(self.registry_min_interval_ms)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir();
        let home = dirs::home_dir().unwrap();
        assert!(dir.starts_with(home));
        assert!(dir.ends_with("Clinbench"));
    }

    #[test]
    fn db_path_under_app_data() {
        let db = default_db_path();
        assert!(db.starts_with(app_data_dir()));
    }

    #[test]
    fn benchmark_config_defaults() {
        let config = BenchmarkConfig::default();
        assert_eq!(config.confidence_threshold, 0.7);
        assert_eq!(config.default_point_confidence, 0.85);
        assert_eq!(config.registry_fallback_threshold, 3);
        assert_eq!(config.min_named_trials, 2);
        assert!(
            config.inter_drug_delay_secs > 0,
            "inter-drug delay is a rate-limit requirement"
        );
    }

    #[test]
    fn config_durations() {
        let config = BenchmarkConfig::default();
        assert_eq!(config.inter_drug_delay(), Duration::from_secs(4));
        assert_eq!(config.registry_min_interval(), Duration::from_millis(1_000));
        assert_eq!(config.retry_base_delay(), Duration::from_millis(2_000));
    }
}
