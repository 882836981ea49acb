//! External evidence providers: the trial registry and the paper index.
//!
//! Both are modeled as traits so the pipeline can be exercised against
//! in-memory fakes; the HTTP implementations live in [`clinicaltrials`]
//! and [`pubmed`]. HTTP 403 is classified as "skip, not retryable",
//! distinct from 429 which retries with linear backoff.

pub mod clinicaltrials;
pub mod pubmed;
pub mod throttle;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use clinicaltrials::CtGovClient;
pub use pubmed::PubMedClient;
pub use throttle::{with_retry, CallThrottle, RetryPolicy};

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Rate limited (HTTP 429)")]
    RateLimited,

    #[error("Access forbidden (HTTP 403)")]
    Forbidden,

    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),
}

impl ProviderError {
    /// Only rate limiting and transport hiccups are worth retrying; a 403
    /// means the resource is closed to us and retrying would not help.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited | Self::Transport(_))
    }

    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            429 => Self::RateLimited,
            403 => Self::Forbidden,
            _ => Self::Http { status, body },
        }
    }
}

// ── Trial registry ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct TrialQuery {
    pub intervention: String,
    pub condition: Option<String>,
    /// Phase labels, registry vocabulary ("2", "3").
    pub phases: Vec<String>,
    pub industry_sponsored_only: bool,
    /// Overall-status filters ("COMPLETED"); empty = any.
    pub statuses: Vec<String>,
    pub max_results: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialSummary {
    pub nct_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acronym: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sponsor: Option<String>,
    pub conditions: Vec<String>,
    pub interventions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeMeasure {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_frame: Option<String>,
}

/// A publication linked from a registry record, with its type tag
/// ("RESULT", "BACKGROUND", "DERIVED").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pmid: Option<String>,
    pub citation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialDetails {
    pub summary: TrialSummary,
    pub primary_outcomes: Vec<OutcomeMeasure>,
    pub secondary_outcomes: Vec<OutcomeMeasure>,
    pub references: Vec<TrialReference>,
}

pub trait TrialRegistry: Send + Sync {
    fn search(&self, query: &TrialQuery) -> Result<Vec<TrialSummary>, ProviderError>;
    fn get_details(&self, nct_id: &str) -> Result<TrialDetails, ProviderError>;
}

// ── Paper index ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paper {
    pub pmid: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
    pub authors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    /// Index-supplied tags ("Randomized Controlled Trial", "Review").
    pub publication_types: Vec<String>,
}

impl Paper {
    pub fn url(&self) -> String {
        format!("https://pubmed.ncbi.nlm.nih.gov/{}/", self.pmid)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullTextSection {
    pub label: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullText {
    pub pmid: String,
    pub sections: Vec<FullTextSection>,
}

impl FullText {
    pub fn combined_text(&self) -> String {
        self.sections
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

pub trait PaperIndex: Send + Sync {
    fn search(&self, query: &str, max_results: u32) -> Result<Vec<Paper>, ProviderError>;
    /// Open-access full text when available; `Ok(None)` when the paper is
    /// paywalled or not deposited.
    fn fetch_full_text(&self, pmid: &str) -> Result<Option<FullText>, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification_distinguishes_403_from_429() {
        assert!(matches!(
            ProviderError::from_status(429, String::new()),
            ProviderError::RateLimited
        ));
        assert!(matches!(
            ProviderError::from_status(403, String::new()),
            ProviderError::Forbidden
        ));
        assert!(matches!(
            ProviderError::from_status(500, String::new()),
            ProviderError::Http { status: 500, .. }
        ));
    }

    #[test]
    fn retryability() {
        assert!(ProviderError::RateLimited.is_retryable());
        assert!(ProviderError::Transport("reset".into()).is_retryable());
        assert!(!ProviderError::Forbidden.is_retryable());
        assert!(!ProviderError::Http { status: 500, body: String::new() }.is_retryable());
    }

    #[test]
    fn paper_url_points_at_pubmed() {
        let paper = Paper {
            pmid: "19945765".to_string(),
            title: String::new(),
            abstract_text: None,
            authors: vec![],
            journal: None,
            year: None,
            doi: None,
            publication_types: vec![],
        };
        assert_eq!(paper.url(), "https://pubmed.ncbi.nlm.nih.gov/19945765/");
    }

    #[test]
    fn full_text_combines_sections() {
        let ft = FullText {
            pmid: "1".to_string(),
            sections: vec![
                FullTextSection { label: "TITLE".into(), text: "A trial".into() },
                FullTextSection { label: "RESULTS".into(), text: "It worked".into() },
            ],
        };
        assert_eq!(ft.combined_text(), "A trial\n\nIt worked");
    }
}
