//! ClinicalTrials.gov v2 API client.
//!
//! Calls are globally throttled to a fixed minimum interval and retried
//! with linear backoff on 429; 403 is surfaced as non-retryable so the
//! caller skips the resource instead of hammering it.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::throttle::{with_retry, CallThrottle, RetryPolicy};
use super::{
    OutcomeMeasure, ProviderError, TrialDetails, TrialQuery, TrialReference, TrialRegistry,
    TrialSummary,
};

const DEFAULT_BASE_URL: &str = "https://clinicaltrials.gov/api/v2";

pub struct CtGovClient {
    base_url: String,
    client: reqwest::blocking::Client,
    throttle: CallThrottle,
    retry: RetryPolicy,
}

impl CtGovClient {
    pub fn new(base_url: &str, min_interval: Duration, retry: RetryPolicy) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(format!("clinbench/{}", crate::config::APP_VERSION))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            throttle: CallThrottle::new(min_interval),
            retry,
        }
    }

    pub fn default_public(min_interval: Duration, retry: RetryPolicy) -> Self {
        Self::new(DEFAULT_BASE_URL, min_interval, retry)
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        self.throttle.wait();
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ProviderError::from_status(status.as_u16(), body));
        }

        response
            .json()
            .map_err(|e| ProviderError::ResponseParsing(e.to_string()))
    }
}

impl TrialRegistry for CtGovClient {
    fn search(&self, query: &TrialQuery) -> Result<Vec<TrialSummary>, ProviderError> {
        let url = format!("{}/studies", self.base_url);
        let mut params: Vec<(&str, String)> = vec![
            ("query.intr", query.intervention.clone()),
            ("pageSize", query.max_results.max(1).to_string()),
        ];
        if let Some(cond) = &query.condition {
            params.push(("query.cond", cond.clone()));
        }
        if let Some(filters) = build_agg_filters(query) {
            params.push(("aggFilters", filters));
        }
        if !query.statuses.is_empty() {
            params.push(("filter.overallStatus", query.statuses.join("|")));
        }

        let response: StudiesResponse =
            with_retry(&self.retry, "ctgov.search", || self.get_json(&url, &params))?;

        Ok(response
            .studies
            .into_iter()
            .map(|s| study_to_summary(&s))
            .collect())
    }

    fn get_details(&self, nct_id: &str) -> Result<TrialDetails, ProviderError> {
        let url = format!("{}/studies/{}", self.base_url, nct_id);
        let study: Study =
            with_retry(&self.retry, "ctgov.get_details", || self.get_json(&url, &[]))?;
        Ok(study_to_details(&study))
    }
}

/// Build the `aggFilters` parameter: `phase:2 3,funderType:industry`.
fn build_agg_filters(query: &TrialQuery) -> Option<String> {
    let mut filters = Vec::new();
    if !query.phases.is_empty() {
        filters.push(format!("phase:{}", query.phases.join(" ")));
    }
    if query.industry_sponsored_only {
        filters.push("funderType:industry".to_string());
    }
    if filters.is_empty() {
        None
    } else {
        Some(filters.join(","))
    }
}

// ── Wire types (defensive: everything defaulted) ────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct StudiesResponse {
    studies: Vec<Study>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct Study {
    protocol_section: ProtocolSection,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct ProtocolSection {
    identification_module: IdentificationModule,
    status_module: StatusModule,
    design_module: DesignModule,
    sponsor_collaborators_module: SponsorCollaboratorsModule,
    conditions_module: ConditionsModule,
    arms_interventions_module: ArmsInterventionsModule,
    outcomes_module: OutcomesModule,
    references_module: ReferencesModule,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct IdentificationModule {
    nct_id: String,
    brief_title: String,
    official_title: Option<String>,
    acronym: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct StatusModule {
    overall_status: Option<String>,
    start_date_struct: Option<DateStruct>,
    completion_date_struct: Option<DateStruct>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct DateStruct {
    date: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct DesignModule {
    phases: Vec<String>,
    enrollment_info: Option<EnrollmentInfo>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct EnrollmentInfo {
    count: Option<u32>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct SponsorCollaboratorsModule {
    lead_sponsor: Option<LeadSponsor>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct LeadSponsor {
    name: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct ConditionsModule {
    conditions: Vec<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct ArmsInterventionsModule {
    interventions: Vec<Intervention>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct Intervention {
    name: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct OutcomesModule {
    primary_outcomes: Vec<Outcome>,
    secondary_outcomes: Vec<Outcome>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct Outcome {
    measure: Option<String>,
    description: Option<String>,
    time_frame: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct ReferencesModule {
    references: Vec<Reference>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct Reference {
    pmid: Option<String>,
    #[serde(rename = "type")]
    reference_type: Option<String>,
    citation: Option<String>,
}

fn study_to_summary(study: &Study) -> TrialSummary {
    let p = &study.protocol_section;
    TrialSummary {
        nct_id: p.identification_module.nct_id.clone(),
        title: if p.identification_module.brief_title.is_empty() {
            p.identification_module
                .official_title
                .clone()
                .unwrap_or_default()
        } else {
            p.identification_module.brief_title.clone()
        },
        acronym: p.identification_module.acronym.clone().filter(|a| !a.is_empty()),
        phase: if p.design_module.phases.is_empty() {
            None
        } else {
            Some(p.design_module.phases.join("|"))
        },
        status: p.status_module.overall_status.clone(),
        sponsor: p
            .sponsor_collaborators_module
            .lead_sponsor
            .as_ref()
            .and_then(|s| s.name.clone()),
        conditions: p.conditions_module.conditions.clone(),
        interventions: p
            .arms_interventions_module
            .interventions
            .iter()
            .filter_map(|i| i.name.clone())
            .collect(),
        enrollment: p.design_module.enrollment_info.as_ref().and_then(|e| e.count),
        start_date: p
            .status_module
            .start_date_struct
            .as_ref()
            .and_then(|d| d.date.clone()),
        completion_date: p
            .status_module
            .completion_date_struct
            .as_ref()
            .and_then(|d| d.date.clone()),
    }
}

fn study_to_details(study: &Study) -> TrialDetails {
    let outcomes = &study.protocol_section.outcomes_module;
    let to_measure = |o: &Outcome| OutcomeMeasure {
        title: o.measure.clone().unwrap_or_default(),
        description: o.description.clone(),
        time_frame: o.time_frame.clone(),
    };
    TrialDetails {
        summary: study_to_summary(study),
        primary_outcomes: outcomes.primary_outcomes.iter().map(to_measure).collect(),
        secondary_outcomes: outcomes.secondary_outcomes.iter().map(to_measure).collect(),
        references: study
            .protocol_section
            .references_module
            .references
            .iter()
            .map(|r| TrialReference {
                pmid: r.pmid.clone(),
                citation: r.citation.clone().unwrap_or_default(),
                reference_type: r.reference_type.clone(),
            })
            .collect(),
    }
}
