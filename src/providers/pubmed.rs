//! PubMed / PMC client built on the NCBI E-utilities.
//!
//! Search is esearch + esummary (JSON) plus a plain-text abstract fetch;
//! full text comes from the PMC open-access BioC service and degrades to
//! `None` for anything not openly accessible.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use super::throttle::{with_retry, CallThrottle, RetryPolicy};
use super::{FullText, FullTextSection, Paper, PaperIndex, ProviderError};

const DEFAULT_EUTILS_BASE: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";
const DEFAULT_BIOC_BASE: &str =
    "https://www.ncbi.nlm.nih.gov/research/bionlp/RESTful/pmcoa.cgi/BioC_json";

pub struct PubMedClient {
    eutils_base: String,
    bioc_base: String,
    client: reqwest::blocking::Client,
    throttle: CallThrottle,
    retry: RetryPolicy,
    tool: String,
    email: String,
}

impl PubMedClient {
    pub fn new(
        eutils_base: &str,
        bioc_base: &str,
        min_interval: Duration,
        retry: RetryPolicy,
        tool: &str,
        email: &str,
    ) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(format!("clinbench/{} (+{})", crate::config::APP_VERSION, email))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            eutils_base: eutils_base.trim_end_matches('/').to_string(),
            bioc_base: bioc_base.trim_end_matches('/').to_string(),
            client,
            throttle: CallThrottle::new(min_interval),
            retry,
            tool: tool.to_string(),
            email: email.to_string(),
        }
    }

    pub fn default_public(min_interval: Duration, retry: RetryPolicy, email: &str) -> Self {
        Self::new(
            DEFAULT_EUTILS_BASE,
            DEFAULT_BIOC_BASE,
            min_interval,
            retry,
            "clinbench",
            email,
        )
    }

    fn get(&self, url: &str, params: &[(&str, String)]) -> Result<reqwest::blocking::Response, ProviderError> {
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
        Ok(response)
    }

    fn esearch(&self, query: &str, max_results: u32) -> Result<Vec<String>, ProviderError> {
        let url = format!("{}/esearch.fcgi", self.eutils_base);
        let params = [
            ("db", "pubmed".to_string()),
            ("retmode", "json".to_string()),
            ("term", query.to_string()),
            ("retmax", max_results.to_string()),
            ("tool", self.tool.clone()),
            ("email", self.email.clone()),
        ];
        let response: ESearchResponse = with_retry(&self.retry, "pubmed.esearch", || {
            self.get(&url, &params)?
                .json()
                .map_err(|e| ProviderError::ResponseParsing(e.to_string()))
        })?;
        Ok(response.esearchresult.idlist)
    }

    fn esummary(&self, pmids: &[String]) -> Result<Vec<Paper>, ProviderError> {
        if pmids.is_empty() {
            return Ok(Vec::new());
        }
        let url = format!("{}/esummary.fcgi", self.eutils_base);
        let params = [
            ("db", "pubmed".to_string()),
            ("retmode", "json".to_string()),
            ("id", pmids.join(",")),
            ("tool", self.tool.clone()),
            ("email", self.email.clone()),
        ];
        let payload: Value = with_retry(&self.retry, "pubmed.esummary", || {
            self.get(&url, &params)?
                .json()
                .map_err(|e| ProviderError::ResponseParsing(e.to_string()))
        })?;
        Ok(parse_esummary(&payload))
    }

    /// Plain-text abstract via efetch; a failure here only costs the
    /// abstract, not the paper.
    fn fetch_abstract(&self, pmid: &str) -> Option<String> {
        let url = format!("{}/efetch.fcgi", self.eutils_base);
        let params = [
            ("db", "pubmed".to_string()),
            ("id", pmid.to_string()),
            ("rettype", "abstract".to_string()),
            ("retmode", "text".to_string()),
            ("tool", self.tool.clone()),
            ("email", self.email.clone()),
        ];
        let result = with_retry(&self.retry, "pubmed.efetch", || {
            self.get(&url, &params)?
                .text()
                .map_err(|e| ProviderError::Transport(e.to_string()))
        });
        match result {
            Ok(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Err(e) => {
                tracing::warn!(pmid, error = %e, "Abstract fetch failed, continuing without");
                None
            }
        }
    }
}

impl PaperIndex for PubMedClient {
    fn search(&self, query: &str, max_results: u32) -> Result<Vec<Paper>, ProviderError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let pmids = self.esearch(query, max_results)?;
        let mut papers = self.esummary(&pmids)?;
        for paper in &mut papers {
            paper.abstract_text = self.fetch_abstract(&paper.pmid);
        }
        Ok(papers)
    }

    fn fetch_full_text(&self, pmid: &str) -> Result<Option<FullText>, ProviderError> {
        let url = format!("{}/{}/unicode", self.bioc_base, pmid);
        let result = with_retry(&self.retry, "pmc.bioc", || {
            self.throttle.wait();
            let response = self
                .client
                .get(&url)
                .send()
                .map_err(|e| ProviderError::Transport(e.to_string()))?;
            let status = response.status().as_u16();
            // Not deposited / not open access — abstract-only territory.
            if status == 404 || status == 403 {
                return Ok(None);
            }
            if status == 429 {
                return Err(ProviderError::RateLimited);
            }
            if !(200..300).contains(&status) {
                let body = response.text().unwrap_or_default();
                return Err(ProviderError::Http { status, body });
            }
            let payload: Value = response
                .json()
                .map_err(|e| ProviderError::ResponseParsing(e.to_string()))?;
            Ok(Some(payload))
        })?;

        Ok(result.and_then(|payload| parse_bioc(pmid, &payload)))
    }
}

#[derive(Deserialize)]
struct ESearchResponse {
    #[serde(default)]
    esearchresult: ESearchResult,
}

#[derive(Deserialize, Default)]
struct ESearchResult {
    #[serde(default)]
    idlist: Vec<String>,
}

/// esummary payload: `{"result": {"uids": [...], "<uid>": {...}}}`.
fn parse_esummary(payload: &Value) -> Vec<Paper> {
    let Some(result) = payload.get("result") else {
        return Vec::new();
    };
    let Some(uids) = result.get("uids").and_then(Value::as_array) else {
        return Vec::new();
    };

    uids.iter()
        .filter_map(Value::as_str)
        .filter_map(|uid| result.get(uid).map(|doc| summary_to_paper(uid, doc)))
        .collect()
}

fn summary_to_paper(pmid: &str, doc: &Value) -> Paper {
    let title = doc
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim_end_matches('.')
        .to_string();

    let journal = doc
        .get("fulljournalname")
        .or_else(|| doc.get("source"))
        .and_then(Value::as_str)
        .map(String::from);

    let year = doc
        .get("pubdate")
        .and_then(Value::as_str)
        .and_then(|d| d.get(..4))
        .and_then(|y| y.parse::<i32>().ok());

    let authors = doc
        .get("authors")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|a| a.get("name").and_then(Value::as_str))
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    let doi = doc
        .get("articleids")
        .and_then(Value::as_array)
        .and_then(|ids| {
            ids.iter().find_map(|id| {
                let idtype = id.get("idtype").and_then(Value::as_str)?;
                if idtype == "doi" {
                    id.get("value").and_then(Value::as_str).map(String::from)
                } else {
                    None
                }
            })
        });

    let publication_types = doc
        .get("pubtype")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    Paper {
        pmid: pmid.to_string(),
        title,
        abstract_text: None,
        authors,
        journal,
        year,
        doi,
        publication_types,
    }
}

/// BioC JSON: array of collections, each with documents of labeled
/// passages. Returns None when no passage carries text.
fn parse_bioc(pmid: &str, payload: &Value) -> Option<FullText> {
    let collections: Vec<&Value> = match payload {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    let mut sections = Vec::new();
    for collection in collections {
        let Some(documents) = collection.get("documents").and_then(Value::as_array) else {
            continue;
        };
        for document in documents {
            let Some(passages) = document.get("passages").and_then(Value::as_array) else {
                continue;
            };
            for passage in passages {
                let Some(text) = passage.get("text").and_then(Value::as_str) else {
                    continue;
                };
                if text.trim().is_empty() {
                    continue;
                }
                let label = passage
                    .get("infons")
                    .and_then(|i| i.get("section_type").or_else(|| i.get("type")))
                    .and_then(Value::as_str)
                    .unwrap_or("BODY")
                    .to_string();
                sections.push(FullTextSection {
                    label,
                    text: text.trim().to_string(),
                });
            }
        }
    }

    if sections.is_empty() {
        None
    } else {
        Some(FullText {
            pmid: pmid.to_string(),
            sections,
        })
    }
}
