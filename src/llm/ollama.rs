use std::collections::VecDeque;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::{GenerationError, TextGenerator};

/// Ollama HTTP client for local LLM inference.
pub struct OllamaClient {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaClient {
    /// Create a new OllamaClient pointing at an Ollama instance.
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        }
    }

    /// Default local instance at localhost:11434 with 5-minute timeout.
    pub fn default_local(model: &str) -> Self {
        Self::new("http://localhost:11434", model, 300)
    }
}

/// Request body for Ollama /api/generate
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    stream: bool,
}

/// Response body from Ollama /api/generate
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

impl TextGenerator for OllamaClient {
    fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String, GenerationError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            system,
            stream: false,
        };

        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            if e.is_connect() {
                GenerationError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                GenerationError::Timeout(self.timeout_secs)
            } else {
                GenerationError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(GenerationError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaGenerateResponse = response
            .json()
            .map_err(|e| GenerationError::ResponseParsing(e.to_string()))?;

        Ok(parsed.response)
    }
}

/// Mock generator for tests — pops queued responses in order, repeating
/// the last one once the queue drains.
pub struct MockTextGenerator {
    responses: Mutex<VecDeque<String>>,
    last: Mutex<String>,
}

impl MockTextGenerator {
    pub fn new(response: &str) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            last: Mutex::new(response.to_string()),
        }
    }

    pub fn with_queue(responses: Vec<&str>) -> Self {
        let queue: VecDeque<String> = responses.into_iter().map(String::from).collect();
        let last = queue.back().cloned().unwrap_or_default();
        Self {
            responses: Mutex::new(queue),
            last: Mutex::new(last),
        }
    }
}

impl TextGenerator for MockTextGenerator {
    fn generate(&self, _prompt: &str, _system: Option<&str>) -> Result<String, GenerationError> {
        let mut queue = self.responses.lock().unwrap();
        match queue.pop_front() {
            Some(next) => {
                *self.last.lock().unwrap() = next.clone();
                Ok(next)
            }
            None => Ok(self.last.lock().unwrap().clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_returns_configured_response() {
        let llm = MockTextGenerator::new("hello");
        assert_eq!(llm.generate("p", None).unwrap(), "hello");
        assert_eq!(llm.generate("p", Some("s")).unwrap(), "hello");
    }

    #[test]
    fn mock_queue_pops_in_order_then_repeats() {
        let llm = MockTextGenerator::with_queue(vec!["one", "two"]);
        assert_eq!(llm.generate("p", None).unwrap(), "one");
        assert_eq!(llm.generate("p", None).unwrap(), "two");
        assert_eq!(llm.generate("p", None).unwrap(), "two");
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = OllamaClient::new("http://localhost:11434/", "llama3:8b", 60);
        assert_eq!(client.base_url, "http://localhost:11434");
        assert_eq!(client.model, "llama3:8b");
    }

    #[test]
    fn default_local_uses_standard_port() {
        let client = OllamaClient::default_local("llama3:8b");
        assert_eq!(client.base_url, "http://localhost:11434");
        assert_eq!(client.timeout_secs, 300);
    }
}
