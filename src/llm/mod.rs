//! Text-generation capability.
//!
//! The pipeline treats the model as "given a prompt, return text, possibly
//! truncated" — nothing downstream may assume complete, well-formed JSON.
//! Truncation repair lives in [`json_repair`] as named, independently
//! testable functions.

pub mod json_repair;
pub mod ollama;

use thiserror::Error;

pub use ollama::{MockTextGenerator, OllamaClient};

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Cannot connect to generation service at {0}")]
    Connection(String),

    #[error("Generation request timed out after {0}s")]
    Timeout(u64),

    #[error("Generation service error {status}: {body}")]
    Service { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),
}

/// The capability interface to the external text-generation service.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String, GenerationError>;
}
