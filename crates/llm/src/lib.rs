//! Generation integration for the onboarding assistant
//!
//! Features:
//! - OpenAI-compatible chat-completions backend
//! - Mode-specific prompt construction
//! - Structured-vs-unstructured output parsing (`GenerationOutcome`)

pub mod backend;
pub mod outcome;
pub mod prompt;

pub use backend::{ChatBackend, GenerationResult, LlmBackend, LlmConfig};
pub use outcome::{parse_outcome, GenerationOutcome};
pub use prompt::{Message, PromptBuilder, Role};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Generation error: {0}")]
    Generation(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for onboard_core::Error {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Timeout => onboard_core::Error::ProviderTimeout,
            other => onboard_core::Error::Llm(other.to_string()),
        }
    }
}
