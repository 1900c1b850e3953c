//! Top-level error type
//!
//! Subsystem crates define their own error enums and convert into this
//! type at the crate boundary.

use thiserror::Error;

/// Top-level error for the onboarding assistant
#[derive(Error, Debug)]
pub enum Error {
    #[error("Retrieval error: {0}")]
    Rag(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Provider timeout")]
    ProviderTimeout,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias using the top-level error
pub type Result<T> = std::result::Result<T, Error>;
