//! Centralized constants and settings for the onboarding assistant
//!
//! All tunable weights, thresholds and defaults live here so the scorer,
//! retriever and engine crates never hardcode their own copies.

pub mod constants;
pub mod logging;
pub mod settings;

pub use logging::init_tracing;
pub use settings::{
    EncoderSettings, LlmSettings, ObservabilitySettings, RetrievalSettings, ScorerSettings,
    Settings,
};

use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
