//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::{encoder, llm, retrieval, scorer};
use crate::ConfigError;

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalSettings,

    /// Catalog scorer configuration
    #[serde(default)]
    pub scorer: ScorerSettings,

    /// Keyword encoder configuration
    #[serde(default)]
    pub encoder: EncoderSettings,

    /// Generation backend configuration
    #[serde(default)]
    pub llm: LlmSettings,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilitySettings,
}

impl Settings {
    /// Load settings from an optional TOML file plus environment overrides
    ///
    /// Environment variables use the `ONBOARD__` prefix with `__` as the
    /// section separator, e.g. `ONBOARD__RETRIEVAL__TOP_K=5`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(Environment::with_prefix("ONBOARD").separator("__"));

        let config = builder
            .build()
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate cross-field invariants
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retrieval.top_k == 0 {
            return Err(ConfigError::Invalid("retrieval.top_k must be > 0".into()));
        }
        if self.retrieval.score_threshold < 0.0 {
            return Err(ConfigError::Invalid(
                "retrieval.score_threshold must be >= 0".into(),
            ));
        }
        let keyword_weights = self.scorer.jaccard_weight + self.scorer.cosine_weight;
        let final_weights = self.scorer.keyword_weight + self.scorer.title_weight;
        if (keyword_weights - 1.0).abs() > 1e-6 || (final_weights - 1.0).abs() > 1e-6 {
            return Err(ConfigError::Invalid(
                "scorer weights must each sum to 1.0".into(),
            ));
        }
        Ok(())
    }
}

/// Retrieval settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalSettings {
    /// Shard artifact directory
    #[serde(default = "default_shard_dir")]
    pub shard_dir: String,

    /// Base URL for serving source documents
    #[serde(default = "default_url_base")]
    pub url_base: String,

    /// Candidates per shard and after the global merge
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Maximum acceptable distance for a candidate
    #[serde(default = "default_score_threshold")]
    pub score_threshold: f32,

    /// Embedding call timeout in seconds
    #[serde(default = "default_embed_timeout_secs")]
    pub embed_timeout_secs: u64,
}

fn default_shard_dir() -> String {
    "rag".to_string()
}

fn default_url_base() -> String {
    "http://localhost:5000/pdfs".to_string()
}

fn default_top_k() -> usize {
    retrieval::DEFAULT_TOP_K
}

fn default_score_threshold() -> f32 {
    retrieval::DEFAULT_SCORE_THRESHOLD
}

fn default_embed_timeout_secs() -> u64 {
    retrieval::DEFAULT_EMBED_TIMEOUT_SECS
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            shard_dir: default_shard_dir(),
            url_base: default_url_base(),
            top_k: default_top_k(),
            score_threshold: default_score_threshold(),
            embed_timeout_secs: default_embed_timeout_secs(),
        }
    }
}

/// Catalog scorer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorerSettings {
    #[serde(default = "default_jaccard_weight")]
    pub jaccard_weight: f32,
    #[serde(default = "default_cosine_weight")]
    pub cosine_weight: f32,
    #[serde(default = "default_keyword_weight")]
    pub keyword_weight: f32,
    #[serde(default = "default_title_weight")]
    pub title_weight: f32,
    /// Scores strictly below this clamp to 0.0
    #[serde(default = "default_min_score")]
    pub min_score: f32,
    /// Catalog search keeps entries scoring strictly above this
    #[serde(default = "default_search_threshold")]
    pub search_threshold: f32,
    #[serde(default = "default_search_top_k")]
    pub search_top_k: usize,
}

fn default_jaccard_weight() -> f32 {
    scorer::JACCARD_WEIGHT
}

fn default_cosine_weight() -> f32 {
    scorer::COSINE_WEIGHT
}

fn default_keyword_weight() -> f32 {
    scorer::KEYWORD_WEIGHT
}

fn default_title_weight() -> f32 {
    scorer::TITLE_WEIGHT
}

fn default_min_score() -> f32 {
    scorer::MIN_SCORE
}

fn default_search_threshold() -> f32 {
    scorer::SEARCH_THRESHOLD
}

fn default_search_top_k() -> usize {
    scorer::SEARCH_TOP_K
}

impl Default for ScorerSettings {
    fn default() -> Self {
        Self {
            jaccard_weight: default_jaccard_weight(),
            cosine_weight: default_cosine_weight(),
            keyword_weight: default_keyword_weight(),
            title_weight: default_title_weight(),
            min_score: default_min_score(),
            search_threshold: default_search_threshold(),
            search_top_k: default_search_top_k(),
        }
    }
}

/// Keyword encoder settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderSettings {
    /// Fallback token count for search queries
    #[serde(default = "default_search_fallback_tokens")]
    pub search_fallback_tokens: usize,

    /// Fallback token count for catalog bootstrap
    #[serde(default = "default_catalog_fallback_tokens")]
    pub catalog_fallback_tokens: usize,
}

fn default_search_fallback_tokens() -> usize {
    encoder::SEARCH_FALLBACK_TOKENS
}

fn default_catalog_fallback_tokens() -> usize {
    encoder::CATALOG_FALLBACK_TOKENS
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            search_fallback_tokens: default_search_fallback_tokens(),
            catalog_fallback_tokens: default_catalog_fallback_tokens(),
        }
    }
}

/// Generation backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// API key, usually supplied via environment
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    llm::DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    llm::DEFAULT_MODEL.to_string()
}

fn default_max_tokens() -> usize {
    llm::DEFAULT_MAX_TOKENS
}

fn default_temperature() -> f32 {
    llm::DEFAULT_TEMPERATURE
}

fn default_timeout_secs() -> u64 {
    llm::DEFAULT_TIMEOUT_SECS
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: String::new(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Observability settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilitySettings {
    /// Log level when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON-formatted log lines
    #[serde(default)]
    pub log_json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilitySettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}
