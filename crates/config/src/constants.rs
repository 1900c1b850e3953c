//! Centralized constants for the onboarding assistant
//!
//! Single source of truth for scoring weights, thresholds and default
//! values used across the crates. Keep tuning here, not at call sites.

/// Keyword encoder fallback widths
///
/// When neither exact nor partial vocabulary matching produces a keyword,
/// the encoder falls back to the first N raw tokens of the input. Document
/// search wants tighter precision than catalog bootstrap, hence two widths.
pub mod encoder {
    /// Fallback token count for document search queries
    pub const SEARCH_FALLBACK_TOKENS: usize = 3;

    /// Fallback token count when bootstrapping catalog entries
    pub const CATALOG_FALLBACK_TOKENS: usize = 5;
}

/// Catalog similarity scorer weights and thresholds
pub mod scorer {
    /// Jaccard share of the keyword similarity
    pub const JACCARD_WEIGHT: f32 = 0.7;

    /// Cosine share of the keyword similarity
    pub const COSINE_WEIGHT: f32 = 0.3;

    /// Keyword similarity share of the final score
    pub const KEYWORD_WEIGHT: f32 = 0.75;

    /// Title similarity share of the final score
    pub const TITLE_WEIGHT: f32 = 0.25;

    /// Scores strictly below this are noise and clamp to exactly 0.0
    pub const MIN_SCORE: f32 = 0.05;

    /// Catalog search keeps entries scoring strictly above this
    pub const SEARCH_THRESHOLD: f32 = 0.1;

    /// Catalog search result count
    pub const SEARCH_TOP_K: usize = 5;
}

/// Retrieval defaults
pub mod retrieval {
    /// Candidates requested per shard and kept after the global merge
    pub const DEFAULT_TOP_K: usize = 10;

    /// Maximum acceptable L2 distance for a candidate (not a similarity
    /// floor; larger distance means less similar)
    pub const DEFAULT_SCORE_THRESHOLD: f32 = 1.0;

    /// Embedding call timeout in seconds
    pub const DEFAULT_EMBED_TIMEOUT_SECS: u64 = 10;
}

/// Generation defaults
pub mod llm {
    /// Default chat-completions endpoint (OpenAI-compatible)
    pub const DEFAULT_ENDPOINT: &str = "https://api.siliconflow.cn/v1";

    /// Default model
    pub const DEFAULT_MODEL: &str = "Qwen/QwQ-32B";

    /// Maximum tokens to generate
    pub const DEFAULT_MAX_TOKENS: usize = 4096;

    /// Sampling temperature
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;

    /// Request timeout in seconds
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
}
