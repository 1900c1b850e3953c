//! Pluggable backend traits

use async_trait::async_trait;

use crate::Error;

/// Embedding provider
///
/// Maps free text to a fixed-width float vector. Implementations call an
/// external model or service; the retrieval layer wraps calls with its own
/// timeout and treats failures as provider errors, never as zero hits.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>, Error>;

    /// Embedding dimension produced by this provider
    fn dim(&self) -> usize;
}
