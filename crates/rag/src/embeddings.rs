//! Embedding providers
//!
//! The real embedding model lives behind the `EmbeddingProvider` trait and
//! is supplied by the caller. The hash embedder here is deterministic and
//! dependency-free, good enough for tests and offline runs where semantic
//! quality does not matter.

use async_trait::async_trait;

use onboard_core::{EmbeddingProvider, Error};

/// Embedding configuration
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    /// Embedding dimension
    pub dim: usize,
    /// L2-normalize output vectors
    pub normalize: bool,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            dim: 384,
            normalize: true,
        }
    }
}

/// Deterministic hash-based embedder (no model required)
pub struct HashEmbedder {
    config: EmbeddingConfig,
}

impl HashEmbedder {
    pub fn new(config: EmbeddingConfig) -> Self {
        Self { config }
    }

    fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.config.dim];

        for (i, c) in text.chars().enumerate() {
            let idx = (c as usize + i) % self.config.dim;
            embedding[idx] += 1.0;
        }

        if self.config.normalize {
            let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm > 0.0 {
                for v in &mut embedding {
                    *v /= norm;
                }
            }
        }

        embedding
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, Error> {
        Ok(self.embed_sync(text))
    }

    fn dim(&self) -> usize {
        self.config.dim
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dimension_and_normalization() {
        let embedder = HashEmbedder::new(EmbeddingConfig::default());
        let embedding = embedder.embed("Hello onboarding").await.unwrap();

        assert_eq!(embedding.len(), 384);
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.01);
    }

    #[tokio::test]
    async fn test_deterministic() {
        let embedder = HashEmbedder::new(EmbeddingConfig::default());
        let a = embedder.embed("same text").await.unwrap();
        let b = embedder.embed("same text").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_empty_text_is_zero_vector() {
        let embedder = HashEmbedder::new(EmbeddingConfig::default());
        let embedding = embedder.embed("").await.unwrap();
        assert!(embedding.iter().all(|&v| v == 0.0));
    }
}
