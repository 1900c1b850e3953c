//! Retrieval for the onboarding assistant
//!
//! Features:
//! - Multi-hot keyword encoding over a versioned vocabulary
//! - Combined Jaccard/cosine/title catalog similarity search
//! - Per-document vector shards (flat L2 index + id list + doc map)
//! - Sharded nearest-neighbor retrieval with global merge and threshold
//! - Deterministic hash embedder for offline use and tests

pub mod catalog;
pub mod embeddings;
pub mod keyword;
pub mod retriever;
pub mod shard;

pub use catalog::{CatalogEntry, DocumentCatalog, RankedEntry, ScorerConfig};
pub use embeddings::{EmbeddingConfig, HashEmbedder};
pub use keyword::{encode, encode_keywords, extract_keywords, EncodedVector, Vocabulary};
pub use retriever::{Retrieval, RetrieverConfig, ShardRetriever};
pub use shard::{write_shard, FlatIndex, Hit, ShardCatalog, ShardDoc, VectorShard};

use thiserror::Error;

/// Retrieval errors
#[derive(Error, Debug)]
pub enum RagError {
    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Missing shard artifact: {0}")]
    MissingArtifact(String),

    #[error("Corrupt shard artifact: {0}")]
    Corrupt(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Provider timeout")]
    Timeout,
}

impl From<RagError> for onboard_core::Error {
    fn from(err: RagError) -> Self {
        match err {
            RagError::Timeout => onboard_core::Error::ProviderTimeout,
            other => onboard_core::Error::Rag(other.to_string()),
        }
    }
}
