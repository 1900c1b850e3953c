//! Sharded retrieval coordinator
//!
//! Fans a query embedding out to every usable shard, merges the surviving
//! candidates into one globally ranked list, and renders the knowledge text
//! plus reference map consumed by the generation step. Shard searches are
//! independent and read-only, so they run in parallel; completion order does
//! not matter because the merge re-sorts globally by distance.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use onboard_config::constants::retrieval;
use onboard_config::RetrievalSettings;
use onboard_core::EmbeddingProvider;

use crate::shard::{Hit, ShardCatalog};
use crate::RagError;

/// Retriever configuration
#[derive(Debug, Clone)]
pub struct RetrieverConfig {
    /// Candidates requested per shard and kept after the global merge
    pub top_k: usize,
    /// Maximum acceptable distance; candidates farther than this are
    /// dropped (distance semantics, not a similarity floor)
    pub score_threshold: f32,
    /// Timeout for the embedding provider call
    pub embed_timeout: Duration,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            top_k: retrieval::DEFAULT_TOP_K,
            score_threshold: retrieval::DEFAULT_SCORE_THRESHOLD,
            embed_timeout: Duration::from_secs(retrieval::DEFAULT_EMBED_TIMEOUT_SECS),
        }
    }
}

impl From<&RetrievalSettings> for RetrieverConfig {
    fn from(settings: &RetrievalSettings) -> Self {
        Self {
            top_k: settings.top_k,
            score_threshold: settings.score_threshold,
            embed_timeout: Duration::from_secs(settings.embed_timeout_secs),
        }
    }
}

/// Successful retrieval: rendered knowledge plus the reference map
#[derive(Debug, Clone)]
pub struct Retrieval {
    /// Numbered Q/A blocks in final rank order, ready for the generator
    pub knowledge: String,
    /// Cited source documents, title -> url
    pub reference: HashMap<String, String>,
    /// Surviving hits in final rank order
    pub hits: Vec<Hit>,
}

/// Retrieval coordinator over the shard catalog
pub struct ShardRetriever {
    catalog: Arc<ShardCatalog>,
    embedder: Arc<dyn EmbeddingProvider>,
    config: RetrieverConfig,
}

impl ShardRetriever {
    pub fn new(
        catalog: Arc<ShardCatalog>,
        embedder: Arc<dyn EmbeddingProvider>,
        config: RetrieverConfig,
    ) -> Self {
        Self {
            catalog,
            embedder,
            config,
        }
    }

    /// Retrieve knowledge for a question
    ///
    /// `Ok(None)` is the explicit "no relevant knowledge" outcome and is
    /// distinct from an error: embedding failures and timeouts surface as
    /// `Err`, an empty shard directory or zero surviving candidates as
    /// `Ok(None)`.
    pub async fn retrieve(&self, question: &str) -> Result<Option<Retrieval>, RagError> {
        let embedding = tokio::time::timeout(self.config.embed_timeout, self.embedder.embed(question))
            .await
            .map_err(|_| RagError::Timeout)?
            .map_err(|e| RagError::Embedding(e.to_string()))?;

        if embedding.len() != self.embedder.dim() {
            return Err(RagError::Embedding(format!(
                "Provider returned {} dimensions, expected {}",
                embedding.len(),
                self.embedder.dim()
            )));
        }

        let catalog = Arc::clone(&self.catalog);
        let shards = tokio::task::spawn_blocking(move || catalog.load_all())
            .await
            .map_err(|e| RagError::Search(format!("Shard load task failed: {e}")))?;

        if shards.is_empty() {
            tracing::debug!("No usable shards");
            return Ok(None);
        }

        // Fan out one blocking search task per shard, then join. If the
        // caller drops the returned future the joins are abandoned and all
        // results discarded; the blocking tasks themselves run to
        // completion but their output goes nowhere.
        let top_k = self.config.top_k;
        let embedding = Arc::new(embedding);
        let searches = shards.into_iter().map(|shard| {
            let embedding = Arc::clone(&embedding);
            tokio::task::spawn_blocking(move || match shard.search(&embedding, top_k) {
                Ok(hits) => hits,
                Err(e) => {
                    tracing::warn!(shard = %shard.name, error = %e, "Shard search failed");
                    Vec::new()
                },
            })
        });

        let mut all_hits = Vec::new();
        for joined in join_all(searches).await {
            let hits =
                joined.map_err(|e| RagError::Search(format!("Shard search task failed: {e}")))?;
            all_hits.extend(hits);
        }

        let ranked = merge_and_rank(all_hits, self.config.score_threshold, top_k);
        if ranked.is_empty() {
            tracing::debug!(question, "No candidates under the distance threshold");
            return Ok(None);
        }

        Ok(Some(render(ranked)))
    }
}

/// Merge candidates from all shards: drop those beyond the distance
/// threshold, sort ascending (closer first) and truncate to `top_k`
fn merge_and_rank(mut hits: Vec<Hit>, score_threshold: f32, top_k: usize) -> Vec<Hit> {
    hits.retain(|h| h.score <= score_threshold);
    hits.sort_by(|a, b| a.score.total_cmp(&b.score));
    hits.truncate(top_k);
    hits
}

/// Render the knowledge text and reference map in final rank order
///
/// Later hits from the same shard overwrite earlier reference entries;
/// the url is shard-invariant, so last-wins is harmless.
fn render(hits: Vec<Hit>) -> Retrieval {
    let knowledge = hits
        .iter()
        .enumerate()
        .map(|(i, h)| {
            format!(
                "{}. ({}) Question: {}\n   Answer: {}",
                i + 1,
                h.shard,
                h.question,
                h.answer
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut reference = HashMap::new();
    for hit in &hits {
        reference.insert(hit.title.clone(), hit.url.clone());
    }

    Retrieval {
        knowledge,
        reference,
        hits,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shard::{write_shard, ShardDoc};
    use async_trait::async_trait;
    use tempfile::tempdir;

    fn hit(score: f32, shard: &str) -> Hit {
        Hit {
            score,
            shard: shard.to_string(),
            question: format!("q-{shard}-{score}"),
            answer: format!("a-{shard}-{score}"),
            title: shard.to_string(),
            url: format!("http://localhost:5000/pdfs/{shard}.pdf"),
        }
    }

    #[test]
    fn test_merge_is_globally_sorted_and_truncated() {
        let hits = vec![hit(0.2, "A"), hit(0.5, "A"), hit(0.3, "B")];
        let ranked = merge_and_rank(hits, 1.0, 2);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].score, 0.2);
        assert_eq!(ranked[0].shard, "A");
        assert_eq!(ranked[1].score, 0.3);
        assert_eq!(ranked[1].shard, "B");
    }

    #[test]
    fn test_threshold_is_a_maximum_distance() {
        let hits = vec![hit(0.9, "A"), hit(1.0, "A"), hit(1.1, "B")];
        let ranked = merge_and_rank(hits, 1.0, 10);
        // exactly at the threshold survives, beyond it does not
        assert_eq!(ranked.len(), 2);
        assert!(ranked.iter().all(|h| h.score <= 1.0));
    }

    #[test]
    fn test_render_numbers_blocks_and_collects_references() {
        let retrieval = render(vec![hit(0.1, "VPN Guide"), hit(0.2, "Email Setup")]);

        assert!(retrieval.knowledge.starts_with("1. (VPN Guide) Question:"));
        assert!(retrieval.knowledge.contains("\n\n2. (Email Setup) Question:"));
        assert!(retrieval.knowledge.contains("\n   Answer:"));
        assert_eq!(retrieval.reference.len(), 2);
        assert_eq!(
            retrieval.reference["VPN Guide"],
            "http://localhost:5000/pdfs/VPN Guide.pdf"
        );
    }

    struct FixedEmbedder(Vec<f32>);

    #[async_trait]
    impl EmbeddingProvider for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, onboard_core::Error> {
            Ok(self.0.clone())
        }

        fn dim(&self) -> usize {
            self.0.len()
        }
    }

    struct LyingEmbedder;

    #[async_trait]
    impl EmbeddingProvider for LyingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, onboard_core::Error> {
            Ok(vec![0.0, 0.0])
        }

        fn dim(&self) -> usize {
            4
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, onboard_core::Error> {
            Err(onboard_core::Error::Rag("provider down".to_string()))
        }

        fn dim(&self) -> usize {
            2
        }
    }

    #[tokio::test]
    async fn test_empty_shard_directory_returns_none() {
        let dir = tempdir().unwrap();
        let retriever = ShardRetriever::new(
            Arc::new(ShardCatalog::new(dir.path(), "http://localhost:5000/pdfs")),
            Arc::new(FixedEmbedder(vec![0.0, 0.0])),
            RetrieverConfig::default(),
        );

        let result = retriever.retrieve("anything").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_retrieve_merges_across_shards() {
        let dir = tempdir().unwrap();
        let docs = |name: &str| {
            vec![ShardDoc {
                id: format!("{name}-1"),
                question: format!("Question about {name}"),
                answer: format!("Answer about {name}"),
            }]
        };
        // Near shard sits at distance 0 from the query, Far at 0.02
        write_shard(dir.path(), "Near", &docs("Near"), &[vec![0.0, 0.0]]).unwrap();
        write_shard(dir.path(), "Far", &docs("Far"), &[vec![0.1, 0.1]]).unwrap();

        let retriever = ShardRetriever::new(
            Arc::new(ShardCatalog::new(dir.path(), "http://localhost:5000/pdfs")),
            Arc::new(FixedEmbedder(vec![0.0, 0.0])),
            RetrieverConfig::default(),
        );

        let retrieval = retriever.retrieve("onboarding").await.unwrap().unwrap();
        assert_eq!(retrieval.hits.len(), 2);
        assert_eq!(retrieval.hits[0].shard, "Near");
        assert_eq!(retrieval.hits[1].shard, "Far");
        assert!(retrieval.reference.contains_key("Near"));
        assert!(retrieval.reference.contains_key("Far"));
    }

    #[tokio::test]
    async fn test_all_candidates_beyond_threshold_returns_none() {
        let dir = tempdir().unwrap();
        let docs = vec![ShardDoc {
            id: "d1".to_string(),
            question: "q".to_string(),
            answer: "a".to_string(),
        }];
        write_shard(dir.path(), "Distant", &docs, &[vec![10.0, 10.0]]).unwrap();

        let retriever = ShardRetriever::new(
            Arc::new(ShardCatalog::new(dir.path(), "http://localhost:5000/pdfs")),
            Arc::new(FixedEmbedder(vec![0.0, 0.0])),
            RetrieverConfig::default(),
        );

        let result = retriever.retrieve("onboarding").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_embedding_width_mismatch_is_an_error() {
        let dir = tempdir().unwrap();
        let retriever = ShardRetriever::new(
            Arc::new(ShardCatalog::new(dir.path(), "http://localhost:5000/pdfs")),
            Arc::new(LyingEmbedder),
            RetrieverConfig::default(),
        );

        let result = retriever.retrieve("anything").await;
        assert!(matches!(result, Err(RagError::Embedding(_))));
    }

    #[tokio::test]
    async fn test_embedding_failure_is_an_error_not_empty() {
        let dir = tempdir().unwrap();
        let retriever = ShardRetriever::new(
            Arc::new(ShardCatalog::new(dir.path(), "http://localhost:5000/pdfs")),
            Arc::new(FailingEmbedder),
            RetrieverConfig::default(),
        );

        let result = retriever.retrieve("anything").await;
        assert!(matches!(result, Err(RagError::Embedding(_))));
    }
}
