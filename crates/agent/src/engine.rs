//! Per-turn orchestration
//!
//! One synchronous call chain per user turn: retrieve (for modes that use
//! retrieval), generate, reconcile. Empty retrieval short-circuits before
//! the generator is ever called; provider failures surface as errors,
//! never as half-populated results.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use onboard_core::{ChatMode, ReconciliationResult};
use onboard_llm::{parse_outcome, LlmBackend, LlmError, PromptBuilder};
use onboard_rag::ShardRetriever;

use crate::reconciler;
use crate::AgentError;

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Timeout for one generation call
    pub generation_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            generation_timeout: Duration::from_secs(
                onboard_config::constants::llm::DEFAULT_TIMEOUT_SECS,
            ),
        }
    }
}

/// Answers one onboarding question per call
pub struct AssistantEngine {
    retriever: Arc<ShardRetriever>,
    backend: Arc<dyn LlmBackend>,
    config: EngineConfig,
}

impl AssistantEngine {
    pub fn new(
        retriever: Arc<ShardRetriever>,
        backend: Arc<dyn LlmBackend>,
        config: EngineConfig,
    ) -> Self {
        Self {
            retriever,
            backend,
            config,
        }
    }

    /// Run one user turn
    pub async fn answer(
        &self,
        question: &str,
        mode: ChatMode,
    ) -> Result<ReconciliationResult, AgentError> {
        let retrieval = if mode.uses_retrieval() {
            match self.retriever.retrieve(question).await? {
                Some(retrieval) => Some(retrieval),
                None => {
                    tracing::info!(?mode, "No relevant knowledge, skipping generation");
                    return Ok(reconciler::degraded());
                },
            }
        } else {
            None
        };

        let knowledge = retrieval.as_ref().map(|r| r.knowledge.as_str());
        let retrieval_reference: HashMap<String, String> = retrieval
            .as_ref()
            .map(|r| r.reference.clone())
            .unwrap_or_default();

        let messages = PromptBuilder::build(mode, question, knowledge);
        let generated =
            tokio::time::timeout(self.config.generation_timeout, self.backend.generate(&messages))
                .await
                .map_err(|_| AgentError::Generation(LlmError::Timeout))??;

        tracing::debug!(
            ?mode,
            model = self.backend.model_name(),
            total_time_ms = generated.total_time_ms,
            "Generation finished"
        );

        let outcome = parse_outcome(&generated.text);
        Ok(reconciler::reconcile(mode, outcome, &retrieval_reference))
    }
}
