//! Response reconciliation and per-turn orchestration
//!
//! Turns raw generation output plus retrieval evidence into the single
//! authoritative `ReconciliationResult` for a user turn: final answer,
//! merged references, optional checklist, escalation flag.

pub mod checklist;
pub mod engine;
pub mod reconciler;

pub use checklist::{extract_checklist, ChecklistParse};
pub use engine::{AssistantEngine, EngineConfig};
pub use reconciler::{reconcile, NO_KNOWLEDGE_ANSWER};

use thiserror::Error;

use onboard_llm::LlmError;
use onboard_rag::RagError;

/// Agent errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Retrieval failed: {0}")]
    Retrieval(#[from] RagError),

    #[error("Generation failed: {0}")]
    Generation(#[from] LlmError),
}

impl From<AgentError> for onboard_core::Error {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::Retrieval(RagError::Timeout) | AgentError::Generation(LlmError::Timeout) => {
                onboard_core::Error::ProviderTimeout
            },
            other => onboard_core::Error::Agent(other.to_string()),
        }
    }
}
