//! Shared conversation types
//!
//! The reconciliation result is the single authoritative artifact produced
//! for one user turn. It is persisted and returned by the (external) request
//! layer; nothing in this engine exposes a partially filled result.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Chat mode for one user turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    /// Plain generation, no retrieval step
    General,
    /// Retrieval-augmented answer
    Rag,
    /// Retrieval-augmented answer rendered as an ordered checklist
    Checklist,
}

impl ChatMode {
    /// Whether this mode runs the retrieval step before generation
    pub fn uses_retrieval(&self) -> bool {
        matches!(self, ChatMode::Rag | ChatMode::Checklist)
    }
}

/// One item of an extracted checklist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    /// Rendered item text, e.g. "Step 1: Install the VPN client"
    pub item: String,
    /// Completion flag, always false when freshly extracted
    #[serde(default)]
    pub done: bool,
}

impl ChecklistItem {
    pub fn new(item: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            done: false,
        }
    }
}

/// Final reconciled answer for one user turn
///
/// Invariants:
/// - `reference` keys are document titles, values fully-qualified URLs;
///   an empty map is valid and means "no citable evidence".
/// - `need_human = true` is terminal for the turn; no automated retry
///   happens within the same reconciliation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    /// Final answer text
    pub answer: String,
    /// Cited documents, title -> url
    #[serde(default)]
    pub reference: HashMap<String, String>,
    /// Ordered checklist items (empty outside checklist mode)
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
    /// Escalation flag: a human must review this turn
    #[serde(default)]
    pub need_human: bool,
}

impl ReconciliationResult {
    /// Degraded answer that must be routed to a human
    pub fn escalated(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            reference: HashMap::new(),
            checklist: Vec::new(),
            need_human: true,
        }
    }
}
