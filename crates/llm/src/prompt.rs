//! Prompt construction
//!
//! Builds the system/user message pair for each chat mode. The system
//! prompt pins the JSON-only reply contract (`answer` string plus
//! `reference` object) the reconciler parses against; checklist mode adds
//! the `step1.` numbering instruction the extractor depends on.

use std::fmt;

use serde::{Deserialize, Serialize};

use onboard_core::ChatMode;

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

const PERSONA: &str = "You are the onboarding assistant for new faculty, staff and students \
in the School of Computer Science and Engineering (CSE).\n\
Objectives:\n\
1. Answer questions quickly and accurately about onboarding processes, policies, resources and systems.\n\
2. Cite the newest audited docs for consistency and authority.\n\
3. If unclear or out of scope, guide the user to submit an IT ticket or contact the department.\n\
4. Style: professional, concise, friendly, easy to understand, and in English.\n";

const CHECKLIST_INSTRUCTION: &str = "5. When answering procedural or instructional questions, \
provide a checklist starting with numbered steps like 'step1.', 'step2.', 'step3.', \
each describing a clear and actionable task.\n";

const REPLY_CONTRACT: &str = "\nYou must return ONLY valid JSON with two keys:\n\
  - \"answer\": string (the final answer)\n\
  - \"reference\": object (mapping title -> url of cited docs)\n\
Do not include code fences. Do not include any additional keys.";

/// Builds the message pair for one turn
pub struct PromptBuilder;

impl PromptBuilder {
    /// System prompt for a chat mode
    pub fn system_prompt(mode: ChatMode) -> String {
        match mode {
            ChatMode::Checklist => format!("{PERSONA}{CHECKLIST_INSTRUCTION}{REPLY_CONTRACT}"),
            _ => format!("{PERSONA}{REPLY_CONTRACT}"),
        }
    }

    /// User prompt for a chat mode, with retrieved knowledge where the
    /// mode uses retrieval
    pub fn user_prompt(mode: ChatMode, question: &str, knowledge: Option<&str>) -> String {
        match (mode, knowledge) {
            (ChatMode::General, _) => format!("Question: {question}"),
            (ChatMode::Rag, Some(knowledge)) => {
                format!("Question: {question}\n\nRelevant knowledge:\n{knowledge}")
            },
            (ChatMode::Checklist, Some(knowledge)) => format!(
                "Give me a checklist about Question: {question}\n\nRelevant knowledge:\n{knowledge}"
            ),
            // retrieval modes without knowledge should have been degraded
            // upstream; fall back to the bare question
            (_, None) => format!("Question: {question}"),
        }
    }

    /// Full message pair for one turn
    pub fn build(mode: ChatMode, question: &str, knowledge: Option<&str>) -> Vec<Message> {
        vec![
            Message::system(Self::system_prompt(mode)),
            Message::user(Self::user_prompt(mode, question, knowledge)),
        ]
    }
}
