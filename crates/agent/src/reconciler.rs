//! Response reconciliation
//!
//! One state machine over one generation attempt: the parse outcome fixes
//! the answer, reference source and escalation flag; the mode decides
//! whether a checklist is extracted. The retrieval reference map is the
//! fallback source of truth whenever the generator did not declare usable
//! citations of its own.

use std::collections::HashMap;

use onboard_core::{ChatMode, ReconciliationResult};
use onboard_llm::GenerationOutcome;

use crate::checklist::extract_checklist;

/// Degraded answer for retrieval modes when no relevant knowledge exists
pub const NO_KNOWLEDGE_ANSWER: &str =
    "Sorry, I couldn't find anything relevant in the onboarding documents. \
     Should I hand this over to a human?";

/// Reconcile one generation attempt into the final turn result
///
/// An unstructured response cannot be trusted to have self-declared its
/// citations, so it always escalates; a structured response with an empty
/// reference map falls back to the retrieval references (for `general`
/// turns the retrieval map is empty, so the generator's declaration stands
/// either way).
pub fn reconcile(
    mode: ChatMode,
    outcome: GenerationOutcome,
    retrieval_reference: &HashMap<String, String>,
) -> ReconciliationResult {
    let (answer, reference, need_human) = match outcome {
        GenerationOutcome::Structured { answer, reference } => {
            let reference = if reference.is_empty() {
                retrieval_reference.clone()
            } else {
                reference
            };
            (answer, reference, false)
        },
        GenerationOutcome::Unstructured { text } => {
            tracing::debug!("Unstructured generation output, escalating to human review");
            (text, retrieval_reference.clone(), true)
        },
    };

    let (answer, checklist) = match mode {
        ChatMode::Checklist => {
            let parsed = extract_checklist(&answer);
            (parsed.answer, parsed.items)
        },
        _ => (answer, Vec::new()),
    };

    ReconciliationResult {
        answer,
        reference,
        checklist,
        need_human,
    }
}

/// Result for retrieval modes when retrieval came back empty: generation
/// is skipped entirely and the turn escalates
pub fn degraded() -> ReconciliationResult {
    ReconciliationResult::escalated(NO_KNOWLEDGE_ANSWER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use onboard_llm::parse_outcome;

    fn retrieval_reference() -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert(
            "VPN Guide".to_string(),
            "http://localhost:5000/pdfs/VPN Guide.pdf".to_string(),
        );
        map
    }

    #[test]
    fn test_general_with_well_formed_json() {
        let outcome = parse_outcome(r#"{"answer": "X", "reference": {"T": "U"}}"#);
        let result = reconcile(ChatMode::General, outcome, &HashMap::new());

        assert_eq!(result.answer, "X");
        assert_eq!(result.reference["T"], "U");
        assert!(!result.need_human);
        assert!(result.checklist.is_empty());
    }

    #[test]
    fn test_structured_empty_reference_falls_back_to_retrieval() {
        let outcome = parse_outcome(r#"{"answer": "X", "reference": {}}"#);
        let result = reconcile(ChatMode::Rag, outcome, &retrieval_reference());

        assert_eq!(result.reference, retrieval_reference());
        assert!(!result.need_human);
    }

    #[test]
    fn test_structured_declared_reference_overrides_retrieval() {
        let outcome = parse_outcome(r#"{"answer": "X", "reference": {"Other": "http://o"}}"#);
        let result = reconcile(ChatMode::Rag, outcome, &retrieval_reference());

        assert_eq!(result.reference.len(), 1);
        assert_eq!(result.reference["Other"], "http://o");
    }

    #[test]
    fn test_unstructured_keeps_text_and_escalates() {
        let outcome = parse_outcome("Plain prose, no JSON.");
        let result = reconcile(ChatMode::Rag, outcome, &retrieval_reference());

        assert_eq!(result.answer, "Plain prose, no JSON.");
        assert_eq!(result.reference, retrieval_reference());
        assert!(result.need_human);
    }

    #[test]
    fn test_checklist_mode_extracts_items() {
        let outcome = parse_outcome(
            r#"{"answer": "Setup: step1. Install tool step2. Run tool", "reference": {}}"#,
        );
        let result = reconcile(ChatMode::Checklist, outcome, &retrieval_reference());

        assert_eq!(result.answer, "Setup");
        assert_eq!(result.checklist.len(), 2);
        assert_eq!(result.checklist[0].item, "Step 1: Install tool");
        assert_eq!(result.checklist[1].item, "Step 2: Run tool");
        assert!(result.checklist.iter().all(|i| !i.done));
        assert_eq!(result.reference, retrieval_reference());
    }

    #[test]
    fn test_degraded_turn() {
        let result = degraded();
        assert!(result.need_human);
        assert!(result.reference.is_empty());
        assert!(result.checklist.is_empty());
        assert_eq!(result.answer, NO_KNOWLEDGE_ANSWER);
    }
}
