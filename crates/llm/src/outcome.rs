//! Generation output parsing
//!
//! The generator is asked for a JSON object with `answer` and `reference`
//! keys, but its output is untrusted. One parse function classifies the raw
//! text into a tagged outcome the reconciler matches on exhaustively;
//! a parse failure is a state, not an error.

use std::collections::HashMap;

use serde::Deserialize;

/// Classified generation output
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    /// The generator honored the reply contract
    Structured {
        answer: String,
        /// Self-declared citations, title -> url; may be empty
        reference: HashMap<String, String>,
    },
    /// Anything else: the raw text is the best available answer, but it
    /// cannot be trusted to have declared its own citations
    Unstructured { text: String },
}

#[derive(Deserialize)]
struct StructuredReply {
    answer: String,
    #[serde(default)]
    reference: HashMap<String, String>,
}

/// Parse raw generation text into an outcome
pub fn parse_outcome(raw: &str) -> GenerationOutcome {
    let trimmed = raw.trim();
    match serde_json::from_str::<StructuredReply>(trimmed) {
        Ok(reply) => GenerationOutcome::Structured {
            answer: reply.answer,
            reference: reply.reference,
        },
        Err(_) => GenerationOutcome::Unstructured {
            text: trimmed.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_reply() {
        let outcome =
            parse_outcome(r#"{"answer": "X", "reference": {"VPN Guide": "http://x/vpn.pdf"}}"#);
        match outcome {
            GenerationOutcome::Structured { answer, reference } => {
                assert_eq!(answer, "X");
                assert_eq!(reference["VPN Guide"], "http://x/vpn.pdf");
            },
            GenerationOutcome::Unstructured { .. } => panic!("expected structured outcome"),
        }
    }

    #[test]
    fn test_missing_reference_defaults_to_empty() {
        let outcome = parse_outcome(r#"{"answer": "X"}"#);
        assert_eq!(
            outcome,
            GenerationOutcome::Structured {
                answer: "X".to_string(),
                reference: HashMap::new(),
            }
        );
    }

    #[test]
    fn test_plain_text_is_unstructured() {
        let outcome = parse_outcome("Sorry, here is your answer in prose.");
        assert_eq!(
            outcome,
            GenerationOutcome::Unstructured {
                text: "Sorry, here is your answer in prose.".to_string(),
            }
        );
    }

    #[test]
    fn test_json_without_answer_is_unstructured() {
        let outcome = parse_outcome(r#"{"reference": {}}"#);
        assert!(matches!(outcome, GenerationOutcome::Unstructured { .. }));
    }

    #[test]
    fn test_non_object_json_is_unstructured() {
        assert!(matches!(
            parse_outcome(r#"["a", "b"]"#),
            GenerationOutcome::Unstructured { .. }
        ));
        assert!(matches!(
            parse_outcome(r#""just a string""#),
            GenerationOutcome::Unstructured { .. }
        ));
    }
}
