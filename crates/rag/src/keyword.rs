//! Keyword extraction and multi-hot encoding
//!
//! The vocabulary is an ordered, deduplicated list of keyword strings; it
//! defines the width and index assignment of every encoded vector. Terms are
//! only ever appended, never reordered, and every append bumps the version
//! so the catalog can re-encode its entries against the new width.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("static regex"));

/// Tokenize into lowercase word tokens
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    WORD.find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Ordered, deduplicated keyword vocabulary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vocabulary {
    terms: Vec<String>,
    version: u64,
}

impl Vocabulary {
    /// Build a vocabulary from an initial term list, dropping duplicates
    /// while preserving first-seen order
    pub fn new(terms: impl IntoIterator<Item = String>) -> Self {
        let mut vocab = Self {
            terms: Vec::new(),
            version: 0,
        };
        vocab.add_terms(terms);
        vocab
    }

    /// Append terms not already present; bumps the version if anything
    /// was added
    pub fn add_terms(&mut self, terms: impl IntoIterator<Item = String>) -> usize {
        let mut added = 0;
        for term in terms {
            let term = term.trim().to_string();
            if term.is_empty() || self.terms.contains(&term) {
                continue;
            }
            self.terms.push(term);
            added += 1;
        }
        if added > 0 {
            self.version += 1;
        }
        added
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Monotonic counter bumped on every term addition
    pub fn version(&self) -> u64 {
        self.version
    }
}

/// Fixed-length multi-hot vector over a vocabulary
///
/// `bits[i]` is 1 iff term `i` of the vocabulary matched. Tagged with the
/// vocabulary version it was built against; the scorer pads mismatched
/// lengths defensively, but the catalog re-encodes on vocabulary changes so
/// padding only covers transient races.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedVector {
    pub bits: Vec<u8>,
    pub version: u64,
}

impl EncodedVector {
    /// All-zero vector for the given vocabulary
    pub fn zeroed(vocab: &Vocabulary) -> Self {
        Self {
            bits: vec![0; vocab.len()],
            version: vocab.version(),
        }
    }
}

/// Extract vocabulary keywords from free text
///
/// Policy, first non-empty stage wins:
/// 1. case-insensitive substring match of each vocabulary term;
/// 2. word tokens matched bidirectionally against terms (token in term or
///    term in token), deduplicated in token order;
/// 3. the first `fallback_tokens` raw tokens of the input.
///
/// Stage 3 returns raw tokens that are usually not vocabulary terms, so an
/// encoding of that result may be all zeros. That mirrors the catalog
/// semantics: an unmatchable query scores on title overlap only.
pub fn extract_keywords(text: &str, vocab: &Vocabulary, fallback_tokens: usize) -> Vec<String> {
    let text_lower = text.to_lowercase();

    let mut keywords: Vec<String> = vocab
        .terms()
        .iter()
        .filter(|term| text_lower.contains(&term.to_lowercase()))
        .cloned()
        .collect();

    if keywords.is_empty() {
        let tokens = tokenize(text);
        for token in &tokens {
            for term in vocab.terms() {
                let term_lower = term.to_lowercase();
                if (token.contains(&term_lower) || term_lower.contains(token.as_str()))
                    && !keywords.contains(term)
                {
                    keywords.push(term.clone());
                }
            }
        }

        if keywords.is_empty() {
            keywords = tokens.into_iter().take(fallback_tokens).collect();
        }
    }

    keywords
}

/// Encode a keyword list against a vocabulary
///
/// Keywords not present in the vocabulary are ignored.
pub fn encode_keywords(keywords: &[String], vocab: &Vocabulary) -> EncodedVector {
    let mut encoded = EncodedVector::zeroed(vocab);
    for keyword in keywords {
        if let Some(idx) = vocab.terms().iter().position(|t| t == keyword) {
            encoded.bits[idx] = 1;
        }
    }
    encoded
}

/// Extract keywords from text and encode them in one pass
pub fn encode(text: &str, vocab: &Vocabulary, fallback_tokens: usize) -> EncodedVector {
    let keywords = extract_keywords(text, vocab, fallback_tokens);
    encode_keywords(&keywords, vocab)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> Vocabulary {
        Vocabulary::new(
            ["vpn", "email", "printing", "file server"]
                .into_iter()
                .map(String::from),
        )
    }

    #[test]
    fn test_vocabulary_dedup_and_version() {
        let mut v = vocab();
        assert_eq!(v.len(), 4);
        assert_eq!(v.version(), 1);

        let added = v.add_terms(["vpn".to_string(), "wifi".to_string()]);
        assert_eq!(added, 1);
        assert_eq!(v.len(), 5);
        assert_eq!(v.version(), 2);

        // no-op additions do not bump the version
        assert_eq!(v.add_terms(["wifi".to_string()]), 0);
        assert_eq!(v.version(), 2);
    }

    #[test]
    fn test_exact_substring_match() {
        let keywords = extract_keywords("How do I set up the VPN on my laptop?", &vocab(), 3);
        assert_eq!(keywords, vec!["vpn".to_string()]);
    }

    #[test]
    fn test_partial_match_in_token_order() {
        // no term appears as a substring, but the term "file server"
        // contains the token "server"
        let keywords = extract_keywords("server room access", &vocab(), 3);
        assert_eq!(keywords, vec!["file server".to_string()]);
    }

    #[test]
    fn test_raw_token_fallback_respects_width() {
        let keywords = extract_keywords("quantum banana teleporter manual", &vocab(), 3);
        assert_eq!(
            keywords,
            vec![
                "quantum".to_string(),
                "banana".to_string(),
                "teleporter".to_string()
            ]
        );
    }

    #[test]
    fn test_encode_length_and_binary_values() {
        let v = vocab();
        let encoded = encode("vpn and printing", &v, 3);
        assert_eq!(encoded.bits.len(), v.len());
        assert!(encoded.bits.iter().all(|&b| b == 0 || b == 1));
        assert_eq!(encoded.bits, vec![1, 0, 1, 0]);
        assert_eq!(encoded.version, v.version());
    }

    #[test]
    fn test_fallback_tokens_encode_to_zeros() {
        let v = vocab();
        let encoded = encode("quantum banana", &v, 3);
        assert!(encoded.bits.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_encode_unknown_keywords_ignored() {
        let v = vocab();
        let encoded = encode_keywords(&["email".to_string(), "nonsense".to_string()], &v);
        assert_eq!(encoded.bits, vec![0, 1, 0, 0]);
    }
}
