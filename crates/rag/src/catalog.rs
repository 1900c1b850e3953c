//! Document catalog with combined keyword/title similarity search
//!
//! Ranks catalog entries against a free-text query using multi-hot keyword
//! vectors (Jaccard + cosine) blended with title word overlap. Used for
//! document discovery, not for question answering.

use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use onboard_config::constants::{encoder, scorer};
use onboard_config::ScorerSettings;

use crate::keyword::{self, encode_keywords, extract_keywords, EncodedVector, Vocabulary};

/// Scorer configuration
#[derive(Debug, Clone)]
pub struct ScorerConfig {
    /// Jaccard share of the keyword similarity
    pub jaccard_weight: f32,
    /// Cosine share of the keyword similarity
    pub cosine_weight: f32,
    /// Keyword similarity share of the final score
    pub keyword_weight: f32,
    /// Title similarity share of the final score
    pub title_weight: f32,
    /// Scores strictly below this clamp to exactly 0.0
    pub min_score: f32,
    /// Search keeps entries scoring strictly above this
    pub search_threshold: f32,
    /// Search result count
    pub search_top_k: usize,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            jaccard_weight: scorer::JACCARD_WEIGHT,
            cosine_weight: scorer::COSINE_WEIGHT,
            keyword_weight: scorer::KEYWORD_WEIGHT,
            title_weight: scorer::TITLE_WEIGHT,
            min_score: scorer::MIN_SCORE,
            search_threshold: scorer::SEARCH_THRESHOLD,
            search_top_k: scorer::SEARCH_TOP_K,
        }
    }
}

impl From<&ScorerSettings> for ScorerConfig {
    fn from(settings: &ScorerSettings) -> Self {
        Self {
            jaccard_weight: settings.jaccard_weight,
            cosine_weight: settings.cosine_weight,
            keyword_weight: settings.keyword_weight,
            title_weight: settings.title_weight,
            min_score: settings.min_score,
            search_threshold: settings.search_threshold,
            search_top_k: settings.search_top_k,
        }
    }
}

/// One catalog entry, created on ingestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub title: String,
    /// Raw comma-separated keyword text as supplied at ingestion
    pub keywords: String,
    /// Multi-hot encoding of the keyword list
    pub encoded: EncodedVector,
    /// Path to the source document
    pub content_path: String,
    pub date: Option<NaiveDate>,
}

/// One ranked search result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedEntry {
    pub id: String,
    pub title: String,
    pub content_path: String,
    pub score: f32,
    pub date: Option<NaiveDate>,
}

/// Combined similarity of a query against one catalog entry, in [0, 1]
///
/// Pads the shorter vector with zeros to the longer length before
/// comparison; vectors from different vocabulary generations therefore
/// compare without panicking (the catalog re-encodes on vocabulary change,
/// so a mismatch here is a transient race, not steady state).
pub fn similarity(
    config: &ScorerConfig,
    query_bits: &[u8],
    entry_bits: &[u8],
    query_text: &str,
    entry_title: &str,
) -> f32 {
    let len = query_bits.len().max(entry_bits.len());
    let bit = |bits: &[u8], i: usize| bits.get(i).copied().unwrap_or(0);

    let q_on: Vec<usize> = (0..len).filter(|&i| bit(query_bits, i) == 1).collect();
    let d_on: Vec<usize> = (0..len).filter(|&i| bit(entry_bits, i) == 1).collect();

    let intersection = q_on.iter().filter(|i| d_on.contains(i)).count();

    let query_words = keyword::tokenize(query_text);
    let title_words = keyword::tokenize(entry_title);
    let common_words = query_words
        .iter()
        .filter(|w| title_words.contains(w))
        .collect::<std::collections::HashSet<_>>()
        .len();

    // Disjoint keyword bits and disjoint titles cannot produce signal;
    // skip the arithmetic rather than emit a spurious near-zero score.
    if intersection == 0 && common_words == 0 {
        return 0.0;
    }

    let union = q_on.len() + d_on.len() - intersection;
    let jaccard = if union == 0 {
        0.0
    } else {
        intersection as f32 / union as f32
    };

    let cosine = if q_on.is_empty() || d_on.is_empty() {
        0.0
    } else {
        intersection as f32 / ((q_on.len() as f32).sqrt() * (d_on.len() as f32).sqrt())
    };

    let keyword_sim = config.jaccard_weight * jaccard + config.cosine_weight * cosine;

    let unique_query_words = query_words
        .iter()
        .collect::<std::collections::HashSet<_>>()
        .len();
    let title_sim = if unique_query_words == 0 {
        0.0
    } else {
        common_words as f32 / unique_query_words as f32
    };

    let score = config.keyword_weight * keyword_sim + config.title_weight * title_sim;
    clamp_noise(score, config.min_score)
}

/// Scores strictly below `min_score` are noise, not weak signal
fn clamp_noise(score: f32, min_score: f32) -> f32 {
    if score < min_score {
        0.0
    } else {
        score
    }
}

struct CatalogState {
    vocabulary: Vocabulary,
    entries: Vec<CatalogEntry>,
}

/// Document catalog
///
/// Read-mostly: queries take the read lock, ingestion/removal takes the
/// write lock and re-encodes every entry before releasing it, so queries
/// never observe a half-applied vocabulary change.
pub struct DocumentCatalog {
    state: Arc<RwLock<CatalogState>>,
    config: ScorerConfig,
    search_fallback_tokens: usize,
    catalog_fallback_tokens: usize,
}

impl DocumentCatalog {
    pub fn new(vocabulary: Vocabulary, config: ScorerConfig) -> Self {
        Self {
            state: Arc::new(RwLock::new(CatalogState {
                vocabulary,
                entries: Vec::new(),
            })),
            config,
            search_fallback_tokens: encoder::SEARCH_FALLBACK_TOKENS,
            catalog_fallback_tokens: encoder::CATALOG_FALLBACK_TOKENS,
        }
    }

    /// Ingest a document: extend the vocabulary with its keywords, then
    /// re-encode every entry against the widened vocabulary
    pub fn add_entry(
        &self,
        id: impl Into<String>,
        title: impl Into<String>,
        keywords: impl Into<String>,
        content_path: impl Into<String>,
        date: Option<NaiveDate>,
    ) {
        let title = title.into();
        let keywords = keywords.into();
        let mut state = self.state.write();

        let keyword_list =
            keyword_list(&keywords, &title, &state.vocabulary, self.catalog_fallback_tokens);
        state.vocabulary.add_terms(keyword_list);

        let encoded = EncodedVector::zeroed(&state.vocabulary);
        state.entries.push(CatalogEntry {
            id: id.into(),
            title,
            keywords,
            encoded,
            content_path: content_path.into(),
            date,
        });

        Self::re_encode_locked(&mut state, self.catalog_fallback_tokens);
        tracing::debug!(
            entries = state.entries.len(),
            vocabulary_len = state.vocabulary.len(),
            "Catalog entry added"
        );
    }

    /// Remove a document by id; the vocabulary keeps its terms (index
    /// stability for the remaining entries matters more than width)
    pub fn remove_entry(&self, id: &str) -> bool {
        let mut state = self.state.write();
        let before = state.entries.len();
        state.entries.retain(|e| e.id != id);
        state.entries.len() != before
    }

    /// Re-encode all entries against the current vocabulary
    pub fn re_encode_all(&self) {
        let mut state = self.state.write();
        Self::re_encode_locked(&mut state, self.catalog_fallback_tokens);
    }

    fn re_encode_locked(state: &mut CatalogState, fallback_tokens: usize) {
        let vocabulary = state.vocabulary.clone();
        for entry in &mut state.entries {
            let list = keyword_list(&entry.keywords, &entry.title, &vocabulary, fallback_tokens);
            entry.encoded = encode_keywords(&list, &vocabulary);
        }
    }

    /// Rank catalog entries against a query
    ///
    /// Keeps entries scoring strictly above the search threshold, sorted
    /// descending with stable tie-break on catalog order, truncated to the
    /// configured result count.
    pub fn search(&self, query: &str) -> Vec<RankedEntry> {
        let state = self.state.read();
        let query_encoded = crate::keyword::encode(
            query,
            &state.vocabulary,
            self.search_fallback_tokens,
        );

        let mut ranked: Vec<RankedEntry> = state
            .entries
            .iter()
            .map(|entry| RankedEntry {
                id: entry.id.clone(),
                title: entry.title.clone(),
                content_path: entry.content_path.clone(),
                score: similarity(
                    &self.config,
                    &query_encoded.bits,
                    &entry.encoded.bits,
                    query,
                    &entry.title,
                ),
                date: entry.date,
            })
            .filter(|r| r.score > self.config.search_threshold)
            .collect();

        // sort_by is stable: equal scores keep catalog order
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked.truncate(self.config.search_top_k);
        ranked
    }

    /// Snapshot of the current entries
    pub fn entries(&self) -> Vec<CatalogEntry> {
        self.state.read().entries.clone()
    }

    pub fn vocabulary_version(&self) -> u64 {
        self.state.read().vocabulary.version()
    }
}

/// Keyword list for an entry: comma-split raw text, falling back to
/// extraction from the title when no keywords were supplied
fn keyword_list(
    keywords: &str,
    title: &str,
    vocabulary: &Vocabulary,
    fallback_tokens: usize,
) -> Vec<String> {
    let list: Vec<String> = keywords
        .split(',')
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect();
    if list.is_empty() {
        extract_keywords(title, vocabulary, fallback_tokens)
    } else {
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> DocumentCatalog {
        let catalog = DocumentCatalog::new(Vocabulary::default(), ScorerConfig::default());
        catalog.add_entry(
            "doc-1",
            "VPN Setup Guide",
            "vpn, remote access",
            "pdfs/VPN Setup Guide.pdf",
            None,
        );
        catalog.add_entry(
            "doc-2",
            "Printing Quick Start",
            "printing, printer queue",
            "pdfs/Printing Quick Start.pdf",
            None,
        );
        catalog
    }

    #[test]
    fn test_clamp_boundary_is_exclusive_below() {
        assert_eq!(clamp_noise(0.049, 0.05), 0.0);
        assert_eq!(clamp_noise(0.05, 0.05), 0.05);
        assert!(clamp_noise(0.051, 0.05) > 0.0);
    }

    #[test]
    fn test_disjoint_vectors_and_titles_score_zero() {
        let config = ScorerConfig::default();
        let score = similarity(&config, &[1, 0], &[0, 1], "wifi password", "Parking Permit");
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_identical_vectors_and_title_score_one() {
        let config = ScorerConfig::default();
        let score = similarity(&config, &[1, 1], &[1, 1], "vpn guide", "vpn guide");
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_query_vector_with_title_overlap_scores_finite() {
        let config = ScorerConfig::default();
        // no on bits on the query side, but the title shares a word, so
        // the score passes the short-circuit and reaches the cosine term
        let score = similarity(&config, &[0, 0], &[1, 0], "guide", "VPN Setup Guide");
        assert!(score.is_finite());
        assert!(score >= 0.0);
        // keyword similarity contributes nothing, title overlap does
        assert_eq!(score, 0.25);
    }

    #[test]
    fn test_length_mismatch_pads_shorter() {
        let config = ScorerConfig::default();
        // same on-bits, one vector from an older (shorter) vocabulary
        let a = similarity(&config, &[1, 0], &[1, 0, 0, 0], "vpn", "vpn");
        let b = similarity(&config, &[1, 0, 0, 0], &[1, 0, 0, 0], "vpn", "vpn");
        assert_eq!(a, b);
    }

    #[test]
    fn test_title_similarity_is_directional() {
        let config = ScorerConfig::default();
        // denominator is the query word count, so swapping query text and
        // title changes the score
        let forward = similarity(&config, &[1], &[1], "vpn setup guide for staff", "vpn setup");
        let backward = similarity(&config, &[1], &[1], "vpn setup", "vpn setup guide for staff");
        assert_ne!(forward, backward);
        assert!(backward > forward);
    }

    #[test]
    fn test_search_ranks_matching_entry_first() {
        let results = catalog().search("how to set up vpn remote access");
        assert!(!results.is_empty());
        assert_eq!(results[0].id, "doc-1");
        assert!(results[0].score > 0.1);
    }

    #[test]
    fn test_search_empty_for_unrelated_query() {
        let results = catalog().search("cafeteria lunch menu");
        assert!(results.is_empty());
    }

    #[test]
    fn test_re_encode_after_vocabulary_growth() {
        let catalog = catalog();
        let version_before = catalog.vocabulary_version();
        catalog.add_entry(
            "doc-3",
            "Wifi Onboarding",
            "wifi, eduroam",
            "pdfs/Wifi Onboarding.pdf",
            None,
        );
        assert!(catalog.vocabulary_version() > version_before);

        // all entries were re-encoded to the widened vocabulary
        let entries = catalog.entries();
        let width = entries[0].encoded.bits.len();
        assert!(entries.iter().all(|e| e.encoded.bits.len() == width));
    }

    #[test]
    fn test_remove_entry() {
        let catalog = catalog();
        assert!(catalog.remove_entry("doc-1"));
        assert!(!catalog.remove_entry("doc-1"));
        assert!(catalog.search("vpn remote access").is_empty());
    }
}
