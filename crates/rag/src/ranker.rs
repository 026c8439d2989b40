//! Multi-signal passage ranking
//!
//! Combines distance-derived similarity with positional, length and
//! lexical-overlap signals into one relevance score per candidate. The
//! score is stored in passage metadata and reused later by the context
//! selector's relevance gate.

use std::collections::HashSet;

use tracing::debug;
use tutor_core::{Passage, PassageMeta, RetrievedChunk};

/// Ranking signal weights and constants
#[derive(Debug, Clone)]
pub struct RankerConfig {
    pub similarity_weight: f64,
    pub position_weight: f64,
    pub recency_weight: f64,
    pub length_weight: f64,
    pub overlap_weight: f64,
    /// Word count at which the length signal saturates
    pub length_norm_words: f64,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            similarity_weight: 0.4,
            position_weight: 0.2,
            recency_weight: 0.1,
            length_weight: 0.15,
            overlap_weight: 0.15,
            length_norm_words: 100.0,
        }
    }
}

/// Ranks retrieval candidates by combined relevance
#[derive(Debug, Clone, Default)]
pub struct PassageRanker {
    config: RankerConfig,
}

impl PassageRanker {
    pub fn new(config: RankerConfig) -> Self {
        Self { config }
    }

    /// Score and order candidates, best first, keeping at most `top_n`.
    ///
    /// Ties preserve candidate order (stable sort).
    pub fn rank(&self, query: &str, candidates: Vec<RetrievedChunk>, top_n: usize) -> Vec<Passage> {
        if candidates.is_empty() {
            return Vec::new();
        }

        let min_dist = candidates
            .iter()
            .map(|c| c.distance)
            .fold(f64::INFINITY, f64::min);
        let max_dist = candidates
            .iter()
            .map(|c| c.distance)
            .fold(f64::NEG_INFINITY, f64::max);
        let dist_range = max_dist - min_dist;

        let query_words = query_tokens(query);

        let mut passages: Vec<Passage> = candidates
            .into_iter()
            .map(|chunk| {
                // All-equal distances carry no signal; treated as the
                // similarity floor
                let norm_dist = if dist_range > 0.0 {
                    (chunk.distance - min_dist) / dist_range
                } else {
                    1.0
                };
                let similarity = 1.0 - norm_dist * 0.7;

                let position = chunk.chunk_index as f64 / chunk.total_chunks.max(1) as f64;
                let word_count = chunk.text.split_whitespace().count() as f64;
                let length = (word_count / self.config.length_norm_words).min(1.0);
                let overlap = if query_words.is_empty() {
                    0.0
                } else {
                    lexical_overlap(&query_words, &chunk.text) as f64 / query_words.len() as f64
                };

                let score = similarity * self.config.similarity_weight
                    + (1.0 - position) * self.config.position_weight
                    + self.config.recency_weight
                    + length * self.config.length_weight
                    + overlap * self.config.overlap_weight;

                Passage {
                    text: chunk.text,
                    meta: PassageMeta {
                        chunk_index: chunk.chunk_index,
                        total_chunks: chunk.total_chunks,
                        distance: chunk.distance,
                        relevance_score: score,
                    },
                }
            })
            .collect();

        passages.sort_by(|a, b| b.meta.relevance_score.total_cmp(&a.meta.relevance_score));
        passages.truncate(top_n);
        debug!(
            kept = passages.len(),
            top_score = passages.first().map(|p| p.meta.relevance_score),
            "passages ranked"
        );
        passages
    }
}

/// Lowercase word set of a query, punctuation trimmed
pub fn query_tokens(query: &str) -> HashSet<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| c.is_ascii_punctuation()).to_string())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Number of query tokens appearing in the candidate text
pub fn lexical_overlap(query_words: &HashSet<String>, text: &str) -> usize {
    let text_words: HashSet<String> = query_tokens(text);
    query_words.intersection(&text_words).count()
}
