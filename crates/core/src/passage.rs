//! Retrieved passages and their ranking metadata

use serde::{Deserialize, Serialize};

/// Metadata attached to a ranked passage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PassageMeta {
    pub chunk_index: usize,
    pub total_chunks: usize,
    /// Raw vector distance from the index
    pub distance: f64,
    /// Combined multi-signal score, higher is better
    pub relevance_score: f64,
}

/// A passage after ranking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Passage {
    pub text: String,
    pub meta: PassageMeta,
}

/// A raw nearest-neighbour hit from the vector index, before ranking
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedChunk {
    pub text: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
    pub distance: f64,
}
