//! In-process vector index
//!
//! Deterministic hashed bag-of-words embeddings with cosine distance. The
//! index lives behind the `VectorIndex` trait so a real vector database can
//! be swapped in without touching the retrieval pipeline.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, info};
use tutor_core::traits::VectorIndex;
use tutor_core::{Error, Result, RetrievedChunk};

const EMBEDDING_DIM: usize = 256;

/// Deterministic text embedder using feature hashing.
///
/// Tokens are hashed into a fixed number of buckets and the resulting
/// count vector is L2-normalized, so cosine distance reflects lexical
/// similarity. No model weights, fully reproducible.
#[derive(Debug, Clone, Default)]
pub struct HashingEmbedder;

impl HashingEmbedder {
    pub fn embed(&self, text: &str) -> Vec<f64> {
        let mut vector = vec![0.0f64; EMBEDDING_DIM];
        for token in text.to_lowercase().split_whitespace() {
            let token = token.trim_matches(|c: char| c.is_ascii_punctuation());
            if token.is_empty() {
                continue;
            }
            let bucket = fnv1a(token) as usize % EMBEDDING_DIM;
            vector[bucket] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

fn fnv1a(token: &str) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in token.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

fn cosine_distance(a: &[f64], b: &[f64]) -> f64 {
    // Both vectors are unit length, dot product is the cosine
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    1.0 - dot
}

#[derive(Debug, Clone)]
struct StoredChunk {
    text: String,
    embedding: Vec<f64>,
    chunk_index: usize,
    total_chunks: usize,
}

/// In-memory vector index keyed by collection name
#[derive(Debug, Default)]
pub struct InMemoryVectorIndex {
    embedder: HashingEmbedder,
    collections: RwLock<HashMap<String, Vec<StoredChunk>>>,
}

impl InMemoryVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn index(&self, chunks: &[String], collection: &str) -> Result<()> {
        if chunks.is_empty() {
            return Err(Error::Ingestion("no chunks to index".to_string()));
        }

        let total = chunks.len();
        let stored: Vec<StoredChunk> = chunks
            .iter()
            .enumerate()
            .map(|(i, text)| StoredChunk {
                text: text.clone(),
                embedding: self.embedder.embed(text),
                chunk_index: i,
                total_chunks: total,
            })
            .collect();

        self.collections
            .write()
            .insert(collection.to_string(), stored);
        info!(collection, chunks = total, "collection indexed");
        Ok(())
    }

    async fn query(&self, collection: &str, text: &str, n: usize) -> Result<Vec<RetrievedChunk>> {
        let collections = self.collections.read();
        let chunks = collections
            .get(collection)
            .ok_or_else(|| Error::NotFound(format!("collection {}", collection)))?;

        let query_embedding = self.embedder.embed(text);
        let mut scored: Vec<RetrievedChunk> = chunks
            .iter()
            .map(|c| RetrievedChunk {
                text: c.text.clone(),
                chunk_index: c.chunk_index,
                total_chunks: c.total_chunks,
                distance: cosine_distance(&query_embedding, &c.embedding),
            })
            .collect();

        scored.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        scored.truncate(n);
        debug!(collection, candidates = scored.len(), "vector query");
        Ok(scored)
    }

    async fn delete_collection(&self, collection: &str) -> Result<()> {
        self.collections.write().remove(collection);
        Ok(())
    }
}
