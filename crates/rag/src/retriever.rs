//! Retrieval pipeline
//!
//! Ties the vector index and the passage ranker together: over-fetch raw
//! candidates, re-rank with the multi-signal formula, return the top N.

use std::sync::Arc;

use tracing::debug;
use tutor_core::traits::VectorIndex;
use tutor_core::{Passage, Result};

use crate::ranker::{PassageRanker, RankerConfig};

/// Retrieval configuration
#[derive(Debug, Clone)]
pub struct RetrieverConfig {
    /// Passages returned per query
    pub top_k: usize,
    /// Extra raw candidates fetched for re-ranking headroom
    pub fetch_headroom: usize,
    pub ranker: RankerConfig,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            fetch_headroom: 2,
            ranker: RankerConfig::default(),
        }
    }
}

/// Query-time retrieval over an indexed collection
pub struct Retriever {
    index: Arc<dyn VectorIndex>,
    ranker: PassageRanker,
    config: RetrieverConfig,
}

impl Retriever {
    pub fn new(index: Arc<dyn VectorIndex>, config: RetrieverConfig) -> Self {
        let ranker = PassageRanker::new(config.ranker.clone());
        Self {
            index,
            ranker,
            config,
        }
    }

    /// Retrieve the top passages for a query from one collection
    pub async fn retrieve(&self, collection: &str, query: &str) -> Result<Vec<Passage>> {
        let query = query.trim().to_lowercase();
        let fetch_n = self.config.top_k + self.config.fetch_headroom;
        let candidates = self.index.query(collection, &query, fetch_n).await?;
        debug!(
            collection,
            candidates = candidates.len(),
            top_k = self.config.top_k,
            "retrieval candidates fetched"
        );
        Ok(self.ranker.rank(&query, candidates, self.config.top_k))
    }
}
