//! Vector retrieval interface

use async_trait::async_trait;

use crate::passage::RetrievedChunk;
use crate::Result;

/// Vector retrieval backend.
///
/// Collections map one-to-one to attached documents; a room's
/// `collection_name` selects which collection its turns query. The backend
/// reports raw distances; relevance is derived downstream by the ranker.
#[async_trait]
pub trait VectorIndex: Send + Sync + 'static {
    /// Index ordered document chunks under a collection name, replacing any
    /// existing collection of that name.
    async fn index(&self, chunks: &[String], collection: &str) -> Result<()>;

    /// Query a collection, returning up to `n` candidates with distance and
    /// chunk metadata, closest first.
    async fn query(&self, collection: &str, text: &str, n: usize) -> Result<Vec<RetrievedChunk>>;

    /// Drop a collection if it exists
    async fn delete_collection(&self, collection: &str) -> Result<()>;
}
