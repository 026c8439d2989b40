//! Document ingestion and retrieval
//!
//! Covers the path from an uploaded document to ranked passages:
//! text extraction, recursive chunking, vector indexing, and multi-signal
//! passage ranking on top of raw nearest-neighbour results.

pub mod chunker;
pub mod extract;
pub mod index;
pub mod ranker;
pub mod retriever;

pub use chunker::{ChunkerConfig, RecursiveChunker};
pub use extract::PlainTextExtractor;
pub use index::{HashingEmbedder, InMemoryVectorIndex};
pub use ranker::{lexical_overlap, query_tokens, PassageRanker, RankerConfig};
pub use retriever::{Retriever, RetrieverConfig};
