//! Collaborator traits
//!
//! The core logic talks to persistence, retrieval, speech services and the
//! generation backend exclusively through these interfaces so that every
//! collaborator can be swapped for a fake in tests.

pub mod ingest;
pub mod retrieval;
pub mod speech;
pub mod store;

pub use ingest::TextExtractor;
pub use retrieval::VectorIndex;
pub use speech::{PitchExtractor, PronunciationAssessor, SpeechToText, TextToSpeech};
pub use store::ChatStore;
