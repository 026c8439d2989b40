//! Core types and collaborator traits for the tutoring backend
//!
//! This crate provides the types shared across all other crates:
//! - Rooms, messages and their structured context payloads
//! - Passage and speech-assessment types
//! - The error taxonomy (fatal vs tolerated failures)
//! - Collaborator traits for persistence, retrieval, speech and ingestion

pub mod error;
pub mod message;
pub mod passage;
pub mod room;
pub mod speech;
pub mod traits;

pub use error::{Error, Result};
pub use message::{HistoryEntry, Message, MessageContext, MessageRole, QuerySnapshot};
pub use passage::{Passage, PassageMeta, RetrievedChunk};
pub use room::{Room, RoomUpdate};
pub use speech::{AssessedWord, AssessmentResult, ScoredWord, SpeechMetrics, WordError};

pub use traits::{
    ChatStore, PitchExtractor, PronunciationAssessor, SpeechToText, TextExtractor, TextToSpeech,
    VectorIndex,
};
