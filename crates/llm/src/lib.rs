//! Generation backend integration
//!
//! Prompt construction for the tutoring flows (plain chat, RAG-grounded
//! answers, spoken-turn feedback) and an OpenAI-compatible chat backend
//! with retry on transient failures.

pub mod backend;
pub mod prompt;

pub use backend::{LlmBackend, LlmConfig, OpenAiChatBackend};
pub use prompt::{ChatMessage, PromptBuilder, Role, SpeechSummary};

use thiserror::Error;

/// Generation errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("api error: {0}")]
    Api(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Network(format!("timeout: {}", err))
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for tutor_core::Error {
    fn from(err: LlmError) -> Self {
        tutor_core::Error::Generation(err.to_string())
    }
}
