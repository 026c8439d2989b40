//! Configuration management for the tutoring backend
//!
//! Settings are layered: built-in defaults, then an optional TOML file,
//! then `TUTOR__`-prefixed environment variables. Ranking weights, the
//! relevance threshold and the speech-scoring constants live here as
//! configurable defaults.

pub mod settings;

pub use settings::{
    load_settings, ContextConfig, RagConfig, RankingWeights, ScoreWeights, ServerConfig, Settings,
    SpeechConfig, StorageConfig, UpstreamConfig,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    #[error("failed to parse configuration: {0}")]
    Parse(String),

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::Parse(err.to_string())
    }
}
