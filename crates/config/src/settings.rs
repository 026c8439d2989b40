//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// File-system layout for documents and temp audio
    #[serde(default)]
    pub storage: StorageConfig,

    /// Retrieval and ranking configuration
    #[serde(default)]
    pub rag: RagConfig,

    /// Conversation-history selection configuration
    #[serde(default)]
    pub context: ContextConfig,

    /// Speech scoring configuration
    #[serde(default)]
    pub speech: SpeechConfig,

    /// External service endpoints
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,
    /// Port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// File-system layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for uploaded documents
    #[serde(default = "default_document_dir")]
    pub document_dir: String,
    /// Directory for temporary audio artifacts
    #[serde(default = "default_temp_dir")]
    pub temp_dir: String,
}

fn default_document_dir() -> String {
    "data/documents".to_string()
}

fn default_temp_dir() -> String {
    "data/tmp".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            document_dir: default_document_dir(),
            temp_dir: default_temp_dir(),
        }
    }
}

/// Weights of the multi-signal passage ranking formula.
///
/// Defaults mirror the canonical formula; they sum to 1.0 and validation
/// enforces that within a small tolerance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingWeights {
    #[serde(default = "default_w_similarity")]
    pub similarity: f64,
    #[serde(default = "default_w_position")]
    pub position: f64,
    #[serde(default = "default_w_recency")]
    pub recency: f64,
    #[serde(default = "default_w_length")]
    pub length: f64,
    #[serde(default = "default_w_overlap")]
    pub overlap: f64,
}

fn default_w_similarity() -> f64 {
    0.4
}
fn default_w_position() -> f64 {
    0.2
}
fn default_w_recency() -> f64 {
    0.1
}
fn default_w_length() -> f64 {
    0.15
}
fn default_w_overlap() -> f64 {
    0.15
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            similarity: default_w_similarity(),
            position: default_w_position(),
            recency: default_w_recency(),
            length: default_w_length(),
            overlap: default_w_overlap(),
        }
    }
}

impl RankingWeights {
    pub fn sum(&self) -> f64 {
        self.similarity + self.position + self.recency + self.length + self.overlap
    }
}

/// Retrieval and ranking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    /// Chunk size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Chunk overlap in characters
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
    /// Passages fed into the prompt per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Extra raw candidates fetched beyond top_k for re-ranking headroom
    #[serde(default = "default_fetch_headroom")]
    pub fetch_headroom: usize,
    /// Ranking formula weights
    #[serde(default)]
    pub weights: RankingWeights,
}

fn default_chunk_size() -> usize {
    500
}
fn default_chunk_overlap() -> usize {
    50
}
fn default_top_k() -> usize {
    3
}
fn default_fetch_headroom() -> usize {
    2
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
            fetch_headroom: default_fetch_headroom(),
            weights: RankingWeights::default(),
        }
    }
}

/// Conversation-history selection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Maximum context messages selected per turn
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Minimum stored relevance score for a past message to qualify
    #[serde(default = "default_relevance_threshold")]
    pub relevance_threshold: f64,
}

fn default_history_limit() -> usize {
    5
}
fn default_relevance_threshold() -> f64 {
    0.7
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            relevance_threshold: default_relevance_threshold(),
        }
    }
}

/// Weights of the composite speech-quality score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreWeights {
    #[serde(default = "default_w_accuracy")]
    pub accuracy: f64,
    #[serde(default = "default_w_completeness")]
    pub completeness: f64,
    #[serde(default = "default_w_fluency")]
    pub fluency: f64,
    #[serde(default = "default_w_pronunciation")]
    pub pronunciation: f64,
}

fn default_w_accuracy() -> f64 {
    0.4
}
fn default_w_completeness() -> f64 {
    0.3
}
fn default_w_fluency() -> f64 {
    0.2
}
fn default_w_pronunciation() -> f64 {
    0.1
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            accuracy: default_w_accuracy(),
            completeness: default_w_completeness(),
            fluency: default_w_fluency(),
            pronunciation: default_w_pronunciation(),
        }
    }
}

/// Speech scoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Confidence above which a reference-matching word counts as correct
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
    /// Words-per-minute treated as a perfect fluency score
    #[serde(default = "default_reference_wpm")]
    pub reference_wpm: f64,
    /// Composite score weights
    #[serde(default)]
    pub weights: ScoreWeights,
    /// Target sample rate for transcoded audio
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

fn default_confidence_threshold() -> f64 {
    0.8
}
fn default_reference_wpm() -> f64 {
    150.0
}
fn default_sample_rate() -> u32 {
    16000
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            reference_wpm: default_reference_wpm(),
            weights: ScoreWeights::default(),
            sample_rate: default_sample_rate(),
        }
    }
}

/// External service endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Speech service base URL (STT, assessment, TTS)
    #[serde(default = "default_speech_url")]
    pub speech_url: String,
    /// Generation backend base URL (OpenAI-compatible)
    #[serde(default = "default_llm_url")]
    pub llm_url: String,
    /// Generation model name
    #[serde(default = "default_llm_model")]
    pub llm_model: String,
    /// API key for the generation backend, if required
    #[serde(default)]
    pub llm_api_key: Option<String>,
    /// Request timeout for upstream calls, milliseconds
    #[serde(default = "default_upstream_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_speech_url() -> String {
    "http://127.0.0.1:8090".to_string()
}
fn default_llm_url() -> String {
    "http://127.0.0.1:11434/v1".to_string()
}
fn default_llm_model() -> String {
    "qwen2.5:7b-instruct-q4_K_M".to_string()
}
fn default_upstream_timeout_ms() -> u64 {
    30000
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            speech_url: default_speech_url(),
            llm_url: default_llm_url(),
            llm_model: default_llm_model(),
            llm_api_key: None,
            timeout_ms: default_upstream_timeout_ms(),
        }
    }
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rag.chunk_overlap >= self.rag.chunk_size {
            return Err(ConfigError::InvalidValue {
                field: "rag.chunk_overlap".to_string(),
                message: format!(
                    "overlap {} must be smaller than chunk size {}",
                    self.rag.chunk_overlap, self.rag.chunk_size
                ),
            });
        }

        if self.rag.top_k == 0 {
            return Err(ConfigError::InvalidValue {
                field: "rag.top_k".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        let rank_sum = self.rag.weights.sum();
        if (rank_sum - 1.0).abs() > 1e-6 {
            return Err(ConfigError::InvalidValue {
                field: "rag.weights".to_string(),
                message: format!("weights must sum to 1.0, got {}", rank_sum),
            });
        }

        if !(0.0..=1.0).contains(&self.context.relevance_threshold) {
            return Err(ConfigError::InvalidValue {
                field: "context.relevance_threshold".to_string(),
                message: format!(
                    "must be between 0.0 and 1.0, got {}",
                    self.context.relevance_threshold
                ),
            });
        }

        if !(0.0..=1.0).contains(&self.speech.confidence_threshold) {
            return Err(ConfigError::InvalidValue {
                field: "speech.confidence_threshold".to_string(),
                message: format!(
                    "must be between 0.0 and 1.0, got {}",
                    self.speech.confidence_threshold
                ),
            });
        }

        if self.speech.reference_wpm <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "speech.reference_wpm".to_string(),
                message: "must be positive".to_string(),
            });
        }

        let score_sum = self.speech.weights.accuracy
            + self.speech.weights.completeness
            + self.speech.weights.fluency
            + self.speech.weights.pronunciation;
        if (score_sum - 1.0).abs() > 1e-6 {
            return Err(ConfigError::InvalidValue {
                field: "speech.weights".to_string(),
                message: format!("weights must sum to 1.0, got {}", score_sum),
            });
        }

        Ok(())
    }
}

/// Load settings from defaults, an optional `config/default.toml`, and
/// `TUTOR__`-prefixed environment variables (e.g. `TUTOR__SERVER__PORT`).
pub fn load_settings() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(
            Environment::with_prefix("TUTOR")
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;
    settings.validate()?;

    Ok(settings)
}
