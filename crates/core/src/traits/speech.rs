//! Speech collaborator interfaces
//!
//! All four services are external; the orchestrator wraps each call with
//! its own degrade-or-abort policy, so implementations just report errors
//! and let the caller decide what a failure means for the turn.

use async_trait::async_trait;

use crate::speech::AssessmentResult;
use crate::Result;

/// Speech-to-text transcription
#[async_trait]
pub trait SpeechToText: Send + Sync + 'static {
    /// Transcribe a WAV-encoded recording.
    ///
    /// An empty string means no speech was detected; the caller treats that
    /// the same as an error (fatal for the turn).
    async fn transcribe(&self, wav: &[u8]) -> Result<String>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

/// Per-word pronunciation assessment
#[async_trait]
pub trait PronunciationAssessor: Send + Sync + 'static {
    /// Assess a recording against the reference text, yielding recognized
    /// words with confidence and timing.
    async fn assess(&self, reference: &str, wav: &[u8]) -> Result<AssessmentResult>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

/// Fundamental-frequency extraction
#[async_trait]
pub trait PitchExtractor: Send + Sync + 'static {
    /// Extract voiced pitch samples (Hz) from a WAV-encoded recording.
    /// Unvoiced frames are filtered out, so every sample is non-zero.
    async fn extract(&self, wav: &[u8]) -> Result<Vec<f64>>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

/// Text-to-speech synthesis
#[async_trait]
pub trait TextToSpeech: Send + Sync + 'static {
    /// Synthesize speech for the given text, returning WAV bytes
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;

    /// Backend name for logging
    fn name(&self) -> &str;
}
