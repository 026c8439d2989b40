//! Speech processing for the tutoring backend
//!
//! Features:
//! - Pure scoring primitives (accuracy, fluency, completeness, composite)
//! - Pitch aggregation aligning recognized words to pitch samples
//! - WAV pitch extraction via framewise autocorrelation
//! - Scoped temp-audio lifecycle with ffmpeg transcoding
//! - HTTP clients for the external STT / assessment / TTS service

pub mod audio;
pub mod http;
pub mod pitch;
pub mod pitch_extractor;
pub mod scoring;

pub use audio::{transcode_to_wav, TempAudio};
pub use http::{HttpSpeechClient, SpeechClientConfig};
pub use pitch::{aggregate_pitch, unavailable_pitch, PitchReport};
pub use pitch_extractor::{WavPitchExtractor, WavPitchExtractorConfig};
pub use scoring::{SpeechScorer, ScoringConfig, UtteranceScores};

use thiserror::Error;

/// Speech processing errors
#[derive(Error, Debug)]
pub enum SpeechError {
    #[error("audio decode error: {0}")]
    Decode(String),

    #[error("transcode error: {0}")]
    Transcode(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<SpeechError> for tutor_core::Error {
    fn from(err: SpeechError) -> Self {
        match err {
            SpeechError::Io(e) => tutor_core::Error::Io(e.to_string()),
            SpeechError::Transcode(e) => tutor_core::Error::Io(e),
            decode @ SpeechError::Decode(_) => tutor_core::Error::Internal(decode.to_string()),
        }
    }
}
