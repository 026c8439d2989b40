//! Speech assessment types

use serde::{Deserialize, Serialize};

/// Classification of one recognized word
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum WordError {
    /// Pronounced correctly
    None,
    /// In error, or spoken with low confidence
    Mispronounced,
    /// Classification unavailable
    Unknown,
}

impl WordError {
    pub fn as_str(&self) -> &'static str {
        match self {
            WordError::None => "None",
            WordError::Mispronounced => "Mispronounced",
            WordError::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for WordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recognized word after classification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredWord {
    pub word: String,
    pub error_type: WordError,
    /// Recognizer confidence in [0, 1]
    pub confidence: f64,
}

/// A word as returned by the pronunciation assessor
#[derive(Debug, Clone, PartialEq)]
pub struct AssessedWord {
    pub word: String,
    pub confidence: f64,
    pub duration_secs: f64,
}

/// Raw assessor output for one utterance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssessmentResult {
    pub words: Vec<AssessedWord>,
}

/// Final speech metrics for one voice turn, all scores in [0, 100]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpeechMetrics {
    pub accuracy: f64,
    pub completeness: f64,
    pub fluency: f64,
    pub pronunciation_accuracy: f64,
    pub speech_quality: f64,
    pub word_evaluation: Vec<String>,
    pub pitch_analysis: Vec<String>,
    pub overall_pitch: f64,
}

impl SpeechMetrics {
    /// Zeroed scores for a turn where assessment failed. Pitch results are
    /// independent of assessment and carried through unchanged.
    pub fn degraded(reason: &str, pitch_analysis: Vec<String>, overall_pitch: f64) -> Self {
        Self {
            accuracy: 0.0,
            completeness: 0.0,
            fluency: 0.0,
            pronunciation_accuracy: 0.0,
            speech_quality: 0.0,
            word_evaluation: vec![format!("Could not evaluate pronunciation: {}", reason)],
            pitch_analysis,
            overall_pitch,
        }
    }
}
