//! Turn outcomes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tutor_core::{MessageContext, MessageRole, SpeechMetrics};

/// Sub-steps whose failure degrades a turn instead of failing it
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Degradation {
    /// Pronunciation assessment failed, scores zeroed
    Assessment,
    /// Pitch extraction failed, per-word pitch unavailable
    Pitch,
    /// Speech synthesis failed, reply returned without audio
    Synthesis,
}

/// Terminal state of a completed turn. Fatal failures surface as errors,
/// never as a status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "state", content = "degradations")]
pub enum TurnStatus {
    Completed,
    DegradedCompleted(Vec<Degradation>),
}

impl TurnStatus {
    pub fn from_degradations(degradations: Vec<Degradation>) -> Self {
        if degradations.is_empty() {
            TurnStatus::Completed
        } else {
            TurnStatus::DegradedCompleted(degradations)
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, TurnStatus::DegradedCompleted(_))
    }
}

/// Assistant reply to a text turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextTurnReply {
    pub content: String,
    pub role: MessageRole,
    pub timestamp: DateTime<Utc>,
    pub context: MessageContext,
}

/// Assistant reply to a voice turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceTurnReply {
    pub transcription: String,
    pub content: String,
    pub role: MessageRole,
    pub timestamp: DateTime<Utc>,
    pub context: MessageContext,
    pub speech_metrics: SpeechMetrics,
    /// Synthesized reply audio; absent when synthesis failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_audio: Option<Vec<u8>>,
    pub status: TurnStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_degradations() {
        assert_eq!(
            TurnStatus::from_degradations(vec![]),
            TurnStatus::Completed
        );
        let degraded = TurnStatus::from_degradations(vec![Degradation::Pitch]);
        assert!(degraded.is_degraded());
    }
}
