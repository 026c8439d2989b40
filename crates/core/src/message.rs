//! Messages and their structured context payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::passage::PassageMeta;
use crate::speech::SpeechMetrics;

/// Who authored a message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::System => "system",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stored message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub room_id: i64,
    pub content: String,
    pub role: MessageRole,
    pub timestamp: DateTime<Utc>,
    /// Structured provenance for assistant turns, absent for plain messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<MessageContext>,
}

/// A compact role/content pair used in prompts and stored context
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub role: MessageRole,
    pub content: String,
}

/// Query captured alongside a chat answer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuerySnapshot {
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Context stored next to an assistant message.
///
/// Serialized untagged: the three variants carry disjoint key sets, so the
/// shape alone identifies the variant on the way back in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MessageContext {
    /// Answer grounded in retrieved document passages
    Rag {
        passages: Vec<String>,
        metadata: Vec<PassageMeta>,
    },
    /// Plain chat answer with the history that shaped it
    Chat {
        conversation_history: Vec<HistoryEntry>,
        current_query: QuerySnapshot,
    },
    /// Feedback on a spoken turn
    Speech { speech_metrics: SpeechMetrics },
}

impl MessageContext {
    /// Whether any ranked passage meets the relevance threshold.
    /// Only RAG contexts can qualify.
    pub fn has_relevant_passage(&self, threshold: f64) -> bool {
        match self {
            MessageContext::Rag { metadata, .. } => {
                metadata.iter().any(|m| m.relevance_score >= threshold)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(score: f64) -> PassageMeta {
        PassageMeta {
            chunk_index: 0,
            total_chunks: 4,
            distance: 0.3,
            relevance_score: score,
        }
    }

    #[test]
    fn test_role_serde() {
        assert_eq!(
            serde_json::to_string(&MessageRole::Assistant).unwrap(),
            "\"assistant\""
        );
        let role: MessageRole = serde_json::from_str("\"system\"").unwrap();
        assert_eq!(role, MessageRole::System);
    }

    #[test]
    fn test_rag_context_round_trip() {
        let ctx = MessageContext::Rag {
            passages: vec!["passage one".into()],
            metadata: vec![meta(0.82)],
        };
        let json = serde_json::to_string(&ctx).unwrap();
        let back: MessageContext = serde_json::from_str(&json).unwrap();
        assert_eq!(ctx, back);
    }

    #[test]
    fn test_chat_context_round_trip() {
        let ctx = MessageContext::Chat {
            conversation_history: vec![HistoryEntry {
                role: MessageRole::User,
                content: "hi".into(),
            }],
            current_query: QuerySnapshot {
                content: "what next?".into(),
                timestamp: Utc::now(),
            },
        };
        let json = serde_json::to_string(&ctx).unwrap();
        let back: MessageContext = serde_json::from_str(&json).unwrap();
        assert_eq!(ctx, back);
    }

    #[test]
    fn test_empty_history_round_trips_as_chat() {
        let ctx = MessageContext::Chat {
            conversation_history: vec![],
            current_query: QuerySnapshot {
                content: "first message".into(),
                timestamp: Utc::now(),
            },
        };
        let json = serde_json::to_string(&ctx).unwrap();
        assert!(json.contains("\"conversation_history\":[]"));
        let back: MessageContext = serde_json::from_str(&json).unwrap();
        assert_eq!(ctx, back);
    }

    #[test]
    fn test_relevance_check_only_applies_to_rag() {
        let rag = MessageContext::Rag {
            passages: vec!["p".into()],
            metadata: vec![meta(0.75)],
        };
        assert!(rag.has_relevant_passage(0.7));
        assert!(!rag.has_relevant_passage(0.8));

        let chat = MessageContext::Chat {
            conversation_history: vec![],
            current_query: QuerySnapshot {
                content: "q".into(),
                timestamp: Utc::now(),
            },
        };
        assert!(!chat.has_relevant_passage(0.0));
    }
}
