//! Prompt construction for the tutoring flows

use std::fmt;

use serde::{Deserialize, Serialize};
use tutor_core::{HistoryEntry, MessageRole, Passage};

/// Chat role on the generation wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

impl From<MessageRole> for Role {
    fn from(role: MessageRole) -> Self {
        match role {
            MessageRole::User => Role::User,
            MessageRole::Assistant => Role::Assistant,
            MessageRole::System => Role::System,
        }
    }
}

/// One message sent to the generation backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Speech scores summarized for the feedback prompt
#[derive(Debug, Clone, Copy)]
pub struct SpeechSummary {
    pub accuracy: f64,
    pub fluency: f64,
    pub pronunciation_accuracy: f64,
    pub speech_quality: f64,
}

const TUTOR_SYSTEM_PROMPT: &str = "\
You are a friendly and engaging English language tutor.
Your responses should be:
1. Natural and conversational, like talking to a friend
2. Warm and encouraging, always find something positive to say
3. Specific and actionable, give clear, practical advice
4. Brief but meaningful, keep responses concise but helpful
5. Personal, use \"you\" and \"your\" to make it more engaging

Remember to:
- Start with a friendly greeting or acknowledgment
- Use contractions (e.g., \"you're\" instead of \"you are\")
- Keep the tone light and supportive";

const RAG_SYSTEM_PROMPT: &str = "\
You are a helpful and informative AI assistant with access to specific documents.
Please provide a comprehensive answer that includes relevant background information.
Use a friendly and conversational tone, and break down any complex concepts for a non-technical audience.
Base your answer primarily on the most relevant passages (those with higher relevance scores).
Consider the conversation history for context, but focus on the current question.
If the passages don't contain relevant information to answer the question, please say so.";

/// Number of trailing history messages embedded in the RAG prompt
const RAG_HISTORY_WINDOW: usize = 3;

/// Assembles message lists for each turn type
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Messages for a plain chat turn: tutor persona, selected history,
    /// then the current query.
    pub fn chat_messages(&self, history: &[HistoryEntry], query: &str) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::system(TUTOR_SYSTEM_PROMPT)];
        for entry in history {
            messages.push(ChatMessage {
                role: entry.role.into(),
                content: entry.content.clone(),
            });
        }
        messages.push(ChatMessage::user(query));
        messages
    }

    /// Messages for a RAG turn. Passages, sorted by relevance, are inlined
    /// into a single user prompt with a short window of recent history.
    pub fn rag_messages(
        &self,
        query: &str,
        passages: &[Passage],
        history: &[HistoryEntry],
    ) -> Vec<ChatMessage> {
        let mut sorted: Vec<&Passage> = passages.iter().collect();
        sorted.sort_by(|a, b| b.meta.relevance_score.total_cmp(&a.meta.relevance_score));

        let context = sorted
            .iter()
            .map(|p| format!("[Relevance: {:.2}]\n{}", p.meta.relevance_score, p.text))
            .collect::<Vec<_>>()
            .join("\n\n");

        let history_text = if history.is_empty() {
            String::new()
        } else {
            let tail = &history[history.len().saturating_sub(RAG_HISTORY_WINDOW)..];
            let lines = tail
                .iter()
                .map(|entry| format!("{}: {}", title_case(entry.role.as_str()), entry.content))
                .collect::<Vec<_>>()
                .join("\n");
            format!("\n\nPrevious conversation:\n{}", lines)
        };

        let prompt = format!(
            "Relevant Passages:\n{}\n{}\n\nCurrent Question: {}\n\nAnswer:",
            context, history_text, query
        );

        vec![
            ChatMessage::system(RAG_SYSTEM_PROMPT),
            ChatMessage::user(prompt),
        ]
    }

    /// Messages for a voice turn: the tutor answers the transcribed speech
    /// and comments on the speaking metrics.
    pub fn voice_messages(
        &self,
        history: &[HistoryEntry],
        transcription: &str,
        summary: SpeechSummary,
    ) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::system(TUTOR_SYSTEM_PROMPT)];
        for entry in history {
            messages.push(ChatMessage {
                role: entry.role.into(),
                content: entry.content.clone(),
            });
        }

        let prompt = format!(
            "User said: {}\n\
             Speech metrics:\n\
             - Accuracy: {:.2}%\n\
             - Fluency: {:.2}%\n\
             - Pronunciation: {:.2}%\n\
             - Overall Quality: {:.2}%\n\n\
             Please provide a friendly, conversational response that includes:\n\
             1. A brief answer to what they said\n\
             2. Feedback on their English speaking skills\n\
             3. Specific suggestions for improvement",
            transcription,
            summary.accuracy,
            summary.fluency,
            summary.pronunciation_accuracy,
            summary.speech_quality
        );
        messages.push(ChatMessage::user(prompt));
        messages
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutor_core::PassageMeta;

    fn passage(text: &str, score: f64) -> Passage {
        Passage {
            text: text.to_string(),
            meta: PassageMeta {
                chunk_index: 0,
                total_chunks: 1,
                distance: 0.2,
                relevance_score: score,
            },
        }
    }

    fn entry(role: MessageRole, content: &str) -> HistoryEntry {
        HistoryEntry {
            role,
            content: content.to_string(),
        }
    }

    #[test]
    fn test_chat_messages_layout() {
        let builder = PromptBuilder::new();
        let history = vec![
            entry(MessageRole::User, "hello"),
            entry(MessageRole::Assistant, "hi there"),
        ];
        let messages = builder.chat_messages(&history, "how are you?");
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[2].role, Role::Assistant);
        assert_eq!(messages[3].content, "how are you?");
    }

    #[test]
    fn test_rag_prompt_sorts_by_relevance() {
        let builder = PromptBuilder::new();
        let passages = vec![passage("low passage", 0.3), passage("high passage", 0.9)];
        let messages = builder.rag_messages("question?", &passages, &[]);
        assert_eq!(messages.len(), 2);
        let body = &messages[1].content;
        let high_pos = body.find("high passage").unwrap();
        let low_pos = body.find("low passage").unwrap();
        assert!(high_pos < low_pos);
        assert!(body.contains("[Relevance: 0.90]"));
        assert!(body.contains("Current Question: question?"));
    }

    #[test]
    fn test_rag_prompt_limits_history_window() {
        let builder = PromptBuilder::new();
        let history: Vec<HistoryEntry> = (0..5)
            .map(|i| entry(MessageRole::User, &format!("message {}", i)))
            .collect();
        let messages = builder.rag_messages("q", &[passage("p", 0.8)], &history);
        let body = &messages[1].content;
        assert!(!body.contains("message 0"));
        assert!(!body.contains("message 1"));
        assert!(body.contains("message 2"));
        assert!(body.contains("message 4"));
        assert!(body.contains("Previous conversation:"));
    }

    #[test]
    fn test_voice_prompt_includes_metrics() {
        let builder = PromptBuilder::new();
        let messages = builder.voice_messages(
            &[],
            "hello world",
            SpeechSummary {
                accuracy: 87.5,
                fluency: 72.0,
                pronunciation_accuracy: 80.0,
                speech_quality: 82.15,
            },
        );
        let body = &messages.last().unwrap().content;
        assert!(body.contains("User said: hello world"));
        assert!(body.contains("Accuracy: 87.50%"));
        assert!(body.contains("Overall Quality: 82.15%"));
    }
}
