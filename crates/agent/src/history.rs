//! Conversation context selection
//!
//! Two selectors over a room's ordered message list: a relevance-gated
//! window used when history exceeds the cap, and a lexical ranking of past
//! messages against the current query.

use chrono::{Duration, Utc};
use tracing::debug;
use tutor_core::{HistoryEntry, Message, MessageRole};
use tutor_rag::ranker::{lexical_overlap, query_tokens};

/// Selects which past messages accompany a turn
#[derive(Debug, Clone)]
pub struct ContextSelector {
    /// Maximum context messages per turn
    pub history_limit: usize,
    /// Minimum stored relevance score for a past message to qualify
    pub relevance_threshold: f64,
}

impl Default for ContextSelector {
    fn default() -> Self {
        Self {
            history_limit: 5,
            relevance_threshold: 0.7,
        }
    }
}

impl ContextSelector {
    pub fn new(history_limit: usize, relevance_threshold: f64) -> Self {
        Self {
            history_limit,
            relevance_threshold,
        }
    }

    /// Filtered history window, ordered by timestamp ascending.
    ///
    /// With more messages than `limit`, the latest message is always kept
    /// and earlier ones qualify only through the relevance gate: their
    /// stored context must carry a relevance score at or above the
    /// threshold. No backfill: fewer qualifiers means a smaller window.
    pub fn select_history(
        &self,
        messages: &[Message],
        hours: Option<i64>,
        limit: Option<usize>,
    ) -> Vec<Message> {
        let mut messages: Vec<Message> = match hours {
            // Zero is treated as "no window", same as the limit guard below
            Some(h) if h > 0 => {
                let cutoff = Utc::now() - Duration::hours(h);
                messages
                    .iter()
                    .filter(|m| m.timestamp >= cutoff)
                    .cloned()
                    .collect()
            }
            _ => messages.to_vec(),
        };

        let limit = match limit {
            Some(l) if l > 0 && messages.len() > l => l,
            _ => return messages,
        };

        let latest = match messages.pop() {
            Some(m) => m,
            None => return Vec::new(),
        };

        let mut qualified: Vec<Message> = messages
            .into_iter()
            .filter(|m| {
                m.context
                    .as_ref()
                    .map(|c| c.has_relevant_passage(self.relevance_threshold))
                    .unwrap_or(false)
            })
            .collect();

        let keep_from = qualified.len().saturating_sub(limit - 1);
        let mut selected: Vec<Message> = qualified.split_off(keep_from);
        selected.push(latest);
        selected.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        debug!(selected = selected.len(), limit, "history window selected");
        selected
    }

    /// Past messages lexically closest to the query, best match first.
    ///
    /// System messages never qualify; zero-overlap messages are dropped.
    pub fn relevant_context(
        &self,
        messages: &[Message],
        query: &str,
        limit: usize,
    ) -> Vec<HistoryEntry> {
        let query_words = query_tokens(query);
        if query_words.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(f64, &Message)> = messages
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .filter_map(|m| {
                let overlap = lexical_overlap(&query_words, &m.content);
                if overlap > 0 {
                    Some((overlap as f64 / query_words.len() as f64, m))
                } else {
                    None
                }
            })
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored
            .into_iter()
            .take(limit)
            .map(|(_, m)| HistoryEntry {
                role: m.role,
                content: m.content.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone};
    use tutor_core::{MessageContext, PassageMeta};

    fn ts(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, minute, 0).unwrap()
    }

    fn msg(minute: u32, role: MessageRole, content: &str, score: Option<f64>) -> Message {
        Message {
            room_id: 1,
            content: content.to_string(),
            role,
            timestamp: ts(minute),
            context: score.map(|s| MessageContext::Rag {
                passages: vec!["p".into()],
                metadata: vec![PassageMeta {
                    chunk_index: 0,
                    total_chunks: 1,
                    distance: 0.2,
                    relevance_score: s,
                }],
            }),
        }
    }

    #[test]
    fn test_under_limit_returns_everything() {
        let selector = ContextSelector::default();
        let messages = vec![
            msg(0, MessageRole::User, "a", None),
            msg(1, MessageRole::Assistant, "b", None),
        ];
        let selected = selector.select_history(&messages, None, Some(5));
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].content, "a");
    }

    #[test]
    fn test_relevance_gate_without_backfill() {
        let selector = ContextSelector::default();
        // 10 messages, only #7 carries a qualifying score
        let messages: Vec<Message> = (0..10)
            .map(|i| {
                let score = if i == 7 { Some(0.85) } else { Some(0.2) };
                msg(i, MessageRole::Assistant, &format!("m{}", i), score)
            })
            .collect();

        let selected = selector.select_history(&messages, None, Some(5));
        // Only the qualifying message and the latest survive
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].content, "m7");
        assert_eq!(selected[1].content, "m9");
    }

    #[test]
    fn test_latest_always_kept_even_without_score() {
        let selector = ContextSelector::default();
        let messages: Vec<Message> = (0..8)
            .map(|i| msg(i, MessageRole::User, &format!("m{}", i), None))
            .collect();
        let selected = selector.select_history(&messages, None, Some(3));
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].content, "m7");
    }

    #[test]
    fn test_window_keeps_last_qualifiers_in_order() {
        let selector = ContextSelector::default();
        let messages: Vec<Message> = (0..10)
            .map(|i| msg(i, MessageRole::Assistant, &format!("m{}", i), Some(0.9)))
            .collect();
        let selected = selector.select_history(&messages, None, Some(4));
        assert_eq!(selected.len(), 4);
        let contents: Vec<&str> = selected.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m6", "m7", "m8", "m9"]);
    }

    #[test]
    fn test_hours_window_filters_before_selection() {
        let selector = ContextSelector::default();
        let mut old = msg(0, MessageRole::User, "ancient", Some(0.9));
        old.timestamp = Utc::now() - Duration::hours(48);
        let mut recent = msg(1, MessageRole::User, "recent", None);
        recent.timestamp = Utc::now() - Duration::minutes(5);

        let selected = selector.select_history(&[old, recent], Some(24), None);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].content, "recent");
    }

    #[test]
    fn test_zero_hours_means_no_window() {
        let selector = ContextSelector::default();
        let mut old = msg(0, MessageRole::User, "ancient", None);
        old.timestamp = Utc::now() - Duration::hours(48);

        let selected = selector.select_history(&[old], Some(0), None);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].content, "ancient");
    }

    #[test]
    fn test_relevant_context_ranks_by_overlap() {
        let selector = ContextSelector::default();
        let messages = vec![
            msg(0, MessageRole::User, "tell me about photosynthesis", None),
            msg(1, MessageRole::Assistant, "the weather is nice", None),
            msg(2, MessageRole::User, "photosynthesis and light energy", None),
        ];
        let context = selector.relevant_context(&messages, "photosynthesis light", 5);
        assert_eq!(context.len(), 2);
        assert_eq!(context[0].content, "photosynthesis and light energy");
        assert_eq!(context[1].content, "tell me about photosynthesis");
    }

    #[test]
    fn test_relevant_context_excludes_system_messages() {
        let selector = ContextSelector::default();
        let messages = vec![
            msg(0, MessageRole::System, "Processing document about stars", None),
            msg(1, MessageRole::User, "stars are bright", None),
        ];
        let context = selector.relevant_context(&messages, "stars", 5);
        assert_eq!(context.len(), 1);
        assert_eq!(context[0].role, MessageRole::User);
    }

    #[test]
    fn test_relevant_context_drops_zero_overlap() {
        let selector = ContextSelector::default();
        let messages = vec![msg(0, MessageRole::User, "unrelated entirely", None)];
        assert!(selector
            .relevant_context(&messages, "photosynthesis", 5)
            .is_empty());
    }

    #[test]
    fn test_relevant_context_respects_limit() {
        let selector = ContextSelector::default();
        let messages: Vec<Message> = (0..10)
            .map(|i| msg(i, MessageRole::User, "common topic words", None))
            .collect();
        let context = selector.relevant_context(&messages, "topic", 3);
        assert_eq!(context.len(), 3);
    }
}
