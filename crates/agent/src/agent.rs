//! The tutoring agent
//!
//! One instance serves all rooms. Collaborators are trait objects wired in
//! at startup; every turn runs the same sequential pipeline with tolerated
//! failures downgrading the outcome rather than aborting it.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, instrument, warn};

use tutor_core::traits::{
    ChatStore, PitchExtractor, PronunciationAssessor, SpeechToText, TextExtractor, TextToSpeech,
    VectorIndex,
};
use tutor_core::{
    Error, HistoryEntry, Message, MessageContext, MessageRole, QuerySnapshot, Result, Room,
    RoomUpdate, SpeechMetrics,
};
use tutor_llm::{LlmBackend, PromptBuilder, SpeechSummary};
use tutor_rag::{ChunkerConfig, RecursiveChunker, Retriever, RetrieverConfig};
use tutor_speech::{
    aggregate_pitch, transcode_to_wav, unavailable_pitch, ScoringConfig, SpeechScorer, TempAudio,
};

use crate::history::ContextSelector;
use crate::turn::{Degradation, TextTurnReply, TurnStatus, VoiceTurnReply};

/// Agent configuration
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Directory for saved documents
    pub document_dir: PathBuf,
    /// Directory for per-turn temp audio
    pub temp_dir: PathBuf,
    /// Context messages selected per turn
    pub history_limit: usize,
    /// Relevance gate for the history window
    pub relevance_threshold: f64,
    /// Sample rate for transcoded turn audio
    pub sample_rate: u32,
    pub chunker: ChunkerConfig,
    pub retriever: RetrieverConfig,
    pub scoring: ScoringConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            document_dir: PathBuf::from("data/documents"),
            temp_dir: PathBuf::from("data/tmp"),
            history_limit: 5,
            relevance_threshold: 0.7,
            sample_rate: 16000,
            chunker: ChunkerConfig::default(),
            retriever: RetrieverConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

/// External collaborators, one per seam
pub struct Collaborators {
    pub store: Arc<dyn ChatStore>,
    pub extractor: Arc<dyn TextExtractor>,
    pub index: Arc<dyn VectorIndex>,
    pub stt: Arc<dyn SpeechToText>,
    pub assessor: Arc<dyn PronunciationAssessor>,
    pub pitch: Arc<dyn PitchExtractor>,
    pub tts: Arc<dyn TextToSpeech>,
    pub llm: Arc<dyn LlmBackend>,
}

/// Summary of a processed document upload
#[derive(Debug, Clone)]
pub struct DocumentSummary {
    pub file_name: String,
    pub collection_name: String,
    pub chunk_count: usize,
}

/// The turn orchestrator
pub struct TutorAgent {
    store: Arc<dyn ChatStore>,
    extractor: Arc<dyn TextExtractor>,
    index: Arc<dyn VectorIndex>,
    stt: Arc<dyn SpeechToText>,
    assessor: Arc<dyn PronunciationAssessor>,
    pitch: Arc<dyn PitchExtractor>,
    tts: Arc<dyn TextToSpeech>,
    llm: Arc<dyn LlmBackend>,
    retriever: Retriever,
    chunker: RecursiveChunker,
    scorer: SpeechScorer,
    prompts: PromptBuilder,
    selector: ContextSelector,
    config: AgentConfig,
}

impl TutorAgent {
    pub fn new(collaborators: Collaborators, config: AgentConfig) -> Self {
        let retriever = Retriever::new(collaborators.index.clone(), config.retriever.clone());
        Self {
            store: collaborators.store,
            extractor: collaborators.extractor,
            index: collaborators.index,
            stt: collaborators.stt,
            assessor: collaborators.assessor,
            pitch: collaborators.pitch,
            tts: collaborators.tts,
            llm: collaborators.llm,
            retriever,
            chunker: RecursiveChunker::new(config.chunker.clone()),
            scorer: SpeechScorer::new(config.scoring.clone()),
            prompts: PromptBuilder::new(),
            selector: ContextSelector::new(config.history_limit, config.relevance_threshold),
            config,
        }
    }

    pub async fn create_room(&self, name: &str) -> Result<Room> {
        self.store.create_room(name, None, None).await
    }

    pub async fn list_rooms(&self) -> Result<Vec<Room>> {
        self.store.list_rooms().await
    }

    pub async fn get_room(&self, room_id: i64) -> Result<Room> {
        self.store.get_room(room_id).await
    }

    /// Delete a room along with its vector collection, if any
    pub async fn delete_room(&self, room_id: i64) -> Result<bool> {
        if let Ok(room) = self.store.get_room(room_id).await {
            if let Some(collection) = &room.collection_name {
                self.index.delete_collection(collection).await?;
            }
        }
        self.store.delete_room(room_id).await
    }

    /// Room history with the optional recency window and relevance-gated cap
    pub async fn room_messages(
        &self,
        room_id: i64,
        hours: Option<i64>,
        limit: Option<usize>,
    ) -> Result<Vec<Message>> {
        let messages = self.store.get_messages(room_id).await?;
        Ok(self.selector.select_history(&messages, hours, limit))
    }

    /// Ingest a document into a room: save, extract, chunk, index, and
    /// bind the resulting collection to the room.
    #[instrument(skip(self, bytes))]
    pub async fn attach_document(
        &self,
        room_id: i64,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<DocumentSummary> {
        self.store.get_room(room_id).await?;
        if file_name.trim().is_empty() || bytes.is_empty() {
            return Err(Error::InvalidInput("no file provided".into()));
        }

        let saved_name = format!("{}_{}", Utc::now().timestamp(), sanitize_filename(file_name));
        let path = self.config.document_dir.join(&saved_name);
        tokio::fs::create_dir_all(&self.config.document_dir).await?;
        tokio::fs::write(&path, bytes).await?;

        self.store
            .add_message(
                room_id,
                "Processing document... This may take a moment.",
                MessageRole::System,
                None,
            )
            .await?;

        let result = self.process_document(room_id, &path).await;
        match result {
            Ok((collection_name, chunk_count)) => {
                self.store
                    .add_message(
                        room_id,
                        &format!(
                            "Document processed successfully! You can now ask questions about {}",
                            file_name
                        ),
                        MessageRole::System,
                        None,
                    )
                    .await?;
                info!(collection = %collection_name, chunks = chunk_count, "document attached");
                Ok(DocumentSummary {
                    file_name: saved_name,
                    collection_name,
                    chunk_count,
                })
            }
            Err(e) => {
                // Saved file is useless without an index entry
                if let Err(rm) = tokio::fs::remove_file(&path).await {
                    warn!(path = %path.display(), error = %rm, "failed to remove document after ingest error");
                }
                error!(error = %e, "document ingestion failed");
                Err(e)
            }
        }
    }

    async fn process_document(
        &self,
        room_id: i64,
        path: &std::path::Path,
    ) -> Result<(String, usize)> {
        let text = self.extractor.extract_text(path).await?;
        let chunks = self.chunker.chunk(&text);
        if chunks.is_empty() {
            return Err(Error::Ingestion("document contains no text".into()));
        }

        let collection_name = format!("collection_{}", Utc::now().timestamp());
        self.index.index(&chunks, &collection_name).await?;

        self.store
            .update_room(
                room_id,
                RoomUpdate::new()
                    .with_file_context(path.to_string_lossy().into_owned())
                    .with_collection_name(collection_name.clone()),
            )
            .await?;
        Ok((collection_name, chunks.len()))
    }

    /// Handle one text turn
    #[instrument(skip(self, message))]
    pub async fn handle_text_turn(&self, room_id: i64, message: &str) -> Result<TextTurnReply> {
        let room = self.store.get_room(room_id).await?;
        if message.trim().is_empty() {
            return Err(Error::InvalidInput("no message provided".into()));
        }

        let history = self
            .selector
            .relevant_context(
                &self.store.get_messages(room_id).await?,
                message,
                self.config.history_limit,
            );

        self.store
            .add_message(room_id, message, MessageRole::User, None)
            .await?;

        let (content, context) = self.generate_reply(&room, message, &history, None).await?;
        let stored = self
            .store
            .add_message(room_id, &content, MessageRole::Assistant, Some(context))
            .await?;

        Ok(TextTurnReply {
            content: stored.content,
            role: stored.role,
            timestamp: stored.timestamp,
            context: stored.context.ok_or_else(|| {
                Error::Internal("assistant message stored without context".into())
            })?,
        })
    }

    /// Handle one voice turn: transcode, transcribe, score, answer,
    /// synthesize. Assessment, pitch and synthesis failures degrade the
    /// turn; transcription and generation failures abort it. Temp audio is
    /// removed on every path by scope guards.
    #[instrument(skip(self, audio), fields(audio_bytes = audio.len()))]
    pub async fn handle_voice_turn(&self, room_id: i64, audio: &[u8]) -> Result<VoiceTurnReply> {
        let room = self.store.get_room(room_id).await?;
        if audio.is_empty() {
            return Err(Error::InvalidInput("no audio data provided".into()));
        }

        let turn_id = Utc::now().timestamp_micros();
        let input_guard = TempAudio::write(
            &self.config.temp_dir,
            &format!("audio_{}.webm", turn_id),
            audio,
        )
        .await
        .map_err(tutor_core::Error::from)?;
        let wav_path = self.config.temp_dir.join(format!("audio_{}.wav", turn_id));
        let wav_guard = transcode_to_wav(input_guard.path(), &wav_path, self.config.sample_rate)
            .await
            .map_err(tutor_core::Error::from)?;
        let wav = wav_guard.read().await.map_err(tutor_core::Error::from)?;

        let transcription = self.stt.transcribe(&wav).await?;
        if transcription.trim().is_empty() {
            return Err(Error::InvalidInput(
                "no speech detected in the audio".into(),
            ));
        }
        info!(chars = transcription.len(), "turn transcribed");

        let mut degradations = Vec::new();
        let words: Vec<String> = transcription
            .split_whitespace()
            .map(|w| w.to_string())
            .collect();

        let scores = match self.assessor.assess(&transcription, &wav).await {
            Ok(assessment) => Ok(self.scorer.score(&assessment, &transcription)),
            Err(e) => {
                warn!(error = %e, "pronunciation assessment failed");
                degradations.push(Degradation::Assessment);
                Err(e.to_string())
            }
        };

        let pitch_report = match self.pitch.extract(&wav).await {
            Ok(samples) => aggregate_pitch(&words, &samples),
            Err(e) => {
                warn!(error = %e, "pitch extraction failed");
                degradations.push(Degradation::Pitch);
                unavailable_pitch(&words)
            }
        };

        let metrics = match &scores {
            Ok(scores) => self.scorer.metrics(scores, &pitch_report),
            Err(reason) => SpeechMetrics::degraded(
                reason,
                pitch_report.per_word.clone(),
                round2(pitch_report.overall),
            ),
        };

        let history = self.selector.relevant_context(
            &self.store.get_messages(room_id).await?,
            &transcription,
            self.config.history_limit,
        );

        self.store
            .add_message(
                room_id,
                &transcription,
                MessageRole::User,
                Some(MessageContext::Speech {
                    speech_metrics: metrics.clone(),
                }),
            )
            .await?;

        let summary = SpeechSummary {
            accuracy: metrics.accuracy,
            fluency: metrics.fluency,
            pronunciation_accuracy: metrics.pronunciation_accuracy,
            speech_quality: metrics.speech_quality,
        };
        let (content, context) = self
            .generate_reply(&room, &transcription, &history, Some(summary))
            .await?;

        let response_audio = match self.tts.synthesize(&content).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(error = %e, "speech synthesis failed, replying without audio");
                degradations.push(Degradation::Synthesis);
                None
            }
        };

        let stored = self
            .store
            .add_message(room_id, &content, MessageRole::Assistant, Some(context))
            .await?;

        Ok(VoiceTurnReply {
            transcription,
            content: stored.content,
            role: stored.role,
            timestamp: stored.timestamp,
            context: stored.context.ok_or_else(|| {
                Error::Internal("assistant message stored without context".into())
            })?,
            speech_metrics: metrics,
            response_audio,
            status: TurnStatus::from_degradations(degradations),
        })
    }

    /// Generate the assistant reply and the context persisted with it.
    /// Rooms with a document go through retrieval; the rest through plain
    /// chat (voice turns add speech feedback to the prompt).
    async fn generate_reply(
        &self,
        room: &Room,
        query: &str,
        history: &[HistoryEntry],
        speech: Option<SpeechSummary>,
    ) -> Result<(String, MessageContext)> {
        if let Some(collection) = &room.collection_name {
            let passages = self.retriever.retrieve(collection, query).await?;
            let messages = self.prompts.rag_messages(query, &passages, history);
            let content = self.llm.generate(&messages).await.map_err(Error::from)?;
            let context = MessageContext::Rag {
                passages: passages.iter().map(|p| p.text.clone()).collect(),
                metadata: passages.into_iter().map(|p| p.meta).collect(),
            };
            Ok((content, context))
        } else {
            let messages = match speech {
                Some(summary) => self.prompts.voice_messages(history, query, summary),
                None => self.prompts.chat_messages(history, query),
            };
            let content = self.llm.generate(&messages).await.map_err(Error::from)?;
            let context = MessageContext::Chat {
                conversation_history: history.to_vec(),
                current_query: QuerySnapshot {
                    content: query.to_string(),
                    timestamp: Utc::now(),
                },
            };
            Ok((content, context))
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches(['_', '.']).to_string();
    if cleaned.is_empty() {
        "document".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("my notes.txt"), "my_notes.txt");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("plain-file_1.md"), "plain-file_1.md");
        assert_eq!(sanitize_filename("///"), "document");
    }
}
