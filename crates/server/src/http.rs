//! HTTP endpoints
//!
//! REST API over the tutoring agent.

use axum::{
    extract::{Json, Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use tutor_core::{Message, MessageContext, MessageRole, SpeechMetrics};

use crate::state::AppState;
use crate::ServerError;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/rooms", post(create_room).get(list_rooms))
        .route("/rooms/:id", get(get_room).delete(delete_room))
        .route("/rooms/:id/messages", get(get_messages))
        .route("/rooms/:id/upload", post(upload_document))
        .route("/rooms/:id/chat", post(chat))
        .route("/rooms/:id/voice_chat", post(voice_chat))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct CreateRoomRequest {
    name: String,
}

async fn create_room(
    State(state): State<AppState>,
    Json(request): Json<CreateRoomRequest>,
) -> Result<Json<tutor_core::Room>, ServerError> {
    let room = state.agent.create_room(&request.name).await?;
    Ok(Json(room))
}

async fn list_rooms(
    State(state): State<AppState>,
) -> Result<Json<Vec<tutor_core::Room>>, ServerError> {
    Ok(Json(state.agent.list_rooms().await?))
}

async fn get_room(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<tutor_core::Room>, ServerError> {
    Ok(Json(state.agent.get_room(id).await?))
}

async fn delete_room(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ServerError> {
    if state.agent.delete_room(id).await? {
        Ok(Json(serde_json::json!({ "message": "Room deleted successfully" })))
    } else {
        Err(ServerError::NotFound(format!("room {} not found", id)))
    }
}

#[derive(Debug, Deserialize)]
struct MessagesQuery {
    hours: Option<i64>,
    limit: Option<usize>,
}

async fn get_messages(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<Vec<Message>>, ServerError> {
    let messages = state
        .agent
        .room_messages(id, query.hours, query.limit)
        .await?;
    Ok(Json(messages))
}

#[derive(Debug, Serialize)]
struct UploadResponse {
    message: String,
    file_name: String,
    chunk_count: usize,
}

async fn upload_document(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ServerError> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::InvalidRequest(format!("invalid multipart body: {}", e)))?
    {
        if field.name() == Some("file") {
            let file_name = field
                .file_name()
                .unwrap_or("document.txt")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ServerError::InvalidRequest(format!("failed to read upload: {}", e)))?;
            upload = Some((file_name, bytes.to_vec()));
        }
    }

    let (file_name, bytes) =
        upload.ok_or_else(|| ServerError::InvalidRequest("no file provided".to_string()))?;
    let summary = state.agent.attach_document(id, &file_name, &bytes).await?;

    Ok(Json(UploadResponse {
        message: "Document processed successfully".to_string(),
        file_name: summary.file_name,
        chunk_count: summary.chunk_count,
    }))
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    content: String,
    role: MessageRole,
    timestamp: DateTime<Utc>,
    context: MessageContext,
}

async fn chat(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ServerError> {
    let reply = state.agent.handle_text_turn(id, &request.message).await?;
    Ok(Json(ChatResponse {
        content: reply.content,
        role: reply.role,
        timestamp: reply.timestamp,
        context: reply.context,
    }))
}

#[derive(Debug, Deserialize)]
struct VoiceChatRequest {
    /// Base64-encoded recording
    audio: String,
}

#[derive(Debug, Serialize)]
struct VoiceChatResponse {
    transcription: String,
    content: String,
    role: MessageRole,
    timestamp: DateTime<Utc>,
    context: MessageContext,
    speech_metrics: SpeechMetrics,
    /// Base64-encoded WAV reply, absent when synthesis was skipped
    #[serde(skip_serializing_if = "Option::is_none")]
    response_audio: Option<String>,
    status: tutor_agent::TurnStatus,
}

async fn voice_chat(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<VoiceChatRequest>,
) -> Result<Json<VoiceChatResponse>, ServerError> {
    let audio = BASE64
        .decode(request.audio.as_bytes())
        .map_err(|_| ServerError::InvalidRequest("Invalid audio data format".to_string()))?;

    let reply = state.agent.handle_voice_turn(id, &audio).await?;
    Ok(Json(VoiceChatResponse {
        transcription: reply.transcription,
        content: reply.content,
        role: reply.role,
        timestamp: reply.timestamp,
        context: reply.context,
        speech_metrics: reply.speech_metrics,
        response_audio: reply.response_audio.map(|bytes| BASE64.encode(bytes)),
        status: reply.status,
    }))
}

async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "healthy",
            "version": env!("CARGO_PKG_VERSION"),
            "model": state.settings.upstream.llm_model,
        })),
    )
}
