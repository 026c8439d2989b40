//! Tutoring backend entry point

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tutor_agent::{AgentConfig, Collaborators, TutorAgent};
use tutor_config::{load_settings, Settings};
use tutor_llm::{LlmConfig, OpenAiChatBackend};
use tutor_persistence::InMemoryChatStore;
use tutor_rag::{ChunkerConfig, InMemoryVectorIndex, PlainTextExtractor, RankerConfig, RetrieverConfig};
use tutor_server::{create_router, AppState};
use tutor_speech::{
    HttpSpeechClient, ScoringConfig, SpeechClientConfig, WavPitchExtractor,
    WavPitchExtractorConfig,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = match load_settings() {
        Ok(settings) => settings,
        Err(e) => {
            // Tracing not yet initialized
            eprintln!("Warning: failed to load config: {}. Using defaults.", e);
            Settings::default()
        }
    };

    init_tracing();
    tracing::info!("Starting tutor backend v{}", env!("CARGO_PKG_VERSION"));

    let speech = Arc::new(HttpSpeechClient::new(SpeechClientConfig {
        url: settings.upstream.speech_url.clone(),
        timeout_ms: settings.upstream.timeout_ms,
    })?);
    speech.check_health().await;

    let llm = OpenAiChatBackend::new(LlmConfig {
        model: settings.upstream.llm_model.clone(),
        endpoint: settings.upstream.llm_url.clone(),
        api_key: settings.upstream.llm_api_key.clone(),
        timeout: Duration::from_millis(settings.upstream.timeout_ms),
        ..LlmConfig::default()
    })?;
    tracing::info!(
        model = %settings.upstream.llm_model,
        endpoint = %settings.upstream.llm_url,
        "Generation backend configured"
    );

    let collaborators = Collaborators {
        store: Arc::new(InMemoryChatStore::new()),
        extractor: Arc::new(PlainTextExtractor::new()),
        index: Arc::new(InMemoryVectorIndex::new()),
        stt: speech.clone(),
        assessor: speech.clone(),
        pitch: Arc::new(WavPitchExtractor::new(WavPitchExtractorConfig::default())),
        tts: speech,
        llm: Arc::new(llm),
    };
    let agent = Arc::new(TutorAgent::new(collaborators, agent_config(&settings)));

    let app = create_router(AppState::new(agent, settings.clone()));

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tutor=info,tutor_backend=info,tower_http=info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn agent_config(settings: &Settings) -> AgentConfig {
    AgentConfig {
        document_dir: settings.storage.document_dir.clone().into(),
        temp_dir: settings.storage.temp_dir.clone().into(),
        history_limit: settings.context.history_limit,
        relevance_threshold: settings.context.relevance_threshold,
        sample_rate: settings.speech.sample_rate,
        chunker: ChunkerConfig {
            chunk_size: settings.rag.chunk_size,
            chunk_overlap: settings.rag.chunk_overlap,
        },
        retriever: RetrieverConfig {
            top_k: settings.rag.top_k,
            fetch_headroom: settings.rag.fetch_headroom,
            ranker: RankerConfig {
                similarity_weight: settings.rag.weights.similarity,
                position_weight: settings.rag.weights.position,
                recency_weight: settings.rag.weights.recency,
                length_weight: settings.rag.weights.length,
                overlap_weight: settings.rag.weights.overlap,
                ..RankerConfig::default()
            },
        },
        scoring: ScoringConfig {
            confidence_threshold: settings.speech.confidence_threshold,
            reference_wpm: settings.speech.reference_wpm,
            accuracy_weight: settings.speech.weights.accuracy,
            completeness_weight: settings.speech.weights.completeness,
            fluency_weight: settings.speech.weights.fluency,
            pronunciation_weight: settings.speech.weights.pronunciation,
        },
    }
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
