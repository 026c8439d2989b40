//! HTTP client for the external speech service
//!
//! One sidecar service exposes transcription, pronunciation assessment and
//! synthesis. All three collaborator traits are implemented against it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use tutor_core::traits::{PronunciationAssessor, SpeechToText, TextToSpeech};
use tutor_core::{AssessedWord, AssessmentResult, Error, Result};

/// Speech service configuration
#[derive(Debug, Clone)]
pub struct SpeechClientConfig {
    /// Base URL of the speech service
    pub url: String,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for SpeechClientConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8090".to_string(),
            timeout_ms: 30000,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TranscribeResponse {
    text: String,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AssessWord {
    word: String,
    confidence: f64,
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct AssessResponse {
    words: Vec<AssessWord>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct SynthesizeRequest<'a> {
    text: &'a str,
}

/// Client for the speech sidecar
#[derive(Debug, Clone)]
pub struct HttpSpeechClient {
    config: SpeechClientConfig,
    client: reqwest::Client,
}

impl HttpSpeechClient {
    pub fn new(config: SpeechClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| Error::Internal(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    pub fn new_with_url(url: impl Into<String>) -> Result<Self> {
        Self::new(SpeechClientConfig {
            url: url.into(),
            ..Default::default()
        })
    }

    /// Probe the service, logging but not failing when unreachable
    pub async fn check_health(&self) {
        let url = format!("{}/health", self.config.url);
        match self.client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => {
                debug!(url = %self.config.url, "speech service reachable");
            }
            Ok(resp) => {
                warn!(status = %resp.status(), "speech service returned non-success health status");
            }
            Err(e) => {
                warn!(error = %e, "speech service not reachable, will retry on first request");
            }
        }
    }

    async fn post_wav(&self, path: &str, wav: &[u8]) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.config.url, path);
        let response = self
            .client
            .post(&url)
            .header("Content-Type", "audio/wav")
            .body(wav.to_vec())
            .send()
            .await
            .map_err(|e| Error::Transcription(format!("speech service request failed: {}", e)))?;
        if !response.status().is_success() {
            return Err(Error::Transcription(format!(
                "speech service returned {}",
                response.status()
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl SpeechToText for HttpSpeechClient {
    async fn transcribe(&self, wav: &[u8]) -> Result<String> {
        let response = self.post_wav("/transcribe", wav).await?;
        let body: TranscribeResponse = response
            .json()
            .await
            .map_err(|e| Error::Transcription(format!("bad transcription response: {}", e)))?;
        if let Some(error) = body.error {
            return Err(Error::Transcription(error));
        }
        Ok(body.text)
    }

    fn name(&self) -> &str {
        "http-speech"
    }
}

#[async_trait]
impl PronunciationAssessor for HttpSpeechClient {
    async fn assess(&self, reference: &str, wav: &[u8]) -> Result<AssessmentResult> {
        let url = format!("{}/assess", self.config.url);
        let part = reqwest::multipart::Part::bytes(wav.to_vec())
            .file_name("utterance.wav")
            .mime_str("audio/wav")
            .map_err(|e| Error::Internal(format!("failed to build multipart: {}", e)))?;
        let form = reqwest::multipart::Form::new()
            .text("reference", reference.to_string())
            .part("audio", part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Transcription(format!("assessment request failed: {}", e)))?;
        if !response.status().is_success() {
            return Err(Error::Transcription(format!(
                "assessment service returned {}",
                response.status()
            )));
        }

        let body: AssessResponse = response
            .json()
            .await
            .map_err(|e| Error::Transcription(format!("bad assessment response: {}", e)))?;
        if let Some(error) = body.error {
            return Err(Error::Transcription(error));
        }

        Ok(AssessmentResult {
            words: body
                .words
                .into_iter()
                .map(|w| AssessedWord {
                    word: w.word,
                    confidence: w.confidence,
                    duration_secs: w.duration,
                })
                .collect(),
        })
    }

    fn name(&self) -> &str {
        "http-speech"
    }
}

#[async_trait]
impl TextToSpeech for HttpSpeechClient {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let url = format!("{}/synthesize", self.config.url);
        let response = self
            .client
            .post(&url)
            .json(&SynthesizeRequest { text })
            .send()
            .await
            .map_err(|e| Error::Internal(format!("synthesis request failed: {}", e)))?;
        if !response.status().is_success() {
            return Err(Error::Internal(format!(
                "synthesis service returned {}",
                response.status()
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Internal(format!("failed to read synthesis body: {}", e)))?;
        Ok(bytes.to_vec())
    }

    fn name(&self) -> &str {
        "http-speech"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = SpeechClientConfig::default();
        assert_eq!(config.url, "http://127.0.0.1:8090");
        assert_eq!(config.timeout_ms, 30000);
    }

    #[test]
    fn test_client_builds() {
        assert!(HttpSpeechClient::new_with_url("http://localhost:1234").is_ok());
    }
}
