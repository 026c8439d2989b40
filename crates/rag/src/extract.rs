//! Plain-text document extraction

use std::path::Path;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use tutor_core::traits::TextExtractor;
use tutor_core::{Error, Result};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\r\f]+").unwrap());
static BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n+").unwrap());

/// Extractor for plain-text formats (.txt, .md)
#[derive(Debug, Clone, Default)]
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    pub fn new() -> Self {
        Self
    }

    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                let lower = e.to_lowercase();
                self.supported_extensions().contains(&lower.as_str())
            })
            .unwrap_or(false)
    }
}

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    async fn extract_text(&self, path: &Path) -> Result<String> {
        if !self.is_supported(path) {
            return Err(Error::InvalidInput(format!(
                "unsupported file type: {}",
                path.display()
            )));
        }

        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::Ingestion(format!("failed to read {}: {}", path.display(), e)))?;

        // Collapse runs of spaces and blank lines, keep paragraph breaks
        let collapsed = WHITESPACE.replace_all(&raw, " ");
        let normalized = BLANK_LINES.replace_all(&collapsed, "\n\n");
        let text = normalized.trim().to_string();

        debug!(path = %path.display(), chars = text.len(), "document text extracted");
        Ok(text)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["txt", "md"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_extracts_and_normalizes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        tokio::fs::write(&path, "Line  one\t here.\n\n\n\nLine two.\n")
            .await
            .unwrap();

        let extractor = PlainTextExtractor::new();
        let text = extractor.extract_text(&path).await.unwrap();
        assert_eq!(text, "Line one here.\n\nLine two.");
    }

    #[tokio::test]
    async fn test_rejects_unsupported_extension() {
        let extractor = PlainTextExtractor::new();
        let err = extractor
            .extract_text(Path::new("document.exe"))
            .await
            .unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[tokio::test]
    async fn test_missing_file_is_ingestion_error() {
        let extractor = PlainTextExtractor::new();
        let err = extractor
            .extract_text(Path::new("/nonexistent/file.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Ingestion(_)));
    }
}
