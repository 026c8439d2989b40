//! Document ingestion interface

use async_trait::async_trait;

use crate::Result;

/// Extracts plain text from an uploaded document
#[async_trait]
pub trait TextExtractor: Send + Sync + 'static {
    /// Extract and normalize the text content of a file
    async fn extract_text(&self, path: &std::path::Path) -> Result<String>;

    /// File extensions this extractor accepts, lowercase without the dot
    fn supported_extensions(&self) -> &[&str];
}
