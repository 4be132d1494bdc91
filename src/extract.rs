//! Document text extraction.
//!
//! Parsing is CPU-bound, so it runs on the blocking worker pool instead
//! of the async reactor.

use async_trait::async_trait;
use tracing::info;

use crate::errors::GatewayError;

#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, filename: &str, bytes: Vec<u8>) -> Result<String, GatewayError>;
}

/// PDF text extractor backed by `pdf-extract`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

#[async_trait]
impl TextExtractor for PdfExtractor {
    async fn extract(&self, filename: &str, bytes: Vec<u8>) -> Result<String, GatewayError> {
        if bytes.is_empty() {
            return Err(GatewayError::Extraction("empty file content".to_string()));
        }

        let name = filename.to_string();
        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await
            .map_err(|e| GatewayError::Extraction(format!("PDF worker failed for {name}: {e}")))?
            .map_err(|e| GatewayError::Extraction(format!("failed to parse {filename}: {e}")))?;

        if text.trim().is_empty() {
            return Err(GatewayError::Extraction(format!(
                "no text extracted from {filename}"
            )));
        }

        info!(filename, chars = text.len(), "extracted document text");
        Ok(text)
    }
}
