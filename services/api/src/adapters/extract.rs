//! services/api/src/adapters/extract.rs
//!
//! This module contains the adapter that turns uploaded document bytes into
//! plain text. PDFs are spooled through a named temporary file (removed on
//! every exit path when the handle drops) and read with `pdf-extract`;
//! images go through the `OcrService` port.

use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use studyaid_core::domain::{DocumentKind, UploadedDocument};
use studyaid_core::ports::{OcrService, PortError, PortResult, TextExtractionService};
use tracing::debug;

/// An adapter that implements `TextExtractionService` for PDFs and images.
pub struct TextExtractorAdapter {
    ocr: Arc<dyn OcrService>,
}

impl TextExtractorAdapter {
    /// Creates a new `TextExtractorAdapter`.
    pub fn new(ocr: Arc<dyn OcrService>) -> Self {
        Self { ocr }
    }

    /// Extracts page text from PDF bytes, page order preserved.
    async fn pdf_text(bytes: Vec<u8>) -> PortResult<String> {
        // pdf-extract is synchronous CPU work; keep it off the async runtime.
        tokio::task::spawn_blocking(move || {
            let mut spool = tempfile::NamedTempFile::new()
                .map_err(|e| PortError::Unexpected(e.to_string()))?;
            spool
                .write_all(&bytes)
                .map_err(|e| PortError::Unexpected(e.to_string()))?;
            spool
                .flush()
                .map_err(|e| PortError::Unexpected(e.to_string()))?;

            // The temp file is deleted when `spool` drops, error paths included.
            pdf_extract::extract_text(spool.path())
                .map_err(|e| PortError::Malformed(format!("could not read PDF: {}", e)))
        })
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?
    }
}

#[async_trait]
impl TextExtractionService for TextExtractorAdapter {
    async fn extract_text(&self, document: &UploadedDocument) -> PortResult<String> {
        let text = match document.kind {
            DocumentKind::Pdf => Self::pdf_text(document.bytes.clone()).await?,
            DocumentKind::Image => {
                let lines = self.ocr.recognize(&document.bytes).await?;
                // Text fields only, joined with single spaces in detection order.
                lines
                    .into_iter()
                    .map(|line| line.text)
                    .collect::<Vec<_>>()
                    .join(" ")
            }
        };
        debug!(chars = text.len(), "extracted document text");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studyaid_core::ports::OcrLine;

    struct CannedOcr(Vec<&'static str>);

    #[async_trait]
    impl OcrService for CannedOcr {
        async fn recognize(&self, _image: &[u8]) -> PortResult<Vec<OcrLine>> {
            Ok(self
                .0
                .iter()
                .map(|text| OcrLine {
                    text: text.to_string(),
                    confidence: 0.9,
                })
                .collect())
        }
    }

    #[tokio::test]
    async fn image_text_is_joined_with_single_spaces() {
        let adapter = TextExtractorAdapter::new(Arc::new(CannedOcr(vec![
            "Unit 1:",
            "Sorting",
            "Algorithms",
        ])));
        let document = UploadedDocument {
            kind: DocumentKind::Image,
            bytes: vec![0u8; 4],
        };
        let text = adapter.extract_text(&document).await.unwrap();
        assert_eq!(text, "Unit 1: Sorting Algorithms");
    }

    #[tokio::test]
    async fn unreadable_pdf_is_a_recoverable_error() {
        let adapter = TextExtractorAdapter::new(Arc::new(CannedOcr(vec![])));
        let document = UploadedDocument {
            kind: DocumentKind::Pdf,
            bytes: b"definitely not a pdf".to_vec(),
        };
        assert!(matches!(
            adapter.extract_text(&document).await,
            Err(PortError::Malformed(_))
        ));
    }
}
