//! Document Extractor: turns an uploaded PDF into page-ordered plain text.
//!
//! Extraction never fails from the caller's point of view. Unreadable containers and
//! image-only pages produce an empty `ExtractedText` with a diagnostic attached.
//! Parsing is CPU-bound and runs inside `tokio::task::spawn_blocking`.

use bytes::Bytes;
use tracing::{debug, warn};

use crate::models::document::{ExtractedText, ExtractionDiagnostic, ResumeDocument};

/// Extracts text from every page of `document`, in page order.
pub async fn extract(document: &ResumeDocument) -> ExtractedText {
    let text = match extract_pages(document.data.clone()).await {
        Ok(pages) => ExtractedText::from_pages(pages),
        Err(reason) => ExtractedText::empty(ExtractionDiagnostic::Unreadable { reason }),
    };

    match text.diagnostic() {
        Some(diagnostic) => warn!(
            "Extraction of '{}' produced no text: {}",
            document.filename, diagnostic
        ),
        None => debug!(
            "Extracted {} chars from {} page(s) of '{}'",
            text.as_str().len(),
            text.pages_with_text(),
            document.filename
        ),
    }

    text
}

async fn extract_pages(data: Bytes) -> Result<Vec<String>, String> {
    // pdf-extract panics on some malformed inputs; the panic surfaces as a JoinError.
    tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem_by_pages(&data))
        .await
        .map_err(|e| format!("PDF parser aborted on malformed input: {e}"))?
        .map_err(|e| e.to_string())
}
