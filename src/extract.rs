//! PDF text extraction behind a narrow trait.
//!
//! The ingestion orchestrator depends on [`TextExtractor`] rather than on a
//! concrete parser, so tests can substitute canned page text. The production
//! implementation wraps the `pdf-extract` crate.

use std::path::Path;

use crate::error::{DexError, Result};

pub trait TextExtractor: Send + Sync {
    /// Extract the text of each page of the document at `path`.
    fn extract(&self, path: &Path) -> Result<Vec<String>>;
}

/// Extractor backed by the `pdf-extract` crate.
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract(&self, path: &Path) -> Result<Vec<String>> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        let bytes = std::fs::read(path).map_err(|e| DexError::UnreadableDocument {
            file: file_name.clone(),
            reason: e.to_string(),
        })?;

        let text = pdf_extract::extract_text_from_mem(&bytes).map_err(|e| {
            DexError::UnreadableDocument {
                file: file_name,
                reason: e.to_string(),
            }
        })?;

        Ok(vec![text])
    }
}

/// Replace non-ASCII bytes with spaces and collapse runs of whitespace.
/// PDF extraction emits ligatures, soft hyphens, and stray control
/// characters that would otherwise pollute tokenization.
pub fn clean_text(text: &str) -> String {
    let ascii: String = text
        .chars()
        .map(|c| if c.is_ascii() { c } else { ' ' })
        .collect();
    ascii.split_whitespace().collect::<Vec<_>>().join(" ")
}
