use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DexError>;

/// Crate-wide error taxonomy.
///
/// Per-document errors (`UnreadableDocument`, `EmptyInput`) are converted
/// into tracker state during ingestion and never abort a run. Batch index
/// errors (`IndexWrite`) are logged and the run continues. `ModelUnavailable`
/// is the only error a query surfaces for a missing corpus.
#[derive(Error, Debug)]
pub enum DexError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("no extractable text in {0}")]
    EmptyInput(String),

    #[error("unreadable document {file}: {reason}")]
    UnreadableDocument { file: String, reason: String },

    #[error("dense index write failed for chunks {start}..{end}: {reason}")]
    IndexWrite {
        start: usize,
        end: usize,
        reason: String,
    },

    #[error("no lexical model available; run `pdfdex ingest` first")]
    ModelUnavailable,

    #[error("dense hit {0} not present in the lexical corpus snapshot")]
    StaleReference(String),

    #[error("embedding provider error: {0}")]
    Embedding(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
