//! Core data models used throughout pdfdex.
//!
//! These types represent the chunks, corpus entries, and ranked results that
//! flow through the ingestion and retrieval pipeline.

use serde::{Deserialize, Serialize};

/// A chunk of a source document's cleaned text, ready for indexing.
///
/// `chunk_id` is deterministically derived as `{source}_chunk_{ordinal}`
/// (ordinal 1-based), so re-chunking the same document with the same chunker
/// configuration re-indexes in place instead of duplicating.
#[derive(Debug, Clone)]
pub struct IndexedChunk {
    pub chunk_id: String,
    pub source: String,
    pub ordinal: usize,
    pub text: String,
    pub hash: String,
}

/// One entry of the lexical corpus snapshot.
///
/// The snapshot is an ordered sequence; an entry's position is its
/// `corpus_id`. A position is valid only for the snapshot it was taken from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusEntry {
    pub text: String,
    pub source: String,
}

/// A fused search result, ordered descending by `score`.
#[derive(Debug, Clone, Serialize)]
pub struct RankedResult {
    pub text: String,
    pub source: String,
    pub score: f64,
}

/// Per-run ingestion counters reported to the user.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    /// PDFs found in the source directory.
    pub found: usize,
    /// PDFs not yet processed or failed (the work set for this run).
    pub new: usize,
    /// PDFs successfully chunked and handed to the dense index this run.
    pub newly_processed: usize,
    /// PDFs that failed extraction this run.
    pub newly_failed: usize,
    /// Total processed PDFs after this run (durable).
    pub total_processed: usize,
    /// Total failed PDFs after this run (durable).
    pub total_failed: usize,
    /// Chunks written to the dense index this run.
    pub chunks_indexed: usize,
    /// Dense index batches that failed (logged, not fatal).
    pub batches_failed: usize,
    /// Whether the lexical model was rebuilt this run.
    pub lexical_rebuilt: bool,
}
