//! Structured pipeline events.
//!
//! Orchestrators report progress through an injected [`EventSink`] instead of
//! logging directly, so library callers decide how events surface. The binary
//! installs [`TracingSink`]; tests capture events with [`MemorySink`].

use std::sync::Mutex;

/// An observable step of the ingestion or query pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexEvent {
    DocumentProcessed { file: String, chunks: usize },
    DocumentFailed { file: String, reason: String },
    BatchIndexed { start: usize, end: usize },
    BatchFailed { start: usize, end: usize, reason: String },
    StateRecorded { processed: usize, failed: usize },
    LexicalRebuilt { corpus_size: usize },
    DenseHitDropped { chunk_id: String, reason: String },
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: IndexEvent);
}

/// Production sink: forwards events to `tracing` with structured fields.
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: IndexEvent) {
        match event {
            IndexEvent::DocumentProcessed { file, chunks } => {
                tracing::info!(file = %file, chunks, "document processed");
            }
            IndexEvent::DocumentFailed { file, reason } => {
                tracing::warn!(file = %file, reason = %reason, "document failed");
            }
            IndexEvent::BatchIndexed { start, end } => {
                tracing::info!(start, end, "batch indexed");
            }
            IndexEvent::BatchFailed { start, end, reason } => {
                tracing::warn!(start, end, reason = %reason, "batch failed");
            }
            IndexEvent::StateRecorded { processed, failed } => {
                tracing::info!(processed, failed, "tracker state recorded");
            }
            IndexEvent::LexicalRebuilt { corpus_size } => {
                tracing::info!(corpus_size, "lexical model rebuilt");
            }
            IndexEvent::DenseHitDropped { chunk_id, reason } => {
                tracing::warn!(chunk_id = %chunk_id, reason = %reason, "dense hit dropped");
            }
        }
    }
}

/// Sink that discards everything.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: IndexEvent) {}
}

/// Sink that records events in memory for assertions.
#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<IndexEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<IndexEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: IndexEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_records_in_order() {
        let sink = MemorySink::new();
        sink.emit(IndexEvent::BatchIndexed { start: 0, end: 10 });
        sink.emit(IndexEvent::LexicalRebuilt { corpus_size: 10 });

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], IndexEvent::BatchIndexed { start: 0, end: 10 });
    }
}
