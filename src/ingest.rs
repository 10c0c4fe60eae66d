//! Ingestion orchestrator.
//!
//! One run moves through fixed stages: scan the PDF directory, extract and
//! chunk each pending document, index chunks in batches, persist tracker
//! state, then rebuild the lexical model. Per-document failures and batch
//! failures are recorded and reported but never abort the run; only state
//! persistence errors do, because losing tracker state would duplicate work
//! on the next run.

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::chunk::chunk;
use crate::config::Config;
use crate::db;
use crate::dense::SqliteDenseIndex;
use crate::embedding::create_provider;
use crate::error::{DexError, Result};
use crate::events::{EventSink, IndexEvent};
use crate::extract::{clean_text, TextExtractor};
use crate::lexical::{Bm25Model, LexicalStore, DEFAULT_B, DEFAULT_K1};
use crate::migrate::run_migrations;
use crate::models::{IndexedChunk, IngestReport};
use crate::tracker::CorpusTracker;

pub async fn run_ingest(
    config: &Config,
    extractor: &dyn TextExtractor,
    sink: &dyn EventSink,
) -> Result<IngestReport> {
    let mut report = IngestReport::default();

    let all = scan_pdf_directory(&config.storage.pdf_dir)?;
    report.found = all.len();

    let tracker = CorpusTracker::new(config);
    let processed = tracker.load_processed();
    let failed = tracker.load_failed();
    let pending = CorpusTracker::pending(&all, &processed, &failed);
    report.new = pending.len();

    let pool = db::connect(config).await?;
    run_migrations(&pool).await?;
    let provider = create_provider(&config.embedding)?;
    let index = SqliteDenseIndex::new(pool.clone(), provider, config.embedding.batch_size);
    let store = LexicalStore::new(config);

    let mut new_chunks: Vec<IndexedChunk> = Vec::new();
    let mut newly_processed: Vec<String> = Vec::new();
    let mut newly_failed: Vec<String> = Vec::new();

    for file in &pending {
        match extract_document(extractor, &config.storage.pdf_dir, file, config) {
            Ok(chunks) => {
                sink.emit(IndexEvent::DocumentProcessed {
                    file: file.clone(),
                    chunks: chunks.len(),
                });
                new_chunks.extend(chunks);
                newly_processed.push(file.clone());
            }
            Err(e) => {
                sink.emit(IndexEvent::DocumentFailed {
                    file: file.clone(),
                    reason: e.to_string(),
                });
                newly_failed.push(file.clone());
            }
        }
    }

    let batch_size = config.indexing.batch_size.max(1);
    for (i, batch) in new_chunks.chunks(batch_size).enumerate() {
        let start = i * batch_size;
        let end = start + batch.len();
        match index.add_batch(batch).await {
            Ok(()) => {
                sink.emit(IndexEvent::BatchIndexed { start, end });
                report.chunks_indexed += batch.len();
            }
            Err(e) => {
                let err = DexError::IndexWrite {
                    start,
                    end,
                    reason: e.to_string(),
                };
                sink.emit(IndexEvent::BatchFailed {
                    start,
                    end,
                    reason: err.to_string(),
                });
                report.batches_failed += 1;
            }
        }
    }

    // Documents count as processed even when some of their batches failed;
    // the original text can always be re-ingested by clearing the tracker.
    tracker.record_failed(&newly_failed)?;
    tracker.record_processed(&newly_processed)?;

    report.newly_processed = newly_processed.len();
    report.newly_failed = newly_failed.len();
    report.total_processed = processed.len() + newly_processed.len();
    report.total_failed = failed.len() + newly_failed.len();
    sink.emit(IndexEvent::StateRecorded {
        processed: report.total_processed,
        failed: report.total_failed,
    });

    if !newly_processed.is_empty() || !store.exists() {
        let corpus = index.corpus().await?;
        if !corpus.is_empty() {
            let model = Bm25Model::build(&corpus, DEFAULT_K1, DEFAULT_B);
            store.save(&model, &corpus)?;
            sink.emit(IndexEvent::LexicalRebuilt {
                corpus_size: corpus.len(),
            });
            report.lexical_rebuilt = true;
        }
    }

    pool.close().await;
    Ok(report)
}

/// Non-recursive listing of `.pdf` files (case-insensitive extension),
/// sorted by name so run order is deterministic.
fn scan_pdf_directory(dir: &Path) -> Result<Vec<String>> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        DexError::Configuration(format!("cannot read pdf directory {}: {}", dir.display(), e))
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name.to_lowercase().ends_with(".pdf") {
            files.push(name);
        }
    }
    files.sort();
    Ok(files)
}

fn extract_document(
    extractor: &dyn TextExtractor,
    pdf_dir: &Path,
    file: &str,
    config: &Config,
) -> Result<Vec<IndexedChunk>> {
    let pages = extractor.extract(&pdf_dir.join(file))?;
    let text = clean_text(&pages.join("\n"));
    if text.is_empty() {
        return Err(DexError::EmptyInput(file.to_string()));
    }

    let pieces = chunk(
        &text,
        config.chunking.chunk_size,
        config.chunking.chunk_overlap,
    )?;

    Ok(pieces
        .into_iter()
        .enumerate()
        .map(|(i, piece)| {
            let hash = format!("{:x}", Sha256::digest(piece.as_bytes()));
            IndexedChunk {
                chunk_id: format!("{}_chunk_{}", file, i + 1),
                source: file.to_string(),
                ordinal: i + 1,
                text: piece,
                hash,
            }
        })
        .collect())
}
