//! Query orchestrator.
//!
//! Loads the persisted lexical model and corpus snapshot, gathers candidates
//! from both retrieval channels, and fuses them. The snapshot loaded here is
//! the one candidates are resolved against, so a query always sees one
//! consistent corpus even if an ingest ran since the snapshot was written.

use crate::config::Config;
use crate::db;
use crate::dense::SqliteDenseIndex;
use crate::embedding::create_provider;
use crate::error::{DexError, Result};
use crate::events::{EventSink, IndexEvent};
use crate::fusion::{fuse, FusionOutcome};
use crate::lexical::LexicalStore;
use crate::migrate::run_migrations;
use crate::models::RankedResult;

pub async fn answer(
    config: &Config,
    query: &str,
    top_k: usize,
    sink: &dyn EventSink,
) -> Result<Vec<RankedResult>> {
    if query.trim().is_empty() {
        return Ok(Vec::new());
    }

    let store = LexicalStore::new(config);
    let (model, corpus) = store.load()?;
    if corpus.is_empty() {
        return Err(DexError::ModelUnavailable);
    }

    let pool = db::connect(config).await?;
    run_migrations(&pool).await?;
    let provider = create_provider(&config.embedding)?;
    let index = SqliteDenseIndex::new(pool.clone(), provider, config.embedding.batch_size);

    let dense_hits = index.query(query, config.retrieval.candidate_k).await?;
    let lexical_hits = model.query(query, config.retrieval.candidate_k as usize);

    let FusionOutcome { results, dropped } = fuse(
        &dense_hits,
        &lexical_hits,
        &corpus,
        config.retrieval.rrf_k,
        top_k,
    );
    for chunk_id in dropped {
        let err = DexError::StaleReference(chunk_id.clone());
        sink.emit(IndexEvent::DenseHitDropped {
            chunk_id,
            reason: err.to_string(),
        });
    }

    pool.close().await;
    Ok(results)
}

/// CLI presentation: one numbered block per result with a trimmed snippet.
pub fn print_results(query: &str, results: &[RankedResult]) {
    if results.is_empty() {
        println!("No results for '{}'.", query);
        return;
    }

    println!("Results for '{}':\n", query);
    for (i, result) in results.iter().enumerate() {
        println!(
            "{}. [{}] (score {:.4})",
            i + 1,
            result.source,
            result.score
        );
        println!("   {}\n", snippet(&result.text, 240));
    }
}

fn snippet(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_not_truncated() {
        assert_eq!(snippet("short", 240), "short");
    }

    #[test]
    fn long_text_is_cut_with_ellipsis() {
        let text = "word ".repeat(100);
        let s = snippet(&text, 40);
        assert!(s.ends_with("..."));
        assert!(s.chars().count() <= 43);
    }
}
