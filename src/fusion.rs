//! Reciprocal Rank Fusion of dense and lexical candidates.
//!
//! Pure ranking logic: no IO, no state. Each source contributes
//! `1 / (rrf_k + rank)` per hit, with 0-based ranks, so the fused score only
//! depends on rank positions, never on the raw score scales of either source.
//!
//! Dense hits carry chunk text, not corpus positions; they are resolved to a
//! position by exact text lookup against the snapshot. A hit whose text is
//! absent from the snapshot comes from index state newer (or older) than the
//! snapshot and is dropped, not an error.

use std::collections::HashMap;

use crate::dense::DenseHit;
use crate::lexical::LexicalHit;
use crate::models::{CorpusEntry, RankedResult};

#[derive(Debug, Default)]
pub struct FusionOutcome {
    pub results: Vec<RankedResult>,
    /// Chunk ids of dense hits that could not be resolved to the snapshot.
    pub dropped: Vec<String>,
}

pub fn fuse(
    dense_hits: &[DenseHit],
    lexical_hits: &[LexicalHit],
    corpus: &[CorpusEntry],
    rrf_k: f64,
    top_k: usize,
) -> FusionOutcome {
    // First occurrence wins so duplicate texts resolve deterministically.
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for (id, entry) in corpus.iter().enumerate() {
        positions.entry(entry.text.as_str()).or_insert(id);
    }

    let mut scores: HashMap<usize, f64> = HashMap::new();
    let mut dropped = Vec::new();

    for (rank, hit) in dense_hits.iter().enumerate() {
        match positions.get(hit.text.as_str()) {
            Some(&id) => {
                *scores.entry(id).or_insert(0.0) += 1.0 / (rrf_k + rank as f64);
            }
            None => dropped.push(hit.chunk_id.clone()),
        }
    }

    for (rank, hit) in lexical_hits.iter().enumerate() {
        if hit.corpus_id >= corpus.len() {
            continue;
        }
        *scores.entry(hit.corpus_id).or_insert(0.0) += 1.0 / (rrf_k + rank as f64);
    }

    let mut ranked: Vec<(usize, f64)> = scores.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(top_k);

    let results = ranked
        .into_iter()
        .map(|(id, score)| RankedResult {
            text: corpus[id].text.clone(),
            source: corpus[id].source.clone(),
            score,
        })
        .collect();

    FusionOutcome { results, dropped }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(texts: &[&str]) -> Vec<CorpusEntry> {
        texts
            .iter()
            .map(|t| CorpusEntry {
                text: t.to_string(),
                source: "doc.pdf".to_string(),
            })
            .collect()
    }

    fn dense(rank_texts: &[&str]) -> Vec<DenseHit> {
        rank_texts
            .iter()
            .enumerate()
            .map(|(i, t)| DenseHit {
                chunk_id: format!("chunk_{}", i),
                source: "doc.pdf".to_string(),
                text: t.to_string(),
                distance: i as f64 * 0.1,
            })
            .collect()
    }

    fn lexical(ids: &[usize]) -> Vec<LexicalHit> {
        ids.iter()
            .enumerate()
            .map(|(i, &id)| LexicalHit {
                corpus_id: id,
                score: 10.0 - i as f64,
            })
            .collect()
    }

    #[test]
    fn empty_inputs_fuse_to_nothing() {
        let outcome = fuse(&[], &[], &corpus(&["a"]), 60.0, 5);
        assert!(outcome.results.is_empty());
        assert!(outcome.dropped.is_empty());
    }

    #[test]
    fn agreement_between_sources_outranks_a_single_source() {
        let corpus = corpus(&["both", "dense only", "lexical only"]);
        // "both" is rank 1 in dense and rank 0 in lexical; "dense only"
        // leads the dense list but gets no lexical support.
        let outcome = fuse(
            &dense(&["dense only", "both"]),
            &lexical(&[0, 2]),
            &corpus,
            60.0,
            5,
        );

        assert_eq!(outcome.results[0].text, "both");
        assert!(outcome.results[0].score > outcome.results[1].score);
    }

    #[test]
    fn only_candidate_documents_appear() {
        let corpus = corpus(&["a", "b", "c", "d"]);
        let outcome = fuse(&dense(&["a"]), &lexical(&[2]), &corpus, 60.0, 10);

        let texts: Vec<&str> = outcome.results.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts.len(), 2);
        assert!(texts.contains(&"a"));
        assert!(texts.contains(&"c"));
    }

    #[test]
    fn tied_scores_break_by_lower_corpus_id() {
        let corpus = corpus(&["a", "b"]);
        // Each document is rank 0 in exactly one source: identical scores.
        let outcome = fuse(&dense(&["b"]), &lexical(&[0]), &corpus, 60.0, 5);

        assert_eq!(outcome.results.len(), 2);
        assert_eq!(outcome.results[0].text, "a");
        assert_eq!(outcome.results[1].text, "b");
    }

    #[test]
    fn stale_dense_hits_are_dropped_not_fatal() {
        let corpus = corpus(&["present"]);
        let outcome = fuse(
            &dense(&["no longer in snapshot", "present"]),
            &[],
            &corpus,
            60.0,
            5,
        );

        assert_eq!(outcome.dropped, vec!["chunk_0".to_string()]);
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].text, "present");
    }

    #[test]
    fn top_k_truncates_after_fusion() {
        let corpus = corpus(&["a", "b", "c"]);
        let outcome = fuse(&dense(&["a", "b", "c"]), &lexical(&[2]), &corpus, 60.0, 2);
        assert_eq!(outcome.results.len(), 2);
        // "c" has support from both sources despite trailing the dense list.
        assert!(outcome.results.iter().any(|r| r.text == "c"));
    }

    #[test]
    fn fusion_is_pure_and_deterministic() {
        let corpus = corpus(&["a", "b", "c"]);
        let d = dense(&["b", "a"]);
        let l = lexical(&[0, 2]);
        let first = fuse(&d, &l, &corpus, 60.0, 5);
        let second = fuse(&d, &l, &corpus, 60.0, 5);
        assert_eq!(
            first.results.iter().map(|r| &r.text).collect::<Vec<_>>(),
            second.results.iter().map(|r| &r.text).collect::<Vec<_>>()
        );
    }
}
