//! Lexical (BM25) index adapter.
//!
//! The model is rebuilt from the full corpus snapshot whenever the corpus
//! changes, so document-frequency statistics always reflect the whole corpus.
//! Model and snapshot are persisted together as JSON; a missing artifact at
//! query time means no ingestion has completed yet.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{DexError, Result};
use crate::models::CorpusEntry;

pub const DEFAULT_K1: f64 = 1.5;
pub const DEFAULT_B: f64 = 0.75;

/// Lowercase whitespace tokenization, matching the corpus and the query.
fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(|t| t.to_lowercase()).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct LexicalHit {
    /// Position of the document in the corpus snapshot the model was built from.
    pub corpus_id: usize,
    pub score: f64,
}

/// BM25 Okapi model over a corpus snapshot.
///
/// IDF uses the `ln(1 + (N - n + 0.5) / (n + 0.5))` variant, which stays
/// positive even for terms present in most documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bm25Model {
    k1: f64,
    b: f64,
    avgdl: f64,
    doc_lens: Vec<usize>,
    term_freqs: Vec<HashMap<String, u32>>,
    idf: HashMap<String, f64>,
}

impl Bm25Model {
    pub fn build(corpus: &[CorpusEntry], k1: f64, b: f64) -> Self {
        let mut doc_lens = Vec::with_capacity(corpus.len());
        let mut term_freqs = Vec::with_capacity(corpus.len());
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for entry in corpus {
            let tokens = tokenize(&entry.text);
            doc_lens.push(tokens.len());

            let mut freqs: HashMap<String, u32> = HashMap::new();
            for token in tokens {
                *freqs.entry(token).or_insert(0) += 1;
            }
            for term in freqs.keys() {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
            }
            term_freqs.push(freqs);
        }

        let n = corpus.len() as f64;
        let avgdl = if corpus.is_empty() {
            0.0
        } else {
            doc_lens.iter().sum::<usize>() as f64 / n
        };

        let idf = doc_freq
            .into_iter()
            .map(|(term, df)| {
                let df = df as f64;
                (term, (1.0 + (n - df + 0.5) / (df + 0.5)).ln())
            })
            .collect();

        Self {
            k1,
            b,
            avgdl,
            doc_lens,
            term_freqs,
            idf,
        }
    }

    pub fn len(&self) -> usize {
        self.doc_lens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_lens.is_empty()
    }

    fn score_doc(&self, corpus_id: usize, query_terms: &[String]) -> f64 {
        let freqs = &self.term_freqs[corpus_id];
        let dl = self.doc_lens[corpus_id] as f64;
        let norm = if self.avgdl > 0.0 {
            1.0 - self.b + self.b * dl / self.avgdl
        } else {
            1.0
        };

        let mut score = 0.0;
        for term in query_terms {
            let tf = *freqs.get(term).unwrap_or(&0) as f64;
            if tf == 0.0 {
                continue;
            }
            let idf = *self.idf.get(term).unwrap_or(&0.0);
            score += idf * (tf * (self.k1 + 1.0)) / (tf + self.k1 * norm);
        }
        score
    }

    /// Top `k` documents matching `text`, descending by score, ties by lower
    /// corpus id. Documents with no matching term are omitted.
    pub fn query(&self, text: &str, k: usize) -> Vec<LexicalHit> {
        let terms = tokenize(text);
        if terms.is_empty() {
            return Vec::new();
        }

        let mut hits: Vec<LexicalHit> = (0..self.len())
            .filter_map(|id| {
                let score = self.score_doc(id, &terms);
                (score > 0.0).then_some(LexicalHit {
                    corpus_id: id,
                    score,
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.corpus_id.cmp(&b.corpus_id))
        });
        hits.truncate(k);
        hits
    }
}

/// Persists the BM25 model and its corpus snapshot as a pair.
///
/// The two files are only ever written together; loading with either one
/// missing is `ModelUnavailable`.
pub struct LexicalStore {
    model_path: PathBuf,
    corpus_path: PathBuf,
}

impl LexicalStore {
    pub fn new(config: &Config) -> Self {
        Self {
            model_path: config.model_path(),
            corpus_path: config.corpus_path(),
        }
    }

    pub fn exists(&self) -> bool {
        self.model_path.exists() && self.corpus_path.exists()
    }

    pub fn save(&self, model: &Bm25Model, corpus: &[CorpusEntry]) -> Result<()> {
        if let Some(parent) = self.model_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.model_path, serde_json::to_vec(model)?)?;
        std::fs::write(&self.corpus_path, serde_json::to_vec(corpus)?)?;
        Ok(())
    }

    pub fn load(&self) -> Result<(Bm25Model, Vec<CorpusEntry>)> {
        if !self.exists() {
            return Err(DexError::ModelUnavailable);
        }
        let model: Bm25Model = serde_json::from_slice(&std::fs::read(&self.model_path)?)?;
        let corpus: Vec<CorpusEntry> = serde_json::from_slice(&std::fs::read(&self.corpus_path)?)?;
        Ok((model, corpus))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        ChunkingConfig, EmbeddingConfig, IndexingConfig, RetrievalConfig, StorageConfig,
    };
    use tempfile::TempDir;

    fn entry(text: &str) -> CorpusEntry {
        CorpusEntry {
            text: text.to_string(),
            source: "doc.pdf".to_string(),
        }
    }

    #[test]
    fn matching_terms_rank_first_with_positive_score() {
        let corpus = vec![
            entry("shipping times and delivery estimates"),
            entry("the refund policy covers all returned items"),
            entry("warranty claims and repairs"),
        ];
        let model = Bm25Model::build(&corpus, DEFAULT_K1, DEFAULT_B);

        let hits = model.query("refund policy", 10);
        assert!(!hits.is_empty());
        assert_eq!(hits[0].corpus_id, 1);
        assert!(hits[0].score > 0.0);
    }

    #[test]
    fn non_matching_documents_are_omitted() {
        let corpus = vec![entry("alpha beta"), entry("gamma delta")];
        let model = Bm25Model::build(&corpus, DEFAULT_K1, DEFAULT_B);

        let hits = model.query("alpha", 10);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].corpus_id, 0);
    }

    #[test]
    fn tokenization_is_case_insensitive() {
        let corpus = vec![entry("The Refund POLICY")];
        let model = Bm25Model::build(&corpus, DEFAULT_K1, DEFAULT_B);
        assert_eq!(model.query("refund", 1).len(), 1);
    }

    #[test]
    fn tied_scores_break_by_lower_corpus_id() {
        let corpus = vec![entry("alpha beta"), entry("alpha beta")];
        let model = Bm25Model::build(&corpus, DEFAULT_K1, DEFAULT_B);

        let hits = model.query("alpha", 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].corpus_id, 0);
        assert_eq!(hits[1].corpus_id, 1);
    }

    #[test]
    fn empty_query_yields_no_hits() {
        let corpus = vec![entry("alpha")];
        let model = Bm25Model::build(&corpus, DEFAULT_K1, DEFAULT_B);
        assert!(model.query("   ", 5).is_empty());
    }

    #[test]
    fn store_roundtrip_preserves_scores() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            storage: StorageConfig {
                pdf_dir: dir.path().join("pdfs"),
                persist_dir: dir.path().to_path_buf(),
            },
            chunking: ChunkingConfig::default(),
            retrieval: RetrievalConfig::default(),
            indexing: IndexingConfig::default(),
            embedding: EmbeddingConfig::default(),
        };
        let store = LexicalStore::new(&config);
        assert!(!store.exists());
        assert!(matches!(store.load(), Err(DexError::ModelUnavailable)));

        let corpus = vec![entry("refund policy"), entry("shipping times")];
        let model = Bm25Model::build(&corpus, DEFAULT_K1, DEFAULT_B);
        store.save(&model, &corpus).unwrap();

        let (loaded, loaded_corpus) = store.load().unwrap();
        assert_eq!(loaded_corpus, corpus);
        assert_eq!(loaded.query("refund", 5), model.query("refund", 5));
    }
}
