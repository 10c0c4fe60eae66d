use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{DexError, Result};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub storage: StorageConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub indexing: IndexingConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory scanned (non-recursively) for `.pdf` files.
    pub pdf_dir: PathBuf,
    /// Directory holding the dense index database, tracking files, and the
    /// persisted lexical model.
    pub persist_dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

fn default_chunk_size() -> usize {
    2000
}
fn default_chunk_overlap() -> usize {
    200
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    /// Results returned to the user.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Candidates fetched from each channel before fusion.
    #[serde(default = "default_candidate_k")]
    pub candidate_k: i64,
    /// RRF damping constant; rank position matters, not score magnitude.
    #[serde(default = "default_rrf_k")]
    pub rrf_k: f64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            candidate_k: default_candidate_k(),
            rrf_k: default_rrf_k(),
        }
    }
}

fn default_top_k() -> usize {
    5
}
fn default_candidate_k() -> i64 {
    50
}
fn default_rrf_k() -> f64 {
    60.0
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndexingConfig {
    /// Chunks per dense index write. Batch boundaries are not atomicity
    /// boundaries; a failed batch does not roll back prior batches.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
        }
    }
}

fn default_batch_size() -> usize {
    1000
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    /// `hash`, `openai`, or `ollama`.
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub dims: Option<usize>,
    /// Base URL for the `ollama` provider.
    #[serde(default)]
    pub url: Option<String>,
    /// Texts per embedding request.
    #[serde(default = "default_embed_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            dims: None,
            url: None,
            batch_size: default_embed_batch_size(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_provider() -> String {
    "hash".to_string()
}
fn default_embed_batch_size() -> usize {
    64
}
fn default_max_retries() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    30
}

impl Config {
    pub fn db_path(&self) -> PathBuf {
        self.storage.persist_dir.join("index.sqlite")
    }

    pub fn processed_path(&self) -> PathBuf {
        self.storage.persist_dir.join("processed_pdfs.txt")
    }

    pub fn failed_path(&self) -> PathBuf {
        self.storage.persist_dir.join("failed_pdfs.txt")
    }

    pub fn model_path(&self) -> PathBuf {
        self.storage.persist_dir.join("bm25_model.json")
    }

    pub fn corpus_path(&self) -> PathBuf {
        self.storage.persist_dir.join("lexical_corpus.json")
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        DexError::Configuration(format!("failed to read config file {}: {}", path.display(), e))
    })?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| DexError::Configuration(format!("failed to parse config file: {}", e)))?;

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.chunking.chunk_size == 0 {
        return Err(DexError::Configuration(
            "chunking.chunk_size must be > 0".to_string(),
        ));
    }

    if config.chunking.chunk_overlap >= config.chunking.chunk_size {
        return Err(DexError::Configuration(format!(
            "chunking.chunk_overlap ({}) must be smaller than chunk_size ({})",
            config.chunking.chunk_overlap, config.chunking.chunk_size
        )));
    }

    if config.retrieval.top_k < 1 {
        return Err(DexError::Configuration(
            "retrieval.top_k must be >= 1".to_string(),
        ));
    }

    if config.retrieval.candidate_k < 1 {
        return Err(DexError::Configuration(
            "retrieval.candidate_k must be >= 1".to_string(),
        ));
    }

    if config.retrieval.rrf_k <= 0.0 {
        return Err(DexError::Configuration(
            "retrieval.rrf_k must be > 0".to_string(),
        ));
    }

    if config.indexing.batch_size == 0 {
        return Err(DexError::Configuration(
            "indexing.batch_size must be > 0".to_string(),
        ));
    }

    match config.embedding.provider.as_str() {
        "hash" => {}
        "openai" | "ollama" => {
            if config.embedding.model.is_none() {
                return Err(DexError::Configuration(format!(
                    "embedding.model must be specified when provider is '{}'",
                    config.embedding.provider
                )));
            }
            if config.embedding.dims.is_none() || config.embedding.dims == Some(0) {
                return Err(DexError::Configuration(format!(
                    "embedding.dims must be > 0 when provider is '{}'",
                    config.embedding.provider
                )));
            }
        }
        other => {
            return Err(DexError::Configuration(format!(
                "unknown embedding provider: '{}'. Must be hash, openai, or ollama.",
                other
            )));
        }
    }

    Ok(())
}
