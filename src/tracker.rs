//! Corpus state tracker.
//!
//! Durable record of which PDFs have been processed or have failed, stored as
//! line-delimited append-only files under the persist directory. Reads are
//! forgiving (a missing or unreadable file is an empty set, so a fresh
//! deployment re-ingests everything); writes propagate errors because losing
//! state silently would cause duplicate ingestion on the next run.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use crate::config::Config;
use crate::error::Result;

pub struct CorpusTracker {
    processed_path: PathBuf,
    failed_path: PathBuf,
}

impl CorpusTracker {
    pub fn new(config: &Config) -> Self {
        Self {
            processed_path: config.processed_path(),
            failed_path: config.failed_path(),
        }
    }

    pub fn load_processed(&self) -> HashSet<String> {
        load_lines(&self.processed_path)
    }

    pub fn load_failed(&self) -> HashSet<String> {
        load_lines(&self.failed_path)
    }

    pub fn record_processed(&self, files: &[String]) -> Result<()> {
        append_lines(&self.processed_path, files)
    }

    pub fn record_failed(&self, files: &[String]) -> Result<()> {
        append_lines(&self.failed_path, files)
    }

    /// Files from `all` that are neither processed nor failed, in the order
    /// they were enumerated.
    pub fn pending(
        all: &[String],
        processed: &HashSet<String>,
        failed: &HashSet<String>,
    ) -> Vec<String> {
        all.iter()
            .filter(|f| !processed.contains(*f) && !failed.contains(*f))
            .cloned()
            .collect()
    }
}

fn load_lines(path: &PathBuf) -> HashSet<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => content
            .lines()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect(),
        Err(_) => HashSet::new(),
    }
}

fn append_lines(path: &PathBuf, files: &[String]) -> Result<()> {
    if files.is_empty() {
        return Ok(());
    }
    let mut block = files.join("\n");
    block.push('\n');

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    // One write per call keeps lines from interleaving across runs.
    file.write_all(block.as_bytes())?;
    Ok(())
}
