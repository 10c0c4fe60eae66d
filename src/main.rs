//! # pdfdex CLI
//!
//! ```bash
//! pdfdex --config ./config/pdfdex.toml <command>
//! ```
//!
//! | Command | Description |
//! |---------|-------------|
//! | `pdfdex ingest` | Scan the PDF directory and index new documents |
//! | `pdfdex search "<query>"` | Query the hybrid index |
//!
//! Ingestion is incremental: documents already processed (or already recorded
//! as failed) are skipped on subsequent runs. The database schema is created
//! on first ingest; no separate init step is needed.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use pdfdex::config;
use pdfdex::events::TracingSink;
use pdfdex::extract::PdfExtractor;
use pdfdex::{ingest, search};

/// pdfdex — hybrid (dense + BM25) retrieval over a directory of PDFs.
#[derive(Parser)]
#[command(
    name = "pdfdex",
    about = "pdfdex — local-first hybrid retrieval for PDF libraries",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/pdfdex.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the PDF directory, index new documents, and rebuild the
    /// lexical model.
    Ingest,

    /// Search indexed documents with fused dense + lexical ranking.
    Search {
        /// The search query string.
        query: String,

        /// Maximum number of results (defaults to retrieval.top_k).
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;
    let sink = TracingSink;

    match cli.command {
        Commands::Ingest => {
            let report = ingest::run_ingest(&cfg, &PdfExtractor, &sink).await?;
            println!(
                "Found {} PDFs, {} new to process.",
                report.found, report.new
            );
            println!(
                "Processed {} ({} failed), {} chunks indexed ({} batches failed).",
                report.newly_processed,
                report.newly_failed,
                report.chunks_indexed,
                report.batches_failed
            );
            println!(
                "Totals: {} processed, {} failed. Lexical model {}.",
                report.total_processed,
                report.total_failed,
                if report.lexical_rebuilt {
                    "rebuilt"
                } else {
                    "unchanged"
                }
            );
        }
        Commands::Search { query, limit } => {
            let top_k = limit.unwrap_or(cfg.retrieval.top_k);
            let results = search::answer(&cfg, &query, top_k, &sink).await?;
            search::print_results(&query, &results);
        }
    }

    Ok(())
}
