//! # pdfdex
//!
//! A local-first hybrid retrieval tool for PDF libraries.
//!
//! pdfdex ingests a directory of PDFs into a searchable corpus (incremental,
//! with durable failure memory) and answers free-text queries by fusing dense
//! embedding search and BM25 lexical search into a single ranked list with
//! Reciprocal Rank Fusion.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────────┐   ┌──────────────────┐
//! │ PDF dir  │──▶│  Ingestion    │──▶│ SQLite (chunks + │
//! │ (scan)   │   │ extract/chunk │   │ embedding BLOBs) │
//! └──────────┘   └──────┬───────┘   └────────┬─────────┘
//!                       │                    │
//!                       ▼                    ▼
//!                ┌─────────────┐      ┌──────────────┐
//!                │ BM25 model + │      │ dense cosine │
//!                │ corpus JSON  │      │   search     │
//!                └──────┬──────┘      └──────┬───────┘
//!                       └────────┬──────────┘
//!                                ▼
//!                         ┌────────────┐
//!                         │ RRF fusion │
//!                         └────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`error`] | Crate-wide error taxonomy |
//! | [`events`] | Injected structured event sink |
//! | [`models`] | Core data types |
//! | [`tracker`] | Durable processed/failed document tracking |
//! | [`chunk`] | Recursive overlapping text chunking |
//! | [`extract`] | PDF text extraction and cleaning |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`db`], [`migrate`] | Database connection and schema |
//! | [`dense`] | Dense (embedding) index over SQLite |
//! | [`lexical`] | BM25 model, build/query/persist |
//! | [`fusion`] | Reciprocal Rank Fusion |
//! | [`ingest`] | Ingestion orchestrator |
//! | [`search`] | Query orchestrator |

pub mod chunk;
pub mod config;
pub mod db;
pub mod dense;
pub mod embedding;
pub mod error;
pub mod events;
pub mod extract;
pub mod fusion;
pub mod ingest;
pub mod lexical;
pub mod migrate;
pub mod models;
pub mod search;
pub mod tracker;
