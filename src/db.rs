//! SQLite connection handling for the dense store.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::config::Config;
use crate::error::Result;

/// Open (creating if necessary) the dense index database under the
/// configured persist directory.
pub async fn connect(config: &Config) -> Result<SqlitePool> {
    std::fs::create_dir_all(&config.storage.persist_dir)?;

    let db_path = config.db_path();
    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path.display()))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}
