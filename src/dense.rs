//! Dense index adapter over SQLite.
//!
//! Chunk text and embeddings live in two tables keyed by `chunk_id`.
//! Similarity search embeds the query, scans the stored vectors, and ranks by
//! cosine distance in process. Corpus sizes here are a few thousand chunks,
//! well within a linear scan.

use sqlx::{Row, SqlitePool};

use crate::embedding::{blob_to_vec, cosine_similarity, vec_to_blob, EmbeddingProvider};
use crate::error::{DexError, Result};
use crate::models::{CorpusEntry, IndexedChunk};

#[derive(Debug, Clone)]
pub struct DenseHit {
    pub chunk_id: String,
    pub source: String,
    pub text: String,
    /// `1.0 - cosine_similarity`; smaller is closer.
    pub distance: f64,
}

pub struct SqliteDenseIndex {
    pool: SqlitePool,
    provider: Box<dyn EmbeddingProvider>,
    /// Texts per provider `embed` call; the HTTP providers turn each call
    /// into one API request.
    embed_batch_size: usize,
}

impl SqliteDenseIndex {
    pub fn new(
        pool: SqlitePool,
        provider: Box<dyn EmbeddingProvider>,
        embed_batch_size: usize,
    ) -> Self {
        Self {
            pool,
            provider,
            embed_batch_size: embed_batch_size.max(1),
        }
    }

    /// Embed and upsert one batch of chunks.
    ///
    /// The upsert is keyed by `chunk_id`, so re-ingesting a document updates
    /// text and vectors in place without disturbing `seq` order.
    pub async fn add_batch(&self, chunks: &[IndexedChunk]) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.embed_batch_size) {
            embeddings.extend(self.provider.embed(batch).await?);
        }
        if embeddings.len() != chunks.len() {
            return Err(DexError::Embedding(format!(
                "provider returned {} vectors for {} texts",
                embeddings.len(),
                chunks.len()
            )));
        }

        let mut tx = self.pool.begin().await?;

        for (chunk, embedding) in chunks.iter().zip(embeddings.iter()) {
            sqlx::query(
                r#"
                INSERT INTO chunks (chunk_id, source, ordinal, text, hash)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT(chunk_id) DO UPDATE SET
                    source = excluded.source,
                    ordinal = excluded.ordinal,
                    text = excluded.text,
                    hash = excluded.hash
                "#,
            )
            .bind(&chunk.chunk_id)
            .bind(&chunk.source)
            .bind(chunk.ordinal as i64)
            .bind(&chunk.text)
            .bind(&chunk.hash)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                INSERT OR REPLACE INTO chunk_vectors (chunk_id, model, dims, embedding)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(&chunk.chunk_id)
            .bind(self.provider.model_name())
            .bind(self.provider.dims() as i64)
            .bind(vec_to_blob(embedding))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Return the `k` nearest chunks to `text`, ascending by distance.
    pub async fn query(&self, text: &str, k: i64) -> Result<Vec<DenseHit>> {
        if k <= 0 {
            return Err(DexError::Configuration(format!(
                "dense query k must be > 0, got {}",
                k
            )));
        }

        let query_vec = self
            .provider
            .embed(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DexError::Embedding("empty embedding response".to_string()))?;

        let rows = sqlx::query(
            r#"
            SELECT c.chunk_id, c.source, c.text, v.embedding
            FROM chunks c
            JOIN chunk_vectors v ON v.chunk_id = c.chunk_id
            ORDER BY c.seq
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut hits: Vec<DenseHit> = rows
            .iter()
            .map(|row| {
                let blob: Vec<u8> = row.get("embedding");
                let stored = blob_to_vec(&blob);
                let distance = 1.0 - cosine_similarity(&query_vec, &stored) as f64;
                DenseHit {
                    chunk_id: row.get("chunk_id"),
                    source: row.get("source"),
                    text: row.get("text"),
                    distance,
                }
            })
            .collect();

        // Stable sort: equal distances keep seq order.
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(k as usize);
        Ok(hits)
    }

    /// The full corpus snapshot in insertion (`seq`) order.
    pub async fn corpus(&self) -> Result<Vec<CorpusEntry>> {
        let rows = sqlx::query("SELECT text, source FROM chunks ORDER BY seq")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(|row| CorpusEntry {
                text: row.get("text"),
                source: row.get("source"),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashProvider;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    async fn memory_pool() -> SqlitePool {
        // A single connection keeps the in-memory database shared.
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::migrate::run_migrations(&pool).await.unwrap();
        pool
    }

    async fn index_with(chunks: &[IndexedChunk]) -> SqliteDenseIndex {
        let pool = memory_pool().await;
        let index = SqliteDenseIndex::new(pool, Box::new(HashProvider::new(64)), 64);
        index.add_batch(chunks).await.unwrap();
        index
    }

    fn chunk(id: &str, source: &str, text: &str) -> IndexedChunk {
        IndexedChunk {
            chunk_id: id.to_string(),
            source: source.to_string(),
            ordinal: 1,
            text: text.to_string(),
            hash: "h".to_string(),
        }
    }

    #[tokio::test]
    async fn query_returns_nearest_first() {
        let index = index_with(&[
            chunk("a_chunk_1", "a.pdf", "refund policy for returns"),
            chunk("b_chunk_1", "b.pdf", "kernel scheduling internals"),
        ])
        .await;

        let hits = index.query("what is the refund policy", 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].chunk_id, "a_chunk_1");
        assert!(hits[0].distance <= hits[1].distance);
    }

    #[tokio::test]
    async fn non_positive_k_is_a_configuration_error() {
        let index = index_with(&[]).await;
        assert!(matches!(
            index.query("anything", 0).await,
            Err(DexError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn reindexing_a_chunk_updates_in_place() {
        let index = index_with(&[chunk("a_chunk_1", "a.pdf", "old text")]).await;
        index
            .add_batch(&[chunk("a_chunk_1", "a.pdf", "new text")])
            .await
            .unwrap();

        let corpus = index.corpus().await.unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus[0].text, "new text");
    }

    struct CountingProvider {
        inner: HashProvider,
        calls: Arc<Mutex<Vec<usize>>>,
    }

    #[async_trait]
    impl EmbeddingProvider for CountingProvider {
        fn model_name(&self) -> &str {
            "hash-counting"
        }

        fn dims(&self) -> usize {
            self.inner.dims()
        }

        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.calls.lock().unwrap().push(texts.len());
            self.inner.embed(texts).await
        }
    }

    #[tokio::test]
    async fn embed_calls_are_sliced_to_the_configured_batch_size() {
        let pool = memory_pool().await;
        let calls = Arc::new(Mutex::new(Vec::new()));
        let provider = CountingProvider {
            inner: HashProvider::new(64),
            calls: calls.clone(),
        };
        let index = SqliteDenseIndex::new(pool, Box::new(provider), 2);

        let chunks: Vec<IndexedChunk> = (0..5)
            .map(|i| chunk(&format!("doc_chunk_{}", i + 1), "doc.pdf", &format!("text {}", i)))
            .collect();
        index.add_batch(&chunks).await.unwrap();

        assert_eq!(*calls.lock().unwrap(), vec![2, 2, 1]);
        assert_eq!(index.corpus().await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn corpus_preserves_insertion_order() {
        let index = index_with(&[
            chunk("z_chunk_1", "z.pdf", "last alphabetically, first inserted"),
            chunk("a_chunk_1", "a.pdf", "first alphabetically, last inserted"),
        ])
        .await;

        let corpus = index.corpus().await.unwrap();
        assert_eq!(corpus[0].source, "z.pdf");
        assert_eq!(corpus[1].source, "a.pdf");
    }
}
