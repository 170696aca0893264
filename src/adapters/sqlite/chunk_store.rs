//! SQLite implementation of the ChunkStore.
//!
//! Embeddings are stored as little-endian f32 BLOBs. Nearest-neighbour
//! queries scan the table in id order and rank by cosine distance in Rust,
//! so query vectors never reach SQL as text.

use std::num::NonZeroUsize;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, warn};

use crate::domain::errors::StorageError;
use crate::domain::models::{Chunk, ChunkId, DocumentSummary, NewChunk, SimilarityResult};
use crate::domain::ports::ChunkStore;

const DIMENSION_KEY: &str = "dimension";

/// SQLite-backed chunk store with in-process cosine ranking.
#[derive(Clone)]
pub struct SqliteChunkStore {
    pool: SqlitePool,
}

impl SqliteChunkStore {
    /// Wrap an already-migrated pool.
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Write `chunks` in a single transaction, rolling back on any failure.
    async fn write_chunks(&self, chunks: &[NewChunk]) -> Result<Vec<ChunkId>, StorageError> {
        for chunk in chunks {
            validate_text(&chunk.text)?;
            validate_embedding(&chunk.embedding)?;
        }

        let mut tx = self.pool.begin().await?;
        match Self::write_in_tx(&mut tx, chunks).await {
            Ok(ids) => {
                tx.commit().await?;
                debug!(count = ids.len(), "Stored chunks");
                Ok(ids)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed after chunk write error");
                }
                warn!(error = %err, count = chunks.len(), "Chunk write rolled back");
                Err(err)
            }
        }
    }

    async fn write_in_tx(conn: &mut SqliteConnection, chunks: &[NewChunk]) -> Result<Vec<ChunkId>, StorageError> {
        let Some(first) = chunks.first() else {
            return Ok(Vec::new());
        };

        // Writing first takes the database write lock, so concurrent first
        // inserts cannot both fix a dimension.
        sqlx::query("INSERT OR IGNORE INTO store_meta (key, value) VALUES (?, ?)")
            .bind(DIMENSION_KEY)
            .bind(first.dimension().to_string())
            .execute(&mut *conn)
            .await?;

        let expected = read_dimension(&mut *conn)
            .await?
            .ok_or_else(|| StorageError::Corrupt("store dimension missing after insert".to_string()))?;

        let created_at = Utc::now().to_rfc3339();
        let mut ids = Vec::with_capacity(chunks.len());

        for chunk in chunks {
            if chunk.dimension() != expected {
                return Err(StorageError::DimensionMismatch {
                    expected,
                    actual: chunk.dimension(),
                });
            }

            let result = sqlx::query(
                r"INSERT INTO chunks (text, embedding, dimension, source_document_id, created_at)
                  VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&chunk.text)
            .bind(embedding_to_bytes(&chunk.embedding))
            .bind(chunk.dimension() as i64)
            .bind(chunk.source_document_id.as_deref())
            .bind(&created_at)
            .execute(&mut *conn)
            .await?;

            ids.push(ChunkId(result.last_insert_rowid()));
        }

        Ok(ids)
    }
}

async fn read_dimension(conn: &mut SqliteConnection) -> Result<Option<usize>, StorageError> {
    let row: Option<(String,)> = sqlx::query_as("SELECT value FROM store_meta WHERE key = ?")
        .bind(DIMENSION_KEY)
        .fetch_optional(&mut *conn)
        .await?;

    row.map(|(value,)| {
        value
            .parse::<usize>()
            .map_err(|_| StorageError::Corrupt(format!("invalid stored dimension '{value}'")))
    })
    .transpose()
}

#[async_trait]
impl ChunkStore for SqliteChunkStore {
    async fn insert(&self, chunk: NewChunk) -> Result<ChunkId, StorageError> {
        let ids = self.write_chunks(std::slice::from_ref(&chunk)).await?;
        ids.into_iter()
            .next()
            .ok_or_else(|| StorageError::Corrupt("insert returned no id".to_string()))
    }

    async fn insert_batch(&self, chunks: Vec<NewChunk>) -> Result<Vec<ChunkId>, StorageError> {
        self.write_chunks(&chunks).await
    }

    async fn count(&self) -> Result<u64, StorageError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM chunks")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn dimension(&self) -> Result<Option<usize>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        read_dimension(&mut conn).await
    }

    async fn query_nearest(
        &self,
        embedding: &[f32],
        n: NonZeroUsize,
    ) -> Result<Vec<SimilarityResult>, StorageError> {
        validate_embedding(embedding)?;

        let Some(expected) = self.dimension().await? else {
            return Ok(Vec::new());
        };
        if embedding.len() != expected {
            return Err(StorageError::DimensionMismatch {
                expected,
                actual: embedding.len(),
            });
        }

        let rows: Vec<ChunkRow> = sqlx::query_as(
            "SELECT id, text, embedding, source_document_id, created_at FROM chunks ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let stored = bytes_to_embedding(&row.embedding)?;
            results.push(SimilarityResult {
                chunk_id: ChunkId(row.id),
                distance: cosine_distance(embedding, &stored),
                text: row.text,
                source_document_id: row.source_document_id,
            });
        }

        // Stable sort keeps id order among equal distances.
        results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        results.truncate(n.get());
        Ok(results)
    }

    async fn list_documents(&self) -> Result<Vec<DocumentSummary>, StorageError> {
        let rows: Vec<DocumentRow> = sqlx::query_as(
            r"SELECT source_document_id AS document_id,
                     COUNT(*) AS chunk_count,
                     MIN(id) AS first_chunk_id,
                     MIN(created_at) AS created_at
              FROM chunks
              WHERE source_document_id IS NOT NULL
              GROUP BY source_document_id
              ORDER BY first_chunk_id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn document_chunks(&self, document_id: &str) -> Result<Vec<Chunk>, StorageError> {
        let rows: Vec<ChunkRow> = sqlx::query_as(
            r"SELECT id, text, embedding, source_document_id, created_at
              FROM chunks WHERE source_document_id = ? ORDER BY id",
        )
        .bind(document_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

fn validate_text(text: &str) -> Result<(), StorageError> {
    if text.trim().is_empty() {
        return Err(StorageError::InvalidChunk("chunk text is empty".to_string()));
    }
    Ok(())
}

fn validate_embedding(embedding: &[f32]) -> Result<(), StorageError> {
    if embedding.is_empty() {
        return Err(StorageError::EmptyEmbedding);
    }
    if let Some(index) = embedding.iter().position(|v| !v.is_finite()) {
        return Err(StorageError::InvalidEmbedding(index));
    }
    Ok(())
}

/// Serialize an embedding as little-endian f32 bytes.
pub fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Inverse of [`embedding_to_bytes`].
pub fn bytes_to_embedding(bytes: &[u8]) -> Result<Vec<f32>, StorageError> {
    if bytes.len() % 4 != 0 {
        return Err(StorageError::Corrupt(format!(
            "embedding blob length {} is not a multiple of 4",
            bytes.len()
        )));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Cosine distance, `1 - cosine_similarity`.
///
/// Returns `f32::MAX` for mismatched lengths or zero-magnitude vectors so
/// they rank last. Sums run in `f64` so squares of large finite components
/// do not overflow.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::MAX;
    }

    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| f64::from(*x) * f64::from(*y)).sum();
    let mag_a: f64 = a.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    let mag_b: f64 = b.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return f32::MAX;
    }

    (1.0 - dot / (mag_a * mag_b)) as f32
}

#[derive(sqlx::FromRow)]
struct ChunkRow {
    id: i64,
    text: String,
    embedding: Vec<u8>,
    source_document_id: Option<String>,
    created_at: String,
}

impl TryFrom<ChunkRow> for Chunk {
    type Error = StorageError;

    fn try_from(row: ChunkRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ChunkId(row.id),
            embedding: bytes_to_embedding(&row.embedding)?,
            created_at: super::parse_datetime(&row.created_at)?,
            text: row.text,
            source_document_id: row.source_document_id,
        })
    }
}

#[derive(sqlx::FromRow)]
struct DocumentRow {
    document_id: String,
    chunk_count: i64,
    first_chunk_id: i64,
    created_at: String,
}

impl TryFrom<DocumentRow> for DocumentSummary {
    type Error = StorageError;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            created_at: super::parse_datetime(&row.created_at)?,
            document_id: row.document_id,
            chunk_count: row.chunk_count as u64,
            first_chunk_id: ChunkId(row.first_chunk_id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;
    use proptest::prelude::*;

    async fn setup_test_store() -> SqliteChunkStore {
        let pool = create_migrated_test_pool().await.unwrap();
        SqliteChunkStore::new(pool)
    }

    fn top(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_count() {
        let store = setup_test_store().await;
        assert_eq!(store.count().await.unwrap(), 0);
        assert_eq!(store.dimension().await.unwrap(), None);

        let id = store.insert(NewChunk::new("Paris is in France", vec![1.0, 0.0])).await.unwrap();

        assert_eq!(id, ChunkId(1));
        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(store.dimension().await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_query_orders_by_distance() {
        let store = setup_test_store().await;
        store.insert(NewChunk::new("x axis", vec![1.0, 0.0])).await.unwrap();
        store.insert(NewChunk::new("y axis", vec![0.0, 1.0])).await.unwrap();
        store.insert(NewChunk::new("diagonal", vec![1.0, 1.0])).await.unwrap();

        let results = store.query_nearest(&[0.0, 1.0], top(3)).await.unwrap();
        let texts: Vec<_> = results.iter().map(|r| r.text.as_str()).collect();

        assert_eq!(texts, vec!["y axis", "diagonal", "x axis"]);
        assert!(results[0].distance.abs() < 1e-6);
        assert!(results.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[tokio::test]
    async fn test_query_truncates_to_n() {
        let store = setup_test_store().await;
        for i in 0..10 {
            store.insert(NewChunk::new(format!("chunk {i}"), vec![1.0, i as f32])).await.unwrap();
        }

        let results = store.query_nearest(&[1.0, 0.0], top(3)).await.unwrap();
        assert_eq!(results.len(), 3);

        let results = store.query_nearest(&[1.0, 0.0], top(50)).await.unwrap();
        assert_eq!(results.len(), 10);
    }

    #[tokio::test]
    async fn test_ties_keep_insertion_order() {
        let store = setup_test_store().await;
        store.insert(NewChunk::new("first", vec![0.5, 0.5])).await.unwrap();
        store.insert(NewChunk::new("second", vec![0.5, 0.5])).await.unwrap();
        store.insert(NewChunk::new("third", vec![0.5, 0.5])).await.unwrap();

        let results = store.query_nearest(&[1.0, 1.0], top(3)).await.unwrap();
        let ids: Vec<_> = results.iter().map(|r| r.chunk_id).collect();
        assert_eq!(ids, vec![ChunkId(1), ChunkId(2), ChunkId(3)]);
    }

    #[tokio::test]
    async fn test_huge_components_keep_direction() {
        let store = setup_test_store().await;
        store.insert(NewChunk::new("orthogonal", vec![0.0, 1.0])).await.unwrap();
        store.insert(NewChunk::new("opposite huge", vec![-1.0e20, 0.0])).await.unwrap();
        store.insert(NewChunk::new("exact match", vec![1.0, 0.0])).await.unwrap();

        let results = store.query_nearest(&[1.0, 0.0], top(3)).await.unwrap();
        let texts: Vec<_> = results.iter().map(|r| r.text.as_str()).collect();

        assert_eq!(texts, vec!["exact match", "orthogonal", "opposite huge"]);
        assert!(results[0].distance.abs() < 1e-6);
        assert!((results[2].distance - 2.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_empty_store_returns_nothing() {
        let store = setup_test_store().await;
        let results = store.query_nearest(&[1.0, 2.0, 3.0], top(5)).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_insert_dimension_mismatch_rejected() {
        let store = setup_test_store().await;
        store.insert(NewChunk::new("three", vec![1.0, 2.0, 3.0])).await.unwrap();

        let err = store.insert(NewChunk::new("two", vec![1.0, 2.0])).await.unwrap_err();
        assert!(matches!(err, StorageError::DimensionMismatch { expected: 3, actual: 2 }));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_query_dimension_mismatch_rejected() {
        let store = setup_test_store().await;
        store.insert(NewChunk::new("three", vec![1.0, 2.0, 3.0])).await.unwrap();

        let err = store.query_nearest(&[1.0, 2.0], top(1)).await.unwrap_err();
        assert!(matches!(err, StorageError::DimensionMismatch { expected: 3, actual: 2 }));
    }

    #[tokio::test]
    async fn test_invalid_vectors_rejected() {
        let store = setup_test_store().await;

        let err = store.insert(NewChunk::new("empty", vec![])).await.unwrap_err();
        assert!(matches!(err, StorageError::EmptyEmbedding));

        let err = store.insert(NewChunk::new("nan", vec![1.0, f32::NAN])).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidEmbedding(1)));

        let err = store.insert(NewChunk::new("   ", vec![1.0])).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidChunk(_)));

        assert_eq!(store.count().await.unwrap(), 0);
        assert_eq!(store.dimension().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_batch_is_atomic() {
        let store = setup_test_store().await;
        let batch = vec![
            NewChunk::new("good", vec![1.0, 0.0]).with_document("doc"),
            NewChunk::new("also good", vec![0.0, 1.0]).with_document("doc"),
            NewChunk::new("wrong size", vec![1.0, 0.0, 0.0]).with_document("doc"),
        ];

        let err = store.insert_batch(batch).await.unwrap_err();
        assert!(matches!(err, StorageError::DimensionMismatch { .. }));
        assert_eq!(store.count().await.unwrap(), 0);
        // Rolled back along with the chunks.
        assert_eq!(store.dimension().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_batch_ids_are_contiguous() {
        let store = setup_test_store().await;
        let batch = (0..4)
            .map(|i| NewChunk::new(format!("sentence {i}"), vec![1.0, i as f32]).with_document("doc-a"))
            .collect();

        let ids = store.insert_batch(batch).await.unwrap();
        assert_eq!(ids, vec![ChunkId(1), ChunkId(2), ChunkId(3), ChunkId(4)]);
    }

    #[tokio::test]
    async fn test_empty_batch_is_noop() {
        let store = setup_test_store().await;
        let ids = store.insert_batch(Vec::new()).await.unwrap();
        assert!(ids.is_empty());
        assert_eq!(store.dimension().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sql_metacharacters_stored_verbatim() {
        let store = setup_test_store().await;
        let text = "'); DROP TABLE chunks; --";
        store.insert(NewChunk::new(text, vec![1.0, 0.0])).await.unwrap();

        let results = store.query_nearest(&[1.0, 0.0], top(1)).await.unwrap();
        assert_eq!(results[0].text, text);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_documents_and_chunks() {
        let store = setup_test_store().await;
        store
            .insert_batch(vec![
                NewChunk::new("a1", vec![1.0, 0.0]).with_document("doc-a"),
                NewChunk::new("a2", vec![0.0, 1.0]).with_document("doc-a"),
            ])
            .await
            .unwrap();
        store.insert(NewChunk::new("orphan", vec![1.0, 1.0])).await.unwrap();
        store.insert(NewChunk::new("b1", vec![1.0, 1.0]).with_document("doc-b")).await.unwrap();

        let docs = store.list_documents().await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].document_id, "doc-a");
        assert_eq!(docs[0].chunk_count, 2);
        assert_eq!(docs[0].first_chunk_id, ChunkId(1));
        assert_eq!(docs[1].document_id, "doc-b");

        let chunks = store.document_chunks("doc-a").await.unwrap();
        let texts: Vec<_> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["a1", "a2"]);
        assert_eq!(chunks[1].embedding, vec![0.0, 1.0]);

        assert!(store.document_chunks("missing").await.unwrap().is_empty());
    }

    #[test]
    fn test_bytes_to_embedding_rejects_bad_length() {
        assert!(matches!(bytes_to_embedding(&[0, 1, 2]), Err(StorageError::Corrupt(_))));
    }

    #[test]
    fn test_cosine_distance_edge_cases() {
        assert!(cosine_distance(&[1.0, 0.0], &[1.0, 0.0]).abs() < 1e-6);
        assert!((cosine_distance(&[1.0, 0.0], &[0.0, 1.0]) - 1.0).abs() < 1e-6);
        assert!((cosine_distance(&[1.0, 0.0], &[-1.0, 0.0]) - 2.0).abs() < 1e-6);
        assert_eq!(cosine_distance(&[0.0, 0.0], &[1.0, 0.0]), f32::MAX);
        assert_eq!(cosine_distance(&[1.0], &[1.0, 0.0]), f32::MAX);
    }

    #[test]
    fn test_cosine_distance_extreme_magnitudes() {
        assert!((cosine_distance(&[1.0, 0.0], &[-1.0e20, 0.0]) - 2.0).abs() < 1e-6);
        assert!(cosine_distance(&[3.0e38, 3.0e38], &[1.0, 1.0]).abs() < 1e-6);
        assert!((cosine_distance(&[1.0e-30, 0.0], &[0.0, 1.0e-30]) - 1.0).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn prop_blob_encoding_preserves_values(v in prop::collection::vec(-1.0e6f32..1.0e6, 1..64)) {
            let decoded = bytes_to_embedding(&embedding_to_bytes(&v)).unwrap();
            prop_assert_eq!(decoded, v);
        }

        #[test]
        fn prop_cosine_distance_bounded_and_symmetric(
            pair in (1usize..32).prop_flat_map(|n| (
                prop::collection::vec(0.1f32..10.0, n),
                prop::collection::vec(0.1f32..10.0, n),
            ))
        ) {
            let (a, b) = pair;
            let ab = cosine_distance(&a, &b);
            let ba = cosine_distance(&b, &a);
            prop_assert!((-1e-5..=2.0 + 1e-5).contains(&ab));
            prop_assert!((ab - ba).abs() < 1e-5);
        }

        #[test]
        fn prop_cosine_distance_scale_invariant(
            v in prop::collection::vec(0.1f32..10.0, 1..32),
            scale in 0.5f32..4.0,
        ) {
            let scaled: Vec<f32> = v.iter().map(|x| x * scale).collect();
            prop_assert!(cosine_distance(&v, &scaled).abs() < 1e-4);
        }
    }
}
