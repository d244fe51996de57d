//! SQLite-backed passage index.
//!
//! Passages are partitioned by namespace and stored with their embedding as
//! a little-endian f32 BLOB. Similarity search scans the namespace partition
//! and scores candidates with cosine similarity in memory, which is plenty
//! for the catalog sizes this index serves.

use crate::mmr::cosine_similarity;
use crate::types::{NamespaceCount, PassageRecord, ScoredPassage};
use chrono::Utc;
use concierge_core::{AppError, AppResult};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;

/// Storage abstraction for namespace-scoped passage search.
#[async_trait::async_trait]
pub trait PassageIndex: Send + Sync {
    /// Insert or replace a passage record.
    async fn upsert(&self, record: &PassageRecord) -> AppResult<()>;

    /// Return the `fetch_k` most similar passages within a namespace,
    /// ordered by descending cosine similarity to `embedding`.
    ///
    /// An unknown namespace yields an empty list, not an error.
    async fn query(
        &self,
        namespace: &str,
        embedding: &[f32],
        fetch_k: usize,
    ) -> AppResult<Vec<ScoredPassage>>;

    /// Passage counts per namespace.
    async fn stats(&self) -> AppResult<Vec<NamespaceCount>>;
}

/// SQLite implementation of [`PassageIndex`].
pub struct SqlitePassageIndex {
    conn: Mutex<Connection>,
}

impl SqlitePassageIndex {
    /// Open (or create) an index at the given path.
    pub fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let conn = Connection::open(path.as_ref()).map_err(|e| {
            AppError::Retrieval(format!(
                "Failed to open index at {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_connection(conn)
    }

    /// Create an in-memory index, used by tests and ephemeral sessions.
    pub fn open_in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Retrieval(format!("Failed to open in-memory index: {}", e)))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> AppResult<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS passages (
                id TEXT PRIMARY KEY,
                namespace TEXT NOT NULL,
                text TEXT NOT NULL,
                embedding BLOB NOT NULL,
                indexed_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_passages_namespace ON passages(namespace);",
        )
        .map_err(|e| AppError::Retrieval(format!("Failed to initialize schema: {}", e)))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Retrieval("Index connection poisoned".to_string()))
    }
}

fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

#[async_trait::async_trait]
impl PassageIndex for SqlitePassageIndex {
    async fn upsert(&self, record: &PassageRecord) -> AppResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO passages (id, namespace, text, embedding, indexed_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.id,
                record.namespace,
                record.text,
                embedding_to_bytes(&record.embedding),
                record.indexed_at.to_rfc3339(),
            ],
        )
        .map_err(|e| AppError::Retrieval(format!("Failed to upsert passage: {}", e)))?;

        tracing::debug!(
            "Indexed passage {} in namespace '{}'",
            record.id,
            record.namespace
        );
        Ok(())
    }

    async fn query(
        &self,
        namespace: &str,
        embedding: &[f32],
        fetch_k: usize,
    ) -> AppResult<Vec<ScoredPassage>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT id, text, embedding FROM passages WHERE namespace = ?1")
            .map_err(|e| AppError::Retrieval(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map(params![namespace], |row| {
                let id: String = row.get(0)?;
                let text: String = row.get(1)?;
                let blob: Vec<u8> = row.get(2)?;
                Ok((id, text, blob))
            })
            .map_err(|e| AppError::Retrieval(format!("Failed to query passages: {}", e)))?;

        let mut scored = Vec::new();
        for row in rows {
            let (id, text, blob) =
                row.map_err(|e| AppError::Retrieval(format!("Failed to read row: {}", e)))?;
            let stored = bytes_to_embedding(&blob);
            let score = cosine_similarity(embedding, &stored);
            scored.push(ScoredPassage {
                id,
                text,
                score,
                embedding: stored,
            });
        }

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(fetch_k);

        tracing::debug!(
            "Namespace '{}' query returned {} candidates",
            namespace,
            scored.len()
        );
        Ok(scored)
    }

    async fn stats(&self) -> AppResult<Vec<NamespaceCount>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT namespace, COUNT(*) FROM passages GROUP BY namespace ORDER BY namespace",
            )
            .map_err(|e| AppError::Retrieval(format!("Failed to prepare stats query: {}", e)))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(NamespaceCount {
                    namespace: row.get(0)?,
                    passages: row.get(1)?,
                })
            })
            .map_err(|e| AppError::Retrieval(format!("Failed to query stats: {}", e)))?;

        let mut counts = Vec::new();
        for row in rows {
            counts
                .push(row.map_err(|e| AppError::Retrieval(format!("Failed to read row: {}", e)))?);
        }
        Ok(counts)
    }
}

/// Build a passage record with a fresh id and the current timestamp.
pub fn new_record(namespace: &str, text: &str, embedding: Vec<f32>) -> PassageRecord {
    PassageRecord {
        id: uuid::Uuid::new_v4().to_string(),
        namespace: namespace.to_string(),
        text: text.to_string(),
        embedding,
        indexed_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(namespace: &str, text: &str, embedding: Vec<f32>) -> PassageRecord {
        new_record(namespace, text, embedding)
    }

    #[test]
    fn test_embedding_bytes_round_trip() {
        let original = vec![0.5, -1.25, 3.0, 0.0];
        let bytes = embedding_to_bytes(&original);
        assert_eq!(bytes.len(), 16);
        assert_eq!(bytes_to_embedding(&bytes), original);
    }

    #[tokio::test]
    async fn test_upsert_and_query() {
        let index = SqlitePassageIndex::open_in_memory().unwrap();
        index
            .upsert(&record("wine", "a bold red", vec![1.0, 0.0]))
            .await
            .unwrap();
        index
            .upsert(&record("wine", "a crisp white", vec![0.0, 1.0]))
            .await
            .unwrap();

        let results = index.query("wine", &[1.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text, "a bold red");
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn test_query_respects_fetch_k() {
        let index = SqlitePassageIndex::open_in_memory().unwrap();
        for i in 0..5 {
            index
                .upsert(&record("wine", &format!("passage {}", i), vec![1.0, i as f32]))
                .await
                .unwrap();
        }

        let results = index.query("wine", &[1.0, 0.0], 3).await.unwrap();
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn test_query_unknown_namespace_is_empty() {
        let index = SqlitePassageIndex::open_in_memory().unwrap();
        index
            .upsert(&record("wine", "a bold red", vec![1.0, 0.0]))
            .await
            .unwrap();

        let results = index.query("no-such-namespace", &[1.0, 0.0], 10).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_namespaces_do_not_leak() {
        let index = SqlitePassageIndex::open_in_memory().unwrap();
        index
            .upsert(&record("wine", "a bold red", vec![1.0, 0.0]))
            .await
            .unwrap();
        index
            .upsert(&record("cvs-health", "take with food", vec![1.0, 0.0]))
            .await
            .unwrap();

        let results = index.query("wine", &[1.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text, "a bold red");
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_id() {
        let index = SqlitePassageIndex::open_in_memory().unwrap();
        let mut rec = record("wine", "first text", vec![1.0, 0.0]);
        index.upsert(&rec).await.unwrap();

        rec.text = "second text".to_string();
        index.upsert(&rec).await.unwrap();

        let results = index.query("wine", &[1.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text, "second text");
    }

    #[tokio::test]
    async fn test_stats() {
        let index = SqlitePassageIndex::open_in_memory().unwrap();
        index
            .upsert(&record("wine", "a", vec![1.0]))
            .await
            .unwrap();
        index
            .upsert(&record("wine", "b", vec![1.0]))
            .await
            .unwrap();
        index
            .upsert(&record("cvs-health", "c", vec![1.0]))
            .await
            .unwrap();

        let counts = index.stats().await.unwrap();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].namespace, "cvs-health");
        assert_eq!(counts[0].passages, 1);
        assert_eq!(counts[1].namespace, "wine");
        assert_eq!(counts[1].passages, 2);
    }

    #[tokio::test]
    async fn test_persists_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.sqlite");

        {
            let index = SqlitePassageIndex::open(&path).unwrap();
            index
                .upsert(&record("wine", "persistent", vec![1.0, 0.0]))
                .await
                .unwrap();
        }

        let reopened = SqlitePassageIndex::open(&path).unwrap();
        let results = reopened.query("wine", &[1.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text, "persistent");
    }
}
