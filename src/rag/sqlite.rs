//! SQLite-backed vector index.
//!
//! Chunk metadata and embeddings (little-endian f32 blobs) live in a single
//! database file; search is brute-force cosine similarity over all rows.
//!
//! Rebuilds are staged: the new index is written to a sidecar file and
//! renamed over the live database while holding the write lock, so a crash
//! mid-rebuild leaves the previous index intact and readers never see a
//! half-built one.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use tokio::sync::{Mutex, RwLock};

use super::chunker::Chunk;
use super::store::{IndexStats, IndexedChunk, SearchResult, VectorStore};
use crate::core::errors::ApiError;

pub struct SqliteVectorStore {
    db_path: PathBuf,
    staging_path: PathBuf,
    live: RwLock<Option<SqlitePool>>,
    /// Serializes whole rebuilds; searches only contend for `live`
    /// during the final publish step.
    rebuild_lock: Mutex<()>,
}

impl SqliteVectorStore {
    /// Opens the store at `db_path`, attaching to a previously published
    /// index if one exists. No re-embedding is needed to serve searches
    /// from it.
    pub async fn open(db_path: impl Into<PathBuf>) -> Result<Self, ApiError> {
        let db_path = db_path.into();
        if let Some(dir) = db_path.parent() {
            fs::create_dir_all(dir).map_err(ApiError::index)?;
        }

        let mut staging = db_path.clone().into_os_string();
        staging.push(".staging");
        let staging_path = PathBuf::from(staging);

        let live = if db_path.exists() {
            Some(connect(&db_path, false).await?)
        } else {
            None
        };

        Ok(Self {
            db_path,
            staging_path,
            live: RwLock::new(live),
            rebuild_lock: Mutex::new(()),
        })
    }

    fn serialize_embedding(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn deserialize_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }

    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() || a.is_empty() {
            return 0.0;
        }

        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        let denom = norm_a * norm_b;

        if denom <= f32::EPSILON {
            0.0
        } else {
            dot / denom
        }
    }

    fn row_to_chunk(row: &sqlx::sqlite::SqliteRow) -> IndexedChunk {
        let start_index: i64 = row.get("start_index");
        IndexedChunk {
            chunk_id: row.get("chunk_id"),
            text: row.get("content"),
            title: row.get("title"),
            start_index: start_index.max(0) as usize,
        }
    }
}

async fn connect(path: &Path, create_if_missing: bool) -> Result<SqlitePool, ApiError> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(create_if_missing)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal);

    SqlitePoolOptions::new()
        .min_connections(1)
        .max_connections(4)
        .connect_with(options)
        .await
        .map_err(ApiError::index)
}

async fn init_schema(pool: &SqlitePool) -> Result<(), ApiError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS chunks (
            chunk_id TEXT PRIMARY KEY,
            content TEXT NOT NULL,
            title TEXT NOT NULL,
            start_index INTEGER NOT NULL,
            embedding BLOB NOT NULL,
            created_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now'))
        )",
    )
    .execute(pool)
    .await
    .map_err(ApiError::index)?;

    Ok(())
}

/// The database plus its WAL sidecars.
fn remove_db_files(path: &Path) {
    for suffix in ["", "-wal", "-shm"] {
        let mut file = path.as_os_str().to_os_string();
        file.push(suffix);
        let _ = fs::remove_file(PathBuf::from(file));
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    async fn rebuild(&self, items: Vec<(Chunk, Vec<f32>)>) -> Result<(), ApiError> {
        let _rebuild = self.rebuild_lock.lock().await;

        // Stage the new index beside the live one.
        remove_db_files(&self.staging_path);
        let staging = connect(&self.staging_path, true).await?;
        init_schema(&staging).await?;

        let mut tx = staging.begin().await.map_err(ApiError::index)?;
        for (chunk, embedding) in &items {
            let blob = Self::serialize_embedding(embedding);
            sqlx::query(
                "INSERT INTO chunks (chunk_id, content, title, start_index, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(uuid::Uuid::new_v4().to_string())
            .bind(&chunk.text)
            .bind(&chunk.title)
            .bind(chunk.start_index as i64)
            .bind(&blob)
            .execute(&mut *tx)
            .await
            .map_err(ApiError::index)?;
        }
        tx.commit().await.map_err(ApiError::index)?;
        staging.close().await;

        // Publish: swap the staged file in under the write lock so no
        // search runs against a vanishing index.
        let mut live = self.live.write().await;
        if let Some(old) = live.take() {
            old.close().await;
        }
        remove_db_files(&self.db_path);
        fs::rename(&self.staging_path, &self.db_path).map_err(ApiError::index)?;
        *live = Some(connect(&self.db_path, false).await?);

        tracing::info!("published index with {} chunks", items.len());
        Ok(())
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>, ApiError> {
        let live = self.live.read().await;
        let pool = live
            .as_ref()
            .ok_or_else(|| ApiError::Index("index has not been built".to_string()))?;

        let rows = sqlx::query(
            "SELECT chunk_id, content, title, start_index, embedding
             FROM chunks
             ORDER BY rowid",
        )
        .fetch_all(pool)
        .await
        .map_err(ApiError::index)?;

        let mut scored: Vec<SearchResult> = rows
            .iter()
            .map(|row| {
                let embedding_bytes: Vec<u8> = row.get("embedding");
                let stored = Self::deserialize_embedding(&embedding_bytes);
                SearchResult {
                    chunk: Self::row_to_chunk(row),
                    score: Self::cosine_similarity(query_embedding, &stored),
                }
            })
            .collect();

        // Stable sort: equal scores keep insertion (rowid) order.
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(limit);

        Ok(scored)
    }

    async fn stats(&self) -> Result<IndexStats, ApiError> {
        let live = self.live.read().await;
        let Some(pool) = live.as_ref() else {
            return Ok(IndexStats {
                chunks: 0,
                ready: false,
            });
        };

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunks")
            .fetch_one(pool)
            .await
            .map_err(ApiError::index)?;

        Ok(IndexStats {
            chunks: count as usize,
            ready: true,
        })
    }
}
