//! VectorStore trait — abstract interface for the persisted chunk index.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::chunker::Chunk;
use crate::core::errors::ApiError;

/// A chunk as persisted in the index, with its provenance metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedChunk {
    pub chunk_id: String,
    pub text: String,
    /// Source file name.
    pub title: String,
    /// Character offset of the chunk in its source document.
    pub start_index: usize,
}

/// Result of a similarity search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub chunk: IndexedChunk,
    /// Cosine similarity in [-1, 1]; higher is more similar.
    pub score: f32,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct IndexStats {
    pub chunks: usize,
    /// Whether a published index exists and can serve searches.
    pub ready: bool,
}

/// Abstract interface over the persisted vector index.
///
/// `rebuild` is full replacement: the new index is staged separately and
/// published atomically, so concurrent searches never observe a partially
/// built or partially deleted index.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Replace the persisted index with these chunks and their embeddings.
    async fn rebuild(&self, items: Vec<(Chunk, Vec<f32>)>) -> Result<(), ApiError>;

    /// Up to `limit` chunks ranked by descending similarity to the query
    /// embedding; ties keep insertion order.
    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>, ApiError>;

    async fn stats(&self) -> Result<IndexStats, ApiError>;
}
