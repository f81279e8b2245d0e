//! Index build pipeline: load documents, chunk, embed, publish.

use std::path::Path;

use serde::Serialize;

use super::chunker::Chunker;
use super::store::VectorStore;
use crate::core::errors::ApiError;
use crate::ingest::{self, SkippedFile};
use crate::llm::ModelProvider;

/// Keeps embedding request bodies bounded; order within and across batches
/// is preserved so insertion order into the index is deterministic.
const EMBED_BATCH_SIZE: usize = 64;

#[derive(Debug, Serialize)]
pub struct IndexReport {
    pub documents: usize,
    pub chunks: usize,
    pub skipped: Vec<SkippedFile>,
}

/// Rebuilds the index from the corpus directory.
///
/// An empty or missing corpus publishes an empty index: a valid, if
/// useless, terminal state. A provider failure aborts the rebuild and
/// leaves the previously published index serving.
pub async fn rebuild_index(
    data_dir: &Path,
    chunker: &Chunker,
    provider: &dyn ModelProvider,
    store: &dyn VectorStore,
    embed_model: &str,
) -> Result<IndexReport, ApiError> {
    let load = ingest::load_documents(data_dir);
    let chunks = chunker.split_documents(&load.documents);
    tracing::info!(
        "split {} documents into {} chunks",
        load.documents.len(),
        chunks.len()
    );

    let mut items = Vec::with_capacity(chunks.len());
    for batch in chunks.chunks(EMBED_BATCH_SIZE) {
        let texts: Vec<String> = batch.iter().map(|chunk| chunk.text.clone()).collect();
        let embeddings = provider.embed(&texts, embed_model).await?;
        if embeddings.len() != batch.len() {
            return Err(ApiError::Provider(format!(
                "embedding count mismatch: {} chunks, {} vectors",
                batch.len(),
                embeddings.len()
            )));
        }
        items.extend(batch.iter().cloned().zip(embeddings));
    }

    let chunk_count = items.len();
    store.rebuild(items).await?;
    tracing::info!("saved {} chunks to the index", chunk_count);

    Ok(IndexReport {
        documents: load.documents.len(),
        chunks: chunk_count,
        skipped: load.skipped,
    })
}
