use std::sync::Arc;

use thiserror::Error;

use crate::core::config::{AppPaths, Settings};
use crate::llm::{ModelProvider, OpenAiProvider};
use crate::rag::{indexer, Answerer, Chunker, IndexReport, SqliteVectorStore, VectorStore};

#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("Failed to load configuration: {0}")]
    Config(#[source] anyhow::Error),

    #[error("Failed to initialize model provider: {0}")]
    Provider(#[source] anyhow::Error),

    #[error("Failed to open vector index: {0}")]
    Index(#[source] anyhow::Error),
}

/// Global application state shared across all routes.
pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub settings: Settings,
    pub chunker: Chunker,
    pub provider: Arc<dyn ModelProvider>,
    pub store: Arc<dyn VectorStore>,
    pub answerer: Answerer,
}

impl AppState {
    /// Initializes the application state.
    ///
    /// Configuration problems (missing API key, invalid chunking knobs)
    /// fail here, before any query can be attempted.
    pub async fn initialize(paths: Arc<AppPaths>) -> Result<Arc<Self>, InitializationError> {
        let settings = Settings::from_env().map_err(|e| InitializationError::Config(e.into()))?;

        let chunker = Chunker::new(settings.chunk_size, settings.chunk_overlap)
            .map_err(|e| InitializationError::Config(e.into()))?;

        let provider: Arc<dyn ModelProvider> = Arc::new(
            OpenAiProvider::new(&settings.api_base, &settings.api_key)
                .map_err(|e| InitializationError::Provider(e.into()))?,
        );

        let store: Arc<dyn VectorStore> = Arc::new(
            SqliteVectorStore::open(paths.db_path())
                .await
                .map_err(|e| InitializationError::Index(e.into()))?,
        );

        let answerer = Answerer::new(
            provider.clone(),
            store.clone(),
            settings.embed_model.clone(),
            settings.chat_model.clone(),
        );

        Ok(Arc::new(AppState {
            paths,
            settings,
            chunker,
            provider,
            store,
            answerer,
        }))
    }

    pub async fn rebuild_index(&self) -> Result<IndexReport, crate::core::errors::ApiError> {
        indexer::rebuild_index(
            &self.paths.data_dir,
            &self.chunker,
            self.provider.as_ref(),
            self.store.as_ref(),
            &self.settings.embed_model,
        )
        .await
    }
}
