use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::state::AppState;

pub async fn health(State(_state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Index and provider state. A provider outage degrades the report but
/// never fails it; the endpoint stays usable for operators either way.
pub async fn get_status(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let stats = state.store.stats().await?;
    let provider_healthy = state.provider.health_check().await.unwrap_or(false);
    Ok(Json(json!({
        "ready": stats.ready,
        "chunks": stats.chunks,
        "provider": state.provider.name(),
        "provider_healthy": provider_healthy,
    })))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use async_trait::async_trait;
    use axum::http::StatusCode;

    use super::*;
    use crate::core::config::{AppPaths, Settings};
    use crate::llm::{ChatRequest, ModelProvider};
    use crate::rag::{Answerer, Chunker, SqliteVectorStore, VectorStore};

    struct StaticProvider {
        healthy: bool,
    }

    #[async_trait]
    impl ModelProvider for StaticProvider {
        fn name(&self) -> &str {
            "static"
        }

        async fn health_check(&self) -> Result<bool, ApiError> {
            if self.healthy {
                Ok(true)
            } else {
                Err(ApiError::Provider("connection refused".to_string()))
            }
        }

        async fn chat(&self, _request: ChatRequest, _model_id: &str) -> Result<String, ApiError> {
            Ok(String::new())
        }

        async fn embed(
            &self,
            inputs: &[String],
            _model_id: &str,
        ) -> Result<Vec<Vec<f32>>, ApiError> {
            Ok(inputs.iter().map(|_| vec![0.0]).collect())
        }
    }

    async fn state_with(healthy: bool, root: &Path) -> Arc<AppState> {
        let paths = Arc::new(AppPaths {
            root: root.to_path_buf(),
            data_dir: root.join("data"),
            index_dir: root.join("index"),
            log_dir: root.join("logs"),
        });
        let settings = Settings {
            api_key: "test-key".to_string(),
            api_base: "http://localhost".to_string(),
            embed_model: "embed".to_string(),
            chat_model: "chat".to_string(),
            chunk_size: 300,
            chunk_overlap: 100,
        };
        let provider: Arc<dyn ModelProvider> = Arc::new(StaticProvider { healthy });
        let store: Arc<dyn VectorStore> = Arc::new(
            SqliteVectorStore::open(paths.db_path()).await.unwrap(),
        );
        let answerer = Answerer::new(provider.clone(), store.clone(), "embed", "chat");
        let chunker = Chunker::new(300, 100).unwrap();

        Arc::new(AppState {
            paths,
            settings,
            chunker,
            provider,
            store,
            answerer,
        })
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn status_reports_provider_and_index_state() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(true, dir.path()).await;

        let response = get_status(State(state)).await.unwrap().into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["provider"], "static");
        assert_eq!(body["provider_healthy"], true);
        assert_eq!(body["ready"], false);
        assert_eq!(body["chunks"], 0);
    }

    #[tokio::test]
    async fn provider_outage_degrades_status_without_failing_it() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(false, dir.path()).await;

        let response = get_status(State(state)).await.unwrap().into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["provider_healthy"], false);
    }
}
