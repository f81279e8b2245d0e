use async_trait::async_trait;

use super::types::ChatRequest;
use crate::core::errors::ApiError;

/// Opaque model backend used by the index (embeddings) and the answerer
/// (chat completion). Both pipelines share one provider instance.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// return the provider name (e.g. "openai")
    fn name(&self) -> &str;

    /// check if the provider is healthy/reachable
    async fn health_check(&self) -> Result<bool, ApiError>;

    /// chat completion (non-streaming)
    async fn chat(&self, request: ChatRequest, model_id: &str) -> Result<String, ApiError>;

    /// generate embeddings, one vector per input, in input order
    async fn embed(&self, inputs: &[String], model_id: &str) -> Result<Vec<Vec<f32>>, ApiError>;
}
