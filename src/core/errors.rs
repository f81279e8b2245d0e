use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

/// Error taxonomy for the whole backend.
///
/// `Provider` (embedding/generation outage) is deliberately distinct from
/// the low-confidence "no match" outcome, which is not an error at all and
/// is returned as a normal answer by the retriever.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("failed to ingest {file}: {reason}")]
    Ingest { file: String, reason: String },
    #[error("index error: {0}")]
    Index(String),
    #[error("provider error: {0}")]
    Provider(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn index<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Index(err.to_string())
    }

    pub fn provider<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Provider(err.to_string())
    }

    pub fn ingest<E: std::fmt::Display>(file: &str, err: E) -> Self {
        ApiError::Ingest {
            file: file.to_string(),
            reason: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            ApiError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Ingest { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Index(_) => StatusCode::CONFLICT,
            ApiError::Provider(_) => StatusCode::BAD_GATEWAY,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
