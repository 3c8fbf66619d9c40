use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::models::CatalogId;

/// Failures of the film enrichment pipeline
///
/// Every variant is terminal for the batch it occurred in. Each one names the
/// title or catalog id that failed so the caller can tell which item broke.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EnrichmentError {
    #[error("No catalog match for '{title}'")]
    NotFound { title: String },

    #[error("No director credited for catalog id {id}")]
    DirectorNotFound { id: CatalogId },

    #[error("Catalog request for {target} failed: {cause}")]
    Transport { target: String, cause: String },

    #[error("Malformed catalog response for {target}: {cause}")]
    Decode { target: String, cause: String },
}

impl EnrichmentError {
    /// Classifies a reqwest failure for `target`
    pub fn from_reqwest(target: impl Into<String>, err: reqwest::Error) -> Self {
        let target = target.into();
        if err.is_decode() {
            EnrichmentError::Decode {
                target,
                cause: err.to_string(),
            }
        } else {
            EnrichmentError::Transport {
                target,
                cause: err.to_string(),
            }
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            EnrichmentError::NotFound { .. } | EnrichmentError::DirectorNotFound { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            EnrichmentError::Transport { .. } | EnrichmentError::Decode { .. } => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Store error: {0}")]
    Store(#[from] redis::RedisError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error(transparent)]
    Enrichment(#[from] EnrichmentError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Enrichment(ref err) => (err.status_code(), self.to_string()),
            AppError::Store(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::ExternalApi(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::HttpClient(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
        };

        if status.is_server_error() {
            tracing::error!(status = %status, error = %message, "Request failed");
        }

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
