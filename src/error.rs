use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Errors produced by a single provider adapter.
///
/// Adapters perform one attempt and report the outcome explicitly; the
/// aggregator decides centrally whether to degrade, substitute, or fall back.
#[derive(thiserror::Error, Debug)]
pub enum ProviderError {
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("Geocoding failed for '{0}'")]
    Geocode(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Unavailable(err.to_string())
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Database(_) | AppError::Cache(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::Provider(_) | AppError::HttpClient(_) => {
                (StatusCode::BAD_GATEWAY, self.to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
