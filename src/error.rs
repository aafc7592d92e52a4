use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::models::Category;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("All content providers are unavailable")]
    AllProvidersUnavailable,

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::AllProvidersUnavailable => (
                StatusCode::BAD_GATEWAY,
                "Failed to fetch recommendations: all content providers are unavailable"
                    .to_string(),
            ),
            AppError::Database(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Rejected request input or ranking configuration
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Search query cannot be empty")]
    EmptySearchTerm,

    #[error("Search query too long (max {max} characters)")]
    SearchTermTooLong { max: usize },

    #[error("Invalid region '{0}'. Expected a two-letter country code")]
    InvalidRegion(String),

    #[error("Limit must be between 1 and {max}, got {got}")]
    LimitOutOfRange { got: usize, max: usize },

    #[error("Invalid category '{0}'. Must be one of: movie, tv_show, short_video, viral_clip")]
    UnknownCategory(String),

    #[error("Weight '{name}' must be a non-negative number, got {value}")]
    InvalidWeight { name: &'static str, value: f64 },

    #[error("Ranking weights must sum to 1.0, got {0:.6}")]
    WeightSum(f64),

    #[error("Invalid ranking weights for {category}: {source}")]
    CategoryWeights {
        category: Category,
        source: Box<ValidationError>,
    },
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

/// Failure of a single content provider call
///
/// Recovered inside the aggregator: one failing provider only shortens the
/// result list.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("provider timed out")]
    Timeout,

    #[error("provider rate limit or quota exhausted")]
    RateLimited,

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else if err.is_decode() || err.is_body() {
            ProviderError::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            ProviderError::from_status(status, &err.to_string())
        } else {
            ProviderError::Unavailable(err.to_string())
        }
    }
}

impl ProviderError {
    /// Classifies a non-success HTTP status
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        match status.as_u16() {
            429 => ProviderError::RateLimited,
            502..=504 => ProviderError::Unavailable(format!("status {}", status)),
            _ => ProviderError::InvalidResponse(format!("status {}: {}", status, body)),
        }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Failure of the result cache backing store. Never surfaced to callers.
#[derive(thiserror::Error, Debug)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(#[from] redis::RedisError),

    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("cache writer stopped")]
    WriterClosed,
}

/// Failure of the interaction store
#[derive(thiserror::Error, Debug)]
pub enum RecorderError {
    #[error("interaction store database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("interaction store error: {0}")]
    Internal(String),
}

impl From<RecorderError> for AppError {
    fn from(err: RecorderError) -> Self {
        match err {
            RecorderError::Database(e) => AppError::Database(e),
            RecorderError::Internal(msg) => AppError::Internal(msg),
        }
    }
}
