//! Error types for the backing services and the HTTP layer.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

/// Document store failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("mongodb error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("document store unavailable: {0}")]
    Unavailable(String),
}

/// Key-value cache failure.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A stored value is not valid JSON, or a value could not be encoded.
    #[error("cache value encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("cache unavailable: {0}")]
    Unavailable(String),
}

/// Log publishing failure.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    #[error("log record encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("log publisher unavailable: {0}")]
    Unavailable(String),
}

/// A failed request. The display text is what the client sees.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to fetch data")]
    FetchData(#[source] StoreError),

    #[error("Cache operation failed")]
    CacheRead(#[source] CacheError),

    #[error("Failed to cache value")]
    CacheWrite(#[source] CacheError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "success": false,
                "error": self.to_string(),
            })),
        )
            .into_response()
    }
}
