//! `/api` handlers for the document store and the cache.

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::state::AppState;

/// Most documents returned by `GET /api/data`.
pub const ITEMS_LIMIT: i64 = 10;

pub async fn list_items(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    match state.store.fetch_items(ITEMS_LIMIT).await {
        Ok(items) => {
            state
                .logger
                .info("Data fetched from MongoDB", Some(json!({ "count": items.len() })))
                .await;
            Ok(Json(json!({ "success": true, "data": items })))
        }
        Err(e) => {
            state
                .logger
                .error("Error fetching data", Some(json!({ "error": e.to_string() })))
                .await;
            Err(AppError::FetchData(e))
        }
    }
}

/// A stored JSON `null` reads as a miss, the same as an absent key.
pub async fn get_cached(
    Path(key): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    match state.cache.get(&key).await {
        Ok(Some(value)) if !value.is_null() => {
            state.logger.info("Cache hit", Some(json!({ "key": key }))).await;
            Ok(Json(json!({ "success": true, "source": "cache", "data": value })))
        }
        Ok(_) => {
            state.logger.info("Cache miss", Some(json!({ "key": key }))).await;
            Ok(Json(json!({ "success": true, "source": "miss", "data": null })))
        }
        Err(e) => {
            state
                .logger
                .error("Cache error", Some(json!({ "error": e.to_string() })))
                .await;
            Err(AppError::CacheRead(e))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CacheWrite {
    #[serde(default)]
    pub value: Value,
    /// Seconds until expiry; absent or not positive means no expiry.
    pub ttl: Option<i64>,
}

impl CacheWrite {
    fn ttl_secs(&self) -> Option<u64> {
        self.ttl
            .filter(|ttl| *ttl > 0)
            .and_then(|ttl| u64::try_from(ttl).ok())
    }
}

pub async fn set_cached(
    Path(key): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<CacheWrite>,
) -> Result<Json<Value>, AppError> {
    let ttl = body.ttl_secs();
    match state.cache.set(&key, &body.value, ttl).await {
        Ok(()) => {
            state
                .logger
                .info("Cache set", Some(json!({ "key": key, "hasTtl": ttl.is_some() })))
                .await;
            Ok(Json(json!({ "success": true, "message": "Value cached successfully" })))
        }
        Err(e) => {
            state
                .logger
                .error("Cache set error", Some(json!({ "error": e.to_string() })))
                .await;
            Err(AppError::CacheWrite(e))
        }
    }
}
