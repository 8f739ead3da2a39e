use axum::{extract::State, response::Json};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::state::AppState;

pub const GREETING: &str = "Hello from Rust + Axum with MongoDB, Redis, and Kafka!";

#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: String,
    pub services: ServiceStatus,
}

/// Per-service connection flags.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ServiceStatus {
    pub mongodb: bool,
    pub redis: bool,
    pub kafka: bool,
}

impl HealthStatus {
    pub fn collect(state: &AppState) -> Self {
        Self {
            status: "OK",
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            services: ServiceStatus {
                mongodb: state.store.is_connected(),
                redis: state.cache.is_connected(),
                kafka: state.logger.is_connected(),
            },
        }
    }
}

pub async fn root(State(state): State<AppState>) -> Json<Value> {
    state.logger.info("Root endpoint accessed", None).await;
    Json(json!({ "message": GREETING }))
}

/// Always 200; the per-service flags carry the detail.
pub async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    let status = HealthStatus::collect(&state);
    state
        .logger
        .info("Health check performed", serde_json::to_value(&status).ok())
        .await;
    Json(status)
}
