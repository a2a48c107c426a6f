//! Liveness endpoint.

use axum::extract::State;
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: String,
    pub database: &'static str,
}

/// `GET /api/health`. Always 200; `database` reports whether SQLite answers.
pub async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    let database = if state.db.health_check().await {
        "connected"
    } else {
        "disconnected"
    };

    Json(HealthStatus {
        status: "OK",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        database,
    })
}
