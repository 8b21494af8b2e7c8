//! Health check route
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /health | GET | service liveness with storage counters |
//!
//! ```json
//! {
//!   "status": "healthy",
//!   "version": "0.1.0",
//!   "uptime_seconds": 42,
//!   "database": { "zone_count": 2, "ticket_count": 10, "device_count": 1 }
//! }
//! ```

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use std::time::Instant;

use crate::core::ServerState;
use crate::printing::PrintStorageStats;

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

#[derive(Serialize)]
pub struct HealthResponse {
    /// healthy | degraded
    status: &'static str,
    version: &'static str,
    uptime_seconds: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    database: Option<PrintStorageStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

static START_TIME: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

fn uptime_seconds() -> u64 {
    START_TIME.get_or_init(Instant::now).elapsed().as_secs()
}

pub async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let (status, database, error) = match state.storage.get_stats() {
        Ok(stats) => ("healthy", Some(stats), None),
        Err(e) => ("degraded", None, Some(e.to_string())),
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: uptime_seconds(),
        database,
        error,
    })
}
