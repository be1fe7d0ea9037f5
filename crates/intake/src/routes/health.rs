//! Health check endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::state::{AppState, IntakeStats};

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Basic health check (is the server running?)
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
pub struct ReadyResponse {
    status: &'static str,
    nonce_store: &'static str,
}

/// Readiness check (is the nonce store reachable?)
pub async fn ready_check(
    State(state): State<AppState>,
) -> Result<Json<ReadyResponse>, StatusCode> {
    if state.nonces.ping().await {
        Ok(Json(ReadyResponse {
            status: "ready",
            nonce_store: state.nonces.backend(),
        }))
    } else {
        // Return 503 if not ready
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

#[derive(Serialize)]
pub struct StatsResponse {
    accepted: u64,
    replays_blocked: u64,
    missing_nonce: u64,
    store_errors: u64,
    uptime_secs: u64,
}

/// Intake counters (for monitoring)
pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let s = &state.stats;
    Json(StatsResponse {
        accepted: IntakeStats::get(&s.accepted),
        replays_blocked: IntakeStats::get(&s.replays_blocked),
        missing_nonce: IntakeStats::get(&s.missing_nonce),
        store_errors: IntakeStats::get(&s.store_errors),
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}
