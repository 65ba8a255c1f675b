use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::state::AppState;

/// Structured health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub ticks: u64,
    pub capped_ticks: u64,
    pub telemetry: TelemetryInfo,
}

#[derive(Serialize)]
pub struct TelemetryInfo {
    pub enabled: bool,
    pub dropped: u64,
}

/// Server status, tick counters and telemetry health as JSON. Not behind auth.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let ticks = state.stats.counts();
    let telemetry = state.telemetry.counts();
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        ticks: ticks.ticks,
        capped_ticks: ticks.capped,
        telemetry: TelemetryInfo {
            enabled: state.telemetry.is_enabled(),
            dropped: telemetry.dropped_batches,
        },
    })
}
