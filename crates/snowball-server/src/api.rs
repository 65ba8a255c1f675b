use std::sync::atomic::Ordering;

use axum::Json;
use axum::extract::State;

use snowball_core::wire::ArenaUpdate;
use snowball_core::{Snapshot, telemetry, time};

use crate::error::AppError;
use crate::state::AppState;

pub const GREETING: &str = "Let the battle begin!";

/// GET on any path. Used by the game server as a liveness probe.
pub async fn greet() -> &'static str {
    GREETING
}

/// POST on any path: one arena update in, one action letter out.
pub async fn post_tick(
    State(state): State<AppState>,
    Json(update): Json<ArenaUpdate>,
) -> Result<String, AppError> {
    let snapshot = match Snapshot::try_from(&update) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            state.stats.rejected.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(error = %e, self_id = update.self_id(), "Rejected arena update");
            return Err(e.into());
        },
    };

    state
        .telemetry
        .record(telemetry::rows(snapshot.arena(), time::timestamp_micros()));

    let me = snapshot.myself();
    tracing::debug!(
        position = %me.position,
        facing = %me.facing,
        score = me.score,
        was_hit = me.was_hit,
        players = snapshot.arena().players.len(),
        "Arena update"
    );

    let report = {
        let mut agent = state.agent.lock().await;
        agent.tick(&snapshot)
    };

    state.stats.ticks.fetch_add(1, Ordering::Relaxed);
    if report.capped {
        state.stats.capped.fetch_add(1, Ordering::Relaxed);
    }

    tracing::info!(
        action = %report.action,
        state = %report.state,
        transitions = report.transitions,
        "Tick"
    );

    Ok(report.action.code().to_string())
}
