use axum::Json;
use axum::extract::State;
use serde::Serialize;

use snowball_core::BotState;

use crate::state::{AppState, TickCounts};
use crate::telemetry::TelemetryCounts;

/// Snapshot of the agent as seen by operators.
#[derive(Debug, Serialize)]
pub struct AgentStatus {
    pub state: BotState,
    /// Human-readable plan, e.g. `GoTo(3, 4) -> TurnTo(S) -> ThrowAt(3, 5)`.
    pub plan: String,
    pub evading: bool,
    pub cooldown: u32,
    pub ticks: TickCounts,
    pub telemetry: TelemetryCounts,
}

async fn status_of(state: &AppState) -> AgentStatus {
    let (bot_state, evading, cooldown) = {
        let agent = state.agent.lock().await;
        (
            agent.state().clone(),
            agent.overlay().is_evading(),
            agent.overlay().cooldown(),
        )
    };
    AgentStatus {
        plan: bot_state.to_string(),
        state: bot_state,
        evading,
        cooldown,
        ticks: state.stats.counts(),
        telemetry: state.telemetry.counts(),
    }
}

/// GET /api/v1/status
pub async fn get_status(State(state): State<AppState>) -> Json<AgentStatus> {
    Json(status_of(&state).await)
}

/// POST /api/v1/control/reset. Back to FindOpponent, evasion window cleared.
pub async fn reset(State(state): State<AppState>) -> Json<AgentStatus> {
    state.agent.lock().await.reset();
    Json(status_of(&state).await)
}

/// POST /api/v1/control/fire. Throw every tick until the next reset.
pub async fn force_fire(State(state): State<AppState>) -> Json<AgentStatus> {
    state.agent.lock().await.force_fire();
    Json(status_of(&state).await)
}
