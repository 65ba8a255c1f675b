pub mod api;
pub mod auth;
pub mod config;
pub mod control;
pub mod error;
pub mod health;
pub mod state;
pub mod telemetry;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use config::ServerConfig;
use state::AppState;

/// Build the Axum router and application state from a config.
///
/// Must be called inside a Tokio runtime (the telemetry exporter is spawned
/// here when enabled).
pub fn build_app(config: ServerConfig) -> (Router<()>, AppState) {
    let max_body_bytes = config.limits.max_body_bytes;
    let state = AppState::new(config);

    // Operator routes (behind bearer auth middleware)
    let control_routes = Router::new()
        .route("/status", get(control::get_status))
        .route("/control/reset", post(control::reset))
        .route("/control/fire", post(control::force_fire))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            bearer_auth_layer,
        ));

    // The game server may post to any path it was configured with, so every
    // unmatched route is a tick endpoint too.
    let tick_service = get(api::greet)
        .post(api::post_tick)
        .with_state(state.clone());

    let app = Router::new()
        .route("/", get(api::greet).post(api::post_tick))
        .route("/health", get(health::health_check))
        .nest("/api/v1", control_routes)
        .fallback_service(tick_service)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    (app, state)
}

/// Middleware wrapper that injects AuthConfig into request extensions for the
/// bearer auth middleware.
async fn bearer_auth_layer(
    axum::extract::State(state): axum::extract::State<AppState>,
    mut request: axum::extract::Request,
    next: middleware::Next,
) -> Result<axum::response::Response, error::AppError> {
    request.extensions_mut().insert(state.auth.clone());
    auth::bearer_auth_middleware(request, next).await
}
