use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::Mutex;

use snowball_core::Agent;

use crate::auth::AuthConfig;
use crate::config::ServerConfig;
use crate::telemetry::TelemetrySink;

/// The agent is locked for the whole of a tick so concurrent updates are
/// decided one after another.
pub type SharedAgent = Arc<Mutex<Agent>>;

/// Tick counters reported by `/health` and the status endpoint.
#[derive(Debug, Default)]
pub struct TickStats {
    pub ticks: AtomicU64,
    pub capped: AtomicU64,
    pub rejected: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TickCounts {
    pub ticks: u64,
    pub capped: u64,
    pub rejected: u64,
}

impl TickStats {
    pub fn counts(&self) -> TickCounts {
        TickCounts {
            ticks: self.ticks.load(Ordering::Relaxed),
            capped: self.capped.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub agent: SharedAgent,
    pub telemetry: TelemetrySink,
    pub auth: AuthConfig,
    pub stats: Arc<TickStats>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Build the state for `config`. Starts the telemetry exporter when
    /// enabled, so this must run inside a Tokio runtime.
    pub fn new(config: ServerConfig) -> Self {
        let auth = AuthConfig {
            bearer_token: config.auth.bearer_token.clone(),
        };
        Self {
            agent: Arc::new(Mutex::new(Agent::new(config.engine.clone()))),
            telemetry: TelemetrySink::spawn(&config.telemetry),
            auth,
            stats: Arc::new(TickStats::default()),
            config: Arc::new(config),
        }
    }
}
