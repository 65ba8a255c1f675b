use std::net::SocketAddr;
use std::time::Duration;

use snowball_core::Snapshot;
use snowball_core::wire::ArenaUpdate;

use snowball_server::build_app;
use snowball_server::config::{AuthFileConfig, ServerConfig};
use snowball_server::state::AppState;

pub struct TestServer {
    pub addr: SocketAddr,
    pub state: AppState,
    _shutdown: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Start a test server with no auth and telemetry off.
    pub async fn new() -> Self {
        Self::from_config(ServerConfig::default()).await
    }

    /// Start a test server whose control routes need `token`.
    pub async fn with_auth(token: &str) -> Self {
        let config = ServerConfig {
            auth: AuthFileConfig {
                bearer_token: Some(token.to_string()),
            },
            ..ServerConfig::default()
        };
        Self::from_config(config).await
    }

    pub async fn from_config(config: ServerConfig) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (app, state) = build_app(config);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the server a moment to start accepting
        tokio::time::sleep(Duration::from_millis(20)).await;

        Self {
            addr,
            state,
            _shutdown: handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// POST `snapshot` as the game server would and return the status and body.
    pub async fn tick(&self, snapshot: &Snapshot) -> (u16, String) {
        self.tick_at("/", &ArenaUpdate::from_snapshot(snapshot)).await
    }

    pub async fn tick_at(&self, path: &str, update: &ArenaUpdate) -> (u16, String) {
        let resp = reqwest::Client::new()
            .post(format!("{}{path}", self.base_url()))
            .json(update)
            .send()
            .await
            .unwrap();
        let status = resp.status().as_u16();
        (status, resp.text().await.unwrap())
    }
}

/// Poll `check` until it holds or two seconds pass.
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}
