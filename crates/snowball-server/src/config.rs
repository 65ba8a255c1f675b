use serde::Deserialize;

use snowball_core::EngineConfig;

/// Top-level server configuration, loaded from `snowball.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub auth: AuthFileConfig,
    pub engine: EngineConfig,
    pub telemetry: TelemetryConfig,
    pub limits: LimitsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            auth: AuthFileConfig::default(),
            engine: EngineConfig::default(),
            telemetry: TelemetryConfig::default(),
            limits: LimitsConfig::default(),
        }
    }
}

/// Auth section of the config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthFileConfig {
    /// Token required on the control routes. None = control routes are open.
    pub bearer_token: Option<String>,
}

/// Request limits for the tick endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest accepted arena update body.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 256 * 1024,
        }
    }
}

/// Analytics export of every arena update.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub enabled: bool,
    /// Full insert URL. Overrides the BigQuery URL built from
    /// `project`/`dataset`/`table`.
    pub endpoint: Option<String>,
    pub project: Option<String>,
    pub dataset: String,
    pub table: String,
    /// Sent as a bearer token with every export request.
    pub access_token: Option<String>,
    /// Pending batches before new ones are dropped.
    pub queue_capacity: usize,
    pub request_timeout_secs: u64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: None,
            project: None,
            dataset: "snowball".to_string(),
            table: "events".to_string(),
            access_token: None,
            queue_capacity: 256,
            request_timeout_secs: 5,
        }
    }
}

impl TelemetryConfig {
    /// Where export batches are POSTed, if anywhere.
    pub fn insert_url(&self) -> Option<String> {
        if let Some(ref endpoint) = self.endpoint {
            return Some(endpoint.clone());
        }
        self.project.as_ref().map(|project| {
            format!(
                "https://bigquery.googleapis.com/bigquery/v2/projects/{project}/datasets/{}/tables/{}/insertAll",
                self.dataset, self.table
            )
        })
    }
}

impl ServerConfig {
    /// Collect configuration problems. An empty list means the config is usable.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.listen_addr.parse::<std::net::SocketAddr>().is_err() {
            problems.push(format!(
                "listen_addr {:?} is not a valid socket address",
                self.listen_addr
            ));
        }

        problems.extend(self.engine.problems());

        if self.limits.max_body_bytes == 0 {
            problems.push("limits.max_body_bytes must be > 0".to_string());
        }

        if self.telemetry.enabled {
            if self.telemetry.insert_url().is_none() {
                problems.push(
                    "telemetry is enabled but neither telemetry.endpoint nor telemetry.project is set"
                        .to_string(),
                );
            }
            if self.telemetry.queue_capacity == 0 {
                problems.push("telemetry.queue_capacity must be > 0".to_string());
            }
            if self.telemetry.request_timeout_secs == 0 {
                problems.push("telemetry.request_timeout_secs must be > 0".to_string());
            }
        }

        // Warn about secrets in the config file
        if self.auth.bearer_token.is_some() {
            tracing::warn!(
                "bearer_token is set in config file; use SNOWBALL_API_TOKEN env var in production"
            );
        }

        problems
    }

    /// Load config from `snowball.toml` if it exists, then apply env var overrides.
    pub fn load() -> Self {
        let mut config = match std::fs::read_to_string("snowball.toml") {
            Ok(content) => match toml::from_str::<ServerConfig>(&content) {
                Ok(cfg) => {
                    tracing::info!("Loaded configuration from snowball.toml");
                    cfg
                },
                Err(e) => {
                    tracing::warn!("Failed to parse snowball.toml: {e}, using defaults");
                    ServerConfig::default()
                },
            },
            Err(_) => {
                tracing::info!("No snowball.toml found, using defaults");
                ServerConfig::default()
            },
        };
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Apply environment overrides. `lookup` is `std::env::var` outside tests.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        // Container platforms hand out the port alone.
        if let Some(port) = var("PORT")
            && let Ok(port) = port.parse::<u16>()
        {
            self.listen_addr = format!("0.0.0.0:{port}");
        }
        if let Some(addr) = var("SNOWBALL_LISTEN_ADDR") {
            self.listen_addr = addr;
        }
        if let Some(token) = var("SNOWBALL_API_TOKEN") {
            self.auth.bearer_token = Some(token);
        }

        if let Some(val) = var("SNOWBALL_MAX_TRANSITIONS")
            && let Ok(n) = val.parse::<usize>()
        {
            self.engine.max_transitions = n;
        }
        if let Some(val) = var("SNOWBALL_EVASION_STEPS")
            && let Ok(n) = val.parse::<i32>()
        {
            self.engine.evasion_steps = n;
        }
        if let Some(val) = var("SNOWBALL_EVASION_COOLDOWN")
            && let Ok(n) = val.parse::<u32>()
        {
            self.engine.evasion_cooldown_ticks = n;
        }

        if let Some(val) = var("SNOWBALL_TELEMETRY_ENABLED") {
            self.telemetry.enabled = matches!(val.as_str(), "1" | "true" | "yes");
        }
        if let Some(endpoint) = var("SNOWBALL_TELEMETRY_ENDPOINT") {
            self.telemetry.endpoint = Some(endpoint);
        }
        if let Some(token) = var("SNOWBALL_TELEMETRY_TOKEN") {
            self.telemetry.access_token = Some(token);
        }
        if self.telemetry.project.is_none()
            && let Some(project) = var("GOOGLE_CLOUD_PROJECT")
        {
            self.telemetry.project = Some(project);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn default_config_values() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.listen_addr, "0.0.0.0:8080");
        assert!(cfg.auth.bearer_token.is_none());
        assert!(!cfg.telemetry.enabled);
        assert_eq!(cfg.engine, EngineConfig::default());
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn parse_full_toml() {
        let toml_str = r#"
listen_addr = "127.0.0.1:9090"

[auth]
bearer_token = "secret123"

[engine]
max_transitions = 50
evasion_steps = 3

[telemetry]
enabled = true
project = "my-project"
queue_capacity = 16

[limits]
max_body_bytes = 4096
"#;
        let cfg: ServerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.listen_addr, "127.0.0.1:9090");
        assert_eq!(cfg.auth.bearer_token.as_deref(), Some("secret123"));
        assert_eq!(cfg.engine.max_transitions, 50);
        assert_eq!(cfg.engine.evasion_steps, 3);
        assert_eq!(cfg.engine.evasion_cooldown_ticks, 5);
        assert!(cfg.telemetry.enabled);
        assert_eq!(cfg.telemetry.dataset, "snowball");
        assert_eq!(cfg.telemetry.queue_capacity, 16);
        assert_eq!(cfg.limits.max_body_bytes, 4096);
    }

    #[test]
    fn missing_sections_use_defaults() {
        let cfg: ServerConfig = toml::from_str(r#"listen_addr = "0.0.0.0:8080""#).unwrap();
        assert_eq!(cfg.engine.max_transitions, 100);
        assert_eq!(cfg.telemetry.table, "events");
    }

    #[test]
    fn validate_rejects_invalid_addr() {
        let cfg = ServerConfig {
            listen_addr: "not-an-address".to_string(),
            ..ServerConfig::default()
        };
        let problems = cfg.validate();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("listen_addr"));
    }

    #[test]
    fn validate_rejects_telemetry_without_destination() {
        let cfg = ServerConfig {
            telemetry: TelemetryConfig {
                enabled: true,
                ..TelemetryConfig::default()
            },
            ..ServerConfig::default()
        };
        assert!(cfg.validate().iter().any(|p| p.contains("telemetry")));
    }

    #[test]
    fn bigquery_url_from_project() {
        let telemetry = TelemetryConfig {
            project: Some("proj".to_string()),
            ..TelemetryConfig::default()
        };
        assert_eq!(
            telemetry.insert_url().as_deref(),
            Some(
                "https://bigquery.googleapis.com/bigquery/v2/projects/proj/datasets/snowball/tables/events/insertAll"
            )
        );

        let explicit = TelemetryConfig {
            endpoint: Some("http://collector/rows".to_string()),
            ..telemetry
        };
        assert_eq!(explicit.insert_url().as_deref(), Some("http://collector/rows"));
    }

    #[test]
    fn env_overrides() {
        let mut cfg = ServerConfig::default();
        cfg.apply_env(env(&[
            ("PORT", "3000"),
            ("SNOWBALL_API_TOKEN", "tok"),
            ("SNOWBALL_EVASION_STEPS", "7"),
            ("SNOWBALL_TELEMETRY_ENABLED", "true"),
            ("GOOGLE_CLOUD_PROJECT", "gcp"),
        ]));
        assert_eq!(cfg.listen_addr, "0.0.0.0:3000");
        assert_eq!(cfg.auth.bearer_token.as_deref(), Some("tok"));
        assert_eq!(cfg.engine.evasion_steps, 7);
        assert!(cfg.telemetry.enabled);
        assert_eq!(cfg.telemetry.project.as_deref(), Some("gcp"));
    }

    #[test]
    fn explicit_listen_addr_beats_port() {
        let mut cfg = ServerConfig::default();
        cfg.apply_env(env(&[
            ("PORT", "3000"),
            ("SNOWBALL_LISTEN_ADDR", "127.0.0.1:4000"),
            ("SNOWBALL_MAX_TRANSITIONS", "not-a-number"),
            ("SNOWBALL_API_TOKEN", ""),
        ]));
        assert_eq!(cfg.listen_addr, "127.0.0.1:4000");
        assert_eq!(cfg.engine.max_transitions, 100);
        assert!(cfg.auth.bearer_token.is_none());
    }
}
