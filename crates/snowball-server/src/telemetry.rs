use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use snowball_core::telemetry::TelemetryRow;

use crate::config::TelemetryConfig;

/// Counters shared between the sink and its exporter task.
#[derive(Debug, Default)]
pub struct TelemetryStats {
    pub exported_rows: AtomicU64,
    pub dropped_batches: AtomicU64,
    pub failed_batches: AtomicU64,
}

/// Point-in-time copy of [`TelemetryStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TelemetryCounts {
    pub exported_rows: u64,
    pub dropped_batches: u64,
    pub failed_batches: u64,
}

/// Fire-and-forget handle for shipping arena rows to the analytics store.
///
/// `record` never waits: when the queue is full the batch is dropped and
/// counted. Export happens on a background task.
#[derive(Clone)]
pub struct TelemetrySink {
    tx: Option<mpsc::Sender<Vec<TelemetryRow>>>,
    stats: Arc<TelemetryStats>,
}

impl TelemetrySink {
    /// A sink that discards everything.
    pub fn disabled() -> Self {
        Self {
            tx: None,
            stats: Arc::new(TelemetryStats::default()),
        }
    }

    /// Start the exporter task for `config`. Must be called inside a Tokio
    /// runtime. Falls back to a disabled sink when telemetry is off or
    /// misconfigured.
    pub fn spawn(config: &TelemetryConfig) -> Self {
        if !config.enabled {
            return Self::disabled();
        }
        let Some(url) = config.insert_url() else {
            tracing::warn!("Telemetry enabled without a destination, disabling");
            return Self::disabled();
        };
        let client = match reqwest::Client::builder()
            .user_agent(concat!("snowball-bot/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create telemetry HTTP client, disabling");
                return Self::disabled();
            },
        };

        let stats = Arc::new(TelemetryStats::default());
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let exporter = Exporter {
            client,
            url,
            access_token: config.access_token.clone(),
            stats: Arc::clone(&stats),
        };
        tracing::info!(url = %exporter.url, "Telemetry export enabled");
        tokio::spawn(exporter.run(rx));

        Self { tx: Some(tx), stats }
    }

    pub fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }

    /// Queue one tick's rows for export.
    pub fn record(&self, rows: Vec<TelemetryRow>) {
        let Some(ref tx) = self.tx else {
            return;
        };
        if rows.is_empty() {
            return;
        }
        match tx.try_send(rows) {
            Ok(()) => {},
            Err(TrySendError::Full(_)) => {
                self.stats.dropped_batches.fetch_add(1, Ordering::Relaxed);
                tracing::warn!("Telemetry queue full, dropping batch");
            },
            Err(TrySendError::Closed(_)) => {
                self.stats.dropped_batches.fetch_add(1, Ordering::Relaxed);
                tracing::warn!("Telemetry exporter stopped, dropping batch");
            },
        }
    }

    pub fn counts(&self) -> TelemetryCounts {
        TelemetryCounts {
            exported_rows: self.stats.exported_rows.load(Ordering::Relaxed),
            dropped_batches: self.stats.dropped_batches.load(Ordering::Relaxed),
            failed_batches: self.stats.failed_batches.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug)]
pub enum ExportError {
    Http(reqwest::Error),
    Status(u16),
    /// The store accepted the request but rejected some rows.
    RowErrors(usize),
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http(e) => write!(f, "request failed: {e}"),
            Self::Status(code) => write!(f, "unexpected status {code}"),
            Self::RowErrors(n) => write!(f, "{n} rows rejected"),
        }
    }
}

impl From<reqwest::Error> for ExportError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

/// `tabledata.insertAll` request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertAllRequest<'a> {
    pub rows: Vec<InsertRow<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertRow<'a> {
    /// Lets the store deduplicate retried rows.
    pub insert_id: String,
    pub json: &'a TelemetryRow,
}

impl<'a> InsertAllRequest<'a> {
    pub fn new(rows: &'a [TelemetryRow]) -> Self {
        Self {
            rows: rows
                .iter()
                .map(|row| InsertRow {
                    insert_id: uuid::Uuid::new_v4().to_string(),
                    json: row,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct InsertAllResponse {
    insert_errors: Vec<serde_json::Value>,
}

struct Exporter {
    client: reqwest::Client,
    url: String,
    access_token: Option<String>,
    stats: Arc<TelemetryStats>,
}

impl Exporter {
    async fn run(self, mut rx: mpsc::Receiver<Vec<TelemetryRow>>) {
        while let Some(rows) = rx.recv().await {
            match self.export(&rows).await {
                Ok(()) => {
                    self.stats
                        .exported_rows
                        .fetch_add(rows.len() as u64, Ordering::Relaxed);
                },
                Err(e) => {
                    self.stats.failed_batches.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(error = %e, rows = rows.len(), "Telemetry export failed");
                },
            }
        }
        tracing::info!("Telemetry channel closed, stopping exporter");
    }

    async fn export(&self, rows: &[TelemetryRow]) -> Result<(), ExportError> {
        let mut request = self.client.post(&self.url).json(&InsertAllRequest::new(rows));
        if let Some(ref token) = self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExportError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        match rejected_rows(&body) {
            0 => Ok(()),
            n => Err(ExportError::RowErrors(n)),
        }
    }
}

/// Rows the store reported as rejected in a successful response.
///
/// Collectors other than BigQuery may answer with an empty or non-JSON body;
/// both count as fully accepted.
fn rejected_rows(body: &[u8]) -> usize {
    if body.is_empty() {
        return 0;
    }
    match serde_json::from_slice::<InsertAllResponse>(body) {
        Ok(parsed) => parsed.insert_errors.len(),
        Err(e) => {
            tracing::debug!(
                error = %e,
                bytes = body.len(),
                "Collector response is not an insertAll reply, treating as accepted"
            );
            0
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(player: &str) -> TelemetryRow {
        TelemetryRow {
            x: 1,
            y: 2,
            direction: "N".to_string(),
            was_hit: false,
            score: 0,
            player: player.to_string(),
            timestamp: 1_000_000,
        }
    }

    #[test]
    fn disabled_sink_ignores_rows() {
        let sink = TelemetrySink::disabled();
        assert!(!sink.is_enabled());
        sink.record(vec![row("a")]);
        assert_eq!(sink.counts().dropped_batches, 0);
    }

    #[tokio::test]
    async fn spawn_respects_enabled_flag() {
        assert!(!TelemetrySink::spawn(&TelemetryConfig::default()).is_enabled());

        let no_destination = TelemetryConfig {
            enabled: true,
            ..TelemetryConfig::default()
        };
        assert!(!TelemetrySink::spawn(&no_destination).is_enabled());
    }

    #[tokio::test]
    async fn full_queue_drops_and_counts() {
        let (tx, _rx) = mpsc::channel(1);
        let sink = TelemetrySink {
            tx: Some(tx),
            stats: Arc::new(TelemetryStats::default()),
        };
        sink.record(vec![row("a")]);
        sink.record(vec![row("b")]);
        sink.record(vec![row("c")]);
        assert_eq!(sink.counts().dropped_batches, 2);
    }

    #[tokio::test]
    async fn closed_exporter_drops_and_counts() {
        let (tx, rx) = mpsc::channel(4);
        drop(rx);
        let sink = TelemetrySink {
            tx: Some(tx),
            stats: Arc::new(TelemetryStats::default()),
        };
        sink.record(vec![row("a")]);
        assert_eq!(sink.counts().dropped_batches, 1);
    }

    #[test]
    fn insert_all_body_shape() {
        let rows = vec![row("a"), row("b")];
        let json = serde_json::to_value(InsertAllRequest::new(&rows)).unwrap();
        let body_rows = json["rows"].as_array().unwrap();
        assert_eq!(body_rows.len(), 2);
        assert_eq!(body_rows[0]["json"]["player"], "a");
        assert_eq!(body_rows[1]["json"]["wasHit"], false);
        assert_ne!(body_rows[0]["insertId"], body_rows[1]["insertId"]);
    }

    #[test]
    fn insert_errors_are_counted() {
        let body = br#"{"kind":"bigquery#tableDataInsertAllResponse","insertErrors":[{"index":0},{"index":3}]}"#;
        assert_eq!(rejected_rows(body), 2);
        assert_eq!(rejected_rows(br#"{"kind":"bigquery#tableDataInsertAllResponse"}"#), 0);
    }

    #[test]
    fn empty_or_non_json_replies_are_accepted() {
        assert_eq!(rejected_rows(b""), 0);
        assert_eq!(rejected_rows(b"ok"), 0);
        assert_eq!(rejected_rows(b"<html>collector</html>"), 0);
    }
}
