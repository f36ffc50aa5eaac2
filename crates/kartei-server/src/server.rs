use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use kartei_core::config::Config;
use kartei_engine::BatchRunner;
use kartei_telemetry::MetricsRecorder;

use crate::handlers;
use crate::orchestrator::BatchOrchestrator;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8081 }
    }
}

/// Shared application state passed to Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<BatchOrchestrator>,
    pub config: Arc<Config>,
    pub metrics: Arc<MetricsRecorder>,
}

impl AppState {
    /// Production wiring: one runner, one metrics recorder, one execution
    /// slot for the process lifetime.
    pub fn from_config(config: Arc<Config>) -> Self {
        let metrics = Arc::new(MetricsRecorder::new());
        let runner = Arc::new(
            BatchRunner::from_config(Arc::clone(&config)).with_metrics(Arc::clone(&metrics)),
        );
        Self::with_runner(config, runner, metrics)
    }

    pub fn with_runner(
        config: Arc<Config>,
        runner: Arc<BatchRunner>,
        metrics: Arc<MetricsRecorder>,
    ) -> Self {
        Self {
            orchestrator: Arc::new(BatchOrchestrator::new(runner)),
            config,
            metrics,
        }
    }
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/generate", post(handlers::generate))
        .route("/api/download", get(handlers::download))
        .route("/api/regenerate", post(handlers::regenerate))
        .route("/health", get(handlers::health))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// Create and start the server. Returns a handle that keeps it alive.
pub async fn start(config: ServerConfig, state: AppState) -> Result<ServerHandle, std::io::Error> {
    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(port = local_addr.port(), "kartei server started");

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    Ok(ServerHandle {
        port: local_addr.port(),
        _server: server_handle,
    })
}

/// Handle returned by `start()` — keeps the serve task alive.
pub struct ServerHandle {
    pub port: u16,
    _server: tokio::task::JoinHandle<()>,
}

#[cfg(test)]
mod tests {
    use super::*;

    use kartei_enrich::mock::MockEnricher;

    use crate::orchestrator::tests::{mock_runner, test_config};

    fn mock_state(enricher: MockEnricher) -> AppState {
        let config = test_config();
        let runner = mock_runner(Arc::clone(&config), enricher);
        AppState::with_runner(config, runner, Arc::new(MetricsRecorder::new()))
    }

    #[tokio::test]
    async fn server_starts_and_serves_health() {
        let state = mock_state(MockEnricher::new(Vec::new()));
        let handle = start(ServerConfig { port: 0 }, state).await.unwrap();
        assert!(handle.port > 0);

        let url = format!("http://127.0.0.1:{}/health", handle.port);
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), 200);

        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["busy"], false);
    }

    #[tokio::test]
    async fn generate_streams_progress_and_result() {
        let state = mock_state(MockEnricher::new(vec![Ok(Some(
            MockEnricher::word_content("table", Some("der"), None),
        ))]));
        let handle = start(ServerConfig { port: 0 }, state).await.unwrap();

        let url = format!("http://127.0.0.1:{}/api/generate", handle.port);
        let resp = reqwest::Client::new()
            .post(&url)
            .json(&serde_json::json!({"words": ["Tisch"]}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers()[reqwest::header::CONTENT_TYPE],
            "application/x-ndjson"
        );

        let body = resp.text().await.unwrap();
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines.len(), 2);

        let progress: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(progress["type"], "progress");
        assert_eq!(progress["term"], "Tisch");

        let complete: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(complete["type"], "complete");
        assert_eq!(complete["count"], 1);
        assert_eq!(complete["cards"][0]["source_text"], "Tisch");
    }

    #[tokio::test]
    async fn generate_rejects_empty_word_list() {
        let state = mock_state(MockEnricher::new(Vec::new()));
        let handle = start(ServerConfig { port: 0 }, state).await.unwrap();

        let url = format!("http://127.0.0.1:{}/api/generate", handle.port);
        let resp = reqwest::Client::new()
            .post(&url)
            .json(&serde_json::json!({"words": ["", "  "]}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
    }

    #[tokio::test]
    async fn download_missing_package_is_404() {
        let state = mock_state(MockEnricher::new(Vec::new()));
        let handle = start(ServerConfig { port: 0 }, state).await.unwrap();

        let url = format!("http://127.0.0.1:{}/api/download", handle.port);
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn download_returns_package_bytes() {
        let state = mock_state(MockEnricher::new(Vec::new()));
        std::fs::write(&state.config.package_path, b"apkg-bytes").unwrap();
        let handle = start(ServerConfig { port: 0 }, state).await.unwrap();

        let url = format!("http://127.0.0.1:{}/api/download", handle.port);
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers()[reqwest::header::CONTENT_TYPE],
            "application/octet-stream"
        );
        assert_eq!(resp.bytes().await.unwrap().as_ref(), b"apkg-bytes");
    }

    #[tokio::test]
    async fn regenerate_returns_card_or_422() {
        let state = mock_state(MockEnricher::new(vec![
            Ok(Some(MockEnricher::word_content("table", Some("der"), None))),
            Ok(None),
        ]));
        let handle = start(ServerConfig { port: 0 }, state).await.unwrap();
        let url = format!("http://127.0.0.1:{}/api/regenerate", handle.port);
        let client = reqwest::Client::new();

        let resp = client
            .post(&url)
            .json(&serde_json::json!({"word": "Tisch", "id": 2}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let card: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(card["id"], 2);
        assert_eq!(card["source_text"], "Tisch");

        let resp = client
            .post(&url)
            .json(&serde_json::json!({"word": "Xyzzy", "id": 3}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 422);
    }
}
