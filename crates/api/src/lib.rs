//! Threat Alerting API Server
//!
//! REST surface over the alert orchestration service: alert search,
//! batch acknowledgement, health, and Prometheus metrics.

use axum::{extract::State, response::IntoResponse, routing::get, routing::post, Json, Router};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::GovernorLayer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod config;
mod rate_limit;
mod routes;

pub use config::ApiConfig;

use alert_service::AlertService;
use alerting_client::InMemoryAlertingBackend;
use detector_registry::InMemoryDetectorRegistry;

/// Application state shared across handlers
pub struct AppState {
    /// Alert orchestration service
    pub alerts: AlertService,
    /// Detector definitions
    pub registry: Arc<InMemoryDetectorRegistry>,
    /// Alerting backend handle, kept for health reporting
    pub backend: Arc<InMemoryAlertingBackend>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create state over fresh in-memory collaborators
    pub fn new() -> Self {
        let backend = Arc::new(InMemoryAlertingBackend::new());
        let registry = Arc::new(InMemoryDetectorRegistry::new());
        let alerts = AlertService::new(backend.clone(), registry.clone());
        Self {
            alerts,
            registry,
            backend,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub stats: PipelineStats,
}

/// Counters surfaced by the health endpoint
#[derive(Debug, Serialize)]
pub struct PipelineStats {
    pub detector_count: usize,
    pub backend_query_calls: usize,
    pub backend_ack_calls: usize,
}

fn read_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/alerts", get(routes::alerts::get_alerts))
}

fn ack_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/v1/alerts/ack", post(routes::alerts::ack_alerts))
}

/// Create the application router, without middleware
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(read_routes())
        .merge(ack_routes())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        stats: PipelineStats {
            detector_count: state.registry.len().await,
            backend_query_calls: state.backend.query_calls(),
            backend_ack_calls: state.backend.ack_calls(),
        },
    };

    Json(response)
}

/// Initialize logging
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

/// Install the Prometheus recorder and return its render handle
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    Ok(PrometheusBuilder::new().install_recorder()?)
}

/// Run the server
///
/// The acknowledge route sits behind a tighter rate limit than the read
/// routes; both limiters key on peer IP, which requires serving with
/// connect-info.
pub async fn run_server(state: Arc<AppState>, config: &ApiConfig) -> anyhow::Result<()> {
    let prometheus = init_metrics()?;

    let app = Router::new()
        .merge(read_routes().layer(GovernorLayer {
            config: rate_limit::read_limiter(config),
        }))
        .merge(ack_routes().layer(GovernorLayer {
            config: rate_limit::ack_limiter(config),
        }))
        .route("/metrics", get(move || async move { prometheus.render() }))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state);

    info!("Starting API server on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alerting_client::Alert;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use detector_registry::{Detector, DetectorType};
    use serde_json::json;
    use tower::ServiceExt;

    async fn seeded_state() -> (Arc<AppState>, Vec<String>) {
        let state = Arc::new(AppState::new());
        let detector = Detector::new(
            "det-1",
            "network rules",
            DetectorType::Network,
            vec!["m1".to_string(), "m2".to_string()],
        );
        let index = detector.detector_type.alerts_index();
        state.registry.register(detector).await;

        let first = Alert::active("m1", "t1", "port scan", "3");
        let second = Alert::active("m2", "t2", "dns tunnel", "1");
        let ids = vec![first.id.clone(), second.id.clone()];
        state.backend.seed(&index, first).await;
        state.backend.seed(&index, second).await;
        (state, ids)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (state, _ids) = seeded_state().await;
        let app = create_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["stats"]["detector_count"], 1);
    }

    #[tokio::test]
    async fn test_get_alerts_for_detector() {
        let (state, _ids) = seeded_state().await;
        let app = create_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/alerts?detector_id=det-1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["total_alerts"], 2);
        assert_eq!(json["alerts"].as_array().unwrap().len(), 2);
        assert_eq!(json["alerts"][0]["detector_id"], "det-1");
    }

    #[tokio::test]
    async fn test_get_alerts_unknown_detector() {
        let (state, _ids) = seeded_state().await;
        let app = create_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/alerts?detector_id=ghost")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_ack_alerts_roundtrip() {
        let (state, ids) = seeded_state().await;
        let app = create_router(state.clone());

        let body = json!({ "detector_id": "det-1", "alert_ids": ids });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/alerts/ack")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["acknowledged"].as_array().unwrap().len(), 2);
        assert!(json["missing"].as_array().unwrap().is_empty());
        // One acknowledge call per owning monitor.
        assert_eq!(state.backend.ack_calls(), 2);
    }

    #[tokio::test]
    async fn test_ack_rejects_empty_id_list() {
        let (state, _ids) = seeded_state().await;
        let app = create_router(state);

        let body = json!({ "detector_id": "det-1", "alert_ids": [] });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/alerts/ack")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
