//! Threat Alerting Pipeline - Main Entry Point

use alerting_client::Alert;
use api::{init_logging, run_server, ApiConfig, AppState};
use detector_registry::{Detector, DetectorType};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    info!("=== Threat Alerting Pipeline v{} ===", env!("CARGO_PKG_VERSION"));

    let config = ApiConfig::load()?;
    let state = Arc::new(AppState::new());
    seed_demo_data(&state).await;

    run_server(state, &config).await
}

/// Small fixture so the endpoints answer before a real registry and backend
/// are wired in
async fn seed_demo_data(state: &AppState) {
    let detector = Detector::new(
        "demo-network",
        "edge network rules",
        DetectorType::Network,
        vec!["monitor-flow".to_string(), "monitor-beacon".to_string()],
    );
    let index = detector.detector_type.alerts_index();
    state.registry.register(detector).await;

    state
        .backend
        .seed(
            &index,
            Alert::active("monitor-flow", "t-port-scan", "port scan burst", "3"),
        )
        .await;
    state
        .backend
        .seed(
            &index,
            Alert::active("monitor-beacon", "t-beacon", "periodic beaconing", "2"),
        )
        .await;

    info!("Seeded demo detector and alerts");
}
