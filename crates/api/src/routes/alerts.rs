//! Alert routes

use alert_service::{AckAlertsResponse, AlertServiceError, GetAlertsResponse};
use alerting_client::{Table, FILTER_ALL};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use detector_registry::DetectorRegistry;
use metrics::counter;
use serde::Deserialize;
use std::sync::Arc;

use crate::AppState;

/// Query parameters for the alert search endpoint
#[derive(Debug, Deserialize)]
pub struct AlertsQuery {
    /// Detector whose alerts to search
    pub detector_id: String,
    /// Severity filter; "ALL" matches everything
    #[serde(default = "filter_all")]
    pub severity: String,
    /// Lifecycle state filter; "ALL" matches everything
    #[serde(default = "filter_all")]
    pub state: String,
    /// Maximum number of records
    #[serde(default = "default_size")]
    pub size: usize,
    /// Offset of the first record
    #[serde(default)]
    pub start_index: usize,
    /// Sort field
    #[serde(default = "default_sort_string")]
    pub sort_string: String,
    /// "asc" or "desc"
    #[serde(default = "default_sort_order")]
    pub sort_order: String,
    /// Free-text search
    pub search_string: Option<String>,
}

fn filter_all() -> String {
    FILTER_ALL.to_string()
}

fn default_size() -> usize {
    20
}

fn default_sort_string() -> String {
    "start_time".to_string()
}

fn default_sort_order() -> String {
    "desc".to_string()
}

/// Request body for the acknowledge endpoint
#[derive(Debug, Deserialize)]
pub struct AckAlertsRequest {
    pub detector_id: String,
    pub alert_ids: Vec<String>,
}

/// Search alerts for one detector
pub async fn get_alerts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AlertsQuery>,
) -> Result<Json<GetAlertsResponse>, (StatusCode, String)> {
    counter!("api_alert_queries_total").increment(1);

    let table = Table {
        sort_order: params.sort_order,
        sort_string: params.sort_string,
        size: params.size.min(500),
        start_index: params.start_index,
        search_string: params.search_string,
        missing: None,
    };

    let response = state
        .alerts
        .get_alerts_by_detector_id(&params.detector_id, &table, &params.severity, &params.state)
        .await
        .map_err(into_http_error)?;

    Ok(Json(response))
}

/// Acknowledge a batch of alerts belonging to one detector
///
/// Fetches the batch first so the acknowledge fan-out partitions on the
/// backend's current view of each alert's owning monitor.
pub async fn ack_alerts(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AckAlertsRequest>,
) -> Result<Json<AckAlertsResponse>, (StatusCode, String)> {
    counter!("api_alert_ack_requests_total").increment(1);

    if request.alert_ids.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "alert_ids must not be empty".to_string(),
        ));
    }

    let detector = state
        .registry
        .get_detector(&request.detector_id)
        .await
        .map_err(|err| into_http_error(err.into()))?;

    let page = state
        .alerts
        .get_alerts_by_ids(&request.alert_ids, &detector, &Table::unpaged())
        .await
        .map_err(into_http_error)?;

    let response = state
        .alerts
        .acknowledge_alerts(page.alerts, &detector)
        .await
        .map_err(into_http_error)?;

    counter!("api_alerts_acknowledged_total").increment(response.acknowledged.len() as u64);

    Ok(Json(response))
}

fn into_http_error(err: AlertServiceError) -> (StatusCode, String) {
    let status = match &err {
        AlertServiceError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        AlertServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        AlertServiceError::Backend(_) | AlertServiceError::Registry(_) => StatusCode::BAD_GATEWAY,
    };
    (status, err.to_string())
}
