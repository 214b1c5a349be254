//! Transport-facing alert projection

use alerting_client::{
    ActionExecutionResult, AggregationResultBucket, Alert, AlertErrorEntry, AlertState,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Externally-facing projection of a backend [`Alert`]
///
/// Field-for-field copy, with the owning monitor id replaced by the resolved
/// detector id. `detector_id` is `None` when the alert's monitor was not in
/// the resolution map; callers see the gap instead of a fabricated id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertDto {
    pub detector_id: Option<String>,
    pub id: String,
    pub version: i64,
    pub schema_version: i32,
    pub trigger_id: String,
    pub trigger_name: String,
    pub finding_ids: Vec<String>,
    pub related_doc_ids: Vec<String>,
    pub state: AlertState,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub last_notification_time: Option<DateTime<Utc>>,
    pub acknowledged_time: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub error_history: Vec<AlertErrorEntry>,
    pub severity: String,
    pub action_execution_results: Vec<ActionExecutionResult>,
    pub aggregation_result_bucket: Option<AggregationResultBucket>,
}

/// Translate one backend alert into its DTO
///
/// Pure field copy; no failure modes.
pub fn map_alert_to_dto(alert: Alert, detector_id: Option<String>) -> AlertDto {
    AlertDto {
        detector_id,
        id: alert.id,
        version: alert.version,
        schema_version: alert.schema_version,
        trigger_id: alert.trigger_id,
        trigger_name: alert.trigger_name,
        finding_ids: alert.finding_ids,
        related_doc_ids: alert.related_doc_ids,
        state: alert.state,
        start_time: alert.start_time,
        end_time: alert.end_time,
        last_notification_time: alert.last_notification_time,
        acknowledged_time: alert.acknowledged_time,
        error_message: alert.error_message,
        error_history: alert.error_history,
        severity: alert.severity,
        action_execution_results: alert.action_execution_results,
        aggregation_result_bucket: alert.aggregation_result_bucket,
    }
}

/// Result of an alert search, attributed to detectors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetAlertsResponse {
    pub alerts: Vec<AlertDto>,
    /// Backend-reported total, independent of pagination
    pub total_alerts: u64,
}

/// Combined result of a multi-monitor acknowledgement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckAlertsResponse {
    pub acknowledged: Vec<AlertDto>,
    pub failed: Vec<AlertDto>,
    /// Requested ids no monitor's backend call could find
    pub missing: Vec<String>,
}
