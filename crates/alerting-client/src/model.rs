//! Backend alert representation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of an alert, owned by the alerting backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertState {
    /// Condition is currently triggered
    Active,
    /// An operator acknowledged the alert
    Acknowledged,
    /// Condition cleared on its own
    Completed,
    /// Monitor execution failed while the alert was open
    Error,
    /// Alert was removed by the backend
    Deleted,
}

impl AlertState {
    /// Uppercase wire name, as used in state filters
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertState::Active => "ACTIVE",
            AlertState::Acknowledged => "ACKNOWLEDGED",
            AlertState::Completed => "COMPLETED",
            AlertState::Error => "ERROR",
            AlertState::Deleted => "DELETED",
        }
    }
}

/// One entry in an alert's error history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertErrorEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

/// Outcome of one notification action execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionExecutionResult {
    pub action_id: String,
    pub last_execution_time: Option<DateTime<Utc>>,
    pub throttled_count: u32,
}

/// Aggregation bucket an alert was generated from, for bucket-level monitors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationResultBucket {
    pub parent_bucket_path: String,
    pub bucket_keys: Vec<String>,
    pub doc_count: u64,
}

/// One instance of a triggered condition, owned by exactly one monitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub version: i64,
    pub schema_version: i32,
    /// Owning monitor; the unit of acknowledgement
    pub monitor_id: String,
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

impl Alert {
    /// Create a fresh active alert for the given monitor and trigger
    pub fn active(
        monitor_id: impl Into<String>,
        trigger_id: impl Into<String>,
        trigger_name: impl Into<String>,
        severity: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            version: 1,
            schema_version: 1,
            monitor_id: monitor_id.into(),
            trigger_id: trigger_id.into(),
            trigger_name: trigger_name.into(),
            finding_ids: Vec::new(),
            related_doc_ids: Vec::new(),
            state: AlertState::Active,
            start_time: Utc::now(),
            end_time: None,
            last_notification_time: None,
            acknowledged_time: None,
            error_message: None,
            error_history: Vec::new(),
            severity: severity.into(),
            action_execution_results: Vec::new(),
            aggregation_result_bucket: None,
        }
    }
}
