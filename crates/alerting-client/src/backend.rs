//! Alerting backend contract

use crate::{Alert, Table};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by the alerting backend
///
/// Opaque to callers; the orchestration layer wraps but never reinterprets
/// these.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Transport or execution failure on the backend side
    #[error("backend request failed: {0}")]
    Request(String),

    /// Backend did not answer within its own deadline
    #[error("backend timed out after {0}ms")]
    Timeout(u64),
}

/// Durability requirement for acknowledge writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WritePolicy {
    /// The write is durably queryable before the call returns
    Immediate,
    /// The call returns once the next scheduled refresh has run
    WaitFor,
    /// No refresh guarantee
    NoRefresh,
}

/// One page of alerts plus the backend's reported total
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertsPage {
    pub alerts: Vec<Alert>,
    /// Total matching records, independent of pagination
    pub total_alerts: u64,
}

/// Outcome of one per-monitor acknowledge call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcknowledgeResponse {
    /// Alerts transitioned to ACKNOWLEDGED by this call
    pub acknowledged: Vec<Alert>,
    /// Alerts found but not acknowledgeable (e.g. not ACTIVE)
    pub failed: Vec<Alert>,
    /// Requested ids the backend could not find
    pub missing: Vec<String>,
}

/// Operations this pipeline consumes from the alerting subsystem
#[async_trait]
pub trait AlertingBackend: Send + Sync {
    /// Search alerts in one index, scoped to monitors and/or explicit ids
    ///
    /// `severity` and `state` accept [`crate::FILTER_ALL`] as a wildcard.
    /// An empty `monitor_ids` slice leaves monitor scoping open; `alert_ids`
    /// of `None` leaves id scoping open.
    async fn query_alerts(
        &self,
        index: &str,
        monitor_ids: &[String],
        table: &Table,
        severity: &str,
        state: &str,
        alert_ids: Option<&[String]>,
    ) -> Result<AlertsPage, BackendError>;

    /// Acknowledge alerts of one monitor
    ///
    /// Ids the backend cannot find come back in `missing`; that is a normal
    /// sub-result, not an error.
    async fn acknowledge_alerts(
        &self,
        monitor_id: &str,
        alert_ids: &[String],
        policy: WritePolicy,
    ) -> Result<AcknowledgeResponse, BackendError>;
}
