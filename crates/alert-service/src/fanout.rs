//! Acknowledge fan-out/fan-in
//!
//! Acknowledgement is per-monitor on the backend, so a batch spanning
//! several monitors becomes N concurrent backend calls whose partial results
//! are joined into one combined response. The join is a counting consumption
//! of a channel fed by N spawned tasks: every partition contributes exactly
//! once, the combiner runs exactly once, after the N-th contribution.

use crate::dto::{map_alert_to_dto, AckAlertsResponse};
use crate::AlertServiceError;
use alerting_client::{AcknowledgeResponse, Alert, AlertingBackend, WritePolicy};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Group a batch's alert ids by their owning monitor
///
/// Iteration order of the partitions is unspecified; callers must not depend
/// on cross-partition ordering in the combined result.
pub(crate) fn partition_by_monitor(alerts: &[Alert]) -> HashMap<String, Vec<String>> {
    let mut partitions: HashMap<String, Vec<String>> = HashMap::new();
    for alert in alerts {
        partitions
            .entry(alert.monitor_id.clone())
            .or_default()
            .push(alert.id.clone());
    }
    partitions
}

/// Issue one acknowledge call per partition and join all outcomes
///
/// All N calls are dispatched before any completion is awaited; there is no
/// short-circuit before dispatch and no cancellation after it. If any call
/// fails outright, the first failure observed is returned and the remaining
/// partitions still run to completion, their outcomes discarded. Writes use
/// the immediate-refresh policy so an acknowledged alert is durably queryable
/// when the combined response is emitted.
///
/// All N calls are in flight at once with no batching or throttling, so a
/// batch spanning very many monitors produces an equally wide burst against
/// the backend.
pub(crate) async fn acknowledge_fanout(
    backend: Arc<dyn AlertingBackend>,
    partitions: HashMap<String, Vec<String>>,
) -> Result<Vec<AcknowledgeResponse>, AlertServiceError> {
    let pending = partitions.len();
    if pending == 0 {
        return Ok(Vec::new());
    }

    let (tx, mut rx) = mpsc::channel(pending);
    for (monitor_id, alert_ids) in partitions {
        let backend = Arc::clone(&backend);
        let tx = tx.clone();
        tokio::spawn(async move {
            debug!(
                "Acknowledging {} alerts on monitor {}",
                alert_ids.len(),
                monitor_id
            );
            let outcome = backend
                .acknowledge_alerts(&monitor_id, &alert_ids, WritePolicy::Immediate)
                .await;
            // Channel capacity equals the partition count, so this send
            // cannot block; the receiver drains every contribution.
            let _ = tx.send(outcome).await;
        });
    }
    drop(tx);

    let mut partials = Vec::with_capacity(pending);
    let mut first_failure = None;
    while let Some(outcome) = rx.recv().await {
        match outcome {
            Ok(partial) => partials.push(partial),
            Err(err) => {
                warn!("Partition acknowledge failed: {}", err);
                if first_failure.is_none() {
                    first_failure = Some(err);
                }
            }
        }
    }

    match first_failure {
        Some(err) => Err(err.into()),
        None => Ok(partials),
    }
}

/// Concatenate per-monitor partial results into one combined response
///
/// Acknowledged and failed alerts are mapped to DTOs attributed to the
/// detector the batch belongs to. Within one partial the backend's order is
/// preserved.
pub(crate) fn merge_partials(
    partials: Vec<AcknowledgeResponse>,
    detector_id: &str,
) -> AckAlertsResponse {
    let mut acknowledged = Vec::new();
    let mut failed = Vec::new();
    let mut missing = Vec::new();

    for partial in partials {
        acknowledged.extend(
            partial
                .acknowledged
                .into_iter()
                .map(|a| map_alert_to_dto(a, Some(detector_id.to_string()))),
        );
        failed.extend(
            partial
                .failed
                .into_iter()
                .map(|a| map_alert_to_dto(a, Some(detector_id.to_string()))),
        );
        missing.extend(partial.missing);
    }

    AckAlertsResponse {
        acknowledged,
        failed,
        missing,
    }
}
