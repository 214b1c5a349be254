//! Alert service facade

use crate::dto::{map_alert_to_dto, AckAlertsResponse, GetAlertsResponse};
use crate::fanout::{acknowledge_fanout, merge_partials, partition_by_monitor};
use crate::resolve::{resolve_monitors, MonitorResolution};
use crate::AlertServiceError;
use alerting_client::{Alert, AlertingBackend, AlertsPage, Table, FILTER_ALL};
use detector_registry::{Detector, DetectorRegistry, DetectorType};
use std::sync::Arc;
use tracing::{debug, error};

/// Orchestrates alert search and acknowledgement across detectors
///
/// Both collaborators are injected at construction; the service holds no
/// other state and is cheap to clone per request scope.
#[derive(Clone)]
pub struct AlertService {
    backend: Arc<dyn AlertingBackend>,
    registry: Arc<dyn DetectorRegistry>,
}

impl AlertService {
    /// Create a service over the given collaborators
    pub fn new(backend: Arc<dyn AlertingBackend>, registry: Arc<dyn DetectorRegistry>) -> Self {
        Self { backend, registry }
    }

    /// Search alerts generated by one detector
    ///
    /// Resolves the detector through the registry, then queries across all of
    /// its monitors.
    pub async fn get_alerts_by_detector_id(
        &self,
        detector_id: &str,
        table: &Table,
        severity: &str,
        state: &str,
    ) -> Result<GetAlertsResponse, AlertServiceError> {
        let detector = self.registry.get_detector(detector_id).await?;
        let resolution = resolve_monitors(std::slice::from_ref(&detector))?;

        self.get_alerts_by_monitor_ids(
            &resolution,
            &detector.detector_type.alerts_index(),
            table,
            severity,
            state,
        )
        .await
        .map_err(|err| {
            error!("Failed to fetch alerts for detector {}: {}", detector_id, err);
            err
        })
    }

    /// Search alerts across an explicit detector list of one type
    pub async fn get_alerts(
        &self,
        detectors: &[Detector],
        detector_type: DetectorType,
        table: &Table,
        severity: &str,
        state: &str,
    ) -> Result<GetAlertsResponse, AlertServiceError> {
        let resolution = resolve_monitors(detectors)?;

        self.get_alerts_by_monitor_ids(
            &resolution,
            &detector_type.alerts_index(),
            table,
            severity,
            state,
        )
        .await
        .map_err(|err| {
            let ids: Vec<&str> = detectors.iter().map(|d| d.id.as_str()).collect();
            error!(
                "Failed to fetch alerts for detectors [{}]: {}",
                ids.join(","),
                err
            );
            err
        })
    }

    /// The single-query read path every entry point funnels into
    ///
    /// Issues exactly one backend query and attributes each returned alert to
    /// its owning detector through the resolution map. No retry, no partial
    /// result: a backend failure propagates wrapped and unchanged.
    pub async fn get_alerts_by_monitor_ids(
        &self,
        resolution: &MonitorResolution,
        alerts_index: &str,
        table: &Table,
        severity: &str,
        state: &str,
    ) -> Result<GetAlertsResponse, AlertServiceError> {
        let page = self
            .backend
            .query_alerts(
                alerts_index,
                &resolution.monitor_ids,
                table,
                severity,
                state,
                None,
            )
            .await?;

        debug!(
            "Query on {} returned {} of {} alerts",
            alerts_index,
            page.alerts.len(),
            page.total_alerts
        );

        let alerts = page
            .alerts
            .into_iter()
            .map(|alert| {
                let detector_id = resolution.detector_for(&alert.monitor_id).map(String::from);
                map_alert_to_dto(alert, detector_id)
            })
            .collect();

        Ok(GetAlertsResponse {
            alerts,
            total_alerts: page.total_alerts,
        })
    }

    /// Fetch an explicit batch of alerts ahead of acknowledgement
    ///
    /// Returns the raw backend page; severity and state are left open so the
    /// acknowledge path sees the batch exactly as the backend holds it.
    pub async fn get_alerts_by_ids(
        &self,
        alert_ids: &[String],
        detector: &Detector,
        table: &Table,
    ) -> Result<AlertsPage, AlertServiceError> {
        self.backend
            .query_alerts(
                &detector.detector_type.alerts_index(),
                &[],
                table,
                FILTER_ALL,
                FILTER_ALL,
                Some(alert_ids),
            )
            .await
            .map_err(Into::into)
    }

    /// Acknowledge a previously-fetched batch of alerts
    ///
    /// Partitions the batch by owning monitor, acknowledges every partition
    /// concurrently, and merges all partial results into one combined
    /// response once the last partition completes. An empty batch yields an
    /// empty response without touching the backend.
    pub async fn acknowledge_alerts(
        &self,
        alerts: Vec<Alert>,
        detector: &Detector,
    ) -> Result<AckAlertsResponse, AlertServiceError> {
        let partitions = partition_by_monitor(&alerts);
        debug!(
            "Acknowledging {} alerts across {} monitors for detector {}",
            alerts.len(),
            partitions.len(),
            detector.id
        );

        let partials = acknowledge_fanout(Arc::clone(&self.backend), partitions)
            .await
            .map_err(|err| {
                error!(
                    "Acknowledge failed for detector {}: {}",
                    detector.id, err
                );
                err
            })?;

        Ok(merge_partials(partials, &detector.id))
    }
}
