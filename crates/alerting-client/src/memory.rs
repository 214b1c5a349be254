//! In-memory alerting backend
//!
//! Stands in for the real alerting subsystem in tests and the demo server:
//! per-index alert storage, query filtering, and acknowledge state
//! transitions, plus failure injection and call counters so callers can
//! assert on dispatch behavior.

use crate::{
    AcknowledgeResponse, Alert, AlertState, AlertingBackend, AlertsPage, BackendError, Table,
    WritePolicy, FILTER_ALL,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory stand-in for the alerting backend
pub struct InMemoryAlertingBackend {
    /// Alerts keyed by index name
    store: RwLock<HashMap<String, Vec<Alert>>>,
    /// Monitors whose acknowledge calls fail outright
    fail_monitors: RwLock<HashSet<String>>,
    /// When set, every query call fails
    fail_queries: AtomicBool,
    query_calls: AtomicUsize,
    ack_calls: AtomicUsize,
    /// Write policy seen by the most recent acknowledge call
    last_write_policy: RwLock<Option<WritePolicy>>,
}

impl InMemoryAlertingBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
            fail_monitors: RwLock::new(HashSet::new()),
            fail_queries: AtomicBool::new(false),
            query_calls: AtomicUsize::new(0),
            ack_calls: AtomicUsize::new(0),
            last_write_policy: RwLock::new(None),
        }
    }

    /// Store an alert under the given index
    pub async fn seed(&self, index: &str, alert: Alert) {
        self.store
            .write()
            .await
            .entry(index.to_string())
            .or_default()
            .push(alert);
    }

    /// Make every acknowledge call against `monitor_id` fail
    pub async fn fail_monitor(&self, monitor_id: &str) {
        self.fail_monitors
            .write()
            .await
            .insert(monitor_id.to_string());
    }

    /// Make every query call fail
    pub fn fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    /// Number of query calls issued so far
    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }

    /// Number of acknowledge calls issued so far
    pub fn ack_calls(&self) -> usize {
        self.ack_calls.load(Ordering::SeqCst)
    }

    /// Write policy of the most recent acknowledge call
    pub async fn last_write_policy(&self) -> Option<WritePolicy> {
        *self.last_write_policy.read().await
    }

    fn matches(
        alert: &Alert,
        monitor_ids: &[String],
        severity: &str,
        state: &str,
        alert_ids: Option<&[String]>,
        search: Option<&str>,
    ) -> bool {
        if !monitor_ids.is_empty() && !monitor_ids.contains(&alert.monitor_id) {
            return false;
        }
        if let Some(ids) = alert_ids {
            if !ids.contains(&alert.id) {
                return false;
            }
        }
        if severity != FILTER_ALL && alert.severity != severity {
            return false;
        }
        if state != FILTER_ALL && alert.state.as_str() != state {
            return false;
        }
        if let Some(text) = search {
            if !text.is_empty() && !alert.trigger_name.contains(text) {
                return false;
            }
        }
        true
    }
}

impl Default for InMemoryAlertingBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AlertingBackend for InMemoryAlertingBackend {
    async fn query_alerts(
        &self,
        index: &str,
        monitor_ids: &[String],
        table: &Table,
        severity: &str,
        state: &str,
        alert_ids: Option<&[String]>,
    ) -> Result<AlertsPage, BackendError> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(BackendError::Request("injected query failure".to_string()));
        }

        let store = self.store.read().await;
        let mut matched: Vec<Alert> = store
            .get(index)
            .map(|alerts| {
                alerts
                    .iter()
                    .filter(|a| {
                        Self::matches(
                            a,
                            monitor_ids,
                            severity,
                            state,
                            alert_ids,
                            table.search_string.as_deref(),
                        )
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if table.sort_string == "start_time" {
            matched.sort_by_key(|a| a.start_time);
            if table.sort_order == "desc" {
                matched.reverse();
            }
        }

        let total_alerts = matched.len() as u64;
        let page: Vec<Alert> = matched
            .into_iter()
            .skip(table.start_index)
            .take(table.size)
            .collect();

        debug!(
            "Query on {} matched {} alerts, returning {}",
            index,
            total_alerts,
            page.len()
        );

        Ok(AlertsPage {
            alerts: page,
            total_alerts,
        })
    }

    async fn acknowledge_alerts(
        &self,
        monitor_id: &str,
        alert_ids: &[String],
        policy: WritePolicy,
    ) -> Result<AcknowledgeResponse, BackendError> {
        self.ack_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_write_policy.write().await = Some(policy);

        if self.fail_monitors.read().await.contains(monitor_id) {
            return Err(BackendError::Request(format!(
                "injected acknowledge failure for monitor {monitor_id}"
            )));
        }

        let mut store = self.store.write().await;
        let mut acknowledged = Vec::new();
        let mut failed = Vec::new();
        let mut missing = Vec::new();

        // Request order is preserved in the per-call result lists.
        for id in alert_ids {
            let found = store
                .values_mut()
                .flat_map(|alerts| alerts.iter_mut())
                .find(|a| a.id == *id && a.monitor_id == monitor_id);

            match found {
                Some(alert) if alert.state == AlertState::Active => {
                    alert.state = AlertState::Acknowledged;
                    alert.acknowledged_time = Some(Utc::now());
                    acknowledged.push(alert.clone());
                }
                Some(alert) => failed.push(alert.clone()),
                None => missing.push(id.clone()),
            }
        }

        debug!(
            "Acknowledge on monitor {}: {} acked, {} failed, {} missing",
            monitor_id,
            acknowledged.len(),
            failed.len(),
            missing.len()
        );

        Ok(AcknowledgeResponse {
            acknowledged,
            failed,
            missing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed_backend() -> InMemoryAlertingBackend {
        InMemoryAlertingBackend::new()
    }

    #[tokio::test]
    async fn test_query_filters_by_monitor_and_state() {
        let backend = seed_backend();
        backend
            .seed(".idx", Alert::active("m1", "t1", "port scan", "3"))
            .await;
        backend
            .seed(".idx", Alert::active("m2", "t2", "dns tunnel", "1"))
            .await;

        let page = backend
            .query_alerts(
                ".idx",
                &["m1".to_string()],
                &Table::default(),
                FILTER_ALL,
                "ACTIVE",
                None,
            )
            .await
            .unwrap();

        assert_eq!(page.total_alerts, 1);
        assert_eq!(page.alerts[0].monitor_id, "m1");
    }

    #[tokio::test]
    async fn test_query_unknown_index_is_empty() {
        let backend = seed_backend();
        let page = backend
            .query_alerts(".absent", &[], &Table::default(), FILTER_ALL, FILTER_ALL, None)
            .await
            .unwrap();
        assert_eq!(page.total_alerts, 0);
        assert!(page.alerts.is_empty());
    }

    #[tokio::test]
    async fn test_query_pagination() {
        let backend = seed_backend();
        for i in 0..5 {
            backend
                .seed(".idx", Alert::active("m1", "t1", format!("hit {i}"), "2"))
                .await;
        }

        let table = Table {
            size: 2,
            start_index: 2,
            ..Table::default()
        };
        let page = backend
            .query_alerts(".idx", &[], &table, FILTER_ALL, FILTER_ALL, None)
            .await
            .unwrap();

        assert_eq!(page.total_alerts, 5);
        assert_eq!(page.alerts.len(), 2);
    }

    #[tokio::test]
    async fn test_acknowledge_transitions_and_missing() {
        let backend = seed_backend();
        let alert = Alert::active("m1", "t1", "beaconing", "2");
        let id = alert.id.clone();
        backend.seed(".idx", alert).await;

        let response = backend
            .acknowledge_alerts("m1", &[id.clone(), "ghost".to_string()], WritePolicy::Immediate)
            .await
            .unwrap();

        assert_eq!(response.acknowledged.len(), 1);
        assert_eq!(response.acknowledged[0].state, AlertState::Acknowledged);
        assert!(response.acknowledged[0].acknowledged_time.is_some());
        assert_eq!(response.missing, vec!["ghost".to_string()]);
        assert_eq!(backend.last_write_policy().await, Some(WritePolicy::Immediate));
    }

    #[tokio::test]
    async fn test_acknowledge_non_active_goes_to_failed() {
        let backend = seed_backend();
        let mut alert = Alert::active("m1", "t1", "beaconing", "2");
        alert.state = AlertState::Completed;
        let id = alert.id.clone();
        backend.seed(".idx", alert).await;

        let response = backend
            .acknowledge_alerts("m1", &[id], WritePolicy::Immediate)
            .await
            .unwrap();

        assert!(response.acknowledged.is_empty());
        assert_eq!(response.failed.len(), 1);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let backend = seed_backend();
        backend.fail_monitor("m1").await;

        let err = backend
            .acknowledge_alerts("m1", &["x".to_string()], WritePolicy::Immediate)
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Request(_)));
        assert_eq!(backend.ack_calls(), 1);
    }
}
