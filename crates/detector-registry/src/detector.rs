//! Detector model and alerts-index resolution

use serde::{Deserialize, Serialize};

/// Category of log source a detector watches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorType {
    /// Network flow and firewall logs
    Network,
    /// DNS query logs
    Dns,
    /// Windows event logs
    Windows,
    /// Linux syslog / auditd
    Linux,
    /// Cloud audit trails
    CloudTrail,
    /// Web application firewall logs
    Waf,
}

impl DetectorType {
    /// Short identifier used in index names and API payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectorType::Network => "network",
            DetectorType::Dns => "dns",
            DetectorType::Windows => "windows",
            DetectorType::Linux => "linux",
            DetectorType::CloudTrail => "cloudtrail",
            DetectorType::Waf => "waf",
        }
    }

    /// Name of the alerts index backing this detector type
    ///
    /// Each detector type writes its alerts into a dedicated index on the
    /// alerting backend; queries must be scoped to the matching index.
    pub fn alerts_index(&self) -> String {
        format!(".threatscope-{}-alerts", self.as_str())
    }
}

/// A logical rule-set entity owning one or more monitors
///
/// Monitors are the backend-scheduled alert-generating units; every alert
/// belongs to exactly one monitor, and every monitor to exactly one detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detector {
    /// Unique detector identifier
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Log source category
    pub detector_type: DetectorType,
    /// Ordered monitor identifiers owned by this detector
    pub monitor_ids: Vec<String>,
}

impl Detector {
    /// Create a detector owning the given monitors
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        detector_type: DetectorType,
        monitor_ids: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            detector_type,
            monitor_ids,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alerts_index_per_type() {
        assert_eq!(DetectorType::Network.alerts_index(), ".threatscope-network-alerts");
        assert_eq!(DetectorType::CloudTrail.alerts_index(), ".threatscope-cloudtrail-alerts");
    }

    #[test]
    fn test_detector_type_serde() {
        let json = serde_json::to_string(&DetectorType::CloudTrail).unwrap();
        assert_eq!(json, "\"cloud_trail\"");
    }

    #[test]
    fn test_detector_construction() {
        let det = Detector::new(
            "det-1",
            "edge firewall",
            DetectorType::Network,
            vec!["m1".to_string(), "m2".to_string()],
        );
        assert_eq!(det.monitor_ids.len(), 2);
        assert_eq!(det.detector_type, DetectorType::Network);
    }
}
