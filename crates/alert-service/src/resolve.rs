//! Monitor resolution
//!
//! Flattens a detector set into the monitor ids to query and the reverse
//! mapping used to attribute each returned alert to its owning detector.

use crate::AlertServiceError;
use detector_registry::Detector;
use std::collections::HashMap;

/// Request-scoped product of flattening a detector set
#[derive(Debug, Clone)]
pub struct MonitorResolution {
    /// Every monitor id across the input detectors, in source order.
    /// Not deduplicated: a monitor listed twice stays twice.
    pub monitor_ids: Vec<String>,
    /// monitor id -> owning detector id (many-to-one)
    pub monitor_to_detector: HashMap<String, String>,
}

impl MonitorResolution {
    /// Detector owning the given monitor, if the monitor was in scope
    pub fn detector_for(&self, monitor_id: &str) -> Option<&str> {
        self.monitor_to_detector.get(monitor_id).map(String::as_str)
    }
}

/// Flatten one or more detectors into a [`MonitorResolution`]
///
/// Pure; issues no calls. Fails only on an empty detector set, before any
/// backend interaction can happen.
///
/// If two detectors list the same monitor id, the later detector wins in the
/// mapping. Detector/monitor ownership upstream is one-to-many, so a shared
/// id is a configuration quirk, not a supported layout.
pub fn resolve_monitors(detectors: &[Detector]) -> Result<MonitorResolution, AlertServiceError> {
    if detectors.is_empty() {
        return Err(AlertServiceError::InvalidArgument(
            "detector list is empty".to_string(),
        ));
    }

    let mut monitor_ids = Vec::new();
    let mut monitor_to_detector = HashMap::new();
    for detector in detectors {
        for monitor_id in &detector.monitor_ids {
            monitor_to_detector.insert(monitor_id.clone(), detector.id.clone());
        }
        monitor_ids.extend(detector.monitor_ids.iter().cloned());
    }

    Ok(MonitorResolution {
        monitor_ids,
        monitor_to_detector,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use detector_registry::DetectorType;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn detector(id: &str, monitors: &[&str]) -> Detector {
        Detector::new(
            id,
            format!("{id} rules"),
            DetectorType::Network,
            monitors.iter().map(|m| m.to_string()).collect(),
        )
    }

    #[test]
    fn test_empty_detector_list_rejected() {
        let err = resolve_monitors(&[]).unwrap_err();
        assert!(matches!(err, AlertServiceError::InvalidArgument(_)));
    }

    #[test]
    fn test_flattening_preserves_order_and_duplicates() {
        let detectors = vec![detector("d1", &["m1", "m2"]), detector("d2", &["m2", "m3"])];
        let resolution = resolve_monitors(&detectors).unwrap();

        assert_eq!(resolution.monitor_ids, vec!["m1", "m2", "m2", "m3"]);
        assert_eq!(resolution.monitor_to_detector.len(), 3);
    }

    #[test]
    fn test_shared_monitor_last_writer_wins() {
        let detectors = vec![detector("d1", &["m1"]), detector("d2", &["m1"])];
        let resolution = resolve_monitors(&detectors).unwrap();
        assert_eq!(resolution.detector_for("m1"), Some("d2"));
    }

    #[test]
    fn test_unknown_monitor_unattributed() {
        let resolution = resolve_monitors(&[detector("d1", &["m1"])]).unwrap();
        assert_eq!(resolution.detector_for("m9"), None);
    }

    proptest! {
        // Flattened length is the sum of per-detector counts and the map
        // keys are exactly the distinct monitor ids.
        #[test]
        fn prop_resolution_shape(
            monitor_lists in prop::collection::vec(
                prop::collection::vec("m[0-9]", 0..6),
                1..8,
            )
        ) {
            let detectors: Vec<Detector> = monitor_lists
                .iter()
                .enumerate()
                .map(|(i, monitors)| detector(&format!("d{i}"), &monitors.iter().map(String::as_str).collect::<Vec<_>>()))
                .collect();

            let resolution = resolve_monitors(&detectors).unwrap();

            let expected_len: usize = monitor_lists.iter().map(Vec::len).sum();
            prop_assert_eq!(resolution.monitor_ids.len(), expected_len);

            let distinct: HashSet<&String> = monitor_lists.iter().flatten().collect();
            prop_assert_eq!(resolution.monitor_to_detector.len(), distinct.len());

            for (monitor_id, detector_id) in &resolution.monitor_to_detector {
                let last_owner = detectors
                    .iter()
                    .rev()
                    .find(|d| d.monitor_ids.contains(monitor_id))
                    .map(|d| d.id.clone());
                prop_assert_eq!(Some(detector_id.clone()), last_owner);
            }
        }
    }
}
