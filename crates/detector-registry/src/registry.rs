//! Registry lookup service

use crate::Detector;
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

/// Errors from detector lookup
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No detector with the requested id
    #[error("detector not found: {0}")]
    NotFound(String),

    /// Registry backend could not be reached
    #[error("registry unavailable: {0}")]
    Unavailable(String),
}

/// Lookup service for detector definitions
///
/// Implemented by whatever owns detector storage; this layer only reads.
#[async_trait]
pub trait DetectorRegistry: Send + Sync {
    /// Fetch one detector by id
    async fn get_detector(&self, detector_id: &str) -> Result<Detector, RegistryError>;
}

/// In-memory registry for tests and the demo server
pub struct InMemoryDetectorRegistry {
    detectors: RwLock<HashMap<String, Detector>>,
}

impl InMemoryDetectorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            detectors: RwLock::new(HashMap::new()),
        }
    }

    /// Register or replace a detector
    pub async fn register(&self, detector: Detector) {
        debug!("Registering detector {}", detector.id);
        self.detectors
            .write()
            .await
            .insert(detector.id.clone(), detector);
    }

    /// Number of registered detectors
    pub async fn len(&self) -> usize {
        self.detectors.read().await.len()
    }

    /// Whether the registry is empty
    pub async fn is_empty(&self) -> bool {
        self.detectors.read().await.is_empty()
    }
}

impl Default for InMemoryDetectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DetectorRegistry for InMemoryDetectorRegistry {
    async fn get_detector(&self, detector_id: &str) -> Result<Detector, RegistryError> {
        self.detectors
            .read()
            .await
            .get(detector_id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(detector_id.to_string()))
    }
}
