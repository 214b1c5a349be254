//! Service-level error taxonomy

use alerting_client::BackendError;
use detector_registry::RegistryError;
use thiserror::Error;

/// Application-level failure of an alert operation
///
/// Every lower-layer failure is wrapped into this type before it reaches the
/// caller, with the original cause preserved for diagnostics. There are no
/// internal retries; a failed call is reported, never retried.
#[derive(Debug, Error)]
pub enum AlertServiceError {
    /// The request was malformed before any call was issued
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A referenced detector does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// The alerting backend reported a failure, surfaced unchanged
    #[error("alerting backend call failed: {0}")]
    Backend(#[from] BackendError),

    /// The detector registry could not be consulted
    #[error("detector registry call failed: {0}")]
    Registry(RegistryError),
}

impl From<RegistryError> for AlertServiceError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound(id) => AlertServiceError::NotFound(format!("detector {id}")),
            other => AlertServiceError::Registry(other),
        }
    }
}
