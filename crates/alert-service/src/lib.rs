//! Alert Orchestration Service
//!
//! Maps detectors to their monitors, forwards alert search and acknowledge
//! operations to the alerting backend, and translates backend alerts into
//! detector-attributed DTOs.
//!
//! The read path funnels every entry point into one backend query; the write
//! path partitions a batch by owning monitor, fans out one acknowledge call
//! per monitor, and joins all partial results into a single combined
//! response.

mod dto;
mod error;
mod fanout;
mod resolve;
mod service;

pub use dto::{map_alert_to_dto, AckAlertsResponse, AlertDto, GetAlertsResponse};
pub use error::AlertServiceError;
pub use resolve::{resolve_monitors, MonitorResolution};
pub use service::AlertService;
