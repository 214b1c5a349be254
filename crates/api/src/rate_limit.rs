//! Per-IP rate limiting
//!
//! GCRA-based limiting via tower_governor, keyed on peer IP. The read path
//! gets a wide allowance; acknowledge writes get a tight one, since each
//! request fans out into per-monitor backend writes.

use crate::ApiConfig;
use governor::middleware::StateInformationMiddleware;
use std::sync::Arc;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;

/// Governor config keyed on peer IP, with X-RateLimit-* response headers
pub type IpGovernorConfig =
    tower_governor::governor::GovernorConfig<PeerIpKeyExtractor, StateInformationMiddleware>;

/// Limiter for the alert read endpoints
pub fn read_limiter(config: &ApiConfig) -> Arc<IpGovernorConfig> {
    limiter(config.read_per_second, config.read_burst)
}

/// Limiter for the acknowledge endpoint
pub fn ack_limiter(config: &ApiConfig) -> Arc<IpGovernorConfig> {
    limiter(config.ack_per_second, config.ack_burst)
}

fn limiter(per_second: u64, burst_size: u32) -> Arc<IpGovernorConfig> {
    // The builder only returns None on a zero period or burst; both are
    // rejected here by construction.
    Arc::new(
        GovernorConfigBuilder::default()
            .per_second(per_second.max(1))
            .burst_size(burst_size.max(1))
            .use_headers()
            .finish()
            .expect("non-zero rate limit parameters"),
    )
}
