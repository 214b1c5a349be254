//! Server configuration
//!
//! Settings come from an optional `threatscope.toml` next to the binary,
//! overridden by `THREATSCOPE_*` environment variables, with coded defaults
//! underneath.

use serde::Deserialize;

/// API server settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Listen address
    pub bind_addr: String,
    /// Read-path requests replenished per second
    pub read_per_second: u64,
    /// Read-path burst size
    pub read_burst: u32,
    /// Acknowledge requests replenished per second
    pub ack_per_second: u64,
    /// Acknowledge burst size
    pub ack_burst: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            read_per_second: 1,
            read_burst: 20,
            ack_per_second: 2,
            ack_burst: 5,
        }
    }
}

impl ApiConfig {
    /// Load settings from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name("threatscope").required(false))
            .add_source(config::Environment::with_prefix("THREATSCOPE").try_parsing(true))
            .build()?
            .try_deserialize()
    }
}
