//! Store connection settings loaded via OrthoConfig.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{FeedLimit, FeedLimitError};

/// Settings for the Redis-backed key-value store and feed reads.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CHIRP")]
pub struct StoreSettings {
    /// Redis connection URL.
    #[ortho_config(default = "redis://127.0.0.1:6379".to_owned())]
    pub redis_url: String,
    /// Maximum pooled connections.
    #[ortho_config(default = 10)]
    pub pool_max_size: u32,
    /// Per-command deadline in milliseconds.
    #[ortho_config(default = 2_000)]
    pub command_timeout_ms: u64,
    /// Default number of updates returned by feed reads.
    #[ortho_config(default = 11)]
    pub feed_limit: usize,
}

impl StoreSettings {
    /// Configured per-command deadline.
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    /// Configured default feed limit.
    ///
    /// # Errors
    ///
    /// Returns [`FeedLimitError::Zero`] when the limit is configured as 0.
    pub fn feed_limit(&self) -> Result<FeedLimit, FeedLimitError> {
        FeedLimit::new(self.feed_limit)
    }
}
