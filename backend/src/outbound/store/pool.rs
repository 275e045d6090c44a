//! Async connection pool for Redis via `bb8-redis`.
//!
//! Checkout is bounded by the configured connection timeout and every
//! failure is mapped to a [`PoolError`] before it reaches the store adapter.

use std::time::Duration;

use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::{Pool, PooledConnection, RunError};
use bb8_redis::redis::RedisError;

/// Errors that can occur during pool operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// Failed to check out a connection from the pool.
    #[error("failed to get connection from pool: {message}")]
    Checkout { message: String },

    /// Failed to build the connection pool.
    #[error("failed to build connection pool: {message}")]
    Build { message: String },
}

impl PoolError {
    /// Create a checkout error with the given message.
    pub fn checkout(message: impl Into<String>) -> Self {
        Self::Checkout {
            message: message.into(),
        }
    }

    /// Create a build error with the given message.
    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }
}

/// Configuration for the Redis connection pool.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use chirp::outbound::store::PoolConfig;
///
/// let config = PoolConfig::new("redis://127.0.0.1:6379")
///     .with_max_size(20)
///     .with_command_timeout(Duration::from_millis(500));
/// assert_eq!(config.max_size(), 20);
/// ```
#[derive(Debug, Clone)]
pub struct PoolConfig {
    redis_url: String,
    max_size: u32,
    min_idle: Option<u32>,
    connection_timeout: Duration,
    command_timeout: Duration,
}

impl PoolConfig {
    /// Create a configuration for `redis_url`.
    ///
    /// Defaults: 10 connections, no idle floor, 5 second checkout timeout and
    /// a 2 second per-command deadline.
    pub fn new(redis_url: impl Into<String>) -> Self {
        Self {
            redis_url: redis_url.into(),
            max_size: 10,
            min_idle: None,
            connection_timeout: Duration::from_secs(5),
            command_timeout: Duration::from_secs(2),
        }
    }

    /// Set the maximum number of connections in the pool.
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    /// Set the minimum number of idle connections to maintain.
    pub fn with_min_idle(mut self, min_idle: Option<u32>) -> Self {
        self.min_idle = min_idle;
        self
    }

    /// Set the connection checkout timeout.
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Set the deadline applied to each store round trip.
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Get the Redis URL.
    pub fn redis_url(&self) -> &str {
        &self.redis_url
    }

    /// Get the maximum pool size.
    pub fn max_size(&self) -> u32 {
        self.max_size
    }

    /// Get the per-command deadline.
    pub fn command_timeout(&self) -> Duration {
        self.command_timeout
    }
}

/// Shared Redis connection pool.
#[derive(Clone)]
pub struct RedisPool {
    inner: Pool<RedisConnectionManager>,
    command_timeout: Duration,
}

impl RedisPool {
    /// Create a pool with the given configuration.
    ///
    /// Connections are opened lazily, so an unreachable server surfaces on
    /// first use rather than here.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Build` if the URL cannot be parsed or the pool
    /// cannot be constructed.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let manager = RedisConnectionManager::new(config.redis_url.as_str())
            .map_err(|err| PoolError::build(err.to_string()))?;

        let pool = Pool::builder()
            .max_size(config.max_size)
            .min_idle(config.min_idle)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .await
            .map_err(|err| PoolError::build(err.to_string()))?;

        Ok(Self {
            inner: pool,
            command_timeout: config.command_timeout,
        })
    }

    /// Get a connection from the pool.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Checkout` if a connection cannot be obtained within
    /// the configured timeout.
    pub async fn get(&self) -> Result<PooledConnection<'_, RedisConnectionManager>, PoolError> {
        self.inner.get().await.map_err(map_run_error)
    }

    /// Deadline applied to each store round trip.
    pub fn command_timeout(&self) -> Duration {
        self.command_timeout
    }
}

fn map_run_error(error: RunError<RedisError>) -> PoolError {
    match error {
        RunError::User(err) => PoolError::checkout(err.to_string()),
        RunError::TimedOut => PoolError::checkout("timed out waiting for a connection"),
    }
}
