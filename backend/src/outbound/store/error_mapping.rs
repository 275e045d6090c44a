//! Shared mapping from Redis and pool failures to store port errors.

use bb8_redis::redis::RedisError;
use tracing::debug;

use crate::domain::ports::StoreError;

use super::pool::PoolError;

pub(super) fn map_pool_error(error: PoolError) -> StoreError {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    StoreError::connection(message)
}

pub(super) fn map_redis_error(error: RedisError) -> StoreError {
    debug!(kind = ?error.kind(), %error, "redis command failed");
    if error.is_io_error() || error.is_connection_refusal() || error.is_connection_dropped() {
        StoreError::connection(error.to_string())
    } else {
        StoreError::query(error.to_string())
    }
}
