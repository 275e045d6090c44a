//! Redis-backed [`KeyValueStore`] adapter.

use std::collections::HashMap;
use std::future::Future;

use async_trait::async_trait;
use bb8_redis::redis::{self, Cmd, FromRedisValue};
use tracing::debug;

use crate::domain::RecordFields;
use crate::domain::ports::{BatchOutcome, KeyValueStore, StoreError, StoreKey, WriteBatch};

use super::batch_script::{BATCH_SCRIPT, encode_batch};
use super::error_mapping::{map_pool_error, map_redis_error};
use super::pool::RedisPool;

/// Store adapter issuing one pooled round trip per operation.
///
/// Batches run as a single Lua script so guards and writes are atomic with
/// respect to every other client of the same Redis instance.
#[derive(Clone)]
pub struct RedisKeyValueStore {
    pool: RedisPool,
}

impl RedisKeyValueStore {
    /// Create a store adapter over an established pool.
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    async fn query<T>(&self, operation: &'static str, cmd: Cmd) -> Result<T, StoreError>
    where
        T: FromRedisValue + Send,
    {
        self.with_deadline(operation, async {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let value: T = cmd.query_async(&mut *conn).await.map_err(map_redis_error)?;
            Ok(value)
        })
        .await
    }

    async fn with_deadline<T>(
        &self,
        operation: &'static str,
        round_trip: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.pool.command_timeout(), round_trip).await {
            Ok(result) => result,
            Err(_) => {
                debug!(operation, "redis round trip exceeded its deadline");
                Err(StoreError::timeout(operation))
            }
        }
    }
}

#[async_trait]
impl KeyValueStore for RedisKeyValueStore {
    async fn increment(&self, key: &StoreKey) -> Result<i64, StoreError> {
        let mut cmd = redis::cmd("INCR");
        cmd.arg(key.as_str());
        self.query("INCR", cmd).await
    }

    async fn hash_get(&self, key: &StoreKey, field: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let mut cmd = redis::cmd("HGET");
        cmd.arg(key.as_str()).arg(field);
        self.query("HGET", cmd).await
    }

    async fn hash_get_all(&self, key: &StoreKey) -> Result<RecordFields, StoreError> {
        let mut cmd = redis::cmd("HGETALL");
        cmd.arg(key.as_str());
        let fields: HashMap<String, Vec<u8>> = self.query("HGETALL", cmd).await?;
        Ok(fields.into_iter().collect())
    }

    async fn list_range(&self, key: &StoreKey, limit: usize) -> Result<Vec<Vec<u8>>, StoreError> {
        // LRANGE treats a stop of -1 as the end of the list.
        let Some(stop) = limit.checked_sub(1) else {
            return Ok(Vec::new());
        };
        let stop = isize::try_from(stop).unwrap_or(isize::MAX);
        let mut cmd = redis::cmd("LRANGE");
        cmd.arg(key.as_str()).arg(0).arg(stop);
        self.query("LRANGE", cmd).await
    }

    async fn execute(&self, batch: WriteBatch) -> Result<BatchOutcome, StoreError> {
        if batch.is_empty() && batch.guards().is_empty() {
            return Ok(BatchOutcome::Applied);
        }
        let encoded = encode_batch(&batch);
        let mut cmd = redis::cmd("EVAL");
        cmd.arg(BATCH_SCRIPT)
            .arg(encoded.keys.len())
            .arg(encoded.keys)
            .arg(encoded.args);
        let applied: i64 = self.query("EVAL", cmd).await?;
        Ok(match applied {
            1 => BatchOutcome::Applied,
            _ => BatchOutcome::Rejected,
        })
    }
}
