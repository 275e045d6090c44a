//! Redis adapter for the key-value store port.
//!
//! Connections come from a `bb8` pool via `bb8-redis`. Every port call is a
//! single round trip bounded by the pool's command timeout; guarded batches
//! run as one Lua script.
//!
//! # Example
//!
//! ```no_run
//! use chirp::outbound::store::{PoolConfig, RedisKeyValueStore, RedisPool};
//!
//! # async fn connect() -> Result<(), chirp::outbound::store::PoolError> {
//! let pool = RedisPool::new(PoolConfig::new("redis://127.0.0.1:6379")).await?;
//! let store = RedisKeyValueStore::new(pool);
//! # drop(store);
//! # Ok(())
//! # }
//! ```

mod batch_script;
mod error_mapping;
mod pool;
mod redis_store;

pub use pool::{PoolConfig, PoolError, RedisPool};
pub use redis_store::RedisKeyValueStore;
