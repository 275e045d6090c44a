//! Port abstraction over the shared key-value store.
//!
//! The store is the single shared mutable resource. Every entity store and
//! index operation is expressed through this trait so adapters (Redis, the
//! in-memory fake) stay interchangeable.

use async_trait::async_trait;

use crate::domain::RecordFields;

use super::{StoreKey, define_port_error};

define_port_error! {
    /// Errors surfaced by key-value store adapters.
    pub enum StoreError {
        /// The store could not be reached or the connection dropped.
        Connection { message: String } => "key-value store connection failed: {message}",
        /// A command was rejected or failed during execution.
        Query { message: String } => "key-value store command failed: {message}",
        /// A round trip exceeded its deadline.
        Timeout { operation: String } => "key-value store {operation} timed out",
        /// A stored value did not have the expected shape.
        Corrupt { key: String, message: String } => "corrupt value under {key}: {message}",
    }
}

/// Precondition checked atomically before a batch applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchGuard {
    /// The hash under `key` must not contain `field`.
    FieldAbsent {
        /// Hash key to inspect.
        key: StoreKey,
        /// Field that must be absent.
        field: String,
    },
}

/// A single mutation inside a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteCommand {
    /// Set `field` to `value` in the hash under `key`.
    HashSet {
        /// Hash key.
        key: StoreKey,
        /// Field name.
        field: String,
        /// Raw field value.
        value: Vec<u8>,
    },
    /// Prepend `value` to the list under `key`.
    ListPush {
        /// List key.
        key: StoreKey,
        /// Raw list entry.
        value: Vec<u8>,
    },
}

/// Group of writes that become visible together or not at all.
///
/// # Examples
/// ```
/// use chirp::domain::ports::{StoreKey, WriteBatch};
///
/// let mut batch = WriteBatch::new();
/// batch
///     .require_field_absent(StoreKey::username_index(), "alice")
///     .hash_set(StoreKey::username_index(), "alice", b"1".to_vec());
/// assert_eq!(batch.guards().len(), 1);
/// assert_eq!(batch.commands().len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    guards: Vec<BatchGuard>,
    commands: Vec<WriteCommand>,
}

impl WriteBatch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only apply the batch if `field` is absent from the hash under `key`.
    pub fn require_field_absent(&mut self, key: StoreKey, field: impl Into<String>) -> &mut Self {
        self.guards.push(BatchGuard::FieldAbsent {
            key,
            field: field.into(),
        });
        self
    }

    /// Queue a hash field write.
    pub fn hash_set(
        &mut self,
        key: StoreKey,
        field: impl Into<String>,
        value: impl Into<Vec<u8>>,
    ) -> &mut Self {
        self.commands.push(WriteCommand::HashSet {
            key,
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// Queue a prepend onto a list.
    pub fn list_push(&mut self, key: StoreKey, value: impl Into<Vec<u8>>) -> &mut Self {
        self.commands.push(WriteCommand::ListPush {
            key,
            value: value.into(),
        });
        self
    }

    /// Preconditions in insertion order.
    pub fn guards(&self) -> &[BatchGuard] {
        &self.guards
    }

    /// Commands in insertion order.
    pub fn commands(&self) -> &[WriteCommand] {
        &self.commands
    }

    /// Whether the batch holds no commands.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Result of executing a [`WriteBatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Every guard held and every command was applied.
    Applied,
    /// A guard failed; nothing was written.
    Rejected,
}

/// Store protocol required by the entity stores.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Atomically increment the counter under `key` and return the new value.
    ///
    /// A missing counter starts at zero, so the first call returns one.
    async fn increment(&self, key: &StoreKey) -> Result<i64, StoreError>;

    /// Read one field of the hash under `key`.
    async fn hash_get(&self, key: &StoreKey, field: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Read every field of the hash under `key`. A missing key yields an empty
    /// map.
    async fn hash_get_all(&self, key: &StoreKey) -> Result<RecordFields, StoreError>;

    /// Read at most `limit` entries from the head of the list under `key`.
    async fn list_range(&self, key: &StoreKey, limit: usize) -> Result<Vec<Vec<u8>>, StoreError>;

    /// Apply a batch atomically, honouring its guards.
    async fn execute(&self, batch: WriteBatch) -> Result<BatchOutcome, StoreError>;
}
