//! Denormalised lookup structures: username index and feed lists.
//!
//! Feeds are newest-first because attachment prepends; nothing is sorted on
//! read and lists are never trimmed. Writes are staged into the caller's
//! [`WriteBatch`] so index entries become visible together with the record
//! they point at.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

use super::ports::{KeyValueStore, StoreError, StoreKey, WriteBatch};
use super::record::encode_id;
use super::{UpdateId, UserId, Username};

/// Errors returned when constructing a [`FeedLimit`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedLimitError {
    /// A feed query must request at least one entry.
    #[error("feed limit must be at least 1")]
    Zero,
}

/// Maximum number of entries a feed query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeedLimit(NonZeroUsize);

impl FeedLimit {
    /// Eleven most recent entries.
    pub const DEFAULT: Self = Self(NonZeroUsize::MIN.saturating_add(10));

    /// Validate and construct a limit.
    pub fn new(limit: usize) -> Result<Self, FeedLimitError> {
        NonZeroUsize::new(limit)
            .map(Self)
            .ok_or(FeedLimitError::Zero)
    }

    /// The limit as a plain count.
    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for FeedLimit {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for FeedLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which feed list a query reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedSelector {
    /// Every update, newest first.
    Global,
    /// Updates authored by one user, newest first.
    User(UserId),
}

impl FeedSelector {
    /// List key backing the feed.
    pub fn key(self) -> StoreKey {
        match self {
            Self::Global => StoreKey::global_feed(),
            Self::User(id) => StoreKey::user_feed(id),
        }
    }
}

/// Maintains the username index and feed lists.
///
/// Only the entity stores call the staging methods; nothing else writes
/// these structures.
#[derive(Clone)]
pub struct IndexMaintainer {
    store: Arc<dyn KeyValueStore>,
}

impl IndexMaintainer {
    /// Create a maintainer over the shared store.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Stage prepending `update` to the global feed.
    pub fn attach_to_global_feed(&self, batch: &mut WriteBatch, update: UpdateId) {
        batch.list_push(StoreKey::global_feed(), encode_id(update.get()));
    }

    /// Stage prepending `update` to `author`'s feed.
    pub fn attach_to_user_feed(&self, batch: &mut WriteBatch, author: UserId, update: UpdateId) {
        batch.list_push(StoreKey::user_feed(author), encode_id(update.get()));
    }

    /// Stage a username claim.
    ///
    /// The batch is guarded on the username being absent from the index, so
    /// of two concurrent claims exactly one batch applies; the other is
    /// rejected as a whole.
    pub fn register_username(&self, batch: &mut WriteBatch, username: &Username, user: UserId) {
        batch
            .require_field_absent(StoreKey::username_index(), username.as_str())
            .hash_set(
                StoreKey::username_index(),
                username.as_str(),
                encode_id(user.get()),
            );
    }

    /// Resolve a username to its owner's id, or `None` when unregistered.
    ///
    /// # Errors
    ///
    /// Store failures propagate; an index entry that is not a valid id is
    /// reported as [`StoreError::Corrupt`].
    pub async fn resolve_username(
        &self,
        username: &Username,
    ) -> Result<Option<UserId>, StoreError> {
        let key = StoreKey::username_index();
        let Some(raw) = self.store.hash_get(&key, username.as_str()).await? else {
            return Ok(None);
        };
        parse_id(&key, &raw)
            .and_then(|id| {
                UserId::new(id).map_err(|err| StoreError::corrupt(key.as_str(), err.to_string()))
            })
            .map(Some)
    }

    /// Read at most `limit` update ids from a feed, newest first.
    ///
    /// # Errors
    ///
    /// Store failures propagate; a list entry that is not a valid id is
    /// reported as [`StoreError::Corrupt`].
    pub async fn query_feed(
        &self,
        feed: FeedSelector,
        limit: FeedLimit,
    ) -> Result<Vec<UpdateId>, StoreError> {
        let key = feed.key();
        let entries = self.store.list_range(&key, limit.get()).await?;
        entries
            .iter()
            .map(|raw| {
                parse_id(&key, raw).and_then(|id| {
                    UpdateId::new(id)
                        .map_err(|err| StoreError::corrupt(key.as_str(), err.to_string()))
                })
            })
            .collect()
    }
}

fn parse_id(key: &StoreKey, raw: &[u8]) -> Result<u64, StoreError> {
    std::str::from_utf8(raw)
        .ok()
        .and_then(|text| text.parse().ok())
        .ok_or_else(|| {
            StoreError::corrupt(
                key.as_str(),
                format!("entry {:?} is not a decimal id", String::from_utf8_lossy(raw)),
            )
        })
}
