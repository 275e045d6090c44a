//! Update entity store: posting and feed reads.

use std::sync::Arc;

use tracing::info;

use super::error_mapping::{map_codec_error, map_store_error};
use super::feed_index::{FeedLimit, FeedSelector, IndexMaintainer};
use super::id_allocator::{EntityClass, IdAllocator};
use super::ports::{BatchOutcome, KeyValueStore, StoreKey, WriteBatch};
use super::record::{Record, UpdateRecord};
use super::{Error, Update, UpdateId, User, UserId};

/// Entity store for updates.
#[derive(Clone)]
pub struct Updates {
    store: Arc<dyn KeyValueStore>,
    allocator: IdAllocator,
    indexes: IndexMaintainer,
    default_limit: FeedLimit,
}

impl Updates {
    /// Create an update store over an explicitly passed store connection.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            allocator: IdAllocator::new(store.clone()),
            indexes: IndexMaintainer::new(store.clone()),
            store,
            default_limit: FeedLimit::DEFAULT,
        }
    }

    /// Override the limit used by [`Updates::get_all_updates`] and
    /// [`Updates::get_updates_for_user`].
    #[must_use]
    pub fn with_default_limit(mut self, limit: FeedLimit) -> Self {
        self.default_limit = limit;
        self
    }

    /// Limit applied by the convenience feed reads.
    pub fn default_limit(&self) -> FeedLimit {
        self.default_limit
    }

    /// Post an update.
    ///
    /// The record and both feed attachments go out as one batch, so a feed
    /// never lists an id whose record is incomplete. The author is not
    /// checked for existence.
    ///
    /// # Errors
    ///
    /// `StorageFailure` when allocation or the batch fails.
    pub async fn create_update(&self, author: UserId, body: &str) -> Result<Update, Error> {
        let raw_id = self
            .allocator
            .next_id(EntityClass::Update)
            .await
            .map_err(map_store_error)?;
        let id = UpdateId::new(raw_id).map_err(|err| Error::internal(err.to_string()))?;

        let record = UpdateRecord {
            id,
            author,
            body: body.to_owned(),
        };
        let key = StoreKey::update_record(id);
        let mut batch = WriteBatch::new();
        for (field, value) in record.encode() {
            batch.hash_set(key.clone(), field, value);
        }
        self.indexes.attach_to_global_feed(&mut batch, id);
        self.indexes.attach_to_user_feed(&mut batch, author, id);

        match self.store.execute(batch).await.map_err(map_store_error)? {
            BatchOutcome::Applied => {
                info!(update_id = %id, author_id = %author, "posted update");
                Ok(Update::new(id))
            }
            BatchOutcome::Rejected => Err(Error::internal(format!(
                "unguarded batch for update {id} was rejected"
            ))),
        }
    }

    /// Post an update, discarding the handle.
    ///
    /// # Errors
    ///
    /// As for [`Updates::create_update`].
    pub async fn post_update(&self, author: UserId, body: &str) -> Result<(), Error> {
        self.create_update(author, body).await.map(|_| ())
    }

    /// Reference an update by id without touching the store.
    pub fn get_update_by_id(&self, id: UpdateId) -> Update {
        Update::new(id)
    }

    /// Read and strictly decode the full update record.
    ///
    /// # Errors
    ///
    /// `NotFound` when the id was never written, `MissingField` for a partial
    /// record, `StorageFailure` on store errors.
    pub async fn load(&self, update: &Update) -> Result<UpdateRecord, Error> {
        let key = StoreKey::update_record(update.id());
        let fields = self
            .store
            .hash_get_all(&key)
            .await
            .map_err(map_store_error)?;
        if fields.is_empty() {
            return Err(Error::not_found(format!(
                "update {} does not exist",
                update.id()
            )));
        }
        UpdateRecord::decode(&fields).map_err(|err| map_codec_error(key.as_str(), err))
    }

    /// Read the update's text.
    ///
    /// # Errors
    ///
    /// As for [`Updates::load`].
    pub async fn get_body(&self, update: &Update) -> Result<String, Error> {
        self.load(update).await.map(|record| record.body)
    }

    /// Resolve the update's author to a user handle.
    ///
    /// # Errors
    ///
    /// As for [`Updates::load`].
    pub async fn get_author(&self, update: &Update) -> Result<User, Error> {
        self.load(update).await.map(|record| User::new(record.author))
    }

    /// Most recent updates across all users, newest first.
    ///
    /// # Errors
    ///
    /// `StorageFailure` on store errors or corrupt feed entries.
    pub async fn get_global_feed(&self, limit: FeedLimit) -> Result<Vec<Update>, Error> {
        self.query(FeedSelector::Global, limit).await
    }

    /// Most recent updates by one user, newest first.
    ///
    /// # Errors
    ///
    /// `StorageFailure` on store errors or corrupt feed entries.
    pub async fn get_user_feed(
        &self,
        author: UserId,
        limit: FeedLimit,
    ) -> Result<Vec<Update>, Error> {
        self.query(FeedSelector::User(author), limit).await
    }

    /// Global feed bounded by the configured default limit.
    ///
    /// # Errors
    ///
    /// As for [`Updates::get_global_feed`].
    pub async fn get_all_updates(&self) -> Result<Vec<Update>, Error> {
        self.get_global_feed(self.default_limit).await
    }

    /// User feed bounded by the configured default limit.
    ///
    /// # Errors
    ///
    /// As for [`Updates::get_user_feed`].
    pub async fn get_updates_for_user(&self, author: UserId) -> Result<Vec<Update>, Error> {
        self.get_user_feed(author, self.default_limit).await
    }

    async fn query(&self, feed: FeedSelector, limit: FeedLimit) -> Result<Vec<Update>, Error> {
        let ids = self
            .indexes
            .query_feed(feed, limit)
            .await
            .map_err(map_store_error)?;
        Ok(ids.into_iter().map(Update::new).collect())
    }
}
