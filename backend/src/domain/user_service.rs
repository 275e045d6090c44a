//! User entity store.
//!
//! Composes the id allocator, record codec, and index maintainer into the
//! create/read operations for user accounts. Handles are plain ids; every
//! attribute read goes back to the store.

use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use super::error_mapping::{map_codec_error, map_hasher_error, map_store_error};
use super::feed_index::IndexMaintainer;
use super::id_allocator::{EntityClass, IdAllocator};
use super::ports::{
    BatchOutcome, CredentialHasher, KeyValueStore, StoreKey, Verification, WriteBatch,
};
use super::record::{Record, UserRecord};
use super::{Error, LoginCredentials, PasswordHash, User, UserId, Username};

/// Entity store for user accounts.
#[derive(Clone)]
pub struct Users {
    store: Arc<dyn KeyValueStore>,
    hasher: Arc<dyn CredentialHasher>,
    allocator: IdAllocator,
    indexes: IndexMaintainer,
}

impl Users {
    /// Create a user store over an explicitly passed store connection and
    /// credential hasher.
    pub fn new(store: Arc<dyn KeyValueStore>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self {
            allocator: IdAllocator::new(store.clone()),
            indexes: IndexMaintainer::new(store.clone()),
            store,
            hasher,
        }
    }

    /// Create a user with an already computed password hash.
    ///
    /// The record fields and the username index entry are written in one
    /// batch guarded on the username being unclaimed; the guard is the only
    /// uniqueness check. A rejected batch leaves its allocated id unused.
    ///
    /// # Errors
    ///
    /// - `UsernameTaken` when the username is already registered.
    /// - `StorageFailure` when the store fails.
    pub async fn create_user(
        &self,
        username: &Username,
        password_hash: PasswordHash,
    ) -> Result<User, Error> {
        let raw_id = self
            .allocator
            .next_id(EntityClass::User)
            .await
            .map_err(map_store_error)?;
        let id = UserId::new(raw_id).map_err(|err| Error::internal(err.to_string()))?;

        let record = UserRecord {
            id,
            username: username.clone(),
            password_hash,
        };
        let key = StoreKey::user_record(id);
        let mut batch = WriteBatch::new();
        self.indexes.register_username(&mut batch, username, id);
        for (field, value) in record.encode() {
            batch.hash_set(key.clone(), field, value);
        }

        match self.store.execute(batch).await.map_err(map_store_error)? {
            BatchOutcome::Applied => {
                info!(user_id = %id, %username, "registered user");
                Ok(User::new(id))
            }
            BatchOutcome::Rejected => {
                warn!(user_id = %id, %username, "username claim rejected; id left unused");
                Err(Error::username_taken(format!("username {username} is already taken"))
                    .with_details(json!({ "username": username.as_str() })))
            }
        }
    }

    /// Reference a user by id without touching the store.
    pub fn get_user_by_id(&self, id: UserId) -> User {
        User::new(id)
    }

    /// Resolve a username through the index.
    ///
    /// # Errors
    ///
    /// `UserNotFound` when no user holds the name; `StorageFailure` on store
    /// errors.
    pub async fn get_user_by_username(&self, username: &Username) -> Result<User, Error> {
        let id = self
            .indexes
            .resolve_username(username)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::user_not_found(format!("no user named {username}")))?;
        Ok(self.get_user_by_id(id))
    }

    /// Read and strictly decode the full user record.
    ///
    /// # Errors
    ///
    /// `NotFound` when the id was never allocated, `MissingField` for a
    /// partial record, `StorageFailure` on store errors.
    pub async fn load(&self, user: &User) -> Result<UserRecord, Error> {
        let key = StoreKey::user_record(user.id());
        let fields = self
            .store
            .hash_get_all(&key)
            .await
            .map_err(map_store_error)?;
        if fields.is_empty() {
            return Err(Error::not_found(format!("user {} does not exist", user.id())));
        }
        UserRecord::decode(&fields).map_err(|err| map_codec_error(key.as_str(), err))
    }

    /// Read the user's username.
    ///
    /// # Errors
    ///
    /// As for [`Users::load`].
    pub async fn get_username(&self, user: &User) -> Result<Username, Error> {
        self.load(user).await.map(|record| record.username)
    }

    /// Read the user's stored password hash.
    ///
    /// # Errors
    ///
    /// As for [`Users::load`].
    pub async fn get_password_hash(&self, user: &User) -> Result<PasswordHash, Error> {
        self.load(user).await.map(|record| record.password_hash)
    }

    /// Verify a plaintext password against the user's stored hash.
    ///
    /// # Errors
    ///
    /// `InvalidCredential` on mismatch, `InternalError` when the hasher
    /// fails, plus any error from [`Users::load`].
    pub async fn authenticate(&self, user: &User, password: &str) -> Result<(), Error> {
        let stored = self.get_password_hash(user).await?;
        match self
            .hasher
            .verify(password, &stored)
            .await
            .map_err(map_hasher_error)?
        {
            Verification::Match => Ok(()),
            Verification::Mismatch => Err(Error::invalid_credential("invalid login")),
        }
    }

    /// Resolve a username and verify its password.
    ///
    /// # Errors
    ///
    /// `UserNotFound` for an unknown username, distinct from
    /// `InvalidCredential` for a wrong password.
    pub async fn authenticate_by_username(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<User, Error> {
        let user = self.get_user_by_username(credentials.username()).await?;
        self.authenticate(&user, credentials.password()).await?;
        Ok(user)
    }

    /// Hash a plaintext password and create the user.
    ///
    /// # Errors
    ///
    /// `InternalError` when hashing fails, otherwise as for
    /// [`Users::create_user`].
    pub async fn register_user(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let hash = self
            .hasher
            .hash(credentials.password())
            .await
            .map_err(map_hasher_error)?;
        self.create_user(credentials.username(), hash).await
    }
}

#[cfg(test)]
mod tests;
