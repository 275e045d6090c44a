//! Store key type and the key layout shared by every store adapter.
use thiserror::Error;

use crate::domain::{UpdateId, UserId};

/// Key addressing a counter, hash, or list in the key-value store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoreKey(String);

impl StoreKey {
    /// Construct a key after validating that it is non-empty and free of
    /// whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, StoreKeyValidationError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(StoreKeyValidationError::Empty);
        }
        if raw.chars().any(char::is_whitespace) {
            return Err(StoreKeyValidationError::ContainsWhitespace);
        }
        Ok(Self(raw))
    }

    /// Counter behind user id allocation.
    pub fn user_counter() -> Self {
        Self("user:next-id".to_owned())
    }

    /// Counter behind update id allocation.
    pub fn update_counter() -> Self {
        Self("update:next-id".to_owned())
    }

    /// Hash holding a single user's record.
    pub fn user_record(id: UserId) -> Self {
        Self(format!("user:{id}"))
    }

    /// Hash mapping usernames to user ids.
    pub fn username_index() -> Self {
        Self("user:by-username".to_owned())
    }

    /// Hash holding a single update's record.
    pub fn update_record(id: UpdateId) -> Self {
        Self(format!("update:{id}"))
    }

    /// List of every update id, newest first.
    pub fn global_feed() -> Self {
        Self("updates".to_owned())
    }

    /// List of one author's update ids, newest first.
    pub fn user_feed(id: UserId) -> Self {
        Self(format!("user:{id}:updates"))
    }

    /// Borrow the underlying key as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for StoreKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Validation errors returned when constructing [`StoreKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreKeyValidationError {
    /// Key is empty after trimming whitespace.
    #[error("store key must not be empty")]
    Empty,
    /// Key contains whitespace.
    #[error("store key must not contain whitespace")]
    ContainsWhitespace,
}
