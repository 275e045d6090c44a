//! User identity types and the lazily resolved user handle.

use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Validation errors returned by the user value constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// Identifier was zero; allocation starts at one.
    #[error("user id must be a positive integer")]
    ZeroId,
    /// Identifier text was not a decimal integer.
    #[error("user id must be a decimal integer")]
    InvalidId,
    /// Username was empty once trimmed.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Username carried leading or trailing whitespace.
    #[error("username must not contain surrounding whitespace")]
    PaddedUsername,
}

/// Store-allocated user identifier.
///
/// Ids are handed out by the `user:next-id` counter and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct UserId(NonZeroU64);

impl UserId {
    /// Validate and construct a [`UserId`].
    pub fn new(raw: u64) -> Result<Self, UserValidationError> {
        NonZeroU64::new(raw)
            .map(Self)
            .ok_or(UserValidationError::ZeroId)
    }

    /// The raw integer value.
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: u64 = s.parse().map_err(|_| UserValidationError::InvalidId)?;
        Self::new(raw)
    }
}

impl TryFrom<u64> for UserId {
    type Error = UserValidationError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for u64 {
    fn from(value: UserId) -> Self {
        value.get()
    }
}

/// Globally unique login name.
///
/// ## Invariants
/// - Non-empty and free of leading/trailing whitespace.
/// - Immutable once the owning user is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`].
    ///
    /// # Examples
    /// ```
    /// use chirp::domain::Username;
    ///
    /// let name = Username::new("alice").unwrap();
    /// assert_eq!(name.as_ref(), "alice");
    /// assert!(Username::new(" alice").is_err());
    /// ```
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        if raw.trim() != raw {
            return Err(UserValidationError::PaddedUsername);
        }
        Ok(Self(raw))
    }

    /// Borrow the username as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Opaque one-way password verification hash as produced by a
/// `CredentialHasher`.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(Vec<u8>);

impl PasswordHash {
    /// Wrap hasher output.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Borrow the stored bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PasswordHash")
            .field(&format_args!("<{} bytes>", self.0.len()))
            .finish()
    }
}

/// Handle referencing a user by id.
///
/// Constructing a handle never touches the store; attribute reads go through
/// the `Users` entity store and fail with `NotFound` when the id was never
/// allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct User {
    id: UserId,
}

impl User {
    /// Reference the user with the given id.
    pub fn new(id: UserId) -> Self {
        Self { id }
    }

    /// The referenced user's id.
    pub fn id(&self) -> UserId {
        self.id
    }
}

impl From<UserId> for User {
    fn from(id: UserId) -> Self {
        Self::new(id)
    }
}

#[cfg(test)]
mod tests;
