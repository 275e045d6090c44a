//! Update (short post) identity and handle types.

use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Validation errors for update identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpdateIdError {
    /// Identifier was zero; allocation starts at one.
    #[error("update id must be a positive integer")]
    Zero,
    /// Identifier text was not a decimal integer.
    #[error("update id must be a decimal integer")]
    Invalid,
}

/// Store-allocated update identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct UpdateId(NonZeroU64);

impl UpdateId {
    /// Validate and construct an [`UpdateId`].
    pub fn new(raw: u64) -> Result<Self, UpdateIdError> {
        NonZeroU64::new(raw).map(Self).ok_or(UpdateIdError::Zero)
    }

    /// The raw integer value.
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for UpdateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UpdateId {
    type Err = UpdateIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: u64 = s.parse().map_err(|_| UpdateIdError::Invalid)?;
        Self::new(raw)
    }
}

impl TryFrom<u64> for UpdateId {
    type Error = UpdateIdError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UpdateId> for u64 {
    fn from(value: UpdateId) -> Self {
        value.get()
    }
}

/// Handle referencing an update by id. Attributes are read through
/// `Updates`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Update {
    id: UpdateId,
}

impl Update {
    /// Reference the update with the given id.
    pub fn new(id: UpdateId) -> Self {
        Self { id }
    }

    /// The referenced update's id.
    pub fn id(&self) -> UpdateId {
        self.id
    }
}

impl From<UpdateId> for Update {
    fn from(id: UpdateId) -> Self {
        Self::new(id)
    }
}
