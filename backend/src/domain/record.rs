//! Record codec: entities to and from flat field maps.
//!
//! Pure mapping with no I/O. Integers are encoded as decimal ASCII, text as
//! UTF-8, and the password hash as its raw bytes. Decoding is strict: a
//! missing field is reported as [`CodecError::MissingField`] and never
//! replaced with a default, so partial records surface as corruption.

use std::collections::BTreeMap;

use super::{PasswordHash, UpdateId, UserId, Username};

/// Field holding the record's own id.
pub const ID_FIELD: &str = "id";
/// User field holding the username.
pub const USERNAME_FIELD: &str = "username";
/// User field holding the password hash.
pub const HASH_FIELD: &str = "hash";
/// Update field holding the author's user id.
pub const AUTHOR_FIELD: &str = "user_id";
/// Update field holding the post text.
pub const BODY_FIELD: &str = "body";

/// Errors raised while decoding a stored record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// A required field is absent.
    #[error("record is missing required field `{field}`")]
    MissingField {
        /// Name of the absent field.
        field: &'static str,
    },
    /// A field is present but cannot be parsed.
    #[error("record field `{field}` is invalid: {message}")]
    InvalidField {
        /// Name of the malformed field.
        field: &'static str,
        /// Parse failure detail.
        message: String,
    },
}

/// Flat attribute map as read from or written to a single stored record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFields(BTreeMap<String, Vec<u8>>);

impl RecordFields {
    /// Create an empty field map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any previous value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Vec<u8>>) {
        self.0.insert(field.into(), value.into());
    }

    /// Look up a field value.
    pub fn get(&self, field: &str) -> Option<&[u8]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Whether the map holds no fields. Stores report a missing record this
    /// way.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.0
            .iter()
            .map(|(field, value)| (field.as_str(), value.as_slice()))
    }

    fn required(&self, field: &'static str) -> Result<&[u8], CodecError> {
        self.get(field).ok_or(CodecError::MissingField { field })
    }

    fn required_text(&self, field: &'static str) -> Result<&str, CodecError> {
        std::str::from_utf8(self.required(field)?).map_err(|err| CodecError::InvalidField {
            field,
            message: err.to_string(),
        })
    }

    fn required_u64(&self, field: &'static str) -> Result<u64, CodecError> {
        let text = self.required_text(field)?;
        text.parse().map_err(|_| CodecError::InvalidField {
            field,
            message: format!("`{text}` is not a decimal integer"),
        })
    }
}

impl FromIterator<(String, Vec<u8>)> for RecordFields {
    fn from_iter<I: IntoIterator<Item = (String, Vec<u8>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for RecordFields {
    type Item = (String, Vec<u8>);
    type IntoIter = std::collections::btree_map::IntoIter<String, Vec<u8>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Entity that can be stored as a flat field map.
pub trait Record: Sized {
    /// Encode into `(field, value)` pairs in a stable order.
    fn encode(&self) -> Vec<(&'static str, Vec<u8>)>;

    /// Decode from a field map, failing on absent or malformed fields.
    fn decode(fields: &RecordFields) -> Result<Self, CodecError>;
}

/// Decimal ASCII encoding shared by records and index entries.
pub fn encode_id(raw: u64) -> Vec<u8> {
    raw.to_string().into_bytes()
}

/// Full stored state of a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Allocated id.
    pub id: UserId,
    /// Unique login name.
    pub username: Username,
    /// One-way password hash.
    pub password_hash: PasswordHash,
}

impl Record for UserRecord {
    fn encode(&self) -> Vec<(&'static str, Vec<u8>)> {
        vec![
            (ID_FIELD, encode_id(self.id.get())),
            (USERNAME_FIELD, self.username.as_str().as_bytes().to_vec()),
            (HASH_FIELD, self.password_hash.as_bytes().to_vec()),
        ]
    }

    fn decode(fields: &RecordFields) -> Result<Self, CodecError> {
        let id = UserId::new(fields.required_u64(ID_FIELD)?).map_err(|err| {
            CodecError::InvalidField {
                field: ID_FIELD,
                message: err.to_string(),
            }
        })?;
        let username = Username::new(fields.required_text(USERNAME_FIELD)?).map_err(|err| {
            CodecError::InvalidField {
                field: USERNAME_FIELD,
                message: err.to_string(),
            }
        })?;
        let password_hash = PasswordHash::new(fields.required(HASH_FIELD)?);
        Ok(Self {
            id,
            username,
            password_hash,
        })
    }
}

/// Full stored state of an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRecord {
    /// Allocated id.
    pub id: UpdateId,
    /// Author reference; existence is not checked at write time.
    pub author: UserId,
    /// Post text.
    pub body: String,
}

impl Record for UpdateRecord {
    fn encode(&self) -> Vec<(&'static str, Vec<u8>)> {
        vec![
            (ID_FIELD, encode_id(self.id.get())),
            (AUTHOR_FIELD, encode_id(self.author.get())),
            (BODY_FIELD, self.body.as_bytes().to_vec()),
        ]
    }

    fn decode(fields: &RecordFields) -> Result<Self, CodecError> {
        let id = UpdateId::new(fields.required_u64(ID_FIELD)?).map_err(|err| {
            CodecError::InvalidField {
                field: ID_FIELD,
                message: err.to_string(),
            }
        })?;
        let author = UserId::new(fields.required_u64(AUTHOR_FIELD)?).map_err(|err| {
            CodecError::InvalidField {
                field: AUTHOR_FIELD,
                message: err.to_string(),
            }
        })?;
        let body = fields.required_text(BODY_FIELD)?.to_owned();
        Ok(Self { id, author, body })
    }
}

/// Collect encoded pairs into a [`RecordFields`] map.
pub fn to_fields<R: Record>(record: &R) -> RecordFields {
    record
        .encode()
        .into_iter()
        .map(|(field, value)| (field.to_owned(), value))
        .collect()
}
